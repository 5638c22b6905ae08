//! アプリケーション設定管理モジュール
//! サーバー、ゲーム既定値、演出タイミング、セッション、AIサービス、ログの設定を
//! 設定ファイルと環境変数から読み込んで管理する。

use serde::{Deserialize, Serialize};
use std::{env, fs, path::Path, str::FromStr, time::Duration};

use crate::ai::service::{AIServiceConfig, AIServiceType};
use crate::game::GameSettings;

/// Duration型をJSONでシリアライズするためのモジュール
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    /// Durationを(secs, nanos)のタプルとしてシリアライズ
    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (duration.as_secs(), duration.subsec_nanos()).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let (secs, nanos) = <(u64, u32)>::deserialize(deserializer)?;
        Ok(Duration::new(secs, nanos))
    }
}

/// サーバーの設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub enable_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "127.0.0.1".to_string(),
            enable_cors: true,
        }
    }
}

/// 落下演出とコンピュータ手番のタイミング
/// 両方0の場合は即時モード（リクエスト内で手番が確定する）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// 落下演出の1段あたりの間隔
    #[serde(with = "duration_serde")]
    pub tick_interval: Duration,
    /// 人間の着手後、コンピュータが着手するまでの遅延
    #[serde(with = "duration_serde")]
    pub computer_move_delay: Duration,
}

impl TimingConfig {
    /// 待ち時間なしの設定（テストやヘッドレス実行用）
    pub fn instant() -> Self {
        Self {
            tick_interval: Duration::ZERO,
            computer_move_delay: Duration::ZERO,
        }
    }

    pub fn is_instant(&self) -> bool {
        self.tick_interval.is_zero() && self.computer_move_delay.is_zero()
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(100),
            computer_move_delay: Duration::from_millis(500),
        }
    }
}

/// ゲームセッションの設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub max_sessions: usize,
    pub session_timeout_minutes: i64,
    pub enable_session_cleanup: bool,
    pub cleanup_interval_minutes: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_sessions: 100,
            session_timeout_minutes: 30,
            enable_session_cleanup: true,
            cleanup_interval_minutes: 5,
        }
    }
}

/// ログ出力の設定
/// RUST_LOGが設定されている場合はそちらを優先する
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// アプリケーションの全設定を統合するメイン設定構造体
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    /// 新規ゲームの既定設定
    pub game: GameSettings,
    pub timing: TimingConfig,
    pub sessions: SessionConfig,
    pub ai_service: AIServiceConfig,
    pub logging: LoggingConfig,
}

/// 設定関連のエラー
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("設定ファイル読み込みエラー: {0}")]
    FileReadError(#[from] std::io::Error),

    #[error("設定ファイル解析エラー: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("環境変数エラー: {name} = {value}")]
    EnvVarError { name: String, value: String },

    #[error("設定値が無効です: {field} = {value}")]
    InvalidValue { field: String, value: String },
}

/// 環境変数を読み取り、設定されていればパースして返す
fn env_parse<T: FromStr>(name: &str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::EnvVarError {
                name: name.to_string(),
                value,
            }),
        Err(_) => Ok(None),
    }
}

impl Config {
    /// 指定したファイルパスから設定を読み込む
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// デフォルト値をベースに環境変数で上書きした設定を作る
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Config::default();
        config.apply_env()?;
        Ok(config)
    }

    /// 設定されている環境変数の値だけを上書きする
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Ok(host) = env::var("SERVER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = env_parse("SERVER_PORT")? {
            self.server.port = port;
        }

        if let Some(rows) = env_parse("CONNECT_ROWS")? {
            self.game.rows = rows;
        }
        if let Some(columns) = env_parse("CONNECT_COLUMNS")? {
            self.game.columns = columns;
        }
        if let Some(win_length) = env_parse("CONNECT_WIN_LENGTH")? {
            self.game.win_length = win_length;
        }
        if let Some(vs_computer) = env_parse("CONNECT_VS_COMPUTER")? {
            self.game.set_vs_computer(vs_computer);
        }

        if let Some(ms) = env_parse("TICK_INTERVAL_MS")? {
            self.timing.tick_interval = Duration::from_millis(ms);
        }
        if let Some(ms) = env_parse("COMPUTER_MOVE_DELAY_MS")? {
            self.timing.computer_move_delay = Duration::from_millis(ms);
        }

        if let Some(max_sessions) = env_parse("MAX_SESSIONS")? {
            self.sessions.max_sessions = max_sessions;
        }

        if let Ok(service_type) = env::var("AI_SERVICE_TYPE") {
            self.ai_service.service_type = match service_type.to_lowercase().as_str() {
                "local" => AIServiceType::Local,
                "mock" => AIServiceType::Mock,
                _ => {
                    return Err(ConfigError::EnvVarError {
                        name: "AI_SERVICE_TYPE".to_string(),
                        value: service_type,
                    })
                }
            };
        }
        if let Some(seed) = env_parse("AI_SEED")? {
            self.ai_service.seed = Some(seed);
        }

        if let Ok(level) = env::var("LOG_LEVEL") {
            self.logging.level = level;
        }

        Ok(())
    }

    /// 設定ファイルと環境変数を結合して設定を読み込む
    /// 設定ファイルがなくてもデフォルト値で動作する
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("config.json")
            .or_else(|_| Self::from_file("config/app.json"))
            .unwrap_or_default();

        config.apply_env()?;
        Ok(config)
    }

    /// 現在の設定を指定したファイルに保存する
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// 設定値の妥当性をチェックする
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                value: self.server.port.to_string(),
            });
        }

        if self.sessions.max_sessions == 0 {
            return Err(ConfigError::InvalidValue {
                field: "sessions.max_sessions".to_string(),
                value: self.sessions.max_sessions.to_string(),
            });
        }

        if self.sessions.session_timeout_minutes <= 0 {
            return Err(ConfigError::InvalidValue {
                field: "sessions.session_timeout_minutes".to_string(),
                value: self.sessions.session_timeout_minutes.to_string(),
            });
        }

        if let Err(crate::error::GameError::InvalidSettings { field, value }) = self.game.validate() {
            return Err(ConfigError::InvalidValue {
                field: format!("game.{}", field),
                value,
            });
        }

        Ok(())
    }
}
