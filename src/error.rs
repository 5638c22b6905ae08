//! アプリケーション全体のエラー定義モジュール
//! 設定検証、セッション管理、AIサービスのエラーを統一管理。
//! 着手・アンドゥなどのゲーム操作はエラーを返さず、不正な要求は無視される。

use thiserror::Error;
use uuid::Uuid;

/// ゲームの構築とセッション管理に関連するエラー
#[derive(Debug, Error)]
pub enum GameError {
    #[error("Invalid settings: {field} = {value}")]
    InvalidSettings { field: String, value: String },

    #[error("Game not found: {game_id}")]
    GameNotFound { game_id: Uuid },

    #[error("Session limit exceeded (max: {max})")]
    SessionLimitExceeded { max: usize },

    #[error("AI calculation failed: {source}")]
    AIError {
        #[from]
        source: AIError,
    },
}

impl GameError {
    /// 設定値エラーを作成するヘルパー
    pub fn invalid_settings(field: impl Into<String>, value: impl ToString) -> Self {
        GameError::InvalidSettings {
            field: field.into(),
            value: value.to_string(),
        }
    }
}

/// AIサービスに関連するエラー
#[derive(Debug, Error)]
pub enum AIError {
    #[error("No valid moves available")]
    NoValidMoves,

    #[error("AI strategy error: {message}")]
    StrategyError { message: String },

    #[error("AI service unavailable: {service_name} - {reason}")]
    ServiceUnavailable {
        service_name: String,
        reason: String,
    },
}

/// ゲームエラーをベースとした結果型
pub type Result<T> = std::result::Result<T, GameError>;
