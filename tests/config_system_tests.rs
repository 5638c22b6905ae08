//! 設定システム統合テスト

use std::sync::{Arc, Mutex};
use std::time::Duration;
use std::{env, fs};
use tempfile::TempDir;

use connect_x::{
    ai::service::{AIServiceConfig, AIServiceFactory, AIServiceType},
    api::{handlers::AppState, routes::create_router, service::GameService},
    config::{Config, ConfigError, ServerConfig, SessionConfig, TimingConfig},
    game::{GameSettings, Player},
    session::GameSessionManager,
};

/// 環境変数はプロセス全体で共有されるため、触るテストは直列化する
static ENV_LOCK: Mutex<()> = Mutex::new(());

const ENV_VARS: &[&str] = &[
    "SERVER_HOST",
    "SERVER_PORT",
    "CONNECT_ROWS",
    "CONNECT_COLUMNS",
    "CONNECT_WIN_LENGTH",
    "CONNECT_VS_COMPUTER",
    "TICK_INTERVAL_MS",
    "COMPUTER_MOVE_DELAY_MS",
    "MAX_SESSIONS",
    "AI_SERVICE_TYPE",
    "AI_SEED",
    "LOG_LEVEL",
];

fn clear_env() {
    for name in ENV_VARS {
        env::remove_var(name);
    }
}

fn create_test_config() -> Config {
    Config {
        server: ServerConfig {
            port: 4000,
            host: "127.0.0.1".to_string(),
            enable_cors: false,
        },
        game: GameSettings::new(8, 9, 5).with_vs_computer(true),
        timing: TimingConfig::instant(),
        sessions: SessionConfig {
            max_sessions: 50,
            session_timeout_minutes: 15,
            enable_session_cleanup: false,
            cleanup_interval_minutes: 10,
        },
        ai_service: AIServiceConfig {
            service_type: AIServiceType::Mock,
            seed: Some(7),
        },
        ..Default::default()
    }
}

#[test]
fn test_config_serialization_deserialization() {
    let config = create_test_config();

    let json_str = serde_json::to_string_pretty(&config).unwrap();
    assert!(json_str.contains("4000"));
    assert!(json_str.contains("Mock"));
    assert!(json_str.contains("\"win_length\": 5"));

    let deserialized: Config = serde_json::from_str(&json_str).unwrap();
    assert_eq!(deserialized, config);
    assert_eq!(deserialized.game.player_names.two, "Bot");
}

#[test]
fn test_config_file_operations() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("test_config.json");

    let original_config = create_test_config();
    original_config.save_to_file(&config_path).unwrap();
    assert!(config_path.exists());

    let loaded_config = Config::from_file(&config_path).unwrap();
    assert_eq!(loaded_config, original_config);
}

#[test]
fn test_partial_config_file_fills_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("partial.json");
    fs::write(
        &config_path,
        r#"{"game": {"rows": 5, "columns": 5, "win_length": 3}, "timing": {"tick_interval": [0, 50000000]}}"#,
    )
    .unwrap();

    let config = Config::from_file(&config_path).unwrap();
    assert_eq!(config.game.rows, 5);
    assert_eq!(config.game.win_length, 3);
    assert_eq!(config.game.directions.len(), 4);
    assert_eq!(config.timing.tick_interval, Duration::from_millis(50));
    assert_eq!(config.timing.computer_move_delay, Duration::from_millis(500));
    assert_eq!(config.server, ServerConfig::default());
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_validation() {
    let mut config = Config::default();
    assert!(config.validate().is_ok());

    config.server.port = 0;
    assert!(config.validate().is_err());

    config.server.port = 3000;
    config.sessions.max_sessions = 0;
    assert!(config.validate().is_err());

    config.sessions.max_sessions = 10;
    config.game.rows = 11;
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidValue { ref field, .. }) if field == "game.rows"
    ));

    config.game.rows = 6;
    config.game.directions = std::iter::empty().collect();
    assert!(config.validate().is_err());
}

#[test]
fn test_config_error_handling() {
    let result = Config::from_file("/nonexistent/path/config.json");
    assert!(matches!(result, Err(ConfigError::FileReadError(_))));

    let temp_dir = TempDir::new().unwrap();
    let invalid_json_path = temp_dir.path().join("invalid.json");
    fs::write(&invalid_json_path, "{ invalid json }").unwrap();

    let result = Config::from_file(&invalid_json_path);
    assert!(matches!(result, Err(ConfigError::ParseError(_))));
}

#[test]
fn test_env_var_config_loading() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();

    env::set_var("SERVER_PORT", "5000");
    env::set_var("SERVER_HOST", "0.0.0.0");
    env::set_var("CONNECT_ROWS", "8");
    env::set_var("CONNECT_COLUMNS", "10");
    env::set_var("CONNECT_WIN_LENGTH", "5");
    env::set_var("CONNECT_VS_COMPUTER", "true");
    env::set_var("TICK_INTERVAL_MS", "0");
    env::set_var("COMPUTER_MOVE_DELAY_MS", "250");
    env::set_var("MAX_SESSIONS", "20");
    env::set_var("AI_SERVICE_TYPE", "mock");
    env::set_var("AI_SEED", "42");
    env::set_var("LOG_LEVEL", "debug");

    let config = Config::from_env();
    clear_env();
    let config = config.unwrap();

    assert_eq!(config.server.port, 5000);
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!((config.game.rows, config.game.columns, config.game.win_length), (8, 10, 5));
    assert!(config.game.vs_computer);
    assert_eq!(config.game.player_names.get(Player::Two), "Bot");
    assert_eq!(config.timing.tick_interval, Duration::ZERO);
    assert_eq!(config.timing.computer_move_delay, Duration::from_millis(250));
    assert_eq!(config.sessions.max_sessions, 20);
    assert_eq!(config.ai_service.service_type, AIServiceType::Mock);
    assert_eq!(config.ai_service.seed, Some(42));
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn test_invalid_env_vars() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();

    env::set_var("SERVER_PORT", "invalid_port");
    let result = Config::from_env();
    clear_env();

    match result {
        Err(ConfigError::EnvVarError { name, value }) => {
            assert_eq!(name, "SERVER_PORT");
            assert_eq!(value, "invalid_port");
        }
        other => panic!("unexpected result: {:?}", other),
    }

    env::set_var("AI_SERVICE_TYPE", "remote");
    let result = Config::from_env();
    clear_env();
    assert!(matches!(result, Err(ConfigError::EnvVarError { .. })));
}

#[test]
fn test_env_overrides_only_what_it_sets() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();

    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("app.json");
    create_test_config().save_to_file(&config_path).unwrap();

    let mut config = Config::from_file(&config_path).unwrap();
    env::set_var("SERVER_PORT", "7000");
    let result = config.apply_env();
    clear_env();
    result.unwrap();

    assert_eq!(config.server.port, 7000);
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.game.rows, 8);
    assert_eq!(config.sessions.max_sessions, 50);
    assert_eq!(config.ai_service.service_type, AIServiceType::Mock);
}

#[tokio::test]
async fn test_router_from_config() {
    let config = create_test_config();
    let ai_service = AIServiceFactory::create_service(&config.ai_service);
    assert_eq!(ai_service.get_service_type(), AIServiceType::Mock);
    assert!(ai_service.health_check().await.is_ok());

    let sessions = Arc::new(GameSessionManager::with_timeout(
        config.sessions.max_sessions,
        config.sessions.session_timeout_minutes,
    ));
    let service = GameService::new(sessions, ai_service, config.timing.clone(), config.game.clone());

    let game = service.create_game(None).await.unwrap();
    assert_eq!(game.rows, 8);
    assert_eq!(game.columns, 9);
    assert!(game.settings.vs_computer);

    let _router = create_router(AppState::new(service), config.server.enable_cors);
}
