//! Connect-N APIサーバーのエントリポイント
//! 設定読み込み、ログ初期化、AIサービス初期化、HTTPサーバー起動を行う。

use std::sync::Arc;
use std::time::Duration;

use connect_x::{
    ai::service::AIServiceFactory,
    api::{handlers::AppState, routes::create_router, service::GameService},
    config::Config,
    session::GameSessionManager,
};
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_PATH: &str = "config.json";

#[tokio::main]
async fn main() {
    if std::env::args().any(|arg| arg == "--generate-config") {
        match Config::default().save_to_file(DEFAULT_CONFIG_PATH) {
            Ok(()) => println!("デフォルト設定を生成しました: {}", DEFAULT_CONFIG_PATH),
            Err(e) => {
                eprintln!("設定ファイル生成失敗: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    // 設定ファイルと環境変数から統合設定を読み込み
    let config = match Config::load().and_then(|config| config.validate().map(|_| config)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("設定エラー: {}", e);
            eprintln!("デフォルト設定を生成: cargo run -- --generate-config");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .init();

    info!(
        host = %config.server.host,
        port = config.server.port,
        rows = config.game.rows,
        columns = config.game.columns,
        win_length = config.game.win_length,
        ai_service = ?config.ai_service.service_type,
        max_sessions = config.sessions.max_sessions,
        "configuration loaded"
    );

    let ai_service = AIServiceFactory::create_service(&config.ai_service);
    match ai_service.health_check().await {
        Ok(status) => info!(service = %status.name, "AI service ready"),
        Err(e) => warn!(error = %e, "AI service unhealthy"),
    }

    let sessions = Arc::new(GameSessionManager::with_timeout(
        config.sessions.max_sessions,
        config.sessions.session_timeout_minutes,
    ));

    if config.sessions.enable_session_cleanup {
        let sessions = Arc::clone(&sessions);
        let interval = Duration::from_secs(config.sessions.cleanup_interval_minutes.max(1) * 60);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let removed = sessions.cleanup_inactive_sessions().await;
                if removed > 0 {
                    info!(removed, "inactive sessions cleaned up");
                }
            }
        });
    }

    let service = GameService::new(sessions, ai_service, config.timing.clone(), config.game.clone());
    let app = create_router(AppState::new(service), config.server.enable_cors);

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    let listener = match TcpListener::bind(&bind_address).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(address = %bind_address, error = %e, "failed to bind address");
            std::process::exit(1);
        }
    };

    info!(address = %bind_address, "Connect-N API server listening");

    if let Err(e) = axum::serve(listener, app).await {
        error!(error = %e, "server error");
        std::process::exit(1);
    }
}
