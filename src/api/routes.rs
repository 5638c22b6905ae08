use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use super::{
    handlers::{self, AppState},
    middleware::{cors, logging},
};

/// ゲームAPIのルーターを作成する
pub fn create_router(state: AppState, enable_cors: bool) -> Router {
    let router = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/games", post(handlers::create_game).get(handlers::list_games))
        .route("/api/games/:id", get(handlers::get_game).delete(handlers::delete_game))
        .route("/api/games/:id/drop", post(handlers::drop_piece))
        .route("/api/games/:id/undo", post(handlers::undo))
        .route("/api/games/:id/new-game", post(handlers::new_game))
        .route("/api/games/:id/reset-wins", post(handlers::reset_wins))
        .route("/api/games/:id/acknowledge-winner", post(handlers::acknowledge_winner))
        .route("/api/games/:id/settings", put(handlers::update_settings))
        .route("/api/games/:id/history", get(handlers::get_history))
        .with_state(state);

    let router = if enable_cors {
        router.layer(middleware::from_fn(cors))
    } else {
        router
    };

    router.layer(middleware::from_fn(logging))
}
