//! ゲームAPIハンドラー

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::game::GameSettings;
use crate::session::{SessionStats, SessionSummary};

use super::dto::{
    ApiResult, CreateGameRequest, DropRequest, DropResponse, GameResponse, HistoryResponse, UndoResponse,
};
use super::service::GameService;

#[derive(Debug, Clone)]
pub struct AppState {
    pub game_service: Arc<GameService>,
}

impl AppState {
    pub fn new(game_service: GameService) -> Self {
        Self {
            game_service: Arc::new(game_service),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SessionListResponse {
    pub sessions: Vec<SessionSummary>,
    pub total_count: usize,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub ai_service: &'static str,
    pub ai_available: bool,
    pub sessions: SessionStats,
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let ai_service = state.game_service.get_ai_service();
    Json(HealthResponse {
        status: "ok",
        ai_service: ai_service.get_name(),
        ai_available: ai_service.is_available().await,
        sessions: state.game_service.get_service_stats(),
    })
}

pub async fn create_game(
    State(state): State<AppState>,
    request: Option<Json<CreateGameRequest>>,
) -> ApiResult<(StatusCode, Json<GameResponse>)> {
    let settings = request.and_then(|Json(request)| request.settings);
    let response = state.game_service.create_game(settings).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn list_games(State(state): State<AppState>) -> Json<SessionListResponse> {
    let sessions = state.game_service.list_games();
    Json(SessionListResponse {
        total_count: sessions.len(),
        sessions,
    })
}

pub async fn get_game(
    State(state): State<AppState>,
    Path(game_id): Path<Uuid>,
) -> ApiResult<Json<GameResponse>> {
    Ok(Json(state.game_service.get_game(game_id)?))
}

pub async fn delete_game(
    State(state): State<AppState>,
    Path(game_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.game_service.delete_game(game_id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn drop_piece(
    State(state): State<AppState>,
    Path(game_id): Path<Uuid>,
    Json(request): Json<DropRequest>,
) -> ApiResult<Json<DropResponse>> {
    Ok(Json(state.game_service.drop_piece(game_id, request.column).await?))
}

pub async fn undo(
    State(state): State<AppState>,
    Path(game_id): Path<Uuid>,
) -> ApiResult<Json<UndoResponse>> {
    Ok(Json(state.game_service.undo(game_id).await?))
}

pub async fn new_game(
    State(state): State<AppState>,
    Path(game_id): Path<Uuid>,
) -> ApiResult<Json<GameResponse>> {
    Ok(Json(state.game_service.new_game(game_id)?))
}

pub async fn reset_wins(
    State(state): State<AppState>,
    Path(game_id): Path<Uuid>,
) -> ApiResult<Json<GameResponse>> {
    Ok(Json(state.game_service.reset_wins(game_id)?))
}

pub async fn acknowledge_winner(
    State(state): State<AppState>,
    Path(game_id): Path<Uuid>,
) -> ApiResult<Json<GameResponse>> {
    Ok(Json(state.game_service.acknowledge_winner(game_id)?))
}

pub async fn update_settings(
    State(state): State<AppState>,
    Path(game_id): Path<Uuid>,
    Json(settings): Json<GameSettings>,
) -> ApiResult<Json<GameResponse>> {
    Ok(Json(state.game_service.update_settings(game_id, settings)?))
}

pub async fn get_history(
    State(state): State<AppState>,
    Path(game_id): Path<Uuid>,
) -> ApiResult<Json<HistoryResponse>> {
    Ok(Json(state.game_service.get_history(game_id)?))
}
