//! ゲームAPI データ転送オブジェクト (DTO)

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::GameError;
use crate::game::{GameSettings, GameState, GameStatus, Move, Player, Position, WinTally};

/// 描画に必要なゲーム状態のスナップショット
/// boardは行0が最上段
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameResponse {
    pub game_id: Uuid,
    pub board: Vec<Vec<Option<Player>>>,
    pub rows: usize,
    pub columns: usize,
    pub current_player: Player,
    pub current_player_name: String,
    pub winner: Option<Player>,
    pub winning_line: Vec<Position>,
    pub wins: WinTally,
    pub history: Vec<Move>,
    pub can_undo: bool,
    pub is_locked: bool,
    pub falling_piece: Option<FallingPiece>,
    pub winner_announced: bool,
    pub computer_pending: bool,
    pub status: GameStatus,
    pub settings: GameSettings,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallingPiece {
    pub position: Position,
    pub player: Player,
}

impl GameResponse {
    pub fn from_state(state: &GameState) -> Self {
        Self {
            game_id: state.id,
            board: state.board.to_rows(),
            rows: state.board.rows(),
            columns: state.board.columns(),
            current_player: state.current_player,
            current_player_name: state.settings.player_names.get(state.current_player).to_string(),
            winner: state.winner(),
            winning_line: state.winning_line().to_vec(),
            wins: state.wins,
            history: state.history.as_slice().to_vec(),
            can_undo: state.can_undo(),
            is_locked: state.is_locked(),
            falling_piece: state
                .falling_piece()
                .map(|(position, player)| FallingPiece { position, player }),
            winner_announced: state.winner_announced,
            computer_pending: state.computer_pending,
            status: state.status(),
            settings: state.settings.clone(),
            last_updated: state.last_updated,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateGameRequest {
    /// 未指定ならサーバーの既定設定
    #[serde(default)]
    pub settings: Option<GameSettings>,
}

#[derive(Debug, Deserialize)]
pub struct DropRequest {
    pub column: usize,
}

/// 着手要求の結果
/// 不正・タイミング外の要求はaccepted=falseで状態はそのまま
#[derive(Debug, Serialize, Deserialize)]
pub struct DropResponse {
    pub accepted: bool,
    pub game: GameResponse,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UndoResponse {
    pub undone: Vec<Move>,
    pub game: GameResponse,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub game_id: Uuid,
    pub moves: Vec<Move>,
    pub total_moves: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub error_code: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            timestamp: Utc::now(),
            error_code: None,
        }
    }

    pub fn with_code(error: impl Into<String>, message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            timestamp: Utc::now(),
            error_code: Some(code.into()),
        }
    }
}

/// HTTPレイヤーのエラー
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("ゲームセッションが見つかりません: {game_id}")]
    GameNotFound { game_id: Uuid },

    #[error("セッション制限に達しています (最大: {max})")]
    MaxSessionsReached { max: usize },

    #[error("無効な設定です: {field} = {value}")]
    InvalidSettings { field: String, value: String },

    #[error("無効なリクエストです: {details}")]
    BadRequest { details: String },

    #[error("AIエラー: {0}")]
    AIError(#[from] crate::error::AIError),
}

impl From<GameError> for ApiError {
    fn from(err: GameError) -> Self {
        match err {
            GameError::GameNotFound { game_id } => ApiError::GameNotFound { game_id },
            GameError::SessionLimitExceeded { max } => ApiError::MaxSessionsReached { max },
            GameError::InvalidSettings { field, value } => ApiError::InvalidSettings { field, value },
            GameError::AIError { source } => ApiError::AIError(source),
        }
    }
}

impl ApiError {
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::GameNotFound { .. } => "GAME_NOT_FOUND",
            ApiError::MaxSessionsReached { .. } => "MAX_SESSIONS_REACHED",
            ApiError::InvalidSettings { .. } => "INVALID_SETTINGS",
            ApiError::BadRequest { .. } => "BAD_REQUEST",
            ApiError::AIError(_) => "AI_ERROR",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::GameNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::MaxSessionsReached { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::InvalidSettings { .. } => StatusCode::BAD_REQUEST,
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::AIError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse::with_code(self.error_code(), self.to_string(), self.error_code());
        (self.status_code(), Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
