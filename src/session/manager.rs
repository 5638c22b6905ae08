//! ゲームセッション管理モジュール
//! 同時に進行するゲームのセッションを管理し、
//! セッション数制限、タイムアウト処理、クリーンアップを担当する。

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{GameError, Result};
use crate::game::{ConnectGame, GameSettings, GameStatus, TracingObserver};

/// 1ゲーム分のセッション
#[derive(Debug)]
pub struct GameSession {
    pub id: Uuid,
    pub game: ConnectGame,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    /// 手番進行タスクが動作中か
    pub driving: bool,
}

impl GameSession {
    fn new(game: ConnectGame) -> Self {
        let now = Utc::now();
        Self {
            id: game.id(),
            game,
            created_at: now,
            last_activity: now,
            driving: false,
        }
    }

    pub fn touch(&mut self) {
        self.last_activity = Utc::now();
    }
}

/// セッション一覧用の概要
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub game_id: Uuid,
    pub status: GameStatus,
    pub rows: usize,
    pub columns: usize,
    pub win_length: usize,
    pub vs_computer: bool,
    pub move_count: usize,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

impl SessionSummary {
    pub fn from_session(session: &GameSession) -> Self {
        let state = session.game.state();
        Self {
            game_id: session.id,
            status: state.status(),
            rows: state.settings.rows,
            columns: state.settings.columns,
            win_length: state.settings.win_length,
            vs_computer: state.settings.vs_computer,
            move_count: state.get_move_count(),
            created_at: session.created_at,
            last_activity: session.last_activity,
        }
    }
}

/// ゲームセッションの管理を行うメイン構造体
/// スレッドセーフなDashMapで同時アクセスを処理
#[derive(Debug, Clone)]
pub struct GameSessionManager {
    sessions: Arc<DashMap<Uuid, GameSession>>,
    /// 同時存在可能な最大セッション数
    max_sessions: usize,
    /// セッションのタイムアウト時間（分）
    session_timeout_minutes: i64,
}

impl GameSessionManager {
    /// デフォルトタイムアウト（30分）でセッションマネージャーを作成
    pub fn new(max_sessions: usize) -> Self {
        Self::with_timeout(max_sessions, 30)
    }

    pub fn with_timeout(max_sessions: usize, timeout_minutes: i64) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            max_sessions,
            session_timeout_minutes: timeout_minutes,
        }
    }

    /// 新しいゲームセッションを作成する
    /// 最大セッション数に達している場合や設定が不正な場合はエラー
    pub fn create_session(&self, settings: GameSettings) -> Result<Uuid> {
        if self.sessions.len() >= self.max_sessions {
            return Err(GameError::SessionLimitExceeded { max: self.max_sessions });
        }

        let mut game = ConnectGame::new(settings)?;
        let session_id = game.id();
        game.subscribe(Arc::new(TracingObserver::new(session_id)));

        self.sessions.insert(session_id, GameSession::new(game));
        info!(%session_id, total = self.sessions.len(), "game session created");

        Ok(session_id)
    }

    /// セッションのゲームを参照して値を取り出す
    pub fn with_game<R>(&self, session_id: &Uuid, f: impl FnOnce(&ConnectGame) -> R) -> Result<R> {
        self.sessions
            .get(session_id)
            .map(|session| f(&session.game))
            .ok_or(GameError::GameNotFound { game_id: *session_id })
    }

    /// セッションのゲームを操作する（最終操作時刻も更新）
    pub fn with_game_mut<R>(&self, session_id: &Uuid, f: impl FnOnce(&mut ConnectGame) -> R) -> Result<R> {
        self.with_session_mut(session_id, |session| f(&mut session.game))
    }

    pub fn with_session_mut<R>(&self, session_id: &Uuid, f: impl FnOnce(&mut GameSession) -> R) -> Result<R> {
        match self.sessions.get_mut(session_id) {
            Some(mut session) => {
                session.touch();
                Ok(f(session.value_mut()))
            }
            None => Err(GameError::GameNotFound { game_id: *session_id }),
        }
    }

    pub fn remove_session(&self, session_id: &Uuid) -> Result<()> {
        match self.sessions.remove(session_id) {
            Some(_) => {
                info!(%session_id, "game session removed");
                Ok(())
            }
            None => Err(GameError::GameNotFound { game_id: *session_id }),
        }
    }

    pub fn list_sessions(&self) -> Vec<SessionSummary> {
        self.sessions
            .iter()
            .map(|entry| SessionSummary::from_session(entry.value()))
            .collect()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn session_exists(&self, session_id: &Uuid) -> bool {
        self.sessions.contains_key(session_id)
    }

    /// タイムアウトしたセッションを削除し、削除数を返す
    pub async fn cleanup_inactive_sessions(&self) -> usize {
        let cutoff_time = Utc::now() - Duration::minutes(self.session_timeout_minutes);

        let expired_ids: Vec<Uuid> = self
            .sessions
            .iter()
            .filter(|entry| entry.value().last_activity < cutoff_time)
            .map(|entry| *entry.key())
            .collect();

        let mut removed_count = 0;
        for session_id in expired_ids {
            if self.sessions.remove(&session_id).is_some() {
                debug!(%session_id, "inactive session expired");
                removed_count += 1;
            }
        }

        removed_count
    }

    pub fn get_stats(&self) -> SessionStats {
        let mut stats = SessionStats {
            total_sessions: self.sessions.len(),
            max_sessions: self.max_sessions,
            ..SessionStats::default()
        };

        for entry in self.sessions.iter() {
            match entry.value().game.state().status() {
                GameStatus::InProgress => stats.in_progress += 1,
                GameStatus::Won { .. } => stats.won += 1,
                GameStatus::Draw => stats.drawn += 1,
            }
            if entry.value().driving {
                stats.driving += 1;
            }
        }

        stats
    }
}

impl Default for GameSessionManager {
    fn default() -> Self {
        Self::new(100)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    pub total_sessions: usize,
    pub max_sessions: usize,
    pub in_progress: usize,
    pub won: usize,
    pub drawn: usize,
    /// 落下やコンピュータ手番の進行中
    pub driving: usize,
}
