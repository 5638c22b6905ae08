//! 状態変化の通知モジュール
//! ゲームは状態遷移のたびにGameEventを発行し、登録されたオブザーバーに配信する。
//! 特定のUIフレームワークには依存しない。

use serde::Serialize;
use std::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use super::types::{Move, Player, Position, WinResult, WinTally};

/// ゲームの状態遷移イベント
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum GameEvent {
    DropStarted { column: usize, landing: Position, player: Player },
    PieceFalling { position: Position, player: Player },
    MoveApplied { game_move: Move },
    TurnChanged { player: Player },
    GameWon { result: WinResult, wins: WinTally },
    BoardFilled,
    ComputerMoveScheduled,
    ComputerMoveCancelled,
    MoveUndone { game_move: Move },
    NewGame,
    WinsReset,
    SettingsChanged,
    WinnerAcknowledged,
}

/// 状態変化を受け取るオブザーバー
pub trait GameObserver: Send + Sync {
    fn on_event(&self, event: &GameEvent);
}

/// 受け取ったイベントを順に記録するオブザーバー
#[derive(Debug, Default)]
pub struct EventLog {
    events: Mutex<Vec<GameEvent>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// 記録済みイベントのコピーを返す
    pub fn events(&self) -> Vec<GameEvent> {
        self.events.lock().map(|events| events.clone()).unwrap_or_default()
    }

    /// 記録済みイベントを取り出して空にする
    pub fn drain(&self) -> Vec<GameEvent> {
        self.events
            .lock()
            .map(|mut events| std::mem::take(&mut *events))
            .unwrap_or_default()
    }
}

impl GameObserver for EventLog {
    fn on_event(&self, event: &GameEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

/// イベントをtracingのログに出力するオブザーバー
#[derive(Debug, Clone)]
pub struct TracingObserver {
    game_id: Uuid,
}

impl TracingObserver {
    pub fn new(game_id: Uuid) -> Self {
        Self { game_id }
    }
}

impl GameObserver for TracingObserver {
    fn on_event(&self, event: &GameEvent) {
        debug!(game_id = %self.game_id, ?event, "game event");
    }
}
