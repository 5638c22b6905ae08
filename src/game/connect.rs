//! コネクトゲーム本体モジュール
//! 状態、着手処理、手番進行、オブザーバー通知をまとめ、
//! 外部（UIやAPI）からの操作をすべてここで受け付ける。

use rand::RngCore;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

use super::engine::{MoveEngine, MoveOutcome};
use super::observer::{GameEvent, GameObserver};
use super::scheduler::{DropSource, TickOutcome, TurnScheduler};
use super::settings::GameSettings;
use super::state::GameState;
use super::types::Move;
use crate::ai::strategies::AIStrategy;
use crate::error::Result;

/// 1セッション分のコネクトゲーム
/// 不正・タイミング外の操作はすべて何もせずに無視される
pub struct ConnectGame {
    state: GameState,
    observers: Vec<Arc<dyn GameObserver>>,
}

impl fmt::Debug for ConnectGame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectGame")
            .field("state", &self.state)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl ConnectGame {
    /// 設定を検証して新しいゲームを作成する
    pub fn new(settings: GameSettings) -> Result<Self> {
        Ok(Self {
            state: GameState::new(settings)?,
            observers: Vec::new(),
        })
    }

    pub fn with_id(id: Uuid, settings: GameSettings) -> Result<Self> {
        Ok(Self {
            state: GameState::new_with_id(id, settings)?,
            observers: Vec::new(),
        })
    }

    pub fn id(&self) -> Uuid {
        self.state.id
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn settings(&self) -> &GameSettings {
        &self.state.settings
    }

    /// オブザーバーを登録する
    pub fn subscribe(&mut self, observer: Arc<dyn GameObserver>) {
        self.observers.push(observer);
    }

    fn emit(&self, event: GameEvent) {
        for observer in &self.observers {
            observer.on_event(&event);
        }
    }

    /// 人間プレイヤーの着手要求
    /// 受け付けられた場合はtrue（石は落下を開始する）
    pub fn request_drop(&mut self, column: usize) -> bool {
        self.start_drop(column, DropSource::Human)
    }

    /// コンピュータの着手要求（予約済みの手番でのみ受け付ける）
    pub fn computer_drop(&mut self, column: usize) -> bool {
        self.start_drop(column, DropSource::Computer)
    }

    fn start_drop(&mut self, column: usize, source: DropSource) -> bool {
        let player = self.state.current_player;
        match TurnScheduler::request_drop(&mut self.state, column, source) {
            Some(landing) => {
                self.emit(GameEvent::DropStarted { column, landing, player });
                true
            }
            None => false,
        }
    }

    /// 落下を1段階進める
    pub fn tick(&mut self) -> TickOutcome {
        let falling_player = self.state.current_player;
        let outcome = TurnScheduler::tick(&mut self.state);

        match &outcome {
            TickOutcome::Idle => {}
            TickOutcome::Falling { position } => {
                self.emit(GameEvent::PieceFalling {
                    position: *position,
                    player: falling_player,
                });
            }
            TickOutcome::Settled { game_move, outcome } => {
                self.emit(GameEvent::MoveApplied { game_move: *game_move });
                match outcome {
                    MoveOutcome::Won(result) => self.emit(GameEvent::GameWon {
                        result: result.clone(),
                        wins: self.state.wins,
                    }),
                    MoveOutcome::TurnPassed { next_player } => {
                        self.emit(GameEvent::TurnChanged { player: *next_player })
                    }
                    MoveOutcome::BoardFilled => {
                        self.emit(GameEvent::TurnChanged { player: self.state.current_player });
                        self.emit(GameEvent::BoardFilled);
                    }
                }
                if self.state.computer_pending {
                    self.emit(GameEvent::ComputerMoveScheduled);
                }
            }
        }

        outcome
    }

    /// 落下中の石が着地するまでtickを進める
    pub fn settle(&mut self) -> Option<MoveOutcome> {
        loop {
            match self.tick() {
                TickOutcome::Idle => return None,
                TickOutcome::Falling { .. } => continue,
                TickOutcome::Settled { outcome, .. } => return Some(outcome),
            }
        }
    }

    /// 着手要求から着地までを同期的に行う
    pub fn drop_piece(&mut self, column: usize) -> Option<MoveOutcome> {
        if !self.request_drop(column) {
            return None;
        }
        self.settle()
    }

    /// 予約済みのコンピュータ手番をAI戦略で実行する
    /// 置ける列がない場合は予約を取り消して何もしない
    pub fn play_computer_move(&mut self, strategy: &dyn AIStrategy, rng: &mut dyn RngCore) -> Option<usize> {
        if !self.state.computer_pending || self.state.is_locked() {
            return None;
        }

        if let Ok(column) = strategy.choose_column(&self.state.board, rng) {
            if self.computer_drop(column) {
                return Some(column);
            }
        }

        self.cancel_computer_move();
        None
    }

    /// 予約済みのコンピュータ手番を取り消す
    pub fn cancel_computer_move(&mut self) {
        if self.state.computer_pending {
            TurnScheduler::cancel_computer(&mut self.state);
            self.emit(GameEvent::ComputerMoveCancelled);
        }
    }

    /// 直前の手を取り消す
    /// コンピュータ対戦でコンピュータの手を取り消した場合は、
    /// 人間の手番に戻るまでもう1手取り消す
    pub fn undo(&mut self) -> Vec<Move> {
        let mut undone = Vec::new();

        while let Some(game_move) = MoveEngine::undo(&mut self.state) {
            self.emit(GameEvent::MoveUndone { game_move });
            undone.push(game_move);
            if !self.state.settings.is_computer(game_move.player) {
                break;
            }
        }

        if !undone.is_empty() {
            self.emit(GameEvent::TurnChanged { player: self.state.current_player });
            if TurnScheduler::schedule_computer(&mut self.state) {
                self.emit(GameEvent::ComputerMoveScheduled);
            }
        }

        undone
    }

    /// 新しいゲームを開始する（勝利数は保持）
    /// 落下中の石と予約済みのコンピュータ手番は取り消される
    pub fn new_game(&mut self) {
        self.state.reset_board();
        self.emit(GameEvent::NewGame);
    }

    /// 勝利数のみを0に戻す
    pub fn reset_wins(&mut self) {
        self.state.reset_wins();
        self.emit(GameEvent::WinsReset);
    }

    /// 設定を変更して盤面を作り直す
    /// 不正な設定の場合は現在のゲームをそのまま維持する
    pub fn apply_settings(&mut self, settings: GameSettings) -> Result<()> {
        settings.validate()?;
        self.state.settings = settings;
        self.state.reset_board();
        self.emit(GameEvent::SettingsChanged);
        self.emit(GameEvent::NewGame);
        Ok(())
    }

    /// 勝者通知を表示済みにする
    pub fn acknowledge_winner(&mut self) {
        if self.state.winner_announced {
            self.state.winner_announced = false;
            self.emit(GameEvent::WinnerAcknowledged);
        }
    }
}
