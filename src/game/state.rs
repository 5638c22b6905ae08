//! ゲーム状態管理モジュール
//! 盤面、手の履歴、手番、勝敗、勝利数、落下中ロックなど
//! 1セッション分の状態を保持する。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::board::Board;
use super::history::History;
use super::settings::GameSettings;
use super::types::{Player, Position, WinResult, WinTally};
use crate::error::Result;

/// 落下演出の状態機械
/// Idle以外の間は新しい着手を受け付けない
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DropPhase {
    #[default]
    Idle,
    /// 石がcolumn列のrow行を落下中
    Falling {
        column: usize,
        landing_row: usize,
        row: usize,
        player: Player,
    },
    /// 着地して盤面に反映中
    Settled { position: Position },
}

/// ゲームの進行状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    InProgress,
    Won { winner: Player },
    /// 勝者なしで盤面が埋まった
    Draw,
}

/// ゲームの全体状態を保持する構造体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub id: Uuid,
    pub settings: GameSettings,
    pub board: Board,
    pub history: History,
    pub current_player: Player,
    pub win: Option<WinResult>,
    pub wins: WinTally,
    pub drop_phase: DropPhase,
    /// コンピュータの手番が予約されている
    pub computer_pending: bool,
    /// 勝者通知の表示トリガー（描画側が確認後に解除する）
    pub winner_announced: bool,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl GameState {
    /// 新しいゲーム状態を作成する
    /// 設定が不正な場合はここで失敗する
    pub fn new(settings: GameSettings) -> Result<Self> {
        Self::new_with_id(Uuid::new_v4(), settings)
    }

    /// 指定IDで新しいゲーム状態を作成する
    pub fn new_with_id(id: Uuid, settings: GameSettings) -> Result<Self> {
        settings.validate()?;
        let now = Utc::now();

        Ok(Self {
            id,
            board: Board::new(settings.rows, settings.columns),
            settings,
            history: History::new(),
            current_player: Player::One,
            win: None,
            wins: WinTally::default(),
            drop_phase: DropPhase::Idle,
            computer_pending: false,
            winner_announced: false,
            created_at: now,
            last_updated: now,
        })
    }

    pub fn winner(&self) -> Option<Player> {
        self.win.as_ref().map(|win| win.winner)
    }

    /// 強調表示する勝利ライン（勝者がいなければ空）
    pub fn winning_line(&self) -> &[Position] {
        self.win.as_ref().map(|win| win.line.as_slice()).unwrap_or(&[])
    }

    pub fn is_finished(&self) -> bool {
        self.win.is_some()
    }

    /// 落下中で着手を受け付けない状態か
    pub fn is_locked(&self) -> bool {
        !matches!(self.drop_phase, DropPhase::Idle)
    }

    pub fn is_draw(&self) -> bool {
        self.win.is_none() && self.board.is_full()
    }

    pub fn status(&self) -> GameStatus {
        match self.winner() {
            Some(winner) => GameStatus::Won { winner },
            None if self.board.is_full() => GameStatus::Draw,
            None => GameStatus::InProgress,
        }
    }

    /// コンピュータの手番で人間の入力を待たない状態か
    pub fn awaiting_computer(&self) -> bool {
        self.computer_pending || self.settings.is_computer(self.current_player)
    }

    /// 落下中の石の位置とプレイヤー
    pub fn falling_piece(&self) -> Option<(Position, Player)> {
        match self.drop_phase {
            DropPhase::Falling { column, row, player, .. } => Some((Position::new(row, column), player)),
            _ => None,
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.history.is_empty() && !self.is_locked()
    }

    /// 現在のプレイヤーを交代する
    pub fn switch_player(&mut self) {
        self.current_player = self.current_player.opposite();
        self.touch();
    }

    /// 勝者を記録して勝利数を加算する
    /// 手番は勝者のまま進めない
    pub fn record_win(&mut self, result: WinResult) {
        self.wins.increment(result.winner);
        self.win = Some(result);
        self.winner_announced = true;
        self.touch();
    }

    /// 盤面・履歴・手番・勝者を初期化する（勝利数は保持）
    /// 落下中の石と予約済みのコンピュータ手番も取り消す
    pub fn reset_board(&mut self) {
        self.board = Board::new(self.settings.rows, self.settings.columns);
        self.history.clear();
        self.current_player = Player::One;
        self.win = None;
        self.winner_announced = false;
        self.drop_phase = DropPhase::Idle;
        self.computer_pending = false;
        self.touch();
    }

    /// 勝利数のみを0に戻す
    pub fn reset_wins(&mut self) {
        self.wins.reset();
        self.touch();
    }

    pub fn get_move_count(&self) -> usize {
        self.history.len()
    }

    pub(crate) fn touch(&mut self) {
        self.last_updated = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::types::Direction;

    fn sample_win(winner: Player) -> WinResult {
        WinResult {
            winner,
            direction: Direction::Horizontal,
            line: vec![Position::new(5, 0), Position::new(5, 1), Position::new(5, 2)],
        }
    }

    #[test]
    fn test_game_state_new() {
        let game = GameState::new(GameSettings::default()).unwrap();

        assert_eq!(game.current_player, Player::One);
        assert_eq!(game.status(), GameStatus::InProgress);
        assert_eq!(game.get_move_count(), 0);
        assert_eq!(game.wins, WinTally { one: 0, two: 0 });
        assert!(!game.is_locked());
        assert!(game.winning_line().is_empty());
    }

    #[test]
    fn test_game_state_rejects_invalid_settings() {
        assert!(GameState::new(GameSettings::new(0, 0, 4)).is_err());
    }

    #[test]
    fn test_game_state_new_with_id() {
        let custom_id = Uuid::new_v4();
        let game = GameState::new_with_id(custom_id, GameSettings::default()).unwrap();
        assert_eq!(game.id, custom_id);
    }

    #[test]
    fn test_record_win_updates_tally_and_announcement() {
        let mut game = GameState::new(GameSettings::default()).unwrap();
        game.record_win(sample_win(Player::Two));

        assert_eq!(game.winner(), Some(Player::Two));
        assert_eq!(game.status(), GameStatus::Won { winner: Player::Two });
        assert_eq!(game.wins[Player::Two], 1);
        assert!(game.winner_announced);
        assert_eq!(game.winning_line().len(), 3);
    }

    #[test]
    fn test_reset_board_preserves_tally() {
        let mut game = GameState::new(GameSettings::default()).unwrap();
        game.board.place(5, 0, Player::One);
        game.record_win(sample_win(Player::One));
        game.current_player = Player::Two;
        game.drop_phase = DropPhase::Falling { column: 1, landing_row: 5, row: 2, player: Player::Two };

        game.reset_board();

        assert_eq!(game.board.occupied_count(), 0);
        assert_eq!(game.winner(), None);
        assert_eq!(game.current_player, Player::One);
        assert!(!game.is_locked());
        assert!(!game.winner_announced);
        assert_eq!(game.wins[Player::One], 1);
    }

    #[test]
    fn test_falling_piece_reports_position() {
        let mut game = GameState::new(GameSettings::default()).unwrap();
        assert!(game.falling_piece().is_none());

        game.drop_phase = DropPhase::Falling { column: 3, landing_row: 5, row: 2, player: Player::One };
        assert_eq!(game.falling_piece(), Some((Position::new(2, 3), Player::One)));
        assert!(game.is_locked());
        assert!(!game.can_undo());
    }

    #[test]
    fn test_awaiting_computer() {
        let mut game = GameState::new(GameSettings::default().with_vs_computer(true)).unwrap();
        assert!(!game.awaiting_computer());

        game.switch_player();
        assert!(game.awaiting_computer());
    }

    #[test]
    fn test_draw_status_when_board_full() {
        let mut game = GameState::new(GameSettings::new(4, 4, 4)).unwrap();
        for row in 0..4 {
            for col in 0..4 {
                game.board.place(row, col, Player::One);
            }
        }
        assert!(game.is_draw());
        assert_eq!(game.status(), GameStatus::Draw);
    }
}
