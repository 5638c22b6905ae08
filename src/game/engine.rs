//! 着手の検証・適用とアンドゥを担当するモジュール
//! 不正な要求はエラーではなく「何もしない」として扱う。

use super::rules::ConnectRules;
use super::state::GameState;
use super::types::{Move, Player, Position, WinResult};

/// 着手を適用した結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// 勝者が決まった（手番は進まない）
    Won(WinResult),
    /// 手番が相手に移った
    TurnPassed { next_player: Player },
    /// 勝者なしで盤面が埋まった
    BoardFilled,
}

/// 着手処理を提供する構造体
/// スタティックメソッドのみを提供する
pub struct MoveEngine;

impl MoveEngine {
    /// 列への着手要求を検証し、着地する位置を返す
    /// 勝者決定済み、列が範囲外、落下中、列が満杯のいずれかならNone
    pub fn resolve_drop(state: &GameState, column: usize) -> Option<Position> {
        if state.is_finished() {
            return None;
        }

        if column >= state.settings.columns {
            return None;
        }

        if state.is_locked() {
            return None;
        }

        let row = state.board.lowest_empty_row(column)?;
        Some(Position::new(row, column))
    }

    /// 現在のプレイヤーの石を置き、履歴に記録して勝敗を判定する
    /// 位置は resolve_drop で検証済みであること
    pub fn apply_move(state: &mut GameState, position: Position) -> MoveOutcome {
        let player = state.current_player;
        state.board.place(position.row, position.col, player);
        state.history.push(Move::new(position, player));

        if let Some(result) = ConnectRules::evaluate(&state.board, &state.settings, position) {
            state.record_win(result.clone());
            return MoveOutcome::Won(result);
        }

        state.switch_player();

        if state.board.is_full() {
            MoveOutcome::BoardFilled
        } else {
            MoveOutcome::TurnPassed {
                next_player: state.current_player,
            }
        }
    }

    /// 最新の手を取り消す
    /// 履歴が空、または落下中なら何もしない。
    /// 手番は取り消した手のプレイヤーに戻り、勝者は常にクリアされる（勝利数は減らさない）
    pub fn undo(state: &mut GameState) -> Option<Move> {
        if state.is_locked() {
            return None;
        }

        let last = state.history.pop()?;
        state.board.remove(last.position.row, last.position.col);
        state.current_player = last.player;
        state.win = None;
        state.winner_announced = false;
        state.computer_pending = false;
        state.touch();

        Some(last)
    }
}
