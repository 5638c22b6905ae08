//! 落下演出の手番進行を管理するモジュール
//! Idle → Falling → Settled の状態機械を外部からのtickで1行ずつ進める。
//! タイマーは持たず、時間の管理は呼び出し側が行う。

use super::engine::{MoveEngine, MoveOutcome};
use super::state::{DropPhase, GameState};
use super::types::{Move, Position};

/// 着手要求の発生元
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropSource {
    Human,
    Computer,
}

/// tickを1回進めた結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// 落下中の石がない
    Idle,
    /// 石が1行下に進んだ
    Falling { position: Position },
    /// 着地して盤面に反映された
    Settled { game_move: Move, outcome: MoveOutcome },
}

/// 手番進行の状態機械
/// スタティックメソッドのみを提供する
pub struct TurnScheduler;

impl TurnScheduler {
    /// 着手要求を受け付けて落下を開始する
    /// 受け付けた場合は着地予定の位置を返す。それ以外は何もしない
    pub fn request_drop(state: &mut GameState, column: usize, source: DropSource) -> Option<Position> {
        match source {
            DropSource::Human if state.awaiting_computer() => return None,
            DropSource::Computer if !state.computer_pending => return None,
            _ => {}
        }

        let landing = MoveEngine::resolve_drop(state, column)?;

        if source == DropSource::Computer {
            state.computer_pending = false;
        }

        state.drop_phase = DropPhase::Falling {
            column,
            landing_row: landing.row,
            row: 0,
            player: state.current_player,
        };
        state.touch();

        Some(landing)
    }

    /// 状態機械を1段階進める
    /// 着地行に達した次のtickで着手を適用し、ロックを解除する
    pub fn tick(state: &mut GameState) -> TickOutcome {
        let (column, landing_row, row) = match state.drop_phase {
            DropPhase::Falling { column, landing_row, row, .. } => (column, landing_row, row),
            DropPhase::Idle | DropPhase::Settled { .. } => return TickOutcome::Idle,
        };

        if row < landing_row {
            let next = row + 1;
            if let DropPhase::Falling { row, .. } = &mut state.drop_phase {
                *row = next;
            }
            return TickOutcome::Falling {
                position: Position::new(next, column),
            };
        }

        let position = Position::new(landing_row, column);
        let player = state.current_player;
        state.drop_phase = DropPhase::Settled { position };
        let outcome = MoveEngine::apply_move(state, position);
        state.drop_phase = DropPhase::Idle;
        Self::schedule_computer(state);

        TickOutcome::Settled {
            game_move: Move::new(position, player),
            outcome,
        }
    }

    /// コンピュータの手番であれば次の手を予約する
    /// 予約された場合はtrueを返す
    pub fn schedule_computer(state: &mut GameState) -> bool {
        let should_schedule = !state.is_finished()
            && !state.is_locked()
            && !state.board.is_full()
            && state.settings.is_computer(state.current_player);

        state.computer_pending = should_schedule;
        should_schedule
    }

    /// 予約済みのコンピュータ手番を取り消す
    pub fn cancel_computer(state: &mut GameState) {
        state.computer_pending = false;
    }
}
