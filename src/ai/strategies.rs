//! AI戦略の実装モジュール
//! 盤面から着手する列を選ぶ戦略を定義する。

use rand::seq::IndexedRandom;
use rand::RngCore;

use crate::error::AIError;
use crate::game::Board;

/// AI戦略の共通インターフェース
/// 異なるAI実装を統一して扱うためのtrait
pub trait AIStrategy: Send + Sync {
    /// 盤面から着手する列を選ぶ
    /// 置ける列がない場合はNoValidMoves
    fn choose_column(&self, board: &Board, rng: &mut dyn RngCore) -> Result<usize, AIError>;
    /// AIの名前を返す
    fn get_name(&self) -> &'static str;
}

/// 満杯でない列から一様ランダムに選ぶAI
#[derive(Debug, Clone, Default)]
pub struct RandomAI;

impl RandomAI {
    pub fn new() -> Self {
        RandomAI
    }
}

impl AIStrategy for RandomAI {
    fn choose_column(&self, board: &Board, rng: &mut dyn RngCore) -> Result<usize, AIError> {
        board
            .available_columns()
            .choose(rng)
            .copied()
            .ok_or(AIError::NoValidMoves)
    }

    fn get_name(&self) -> &'static str {
        "RandomAI"
    }
}
