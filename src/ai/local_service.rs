use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Mutex;
use std::time::Instant;

use crate::error::AIError;
use crate::game::GameState;

use super::service::{AIMoveResult, AIService, AIServiceType};
use super::strategies::{AIStrategy, RandomAI};

/// プロセス内でRandomAIを実行するAIサービス
/// 思考時間の演出は手番スケジューラ側の遅延で行う
#[derive(Debug)]
pub struct LocalAIService {
    strategy: RandomAI,
    rng: Mutex<StdRng>,
}

impl LocalAIService {
    pub fn new() -> Self {
        Self {
            strategy: RandomAI::new(),
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// 再現可能な乱数列で作成する
    pub fn with_seed(seed: u64) -> Self {
        Self {
            strategy: RandomAI::new(),
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for LocalAIService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AIService for LocalAIService {
    async fn calculate_move(&self, game_state: &GameState) -> Result<AIMoveResult, AIError> {
        let start_time = Instant::now();

        if game_state.is_finished() {
            return Err(AIError::StrategyError {
                message: "Cannot calculate move for finished game".to_string(),
            });
        }

        let column = {
            let mut rng = self.rng.lock().map_err(|_| AIError::StrategyError {
                message: "random number generator lock poisoned".to_string(),
            })?;
            self.strategy.choose_column(&game_state.board, &mut *rng)?
        };

        Ok(AIMoveResult {
            column,
            thinking_time_ms: start_time.elapsed().as_millis() as u64,
        })
    }

    async fn is_available(&self) -> bool {
        true
    }

    fn get_name(&self) -> &'static str {
        "LocalAIService"
    }

    fn get_service_type(&self) -> AIServiceType {
        AIServiceType::Local
    }
}
