//! AIサービスの抽象化層モジュール
//! 異なるAI実装（ローカル、モックなど）を統一した
//! インターフェースで提供し、AIサービスの生成と管理を行う。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::AIError;
use crate::game::GameState;

/// AIの手の計算結果を表す構造体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AIMoveResult {
    /// AIが選択した列
    pub column: usize,
    /// 思考時間（ミリ秒）
    pub thinking_time_ms: u64,
}

/// AIサービスの種類を表すenum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AIServiceType {
    /// ローカルAI実装
    Local,
    /// テスト用のモックAI
    Mock,
}

/// AIサービスの状態情報を表す構造体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AIServiceStatus {
    pub service_type: AIServiceType,
    pub name: String,
    pub available: bool,
    pub last_check: DateTime<Utc>,
    pub average_response_time_ms: Option<u64>,
}

/// AIサービスの統一インターフェース
#[async_trait]
pub trait AIService: Send + Sync {
    /// 指定したゲーム状態で着手する列を計算する
    async fn calculate_move(&self, game_state: &GameState) -> Result<AIMoveResult, AIError>;

    /// サービスが利用可能かチェックする
    async fn is_available(&self) -> bool;

    fn get_name(&self) -> &'static str;

    fn get_service_type(&self) -> AIServiceType;

    /// サービスの健全性チェックを実行し、レスポンス時間も測定する
    async fn health_check(&self) -> Result<AIServiceStatus, AIError> {
        let start_time = std::time::Instant::now();
        let available = self.is_available().await;
        let response_time = start_time.elapsed().as_millis() as u64;

        if available {
            Ok(AIServiceStatus {
                service_type: self.get_service_type(),
                name: self.get_name().to_string(),
                available: true,
                last_check: Utc::now(),
                average_response_time_ms: Some(response_time),
            })
        } else {
            Err(AIError::ServiceUnavailable {
                service_name: self.get_name().to_string(),
                reason: "Service health check failed".to_string(),
            })
        }
    }
}

/// AIサービスの設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AIServiceConfig {
    pub service_type: AIServiceType,
    /// 乱数シード（未指定ならOS乱数で初期化）
    pub seed: Option<u64>,
}

impl Default for AIServiceConfig {
    fn default() -> Self {
        Self {
            service_type: AIServiceType::Local,
            seed: None,
        }
    }
}

/// AIサービスを生成するファクトリ
pub struct AIServiceFactory;

impl AIServiceFactory {
    /// 設定に基づいてAIサービスを生成する
    pub fn create_service(config: &AIServiceConfig) -> Arc<dyn AIService> {
        match config.service_type {
            AIServiceType::Local => {
                use crate::ai::local_service::LocalAIService;
                match config.seed {
                    Some(seed) => Arc::new(LocalAIService::with_seed(seed)),
                    None => Arc::new(LocalAIService::new()),
                }
            }
            AIServiceType::Mock => {
                use crate::ai::mock_service::MockAIService;
                Arc::new(MockAIService::new_default())
            }
        }
    }

    /// デフォルト設定のローカルAIサービスを生成する
    pub fn create_default_local() -> Arc<dyn AIService> {
        Self::create_service(&AIServiceConfig::default())
    }
}
