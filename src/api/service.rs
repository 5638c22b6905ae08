//! ゲームAPIサービス
//! セッション上のゲームに対する操作と、落下演出・コンピュータ手番の
//! 時間経過による進行（手番ドライバ）を担当する。

use std::sync::Arc;
use tokio::time::sleep;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::ai::service::AIService;
use crate::config::TimingConfig;
use crate::game::{GameSettings, GameState};
use crate::session::{GameSessionManager, SessionStats, SessionSummary};

use super::dto::{ApiResult, DropResponse, GameResponse, HistoryResponse, UndoResponse};

/// ドライバの1ステップで次に行うこと
enum DriverStep {
    Tick,
    ComputerMove,
    Done,
}

#[derive(Clone)]
pub struct GameService {
    sessions: Arc<GameSessionManager>,
    ai_service: Arc<dyn AIService>,
    timing: TimingConfig,
    default_settings: GameSettings,
}

impl std::fmt::Debug for GameService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameService")
            .field("sessions", &self.sessions)
            .field("ai_service", &self.ai_service.get_name())
            .field("timing", &self.timing)
            .finish()
    }
}

impl GameService {
    pub fn new(
        sessions: Arc<GameSessionManager>,
        ai_service: Arc<dyn AIService>,
        timing: TimingConfig,
        default_settings: GameSettings,
    ) -> Self {
        Self {
            sessions,
            ai_service,
            timing,
            default_settings,
        }
    }

    pub fn sessions(&self) -> &Arc<GameSessionManager> {
        &self.sessions
    }

    pub fn get_ai_service(&self) -> &Arc<dyn AIService> {
        &self.ai_service
    }

    fn snapshot(&self, game_id: Uuid) -> ApiResult<GameResponse> {
        Ok(self
            .sessions
            .with_game(&game_id, |game| GameResponse::from_state(game.state()))?)
    }

    pub async fn create_game(&self, settings: Option<GameSettings>) -> ApiResult<GameResponse> {
        let mut settings = settings.unwrap_or_else(|| self.default_settings.clone());
        settings.reconcile_player_names(settings.vs_computer);

        let game_id = self.sessions.create_session(settings)?;
        self.snapshot(game_id)
    }

    pub fn get_game(&self, game_id: Uuid) -> ApiResult<GameResponse> {
        self.snapshot(game_id)
    }

    pub fn list_games(&self) -> Vec<SessionSummary> {
        self.sessions.list_sessions()
    }

    pub fn delete_game(&self, game_id: Uuid) -> ApiResult<()> {
        Ok(self.sessions.remove_session(&game_id)?)
    }

    pub fn get_history(&self, game_id: Uuid) -> ApiResult<HistoryResponse> {
        let moves = self
            .sessions
            .with_game(&game_id, |game| game.state().history.as_slice().to_vec())?;

        Ok(HistoryResponse {
            game_id,
            total_moves: moves.len(),
            moves,
        })
    }

    /// 人間プレイヤーの着手要求
    /// 受け付けた場合は手番ドライバを起動する
    pub async fn drop_piece(&self, game_id: Uuid, column: usize) -> ApiResult<DropResponse> {
        let accepted = self.sessions.with_game_mut(&game_id, |game| game.request_drop(column))?;
        if accepted {
            debug!(%game_id, column, "drop accepted");
            self.drive(game_id).await;
        }

        Ok(DropResponse {
            accepted,
            game: self.snapshot(game_id)?,
        })
    }

    pub async fn undo(&self, game_id: Uuid) -> ApiResult<UndoResponse> {
        let undone = self.sessions.with_game_mut(&game_id, |game| game.undo())?;
        if !undone.is_empty() {
            self.drive(game_id).await;
        }

        Ok(UndoResponse {
            undone,
            game: self.snapshot(game_id)?,
        })
    }

    pub fn new_game(&self, game_id: Uuid) -> ApiResult<GameResponse> {
        self.sessions.with_game_mut(&game_id, |game| game.new_game())?;
        self.snapshot(game_id)
    }

    pub fn reset_wins(&self, game_id: Uuid) -> ApiResult<GameResponse> {
        self.sessions.with_game_mut(&game_id, |game| game.reset_wins())?;
        self.snapshot(game_id)
    }

    pub fn acknowledge_winner(&self, game_id: Uuid) -> ApiResult<GameResponse> {
        self.sessions.with_game_mut(&game_id, |game| game.acknowledge_winner())?;
        self.snapshot(game_id)
    }

    /// 設定を変更して盤面を作り直す
    /// 不正な設定の場合は現在のゲームを維持してエラーを返す
    pub fn update_settings(&self, game_id: Uuid, mut settings: GameSettings) -> ApiResult<GameResponse> {
        self.sessions.with_game_mut(&game_id, |game| {
            settings.reconcile_player_names(game.settings().vs_computer);
            game.apply_settings(settings)
        })??;
        info!(%game_id, "settings updated");
        self.snapshot(game_id)
    }

    pub async fn cleanup_inactive_sessions(&self) -> usize {
        self.sessions.cleanup_inactive_sessions().await
    }

    pub fn get_service_stats(&self) -> SessionStats {
        self.sessions.get_stats()
    }

    /// 手番ドライバを起動する
    /// 即時モードではこのリクエスト内で完了まで進め、それ以外はバックグラウンドで進める
    async fn drive(&self, game_id: Uuid) {
        let claimed = self
            .sessions
            .with_session_mut(&game_id, |session| !std::mem::replace(&mut session.driving, true))
            .unwrap_or(false);
        if !claimed {
            return;
        }

        if self.timing.is_instant() {
            self.run_driver(game_id).await;
        } else {
            let service = self.clone();
            tokio::spawn(async move { service.run_driver(game_id).await });
        }
    }

    async fn run_driver(&self, game_id: Uuid) {
        loop {
            match self.next_step(game_id) {
                DriverStep::Tick => {
                    if !self.timing.tick_interval.is_zero() {
                        sleep(self.timing.tick_interval).await;
                    }
                    if self.sessions.with_game_mut(&game_id, |game| game.tick()).is_err() {
                        return;
                    }
                }
                DriverStep::ComputerMove => {
                    if !self.timing.computer_move_delay.is_zero() {
                        sleep(self.timing.computer_move_delay).await;
                    }
                    self.play_computer_move(game_id).await;
                }
                DriverStep::Done => return,
            }
        }
    }

    /// 次のステップを決める
    /// 進めるものがなければ同じロック内で動作中フラグを下ろす
    fn next_step(&self, game_id: Uuid) -> DriverStep {
        self.sessions
            .with_session_mut(&game_id, |session| {
                let state = session.game.state();
                if state.is_locked() {
                    DriverStep::Tick
                } else if state.computer_pending {
                    DriverStep::ComputerMove
                } else {
                    session.driving = false;
                    DriverStep::Done
                }
            })
            .unwrap_or(DriverStep::Done)
    }

    async fn play_computer_move(&self, game_id: Uuid) {
        let Ok(state) = self.sessions.with_game(&game_id, |game| game.state().clone()) else {
            return;
        };
        if !state.computer_pending {
            return;
        }

        let result = self.ai_service.calculate_move(&state).await;
        let applied = self.sessions.with_game_mut(&game_id, |game| {
            if is_stale(game.state(), &state) {
                return None;
            }
            match &result {
                Ok(ai_move) if game.computer_drop(ai_move.column) => Some(ai_move.column),
                _ => {
                    game.cancel_computer_move();
                    None
                }
            }
        });

        match (result, applied) {
            (Ok(ai_move), Ok(Some(column))) => {
                debug!(%game_id, column, thinking_time_ms = ai_move.thinking_time_ms, "computer move started");
            }
            (Err(err), _) => warn!(%game_id, error = %err, "computer move failed"),
            _ => {}
        }
    }
}

/// AIの思考中に状態が変わった（アンドゥや新規ゲーム）場合は結果を捨てる
fn is_stale(current: &GameState, snapshot: &GameState) -> bool {
    current.last_updated != snapshot.last_updated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::mock_service::MockAIService;
    use crate::game::Player;
    use std::time::Duration;

    fn instant_service(ai: MockAIService) -> GameService {
        GameService::new(
            Arc::new(GameSessionManager::new(10)),
            Arc::new(ai),
            TimingConfig::instant(),
            GameSettings::default(),
        )
    }

    #[tokio::test]
    async fn test_instant_drop_settles_before_returning() {
        let service = instant_service(MockAIService::new_default());
        let game = service.create_game(None).await.unwrap();

        let response = service.drop_piece(game.game_id, 3).await.unwrap();
        assert!(response.accepted);
        assert!(!response.game.is_locked);
        assert_eq!(response.game.board[5][3], Some(Player::One));
        assert_eq!(response.game.current_player, Player::Two);
    }

    #[tokio::test]
    async fn test_computer_replies_in_instant_mode() {
        let service = instant_service(MockAIService::new_with_fixed_column(6));
        let game = service
            .create_game(Some(GameSettings::default().with_vs_computer(true)))
            .await
            .unwrap();

        let response = service.drop_piece(game.game_id, 0).await.unwrap();
        assert_eq!(response.game.history.len(), 2);
        assert_eq!(response.game.board[5][6], Some(Player::Two));
        assert_eq!(response.game.current_player, Player::One);
        assert!(!response.game.computer_pending);
    }

    #[tokio::test]
    async fn test_ai_failure_cancels_pending_move() {
        let service = instant_service(MockAIService::new_error("boom"));
        let game = service
            .create_game(Some(GameSettings::default().with_vs_computer(true)))
            .await
            .unwrap();

        let response = service.drop_piece(game.game_id, 0).await.unwrap();
        assert_eq!(response.game.history.len(), 1);
        assert!(!response.game.computer_pending);
        assert_eq!(service.get_service_stats().driving, 0);
    }

    #[tokio::test]
    async fn test_timed_drop_runs_in_background() {
        let service = GameService::new(
            Arc::new(GameSessionManager::new(10)),
            Arc::new(MockAIService::new_default()),
            TimingConfig {
                tick_interval: Duration::from_millis(5),
                computer_move_delay: Duration::from_millis(5),
            },
            GameSettings::default(),
        );
        let game = service.create_game(None).await.unwrap();

        let response = service.drop_piece(game.game_id, 2).await.unwrap();
        assert!(response.accepted);
        assert!(response.game.is_locked);

        let rejected = service.drop_piece(game.game_id, 4).await.unwrap();
        assert!(!rejected.accepted);

        tokio::time::sleep(Duration::from_millis(300)).await;
        let settled = service.get_game(game.game_id).unwrap();
        assert!(!settled.is_locked);
        assert_eq!(settled.board[5][2], Some(Player::One));
        assert_eq!(settled.history.len(), 1);
    }

    #[tokio::test]
    async fn test_custom_second_player_name_survives_updates() {
        let service = instant_service(MockAIService::new_default());
        let mut settings = GameSettings::default();
        settings.player_names.two = "Alice".to_string();

        let game = service.create_game(Some(settings.clone())).await.unwrap();
        assert_eq!(game.settings.player_names.two, "Alice");

        let updated = service.update_settings(game.game_id, settings.clone()).unwrap();
        assert_eq!(updated.settings.player_names.two, "Alice");

        settings.vs_computer = true;
        let toggled = service.update_settings(game.game_id, settings).unwrap();
        assert_eq!(toggled.settings.player_names.two, "Bot");
    }

    #[tokio::test]
    async fn test_vs_computer_game_keeps_custom_name() {
        let service = instant_service(MockAIService::new_default());
        let mut settings = GameSettings::default().with_vs_computer(true);
        settings.player_names.two = "HAL".to_string();

        let game = service.create_game(Some(settings.clone())).await.unwrap();
        assert_eq!(game.settings.player_names.two, "HAL");
        let updated = service.update_settings(game.game_id, settings).unwrap();
        assert_eq!(updated.settings.player_names.two, "HAL");
    }

    #[tokio::test]
    async fn test_new_game_discards_slow_computer_move() {
        let service = GameService::new(
            Arc::new(GameSessionManager::new(10)),
            Arc::new(MockAIService::new_slow(150)),
            TimingConfig {
                tick_interval: Duration::from_millis(1),
                computer_move_delay: Duration::from_millis(1),
            },
            GameSettings::default().with_vs_computer(true),
        );
        let game = service.create_game(None).await.unwrap();
        assert!(service.drop_piece(game.game_id, 0).await.unwrap().accepted);

        tokio::time::sleep(Duration::from_millis(60)).await;
        service.new_game(game.game_id).unwrap();

        tokio::time::sleep(Duration::from_millis(300)).await;
        let after = service.get_game(game.game_id).unwrap();
        assert!(after.history.is_empty());
        assert!(!after.computer_pending);
        assert_eq!(service.get_service_stats().driving, 0);
    }

    #[tokio::test]
    async fn test_update_settings_rejects_invalid() {
        let service = instant_service(MockAIService::new_default());
        let game = service.create_game(None).await.unwrap();

        assert!(service.update_settings(game.game_id, GameSettings::new(3, 7, 4)).is_err());
        let updated = service.update_settings(game.game_id, GameSettings::new(8, 9, 5)).unwrap();
        assert_eq!(updated.rows, 8);
        assert_eq!(updated.columns, 9);
    }
}
