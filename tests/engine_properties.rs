//! プロパティベーステストモジュール
//! ランダムな盤面サイズと着手列でゲームエンジンの不変条件を検証する。

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use connect_x::{
    ai::strategies::{AIStrategy, RandomAI},
    error::AIError,
    game::{
        Board, Cell, ConnectGame, Direction, DirectionSet, GameSettings, MoveOutcome, Player,
        WinningLineMode,
    },
};

/// 有効な設定を生成する戦略
fn settings_strategy() -> impl Strategy<Value = GameSettings> {
    (4usize..=10, 4usize..=10, 3usize..=10, 1u8..16, prop::bool::ANY).prop_map(
        |(rows, columns, win_length, mask, contiguous)| {
            let directions: DirectionSet = Direction::ALL
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, direction)| *direction)
                .collect();
            let line_mode = if contiguous {
                WinningLineMode::Contiguous
            } else {
                WinningLineMode::Anchored
            };
            GameSettings::new(rows, columns, win_length)
                .with_directions(directions)
                .with_line_mode(line_mode)
        },
    )
}

/// 範囲外の列も含む着手列を生成する戦略
fn column_sequence_strategy() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(0usize..12, 0..80)
}

/// 重力の不変条件: 石の下のマスは必ず埋まっている
fn assert_gravity(board: &Board) {
    for col in 0..board.columns() {
        for row in 0..board.rows() - 1 {
            if !board.cell(row, col).is_empty() {
                assert!(
                    !board.cell(row + 1, col).is_empty(),
                    "floating piece at ({}, {})",
                    row,
                    col
                );
            }
        }
    }
}

proptest! {
    /// 履歴の長さは盤上の石の数と常に一致し、石は浮かない
    #[test]
    fn test_history_matches_board(settings in settings_strategy(), columns in column_sequence_strategy()) {
        let mut game = ConnectGame::new(settings).unwrap();

        for column in columns {
            game.drop_piece(column);
            let state = game.state();
            prop_assert_eq!(state.history.len(), state.board.occupied_count());
            assert_gravity(&state.board);

            let (one, two) = state.board.count_pieces();
            prop_assert!(one == two || one == two + 1);
        }
    }

    /// 成功した着手は履歴を1増やし、着地したマスは着手したプレイヤーの石になる
    #[test]
    fn test_successful_drop_records_move(settings in settings_strategy(), columns in column_sequence_strategy()) {
        let mut game = ConnectGame::new(settings).unwrap();

        for column in columns {
            let before = game.state().history.len();
            let player = game.state().current_player;

            match game.drop_piece(column) {
                Some(_) => {
                    let state = game.state();
                    prop_assert_eq!(state.history.len(), before + 1);
                    let last = *state.history.last().unwrap();
                    prop_assert_eq!(last.player, player);
                    prop_assert_eq!(last.position.col, column);
                    prop_assert_eq!(state.board.get_cell(last.position), Some(Cell::Occupied(player)));
                }
                None => prop_assert_eq!(game.state().history.len(), before),
            }
        }
    }

    /// 着手直後のアンドゥで盤面・手番・勝者が着手前に戻る
    #[test]
    fn test_undo_restores_prior_state(settings in settings_strategy(), columns in column_sequence_strategy(), last in 0usize..10) {
        let mut game = ConnectGame::new(settings).unwrap();
        for column in columns {
            game.drop_piece(column);
        }

        let board_before = game.state().board.clone();
        let player_before = game.state().current_player;
        let winner_before = game.state().winner();
        let history_before = game.state().history.len();

        if game.drop_piece(last).is_some() {
            let undone = game.undo();
            prop_assert_eq!(undone.len(), 1);

            let state = game.state();
            prop_assert_eq!(&state.board, &board_before);
            prop_assert_eq!(state.current_player, player_before);
            prop_assert_eq!(state.winner(), winner_before);
            prop_assert_eq!(state.winner(), None);
            prop_assert_eq!(state.history.len(), history_before);
        }
    }

    /// 勝利ラインはwin_length個以下の盤内マスで、Contiguousなら全て勝者の石
    #[test]
    fn test_winning_line_shape(settings in settings_strategy(), columns in column_sequence_strategy()) {
        let mut game = ConnectGame::new(settings.clone()).unwrap();

        for column in columns {
            if let Some(MoveOutcome::Won(result)) = game.drop_piece(column) {
                prop_assert!(settings.directions.contains(result.direction));
                prop_assert!(!result.line.is_empty());
                prop_assert!(result.line.len() <= settings.win_length);

                let board = &game.state().board;
                for position in &result.line {
                    prop_assert!(board.contains(*position));
                }
                if settings.line_mode == WinningLineMode::Contiguous {
                    prop_assert_eq!(result.line.len(), settings.win_length);
                    for position in &result.line {
                        prop_assert_eq!(board.get_cell(*position), Some(Cell::Occupied(result.winner)));
                    }
                }

                // 勝者決定後の着手は無視される
                let history = game.state().history.len();
                prop_assert!(game.drop_piece(column).is_none());
                prop_assert_eq!(game.state().history.len(), history);
                break;
            }
        }
    }

    /// 満杯の列への着手は何も変えない
    #[test]
    fn test_full_column_is_noop(rows in 4usize..=10, columns in 4usize..=10, target in 0usize..4) {
        let settings = GameSettings::new(rows, columns, 10)
            .with_directions(DirectionSet::only(Direction::Horizontal));
        let mut game = ConnectGame::new(settings).unwrap();
        for _ in 0..rows {
            game.drop_piece(target);
        }
        prop_assert!(game.state().board.is_column_full(target));

        let board = game.state().board.clone();
        let player = game.state().current_player;
        prop_assert!(game.drop_piece(target).is_none());
        prop_assert_eq!(&game.state().board, &board);
        prop_assert_eq!(game.state().current_player, player);
        prop_assert_eq!(game.state().winner(), None);
    }

    /// RandomAIは満杯の列を選ばず、満杯の盤面ではNoValidMovesを返す
    #[test]
    fn test_random_ai_legality(rows in 4usize..=10, columns in 4usize..=10, fills in prop::collection::vec(0usize..10, 0..100), seed in any::<u64>()) {
        let mut board = Board::new(rows, columns);
        let mut player = Player::One;
        for column in fills {
            let column = column % columns;
            if let Some(row) = board.lowest_empty_row(column) {
                board.place(row, column, player);
                player = player.opposite();
            }
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let ai = RandomAI::new();
        match ai.choose_column(&board, &mut rng) {
            Ok(column) => {
                prop_assert!(column < columns);
                prop_assert!(!board.is_column_full(column));
            }
            Err(AIError::NoValidMoves) => prop_assert!(board.is_full()),
            Err(other) => prop_assert!(false, "unexpected error: {}", other),
        }
    }
}

#[test]
fn test_random_ai_on_full_board() {
    let mut board = Board::new(4, 4);
    for col in 0..4 {
        for row in 0..4 {
            board.place(row, col, Player::Two);
        }
    }
    let mut rng = StdRng::seed_from_u64(0);
    assert!(matches!(
        RandomAI::new().choose_column(&board, &mut rng),
        Err(AIError::NoValidMoves)
    ));
}
