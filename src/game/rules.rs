//! 勝利判定の実装モジュール
//! 置いたばかりの石を起点に、有効な各方向の連続数を数えて勝敗を判定する。

use super::board::Board;
use super::settings::{GameSettings, WinningLineMode};
use super::types::{Direction, Player, Position, WinResult};

/// コネクトゲームの勝利判定を実装する構造体
/// スタティックメソッドのみを提供する
pub struct ConnectRules;

impl ConnectRules {
    /// 置いた石の位置で勝利条件を満たしているか判定する
    /// 方向は列挙順に調べ、最初に条件を満たした方向で勝利とする
    pub fn evaluate(board: &Board, settings: &GameSettings, position: Position) -> Option<WinResult> {
        let player = board.get_cell(position)?.owner()?;

        for direction in settings.directions.iter() {
            let step = direction.step();
            let backward = Self::extend(board, position, player, step, -1);
            let forward = Self::extend(board, position, player, step, 1);

            if 1 + backward + forward < settings.win_length {
                continue;
            }

            let line = match settings.line_mode {
                WinningLineMode::Anchored => {
                    Self::anchored_line(board, position, direction, settings.win_length)
                }
                WinningLineMode::Contiguous => {
                    let start = board
                        .offset(position, step, -(backward as isize))
                        .unwrap_or(position);
                    Self::anchored_line(board, start, direction, settings.win_length)
                }
            };

            return Some(WinResult {
                winner: player,
                direction,
                line,
            });
        }

        None
    }

    /// 指定方向の連続数（置いた石自身を含む）を数える
    pub fn run_length(board: &Board, position: Position, player: Player, direction: Direction) -> usize {
        let step = direction.step();
        1 + Self::extend(board, position, player, step, -1) + Self::extend(board, position, player, step, 1)
    }

    /// 起点から正方向にlength個のマスを並べる
    /// 盤外にはみ出すマスは含めない
    pub fn anchored_line(board: &Board, start: Position, direction: Direction, length: usize) -> Vec<Position> {
        (0..length as isize)
            .filter_map(|i| board.offset(start, direction.step(), i))
            .collect()
    }

    /// 起点の隣から一方向に同じプレイヤーの石が続く数
    fn extend(board: &Board, origin: Position, player: Player, step: (isize, isize), sign: isize) -> usize {
        let target = Some(player.to_cell());
        let mut count = 0;

        while let Some(next) = board.offset(origin, step, sign * (count as isize + 1)) {
            if board.get_cell(next) != target {
                break;
            }
            count += 1;
        }

        count
    }
}
