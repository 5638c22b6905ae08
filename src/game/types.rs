//! ゲームの基本型定義モジュール
//! コネクトゲームで使用される基本的な型とenum、構造体を定義する。

use serde::{Deserialize, Serialize};
use std::ops::Index;

/// ゲームのプレイヤーを表すenum
/// 先手はOne、後手はTwo（コンピュータ対戦ではTwoがAI）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    One,
    Two,
}

impl Player {
    /// 相手プレイヤーを返す
    pub fn opposite(self) -> Player {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    /// プレイヤーを対応するセル状態に変換する
    pub fn to_cell(self) -> Cell {
        Cell::Occupied(self)
    }
}

/// 盤面の各マスの状態を表現するenum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    Empty,
    Occupied(Player),
}

impl Cell {
    /// マスを占有しているプレイヤーを返す
    pub fn owner(self) -> Option<Player> {
        match self {
            Cell::Empty => None,
            Cell::Occupied(player) => Some(player),
        }
    }

    pub fn is_empty(self) -> bool {
        matches!(self, Cell::Empty)
    }
}

/// 盤面上の座標を表す構造体
/// rowは0が最上段、columnは0が左端
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Position {
        Position { row, col }
    }
}

impl From<(usize, usize)> for Position {
    fn from((row, col): (usize, usize)) -> Self {
        Position { row, col }
    }
}

/// ゲームの1手を表現する構造体
/// 記録後は変更されない
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub position: Position,
    pub player: Player,
}

impl Move {
    pub fn new(position: Position, player: Player) -> Self {
        Self { position, player }
    }
}

/// 勝利判定に使用する方向
/// 列挙順が判定順になる
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    Horizontal,
    Vertical,
    DiagonalUp,
    DiagonalDown,
}

impl Direction {
    /// 全方向（判定順）
    pub const ALL: [Direction; 4] = [
        Direction::Horizontal,
        Direction::Vertical,
        Direction::DiagonalUp,
        Direction::DiagonalDown,
    ];

    /// 単位ステップ (dx, dy) を返す
    /// dxは列方向、dyは行方向（下向きが正）
    pub fn step(self) -> (isize, isize) {
        match self {
            Direction::Horizontal => (1, 0),
            Direction::Vertical => (0, 1),
            Direction::DiagonalUp => (1, -1),
            Direction::DiagonalDown => (1, 1),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Direction::Horizontal => "Horizontal",
            Direction::Vertical => "Vertical",
            Direction::DiagonalUp => "Diagonal Up",
            Direction::DiagonalDown => "Diagonal Down",
        }
    }
}

/// 勝利判定の結果
/// 勝者と強調表示するマスの並び
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinResult {
    pub winner: Player,
    pub direction: Direction,
    /// 強調表示するマス
    /// Anchoredモードでは盤外のマスを省くため、win_lengthより短い場合がある
    pub line: Vec<Position>,
}

/// プレイヤーごとの勝利数
/// 両プレイヤー分が常に存在する
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinTally {
    pub one: u32,
    pub two: u32,
}

impl WinTally {
    pub fn get(&self, player: Player) -> u32 {
        match player {
            Player::One => self.one,
            Player::Two => self.two,
        }
    }

    pub fn increment(&mut self, player: Player) {
        match player {
            Player::One => self.one += 1,
            Player::Two => self.two += 1,
        }
    }

    pub fn reset(&mut self) {
        *self = WinTally::default();
    }

    /// 勝利数でリードしているプレイヤー（同数ならNone）
    pub fn leader(&self) -> Option<Player> {
        if self.one > self.two {
            Some(Player::One)
        } else if self.two > self.one {
            Some(Player::Two)
        } else {
            None
        }
    }
}

impl Index<Player> for WinTally {
    type Output = u32;

    fn index(&self, player: Player) -> &u32 {
        match player {
            Player::One => &self.one,
            Player::Two => &self.two,
        }
    }
}
