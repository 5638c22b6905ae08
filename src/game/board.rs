//! コネクトゲームの盤面状態を管理するモジュール
//! rows x columnsのグリッドと石の配置、操作を担当する。
//! 重力条件（各列の石は最下段から詰まっている）は呼び出し側が保証する。

use super::types::{Cell, Player, Position};
use serde::{Deserialize, Serialize};

/// 盤面を表現する構造体
/// 行優先で各マスのCell状態を保持する。行0が最上段。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    rows: usize,
    columns: usize,
    cells: Vec<Cell>,
}

impl Board {
    /// 空の盤面を作成する
    /// 行数・列数が0の場合はパニックする（設定検証済みであること）
    pub fn new(rows: usize, columns: usize) -> Self {
        assert!(
            rows > 0 && columns > 0,
            "board dimensions must be non-zero: {}x{}",
            rows,
            columns
        );

        Board {
            rows,
            columns,
            cells: vec![Cell::Empty; rows * columns],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    fn index(&self, row: usize, col: usize) -> usize {
        assert!(
            row < self.rows && col < self.columns,
            "cell ({}, {}) is outside the {}x{} board",
            row,
            col,
            self.rows,
            self.columns
        );
        row * self.columns + col
    }

    /// 指定したマスの状態を取得する
    /// 範囲外はプログラムの誤りとしてパニックする
    pub fn cell(&self, row: usize, col: usize) -> Cell {
        self.cells[self.index(row, col)]
    }

    /// 範囲チェック付きのセル取得
    pub fn get_cell(&self, position: Position) -> Option<Cell> {
        if self.contains(position) {
            Some(self.cells[position.row * self.columns + position.col])
        } else {
            None
        }
    }

    pub fn contains(&self, position: Position) -> bool {
        position.row < self.rows && position.col < self.columns
    }

    /// 座標から(dx, dy)方向にsteps進んだ位置を返す
    /// 盤外に出る場合はNone
    pub fn offset(&self, position: Position, (dx, dy): (isize, isize), steps: isize) -> Option<Position> {
        let row = position.row as isize + dy * steps;
        let col = position.col as isize + dx * steps;
        if row < 0 || col < 0 {
            return None;
        }

        let target = Position::new(row as usize, col as usize);
        self.contains(target).then_some(target)
    }

    /// 列の最も下にある空きマスの行を返す
    /// 列が満杯の場合はNone
    pub fn lowest_empty_row(&self, col: usize) -> Option<usize> {
        (0..self.rows).rev().find(|&row| self.cell(row, col).is_empty())
    }

    /// 石を置く（重力条件の検証は行わない）
    pub fn place(&mut self, row: usize, col: usize, player: Player) {
        let index = self.index(row, col);
        self.cells[index] = player.to_cell();
    }

    /// 石を取り除く（アンドゥ専用）
    pub fn remove(&mut self, row: usize, col: usize) {
        let index = self.index(row, col);
        self.cells[index] = Cell::Empty;
    }

    /// 最上段が埋まっていれば列は満杯
    pub fn is_column_full(&self, col: usize) -> bool {
        !self.cell(0, col).is_empty()
    }

    /// 石を置ける列の一覧
    pub fn available_columns(&self) -> Vec<usize> {
        (0..self.columns)
            .filter(|&col| !self.is_column_full(col))
            .collect()
    }

    pub fn is_full(&self) -> bool {
        (0..self.columns).all(|col| self.is_column_full(col))
    }

    /// 盤面上の石の総数
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|cell| !cell.is_empty()).count()
    }

    /// 盤面上の各プレイヤーの石の数
    /// 戻り値: (プレイヤー1, プレイヤー2)
    pub fn count_pieces(&self) -> (usize, usize) {
        self.cells.iter().fold((0, 0), |(one, two), cell| match cell.owner() {
            Some(Player::One) => (one + 1, two),
            Some(Player::Two) => (one, two + 1),
            None => (one, two),
        })
    }

    /// 行ごとのセル所有者（描画用スナップショット）
    pub fn to_rows(&self) -> Vec<Vec<Option<Player>>> {
        self.cells
            .chunks(self.columns)
            .map(|row| row.iter().map(|cell| cell.owner()).collect())
            .collect()
    }

    /// デバッグ用の盤面表示文字列を生成する
    /// ●でプレイヤー1、○でプレイヤー2、.で空マスを表現
    pub fn display(&self) -> String {
        let mut result = String::new();
        let header: Vec<String> = (0..self.columns).map(|col| col.to_string()).collect();
        result.push_str(&format!("  {}\n", header.join(" ")));

        for (row_idx, row) in self.cells.chunks(self.columns).enumerate() {
            result.push_str(&format!("{} ", row_idx));
            for &cell in row {
                let symbol = match cell {
                    Cell::Empty => ".",
                    Cell::Occupied(Player::One) => "●",
                    Cell::Occupied(Player::Two) => "○",
                };
                result.push_str(&format!("{} ", symbol));
            }
            result.push('\n');
        }

        result
    }
}
