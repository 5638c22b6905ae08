//! ゲーム設定モジュール
//! 盤面サイズ、勝利に必要な連続数、判定方向、対戦モードを管理する。
//! 設定はゲーム開始時に読み込まれ、変更時は盤面を作り直す。

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::ops::RangeInclusive;

use super::types::{Direction, Player};
use crate::error::{GameError, Result};

/// 行数・列数の許容範囲
pub const DIMENSION_RANGE: RangeInclusive<usize> = 4..=10;
/// 勝利に必要な連続数の許容範囲
pub const WIN_LENGTH_RANGE: RangeInclusive<usize> = 3..=10;

/// コンピュータが担当するプレイヤー
pub const COMPUTER_PLAYER: Player = Player::Two;

const DEFAULT_PLAYER_TWO_NAME: &str = "Player 2";
const COMPUTER_NAME: &str = "Bot";

/// 有効な判定方向の集合
/// 列挙順で保持されるため、判定順は常に一定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DirectionSet(BTreeSet<Direction>);

impl DirectionSet {
    pub fn all() -> Self {
        DirectionSet(Direction::ALL.into_iter().collect())
    }

    pub fn only(direction: Direction) -> Self {
        DirectionSet(BTreeSet::from([direction]))
    }

    pub fn contains(&self, direction: Direction) -> bool {
        self.0.contains(&direction)
    }

    pub fn insert(&mut self, direction: Direction) {
        self.0.insert(direction);
    }

    pub fn remove(&mut self, direction: Direction) {
        self.0.remove(&direction);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// 判定順で方向を列挙する
    pub fn iter(&self) -> impl Iterator<Item = Direction> + '_ {
        self.0.iter().copied()
    }
}

impl Default for DirectionSet {
    fn default() -> Self {
        Self::all()
    }
}

impl FromIterator<Direction> for DirectionSet {
    fn from_iter<I: IntoIterator<Item = Direction>>(iter: I) -> Self {
        DirectionSet(iter.into_iter().collect())
    }
}

/// 勝利ラインの報告方法
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WinningLineMode {
    /// 置いた石から正方向にwin_length個のマスを並べる（盤外のマスは省く）
    #[default]
    Anchored,
    /// 実際に連続している石の並びの先頭からwin_length個
    Contiguous,
}

/// プレイヤーの表示名（描画専用）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerNames {
    pub one: String,
    pub two: String,
}

impl PlayerNames {
    pub fn get(&self, player: Player) -> &str {
        match player {
            Player::One => &self.one,
            Player::Two => &self.two,
        }
    }
}

impl Default for PlayerNames {
    fn default() -> Self {
        Self {
            one: "Player 1".to_string(),
            two: DEFAULT_PLAYER_TWO_NAME.to_string(),
        }
    }
}

/// 石の表示色（描画専用、`#RRGGBB`形式）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerColors {
    pub one: String,
    pub two: String,
}

impl PlayerColors {
    pub fn get(&self, player: Player) -> &str {
        match player {
            Player::One => &self.one,
            Player::Two => &self.two,
        }
    }
}

impl Default for PlayerColors {
    /// 赤と黄
    fn default() -> Self {
        Self {
            one: "#FF0000".to_string(),
            two: "#FFFF00".to_string(),
        }
    }
}

/// 1ゲームセッションの設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    pub rows: usize,
    pub columns: usize,
    pub win_length: usize,
    pub directions: DirectionSet,
    pub vs_computer: bool,
    pub line_mode: WinningLineMode,
    pub player_names: PlayerNames,
    pub player_colors: PlayerColors,
}

impl Default for GameSettings {
    /// 標準の6行7列・4連
    fn default() -> Self {
        Self {
            rows: 6,
            columns: 7,
            win_length: 4,
            directions: DirectionSet::all(),
            vs_computer: false,
            line_mode: WinningLineMode::Anchored,
            player_names: PlayerNames::default(),
            player_colors: PlayerColors::default(),
        }
    }
}

impl GameSettings {
    /// 指定サイズの設定を作成する（その他はデフォルト）
    pub fn new(rows: usize, columns: usize, win_length: usize) -> Self {
        Self {
            rows,
            columns,
            win_length,
            ..Default::default()
        }
    }

    pub fn with_directions(mut self, directions: DirectionSet) -> Self {
        self.directions = directions;
        self
    }

    pub fn with_line_mode(mut self, line_mode: WinningLineMode) -> Self {
        self.line_mode = line_mode;
        self
    }

    pub fn with_vs_computer(mut self, vs_computer: bool) -> Self {
        self.set_vs_computer(vs_computer);
        self
    }

    /// コンピュータ対戦モードを切り替える
    /// プレイヤー2の表示名も合わせて切り替わる
    pub fn set_vs_computer(&mut self, vs_computer: bool) {
        self.vs_computer = vs_computer;
        self.player_names.two = if vs_computer { COMPUTER_NAME } else { DEFAULT_PLAYER_TWO_NAME }.to_string();
    }

    /// 外部から受け取った設定のプレイヤー2の名前を整える
    /// モードが`previous_vs_computer`から切り替わった時だけ名前も切り替える。
    /// 切り替わらない場合は指定された名前を保ち、コンピュータ対戦で既定名のままなら"Bot"にする
    pub fn reconcile_player_names(&mut self, previous_vs_computer: bool) {
        if self.vs_computer != previous_vs_computer {
            self.set_vs_computer(self.vs_computer);
        } else if self.vs_computer && self.player_names.two == DEFAULT_PLAYER_TWO_NAME {
            self.player_names.two = COMPUTER_NAME.to_string();
        }
    }

    /// 指定プレイヤーがコンピュータ操作かどうか
    pub fn is_computer(&self, player: Player) -> bool {
        self.vs_computer && player == COMPUTER_PLAYER
    }

    /// 設定値の妥当性をチェックする
    /// win_lengthが盤面より長い場合は勝利不能になるだけでエラーにはしない
    pub fn validate(&self) -> Result<()> {
        if !DIMENSION_RANGE.contains(&self.rows) {
            return Err(GameError::invalid_settings("rows", self.rows));
        }

        if !DIMENSION_RANGE.contains(&self.columns) {
            return Err(GameError::invalid_settings("columns", self.columns));
        }

        if !WIN_LENGTH_RANGE.contains(&self.win_length) {
            return Err(GameError::invalid_settings("win_length", self.win_length));
        }

        if self.directions.is_empty() {
            return Err(GameError::invalid_settings("directions", "[]"));
        }

        Ok(())
    }
}
