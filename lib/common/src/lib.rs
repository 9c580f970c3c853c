/*
 * 象棋基础类型 - 裁判与引擎共用
 *
 * 说明
 * - 棋盘 9 列 x 10 行，行列均从 0 开始；黑方在上（0..=4 行），红方在下（5..=9 行），红方先走
 * - Position / Player / PieceType / PieceInfo / Move 都是纯值类型，不依赖任何棋盘实现
 * - MoveCoords 是两个组件之间唯一共享的走法编码："起点行 起点列 终点行 终点列" 四位数字
 */
use std::fmt;
use std::str::FromStr;

pub const BOARD_WIDTH: i32 = 9;
pub const BOARD_HEIGHT: i32 = 10;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Player {
    Red,
    Black,
}

impl Player {
    pub const ALL: [Player; 2] = [Player::Red, Player::Black];

    pub fn next(&self) -> Player {
        if self == &Player::Red {
            Player::Black
        } else {
            Player::Red
        }
    }

    /// 红方 0，黑方 1，用作数组下标
    pub fn index(&self) -> usize {
        if self == &Player::Red { 0 } else { 1 }
    }

    /// 兵卒前进方向上的行增量
    pub fn forward(&self) -> i32 {
        if self == &Player::Red { -1 } else { 1 }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::Red => write!(f, "red"),
            Player::Black => write!(f, "black"),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct Position {
    pub row: i32,
    pub col: i32,
}

impl Position {
    pub const fn new(row: i32, col: i32) -> Self {
        Position { row, col }
    }
    pub fn up(&self, delta: i32) -> Self {
        Position::new(self.row - delta, self.col)
    }
    pub fn down(&self, delta: i32) -> Self {
        Position::new(self.row + delta, self.col)
    }
    pub fn left(&self, delta: i32) -> Self {
        Position::new(self.row, self.col - delta)
    }
    pub fn right(&self, delta: i32) -> Self {
        Position::new(self.row, self.col + delta)
    }
    pub fn offset(&self, d_row: i32, d_col: i32) -> Self {
        Position::new(self.row + d_row, self.col + d_col)
    }
    /// 中心对称，用于把黑方的位置映射到红方视角
    pub fn flip(&self) -> Self {
        Position::new(BOARD_HEIGHT - 1 - self.row, BOARD_WIDTH - 1 - self.col)
    }

    // 是否在棋盘内
    pub fn is_valid(&self) -> bool {
        self.row >= 0 && self.row < BOARD_HEIGHT && self.col >= 0 && self.col < BOARD_WIDTH
    }

    // 是否在九宫格内
    pub fn in_palace(&self, player: Player) -> bool {
        let rows = if player == Player::Black { 0..3 } else { 7..BOARD_HEIGHT };
        rows.contains(&self.row) && (3..6).contains(&self.col)
    }

    // 是否在己方楚河汉界以内
    pub fn in_country(&self, player: Player) -> bool {
        if !self.is_valid() {
            return false;
        }
        if player == Player::Black {
            self.row < BOARD_HEIGHT / 2
        } else {
            self.row >= BOARD_HEIGHT / 2
        }
    }

    /// 按行优先遍历整个棋盘
    pub fn all() -> impl Iterator<Item = Position> {
        (0..BOARD_HEIGHT).flat_map(|row| (0..BOARD_WIDTH).map(move |col| Position::new(row, col)))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.row, self.col)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub enum PieceType {
    King,     // 帅/将
    Advisor,  // 仕/士
    Elephant, // 相/象
    Chariot,  // 车
    Horse,    // 马
    Cannon,   // 炮
    Pawn,     // 兵/卒
}

impl PieceType {
    pub const ALL: [PieceType; 7] = [
        PieceType::King,
        PieceType::Advisor,
        PieceType::Elephant,
        PieceType::Chariot,
        PieceType::Horse,
        PieceType::Cannon,
        PieceType::Pawn,
    ];

    pub fn index(&self) -> usize {
        *self as usize
    }

    /// FEN 风格的字母，红方大写，黑方小写
    pub fn symbol(&self, player: Player) -> char {
        let c = match self {
            PieceType::King => 'K',
            PieceType::Advisor => 'A',
            PieceType::Elephant => 'B',
            PieceType::Chariot => 'R',
            PieceType::Horse => 'N',
            PieceType::Cannon => 'C',
            PieceType::Pawn => 'P',
        };
        if player == Player::Red {
            c
        } else {
            c.to_ascii_lowercase()
        }
    }

    pub fn from_symbol(c: char) -> Option<(PieceType, Player)> {
        let player = if c.is_ascii_uppercase() { Player::Red } else { Player::Black };
        let kind = match c.to_ascii_uppercase() {
            'K' => PieceType::King,
            'A' => PieceType::Advisor,
            'B' | 'E' => PieceType::Elephant,
            'R' => PieceType::Chariot,
            'N' | 'H' => PieceType::Horse,
            'C' => PieceType::Cannon,
            'P' => PieceType::Pawn,
            _ => return None,
        };
        Some((kind, player))
    }

    pub fn name(&self, player: Player) -> &'static str {
        match (self, player) {
            (PieceType::King, Player::Red) => "帅",
            (PieceType::King, Player::Black) => "将",
            (PieceType::Advisor, Player::Red) => "仕",
            (PieceType::Advisor, Player::Black) => "士",
            (PieceType::Elephant, Player::Red) => "相",
            (PieceType::Elephant, Player::Black) => "象",
            (PieceType::Chariot, _) => "车",
            (PieceType::Horse, _) => "马",
            (PieceType::Cannon, _) => "炮",
            (PieceType::Pawn, Player::Red) => "兵",
            (PieceType::Pawn, Player::Black) => "卒",
        }
    }
}

/// 棋子描述：类型、所属方、当前位置。“无子”用 `Option::None` 表示
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct PieceInfo {
    pub kind: PieceType,
    pub player: Player,
    pub position: Position,
}

impl PieceInfo {
    pub fn new(kind: PieceType, player: Player, position: Position) -> Self {
        PieceInfo { kind, player, position }
    }
    pub fn symbol(&self) -> char {
        self.kind.symbol(self.player)
    }
}

/// 一步棋：走的子、落点，以及（裁判确认后填入的）被吃的子
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Move {
    pub piece: PieceInfo,
    pub to: Position,
    pub captured: Option<PieceInfo>,
}

impl Move {
    pub fn new(piece: PieceInfo, to: Position) -> Self {
        Move { piece, to, captured: None }
    }
    pub fn from(&self) -> Position {
        self.piece.position
    }
    pub fn player(&self) -> Player {
        self.piece.player
    }
    pub fn coords(&self) -> MoveCoords {
        MoveCoords::new(self.piece.position, self.to)
    }
}

/// 边界走法编码，`Display` 输出四位数字 "起行起列终行终列"
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct MoveCoords {
    pub from: Position,
    pub to: Position,
}

impl MoveCoords {
    pub fn new(from: Position, to: Position) -> Self {
        MoveCoords { from, to }
    }

    pub fn from_digits(from_row: i32, from_col: i32, to_row: i32, to_col: i32) -> Result<Self, MoveParseError> {
        let from = Position::new(from_row, from_col);
        let to = Position::new(to_row, to_col);
        for pos in [from, to] {
            if !pos.is_valid() {
                return Err(MoveParseError::OutOfRange(pos));
            }
        }
        Ok(MoveCoords { from, to })
    }
}

impl fmt::Display for MoveCoords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}{}", self.from.row, self.from.col, self.to.row, self.to.col)
    }
}

impl FromStr for MoveCoords {
    type Err = MoveParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let count = s.chars().count();
        if count != 4 {
            return Err(MoveParseError::BadLength(count));
        }
        let mut digits = [0i32; 4];
        for (slot, c) in digits.iter_mut().zip(s.chars()) {
            *slot = c.to_digit(10).ok_or(MoveParseError::NotADigit(c))? as i32;
        }
        MoveCoords::from_digits(digits[0], digits[1], digits[2], digits[3])
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveParseError {
    BadLength(usize),
    NotADigit(char),
    OutOfRange(Position),
}

impl fmt::Display for MoveParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveParseError::BadLength(n) => write!(f, "move must have 4 digits, got {}", n),
            MoveParseError::NotADigit(c) => write!(f, "'{}' is not a digit", c),
            MoveParseError::OutOfRange(pos) => write!(f, "square {} is off the board", pos),
        }
    }
}

impl std::error::Error for MoveParseError {}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GameStatus {
    InProgress,
    RedWin,
    BlackWin,
}

impl GameStatus {
    pub fn win_for(player: Player) -> Self {
        if player == Player::Red {
            GameStatus::RedWin
        } else {
            GameStatus::BlackWin
        }
    }
    pub fn is_over(&self) -> bool {
        self != &GameStatus::InProgress
    }
    pub fn winner(&self) -> Option<Player> {
        match self {
            GameStatus::InProgress => None,
            GameStatus::RedWin => Some(Player::Red),
            GameStatus::BlackWin => Some(Player::Black),
        }
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameStatus::InProgress => write!(f, "in progress"),
            GameStatus::RedWin => write!(f, "red wins"),
            GameStatus::BlackWin => write!(f, "black wins"),
        }
    }
}

/// 标准开局的 32 个子
pub fn initial_setup() -> Vec<PieceInfo> {
    const BACK_RANK: [PieceType; 9] = [
        PieceType::Chariot,
        PieceType::Horse,
        PieceType::Elephant,
        PieceType::Advisor,
        PieceType::King,
        PieceType::Advisor,
        PieceType::Elephant,
        PieceType::Horse,
        PieceType::Chariot,
    ];
    let mut pieces = Vec::with_capacity(32);
    // 黑方按红方布局中心对称摆放
    for player in Player::ALL {
        let place = |pos: Position| if player == Player::Red { pos } else { pos.flip() };
        for (col, kind) in BACK_RANK.iter().enumerate() {
            pieces.push(PieceInfo::new(*kind, player, place(Position::new(9, col as i32))));
        }
        for col in [1, 7] {
            pieces.push(PieceInfo::new(PieceType::Cannon, player, place(Position::new(7, col))));
        }
        for col in [0, 2, 4, 6, 8] {
            pieces.push(PieceInfo::new(PieceType::Pawn, player, place(Position::new(6, col))));
        }
    }
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zones() {
        assert!(Position::new(0, 3).in_palace(Player::Black));
        assert!(Position::new(2, 5).in_palace(Player::Black));
        assert!(!Position::new(3, 4).in_palace(Player::Black));
        assert!(Position::new(9, 4).in_palace(Player::Red));
        assert!(!Position::new(8, 6).in_palace(Player::Red));
        assert!(Position::new(4, 0).in_country(Player::Black));
        assert!(!Position::new(5, 0).in_country(Player::Black));
        assert!(Position::new(5, 8).in_country(Player::Red));
        assert!(!Position::new(4, 8).in_country(Player::Red));
        assert!(!Position::new(10, 0).in_country(Player::Red));
    }

    #[test]
    fn test_move_coords() {
        let m: MoveCoords = "7242".parse().unwrap();
        assert_eq!(m.from, Position::new(7, 2));
        assert_eq!(m.to, Position::new(4, 2));
        assert_eq!(m.to_string(), "7242");
        assert_eq!("724".parse::<MoveCoords>(), Err(MoveParseError::BadLength(3)));
        assert_eq!("72x2".parse::<MoveCoords>(), Err(MoveParseError::NotADigit('x')));
        assert_eq!(
            "0009".parse::<MoveCoords>(),
            Err(MoveParseError::OutOfRange(Position::new(0, 9)))
        );
    }

    #[test]
    fn test_initial_setup() {
        let pieces = initial_setup();
        assert_eq!(pieces.len(), 32);
        let black_king = pieces
            .iter()
            .find(|p| p.kind == PieceType::King && p.player == Player::Black)
            .unwrap();
        assert_eq!(black_king.position, Position::new(0, 4));
        let black_cannons: Vec<_> = pieces
            .iter()
            .filter(|p| p.kind == PieceType::Cannon && p.player == Player::Black)
            .map(|p| p.position)
            .collect();
        assert!(black_cannons.contains(&Position::new(2, 1)));
        assert!(black_cannons.contains(&Position::new(2, 7)));
    }
}
