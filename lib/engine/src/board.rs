/*
 * 引擎棋盘 - 带边界保护带的一维数组（mailbox）
 *
 * 设计要点
 * - 9x10 棋盘嵌在 13x14 的数组中，四周各留两格 Offboard，马、象跳两格也不会越界
 * - 32 个棋子编号固定：0..16 红方，16..32 黑方；每方依次为 帅、仕仕、相相、马马、车车、炮炮、兵x5
 * - squares[id] 记录每个棋子所在格子，被吃掉时为 None
 * - 走子/撤销时增量维护：Zobrist 双哈希、子力位置分 vl、子力组合下标 material_index
 * - history 保存对局与搜索路径上的每一步，供撤销与重复局面检测使用
 */
use std::fmt;

use common::{PieceType, Player, Position, BOARD_HEIGHT, BOARD_WIDTH};
use log::error;

use crate::constant::{
    is_defender, material_weight, INITIATIVE_BONUS, MATERIAL_TABLE, NULL_OKAY_MARGIN, PIECE_VALUES,
};
use crate::error::EngineError;
use crate::zobrist::ZOBRIST;

pub type Square = usize;

const STRIDE: i32 = BOARD_WIDTH + 4;
const RANKS: i32 = BOARD_HEIGHT + 4;
pub const BOARD_SIZE: usize = (STRIDE * RANKS) as usize;

const UP: isize = -(STRIDE as isize);
const DOWN: isize = STRIDE as isize;
const LEFT: isize = -1;
const RIGHT: isize = 1;

const ORTHOGONAL: [isize; 4] = [UP, DOWN, LEFT, RIGHT];
const DIAGONAL: [isize; 4] = [UP + LEFT, UP + RIGHT, DOWN + LEFT, DOWN + RIGHT];
// 马的跳法与对应马腿（相对马所在格）
const HORSE_LEAPS: [(isize, isize); 8] = [
    (2 * UP + LEFT, UP),
    (2 * UP + RIGHT, UP),
    (2 * DOWN + LEFT, DOWN),
    (2 * DOWN + RIGHT, DOWN),
    (2 * LEFT + UP, LEFT),
    (2 * LEFT + DOWN, LEFT),
    (2 * RIGHT + UP, RIGHT),
    (2 * RIGHT + DOWN, RIGHT),
];
// 能将军的马相对于将的位置，以及此时的马腿（在将的斜角上）
const HORSE_CHECKS: [(isize, isize); 8] = [
    (2 * UP + LEFT, UP + LEFT),
    (2 * UP + RIGHT, UP + RIGHT),
    (2 * DOWN + LEFT, DOWN + LEFT),
    (2 * DOWN + RIGHT, DOWN + RIGHT),
    (2 * LEFT + UP, UP + LEFT),
    (2 * LEFT + DOWN, DOWN + LEFT),
    (2 * RIGHT + UP, UP + RIGHT),
    (2 * RIGHT + DOWN, DOWN + RIGHT),
];

/// 每方 16 个棋子编号对应的类型
const PIECE_KINDS: [PieceType; 16] = [
    PieceType::King,
    PieceType::Advisor,
    PieceType::Advisor,
    PieceType::Elephant,
    PieceType::Elephant,
    PieceType::Horse,
    PieceType::Horse,
    PieceType::Chariot,
    PieceType::Chariot,
    PieceType::Cannon,
    PieceType::Cannon,
    PieceType::Pawn,
    PieceType::Pawn,
    PieceType::Pawn,
    PieceType::Pawn,
    PieceType::Pawn,
];

pub fn square(pos: Position) -> Square {
    ((pos.row + 2) * STRIDE + pos.col + 2) as Square
}

pub fn position(sq: Square) -> Position {
    Position::new(sq as i32 / STRIDE - 2, sq as i32 % STRIDE - 2)
}

fn offset(sq: Square, delta: isize) -> Square {
    (sq as isize + delta) as Square
}

pub fn piece_kind(id: u8) -> PieceType {
    PIECE_KINDS[(id & 15) as usize]
}

pub fn piece_player(id: u8) -> Player {
    if id < 16 {
        Player::Red
    } else {
        Player::Black
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Cell {
    Offboard,
    Empty,
    Piece(u8),
}

/// 引擎内部走法，只记录起止格子
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Move {
    pub from: Square,
    pub to: Square,
}

impl Move {
    pub fn new(from: Square, to: Square) -> Self {
        Move { from, to }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (from, to) = (position(self.from), position(self.to));
        write!(f, "{}{}{}{}", from.row, from.col, to.row, to.col)
    }
}

/// 走过的一步，空着时 mv 为 None
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct HistoryEntry {
    mv: Option<Move>,
    captured: Option<u8>,
    // 走之前的哈希
    zobrist: u64,
    // 走完后对方是否被将军
    checking: bool,
    // 吃子、兵卒前进或空着，之前的局面不可能再出现
    irreversible: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    cells: [Cell; BOARD_SIZE],
    squares: [Option<Square>; 32],
    pub turn: Player,
    pub zobrist_value: u64,
    pub zobrist_value_lock: u64,
    vl: [i32; 2],
    material_index: [usize; 2],
    history: Vec<HistoryEntry>,
}

impl Board {
    fn empty(turn: Player) -> Self {
        let mut cells = [Cell::Offboard; BOARD_SIZE];
        for pos in Position::all() {
            cells[square(pos)] = Cell::Empty;
        }
        let mut board = Board {
            cells,
            squares: [None; 32],
            turn,
            zobrist_value: 0,
            zobrist_value_lock: 0,
            vl: [0; 2],
            material_index: [0; 2],
            history: vec![],
        };
        if turn == Player::Black {
            board.zobrist_value = ZOBRIST.value.player();
            board.zobrist_value_lock = ZOBRIST.lock.player();
        }
        board
    }

    // 标准开局
    pub fn init() -> Self {
        let pieces: Vec<_> = common::initial_setup()
            .into_iter()
            .map(|p| (p.kind, p.player, p.position))
            .collect();
        match Board::from_pieces(&pieces, Player::Red) {
            Ok(board) => board,
            Err(err) => unreachable!("initial setup rejected: {}", err),
        }
    }

    /// 任意摆子。每种棋子数量不能超过标准配置
    pub fn from_pieces(pieces: &[(PieceType, Player, Position)], turn: Player) -> Result<Self, EngineError> {
        let mut board = Board::empty(turn);
        for &(kind, player, pos) in pieces {
            if !pos.is_valid() {
                return Err(EngineError::InvalidPosition(format!("{} is off the board", pos)));
            }
            let sq = square(pos);
            if board.cells[sq] != Cell::Empty {
                return Err(EngineError::InvalidPosition(format!("{} is occupied twice", pos)));
            }
            let base = if player == Player::Red { 0 } else { 16 };
            let id = (0..16u8)
                .map(|i| base + i)
                .find(|&id| piece_kind(id) == kind && board.squares[id as usize].is_none())
                .ok_or_else(|| EngineError::InvalidPosition(format!("too many {:?} for {}", kind, player)))?;
            board.add_piece(id, sq);
        }
        for player in Player::ALL {
            if board.king_square(player).is_none() {
                return Err(EngineError::InvalidPosition(format!("{} king is missing", player)));
            }
        }
        Ok(board)
    }

    /// 类 FEN 串，第一行是黑方底线，走棋方 w/r 为红，b 为黑
    pub fn from_fen(fen: &str) -> Result<Self, EngineError> {
        let mut parts = fen.split_whitespace();
        let layout = parts
            .next()
            .ok_or_else(|| EngineError::InvalidPosition("empty fen".to_string()))?;
        let turn = match parts.next() {
            Some("b") => Player::Black,
            _ => Player::Red,
        };
        let mut pieces = vec![];
        for (row, line) in layout.split('/').enumerate() {
            let mut col = 0;
            for c in line.chars() {
                if let Some(skip) = c.to_digit(10) {
                    col += skip as i32;
                } else {
                    let (kind, player) = PieceType::from_symbol(c)
                        .ok_or_else(|| EngineError::InvalidPosition(format!("unknown piece '{}'", c)))?;
                    pieces.push((kind, player, Position::new(row as i32, col)));
                    col += 1;
                }
            }
        }
        Board::from_pieces(&pieces, turn)
    }

    fn add_piece(&mut self, id: u8, sq: Square) {
        let (kind, player) = (piece_kind(id), piece_player(id));
        self.cells[sq] = Cell::Piece(id);
        self.squares[id as usize] = Some(sq);
        self.vl[player.index()] += piece_value(kind, player, sq);
        self.zobrist_value ^= ZOBRIST.value.piece(kind, player, sq);
        self.zobrist_value_lock ^= ZOBRIST.lock.piece(kind, player, sq);
        if is_defender(kind) {
            self.material_index[player.next().index()] += material_weight(kind);
        } else {
            self.material_index[player.index()] += material_weight(kind);
        }
    }

    fn remove_piece(&mut self, id: u8, sq: Square) {
        let (kind, player) = (piece_kind(id), piece_player(id));
        self.cells[sq] = Cell::Empty;
        self.squares[id as usize] = None;
        self.vl[player.index()] -= piece_value(kind, player, sq);
        self.zobrist_value ^= ZOBRIST.value.piece(kind, player, sq);
        self.zobrist_value_lock ^= ZOBRIST.lock.piece(kind, player, sq);
        if is_defender(kind) {
            self.material_index[player.next().index()] -= material_weight(kind);
        } else {
            self.material_index[player.index()] -= material_weight(kind);
        }
    }

    fn swap_turn(&mut self) {
        self.turn = self.turn.next();
        self.zobrist_value ^= ZOBRIST.value.player();
        self.zobrist_value_lock ^= ZOBRIST.lock.player();
    }

    pub fn cell(&self, sq: Square) -> Cell {
        self.cells[sq]
    }

    /// 边界坐标上的棋子，供与裁判棋盘核对
    pub fn piece_at(&self, pos: Position) -> Option<(PieceType, Player)> {
        if !pos.is_valid() {
            return None;
        }
        match self.cells[square(pos)] {
            Cell::Piece(id) => Some((piece_kind(id), piece_player(id))),
            _ => None,
        }
    }

    pub fn king_square(&self, player: Player) -> Option<Square> {
        self.squares[if player == Player::Red { 0 } else { 16 }]
    }

    fn own(&self, sq: Square, player: Player) -> bool {
        matches!(self.cells[sq], Cell::Piece(id) if piece_player(id) == player)
    }

    fn enemy_piece(&self, sq: Square, player: Player, kind: PieceType) -> bool {
        matches!(self.cells[sq], Cell::Piece(id) if piece_player(id) != player && piece_kind(id) == kind)
    }

    /// 执行走子并压入历史。起点没有棋子时返回 false 且不做任何修改
    pub fn make_move(&mut self, mv: Move) -> bool {
        let Cell::Piece(mover) = self.cells[mv.from] else {
            error!("no piece on the origin square of {}", mv);
            debug_assert!(false, "no piece on {}", mv);
            return false;
        };
        let zobrist = self.zobrist_value;
        let captured = match self.cells[mv.to] {
            Cell::Piece(victim) => {
                self.remove_piece(victim, mv.to);
                Some(victim)
            }
            _ => None,
        };
        self.remove_piece(mover, mv.from);
        self.add_piece(mover, mv.to);
        self.swap_turn();

        let pawn_advance = piece_kind(mover) == PieceType::Pawn && position(mv.from).row != position(mv.to).row;
        let checking = self.in_check(self.turn);
        self.history.push(HistoryEntry {
            mv: Some(mv),
            captured,
            zobrist,
            checking,
            irreversible: captured.is_some() || pawn_advance,
        });
        true
    }

    /// 撤销最近一步（包括空着）
    pub fn unmake_move(&mut self) {
        let Some(entry) = self.history.pop() else {
            error!("unmake_move with empty history");
            debug_assert!(false, "unmake_move with empty history");
            return;
        };
        self.swap_turn();
        if let Some(mv) = entry.mv {
            if let Cell::Piece(mover) = self.cells[mv.to] {
                self.remove_piece(mover, mv.to);
                self.add_piece(mover, mv.from);
            }
            if let Some(victim) = entry.captured {
                self.add_piece(victim, mv.to);
            }
        }
    }

    // 空着：只交换走棋方
    pub fn make_null_move(&mut self) {
        self.history.push(HistoryEntry {
            mv: None,
            captured: None,
            zobrist: self.zobrist_value,
            checking: false,
            irreversible: true,
        });
        self.swap_turn();
    }

    pub fn unmake_null_move(&mut self) {
        self.unmake_move();
    }

    /// 上一步是否将军
    pub fn last_move_checks(&self) -> bool {
        self.history.last().is_some_and(|entry| entry.checking)
    }

    /// 上一步吃掉的子
    pub fn last_captured(&self) -> Option<PieceType> {
        self.history.last().and_then(|entry| entry.captured).map(piece_kind)
    }

    // 当己方子力足够时才使用空着 (避免残局中误判)
    pub fn null_move_okay(&self) -> bool {
        self.vl[self.turn.index()] > NULL_OKAY_MARGIN
    }

    /// player 的将是否受攻击；将帅照面也算
    pub fn in_check(&self, player: Player) -> bool {
        let Some(king) = self.king_square(player) else {
            return true;
        };

        // 车、炮、对面将
        for dir in ORTHOGONAL {
            let mut sq = offset(king, dir);
            while self.cells[sq] == Cell::Empty {
                sq = offset(sq, dir);
            }
            let Cell::Piece(id) = self.cells[sq] else {
                continue;
            };
            if piece_player(id) != player {
                let kind = piece_kind(id);
                if kind == PieceType::Chariot || (kind == PieceType::King && (dir == UP || dir == DOWN)) {
                    return true;
                }
            }
            // 越过炮架找炮
            sq = offset(sq, dir);
            while self.cells[sq] == Cell::Empty {
                sq = offset(sq, dir);
            }
            if self.enemy_piece(sq, player, PieceType::Cannon) {
                return true;
            }
        }

        for (attacker, leg) in HORSE_CHECKS {
            if self.cells[offset(king, leg)] == Cell::Empty
                && self.enemy_piece(offset(king, attacker), player, PieceType::Horse)
            {
                return true;
            }
        }

        // 对方兵卒从正前方或两侧
        let front = if player == Player::Red { UP } else { DOWN };
        [front, LEFT, RIGHT]
            .into_iter()
            .any(|dir| self.enemy_piece(offset(king, dir), player, PieceType::Pawn))
    }

    /// 生成当前走棋方的伪合法走法（不检查走后是否被将军）
    pub fn generate_move(&self, capture_only: bool) -> Vec<Move> {
        let mut moves = Vec::with_capacity(64);
        let player = self.turn;
        let base = if player == Player::Red { 0 } else { 16 };
        for id in base..base + 16u8 {
            let Some(from) = self.squares[id as usize] else {
                continue;
            };
            let mut push = |to: Square| {
                match self.cells[to] {
                    Cell::Offboard => {}
                    Cell::Empty if capture_only => {}
                    Cell::Piece(other) if piece_player(other) == player => {}
                    _ => moves.push(Move::new(from, to)),
                }
            };
            match piece_kind(id) {
                PieceType::King => {
                    for dir in ORTHOGONAL {
                        let to = offset(from, dir);
                        if position(to).in_palace(player) {
                            push(to);
                        }
                    }
                }
                PieceType::Advisor => {
                    for dir in DIAGONAL {
                        let to = offset(from, dir);
                        if position(to).in_palace(player) {
                            push(to);
                        }
                    }
                }
                PieceType::Elephant => {
                    for dir in DIAGONAL {
                        let eye = offset(from, dir);
                        let to = offset(eye, dir);
                        if self.cells[eye] == Cell::Empty && position(to).in_country(player) {
                            push(to);
                        }
                    }
                }
                PieceType::Horse => {
                    for (leap, leg) in HORSE_LEAPS {
                        if self.cells[offset(from, leg)] == Cell::Empty {
                            push(offset(from, leap));
                        }
                    }
                }
                PieceType::Chariot => {
                    for dir in ORTHOGONAL {
                        let mut to = offset(from, dir);
                        while self.cells[to] == Cell::Empty {
                            push(to);
                            to = offset(to, dir);
                        }
                        push(to);
                    }
                }
                PieceType::Cannon => {
                    for dir in ORTHOGONAL {
                        let mut to = offset(from, dir);
                        while self.cells[to] == Cell::Empty {
                            push(to);
                            to = offset(to, dir);
                        }
                        if self.cells[to] == Cell::Offboard {
                            continue;
                        }
                        to = offset(to, dir);
                        while self.cells[to] == Cell::Empty {
                            to = offset(to, dir);
                        }
                        if matches!(self.cells[to], Cell::Piece(_)) {
                            push(to);
                        }
                    }
                }
                PieceType::Pawn => {
                    let forward = if player == Player::Red { UP } else { DOWN };
                    push(offset(from, forward));
                    if !position(from).in_country(player) {
                        push(offset(from, LEFT));
                        push(offset(from, RIGHT));
                    }
                }
            }
        }
        moves
    }

    /// 合法走法：伪合法走法中走后不被将军的
    pub fn legal_moves(&mut self) -> Vec<Move> {
        let player = self.turn;
        self.generate_move(false)
            .into_iter()
            .filter(|&mv| {
                if !self.make_move(mv) {
                    return false;
                }
                let legal = !self.in_check(player);
                self.unmake_move();
                legal
            })
            .collect()
    }

    /// 走子是否合法，用于校验外部传入的走法
    pub fn is_legal(&mut self, mv: Move) -> bool {
        if !self.own(mv.from, self.turn) {
            return false;
        }
        if !self.generate_move(false).contains(&mv) {
            return false;
        }
        let player = self.turn;
        if !self.make_move(mv) {
            return false;
        }
        let legal = !self.in_check(player);
        self.unmake_move();
        legal
    }

    /// 走棋方视角的局面评估
    pub fn evaluate(&self) -> i32 {
        let (us, them) = (self.turn.index(), self.turn.next().index());
        self.vl[us] - self.vl[them] + MATERIAL_TABLE[self.material_index[us]]
            - MATERIAL_TABLE[self.material_index[them]]
            + INITIATIVE_BONUS
    }

    /// 重复局面检测。返回 0 表示无重复；否则 1 + 2(本方长将) + 4(对方长将)
    pub fn rep_status(&self, mut recur: i32) -> i32 {
        let mut self_side = false;
        let mut perp_check = true;
        let mut opp_perp_check = true;

        for entry in self.history.iter().rev() {
            if entry.irreversible {
                break;
            }
            if self_side {
                perp_check &= entry.checking;
                if entry.zobrist == self.zobrist_value {
                    recur -= 1;
                    if recur <= 0 {
                        return 1 + if perp_check { 2 } else { 0 } + if opp_perp_check { 4 } else { 0 };
                    }
                }
            } else {
                opp_perp_check &= entry.checking;
            }
            self_side = !self_side;
        }
        0
    }

    /// 全量重算增量字段：(zobrist, lock, vl, material_index)
    pub fn recompute(&self) -> (u64, u64, [i32; 2], [usize; 2]) {
        let mut fresh = Board::empty(self.turn);
        for (id, sq) in self.squares.iter().enumerate() {
            if let Some(sq) = sq {
                fresh.add_piece(id as u8, *sq);
            }
        }
        (
            fresh.zobrist_value,
            fresh.zobrist_value_lock,
            fresh.vl,
            fresh.material_index,
        )
    }

    pub fn incremental(&self) -> (u64, u64, [i32; 2], [usize; 2]) {
        (self.zobrist_value, self.zobrist_value_lock, self.vl, self.material_index)
    }
}

fn piece_value(kind: PieceType, player: Player, sq: Square) -> i32 {
    let pos = if player == Player::Black {
        position(sq).flip()
    } else {
        position(sq)
    };
    PIECE_VALUES[kind.index()][pos.row as usize][pos.col as usize]
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..BOARD_HEIGHT {
            for col in 0..BOARD_WIDTH {
                let c = match self.cells[square(Position::new(row, col))] {
                    Cell::Piece(id) => piece_kind(id).symbol(piece_player(id)),
                    _ => '.',
                };
                write!(f, "{}", c)?;
            }
            writeln!(f)?;
        }
        write!(f, "{} to move", self.turn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn mv(s: &str) -> Move {
        let coords: common::MoveCoords = s.parse().unwrap();
        Move::new(square(coords.from), square(coords.to))
    }

    #[test]
    fn test_square_mapping() {
        for pos in Position::all() {
            assert_eq!(position(square(pos)), pos);
        }
        assert_eq!(BOARD_SIZE, 13 * 14);
    }

    #[test]
    fn test_generate_move() {
        let mut board = Board::init();
        assert_eq!(board.generate_move(false).len(), 5 + 24 + 4 + 4 + 4 + 2 + 1);
        assert_eq!(board.legal_moves().len(), 44);
        assert!(board.generate_move(true).iter().all(|m| matches!(board.cell(m.to), Cell::Piece(_))));
        // 开局红方能吃子的只有两个炮打马
        assert_eq!(board.generate_move(true).len(), 2);
    }

    #[test]
    fn test_is_checked() {
        let board = Board::init();
        assert!(!board.in_check(Player::Red));
        assert!(!board.in_check(Player::Black));

        // 炮隔子将军
        let board = Board::from_fen("4k4/9/9/9/4p4/9/9/4C4/9/3K5 b").unwrap();
        assert!(board.in_check(Player::Black));
        // 马腿在将的斜角
        let board = Board::from_fen("3k5/9/4N4/9/9/9/9/9/9/4K4 b").unwrap();
        assert!(board.in_check(Player::Black));
        let board = Board::from_fen("3k5/4a4/4N4/9/9/9/9/9/9/4K4 b").unwrap();
        assert!(!board.in_check(Player::Black));
        // 将帅照面
        let board = Board::from_fen("4k4/9/9/9/9/9/9/9/9/4K4 w").unwrap();
        assert!(board.in_check(Player::Red));
        assert!(board.in_check(Player::Black));
        // 卒从侧面与正前方
        let board = Board::from_fen("3k5/9/9/9/9/9/9/9/3pK4/9 w").unwrap();
        assert!(board.in_check(Player::Red));
        let board = Board::from_fen("3k5/9/9/9/9/9/9/9/9/3pK4 w").unwrap();
        assert!(board.in_check(Player::Red));
        let board = Board::from_fen("3k5/9/9/9/9/9/9/9/9/4K3p w").unwrap();
        assert!(!board.in_check(Player::Red));
    }

    #[test]
    fn test_move_and_unmove() {
        let mut board = Board::init();
        let before = board.clone();
        for s in ["7174", "0122", "7471", "2201"] {
            assert!(board.is_legal(mv(s)));
            assert!(board.make_move(mv(s)));
            assert_eq!(board.incremental(), board.recompute());
        }
        // 兜了一圈回到开局，但历史不同
        assert_eq!(board.incremental(), before.incremental());
        assert_eq!(board.rep_status(1), 1);
        for _ in 0..4 {
            board.unmake_move();
        }
        assert_eq!(board, before);

        // 吃子再撤销
        assert!(board.make_move(mv("7101")));
        assert_eq!(board.last_captured(), Some(PieceType::Horse));
        assert_eq!(board.incremental(), board.recompute());
        board.unmake_move();
        assert_eq!(board, before);
    }

    #[test]
    fn test_evaluate() {
        let board = Board::init();
        // 对称局面只剩先行权
        assert_eq!(board.evaluate(), INITIATIVE_BONUS);
        let mut board = Board::init();
        board.make_move(mv("9080"));
        // 轮到黑方，红车位置分 194 -> 200
        assert_eq!(board.evaluate(), -(200 - 194) + INITIATIVE_BONUS);
    }

    #[test]
    fn test_null_move() {
        let mut board = Board::init();
        let before = board.clone();
        board.make_null_move();
        assert_eq!(board.turn, Player::Black);
        assert_ne!(board.zobrist_value, before.zobrist_value);
        assert_eq!(board.rep_status(1), 0);
        board.unmake_null_move();
        assert_eq!(board, before);
    }

    #[test]
    fn test_from_fen_errors() {
        assert!(Board::from_fen("9/9/9/9/9/9/9/9/9/4K4 w").is_err());
        assert!(Board::from_fen("3k5/9/9/9/9/9/9/9/9/RRR1K4 w").is_err());
        assert!(Board::from_fen("3k5/9/9/9/9/9/9/9/9/x3K4 w").is_err());
    }

    #[test]
    fn test_perpetual_check_status() {
        // 红车在 3、4 两列来回将军，黑将左右躲
        let mut board = Board::from_fen("4k4/9/9/9/9/3R5/9/9/9/5K3 w").unwrap();
        for s in ["5354", "0403", "5453", "0304"] {
            assert!(board.is_legal(mv(s)), "{}", s);
            board.make_move(mv(s));
        }
        // 红方走棋：重复且红方每步都在将军
        assert_eq!(board.rep_status(1), 1 + 2);
        board.make_move(mv("5354"));
        // 黑方走棋：对方长将
        assert_eq!(board.rep_status(1), 1 + 4);
    }

    #[test]
    fn test_irreversible_moves() {
        // 过河兵横走可逆
        let mut board = Board::from_fen("4k4/9/9/4P4/9/9/9/9/9/5K3 w").unwrap();
        for s in ["3433", "0403", "3334", "0304"] {
            assert!(board.is_legal(mv(s)), "{}", s);
            board.make_move(mv(s));
        }
        assert_eq!(board.rep_status(1), 1);
        // 前进不可逆，重复检测到此为止
        board.make_move(mv("3424"));
        assert!(board.history.last().unwrap().irreversible);
        assert_eq!(board.rep_status(1), 0);
    }

    proptest! {
        // 随机合法走子序列后逐步撤销，所有增量字段逐一还原
        #[test]
        fn make_unmake_restores_incremental_state(choices in proptest::collection::vec(0usize..128, 1..40)) {
            let mut board = Board::init();
            let mut snapshots = vec![];
            for choice in choices {
                let moves = board.legal_moves();
                if moves.is_empty() {
                    break;
                }
                snapshots.push(board.clone());
                prop_assert!(board.make_move(moves[choice % moves.len()]));
                prop_assert_eq!(board.incremental(), board.recompute());
            }
            while let Some(snapshot) = snapshots.pop() {
                board.unmake_move();
                prop_assert_eq!(&board, &snapshot);
            }
        }
    }
}
