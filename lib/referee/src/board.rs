/*
 * 裁判棋盘 - 活子/死子集合 + 9x10 格子索引
 *
 * 设计要点
 * - 所有棋子放在 pieces 数组里，用下标 PieceId 引用，位置随走子更新
 * - live 与 dead 互斥；活子恰好出现在一个格子里，死子不出现在任何格子里
 * - 只通过 record_move / undo_move 修改，二者严格互逆
 * - 簿记不一致属于程序错误：记 error 日志，开发构建下直接断言失败
 */
use std::collections::BTreeSet;
use std::fmt;

use common::{initial_setup, PieceInfo, PieceType, Player, Position, BOARD_HEIGHT, BOARD_WIDTH};
use log::error;

use crate::rules;

pub type PieceId = usize;

/// 一次已落到棋盘上的走子，撤销时需要
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Applied {
    pub mover: PieceId,
    pub from: Position,
    pub captured: Option<PieceId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    pieces: Vec<PieceInfo>,
    live: BTreeSet<PieceId>,
    dead: Vec<PieceId>,
    cells: [[Option<PieceId>; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize],
    pub next_player: Player,
}

/// 内部错误：记录日志，开发构建下中止
macro_rules! fault {
    ($($arg:tt)*) => {{
        error!($($arg)*);
        debug_assert!(false, $($arg)*);
    }};
}

impl Default for Board {
    fn default() -> Self {
        Board::init()
    }
}

impl Board {
    // 标准开局，红方先走
    pub fn init() -> Self {
        Board::from_pieces(&initial_setup(), Player::Red)
    }

    pub fn empty(next_player: Player) -> Self {
        Board {
            pieces: vec![],
            live: BTreeSet::new(),
            dead: vec![],
            cells: [[None; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize],
            next_player,
        }
    }

    /// 按给定棋子摆出任意局面，越界或重叠的子被忽略
    pub fn from_pieces(pieces: &[PieceInfo], next_player: Player) -> Self {
        let mut board = Board::empty(next_player);
        for piece in pieces {
            board.place(*piece);
        }
        board
    }

    pub fn place(&mut self, piece: PieceInfo) -> Option<PieceId> {
        if !piece.position.is_valid() || self.occupied(piece.position) {
            return None;
        }
        let id = self.pieces.len();
        self.pieces.push(piece);
        self.live.insert(id);
        self.set(id);
        Some(id)
    }

    pub fn piece(&self, id: PieceId) -> PieceInfo {
        self.pieces[id]
    }

    pub fn id_at(&self, pos: Position) -> Option<PieceId> {
        if pos.is_valid() {
            self.cells[pos.row as usize][pos.col as usize]
        } else {
            None
        }
    }

    pub fn piece_at(&self, pos: Position) -> Option<PieceInfo> {
        self.id_at(pos).map(|id| self.pieces[id])
    }

    pub fn occupied(&self, pos: Position) -> bool {
        self.id_at(pos).is_some()
    }

    pub fn live_pieces(&self) -> impl Iterator<Item = PieceInfo> + '_ {
        self.live.iter().map(|&id| self.pieces[id])
    }

    pub fn dead_pieces(&self) -> impl Iterator<Item = PieceInfo> + '_ {
        self.dead.iter().map(|&id| self.pieces[id])
    }

    fn live_ids_of(&self, player: Player) -> Vec<PieceId> {
        self.live
            .iter()
            .copied()
            .filter(|&id| self.pieces[id].player == player)
            .collect()
    }

    // 两点同行或同列时，中间（不含两端）的棋子数
    pub fn count_between(&self, a: Position, b: Position) -> usize {
        if a.row == b.row {
            (a.col.min(b.col) + 1..a.col.max(b.col))
                .filter(|&col| self.occupied(Position::new(a.row, col)))
                .count()
        } else if a.col == b.col {
            (a.row.min(b.row) + 1..a.row.max(b.row))
                .filter(|&row| self.occupied(Position::new(row, a.col)))
                .count()
        } else {
            0
        }
    }

    fn set(&mut self, id: PieceId) {
        let pos = self.pieces[id].position;
        let cell = &mut self.cells[pos.row as usize][pos.col as usize];
        if let Some(other) = cell {
            fault!("cell {} already holds piece {} while setting {}", pos, other, id);
            return;
        }
        *cell = Some(id);
    }

    fn unset(&mut self, id: PieceId) {
        let pos = self.pieces[id].position;
        let cell = &mut self.cells[pos.row as usize][pos.col as usize];
        if *cell != Some(id) {
            fault!("piece {} is not at its recorded cell {}", id, pos);
            return;
        }
        *cell = None;
    }

    fn capture(&mut self, id: PieceId) {
        self.unset(id);
        self.live.remove(&id);
        self.dead.push(id);
    }

    fn putback(&mut self, id: PieceId) {
        match self.dead.iter().rposition(|&d| d == id) {
            Some(i) => {
                self.dead.remove(i);
            }
            None => {
                fault!("piece {} is not in the dead list", id);
                return;
            }
        }
        self.live.insert(id);
        self.set(id);
    }

    fn move_to(&mut self, id: PieceId, to: Position) {
        self.unset(id);
        self.pieces[id].position = to;
        self.set(id);
    }

    /// 把走子落到棋盘上，目标格有子则吃掉；不检查合法性
    pub fn record_move(&mut self, from: Position, to: Position) -> Option<Applied> {
        let Some(mover) = self.id_at(from) else {
            fault!("no piece at {} to move", from);
            return None;
        };
        let captured = self.id_at(to);
        if let Some(victim) = captured {
            self.capture(victim);
        }
        self.move_to(mover, to);
        Some(Applied { mover, from, captured })
    }

    pub fn undo_move(&mut self, applied: Applied) {
        self.move_to(applied.mover, applied.from);
        if let Some(victim) = applied.captured {
            self.putback(victim);
        }
    }

    pub fn king(&self, player: Player) -> Option<PieceInfo> {
        self.live_pieces()
            .find(|p| p.kind == PieceType::King && p.player == player)
    }

    // 任一敌方活子按走法规则能到达将/帅所在格，即为被将军
    pub fn is_king_checked(&self, player: Player) -> bool {
        let Some(king) = self.king(player) else {
            fault!("{} king is missing", player);
            return true;
        };
        self.live_pieces()
            .filter(|p| p.player != player)
            .any(|p| rules::can_move_to(self, &p, king.position))
    }

    // 将帅同列且中间无子
    pub fn kings_facing(&self) -> bool {
        match (self.king(Player::Red), self.king(Player::Black)) {
            (Some(red), Some(black)) => {
                red.position.col == black.position.col
                    && self.count_between(red.position, black.position) == 0
            }
            _ => false,
        }
    }

    /// 走子是否合法（几何规则 + 不吃己方子 + 走后己方不被将军且将帅不照面）。
    /// 模拟执行后撤销，不改变棋盘
    pub fn is_legal(&mut self, from: Position, to: Position) -> bool {
        let Some(piece) = self.piece_at(from) else {
            return false;
        };
        if self.piece_at(to).is_some_and(|p| p.player == piece.player) {
            return false;
        }
        if !rules::can_move_to(self, &piece, to) {
            return false;
        }
        let Some(applied) = self.record_move(from, to) else {
            return false;
        };
        let safe = !self.is_king_checked(piece.player) && !self.kings_facing();
        self.undo_move(applied);
        safe
    }

    /// 某方是否还有至少一步合法着法
    pub fn next_move_exists(&mut self, player: Player) -> bool {
        for id in self.live_ids_of(player) {
            let piece = self.pieces[id];
            for to in rules::candidates(&piece) {
                if self.is_legal(piece.position, to) {
                    return true;
                }
            }
        }
        false
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "   0 1 2 3 4 5 6 7 8")?;
        for row in 0..BOARD_HEIGHT {
            write!(f, "{:>2} ", row)?;
            for col in 0..BOARD_WIDTH {
                let c = match self.piece_at(Position::new(row, col)) {
                    Some(p) => p.symbol(),
                    None => '.',
                };
                write!(f, "{}", c)?;
                if col + 1 < BOARD_WIDTH {
                    write!(f, " ")?;
                }
            }
            writeln!(f)?;
            if row == BOARD_HEIGHT / 2 - 1 {
                writeln!(f, "   -----------------")?;
            }
        }
        write!(f, "{} to move", self.next_player)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn p(kind: PieceType, player: Player, row: i32, col: i32) -> PieceInfo {
        PieceInfo::new(kind, player, Position::new(row, col))
    }

    #[test]
    fn test_init() {
        let board = Board::init();
        assert_eq!(board.live_pieces().count(), 32);
        assert_eq!(board.dead_pieces().count(), 0);
        assert_eq!(
            board.piece_at(Position::new(9, 4)),
            Some(p(PieceType::King, Player::Red, 9, 4))
        );
        assert_eq!(board.piece_at(Position::new(4, 4)), None);
        assert_eq!(board.piece_at(Position::new(-1, 4)), None);
        assert!(!board.is_king_checked(Player::Red));
        assert!(!board.kings_facing());
    }

    #[test]
    fn test_record_and_undo_capture() {
        let mut board = Board::init();
        let before = board.clone();
        // 红炮隔着黑炮打马
        let applied = board.record_move(Position::new(7, 1), Position::new(0, 1)).unwrap();
        assert_eq!(board.dead_pieces().collect::<Vec<_>>(), vec![p(PieceType::Horse, Player::Black, 0, 1)]);
        assert_eq!(board.live_pieces().count(), 31);
        assert_eq!(
            board.piece_at(Position::new(0, 1)).map(|p| p.kind),
            Some(PieceType::Cannon)
        );
        board.undo_move(applied);
        assert_eq!(board, before);
    }

    #[test]
    fn test_kings_facing() {
        let mut board = Board::from_pieces(
            &[
                p(PieceType::King, Player::Red, 9, 4),
                p(PieceType::King, Player::Black, 0, 4),
                p(PieceType::Horse, Player::Red, 5, 4),
            ],
            Player::Red,
        );
        assert!(!board.kings_facing());
        // 马离开中线后将帅照面
        assert!(!board.is_legal(Position::new(5, 4), Position::new(3, 3)));
        let applied = board.record_move(Position::new(5, 4), Position::new(3, 3)).unwrap();
        assert!(board.kings_facing());
        board.undo_move(applied);
        assert!(!board.kings_facing());
    }

    #[test]
    fn test_check_detection() {
        let board = Board::from_pieces(
            &[
                p(PieceType::King, Player::Red, 9, 4),
                p(PieceType::King, Player::Black, 0, 3),
                p(PieceType::Horse, Player::Black, 7, 3),
                p(PieceType::Pawn, Player::Black, 8, 5),
            ],
            Player::Red,
        );
        // 马腿 (8,3) 为空，马将军
        assert!(board.is_king_checked(Player::Red));
        assert!(!board.is_king_checked(Player::Black));

        let blocked = Board::from_pieces(
            &[
                p(PieceType::King, Player::Red, 9, 4),
                p(PieceType::King, Player::Black, 0, 3),
                p(PieceType::Horse, Player::Black, 7, 3),
                p(PieceType::Advisor, Player::Red, 8, 3),
            ],
            Player::Red,
        );
        assert!(!blocked.is_king_checked(Player::Red));
    }

    #[test]
    fn test_next_move_exists() {
        assert!(Board::init().next_move_exists(Player::Red));
        assert!(Board::init().next_move_exists(Player::Black));

        // 铁门栓：红帅被车与对面将控制，无子可动
        let mut board = Board::from_pieces(
            &[
                p(PieceType::King, Player::Red, 9, 3),
                p(PieceType::King, Player::Black, 0, 4),
                p(PieceType::Chariot, Player::Black, 8, 0),
                p(PieceType::Chariot, Player::Black, 0, 3),
            ],
            Player::Red,
        );
        assert!(!board.next_move_exists(Player::Red));
    }

    #[test]
    fn test_display() {
        let text = Board::init().to_string();
        assert!(text.starts_with("   0 1 2 3 4 5 6 7 8\n 0 r n b a k a b n r"));
        assert!(text.contains(" 9 R N B A K A B N R"));
        assert!(text.ends_with("red to move"));
    }

    proptest! {
        // 随机走若干步合法着法后逐步撤销，棋盘必须逐字段还原
        #[test]
        fn record_undo_restores_board(choices in proptest::collection::vec(0usize..200, 1..24)) {
            let mut board = Board::init();
            let mut stack = vec![];
            let mut snapshots = vec![];
            for choice in choices {
                let player = board.next_player;
                let mut legal = vec![];
                let pieces: Vec<_> = board.live_ids_of(player).into_iter().map(|id| board.piece(id)).collect();
                for piece in pieces {
                    for to in rules::candidates(&piece) {
                        if board.is_legal(piece.position, to) {
                            legal.push((piece.position, to));
                        }
                    }
                }
                if legal.is_empty() {
                    break;
                }
                let (from, to) = legal[choice % legal.len()];
                snapshots.push(board.clone());
                stack.push(board.record_move(from, to).unwrap());
                board.next_player = player.next();
            }
            while let Some(applied) = stack.pop() {
                board.next_player = board.next_player.next();
                board.undo_move(applied);
                prop_assert_eq!(&board, &snapshots.pop().unwrap());
            }
            prop_assert_eq!(board, Board::init());
        }
    }
}
