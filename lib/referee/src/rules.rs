/* 走子规则：每种棋子的几何判定，以及枚举候选落点 */
use common::{PieceInfo, PieceType, Position, BOARD_HEIGHT, BOARD_WIDTH};

use crate::board::Board;

const ORTHOGONAL: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
const DIAGONAL: [(i32, i32); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];
const ELEPHANT: [(i32, i32); 4] = [(-2, -2), (-2, 2), (2, -2), (2, 2)];
const HORSE: [(i32, i32); 8] = [
    (-2, -1),
    (-2, 1),
    (2, -1),
    (2, 1),
    (-1, -2),
    (1, -2),
    (-1, 2),
    (1, 2),
];

/// 按棋子类型判断能否从当前位置走到 `to`。
///
/// 只看几何规则与棋盘占用；是否吃了己方的子由调用方另外判断，
/// 炮例外：隔子吃的必须是敌方棋子。
pub fn can_move_to(board: &Board, piece: &PieceInfo, to: Position) -> bool {
    let from = piece.position;
    if !to.is_valid() || from == to {
        return false;
    }
    let row_diff = (to.row - from.row).abs();
    let col_diff = (to.col - from.col).abs();

    match piece.kind {
        PieceType::King => to.in_palace(piece.player) && row_diff + col_diff == 1,
        PieceType::Advisor => to.in_palace(piece.player) && row_diff == 1 && col_diff == 1,
        PieceType::Elephant => {
            // 象眼被塞则不能走
            to.in_country(piece.player)
                && row_diff == 2
                && col_diff == 2
                && !board.occupied(Position::new((from.row + to.row) / 2, (from.col + to.col) / 2))
        }
        PieceType::Horse => {
            if row_diff == 2 && col_diff == 1 {
                // 蹩马腿：纵向
                !board.occupied(Position::new((from.row + to.row) / 2, from.col))
            } else if row_diff == 1 && col_diff == 2 {
                // 横向
                !board.occupied(Position::new(from.row, (from.col + to.col) / 2))
            } else {
                false
            }
        }
        PieceType::Chariot => (row_diff == 0 || col_diff == 0) && board.count_between(from, to) == 0,
        PieceType::Cannon => {
            if row_diff != 0 && col_diff != 0 {
                return false;
            }
            match board.piece_at(to) {
                Some(target) => target.player != piece.player && board.count_between(from, to) == 1,
                None => board.count_between(from, to) == 0,
            }
        }
        PieceType::Pawn => {
            let forward = to.row == from.row + piece.player.forward() && col_diff == 0;
            if from.in_country(piece.player) {
                forward
            } else {
                forward || (row_diff == 0 && col_diff == 1)
            }
        }
    }
}

/// 枚举棋子几何上可能到达的格子（未经规则过滤）。
/// 车、炮为整行整列，其余为固定步长
pub fn candidates(piece: &PieceInfo) -> impl Iterator<Item = Position> {
    let from = piece.position;
    let steps: &'static [(i32, i32)] = match piece.kind {
        PieceType::King | PieceType::Pawn => &ORTHOGONAL,
        PieceType::Advisor => &DIAGONAL,
        PieceType::Elephant => &ELEPHANT,
        PieceType::Horse => &HORSE,
        PieceType::Chariot | PieceType::Cannon => &[],
    };
    let slides = matches!(piece.kind, PieceType::Chariot | PieceType::Cannon);
    let file = (0..BOARD_HEIGHT)
        .filter(move |_| slides)
        .map(move |row| Position::new(row, from.col));
    let rank = (0..BOARD_WIDTH)
        .filter(move |_| slides)
        .map(move |col| Position::new(from.row, col));

    steps
        .iter()
        .map(move |&(d_row, d_col)| from.offset(d_row, d_col))
        .chain(file)
        .chain(rank)
        .filter(move |pos| pos.is_valid() && *pos != from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::Player;

    fn lone(kind: PieceType, player: Player, from: Position) -> (Board, PieceInfo) {
        let piece = PieceInfo::new(kind, player, from);
        (Board::from_pieces(&[piece], player), piece)
    }

    // 与走法表逐条对照的独立实现
    fn expected(kind: PieceType, player: Player, from: Position, to: Position) -> bool {
        if from == to {
            return false;
        }
        let dr = to.row - from.row;
        let dc = to.col - from.col;
        match kind {
            PieceType::King => to.in_palace(player) && dr.abs() + dc.abs() == 1,
            PieceType::Advisor => to.in_palace(player) && dr.abs() == 1 && dc.abs() == 1,
            PieceType::Elephant => to.in_country(player) && dr.abs() == 2 && dc.abs() == 2,
            PieceType::Horse => (dr.abs() == 1 && dc.abs() == 2) || (dr.abs() == 2 && dc.abs() == 1),
            PieceType::Chariot | PieceType::Cannon => dr == 0 || dc == 0,
            PieceType::Pawn => {
                let forward = dr == player.forward() && dc == 0;
                if from.in_country(player) {
                    forward
                } else {
                    forward || (dr == 0 && dc.abs() == 1)
                }
            }
        }
    }

    #[test]
    fn test_empty_board_predicates() {
        for kind in PieceType::ALL {
            for player in Player::ALL {
                for from in Position::all() {
                    let (board, piece) = lone(kind, player, from);
                    for to in Position::all() {
                        assert_eq!(
                            can_move_to(&board, &piece, to),
                            expected(kind, player, from, to),
                            "{:?} {:?} {} -> {}",
                            kind,
                            player,
                            from,
                            to
                        );
                    }
                    // 候选集合必须覆盖所有可达格
                    let reachable = Position::all().filter(|&to| can_move_to(&board, &piece, to));
                    let listed: Vec<_> = candidates(&piece).collect();
                    for to in reachable {
                        assert!(listed.contains(&to), "{:?} {} -> {} not listed", kind, from, to);
                    }
                }
            }
        }
    }

    #[test]
    fn test_off_board_target() {
        let (board, piece) = lone(PieceType::Chariot, Player::Red, Position::new(0, 0));
        assert!(!can_move_to(&board, &piece, Position::new(-1, 0)));
        assert!(!can_move_to(&board, &piece, Position::new(0, 9)));
    }

    #[test]
    fn test_blocked_moves() {
        let board = Board::from_pieces(
            &[
                PieceInfo::new(PieceType::Horse, Player::Red, Position::new(9, 1)),
                PieceInfo::new(PieceType::Pawn, Player::Red, Position::new(8, 1)),
                PieceInfo::new(PieceType::Chariot, Player::Red, Position::new(9, 8)),
                PieceInfo::new(PieceType::Pawn, Player::Black, Position::new(5, 8)),
            ],
            Player::Red,
        );
        let horse = board.piece_at(Position::new(9, 1)).unwrap();
        assert!(!can_move_to(&board, &horse, Position::new(7, 0)));
        assert!(!can_move_to(&board, &horse, Position::new(7, 2)));
        assert!(can_move_to(&board, &horse, Position::new(8, 3)));

        let chariot = board.piece_at(Position::new(9, 8)).unwrap();
        assert!(can_move_to(&board, &chariot, Position::new(5, 8)));
        assert!(!can_move_to(&board, &chariot, Position::new(4, 8)));
    }

    #[test]
    fn test_cannon_screen() {
        let board = Board::from_pieces(
            &[
                PieceInfo::new(PieceType::Cannon, Player::Red, Position::new(7, 1)),
                PieceInfo::new(PieceType::Pawn, Player::Red, Position::new(5, 1)),
                PieceInfo::new(PieceType::Horse, Player::Red, Position::new(3, 1)),
                PieceInfo::new(PieceType::Horse, Player::Black, Position::new(1, 1)),
            ],
            Player::Red,
        );
        let cannon = board.piece_at(Position::new(7, 1)).unwrap();
        // 隔一子只能吃敌方
        assert!(!can_move_to(&board, &cannon, Position::new(3, 1)));
        assert!(can_move_to(&board, &cannon, Position::new(6, 1)));
        assert!(!can_move_to(&board, &cannon, Position::new(4, 1)));
        // 隔两子不能吃
        assert!(!can_move_to(&board, &cannon, Position::new(1, 1)));
    }

    #[test]
    fn test_candidate_counts() {
        let (_, rook) = lone(PieceType::Chariot, Player::Red, Position::new(4, 4));
        assert_eq!(candidates(&rook).count(), 9 + 8);
        let (_, horse) = lone(PieceType::Horse, Player::Black, Position::new(0, 0));
        assert_eq!(candidates(&horse).count(), 2);
        let (_, king) = lone(PieceType::King, Player::Red, Position::new(9, 4));
        assert_eq!(candidates(&king).count(), 3);
    }
}
