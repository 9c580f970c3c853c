/*
 * Zobrist 哈希键
 *
 * 每个 (棋子类型, 颜色, 格子) 有两组独立的随机数：zobrist_value 用作置换表下标与重复检测，
 * zobrist_value_lock 用作置换表校验。走棋方也参与哈希
 */
use std::sync::LazyLock;

use common::{PieceType, Player};

use crate::board::{Square, BOARD_SIZE};
use crate::prng::XoShiRo;

pub struct Zobristable {
    pieces: [[u64; BOARD_SIZE]; 14],
    player: u64,
}

impl Zobristable {
    fn new(rng: &mut XoShiRo) -> Self {
        let mut pieces = [[0u64; BOARD_SIZE]; 14];
        for row in pieces.iter_mut() {
            for key in row.iter_mut() {
                *key = rng.next_u64();
            }
        }
        Zobristable {
            pieces,
            player: rng.next_u64(),
        }
    }

    pub fn piece(&self, kind: PieceType, player: Player, sq: Square) -> u64 {
        self.pieces[player.index() * 7 + kind.index()][sq]
    }

    /// 黑方走棋时异或
    pub fn player(&self) -> u64 {
        self.player
    }
}

pub struct ZobristTables {
    pub value: Zobristable,
    pub lock: Zobristable,
}

pub static ZOBRIST: LazyLock<ZobristTables> = LazyLock::new(|| {
    let mut rng = XoShiRo::new();
    let value = Zobristable::new(&mut rng);
    let lock = Zobristable::new(&mut rng);
    ZobristTables { value, lock }
});
