/*
 * 置换表
 *
 * 每个桶两个槽，以 zobrist_value 低位定位桶，zobrist_value_lock 校验。
 * 写入时同一局面直接覆盖，否则替换深度较浅（或为空）的槽
 */
use crate::board::{Board, Move};
use crate::constant::{BAN_VALUE, WIN_VALUE};

/// 置换表记录的类型标志
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum HashFlag {
    Exact, // 精确值
    Alpha, // 上界 (fail-low)
    Beta,  // 下界 (fail-high)
}

/// 置换表记录
#[derive(Clone, Copy, Debug)]
pub struct Record {
    pub zobrist_lock: u64,
    pub depth: i32,
    pub flag: HashFlag,
    pub best_move: Option<Move>,
    pub value: i32,
}

pub struct TranspositionTable {
    buckets: Vec<[Option<Record>; 2]>,
    mask: u64,
}

impl TranspositionTable {
    pub fn new(bits: u32) -> Self {
        let size = 1usize << bits;
        TranspositionTable {
            buckets: vec![[None, None]; size],
            mask: size as u64 - 1,
        }
    }

    pub fn clear(&mut self) {
        self.buckets.iter_mut().for_each(|bucket| *bucket = [None, None]);
    }

    fn bucket(&self, board: &Board) -> usize {
        (board.zobrist_value & self.mask) as usize
    }

    /// 查表。深度足够且边界相容时返回分值，否则只给出最佳走法作排序提示。
    /// 杀棋分按 distance 还原成相对当前节点的步数
    pub fn find_record(&self, board: &Board, alpha: i32, beta: i32, depth: i32, distance: i32) -> (Option<i32>, Option<Move>) {
        let Some(record) = self.buckets[self.bucket(board)]
            .iter()
            .flatten()
            .find(|r| r.zobrist_lock == board.zobrist_value_lock)
        else {
            return (None, None);
        };

        let mut value = record.value;
        if value > WIN_VALUE {
            value -= distance;
        } else if value < -WIN_VALUE {
            value += distance;
        }

        if record.depth >= depth {
            let usable = match record.flag {
                HashFlag::Exact => true,
                HashFlag::Alpha => value <= alpha,
                HashFlag::Beta => value >= beta,
            };
            if usable {
                return (Some(value), record.best_move);
            }
        }
        (None, record.best_move)
    }

    pub fn add_record(&mut self, board: &Board, depth: i32, mut value: i32, flag: HashFlag, best_move: Option<Move>, distance: i32) {
        // 长将判负的分值与路径有关，不入表
        if value.abs() > WIN_VALUE && value.abs() <= BAN_VALUE {
            return;
        }
        if value > WIN_VALUE {
            value += distance;
        } else if value < -WIN_VALUE {
            value -= distance;
        }

        let lock = board.zobrist_value_lock;
        let index = self.bucket(board);
        let bucket = &mut self.buckets[index];
        let slot = match bucket.iter().position(|r| r.is_some_and(|r| r.zobrist_lock == lock)) {
            Some(i) => {
                if bucket[i].is_some_and(|r| r.depth > depth && r.flag == HashFlag::Exact) {
                    return;
                }
                i
            }
            None => {
                let depth_of = |r: &Option<Record>| r.map_or(-1, |r| r.depth);
                if depth_of(&bucket[0]) <= depth_of(&bucket[1]) { 0 } else { 1 }
            }
        };
        bucket[slot] = Some(Record {
            zobrist_lock: lock,
            depth,
            flag,
            best_move,
            value,
        });
    }
}
