use std::sync::LazyLock;

use common::{PieceType, BOARD_HEIGHT, BOARD_WIDTH};

/// 将死分值，实际返回 MATE_VALUE - 距根节点步数
pub const MATE_VALUE: i32 = 10000;
/// 长将判负分值
pub const BAN_VALUE: i32 = MATE_VALUE - 100;
/// 超过此值即视为杀棋
pub const WIN_VALUE: i32 = MATE_VALUE - 200;
pub const DRAW_VALUE: i32 = 0;
/// 先行权
pub const INITIATIVE_BONUS: i32 = 3;
/// 己方子力位置分高于此值才允许空着裁剪
pub const NULL_OKAY_MARGIN: i32 = 200;
pub const MAX_PLY: usize = 64;
/// 开局随机化只作用于前若干步
pub const RANDOM_OPENING_PLIES: usize = 8;

type Table = [[i32; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize];

// 子力位置价值表，以红方视角给出，黑方取中心对称位置。
// 下标顺序与 PieceType 一致
pub const PIECE_VALUES: [Table; 7] = [
    // 帅
    [
        [0, 0, 0, 0, 0, 0, 0, 0, 0],
        [0, 0, 0, 0, 0, 0, 0, 0, 0],
        [0, 0, 0, 0, 0, 0, 0, 0, 0],
        [0, 0, 0, 0, 0, 0, 0, 0, 0],
        [0, 0, 0, 0, 0, 0, 0, 0, 0],
        [0, 0, 0, 0, 0, 0, 0, 0, 0],
        [0, 0, 0, 0, 0, 0, 0, 0, 0],
        [0, 0, 0, 1, 1, 1, 0, 0, 0],
        [0, 0, 0, 2, 2, 2, 0, 0, 0],
        [0, 0, 0, 11, 15, 11, 0, 0, 0],
    ],
    // 仕
    [
        [0, 0, 0, 0, 0, 0, 0, 0, 0],
        [0, 0, 0, 0, 0, 0, 0, 0, 0],
        [0, 0, 0, 0, 0, 0, 0, 0, 0],
        [0, 0, 0, 0, 0, 0, 0, 0, 0],
        [0, 0, 0, 0, 0, 0, 0, 0, 0],
        [0, 0, 0, 0, 0, 0, 0, 0, 0],
        [0, 0, 0, 0, 0, 0, 0, 0, 0],
        [0, 0, 0, 20, 0, 20, 0, 0, 0],
        [0, 0, 0, 0, 23, 0, 0, 0, 0],
        [0, 0, 0, 20, 0, 20, 0, 0, 0],
    ],
    // 相
    [
        [0, 0, 0, 0, 0, 0, 0, 0, 0],
        [0, 0, 0, 0, 0, 0, 0, 0, 0],
        [0, 0, 0, 0, 0, 0, 0, 0, 0],
        [0, 0, 0, 0, 0, 0, 0, 0, 0],
        [0, 0, 0, 0, 0, 0, 0, 0, 0],
        [0, 0, 20, 0, 0, 0, 20, 0, 0],
        [0, 0, 0, 0, 0, 0, 0, 0, 0],
        [18, 0, 0, 0, 23, 0, 0, 0, 18],
        [0, 0, 0, 0, 0, 0, 0, 0, 0],
        [0, 0, 20, 0, 0, 0, 20, 0, 0],
    ],
    // 车
    [
        [206, 208, 207, 213, 214, 213, 207, 208, 206],
        [206, 212, 209, 216, 233, 216, 209, 212, 206],
        [206, 208, 207, 214, 216, 214, 207, 208, 206],
        [206, 213, 213, 216, 216, 216, 213, 213, 206],
        [208, 211, 211, 214, 215, 214, 211, 211, 208],
        [208, 212, 212, 214, 215, 214, 212, 212, 208],
        [204, 209, 204, 212, 214, 212, 204, 209, 204],
        [198, 208, 204, 212, 212, 212, 204, 208, 198],
        [200, 208, 206, 212, 200, 212, 206, 208, 200],
        [194, 206, 204, 212, 200, 212, 204, 206, 194],
    ],
    // 马
    [
        [90, 90, 90, 96, 90, 96, 90, 90, 90],
        [90, 96, 103, 97, 94, 97, 103, 96, 90],
        [92, 98, 99, 103, 99, 103, 99, 98, 92],
        [93, 108, 100, 107, 100, 107, 100, 108, 93],
        [90, 100, 99, 103, 104, 103, 99, 100, 90],
        [90, 98, 101, 102, 103, 102, 101, 98, 90],
        [92, 94, 98, 95, 98, 95, 98, 94, 92],
        [93, 92, 94, 95, 92, 95, 94, 92, 93],
        [85, 90, 92, 93, 78, 93, 92, 90, 85],
        [88, 85, 90, 88, 90, 88, 90, 85, 88],
    ],
    // 炮
    [
        [100, 100, 96, 91, 90, 91, 96, 100, 100],
        [98, 98, 96, 92, 89, 92, 96, 98, 98],
        [97, 97, 96, 91, 92, 91, 96, 97, 97],
        [96, 99, 99, 98, 100, 98, 99, 99, 96],
        [96, 96, 96, 96, 100, 96, 96, 96, 96],
        [95, 96, 99, 96, 100, 96, 99, 96, 95],
        [96, 96, 96, 96, 96, 96, 96, 96, 96],
        [97, 96, 100, 99, 101, 99, 100, 96, 97],
        [96, 97, 98, 98, 98, 98, 98, 97, 96],
        [96, 96, 97, 99, 99, 99, 97, 96, 96],
    ],
    // 兵
    [
        [9, 9, 9, 11, 13, 11, 9, 9, 9],
        [19, 24, 34, 42, 44, 42, 34, 24, 19],
        [19, 24, 32, 37, 37, 37, 32, 24, 19],
        [19, 23, 27, 29, 30, 29, 27, 23, 19],
        [14, 18, 20, 27, 29, 27, 20, 18, 14],
        [7, 0, 13, 0, 16, 0, 13, 0, 7],
        [7, 0, 7, 0, 15, 0, 7, 0, 7],
        [0, 0, 0, 0, 0, 0, 0, 0, 0],
        [0, 0, 0, 0, 0, 0, 0, 0, 0],
        [0, 0, 0, 0, 0, 0, 0, 0, 0],
    ],
];

/// 吃子排序用的粗略子力
pub fn material_value(kind: PieceType) -> i32 {
    match kind {
        PieceType::King => 10000,
        PieceType::Advisor => 20,
        PieceType::Elephant => 20,
        PieceType::Horse => 90,
        PieceType::Chariot => 200,
        PieceType::Cannon => 100,
        PieceType::Pawn => 10,
    }
}

/*
 * 子力组合表
 *
 * 每方的下标 = 己方进攻子力（车/炮/马/兵）+ 对方防守子力（仕/相），按下面的权重打包。
 * 最大 5*243 + 2*81 + 2*27 + 2*9 + 2*3 + 2*1 = 1457
 */
pub const MATERIAL_TABLE_SIZE: usize = 1458;

/// 子力组合下标中每个棋子的权重
pub fn material_weight(kind: PieceType) -> usize {
    match kind {
        PieceType::Pawn => 243,
        PieceType::Chariot => 81,
        PieceType::Cannon => 27,
        PieceType::Horse => 9,
        PieceType::Advisor => 3,
        PieceType::Elephant => 1,
        PieceType::King => 0,
    }
}

/// 仕相计入对方的下标
pub fn is_defender(kind: PieceType) -> bool {
    matches!(kind, PieceType::Advisor | PieceType::Elephant)
}

pub static MATERIAL_TABLE: LazyLock<[i32; MATERIAL_TABLE_SIZE]> = LazyLock::new(|| {
    let mut table = [0; MATERIAL_TABLE_SIZE];
    for (i, slot) in table.iter_mut().enumerate() {
        let n_p = (i / 243) as i32;
        let n_r = (i / 81 % 3) as i32;
        let n_c = (i / 27 % 3) as i32;
        let n_h = (i / 9 % 3) as i32;
        let n_a = (i / 3 % 3) as i32;
        let n_e = (i % 3) as i32;

        // 炮在子力密集时更强
        let density = n_a + n_e + n_p + 2 * (n_r + n_c + n_h);
        let mut total = n_c * (10 - (density - 20) * (density - 20) / 10);
        total += n_r * 10 + n_p * 5;
        // 仕相的价值随对方进攻子力变化
        let density = n_p + n_c + n_h + 2 * n_r;
        total += (n_a + n_e) * ((13 - density) * (13 - density) / 10 - 5);
        *slot = total;
    }
    table
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_material_table() {
        // 开局满子
        let full = 5 * 243 + 2 * 81 + 2 * 27 + 2 * 9 + 2 * 3 + 2;
        assert_eq!(full, MATERIAL_TABLE_SIZE - 1);
        // density = 2+2+5+12 = 21, 2*(10-0) + 20 + 25; density2 = 5+2+2+4 = 13 -> 4*(0-5)
        assert_eq!(MATERIAL_TABLE[full], 20 + 20 + 25 - 20);
        // 光杆：没有任何子力
        assert_eq!(MATERIAL_TABLE[0], 0);
        for v in MATERIAL_TABLE.iter() {
            assert!((-128..=127).contains(v));
        }
    }
}
