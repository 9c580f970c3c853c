/// 固定种子，保证每次启动得到相同的 Zobrist 表
const SEEDS: [u64; 4] = [
    0x9C5A_B3CE_BFD5_A71D,
    0x06BA_253B_9DD8_97CD,
    0x8015_B5E5_9CC2_75E9,
    0xF8F4_27FC_5411_DE53,
];

/// xoshiro256** 伪随机数发生器
#[derive(Clone, Debug)]
pub struct XoShiRo([u64; 4]);

impl XoShiRo {
    pub fn new() -> Self {
        Self(SEEDS)
    }

    /// 用任意 64 位种子初始化（splitmix64 展开成 4 个状态字）
    pub fn from_seed(seed: u64) -> Self {
        let mut x = seed;
        let mut s = [0u64; 4];
        for slot in s.iter_mut() {
            x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
            let mut z = x;
            z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
            z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
            *slot = z ^ (z >> 31);
        }
        Self(s)
    }

    /// 从操作系统取随机种子，失败时退回固定种子
    pub fn from_entropy() -> Self {
        let mut bytes = [0u8; 8];
        match getrandom::getrandom(&mut bytes) {
            Ok(()) => Self::from_seed(u64::from_le_bytes(bytes)),
            Err(err) => {
                log::warn!("no entropy available ({}), using the fixed seed", err);
                Self::new()
            }
        }
    }

    pub fn next_u64(&mut self) -> u64 {
        let s = &mut self.0;
        let result = s[1].wrapping_mul(5).rotate_left(7).wrapping_mul(9);
        let t = s[1] << 17;

        s[2] ^= s[0];
        s[3] ^= s[1];
        s[1] ^= s[2];
        s[0] ^= s[3];

        s[2] ^= t;
        s[3] = s[3].rotate_left(45);
        result
    }

    /// [lo, hi) 内的整数
    pub fn range(&mut self, lo: i32, hi: i32) -> i32 {
        let span = (hi - lo).max(1) as u64;
        lo + (self.next_u64() % span) as i32
    }
}

impl Default for XoShiRo {
    fn default() -> Self {
        Self::new()
    }
}
