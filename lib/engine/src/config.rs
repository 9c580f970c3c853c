/// 引擎参数。裁剪相关的常数都是经验值，放在这里便于调整
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// 迭代加深的最大深度
    pub max_depth: i32,
    /// 置换表桶数 = 2^hash_bits，每桶两个槽
    pub hash_bits: u32,
    /// 每个计时段的总时间（毫秒）
    pub max_time_ms: i64,
    /// 每个计时段的步数，0 表示整局包干
    pub max_moves: i32,
    /// 每步加秒（毫秒）
    pub time_inc_ms: i64,
    pub null_move_reduction: i32,
    pub null_move_min_depth: i32,
    pub lmr_min_depth: i32,
    /// 前几个走法不做减少
    pub lmr_min_moves: usize,
    pub lmr_reduction: i32,
    /// 根节点每走完一步检查一次，用时超过 单步分配时间 * root_abort_factor 即中止
    pub root_abort_factor: f64,
    /// 开局阶段给根节点走法加一点随机扰动
    pub randomize: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            max_depth: 6,
            hash_bits: 16,
            max_time_ms: 1_200_000,
            max_moves: 40,
            time_inc_ms: 0,
            null_move_reduction: 2,
            null_move_min_depth: 3,
            lmr_min_depth: 3,
            lmr_min_moves: 4,
            lmr_reduction: 1,
            root_abort_factor: 2.0,
            randomize: false,
        }
    }
}
