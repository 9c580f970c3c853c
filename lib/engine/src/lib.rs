/**
 * 详细中文注释 - 引擎核心库入口
 *
 * 说明
 * - board: 带保护带的一维棋盘，增量维护哈希与评估
 * - search / tt: 迭代加深 PVS 搜索与置换表
 * - time / config: 计时与搜索参数
 * - engine: 对外接口，收发坐标走法
 */
pub mod board;
pub mod config;
pub mod constant;
pub mod engine;
pub mod error;
pub mod prng;
pub mod search;
pub mod time;
pub mod tt;
pub mod zobrist;

pub use config::EngineConfig;
pub use engine::Engine;
pub use error::EngineError;
