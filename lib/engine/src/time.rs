/*
 * 时间控制
 *
 * 每 max_moves 步为一个计时段，每段补充 max_time_ms；每走一步另加 time_inc_ms。
 * 单步分配 = 0.5 * (剩余时间 + (剩余步数 - 1) * 加秒) / (剩余步数 + 7)，不超过剩余时间的 1/10
 */
use std::time::Duration;

use crate::config::EngineConfig;

/// 整局包干时按 40 步估算
const SUDDEN_DEATH_MOVES: i64 = 40;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimeControl {
    max_time_ms: i64,
    max_moves: i32,
    inc_ms: i64,
    time_left_ms: i64,
    moves_left: i32,
}

impl TimeControl {
    pub fn new(config: &EngineConfig) -> Self {
        TimeControl {
            max_time_ms: config.max_time_ms,
            max_moves: config.max_moves,
            inc_ms: config.time_inc_ms,
            time_left_ms: config.max_time_ms,
            moves_left: config.max_moves,
        }
    }

    pub fn time_left_ms(&self) -> i64 {
        self.time_left_ms
    }

    pub fn moves_left(&self) -> i32 {
        self.moves_left
    }

    /// 这一步的软时限
    pub fn allocate(&self) -> Duration {
        let moves = if self.moves_left <= 0 { SUDDEN_DEATH_MOVES } else { self.moves_left as i64 };
        let budget = (self.time_left_ms + (moves - 1) * self.inc_ms) / (2 * (moves + 7));
        let budget = budget.min(self.time_left_ms / 10).max(0);
        Duration::from_millis(budget as u64)
    }

    /// 记账：扣掉本步用时，加上加秒，到段末补时
    pub fn record_move(&mut self, used: Duration) {
        self.time_left_ms -= used.as_millis() as i64;
        self.time_left_ms += self.inc_ms;
        if self.max_moves <= 0 {
            return;
        }
        self.moves_left -= 1;
        if self.moves_left <= 0 {
            self.moves_left = self.max_moves;
            if self.max_moves == 1 {
                self.time_left_ms = self.max_time_ms;
            } else {
                self.time_left_ms += self.max_time_ms;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn control(max_time_ms: i64, max_moves: i32, time_inc_ms: i64) -> TimeControl {
        TimeControl::new(&EngineConfig {
            max_time_ms,
            max_moves,
            time_inc_ms,
            ..EngineConfig::default()
        })
    }

    #[test]
    fn test_allocate() {
        // 40 步 1200 秒：0.5 * 1200000 / 47
        let tc = control(1_200_000, 40, 0);
        assert_eq!(tc.allocate(), Duration::from_millis(1_200_000 / 94));

        // 整局包干带加秒
        let tc = control(60_000, 0, 1_000);
        assert_eq!(tc.allocate(), Duration::from_millis((60_000 + 39 * 1_000) / 94));

        // 最后一步也不超过剩余时间的 1/10
        let tc = control(10_000, 1, 0);
        assert_eq!(tc.allocate(), Duration::from_millis(625));
        let tc = control(10_000, 2, 100_000);
        assert_eq!(tc.allocate(), Duration::from_millis(1_000));
    }

    #[test]
    fn test_record_move() {
        let mut tc = control(10_000, 2, 500);
        tc.record_move(Duration::from_millis(3_000));
        assert_eq!((tc.time_left_ms(), tc.moves_left()), (7_500, 1));
        // 段末补时
        tc.record_move(Duration::from_millis(1_000));
        assert_eq!((tc.time_left_ms(), tc.moves_left()), (17_000, 2));

        // 每步一段时直接重置
        let mut tc = control(5_000, 1, 0);
        tc.record_move(Duration::from_millis(4_000));
        assert_eq!((tc.time_left_ms(), tc.moves_left()), (5_000, 1));

        // 超时后分配为 0
        let mut tc = control(1_000, 0, 0);
        tc.record_move(Duration::from_millis(2_000));
        assert_eq!(tc.allocate(), Duration::ZERO);
    }
}
