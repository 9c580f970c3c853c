/*
 * 对局门面
 *
 * 同一局棋有两份棋盘：裁判 (referee) 负责判定人类走法与胜负，引擎 (engine) 负责搜索。
 * 两者只通过四位坐标走法交换信息，调试构建下每步之后核对两份棋盘是否一致
 */
pub mod cli;

use common::{GameStatus, Move, MoveCoords, PieceInfo, Player, Position};
use engine::{Engine, EngineConfig, EngineError};
use log::{debug, error, info};
use referee::{Referee, Rejection};

/// 难度等级对应的搜索深度，越界时取最弱一档
pub const DIFFICULTY_DEPTHS: [i32; 3] = [2, 6, 9];

/// 引擎这一步的结果
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum EngineMove {
    Move { coords: MoveCoords, status: GameStatus },
    /// 引擎无子可动，认输
    Resign,
    /// 对局已经结束，不再走子
    GameOver(GameStatus),
}

pub struct Game {
    referee: Referee,
    engine: Engine,
}

impl Game {
    pub fn new(config: EngineConfig) -> Self {
        Game {
            referee: Referee::new(),
            engine: Engine::new(config),
        }
    }

    /// 从类 FEN 串摆出残局，两份棋盘同时初始化
    pub fn from_fen(config: EngineConfig, fen: &str) -> Result<Self, EngineError> {
        let mut engine = Engine::new(config);
        engine.load_fen(fen)?;
        let pieces: Vec<PieceInfo> = Position::all()
            .filter_map(|pos| engine.piece_at(pos).map(|(kind, player)| PieceInfo::new(kind, player, pos)))
            .collect();
        let referee = Referee::from_position(&pieces, engine.next_player());
        Ok(Game { referee, engine })
    }

    /// 两边都回到开局，红先
    pub fn reset_game(&mut self) -> bool {
        self.referee.reset_game();
        self.engine.init_game();
        info!("new game");
        self.cross_check()
    }

    /// 返回实际使用的搜索深度
    pub fn set_difficulty_level(&mut self, level: i32) -> i32 {
        let depth = usize::try_from(level)
            .ok()
            .and_then(|i| DIFFICULTY_DEPTHS.get(i))
            .copied()
            .unwrap_or(DIFFICULTY_DEPTHS[0]);
        self.engine.set_max_depth(depth);
        debug!("difficulty level {} -> depth {}", level, depth);
        depth
    }

    pub fn max_depth(&self) -> i32 {
        self.engine.max_depth()
    }

    /// 人类走子：裁判判定，接受后同步给引擎
    pub fn submit_human_move(
        &mut self,
        from_row: i32,
        from_col: i32,
        to_row: i32,
        to_col: i32,
    ) -> Result<GameStatus, Rejection> {
        let coords = MoveCoords::from_digits(from_row, from_col, to_row, to_col).map_err(|_| Rejection::OffBoard)?;
        let piece = self.referee.piece_at(coords.from).ok_or(Rejection::NoPiece)?;
        let mut mv = Move::new(piece, coords.to);
        let status = self.referee.validate_move(&mut mv)?;

        if let Err(err) = self.engine.on_opponent_move(coords) {
            error!("engine refused {} accepted by the referee: {}", coords, err);
            debug_assert!(false, "engine refused {}: {}", coords, err);
        }
        self.cross_check();
        Ok(status)
    }

    /// 引擎搜索并走一步，同时交给裁判记录
    pub fn generate_engine_move(&mut self) -> EngineMove {
        let status = self.referee.status();
        if status.is_over() {
            return EngineMove::GameOver(status);
        }
        let Some(coords) = self.engine.generate_move() else {
            return EngineMove::Resign;
        };
        let Some(piece) = self.referee.piece_at(coords.from) else {
            error!("engine moved from an empty square {}", coords);
            debug_assert!(false, "engine moved from an empty square {}", coords);
            return EngineMove::Resign;
        };
        let mut mv = Move::new(piece, coords.to);
        match self.referee.validate_move(&mut mv) {
            Ok(status) => {
                self.cross_check();
                EngineMove::Move { coords, status }
            }
            Err(reason) => {
                error!("referee rejected engine move {}: {}", coords, reason);
                debug_assert!(false, "referee rejected engine move {}: {}", coords, reason);
                EngineMove::Resign
            }
        }
    }

    pub fn piece_at(&self, row: i32, col: i32) -> Option<PieceInfo> {
        self.referee.piece_at(Position::new(row, col))
    }

    pub fn next_player(&self) -> Player {
        self.referee.next_player()
    }

    pub fn status(&self) -> GameStatus {
        self.referee.status()
    }

    pub fn referee(&self) -> &Referee {
        &self.referee
    }

    // 核对两份棋盘，只在调试构建下执行
    fn cross_check(&self) -> bool {
        if !cfg!(debug_assertions) {
            return true;
        }
        let mismatch = Position::all().find(|&pos| {
            let judged = self.referee.piece_at(pos).map(|p| (p.kind, p.player));
            judged != self.engine.piece_at(pos)
        });
        if let Some(pos) = mismatch {
            error!("referee and engine boards disagree at {}", pos);
            debug_assert!(false, "referee and engine boards disagree at {}", pos);
            return false;
        }
        if self.referee.next_player() != self.engine.next_player() {
            error!("referee and engine disagree on the side to move");
            debug_assert!(false, "referee and engine disagree on the side to move");
            return false;
        }
        true
    }
}

impl Default for Game {
    fn default() -> Self {
        Game::new(EngineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difficulty_table() {
        let mut game = Game::default();
        assert_eq!(game.set_difficulty_level(0), 2);
        assert_eq!(game.set_difficulty_level(1), 6);
        assert_eq!(game.set_difficulty_level(2), 9);
        assert_eq!(game.max_depth(), 9);
        assert_eq!(game.set_difficulty_level(3), 2);
        assert_eq!(game.set_difficulty_level(-1), 2);
    }

    #[test]
    fn test_off_board_digits() {
        let mut game = Game::default();
        assert_eq!(game.submit_human_move(9, 0, 9, 9), Err(Rejection::OffBoard));
        assert_eq!(game.submit_human_move(4, 4, 3, 4), Err(Rejection::NoPiece));
        assert!(game.cross_check());
    }
}
