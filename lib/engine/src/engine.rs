/* 引擎核心：对接棋盘、搜索与计时，对外只收发 "rcrc" 坐标走法 */
use std::time::Instant;

use common::{MoveCoords, PieceType, Player, Position};
use log::{debug, info, warn};

use crate::board::{position, square, Board, Move};
use crate::config::EngineConfig;
use crate::constant::RANDOM_OPENING_PLIES;
use crate::error::EngineError;
use crate::search::SearchSession;
use crate::time::TimeControl;

pub struct Engine {
    board: Board,
    search: SearchSession,
    clock: TimeControl,
    // 本局已走的半回合数
    plies: usize,
}

fn to_move(coords: MoveCoords) -> Move {
    Move::new(square(coords.from), square(coords.to))
}

fn to_coords(mv: Move) -> MoveCoords {
    MoveCoords::new(position(mv.from), position(mv.to))
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Engine {
            board: Board::init(),
            clock: TimeControl::new(&config),
            search: SearchSession::new(config),
            plies: 0,
        }
    }

    /// 开新局：标准开局，红先，计时重置
    pub fn init_game(&mut self) {
        self.board = Board::init();
        self.clock = TimeControl::new(self.search.config());
        self.plies = 0;
    }

    /// 从类 FEN 串摆局面，失败时保持原局面
    pub fn load_fen(&mut self, fen: &str) -> Result<(), EngineError> {
        self.board = Board::from_fen(fen)?;
        self.clock = TimeControl::new(self.search.config());
        self.plies = 0;
        Ok(())
    }

    pub fn set_max_depth(&mut self, depth: i32) {
        self.search.set_max_depth(depth);
    }

    pub fn max_depth(&self) -> i32 {
        self.search.config().max_depth
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn piece_at(&self, pos: Position) -> Option<(PieceType, Player)> {
        self.board.piece_at(pos)
    }

    pub fn next_player(&self) -> Player {
        self.board.turn
    }

    /// 应用对方走法。不合法时返回 IllegalMove，棋盘不变
    pub fn on_opponent_move(&mut self, coords: MoveCoords) -> Result<(), EngineError> {
        if !coords.from.is_valid() || !coords.to.is_valid() {
            warn!("opponent move {} is off the board", coords);
            return Err(EngineError::IllegalMove(coords));
        }
        let mv = to_move(coords);
        if !self.board.is_legal(mv) {
            warn!("illegal opponent move {} for {}", coords, self.board.turn);
            return Err(EngineError::IllegalMove(coords));
        }
        self.board.make_move(mv);
        self.plies += 1;
        debug!("opponent move {} applied", coords);
        Ok(())
    }

    pub fn on_opponent_move_str(&mut self, s: &str) -> Result<(), EngineError> {
        let coords: MoveCoords = s.parse()?;
        self.on_opponent_move(coords)
    }

    /// 为走棋方搜索并走出一步。没有合法走法（已被将死或困毙）时返回 None
    pub fn generate_move(&mut self) -> Option<MoveCoords> {
        let started = Instant::now();
        let randomize = self.search.config().randomize && self.plies < RANDOM_OPENING_PLIES;
        let max_depth = self.search.config().max_depth;
        let soft_limit = self.clock.allocate();
        debug!(
            "time allocated: {}ms of {}ms left, depth {}, randomize {}",
            soft_limit.as_millis(),
            self.clock.time_left_ms(),
            max_depth,
            randomize
        );
        let (value, best_move) =
            self.search
                .iterative_deepening(&mut self.board, max_depth, Some(soft_limit), randomize);
        self.clock.record_move(started.elapsed());

        let Some(mv) = best_move else {
            info!("{} has no legal move left", self.board.turn);
            return None;
        };
        if !self.board.make_move(mv) {
            return None;
        }
        self.plies += 1;
        let coords = to_coords(mv);
        info!(
            "engine move {} score {} nodes {} time {}ms, {}ms left",
            coords,
            value,
            self.search.counter,
            started.elapsed().as_millis(),
            self.clock.time_left_ms()
        );
        Some(coords)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(depth: i32) -> Engine {
        Engine::new(EngineConfig {
            max_depth: depth,
            ..EngineConfig::default()
        })
    }

    #[test]
    fn test_opponent_moves() {
        let mut engine = engine(2);
        assert_eq!(engine.next_player(), Player::Red);
        engine.on_opponent_move_str("7174").unwrap();
        assert_eq!(engine.next_player(), Player::Black);
        assert_eq!(
            engine.piece_at(Position::new(7, 4)),
            Some((PieceType::Cannon, Player::Red))
        );

        let before = engine.board().clone();
        // 红方棋子不能由黑方走
        assert!(matches!(
            engine.on_opponent_move_str("7471"),
            Err(EngineError::IllegalMove(_))
        ));
        // 马腿被塞
        assert!(matches!(
            engine.on_opponent_move_str("0113"),
            Err(EngineError::IllegalMove(_))
        ));
        assert!(matches!(
            engine.on_opponent_move_str("01x2"),
            Err(EngineError::BadSyntax(_))
        ));
        assert_eq!(engine.board(), &before);
    }

    #[test]
    fn test_generate_move() {
        let mut engine = engine(3);
        let coords = engine.generate_move().unwrap();
        assert_eq!(engine.next_player(), Player::Black);
        assert!(engine.piece_at(coords.to).is_some_and(|(_, player)| player == Player::Red));
        assert!(engine.piece_at(coords.from).is_none());

        // 回应一步后继续
        engine.on_opponent_move_str("0818").unwrap();
        assert!(engine.generate_move().is_some());

        engine.init_game();
        assert_eq!(engine.board(), &Board::init());
    }

    #[test]
    fn test_no_move_when_lost() {
        let mut engine = engine(3);
        engine.load_fen("3k5/8R/9/9/9/9/9/9/9/4K4 b").unwrap();
        assert_eq!(engine.generate_move(), None);
        assert!(engine.load_fen("9/9/9/9/9/9/9/9/9/4K4 w").is_err());
    }

    #[test]
    fn test_randomized_opening() {
        let mut engine = Engine::new(EngineConfig {
            max_depth: 2,
            randomize: true,
            ..EngineConfig::default()
        });
        for _ in 0..RANDOM_OPENING_PLIES {
            let Some(coords) = engine.generate_move() else {
                break;
            };
            assert!(engine.piece_at(coords.to).is_some());
        }
    }
}
