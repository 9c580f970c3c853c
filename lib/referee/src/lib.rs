/*
 * 裁判 - 权威的走子合法性判定与棋局状态
 *
 * 说明
 * - board: 活子/死子簿记与走子、撤销、将军检测
 * - rules: 每种棋子的走法判定
 * - Referee 对外只暴露“提交一步棋 -> 接受/拒绝 + 棋局状态”，非法走子是数据而不是错误
 */
pub mod board;
pub mod rules;

use std::fmt;

use common::{GameStatus, Move, MoveCoords, PieceInfo, Player, Position};
use log::{debug, info};

pub use board::Board;

/// 走子被拒绝的原因，对应校验的各个步骤
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    WrongTurn,
    OffBoard,
    NoPiece,
    OwnPiece,
    IllegalGeometry,
    LeavesKingInCheck,
    KingsFacing,
    GameOver,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Rejection::WrongTurn => "not this side's turn",
            Rejection::OffBoard => "square is off the board",
            Rejection::NoPiece => "no such piece at the origin",
            Rejection::OwnPiece => "cannot capture own piece",
            Rejection::IllegalGeometry => "piece cannot move that way",
            Rejection::LeavesKingInCheck => "own king would be in check",
            Rejection::KingsFacing => "kings would face each other",
            Rejection::GameOver => "game is already over",
        };
        f.write_str(reason)
    }
}

impl std::error::Error for Rejection {}

/// 棋局快照：活子列表与轮到哪一方
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    pub pieces: Vec<PieceInfo>,
    pub next_player: Player,
}

#[derive(Debug, Clone)]
pub struct Referee {
    board: Board,
    status: GameStatus,
}

impl Default for Referee {
    fn default() -> Self {
        Referee::new()
    }
}

impl Referee {
    pub fn new() -> Self {
        Referee {
            board: Board::init(),
            status: GameStatus::InProgress,
        }
    }

    /// 从任意局面开始，主要用于残局与测试
    pub fn from_position(pieces: &[PieceInfo], next_player: Player) -> Self {
        let mut referee = Referee {
            board: Board::from_pieces(pieces, next_player),
            status: GameStatus::InProgress,
        };
        referee.status = referee.derive_status(next_player.next());
        referee
    }

    pub fn reset_game(&mut self) {
        self.board = Board::init();
        self.status = GameStatus::InProgress;
        debug!("referee reset to the initial position");
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn next_player(&self) -> Player {
        self.board.next_player
    }

    pub fn piece_at(&self, pos: Position) -> Option<PieceInfo> {
        self.board.piece_at(pos)
    }

    /// 轮到走棋的一方当前是否被将军
    pub fn is_last_move_check(&self) -> bool {
        self.board.is_king_checked(self.board.next_player)
    }

    pub fn game_state(&self) -> GameState {
        GameState {
            pieces: self.board.live_pieces().collect(),
            next_player: self.board.next_player,
        }
    }

    /// 把四位数字走法转换成 Move，起点无子或格式不对返回 None
    pub fn string_to_move(&self, s: &str) -> Option<Move> {
        let coords: MoveCoords = s.parse().ok()?;
        let piece = self.board.piece_at(coords.from)?;
        Some(Move::new(piece, coords.to))
    }

    /// 校验并执行一步棋。
    ///
    /// 接受时填入 `mv.captured`，换边，并返回新的棋局状态；
    /// 拒绝时棋盘不变。
    pub fn validate_move(&mut self, mv: &mut Move) -> Result<GameStatus, Rejection> {
        let result = self.try_move(mv);
        match &result {
            Ok(status) => {
                debug!("{} {} accepted, captured {:?}", mv.player(), mv.coords(), mv.captured.map(|p| p.kind));
                if status.is_over() {
                    info!("game over: {}", status);
                }
            }
            Err(reason) => debug!("{} {} rejected: {}", mv.player(), mv.coords(), reason),
        }
        result
    }

    fn try_move(&mut self, mv: &mut Move) -> Result<GameStatus, Rejection> {
        if self.status.is_over() {
            return Err(Rejection::GameOver);
        }
        let player = mv.player();
        if player != self.board.next_player {
            return Err(Rejection::WrongTurn);
        }
        let (from, to) = (mv.from(), mv.to);
        if !from.is_valid() || !to.is_valid() {
            return Err(Rejection::OffBoard);
        }
        match self.board.piece_at(from) {
            Some(piece) if piece.player == mv.piece.player && piece.kind == mv.piece.kind => {}
            _ => return Err(Rejection::NoPiece),
        }
        let captured = self.board.piece_at(to);
        if captured.is_some_and(|p| p.player == player) {
            return Err(Rejection::OwnPiece);
        }
        if !rules::can_move_to(&self.board, &mv.piece, to) {
            return Err(Rejection::IllegalGeometry);
        }

        let applied = self.board.record_move(from, to).ok_or(Rejection::NoPiece)?;
        if self.board.is_king_checked(player) {
            self.board.undo_move(applied);
            return Err(Rejection::LeavesKingInCheck);
        }
        if self.board.kings_facing() {
            self.board.undo_move(applied);
            return Err(Rejection::KingsFacing);
        }

        mv.captured = captured;
        self.board.next_player = player.next();
        self.status = self.derive_status(player);
        Ok(self.status)
    }

    // 没有着法就是输，不存在和棋
    fn derive_status(&mut self, last_mover: Player) -> GameStatus {
        if self.board.next_move_exists(last_mover.next()) {
            GameStatus::InProgress
        } else {
            GameStatus::win_for(last_mover)
        }
    }
}

impl fmt::Display for Referee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.board)
    }
}
