use std::fmt;

use common::{MoveCoords, MoveParseError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// 走法字符串格式不对
    BadSyntax(MoveParseError),
    /// 当前局面下不合法的走法，引擎状态保持不变
    IllegalMove(MoveCoords),
    InvalidPosition(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::BadSyntax(err) => write!(f, "bad move syntax: {}", err),
            EngineError::IllegalMove(mv) => write!(f, "illegal move {}", mv),
            EngineError::InvalidPosition(reason) => write!(f, "invalid position: {}", reason),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::BadSyntax(err) => Some(err),
            _ => None,
        }
    }
}

impl From<MoveParseError> for EngineError {
    fn from(err: MoveParseError) -> Self {
        EngineError::BadSyntax(err)
    }
}
