use thiserror::Error;

use crate::interface::{Illegal, Move, Player};

/// Errors raised while configuring agents or playing games.
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid name: {0}")]
    InvalidName(String),

    #[error("invalid role: {0}")]
    InvalidRole(String),

    #[error("unknown agent kind: {0}")]
    UnknownAgent(String),

    #[error("illegal move {m}: {reason}")]
    IllegalMove { m: Move, reason: Illegal },

    #[error("{m} played out of turn, {expected} to move")]
    WrongTurn { m: Move, expected: Player },

    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(String),

    #[error("board size {0} out of range, should be between 1..=26")]
    InvalidBoardSize(usize),

    #[error("failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Convenience Result type for NoGo operations
pub type Result<T> = std::result::Result<T, Error>;
