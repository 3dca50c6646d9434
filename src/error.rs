// error.rs
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GameError {
    /// Malformed command syntax, wrong argument count or unknown sub-operation.
    #[error("{0}")]
    InvalidCommand(String),

    /// Graph invariant violation or an operation on a missing/duplicate entity.
    #[error("{0}")]
    InvalidMap(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Map file error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Snapshot error: {0}")]
    Snapshot(#[from] bincode::Error),
}

impl GameError {
    pub fn command(message: impl Into<String>) -> Self {
        GameError::InvalidCommand(message.into())
    }

    pub fn map(message: impl Into<String>) -> Self {
        GameError::InvalidMap(message.into())
    }
}

pub type Result<T> = std::result::Result<T, GameError>;
