use crate::types::Position;

/// Errors produced by the game engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("row/col out of range: ({row}, {col})")]
    OutOfRange { row: u8, col: u8 },

    #[error("illegal move {from} -> {to}")]
    IllegalMove { from: Position, to: Position },

    #[error("it is not your turn")]
    NotYourTurn,

    #[error("game is already over")]
    GameOver,

    #[error("no game in progress")]
    NoSession,

    #[error("invalid room id: {0:?}")]
    InvalidRoomId(String),

    #[error("invalid player index: {0}")]
    InvalidPlayerIndex(u8),

    #[error("event not valid in {0} mode")]
    WrongMode(&'static str),

    #[error("remote move rejected: {0}")]
    Desync(#[from] DesyncRisk),
}

/// Reasons a remote move could leave the two boards diverged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DesyncRisk {
    #[error("origin {0} is empty on the local board")]
    EmptyOrigin(Position),

    #[error("received a move while it is the local player's turn")]
    OutOfTurn,

    #[error("move {from} -> {to} is not legal on the local board")]
    IllegalMove { from: Position, to: Position },

    #[error("move addressed to room {received:?}, joined {joined:?}")]
    WrongRoom { joined: String, received: String },

    #[error("board fingerprint mismatch: peer {expected:#010x}, local {actual:#010x}")]
    ChecksumMismatch { expected: u32, actual: u32 },
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to decode config: {0}")]
    Decode(String),

    #[error("config validation error: {0}")]
    Validation(String),
}
