use thiserror::Error;
use serde::{Deserialize, Serialize};

use crate::models::{PlayerName, RoomId};

/// Top-level error type for the entire bingo system
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum BingoError {
    #[error("Invalid data: {details}")]
    InvalidInput { details: String },

    #[error("{reason}")]
    InvalidUsername { reason: String },

    #[error("Room not found: {room_id}")]
    RoomNotFound { room_id: RoomId },

    #[error("Player data not found: {name} in room {room_id}")]
    PlayerNotFound { name: PlayerName, room_id: RoomId },

    #[error("Cell ({row}, {col}) is outside the {size}x{size} board")]
    OutOfBounds { row: usize, col: usize, size: usize },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),
}

/// Errors raised at the key-value store boundary. Fatal for the affected
/// operation; never retried.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum StoreError {
    #[error("store unavailable: {details}")]
    Unavailable { details: String },

    #[error("undecodable record at key '{key}': {details}")]
    Corrupt { key: String, details: String },
}

/// Network/WebSocket errors
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum NetworkError {
    #[error("message deserialization failed: {details}")]
    DeserializationFailed { details: String },

    #[error("no identity established for this connection")]
    NoIdentity,

    #[error("unknown session token")]
    UnknownSession,
}

/// Result type aliases for convenience
pub type BingoResult<T> = Result<T, BingoError>;
pub type StoreResult<T> = Result<T, StoreError>;

/// Helper methods for creating common errors
impl BingoError {
    pub fn invalid_input(details: impl Into<String>) -> Self {
        Self::InvalidInput {
            details: details.into(),
        }
    }

    pub fn invalid_username(reason: impl Into<String>) -> Self {
        Self::InvalidUsername {
            reason: reason.into(),
        }
    }

    pub fn room_not_found(room_id: impl Into<RoomId>) -> Self {
        Self::RoomNotFound {
            room_id: room_id.into(),
        }
    }

    pub fn player_not_found(name: impl Into<PlayerName>, room_id: impl Into<RoomId>) -> Self {
        Self::PlayerNotFound {
            name: name.into(),
            room_id: room_id.into(),
        }
    }
}

impl StoreError {
    pub fn unavailable(details: impl Into<String>) -> Self {
        Self::Unavailable {
            details: details.into(),
        }
    }

    pub fn corrupt(key: impl Into<String>, details: impl Into<String>) -> Self {
        Self::Corrupt {
            key: key.into(),
            details: details.into(),
        }
    }
}

impl NetworkError {
    pub fn deserialization_failed(details: impl Into<String>) -> Self {
        Self::DeserializationFailed {
            details: details.into(),
        }
    }
}
