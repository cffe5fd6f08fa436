// Bingo Server Library - Core Module Organization
//
// This file serves as the central organization point for the bingo game
// server, exporting all the necessary modules and types in a clean,
// structured manner.

// Core game data structures and rules
pub mod board;
pub mod models;
pub mod validation;
pub mod win;

// Persistence boundary
pub mod store;

// Orchestration
pub mod application;

// Server implementation
pub mod websocket;

// Error types
pub mod errors;

// Re-export common types for convenient access
pub use crate::application::{MarkOutcome, RoomService};
pub use crate::board::{generate_board, FREE_CELL_TEXT};
pub use crate::errors::{BingoError, BingoResult, NetworkError, StoreError};
pub use crate::models::{Board, Cell, CellRef, PlayerBoardState, PlayerName, Room, RoomId};
pub use crate::store::{InMemoryStore, KvStore, StoreAdapter};
pub use crate::validation::validate_username;
pub use crate::websocket::{SessionGateway, WsMessage};
pub use crate::win::{check_bingo, BingoCheck, WinningLine, WinningPattern};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
