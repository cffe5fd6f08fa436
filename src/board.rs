//! Board generation.

use rand::seq::SliceRandom;

use crate::errors::{BingoError, BingoResult};
use crate::models::{Board, Cell};

/// Sentinel text of the pre-marked center cell on a 5x5 board.
pub const FREE_CELL_TEXT: &str = "FREE";

/// Generates a randomized `size` x `size` board from a phrase pool.
///
/// Each call shuffles independently, so every player gets their own
/// permutation. If the pool holds fewer than `size * size` phrases, the
/// shuffled pool is repeated cyclically until the board is full, so
/// repetition order is deterministic given the shuffle. A 5x5 board gets
/// the free center cell in place of whatever phrase would have landed
/// there; other sizes have no free cell.
///
/// The input pool is never mutated. An empty pool is a caller contract
/// violation.
pub fn generate_board(phrases: &[String], size: usize) -> BingoResult<Board> {
    if phrases.is_empty() {
        return Err(BingoError::invalid_input("phrase list is empty"));
    }

    let mut shuffled: Vec<&String> = phrases.iter().collect();
    shuffled.shuffle(&mut rand::thread_rng());

    let picks: Vec<&String> = shuffled.into_iter().cycle().take(size * size).collect();

    let board = (0..size)
        .map(|row| {
            (0..size)
                .map(|col| {
                    if size == 5 && row == 2 && col == 2 {
                        Cell {
                            text: FREE_CELL_TEXT.to_string(),
                            marked: true,
                        }
                    } else {
                        Cell {
                            text: picks[row * size + col].clone(),
                            marked: false,
                        }
                    }
                })
                .collect()
        })
        .collect();

    Ok(board)
}
