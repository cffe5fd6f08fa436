//! Win detection.

use std::fmt;

use crate::models::{Board, CellRef};

/// A completed line on the board.
///
/// Diagonals report fixed indices: 1 for the main diagonal (top-left to
/// bottom-right), 2 for the anti-diagonal (top-right to bottom-left).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WinningLine {
    Row(usize),
    Column(usize),
    MainDiagonal,
    AntiDiagonal,
}

impl WinningLine {
    pub fn kind(&self) -> &'static str {
        match self {
            WinningLine::Row(_) => "row",
            WinningLine::Column(_) => "column",
            WinningLine::MainDiagonal | WinningLine::AntiDiagonal => "diagonal",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            WinningLine::Row(i) | WinningLine::Column(i) => *i,
            WinningLine::MainDiagonal => 1,
            WinningLine::AntiDiagonal => 2,
        }
    }
}

impl fmt::Display for WinningLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind(), self.index())
    }
}

/// A winning line together with the cells that form it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WinningPattern {
    pub line: WinningLine,
    pub cells: Vec<CellRef>,
}

/// Outcome of scanning a board for a completed line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BingoCheck {
    pub pattern: Option<WinningPattern>,
}

impl BingoCheck {
    pub fn has_bingo(&self) -> bool {
        self.pattern.is_some()
    }
}

/// Scans a board for a completed row, column, or diagonal.
///
/// Scan order fixes the tie-break: rows 0..N first, then columns 0..N,
/// then the main diagonal, then the anti-diagonal. The first satisfied
/// line is returned even if several are complete at once. A line is
/// complete iff every cell along it is marked (the free cell counts, it
/// is permanently marked).
pub fn check_bingo(board: &Board) -> BingoCheck {
    let size = board.len();
    if size == 0 {
        return BingoCheck { pattern: None };
    }

    for row in 0..size {
        if (0..size).all(|col| board[row][col].marked) {
            return found(
                WinningLine::Row(row),
                (0..size).map(|col| CellRef { row, col }).collect(),
            );
        }
    }

    for col in 0..size {
        if (0..size).all(|row| board[row][col].marked) {
            return found(
                WinningLine::Column(col),
                (0..size).map(|row| CellRef { row, col }).collect(),
            );
        }
    }

    if (0..size).all(|i| board[i][i].marked) {
        return found(
            WinningLine::MainDiagonal,
            (0..size).map(|i| CellRef { row: i, col: i }).collect(),
        );
    }

    if (0..size).all(|i| board[i][size - 1 - i].marked) {
        return found(
            WinningLine::AntiDiagonal,
            (0..size)
                .map(|i| CellRef {
                    row: i,
                    col: size - 1 - i,
                })
                .collect(),
        );
    }

    BingoCheck { pattern: None }
}

fn found(line: WinningLine, cells: Vec<CellRef>) -> BingoCheck {
    BingoCheck {
        pattern: Some(WinningPattern { line, cells }),
    }
}
