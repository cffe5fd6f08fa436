use serde::{Deserialize, Serialize};

/// Unique identifier for rooms (8-character token)
pub type RoomId = String;

/// Display name identifying a player within a room
pub type PlayerName = String;

/// Default board size; a 5x5 board carries the free center cell
pub const DEFAULT_BOARD_SIZE: usize = 5;

/// One board position: display text plus marked state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub text: String,
    pub marked: bool,
}

/// An N x N grid of cells, row-major
pub type Board = Vec<Vec<Cell>>;

/// Coordinates of a single cell, used to report winning lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellRef {
    pub row: usize,
    pub col: usize,
}

/// A shared game session: phrase list and member roster.
///
/// Serialized as one JSON blob under `room:<id>`. Field names are part of
/// the wire contract and must stay stable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub creator: PlayerName,
    pub phrases: Vec<String>,
    pub players: Vec<PlayerName>,
    pub size: usize,
}

/// One player's personalized board and win status within one room.
///
/// Serialized as one JSON blob under `player:<name>:<room_id>`.
/// `winning_cells` only appears once a bingo has been achieved; `has_bingo`
/// is sticky and never retracts afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerBoardState {
    pub board: Board,
    pub has_bingo: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winning_cells: Option<Vec<CellRef>>,
}

impl PlayerBoardState {
    /// A freshly generated board with no marks beyond the free cell.
    pub fn fresh(board: Board) -> Self {
        Self {
            board,
            has_bingo: false,
            winning_cells: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_serializes_with_stable_field_names() {
        let cell = Cell {
            text: "FREE".to_string(),
            marked: true,
        };
        let json = serde_json::to_value(&cell).unwrap();
        assert_eq!(json, serde_json::json!({"text": "FREE", "marked": true}));
    }

    #[test]
    fn winning_cells_omitted_until_achieved() {
        let state = PlayerBoardState::fresh(vec![]);
        let json = serde_json::to_value(&state).unwrap();
        assert!(json.get("winning_cells").is_none());
        assert_eq!(json["has_bingo"], serde_json::json!(false));
    }

    #[test]
    fn player_state_roundtrips_with_winning_cells() {
        let state = PlayerBoardState {
            board: vec![vec![Cell {
                text: "a".to_string(),
                marked: true,
            }]],
            has_bingo: true,
            winning_cells: Some(vec![CellRef { row: 0, col: 0 }]),
        };
        let json = serde_json::to_string(&state).unwrap();
        let back: PlayerBoardState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn player_state_parses_without_winning_cells_field() {
        // Records written before a win carry no winning_cells key at all.
        let raw = r#"{"board": [], "has_bingo": false}"#;
        let state: PlayerBoardState = serde_json::from_str(raw).unwrap();
        assert_eq!(state.winning_cells, None);
    }
}
