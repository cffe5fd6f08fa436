use itertools::Itertools;
use uuid::Uuid;

use crate::board::generate_board;
use crate::errors::{BingoError, BingoResult};
use crate::models::{PlayerBoardState, Room, RoomId, DEFAULT_BOARD_SIZE};
use crate::store::StoreAdapter;
use crate::validation::validate_username;
use crate::win::{check_bingo, WinningPattern};

/// Result of toggling one cell: the cell's new state, the persisted board
/// state, and the winning pattern when this toggle achieved the bingo.
#[derive(Debug, Clone)]
pub struct MarkOutcome {
    pub marked: bool,
    pub state: PlayerBoardState,
    pub new_win: Option<WinningPattern>,
}

/// Core orchestration layer for rooms and players.
///
/// Every operation is a read-modify-write sequence against the injected
/// store adapter; the store is the single source of truth and no game
/// state lives on this struct. Two interleaved writers to the same room
/// or player key can lose an update (plain get-then-set, last write
/// wins) — an accepted limitation of the store contract, kept here
/// rather than papered over.
#[derive(Clone)]
pub struct RoomService {
    store: StoreAdapter,
}

impl RoomService {
    pub fn new(store: StoreAdapter) -> Self {
        Self { store }
    }

    /// Creates a room owned by `creator` and generates the creator's board.
    ///
    /// Returns the fresh 8-character room id.
    pub async fn create_room(&self, creator: &str, phrases: &[String]) -> BingoResult<RoomId> {
        validate_username(creator).map_err(BingoError::invalid_username)?;
        if phrases.is_empty() {
            return Err(BingoError::invalid_input("no phrases provided"));
        }

        let room_id = self.fresh_room_id().await?;
        let room = Room {
            creator: creator.to_string(),
            phrases: phrases.to_vec(),
            players: vec![creator.to_string()],
            size: DEFAULT_BOARD_SIZE,
        };
        self.store.put_room(&room_id, &room).await?;

        let board = generate_board(&room.phrases, room.size)?;
        self.store
            .put_player(creator, &room_id, &PlayerBoardState::fresh(board))
            .await?;

        log::info!("room {room_id} created by {creator}");
        Ok(room_id)
    }

    /// Adds `name` to the room and returns the room plus the player's
    /// board state. Idempotent for repeat joins: the roster gains no
    /// duplicate and an existing board is returned as-is, never
    /// regenerated.
    pub async fn join_room(
        &self,
        name: &str,
        room_id: &str,
    ) -> BingoResult<(Room, PlayerBoardState)> {
        validate_username(name).map_err(BingoError::invalid_username)?;

        let mut room = self
            .store
            .get_room(room_id)
            .await?
            .ok_or_else(|| BingoError::room_not_found(room_id))?;

        if !room.players.iter().any(|p| p == name) {
            room.players.push(name.to_string());
            self.store.put_room(room_id, &room).await?;
        }

        let state = match self.store.get_player(name, room_id).await? {
            Some(state) => state,
            None => {
                let state = PlayerBoardState::fresh(generate_board(&room.phrases, room.size)?);
                self.store.put_player(name, room_id, &state).await?;
                state
            }
        };

        log::info!("{name} joined room {room_id}");
        Ok((room, state))
    }

    /// Toggles the marked state of one cell and re-checks the board.
    ///
    /// `has_bingo` is sticky: once achieved it survives later toggles,
    /// including unmarking cells of the winning line. `new_win` is set
    /// only on the toggle that first achieves the bingo, which is what
    /// drives the one-shot win broadcast.
    pub async fn mark_cell(
        &self,
        name: &str,
        room_id: &str,
        row: usize,
        col: usize,
    ) -> BingoResult<MarkOutcome> {
        let mut state = self
            .store
            .get_player(name, room_id)
            .await?
            .ok_or_else(|| BingoError::player_not_found(name, room_id))?;

        let size = state.board.len();
        if row >= size || col >= size {
            return Err(BingoError::OutOfBounds { row, col, size });
        }

        state.board[row][col].marked = !state.board[row][col].marked;
        let marked = state.board[row][col].marked;

        let check = check_bingo(&state.board);
        let new_win = if state.has_bingo { None } else { check.pattern };
        if let Some(pattern) = &new_win {
            state.has_bingo = true;
            state.winning_cells = Some(pattern.cells.clone());
            log::info!("{name} got bingo in room {room_id}: {}", pattern.line);
        }

        self.store.put_player(name, room_id, &state).await?;

        Ok(MarkOutcome {
            marked,
            state,
            new_win,
        })
    }

    /// Merges phrases into the global pool, deduplicating by exact string
    /// equality while preserving first-seen order. Returns the pool's new
    /// size.
    pub async fn save_phrases(&self, phrases: &[String]) -> BingoResult<usize> {
        if phrases.is_empty() {
            return Err(BingoError::invalid_input("no phrases to save"));
        }

        let pool = self.store.get_phrase_pool().await?;
        let merged: Vec<String> = pool
            .into_iter()
            .chain(phrases.iter().cloned())
            .unique()
            .collect();
        let count = merged.len();
        self.store.put_phrase_pool(&merged).await?;
        Ok(count)
    }

    /// The saved phrase pool, empty if never initialized.
    pub async fn saved_phrases(&self) -> BingoResult<Vec<String>> {
        Ok(self.store.get_phrase_pool().await?)
    }

    pub async fn room_exists(&self, room_id: &str) -> BingoResult<bool> {
        Ok(self.store.get_room(room_id).await?.is_some())
    }

    /// Generates a fresh room id, retrying on collision. The 8-character
    /// token space makes collisions vanishingly rare but a stale room
    /// under the same key would corrupt both games.
    async fn fresh_room_id(&self) -> BingoResult<RoomId> {
        loop {
            let candidate: RoomId = Uuid::new_v4().simple().to_string()[..8].to_string();
            if self.store.get_room(&candidate).await?.is_none() {
                return Ok(candidate);
            }
            log::warn!("room id collision on {candidate}, retrying");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::FREE_CELL_TEXT;
    use crate::win::WinningLine;

    fn service() -> RoomService {
        RoomService::new(StoreAdapter::in_memory())
    }

    fn phrases(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("phrase {i}")).collect()
    }

    #[tokio::test]
    async fn create_room_persists_room_and_creator_board() {
        let service = service();
        let room_id = service.create_room("Alice", &phrases(25)).await.unwrap();
        assert_eq!(room_id.len(), 8);

        let (room, state) = service.join_room("Alice", &room_id).await.unwrap();
        assert_eq!(room.creator, "Alice");
        assert_eq!(room.players, vec!["Alice"]);
        assert_eq!(room.size, 5);
        assert_eq!(state.board.len(), 5);
        assert!(!state.has_bingo);
    }

    #[tokio::test]
    async fn create_room_rejects_bad_input_before_writing() {
        let service = service();
        let err = service.create_room("ab", &phrases(5)).await.unwrap_err();
        assert!(matches!(err, BingoError::InvalidUsername { .. }));

        let err = service.create_room("Alice", &[]).await.unwrap_err();
        assert!(matches!(err, BingoError::InvalidInput { .. }));
    }

    #[tokio::test]
    async fn join_room_is_idempotent() {
        let service = service();
        let room_id = service.create_room("Alice", &phrases(25)).await.unwrap();

        let (room, first) = service.join_room("Bob", &room_id).await.unwrap();
        assert_eq!(room.players, vec!["Alice", "Bob"]);

        let (room, second) = service.join_room("Bob", &room_id).await.unwrap();
        assert_eq!(room.players, vec!["Alice", "Bob"]);
        assert_eq!(first.board, second.board);
    }

    #[tokio::test]
    async fn join_unknown_room_fails() {
        let err = service().join_room("Bob", "missing1").await.unwrap_err();
        assert!(matches!(err, BingoError::RoomNotFound { .. }));
    }

    #[tokio::test]
    async fn mark_cell_toggles_both_ways() {
        let service = service();
        let room_id = service.create_room("Alice", &phrases(25)).await.unwrap();

        let outcome = service.mark_cell("Alice", &room_id, 0, 0).await.unwrap();
        assert!(outcome.marked);
        assert!(outcome.new_win.is_none());

        let outcome = service.mark_cell("Alice", &room_id, 0, 0).await.unwrap();
        assert!(!outcome.marked);
        assert!(outcome.new_win.is_none());
        assert!(!outcome.state.has_bingo);
    }

    #[tokio::test]
    async fn mark_cell_bounds_and_missing_player() {
        let service = service();
        let room_id = service.create_room("Alice", &phrases(25)).await.unwrap();

        let err = service.mark_cell("Alice", &room_id, 5, 0).await.unwrap_err();
        assert!(matches!(err, BingoError::OutOfBounds { size: 5, .. }));

        let err = service.mark_cell("Bob", &room_id, 0, 0).await.unwrap_err();
        assert!(matches!(err, BingoError::PlayerNotFound { .. }));
    }

    #[tokio::test]
    async fn completing_a_row_wins_once_and_sticks() {
        let service = service();
        let room_id = service.create_room("Alice", &phrases(25)).await.unwrap();

        for col in 0..4 {
            let outcome = service.mark_cell("Alice", &room_id, 0, col).await.unwrap();
            assert!(outcome.new_win.is_none());
        }
        let outcome = service.mark_cell("Alice", &room_id, 0, 4).await.unwrap();
        let win = outcome.new_win.expect("fifth mark completes the row");
        assert_eq!(win.line, WinningLine::Row(0));
        assert!(outcome.state.has_bingo);
        assert_eq!(outcome.state.winning_cells.as_ref().unwrap().len(), 5);

        // Unmark a winning cell: the flag and recorded line survive, and
        // no second win fires when the row completes again.
        let outcome = service.mark_cell("Alice", &room_id, 0, 4).await.unwrap();
        assert!(!outcome.marked);
        assert!(outcome.state.has_bingo);
        assert!(outcome.new_win.is_none());

        let outcome = service.mark_cell("Alice", &room_id, 0, 4).await.unwrap();
        assert!(outcome.new_win.is_none());
        assert_eq!(outcome.state.winning_cells.as_ref().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn boards_are_personal_and_wins_do_not_leak() {
        let service = service();
        let room_id = service.create_room("Alice", &phrases(25)).await.unwrap();
        service.join_room("Bob", &room_id).await.unwrap();

        for col in 0..5 {
            service.mark_cell("Alice", &room_id, 0, col).await.unwrap();
        }

        let (_, bob) = service.join_room("Bob", &room_id).await.unwrap();
        assert!(!bob.has_bingo);
        assert!(bob.board[0].iter().all(|c| !c.marked));
    }

    #[tokio::test]
    async fn end_to_end_join_board_draws_from_room_phrases() {
        let service = service();
        let pool = phrases(25);
        let room_id = service.create_room("Alice", &pool).await.unwrap();

        let (_, bob) = service.join_room("Bob", &room_id).await.unwrap();
        for (r, row) in bob.board.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                if r == 2 && c == 2 {
                    assert_eq!(cell.text, FREE_CELL_TEXT);
                } else {
                    assert!(pool.contains(&cell.text));
                }
            }
        }
    }

    #[tokio::test]
    async fn save_phrases_deduplicates_preserving_order() {
        let service = service();
        assert!(service.saved_phrases().await.unwrap().is_empty());

        let count = service
            .save_phrases(&["x".to_string(), "x".to_string(), "y".to_string()])
            .await
            .unwrap();
        assert_eq!(count, 2);

        let count = service
            .save_phrases(&["y".to_string(), "z".to_string()])
            .await
            .unwrap();
        assert_eq!(count, 3);

        assert_eq!(service.saved_phrases().await.unwrap(), vec!["x", "y", "z"]);
    }

    #[tokio::test]
    async fn save_phrases_rejects_empty_batch() {
        let err = service().save_phrases(&[]).await.unwrap_err();
        assert!(matches!(err, BingoError::InvalidInput { .. }));
    }
}
