//! Key-value store boundary.
//!
//! The external store is a plain get/set string store with no atomicity
//! beyond single-key operations; every record is one JSON blob per key.
//! [`KvStore`] is the seam for real backends, [`InMemoryStore`] is both
//! the default backend and the test double.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::errors::{StoreError, StoreResult};
use crate::models::{PlayerBoardState, Room};

/// Singleton key for the global phrase pool.
const PHRASE_POOL_KEY: &str = "saved_phrases";

fn room_key(room_id: &str) -> String {
    format!("room:{room_id}")
}

fn player_key(name: &str, room_id: &str) -> String {
    format!("player:{name}:{room_id}")
}

/// Minimal contract expected from the external key-value store.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Returns the value at `key`, or `None` if the key is absent.
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    async fn set(&self, key: &str, value: String) -> StoreResult<()>;
}

/// Process-local store over a shared map. The single source of truth for
/// all rooms and players handled by this process.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvStore for InMemoryStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> StoreResult<()> {
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }
}

/// Typed record access over any [`KvStore`].
///
/// Absence of a key is a distinct `None`, never an error. There are no
/// transactions: callers doing read-modify-write get plain get-then-set
/// semantics, last write wins.
#[derive(Clone)]
pub struct StoreAdapter {
    store: Arc<dyn KvStore>,
}

impl StoreAdapter {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryStore::new()))
    }

    pub async fn get_room(&self, room_id: &str) -> StoreResult<Option<Room>> {
        self.get_record(&room_key(room_id)).await
    }

    pub async fn put_room(&self, room_id: &str, room: &Room) -> StoreResult<()> {
        self.put_record(&room_key(room_id), room).await
    }

    pub async fn get_player(
        &self,
        name: &str,
        room_id: &str,
    ) -> StoreResult<Option<PlayerBoardState>> {
        self.get_record(&player_key(name, room_id)).await
    }

    pub async fn put_player(
        &self,
        name: &str,
        room_id: &str,
        state: &PlayerBoardState,
    ) -> StoreResult<()> {
        self.put_record(&player_key(name, room_id), state).await
    }

    /// The global phrase pool; an uninitialized pool reads as empty.
    pub async fn get_phrase_pool(&self) -> StoreResult<Vec<String>> {
        Ok(self.get_record(PHRASE_POOL_KEY).await?.unwrap_or_default())
    }

    pub async fn put_phrase_pool(&self, phrases: &[String]) -> StoreResult<()> {
        self.put_record(PHRASE_POOL_KEY, &phrases).await
    }

    async fn get_record<T: DeserializeOwned>(&self, key: &str) -> StoreResult<Option<T>> {
        match self.store.get(key).await? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| StoreError::corrupt(key, e.to_string())),
            None => Ok(None),
        }
    }

    async fn put_record<T: Serialize>(&self, key: &str, record: &T) -> StoreResult<()> {
        let raw =
            serde_json::to_string(record).map_err(|e| StoreError::corrupt(key, e.to_string()))?;
        self.store.set(key, raw).await
    }
}
