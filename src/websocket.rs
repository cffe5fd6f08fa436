use axum::extract::ws::{Message, WebSocket};
use futures::{sink::SinkExt, stream::StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

use crate::application::RoomService;
use crate::errors::{BingoResult, NetworkError};
use crate::models::{Board, CellRef, PlayerName, RoomId};

/// Unique identifier for one WebSocket connection
pub type ConnectionId = String;

/// Opaque token carrying a display-name identity across reconnects
pub type SessionToken = String;

/// WebSocket message types for client-server communication
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WsMessage {
    // Client -> server events
    #[serde(rename = "create_room")]
    CreateRoom {
        username: String,
        phrases: Vec<String>,
    },

    #[serde(rename = "join_room")]
    JoinRoom { username: String, room_id: RoomId },

    #[serde(rename = "mark_cell")]
    MarkCell {
        room_id: RoomId,
        row: usize,
        col: usize,
    },

    #[serde(rename = "save_phrases")]
    SavePhrases { phrases: Vec<String> },

    #[serde(rename = "get_saved_phrases")]
    GetSavedPhrases,

    #[serde(rename = "resume_session")]
    ResumeSession { session: SessionToken },

    // Server -> client events
    #[serde(rename = "room_created")]
    RoomCreated { room_id: RoomId },

    #[serde(rename = "room_joined")]
    RoomJoined {
        room_id: RoomId,
        creator: PlayerName,
        players: Vec<PlayerName>,
        board: Board,
        has_bingo: bool,
    },

    #[serde(rename = "player_joined")]
    PlayerJoined { username: PlayerName },

    #[serde(rename = "cell_marked")]
    CellMarked {
        username: PlayerName,
        row: usize,
        col: usize,
        marked: bool,
    },

    #[serde(rename = "player_bingo")]
    PlayerBingo {
        username: PlayerName,
        board: Board,
        winning_cells: Vec<CellRef>,
        winning_type: String,
        winning_index: usize,
    },

    #[serde(rename = "phrases_saved")]
    PhrasesSaved { count: usize },

    #[serde(rename = "saved_phrases")]
    SavedPhrases { phrases: Vec<String> },

    #[serde(rename = "session_issued")]
    SessionIssued { session: SessionToken },

    #[serde(rename = "error")]
    Error { message: String },
}

/// Delivery scope of one outbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// The triggering connection only
    Connection(ConnectionId),
    /// Every connection currently in the room, sender included
    Room(RoomId),
    /// Every connection in the room except the sender
    RoomExceptSender(RoomId, ConnectionId),
}

impl Scope {
    /// Whether a connection in `room` with id `conn_id` should receive a
    /// message addressed with this scope.
    fn addressed_to(&self, conn_id: &str, room: Option<&str>) -> bool {
        match self {
            Scope::Connection(target) => target == conn_id,
            Scope::Room(room_id) => room == Some(room_id.as_str()),
            Scope::RoomExceptSender(room_id, sender) => {
                room == Some(room_id.as_str()) && sender != conn_id
            }
        }
    }
}

/// One message on the shared broadcast channel.
#[derive(Debug, Clone)]
struct Envelope {
    scope: Scope,
    message: WsMessage,
}

/// Mutable per-connection state, shared between the receive loop and the
/// broadcast forwarder.
#[derive(Debug, Default)]
struct ConnectionState {
    room: Option<RoomId>,
    username: Option<PlayerName>,
}

type SharedConnectionState = Arc<RwLock<ConnectionState>>;

/// Real-time session gateway.
///
/// Purely an infrastructure concern - no game logic here. Maps inbound
/// events to engine calls and fans engine results back out with the
/// per-event scope. All connections share one broadcast channel; each
/// connection's forwarder filters on its own current room, so broadcasts
/// are fire-and-forget with per-connection ordering only.
#[derive(Clone)]
pub struct SessionGateway {
    rooms: Arc<RoomService>,
    broadcaster: broadcast::Sender<Envelope>,
    sessions: Arc<RwLock<HashMap<SessionToken, PlayerName>>>,
}

impl SessionGateway {
    pub fn new(rooms: Arc<RoomService>) -> Self {
        let (broadcaster, _) = broadcast::channel(1000);

        Self {
            rooms,
            broadcaster,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Handle a new WebSocket connection until it closes.
    pub async fn handle_connection(&self, socket: WebSocket) {
        let connection_id: ConnectionId = format!("conn_{}", Uuid::new_v4());
        log::info!("🔌 client connected: {connection_id}");

        // Split socket for concurrent read/write
        let (mut sender, mut receiver) = socket.split();

        let conn: SharedConnectionState = Arc::new(RwLock::new(ConnectionState::default()));

        // Subscribe before handling any message so this connection sees
        // its own room broadcasts from the first join onwards.
        let mut updates = self.broadcaster.subscribe();

        // Task to forward scoped broadcasts to this client
        let conn_for_updates = conn.clone();
        let connection_id_for_updates = connection_id.clone();
        let mut update_task = tokio::spawn(async move {
            while let Ok(envelope) = updates.recv().await {
                let room = conn_for_updates.read().await.room.clone();
                if envelope
                    .scope
                    .addressed_to(&connection_id_for_updates, room.as_deref())
                    && Self::send_message(&mut sender, &envelope.message)
                        .await
                        .is_err()
                {
                    break; // Client disconnected
                }
            }
        });

        // Task to handle incoming messages
        let gateway = self.clone();
        let conn_for_messages = conn.clone();
        let connection_id_for_messages = connection_id.clone();
        let mut message_task = tokio::spawn(async move {
            while let Some(Ok(message)) = receiver.next().await {
                match message {
                    Message::Text(text) => {
                        if let Err(e) = gateway
                            .handle_text_message(
                                &connection_id_for_messages,
                                &conn_for_messages,
                                text.to_string(),
                            )
                            .await
                        {
                            log::error!(
                                "❌ error handling message from {connection_id_for_messages}: {e}"
                            );
                            gateway.send_to(
                                Scope::Connection(connection_id_for_messages.clone()),
                                WsMessage::Error {
                                    message: e.to_string(),
                                },
                            );
                        }
                    }
                    Message::Close(_) => break,
                    _ => {
                        // Ignore pings, pongs, and binary frames
                    }
                }
            }
        });

        // Wait for either task to complete (client disconnect or error)
        tokio::select! {
            _ = &mut update_task => {
                message_task.abort();
            }
            _ = &mut message_task => {
                update_task.abort();
            }
        }

        let username = conn.read().await.username.clone();
        log::info!(
            "client disconnected: {connection_id} ({})",
            username.as_deref().unwrap_or("no identity")
        );
    }

    /// Resolve a session token into the display name it was issued for.
    pub async fn resolve_session(&self, token: &str) -> Option<PlayerName> {
        self.sessions.read().await.get(token).cloned()
    }

    /// Dispatch one inbound event. Engine errors propagate to the caller,
    /// which surfaces them as a sender-only `error` message; nothing is
    /// mutated on any error path.
    async fn handle_text_message(
        &self,
        connection_id: &str,
        conn: &SharedConnectionState,
        text: String,
    ) -> BingoResult<()> {
        let message: WsMessage = serde_json::from_str(&text)
            .map_err(|e| NetworkError::deserialization_failed(e.to_string()))?;

        match message {
            WsMessage::CreateRoom { username, phrases } => {
                let room_id = self.rooms.create_room(&username, &phrases).await?;
                let session = self.bind_identity(conn, &username, &room_id).await;
                self.send_to(
                    Scope::Connection(connection_id.to_string()),
                    WsMessage::RoomCreated {
                        room_id: room_id.clone(),
                    },
                );
                self.send_to(
                    Scope::Connection(connection_id.to_string()),
                    WsMessage::SessionIssued { session },
                );
            }

            WsMessage::JoinRoom { username, room_id } => {
                let (room, state) = self.rooms.join_room(&username, &room_id).await?;
                let session = self.bind_identity(conn, &username, &room_id).await;

                self.send_to(
                    Scope::RoomExceptSender(room_id.clone(), connection_id.to_string()),
                    WsMessage::PlayerJoined {
                        username: username.clone(),
                    },
                );
                self.send_to(
                    Scope::Connection(connection_id.to_string()),
                    WsMessage::RoomJoined {
                        room_id,
                        creator: room.creator,
                        players: room.players,
                        board: state.board,
                        has_bingo: state.has_bingo,
                    },
                );
                self.send_to(
                    Scope::Connection(connection_id.to_string()),
                    WsMessage::SessionIssued { session },
                );
            }

            WsMessage::MarkCell { room_id, row, col } => {
                let username = conn
                    .read()
                    .await
                    .username
                    .clone()
                    .ok_or(NetworkError::NoIdentity)?;

                let outcome = self.rooms.mark_cell(&username, &room_id, row, col).await?;
                self.send_to(
                    Scope::Room(room_id.clone()),
                    WsMessage::CellMarked {
                        username: username.clone(),
                        row,
                        col,
                        marked: outcome.marked,
                    },
                );

                if let Some(win) = outcome.new_win {
                    self.send_to(
                        Scope::Room(room_id),
                        WsMessage::PlayerBingo {
                            username,
                            board: outcome.state.board,
                            winning_cells: win.cells,
                            winning_type: win.line.kind().to_string(),
                            winning_index: win.line.index(),
                        },
                    );
                }
            }

            WsMessage::SavePhrases { phrases } => {
                let count = self.rooms.save_phrases(&phrases).await?;
                self.send_to(
                    Scope::Connection(connection_id.to_string()),
                    WsMessage::PhrasesSaved { count },
                );
            }

            WsMessage::GetSavedPhrases => {
                let phrases = self.rooms.saved_phrases().await?;
                self.send_to(
                    Scope::Connection(connection_id.to_string()),
                    WsMessage::SavedPhrases { phrases },
                );
            }

            WsMessage::ResumeSession { session } => {
                let username = self
                    .resolve_session(&session)
                    .await
                    .ok_or(NetworkError::UnknownSession)?;
                log::info!("session resumed for {username} on {connection_id}");
                conn.write().await.username = Some(username);
            }

            other => {
                log::debug!("ignoring unhandled message type: {other:?}");
            }
        }

        Ok(())
    }

    /// Bind this connection to a validated identity and room, issuing a
    /// session token (or reusing the one already issued for the name).
    async fn bind_identity(
        &self,
        conn: &SharedConnectionState,
        username: &str,
        room_id: &str,
    ) -> SessionToken {
        {
            let mut state = conn.write().await;
            state.username = Some(username.to_string());
            state.room = Some(room_id.to_string());
        }

        let mut sessions = self.sessions.write().await;
        if let Some((token, _)) = sessions.iter().find(|(_, name)| name.as_str() == username) {
            return token.clone();
        }
        let token: SessionToken = Uuid::new_v4().to_string();
        sessions.insert(token.clone(), username.to_string());
        token
    }

    /// Fire-and-forget fan-out; delivery fails only when no connection is
    /// subscribed, which is fine.
    fn send_to(&self, scope: Scope, message: WsMessage) {
        let _ = self.broadcaster.send(Envelope { scope, message });
    }

    /// Send a message over a WebSocket sender half.
    async fn send_message(
        sender: &mut futures::stream::SplitSink<WebSocket, Message>,
        message: &WsMessage,
    ) -> Result<(), axum::Error> {
        let json = serde_json::to_string(message).map_err(axum::Error::new)?;

        sender
            .send(Message::Text(json.into()))
            .await
            .map_err(axum::Error::new)
    }
}
