use axum::extract::{Path, Query, State, WebSocketUpgrade};
use axum::http::Method;
use axum::response::{IntoResponse, Redirect};
use axum::routing::get;
use axum::Router;
use clap::Parser;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use bingo::application::RoomService;
use bingo::store::StoreAdapter;
use bingo::validation::validate_username;
use bingo::websocket::SessionGateway;

#[derive(Parser, Debug)]
#[command(name = "bingo", version, about = "Multiplayer real-time bingo server")]
struct Args {
    /// Address to bind the HTTP/WebSocket listener on
    #[arg(long, default_value = "0.0.0.0:5000")]
    bind: SocketAddr,
}

// Application state
#[derive(Clone)]
struct AppState {
    rooms: Arc<RoomService>,
    gateway: SessionGateway,
}

// Entry page; actual page rendering lives outside this server
async fn index() -> &'static str {
    "bingo server is running"
}

async fn create_page() -> &'static str {
    "create a room"
}

async fn join_page() -> &'static str {
    "join a room"
}

/// Game-page guard: a fetch must resolve a display name (query parameter
/// or a previously issued session token) and lands back on the entry page
/// when the name is absent, invalid, or the room does not exist.
async fn game_page(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let username = match params.get("username").cloned() {
        Some(name) => Some(name),
        None => match params.get("session") {
            Some(token) => state.gateway.resolve_session(token).await,
            None => None,
        },
    };

    let Some(username) = username else {
        log::info!("no username for room {room_id}, redirecting to index");
        return Redirect::to("/").into_response();
    };

    if let Err(reason) = validate_username(&username) {
        log::info!("invalid username for room {room_id}: {reason}");
        return Redirect::to("/").into_response();
    }

    match state.rooms.room_exists(&room_id).await {
        Ok(true) => format!("room {room_id} ready for {username}").into_response(),
        Ok(false) => {
            log::info!("room {room_id} not found, redirecting to index");
            Redirect::to("/").into_response()
        }
        Err(e) => {
            log::error!("store lookup failed for room {room_id}: {e}");
            Redirect::to("/").into_response()
        }
    }
}

// WebSocket handler for the real-time event protocol
async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    let gateway = state.gateway.clone();
    ws.on_upgrade(move |socket| async move { gateway.handle_connection(socket).await })
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Initialize logger
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let args = Args::parse();

    let rooms = Arc::new(RoomService::new(StoreAdapter::in_memory()));
    let gateway = SessionGateway::new(rooms.clone());
    let state = AppState { rooms, gateway };

    // Configure CORS
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
        .allow_origin(Any);

    // Create router with routes
    let app = Router::new()
        .route("/", get(index))
        .route("/create", get(create_page))
        .route("/join", get(join_page))
        .route("/game/{room_id}", get(game_page))
        .route("/ws", get(ws_handler))
        .with_state(state)
        .layer(cors);

    log::info!("starting bingo server v{} on {}", bingo::VERSION, args.bind);

    let listener = tokio::net::TcpListener::bind(args.bind).await?;
    axum::serve(listener, app).await
}
