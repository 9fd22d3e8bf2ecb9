//! WebSocket upgrade handler

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::app::AppState;
use crate::game::{catalog, MatchSetup};
use crate::rooms::{RoomError, RoomService};
use crate::util::rate_limit::ConnectionRateLimiter;
use crate::util::time::unix_millis;
use crate::ws::protocol::{ClientMsg, ServerMsg};

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    let conn = Uuid::new_v4();
    info!(conn = %conn, "WebSocket upgrade");
    ws.on_upgrade(move |socket| handle_socket(socket, conn, state))
}

/// Handle the upgraded WebSocket connection
async fn handle_socket(socket: WebSocket, conn: Uuid, state: AppState) {
    info!(conn = %conn, "New WebSocket connection");

    let (mut ws_sink, ws_stream) = socket.split();

    let welcome = ServerMsg::Welcome {
        connection_id: conn,
        server_time: unix_millis(),
        characters: catalog::all().iter().map(|p| p.id).collect(),
    };

    if let Err(e) = send_msg(&mut ws_sink, &welcome).await {
        error!(conn = %conn, error = %e, "Failed to send welcome");
        return;
    }

    let outbound_rx = state.rooms.register(conn);
    let limiter = ConnectionRateLimiter::new(state.config.input_rate_limit);

    run_session(conn, &state.rooms, &limiter, ws_sink, ws_stream, outbound_rx).await;

    // Cleanup on disconnect
    state.rooms.disconnect(conn);

    info!(conn = %conn, "WebSocket connection closed");
}

/// Run the WebSocket session with read/write split
async fn run_session(
    conn: Uuid,
    rooms: &RoomService,
    limiter: &ConnectionRateLimiter,
    mut ws_sink: futures::stream::SplitSink<WebSocket, Message>,
    mut ws_stream: futures::stream::SplitStream<WebSocket>,
    mut outbound_rx: mpsc::Receiver<ServerMsg>,
) {
    // Spawn writer task: outbound queue -> WebSocket
    let writer_handle = tokio::spawn(async move {
        while let Some(msg) = outbound_rx.recv().await {
            if let Err(e) = send_msg(&mut ws_sink, &msg).await {
                debug!(conn = %conn, error = %e, "WebSocket send failed");
                break;
            }
        }
        debug!(conn = %conn, "Outbound channel closed");
    });

    // Reader loop: WebSocket -> rooms
    while let Some(result) = ws_stream.next().await {
        match result {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMsg>(&text) {
                Ok(msg) => handle_client_msg(conn, rooms, limiter, msg),
                Err(e) => {
                    warn!(conn = %conn, error = %e, "Failed to parse client message");
                }
            },
            Ok(Message::Binary(_)) => {
                warn!(conn = %conn, "Received binary message, ignoring");
            }
            Ok(Message::Ping(_)) => {
                debug!(conn = %conn, "Received ping");
            }
            Ok(Message::Pong(_)) => {
                debug!(conn = %conn, "Received pong");
            }
            Ok(Message::Close(_)) => {
                info!(conn = %conn, "Client initiated close");
                break;
            }
            Err(e) => {
                error!(conn = %conn, error = %e, "WebSocket error");
                break;
            }
        }
    }

    writer_handle.abort();
}

/// Dispatch one decoded client message
pub fn handle_client_msg(
    conn: Uuid,
    rooms: &RoomService,
    limiter: &ConnectionRateLimiter,
    msg: ClientMsg,
) {
    let target = msg.room_id().map(str::to_string);
    let result = match msg {
        ClientMsg::CreateRoom {
            room_id,
            character,
            rounds_to_win,
        } => {
            if !limiter.check_room() {
                warn!(conn = %conn, "Rate limited room request");
                return;
            }
            let mut setup = MatchSetup::default();
            if let Some(name) = character.as_deref() {
                setup.p1 = catalog::lookup(name).id;
            }
            if let Some(n) = rounds_to_win.filter(|&n| n > 0) {
                setup.rounds_to_win = n;
            }
            rooms.create_room(conn, &room_id, character.as_deref(), setup)
        }
        ClientMsg::JoinRoom { room_id, character } => {
            if !limiter.check_room() {
                warn!(conn = %conn, "Rate limited room request");
                return;
            }
            rooms
                .join_room(conn, &room_id, character.as_deref())
                .map(|_| ())
        }
        ClientMsg::SyncInput { room_id, input } => {
            if !limiter.check_input() {
                debug!(conn = %conn, "Rate limited input message");
                return;
            }
            rooms.relay_input(conn, &room_id, input).map(|_| ())
        }
        ClientMsg::SyncState { room_id, state } => {
            if !limiter.check_input() {
                debug!(conn = %conn, "Rate limited state message");
                return;
            }
            rooms.relay_state(conn, &room_id, state).map(|_| ())
        }
        ClientMsg::Ping { t } => {
            rooms.send_to(
                conn,
                ServerMsg::Pong {
                    t,
                    server_time: unix_millis(),
                },
            );
            Ok(())
        }
    };

    if let Err(e) = result {
        debug!(
            conn = %conn,
            room_id = target.as_deref().unwrap_or_default(),
            error = %e,
            "Room request failed"
        );
        let reply = match e {
            RoomError::Full(room_id) => ServerMsg::RoomFull { room_id },
            other => ServerMsg::error(other.code(), other.to_string()),
        };
        rooms.send_to(conn, reply);
    }
}

/// Send a message over WebSocket
async fn send_msg(
    sink: &mut futures::stream::SplitSink<WebSocket, Message>,
    msg: &ServerMsg,
) -> Result<(), String> {
    let json = serde_json::to_string(msg).map_err(|e| e.to_string())?;
    sink.send(Message::Text(json))
        .await
        .map_err(|e| e.to_string())
}
