//! WebSocket protocol message definitions
//! These are the wire types for client-server communication

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::game::{DuelSnapshot, InputState, MatchSetup, RobotId};

/// Messages sent from client to server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMsg {
    /// Open a room and take the first seat
    CreateRoom {
        room_id: String,
        /// Robot id for the creator; unknown ids fall back to the default robot
        #[serde(default)]
        character: Option<String>,
        #[serde(default)]
        rounds_to_win: Option<u32>,
    },

    /// Take the free seat of a room, creating it if needed
    JoinRoom {
        room_id: String,
        #[serde(default)]
        character: Option<String>,
    },

    /// Latest local input, relayed to the opponent
    SyncInput { room_id: String, input: InputState },

    /// Authoritative-ish state from the host peer, relayed as-is
    SyncState {
        room_id: String,
        state: Box<DuelSnapshot>,
    },

    /// Ping for latency measurement
    Ping {
        /// Client timestamp
        t: u64,
    },
}

impl ClientMsg {
    /// Room the message targets, if any
    pub fn room_id(&self) -> Option<&str> {
        match self {
            ClientMsg::CreateRoom { room_id, .. }
            | ClientMsg::JoinRoom { room_id, .. }
            | ClientMsg::SyncInput { room_id, .. }
            | ClientMsg::SyncState { room_id, .. } => Some(room_id),
            ClientMsg::Ping { .. } => None,
        }
    }
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMsg {
    /// Welcome message after connection
    Welcome {
        connection_id: Uuid,
        server_time: u64,
        characters: Vec<RobotId>,
    },

    /// Room opened with the sender seated as P1
    RoomCreated { room_id: String },

    /// Room membership changed; sent to every occupant
    PlayerJoined {
        room_id: String,
        /// Connection ids in seat order (P1 first)
        players: Vec<Uuid>,
        setup: MatchSetup,
    },

    /// Both seats were taken
    RoomFull { room_id: String },

    /// Opponent's latest input
    OpponentInput { id: Uuid, input: InputState },

    /// Host peer's published state
    StateUpdate { state: Box<DuelSnapshot> },

    /// An occupant disconnected or left
    PlayerLeft { id: Uuid },

    /// Error message
    Error { code: String, message: String },

    /// Pong response
    Pong {
        /// Echo back client timestamp
        t: u64,
        server_time: u64,
    },
}

impl ServerMsg {
    pub fn error(code: &str, message: impl Into<String>) -> Self {
        ServerMsg::Error {
            code: code.to_string(),
            message: message.into(),
        }
    }
}
