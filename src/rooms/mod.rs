//! Two-player rooms and the input/state relay

pub mod room;
pub mod service;

pub use room::Room;
pub use service::{normalize_room_id, RoomService};

/// Longest accepted room id
pub const MAX_ROOM_ID_LEN: usize = 64;

/// Room errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoomError {
    #[error("Room {0} is full")]
    Full(String),

    #[error("Room {0} does not exist")]
    NotFound(String),

    #[error("Room {0} is already occupied")]
    Exists(String),

    #[error("Not seated in room {0}")]
    NotMember(String),

    #[error("Room id must be 1-64 characters")]
    InvalidId,
}

impl RoomError {
    /// Stable code for the wire `error` message
    pub fn code(&self) -> &'static str {
        match self {
            RoomError::Full(_) => "room_full",
            RoomError::NotFound(_) => "room_not_found",
            RoomError::Exists(_) => "room_exists",
            RoomError::NotMember(_) => "not_in_room",
            RoomError::InvalidId => "invalid_room_id",
        }
    }
}
