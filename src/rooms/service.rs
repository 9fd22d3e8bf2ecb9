//! Room service - connection registry and message relay
//!
//! The server never simulates a duel. It seats connections into rooms and
//! forwards inputs and host snapshots between the two occupants.

use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::game::{DuelSnapshot, InputState, MatchSetup, Side};
use crate::ws::protocol::ServerMsg;

use super::room::Room;
use super::RoomError;

/// Outbound queue depth per connection
const OUTBOUND_CAPACITY: usize = 64;

/// Room service
pub struct RoomService {
    rooms: Mutex<HashMap<String, Room>>,
    /// Outbound channel per connected client
    connections: DashMap<Uuid, mpsc::Sender<ServerMsg>>,
    /// Connection -> room it currently sits in
    memberships: DashMap<Uuid, String>,
}

impl RoomService {
    pub fn new() -> Self {
        Self {
            rooms: Mutex::new(HashMap::new()),
            connections: DashMap::new(),
            memberships: DashMap::new(),
        }
    }

    /// Register a connection (called when WebSocket connects)
    /// Returns the receiving end of its outbound queue
    pub fn register(&self, conn: Uuid) -> mpsc::Receiver<ServerMsg> {
        let (tx, rx) = mpsc::channel(OUTBOUND_CAPACITY);
        self.connections.insert(conn, tx);
        debug!(conn = %conn, "Connection registered");
        rx
    }

    /// Open (or reopen) a room with the caller in the first seat
    pub fn create_room(
        &self,
        conn: Uuid,
        room_id: &str,
        character: Option<&str>,
        mut setup: MatchSetup,
    ) -> Result<(), RoomError> {
        let room_id = normalize_room_id(room_id)?;

        {
            let mut rooms = self.rooms.lock();
            if let Some(existing) = rooms.get(room_id) {
                if existing.others(conn).next().is_some() {
                    return Err(RoomError::Exists(room_id.to_string()));
                }
            }

            if setup.seed == 0 {
                setup.seed = rand::random::<u64>();
            }
            let mut room = Room::new(room_id, setup);
            room.seat(conn, character)?;
            rooms.insert(room_id.to_string(), room);
        }
        self.leave_current_room(conn, Some(room_id));
        self.memberships.insert(conn, room_id.to_string());

        info!(conn = %conn, room_id = %room_id, "Room created");
        self.send_to(
            conn,
            ServerMsg::RoomCreated {
                room_id: room_id.to_string(),
            },
        );
        Ok(())
    }

    /// Seat the caller in a room, creating an empty one on first join.
    /// Every occupant is told the new membership.
    pub fn join_room(
        &self,
        conn: Uuid,
        room_id: &str,
        character: Option<&str>,
    ) -> Result<Side, RoomError> {
        let room_id = normalize_room_id(room_id)?;

        let (side, players, setup) = {
            let mut rooms = self.rooms.lock();
            if let Some(room) = rooms.get(room_id) {
                if room.is_full() && !room.contains(conn) {
                    warn!(conn = %conn, room_id = %room_id, "Join rejected, room full");
                    return Err(RoomError::Full(room_id.to_string()));
                }
            }

            let room = rooms.entry(room_id.to_string()).or_insert_with(|| {
                let setup = MatchSetup::default().with_seed(rand::random::<u64>());
                Room::new(room_id, setup)
            });
            let side = room.seat(conn, character)?;
            (side, room.players().to_vec(), room.setup.clone())
        };
        self.leave_current_room(conn, Some(room_id));
        self.memberships.insert(conn, room_id.to_string());

        info!(
            conn = %conn,
            room_id = %room_id,
            side = ?side,
            player_count = players.len(),
            "Player joined room"
        );

        let msg = ServerMsg::PlayerJoined {
            room_id: room_id.to_string(),
            players: players.clone(),
            setup,
        };
        for player in players {
            self.send_to(player, msg.clone());
        }
        Ok(side)
    }

    /// Forward the caller's input to the other occupant.
    /// Returns how many connections it was queued for.
    pub fn relay_input(
        &self,
        conn: Uuid,
        room_id: &str,
        input: InputState,
    ) -> Result<usize, RoomError> {
        let targets = self.others_in(conn, room_id)?;
        let msg = ServerMsg::OpponentInput { id: conn, input };
        Ok(self.fan_out(&targets, msg))
    }

    /// Forward a host snapshot to the other occupant
    pub fn relay_state(
        &self,
        conn: Uuid,
        room_id: &str,
        state: Box<DuelSnapshot>,
    ) -> Result<usize, RoomError> {
        let targets = self.others_in(conn, room_id)?;
        let msg = ServerMsg::StateUpdate { state };
        Ok(self.fan_out(&targets, msg))
    }

    /// Drop a connection, notify its room and delete the room if empty
    pub fn disconnect(&self, conn: Uuid) {
        self.leave_current_room(conn, None);
        self.connections.remove(&conn);
        debug!(conn = %conn, "Connection unregistered");
    }

    /// Queue a message for one connection
    pub fn send_to(&self, conn: Uuid, msg: ServerMsg) -> bool {
        let Some(tx) = self.connections.get(&conn).map(|tx| tx.clone()) else {
            return false;
        };
        match tx.try_send(msg) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(conn = %conn, "Outbound queue full, dropping message");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                debug!(conn = %conn, "Outbound queue closed");
                false
            }
        }
    }

    pub fn room(&self, room_id: &str) -> Option<Room> {
        let room_id = normalize_room_id(room_id).ok()?;
        self.rooms.lock().get(room_id).cloned()
    }

    pub fn room_count(&self) -> usize {
        self.rooms.lock().len()
    }

    /// Connected clients, seated or not
    pub fn player_count(&self) -> usize {
        self.connections.len()
    }

    fn others_in(&self, conn: Uuid, room_id: &str) -> Result<Vec<Uuid>, RoomError> {
        let room_id = normalize_room_id(room_id)?;
        let rooms = self.rooms.lock();
        let room = rooms
            .get(room_id)
            .ok_or_else(|| RoomError::NotFound(room_id.to_string()))?;
        if !room.contains(conn) {
            return Err(RoomError::NotMember(room_id.to_string()));
        }
        Ok(room.others(conn).collect())
    }

    fn fan_out(&self, targets: &[Uuid], msg: ServerMsg) -> usize {
        targets
            .iter()
            .filter(|&&target| self.send_to(target, msg.clone()))
            .count()
    }

    /// Leave whatever room `conn` sits in, unless it is `keep`
    fn leave_current_room(&self, conn: Uuid, keep: Option<&str>) {
        let Some(room_id) = self.memberships.get(&conn).map(|r| r.clone()) else {
            return;
        };
        if keep == Some(room_id.as_str()) {
            return;
        }
        self.memberships.remove(&conn);

        let remaining = {
            let mut rooms = self.rooms.lock();
            let Some(room) = rooms.get_mut(&room_id) else {
                return;
            };
            if !room.leave(conn) {
                return;
            }
            if room.is_empty() {
                if let Some(room) = rooms.remove(&room_id) {
                    info!(
                        room_id = %room_id,
                        age_secs = room.age().as_secs(),
                        "Room closed"
                    );
                }
                Vec::new()
            } else {
                room.players().to_vec()
            }
        };

        info!(conn = %conn, room_id = %room_id, "Player left room");
        self.fan_out(&remaining, ServerMsg::PlayerLeft { id: conn });
    }
}

impl Default for RoomService {
    fn default() -> Self {
        Self::new()
    }
}

/// Trim a client room id; every lookup goes through here
pub fn normalize_room_id(room_id: &str) -> Result<&str, RoomError> {
    let trimmed = room_id.trim();
    if trimmed.is_empty() || trimmed.len() > super::MAX_ROOM_ID_LEN {
        return Err(RoomError::InvalidId);
    }
    Ok(trimmed)
}
