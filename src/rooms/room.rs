//! A two-seat duel room

use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::game::{catalog, MatchSetup, Side};

use super::RoomError;

/// Seats per room
pub const MAX_PLAYERS: usize = 2;

/// Room with up to two connections; seat order is P1 then P2
#[derive(Debug, Clone)]
pub struct Room {
    pub id: String,
    players: Vec<Uuid>,
    pub setup: MatchSetup,
    pub created_at: Instant,
}

impl Room {
    pub fn new(id: impl Into<String>, setup: MatchSetup) -> Self {
        Self {
            id: id.into(),
            players: Vec::with_capacity(MAX_PLAYERS),
            setup,
            created_at: Instant::now(),
        }
    }

    /// Seat a connection and record its robot choice for that seat.
    /// Rejoining returns the existing seat.
    pub fn seat(&mut self, conn: Uuid, character: Option<&str>) -> Result<Side, RoomError> {
        if let Some(side) = self.side_of(conn) {
            return Ok(side);
        }
        if self.is_full() {
            return Err(RoomError::Full(self.id.clone()));
        }

        self.players.push(conn);
        let side = Side::from_seat(self.players.len() - 1);
        if let Some(character) = character {
            let id = catalog::lookup(character).id;
            match side {
                Side::P1 => self.setup.p1 = id,
                Side::P2 => self.setup.p2 = id,
            }
        }
        Ok(side)
    }

    /// Remove a connection; returns whether it was seated
    pub fn leave(&mut self, conn: Uuid) -> bool {
        let before = self.players.len();
        self.players.retain(|p| *p != conn);
        self.players.len() != before
    }

    pub fn side_of(&self, conn: Uuid) -> Option<Side> {
        self.players
            .iter()
            .position(|p| *p == conn)
            .map(Side::from_seat)
    }

    pub fn contains(&self, conn: Uuid) -> bool {
        self.players.contains(&conn)
    }

    /// Everyone except `conn`
    pub fn others(&self, conn: Uuid) -> impl Iterator<Item = Uuid> + '_ {
        self.players.iter().copied().filter(move |p| *p != conn)
    }

    pub fn players(&self) -> &[Uuid] {
        &self.players
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= MAX_PLAYERS
    }

    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }
}
