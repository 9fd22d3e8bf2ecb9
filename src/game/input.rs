//! Per-tick input snapshots and remote input merging

use serde::{Deserialize, Serialize};

/// Normalized intents for one side for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputState {
    pub left: bool,
    pub right: bool,
    /// Jump
    pub up: bool,
    /// Crouch, carried on the wire but unused by the simulation
    pub down: bool,
    pub light: bool,
    pub heavy: bool,
    pub special: bool,
    pub block: bool,
}

impl InputState {
    /// True when any attack button is held
    pub fn any_attack(&self) -> bool {
        self.light || self.heavy || self.special
    }
}

/// Which combatant an input or result belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    P1,
    P2,
}

impl Side {
    pub fn index(self) -> usize {
        match self {
            Side::P1 => 0,
            Side::P2 => 1,
        }
    }

    pub fn opponent(self) -> Side {
        match self {
            Side::P1 => Side::P2,
            Side::P2 => Side::P1,
        }
    }

    /// Side for a room seat (0 = host)
    pub fn from_seat(seat: usize) -> Side {
        if seat == 0 {
            Side::P1
        } else {
            Side::P2
        }
    }
}

/// Last input received from the remote peer.
///
/// Packets arrive at their own cadence; whichever arrived last is used for
/// every tick until a newer one replaces it.
#[derive(Debug, Clone, Default)]
pub struct RemoteInputSlot {
    latest: InputState,
    received: u64,
}

impl RemoteInputSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a freshly received snapshot
    pub fn receive(&mut self, input: InputState) {
        self.latest = input;
        self.received += 1;
    }

    /// Value to use for the current tick
    pub fn current(&self) -> InputState {
        self.latest
    }

    /// Number of packets received so far
    pub fn received(&self) -> u64 {
        self.received
    }
}

/// Resolved inputs for both sides for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInputs {
    pub p1: InputState,
    pub p2: InputState,
}

impl TickInputs {
    /// Local side uses the fresh snapshot, the other side whatever the slot holds
    pub fn merge(local_side: Side, local: InputState, remote: &RemoteInputSlot) -> Self {
        match local_side {
            Side::P1 => Self {
                p1: local,
                p2: remote.current(),
            },
            Side::P2 => Self {
                p1: remote.current(),
                p2: local,
            },
        }
    }

    pub fn for_side(&self, side: Side) -> InputState {
        match side {
            Side::P1 => self.p1,
            Side::P2 => self.p2,
        }
    }
}
