//! Deterministic duel simulation
//!
//! Everything in here is synchronous and free of I/O. One [`GameState`] is
//! advanced by [`GameState::update`] once per tick with both players' inputs.

pub mod catalog;
pub mod combat;
pub mod combatant;
pub mod effects;
pub mod input;
pub mod r#match;
pub mod physics;
pub mod round;
pub mod snapshot;

pub use catalog::{CharacterPreset, RobotId, SpecialKind};
pub use combatant::{ActionState, AttackKind, Combatant, Facing};
pub use effects::EffectPool;
pub use input::{InputState, RemoteInputSlot, Side, TickInputs};
pub use r#match::{DuelEvent, GameState, MatchSetup};
pub use round::{RoundController, RoundPhase};
pub use snapshot::{DuelSnapshot, SnapshotBuilder};
