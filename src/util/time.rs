//! Time utilities for the duel clock and server bookkeeping

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Get current Unix timestamp in milliseconds
pub fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_millis() as u64
}

/// Server start time for uptime tracking
static SERVER_START: std::sync::OnceLock<Instant> = std::sync::OnceLock::new();

/// Initialize server start time (call once at startup)
pub fn init_server_time() {
    SERVER_START.get_or_init(Instant::now);
}

/// Get server uptime in seconds
pub fn uptime_secs() -> u64 {
    SERVER_START
        .get()
        .map(|start| start.elapsed().as_secs())
        .unwrap_or(0)
}

/// Tick rate configuration
pub const SIMULATION_TPS: u32 = 60; // fixed-step duel ticks per second
pub const INPUT_SYNC_TPS: u32 = 30; // clients publish inputs ~every 33ms

/// Longest frame delta a single update will integrate (seconds)
pub const MAX_FRAME_DT: f32 = 0.033;

/// Calculate delta time for physics (in seconds)
pub fn tick_delta() -> f32 {
    1.0 / SIMULATION_TPS as f32
}

/// Clamp a frame delta into `0.0..=MAX_FRAME_DT`.
/// Non-finite and non-positive deltas map to 0, meaning "do nothing".
pub fn clamp_frame_dt(dt: f32) -> f32 {
    if dt.is_finite() && dt > 0.0 {
        dt.min(MAX_FRAME_DT)
    } else {
        0.0
    }
}
