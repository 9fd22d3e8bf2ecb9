//! Rate limiting utilities

use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::num::NonZeroU32;
use std::sync::Arc;

/// Rate limiter type alias
pub type Limiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Create a rate limiter with the specified requests per second
pub fn create_limiter(requests_per_second: u32) -> Arc<Limiter> {
    let quota = Quota::per_second(NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN));
    Arc::new(RateLimiter::direct(quota))
}

/// Room create/join attempts per second per connection
pub const ROOM_RATE_LIMIT: u32 = 5;

/// Per-connection rate limiter state
#[derive(Clone)]
pub struct ConnectionRateLimiter {
    input_limiter: Arc<Limiter>,
    room_limiter: Arc<Limiter>,
}

impl ConnectionRateLimiter {
    pub fn new(inputs_per_second: u32) -> Self {
        Self {
            input_limiter: create_limiter(inputs_per_second),
            room_limiter: create_limiter(ROOM_RATE_LIMIT),
        }
    }

    /// Check if an input or state message is allowed (returns true if allowed)
    pub fn check_input(&self) -> bool {
        self.input_limiter.check().is_ok()
    }

    /// Check if a room create/join is allowed
    pub fn check_room(&self) -> bool {
        self.room_limiter.check().is_ok()
    }
}
