//! Rate limiting for inbound session messages

use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::num::NonZeroU32;

/// Rate limiter type alias
pub type Limiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Per-session inbound message limiter
pub struct SessionRateLimiter {
    limiter: Limiter,
}

impl SessionRateLimiter {
    pub fn new(messages_per_second: u32) -> Self {
        let quota =
            Quota::per_second(NonZeroU32::new(messages_per_second).unwrap_or(NonZeroU32::MIN));
        Self {
            limiter: RateLimiter::direct(quota),
        }
    }

    /// Check if a message is allowed (returns true if allowed)
    pub fn check(&self) -> bool {
        self.limiter.check().is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn burst_beyond_quota_is_refused() {
        let limiter = SessionRateLimiter::new(5);
        let allowed = (0..20).filter(|_| limiter.check()).count();
        assert_eq!(allowed, 5);
    }
}
