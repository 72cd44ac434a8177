//! Time management for the control loop
//!
//! Microcontroller tick counters are 32-bit and wrap (a millisecond counter
//! after ~49.7 days). Every elapsed-time computation in the crate goes
//! through [`elapsed`], which uses wrapping subtraction and therefore stays
//! correct across one overflow as long as the interval itself is shorter
//! than the counter period.

/// Monotonic milliseconds since boot, wrapping at `u32::MAX`
pub type Millis = u32;

/// Milliseconds elapsed from `since` to `now`, correct across wraparound
#[inline]
pub const fn elapsed(now: Millis, since: Millis) -> u32 {
    now.wrapping_sub(since)
}

/// Source of monotonic time for the system
///
/// Implementations typically read a hardware timer. `&self` so a shared
/// clock can be passed around freely.
pub trait TimeSource {
    /// Current timestamp in milliseconds (wrapping)
    fn now(&self) -> Millis;
}

/// Fixed time source for testing and host simulation
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedTime {
    timestamp: Millis,
}

impl FixedTime {
    /// Start at a given timestamp
    pub const fn new(timestamp: Millis) -> Self {
        Self { timestamp }
    }

    /// Jump to a timestamp
    pub fn set(&mut self, timestamp: Millis) {
        self.timestamp = timestamp;
    }

    /// Move forward, wrapping like a hardware counter
    pub fn advance(&mut self, ms: u32) {
        self.timestamp = self.timestamp.wrapping_add(ms);
    }
}

impl TimeSource for FixedTime {
    fn now(&self) -> Millis {
        self.timestamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_without_wrap() {
        assert_eq!(elapsed(6000, 1000), 5000);
        assert_eq!(elapsed(1000, 1000), 0);
    }

    #[test]
    fn elapsed_across_wrap() {
        let start = u32::MAX - 499;
        assert_eq!(elapsed(500, start), 1000);
    }

    #[test]
    fn fixed_time_wraps() {
        let mut clock = FixedTime::new(u32::MAX - 1);
        clock.advance(3);
        assert_eq!(clock.now(), 1);
        clock.set(42);
        assert_eq!(clock.now(), 42);
    }
}
