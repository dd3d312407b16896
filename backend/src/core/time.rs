//! Event timestamps
//!
//! Every event carries a wall-clock timestamp in milliseconds since the Unix
//! epoch, captured at send time. The clock never hands out a timestamp older
//! than the previous one, so timestamps are non-decreasing in send order even
//! if the system clock steps backwards.

use chrono::Utc;

/// Source of wall-clock milliseconds
///
/// Abstracted so tests can drive time explicitly.
pub trait TimeSource: Send {
    /// Current time in milliseconds since the Unix epoch
    fn now_ms(&self) -> i64;
}

/// System wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTime;

impl TimeSource for SystemTime {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Hands out non-decreasing event timestamps
///
/// # Example
/// ```
/// use fraud_txgen_core::EventClock;
///
/// let mut clock = EventClock::system();
/// let first = clock.stamp();
/// let second = clock.stamp();
/// assert!(second >= first);
/// assert_eq!(clock.issued(), 2);
/// ```
pub struct EventClock {
    source: Box<dyn TimeSource>,
    /// Last timestamp handed out (ms)
    last_ms: i64,
    /// Number of timestamps handed out
    issued: u64,
}

impl EventClock {
    /// Create a clock over an arbitrary time source
    pub fn new(source: Box<dyn TimeSource>) -> Self {
        Self {
            source,
            last_ms: i64::MIN,
            issued: 0,
        }
    }

    /// Clock backed by the system wall clock
    pub fn system() -> Self {
        Self::new(Box::new(SystemTime))
    }

    /// Capture a timestamp for an event about to be sent
    pub fn stamp(&mut self) -> i64 {
        let now = self.source.now_ms();
        self.last_ms = self.last_ms.max(now);
        self.issued += 1;
        self.last_ms
    }

    /// Last timestamp handed out, if any
    pub fn last(&self) -> Option<i64> {
        if self.issued == 0 {
            None
        } else {
            Some(self.last_ms)
        }
    }

    /// Number of timestamps handed out so far
    pub fn issued(&self) -> u64 {
        self.issued
    }
}

impl std::fmt::Debug for EventClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventClock")
            .field("last_ms", &self.last())
            .field("issued", &self.issued)
            .finish()
    }
}
