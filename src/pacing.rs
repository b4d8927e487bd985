use std::time::Duration;

use rand::Rng;

/// Randomized wait between requests, uniform over `[min_ms, max_ms]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacingPolicy {
    min_ms: u64,
    max_ms: u64,
}

impl PacingPolicy {
    /// Spacing between full chapter fetches.
    pub const CHAPTER: PacingPolicy = PacingPolicy {
        min_ms: 1000,
        max_ms: 3000,
    };

    /// Shorter "reading" pause used between lightweight requests.
    pub const READING: PacingPolicy = PacingPolicy {
        min_ms: 800,
        max_ms: 2000,
    };

    /// Returns `None` when `min_ms > max_ms`.
    pub const fn new(min_ms: u64, max_ms: u64) -> Option<Self> {
        if min_ms > max_ms {
            None
        } else {
            Some(Self { min_ms, max_ms })
        }
    }

    /// No waiting at all.
    pub const fn none() -> Self {
        Self {
            min_ms: 0,
            max_ms: 0,
        }
    }

    pub const fn min_ms(&self) -> u64 {
        self.min_ms
    }

    pub const fn max_ms(&self) -> u64 {
        self.max_ms
    }

    pub fn next_delay_ms(&self) -> u64 {
        rand::thread_rng().gen_range(self.min_ms..=self.max_ms)
    }

    pub fn next_delay(&self) -> Duration {
        Duration::from_millis(self.next_delay_ms())
    }
}

impl Default for PacingPolicy {
    fn default() -> Self {
        Self::CHAPTER
    }
}
