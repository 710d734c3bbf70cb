//! Latency Simulation Module
//!
//! Emulates the round-trip cost of a remote cache with a bounded random delay.

use std::fmt;
use std::ops::RangeInclusive;
use std::time::Duration;

use rand::Rng;
use tracing::trace;

// == Operation ==
/// Cache operation kinds, each with its own latency range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Get,
    Set,
    Delete,
    Exists,
    Increment,
    Decrement,
    SetIfNotExists,
    ScanKeys,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Get => "get",
            Operation::Set => "set",
            Operation::Delete => "delete",
            Operation::Exists => "exists",
            Operation::Increment => "increment",
            Operation::Decrement => "decrement",
            Operation::SetIfNotExists => "set_if_not_exists",
            Operation::ScanKeys => "scan_keys",
        };
        f.write_str(name)
    }
}

// == Latency Profile ==
/// Inclusive delay bounds in milliseconds per operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatencyProfile {
    pub get: (u64, u64),
    pub set: (u64, u64),
    pub delete: (u64, u64),
    pub exists: (u64, u64),
    pub counter: (u64, u64),
    pub set_if_not_exists: (u64, u64),
    pub scan_keys: (u64, u64),
}

impl Default for LatencyProfile {
    fn default() -> Self {
        Self {
            get: (1, 5),
            set: (2, 8),
            delete: (1, 4),
            exists: (1, 3),
            counter: (2, 6),
            set_if_not_exists: (2, 8),
            scan_keys: (5, 15),
        }
    }
}

impl LatencyProfile {
    /// A profile with no delay at all.
    pub fn disabled() -> Self {
        Self {
            get: (0, 0),
            set: (0, 0),
            delete: (0, 0),
            exists: (0, 0),
            counter: (0, 0),
            set_if_not_exists: (0, 0),
            scan_keys: (0, 0),
        }
    }

    /// Multiplies every bound by `factor`.
    pub fn scaled(self, factor: u64) -> Self {
        let scale = |(min, max): (u64, u64)| (min.saturating_mul(factor), max.saturating_mul(factor));
        Self {
            get: scale(self.get),
            set: scale(self.set),
            delete: scale(self.delete),
            exists: scale(self.exists),
            counter: scale(self.counter),
            set_if_not_exists: scale(self.set_if_not_exists),
            scan_keys: scale(self.scan_keys),
        }
    }

    /// Returns the delay range for `op`, in milliseconds.
    pub fn range(&self, op: Operation) -> RangeInclusive<u64> {
        let (min, max) = match op {
            Operation::Get => self.get,
            Operation::Set => self.set,
            Operation::Delete => self.delete,
            Operation::Exists => self.exists,
            Operation::Increment | Operation::Decrement => self.counter,
            Operation::SetIfNotExists => self.set_if_not_exists,
            Operation::ScanKeys => self.scan_keys,
        };
        // A reversed pair collapses to its lower bound
        min..=max.max(min)
    }
}

// == Latency Simulator ==
/// Suspends the calling task for a random, per-operation duration.
#[derive(Debug, Clone, Default)]
pub struct LatencySimulator {
    profile: LatencyProfile,
}

impl LatencySimulator {
    pub fn new(profile: LatencyProfile) -> Self {
        Self { profile }
    }

    pub fn disabled() -> Self {
        Self::new(LatencyProfile::disabled())
    }

    pub fn profile(&self) -> &LatencyProfile {
        &self.profile
    }

    /// Draws a delay for `op` uniformly from its configured range.
    pub fn sample(&self, op: Operation) -> Duration {
        let range = self.profile.range(op);
        if *range.end() == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::thread_rng().gen_range(range))
    }

    /// Sleeps for a sampled delay; other tasks keep running meanwhile.
    pub async fn delay(&self, op: Operation) {
        let delay = self.sample(op);
        if delay.is_zero() {
            return;
        }
        trace!(operation = %op, delay_ms = delay.as_millis() as u64, "simulated latency");
        tokio::time::sleep(delay).await;
    }
}
