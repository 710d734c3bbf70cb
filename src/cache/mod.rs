//! Cache Module
//!
//! In-process stand-in for a remote key-value cache: sharded storage, JSON
//! codec, simulated latency and TTL expiry.

pub mod codec;
mod entry;
mod latency;
mod service;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use latency::{LatencyProfile, LatencySimulator, Operation};
pub use service::CacheService;
pub use stats::{CacheStats, StatsCounters};
pub use store::{CacheStore, KeyPattern};

// == Public Constants ==
/// Maximum allowed key length in bytes, enforced at the HTTP boundary
pub const MAX_KEY_LENGTH: usize = 256;
