//! Sim Cache - an in-process stand-in for a remote key-value cache
//!
//! Provides atomic get/set/delete/exists, counters, conditional inserts and
//! key scans with simulated network latency and TTL expiration.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use cache::{CacheService, CacheStore};
pub use config::Config;
pub use tasks::{spawn_reaper, ReaperHandle};
