//! Background Tasks Module
//!
//! Contains background tasks that run for the lifetime of the cache.
//!
//! # Tasks
//! - Expiration reaper: evicts expired entries on a fixed period

mod reaper;

pub use reaper::{reap_expired, spawn_reaper, ReaperHandle};
