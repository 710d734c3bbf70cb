//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use crate::cache::{LatencyProfile, LatencySimulator};

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Seconds between expiration reaper sweeps
    pub reaper_interval: u64,
    /// Whether operations are delayed to mimic a remote cache
    pub simulate_latency: bool,
    /// Multiplier applied to every latency bound
    pub latency_scale: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `REAPER_INTERVAL_SECS` - Reaper period in seconds, 0 is rejected (default: 30)
    /// - `SIMULATE_LATENCY` - `true`/`false` (default: true)
    /// - `LATENCY_SCALE` - Latency multiplier (default: 1)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: env_or("SERVER_PORT", defaults.server_port),
            reaper_interval: positive_env_or("REAPER_INTERVAL_SECS", defaults.reaper_interval),
            simulate_latency: env_or("SIMULATE_LATENCY", defaults.simulate_latency),
            latency_scale: env_or("LATENCY_SCALE", defaults.latency_scale),
        }
    }

    pub fn reaper_interval(&self) -> Duration {
        Duration::from_secs(self.reaper_interval)
    }

    /// Builds the latency simulator described by this configuration.
    pub fn latency(&self) -> LatencySimulator {
        if self.simulate_latency {
            LatencySimulator::new(LatencyProfile::default().scaled(self.latency_scale))
        } else {
            LatencySimulator::disabled()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            reaper_interval: 30,
            simulate_latency: true,
            latency_scale: 1,
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Like [`env_or`], but a zero value falls back to `default`.
fn positive_env_or(name: &str, default: u64) -> u64 {
    match env_or(name, default) {
        0 => {
            warn!("{} must be greater than zero, using {}", name, default);
            default
        }
        value => value,
    }
}
