//! Configuration Module
//!
//! Handles loading and managing cache configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::cache::MEGABYTE;

// == Defaults ==
const DEFAULT_MAX_ITEMS: usize = 32;
const DEFAULT_MAX_SIZE: u64 = 16 * MEGABYTE;
const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);
const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(60);
const DEFAULT_PIPE_SIZE: usize = 4;

/// Cache configuration parameters.
///
/// All values are fixed for the lifetime of a cache instance.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of items resident in memory (0 = unbounded)
    pub max_items: usize,
    /// Per-item size ceiling in bytes
    pub max_size: u64,
    /// Write-age after which an item expires
    pub ttl: Duration,
    /// Period of the background sweep, zero disables it
    pub check_interval: Duration,
    /// Capacity of the eviction notification channel (0 = disabled)
    pub pipe_size: usize,
    /// Directory holding `fc-namespaces`, the system temp dir when unset
    pub base_dir: Option<PathBuf>,
}

impl CacheConfig {
    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `FILECACHE_MAX_ITEMS` - Memory-resident cap (default: 32)
    /// - `FILECACHE_MAX_SIZE` - Per-item ceiling in bytes (default: 16 MiB)
    /// - `FILECACHE_TTL_SECS` - TTL in seconds (default: 300)
    /// - `FILECACHE_CHECK_INTERVAL_MS` - Sweep period in milliseconds (default: 60000)
    /// - `FILECACHE_PIPE_SIZE` - Eviction channel capacity (default: 4)
    /// - `FILECACHE_DIR` - Base directory (default: system temp dir)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            max_items: parse_var("FILECACHE_MAX_ITEMS").unwrap_or(defaults.max_items),
            max_size: parse_var("FILECACHE_MAX_SIZE").unwrap_or(defaults.max_size),
            ttl: parse_var("FILECACHE_TTL_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.ttl),
            check_interval: parse_var("FILECACHE_CHECK_INTERVAL_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.check_interval),
            pipe_size: parse_var("FILECACHE_PIPE_SIZE").unwrap_or(defaults.pipe_size),
            base_dir: env::var_os("FILECACHE_DIR")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
        }
    }

    /// Resolved base directory.
    pub fn base_dir(&self) -> PathBuf {
        self.base_dir.clone().unwrap_or_else(env::temp_dir)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_items: DEFAULT_MAX_ITEMS,
            max_size: DEFAULT_MAX_SIZE,
            ttl: DEFAULT_TTL,
            check_interval: DEFAULT_CHECK_INTERVAL,
            pipe_size: DEFAULT_PIPE_SIZE,
            base_dir: None,
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}
