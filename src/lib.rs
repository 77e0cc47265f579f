//! filecache - A process-local file-backed cache
//!
//! Keeps an in-memory index over values stored as files under a namespace
//! directory, with TTL expiration, load-through on miss and a background
//! vacuum task.

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod tasks;

pub use cache::{get_decoded, set_encoded, CacheStats, Eviction, EvictionReason, FileCache};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
