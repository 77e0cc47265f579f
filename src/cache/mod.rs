//! Cache Module
//!
//! File-backed caching with an in-memory index, TTL expiration and
//! load-through from disk.

mod codec;
mod events;
mod item;
mod path;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use codec::{get_decoded, set_encoded};
pub use events::{Eviction, EvictionReason};
pub use item::CacheItem;
pub use path::{PathResolver, NAMESPACES_DIR};
pub use stats::CacheStats;
pub use store::FileCache;

pub(crate) use events::EvictionNotifier;
pub(crate) use store::Shared;

// == Size Constants ==
pub const KILOBYTE: u64 = 1024;
pub const MEGABYTE: u64 = 1024 * KILOBYTE;
pub const GIGABYTE: u64 = 1024 * MEGABYTE;
