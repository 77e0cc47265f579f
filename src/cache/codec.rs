//! Typed Value Helpers
//!
//! Serde-based wrappers over `FileCache::get` and `FileCache::set` that
//! store values as JSON.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::cache::FileCache;
use crate::error::{CacheError, Result};

/// Encodes `value` as JSON and stores it under `key`.
pub async fn set_encoded<T>(cache: &FileCache, key: &str, value: &T) -> Result<()>
where
    T: Serialize + ?Sized,
{
    let bytes = serde_json::to_vec(value).map_err(CacheError::Encode)?;
    cache.set(key, bytes).await
}

/// Reads `key` and decodes it as `T`.
///
/// A miss surfaces as `NotFound`, undecodable content as `Decode`.
pub async fn get_decoded<T>(cache: &FileCache, key: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    let bytes = cache.get(key).await?;
    serde_json::from_slice(&bytes).map_err(CacheError::Decode)
}
