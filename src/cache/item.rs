//! Cache Item Module
//!
//! Defines a single cached value with its access and modification metadata,
//! and the filesystem reads/writes that produce one.

use std::io::ErrorKind;
use std::path::Path;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::error::{CacheError, Result};

// == Cache Item ==
/// One cached value resident in memory.
///
/// Content is replaced wholesale on overwrite and never mutated in place.
/// The access stamp has its own lock so reads only need the shared side of
/// the store lock.
#[derive(Debug)]
pub struct CacheItem {
    content: Vec<u8>,
    modified_at: DateTime<Utc>,
    accessed_at: Mutex<DateTime<Utc>>,
}

impl CacheItem {
    // == Constructor ==
    /// Creates an item last written at `modified_at`.
    pub fn new(content: Vec<u8>, modified_at: DateTime<Utc>) -> Self {
        Self {
            content,
            modified_at,
            accessed_at: Mutex::new(Utc::now()),
        }
    }

    // == Access ==
    /// Stamps the access time and returns a copy of the content.
    pub fn access(&self) -> Vec<u8> {
        let mut accessed_at = self
            .accessed_at
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *accessed_at = Utc::now();

        self.content.clone()
    }

    // == Duration ==
    /// Time elapsed since the last write.
    ///
    /// A modification time in the future counts as zero.
    pub fn duration(&self) -> Duration {
        (Utc::now() - self.modified_at())
            .to_std()
            .unwrap_or(Duration::ZERO)
    }

    /// Checks whether the item is older than `ttl`.
    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.duration() > ttl
    }

    // == Modified At ==
    /// When the content was last written, the file mtime for loaded items.
    pub fn modified_at(&self) -> DateTime<Utc> {
        self.modified_at
    }

    // == Accessed At ==
    /// When the content was last read or written.
    pub fn accessed_at(&self) -> DateTime<Utc> {
        *self
            .accessed_at
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Content length in bytes.
    pub fn len(&self) -> usize {
        self.content.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    // == Load ==
    /// Reads the file behind `key`, taking its modification time as the
    /// write time.
    pub(crate) async fn load(key: &str, path: &Path, max_size: u64) -> Result<Self> {
        let metadata = fs::metadata(path)
            .await
            .map_err(|e| not_found_or_io(key, e))?;

        if metadata.is_dir() {
            return Err(CacheError::IsDirectory(key.to_string()));
        }
        check_size(key, metadata.len(), max_size)?;

        // The file may vanish or grow between stat and read
        let content = fs::read(path).await.map_err(|e| not_found_or_io(key, e))?;
        check_size(key, content.len() as u64, max_size)?;

        let modified_at = metadata
            .modified()
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now());

        Ok(Self::new(content, modified_at))
    }

    // == Write ==
    /// Writes `content` to the file behind `key` and flushes it to disk.
    ///
    /// Nothing touches the filesystem when the content is too large.
    pub(crate) async fn write(
        key: &str,
        path: &Path,
        content: Vec<u8>,
        max_size: u64,
    ) -> Result<Self> {
        check_size(key, content.len() as u64, max_size)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| CacheError::InvalidKey(format!("{key}: {e}")))?;
        }

        let mut file = fs::File::create(path).await?;
        file.write_all(&content).await?;
        file.sync_all().await?;

        Ok(Self::new(content, Utc::now()))
    }
}

fn check_size(key: &str, size: u64, max_size: u64) -> Result<()> {
    if size > max_size {
        return Err(CacheError::TooLarge {
            key: key.to_string(),
            size,
            max_size,
        });
    }
    Ok(())
}

pub(crate) fn not_found_or_io(key: &str, err: std::io::Error) -> CacheError {
    if err.kind() == ErrorKind::NotFound {
        CacheError::NotFound(key.to_string())
    } else {
        CacheError::Io(err)
    }
}
