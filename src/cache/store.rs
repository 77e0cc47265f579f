//! File Cache Store Module
//!
//! Main cache engine: an in-memory index over files in a namespace directory,
//! with load-through on miss, TTL expiration and capacity eviction.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::fs;
use tokio::sync::{mpsc, RwLock, RwLockReadGuard};
use tracing::{debug, info, warn};

use crate::cache::item::not_found_or_io;
use crate::cache::stats::StatsRecorder;
use crate::cache::{
    CacheItem, CacheStats, Eviction, EvictionNotifier, EvictionReason, PathResolver,
};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::tasks::{spawn_vacuum_task, VacuumHandle};

// == Shared State ==
/// State shared between the cache handle and its vacuum task.
///
/// The map lock guards the index only; file contents are read and written
/// outside of it, except during a sweep where eviction and file removal
/// happen in one locked pass.
#[derive(Debug)]
pub(crate) struct Shared {
    pub(crate) paths: PathResolver,
    pub(crate) items: RwLock<HashMap<String, CacheItem>>,
    pub(crate) stats: StatsRecorder,
    notifier: EvictionNotifier,
    ttl: Duration,
    max_items: usize,
}

impl Shared {
    pub(crate) fn new(
        paths: PathResolver,
        notifier: EvictionNotifier,
        ttl: Duration,
        max_items: usize,
    ) -> Self {
        Self {
            paths,
            items: RwLock::new(HashMap::new()),
            stats: StatsRecorder::default(),
            notifier,
            ttl,
            max_items,
        }
    }

    // == Sweep Expired ==
    /// Evicts every resident item older than the TTL and deletes its file.
    ///
    /// Returns the number of items removed.
    pub(crate) async fn sweep_expired(&self) -> usize {
        let mut items = self.items.write().await;

        let expired: Vec<String> = items
            .iter()
            .filter(|(_, item)| item.is_expired(self.ttl))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            self.remove_expired(&mut items, key).await;
        }

        expired.len()
    }

    async fn remove_expired(&self, items: &mut HashMap<String, CacheItem>, key: &str) {
        items.remove(key);

        match self.paths.resolve(key) {
            Ok(path) => match fs::remove_file(&path).await {
                Ok(()) => {}
                // Already gone, expiry is best-effort
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    debug!(key = %key, "Expired item already removed from disk");
                }
                Err(e) => {
                    warn!(key = %key, error = %e, "Failed to delete expired item");
                }
            },
            Err(e) => warn!(key = %key, error = %e, "Expired item has no valid path"),
        }

        self.stats.record_expiration();
        self.notifier.notify(key, EvictionReason::Expired);
    }

    // == Make Room ==
    /// Drops the least recently accessed items from memory until a new key
    /// fits under `max_items`. Files are left on disk.
    fn make_room(&self, items: &mut HashMap<String, CacheItem>, key: &str) {
        if self.max_items == 0 || items.contains_key(key) {
            return;
        }

        while items.len() >= self.max_items {
            let Some(oldest) = items
                .iter()
                .min_by_key(|(_, item)| item.accessed_at())
                .map(|(key, _)| key.clone())
            else {
                break;
            };

            items.remove(&oldest);
            self.stats.record_eviction();
            self.notifier.notify(&oldest, EvictionReason::Capacity);
            debug!(key = %oldest, "Evicted least recently accessed item from memory");
        }
    }
}

// == File Cache ==
/// A cache that keeps files under a namespace directory and indexes them
/// in memory.
///
/// Share it between tasks with `Arc<FileCache>`. Terminate it with
/// [`shutdown`](Self::shutdown) to keep the files or
/// [`destroy`](Self::destroy) to remove them.
///
/// Operations hold the read side of `lifecycle` across their file I/O.
/// Shutdown holds the write side for its whole body, so it waits for them
/// and later operations observe `closed`.
#[derive(Debug)]
pub struct FileCache {
    shared: Arc<Shared>,
    max_size: u64,
    lifecycle: RwLock<()>,
    closed: AtomicBool,
    vacuum: Mutex<Option<VacuumHandle>>,
    evictions: Mutex<Option<mpsc::Receiver<Eviction>>>,
}

impl FileCache {
    // == Constructor ==
    /// Opens the cache for `namespace` and starts its vacuum task.
    ///
    /// A non-zero `check_interval` requires a running tokio runtime.
    pub fn new(namespace: impl Into<String>, config: CacheConfig) -> Result<Self> {
        let paths = PathResolver::new(config.base_dir(), namespace)?;
        let (notifier, evictions) = EvictionNotifier::channel(config.pipe_size);
        let shared = Arc::new(Shared::new(
            paths,
            notifier,
            config.ttl,
            config.max_items,
        ));

        let vacuum = spawn_vacuum_task(shared.clone(), config.check_interval)?;

        info!(
            namespace = %shared.paths.namespace(),
            dir = %shared.paths.namespace_dir().display(),
            max_items = config.max_items,
            max_size = config.max_size,
            ttl_ms = config.ttl.as_millis() as u64,
            "File cache opened"
        );

        Ok(Self {
            shared,
            max_size: config.max_size,
            lifecycle: RwLock::new(()),
            closed: AtomicBool::new(false),
            vacuum: Mutex::new(vacuum),
            evictions: Mutex::new(evictions),
        })
    }

    // == Get ==
    /// Retrieves the content stored under `key`.
    ///
    /// Memory is consulted first; on a miss the file is loaded and indexed.
    pub async fn get(&self, key: &str) -> Result<Vec<u8>> {
        let _open = self.enter().await?;

        let result = self.lookup(key).await;
        if result.is_err() {
            self.shared.stats.record_miss();
        }
        result
    }

    async fn lookup(&self, key: &str) -> Result<Vec<u8>> {
        let path = self.shared.paths.resolve(key)?;

        let resident = {
            let items = self.shared.items.read().await;
            items.get(key).map(CacheItem::access)
        };
        if let Some(content) = resident {
            self.shared.stats.record_hit();
            return Ok(content);
        }

        // Load-through, the file is read without holding the map lock.
        // Expiry is left to the vacuum task.
        let item = CacheItem::load(key, &path, self.max_size).await?;

        let content = {
            let mut items = self.shared.items.write().await;
            self.shared.make_room(&mut items, key);
            // A concurrent set wins over what was read from disk
            items.entry(key.to_string()).or_insert(item).access()
        };

        self.shared.stats.record_load();
        debug!(key = %key, size = content.len(), "Loaded item from disk");
        Ok(content)
    }

    // == Exists ==
    /// Checks if `get` would succeed for `key`.
    pub async fn exists(&self, key: &str) -> bool {
        self.get(key).await.is_ok()
    }

    // == Set ==
    /// Writes `content` under `key` on disk and in memory.
    ///
    /// The file is flushed before this returns.
    pub async fn set(&self, key: &str, content: impl Into<Vec<u8>>) -> Result<()> {
        let _open = self.enter().await?;

        let path = self.shared.paths.resolve(key)?;
        let item = CacheItem::write(key, &path, content.into(), self.max_size).await?;
        let size = item.len();

        {
            let mut items = self.shared.items.write().await;
            self.shared.make_room(&mut items, key);
            items.insert(key.to_string(), item);
        }

        debug!(key = %key, size, "Stored item");
        Ok(())
    }

    // == Delete ==
    /// Removes `key` from memory and deletes its file.
    pub async fn delete(&self, key: &str) -> Result<()> {
        let _open = self.enter().await?;

        let path = self.shared.paths.resolve(key)?;
        self.shared.items.write().await.remove(key);

        fs::remove_file(&path)
            .await
            .map_err(|e| not_found_or_io(key, e))?;

        debug!(key = %key, "Deleted item");
        Ok(())
    }

    // == Size In Memory ==
    /// Number of items currently resident in memory.
    pub async fn size_in_memory(&self) -> usize {
        self.shared.items.read().await.len()
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub async fn stats(&self) -> CacheStats {
        let resident = self.size_in_memory().await;
        self.shared.stats.snapshot(resident)
    }

    // == Evictions ==
    /// Takes the receiver of eviction notifications.
    ///
    /// Returns `None` when `pipe_size` is zero or the receiver was already
    /// taken.
    pub fn evictions(&self) -> Option<mpsc::Receiver<Eviction>> {
        self.evictions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    // == Namespace ==
    /// Name of the namespace this cache was opened on.
    pub fn namespace(&self) -> &str {
        self.shared.paths.namespace()
    }

    // == Namespace Dir ==
    /// Directory holding the files of this namespace. It may not exist yet.
    pub fn namespace_dir(&self) -> &Path {
        self.shared.paths.namespace_dir()
    }

    // == Is Closed ==
    /// Checks whether shutdown has started. Operations then fail with
    /// [`CacheError::Closed`].
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    // == Shutdown ==
    /// Stops the vacuum task, waits for it to exit, then drops the
    /// in-memory index. Files stay on disk for a later cache on the same
    /// namespace.
    ///
    /// Operations in flight finish first. Calling it more than once is a
    /// no-op, and a concurrent call returns once the first one is done.
    pub async fn shutdown(&self) {
        let _closing = self.lifecycle.write().await;
        self.close_locked().await;
    }

    async fn close_locked(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            debug!(namespace = %self.namespace(), "File cache already closed");
            return;
        }

        let vacuum = self
            .vacuum
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(vacuum) = vacuum {
            vacuum.stop().await;
        }

        let dropped = {
            let mut items = self.shared.items.write().await;
            let count = items.len();
            items.clear();
            count
        };

        info!(namespace = %self.namespace(), dropped, "File cache shut down");
    }

    // == Close ==
    /// Alias for [`shutdown`](Self::shutdown).
    pub async fn close(&self) -> Result<()> {
        self.shutdown().await;
        Ok(())
    }

    // == Destroy ==
    /// Shuts the cache down and removes the namespace directory from disk.
    pub async fn destroy(&self) -> Result<()> {
        let _closing = self.lifecycle.write().await;
        self.close_locked().await;

        let dir = self.namespace_dir();
        match fs::remove_dir_all(dir).await {
            Ok(()) => {
                info!(namespace = %self.namespace(), "File cache destroyed");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Holds shutdown off until the returned guard is dropped.
    async fn enter(&self) -> Result<RwLockReadGuard<'_, ()>> {
        let guard = self.lifecycle.read().await;
        if self.is_closed() {
            return Err(CacheError::Closed);
        }
        Ok(guard)
    }
}
