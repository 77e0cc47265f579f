//! Path Resolver Module
//!
//! Maps a namespace and key to a location on disk.

use std::path::{Component, Path, PathBuf};

use crate::error::{CacheError, Result};

/// Directory under the base dir that holds every namespace.
pub const NAMESPACES_DIR: &str = "fc-namespaces";

// == Path Resolver ==
/// Resolves keys to files under `<base>/fc-namespaces/<namespace>/`.
///
/// Keys are relative paths and may contain `/` to create subdirectories.
/// Anything that could leave the namespace directory is rejected.
#[derive(Debug, Clone)]
pub struct PathResolver {
    namespace: String,
    root: PathBuf,
}

impl PathResolver {
    // == Constructor ==
    /// Creates a resolver for `namespace` under `base_dir`.
    pub fn new(base_dir: impl AsRef<Path>, namespace: impl Into<String>) -> Result<Self> {
        let namespace = namespace.into();
        if !is_single_component(&namespace) {
            return Err(CacheError::InvalidNamespace(namespace));
        }

        let root = base_dir.as_ref().join(NAMESPACES_DIR).join(&namespace);
        Ok(Self { namespace, root })
    }

    /// The namespace name.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    // == Namespace Dir ==
    /// Root directory of the namespace.
    pub fn namespace_dir(&self) -> &Path {
        &self.root
    }

    // == Resolve ==
    /// Returns the backing file path for `key`.
    pub fn resolve(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join(key))
    }
}

fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() || key.ends_with('/') || key.ends_with('\\') {
        return Err(CacheError::InvalidKey(key.to_string()));
    }

    // Path::components drops interior "." segments, so check the raw text too
    let has_dot_segment = key.split(['/', '\\']).any(|s| s == "." || s == "..");
    let all_normal = Path::new(key)
        .components()
        .all(|c| matches!(c, Component::Normal(_)));

    if has_dot_segment || !all_normal {
        return Err(CacheError::InvalidKey(key.to_string()));
    }

    Ok(())
}

fn is_single_component(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(c)), None) if c == name
    )
}
