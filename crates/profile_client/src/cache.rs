//! Keyed profile cache.
//!
//! A local mirror of the last profile seen for each caller. A successful write
//! replaces the entry, a read-miss that reaches the server fills it, and
//! account deletion removes it. The cache never decides what gets written.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use entities::UserProfile;
use tokio::sync::RwLock;
use tracing::warn;

/// A keyed profile cache. Failures are logged and read as misses.
#[async_trait]
pub trait ProfileCache: Send + Sync {
    /// Returns the cached profile for a key.
    async fn get(&self, key: &str) -> Option<UserProfile>;

    /// Replaces the cached profile for a key.
    async fn put(&self, key: &str, profile: &UserProfile);

    /// Drops the cached profile for a key.
    async fn remove(&self, key: &str);
}

/// In-memory cache.
#[derive(Debug, Clone, Default)]
pub struct MemoryProfileCache {
    entries: Arc<RwLock<HashMap<String, UserProfile>>>,
}

impl MemoryProfileCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProfileCache for MemoryProfileCache {
    async fn get(&self, key: &str) -> Option<UserProfile> {
        self.entries.read().await.get(key).cloned()
    }

    async fn put(&self, key: &str, profile: &UserProfile) {
        self.entries
            .write()
            .await
            .insert(key.to_string(), profile.clone());
    }

    async fn remove(&self, key: &str) {
        self.entries.write().await.remove(key);
    }
}

/// File-backed cache: one JSON document per key.
#[derive(Debug, Clone)]
pub struct FileProfileCache {
    dir: PathBuf,
}

impl FileProfileCache {
    /// Creates a cache rooted at a directory. The directory is created on the
    /// first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the cache directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", urlencoding::encode(key)))
    }
}

#[async_trait]
impl ProfileCache for FileProfileCache {
    async fn get(&self, key: &str) -> Option<UserProfile> {
        let path = self.entry_path(key);

        let contents = match tokio::fs::read(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read cached profile");
                return None;
            }
        };

        match serde_json::from_slice(&contents) {
            Ok(profile) => Some(profile),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Ignoring unreadable cached profile");
                None
            }
        }
    }

    async fn put(&self, key: &str, profile: &UserProfile) {
        let path = self.entry_path(key);

        let contents = match serde_json::to_vec_pretty(profile) {
            Ok(contents) => contents,
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to encode profile for cache");
                return;
            }
        };

        if let Err(e) = tokio::fs::create_dir_all(&self.dir).await {
            warn!(dir = %self.dir.display(), error = %e, "Failed to create cache directory");
            return;
        }

        if let Err(e) = tokio::fs::write(&path, contents).await {
            warn!(path = %path.display(), error = %e, "Failed to write cached profile");
        }
    }

    async fn remove(&self, key: &str) {
        let path = self.entry_path(key);

        match tokio::fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove cached profile"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(id: &str) -> UserProfile {
        UserProfile::new(id).with_name("Ann").with_email("ann@x.com")
    }

    #[tokio::test]
    async fn test_memory_cache() {
        let cache = MemoryProfileCache::new();
        let stored = profile("u1");
        assert!(cache.get("u1").await.is_none());

        cache.put("u1", &stored).await;
        assert_eq!(cache.get("u1").await, Some(stored));

        cache.remove("u1").await;
        assert!(cache.get("u1").await.is_none());
    }

    #[tokio::test]
    async fn test_file_cache_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileProfileCache::new(dir.path().join("profiles"));
        let stored = profile("a b@c.com");

        assert!(cache.get("a b@c.com").await.is_none());

        cache.put("a b@c.com", &stored).await;
        assert_eq!(cache.get("a b@c.com").await, Some(stored));

        cache.remove("a b@c.com").await;
        assert!(cache.get("a b@c.com").await.is_none());

        // Removing twice is fine.
        cache.remove("a b@c.com").await;
    }

    #[tokio::test]
    async fn test_file_cache_corrupt_entry_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileProfileCache::new(dir.path());

        tokio::fs::write(cache.entry_path("u1"), b"{ not json")
            .await
            .unwrap();

        assert!(cache.get("u1").await.is_none());
    }
}
