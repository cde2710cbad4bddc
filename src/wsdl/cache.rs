//! On-disk cache for the WSDL document
//!
//! The schema document is large and changes rarely. When caching is enabled,
//! the raw body is kept in a local file keyed by a hash of its URL and
//! considered fresh for 30 days.

use crate::constants::WSDL_CACHE_TTL_SECS;
use crate::error::{Error, Result};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing::debug;

/// File-backed cache keyed by URL.
#[derive(Debug, Clone)]
pub struct WsdlCache {
    dir: PathBuf,
    ttl: Duration,
}

impl WsdlCache {
    /// Create a cache rooted at the given directory
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            ttl: Duration::from_secs(WSDL_CACHE_TTL_SECS),
        }
    }

    /// Override the freshness window (tests)
    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Return the cached body for a URL if present and fresh
    pub async fn get(&self, url: &str) -> Option<String> {
        let path = self.entry_path(url);
        let metadata = tokio::fs::metadata(&path).await.ok()?;
        let modified = metadata.modified().ok()?;
        let age = SystemTime::now().duration_since(modified).ok()?;
        if age > self.ttl {
            debug!(%url, "WSDL cache entry is stale");
            return None;
        }
        tokio::fs::read_to_string(&path).await.ok()
    }

    /// Store a body for a URL, replacing any previous entry
    pub async fn put(&self, url: &str, body: &str) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(Error::Io)?;

        // Write to a temp file first, then rename for atomicity
        let path = self.entry_path(url);
        let temp_path = path.with_extension("tmp");
        tokio::fs::write(&temp_path, body).await.map_err(Error::Io)?;
        tokio::fs::rename(&temp_path, &path)
            .await
            .map_err(Error::Io)?;
        Ok(())
    }

    fn entry_path(&self, url: &str) -> PathBuf {
        let digest = Sha256::digest(url.as_bytes());
        let mut name = String::with_capacity(36);
        // 16 bytes of the digest is plenty to key a handful of accounts
        for byte in &digest[..16] {
            name.push_str(&format!("{byte:02x}"));
        }
        name.push_str(".wsdl");
        self.dir.join(name)
    }
}
