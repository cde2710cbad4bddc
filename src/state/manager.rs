//! State manager

use super::types::ReplicationState;
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Owns the replication state for a run.
///
/// In-memory by default; when backed by a file, `save` writes the state
/// atomically via a temp file so a crash never leaves a half-written state.
#[derive(Debug, Clone)]
pub struct StateManager {
    path: Option<PathBuf>,
    state: Arc<RwLock<ReplicationState>>,
}

impl StateManager {
    /// State that lives only for this run
    pub fn in_memory() -> Self {
        Self {
            path: None,
            state: Arc::new(RwLock::new(ReplicationState::default())),
        }
    }

    /// Load state from a JSON file; a missing file starts empty.
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let state = match tokio::fs::read_to_string(&path).await {
            Ok(body) => serde_json::from_str(&body)
                .map_err(|e| Error::state(format!("unreadable state file: {e}")))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no previous state, starting empty");
                ReplicationState::default()
            }
            Err(e) => return Err(Error::Io(e)),
        };
        Ok(Self {
            path: Some(path),
            state: Arc::new(RwLock::new(state)),
        })
    }

    /// Bookmark for one stream
    pub async fn bookmark(&self, stream: &str) -> Option<DateTime<Utc>> {
        self.state.read().await.bookmark(stream)
    }

    /// Move a stream's bookmark forward. Returns true when it changed.
    pub async fn advance(&self, stream: &str, value: DateTime<Utc>) -> bool {
        let advanced = self.state.write().await.advance(stream, value);
        if advanced {
            debug!(%stream, bookmark = %value, "advanced bookmark");
        }
        advanced
    }

    /// Current state by value
    pub async fn snapshot(&self) -> ReplicationState {
        self.state.read().await.clone()
    }

    /// Persist the state when file-backed; a no-op otherwise.
    pub async fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let body = {
            let state = self.state.read().await;
            serde_json::to_string_pretty(&*state)?
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(Error::Io)?;
            }
        }
        let temp_path = path.with_extension("tmp");
        tokio::fs::write(&temp_path, body).await.map_err(Error::Io)?;
        tokio::fs::rename(&temp_path, path)
            .await
            .map_err(Error::Io)?;
        Ok(())
    }
}
