//! State types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Persisted replication state: one bookmark per incremental stream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicationState {
    /// Stream name to high-water mark of its replication key
    #[serde(default)]
    pub bookmarks: BTreeMap<String, DateTime<Utc>>,
}

impl ReplicationState {
    /// Bookmark for one stream
    pub fn bookmark(&self, stream: &str) -> Option<DateTime<Utc>> {
        self.bookmarks.get(stream).copied()
    }

    /// Move a stream's bookmark forward; ignored when the value is not newer.
    /// Returns true when the bookmark changed.
    pub fn advance(&mut self, stream: &str, value: DateTime<Utc>) -> bool {
        match self.bookmarks.get(stream) {
            Some(existing) if *existing >= value => false,
            _ => {
                self.bookmarks.insert(stream.to_string(), value);
                true
            }
        }
    }
}
