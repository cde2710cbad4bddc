//! Replication state
//!
//! Bookmarks record the high-water mark of each incremental stream's
//! replication key. The manager keeps them behind an async lock and can
//! persist them to a JSON file between runs; bookmarks only ever move
//! forward.

mod manager;
mod types;

pub use manager::StateManager;
pub use types::ReplicationState;

#[cfg(test)]
mod manager_tests;
