//! # tap-netsuite
//!
//! A SuiteTalk SOAP extraction connector: token-based auth, WSDL-driven
//! schema inference, record-type discovery, and paged record streams with
//! replication-key bookmarks.
//!
//! ## Quick start
//!
//! ```no_run
//! use tap_netsuite::{StateManager, Tap, TapConfig};
//!
//! # async fn run() -> tap_netsuite::Result<()> {
//! let config = TapConfig::from_json(&serde_json::json!({
//!     "account": "ACCT123",
//!     "consumer_key": "...",
//!     "consumer_secret": "...",
//!     "token_key": "...",
//!     "token_secret": "...",
//! }))?;
//!
//! let tap = Tap::new(config)?;
//! let state = StateManager::in_memory();
//! for stream in tap.discover().await? {
//!     let records = tap.sync_stream(&stream, &state).await?;
//!     println!("{}: {} records", stream.name(), records.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod config;
pub mod constants;
pub mod discovery;
pub mod error;
pub mod pagination;
pub mod schema;
pub mod soap;
pub mod state;
pub mod stream;
pub mod tap;
pub mod wsdl;

pub use config::TapConfig;
pub use error::{Error, Result};
pub use pagination::{FetchFamily, PageCursor, RecordTypeDescriptor};
pub use schema::{SchemaInferrer, StreamSchema};
pub use soap::SoapClient;
pub use state::{ReplicationState, StateManager};
pub use stream::RecordStream;
pub use tap::Tap;
pub use wsdl::TypeRegistry;
