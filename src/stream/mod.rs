//! Record streams
//!
//! One stream per discovered record type. Construction resolves everything
//! the stream needs up front: the inferred schema, the replication key, and
//! the filter type's field set. Reading is lazy; pages are fetched only as
//! the consumer polls.

mod record;

pub use record::RecordStream;
