//! WSDL type registry
//!
//! The remote schema document describes every record and filter type the
//! SOAP API speaks. This module fetches it once, parses the named complex
//! types into flat descriptors, and resolves type names on demand.
//!
//! The registry is read-only after load; an optional disk cache keyed by URL
//! keeps the (large) document across runs with a 30-day freshness window.

mod cache;
mod registry;
mod types;

pub use cache::WsdlCache;
pub use registry::TypeRegistry;
pub use types::{FieldDescriptor, TypeDescriptor, WireType};

#[cfg(test)]
mod tests;
