//! Portable record schemas
//!
//! Streams declare their shape as a JSON-Schema-style property tree inferred
//! from the WSDL type descriptors. Inference runs once per stream at
//! construction time and the result is stored for the stream's lifetime.

mod inference;
mod types;

pub use inference::{InferredSchema, SchemaInferrer};
pub use types::{JsonType, JsonTypeOrArray, SchemaProperty, StreamSchema};
