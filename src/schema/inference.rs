//! Schema inference from WSDL type descriptors
//!
//! Walks a record type's field list recursively, mapping wire primitives
//! through a fixed table and unwrapping nested complex types into objects
//! and arrays. The remote schema is a document schema, not an object graph,
//! so the recursion terminates.

use super::types::{JsonType, SchemaProperty, StreamSchema};
use crate::constants::{CUSTOM_FIELD_LIST_TYPE, NULL_FIELD_LIST, REPLICATION_KEYS};
use crate::error::Result;
use crate::wsdl::{FieldDescriptor, TypeRegistry, WireType};
use std::collections::BTreeMap;
use tracing::{error, warn};

/// Guard against pathological documents; the vendor schema nests far
/// shallower than this.
const MAX_DEPTH: usize = 16;

/// Result of inferring one stream's schema
#[derive(Debug, Clone)]
pub struct InferredSchema {
    /// Declared property tree
    pub schema: StreamSchema,
    /// Top-level field identified as the replication key, if any
    pub replication_key: Option<String>,
}

/// Schema inferrer over a loaded type registry
#[derive(Debug)]
pub struct SchemaInferrer<'a> {
    registry: &'a TypeRegistry,
}

impl<'a> SchemaInferrer<'a> {
    /// Create an inferrer backed by the given registry
    pub fn new(registry: &'a TypeRegistry) -> Self {
        Self { registry }
    }

    /// Infer the property tree for a record type.
    ///
    /// An unresolvable root type is fatal for the stream; unknown primitives
    /// and unresolvable nested types are logged and dropped, favoring a
    /// partial schema over a hard failure.
    pub fn infer(&self, type_name: &str) -> Result<InferredSchema> {
        let descriptor = self.registry.resolve(type_name)?;

        let mut schema = StreamSchema::new();

        for field in &descriptor.fields {
            if field.name == NULL_FIELD_LIST {
                // Metadata about explicitly-null fields, not data
                continue;
            }
            if is_custom_field_list(field) {
                // The wrapper element is replaced by the polymorphic list
                schema.add_property("customField", custom_field_property());
                continue;
            }
            if let Some(property) = self.infer_field(field, 0) {
                schema.add_property(&field.name, property);
            }
        }

        let replication_key = descriptor
            .fields
            .iter()
            .find(|f| REPLICATION_KEYS.contains(&f.name.to_lowercase().as_str()))
            .map(|f| f.name.clone());

        Ok(InferredSchema {
            schema,
            replication_key,
        })
    }

    /// Infer one field's property, or None when the field is dropped
    fn infer_field(&self, field: &FieldDescriptor, depth: usize) -> Option<SchemaProperty> {
        if depth >= MAX_DEPTH {
            warn!(field = %field.name, "nested type exceeds depth limit, dropping field");
            return None;
        }

        let property = match &field.wire_type {
            WireType::String => SchemaProperty::nullable(JsonType::String),
            WireType::Boolean => SchemaProperty::nullable(JsonType::Boolean),
            WireType::Integer => SchemaProperty::nullable(JsonType::Integer),
            WireType::Number => SchemaProperty::nullable(JsonType::Number),
            WireType::DateTime => {
                SchemaProperty::nullable(JsonType::String).with_format("date-time")
            }
            WireType::Complex(nested) => {
                let object = self.infer_object(nested, depth + 1)?;
                if field.accepts_multiple {
                    SchemaProperty::array(object)
                } else {
                    object
                }
            }
            WireType::Unsupported(name) => {
                error!(field = %field.name, wire_type = %name, "unsupported type");
                return None;
            }
        };

        Some(property)
    }

    /// Recurse into a nested complex type
    fn infer_object(&self, type_name: &str, depth: usize) -> Option<SchemaProperty> {
        let descriptor = match self.registry.resolve(type_name) {
            Ok(d) => d,
            Err(e) => {
                warn!(%type_name, "dropping field with unresolvable nested type: {e}");
                return None;
            }
        };

        let mut properties = BTreeMap::new();
        for field in &descriptor.fields {
            if field.name == NULL_FIELD_LIST {
                continue;
            }
            if is_custom_field_list(field) {
                properties.insert("customField".to_string(), custom_field_property());
                continue;
            }
            if let Some(property) = self.infer_field(field, depth + 1) {
                properties.insert(field.name.clone(), property);
            }
        }

        Some(SchemaProperty::object(properties))
    }
}

fn is_custom_field_list(field: &FieldDescriptor) -> bool {
    matches!(&field.wire_type, WireType::Complex(name) if name == CUSTOM_FIELD_LIST_TYPE)
}

/// Schema for the polymorphic `customField` list.
///
/// The API represents a custom field's value according to the field's own
/// definition, which cannot be resolved statically: it is either a list of
/// record references, a single reference, or a bare scalar. Keyed off the
/// exact `CustomFieldList` type name only; other nested types are not known
/// to behave this way.
fn custom_field_property() -> SchemaProperty {
    let reference = SchemaProperty::object(
        [
            ("internalId", SchemaProperty::nullable(JsonType::String)),
            ("externalId", SchemaProperty::nullable(JsonType::String)),
            ("name", SchemaProperty::nullable(JsonType::String)),
            ("typeId", SchemaProperty::nullable(JsonType::String)),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect(),
    );

    let value = SchemaProperty::any_of(vec![
        SchemaProperty::array(reference.clone()),
        reference,
        SchemaProperty::of_types(vec![
            JsonType::String,
            JsonType::Boolean,
            JsonType::Integer,
            JsonType::Number,
            JsonType::Null,
        ]),
    ]);

    let entry = SchemaProperty::object(
        [
            ("internalId", SchemaProperty::nullable(JsonType::String)),
            ("scriptId", SchemaProperty::nullable(JsonType::String)),
            ("value", value),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect(),
    );

    SchemaProperty::array(entry)
}
