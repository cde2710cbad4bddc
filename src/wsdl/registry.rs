//! Registry of named complex types parsed from the schema document

use super::types::{FieldDescriptor, TypeDescriptor, WireType};
use crate::error::{Error, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Flat collection of named type descriptors.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: HashMap<String, TypeDescriptor>,
}

impl TypeRegistry {
    /// Parse a WSDL/XSD document into a registry.
    ///
    /// Only named `complexType` definitions matter here; each contributes a
    /// descriptor with its attributes and sequence elements as fields.
    pub fn parse(document: &str) -> Result<Self> {
        let mut reader = Reader::from_str(document);
        reader.config_mut().trim_text(true);

        let mut types = HashMap::new();
        let mut current: Option<TypeDescriptor> = None;
        // Depth of anonymous nested complexTypes to skip while inside a named one
        let mut anonymous_depth = 0u32;

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    handle_open(&e, &mut current, &mut anonymous_depth, &mut types)?;
                }
                Ok(Event::Empty(e)) => {
                    // Self-closing elements never change nesting
                    if local_name(&e) != "complexType" {
                        handle_open(&e, &mut current, &mut anonymous_depth, &mut types)?;
                    }
                }
                Ok(Event::End(e)) => {
                    if e.local_name().as_ref() == b"complexType" {
                        if anonymous_depth > 0 {
                            anonymous_depth -= 1;
                        } else if let Some(descriptor) = current.take() {
                            types.insert(descriptor.name.clone(), descriptor);
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(Error::xml(format!("WSDL parse error: {e}"))),
                _ => {}
            }
        }

        debug!(type_count = types.len(), "parsed WSDL type registry");
        Ok(Self { types })
    }

    /// Resolve a named type descriptor.
    ///
    /// A miss means the code and the remote schema disagree; it is surfaced
    /// as `TypeNotFound` and never retried.
    pub fn resolve(&self, type_name: &str) -> Result<&TypeDescriptor> {
        self.types
            .get(type_name)
            .ok_or_else(|| Error::type_not_found(type_name))
    }

    /// The set of field names a type exposes.
    ///
    /// Consulted by ordinary membership test when deciding whether a filter
    /// field applies to a search type.
    pub fn field_names(&self, type_name: &str) -> Result<HashSet<String>> {
        Ok(self
            .resolve(type_name)?
            .fields
            .iter()
            .map(|f| f.name.clone())
            .collect())
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// True when no types were parsed
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

fn handle_open(
    e: &BytesStart<'_>,
    current: &mut Option<TypeDescriptor>,
    anonymous_depth: &mut u32,
    _types: &mut HashMap<String, TypeDescriptor>,
) -> Result<()> {
    match local_name(e).as_str() {
        "complexType" => {
            if let Some(name) = attribute(e, "name")? {
                if current.is_some() {
                    *anonymous_depth += 1;
                } else {
                    *current = Some(TypeDescriptor {
                        name,
                        fields: Vec::new(),
                    });
                }
            } else if current.is_some() {
                *anonymous_depth += 1;
            }
        }
        "element" | "attribute" => {
            if *anonymous_depth > 0 {
                return Ok(());
            }
            if let Some(descriptor) = current.as_mut() {
                let (Some(name), Some(type_attr)) =
                    (attribute(e, "name")?, attribute(e, "type")?)
                else {
                    // Inline anonymous types and element refs carry no type
                    // attribute; they do not appear in record payloads
                    return Ok(());
                };
                let accepts_multiple = attribute(e, "maxOccurs")?
                    .map(|v| v == "unbounded")
                    .unwrap_or(false);
                descriptor.fields.push(FieldDescriptor {
                    name,
                    wire_type: WireType::from_xsd(&type_attr),
                    accepts_multiple,
                });
            }
        }
        _ => {}
    }
    Ok(())
}

/// Unqualified element name
fn local_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

/// Unqualified attribute lookup
fn attribute(e: &BytesStart<'_>, name: &str) -> Result<Option<String>> {
    for attr in e.attributes() {
        let attr = attr.map_err(|err| Error::xml(format!("bad attribute: {err}")))?;
        if attr.key.local_name().as_ref() == name.as_bytes() {
            let value = attr
                .unescape_value()
                .map_err(|err| Error::xml(format!("bad attribute value: {err}")))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}
