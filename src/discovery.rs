//! Stream discovery
//!
//! The record-type catalog document enumerates which types the account can
//! bulk-fetch and which it can search. Discovery turns those enumerations
//! into fetch descriptors, drops the types that are listed but not actually
//! fetchable, and appends the fixed sub-type tables that share a parent
//! type's search filter.

use crate::constants::{ITEM_SEARCH_TYPES, SEARCH_ONLY_TYPES, TRANSACTION_SEARCH_TYPES};
use crate::error::{Error, Result};
use crate::pagination::RecordTypeDescriptor;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::debug;

const GET_ALL_ENUMERATION: &str = "GetAllRecordType";
const SEARCH_ENUMERATION: &str = "SearchRecordType";

/// Build the full descriptor list from the catalog document.
pub fn discover_record_types(catalog: &str) -> Result<Vec<RecordTypeDescriptor>> {
    let mut descriptors = Vec::new();

    for soap_name in parse_enumeration(catalog, GET_ALL_ENUMERATION)? {
        let name = capitalize(&soap_name);
        if SEARCH_ONLY_TYPES.contains(&name.as_str()) {
            continue;
        }
        descriptors.push(RecordTypeDescriptor::bulk(name, soap_name));
    }

    for soap_name in parse_enumeration(catalog, SEARCH_ENUMERATION)? {
        let name = capitalize(&soap_name);
        if SEARCH_ONLY_TYPES.contains(&name.as_str()) {
            continue;
        }
        descriptors.push(RecordTypeDescriptor::search(name, soap_name));
    }

    // Sub-types reachable only through a parent type's shared filter
    for name in TRANSACTION_SEARCH_TYPES {
        descriptors.push(RecordTypeDescriptor::shared_search(
            *name,
            soap_case(name),
            "TransactionSearchBasic",
        ));
    }
    for name in ITEM_SEARCH_TYPES {
        descriptors.push(RecordTypeDescriptor::shared_search(
            *name,
            soap_case(name),
            "ItemSearchBasic",
        ));
    }

    debug!(count = descriptors.len(), "discovered record types");
    Ok(descriptors)
}

/// Collect the enumeration values of one named simple type.
///
/// An absent or empty enumeration means the catalog document is not what the
/// connector expects, which aborts discovery.
pub fn parse_enumeration(document: &str, type_name: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(document);
    reader.config_mut().trim_text(true);

    let mut values = Vec::new();
    let mut in_target = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => match local_name(&e).as_str() {
                "simpleType" => {
                    in_target = attribute(&e, "name")?.as_deref() == Some(type_name);
                }
                "enumeration" if in_target => {
                    if let Some(value) = attribute(&e, "value")? {
                        values.push(value);
                    }
                }
                _ => {}
            },
            Ok(Event::End(e)) => {
                if e.local_name().as_ref() == b"simpleType" {
                    in_target = false;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::xml(format!("catalog parse error: {e}"))),
            _ => {}
        }
    }

    if values.is_empty() {
        return Err(Error::xml(format!(
            "enumeration {type_name} not found in catalog"
        )));
    }
    Ok(values)
}

/// Stream names capitalize the enumeration's first letter
fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// The wire wants the first letter back in lowercase
fn soap_case(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

fn local_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

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
