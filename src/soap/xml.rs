//! Response document decoding
//!
//! SOAP responses come back as deeply namespaced XML. Downstream code wants
//! plain JSON records, so the whole document is folded into a
//! `serde_json::Value` tree: prefixes stripped, attributes merged in as
//! ordinary fields, repeated sibling elements collected into arrays.

use crate::error::{Error, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde_json::{Map, Value};

/// One open element while walking the document
struct Frame {
    name: String,
    children: Map<String, Value>,
    text: String,
}

impl Frame {
    fn new(name: String) -> Self {
        Self {
            name,
            children: Map::new(),
            text: String::new(),
        }
    }

    /// Collapse the frame into a value once its end tag is seen
    fn into_value(self) -> Value {
        let text = self.text.trim();
        if !self.children.is_empty() {
            let mut children = self.children;
            if !text.is_empty() {
                // Mixed content: keep the text alongside the attributes
                children.insert("value".to_string(), parse_scalar(text));
            }
            Value::Object(children)
        } else if !text.is_empty() {
            parse_scalar(text)
        } else {
            Value::Null
        }
    }
}

/// Decode an XML document into a JSON tree.
pub fn xml_to_value(document: &str) -> Result<Value> {
    let mut reader = Reader::from_str(document);
    reader.config_mut().trim_text(true);

    // Sentinel frame collects the document root
    let mut stack = vec![Frame::new(String::new())];

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let mut frame = Frame::new(element_name(&e));
                collect_attributes(&e, &mut frame.children)?;
                stack.push(frame);
            }
            Ok(Event::Empty(e)) => {
                let mut frame = Frame::new(element_name(&e));
                collect_attributes(&e, &mut frame.children)?;
                let name = frame.name.clone();
                let value = frame.into_value();
                insert_child(top(&mut stack)?, &name, value);
            }
            Ok(Event::Text(t)) => {
                let text = t
                    .unescape()
                    .map_err(|err| Error::xml(format!("bad text node: {err}")))?;
                top(&mut stack)?.text.push_str(&text);
            }
            Ok(Event::CData(t)) => {
                top(&mut stack)?
                    .text
                    .push_str(&String::from_utf8_lossy(&t.into_inner()));
            }
            Ok(Event::End(_)) => {
                let frame = stack
                    .pop()
                    .ok_or_else(|| Error::xml("unbalanced end tag"))?;
                let name = frame.name.clone();
                let value = frame.into_value();
                insert_child(top(&mut stack)?, &name, value);
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::xml(format!("response parse error: {e}"))),
            _ => {}
        }
    }

    let root = stack
        .pop()
        .ok_or_else(|| Error::xml("empty document"))?;
    Ok(Value::Object(root.children))
}

fn top<'a>(stack: &'a mut [Frame]) -> Result<&'a mut Frame> {
    stack
        .last_mut()
        .ok_or_else(|| Error::xml("unbalanced document"))
}

/// Unqualified element name
fn element_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

/// Fold an element's attributes into its child map.
///
/// Namespace declarations and `xsi:` markers are schema plumbing, not data,
/// and are skipped. Attribute values stay strings except for booleans, so
/// identifiers like `internalId="123"` keep their declared type.
fn collect_attributes(e: &BytesStart<'_>, children: &mut Map<String, Value>) -> Result<()> {
    for attr in e.attributes() {
        let attr = attr.map_err(|err| Error::xml(format!("bad attribute: {err}")))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        if key.starts_with("xmlns") || key.starts_with("xsi:") {
            continue;
        }
        let name = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|err| Error::xml(format!("bad attribute value: {err}")))?;
        let value = match value.as_ref() {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            other => Value::String(other.to_string()),
        };
        children.insert(name, value);
    }
    Ok(())
}

/// Insert a decoded child, collecting repeated siblings into an array.
fn insert_child(parent: &mut Frame, name: &str, value: Value) {
    match parent.children.get_mut(name) {
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            parent.children.insert(name.to_string(), value);
        }
    }
}

/// Element text becomes the narrowest JSON scalar that round-trips.
fn parse_scalar(text: &str) -> Value {
    match text {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }
    if let Ok(n) = text.parse::<i64>() {
        return Value::Number(n.into());
    }
    if let Ok(f) = text.parse::<f64>() {
        if let Some(n) = serde_json::Number::from_f64(f) {
            return Value::Number(n);
        }
    }
    Value::String(text.to_string())
}
