//! Wire-format type descriptors

/// The declared element type of a field, as the schema document names it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireType {
    String,
    Boolean,
    Integer,
    Number,
    DateTime,
    /// A named complex type with its own field list
    Complex(String),
    /// A primitive outside the fixed mapping; dropped at inference time
    Unsupported(String),
}

impl WireType {
    /// Map an XSD `type` attribute value (`prefix:localName`) to a wire type.
    ///
    /// Types in the XML Schema namespace map through the fixed primitive
    /// table; anything else names a complex type defined elsewhere in the
    /// document.
    pub fn from_xsd(type_attr: &str) -> Self {
        let (prefix, local) = match type_attr.split_once(':') {
            Some((p, l)) => (Some(p), l),
            None => (None, type_attr),
        };

        let is_xsd = matches!(prefix, Some("xsd" | "xs"));
        if is_xsd {
            match local {
                "string" | "token" | "normalizedString" | "anyURI" => WireType::String,
                "boolean" => WireType::Boolean,
                "int" | "integer" | "long" | "short" => WireType::Integer,
                "decimal" | "double" | "float" => WireType::Number,
                "dateTime" | "date" => WireType::DateTime,
                other => WireType::Unsupported(other.to_string()),
            }
        } else {
            WireType::Complex(local.to_string())
        }
    }

    /// True when this type carries nested structure
    pub fn is_complex(&self) -> bool {
        matches!(self, WireType::Complex(_))
    }
}

/// One field (element or attribute) of a complex type.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    /// Field name as declared
    pub name: String,
    /// Declared element type
    pub wire_type: WireType,
    /// Whether the field accepts multiple values (`maxOccurs="unbounded"`)
    pub accepts_multiple: bool,
}

/// A named complex type from the schema document.
#[derive(Debug, Clone, Default)]
pub struct TypeDescriptor {
    /// Type name, unqualified
    pub name: String,
    /// Attributes first, then elements, in document order
    pub fields: Vec<FieldDescriptor>,
}

impl TypeDescriptor {
    /// Look up a field by exact name
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Look up a field case-insensitively, returning its declared name
    pub fn field_name_ignore_case(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(name))
            .map(|f| f.name.as_str())
    }
}
