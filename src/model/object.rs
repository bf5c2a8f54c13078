use super::{DatatypeKind, Identifier};

/// A typed attribute payload.
///
/// Exactly one slot is populated per value; a source value with no usable
/// payload is dropped by the object mapper rather than emitted empty.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Plain string.
    Str(String),
    /// Signed integer.
    Int(i64),
    /// Floating point number.
    Real(f64),
    /// Boolean.
    Bool(bool),
    /// Date, kept as the source's string representation.
    Date(String),
    /// References into an enumeration datatype's literals.
    EnumRefs(Vec<Identifier>),
    /// A namespace-prefixed XHTML fragment, ready for embedding.
    RichText(String),
}

impl Value {
    /// The datatype kind this payload slot corresponds to.
    #[must_use]
    pub const fn kind(&self) -> DatatypeKind {
        match self {
            Self::Str(_) => DatatypeKind::String,
            Self::Int(_) => DatatypeKind::Integer,
            Self::Real(_) => DatatypeKind::Real,
            Self::Bool(_) => DatatypeKind::Boolean,
            Self::Date(_) => DatatypeKind::Date,
            Self::EnumRefs(_) => DatatypeKind::Enumeration,
            Self::RichText(_) => DatatypeKind::RichText,
        }
    }
}

/// One attribute value attached to a [`SpecObject`].
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeValue {
    /// The attribute definition this value instantiates.
    pub definition: Identifier,
    /// The payload.
    pub value: Value,
}

/// One exported document node with its fully-typed attribute values.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecObject {
    /// Identifier of the object.
    pub identifier: Identifier,
    /// Display name; the node's resolved title.
    pub long_name: String,
    /// The object's type.
    pub object_type: Identifier,
    /// Attribute values: the built-in triple first, then converted source
    /// values in source order.
    pub values: Vec<AttributeValue>,
}
