use super::Identifier;

/// The primitive kind of a datatype definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatatypeKind {
    /// Plain string.
    String,
    /// Signed integer.
    Integer,
    /// Floating point number.
    Real,
    /// Boolean.
    Boolean,
    /// Calendar date, carried as a string.
    Date,
    /// Closed set of named literals.
    Enumeration,
    /// Rich text (XHTML fragment).
    RichText,
}

impl DatatypeKind {
    /// Maps a source-declared primitive name onto a kind.
    ///
    /// The source vocabulary is `STRING`, `INTEGER`, `REAL`, `BOOLEAN`,
    /// `DATE`, `XHTML` and `ENUM`. Anything else maps to [`Self::String`];
    /// an unrecognized primitive is lossy, never fatal.
    #[must_use]
    pub fn from_primitive(name: &str) -> Self {
        match name {
            "INTEGER" => Self::Integer,
            "REAL" => Self::Real,
            "BOOLEAN" => Self::Boolean,
            "DATE" => Self::Date,
            "XHTML" => Self::RichText,
            "ENUM" => Self::Enumeration,
            _ => Self::String,
        }
    }
}

/// One literal of an enumeration datatype.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumLiteral {
    /// Identifier of the literal in the target document.
    pub identifier: Identifier,
    /// The literal's key, as declared in the source.
    pub key: String,
}

/// A datatype definition in the target document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Datatype {
    /// Identifier of the definition.
    pub identifier: Identifier,
    /// Display name; the source datatype id.
    pub long_name: String,
    /// Primitive kind.
    pub kind: DatatypeKind,
    /// Literals in declared order. Empty unless `kind` is
    /// [`DatatypeKind::Enumeration`].
    pub literals: Vec<EnumLiteral>,
}
