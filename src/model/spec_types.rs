use super::{DatatypeKind, Identifier};

/// An attribute definition owned by a [`SpecObjectType`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeDefinition {
    /// Identifier of the definition.
    pub identifier: Identifier,
    /// The attribute name shown to consumers (e.g. `ReqIF.Name`).
    pub long_name: String,
    /// Kind of the values this definition types.
    pub kind: DatatypeKind,
    /// The datatype definition the attribute refers to.
    pub datatype: Identifier,
}

/// A classification of exported objects, with its attribute schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecObjectType {
    /// Identifier of the type.
    pub identifier: Identifier,
    /// Display name.
    pub long_name: String,
    /// Optional human-readable description.
    pub description: Option<String>,
    /// Attribute definitions: the built-in triple first, then the source
    /// declarations for this type in declaration order.
    pub attributes: Vec<AttributeDefinition>,
}

/// The type of the exported specification itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecificationType {
    /// Identifier of the type.
    pub identifier: Identifier,
    /// Display name.
    pub long_name: String,
}

/// A declared relation type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecRelationType {
    /// Identifier of the type.
    pub identifier: Identifier,
    /// Display name.
    pub long_name: String,
    /// Optional human-readable description.
    pub description: Option<String>,
}
