use super::Identifier;

/// A directed, typed edge between two exported objects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecRelation {
    /// Identifier of the relation.
    pub identifier: Identifier,
    /// The relation's type.
    pub relation_type: Identifier,
    /// The source object.
    pub source: Identifier,
    /// The target object.
    pub target: Identifier,
}
