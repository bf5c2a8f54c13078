use super::Identifier;

/// One node of the specification tree.
///
/// Children are owned by their parent node; sibling order is document
/// order. There are no parent back-references, traversal is always
/// root-to-leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecHierarchy {
    /// Identifier of the hierarchy node (distinct from the object it
    /// references).
    pub identifier: Identifier,
    /// The object displayed at this position.
    pub object: Identifier,
    /// Nested nodes, in document order.
    pub children: Vec<SpecHierarchy>,
}

/// The exported specification: metadata plus the hierarchy forest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Specification {
    /// Identifier of the specification.
    pub identifier: Identifier,
    /// Display title.
    pub long_name: String,
    /// The specification's type.
    pub specification_type: Identifier,
    /// Top-level hierarchy nodes, in document order.
    pub children: Vec<SpecHierarchy>,
}
