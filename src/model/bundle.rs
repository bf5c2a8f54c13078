use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
};

use chrono::{DateTime, FixedOffset};
use nonempty::NonEmpty;

use super::{
    Datatype, Identifier, SpecObject, SpecObjectType, SpecRelation, SpecRelationType,
    Specification, SpecificationType,
};

/// Export metadata placed in the target document's header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// Identifier of the header element.
    pub identifier: Identifier,
    /// Creation time of this export. One timestamp is taken per run and
    /// reused as the last-change stamp of every emitted element.
    pub creation_time: DateTime<FixedOffset>,
    /// Identifier of the exporting repository.
    pub repository_id: String,
    /// Identifier of the exporting tool.
    pub req_if_tool_id: String,
    /// Version of the interchange format.
    pub req_if_version: String,
    /// Identifier of the tool that produced the source data.
    pub source_tool_id: String,
    /// Document title.
    pub title: String,
}

/// The root aggregate handed to the serializer.
///
/// Assembled once per invocation and immutable afterwards; the caller owns
/// it exclusively and discards it after serialization.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportBundle {
    /// Header metadata.
    pub header: Header,
    /// All datatype definitions.
    pub datatypes: Vec<Datatype>,
    /// The type of the specification element.
    pub specification_type: SpecificationType,
    /// Object types with their attribute schemas.
    pub spec_object_types: Vec<SpecObjectType>,
    /// Declared relation types.
    pub relation_types: Vec<SpecRelationType>,
    /// Exported objects in document order.
    pub spec_objects: Vec<SpecObject>,
    /// Surviving relations in source order.
    pub relations: Vec<SpecRelation>,
    /// The specification tree.
    pub specification: Specification,
}

impl ExportBundle {
    /// Checks the bundle's internal references before it is serialized.
    ///
    /// Verifies that every object's type is declared, every attribute
    /// definition's datatype is declared, and the hierarchy tree contains
    /// exactly the flat object set (no duplicates, no omissions, no
    /// orphans).
    ///
    /// # Errors
    ///
    /// Returns [`SchemaIntegrityError`] listing every violation found. The
    /// target format would reject such a document, so a violating bundle
    /// is never handed to the serializer.
    pub fn validate(&self) -> Result<(), SchemaIntegrityError> {
        let mut violations = Vec::new();

        let declared_types: BTreeSet<&str> = self
            .spec_object_types
            .iter()
            .map(|t| t.identifier.as_str())
            .collect();
        for object in &self.spec_objects {
            if !declared_types.contains(object.object_type.as_str()) {
                violations.push(IntegrityViolation::UndeclaredObjectType {
                    object: object.identifier.clone(),
                    object_type: object.object_type.clone(),
                });
            }
        }

        let declared_datatypes: BTreeSet<&str> = self
            .datatypes
            .iter()
            .map(|d| d.identifier.as_str())
            .collect();
        for object_type in &self.spec_object_types {
            for definition in &object_type.attributes {
                if !declared_datatypes.contains(definition.datatype.as_str()) {
                    violations.push(IntegrityViolation::UndeclaredDatatype {
                        definition: definition.identifier.clone(),
                        datatype: definition.datatype.clone(),
                    });
                }
            }
        }

        let mut tree_counts: BTreeMap<&Identifier, usize> = BTreeMap::new();
        collect_tree_objects(&self.specification.children, &mut tree_counts);
        let flat: BTreeSet<&Identifier> =
            self.spec_objects.iter().map(|o| &o.identifier).collect();

        for (object, count) in &tree_counts {
            if *count > 1 {
                violations.push(IntegrityViolation::HierarchyDuplicate {
                    object: (*object).clone(),
                });
            }
            if !flat.contains(*object) {
                violations.push(IntegrityViolation::HierarchyOrphan {
                    object: (*object).clone(),
                });
            }
        }
        for object in flat {
            if !tree_counts.contains_key(object) {
                violations.push(IntegrityViolation::HierarchyOmission {
                    object: object.clone(),
                });
            }
        }

        NonEmpty::from_vec(violations)
            .map_or(Ok(()), |violations| Err(SchemaIntegrityError { violations }))
    }
}

fn collect_tree_objects<'a>(
    nodes: &'a [super::SpecHierarchy],
    counts: &mut BTreeMap<&'a Identifier, usize>,
) {
    for node in nodes {
        *counts.entry(&node.object).or_insert(0) += 1;
        collect_tree_objects(&node.children, counts);
    }
}

/// A single broken internal reference found by [`ExportBundle::validate`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntegrityViolation {
    /// An object references a type that is not in the type list.
    #[error("object {object} references undeclared type {object_type}")]
    UndeclaredObjectType {
        /// The referencing object.
        object: Identifier,
        /// The unresolved type reference.
        object_type: Identifier,
    },

    /// An attribute definition references a datatype that is not in the
    /// datatype list.
    #[error("attribute definition {definition} references undeclared datatype {datatype}")]
    UndeclaredDatatype {
        /// The referencing definition.
        definition: Identifier,
        /// The unresolved datatype reference.
        datatype: Identifier,
    },

    /// The hierarchy tree references the same object more than once.
    #[error("object {object} appears more than once in the hierarchy")]
    HierarchyDuplicate {
        /// The duplicated object.
        object: Identifier,
    },

    /// The hierarchy tree references an object missing from the flat list.
    #[error("hierarchy references object {object} which is not exported")]
    HierarchyOrphan {
        /// The unresolved object reference.
        object: Identifier,
    },

    /// An exported object is missing from the hierarchy tree.
    #[error("object {object} is missing from the hierarchy")]
    HierarchyOmission {
        /// The omitted object.
        object: Identifier,
    },
}

/// Fatal error: the assembled bundle contains broken internal references.
#[derive(Debug, thiserror::Error)]
pub struct SchemaIntegrityError {
    violations: NonEmpty<IntegrityViolation>,
}

impl SchemaIntegrityError {
    /// The violations found, in detection order.
    #[must_use]
    pub const fn violations(&self) -> &NonEmpty<IntegrityViolation> {
        &self.violations
    }
}

impl fmt::Display for SchemaIntegrityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const MAX_DISPLAY: usize = 5;

        write!(f, "export bundle failed integrity checks: ")?;

        let total = self.violations.len();

        let displayed: Vec<String> = self
            .violations
            .iter()
            .take(MAX_DISPLAY)
            .map(ToString::to_string)
            .collect();

        let msg = displayed.join("; ");

        if total <= MAX_DISPLAY {
            write!(f, "{msg}")
        } else {
            write!(f, "{msg}... (and {} more)", total - MAX_DISPLAY)
        }
    }
}
