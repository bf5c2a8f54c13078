//! The in-memory target-document model.
//!
//! These types mirror the interchange format's structure: datatype
//! definitions, typed object and relation declarations, objects carrying
//! typed attribute values, and the specification tree. A bundle of them is
//! built once per export and handed to the serializer.

/// Validated target-document identifiers.
pub mod identifier;
pub use identifier::{Identifier, InvalidIdentifierError};

mod datatype;
pub use datatype::{Datatype, DatatypeKind, EnumLiteral};

mod spec_types;
pub use spec_types::{AttributeDefinition, SpecObjectType, SpecRelationType, SpecificationType};

mod object;
pub use object::{AttributeValue, SpecObject, Value};

mod relation;
pub use relation::SpecRelation;

mod specification;
pub use specification::{SpecHierarchy, Specification};

mod bundle;
pub use bundle::{ExportBundle, Header, IntegrityViolation, SchemaIntegrityError};
