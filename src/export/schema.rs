//! Attribute schema mapping.
//!
//! Builds the per-type attribute definition lists: every object type
//! carries the three built-in definitions followed by the source
//! declarations owned by that type, lexicographic by name. Identifiers are
//! assigned here exactly once; later stages look them up instead of
//! re-assigning, so the run-unique policy stays consistent.

use std::collections::HashMap;

use crate::{
    export::{
        datatypes::DatatypeTable,
        ids::{AssignId, IdSpace},
    },
    model::{AttributeDefinition, DatatypeKind, Identifier, InvalidIdentifierError, SpecObjectType},
    store::rows::{AttributeTypeRow, ObjectTypeRow},
};

/// Name of the built-in external-id attribute.
pub const BUILTIN_FOREIGN_ID: &str = "ReqIF.ForeignID";
/// Name of the built-in display-name attribute.
pub const BUILTIN_NAME: &str = "ReqIF.Name";
/// Name of the built-in rich-text body attribute.
pub const BUILTIN_TEXT: &str = "ReqIF.Text";

/// Whether `name` is reserved for a built-in attribute.
///
/// Reserved names are never redeclared from source data: declarations and
/// value rows carrying them are skipped.
#[must_use]
pub fn is_builtin_attribute(name: &str) -> bool {
    matches!(name, BUILTIN_FOREIGN_ID | BUILTIN_NAME | BUILTIN_TEXT)
}

/// Target ids of one type's built-in attribute definitions.
#[derive(Debug, Clone)]
pub struct BuiltinIds {
    /// The external-id definition.
    pub foreign_id: Identifier,
    /// The display-name definition.
    pub name: Identifier,
    /// The rich-text body definition.
    pub text: Identifier,
}

/// Lookup entry for one declared object type.
#[derive(Debug, Clone)]
pub struct TypeIds {
    /// The type's target identifier.
    pub identifier: Identifier,
    /// The type's built-in definition ids.
    pub builtins: BuiltinIds,
}

/// The mapped object types plus the lookups later stages need.
#[derive(Debug)]
pub struct SchemaTable {
    spec_object_types: Vec<SpecObjectType>,
    type_ids: HashMap<String, TypeIds>,
    definition_ids: HashMap<String, HashMap<String, Identifier>>,
}

impl SchemaTable {
    /// Looks up a declared object type by its source id.
    #[must_use]
    pub fn object_type(&self, source_ref: &str) -> Option<&TypeIds> {
        self.type_ids.get(source_ref)
    }

    /// Looks up a declared user attribute by owner type and name.
    #[must_use]
    pub fn definition(&self, owner_source: &str, name: &str) -> Option<&Identifier> {
        self.definition_ids.get(owner_source)?.get(name)
    }

    /// The mapped types in emission order.
    #[must_use]
    pub fn spec_object_types(&self) -> &[SpecObjectType] {
        &self.spec_object_types
    }

    /// Consumes the table, keeping only the mapped types.
    #[must_use]
    pub fn into_spec_object_types(self) -> Vec<SpecObjectType> {
        self.spec_object_types
    }
}

/// Maps the declared object types, ordered by source id, each carrying the
/// built-in triple plus its own declarations.
///
/// Declarations for owner types the source never declares are kept in the
/// lookup maps but emitted under no type, matching the tolerance for
/// schema drift elsewhere.
///
/// # Errors
///
/// Returns [`InvalidIdentifierError`] if the identifier policy produces an
/// ill-formed identifier.
pub fn map_schema(
    object_types: &[ObjectTypeRow],
    attribute_types: &[AttributeTypeRow],
    datatypes: &DatatypeTable,
    ids: &dyn AssignId,
) -> Result<SchemaTable, InvalidIdentifierError> {
    let mut declarations: Vec<&AttributeTypeRow> = attribute_types
        .iter()
        .filter(|row| !is_builtin_attribute(&row.name))
        .collect();
    declarations.sort_by(|a, b| {
        (&a.owner_type_ref, &a.name).cmp(&(&b.owner_type_ref, &b.name))
    });

    let mut definition_ids: HashMap<String, HashMap<String, Identifier>> = HashMap::new();
    let mut user_defs: HashMap<&str, Vec<AttributeDefinition>> = HashMap::new();
    for row in declarations {
        let owner_defs = definition_ids.entry(row.owner_type_ref.clone()).or_default();
        if owner_defs.contains_key(&row.name) {
            continue;
        }

        let datatype = datatypes.resolve(&row.datatype_ref);
        let identifier = ids.assign(
            IdSpace::AttributeDefinition,
            &format!("{}:{}", row.owner_type_ref, row.name),
        )?;
        owner_defs.insert(row.name.clone(), identifier.clone());
        user_defs
            .entry(row.owner_type_ref.as_str())
            .or_default()
            .push(AttributeDefinition {
                identifier,
                long_name: row.name.clone(),
                kind: datatype.kind,
                datatype: datatype.identifier.clone(),
            });
    }

    let mut sorted_types: Vec<&ObjectTypeRow> = object_types.iter().collect();
    sorted_types.sort_by(|a, b| a.id.cmp(&b.id));

    let mut spec_object_types = Vec::with_capacity(sorted_types.len());
    let mut type_ids = HashMap::new();
    for row in sorted_types {
        let identifier = ids.assign(IdSpace::SpecObjectType, &row.id)?;
        let builtins = BuiltinIds {
            foreign_id: ids.assign(
                IdSpace::AttributeDefinition,
                &format!("{}:{BUILTIN_FOREIGN_ID}", row.id),
            )?,
            name: ids.assign(
                IdSpace::AttributeDefinition,
                &format!("{}:{BUILTIN_NAME}", row.id),
            )?,
            text: ids.assign(
                IdSpace::AttributeDefinition,
                &format!("{}:{BUILTIN_TEXT}", row.id),
            )?,
        };

        let mut attributes = vec![
            AttributeDefinition {
                identifier: builtins.foreign_id.clone(),
                long_name: BUILTIN_FOREIGN_ID.to_string(),
                kind: DatatypeKind::String,
                datatype: datatypes.string().identifier.clone(),
            },
            AttributeDefinition {
                identifier: builtins.name.clone(),
                long_name: BUILTIN_NAME.to_string(),
                kind: DatatypeKind::String,
                datatype: datatypes.string().identifier.clone(),
            },
            AttributeDefinition {
                identifier: builtins.text.clone(),
                long_name: BUILTIN_TEXT.to_string(),
                kind: DatatypeKind::RichText,
                datatype: datatypes.rich_text().identifier.clone(),
            },
        ];
        attributes.extend(user_defs.remove(row.id.as_str()).unwrap_or_default());

        spec_object_types.push(SpecObjectType {
            identifier: identifier.clone(),
            long_name: row
                .long_name
                .clone()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| row.id.clone()),
            description: row.description.clone(),
            attributes,
        });
        type_ids.insert(row.id.clone(), TypeIds {
            identifier,
            builtins,
        });
    }

    Ok(SchemaTable {
        spec_object_types,
        type_ids,
        definition_ids,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{export::datatypes::map_datatypes, export::ids::StableIds, store::rows::DatatypeRow};

    fn object_type(id: &str) -> ObjectTypeRow {
        ObjectTypeRow {
            id: id.to_string(),
            long_name: None,
            description: None,
        }
    }

    fn declaration(owner: &str, name: &str, datatype: &str) -> AttributeTypeRow {
        AttributeTypeRow {
            owner_type_ref: owner.to_string(),
            name: name.to_string(),
            datatype_ref: datatype.to_string(),
        }
    }

    fn datatype_table() -> DatatypeTable {
        let rows = [
            DatatypeRow {
                id: "num".to_string(),
                primitive: "INTEGER".to_string(),
            },
        ];
        map_datatypes(&rows, &[], &StableIds).expect("mapping succeeds")
    }

    #[test]
    fn type_without_declarations_gets_builtins_alone() {
        let datatypes = datatype_table();
        let schema = map_schema(&[object_type("REQUIREMENT")], &[], &datatypes, &StableIds)
            .expect("mapping succeeds");

        let names: Vec<&str> = schema.spec_object_types()[0]
            .attributes
            .iter()
            .map(|a| a.long_name.as_str())
            .collect();
        assert_eq!(names, [BUILTIN_FOREIGN_ID, BUILTIN_NAME, BUILTIN_TEXT]);
    }

    #[test]
    fn user_declarations_follow_builtins_lexicographically() {
        let datatypes = datatype_table();
        let declarations = [
            declaration("REQUIREMENT", "verification", "num"),
            declaration("REQUIREMENT", "allocation", "num"),
        ];
        let schema = map_schema(
            &[object_type("REQUIREMENT")],
            &declarations,
            &datatypes,
            &StableIds,
        )
        .expect("mapping succeeds");

        let names: Vec<&str> = schema.spec_object_types()[0]
            .attributes
            .iter()
            .map(|a| a.long_name.as_str())
            .collect();
        assert_eq!(
            names,
            [
                BUILTIN_FOREIGN_ID,
                BUILTIN_NAME,
                BUILTIN_TEXT,
                "allocation",
                "verification"
            ]
        );
    }

    #[test]
    fn reserved_names_are_never_redeclared() {
        let datatypes = datatype_table();
        let declarations = [declaration("REQUIREMENT", BUILTIN_NAME, "num")];
        let schema = map_schema(
            &[object_type("REQUIREMENT")],
            &declarations,
            &datatypes,
            &StableIds,
        )
        .expect("mapping succeeds");

        assert_eq!(schema.spec_object_types()[0].attributes.len(), 3);
        assert!(schema.definition("REQUIREMENT", BUILTIN_NAME).is_none());
    }

    #[test]
    fn unknown_datatype_reference_resolves_to_string() {
        let datatypes = datatype_table();
        let declarations = [declaration("REQUIREMENT", "note", "no-such-datatype")];
        let schema = map_schema(
            &[object_type("REQUIREMENT")],
            &declarations,
            &datatypes,
            &StableIds,
        )
        .expect("mapping succeeds");

        let note = &schema.spec_object_types()[0].attributes[3];
        assert_eq!(note.kind, DatatypeKind::String);
        assert_eq!(note.datatype, datatypes.string().identifier);
    }

    #[test]
    fn types_are_emitted_sorted_by_source_id() {
        let datatypes = datatype_table();
        let schema = map_schema(
            &[object_type("SECTION"), object_type("REQUIREMENT")],
            &[],
            &datatypes,
            &StableIds,
        )
        .expect("mapping succeeds");

        let names: Vec<&str> = schema
            .spec_object_types()
            .iter()
            .map(|t| t.long_name.as_str())
            .collect();
        assert_eq!(names, ["REQUIREMENT", "SECTION"]);
    }

    #[test]
    fn builtin_definitions_are_distinct_per_type() {
        let datatypes = datatype_table();
        let schema = map_schema(
            &[object_type("SECTION"), object_type("REQUIREMENT")],
            &[],
            &datatypes,
            &StableIds,
        )
        .expect("mapping succeeds");

        let requirement = schema.object_type("REQUIREMENT").expect("declared");
        let section = schema.object_type("SECTION").expect("declared");
        assert_ne!(requirement.builtins.text, section.builtins.text);
    }

    #[test]
    fn lookups_cover_declared_pairs_only() {
        let datatypes = datatype_table();
        let declarations = [declaration("REQUIREMENT", "allocation", "num")];
        let schema = map_schema(
            &[object_type("REQUIREMENT")],
            &declarations,
            &datatypes,
            &StableIds,
        )
        .expect("mapping succeeds");

        assert!(schema.definition("REQUIREMENT", "allocation").is_some());
        assert!(schema.definition("REQUIREMENT", "other").is_none());
        assert!(schema.definition("SECTION", "allocation").is_none());
        assert!(schema.object_type("GHOST").is_none());
    }

    #[test]
    fn declarations_for_undeclared_owners_are_not_emitted() {
        let datatypes = datatype_table();
        let declarations = [declaration("GHOST", "allocation", "num")];
        let schema = map_schema(
            &[object_type("REQUIREMENT")],
            &declarations,
            &datatypes,
            &StableIds,
        )
        .expect("mapping succeeds");

        assert_eq!(schema.spec_object_types().len(), 1);
        assert_eq!(schema.spec_object_types()[0].attributes.len(), 3);
        // Still resolvable for value conversion.
        assert!(schema.definition("GHOST", "allocation").is_some());
    }
}
