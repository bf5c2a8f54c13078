//! Relation mapping.
//!
//! Declared relation types are emitted sorted by source id; the first of
//! them doubles as the default for relations that carry no explicit type.
//! A relation survives only if its type resolves and both endpoints were
//! mapped to exported objects.

use std::collections::HashMap;

use crate::{
    export::ids::{AssignId, IdSpace},
    model::{Identifier, InvalidIdentifierError, SpecRelation, SpecRelationType},
    store::rows::{RelationRow, RelationTypeRow},
};

/// The mapped relation types and surviving relations.
#[derive(Debug)]
pub struct RelationTable {
    /// Relation types sorted by source id.
    pub relation_types: Vec<SpecRelationType>,
    /// Surviving relations in source-row order.
    pub relations: Vec<SpecRelation>,
}

/// Maps the declared relation types and the specification's relations.
///
/// # Errors
///
/// Returns [`InvalidIdentifierError`] if the identifier policy produces an
/// ill-formed identifier.
pub fn map_relations(
    relation_types: &[RelationTypeRow],
    relations: &[RelationRow],
    object_ids: &HashMap<String, Identifier>,
    ids: &dyn AssignId,
) -> Result<RelationTable, InvalidIdentifierError> {
    let mut sorted_types: Vec<&RelationTypeRow> = relation_types.iter().collect();
    sorted_types.sort_by(|a, b| a.id.cmp(&b.id));
    let default_type = sorted_types.first().map(|row| row.id.clone());

    let mut mapped_types = Vec::with_capacity(sorted_types.len());
    let mut type_ids: HashMap<&str, Identifier> = HashMap::new();
    for row in sorted_types {
        let identifier = ids.assign(IdSpace::RelationType, &row.id)?;
        type_ids.insert(row.id.as_str(), identifier.clone());
        mapped_types.push(SpecRelationType {
            identifier,
            long_name: row
                .long_name
                .clone()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| row.id.clone()),
            description: row.description.clone(),
        });
    }

    let mut mapped_relations = Vec::new();
    for row in relations {
        let type_ref = row
            .type_ref
            .as_deref()
            .or_else(|| default_type.as_deref());
        let Some(relation_type) = type_ref.and_then(|t| type_ids.get(t)) else {
            tracing::debug!(
                "Dropping relation {}: no resolvable relation type",
                row.id
            );
            continue;
        };
        let (Some(source), Some(target)) = (
            object_ids.get(row.source.as_str()),
            object_ids.get(row.target.as_str()),
        ) else {
            tracing::debug!(
                "Dropping relation {}: endpoint not among exported objects",
                row.id
            );
            continue;
        };

        mapped_relations.push(SpecRelation {
            identifier: ids.assign(IdSpace::Relation, &row.id)?,
            relation_type: relation_type.clone(),
            source: source.clone(),
            target: target.clone(),
        });
    }

    Ok(RelationTable {
        relation_types: mapped_types,
        relations: mapped_relations,
    })
}
