//! Datatype mapping.

use std::collections::HashMap;

use crate::{
    export::ids::{AssignId, IdSpace},
    model::{Datatype, DatatypeKind, EnumLiteral, Identifier, InvalidIdentifierError},
    store::rows::{DatatypeRow, EnumValueRow},
};

/// Source id of the guaranteed string datatype.
const STRING_FALLBACK_ID: &str = "STRING";
/// Source id of the guaranteed rich-text datatype.
const RICH_TEXT_FALLBACK_ID: &str = "XHTML";

/// The mapped datatype definitions plus the lookups later stages need.
#[derive(Debug)]
pub struct DatatypeTable {
    datatypes: Vec<Datatype>,
    index_by_source: HashMap<String, usize>,
    literal_ids: HashMap<String, Identifier>,
    string_index: usize,
    rich_text_index: usize,
}

impl DatatypeTable {
    /// Resolves a source datatype reference, falling back to the string
    /// datatype when the reference is undeclared.
    #[must_use]
    pub fn resolve(&self, source_ref: &str) -> &Datatype {
        self.index_by_source
            .get(source_ref)
            .map_or_else(|| self.string(), |&index| &self.datatypes[index])
    }

    /// The guaranteed string datatype the built-in attributes reference.
    #[must_use]
    pub fn string(&self) -> &Datatype {
        &self.datatypes[self.string_index]
    }

    /// The guaranteed rich-text datatype the built-in body references.
    #[must_use]
    pub fn rich_text(&self) -> &Datatype {
        &self.datatypes[self.rich_text_index]
    }

    /// Looks up the target identifier of an exported enumeration literal.
    ///
    /// Literals attached to non-enumeration datatypes, or to datatypes the
    /// source never declared, are not exported and resolve to `None`.
    #[must_use]
    pub fn literal(&self, source_literal: &str) -> Option<&Identifier> {
        self.literal_ids.get(source_literal)
    }

    /// The mapped definitions in emission order.
    #[must_use]
    pub fn datatypes(&self) -> &[Datatype] {
        &self.datatypes
    }

    /// Consumes the table, keeping only the definitions.
    #[must_use]
    pub fn into_datatypes(self) -> Vec<Datatype> {
        self.datatypes
    }
}

/// Maps the declared datatypes, ordered by source id, and appends the
/// string and rich-text fallbacks when the source does not declare
/// datatypes under those ids.
///
/// # Errors
///
/// Returns [`InvalidIdentifierError`] if the identifier policy produces an
/// ill-formed identifier.
pub fn map_datatypes(
    rows: &[DatatypeRow],
    enum_values: &[EnumValueRow],
    ids: &dyn AssignId,
) -> Result<DatatypeTable, InvalidIdentifierError> {
    let mut literals_by_datatype: HashMap<&str, Vec<&EnumValueRow>> = HashMap::new();
    for row in enum_values {
        literals_by_datatype
            .entry(row.datatype_ref.as_str())
            .or_default()
            .push(row);
    }

    let mut sorted: Vec<&DatatypeRow> = rows.iter().collect();
    sorted.sort_by(|a, b| a.id.cmp(&b.id));

    let mut datatypes = Vec::with_capacity(sorted.len() + 2);
    let mut index_by_source = HashMap::new();
    let mut literal_ids = HashMap::new();

    for row in sorted {
        let kind = DatatypeKind::from_primitive(&row.primitive);
        let literals = if kind == DatatypeKind::Enumeration {
            let rows = literals_by_datatype
                .get(row.id.as_str())
                .map_or(&[][..], Vec::as_slice);
            let mut literals = Vec::with_capacity(rows.len());
            for value in rows {
                let identifier = ids.assign(IdSpace::EnumValue, &value.id)?;
                literal_ids.insert(value.id.clone(), identifier.clone());
                literals.push(EnumLiteral {
                    identifier,
                    key: value.key.clone(),
                });
            }
            literals
        } else {
            Vec::new()
        };

        index_by_source.insert(row.id.clone(), datatypes.len());
        datatypes.push(Datatype {
            identifier: ids.assign(IdSpace::Datatype, &row.id)?,
            long_name: row.id.clone(),
            kind,
            literals,
        });
    }

    for fallback in [STRING_FALLBACK_ID, RICH_TEXT_FALLBACK_ID] {
        if !index_by_source.contains_key(fallback) {
            index_by_source.insert(fallback.to_string(), datatypes.len());
            datatypes.push(Datatype {
                identifier: ids.assign(IdSpace::Datatype, fallback)?,
                long_name: fallback.to_string(),
                kind: DatatypeKind::from_primitive(fallback),
                literals: Vec::new(),
            });
        }
    }

    let string_index = index_by_source[STRING_FALLBACK_ID];
    let rich_text_index = index_by_source[RICH_TEXT_FALLBACK_ID];

    Ok(DatatypeTable {
        datatypes,
        index_by_source,
        literal_ids,
        string_index,
        rich_text_index,
    })
}
