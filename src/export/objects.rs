//! Document node mapping.
//!
//! Turns each node row into a [`SpecObject`]: the three built-in values
//! first (external id, display name, rendered body), then the node's own
//! attribute values. Conversion dispatches on the value row's kind tag, a
//! missing tag meaning STRING. Values that cannot produce a usable payload
//! are dropped without failing the build; an undeclared node type is fatal.

use std::collections::HashMap;

use thiserror::Error;

use crate::{
    export::{
        datatypes::DatatypeTable,
        ids::{AssignId, IdSpace},
        schema::{SchemaTable, is_builtin_attribute},
    },
    model::{AttributeValue, DatatypeKind, Identifier, InvalidIdentifierError, SpecObject, Value},
    render,
    store::rows::{AttributeValueRow, ObjectRow},
};

/// Failure to map the document nodes.
#[derive(Debug, Error)]
pub enum MapObjectsError {
    /// A node references an object type the source never declared.
    #[error("node '{node}' references undeclared object type '{type_ref}'")]
    UndeclaredObjectType {
        /// Source id of the offending node.
        node: String,
        /// The unresolved type reference.
        type_ref: String,
    },
    /// The identifier policy produced an ill-formed identifier.
    #[error(transparent)]
    Identifier(#[from] InvalidIdentifierError),
}

/// The mapped objects plus the source-to-target id map the hierarchy and
/// relation stages resolve against.
#[derive(Debug)]
pub struct ObjectTable {
    /// Mapped objects in document order.
    pub spec_objects: Vec<SpecObject>,
    /// Source node id to target object identifier.
    pub object_ids: HashMap<String, Identifier>,
}

/// Maps every node row to a [`SpecObject`], in document order.
///
/// # Errors
///
/// Returns [`MapObjectsError`] if a node's type was never declared or the
/// identifier policy produces an ill-formed identifier.
pub fn map_objects(
    objects: &[ObjectRow],
    values: &[AttributeValueRow],
    schema: &SchemaTable,
    datatypes: &DatatypeTable,
    ids: &dyn AssignId,
) -> Result<ObjectTable, MapObjectsError> {
    let mut values_by_owner: HashMap<&str, Vec<&AttributeValueRow>> = HashMap::new();
    for row in values {
        values_by_owner
            .entry(row.owner_object_id.as_str())
            .or_default()
            .push(row);
    }

    let mut spec_objects = Vec::with_capacity(objects.len());
    let mut object_ids = HashMap::new();
    for row in objects {
        let Some(type_ids) = schema.object_type(&row.type_ref) else {
            return Err(MapObjectsError::UndeclaredObjectType {
                node: row.id.clone(),
                type_ref: row.type_ref.clone(),
            });
        };

        let identifier = ids.assign(IdSpace::SpecObject, &row.id)?;
        let title = row.display_title().to_string();

        let body = render::xhtml_namespace(&render::body_fragment(
            row.content_xhtml.as_deref(),
            row.ast.as_deref(),
        ));
        let mut attribute_values = vec![
            AttributeValue {
                definition: type_ids.builtins.foreign_id.clone(),
                value: Value::Str(row.public_id().to_string()),
            },
            AttributeValue {
                definition: type_ids.builtins.name.clone(),
                value: Value::Str(title.clone()),
            },
            AttributeValue {
                definition: type_ids.builtins.text.clone(),
                value: Value::RichText(body),
            },
        ];

        for &value_row in values_by_owner.get(row.id.as_str()).map_or(&[][..], Vec::as_slice) {
            if is_builtin_attribute(&value_row.name) {
                tracing::debug!(
                    "Skipping reserved attribute name '{}' on node {}",
                    value_row.name,
                    row.id
                );
                continue;
            }
            let Some(definition) = schema.definition(&row.type_ref, &value_row.name) else {
                tracing::debug!(
                    "Skipping undeclared attribute '{}' on node {}",
                    value_row.name,
                    row.id
                );
                continue;
            };
            let Some(value) = convert(value_row, datatypes) else {
                tracing::debug!(
                    "Dropping attribute '{}' on node {}: no usable payload",
                    value_row.name,
                    row.id
                );
                continue;
            };
            attribute_values.push(AttributeValue {
                definition: definition.clone(),
                value,
            });
        }

        object_ids.insert(row.id.clone(), identifier.clone());
        spec_objects.push(SpecObject {
            identifier,
            long_name: title,
            object_type: type_ids.identifier.clone(),
            values: attribute_values,
        });
    }

    Ok(ObjectTable {
        spec_objects,
        object_ids,
    })
}

/// Converts one value row by its own kind tag.
///
/// Scalar kinds fall back to the raw text column when the typed column is
/// empty; enumeration and rich-text kinds read their dedicated columns
/// only.
#[allow(clippy::cast_precision_loss)]
fn convert(row: &AttributeValueRow, datatypes: &DatatypeTable) -> Option<Value> {
    let kind = DatatypeKind::from_primitive(row.kind.as_deref().unwrap_or("STRING"));
    match kind {
        DatatypeKind::String => row
            .string_value
            .clone()
            .or_else(|| row.raw_value.clone())
            .map(Value::Str),
        DatatypeKind::Integer => row
            .int_value
            .or_else(|| row.raw_value.as_deref().and_then(|raw| raw.trim().parse().ok()))
            .map(Value::Int),
        DatatypeKind::Real => row
            .real_value
            .or_else(|| row.int_value.map(|whole| whole as f64))
            .or_else(|| row.raw_value.as_deref().and_then(|raw| raw.trim().parse().ok()))
            .map(Value::Real),
        DatatypeKind::Boolean => row
            .bool_value
            .or_else(|| row.raw_value.as_deref().and_then(parse_bool))
            .map(Value::Bool),
        DatatypeKind::Date => row
            .date_value
            .clone()
            .or_else(|| row.raw_value.clone())
            .map(Value::Date),
        DatatypeKind::Enumeration => row
            .enum_ref
            .as_deref()
            .and_then(|literal| datatypes.literal(literal))
            .map(|literal| Value::EnumRefs(vec![literal.clone()])),
        DatatypeKind::RichText => {
            let fragment = row.xhtml_value.as_deref().unwrap_or("").trim();
            if fragment.is_empty() {
                None
            } else {
                Some(Value::RichText(render::xhtml_namespace(&format!(
                    "<div>{fragment}</div>"
                ))))
            }
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}
