//! Document tree reconstruction.
//!
//! Source rows carry a flat, depth-annotated sequence in document order.
//! A stack of open branches rebuilds the nesting: each node pops every
//! branch at its own level or deeper, then opens a new branch. Equal
//! levels are therefore siblings, and a node that skips levels downward
//! becomes a direct child of the last shallower node.

use std::collections::HashMap;

use crate::{
    export::ids::{AssignId, IdSpace},
    model::{Identifier, InvalidIdentifierError, SpecHierarchy},
    store::rows::ObjectRow,
};

/// Effective hierarchy level of a row.
///
/// Missing depths default to 2, and the stored depth is one deeper than
/// the hierarchy level, clamped so every node lands at level 1 or below
/// the root.
fn level_of(row: &ObjectRow) -> i64 {
    (row.depth.unwrap_or(2) - 1).max(1)
}

fn attach(
    finished: SpecHierarchy,
    stack: &mut Vec<(i64, SpecHierarchy)>,
    roots: &mut Vec<SpecHierarchy>,
) {
    match stack.last_mut() {
        Some((_, parent)) => parent.children.push(finished),
        None => roots.push(finished),
    }
}

/// Rebuilds the hierarchy roots from the flat row sequence.
///
/// `object_ids` maps source node ids to the target identifiers assigned
/// during object mapping; rows absent from it are left out of the tree.
///
/// # Errors
///
/// Returns [`InvalidIdentifierError`] if the identifier policy produces an
/// ill-formed identifier.
pub fn build_hierarchy(
    spec_source_id: &str,
    objects: &[ObjectRow],
    object_ids: &HashMap<String, Identifier>,
    ids: &dyn AssignId,
) -> Result<Vec<SpecHierarchy>, InvalidIdentifierError> {
    let mut stack: Vec<(i64, SpecHierarchy)> = Vec::new();
    let mut roots = Vec::new();

    for row in objects {
        let Some(object) = object_ids.get(row.id.as_str()) else {
            continue;
        };
        let level = level_of(row);

        while stack.last().is_some_and(|(open, _)| level <= *open) {
            if let Some((_, finished)) = stack.pop() {
                attach(finished, &mut stack, &mut roots);
            }
        }

        let identifier = ids.assign(
            IdSpace::Hierarchy,
            &format!("{spec_source_id}:{}", row.id),
        )?;
        stack.push((level, SpecHierarchy {
            identifier,
            object: object.clone(),
            children: Vec::new(),
        }));
    }

    while let Some((_, finished)) = stack.pop() {
        attach(finished, &mut stack, &mut roots);
    }

    Ok(roots)
}
