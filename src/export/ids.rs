//! Identifier assignment.
//!
//! Every emitted entity is re-identified through a single injectable
//! policy, so determinism-versus-uniqueness is swappable without touching
//! any mapping logic.

use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::model::{Identifier, InvalidIdentifierError};

/// The entity class an identifier is assigned for.
///
/// Each class has its own prefix, so identical source keys in different
/// classes can never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdSpace {
    /// Datatype definitions.
    Datatype,
    /// Enumeration literals.
    EnumValue,
    /// Attribute definitions.
    AttributeDefinition,
    /// Object types.
    SpecObjectType,
    /// The specification type.
    SpecificationType,
    /// The specification.
    Specification,
    /// Objects.
    SpecObject,
    /// Hierarchy nodes.
    Hierarchy,
    /// Relation types.
    RelationType,
    /// Relations.
    Relation,
    /// The document header.
    Header,
}

impl IdSpace {
    /// The prefix baked into identifiers of this class.
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Datatype => "DT",
            Self::EnumValue => "EV",
            Self::AttributeDefinition => "AD",
            Self::SpecObjectType => "SOT",
            Self::SpecificationType => "ST",
            Self::Specification => "S",
            Self::SpecObject => "SO",
            Self::Hierarchy => "H",
            Self::RelationType => "SRT",
            Self::Relation => "SR",
            Self::Header => "HDR",
        }
    }
}

/// Assigns a target identifier to one source entity.
pub trait AssignId {
    /// Produces the identifier for `source_key` within `space`.
    ///
    /// Distinct source keys within one space must map to distinct
    /// identifiers in normal operation.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidIdentifierError`] if the produced identifier would
    /// violate the target grammar.
    fn assign(
        &self,
        space: IdSpace,
        source_key: &str,
    ) -> Result<Identifier, InvalidIdentifierError>;
}

/// Deterministic policy: `_<PREFIX>-<hex sha256(source key)>`.
///
/// Re-running an export over an unchanged source yields byte-identical
/// identifiers for unchanged entities, so consumers can diff exports over
/// time. Digest collisions between distinct keys are possible in principle
/// but not detected; at 256 bits the risk is negligible.
#[derive(Debug, Clone, Copy, Default)]
pub struct StableIds;

impl AssignId for StableIds {
    fn assign(
        &self,
        space: IdSpace,
        source_key: &str,
    ) -> Result<Identifier, InvalidIdentifierError> {
        let digest = Sha256::digest(source_key.as_bytes());
        Identifier::new(format!("_{}-{digest:x}", space.prefix()))
    }
}

/// Run-unique policy: `_<PREFIX>-<random uuid>`.
///
/// Valid only when the consumer never needs cross-run stability.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIds;

impl AssignId for RandomIds {
    fn assign(
        &self,
        space: IdSpace,
        _source_key: &str,
    ) -> Result<Identifier, InvalidIdentifierError> {
        let token = Uuid::new_v4();
        Identifier::new(format!("_{}-{}", space.prefix(), token.simple()))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    #[test]
    fn stable_ids_are_deterministic() {
        let a = StableIds
            .assign(IdSpace::SpecObject, "node-1")
            .expect("valid identifier");
        let b = StableIds
            .assign(IdSpace::SpecObject, "node-1")
            .expect("valid identifier");
        assert_eq!(a, b);
    }

    #[test]
    fn stable_ids_separate_spaces() {
        let object = StableIds
            .assign(IdSpace::SpecObject, "same-key")
            .expect("valid identifier");
        let hierarchy = StableIds
            .assign(IdSpace::Hierarchy, "same-key")
            .expect("valid identifier");
        assert_ne!(object, hierarchy);
    }

    #[test]
    fn stable_ids_separate_keys() {
        let keys = ["a", "b", "a:b", "b:a", ""];
        let ids: BTreeSet<_> = keys
            .iter()
            .map(|k| {
                StableIds
                    .assign(IdSpace::AttributeDefinition, k)
                    .expect("valid identifier")
            })
            .collect();
        assert_eq!(ids.len(), keys.len());
    }

    #[test]
    fn stable_ids_have_the_documented_shape() {
        let id = StableIds
            .assign(IdSpace::Datatype, "STRING")
            .expect("valid identifier");
        assert!(id.as_str().starts_with("_DT-"));
        // 256-bit digest as lowercase hex.
        assert_eq!(id.as_str().len(), "_DT-".len() + 64);
    }

    #[test]
    fn random_ids_are_unique_within_a_run() {
        let a = RandomIds
            .assign(IdSpace::SpecObject, "node-1")
            .expect("valid identifier");
        let b = RandomIds
            .assign(IdSpace::SpecObject, "node-1")
            .expect("valid identifier");
        assert_ne!(a, b);
    }

    #[test]
    fn random_ids_satisfy_the_grammar() {
        for _ in 0..64 {
            RandomIds
                .assign(IdSpace::Relation, "r")
                .expect("valid identifier");
        }
    }
}
