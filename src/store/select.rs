//! Choosing which specification to export.

use thiserror::Error;

/// Failure to settle on a specification.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    /// The store contains no specifications at all.
    #[error("no specifications found in the store")]
    NoSpecifications,
    /// The requested specification does not exist.
    #[error("specification '{selector}' not found")]
    NotFound {
        /// The identifier that was asked for.
        selector: String,
    },
    /// Several specifications exist and none was singled out.
    #[error("store holds multiple specifications ({}); pass an explicit id", .candidates.join(", "))]
    Ambiguous {
        /// Every specification id the store holds.
        candidates: Vec<String>,
    },
}

/// Picks the specification to export.
///
/// An explicit `selector` must name a known specification. Without one the
/// store must hold exactly one specification, which is then chosen.
///
/// # Errors
///
/// Returns [`SelectionError`] if the store is empty, the selector is
/// unknown, or no selector was given while several specifications exist.
pub fn select_spec(ids: &[String], selector: Option<&str>) -> Result<String, SelectionError> {
    if ids.is_empty() {
        return Err(SelectionError::NoSpecifications);
    }
    match selector {
        Some(wanted) => {
            if ids.iter().any(|id| id == wanted) {
                Ok(wanted.to_string())
            } else {
                Err(SelectionError::NotFound {
                    selector: wanted.to_string(),
                })
            }
        }
        None => {
            if let [only] = ids {
                Ok(only.clone())
            } else {
                Err(SelectionError::Ambiguous {
                    candidates: ids.to_vec(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn a_lone_specification_is_chosen_implicitly() {
        assert_eq!(select_spec(&ids(&["only"]), None), Ok("only".to_string()));
    }

    #[test]
    fn multiple_specifications_require_an_explicit_choice() {
        let error = select_spec(&ids(&["a", "b"]), None).expect_err("selection fails");
        assert_eq!(
            error,
            SelectionError::Ambiguous {
                candidates: ids(&["a", "b"])
            }
        );
        assert!(error.to_string().contains("a, b"));
    }

    #[test]
    fn an_explicit_selector_wins_over_ambiguity() {
        assert_eq!(
            select_spec(&ids(&["a", "b"]), Some("b")),
            Ok("b".to_string())
        );
    }

    #[test]
    fn an_unknown_selector_is_rejected() {
        assert_eq!(
            select_spec(&ids(&["a"]), Some("nonesuch")),
            Err(SelectionError::NotFound {
                selector: "nonesuch".to_string()
            })
        );
    }

    #[test]
    fn an_empty_store_is_rejected() {
        assert_eq!(select_spec(&[], None), Err(SelectionError::NoSpecifications));
        assert_eq!(
            select_spec(&[], Some("a")),
            Err(SelectionError::NoSpecifications)
        );
    }
}
