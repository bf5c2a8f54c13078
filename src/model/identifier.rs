use std::{fmt, ops::Deref, str::FromStr};

use non_empty_string::NonEmptyString;

/// A validated target-document identifier.
///
/// The interchange format restricts identifiers to a non-empty string that
/// does not begin with a digit and contains only ASCII alphanumerics, `_`,
/// `-` and `.`. Every identifier placed in the exported document is
/// constructed through this type, so an ill-formed identifier is caught at
/// assignment time rather than by the downstream consumer.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Identifier(NonEmptyString);

impl Identifier {
    /// Creates an `Identifier` from a string.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidIdentifierError`] if the string is empty, begins
    /// with a digit, or contains a character outside `[A-Za-z0-9_.-]`.
    pub fn new(s: String) -> Result<Self, InvalidIdentifierError> {
        let non_empty =
            NonEmptyString::new(s.clone()).map_err(|_| InvalidIdentifierError::Empty)?;

        if s.chars().next().is_some_and(|c| c.is_ascii_digit()) {
            return Err(InvalidIdentifierError::LeadingDigit(s));
        }

        if let Some(character) = s
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')))
        {
            return Err(InvalidIdentifierError::Charset {
                identifier: s,
                character,
            });
        }

        Ok(Self(non_empty))
    }

    /// Returns the string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for Identifier {
    type Error = InvalidIdentifierError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for Identifier {
    type Error = InvalidIdentifierError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value.to_string())
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl Deref for Identifier {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.0.as_str()
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Identifier {
    type Err = InvalidIdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

/// Error returned when a string doesn't satisfy the identifier grammar.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum InvalidIdentifierError {
    /// The identifier is the empty string.
    #[error("identifier must not be empty")]
    Empty,

    /// The identifier begins with a digit, which the target grammar forbids.
    #[error("identifier '{0}' must not begin with a digit")]
    LeadingDigit(String),

    /// The identifier contains a character outside `[A-Za-z0-9_.-]`.
    #[error("identifier '{identifier}' contains forbidden character '{character}'")]
    Charset {
        /// The rejected identifier.
        identifier: String,
        /// The first offending character.
        character: char,
    },
}
