//! Prefix matching implementation

use ceid_identity::{ALPHABET, ID_LEN};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PatternError {
    #[error("Invalid character: '{0}' (valid: {1})")]
    InvalidCharacter(char, &'static str),
    #[error("Pattern too long (max {0} characters)")]
    PatternTooLong(usize),
}

/// A validated identifier prefix
///
/// Only constructible through [`Prefix::new`], so every held value is over
/// the identifier alphabet and no longer than an identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Prefix(String);

impl Prefix {
    pub fn new(value: impl Into<String>) -> Result<Self, PatternError> {
        let value = value.into();

        if let Some(c) = value.chars().find(|c| !ALPHABET.contains(*c)) {
            return Err(PatternError::InvalidCharacter(c, ALPHABET));
        }
        if value.len() > ID_LEN {
            return Err(PatternError::PatternTooLong(ID_LEN));
        }

        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Exact leading-substring comparison
    pub fn matches(&self, id: &str) -> bool {
        id.starts_with(&self.0)
    }
}

impl std::fmt::Display for Prefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
