//! Extension identifier derivation
//!
//! An identifier is the first 128 bits of SHA-256 over the SubjectPublicKeyInfo
//! DER of the signing key, hex encoded, with every hex digit shifted onto `a..p`.

use std::fmt;

use ceid_crypto::hash::{sha256, SHA256_LEN};
use ceid_crypto::hex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Characters an identifier is made of, indexed by hex digit value
pub const ALPHABET: &str = "abcdefghijklmnop";

/// Identifier length in characters
pub const ID_LEN: usize = 32;

const HEX_DIGITS: &str = "0123456789abcdef";

// Two hex characters per digest byte.
const _: () = assert!(SHA256_LEN * 2 >= ID_LEN, "digest too short for an identifier");

#[derive(Error, Debug, PartialEq, Eq)]
pub enum IdError {
    #[error("Identifier must be 32 characters, got {0}")]
    InvalidLength(usize),
    #[error("Invalid identifier character: '{0}'")]
    InvalidCharacter(char),
}

/// A 32-character extension identifier over `a..p`
///
/// Built by [`derive`] or parsed from an existing string, never unchecked.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ExtensionId(String);

impl ExtensionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ExtensionId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if let Some(c) = value.chars().find(|c| !ALPHABET.contains(*c)) {
            return Err(IdError::InvalidCharacter(c));
        }
        if value.len() != ID_LEN {
            return Err(IdError::InvalidLength(value.len()));
        }
        Ok(Self(value))
    }
}

impl std::str::FromStr for ExtensionId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s.to_string())
    }
}

impl From<ExtensionId> for String {
    fn from(id: ExtensionId) -> Self {
        id.0
    }
}

impl fmt::Display for ExtensionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ExtensionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Map one lowercase hex digit to its identifier letter
pub fn substitute(hex_char: char) -> Option<char> {
    let value = HEX_DIGITS.find(hex_char)?;
    ALPHABET[value..].chars().next()
}

/// Derive the identifier of a public key from its SPKI DER encoding
///
/// Every character is translated once against the unmodified hex digest, so
/// the result does not depend on substitution order.
pub fn derive(public_key_der: &[u8]) -> ExtensionId {
    let digest = hex::encode(sha256(public_key_der));
    let id: String = digest[..ID_LEN].chars().filter_map(substitute).collect();
    debug_assert_eq!(id.len(), ID_LEN);
    ExtensionId(id)
}
