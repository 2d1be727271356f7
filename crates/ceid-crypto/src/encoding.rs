//! Base64 helpers for the console form of public keys

use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine as _;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EncodingError {
    #[error("Invalid character in input")]
    InvalidCharacter,
}

/// Base64 encode without padding (standard alphabet)
pub fn base64_unpadded(data: &[u8]) -> String {
    STANDARD_NO_PAD.encode(data)
}

/// Base64 decode, accepting input with or without padding
pub fn base64_decode(input: &str) -> Result<Vec<u8>, EncodingError> {
    let trimmed = input.trim_end_matches('=');
    STANDARD_NO_PAD
        .decode(trimmed)
        .map_err(|_| EncodingError::InvalidCharacter)
}
