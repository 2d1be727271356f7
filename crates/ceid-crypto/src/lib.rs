//! ceid Crypto Primitives
//!
//! Low-level cryptographic operations for extension key generation.

pub mod keypair;
pub mod hash;
pub mod encoding;

pub use self::keypair::{RsaKeypair, RsaError, KEY_BITS};

// Re-export dependencies for use by other crates
pub use hex;
pub use rsa;
