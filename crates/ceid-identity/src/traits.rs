//! Candidate and key source types

use ceid_crypto::encoding::base64_unpadded;
use ceid_crypto::keypair::public_key_pem;
use ceid_crypto::{RsaError, RsaKeypair};
use thiserror::Error;

use crate::codec::{derive, ExtensionId};

#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("Key generation failed: {0}")]
    KeyGen(#[from] RsaError),
    #[error("Key encoding failed: {0}")]
    Encoding(RsaError),
}

/// A generated keypair with its derived identifier
#[derive(Debug, Clone)]
pub struct Candidate {
    /// The signing keypair
    pub keypair: RsaKeypair,
    /// SPKI DER of the public key, the bytes the identifier is derived from
    pub public_key_der: Vec<u8>,
    /// Derived identifier
    pub id: ExtensionId,
}

impl Candidate {
    /// Encode the public key and derive the identifier
    pub fn from_keypair(keypair: RsaKeypair) -> Result<Self, IdentityError> {
        let public_key_der = keypair.public_key_der()?;
        let id = derive(&public_key_der);
        Ok(Self {
            keypair,
            public_key_der,
            id,
        })
    }

    /// Public key as unpadded base64, the form used in a manifest `key` field
    pub fn public_key_base64(&self) -> String {
        base64_unpadded(&self.public_key_der)
    }

    /// PEM armor of exactly `public_key_der`
    pub fn public_key_pem(&self) -> Result<String, IdentityError> {
        public_key_pem(&self.public_key_der).map_err(IdentityError::Encoding)
    }

    pub fn private_key_pem(&self) -> Result<String, IdentityError> {
        self.keypair.private_key_pem().map_err(IdentityError::Encoding)
    }
}

/// Trait for candidate generators
///
/// Implementations are called concurrently from every search worker and must
/// not share mutable state.
pub trait KeySource: Send + Sync {
    /// Produce one fresh candidate
    fn generate(&self) -> Result<Candidate, IdentityError>;
}
