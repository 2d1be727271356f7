//! RSA keypair operations for extension signing keys

use rand::rngs::OsRng;
use rsa::pkcs1::{DecodeRsaPrivateKey, EncodeRsaPrivateKey};
use rsa::pkcs8::der::pem::{self, LineEnding};
use rsa::pkcs8::{DecodePublicKey, EncodePublicKey};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use thiserror::Error;

/// Modulus size used for generated keys
pub const KEY_BITS: usize = 2048;

/// PEM label of the PKCS#1 private key artifact
pub const PRIVATE_KEY_LABEL: &str = "RSA PRIVATE KEY";

/// PEM label of the SubjectPublicKeyInfo public key artifact
pub const PUBLIC_KEY_LABEL: &str = "PUBLIC KEY";

/// Label written by older tools around the same SPKI payload
pub const LEGACY_PUBLIC_KEY_LABEL: &str = "RSA PUBLIC KEY";

#[derive(Error, Debug)]
pub enum RsaError {
    #[error("Key generation failed: {0}")]
    KeyGenFailed(#[from] rsa::Error),
    #[error("Public key encoding failed: {0}")]
    PublicKeyEncoding(#[from] rsa::pkcs8::spki::Error),
    #[error("Private key encoding failed: {0}")]
    PrivateKeyEncoding(#[from] rsa::pkcs1::Error),
    #[error("PEM error: {0}")]
    Pem(pem::Error),
    #[error("Unexpected PEM label '{0}'")]
    UnexpectedLabel(String),
}

/// An RSA keypair
#[derive(Clone)]
pub struct RsaKeypair {
    private_key: RsaPrivateKey,
    public_key: RsaPublicKey,
}

impl RsaKeypair {
    /// Generate a new random keypair of `KEY_BITS` bits
    pub fn generate() -> Result<Self, RsaError> {
        Self::generate_with_bits(KEY_BITS)
    }

    /// Generate a new random keypair with an explicit modulus size
    pub fn generate_with_bits(bits: usize) -> Result<Self, RsaError> {
        let private_key = RsaPrivateKey::new(&mut OsRng, bits)?;
        Ok(Self::from_private_key(private_key))
    }

    /// Load from PKCS#1 DER private key bytes
    pub fn from_pkcs1_der(der: &[u8]) -> Result<Self, RsaError> {
        let private_key = RsaPrivateKey::from_pkcs1_der(der)?;
        Ok(Self::from_private_key(private_key))
    }

    /// Load from a PKCS#1 PEM private key artifact
    pub fn from_pkcs1_pem(pem: &str) -> Result<Self, RsaError> {
        let private_key = RsaPrivateKey::from_pkcs1_pem(pem)?;
        Ok(Self::from_private_key(private_key))
    }

    fn from_private_key(private_key: RsaPrivateKey) -> Self {
        let public_key = RsaPublicKey::from(&private_key);
        Self {
            private_key,
            public_key,
        }
    }

    /// Modulus size in bits
    pub fn bits(&self) -> usize {
        self.public_key.size() * 8
    }

    /// SubjectPublicKeyInfo DER encoding of the public key
    pub fn public_key_der(&self) -> Result<Vec<u8>, RsaError> {
        Ok(self.public_key.to_public_key_der()?.as_bytes().to_vec())
    }

    /// PKCS#1 DER encoding of the private key
    pub fn private_key_der(&self) -> Result<Vec<u8>, RsaError> {
        Ok(self.private_key.to_pkcs1_der()?.as_bytes().to_vec())
    }

    /// PKCS#1 PEM encoding of the private key
    pub fn private_key_pem(&self) -> Result<String, RsaError> {
        let pem = self.private_key.to_pkcs1_pem(LineEnding::LF)?;
        Ok(pem.to_string())
    }
}

impl std::fmt::Debug for RsaKeypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RsaKeypair")
            .field("bits", &self.bits())
            .finish_non_exhaustive()
    }
}

/// Armor SPKI DER bytes as a public key artifact
///
/// The payload is written as given, so the artifact holds exactly the bytes
/// an identifier was derived from.
pub fn public_key_pem(spki_der: &[u8]) -> Result<String, RsaError> {
    pem::encode_string(PUBLIC_KEY_LABEL, LineEnding::LF, spki_der).map_err(RsaError::Pem)
}

/// Extract and validate the SPKI DER payload of a public key artifact
///
/// Accepts both `PUBLIC KEY` and the legacy `RSA PUBLIC KEY` label.
pub fn public_key_der_from_pem(armored: &str) -> Result<Vec<u8>, RsaError> {
    let (label, der) = pem::decode_vec(armored.as_bytes()).map_err(RsaError::Pem)?;
    if label != PUBLIC_KEY_LABEL && label != LEGACY_PUBLIC_KEY_LABEL {
        return Err(RsaError::UnexpectedLabel(label.to_string()));
    }
    RsaPublicKey::from_public_key_der(&der)?;
    Ok(der)
}
