//! RSA candidate generator

use ceid_crypto::{RsaKeypair, KEY_BITS};

use crate::traits::{Candidate, IdentityError, KeySource};

/// Generates RSA candidates from the OS random source
#[derive(Debug, Clone, Copy)]
pub struct RsaKeySource {
    bits: usize,
}

impl RsaKeySource {
    pub const fn new(bits: usize) -> Self {
        Self { bits }
    }

    pub fn bits(&self) -> usize {
        self.bits
    }
}

impl Default for RsaKeySource {
    fn default() -> Self {
        Self::new(KEY_BITS)
    }
}

impl KeySource for RsaKeySource {
    fn generate(&self) -> Result<Candidate, IdentityError> {
        let keypair = RsaKeypair::generate_with_bits(self.bits)?;
        Candidate::from_keypair(keypair)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{derive, ID_LEN};
    use ceid_crypto::encoding::base64_decode;
    use ceid_crypto::keypair::public_key_der_from_pem;

    #[test]
    fn test_default_strength() {
        assert_eq!(RsaKeySource::default().bits(), 2048);
    }

    #[test]
    fn test_rsa_generation() {
        let candidate = RsaKeySource::default().generate().unwrap();
        assert_eq!(candidate.keypair.bits(), 2048);
        assert_eq!(candidate.id.as_str().len(), ID_LEN);
        assert_eq!(candidate.id, derive(&candidate.public_key_der));
    }

    #[test]
    fn test_every_encoding_uses_the_same_der() {
        let candidate = RsaKeySource::new(1024).generate().unwrap();

        let from_console = base64_decode(&candidate.public_key_base64()).unwrap();
        assert_eq!(from_console, candidate.public_key_der);
        assert!(!candidate.public_key_base64().ends_with('='));

        let from_artifact = public_key_der_from_pem(&candidate.public_key_pem().unwrap()).unwrap();
        assert_eq!(from_artifact, candidate.public_key_der);
        assert_eq!(derive(&from_artifact), candidate.id);
    }

    #[test]
    fn test_candidates_are_fresh() {
        let source = RsaKeySource::new(1024);
        let a = source.generate().unwrap();
        let b = source.generate().unwrap();
        assert_ne!(a.public_key_der, b.public_key_der);
    }
}
