use rsa::pkcs8::EncodePublicKey;
use rsa::RsaPublicKey;
use thiserror::Error;

use super::KeyAlgorithm;

/// Public key in the form generic crypto code consumes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublicKey {
    Rsa(RsaPublicKey),
    EcP256(p256::PublicKey),
}

impl PublicKey {
    pub fn algorithm(&self) -> KeyAlgorithm {
        match self {
            PublicKey::Rsa(_) => KeyAlgorithm::Rsa,
            PublicKey::EcP256(_) => KeyAlgorithm::Ecc,
        }
    }

    pub fn as_rsa(&self) -> Option<&RsaPublicKey> {
        match self {
            PublicKey::Rsa(key) => Some(key),
            PublicKey::EcP256(_) => None,
        }
    }

    /// DER-encoded SubjectPublicKeyInfo
    pub fn to_spki_der(&self) -> Result<Vec<u8>, PublicKeyError> {
        let document = match self {
            PublicKey::Rsa(key) => key.to_public_key_der(),
            PublicKey::EcP256(key) => key.to_public_key_der(),
        }
        .map_err(|e| PublicKeyError::Encoding {
            reason: e.to_string(),
        })?;
        Ok(document.as_bytes().to_vec())
    }
}

impl From<RsaPublicKey> for PublicKey {
    fn from(key: RsaPublicKey) -> Self {
        PublicKey::Rsa(key)
    }
}

impl From<p256::PublicKey> for PublicKey {
    fn from(key: p256::PublicKey) -> Self {
        PublicKey::EcP256(key)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PublicKeyError {
    #[error("Failed to encode public key: {reason}")]
    Encoding { reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use rsa::BigUint;

    fn small_rsa_key() -> RsaPublicKey {
        // 1024-bit modulus with the top bit set, odd
        let mut modulus = vec![0xC5u8; 128];
        modulus[127] = 0x0B;
        RsaPublicKey::new(BigUint::from_bytes_be(&modulus), BigUint::from(65537u32)).unwrap()
    }

    #[test]
    fn test_rsa_public_key_accessors() {
        let key = PublicKey::from(small_rsa_key());
        assert_eq!(key.algorithm(), KeyAlgorithm::Rsa);
        assert!(key.as_rsa().is_some());
    }

    #[test]
    fn test_rsa_spki_der() {
        let key = PublicKey::from(small_rsa_key());
        let der = key.to_spki_der().unwrap();
        // SEQUENCE header
        assert_eq!(der[0], 0x30);
        let decoded = <RsaPublicKey as rsa::pkcs8::DecodePublicKey>::from_public_key_der(&der)
            .unwrap();
        assert_eq!(PublicKey::Rsa(decoded), key);
    }
}
