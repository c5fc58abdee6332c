//! Key algorithm families and curves known to the secure module

use std::fmt;
use thiserror::Error;

/// Object type reported in a module public area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAlgorithm {
    Rsa,
    Ecc,
    KeyedHash,
    SymCipher,
}

impl KeyAlgorithm {
    /// Module algorithm identifier
    pub const fn id(self) -> u16 {
        match self {
            KeyAlgorithm::Rsa => 0x0001,
            KeyAlgorithm::KeyedHash => 0x0008,
            KeyAlgorithm::Ecc => 0x0023,
            KeyAlgorithm::SymCipher => 0x0025,
        }
    }

    /// Convert from a module algorithm identifier
    ///
    /// # Errors
    ///
    /// Returns `AlgorithmError::UnknownId` if the identifier is not an object type
    pub fn from_id(id: u16) -> Result<Self, AlgorithmError> {
        match id {
            0x0001 => Ok(KeyAlgorithm::Rsa),
            0x0008 => Ok(KeyAlgorithm::KeyedHash),
            0x0023 => Ok(KeyAlgorithm::Ecc),
            0x0025 => Ok(KeyAlgorithm::SymCipher),
            _ => Err(AlgorithmError::UnknownId { id }),
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            KeyAlgorithm::Rsa => "RSA",
            KeyAlgorithm::Ecc => "ECC",
            KeyAlgorithm::KeyedHash => "KEYEDHASH",
            KeyAlgorithm::SymCipher => "SYMCIPHER",
        }
    }
}

impl fmt::Display for KeyAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Elliptic curve identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EccCurve {
    NistP256,
    NistP384,
    NistP521,
    BnP256,
}

impl EccCurve {
    pub const fn id(self) -> u16 {
        match self {
            EccCurve::NistP256 => 0x0003,
            EccCurve::NistP384 => 0x0004,
            EccCurve::NistP521 => 0x0005,
            EccCurve::BnP256 => 0x0010,
        }
    }

    pub fn from_id(id: u16) -> Result<Self, AlgorithmError> {
        match id {
            0x0003 => Ok(EccCurve::NistP256),
            0x0004 => Ok(EccCurve::NistP384),
            0x0005 => Ok(EccCurve::NistP521),
            0x0010 => Ok(EccCurve::BnP256),
            _ => Err(AlgorithmError::UnknownCurve { id }),
        }
    }

    /// Size of one affine coordinate in bytes
    pub const fn coordinate_size(self) -> usize {
        match self {
            EccCurve::NistP256 | EccCurve::BnP256 => 32,
            EccCurve::NistP384 => 48,
            EccCurve::NistP521 => 66,
        }
    }
}

impl fmt::Display for EccCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EccCurve::NistP256 => "NIST P-256",
            EccCurve::NistP384 => "NIST P-384",
            EccCurve::NistP521 => "NIST P-521",
            EccCurve::BnP256 => "BN P-256",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AlgorithmError {
    #[error("Unknown object algorithm id: {id:#06x}")]
    UnknownId { id: u16 },

    #[error("Unknown curve id: {id:#06x}")]
    UnknownCurve { id: u16 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_algorithm_id_roundtrip() {
        for alg in [
            KeyAlgorithm::Rsa,
            KeyAlgorithm::Ecc,
            KeyAlgorithm::KeyedHash,
            KeyAlgorithm::SymCipher,
        ] {
            assert_eq!(KeyAlgorithm::from_id(alg.id()).unwrap(), alg);
        }
    }

    #[test]
    fn test_unknown_algorithm_id() {
        assert_eq!(
            KeyAlgorithm::from_id(0x0014).unwrap_err(),
            AlgorithmError::UnknownId { id: 0x0014 }
        );
    }

    #[test]
    fn test_curve_from_id() {
        assert_eq!(EccCurve::from_id(0x0003).unwrap(), EccCurve::NistP256);
        assert!(EccCurve::from_id(0x0020).is_err());
    }

    #[test]
    fn test_algorithm_error_display() {
        let err = AlgorithmError::UnknownId { id: 0x0099 };
        assert!(err.to_string().contains("0x0099"));
    }
}
