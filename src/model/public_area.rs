//! The module's public description of an object

use super::{EccCurve, KeyAlgorithm, ModuleHash};

/// Object attributes relevant to signing keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectAttributes {
    pub fixed_tpm: bool,
    pub fixed_parent: bool,
    pub sensitive_data_origin: bool,
    /// Password authorization is accepted for user operations
    pub user_with_auth: bool,
    pub decrypt: bool,
    pub sign: bool,
}

impl ObjectAttributes {
    const FIXED_TPM: u32 = 1 << 1;
    const FIXED_PARENT: u32 = 1 << 4;
    const SENSITIVE_DATA_ORIGIN: u32 = 1 << 5;
    const USER_WITH_AUTH: u32 = 1 << 6;
    const DECRYPT: u32 = 1 << 17;
    const SIGN: u32 = 1 << 18;

    /// Non-duplicable, module-generated signing key usable with a password
    pub fn signing_key() -> Self {
        Self {
            fixed_tpm: true,
            fixed_parent: true,
            sensitive_data_origin: true,
            user_with_auth: true,
            decrypt: false,
            sign: true,
        }
    }

    pub fn bits(self) -> u32 {
        [
            (self.fixed_tpm, Self::FIXED_TPM),
            (self.fixed_parent, Self::FIXED_PARENT),
            (self.sensitive_data_origin, Self::SENSITIVE_DATA_ORIGIN),
            (self.user_with_auth, Self::USER_WITH_AUTH),
            (self.decrypt, Self::DECRYPT),
            (self.sign, Self::SIGN),
        ]
        .iter()
        .filter(|(set, _)| *set)
        .fold(0, |acc, (_, bit)| acc | bit)
    }

    pub fn from_bits(bits: u32) -> Self {
        Self {
            fixed_tpm: bits & Self::FIXED_TPM != 0,
            fixed_parent: bits & Self::FIXED_PARENT != 0,
            sensitive_data_origin: bits & Self::SENSITIVE_DATA_ORIGIN != 0,
            user_with_auth: bits & Self::USER_WITH_AUTH != 0,
            decrypt: bits & Self::DECRYPT != 0,
            sign: bits & Self::SIGN != 0,
        }
    }
}

impl Default for ObjectAttributes {
    fn default() -> Self {
        Self::signing_key()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsaParameters {
    pub key_bits: u16,
    /// Zero selects [`RsaParameters::DEFAULT_EXPONENT`]
    pub exponent: u32,
    /// Big-endian modulus
    pub modulus: Vec<u8>,
}

impl RsaParameters {
    pub const DEFAULT_EXPONENT: u32 = 65537;

    pub fn effective_exponent(&self) -> u32 {
        if self.exponent == 0 {
            Self::DEFAULT_EXPONENT
        } else {
            self.exponent
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EccParameters {
    pub curve: EccCurve,
    /// Big-endian affine coordinates
    pub x: Vec<u8>,
    pub y: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublicParameters {
    Rsa(RsaParameters),
    Ecc(EccParameters),
    KeyedHash,
    SymCipher,
}

/// Public area of a module object, as returned by a read-public command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKeyDescriptor {
    pub name_alg: ModuleHash,
    pub attributes: ObjectAttributes,
    pub parameters: PublicParameters,
}

impl PublicKeyDescriptor {
    pub fn algorithm(&self) -> KeyAlgorithm {
        match self.parameters {
            PublicParameters::Rsa(_) => KeyAlgorithm::Rsa,
            PublicParameters::Ecc(_) => KeyAlgorithm::Ecc,
            PublicParameters::KeyedHash => KeyAlgorithm::KeyedHash,
            PublicParameters::SymCipher => KeyAlgorithm::SymCipher,
        }
    }

    pub fn rsa(&self) -> Option<&RsaParameters> {
        match &self.parameters {
            PublicParameters::Rsa(params) => Some(params),
            _ => None,
        }
    }
}
