//! Signing options supplied by callers and the scheme sent to the module

use std::fmt;

use super::{HashAlgorithm, ModuleHash};

/// RSA signature padding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Padding {
    /// RSASSA-PKCS1-v1_5, deterministic
    Pkcs1v15,
    /// RSASSA-PSS, salted by the module
    Pss,
}

impl Padding {
    /// Module scheme identifier
    pub const fn id(self) -> u16 {
        match self {
            Padding::Pkcs1v15 => 0x0014,
            Padding::Pss => 0x0016,
        }
    }
}

impl fmt::Display for Padding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Padding::Pkcs1v15 => f.write_str("RSASSA-PKCS1-v1_5"),
            Padding::Pss => f.write_str("RSASSA-PSS"),
        }
    }
}

/// Signature scheme descriptor handed to the module's sign command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SigScheme {
    pub padding: Padding,
    pub hash: ModuleHash,
}

impl SigScheme {
    /// Salt length the module uses for this scheme with a key of `modulus_bits`
    ///
    /// PSS salts with the digest length, cut down to what the encoded message
    /// leaves room for. `None` for PKCS#1 v1.5, or when the key is too small
    /// to hold a PSS encoding of the digest at all.
    pub const fn pss_salt_len(&self, modulus_bits: usize) -> Option<usize> {
        match self.padding {
            Padding::Pkcs1v15 => None,
            Padding::Pss => {
                let hash_len = self.hash.size();
                let encoded_len = modulus_bits.saturating_sub(1).div_ceil(8);
                if encoded_len < hash_len + 2 {
                    return None;
                }
                let room = encoded_len - hash_len - 2;
                Some(if room < hash_len { room } else { hash_len })
            }
        }
    }
}

impl fmt::Display for SigScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.padding, self.hash)
    }
}

/// Requested PSS salt length
///
/// The module always salts with [`SigScheme::pss_salt_len`]. An explicit
/// request that differs from it is refused before the module is asked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SaltLength {
    /// Whatever the module uses; verifiers detect the length
    #[default]
    Auto,
    /// Exactly the digest length
    EqualsHash,
    Bytes(usize),
}

/// Parameters selecting PSS padding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PssOptions {
    pub hash: HashAlgorithm,
    pub salt_length: SaltLength,
}

impl PssOptions {
    pub fn new(hash: HashAlgorithm) -> Self {
        Self {
            hash,
            salt_length: SaltLength::default(),
        }
    }
}

/// Options accompanying a digest to be signed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignOptions {
    /// PKCS#1 v1.5 over a digest of the given hash
    Hash(HashAlgorithm),
    /// PSS over a digest of the given hash
    Pss(PssOptions),
}

impl SignOptions {
    pub fn hash(&self) -> HashAlgorithm {
        match self {
            SignOptions::Hash(hash) => *hash,
            SignOptions::Pss(pss) => pss.hash,
        }
    }

    pub fn pss(&self) -> Option<&PssOptions> {
        match self {
            SignOptions::Hash(_) => None,
            SignOptions::Pss(pss) => Some(pss),
        }
    }

    pub fn padding(&self) -> Padding {
        if self.pss().is_some() {
            Padding::Pss
        } else {
            Padding::Pkcs1v15
        }
    }
}

impl From<HashAlgorithm> for SignOptions {
    fn from(hash: HashAlgorithm) -> Self {
        SignOptions::Hash(hash)
    }
}

impl From<PssOptions> for SignOptions {
    fn from(pss: PssOptions) -> Self {
        SignOptions::Pss(pss)
    }
}
