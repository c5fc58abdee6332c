//! Digest algorithms as named by callers, and the subset the module can sign with

use std::fmt;

/// Hash algorithm a caller computed its digest with
///
/// This covers every digest a generic signing caller may name, not only
/// those the module accepts. See [`ModuleHash::from_hash`] for the mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    Md4,
    Md5,
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
    Md5Sha1,
    Ripemd160,
    Sha3_224,
    Sha3_256,
    Sha3_384,
    Sha3_512,
    Sha512_224,
    Sha512_256,
    Blake2s256,
    Blake2b256,
    Blake2b384,
    Blake2b512,
}

impl HashAlgorithm {
    pub const ALL: [HashAlgorithm; 19] = [
        HashAlgorithm::Md4,
        HashAlgorithm::Md5,
        HashAlgorithm::Sha1,
        HashAlgorithm::Sha224,
        HashAlgorithm::Sha256,
        HashAlgorithm::Sha384,
        HashAlgorithm::Sha512,
        HashAlgorithm::Md5Sha1,
        HashAlgorithm::Ripemd160,
        HashAlgorithm::Sha3_224,
        HashAlgorithm::Sha3_256,
        HashAlgorithm::Sha3_384,
        HashAlgorithm::Sha3_512,
        HashAlgorithm::Sha512_224,
        HashAlgorithm::Sha512_256,
        HashAlgorithm::Blake2s256,
        HashAlgorithm::Blake2b256,
        HashAlgorithm::Blake2b384,
        HashAlgorithm::Blake2b512,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            HashAlgorithm::Md4 => "MD4",
            HashAlgorithm::Md5 => "MD5",
            HashAlgorithm::Sha1 => "SHA-1",
            HashAlgorithm::Sha224 => "SHA-224",
            HashAlgorithm::Sha256 => "SHA-256",
            HashAlgorithm::Sha384 => "SHA-384",
            HashAlgorithm::Sha512 => "SHA-512",
            HashAlgorithm::Md5Sha1 => "MD5+SHA1",
            HashAlgorithm::Ripemd160 => "RIPEMD-160",
            HashAlgorithm::Sha3_224 => "SHA3-224",
            HashAlgorithm::Sha3_256 => "SHA3-256",
            HashAlgorithm::Sha3_384 => "SHA3-384",
            HashAlgorithm::Sha3_512 => "SHA3-512",
            HashAlgorithm::Sha512_224 => "SHA-512/224",
            HashAlgorithm::Sha512_256 => "SHA-512/256",
            HashAlgorithm::Blake2s256 => "BLAKE2s-256",
            HashAlgorithm::Blake2b256 => "BLAKE2b-256",
            HashAlgorithm::Blake2b384 => "BLAKE2b-384",
            HashAlgorithm::Blake2b512 => "BLAKE2b-512",
        }
    }

    /// Digest length in bytes
    pub const fn size(self) -> usize {
        match self {
            HashAlgorithm::Md4 | HashAlgorithm::Md5 => 16,
            HashAlgorithm::Sha1 | HashAlgorithm::Ripemd160 => 20,
            HashAlgorithm::Sha224 | HashAlgorithm::Sha3_224 | HashAlgorithm::Sha512_224 => 28,
            HashAlgorithm::Sha256
            | HashAlgorithm::Sha3_256
            | HashAlgorithm::Sha512_256
            | HashAlgorithm::Blake2s256
            | HashAlgorithm::Blake2b256 => 32,
            HashAlgorithm::Md5Sha1 => 36,
            HashAlgorithm::Sha384 | HashAlgorithm::Sha3_384 | HashAlgorithm::Blake2b384 => 48,
            HashAlgorithm::Sha512 | HashAlgorithm::Sha3_512 | HashAlgorithm::Blake2b512 => 64,
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Hash algorithm as the module identifies it in a signing scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModuleHash {
    Sha1,
    Sha256,
    Sha384,
    Sha512,
}

impl ModuleHash {
    /// Map a caller hash onto the module's hash constant.
    ///
    /// Every variant is listed: adding a `HashAlgorithm` does not compile
    /// until it is placed on one side of this table.
    pub const fn from_hash(hash: HashAlgorithm) -> Option<Self> {
        match hash {
            HashAlgorithm::Sha1 => Some(ModuleHash::Sha1),
            HashAlgorithm::Sha256 => Some(ModuleHash::Sha256),
            HashAlgorithm::Sha384 => Some(ModuleHash::Sha384),
            HashAlgorithm::Sha512 => Some(ModuleHash::Sha512),
            HashAlgorithm::Md4
            | HashAlgorithm::Md5
            | HashAlgorithm::Sha224
            | HashAlgorithm::Md5Sha1
            | HashAlgorithm::Ripemd160
            | HashAlgorithm::Sha3_224
            | HashAlgorithm::Sha3_256
            | HashAlgorithm::Sha3_384
            | HashAlgorithm::Sha3_512
            | HashAlgorithm::Sha512_224
            | HashAlgorithm::Sha512_256
            | HashAlgorithm::Blake2s256
            | HashAlgorithm::Blake2b256
            | HashAlgorithm::Blake2b384
            | HashAlgorithm::Blake2b512 => None,
        }
    }

    pub const fn to_hash(self) -> HashAlgorithm {
        match self {
            ModuleHash::Sha1 => HashAlgorithm::Sha1,
            ModuleHash::Sha256 => HashAlgorithm::Sha256,
            ModuleHash::Sha384 => HashAlgorithm::Sha384,
            ModuleHash::Sha512 => HashAlgorithm::Sha512,
        }
    }

    /// Module algorithm identifier
    pub const fn id(self) -> u16 {
        match self {
            ModuleHash::Sha1 => 0x0004,
            ModuleHash::Sha256 => 0x000B,
            ModuleHash::Sha384 => 0x000C,
            ModuleHash::Sha512 => 0x000D,
        }
    }

    pub const fn size(self) -> usize {
        self.to_hash().size()
    }
}

impl fmt::Display for ModuleHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_hash().name())
    }
}
