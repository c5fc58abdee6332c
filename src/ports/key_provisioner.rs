//! KeyProvisioner trait - capability to create and remove module keys

use crate::error::ModuleResult;
use crate::model::{AuthValue, EccCurve, ModuleHandle, ModuleHash, ObjectAttributes, PublicKeyDescriptor};

/// Key parameters for a new module object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateAlgorithm {
    /// `exponent` zero selects 65537
    Rsa { key_bits: u16, exponent: u32 },
    Ecc { curve: EccCurve },
    KeyedHash,
}

/// Template for key creation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyTemplate {
    pub algorithm: TemplateAlgorithm,
    /// Algorithm used to compute the object's name
    pub name_alg: ModuleHash,
    pub attributes: ObjectAttributes,
}

impl KeyTemplate {
    pub fn rsa(key_bits: u16) -> Self {
        Self {
            algorithm: TemplateAlgorithm::Rsa {
                key_bits,
                exponent: 0,
            },
            ..Self::default()
        }
    }

    pub fn ecc(curve: EccCurve) -> Self {
        Self {
            algorithm: TemplateAlgorithm::Ecc { curve },
            ..Self::default()
        }
    }

    pub fn keyed_hash() -> Self {
        Self {
            algorithm: TemplateAlgorithm::KeyedHash,
            ..Self::default()
        }
    }
}

impl Default for KeyTemplate {
    fn default() -> Self {
        Self {
            algorithm: TemplateAlgorithm::Rsa {
                key_bits: 2048,
                exponent: 0,
            },
            name_alg: ModuleHash::Sha256,
            attributes: ObjectAttributes::signing_key(),
        }
    }
}

/// Capability to provision keys inside the module
///
/// Hardware modules are usually provisioned out of band. The signing core
/// never calls this trait; it exists for tooling and test setups.
pub trait KeyProvisioner {
    /// Create a primary key from `template` and persist it at `handle`
    ///
    /// # Returns
    ///
    /// The public area of the created object
    ///
    /// # Errors
    ///
    /// Returns errors if:
    /// - `handle` is already occupied
    /// - The template parameters are not supported
    fn create_primary(
        &self,
        handle: ModuleHandle,
        auth: &AuthValue,
        template: &KeyTemplate,
    ) -> ModuleResult<PublicKeyDescriptor>;

    /// Remove the object at `handle`
    fn evict(&self, handle: ModuleHandle) -> ModuleResult<()>;
}
