//! RSA key held in a secure module, usable as a signing credential

use std::fmt;
use std::sync::Arc;

use rand::RngCore;
use rsa::traits::PublicKeyParts;
use rsa::RsaPublicKey;
use tracing::{debug, info};

use crate::error::{TpmcredError, TpmcredResult};
use crate::logic::select_scheme;
use crate::model::{AuthValue, ModuleHandle, PublicKey, PublicKeyDescriptor, SignOptions};
use crate::ports::{SecureModule, SigningCredential};
use crate::use_cases::read_public_key;

/// RSA private key that stays inside the module
///
/// The public area is read once at construction and cached. If the key at
/// `handle` is replaced, drop this value and build a new one.
pub struct RsaModuleKey<M> {
    module: Arc<M>,
    handle: ModuleHandle,
    descriptor: PublicKeyDescriptor,
    public_key: PublicKey,
    rsa_key: RsaPublicKey,
    auth: AuthValue,
}

impl<M: SecureModule> RsaModuleKey<M> {
    /// Build a credential for the RSA key at `handle`
    ///
    /// # Errors
    ///
    /// Returns errors if:
    /// - The handle does not exist or cannot be read (`ModuleCommunication`)
    /// - The object is not an RSA key (`UnsupportedAlgorithm`)
    pub fn new(module: Arc<M>, handle: ModuleHandle, auth: AuthValue) -> TpmcredResult<Self> {
        let (descriptor, public_key) = read_public_key(module.as_ref(), handle)?;

        let rsa_key = match &public_key {
            PublicKey::Rsa(key) => key.clone(),
            other => {
                return Err(TpmcredError::UnsupportedAlgorithm {
                    algorithm: format!("{} key at handle {}", other.algorithm(), handle),
                })
            }
        };

        info!("Opened RSA credential for handle {}", handle);
        Ok(Self {
            module,
            handle,
            descriptor,
            public_key,
            rsa_key,
            auth,
        })
    }
}

impl<M> RsaModuleKey<M> {
    pub fn handle(&self) -> ModuleHandle {
        self.handle
    }

    /// Public area as read at construction
    pub fn descriptor(&self) -> &PublicKeyDescriptor {
        &self.descriptor
    }

    pub fn rsa_public_key(&self) -> &RsaPublicKey {
        &self.rsa_key
    }

    /// Modulus length in bytes, which is also the signature length
    pub fn size(&self) -> usize {
        self.rsa_key.size()
    }

    pub fn module(&self) -> &Arc<M> {
        &self.module
    }
}

impl<M: SecureModule> SigningCredential for RsaModuleKey<M> {
    fn public(&self) -> &PublicKey {
        &self.public_key
    }

    fn sign(
        &self,
        _rng: Option<&mut dyn RngCore>,
        digest: &[u8],
        opts: &SignOptions,
    ) -> TpmcredResult<Vec<u8>> {
        let scheme = select_scheme(opts, self.rsa_key.n().bits())?;

        debug!(
            "Signing {}-byte digest with handle {} using {}",
            digest.len(),
            self.handle,
            scheme
        );
        let signature = self.module.sign(self.handle, &self.auth, digest, scheme)?;
        Ok(signature)
    }
}

impl<M> Clone for RsaModuleKey<M> {
    fn clone(&self) -> Self {
        Self {
            module: Arc::clone(&self.module),
            handle: self.handle,
            descriptor: self.descriptor.clone(),
            public_key: self.public_key.clone(),
            rsa_key: self.rsa_key.clone(),
            auth: self.auth.clone(),
        }
    }
}

impl<M> fmt::Debug for RsaModuleKey<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RsaModuleKey")
            .field("handle", &self.handle)
            .field("descriptor", &self.descriptor)
            .field("auth", &self.auth)
            .finish_non_exhaustive()
    }
}
