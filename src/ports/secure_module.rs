//! SecureModule trait - the two commands the signing core issues

use crate::error::ModuleResult;
use crate::model::{AuthValue, ModuleHandle, PublicKeyDescriptor, SigScheme};

/// Channel to a secure module holding private keys
///
/// Methods take `&self`. An implementation shared between threads must
/// serialize command/response exchanges itself; if it cannot, callers are
/// responsible for giving each concurrent user its own channel. Nothing in
/// this crate locks around these calls.
///
/// Implementations impose no timeout. A blocked call can only be aborted by
/// closing the underlying transport from outside.
pub trait SecureModule {
    /// Read the public area of `handle`
    ///
    /// # Errors
    ///
    /// Returns errors if:
    /// - The channel fails
    /// - No object exists at `handle`
    /// - The response cannot be decoded
    fn read_public(&self, handle: ModuleHandle) -> ModuleResult<PublicKeyDescriptor>;

    /// Sign a caller-computed digest with the key at `handle`
    ///
    /// # Returns
    ///
    /// The raw signature exactly as the module produced it
    ///
    /// # Errors
    ///
    /// Returns errors if:
    /// - Authorization is rejected or the module is locked out
    /// - The digest length does not match `scheme.hash`
    /// - The object is not a signing key or does not support `scheme`
    /// - The channel fails
    fn sign(
        &self,
        handle: ModuleHandle,
        auth: &AuthValue,
        digest: &[u8],
        scheme: SigScheme,
    ) -> ModuleResult<Vec<u8>>;
}

impl<M: SecureModule + ?Sized> SecureModule for &M {
    fn read_public(&self, handle: ModuleHandle) -> ModuleResult<PublicKeyDescriptor> {
        (**self).read_public(handle)
    }

    fn sign(
        &self,
        handle: ModuleHandle,
        auth: &AuthValue,
        digest: &[u8],
        scheme: SigScheme,
    ) -> ModuleResult<Vec<u8>> {
        (**self).sign(handle, auth, digest, scheme)
    }
}
