//! Entry points for callers holding an open module channel

use std::sync::Arc;

use crate::credential::RsaModuleKey;
use crate::error::TpmcredResult;
use crate::ports::SecureModule;
use crate::use_cases::read_public_key as read_public_key_use_case;

pub use crate::model::*;

/// Read and reconstruct the public key stored at `handle`
pub fn read_public_key<M>(
    module: &M,
    handle: ModuleHandle,
) -> TpmcredResult<(PublicKeyDescriptor, PublicKey)>
where
    M: SecureModule + ?Sized,
{
    read_public_key_use_case(module, handle)
}

/// Open a signing credential for the RSA key at `handle`
///
/// `auth` is the object's authorization value; pass [`AuthValue::empty`]
/// for objects without one.
pub fn new_signing_credential<M>(
    module: Arc<M>,
    handle: ModuleHandle,
    auth: AuthValue,
) -> TpmcredResult<RsaModuleKey<M>>
where
    M: SecureModule,
{
    RsaModuleKey::new(module, handle, auth)
}
