//! Read public key use case
//!
//! Fetches the public area of a module object and turns it into a public
//! key generic crypto code understands.

use tracing::debug;

use crate::error::TpmcredResult;
use crate::logic::public_key_from_descriptor;
use crate::model::{ModuleHandle, PublicKey, PublicKeyDescriptor};
use crate::ports::SecureModule;

/// Read the public half of the key at `handle`
///
/// Issues exactly one read-public command and has no other side effect.
///
/// # Returns
///
/// The module's descriptor together with the reconstructed public key
///
/// # Errors
///
/// Returns errors if:
/// - The module or the channel fails (`ModuleCommunication`)
/// - The object's algorithm has no standard public key form (`UnsupportedAlgorithm`)
pub fn read_public_key<M>(
    module: &M,
    handle: ModuleHandle,
) -> TpmcredResult<(PublicKeyDescriptor, PublicKey)>
where
    M: SecureModule + ?Sized,
{
    let descriptor = module.read_public(handle)?;
    debug!(
        "Read {} public area for handle {}",
        descriptor.algorithm(),
        handle
    );

    let public_key = public_key_from_descriptor(&descriptor)?;
    Ok((descriptor, public_key))
}
