//! SigningCredential trait - a private key that never leaves the module

use rand::RngCore;

use crate::error::TpmcredResult;
use crate::model::{PublicKey, SignOptions};

/// Capability to stand in for a private key in generic signing code
///
/// Each key algorithm family gets its own implementing type. Implementations
/// are immutable after construction, so `public` may run concurrently with
/// `sign` without locking.
pub trait SigningCredential {
    /// The public half, fixed when the credential was built
    fn public(&self) -> &PublicKey;

    /// Sign a digest the caller already computed
    ///
    /// # Arguments
    ///
    /// * `rng` - Accepted for compatibility with generic signing interfaces
    ///   and ignored. The module salts probabilistic schemes from its own
    ///   randomness, so passing `None` or a deterministic generator changes
    ///   nothing.
    /// * `digest` - Hash of the message, computed with `opts.hash()`
    /// * `opts` - Digest algorithm, and PSS parameters when PSS is wanted
    ///
    /// # Errors
    ///
    /// Returns errors if:
    /// - The hash algorithm has no module mapping (no command is sent)
    /// - An explicit PSS salt length is one the module would not use for
    ///   this key (no command is sent)
    /// - The module rejects or fails the sign command
    fn sign(
        &self,
        rng: Option<&mut dyn RngCore>,
        digest: &[u8],
        opts: &SignOptions,
    ) -> TpmcredResult<Vec<u8>>;
}
