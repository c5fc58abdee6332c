//! X.509 adapter: sign certificates with a module-backed RSA credential
//!
//! [`ModuleCertSigner`] provides the key pair, signer and algorithm
//! identifier traits `x509-cert`'s builder asks of a signing key. It signs
//! with sha256WithRSAEncryption.

use std::fmt;
use std::sync::Arc;

use rsa::pkcs1v15::{Signature, VerifyingKey};
use sha2::{Digest, Sha256};
use signature::{Keypair, Signer};
use tracing::debug;
use x509_cert::der::asn1::{AnyRef, ObjectIdentifier};
use x509_cert::spki::{AlgorithmIdentifierRef, SignatureAlgorithmIdentifier};

use crate::error::{TpmcredError, TpmcredResult};
use crate::model::{HashAlgorithm, PublicKey, SignOptions};
use crate::ports::SigningCredential;

/// sha256WithRSAEncryption
const SHA_256_WITH_RSA_ENCRYPTION: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.11");

/// Certificate signer whose private key lives in the module
pub struct ModuleCertSigner<C> {
    credential: Arc<C>,
    verifying_key: VerifyingKey<Sha256>,
}

impl<C: SigningCredential> ModuleCertSigner<C> {
    /// # Errors
    ///
    /// Returns `TpmcredError::UnsupportedAlgorithm` unless the credential holds an RSA key
    pub fn new(credential: Arc<C>) -> TpmcredResult<Self> {
        let verifying_key = match credential.public() {
            PublicKey::Rsa(key) => VerifyingKey::<Sha256>::new(key.clone()),
            other => {
                return Err(TpmcredError::UnsupportedAlgorithm {
                    algorithm: format!("{} key for certificate signing", other.algorithm()),
                })
            }
        };
        Ok(Self {
            credential,
            verifying_key,
        })
    }

    pub fn credential(&self) -> &Arc<C> {
        &self.credential
    }
}

impl<C> fmt::Debug for ModuleCertSigner<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleCertSigner").finish_non_exhaustive()
    }
}

impl<C> Keypair for ModuleCertSigner<C> {
    type VerifyingKey = VerifyingKey<Sha256>;

    fn verifying_key(&self) -> Self::VerifyingKey {
        self.verifying_key.clone()
    }
}

impl<C: SigningCredential> Signer<Signature> for ModuleCertSigner<C> {
    fn try_sign(&self, msg: &[u8]) -> Result<Signature, signature::Error> {
        let digest = Sha256::digest(msg);
        debug!("Signing {}-byte certificate body", msg.len());

        let bytes = self
            .credential
            .sign(None, &digest, &SignOptions::Hash(HashAlgorithm::Sha256))
            .map_err(signature::Error::from_source)?;
        Signature::try_from(bytes.as_slice())
    }
}

impl<C> SignatureAlgorithmIdentifier for ModuleCertSigner<C> {
    type Params = AnyRef<'static>;

    const SIGNATURE_ALGORITHM_IDENTIFIER: AlgorithmIdentifierRef<'static> =
        AlgorithmIdentifierRef {
            oid: SHA_256_WITH_RSA_ENCRYPTION,
            parameters: Some(AnyRef::NULL),
        };
}
