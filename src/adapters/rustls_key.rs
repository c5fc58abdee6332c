//! rustls adapter: a module-backed RSA credential as a TLS private key
//!
//! rustls hands the signer the whole handshake message. The signer hashes it
//! with the negotiated scheme's digest and passes only the digest to the
//! credential, so the private key never leaves the module.

use std::fmt;
use std::sync::Arc;

use rustls::client::ResolvesClientCert;
use rustls::pki_types::CertificateDer;
use rustls::server::{ClientHello, ResolvesServerCert, WebPkiClientVerifier};
use rustls::sign::{CertifiedKey, Signer, SigningKey};
use rsa::traits::PublicKeyParts;
use rustls::{ClientConfig, RootCertStore, ServerConfig, SignatureAlgorithm, SignatureScheme};
use sha2::{Digest, Sha256, Sha384, Sha512};
use tracing::debug;

use crate::error::{TpmcredError, TpmcredResult};
use crate::model::{
    HashAlgorithm, ModuleHash, Padding, PssOptions, PublicKey, SaltLength, SigScheme, SignOptions,
};
use crate::ports::SigningCredential;

/// Schemes offered to the peer, most preferred first
const PREFERRED_SCHEMES: [SignatureScheme; 6] = [
    SignatureScheme::RSA_PSS_SHA512,
    SignatureScheme::RSA_PSS_SHA384,
    SignatureScheme::RSA_PSS_SHA256,
    SignatureScheme::RSA_PKCS1_SHA512,
    SignatureScheme::RSA_PKCS1_SHA384,
    SignatureScheme::RSA_PKCS1_SHA256,
];

/// An RSA [`SigningCredential`] usable wherever rustls wants a private key
pub struct RustlsSigningKey<C> {
    credential: Arc<C>,
    key_bits: usize,
}

impl<C: SigningCredential> RustlsSigningKey<C> {
    /// # Errors
    ///
    /// Returns `TpmcredError::UnsupportedAlgorithm` unless the credential holds an RSA key
    pub fn new(credential: Arc<C>) -> TpmcredResult<Self> {
        let key_bits = match credential.public() {
            PublicKey::Rsa(key) => key.n().bits(),
            other => {
                return Err(TpmcredError::UnsupportedAlgorithm {
                    algorithm: format!("{} key for TLS", other.algorithm()),
                })
            }
        };
        Ok(Self {
            credential,
            key_bits,
        })
    }

    /// TLS only accepts PSS salted with the full digest length
    fn supports(&self, scheme: SignatureScheme) -> bool {
        let hash = match scheme {
            SignatureScheme::RSA_PSS_SHA512 => ModuleHash::Sha512,
            SignatureScheme::RSA_PSS_SHA384 => ModuleHash::Sha384,
            SignatureScheme::RSA_PSS_SHA256 => ModuleHash::Sha256,
            _ => return true,
        };
        let pss = SigScheme {
            padding: Padding::Pss,
            hash,
        };
        pss.pss_salt_len(self.key_bits) == Some(hash.size())
    }
}

fn tls_pss(hash: HashAlgorithm) -> SignOptions {
    SignOptions::Pss(PssOptions {
        hash,
        salt_length: SaltLength::EqualsHash,
    })
}

impl<C> fmt::Debug for RustlsSigningKey<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RustlsSigningKey").finish_non_exhaustive()
    }
}

impl<C> SigningKey for RustlsSigningKey<C>
where
    C: SigningCredential + Send + Sync + 'static,
{
    fn choose_scheme(&self, offered: &[SignatureScheme]) -> Option<Box<dyn Signer>> {
        let scheme = PREFERRED_SCHEMES
            .iter()
            .copied()
            .find(|scheme| offered.contains(scheme) && self.supports(*scheme))?;

        debug!("Negotiated TLS signature scheme {:?}", scheme);
        Some(Box::new(ModuleSigner {
            credential: Arc::clone(&self.credential),
            scheme,
        }))
    }

    fn algorithm(&self) -> SignatureAlgorithm {
        SignatureAlgorithm::RSA
    }
}

struct ModuleSigner<C> {
    credential: Arc<C>,
    scheme: SignatureScheme,
}

impl<C> fmt::Debug for ModuleSigner<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleSigner")
            .field("scheme", &self.scheme)
            .finish_non_exhaustive()
    }
}

impl<C> Signer for ModuleSigner<C>
where
    C: SigningCredential + Send + Sync + 'static,
{
    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, rustls::Error> {
        let (digest, opts) = match self.scheme {
            SignatureScheme::RSA_PSS_SHA512 => (
                Sha512::digest(message).to_vec(),
                tls_pss(HashAlgorithm::Sha512),
            ),
            SignatureScheme::RSA_PSS_SHA384 => (
                Sha384::digest(message).to_vec(),
                tls_pss(HashAlgorithm::Sha384),
            ),
            SignatureScheme::RSA_PSS_SHA256 => (
                Sha256::digest(message).to_vec(),
                tls_pss(HashAlgorithm::Sha256),
            ),
            SignatureScheme::RSA_PKCS1_SHA512 => (
                Sha512::digest(message).to_vec(),
                SignOptions::Hash(HashAlgorithm::Sha512),
            ),
            SignatureScheme::RSA_PKCS1_SHA384 => (
                Sha384::digest(message).to_vec(),
                SignOptions::Hash(HashAlgorithm::Sha384),
            ),
            SignatureScheme::RSA_PKCS1_SHA256 => (
                Sha256::digest(message).to_vec(),
                SignOptions::Hash(HashAlgorithm::Sha256),
            ),
            other => {
                return Err(rustls::Error::General(format!(
                    "signature scheme {:?} not supported by module key",
                    other
                )))
            }
        };

        self.credential
            .sign(None, &digest, &opts)
            .map_err(|e| rustls::Error::General(format!("module signing failed: {}", e)))
    }

    fn scheme(&self) -> SignatureScheme {
        self.scheme
    }
}

/// Pair a certificate chain with a module-backed credential
///
/// # Errors
///
/// Returns `TpmcredError::UnsupportedAlgorithm` for non-RSA credentials
pub fn certified_key<C>(
    chain: Vec<CertificateDer<'static>>,
    credential: Arc<C>,
) -> TpmcredResult<Arc<CertifiedKey>>
where
    C: SigningCredential + Send + Sync + 'static,
{
    let key = RustlsSigningKey::new(credential)?;
    Ok(Arc::new(CertifiedKey::new(chain, Arc::new(key))))
}

/// Resolves one fixed certified key, on either side of a connection
#[derive(Debug, Clone)]
pub struct StaticCertResolver {
    key: Arc<CertifiedKey>,
}

impl StaticCertResolver {
    pub fn new(key: Arc<CertifiedKey>) -> Self {
        Self { key }
    }
}

impl ResolvesServerCert for StaticCertResolver {
    fn resolve(&self, _client_hello: ClientHello<'_>) -> Option<Arc<CertifiedKey>> {
        Some(Arc::clone(&self.key))
    }
}

impl ResolvesClientCert for StaticCertResolver {
    fn resolve(
        &self,
        _root_hint_subjects: &[&[u8]],
        _sigschemes: &[SignatureScheme],
    ) -> Option<Arc<CertifiedKey>> {
        Some(Arc::clone(&self.key))
    }

    fn has_certs(&self) -> bool {
        true
    }
}

fn root_store(ca_certificate: CertificateDer<'static>) -> TpmcredResult<RootCertStore> {
    let mut roots = RootCertStore::empty();
    roots.add(ca_certificate)?;
    Ok(roots)
}

/// Server configuration that presents `key` and requires client certificates
/// issued by `ca_certificate`
pub fn server_config(
    ca_certificate: CertificateDer<'static>,
    key: Arc<CertifiedKey>,
) -> TpmcredResult<ServerConfig> {
    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let roots = Arc::new(root_store(ca_certificate)?);
    let verifier = WebPkiClientVerifier::builder_with_provider(roots, Arc::clone(&provider))
        .build()
        .map_err(|e| TpmcredError::Tls(rustls::Error::General(e.to_string())))?;

    let config = ServerConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()?
        .with_client_cert_verifier(verifier)
        .with_cert_resolver(Arc::new(StaticCertResolver::new(key)));
    Ok(config)
}

/// Client configuration that trusts `ca_certificate` and authenticates with `key`
pub fn client_config(
    ca_certificate: CertificateDer<'static>,
    key: Arc<CertifiedKey>,
) -> TpmcredResult<ClientConfig> {
    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let config = ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()?
        .with_root_certificates(root_store(ca_certificate)?)
        .with_client_cert_resolver(Arc::new(StaticCertResolver::new(key)));
    Ok(config)
}
