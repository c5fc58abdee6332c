//! Error types for tpmcred
//!
//! Errors the crate raises itself (unsupported algorithm family, hash or salt
//! length) are distinct variants. Everything the module or its channel reports
//! travels inside [`TpmcredError::ModuleCommunication`] unchanged.

use thiserror::Error;

use crate::model::{HashAlgorithm, ModuleHandle, SigScheme};

/// Result type alias for tpmcred operations
pub type TpmcredResult<T> = Result<T, TpmcredError>;

/// Result type alias for secure module commands
pub type ModuleResult<T> = Result<T, ModuleError>;

/// Top-level error type for all tpmcred operations
#[derive(Error, Debug)]
pub enum TpmcredError {
    /// The object's key algorithm cannot be used here
    #[error("unsupported algorithm: {algorithm}")]
    UnsupportedAlgorithm { algorithm: String },

    /// No module-side mapping exists for the caller's digest algorithm
    #[error("unsupported hash algorithm: {hash}")]
    UnsupportedHashAlgorithm { hash: HashAlgorithm },

    /// The module cannot salt a PSS signature with the requested length
    #[error("PSS salt length of {requested} bytes not available for {scheme} with a {key_bits}-bit key")]
    UnsupportedSaltLength {
        requested: usize,
        scheme: SigScheme,
        key_bits: usize,
    },

    /// The module or the channel to it failed
    #[error("secure module error: {0}")]
    ModuleCommunication(#[from] ModuleError),

    /// Domain validation errors
    #[error("domain validation error: {0}")]
    Domain(#[from] DomainError),

    /// Certificate construction failed
    #[error("certificate error: {reason}")]
    Certificate { reason: String },

    /// TLS configuration failed
    #[error("TLS error: {0}")]
    Tls(#[from] rustls::Error),
}

/// Failures reported by a secure module command
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModuleError {
    /// The transport to the module failed
    #[error("channel failure: {reason}")]
    Channel { reason: String },

    #[error("handle {handle} not found")]
    HandleNotFound { handle: ModuleHandle },

    #[error("handle {handle} is already in use")]
    HandleInUse { handle: ModuleHandle },

    #[error("authorization failed for handle {handle}")]
    AuthFailure { handle: ModuleHandle },

    /// Too many authorization failures; the module refuses authorized commands
    #[error("module is in dictionary-attack lockout")]
    Lockout,

    #[error("object attributes of handle {handle} do not permit {operation}")]
    Attributes {
        handle: ModuleHandle,
        operation: String,
    },

    #[error("digest size mismatch: expected {expected} bytes, got {actual}")]
    DigestSize { expected: usize, actual: usize },

    #[error("scheme not supported: {reason}")]
    Scheme { reason: String },

    #[error("invalid key parameters: {reason}")]
    Parameters { reason: String },

    #[error("malformed response: {reason}")]
    MalformedResponse { reason: String },

    #[error("command failed: {reason}")]
    CommandFailed { reason: String },
}

/// Domain validation errors
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Handle error: {0}")]
    Handle(#[from] crate::model::HandleError),

    #[error("Algorithm error: {0}")]
    Algorithm(#[from] crate::model::AlgorithmError),

    #[error("Authorization value error: {0}")]
    Auth(#[from] crate::model::AuthError),

    #[error("Public key error: {0}")]
    PublicKey(#[from] crate::model::PublicKeyError),
}

impl From<crate::model::HandleError> for TpmcredError {
    fn from(err: crate::model::HandleError) -> Self {
        TpmcredError::Domain(DomainError::Handle(err))
    }
}

impl From<crate::model::AlgorithmError> for TpmcredError {
    fn from(err: crate::model::AlgorithmError) -> Self {
        TpmcredError::Domain(DomainError::Algorithm(err))
    }
}

impl From<crate::model::AuthError> for TpmcredError {
    fn from(err: crate::model::AuthError) -> Self {
        TpmcredError::Domain(DomainError::Auth(err))
    }
}

impl From<crate::model::PublicKeyError> for TpmcredError {
    fn from(err: crate::model::PublicKeyError) -> Self {
        TpmcredError::Domain(DomainError::PublicKey(err))
    }
}

/// Convert certificate builder errors
impl From<x509_cert::builder::Error> for TpmcredError {
    fn from(err: x509_cert::builder::Error) -> Self {
        TpmcredError::Certificate {
            reason: err.to_string(),
        }
    }
}

/// Convert DER encoding errors
impl From<x509_cert::der::Error> for TpmcredError {
    fn from(err: x509_cert::der::Error) -> Self {
        TpmcredError::Certificate {
            reason: format!("DER: {}", err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_hash_names_algorithm() {
        let err = TpmcredError::UnsupportedHashAlgorithm {
            hash: HashAlgorithm::Sha3_256,
        };
        assert_eq!(err.to_string(), "unsupported hash algorithm: SHA3-256");
    }

    #[test]
    fn test_module_error_conversion() {
        let module_err = ModuleError::HandleNotFound {
            handle: ModuleHandle::new(0x8100_0000),
        };
        let err: TpmcredError = module_err.clone().into();
        assert!(matches!(
            err,
            TpmcredError::ModuleCommunication(ref inner) if *inner == module_err
        ));
        assert!(err.to_string().contains("0x81000000"));
    }

    #[test]
    fn test_handle_error_conversion() {
        let err: TpmcredError = crate::model::HandleError::NotPersistent { handle: 1 }.into();
        assert!(matches!(err, TpmcredError::Domain(DomainError::Handle(_))));
    }

    #[test]
    fn test_result_type_alias() {
        let result: TpmcredResult<i32> = Ok(42);
        assert_eq!(result.unwrap(), 42);

        let result: ModuleResult<i32> = Err(ModuleError::Lockout);
        assert!(result.is_err());
    }
}
