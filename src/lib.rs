//! Use RSA keys held inside a TPM-style secure module as signing credentials
//!
//! The private key never leaves the module. [`RsaModuleKey`] reads the
//! public half once, then forwards each digest to the module's sign command
//! with the scheme selected from the caller's options. Adapters make the
//! credential usable as a `rustls` private key and as an `x509-cert`
//! certificate signer.

pub mod adapters;
pub mod api;
pub mod credential;
pub mod error;
mod logic;
pub mod model;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use credential::RsaModuleKey;
pub use error::{ModuleError, ModuleResult, TpmcredError, TpmcredResult};
pub use ports::{KeyProvisioner, KeyTemplate, SecureModule, SigningCredential};

// Re-export public API
pub use api::{new_signing_credential, read_public_key};
pub use logic::{public_key_from_descriptor, select_scheme};
