//! Adapters - concrete implementations of ports (traits) and bridges to
//! the TLS and certificate libraries

mod rustls_key;
mod software_module;
mod x509_signer;

#[cfg(test)]
pub mod recording_module;

pub use rustls_key::{
    certified_key, client_config, server_config, RustlsSigningKey, StaticCertResolver,
};
pub use software_module::{SoftwareModule, SoftwareModuleConfig};
pub use x509_signer::ModuleCertSigner;
