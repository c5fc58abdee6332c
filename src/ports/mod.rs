//! Ports (traits) at the boundary of the signing core
//!
//! The core depends on these abstractions, not on a concrete module driver.
//! `SecureModule` is the outbound contract the core needs from a driver,
//! `SigningCredential` the inbound contract generic signing code consumes.

mod credential;
mod key_provisioner;
mod secure_module;


pub use credential::SigningCredential;
pub use key_provisioner::{KeyProvisioner, KeyTemplate, TemplateAlgorithm};
pub use secure_module::SecureModule;
