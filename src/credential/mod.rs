//! Signing credentials backed by module keys
//!
//! One type per key algorithm family, each implementing
//! [`SigningCredential`](crate::ports::SigningCredential).

mod rsa_module_key;

pub use rsa_module_key::RsaModuleKey;
