//! Domain types for secure-module signing
//!
//! These wrap module identifiers and key material so that invariants are
//! enforced at construction and secrets never leak through `Debug`.

mod algorithm;
mod auth;
mod handle;
mod hash;
mod public_area;
mod public_key;
mod scheme;

pub use algorithm::{AlgorithmError, EccCurve, KeyAlgorithm};
pub use auth::{AuthError, AuthValue};
pub use handle::{HandleError, ModuleHandle};
pub use hash::{HashAlgorithm, ModuleHash};
pub use public_area::{
    EccParameters, ObjectAttributes, PublicKeyDescriptor, PublicParameters, RsaParameters,
};
pub use public_key::{PublicKey, PublicKeyError};
pub use scheme::{Padding, PssOptions, SaltLength, SigScheme, SignOptions};
