//! Use cases (orchestration)
//!
//! Each use case drives one or more ports to complete a caller-level task.

mod issue_certificate;
mod provision_key;
mod read_public_key;

pub use issue_certificate::{issue_ca_certificate, issue_leaf_certificate, LeafRequest};
pub use provision_key::provision_rsa_key;
pub use read_public_key::read_public_key;
