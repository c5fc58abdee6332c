//! Pure translation between module data and standard crypto types

mod public_key;
mod scheme;

pub use public_key::public_key_from_descriptor;
pub use scheme::select_scheme;
