use std::fmt;
use subtle::ConstantTimeEq;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Authorization value the module requires to use an object.
///
/// An empty value means the object carries no secret.
#[derive(Clone, Default, Zeroize, ZeroizeOnDrop)]
pub struct AuthValue(Vec<u8>);

impl AuthValue {
    /// Largest value a SHA-512 name algorithm admits
    pub const MAX_LENGTH: usize = 64;

    pub fn new(value: Vec<u8>) -> Result<Self, AuthError> {
        if value.len() > Self::MAX_LENGTH {
            return Err(AuthError::TooLong {
                actual: value.len(),
            });
        }
        Ok(Self(value))
    }

    pub fn from_str(value: &str) -> Result<Self, AuthError> {
        Self::new(value.as_bytes().to_vec())
    }

    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Constant-time comparison
    pub fn matches(&self, other: &AuthValue) -> bool {
        self.0.ct_eq(&other.0).into()
    }
}

impl fmt::Debug for AuthValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AuthValue([REDACTED])")
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    #[error("Authorization value must be at most {max} bytes, got {actual}", max = AuthValue::MAX_LENGTH)]
    TooLong { actual: usize },
}
