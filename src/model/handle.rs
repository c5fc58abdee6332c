use std::fmt;
use thiserror::Error;

/// Reference to an object resident inside the secure module.
///
/// The handle is borrowed: its lifetime is governed by the module's
/// persistence policy, not by anything in this crate.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleHandle(u32);

impl ModuleHandle {
    pub const PERSISTENT_FIRST: u32 = 0x8100_0000;

    pub const PERSISTENT_LAST: u32 = 0x81FF_FFFF;

    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Create a handle that must fall in the persistent object range
    pub fn persistent(raw: u32) -> Result<Self, HandleError> {
        let handle = Self(raw);
        if !handle.is_persistent() {
            return Err(HandleError::NotPersistent { handle: raw });
        }
        Ok(handle)
    }

    pub const fn value(self) -> u32 {
        self.0
    }

    pub fn is_persistent(self) -> bool {
        (Self::PERSISTENT_FIRST..=Self::PERSISTENT_LAST).contains(&self.0)
    }
}

impl fmt::Debug for ModuleHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ModuleHandle({:#010x})", self.0)
    }
}

impl fmt::Display for ModuleHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

impl From<u32> for ModuleHandle {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandleError {
    #[error("Handle {handle:#010x} is outside the persistent range")]
    NotPersistent { handle: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persistent_range() {
        assert!(ModuleHandle::persistent(0x8100_0000).is_ok());
        assert!(ModuleHandle::persistent(0x81FF_FFFF).is_ok());
        assert_eq!(
            ModuleHandle::persistent(0x8000_0001).unwrap_err(),
            HandleError::NotPersistent {
                handle: 0x8000_0001
            }
        );
    }

    #[test]
    fn test_transient_handle_is_not_persistent() {
        assert!(!ModuleHandle::new(0x8000_0000).is_persistent());
    }

    #[test]
    fn test_handle_display() {
        let handle = ModuleHandle::new(0x8100_0001);
        assert_eq!(handle.to_string(), "0x81000001");
        assert_eq!(format!("{:?}", handle), "ModuleHandle(0x81000001)");
    }
}
