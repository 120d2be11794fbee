//! Write-once cell.

use std::cell::OnceCell;

/// A value that may be initialized outside a constructor, but once set must
/// never be set again — a lazy `readonly`.
#[derive(Debug, Default)]
pub struct WriteOnce<T> {
    slot: OnceCell<T>,
}

impl<T> WriteOnce<T> {
    pub fn new() -> Self {
        Self {
            slot: OnceCell::new(),
        }
    }

    /// Set the value. Returns the rejected value when one is already set.
    pub fn set(&self, value: T) -> Result<(), T> {
        self.slot.set(value)
    }

    /// The value, if one has been set.
    pub fn value(&self) -> Option<&T> {
        self.slot.get()
    }

    pub fn has_value(&self) -> bool {
        self.slot.get().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_write_is_rejected() {
        let cell = WriteOnce::new();
        assert!(!cell.has_value());
        assert_eq!(cell.set(1), Ok(()));
        assert_eq!(cell.set(2), Err(2));
        assert_eq!(cell.value(), Some(&1));
    }
}
