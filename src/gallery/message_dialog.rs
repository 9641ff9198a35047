/// Open/closed state of the floating-action-button message dialog.
#[derive(Debug, Default)]
pub struct MessageDialog {
    open: bool,
}

impl MessageDialog {
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Returns true if the state changed.
    pub fn open(&mut self) -> bool {
        !std::mem::replace(&mut self.open, true)
    }

    /// Returns true if the state changed.
    pub fn close(&mut self) -> bool {
        std::mem::replace(&mut self.open, false)
    }

    /// Flip the state, returning the new one.
    pub fn toggle(&mut self) -> bool {
        if self.open {
            self.close();
        } else {
            self.open();
        }
        self.open
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transitions() {
        let mut dialog = MessageDialog::default();
        assert!(!dialog.close());
        assert!(dialog.open());
        assert!(!dialog.open());
        assert!(dialog.is_open());
        assert!(!dialog.toggle());
        assert!(dialog.toggle());
        assert!(dialog.close());
        assert!(!dialog.is_open());
    }
}
