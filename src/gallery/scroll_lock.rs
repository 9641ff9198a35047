/// Something that may suppress background scrolling while it is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockHolder {
    Lightbox,
    MessageDialog,
}

/// Background scroll suppression shared by the lightbox and the message
/// dialog. Scrolling comes back only once neither holds the lock.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScrollLock {
    lightbox: bool,
    dialog: bool,
}

impl ScrollLock {
    pub fn set(&mut self, holder: LockHolder, held: bool) {
        match holder {
            LockHolder::Lightbox => self.lightbox = held,
            LockHolder::MessageDialog => self.dialog = held,
        }
    }

    pub fn is_locked(&self) -> bool {
        self.lightbox || self.dialog
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_released_only_when_both_let_go() {
        let mut lock = ScrollLock::default();
        assert!(!lock.is_locked());

        lock.set(LockHolder::Lightbox, true);
        lock.set(LockHolder::MessageDialog, true);
        lock.set(LockHolder::Lightbox, false);
        assert!(lock.is_locked());

        lock.set(LockHolder::MessageDialog, false);
        assert!(!lock.is_locked());
    }

    #[test]
    fn test_release_is_idempotent() {
        let mut lock = ScrollLock::default();
        lock.set(LockHolder::MessageDialog, false);
        assert!(!lock.is_locked());
        lock.set(LockHolder::Lightbox, true);
        lock.set(LockHolder::Lightbox, true);
        assert!(lock.is_locked());
    }
}
