//! Lightbox open/close state and wraparound navigation.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Prev,
    Next,
}

impl Direction {
    pub fn offset(self) -> isize {
        match self {
            Direction::Prev => -1,
            Direction::Next => 1,
        }
    }
}

/// Where a pointer press on the lightbox landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    /// The dimmed overlay itself.
    Backdrop,
    /// The media, description or controls.
    Content,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LightboxState {
    #[default]
    Closed,
    Open {
        index: usize,
    },
}

/// Index reached by stepping once from `current` in a collection of `len`
/// items. Stepping past either end wraps around to the other.
pub fn wrap_index(current: usize, direction: Direction, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let len = len as isize;
    ((current as isize) + direction.offset()).rem_euclid(len) as usize
}

#[derive(Debug, Default)]
pub struct Lightbox {
    state: LightboxState,
}

impl Lightbox {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn state(&self) -> LightboxState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, LightboxState::Open { .. })
    }

    pub fn current(&self) -> Option<usize> {
        match self.state {
            LightboxState::Open { index } => Some(index),
            LightboxState::Closed => None,
        }
    }

    /// Open (or retarget) the lightbox on `index`.
    pub fn open(&mut self, index: usize) {
        self.state = LightboxState::Open { index };
    }

    /// Close the lightbox, returning the index that was displayed.
    pub fn close(&mut self) -> Option<usize> {
        let index = self.current();
        self.state = LightboxState::Closed;
        index
    }

    /// Step to the neighbouring item. Returns `(old, new)` indices, or
    /// `None` when closed or the collection is empty.
    pub fn navigate(&mut self, direction: Direction, len: usize) -> Option<(usize, usize)> {
        let current = self.current()?;
        if len == 0 {
            return None;
        }
        let next = wrap_index(current, direction, len);
        self.state = LightboxState::Open { index: next };
        Some((current, next))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_index_both_ends() {
        assert_eq!(wrap_index(0, Direction::Prev, 5), 4);
        assert_eq!(wrap_index(4, Direction::Next, 5), 0);
        assert_eq!(wrap_index(2, Direction::Next, 5), 3);
        assert_eq!(wrap_index(2, Direction::Prev, 5), 1);
        assert_eq!(wrap_index(0, Direction::Next, 1), 0);
        assert_eq!(wrap_index(0, Direction::Prev, 1), 0);
    }

    #[test]
    fn test_open_close() {
        let mut lightbox = Lightbox::new();
        assert!(!lightbox.is_open());
        assert_eq!(lightbox.close(), None);

        lightbox.open(3);
        assert_eq!(lightbox.state(), LightboxState::Open { index: 3 });
        lightbox.open(5);
        assert_eq!(lightbox.current(), Some(5));

        assert_eq!(lightbox.close(), Some(5));
        assert_eq!(lightbox.state(), LightboxState::Closed);
    }

    #[test]
    fn test_navigate_only_while_open() {
        let mut lightbox = Lightbox::new();
        assert_eq!(lightbox.navigate(Direction::Next, 10), None);

        lightbox.open(9);
        assert_eq!(lightbox.navigate(Direction::Next, 10), Some((9, 0)));
        assert_eq!(lightbox.navigate(Direction::Prev, 10), Some((0, 9)));
        assert_eq!(lightbox.navigate(Direction::Next, 0), None);
        assert_eq!(lightbox.current(), Some(9));
    }
}
