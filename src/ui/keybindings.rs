// Keybindings for the gallery window
//
// Keybindings:
// - Escape: Close the message dialog, or the lightbox
// - Left: Previous item in the lightbox
// - Right: Next item in the lightbox
// - Enter / Space: Open the focused tile (handled by the grid)

use gdk4::Key;
use gtk4::prelude::*;
use gtk4::{glib, EventControllerKey, PropagationPhase, Widget};
use std::cell::RefCell;
use std::rc::Rc;

use crate::gallery::GalleryKey;

/// Callback type for gallery keys; returns whether the key was consumed
pub type KeyCallback = Box<dyn Fn(GalleryKey) -> bool>;

/// Map a key press onto a gallery key.
pub fn gallery_key(keyval: Key) -> Option<GalleryKey> {
    match keyval {
        Key::Escape => Some(GalleryKey::Escape),
        Key::Left | Key::KP_Left => Some(GalleryKey::Left),
        Key::Right | Key::KP_Right => Some(GalleryKey::Right),
        _ => None,
    }
}

/// Window-level key handling, run in the capture phase so the lightbox sees
/// arrows before focused buttons do.
pub struct Keybindings {
    controller: EventControllerKey,
    on_key: Rc<RefCell<Option<KeyCallback>>>,
}

impl Keybindings {
    pub fn new() -> Self {
        let controller = EventControllerKey::new();
        controller.set_propagation_phase(PropagationPhase::Capture);

        let on_key: Rc<RefCell<Option<KeyCallback>>> = Rc::new(RefCell::new(None));

        let on_key_clone = on_key.clone();
        controller.connect_key_pressed(move |_controller, keyval, _keycode, _state| {
            let handled = gallery_key(keyval)
                .map(|key| match *on_key_clone.borrow() {
                    Some(ref callback) => callback(key),
                    None => false,
                })
                .unwrap_or(false);

            if handled {
                glib::Propagation::Stop
            } else {
                glib::Propagation::Proceed
            }
        });

        Self { controller, on_key }
    }

    /// Attach keybindings to a widget (typically the main window)
    pub fn attach(&self, widget: &impl IsA<Widget>) {
        widget.add_controller(self.controller.clone());
    }

    pub fn connect_key<F>(&self, callback: F)
    where
        F: Fn(GalleryKey) -> bool + 'static,
    {
        *self.on_key.borrow_mut() = Some(Box::new(callback));
    }
}

impl Default for Keybindings {
    fn default() -> Self {
        Self::new()
    }
}
