// Floating action button and the message dialog it opens

use gtk4::prelude::*;
use gtk4::{
    Align, Box as GtkBox, Button, GestureClick, Label, Orientation, Overlay, PickFlags, Widget,
};
use std::cell::RefCell;
use std::rc::Rc;

use crate::gallery::MessageDialog;

pub const DEFAULT_MESSAGE: &str = "Thanks for stopping by.";

pub struct MessageDialogView {
    fab: Button,
    backdrop: Overlay,
    state: RefCell<MessageDialog>,
    on_state_changed: RefCell<Option<Box<dyn Fn(bool)>>>,
}

impl MessageDialogView {
    pub fn new(message: &str) -> Rc<Self> {
        let fab = Button::with_label("✉");
        fab.set_halign(Align::End);
        fab.set_valign(Align::End);
        fab.set_margin_end(20);
        fab.set_margin_bottom(20);
        fab.set_tooltip_text(Some("Message"));
        fab.update_property(&[gtk4::accessible::Property::Label("Open message")]);
        fab.add_css_class("fab");

        let text = Label::new(Some(message));
        text.set_wrap(true);
        text.set_max_width_chars(48);
        text.add_css_class("dialog-message");

        let close_btn = Button::with_label("Close");
        close_btn.set_halign(Align::End);
        close_btn.add_css_class("dialog-close");

        let dialog = GtkBox::new(Orientation::Vertical, 12);
        dialog.set_halign(Align::Center);
        dialog.set_valign(Align::Center);
        dialog.add_css_class("message-dialog");
        dialog.append(&text);
        dialog.append(&close_btn);

        let backdrop = Overlay::new();
        backdrop.set_hexpand(true);
        backdrop.set_vexpand(true);
        backdrop.add_css_class("dialog-backdrop");
        backdrop.set_child(Some(&dialog));
        backdrop.set_visible(false);

        let view = Rc::new(Self {
            fab: fab.clone(),
            backdrop: backdrop.clone(),
            state: RefCell::new(MessageDialog::default()),
            on_state_changed: RefCell::new(None),
        });

        let view_weak = Rc::downgrade(&view);
        fab.connect_clicked(move |_| {
            if let Some(view) = view_weak.upgrade() {
                view.toggle();
            }
        });

        let view_weak = Rc::downgrade(&view);
        close_btn.connect_clicked(move |_| {
            if let Some(view) = view_weak.upgrade() {
                view.close();
            }
        });

        let click = GestureClick::new();
        click.set_button(1);
        let view_weak = Rc::downgrade(&view);
        click.connect_pressed(move |_, _n, x, y| {
            let Some(view) = view_weak.upgrade() else {
                return;
            };
            let on_backdrop = match view.backdrop.pick(x, y, PickFlags::DEFAULT) {
                Some(widget) => widget == *view.backdrop.upcast_ref::<Widget>(),
                None => true,
            };
            if on_backdrop {
                view.close();
            }
        });
        backdrop.add_controller(click);

        view
    }

    pub fn fab(&self) -> &Button {
        &self.fab
    }

    pub fn backdrop(&self) -> &Overlay {
        &self.backdrop
    }

    pub fn is_open(&self) -> bool {
        self.state.borrow().is_open()
    }

    pub fn close(&self) -> bool {
        let changed = self.state.borrow_mut().close();
        if changed {
            self.sync();
        }
        changed
    }

    pub fn toggle(&self) {
        self.state.borrow_mut().toggle();
        self.sync();
    }

    /// Called with the new open state after every change.
    pub fn connect_state_changed<F>(&self, callback: F)
    where
        F: Fn(bool) + 'static,
    {
        *self.on_state_changed.borrow_mut() = Some(Box::new(callback));
    }

    fn sync(&self) {
        let open = self.is_open();
        tracing::debug!(open, "Message dialog");
        self.backdrop.set_visible(open);
        if open {
            self.fab.add_css_class("active");
        } else {
            self.fab.remove_css_class("active");
        }
        if let Some(ref callback) = *self.on_state_changed.borrow() {
            callback(open);
        }
    }
}
