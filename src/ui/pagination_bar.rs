// Pagination bar: Prev, numbered pages with ellipses, Next

use gtk4::prelude::*;
use gtk4::{accessible, Align, Box as GtkBox, Button, Label, Orientation};
use std::cell::RefCell;
use std::rc::Rc;

use crate::gallery::PageControl;

type ControlCallback = Rc<RefCell<Option<Box<dyn Fn(PageControl)>>>>;

pub struct PaginationBar {
    container: GtkBox,
    on_activate: ControlCallback,
}

impl PaginationBar {
    pub fn new() -> Self {
        let container = GtkBox::new(Orientation::Horizontal, 4);
        container.set_halign(Align::Center);
        container.set_margin_top(8);
        container.set_margin_bottom(8);
        container.add_css_class("pagination");
        container.set_visible(false);

        Self {
            container,
            on_activate: Rc::new(RefCell::new(None)),
        }
    }

    pub fn widget(&self) -> &GtkBox {
        &self.container
    }

    /// Rebuild the bar. An empty list hides it.
    pub fn set_controls(&self, controls: &[PageControl]) {
        while let Some(child) = self.container.first_child() {
            self.container.remove(&child);
        }

        for control in controls {
            match *control {
                PageControl::Ellipsis => {
                    let label = Label::new(Some("…"));
                    label.add_css_class("pagination-ellipsis");
                    self.container.append(&label);
                }
                PageControl::Prev { enabled } => {
                    let button = self.control_button("‹ Prev", *control);
                    button.set_sensitive(enabled);
                    button.set_tooltip_text(Some("Previous page"));
                    self.container.append(&button);
                }
                PageControl::Next { enabled } => {
                    let button = self.control_button("Next ›", *control);
                    button.set_sensitive(enabled);
                    button.set_tooltip_text(Some("Next page"));
                    self.container.append(&button);
                }
                PageControl::Page { number, active } => {
                    let button = self.control_button(&number.to_string(), *control);
                    let name = format!("Page {number}");
                    button.update_property(&[accessible::Property::Label(&name)]);
                    if active {
                        button.add_css_class("active");
                        button.update_state(&[accessible::State::Selected(Some(true))]);
                        button.set_tooltip_text(Some(&format!("{name} (current)")));
                    } else {
                        button.set_tooltip_text(Some(&name));
                    }
                    self.container.append(&button);
                }
            }
        }

        self.container.set_visible(!controls.is_empty());
    }

    pub fn clear(&self) {
        self.set_controls(&[]);
    }

    pub fn connect_activate<F>(&self, callback: F)
    where
        F: Fn(PageControl) + 'static,
    {
        *self.on_activate.borrow_mut() = Some(Box::new(callback));
    }

    fn control_button(&self, label: &str, control: PageControl) -> Button {
        let button = Button::with_label(label);
        button.add_css_class("pagination-btn");

        let on_activate = self.on_activate.clone();
        button.connect_clicked(move |_| {
            if let Some(ref callback) = *on_activate.borrow() {
                callback(control);
            }
        });
        button
    }
}

impl Default for PaginationBar {
    fn default() -> Self {
        Self::new()
    }
}
