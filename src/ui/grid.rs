// Gallery grid: the tiles of the current page in a scrolled FlowBox
// Reports viewport changes so the window can poll the lazy loader

use gtk4::prelude::*;
use gtk4::{
    Align, Box as GtkBox, FlowBox, FlowBoxChild, Label, Orientation, PolicyType, ScrolledWindow,
    SelectionMode,
};
use std::cell::RefCell;
use std::rc::Rc;

use super::tile::TileWidget;
use crate::gallery::{Bounds, PageView};

pub struct GalleryGrid {
    scrolled_window: ScrolledWindow,
    content: GtkBox,
    flow_box: FlowBox,
    unavailable: GtkBox,
    unavailable_title: Label,
    unavailable_hint: Label,
    tiles: RefCell<Vec<TileWidget>>,
    on_tile_activated: Rc<RefCell<Option<Box<dyn Fn(usize)>>>>,
}

impl GalleryGrid {
    pub fn new(columns: u32) -> Self {
        let flow_box = FlowBox::new();
        flow_box.set_selection_mode(SelectionMode::None);
        flow_box.set_homogeneous(true);
        flow_box.set_activate_on_single_click(true);
        flow_box.set_min_children_per_line(columns.max(1));
        flow_box.set_max_children_per_line(columns.max(1));
        flow_box.set_row_spacing(8);
        flow_box.set_column_spacing(8);
        flow_box.set_valign(Align::Start);
        flow_box.add_css_class("gallery");

        let title = Label::new(None);
        title.add_css_class("gallery-error-title");
        let hint = Label::new(None);
        hint.add_css_class("muted");
        let unavailable = GtkBox::new(Orientation::Vertical, 6);
        unavailable.set_valign(Align::Center);
        unavailable.set_vexpand(true);
        unavailable.add_css_class("gallery-error");
        unavailable.append(&title);
        unavailable.append(&hint);
        unavailable.set_visible(false);

        let content = GtkBox::new(Orientation::Vertical, 0);
        content.set_margin_start(12);
        content.set_margin_end(12);
        content.set_margin_top(12);
        content.set_margin_bottom(12);
        content.append(&flow_box);
        content.append(&unavailable);

        let scrolled_window = ScrolledWindow::builder()
            .hscrollbar_policy(PolicyType::Never)
            .vscrollbar_policy(PolicyType::Automatic)
            .kinetic_scrolling(true)
            .child(&content)
            .build();
        scrolled_window.set_vexpand(true);
        scrolled_window.set_hexpand(true);

        let on_tile_activated: Rc<RefCell<Option<Box<dyn Fn(usize)>>>> =
            Rc::new(RefCell::new(None));

        // Pointer click, Enter and Space all arrive as child activation.
        let on_activated = on_tile_activated.clone();
        flow_box.connect_child_activated(move |_, child| {
            let Some(tile) = child.child().and_downcast::<TileWidget>() else {
                return;
            };
            if let Some(ref callback) = *on_activated.borrow() {
                callback(tile.global_index());
            }
        });

        Self {
            scrolled_window,
            content,
            flow_box,
            unavailable,
            unavailable_title: title,
            unavailable_hint: hint,
            tiles: RefCell::new(Vec::new()),
            on_tile_activated,
        }
    }

    /// Get the scrolled window widget to add to the window
    pub fn widget(&self) -> &ScrolledWindow {
        &self.scrolled_window
    }

    /// Replace the tiles with those of `page`. `setup` runs on each new tile
    /// before it is shown.
    pub fn set_page<F>(&self, page: &PageView, setup: F)
    where
        F: Fn(&TileWidget),
    {
        self.unavailable.set_visible(false);
        self.flow_box.set_visible(true);
        self.flow_box.remove_all();

        let mut tiles = self.tiles.borrow_mut();
        tiles.clear();
        for view in &page.tiles {
            let tile = TileWidget::new(view);
            setup(&tile);

            let child = FlowBoxChild::new();
            child.set_child(Some(&tile));
            child.set_focusable(true);
            self.flow_box.append(&child);
            tiles.push(tile);
        }
    }

    /// Show the static "unable to load" message instead of tiles.
    pub fn show_unavailable(&self, title: &str, hint: &str) {
        self.flow_box.remove_all();
        self.tiles.borrow_mut().clear();
        self.flow_box.set_visible(false);

        self.unavailable_title.set_text(title);
        self.unavailable_hint.set_text(hint);
        self.unavailable.set_visible(true);
    }

    pub fn tile(&self, global_index: usize) -> Option<TileWidget> {
        self.tiles
            .borrow()
            .iter()
            .find(|tile| tile.global_index() == global_index)
            .cloned()
    }

    pub fn focus_tile(&self, global_index: usize) -> bool {
        let Some(tile) = self.tile(global_index) else {
            return false;
        };
        match tile.parent() {
            Some(child) => child.grab_focus(),
            None => tile.grab_focus(),
        }
    }

    pub fn scroll_to_top(&self) {
        let vadj = self.scrolled_window.vadjustment();
        vadj.set_value(vadj.lower());
    }

    /// Block or restore user scrolling of the gallery.
    pub fn set_scroll_locked(&self, locked: bool) {
        self.scrolled_window.set_can_target(!locked);
        self.scrolled_window.set_can_focus(!locked);
    }

    /// Visible region in content coordinates.
    pub fn viewport(&self) -> Bounds {
        let vadj = self.scrolled_window.vadjustment();
        let hadj = self.scrolled_window.hadjustment();
        Bounds::new(
            hadj.value(),
            vadj.value(),
            self.scrolled_window.width() as f64,
            vadj.page_size(),
        )
    }

    /// Bounds of a tile in content coordinates, once it has been laid out.
    pub fn tile_bounds(&self, global_index: usize) -> Option<Bounds> {
        let tile = self.tile(global_index)?;
        let rect = tile.compute_bounds(&self.content)?;
        if rect.width() <= 0.0 && rect.height() <= 0.0 {
            return None;
        }
        Some(Bounds::new(
            rect.x() as f64,
            rect.y() as f64,
            rect.width() as f64,
            rect.height() as f64,
        ))
    }

    pub fn connect_tile_activated<F>(&self, callback: F)
    where
        F: Fn(usize) + 'static,
    {
        *self.on_tile_activated.borrow_mut() = Some(Box::new(callback));
    }

    /// Notify on scrolling and on viewport resizes.
    pub fn connect_viewport_changed<F>(&self, callback: F)
    where
        F: Fn() + 'static,
    {
        let callback = Rc::new(callback);
        let vadj = self.scrolled_window.vadjustment();

        let on_scroll = callback.clone();
        vadj.connect_value_changed(move |_| on_scroll());

        let on_resize = callback.clone();
        vadj.connect_page_size_notify(move |_| on_resize());

        vadj.connect_upper_notify(move |_| callback());
    }
}
