// Main gallery window
// GTK4 ApplicationWindow with the tile grid, pagination bar, lightbox and message dialog

use gdk4::Display;
use gtk4::prelude::*;
use gtk4::{
    glib, Application, ApplicationWindow, Box as GtkBox, CssProvider, Orientation, Overlay,
    STYLE_PROVIDER_PRIORITY_APPLICATION,
};
use std::cell::{Cell, RefCell};
use std::path::Path;
use std::rc::{Rc, Weak};

use super::grid::GalleryGrid;
use super::keybindings::Keybindings;
use super::lightbox::LightboxView;
use super::message_dialog::{MessageDialogView, DEFAULT_MESSAGE};
use super::pagination_bar::PaginationBar;
use crate::config::GalleryConfig;
use crate::gallery::view::{UNAVAILABLE_HINT, UNAVAILABLE_TITLE};
use crate::gallery::{
    GalleryController, GalleryKey, GallerySurface, LockHolder, MediaView, PageView, ScrollLock,
};
use crate::models::{source, SourceError};

/// Optional stylesheet in the gallery root, applied instead of the built-in one.
const STYLE_FILE: &str = "style.css";
/// Optional text shown in the message dialog.
const MESSAGE_FILE: &str = "message.txt";

/// Built-in stylesheet
const FALLBACK_CSS: &str = r#"
window {
    background-color: #0a0a0a;
    color: #e0e0e0;
}

button {
    background-color: transparent;
    border: 1px solid #333333;
    border-radius: 0;
    color: #e0e0e0;
}

button:hover {
    background-color: rgba(224, 224, 224, 0.05);
    border-color: #555555;
}

.gallery-item {
    background-color: #121212;
    min-height: 220px;
}

.gallery-item.loading {
    opacity: 0.6;
}

flowboxchild:focus-visible .gallery-item {
    outline: 2px solid #00ff88;
}

.video-badge {
    background-color: rgba(0, 0, 0, 0.7);
    color: #00ff88;
    padding: 2px 6px;
}

.pagination-btn.active {
    border-color: #00ff88;
    color: #00ff88;
}

.pagination-ellipsis {
    padding: 0 6px;
}

.gallery-error-title {
    font-size: 18px;
    font-weight: bold;
}

.muted {
    color: #888888;
}

.lightbox,
.dialog-backdrop {
    background-color: rgba(0, 0, 0, 0.92);
}

.lightbox-description {
    margin-top: 6px;
}

.lightbox-close,
.lightbox-nav {
    font-size: 20px;
    min-width: 40px;
}

.fab {
    border-radius: 28px;
    min-width: 56px;
    min-height: 56px;
    font-size: 22px;
    background-color: #1a1a1a;
}

.fab.active {
    border-color: #00ff88;
}

.message-dialog {
    background-color: #121212;
    border: 1px solid #333333;
    padding: 24px;
}
"#;

/// Load and apply the stylesheet, preferring one shipped with the gallery
fn load_css(root: &Path) {
    let provider = CssProvider::new();

    let css_path = root.join(STYLE_FILE);
    if css_path.is_file() {
        provider.load_from_path(&css_path);
        tracing::info!("Loaded CSS from: {}", css_path.display());
    } else {
        provider.load_from_string(FALLBACK_CSS);
        tracing::debug!("Loaded built-in CSS");
    }

    if let Some(display) = Display::default() {
        gtk4::style_context_add_provider_for_display(
            &display,
            &provider,
            STYLE_PROVIDER_PRIORITY_APPLICATION,
        );
    }
}

fn dialog_message(root: &Path) -> String {
    match std::fs::read_to_string(root.join(MESSAGE_FILE)) {
        Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
        Ok(_) => DEFAULT_MESSAGE.to_string(),
        Err(err) => {
            tracing::trace!(error = %err, "No message file");
            DEFAULT_MESSAGE.to_string()
        }
    }
}

/// Main window for the gallery
pub struct MainWindow {
    self_weak: RefCell<Weak<MainWindow>>,
    window: ApplicationWindow,
    config: GalleryConfig,
    grid: GalleryGrid,
    pagination: PaginationBar,
    lightbox: LightboxView,
    dialog: Rc<MessageDialogView>,
    keybindings: Keybindings,
    controller: RefCell<GalleryController>,
    scroll_lock: Cell<ScrollLock>,
    lazy_poll_pending: Cell<bool>,
}

/// The window as seen by the controller.
struct WindowSurface<'a> {
    window: &'a MainWindow,
}

impl GallerySurface for WindowSurface<'_> {
    fn show_unavailable(&mut self, _error: &SourceError) {
        self.window
            .grid
            .show_unavailable(UNAVAILABLE_TITLE, UNAVAILABLE_HINT);
        self.window.pagination.clear();
    }

    fn render_page(&mut self, page: &PageView) {
        let window_weak = self.window.self_weak.borrow().clone();
        self.window.grid.set_page(page, |tile| {
            let window_weak = window_weak.clone();
            tile.connect_load_finished(move |index, ok| {
                if let Some(window) = window_weak.upgrade() {
                    window.on_tile_load_finished(index, ok);
                }
            });
        });
        self.window.pagination.set_controls(&page.controls);
        self.window
            .window
            .set_title(Some(&format!("folio: page {} of {}", page.page, page.total_pages)));
        self.window.schedule_lazy_poll();
    }

    fn scroll_to_top(&mut self) {
        self.window.grid.scroll_to_top();
    }

    fn show_lightbox(&mut self) {
        self.window.lightbox.show();
        self.window.set_scroll_lock(LockHolder::Lightbox, true);
    }

    fn hide_lightbox(&mut self) {
        self.window.lightbox.hide();
        self.window.set_scroll_lock(LockHolder::Lightbox, false);
    }

    fn display_media(&mut self, media: &MediaView) {
        self.window.lightbox.display(media);
    }

    fn pause_video(&mut self) {
        self.window.lightbox.pause_video();
    }

    fn focus_tile(&mut self, global_index: usize) {
        self.window.grid.focus_tile(global_index);
    }
}

impl MainWindow {
    pub fn new(app: &Application, config: GalleryConfig) -> Rc<Self> {
        // Load CSS before creating widgets
        load_css(&config.root);

        let window = ApplicationWindow::builder()
            .application(app)
            .title("folio")
            .default_width(900)
            .default_height(1000)
            .build();

        let grid = GalleryGrid::new(config.columns);
        let pagination = PaginationBar::new();
        let lightbox = LightboxView::new();
        let dialog = MessageDialogView::new(&dialog_message(&config.root));

        let page_box = GtkBox::new(Orientation::Vertical, 0);
        page_box.append(grid.widget());
        page_box.append(pagination.widget());

        let root = Overlay::new();
        root.set_child(Some(&page_box));
        root.add_overlay(dialog.fab());
        if let Some(widget) = lightbox.widget() {
            root.add_overlay(&widget);
        }
        root.add_overlay(dialog.backdrop());
        window.set_child(Some(&root));

        let controller = GalleryController::new(&config);

        let main_window = Rc::new(Self {
            self_weak: RefCell::new(Weak::new()),
            window,
            config,
            grid,
            pagination,
            lightbox,
            dialog,
            keybindings: Keybindings::new(),
            controller: RefCell::new(controller),
            scroll_lock: Cell::new(ScrollLock::default()),
            lazy_poll_pending: Cell::new(false),
        });
        *main_window.self_weak.borrow_mut() = Rc::downgrade(&main_window);

        main_window.setup_signals();
        main_window.load_gallery();

        main_window
    }

    fn setup_signals(self: &Rc<Self>) {
        self.keybindings.attach(&self.window);

        let window_weak = Rc::downgrade(self);
        self.keybindings.connect_key(move |key| {
            window_weak
                .upgrade()
                .map(|window| window.handle_key(key))
                .unwrap_or(false)
        });

        let window_weak = Rc::downgrade(self);
        self.grid.connect_tile_activated(move |index| {
            if let Some(window) = window_weak.upgrade() {
                window.with_controller(|controller, surface| {
                    controller.activate_tile(index, surface)
                });
            }
        });

        let window_weak = Rc::downgrade(self);
        self.grid.connect_viewport_changed(move || {
            if let Some(window) = window_weak.upgrade() {
                window.schedule_lazy_poll();
            }
        });

        let window_weak = Rc::downgrade(self);
        self.pagination.connect_activate(move |control| {
            if let Some(window) = window_weak.upgrade() {
                window.with_controller(|controller, surface| {
                    controller.activate_control(control, surface)
                });
            }
        });

        let window_weak = Rc::downgrade(self);
        self.lightbox.connect_click(move |target| {
            if let Some(window) = window_weak.upgrade() {
                window.with_controller(|controller, surface| {
                    controller.overlay_clicked(target, surface)
                });
            }
        });

        let window_weak = Rc::downgrade(self);
        self.lightbox.connect_navigate(move |direction| {
            if let Some(window) = window_weak.upgrade() {
                window.with_controller(|controller, surface| {
                    controller.navigate(direction, surface)
                });
            }
        });

        let window_weak = Rc::downgrade(self);
        self.lightbox.connect_close(move || {
            if let Some(window) = window_weak.upgrade() {
                window.with_controller(|controller, surface| controller.close_lightbox(surface));
            }
        });

        let window_weak = Rc::downgrade(self);
        self.dialog.connect_state_changed(move |open| {
            if let Some(window) = window_weak.upgrade() {
                window.set_scroll_lock(LockHolder::MessageDialog, open);
            }
        });
    }

    /// Read the gallery data file and render the first page.
    pub fn load_gallery(&self) {
        let source = source::read_source(&self.config.root);
        self.with_controller(|controller, surface| controller.load(source, surface));
    }

    /// Present the window
    pub fn present(&self) {
        self.window.present();
    }

    /// Run `f` against the controller with this window as its surface.
    fn with_controller<R>(
        &self,
        f: impl FnOnce(&mut GalleryController, &mut dyn GallerySurface) -> R,
    ) -> Option<R> {
        let Ok(mut controller) = self.controller.try_borrow_mut() else {
            tracing::warn!("Ignoring re-entrant gallery event");
            return None;
        };
        let mut surface = WindowSurface { window: self };
        Some(f(&mut controller, &mut surface))
    }

    fn handle_key(&self, key: GalleryKey) -> bool {
        let mut handled = false;
        if key == GalleryKey::Escape {
            handled = self.dialog.close();
        }
        handled
            | self
                .with_controller(|controller, surface| controller.handle_key(key, surface))
                .unwrap_or(false)
    }

    fn set_scroll_lock(&self, holder: LockHolder, held: bool) {
        let mut lock = self.scroll_lock.get();
        lock.set(holder, held);
        self.scroll_lock.set(lock);
        self.grid.set_scroll_locked(lock.is_locked());
    }

    /// Poll the lazy loader once the current layout pass is done.
    fn schedule_lazy_poll(&self) {
        if self.lazy_poll_pending.replace(true) {
            return;
        }
        let window_weak = self.self_weak.borrow().clone();
        glib::idle_add_local_once(move || {
            if let Some(window) = window_weak.upgrade() {
                window.lazy_poll_pending.set(false);
                window.poll_lazy();
            }
        });
    }

    fn poll_lazy(&self) {
        let viewport = self.grid.viewport();
        let requests = {
            let Ok(mut controller) = self.controller.try_borrow_mut() else {
                return;
            };
            controller.poll_lazy(&viewport, |index| self.grid.tile_bounds(*index))
        };

        for request in requests {
            if let Some(tile) = self.grid.tile(request.key) {
                tile.load(&request.src);
            }
        }
    }

    fn on_tile_load_finished(&self, index: usize, ok: bool) {
        let fallback = {
            let Ok(mut controller) = self.controller.try_borrow_mut() else {
                return;
            };
            if ok {
                controller.thumbnail_loaded(index);
                None
            } else {
                controller.thumbnail_failed(index)
            }
        };

        if let Some(src) = fallback {
            if let Some(tile) = self.grid.tile(index) {
                tile.load(&src);
            }
        }
    }
}
