//! Gallery orchestration.
//!
//! `GalleryController` owns the sorted item list, the current page, the
//! lightbox and the lazy loader. User actions arrive as method calls, and
//! every resulting change is pushed to a `GallerySurface`.

use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::config::GalleryConfig;
use crate::gallery::lazy_load::{Bounds, LazyLoadConfig, LazyLoader, LoadRequest};
use crate::gallery::lightbox::{ClickTarget, Direction, Lightbox};
use crate::gallery::pagination::{self, PageControl};
use crate::gallery::view::{GallerySurface, MediaView, PageView, TileView};
use crate::models::{media_path, thumbnail_path, MediaItem, SourceError};

/// Keys the lightbox reacts to. Tile activation by Enter or Space goes
/// through `activate_tile`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GalleryKey {
    Escape,
    Left,
    Right,
}

/// Loaded collection and pagination position.
#[derive(Debug, Clone)]
pub struct GalleryState {
    items: Vec<MediaItem>,
    current_page: usize,
    page_size: usize,
    total_pages: usize,
}

impl GalleryState {
    /// Sort `items` by date (oldest first, stable) and start on page 1.
    pub fn new(mut items: Vec<MediaItem>, page_size: usize) -> Self {
        items.sort_by_key(|item| item.date);
        let page_size = page_size.max(1);
        let total_pages = pagination::total_pages(items.len(), page_size);
        Self {
            items,
            current_page: 1,
            page_size,
            total_pages,
        }
    }

    pub fn items(&self) -> &[MediaItem] {
        &self.items
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn total_pages(&self) -> usize {
        self.total_pages
    }
}

#[derive(Debug)]
enum Phase {
    NotLoaded,
    Unavailable,
    Ready(GalleryState),
}

pub struct GalleryController {
    media_root: PathBuf,
    thumb_root: PathBuf,
    page_size: usize,
    max_page_buttons: usize,
    phase: Phase,
    lightbox: Lightbox,
    lazy: LazyLoader<usize>,
}

impl GalleryController {
    pub fn new(config: &GalleryConfig) -> Self {
        Self {
            media_root: config.media_root(),
            thumb_root: config.thumb_root(),
            page_size: config.items_per_page.max(1),
            max_page_buttons: config.max_page_buttons,
            phase: Phase::NotLoaded,
            lightbox: Lightbox::new(),
            lazy: LazyLoader::new(LazyLoadConfig {
                margin_px: config.lazy_margin_px,
                threshold: config.lazy_threshold,
            }),
        }
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Install the collection, or fall into the degraded state when the
    /// source is absent or unreadable.
    pub fn load(
        &mut self,
        source: Result<Vec<MediaItem>, SourceError>,
        surface: &mut dyn GallerySurface,
    ) {
        if self.lightbox.close().is_some() {
            surface.hide_lightbox();
            surface.pause_video();
        }
        self.lazy.reset();

        match source {
            Ok(items) => {
                let state = GalleryState::new(items, self.page_size);
                info!(
                    items = state.items.len(),
                    pages = state.total_pages,
                    "Gallery loaded"
                );
                self.phase = Phase::Ready(state);
                self.render(surface);
            }
            Err(err) => {
                warn!(error = %err, "Gallery data unavailable");
                self.phase = Phase::Unavailable;
                surface.show_unavailable(&err);
            }
        }
    }

    /// Load from a raw record list; `None` is a source that was never supplied.
    #[cfg(test)]
    pub fn load_value(
        &mut self,
        value: Option<&serde_json::Value>,
        surface: &mut dyn GallerySurface,
    ) {
        self.load(crate::models::source::decode(value), surface);
    }

    #[cfg(test)]
    pub fn is_unavailable(&self) -> bool {
        matches!(self.phase, Phase::Unavailable)
    }

    pub fn state(&self) -> Option<&GalleryState> {
        match &self.phase {
            Phase::Ready(state) => Some(state),
            _ => None,
        }
    }

    fn state_mut(&mut self) -> Option<&mut GalleryState> {
        match &mut self.phase {
            Phase::Ready(state) => Some(state),
            _ => None,
        }
    }

    pub fn current_page(&self) -> usize {
        self.state().map_or(1, GalleryState::current_page)
    }

    #[cfg(test)]
    pub fn total_pages(&self) -> usize {
        self.state().map_or(1, GalleryState::total_pages)
    }

    pub fn item_count(&self) -> usize {
        self.state().map_or(0, |s| s.items().len())
    }

    #[cfg(test)]
    pub fn lightbox(&self) -> &Lightbox {
        &self.lightbox
    }

    // =========================================================================
    // Pages
    // =========================================================================

    /// Structural view of the current page.
    pub fn page_view(&self) -> Option<PageView> {
        let state = self.state()?;
        let tiles = pagination::slice(&state.items, state.current_page, state.page_size)
            .into_iter()
            .map(|entry| TileView {
                global_index: entry.global_index,
                filename: entry.item.filename.clone(),
                label: entry.item.label().to_string(),
                thumb_src: thumbnail_path(&self.thumb_root, &entry.item.filename),
                fallback_src: media_path(&self.media_root, &entry.item.filename),
                kind: entry.item.kind(),
            })
            .collect();

        Some(PageView {
            page: state.current_page,
            total_pages: state.total_pages,
            tiles,
            controls: pagination::compute_controls(
                state.current_page,
                state.total_pages,
                self.max_page_buttons,
            ),
        })
    }

    /// Rebuild the visible page from state.
    pub fn render(&mut self, surface: &mut dyn GallerySurface) {
        let Some(view) = self.page_view() else {
            return;
        };

        self.lazy.reset();
        for tile in &view.tiles {
            self.lazy.register(
                tile.global_index,
                tile.thumb_src.clone(),
                tile.fallback_src.clone(),
            );
        }

        debug!(page = view.page, tiles = view.tiles.len(), "Rendering page");
        surface.render_page(&view);
    }

    /// Switch pages. Out-of-range pages and the current page are ignored.
    pub fn go_to_page(&mut self, page: usize, surface: &mut dyn GallerySurface) -> bool {
        let Some(state) = self.state_mut() else {
            return false;
        };
        if page < 1 || page > state.total_pages || page == state.current_page {
            return false;
        }
        state.current_page = page;
        info!(page, "Switched page");

        self.render(surface);
        surface.scroll_to_top();
        true
    }

    /// Activate a pagination-bar control.
    pub fn activate_control(&mut self, control: PageControl, surface: &mut dyn GallerySurface) -> bool {
        match control.target(self.current_page()) {
            Some(page) => self.go_to_page(page, surface),
            None => false,
        }
    }

    // =========================================================================
    // Lightbox
    // =========================================================================

    fn media_view(&self, index: usize) -> Option<MediaView> {
        let state = self.state()?;
        let item = state.items.get(index)?;
        Some(MediaView {
            index,
            total: state.items.len(),
            src: media_path(&self.media_root, &item.filename),
            kind: item.kind(),
            alt: item.label().to_string(),
            description: item.description_text().to_string(),
        })
    }

    /// Tile activated by pointer, Enter or Space.
    pub fn activate_tile(&mut self, global_index: usize, surface: &mut dyn GallerySurface) -> bool {
        self.open_lightbox(global_index, surface)
    }

    pub fn open_lightbox(&mut self, index: usize, surface: &mut dyn GallerySurface) -> bool {
        let Some(media) = self.media_view(index) else {
            return false;
        };
        info!(index, file = %media.src.display(), "Opening lightbox");

        self.lightbox.open(index);
        surface.display_media(&media);
        surface.show_lightbox();
        true
    }

    pub fn close_lightbox(&mut self, surface: &mut dyn GallerySurface) -> bool {
        let Some(index) = self.lightbox.close() else {
            return false;
        };
        info!(index, "Closing lightbox");

        surface.hide_lightbox();
        surface.pause_video();

        let on_page = self
            .state()
            .is_some_and(|s| pagination::page_of(index, s.page_size) == s.current_page);
        if on_page {
            surface.focus_tile(index);
        }
        true
    }

    /// Step through the whole collection, following the lightbox onto the
    /// page of the new item.
    pub fn navigate(&mut self, direction: Direction, surface: &mut dyn GallerySurface) -> bool {
        let len = self.item_count();
        if !self.lightbox.is_open() || len == 0 {
            return false;
        }
        surface.pause_video();

        let Some((_, index)) = self.lightbox.navigate(direction, len) else {
            return false;
        };

        if let Some(state) = self.state_mut() {
            let page = pagination::page_of(index, state.page_size);
            if page != state.current_page {
                state.current_page = page;
                debug!(index, page, "Lightbox moved to another page");
                self.render(surface);
                surface.scroll_to_top();
            }
        }

        if let Some(media) = self.media_view(index) {
            surface.display_media(&media);
        }
        true
    }

    /// Pointer press on the lightbox; the backdrop dismisses it.
    pub fn overlay_clicked(&mut self, target: ClickTarget, surface: &mut dyn GallerySurface) -> bool {
        match target {
            ClickTarget::Backdrop => self.close_lightbox(surface),
            ClickTarget::Content => false,
        }
    }

    /// Lightbox keys. Ignored while the lightbox is closed.
    pub fn handle_key(&mut self, key: GalleryKey, surface: &mut dyn GallerySurface) -> bool {
        if !self.lightbox.is_open() {
            return false;
        }
        match key {
            GalleryKey::Escape => self.close_lightbox(surface),
            GalleryKey::Left => self.navigate(Direction::Prev, surface),
            GalleryKey::Right => self.navigate(Direction::Next, surface),
        }
    }

    // =========================================================================
    // Lazy loading
    // =========================================================================

    pub fn poll_lazy<F>(&mut self, viewport: &Bounds, bounds_of: F) -> Vec<LoadRequest<usize>>
    where
        F: Fn(&usize) -> Option<Bounds>,
    {
        self.lazy.poll(viewport, bounds_of)
    }

    pub fn thumbnail_loaded(&mut self, global_index: usize) -> bool {
        self.lazy.mark_loaded(&global_index)
    }

    /// Fallback source to try after a failed thumbnail, if any.
    pub fn thumbnail_failed(&mut self, global_index: usize) -> Option<PathBuf> {
        self.lazy.mark_failed(&global_index)
    }

    #[cfg(test)]
    pub fn lazy_loader(&self) -> &LazyLoader<usize> {
        &self.lazy
    }
}
