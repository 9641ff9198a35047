//! Structural views handed to the presentation layer.

use std::path::PathBuf;

use crate::gallery::pagination::PageControl;
use crate::models::{MediaKind, SourceError};

pub const UNAVAILABLE_TITLE: &str = "Unable to load gallery.";
pub const UNAVAILABLE_HINT: &str = "Make sure gallery.js exists.";

/// A gallery placeholder on the current page.
#[derive(Debug, Clone, PartialEq)]
pub struct TileView {
    pub global_index: usize,
    pub filename: String,
    /// Accessible label / alt text.
    pub label: String,
    pub thumb_src: PathBuf,
    pub fallback_src: PathBuf,
    pub kind: MediaKind,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageView {
    pub page: usize,
    pub total_pages: usize,
    pub tiles: Vec<TileView>,
    /// Empty when there is a single page; the bar is hidden then.
    pub controls: Vec<PageControl>,
}

/// What the lightbox shows.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaView {
    pub index: usize,
    pub total: usize,
    pub src: PathBuf,
    pub kind: MediaKind,
    pub alt: String,
    pub description: String,
}

/// Render operations the gallery controller issues.
///
/// Implementations only execute what they are told; all state lives in the
/// controller.
pub trait GallerySurface {
    /// Replace the gallery with the static "unable to load" message.
    fn show_unavailable(&mut self, error: &SourceError);

    /// Rebuild the tiles and the pagination bar.
    fn render_page(&mut self, page: &PageView);

    fn scroll_to_top(&mut self);

    /// Show the overlay, focus its close control and lock background scrolling.
    fn show_lightbox(&mut self);

    /// Hide the overlay and release the background scroll lock.
    fn hide_lightbox(&mut self);

    fn display_media(&mut self, media: &MediaView);

    fn pause_video(&mut self);

    /// Move keyboard focus to a tile of the displayed page.
    fn focus_tile(&mut self, global_index: usize);
}

/// Surface that records every call, for controller tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub unavailable: Vec<String>,
    pub pages: Vec<PageView>,
    pub scrolls_to_top: usize,
    pub lightbox_open: bool,
    pub lightbox_shows: usize,
    pub media: Vec<MediaView>,
    pub pauses: usize,
    pub focused: Vec<usize>,
}

#[cfg(test)]
impl RecordingSurface {
    pub fn last_page(&self) -> Option<&PageView> {
        self.pages.last()
    }

    pub fn last_media(&self) -> Option<&MediaView> {
        self.media.last()
    }
}

#[cfg(test)]
impl GallerySurface for RecordingSurface {
    fn show_unavailable(&mut self, error: &SourceError) {
        self.unavailable.push(error.to_string());
    }

    fn render_page(&mut self, page: &PageView) {
        self.pages.push(page.clone());
    }

    fn scroll_to_top(&mut self) {
        self.scrolls_to_top += 1;
    }

    fn show_lightbox(&mut self) {
        self.lightbox_open = true;
        self.lightbox_shows += 1;
    }

    fn hide_lightbox(&mut self) {
        self.lightbox_open = false;
    }

    fn display_media(&mut self, media: &MediaView) {
        self.media.push(media.clone());
    }

    fn pause_video(&mut self) {
        self.pauses += 1;
    }

    fn focus_tile(&mut self, global_index: usize) {
        self.focused.push(global_index);
    }
}
