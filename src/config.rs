//! Gallery configuration.
//!
//! Defaults match the layout the gallery was designed around (two columns,
//! seven rows per page). Each value can be overridden from the environment
//! and then from the command line.

use std::path::{Path, PathBuf};

use tracing::warn;

pub const DEFAULT_MEDIA_DIR: &str = "media";
pub const DEFAULT_THUMB_DIR: &str = "thumbnails";
/// 2 columns x 7 rows.
pub const DEFAULT_ITEMS_PER_PAGE: usize = 14;
pub const DEFAULT_COLUMNS: u32 = 2;
pub const DEFAULT_MAX_PAGE_BUTTONS: usize = 5;
pub const DEFAULT_LAZY_MARGIN_PX: f64 = 100.0;
pub const DEFAULT_LAZY_THRESHOLD: f64 = 0.1;

#[derive(Debug, Clone, PartialEq)]
pub struct GalleryConfig {
    /// Directory containing the gallery data file.
    pub root: PathBuf,
    /// Full-resolution media, relative to `root`.
    pub media_dir: PathBuf,
    /// Thumbnails, relative to `root`.
    pub thumb_dir: PathBuf,
    pub items_per_page: usize,
    pub columns: u32,
    pub max_page_buttons: usize,
    pub lazy_margin_px: f64,
    pub lazy_threshold: f64,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            media_dir: PathBuf::from(DEFAULT_MEDIA_DIR),
            thumb_dir: PathBuf::from(DEFAULT_THUMB_DIR),
            items_per_page: DEFAULT_ITEMS_PER_PAGE,
            columns: DEFAULT_COLUMNS,
            max_page_buttons: DEFAULT_MAX_PAGE_BUTTONS,
            lazy_margin_px: DEFAULT_LAZY_MARGIN_PX,
            lazy_threshold: DEFAULT_LAZY_THRESHOLD,
        }
    }
}

fn positive_from(var: &str, value: Option<String>) -> Option<usize> {
    let value = value?;
    match value.trim().parse::<usize>() {
        Ok(n) if n > 0 => Some(n),
        _ => {
            warn!(var, value = %value, "Ignoring invalid setting");
            None
        }
    }
}

fn env_value(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.trim().is_empty())
}

impl GalleryConfig {
    /// Defaults overridden by `FOLIO_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(env_value)
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(n) = positive_from("FOLIO_ITEMS_PER_PAGE", lookup("FOLIO_ITEMS_PER_PAGE")) {
            config.items_per_page = n;
        }
        if let Some(n) = positive_from("FOLIO_COLUMNS", lookup("FOLIO_COLUMNS")) {
            config.columns = u32::try_from(n).unwrap_or(DEFAULT_COLUMNS);
        }
        if let Some(dir) = lookup("FOLIO_MEDIA_DIR") {
            config.media_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("FOLIO_THUMB_DIR") {
            config.thumb_dir = PathBuf::from(dir);
        }
        if let Some(value) = lookup("FOLIO_LAZY_MARGIN_PX") {
            match value.trim().parse::<f64>() {
                Ok(px) if px.is_finite() && px >= 0.0 => config.lazy_margin_px = px,
                _ => warn!(value = %value, "Ignoring invalid FOLIO_LAZY_MARGIN_PX"),
            }
        }

        config
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    pub fn media_root(&self) -> PathBuf {
        self.resolve(&self.media_dir)
    }

    pub fn thumb_root(&self) -> PathBuf {
        self.resolve(&self.thumb_dir)
    }

    fn resolve(&self, dir: &Path) -> PathBuf {
        if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            self.root.join(dir)
        }
    }
}
