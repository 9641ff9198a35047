//! One-shot, proximity-triggered thumbnail loading.
//!
//! Every tile is registered with the source it should eventually display.
//! Polling with the current viewport triggers the tiles that came within
//! `margin_px` of it; a triggered tile is never triggered again. A failed
//! thumbnail load falls back to the full-resolution original exactly once.

use std::collections::HashMap;
use std::hash::Hash;
use std::path::PathBuf;

use tracing::{debug, trace};

use crate::config::{DEFAULT_LAZY_MARGIN_PX, DEFAULT_LAZY_THRESHOLD};

/// Axis-aligned rectangle in the scrolled content's coordinate space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    fn right(&self) -> f64 {
        self.x + self.width
    }

    fn bottom(&self) -> f64 {
        self.y + self.height
    }

    fn grow(&self, margin: f64) -> Self {
        Self::new(
            self.x - margin,
            self.y - margin,
            self.width + 2.0 * margin,
            self.height + 2.0 * margin,
        )
    }

    /// Fraction of `self` lying inside `other`, in `[0, 1]`.
    fn visible_fraction(&self, other: &Bounds) -> f64 {
        let w = (self.right().min(other.right()) - self.x.max(other.x)).max(0.0);
        let h = (self.bottom().min(other.bottom()) - self.y.max(other.y)).max(0.0);
        let area = self.width * self.height;
        if area <= 0.0 {
            // Zero-sized tiles count as fully visible once their origin is inside.
            let inside = self.x >= other.x
                && self.x <= other.right()
                && self.y >= other.y
                && self.y <= other.bottom();
            return if inside { 1.0 } else { 0.0 };
        }
        (w * h / area).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LazyLoadConfig {
    /// Distance around the viewport at which tiles start loading.
    pub margin_px: f64,
    /// Minimum fraction of a tile inside the grown viewport.
    pub threshold: f64,
}

impl Default for LazyLoadConfig {
    fn default() -> Self {
        Self {
            margin_px: DEFAULT_LAZY_MARGIN_PX,
            threshold: DEFAULT_LAZY_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    /// Registered, waiting to come near the viewport.
    Pending,
    /// Thumbnail requested.
    Triggered,
    /// Thumbnail failed; full-resolution original requested instead.
    FellBack,
    /// Something is on screen.
    Loaded,
}

#[derive(Debug, Clone)]
struct Placeholder {
    deferred_src: PathBuf,
    fallback_src: PathBuf,
    phase: LoadPhase,
}

/// Request emitted when a tile should start loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest<K> {
    pub key: K,
    pub src: PathBuf,
}

#[derive(Debug)]
pub struct LazyLoader<K> {
    config: LazyLoadConfig,
    placeholders: HashMap<K, Placeholder>,
    /// Registration order; polling reports triggers in this order.
    order: Vec<K>,
}

impl<K> LazyLoader<K>
where
    K: Copy + Eq + Hash + std::fmt::Debug,
{
    pub fn new(config: LazyLoadConfig) -> Self {
        Self {
            config,
            placeholders: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Register a placeholder. Returns false if `key` is already registered.
    pub fn register(&mut self, key: K, deferred_src: PathBuf, fallback_src: PathBuf) -> bool {
        if self.placeholders.contains_key(&key) {
            return false;
        }
        self.placeholders.insert(
            key,
            Placeholder {
                deferred_src,
                fallback_src,
                phase: LoadPhase::Pending,
            },
        );
        self.order.push(key);
        true
    }

    /// Forget every placeholder.
    pub fn reset(&mut self) {
        self.placeholders.clear();
        self.order.clear();
    }

    #[cfg(test)]
    pub fn phase(&self, key: &K) -> Option<LoadPhase> {
        self.placeholders.get(key).map(|p| p.phase)
    }

    #[cfg(test)]
    pub fn pending_count(&self) -> usize {
        self.placeholders
            .values()
            .filter(|p| p.phase == LoadPhase::Pending)
            .count()
    }

    /// Whether `bounds` is close enough to `viewport` to start loading.
    pub fn is_near(&self, viewport: &Bounds, bounds: &Bounds) -> bool {
        let area = viewport.grow(self.config.margin_px);
        let fraction = bounds.visible_fraction(&area);
        fraction > 0.0 && fraction >= self.config.threshold
    }

    /// Trigger every pending placeholder near `viewport`.
    ///
    /// `bounds_of` returns the current bounds of a placeholder, or `None`
    /// when it is not laid out yet.
    pub fn poll<F>(&mut self, viewport: &Bounds, bounds_of: F) -> Vec<LoadRequest<K>>
    where
        F: Fn(&K) -> Option<Bounds>,
    {
        let mut requests = Vec::new();
        for key in &self.order {
            let Some(placeholder) = self.placeholders.get(key) else {
                continue;
            };
            if placeholder.phase != LoadPhase::Pending {
                continue;
            }
            let Some(bounds) = bounds_of(key) else {
                continue;
            };
            if !self.is_near(viewport, &bounds) {
                continue;
            }
            requests.push(LoadRequest {
                key: *key,
                src: placeholder.deferred_src.clone(),
            });
        }

        for request in &requests {
            if let Some(placeholder) = self.placeholders.get_mut(&request.key) {
                placeholder.phase = LoadPhase::Triggered;
            }
        }
        if !requests.is_empty() {
            debug!(count = requests.len(), "Lazy-load triggered");
        }
        requests
    }

    /// Record a successful load. Returns false for unknown or untriggered keys.
    pub fn mark_loaded(&mut self, key: &K) -> bool {
        match self.placeholders.get_mut(key) {
            Some(p) if matches!(p.phase, LoadPhase::Triggered | LoadPhase::FellBack) => {
                p.phase = LoadPhase::Loaded;
                true
            }
            _ => false,
        }
    }

    /// Record a failed load.
    ///
    /// The first failure of a triggered thumbnail yields the full-resolution
    /// fallback to load instead; anything after that is dropped.
    pub fn mark_failed(&mut self, key: &K) -> Option<PathBuf> {
        let placeholder = self.placeholders.get_mut(key)?;
        match placeholder.phase {
            LoadPhase::Triggered => {
                placeholder.phase = LoadPhase::FellBack;
                trace!(?key, fallback = ?placeholder.fallback_src, "Thumbnail failed, using original");
                Some(placeholder.fallback_src.clone())
            }
            _ => {
                trace!(?key, "Ignoring load failure");
                None
            }
        }
    }
}

impl<K> Default for LazyLoader<K>
where
    K: Copy + Eq + Hash + std::fmt::Debug,
{
    fn default() -> Self {
        Self::new(LazyLoadConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TILE: f64 = 200.0;

    fn tile_bounds(index: &usize) -> Option<Bounds> {
        Some(Bounds::new(0.0, *index as f64 * TILE, TILE, TILE))
    }

    fn loader_with(count: usize) -> LazyLoader<usize> {
        let mut loader = LazyLoader::default();
        for i in 0..count {
            assert!(loader.register(
                i,
                PathBuf::from(format!("thumbnails/{i}.jpg")),
                PathBuf::from(format!("media/{i}.jpg")),
            ));
        }
        loader
    }

    #[test]
    fn test_register_once() {
        let mut loader = loader_with(1);
        assert!(!loader.register(0, PathBuf::from("x"), PathBuf::from("y")));
        assert_eq!(loader.phase(&0), Some(LoadPhase::Pending));
    }

    #[test]
    fn test_poll_triggers_within_margin() {
        let mut loader = loader_with(10);
        // Viewport covers tiles 0..=1; the 100px margin reaches into tile 2.
        let viewport = Bounds::new(0.0, 0.0, TILE, 400.0);
        let requests = loader.poll(&viewport, tile_bounds);

        let keys: Vec<usize> = requests.iter().map(|r| r.key).collect();
        assert_eq!(keys, vec![0, 1, 2]);
        assert_eq!(requests[2].src, PathBuf::from("thumbnails/2.jpg"));
        assert_eq!(loader.phase(&3), Some(LoadPhase::Pending));
        assert_eq!(loader.pending_count(), 7);
    }

    #[test]
    fn test_poll_is_one_shot() {
        let mut loader = loader_with(4);
        let viewport = Bounds::new(0.0, 0.0, TILE, TILE);
        assert!(!loader.poll(&viewport, tile_bounds).is_empty());
        assert!(loader.poll(&viewport, tile_bounds).is_empty());

        // Scrolling away and back does not re-trigger.
        let far = Bounds::new(0.0, 10_000.0, TILE, TILE);
        assert!(loader.poll(&far, tile_bounds).is_empty());
        assert!(loader.poll(&viewport, tile_bounds).is_empty());
    }

    #[test]
    fn test_threshold_requires_visible_fraction() {
        let loader: LazyLoader<usize> = LazyLoader::new(LazyLoadConfig {
            margin_px: 0.0,
            threshold: 0.1,
        });
        let viewport = Bounds::new(0.0, 0.0, 100.0, 100.0);
        // 5% inside.
        assert!(!loader.is_near(&viewport, &Bounds::new(0.0, 95.0, 100.0, 100.0)));
        // 20% inside.
        assert!(loader.is_near(&viewport, &Bounds::new(0.0, 80.0, 100.0, 100.0)));
        // Touching edges only.
        assert!(!loader.is_near(&viewport, &Bounds::new(0.0, 100.0, 100.0, 100.0)));
    }

    #[test]
    fn test_unlaid_out_tiles_wait() {
        let mut loader = loader_with(2);
        let viewport = Bounds::new(0.0, 0.0, TILE, TILE);
        assert!(loader.poll(&viewport, |_| None).is_empty());
        assert_eq!(loader.pending_count(), 2);
    }

    #[test]
    fn test_failure_falls_back_once() {
        let mut loader = loader_with(1);
        loader.poll(&Bounds::new(0.0, 0.0, TILE, TILE), tile_bounds);

        assert_eq!(loader.mark_failed(&0), Some(PathBuf::from("media/0.jpg")));
        assert_eq!(loader.phase(&0), Some(LoadPhase::FellBack));
        assert_eq!(loader.mark_failed(&0), None);
        assert!(loader.mark_loaded(&0));
        assert_eq!(loader.phase(&0), Some(LoadPhase::Loaded));
    }

    #[test]
    fn test_untriggered_results_are_ignored() {
        let mut loader = loader_with(1);
        assert!(!loader.mark_loaded(&0));
        assert_eq!(loader.mark_failed(&0), None);
        assert_eq!(loader.mark_failed(&42), None);
        assert_eq!(loader.phase(&0), Some(LoadPhase::Pending));
    }

    #[test]
    fn test_reset_forgets_placeholders() {
        let mut loader = loader_with(3);
        loader.reset();
        assert_eq!(loader.phase(&0), None);
        assert!(loader.register(0, PathBuf::from("a"), PathBuf::from("b")));
    }
}
