//! Offline thumbnail generation for a gallery's media directory.

pub mod generator;

pub use generator::{GenerateSummary, ThumbnailGenerator, DEFAULT_MAX_SIZE};
