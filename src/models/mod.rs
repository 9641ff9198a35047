pub mod media_item;
pub mod source;

pub use media_item::*;
pub use source::SourceError;
