pub mod controller;
pub mod lazy_load;
pub mod lightbox;
pub mod message_dialog;
pub mod pagination;
pub mod scroll_lock;
pub mod view;

pub use controller::{GalleryController, GalleryKey};
pub use lazy_load::{Bounds, LoadRequest};
pub use lightbox::{ClickTarget, Direction};
pub use message_dialog::MessageDialog;
pub use pagination::PageControl;
pub use scroll_lock::{LockHolder, ScrollLock};
pub use view::{GallerySurface, MediaView, PageView, TileView};
