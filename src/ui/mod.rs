pub mod grid;
pub mod keybindings;
pub mod lightbox;
pub mod message_dialog;
pub mod pagination_bar;
pub mod texture_loader;
pub mod tile;
pub mod window;

pub use window::MainWindow;
