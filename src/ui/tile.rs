// Gallery tile: a placeholder picture that swaps in its thumbnail on demand
// Uses a shared placeholder texture until the loader delivers the real one

use gdk4::Texture;
use glib::Object;
use gtk4::prelude::*;
use gtk4::subclass::prelude::*;
use gtk4::{gdk, glib, Align, Box as GtkBox, ContentFit, Label, Orientation, Overlay, Picture};
use std::cell::{Cell, RefCell};
use std::path::Path;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use super::texture_loader::request_texture;
use crate::gallery::TileView;
use crate::models::MediaKind;

/// Longest side of decoded tile textures.
pub const TILE_PREVIEW_SIZE: u32 = 512;

/// Invoked with `(global_index, succeeded)` when a requested source settles.
pub type LoadFinishedCallback = Rc<dyn Fn(usize, bool)>;

// Placeholder texture - generated once per thread and reused
fn placeholder_texture() -> Texture {
    thread_local! {
        static PLACEHOLDER: Texture = {
            let width = 64;
            let height = 64;
            let mut pixels = vec![0u8; width * height * 4];

            // Dark gray (#1a1a1a)
            for chunk in pixels.chunks_exact_mut(4) {
                chunk.copy_from_slice(&[0x1a, 0x1a, 0x1a, 0xff]);
            }

            let bytes = glib::Bytes::from_owned(pixels);
            gdk::MemoryTexture::new(
                width as i32,
                height as i32,
                gdk::MemoryFormat::R8g8b8a8,
                &bytes,
                width * 4,
            )
            .upcast()
        };
    }
    PLACEHOLDER.with(Texture::clone)
}

static NEXT_LOAD_TOKEN: AtomicU64 = AtomicU64::new(1);

mod imp {
    use super::*;

    #[derive(Default)]
    pub struct TileWidgetInner {
        pub picture: RefCell<Option<Picture>>,
        pub global_index: Cell<usize>,
        pub load_token: Cell<u64>,
        pub on_load_finished: RefCell<Option<LoadFinishedCallback>>,
    }

    #[glib::object_subclass]
    impl ObjectSubclass for TileWidgetInner {
        const NAME: &'static str = "FolioTileWidget";
        type Type = super::TileWidget;
        type ParentType = GtkBox;
    }

    impl ObjectImpl for TileWidgetInner {
        fn constructed(&self) {
            self.parent_constructed();

            let obj = self.obj();
            obj.set_orientation(Orientation::Vertical);
            obj.set_hexpand(true);
            obj.add_css_class("gallery-item");
            obj.add_css_class("loading");
        }
    }

    impl WidgetImpl for TileWidgetInner {}
    impl BoxImpl for TileWidgetInner {}
}

glib::wrapper! {
    pub struct TileWidget(ObjectSubclass<imp::TileWidgetInner>)
        @extends GtkBox, gtk4::Widget,
        @implements gtk4::Accessible, gtk4::Buildable, gtk4::ConstraintTarget, gtk4::Orientable;
}

impl TileWidget {
    pub fn new(view: &TileView) -> Self {
        let obj: Self = Object::builder().build();
        obj.build(view);
        obj
    }

    fn build(&self, view: &TileView) {
        let imp = self.imp();
        imp.global_index.set(view.global_index);

        let picture = Picture::for_paintable(&placeholder_texture());
        picture.set_can_shrink(true);
        picture.set_content_fit(ContentFit::Cover);
        picture.set_hexpand(true);
        picture.set_vexpand(true);
        picture.set_alternative_text(Some(&view.label));

        let overlay = Overlay::new();
        overlay.set_child(Some(&picture));

        let video_badge = Label::new(Some("▶"));
        video_badge.set_halign(Align::Start);
        video_badge.set_valign(Align::Start);
        video_badge.set_margin_start(6);
        video_badge.set_margin_top(4);
        video_badge.add_css_class("video-badge");
        video_badge.set_visible(view.kind == MediaKind::Video);
        overlay.add_overlay(&video_badge);

        self.append(&overlay);
        self.set_tooltip_text(Some(&view.label));
        self.update_property(&[gtk4::accessible::Property::Label(&view.label)]);

        *imp.picture.borrow_mut() = Some(picture);
    }

    pub fn global_index(&self) -> usize {
        self.imp().global_index.get()
    }

    pub fn connect_load_finished<F>(&self, callback: F)
    where
        F: Fn(usize, bool) + 'static,
    {
        *self.imp().on_load_finished.borrow_mut() = Some(Rc::new(callback));
    }

    /// Start loading `src`. Any earlier request still in flight is superseded.
    pub fn load(&self, src: &Path) {
        let token = NEXT_LOAD_TOKEN.fetch_add(1, Ordering::Relaxed);
        self.imp().load_token.set(token);

        let tile_weak = self.downgrade();
        request_texture(
            src,
            TILE_PREVIEW_SIZE,
            Box::new(move |texture| {
                if let Some(tile) = tile_weak.upgrade() {
                    tile.apply_texture(token, texture.as_ref());
                }
            }),
        );
    }

    fn apply_texture(&self, token: u64, texture: Option<&Texture>) {
        let imp = self.imp();
        if imp.load_token.get() != token {
            return;
        }

        if let Some(texture) = texture {
            if let Some(picture) = imp.picture.borrow().as_ref() {
                picture.set_paintable(Some(texture));
            }
            self.remove_css_class("loading");
        }

        let callback = imp.on_load_finished.borrow().clone();
        if let Some(callback) = callback {
            callback(imp.global_index.get(), texture.is_some());
        }
    }
}
