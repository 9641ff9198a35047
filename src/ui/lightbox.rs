// Lightbox overlay covering the gallery
// Features:
// - Full-resolution image decoded in the background, or an embedded video player
// - Description line under the media
// - Prev/Next buttons and a close button; a click on the backdrop closes

use gdk4::Texture;
use gtk4::prelude::*;
use gtk4::subclass::prelude::*;
use gtk4::{
    glib, Align, Box as GtkBox, Button, ContentFit, GestureClick, Label, MediaFile, MediaStream,
    Orientation, Overlay, PickFlags, Picture, Stack, StackTransitionType, Video, Widget,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::texture_loader::request_texture;
use crate::gallery::{ClickTarget, Direction, MediaView};
use crate::models::MediaKind;

/// Longest side of decoded lightbox images.
const LIGHTBOX_DECODE_SIZE: u32 = 2560;

type ClickCallback = Rc<dyn Fn(ClickTarget)>;
type NavigateCallback = Rc<dyn Fn(Direction)>;
type CloseCallback = Rc<dyn Fn()>;

mod imp {
    use super::*;

    #[derive(Default)]
    pub struct LightboxViewInner {
        // Backdrop covering the whole window
        pub overlay: RefCell<Option<Overlay>>,
        pub content_stack: RefCell<Option<Stack>>,
        pub picture: RefCell<Option<Picture>>,
        pub video_area: RefCell<Option<Video>>,
        pub video_stream: RefCell<Option<MediaFile>>,
        pub description: RefCell<Option<Label>>,
        pub counter: RefCell<Option<Label>>,
        pub close_btn: RefCell<Option<Button>>,
        // Bumped for every displayed item so stale decodes are ignored
        pub load_generation: Cell<u64>,
        pub on_click: RefCell<Option<ClickCallback>>,
        pub on_navigate: RefCell<Option<NavigateCallback>>,
        pub on_close: RefCell<Option<CloseCallback>>,
    }

    #[glib::object_subclass]
    impl ObjectSubclass for LightboxViewInner {
        const NAME: &'static str = "FolioLightboxView";
        type Type = super::LightboxView;
        type ParentType = glib::Object;
    }

    impl ObjectImpl for LightboxViewInner {}
}

glib::wrapper! {
    pub struct LightboxView(ObjectSubclass<imp::LightboxViewInner>);
}

impl LightboxView {
    pub fn new() -> Self {
        let obj: Self = glib::Object::builder().build();
        obj.setup_widgets();
        obj
    }

    fn setup_widgets(&self) {
        let imp = self.imp();

        let overlay = Overlay::new();
        overlay.set_hexpand(true);
        overlay.set_vexpand(true);
        overlay.add_css_class("lightbox");
        overlay.set_visible(false);

        let content_stack = Stack::new();
        content_stack.set_hhomogeneous(false);
        content_stack.set_vhomogeneous(false);
        content_stack.set_transition_type(StackTransitionType::None);
        content_stack.set_hexpand(true);
        content_stack.set_vexpand(true);

        let picture = Picture::new();
        picture.set_can_shrink(true);
        picture.set_content_fit(ContentFit::Contain);
        picture.add_css_class("lightbox-image");

        // Videos get the built-in controls and wait for the user to start them.
        let video_area = Video::new();
        video_area.set_autoplay(false);
        video_area.set_loop(false);
        video_area.set_hexpand(true);
        video_area.set_vexpand(true);
        video_area.add_css_class("lightbox-video");

        content_stack.add_named(&picture, Some("image"));
        content_stack.add_named(&video_area, Some("video"));
        content_stack.set_visible_child_name("image");

        let description = Label::new(None);
        description.set_wrap(true);
        description.set_justify(gtk4::Justification::Center);
        description.set_max_width_chars(80);
        description.add_css_class("lightbox-description");

        let prev_btn = Button::with_label("‹");
        prev_btn.set_tooltip_text(Some("Previous (Left)"));
        prev_btn.add_css_class("lightbox-nav");

        let counter = Label::new(None);
        counter.add_css_class("muted");
        counter.set_width_chars(9);

        let next_btn = Button::with_label("›");
        next_btn.set_tooltip_text(Some("Next (Right)"));
        next_btn.add_css_class("lightbox-nav");

        let nav = GtkBox::new(Orientation::Horizontal, 12);
        nav.set_halign(Align::Center);
        nav.append(&prev_btn);
        nav.append(&counter);
        nav.append(&next_btn);

        let content = GtkBox::new(Orientation::Vertical, 8);
        content.set_halign(Align::Center);
        content.set_valign(Align::Center);
        content.set_margin_start(48);
        content.set_margin_end(48);
        content.set_margin_top(48);
        content.set_margin_bottom(24);
        content.add_css_class("lightbox-content");
        content.append(&content_stack);
        content.append(&description);
        content.append(&nav);

        let close_btn = Button::with_label("✕");
        close_btn.set_halign(Align::End);
        close_btn.set_valign(Align::Start);
        close_btn.set_margin_top(12);
        close_btn.set_margin_end(12);
        close_btn.set_tooltip_text(Some("Close (Escape)"));
        close_btn.update_property(&[gtk4::accessible::Property::Label("Close")]);
        close_btn.add_css_class("lightbox-close");

        overlay.set_child(Some(&content));
        overlay.add_overlay(&close_btn);

        // Only presses landing on the backdrop itself count as dismissals.
        let click = GestureClick::new();
        click.set_button(1);
        let lightbox_weak = self.downgrade();
        let overlay_weak = overlay.downgrade();
        click.connect_pressed(move |_, _n, x, y| {
            let (Some(lightbox), Some(overlay)) = (lightbox_weak.upgrade(), overlay_weak.upgrade())
            else {
                return;
            };
            let target = match overlay.pick(x, y, PickFlags::DEFAULT) {
                Some(widget) if widget != *overlay.upcast_ref::<Widget>() => ClickTarget::Content,
                _ => ClickTarget::Backdrop,
            };
            lightbox.emit_click(target);
        });
        overlay.add_controller(click);

        *imp.overlay.borrow_mut() = Some(overlay);
        *imp.content_stack.borrow_mut() = Some(content_stack);
        *imp.picture.borrow_mut() = Some(picture);
        *imp.video_area.borrow_mut() = Some(video_area);
        *imp.description.borrow_mut() = Some(description);
        *imp.counter.borrow_mut() = Some(counter);
        *imp.close_btn.borrow_mut() = Some(close_btn.clone());

        let lightbox_weak = self.downgrade();
        close_btn.connect_clicked(move |_| {
            if let Some(lightbox) = lightbox_weak.upgrade() {
                lightbox.emit_close();
            }
        });

        let lightbox_weak = self.downgrade();
        prev_btn.connect_clicked(move |_| {
            if let Some(lightbox) = lightbox_weak.upgrade() {
                lightbox.emit_navigate(Direction::Prev);
            }
        });

        let lightbox_weak = self.downgrade();
        next_btn.connect_clicked(move |_| {
            if let Some(lightbox) = lightbox_weak.upgrade() {
                lightbox.emit_navigate(Direction::Next);
            }
        });
    }

    /// Get the widget to add to the UI
    pub fn widget(&self) -> Option<Widget> {
        self.imp()
            .overlay
            .borrow()
            .as_ref()
            .map(|overlay| overlay.clone().upcast())
    }

    /// Show an item. Videos are loaded paused.
    pub fn display(&self, media: &MediaView) {
        let imp = self.imp();
        let generation = imp.load_generation.get().wrapping_add(1);
        imp.load_generation.set(generation);

        self.clear_video();

        if let Some(label) = imp.description.borrow().as_ref() {
            label.set_text(&media.description);
            label.set_visible(!media.description.is_empty());
        }
        if let Some(counter) = imp.counter.borrow().as_ref() {
            counter.set_text(&format!("{} / {}", media.index + 1, media.total));
        }

        match media.kind {
            MediaKind::Video => {
                self.set_texture(None);
                if let Some(video) = imp.video_area.borrow().as_ref() {
                    let stream = MediaFile::for_filename(&media.src);
                    video.set_media_stream(Some(&stream));
                    video.update_property(&[gtk4::accessible::Property::Label(&media.alt)]);
                    *imp.video_stream.borrow_mut() = Some(stream);
                }
                self.set_stack_page("video");
            }
            MediaKind::Image => {
                self.set_texture(None);
                if let Some(picture) = imp.picture.borrow().as_ref() {
                    picture.set_alternative_text(Some(&media.alt));
                }
                self.set_stack_page("image");

                let lightbox_weak = self.downgrade();
                let src = media.src.clone();
                request_texture(
                    &media.src,
                    LIGHTBOX_DECODE_SIZE,
                    Box::new(move |texture| {
                        let Some(lightbox) = lightbox_weak.upgrade() else {
                            return;
                        };
                        if lightbox.imp().load_generation.get() != generation {
                            return;
                        }
                        match texture {
                            Some(texture) => lightbox.set_texture(Some(&texture)),
                            None => tracing::trace!(path = %src.display(), "Lightbox image failed"),
                        }
                    }),
                );
            }
        }
    }

    /// Show the overlay and move focus to the close button.
    pub fn show(&self) {
        let imp = self.imp();
        if let Some(overlay) = imp.overlay.borrow().as_ref() {
            overlay.set_visible(true);
        }
        if let Some(close_btn) = imp.close_btn.borrow().as_ref() {
            close_btn.grab_focus();
        }
    }

    pub fn hide(&self) {
        let imp = self.imp();
        imp.load_generation.set(imp.load_generation.get().wrapping_add(1));
        if let Some(overlay) = imp.overlay.borrow().as_ref() {
            overlay.set_visible(false);
        }
        self.clear_video();
        // Clear the picture to free memory
        self.set_texture(None);
    }

    pub fn pause_video(&self) {
        if let Some(stream) = self.imp().video_stream.borrow().as_ref() {
            stream.pause();
        }
    }

    pub fn connect_click<F: Fn(ClickTarget) + 'static>(&self, callback: F) {
        *self.imp().on_click.borrow_mut() = Some(Rc::new(callback));
    }

    pub fn connect_navigate<F: Fn(Direction) + 'static>(&self, callback: F) {
        *self.imp().on_navigate.borrow_mut() = Some(Rc::new(callback));
    }

    pub fn connect_close<F: Fn() + 'static>(&self, callback: F) {
        *self.imp().on_close.borrow_mut() = Some(Rc::new(callback));
    }

    fn clear_video(&self) {
        let imp = self.imp();
        if let Some(stream) = imp.video_stream.borrow_mut().take() {
            stream.pause();
        }
        if let Some(video) = imp.video_area.borrow().as_ref() {
            video.set_media_stream(Option::<&MediaStream>::None);
        }
    }

    fn set_texture(&self, texture: Option<&Texture>) {
        if let Some(picture) = self.imp().picture.borrow().as_ref() {
            picture.set_paintable(texture);
        }
    }

    fn set_stack_page(&self, name: &str) {
        if let Some(stack) = self.imp().content_stack.borrow().as_ref() {
            stack.set_visible_child_name(name);
        }
    }

    // Callbacks are cloned out first so they may call back into the view.
    fn emit_click(&self, target: ClickTarget) {
        let callback = self.imp().on_click.borrow().clone();
        if let Some(callback) = callback {
            callback(target);
        }
    }

    fn emit_navigate(&self, direction: Direction) {
        let callback = self.imp().on_navigate.borrow().clone();
        if let Some(callback) = callback {
            callback(direction);
        }
    }

    fn emit_close(&self) {
        let callback = self.imp().on_close.borrow().clone();
        if let Some(callback) = callback {
            callback();
        }
    }
}

impl Default for LightboxView {
    fn default() -> Self {
        Self::new()
    }
}
