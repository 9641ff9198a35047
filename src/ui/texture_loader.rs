// Background texture decoding shared by tiles and the lightbox
// Worker threads decode with the image crate; results are applied on the main loop

use gdk4::Texture;
use gtk4::prelude::*;
use gtk4::{gdk, glib};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

use crate::image_loader::{self, RgbaImage};
use crate::models::is_video;

const LOADER_THREADS: usize = 2;
const LOADER_QUEUE: usize = 512;
const CACHE_ENTRIES: usize = 256;
const POLL_INTERVAL_MS: u64 = 16;

/// Called on the main loop with the decoded texture, or `None` on failure.
pub type TextureCallback = Box<dyn FnOnce(Option<Texture>)>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct DecodeKey {
    path: PathBuf,
    max_size: u32,
}

#[derive(Debug)]
struct DecodeResult {
    key: DecodeKey,
    rgba: Option<RgbaImage>,
}

struct LoaderState {
    pending: HashSet<DecodeKey>,
    waiters: HashMap<DecodeKey, Vec<TextureCallback>>,
    cache: lru::LruCache<DecodeKey, Texture>,
}

pub struct TextureLoader {
    request_tx: flume::Sender<DecodeKey>,
    result_rx: flume::Receiver<DecodeResult>,
    state: RefCell<LoaderState>,
}

thread_local! {
    static TEXTURE_LOADER: Rc<TextureLoader> = TextureLoader::new();
}

/// Decode `path` to at most `max_size` pixels per side and hand the texture
/// to `callback` on the main loop.
pub fn request_texture(path: &Path, max_size: u32, callback: TextureCallback) {
    TEXTURE_LOADER.with(|loader| loader.request(path, max_size, callback));
}

impl TextureLoader {
    fn new() -> Rc<Self> {
        let (request_tx, request_rx) = flume::bounded::<DecodeKey>(LOADER_QUEUE);
        let (result_tx, result_rx) = flume::unbounded::<DecodeResult>();

        for _ in 0..LOADER_THREADS {
            let rx = request_rx.clone();
            let tx = result_tx.clone();
            std::thread::spawn(move || {
                while let Ok(key) = rx.recv() {
                    let rgba = decode_preview(&key.path, key.max_size);
                    let _ = tx.send(DecodeResult { key, rgba });
                }
            });
        }

        let loader = Rc::new(Self {
            request_tx,
            result_rx,
            state: RefCell::new(LoaderState {
                pending: HashSet::new(),
                waiters: HashMap::new(),
                cache: lru::LruCache::new(
                    NonZeroUsize::new(CACHE_ENTRIES).unwrap_or(NonZeroUsize::MIN),
                ),
            }),
        });

        let loader_weak = Rc::downgrade(&loader);
        glib::timeout_add_local(Duration::from_millis(POLL_INTERVAL_MS), move || {
            if let Some(loader) = loader_weak.upgrade() {
                loader.process_results();
                glib::ControlFlow::Continue
            } else {
                glib::ControlFlow::Break
            }
        });

        loader
    }

    fn request(&self, path: &Path, max_size: u32, callback: TextureCallback) {
        let key = DecodeKey {
            path: path.to_path_buf(),
            max_size,
        };
        let mut state = self.state.borrow_mut();

        if let Some(texture) = state.cache.get(&key).cloned() {
            glib::idle_add_local_once(move || callback(Some(texture)));
            return;
        }

        state.waiters.entry(key.clone()).or_default().push(callback);

        if state.pending.insert(key.clone()) && self.request_tx.try_send(key.clone()).is_err() {
            tracing::debug!(path = %key.path.display(), "Decode queue full");
            state.pending.remove(&key);
            let waiters = state.waiters.remove(&key).unwrap_or_default();
            drop(state);
            glib::idle_add_local_once(move || {
                for waiter in waiters {
                    waiter(None);
                }
            });
        }
    }

    fn process_results(&self) {
        while let Ok(result) = self.result_rx.try_recv() {
            let texture = result.rgba.and_then(create_texture_from_rgba);

            let waiters = {
                let mut state = self.state.borrow_mut();
                state.pending.remove(&result.key);
                if let Some(ref texture) = texture {
                    state.cache.put(result.key.clone(), texture.clone());
                }
                state.waiters.remove(&result.key).unwrap_or_default()
            };

            for waiter in waiters {
                waiter(texture.clone());
            }
        }
    }
}

fn decode_preview(path: &Path, max_size: u32) -> Option<RgbaImage> {
    match image_loader::decode_rgba(path, max_size) {
        Ok(rgba) => Some(rgba),
        Err(err) if is_video(&path.to_string_lossy()) => {
            tracing::trace!(error = %err, "Decoding a video frame instead");
            let frame = image_loader::extract_video_frame(path)?;
            Some(image_loader::to_rgba(frame, max_size))
        }
        Err(err) => {
            tracing::trace!(error = %err, "Texture decode failed");
            None
        }
    }
}

fn create_texture_from_rgba(rgba: RgbaImage) -> Option<Texture> {
    let RgbaImage {
        pixels,
        width,
        height,
    } = rgba;
    if width == 0 || height == 0 {
        return None;
    }
    let expected = (width as usize)
        .saturating_mul(height as usize)
        .saturating_mul(4);
    if pixels.len() < expected {
        return None;
    }
    let bytes = glib::Bytes::from_owned(pixels);
    let texture = gdk::MemoryTexture::new(
        width as i32,
        height as i32,
        gdk::MemoryFormat::R8g8b8a8,
        &bytes,
        (width * 4) as usize,
    );
    Some(texture.upcast())
}
