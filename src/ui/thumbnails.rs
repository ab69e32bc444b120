use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use gtk::prelude::*;
use gtk::{gdk, glib};

use openstream::thumbnail::{self, Thumbnail, ThumbnailFetcher};

pub const CARD_WIDTH: i32 = 200;
pub const THUMBNAIL_HEIGHT: i32 = 280;

/// Decoded thumbnail textures, keyed by location. Requests for the same
/// image are coalesced while the worker is fetching it.
#[derive(Clone)]
pub struct Thumbnails {
    inner: Rc<RefCell<Inner>>,
}

struct Inner {
    requests: async_channel::Sender<String>,
    textures: HashMap<String, gdk::Texture>,
    pending: HashMap<String, Vec<glib::WeakRef<gtk::Picture>>>,
    failed: HashSet<String>,
}

impl Thumbnails {
    pub fn start(fetcher: ThumbnailFetcher) -> Self {
        let worker = thumbnail::spawn_worker(fetcher);
        let thumbnails = Thumbnails {
            inner: Rc::new(RefCell::new(Inner {
                requests: worker.requests,
                textures: HashMap::new(),
                pending: HashMap::new(),
                failed: HashSet::new(),
            })),
        };

        let receiver = thumbnails.clone();
        let results = worker.results;
        glib::spawn_future_local(async move {
            while let Ok(thumbnail) = results.recv().await {
                receiver.deliver(thumbnail);
            }
        });

        thumbnails
    }

    pub fn load_into(&self, location: &str, picture: &gtk::Picture) {
        if location.is_empty() {
            return;
        }

        let mut inner = self.inner.borrow_mut();
        if let Some(texture) = inner.textures.get(location) {
            picture.set_paintable(Some(texture));
            return;
        }
        if inner.failed.contains(location) {
            return;
        }

        let waiting = inner.pending.entry(location.to_string()).or_default();
        waiting.push(picture.downgrade());
        if waiting.len() == 1 {
            let _ = inner.requests.send_blocking(location.to_string());
        }
    }

    fn deliver(&self, thumbnail: Thumbnail) {
        let mut inner = self.inner.borrow_mut();
        let waiting = inner.pending.remove(&thumbnail.location).unwrap_or_default();

        let decoded = match &thumbnail.bytes {
            Ok(bytes) => decode(bytes).map_err(|e| e.to_string()),
            Err(err) => Err(err.to_string()),
        };
        let texture = match decoded {
            Ok(texture) => texture,
            Err(err) => {
                tracing::debug!(location = %thumbnail.location, error = %err, "Skipping thumbnail");
                inner.failed.insert(thumbnail.location);
                return;
            }
        };

        for picture in waiting.iter().filter_map(|weak| weak.upgrade()) {
            picture.set_paintable(Some(&texture));
        }
        inner.textures.insert(thumbnail.location, texture);
    }
}

fn decode(bytes: &[u8]) -> Result<gdk::Texture, glib::Error> {
    let loader = gdk_pixbuf::PixbufLoader::new();
    loader.write(bytes)?;
    loader.close()?;
    let pixbuf = loader.pixbuf().ok_or_else(|| {
        glib::Error::new(gdk_pixbuf::PixbufError::CorruptImage, "No image data")
    })?;

    let width = pixbuf.width().max(1);
    let height = pixbuf.height().max(1);
    let pixbuf = if width > CARD_WIDTH * 2 {
        let scaled_height = (height as f64 * (CARD_WIDTH * 2) as f64 / width as f64).round() as i32;
        pixbuf
            .scale_simple(CARD_WIDTH * 2, scaled_height.max(1), gdk_pixbuf::InterpType::Bilinear)
            .unwrap_or(pixbuf)
    } else {
        pixbuf
    };

    Ok(gdk::Texture::for_pixbuf(&pixbuf))
}
