//! Background thumbnail fetching with an optional on-disk cache.

use std::fs;
use std::path::PathBuf;

use crate::catalog::is_remote;
use crate::error::Result;

const MAX_CACHE_NAME: usize = 200;

pub struct ThumbnailFetcher {
    cache_dir: Option<PathBuf>,
    client: reqwest::blocking::Client,
}

#[derive(Debug)]
pub struct Thumbnail {
    pub location: String,
    pub bytes: Result<Vec<u8>>,
}

impl ThumbnailFetcher {
    pub fn new(cache_dir: Option<PathBuf>) -> Self {
        Self {
            cache_dir,
            client: reqwest::blocking::Client::new(),
        }
    }

    pub fn cache_path(&self, url: &str) -> Option<PathBuf> {
        let dir = self.cache_dir.as_ref()?;
        let name = urlencoding::encode(url);
        let name = match name.char_indices().rev().nth(MAX_CACHE_NAME - 1) {
            Some((idx, _)) => &name[idx..],
            None => &name[..],
        };
        Some(dir.join(name))
    }

    /// Reads a local image or downloads a remote one, going through the cache
    /// when one is configured.
    pub fn fetch(&self, location: &str) -> Result<Vec<u8>> {
        if !is_remote(location) {
            let path = location.strip_prefix("file://").unwrap_or(location);
            return Ok(fs::read(path)?);
        }

        let cached = self.cache_path(location);
        if let Some(path) = cached.as_ref().filter(|p| p.exists()) {
            return Ok(fs::read(path)?);
        }

        let bytes = self
            .client
            .get(location)
            .send()?
            .error_for_status()?
            .bytes()?
            .to_vec();

        if let Some(path) = cached {
            if let Err(err) = store(&path, &bytes) {
                tracing::warn!(path = %path.display(), error = %err, "Could not cache thumbnail");
            }
        }
        Ok(bytes)
    }
}

fn store(path: &std::path::Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, bytes)?;
    Ok(())
}

pub struct ThumbnailWorker {
    pub requests: async_channel::Sender<String>,
    pub results: async_channel::Receiver<Thumbnail>,
}

/// Starts one background thread serving thumbnail requests in order. The
/// thread exits once either side of the channel pair is dropped.
pub fn spawn_worker(fetcher: ThumbnailFetcher) -> ThumbnailWorker {
    let (request_tx, request_rx) = async_channel::unbounded::<String>();
    let (result_tx, result_rx) = async_channel::unbounded::<Thumbnail>();

    std::thread::spawn(move || {
        while let Ok(location) = request_rx.recv_blocking() {
            let bytes = fetcher.fetch(&location);
            if let Err(err) = &bytes {
                tracing::debug!(%location, error = %err, "Thumbnail unavailable");
            }
            if result_tx.send_blocking(Thumbnail { location, bytes }).is_err() {
                break;
            }
        }
    });

    ThumbnailWorker {
        requests: request_tx,
        results: result_rx,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn cache_names_are_encoded_and_bounded() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = ThumbnailFetcher::new(Some(dir.path().to_path_buf()));

        let path = fetcher.cache_path("https://example.org/a b.jpg").unwrap();
        assert_eq!(path, dir.path().join("https%3A%2F%2Fexample.org%2Fa%20b.jpg"));

        let long = format!("https://example.org/{}.jpg", "x".repeat(400));
        let path = fetcher.cache_path(&long).unwrap();
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert_eq!(name.len(), MAX_CACHE_NAME);
        assert!(name.ends_with(".jpg"));
    }

    #[test]
    fn no_cache_dir_means_no_cache_path() {
        let fetcher = ThumbnailFetcher::new(None);
        assert_eq!(fetcher.cache_path("https://example.org/a.jpg"), None);
    }

    #[test]
    fn cached_remote_image_is_served_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = ThumbnailFetcher::new(Some(dir.path().to_path_buf()));
        let url = "https://thumbnails.invalid/poster.png";
        fs::write(fetcher.cache_path(url).unwrap(), b"cached").unwrap();

        assert_eq!(fetcher.fetch(url).unwrap(), b"cached");
    }

    #[test]
    fn worker_reads_local_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("poster.png");
        fs::write(&path, b"png bytes").unwrap();
        let location = path.to_string_lossy().into_owned();

        let worker = spawn_worker(ThumbnailFetcher::new(None));
        worker.requests.send_blocking(location.clone()).unwrap();
        worker
            .requests
            .send_blocking(dir.path().join("missing.png").to_string_lossy().into_owned())
            .unwrap();

        let first = worker.results.recv_blocking().unwrap();
        assert_eq!(first.location, location);
        assert_eq!(first.bytes.unwrap(), b"png bytes");

        let second = worker.results.recv_blocking().unwrap();
        assert_matches!(second.bytes, Err(crate::error::CatalogError::Io(_)));
    }
}
