//! Catalog document model and loading.
//!
//! The document is a single JSON object `{ "movies": [...], "genres": [...] }`.
//! Entry fields are read leniently: numbers may arrive as JSON numbers or as
//! numeric strings, and anything unreadable becomes `None` rather than failing
//! the whole load.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer};

use crate::error::{CatalogError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "String")]
pub enum EntryKind {
    Movie,
    Series,
    Animation,
    Other(String),
}

impl EntryKind {
    pub fn parse(tag: &str) -> Self {
        match tag.trim() {
            "movie" => EntryKind::Movie,
            "series" => EntryKind::Series,
            "animation" | "anime" => EntryKind::Animation,
            other => EntryKind::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            EntryKind::Movie => "movie",
            EntryKind::Series => "series",
            EntryKind::Animation => "animation",
            EntryKind::Other(raw) => raw,
        }
    }
}

impl From<String> for EntryKind {
    fn from(raw: String) -> Self {
        EntryKind::parse(&raw)
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Entry {
    /// Index in the loaded catalog. Stays valid while the displayed set
    /// changes around it.
    #[serde(skip)]
    pub id: usize,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    #[serde(default, deserialize_with = "lenient_year")]
    pub year: Option<i32>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub genre: Vec<String>,
    #[serde(default, deserialize_with = "lenient_rating")]
    pub rating: Option<f64>,
    #[serde(default)]
    pub director: String,
    #[serde(default, deserialize_with = "one_or_many")]
    pub actors: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub thumbnail: String,
    #[serde(default, deserialize_with = "non_empty")]
    pub trailer: Option<String>,
    #[serde(default)]
    pub license: String,
}

impl Entry {
    pub fn is_playable(&self) -> bool {
        self.trailer.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CatalogDocument {
    #[serde(rename = "movies")]
    pub entries: Vec<Entry>,
    #[serde(default)]
    pub genres: Vec<String>,
}

impl CatalogDocument {
    pub fn from_json(raw: &str) -> Result<Self> {
        let mut document: Self = serde_json::from_str(raw)?;
        for (id, entry) in document.entries.iter_mut().enumerate() {
            entry.id = id;
        }
        Ok(document)
    }

    /// Rewrites relative thumbnail references so they point next to the document.
    pub fn rebase_thumbnails(&mut self, source: &CatalogSource) {
        for entry in &mut self.entries {
            entry.thumbnail = source.resolve(&entry.thumbnail);
        }
    }
}

/// Where the catalog document lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    File(PathBuf),
    Remote(String),
}

impl CatalogSource {
    pub fn parse(location: &str) -> Self {
        let location = location.trim();
        if is_remote(location) {
            CatalogSource::Remote(location.to_string())
        } else {
            CatalogSource::File(PathBuf::from(location))
        }
    }

    /// Resolves an asset reference found inside the document against the
    /// document's own location.
    pub fn resolve(&self, reference: &str) -> String {
        let reference = reference.trim();
        if reference.is_empty()
            || is_remote(reference)
            || reference.starts_with("data:")
            || reference.starts_with("file:")
        {
            return reference.to_string();
        }

        match self {
            CatalogSource::File(path) => {
                if Path::new(reference).is_absolute() {
                    return reference.to_string();
                }
                let base = path.parent().unwrap_or_else(|| Path::new(""));
                base.join(reference).to_string_lossy().into_owned()
            }
            CatalogSource::Remote(url) => {
                if reference.starts_with('/') {
                    format!("{}{}", origin(url), reference)
                } else {
                    let base = match url.rfind('/') {
                        Some(idx) if idx >= origin(url).len() => &url[..=idx],
                        _ => return format!("{}/{}", origin(url), reference),
                    };
                    format!("{}{}", base, reference)
                }
            }
        }
    }

    pub fn fetch(&self) -> Result<CatalogDocument> {
        let mut document = match self {
            CatalogSource::File(path) => {
                let raw = fs::read_to_string(path)?;
                CatalogDocument::from_json(&raw)?
            }
            CatalogSource::Remote(url) => {
                let raw = reqwest::blocking::get(url.as_str())?
                    .error_for_status()?
                    .text()?;
                CatalogDocument::from_json(&raw)?
            }
        };
        document.rebase_thumbnails(self);

        tracing::info!(
            source = %self,
            entries = document.entries.len(),
            genres = document.genres.len(),
            "Catalog loaded"
        );
        Ok(document)
    }
}

impl fmt::Display for CatalogSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogSource::File(path) => write!(f, "{}", path.display()),
            CatalogSource::Remote(url) => f.write_str(url),
        }
    }
}

/// Fetches the document on a background thread. The receiver yields exactly
/// one result.
pub fn spawn_fetch(source: CatalogSource) -> async_channel::Receiver<Result<CatalogDocument>> {
    let (sender, receiver) = async_channel::bounded(1);
    std::thread::spawn(move || {
        let _ = sender.send_blocking(source.fetch());
    });
    receiver
}

pub async fn receive(receiver: async_channel::Receiver<Result<CatalogDocument>>) -> Result<CatalogDocument> {
    receiver.recv().await.map_err(|_| CatalogError::Disconnected)?
}

pub fn is_remote(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

fn origin(url: &str) -> &str {
    let after_scheme = url.find("://").map(|idx| idx + 3).unwrap_or(0);
    match url[after_scheme..].find('/') {
        Some(idx) => &url[..after_scheme + idx],
        None => url,
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Loose {
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn lenient_rating<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Loose>::deserialize(deserializer)?;
    Ok(value
        .and_then(|v| match v {
            Loose::Number(n) => Some(n),
            Loose::Text(s) => s.trim().parse::<f64>().ok(),
            Loose::Other(_) => None,
        })
        .filter(|n| n.is_finite()))
}

fn lenient_year<'de, D>(deserializer: D) -> std::result::Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Loose>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Loose::Number(n) => whole_year(n),
        Loose::Text(s) => parse_year(&s),
        Loose::Other(_) => None,
    }))
}

fn one_or_many<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        Some(OneOrMany::One(label)) => vec![label],
        Some(OneOrMany::Many(labels)) => labels,
        None => Vec::new(),
    })
}

fn non_empty<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

/// Reads a year from text, accepting `"2010"` and `"2010.0"`.
pub fn parse_year(raw: &str) -> Option<i32> {
    let raw = raw.trim();
    raw.parse::<i32>()
        .ok()
        .or_else(|| raw.parse::<f64>().ok().and_then(whole_year))
}

fn whole_year(n: f64) -> Option<i32> {
    if n.is_finite() && n.fract() == 0.0 && n >= i32::MIN as f64 && n <= i32::MAX as f64 {
        Some(n as i32)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;

    /// Answers a single HTTP request with `body` and returns the URL to ask.
    fn serve_once(body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = [0u8; 2048];
            let _ = stream.read(&mut request);
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).unwrap();
        });
        format!("http://{addr}/stream/data.json")
    }

    const SAMPLE: &str = r#"{
        "movies": [
            {
                "title": "Big Buck Bunny",
                "type": "anime",
                "year": "2008",
                "genre": ["Animation", "Comedy"],
                "rating": "7.5",
                "director": "Sacha Goedegebure",
                "actors": [],
                "description": "A giant rabbit takes revenge.",
                "thumbnail": "images/bbb.jpg",
                "trailer": "https://youtu.be/aqz-KE-bpKQ",
                "license": "CC-BY 3.0"
            },
            {
                "title": "Night of the Living Dead",
                "type": "movie",
                "year": 1968,
                "genre": "Horror",
                "rating": 7.8,
                "thumbnail": "https://example.org/notld.jpg",
                "trailer": ""
            }
        ],
        "genres": ["Animation", "Comedy", "Horror"]
    }"#;

    #[test]
    fn parses_lenient_fields() {
        let document = CatalogDocument::from_json(SAMPLE).unwrap();
        assert_eq!(document.entries.len(), 2);
        assert_eq!(document.genres, vec!["Animation", "Comedy", "Horror"]);

        let bunny = &document.entries[0];
        assert_eq!(bunny.kind, EntryKind::Animation);
        assert_eq!(bunny.year, Some(2008));
        assert_eq!(bunny.rating, Some(7.5));
        assert!(bunny.is_playable());

        let notld = &document.entries[1];
        assert_eq!((bunny.id, notld.id), (0, 1));
        assert_eq!(notld.kind, EntryKind::Movie);
        assert_eq!(notld.genre, vec!["Horror"]);
        assert_eq!(notld.director, "");
        assert!(notld.actors.is_empty());
        assert!(!notld.is_playable(), "empty trailer counts as absent");
    }

    #[test]
    fn unreadable_numbers_become_unknown() {
        let raw = r#"{"movies": [{"title": "X", "type": "movie", "year": "soon", "rating": null}]}"#;
        let document = CatalogDocument::from_json(raw).unwrap();
        assert_eq!(document.entries[0].year, None);
        assert_eq!(document.entries[0].rating, None);
        assert!(document.genres.is_empty());
    }

    #[test]
    fn unknown_kind_keeps_raw_tag() {
        assert_eq!(EntryKind::parse("documentary"), EntryKind::Other("documentary".into()));
        assert_eq!(EntryKind::parse("documentary").as_str(), "documentary");
        assert_eq!(EntryKind::parse("animation"), EntryKind::Animation);
    }

    #[test]
    fn document_without_entries_is_malformed() {
        let err = CatalogDocument::from_json(r#"{"genres": []}"#).unwrap_err();
        assert!(matches!(err, CatalogError::Malformed(_)));
    }

    #[test]
    fn resolves_thumbnails_against_file_source() {
        let source = CatalogSource::parse("site/data.json");
        assert_eq!(source.resolve("images/a.jpg"), Path::new("site").join("images/a.jpg").to_string_lossy());
        assert_eq!(source.resolve("https://cdn.example.org/a.jpg"), "https://cdn.example.org/a.jpg");
        assert_eq!(source.resolve(""), "");
    }

    #[test]
    fn resolves_thumbnails_against_remote_source() {
        let source = CatalogSource::parse("https://example.org/stream/data.json");
        assert_eq!(source.resolve("images/a.jpg"), "https://example.org/stream/images/a.jpg");
        assert_eq!(source.resolve("/static/a.jpg"), "https://example.org/static/a.jpg");

        let bare = CatalogSource::parse("https://example.org");
        assert_eq!(bare.resolve("a.jpg"), "https://example.org/a.jpg");
    }

    #[test]
    fn fetches_from_file_and_rebases() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let document = CatalogSource::File(path).fetch().unwrap();
        assert_eq!(
            document.entries[0].thumbnail,
            dir.path().join("images/bbb.jpg").to_string_lossy()
        );
        assert_eq!(document.entries[1].thumbnail, "https://example.org/notld.jpg");
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = CatalogSource::File(dir.path().join("absent.json")).fetch().unwrap_err();
        assert!(matches!(err, CatalogError::Io(_)));
    }

    #[test]
    fn spawned_fetch_delivers_one_result() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        fs::write(&path, SAMPLE).unwrap();

        let receiver = spawn_fetch(CatalogSource::File(path));
        let document = receiver.recv_blocking().unwrap().unwrap();
        assert_eq!(document.entries.len(), 2);
        assert!(receiver.recv_blocking().is_err());
    }

    #[test]
    fn fetches_remote_document_and_rebases() {
        let url = serve_once(SAMPLE);
        let document = CatalogSource::parse(&url).fetch().unwrap();
        assert_eq!(document.entries.len(), 2);
        assert!(document.entries[0].thumbnail.ends_with("/stream/images/bbb.jpg"));
    }

    #[test]
    fn malformed_remote_document_is_malformed_not_network() {
        let url = serve_once(r#"{"movies": "nope"}"#);
        let err = CatalogSource::parse(&url).fetch().unwrap_err();
        assert!(matches!(err, CatalogError::Malformed(_)), "got {err:?}");
    }

    #[test]
    fn receive_reports_a_dropped_sender() {
        let (sender, receiver) = async_channel::bounded::<Result<CatalogDocument>>(1);
        drop(sender);
        let result = futures::executor::block_on(receive(receiver));
        assert!(matches!(result, Err(CatalogError::Disconnected)));
    }

    #[test]
    fn receive_passes_the_fetch_result_through() {
        let (sender, receiver) = async_channel::bounded(1);
        sender.send_blocking(CatalogDocument::from_json(SAMPLE)).unwrap();
        let document = futures::executor::block_on(receive(receiver)).unwrap();
        assert_eq!(document.entries.len(), 2);
    }

    #[test]
    fn year_text_accepts_whole_floats() {
        assert_eq!(parse_year(" 1999 "), Some(1999));
        assert_eq!(parse_year("1999.0"), Some(1999));
        assert_eq!(parse_year("1999.5"), None);
        assert_eq!(parse_year(""), None);
    }
}
