//! Trailer resolution.

use crate::catalog::Entry;
use crate::render::{format_rating, format_year};

const EMBED_BASE: &str = "https://www.youtube.com/embed/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedKind {
    /// A provider's embeddable player page.
    ProviderPlayer,
    /// Used as given: a direct media file or an already embeddable page.
    Direct,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedTarget {
    pub url: String,
    pub kind: EmbedKind,
}

/// Everything the overlay shows for one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerModel {
    pub title: String,
    pub description: String,
    pub year: String,
    pub rating: String,
    pub license: Option<String>,
    pub embed: EmbedTarget,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Playback {
    Unavailable(Notice),
    Play(PlayerModel),
}

/// Ways the overlay can be dismissed. Each one tears the frame down fully.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dismissal {
    CloseButton,
    Backdrop,
    EscapeKey,
}

pub fn resolve(entry: &Entry, show_license: bool) -> Playback {
    let Some(trailer) = entry.trailer.as_deref() else {
        return Playback::Unavailable(unavailable_notice(entry));
    };

    Playback::Play(PlayerModel {
        title: entry.title.clone(),
        description: entry.description.clone(),
        year: format!("📅 {}", format_year(entry.year)),
        rating: format!("⭐ {}/10", format_rating(entry.rating)),
        license: show_license.then(|| format!("📄 {}", entry.license)),
        embed: embed_target(trailer),
    })
}

pub fn unavailable_notice(entry: &Entry) -> Notice {
    let license = if entry.license.trim().is_empty() {
        "an open"
    } else {
        entry.license.trim()
    };
    Notice {
        title: format!("🎬 \"{}\"", entry.title),
        body: format!(
            "\"{}\" is available under the {} license.\n\n\
            Unfortunately the video file is not available yet.",
            entry.title, license
        ),
    }
}

/// Rewrites watch and short links into the provider's embeddable player with
/// autoplay. Any other URL passes through unchanged.
pub fn embed_target(trailer: &str) -> EmbedTarget {
    let trailer = trailer.trim();
    match video_id(trailer) {
        Some(id) => EmbedTarget {
            url: format!("{}{}?autoplay=1", EMBED_BASE, id),
            kind: EmbedKind::ProviderPlayer,
        },
        None => EmbedTarget {
            url: trailer.to_string(),
            kind: EmbedKind::Direct,
        },
    }
}

fn video_id(url: &str) -> Option<String> {
    if let Some(idx) = url.find("youtube.com/watch") {
        let rest = &url[idx..];
        let query = rest.split_once('?')?.1;
        let query = query.split('#').next().unwrap_or(query);
        return query
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .find(|(key, _)| *key == "v")
            .map(|(_, value)| match urlencoding::decode(value) {
                Ok(decoded) => decoded.into_owned(),
                Err(_) => value.to_string(),
            })
            .filter(|id| !id.is_empty());
    }

    if let Some(idx) = url.find("youtu.be/") {
        let rest = &url[idx + "youtu.be/".len()..];
        let id = rest
            .split(&['?', '#'][..])
            .next()
            .unwrap_or(rest)
            .trim_end_matches('/');
        let id = id.rsplit('/').next().unwrap_or(id);
        return Some(id.to_string()).filter(|id| !id.is_empty());
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::EntryKind;

    fn entry(trailer: Option<&str>) -> Entry {
        Entry {
            id: 0,
            title: "Cosmos Laundromat".to_string(),
            kind: EntryKind::Animation,
            year: Some(2015),
            genre: vec!["Animation".into()],
            rating: Some(7.0),
            director: "Mathieu Auvray".into(),
            actors: Vec::new(),
            description: "A suicidal sheep meets a salesman.".into(),
            thumbnail: String::new(),
            trailer: trailer.map(str::to_string),
            license: "CC-BY 4.0".into(),
        }
    }

    #[test]
    fn watch_link_becomes_embed() {
        let target = embed_target("https://www.youtube.com/watch?v=ABC123&t=5");
        assert_eq!(target.url, "https://www.youtube.com/embed/ABC123?autoplay=1");
        assert_eq!(target.kind, EmbedKind::ProviderPlayer);
    }

    #[test]
    fn watch_link_with_v_later_in_query() {
        let target = embed_target("https://youtube.com/watch?feature=share&v=Q1w2%2DE3");
        assert_eq!(target.url, "https://www.youtube.com/embed/Q1w2-E3?autoplay=1");
    }

    #[test]
    fn short_link_becomes_embed() {
        let target = embed_target("https://youtu.be/XYZ987");
        assert_eq!(target.url, "https://www.youtube.com/embed/XYZ987?autoplay=1");

        let target = embed_target("https://youtu.be/XYZ987?si=tracking");
        assert_eq!(target.url, "https://www.youtube.com/embed/XYZ987?autoplay=1");
    }

    #[test]
    fn other_links_pass_through() {
        let url = "https://archive.org/embed/night_of_the_living_dead";
        let target = embed_target(url);
        assert_eq!(target.url, url);
        assert_eq!(target.kind, EmbedKind::Direct);

        let target = embed_target("https://www.youtube.com/watch?list=PL1");
        assert_eq!(target.kind, EmbedKind::Direct);
    }

    #[test]
    fn missing_trailer_yields_notice() {
        let playback = resolve(&entry(None), false);
        match playback {
            Playback::Unavailable(notice) => {
                assert!(notice.body.contains("Cosmos Laundromat"));
                assert!(notice.body.contains("CC-BY 4.0"));
            }
            other => panic!("expected a notice, got {other:?}"),
        }
    }

    #[test]
    fn trailer_fills_overlay_fields() {
        let playback = resolve(&entry(Some("https://youtu.be/Y-rmzh0PI3c")), false);
        let Playback::Play(player) = playback else {
            panic!("expected a player");
        };
        assert_eq!(player.title, "Cosmos Laundromat");
        assert_eq!(player.year, "📅 2015");
        assert_eq!(player.rating, "⭐ 7/10");
        assert_eq!(player.license, None);
        assert_eq!(player.embed.url, "https://www.youtube.com/embed/Y-rmzh0PI3c?autoplay=1");
    }

    #[test]
    fn license_is_shown_only_when_enabled() {
        let Playback::Play(player) = resolve(&entry(Some("https://example.org/a.mp4")), true) else {
            panic!("expected a player");
        };
        assert_eq!(player.license.as_deref(), Some("📄 CC-BY 4.0"));
    }
}
