//! Card rendering and the view interface.

use crate::catalog::{Entry, EntryKind};
use crate::filter::{FilterOptions, NavFilter};
use crate::playback::{Notice, PlayerModel};

pub const NO_RESULTS: &str = "No content found";
pub const LOAD_FAILED: &str = "Unable to load the catalog";

/// One grid card, ready to display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    /// The entry's catalog id; selecting the card reports it back.
    pub id: usize,
    pub thumbnail: String,
    pub type_label: String,
    pub title: String,
    pub year: String,
    pub rating: String,
    pub description: String,
    pub license: Option<String>,
}

impl Card {
    pub fn from_entry(entry: &Entry, show_license: bool) -> Self {
        Self {
            id: entry.id,
            thumbnail: entry.thumbnail.clone(),
            type_label: type_label(&entry.kind).to_string(),
            title: entry.title.clone(),
            year: format_year(entry.year),
            rating: format!("★ {}", format_rating(entry.rating)),
            description: entry.description.clone(),
            license: show_license.then(|| format!("License: {}", entry.license)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    NoResults,
    LoadFailed,
}

impl Placeholder {
    pub fn message(self) -> &'static str {
        match self {
            Placeholder::NoResults => NO_RESULTS,
            Placeholder::LoadFailed => LOAD_FAILED,
        }
    }

    pub fn is_error(self) -> bool {
        matches!(self, Placeholder::LoadFailed)
    }
}

/// Everything the controller needs from a display surface.
///
/// The grid region is written only through `show_cards` and
/// `show_placeholder`; each call replaces whatever was shown before.
pub trait CatalogView {
    /// Guard for the overlay's dismiss-key listener. Dropping it detaches
    /// the listener.
    type KeySubscription;

    fn show_filter_options(&mut self, options: &FilterOptions);
    fn set_interactive(&mut self, interactive: bool);
    fn mark_active_nav(&mut self, nav: &NavFilter);
    fn clear_search(&mut self);

    fn show_cards(&mut self, cards: Vec<Card>);
    fn show_placeholder(&mut self, placeholder: Placeholder);

    fn notify(&mut self, notice: &Notice);
    fn open_player(&mut self, player: &PlayerModel);
    /// Must unmount the trailer frame completely, not just hide it.
    fn close_player(&mut self);
    fn subscribe_dismiss_key(&mut self) -> Self::KeySubscription;
}

pub fn render<V: CatalogView + ?Sized>(view: &mut V, entries: &[Entry], show_license: bool) {
    if entries.is_empty() {
        view.show_placeholder(Placeholder::NoResults);
        return;
    }
    let cards = entries
        .iter()
        .map(|entry| Card::from_entry(entry, show_license))
        .collect();
    view.show_cards(cards);
}

pub fn type_label(kind: &EntryKind) -> &str {
    match kind {
        EntryKind::Movie => "Movie",
        EntryKind::Series => "Series",
        EntryKind::Animation => "Animation",
        EntryKind::Other(raw) => raw,
    }
}

pub fn format_year(year: Option<i32>) -> String {
    year.map(|y| y.to_string()).unwrap_or_default()
}

pub fn format_rating(rating: Option<f64>) -> String {
    match rating {
        Some(r) => r.to_string(),
        None => "–".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(title: &str, kind: EntryKind) -> Entry {
        Entry {
            id: 0,
            title: title.to_string(),
            kind,
            year: Some(2006),
            genre: Vec::new(),
            rating: Some(8.5),
            director: String::new(),
            actors: Vec::new(),
            description: "Orange and the stolen tree.".into(),
            thumbnail: "images/elephants.jpg".into(),
            trailer: None,
            license: "CC-BY 2.5".into(),
        }
    }

    #[test]
    fn type_labels() {
        assert_eq!(type_label(&EntryKind::Movie), "Movie");
        assert_eq!(type_label(&EntryKind::Series), "Series");
        assert_eq!(type_label(&EntryKind::Animation), "Animation");
        assert_eq!(type_label(&EntryKind::Other("short".into())), "short");
    }

    #[test]
    fn card_fields() {
        let mut dream = entry("Elephants Dream", EntryKind::Animation);
        dream.id = 3;
        let card = Card::from_entry(&dream, false);
        assert_eq!(card.id, 3);
        assert_eq!(card.type_label, "Animation");
        assert_eq!(card.year, "2006");
        assert_eq!(card.rating, "★ 8.5");
        assert_eq!(card.thumbnail, "images/elephants.jpg");
        assert_eq!(card.license, None);

        let card = Card::from_entry(&dream, true);
        assert_eq!(card.license.as_deref(), Some("License: CC-BY 2.5"));
    }

    #[test]
    fn ratings_format_without_trailing_zero() {
        assert_eq!(format_rating(Some(9.0)), "9");
        assert_eq!(format_rating(Some(7.25)), "7.25");
        assert_eq!(format_rating(None), "–");
        assert_eq!(format_year(None), "");
    }
}
