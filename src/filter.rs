//! Search and filter pipeline.
//!
//! Every operation here is a pure function over slices of entries. The
//! controller keeps the current [`BrowseState`] and replaces it wholesale on
//! each user action.

use std::collections::BTreeSet;

use crate::catalog::{parse_year, CatalogDocument, Entry, EntryKind};

/// Rating thresholds offered by the rating selector, highest first.
pub const RATING_THRESHOLDS: [u8; 5] = [9, 8, 7, 6, 5];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum NavFilter {
    #[default]
    All,
    Kind(EntryKind),
}

impl NavFilter {
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim() {
            "" | "all" => NavFilter::All,
            other => NavFilter::Kind(EntryKind::parse(other)),
        }
    }

    pub fn tag(&self) -> &str {
        match self {
            NavFilter::All => "all",
            NavFilter::Kind(kind) => kind.as_str(),
        }
    }

    pub fn admits(&self, entry: &Entry) -> bool {
        match self {
            NavFilter::All => true,
            NavFilter::Kind(kind) => &entry.kind == kind,
        }
    }
}

/// Current values of the year, genre and rating selectors, already
/// normalized to the types they are compared against.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSelection {
    pub year: Option<i32>,
    pub genre: Option<String>,
    pub min_rating: Option<f64>,
}

impl FilterSelection {
    /// Normalizes raw selector values. An empty value means "no filter";
    /// a value that is not a number is logged and ignored.
    pub fn parse(year: &str, genre: &str, rating: &str) -> Self {
        let year = match year.trim() {
            "" => None,
            raw => {
                let parsed = parse_year(raw);
                if parsed.is_none() {
                    tracing::warn!(value = raw, "Ignoring unreadable year filter");
                }
                parsed
            }
        };

        let min_rating = match rating.trim() {
            "" => None,
            raw => {
                let parsed = raw.parse::<f64>().ok().filter(|n| n.is_finite());
                if parsed.is_none() {
                    tracing::warn!(value = raw, "Ignoring unreadable rating filter");
                }
                parsed
            }
        };

        let genre = Some(genre.trim())
            .filter(|g| !g.is_empty())
            .map(str::to_string);

        Self { year, genre, min_rating }
    }

    pub fn is_empty(&self) -> bool {
        self.year.is_none() && self.genre.is_none() && self.min_rating.is_none()
    }

    pub fn admits(&self, entry: &Entry) -> bool {
        let year_match = self.year.map_or(true, |year| entry.year == Some(year));
        let genre_match = self
            .genre
            .as_ref()
            .map_or(true, |genre| entry.genre.iter().any(|g| g == genre));
        let rating_match = self
            .min_rating
            .map_or(true, |min| entry.rating.map_or(false, |r| r >= min));
        year_match && genre_match && rating_match
    }
}

/// Options offered by the year, genre and rating selectors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterOptions {
    pub years: Vec<i32>,
    pub genres: Vec<String>,
    pub ratings: Vec<u8>,
}

impl FilterOptions {
    pub fn from_document(document: &CatalogDocument) -> Self {
        let years: BTreeSet<i32> = document.entries.iter().filter_map(|e| e.year).collect();
        Self {
            years: years.into_iter().rev().collect(),
            genres: document.genres.clone(),
            ratings: RATING_THRESHOLDS.to_vec(),
        }
    }
}

pub fn normalize_query(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// `term` must already be normalized.
pub fn matches_query(entry: &Entry, term: &str) -> bool {
    entry.title.to_lowercase().contains(term)
        || entry.director.to_lowercase().contains(term)
        || entry.actors.iter().any(|a| a.to_lowercase().contains(term))
        || entry.description.to_lowercase().contains(term)
}

pub fn filter_by_type(entries: &[Entry], nav: &NavFilter) -> Vec<Entry> {
    entries.iter().filter(|e| nav.admits(e)).cloned().collect()
}

pub fn search(entries: &[Entry], term: &str) -> Vec<Entry> {
    if term.is_empty() {
        return entries.to_vec();
    }
    entries
        .iter()
        .filter(|e| matches_query(e, term))
        .cloned()
        .collect()
}

pub fn apply_filters(entries: &[Entry], selection: &FilterSelection) -> Vec<Entry> {
    entries
        .iter()
        .filter(|e| selection.admits(e))
        .cloned()
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BrowseState {
    pub nav: NavFilter,
    pub query: String,
    pub selection: FilterSelection,
    /// Entries surviving the type filter and search.
    pub active: Vec<Entry>,
    /// `active` narrowed by the selectors; this is what gets rendered.
    pub displayed: Vec<Entry>,
}

impl BrowseState {
    pub fn initial(all: &[Entry]) -> Self {
        Self {
            active: all.to_vec(),
            displayed: all.to_vec(),
            ..Self::default()
        }
    }

    /// Switches the type filter. The search term is cleared; the selectors
    /// stay applied.
    pub fn navigate(&self, all: &[Entry], nav: NavFilter) -> Self {
        let active = filter_by_type(all, &nav);
        let displayed = apply_filters(&active, &self.selection);
        tracing::debug!(nav = nav.tag(), active = active.len(), displayed = displayed.len(), "Navigated");
        Self {
            nav,
            query: String::new(),
            selection: self.selection.clone(),
            active,
            displayed,
        }
    }

    pub fn search(&self, all: &[Entry], raw_query: &str) -> Self {
        let query = normalize_query(raw_query);
        let active = search(&filter_by_type(all, &self.nav), &query);
        let displayed = apply_filters(&active, &self.selection);
        tracing::debug!(query = %query, active = active.len(), displayed = displayed.len(), "Searched");
        Self {
            nav: self.nav.clone(),
            query,
            selection: self.selection.clone(),
            active,
            displayed,
        }
    }

    pub fn refine(&self, selection: FilterSelection) -> Self {
        let displayed = apply_filters(&self.active, &selection);
        tracing::debug!(?selection, displayed = displayed.len(), "Filters applied");
        Self {
            nav: self.nav.clone(),
            query: self.query.clone(),
            selection,
            active: self.active.clone(),
            displayed,
        }
    }
}
