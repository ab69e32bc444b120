//! The catalog controller: owns the loaded document and the browse state,
//! and drives a [`CatalogView`].

use crate::catalog::{CatalogDocument, Entry};
use crate::error::Result;
use crate::filter::{BrowseState, FilterOptions, FilterSelection, NavFilter};
use crate::playback::{self, Dismissal, Playback};
use crate::render::{self, CatalogView, Placeholder};

/// User interactions, in the order the UI produced them.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    Navigate(NavFilter),
    Search(String),
    /// Raw selector values; an empty string means "any".
    FiltersChanged {
        year: String,
        genre: String,
        rating: String,
    },
    /// The entry's catalog id, not its grid position.
    CardActivated(usize),
    DismissPlayer(Dismissal),
}

struct OpenPlayer<S> {
    title: String,
    // Held only so that dropping the player detaches the key listener.
    _dismiss_key: S,
}

pub struct CatalogController<V: CatalogView> {
    view: V,
    show_license: bool,
    document: Option<CatalogDocument>,
    state: BrowseState,
    player: Option<OpenPlayer<V::KeySubscription>>,
}

impl<V: CatalogView> CatalogController<V> {
    pub fn new(mut view: V, show_license: bool) -> Self {
        view.set_interactive(false);
        Self {
            view,
            show_license,
            document: None,
            state: BrowseState::default(),
            player: None,
        }
    }

    /// Installs the result of the catalog fetch. Returns whether the catalog
    /// is usable; on failure the grid shows an error and every later event is
    /// ignored.
    pub fn load(&mut self, result: Result<CatalogDocument>) -> bool {
        let document = match result {
            Ok(document) => document,
            Err(err) => {
                tracing::error!(error = %err, "Failed to load catalog");
                self.view.show_placeholder(Placeholder::LoadFailed);
                return false;
            }
        };

        self.view.show_filter_options(&FilterOptions::from_document(&document));
        self.state = BrowseState::initial(&document.entries);
        self.document = Some(document);
        self.view.mark_active_nav(&NavFilter::All);
        self.view.set_interactive(true);
        self.render();
        true
    }

    pub fn handle(&mut self, event: UiEvent) {
        match event {
            UiEvent::Navigate(nav) => self.navigate(nav),
            UiEvent::Search(text) => self.search(&text),
            UiEvent::FiltersChanged { year, genre, rating } => {
                self.apply_filters(FilterSelection::parse(&year, &genre, &rating))
            }
            UiEvent::CardActivated(id) => self.select(id),
            UiEvent::DismissPlayer(dismissal) => self.dismiss_player(dismissal),
        }
    }

    pub fn navigate(&mut self, nav: NavFilter) {
        let Some(document) = &self.document else {
            return;
        };
        self.state = self.state.navigate(&document.entries, nav);
        self.view.mark_active_nav(&self.state.nav);
        self.view.clear_search();
        self.render();
    }

    pub fn search(&mut self, text: &str) {
        let Some(document) = &self.document else {
            return;
        };
        self.state = self.state.search(&document.entries, text);
        self.render();
    }

    pub fn apply_filters(&mut self, selection: FilterSelection) {
        if self.document.is_none() {
            return;
        }
        self.state = self.state.refine(selection);
        self.render();
    }

    /// Runs playback resolution for the entry with catalog id `id`.
    pub fn select(&mut self, id: usize) {
        let Some(entry) = self.document.as_ref().and_then(|d| d.entries.get(id)) else {
            tracing::warn!(id, "Selected entry is not in the catalog");
            return;
        };

        match playback::resolve(entry, self.show_license) {
            Playback::Unavailable(notice) => {
                tracing::info!(title = %entry.title, "No trailer available");
                self.view.notify(&notice);
            }
            Playback::Play(model) => {
                if self.player.is_some() {
                    self.teardown_player();
                }
                tracing::info!(title = %model.title, url = %model.embed.url, "Opening trailer");
                self.view.open_player(&model);
                let subscription = self.view.subscribe_dismiss_key();
                self.player = Some(OpenPlayer {
                    title: model.title,
                    _dismiss_key: subscription,
                });
            }
        }
    }

    pub fn dismiss_player(&mut self, dismissal: Dismissal) {
        if let Some(title) = self.teardown_player() {
            tracing::debug!(?dismissal, %title, "Trailer closed");
        }
    }

    fn teardown_player(&mut self) -> Option<String> {
        let OpenPlayer {
            title,
            _dismiss_key: subscription,
        } = self.player.take()?;
        // Detach the key listener before the frame goes away.
        drop(subscription);
        self.view.close_player();
        Some(title)
    }

    fn render(&mut self) {
        render::render(&mut self.view, &self.state.displayed, self.show_license);
    }

    pub fn state(&self) -> &BrowseState {
        &self.state
    }

    pub fn entries(&self) -> Option<&[Entry]> {
        self.document.as_ref().map(|d| d.entries.as_slice())
    }

    pub fn is_player_open(&self) -> bool {
        self.player.is_some()
    }

    pub fn view(&self) -> &V {
        &self.view
    }
}
