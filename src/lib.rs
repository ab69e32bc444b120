//! OpenStream: browse a static catalog of open-licensed films, series and
//! animation, and play their trailers.
//!
//! The crate is toolkit independent. [`controller::CatalogController`] drives
//! any [`render::CatalogView`]; the GTK window in the `openstream` binary is
//! one such view.

pub mod catalog;
pub mod config;
pub mod controller;
pub mod error;
pub mod filter;
pub mod playback;
pub mod render;
pub mod thumbnail;

pub use catalog::{CatalogDocument, CatalogSource, Entry, EntryKind};
pub use config::AppConfig;
pub use controller::{CatalogController, UiEvent};
pub use error::{CatalogError, Result};
pub use filter::{BrowseState, FilterOptions, FilterSelection, NavFilter};
pub use playback::{Dismissal, EmbedKind, EmbedTarget, Notice, Playback, PlayerModel};
pub use render::{Card, CatalogView, Placeholder};
