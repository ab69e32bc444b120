use std::cell::RefCell;
use std::rc::Rc;

use gtk::prelude::*;
use gtk::{
    Align, ApplicationWindow, Box, Button, DropDown, FlowBox, Label, Orientation, ScrolledWindow,
    SearchEntry, Separator, Stack, StringList,
};

use openstream::filter::FilterOptions;
use openstream::{Card, CatalogView, EntryKind, NavFilter, Notice, Placeholder, PlayerModel, UiEvent};

use super::card::create_card;
use super::player::{KeySubscription, PlayerOverlay};
use super::thumbnails::Thumbnails;

const GRID_PAGE: &str = "grid";
const MESSAGE_PAGE: &str = "message";

/// The GTK window as a [`CatalogView`]. Widget signals only post
/// [`UiEvent`]s; the controller reacts to them from its own loop.
pub struct GtkCatalogView {
    window: ApplicationWindow,
    events: async_channel::Sender<UiEvent>,
    controls: Box,
    nav_buttons: Vec<(NavFilter, Button)>,
    search_entry: SearchEntry,
    year_dropdown: DropDown,
    genre_dropdown: DropDown,
    rating_dropdown: DropDown,
    options: Rc<RefCell<FilterOptions>>,
    scrolled: ScrolledWindow,
    stack: Stack,
    grid: FlowBox,
    message: Label,
    player: PlayerOverlay,
    thumbnails: Thumbnails,
}

impl GtkCatalogView {
    pub fn new(
        window: &ApplicationWindow,
        events: async_channel::Sender<UiEvent>,
        thumbnails: Thumbnails,
    ) -> Self {
        let main_box = Box::new(Orientation::Vertical, 0);

        let controls = Box::new(Orientation::Vertical, 0);

        // Header with navigation
        let header = Box::new(Orientation::Horizontal, 8);
        header.set_margin_start(12);
        header.set_margin_end(12);
        header.set_margin_top(12);
        header.set_margin_bottom(12);

        let title_label = Label::new(None);
        title_label.set_markup("<span size='x-large' weight='bold'>🎬 OpenStream</span>");
        title_label.set_hexpand(true);
        title_label.set_xalign(0.0);
        header.append(&title_label);

        let nav_items = [
            (NavFilter::All, "All"),
            (NavFilter::Kind(EntryKind::Movie), "Movies"),
            (NavFilter::Kind(EntryKind::Series), "Series"),
            (NavFilter::Kind(EntryKind::Animation), "Animation"),
        ];
        let mut nav_buttons = Vec::with_capacity(nav_items.len());
        for (nav, label) in nav_items {
            let button = Button::with_label(label);
            button.add_css_class("nav-button");
            button.add_css_class("flat");
            let sender = events.clone();
            let target = nav.clone();
            button.connect_clicked(move |_| {
                let _ = sender.send_blocking(UiEvent::Navigate(target.clone()));
            });
            header.append(&button);
            nav_buttons.push((nav, button));
        }
        controls.append(&header);

        // Search and filters
        let search_box = Box::new(Orientation::Horizontal, 12);
        search_box.set_margin_start(12);
        search_box.set_margin_end(12);
        search_box.set_margin_bottom(12);

        let search_entry = SearchEntry::new();
        search_entry.set_placeholder_text(Some("Search titles, directors, actors..."));
        search_entry.set_hexpand(true);
        let search_button = Button::with_label("🔍 Search");

        let sender = events.clone();
        search_entry.connect_activate(move |entry| {
            let _ = sender.send_blocking(UiEvent::Search(entry.text().to_string()));
        });
        let sender = events.clone();
        let entry = search_entry.clone();
        search_button.connect_clicked(move |_| {
            let _ = sender.send_blocking(UiEvent::Search(entry.text().to_string()));
        });

        let year_dropdown = DropDown::from_strings(&["All years"]);
        let genre_dropdown = DropDown::from_strings(&["All genres"]);
        let rating_dropdown = DropDown::from_strings(&["All ratings"]);
        let options = Rc::new(RefCell::new(FilterOptions::default()));

        for dropdown in [&year_dropdown, &genre_dropdown, &rating_dropdown] {
            let sender = events.clone();
            let options = options.clone();
            let year = year_dropdown.clone();
            let genre = genre_dropdown.clone();
            let rating = rating_dropdown.clone();
            dropdown.connect_selected_notify(move |_| {
                let options = options.borrow();
                let _ = sender.send_blocking(UiEvent::FiltersChanged {
                    year: selected_value(&year, &options.years),
                    genre: selected_value(&genre, &options.genres),
                    rating: selected_value(&rating, &options.ratings),
                });
            });
        }

        search_box.append(&search_entry);
        search_box.append(&search_button);
        search_box.append(&year_dropdown);
        search_box.append(&genre_dropdown);
        search_box.append(&rating_dropdown);
        controls.append(&search_box);
        controls.set_sensitive(false);

        main_box.append(&controls);
        main_box.append(&Separator::new(Orientation::Horizontal));

        // Card grid
        let grid = FlowBox::new();
        grid.set_valign(Align::Start);
        grid.set_selection_mode(gtk::SelectionMode::None);
        grid.set_homogeneous(true);
        grid.set_min_children_per_line(1);
        grid.set_max_children_per_line(8);
        grid.set_row_spacing(16);
        grid.set_column_spacing(16);
        grid.set_margin_start(16);
        grid.set_margin_end(16);
        grid.set_margin_top(16);
        grid.set_margin_bottom(16);

        let message = Label::new(Some("Loading catalog..."));
        message.set_margin_top(48);
        message.set_valign(Align::Start);
        message.set_wrap(true);

        let stack = Stack::new();
        stack.add_named(&grid, Some(GRID_PAGE));
        stack.add_named(&message, Some(MESSAGE_PAGE));
        stack.set_visible_child_name(MESSAGE_PAGE);

        let scrolled = ScrolledWindow::new();
        scrolled.set_vexpand(true);
        scrolled.set_hexpand(true);
        scrolled.set_child(Some(&stack));
        main_box.append(&scrolled);

        let player = PlayerOverlay::new(&events);

        let overlay = gtk::Overlay::new();
        overlay.set_child(Some(&main_box));
        overlay.add_overlay(player.widget());
        window.set_child(Some(&overlay));

        Self {
            window: window.clone(),
            events,
            controls,
            nav_buttons,
            search_entry,
            year_dropdown,
            genre_dropdown,
            rating_dropdown,
            options,
            scrolled,
            stack,
            grid,
            message,
            player,
            thumbnails,
        }
    }

    fn clear_grid(&self) {
        while let Some(child) = self.grid.first_child() {
            self.grid.remove(&child);
        }
    }
}

impl CatalogView for GtkCatalogView {
    type KeySubscription = KeySubscription;

    fn show_filter_options(&mut self, options: &FilterOptions) {
        *self.options.borrow_mut() = options.clone();

        let mut years = vec!["All years".to_string()];
        years.extend(options.years.iter().map(|y| y.to_string()));
        let mut genres = vec!["All genres".to_string()];
        genres.extend(options.genres.iter().cloned());
        let mut ratings = vec!["All ratings".to_string()];
        ratings.extend(options.ratings.iter().map(|r| format!("★ {}+", r)));

        set_strings(&self.year_dropdown, &years);
        set_strings(&self.genre_dropdown, &genres);
        set_strings(&self.rating_dropdown, &ratings);
    }

    fn set_interactive(&mut self, interactive: bool) {
        self.controls.set_sensitive(interactive);
    }

    fn mark_active_nav(&mut self, nav: &NavFilter) {
        for (target, button) in &self.nav_buttons {
            if target == nav {
                button.add_css_class("active");
            } else {
                button.remove_css_class("active");
            }
        }
    }

    fn clear_search(&mut self) {
        self.search_entry.set_text("");
    }

    fn show_cards(&mut self, cards: Vec<Card>) {
        self.clear_grid();
        for card in &cards {
            let widget = create_card(card, &self.thumbnails, &self.events);
            self.grid.append(&widget);
        }
        self.stack.set_visible_child_name(GRID_PAGE);
        self.scrolled.vadjustment().set_value(0.0);
    }

    fn show_placeholder(&mut self, placeholder: Placeholder) {
        self.clear_grid();
        self.message.set_text(placeholder.message());
        if placeholder.is_error() {
            self.message.remove_css_class("no-results");
            self.message.add_css_class("error");
        } else {
            self.message.remove_css_class("error");
            self.message.add_css_class("no-results");
        }
        self.stack.set_visible_child_name(MESSAGE_PAGE);
    }

    fn notify(&mut self, notice: &Notice) {
        let dialog = gtk::AlertDialog::builder()
            .message(notice.title.as_str())
            .detail(notice.body.as_str())
            .modal(true)
            .build();
        dialog.show(Some(&self.window));
    }

    fn open_player(&mut self, player: &PlayerModel) {
        self.player.open(player);
    }

    fn close_player(&mut self) {
        self.player.close();
    }

    fn subscribe_dismiss_key(&mut self) -> KeySubscription {
        KeySubscription::attach(&self.window, self.events.clone())
    }
}

fn set_strings(dropdown: &DropDown, items: &[String]) {
    let items: Vec<&str> = items.iter().map(String::as_str).collect();
    dropdown.set_model(Some(&StringList::new(&items)));
    dropdown.set_selected(0);
}

/// Maps a dropdown position to the raw filter value; position 0 is "All".
fn selected_value<T: ToString>(dropdown: &DropDown, values: &[T]) -> String {
    match dropdown.selected() {
        0 => String::new(),
        idx => values
            .get(idx as usize - 1)
            .map(|v| v.to_string())
            .unwrap_or_default(),
    }
}
