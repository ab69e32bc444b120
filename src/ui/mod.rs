mod card;
mod player;
mod thumbnails;
mod view;

pub use thumbnails::Thumbnails;
pub use view::GtkCatalogView;

const CSS: &str = r#"
.nav-button.active {
    background: @accent_bg_color;
    color: @accent_fg_color;
}
.content-card {
    background: alpha(@view_fg_color, 0.05);
    border-radius: 8px;
}
.content-card:hover {
    background: alpha(@view_fg_color, 0.1);
}
.content-thumbnail {
    border-radius: 8px 8px 0 0;
}
.content-type {
    font-size: smaller;
    color: @accent_color;
}
.content-rating {
    color: #f5c211;
}
.no-results,
.error {
    font-size: large;
}
.error {
    color: @error_color;
}
.modal-backdrop {
    background: rgba(0, 0, 0, 0.75);
}
.modal-panel {
    background: @window_bg_color;
    border-radius: 12px;
    padding: 16px;
}
"#;

pub fn install_css() {
    let Some(display) = gtk::gdk::Display::default() else {
        tracing::warn!("No display available, skipping stylesheet");
        return;
    };
    let provider = gtk::CssProvider::new();
    provider.load_from_data(CSS);
    gtk::style_context_add_provider_for_display(
        &display,
        &provider,
        gtk::STYLE_PROVIDER_PRIORITY_APPLICATION,
    );
}
