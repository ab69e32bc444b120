mod ui;

use gtk::prelude::*;
use gtk::{glib, Application, ApplicationWindow};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use openstream::thumbnail::ThumbnailFetcher;
use openstream::{catalog, AppConfig, CatalogController, UiEvent};

fn build_ui(app: &Application, config: &AppConfig) {
    ui::install_css();

    let window = ApplicationWindow::builder()
        .application(app)
        .title("OpenStream")
        .default_width(config.window_width)
        .default_height(config.window_height)
        .build();

    let (events, event_rx) = async_channel::unbounded::<UiEvent>();
    let thumbnails = ui::Thumbnails::start(ThumbnailFetcher::new(config.thumbnail_cache_dir()));
    let view = ui::GtkCatalogView::new(&window, events, thumbnails);
    let mut controller = CatalogController::new(view, config.show_license);

    window.present();

    // Controls stay inert until the catalog arrives; after that every UI
    // event is handled here, one at a time.
    let loading = catalog::spawn_fetch(config.catalog_source());
    glib::spawn_future_local(async move {
        let result = catalog::receive(loading).await;
        if !controller.load(result) {
            return;
        }
        while let Ok(event) = event_rx.recv().await {
            controller.handle(event);
        }
    });
}

fn main() -> glib::ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "openstream=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(error = %err, "Using default configuration");
            AppConfig::default()
        }
    };
    tracing::info!(catalog = %config.catalog, "Starting OpenStream");

    let app = Application::builder()
        .application_id("org.openstream.Catalog")
        .build();

    app.connect_activate(move |app| build_ui(app, &config));

    app.run()
}
