use gtk::prelude::*;
use gtk::{glib, Align, Box, Button, Label, Orientation};
use webkit6::prelude::*;
use webkit6::WebView;

use openstream::{Dismissal, PlayerModel, UiEvent};

const BLANK_PAGE: &str = "about:blank";

/// The trailer overlay: a dimmed backdrop over the window with a centered
/// panel holding the trailer frame and the title, description, year and
/// rating slots.
pub struct PlayerOverlay {
    backdrop: Box,
    frame: Box,
    title: Label,
    description: Label,
    year: Label,
    rating: Label,
    license: Label,
}

impl PlayerOverlay {
    pub fn new(events: &async_channel::Sender<UiEvent>) -> Self {
        let backdrop = Box::new(Orientation::Vertical, 0);
        backdrop.add_css_class("modal-backdrop");
        backdrop.set_hexpand(true);
        backdrop.set_vexpand(true);
        backdrop.set_visible(false);

        let panel = Box::new(Orientation::Vertical, 12);
        panel.add_css_class("modal-panel");
        panel.set_halign(Align::Center);
        panel.set_valign(Align::Center);
        panel.set_size_request(800, -1);

        let close_button = Button::with_label("✕");
        close_button.set_halign(Align::End);
        close_button.add_css_class("flat");

        let frame = Box::new(Orientation::Vertical, 8);
        frame.set_size_request(-1, 450);

        let title = Label::new(None);
        title.set_xalign(0.0);
        title.set_wrap(true);

        let description = Label::new(None);
        description.set_xalign(0.0);
        description.set_wrap(true);
        description.set_opacity(0.8);

        let meta = Box::new(Orientation::Horizontal, 16);
        let year = Label::new(None);
        let rating = Label::new(None);
        let license = Label::new(None);
        license.set_visible(false);
        meta.append(&year);
        meta.append(&rating);
        meta.append(&license);

        panel.append(&close_button);
        panel.append(&frame);
        panel.append(&title);
        panel.append(&meta);
        panel.append(&description);
        backdrop.append(&panel);

        let sender = events.clone();
        close_button.connect_clicked(move |_| {
            let _ = sender.send_blocking(UiEvent::DismissPlayer(Dismissal::CloseButton));
        });

        // Clicks that land on the backdrop itself, not on the panel.
        let outside_click = gtk::GestureClick::new();
        let weak_backdrop = backdrop.downgrade();
        let sender = events.clone();
        outside_click.connect_pressed(move |_, _, x, y| {
            let Some(backdrop) = weak_backdrop.upgrade() else {
                return;
            };
            let picked = backdrop.pick(x, y, gtk::PickFlags::DEFAULT);
            if picked.as_ref() == Some(backdrop.upcast_ref::<gtk::Widget>()) {
                let _ = sender.send_blocking(UiEvent::DismissPlayer(Dismissal::Backdrop));
            }
        });
        backdrop.add_controller(outside_click);

        Self {
            backdrop,
            frame,
            title,
            description,
            year,
            rating,
            license,
        }
    }

    pub fn widget(&self) -> &Box {
        &self.backdrop
    }

    pub fn open(&self, model: &PlayerModel) {
        self.unmount_frame();
        self.mount_frame(model);

        self.title
            .set_markup(&format!("<span size='x-large' weight='bold'>{}</span>", glib::markup_escape_text(&model.title)));
        self.description.set_text(&model.description);
        self.year.set_text(&model.year);
        self.rating.set_text(&model.rating);
        match &model.license {
            Some(license) => {
                self.license.set_text(license);
                self.license.set_visible(true);
            }
            None => self.license.set_visible(false),
        }

        self.backdrop.set_visible(true);
    }

    pub fn close(&self) {
        self.unmount_frame();
        self.backdrop.set_visible(false);
    }

    /// Embeds a web frame pointed at the resolved trailer URL. Provider
    /// player pages and direct media files both load here.
    fn mount_frame(&self, model: &PlayerModel) {
        let settings = webkit6::Settings::builder()
            .media_playback_requires_user_gesture(false)
            .enable_fullscreen(true)
            .build();
        let web_view = WebView::builder().settings(&settings).build();
        web_view.set_vexpand(true);
        web_view.set_hexpand(true);
        web_view.load_uri(&model.embed.url);
        tracing::debug!(url = %model.embed.url, kind = ?model.embed.kind, "Trailer frame mounted");
        self.frame.append(&web_view);
    }

    /// Stops any playback and removes every child of the frame.
    fn unmount_frame(&self) {
        while let Some(child) = self.frame.first_child() {
            if let Some(web_view) = child.downcast_ref::<WebView>() {
                web_view.stop_loading();
                web_view.load_uri(BLANK_PAGE);
                web_view.terminate_web_process();
            }
            self.frame.remove(&child);
        }
    }
}

/// Listens for Escape on a widget until dropped.
pub struct KeySubscription {
    widget: gtk::Widget,
    controller: gtk::EventControllerKey,
}

impl KeySubscription {
    pub fn attach(widget: &impl IsA<gtk::Widget>, events: async_channel::Sender<UiEvent>) -> Self {
        let controller = gtk::EventControllerKey::new();
        controller.set_propagation_phase(gtk::PropagationPhase::Capture);
        controller.connect_key_pressed(move |_, key, _, _| {
            if key == gtk::gdk::Key::Escape {
                let _ = events.send_blocking(UiEvent::DismissPlayer(Dismissal::EscapeKey));
                glib::Propagation::Stop
            } else {
                glib::Propagation::Proceed
            }
        });

        let widget: gtk::Widget = widget.clone().upcast();
        widget.add_controller(controller.clone());
        Self { widget, controller }
    }
}

impl Drop for KeySubscription {
    fn drop(&mut self) {
        self.widget.remove_controller(&self.controller);
    }
}
