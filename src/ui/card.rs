use gtk::prelude::*;
use gtk::{glib, Box, Label, Orientation};

use openstream::{Card, UiEvent};

use super::thumbnails::{Thumbnails, CARD_WIDTH, THUMBNAIL_HEIGHT};

pub fn create_card(card: &Card, thumbnails: &Thumbnails, events: &async_channel::Sender<UiEvent>) -> Box {
    let root = Box::new(Orientation::Vertical, 0);
    root.add_css_class("content-card");
    root.set_size_request(CARD_WIDTH, -1);
    root.set_cursor_from_name(Some("pointer"));

    let picture = gtk::Picture::new();
    picture.add_css_class("content-thumbnail");
    picture.set_content_fit(gtk::ContentFit::Cover);
    picture.set_size_request(CARD_WIDTH, THUMBNAIL_HEIGHT);
    picture.set_alternative_text(Some(&card.title));
    thumbnails.load_into(&card.thumbnail, &picture);
    root.append(&picture);

    let info = Box::new(Orientation::Vertical, 4);
    info.set_margin_start(10);
    info.set_margin_end(10);
    info.set_margin_top(8);
    info.set_margin_bottom(10);

    let type_label = Label::new(Some(&card.type_label));
    type_label.add_css_class("content-type");
    type_label.set_xalign(0.0);

    let title_label = Label::new(None);
    title_label.set_markup(&format!("<b>{}</b>", glib::markup_escape_text(&card.title)));
    title_label.set_xalign(0.0);
    title_label.set_wrap(true);

    let meta = Box::new(Orientation::Horizontal, 12);
    let year_label = Label::new(Some(&card.year));
    year_label.set_opacity(0.7);
    let rating_label = Label::new(Some(&card.rating));
    rating_label.add_css_class("content-rating");
    meta.append(&year_label);
    meta.append(&rating_label);

    let description_label = Label::new(Some(&card.description));
    description_label.set_xalign(0.0);
    description_label.set_wrap(true);
    description_label.set_lines(3);
    description_label.set_ellipsize(gtk::pango::EllipsizeMode::End);
    description_label.set_opacity(0.7);

    info.append(&type_label);
    info.append(&title_label);
    info.append(&meta);
    info.append(&description_label);

    if let Some(license) = &card.license {
        let license_label = Label::new(Some(license));
        license_label.set_xalign(0.0);
        license_label.set_opacity(0.6);
        info.append(&license_label);
    }

    root.append(&info);

    let click = gtk::GestureClick::new();
    let events = events.clone();
    let id = card.id;
    click.connect_released(move |_, _, _, _| {
        let _ = events.send_blocking(UiEvent::CardActivated(id));
    });
    root.add_controller(click);

    root
}
