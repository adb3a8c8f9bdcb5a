pub mod app_selector;
pub mod dialogs;
pub mod dock_window;
pub mod plymouth_window;
pub mod progress_panel;
pub mod theme_window;
pub mod welcome_window;

use gtk4 as gtk;
use gtk::prelude::*;
use gtk::glib;
use std::time::Duration;

use crate::backend::resolve_icon;
use crate::backend::task::TaskEvent;
use crate::model::IconSource;

/// Drain worker events on the main loop until the worker hangs up.
pub fn pump_events(rx: flume::Receiver<TaskEvent>, mut handle: impl FnMut(TaskEvent) + 'static) {
    glib::timeout_add_local(Duration::from_millis(50), move || loop {
        match rx.try_recv() {
            Ok(event) => handle(event),
            Err(flume::TryRecvError::Empty) => return glib::ControlFlow::Continue,
            Err(flume::TryRecvError::Disconnected) => return glib::ControlFlow::Break,
        }
    });
}

/// Image for a desktop entry's icon hint, via the display's icon theme.
pub fn icon_image(hint: &str, pixel_size: i32) -> gtk::Image {
    let theme = gtk::gdk::Display::default().map(|d| gtk::IconTheme::for_display(&d));
    let source = resolve_icon(hint, |name| {
        theme.as_ref().map(|t| t.has_icon(name)).unwrap_or(false)
    });

    let image = match source {
        IconSource::File(path) => gtk::Image::from_file(path),
        IconSource::Themed(name) => gtk::Image::from_icon_name(&name),
        IconSource::Placeholder => gtk::Image::from_icon_name(IconSource::PLACEHOLDER_NAME),
    };
    image.set_pixel_size(pixel_size);
    image
}
