use gtk4 as gtk;
use gtk::prelude::*;
use libadwaita as adw;
use adw::prelude::*;

use std::path::PathBuf;

use crate::backend::task::{self, TaskEvent, TaskSlot};
use crate::backend::theme_helpers::ThemeHelper;
use crate::config::Config;
use crate::ui::{dialogs, pump_events};

fn launcher_button(label: &str, icon_name: &str) -> gtk::Button {
    let row = gtk::Box::new(gtk::Orientation::Horizontal, 10);
    row.append(&gtk::Image::from_icon_name(icon_name));
    let text = gtk::Label::new(Some(label));
    text.set_xalign(0.0);
    row.append(&text);

    let button = gtk::Button::builder().child(&row).build();
    button.add_css_class("launcher-button");
    button
}

fn run_helper(
    window: &adw::ApplicationWindow,
    slot: &TaskSlot,
    helper: ThemeHelper,
    helper_dir: PathBuf,
) {
    let Some(guard) = slot.try_acquire() else {
        log::debug!("{} ignored, a helper is already running", helper.binary());
        return;
    };

    let rx = match task::spawn_worker(helper.binary(), guard, move |tx| {
        let result = helper.run(&helper_dir).map(|()| String::new());
        let _ = tx.send(TaskEvent::Finished(result));
    }) {
        Ok(rx) => rx,
        Err(e) => {
            dialogs::error(window, &e);
            return;
        }
    };

    let window = window.clone();
    pump_events(rx, move |event| {
        if let TaskEvent::Finished(Err(e)) = event {
            dialogs::error(&window, &format!("{} failed:\n{}", helper.label(), e));
        }
    });
}

pub fn build(app: &adw::Application, config: &Config) -> adw::ApplicationWindow {
    let window = adw::ApplicationWindow::builder()
        .application(app)
        .title("Theme Manager")
        .default_width(config.themes_window.width)
        .default_height(config.themes_window.height)
        .resizable(false)
        .build();

    let header = adw::HeaderBar::new();

    let buttons = gtk::Box::new(gtk::Orientation::Vertical, 8);
    buttons.set_margin_top(16);
    buttons.set_margin_bottom(16);
    buttons.set_margin_start(16);
    buttons.set_margin_end(16);

    let slot = TaskSlot::new();
    for helper in ThemeHelper::ALL {
        let button = launcher_button(helper.label(), helper.icon_name());
        if !helper.is_available(&config.theme_helper_dir) {
            log::warn!("{} missing", helper.path(&config.theme_helper_dir).display());
            button.set_sensitive(false);
            button.set_tooltip_text(Some(&format!(
                "{} is not installed in {}",
                helper.binary(),
                config.theme_helper_dir.display()
            )));
        }

        let window_ref = window.clone();
        let slot = slot.clone();
        let helper_dir = config.theme_helper_dir.clone();
        button.connect_clicked(move |_| run_helper(&window_ref, &slot, helper, helper_dir.clone()));
        buttons.append(&button);
    }

    let quit_button = launcher_button("Quit", "application-exit");
    let window_ref = window.clone();
    quit_button.connect_clicked(move |_| window_ref.close());
    buttons.append(&quit_button);

    let main_box = gtk::Box::new(gtk::Orientation::Vertical, 0);
    main_box.append(&header);
    main_box.append(&buttons);
    window.set_content(Some(&main_box));

    let config_clone = config.clone();
    window.connect_close_request(move |win| {
        let mut cfg = config_clone.clone();
        cfg.themes_window.width = win.width();
        cfg.themes_window.height = win.height();
        cfg.save();
        gtk::glib::Propagation::Proceed
    });

    window
}
