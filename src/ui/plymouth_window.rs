use gtk4 as gtk;
use gtk::prelude::*;
use gtk::glib;
use libadwaita as adw;
use adw::prelude::*;

use std::rc::Rc;

use crate::backend::command::CommandStep;
use crate::backend::plymouth::{self, PlymouthTools};
use crate::backend::task::{self, CancelToken, TaskEvent, TaskSlot};
use crate::config::Config;
use crate::ui::progress_panel::ProgressPanel;
use crate::ui::{dialogs, pump_events};

const PREVIEW_SIZE: i32 = 256;
const MISSING_TOOLS: &str = "The Plymouth tools were not found on this system.\n\n\
     Install the plymouth and plymouth-themes packages, then reopen this window.";
const MISSING_SET_THEME: &str = "plymouth-set-default-theme was not found, so themes can be \
     browsed but not applied.\n\n\
     Install the plymouth-themes package to change the boot splash.";

struct PlymouthManager {
    window: adw::ApplicationWindow,
    tools: PlymouthTools,
    themes: gtk::StringList,
    dropdown: gtk::DropDown,
    current_label: gtk::Label,
    status_label: gtk::Label,
    preview: gtk::Image,
    progress: ProgressPanel,
    progress_frame: gtk::Frame,
    apply_button: gtk::Button,
    refresh_button: gtk::Button,
    slot: TaskSlot,
    cancel: CancelToken,
}

impl PlymouthManager {
    fn selected_theme(&self) -> Option<String> {
        let pos = self.dropdown.selected();
        if pos == gtk::INVALID_LIST_POSITION {
            return None;
        }
        self.themes.string(pos).map(|s| s.to_string())
    }

    fn set_status(&self, text: &str, ok: bool) {
        self.status_label.set_text(text);
        self.status_label.remove_css_class("status-ok");
        self.status_label.remove_css_class("status-error");
        self.status_label
            .add_css_class(if ok { "status-ok" } else { "status-error" });
    }

    fn update_current(&self) -> Option<String> {
        match self.tools.current_theme() {
            Ok(current) => {
                let shown = current.as_deref().unwrap_or("Unknown");
                self.current_label.set_text(&format!("Current theme: {}", shown));
                current
            }
            Err(e) => {
                log::warn!("Could not read current Plymouth theme: {}", e);
                self.current_label.set_text("Current theme: Unknown");
                None
            }
        }
    }

    fn update_preview(&self) {
        let preview = self.selected_theme().and_then(|t| plymouth::find_preview(&t));
        match preview {
            Some(path) => {
                log::debug!("Preview {}", path.display());
                self.preview.set_from_file(Some(&path));
            }
            None => self.preview.set_icon_name(Some("image-missing")),
        }
    }

    /// Reload the theme list and current theme. Returns false when listing
    /// failed and an error was shown.
    fn refresh(&self) -> bool {
        let themes = match self.tools.list_themes() {
            Ok(themes) => themes,
            Err(e) => {
                self.set_status("Could not list themes", false);
                dialogs::error(&self.window, &e);
                return false;
            }
        };

        let names: Vec<&str> = themes.iter().map(String::as_str).collect();
        self.themes.splice(0, self.themes.n_items(), &names);

        let current = self.update_current();
        let selected = current
            .and_then(|c| themes.iter().position(|t| *t == c))
            .unwrap_or(0);
        self.dropdown.set_selected(selected as u32);
        self.update_preview();
        self.set_status(&format!("{} themes available", themes.len()), true);
        true
    }

    fn set_busy(&self, busy: bool) {
        self.apply_button.set_sensitive(!busy && self.tools.can_apply());
        self.refresh_button.set_sensitive(!busy && self.tools.can_list());
        self.dropdown.set_sensitive(!busy);
        self.progress_frame.set_visible(busy);
    }

    fn apply(self: &Rc<Self>) {
        let Some(theme) = self.selected_theme() else {
            dialogs::warning(&self.window, "No theme selected", "Choose a theme from the list first.");
            return;
        };
        let Some(step) = self.tools.apply_step(&theme) else {
            dialogs::error(&self.window, MISSING_TOOLS);
            return;
        };

        let manager = self.clone();
        dialogs::confirm(
            &self.window,
            &format!("Switch to theme '{}'?", theme),
            Some("Requires administrator privileges"),
            "Apply",
            false,
            move || manager.start_apply(theme.clone(), step.clone()),
        );
    }

    fn start_apply(self: &Rc<Self>, theme: String, step: CommandStep) {
        let Some(guard) = self.slot.try_acquire() else {
            log::debug!("Apply ignored, another operation is running");
            return;
        };

        self.cancel.reset();
        self.progress.reset();
        self.set_busy(true);

        let cancel = self.cancel.clone();
        let worker_theme = theme.clone();
        let rx = match task::spawn_worker("plymouth-apply", guard, move |tx| {
            plymouth::apply_theme(step, &worker_theme, &cancel, tx, true);
        }) {
            Ok(rx) => rx,
            Err(e) => {
                self.set_busy(false);
                dialogs::error(&self.window, &e);
                return;
            }
        };

        let manager = self.clone();
        pump_events(rx, move |event| match event {
            TaskEvent::Progress { fraction, text } => {
                manager.progress.set_fraction(fraction);
                manager
                    .progress
                    .set_bar_text(&format!("{}%", (fraction * 100.0).round() as u32));
                manager.progress.set_status(&text);
            }
            TaskEvent::Line(_) => {}
            TaskEvent::Finished(result) => {
                manager.set_busy(false);
                manager.progress.reset();
                match result {
                    Ok(message) => {
                        manager.update_current();
                        manager.set_status(&format!("Theme '{}' is active", theme), true);
                        dialogs::info(&manager.window, &message);
                    }
                    Err(e) => {
                        manager.set_status("Theme change failed", false);
                        dialogs::error(&manager.window, &e);
                    }
                }
            }
        });
    }
}

pub fn build(app: &adw::Application, config: &Config) -> adw::ApplicationWindow {
    let window = adw::ApplicationWindow::builder()
        .application(app)
        .title("Plymouth Theme Manager")
        .default_width(config.plymouth_window.width)
        .default_height(config.plymouth_window.height)
        .build();

    let header = adw::HeaderBar::new();

    let content = gtk::Box::new(gtk::Orientation::Vertical, 10);
    content.set_margin_top(12);
    content.set_margin_bottom(12);
    content.set_margin_start(12);
    content.set_margin_end(12);

    let status_label = gtk::Label::new(Some("Detecting Plymouth..."));
    status_label.set_xalign(0.0);
    content.append(&status_label);

    let current_label = gtk::Label::new(Some("Current theme: Unknown"));
    current_label.set_xalign(0.0);
    current_label.add_css_class("section-title");
    content.append(&current_label);

    let themes = gtk::StringList::new(&[]);
    let dropdown = gtk::DropDown::builder().model(&themes).build();
    content.append(&dropdown);

    let preview = gtk::Image::from_icon_name("image-missing");
    preview.set_pixel_size(PREVIEW_SIZE);
    preview.set_vexpand(true);
    preview.add_css_class("theme-preview");
    let preview_frame = gtk::Frame::new(Some("Preview"));
    preview_frame.set_child(Some(&preview));
    content.append(&preview_frame);

    let progress = ProgressPanel::new(true);
    progress.widget.set_margin_top(6);
    progress.widget.set_margin_bottom(6);
    progress.widget.set_margin_start(6);
    progress.widget.set_margin_end(6);
    let progress_frame = gtk::Frame::new(Some("Progress"));
    progress_frame.set_child(Some(&progress.widget));
    progress_frame.set_visible(false);
    content.append(&progress_frame);

    let button_box = gtk::Box::new(gtk::Orientation::Horizontal, 6);
    button_box.set_homogeneous(true);
    let apply_button = gtk::Button::with_label("Apply theme");
    apply_button.add_css_class("suggested-action");
    let refresh_button = gtk::Button::with_label("Refresh list");
    let close_button = gtk::Button::with_label("Close");
    button_box.append(&apply_button);
    button_box.append(&refresh_button);
    button_box.append(&close_button);
    content.append(&button_box);

    let main_box = gtk::Box::new(gtk::Orientation::Vertical, 0);
    main_box.append(&header);
    main_box.append(&content);
    window.set_content(Some(&main_box));

    let manager = Rc::new(PlymouthManager {
        window: window.clone(),
        tools: PlymouthTools::detect(),
        themes,
        dropdown: dropdown.clone(),
        current_label,
        status_label,
        preview,
        progress,
        progress_frame,
        apply_button: apply_button.clone(),
        refresh_button: refresh_button.clone(),
        slot: TaskSlot::new(),
        cancel: CancelToken::new(),
    });

    if manager.tools.can_list() {
        manager.refresh();
    } else {
        manager.set_status("Plymouth is not installed", false);
        refresh_button.set_sensitive(false);
    }
    if !manager.tools.can_apply() {
        apply_button.set_sensitive(false);
        let detail = if manager.tools.can_list() { MISSING_SET_THEME } else { MISSING_TOOLS };
        let window_ref = window.clone();
        glib::idle_add_local_once(move || {
            dialogs::warning(&window_ref, "Missing dependencies", detail);
        });
    }

    let manager_ref = manager.clone();
    dropdown.connect_selected_notify(move |_| manager_ref.update_preview());

    let manager_ref = manager.clone();
    apply_button.connect_clicked(move |_| manager_ref.apply());

    let manager_ref = manager.clone();
    refresh_button.connect_clicked(move |_| {
        if manager_ref.slot.is_busy() {
            return;
        }
        if manager_ref.refresh() {
            dialogs::info(&manager_ref.window, "Theme list updated");
        }
    });

    let window_ref = window.clone();
    close_button.connect_clicked(move |_| window_ref.close());

    let manager_ref = manager.clone();
    let config_clone = config.clone();
    window.connect_close_request(move |win| {
        manager_ref.cancel.cancel();

        let mut cfg = config_clone.clone();
        cfg.plymouth_window.width = win.width();
        cfg.plymouth_window.height = win.height();
        cfg.save();
        glib::Propagation::Proceed
    });

    window
}
