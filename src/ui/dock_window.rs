use gtk4 as gtk;
use gtk::prelude::*;
use gtk::glib;
use libadwaita as adw;
use adw::prelude::*;

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::Rc;

use crate::backend::docklike;
use crate::backend::DesktopResolver;
use crate::config::Config;
use crate::model::{DesktopApp, MoveDirection, PinnedList};
use crate::ui::{app_selector, dialogs, icon_image};

/// Editor state for the pinned list. Rows are rebuilt from `pinned` after
/// every change.
struct DockEditor {
    window: adw::ApplicationWindow,
    list_box: gtk::ListBox,
    rc_path: PathBuf,
    pinned: RefCell<PinnedList>,
    apps: RefCell<HashMap<String, DesktopApp>>,
    resolver: DesktopResolver,
    dirty: Cell<bool>,
    restart_panel: bool,
}

impl DockEditor {
    fn app_for(&self, path: &str) -> DesktopApp {
        self.apps
            .borrow_mut()
            .entry(path.to_string())
            .or_insert_with(|| self.resolver.resolve(path))
            .clone()
    }

    fn rebuild(&self, select: Option<usize>) {
        self.list_box.remove_all();
        let entries = self.pinned.borrow().entries().to_vec();
        for path in &entries {
            let app = self.app_for(path);
            let row = adw::ActionRow::builder()
                .title(app.name.as_str())
                .subtitle(app.path.as_str())
                .use_markup(false)
                .build();
            row.add_prefix(&icon_image(&app.icon_hint, 32));
            self.list_box.append(&row);
        }

        if let Some(idx) = select {
            if let Some(row) = i32::try_from(idx).ok().and_then(|i| self.list_box.row_at_index(i)) {
                self.list_box.select_row(Some(&row));
                row.grab_focus();
            }
        }
    }

    fn selected_index(&self) -> Option<usize> {
        self.list_box
            .selected_row()
            .and_then(|row| usize::try_from(row.index()).ok())
    }

    fn move_selected(&self, direction: MoveDirection) {
        let Some(idx) = self.selected_index() else {
            return;
        };
        let moved = self.pinned.borrow_mut().move_entry(idx, direction);
        if let Some(new_idx) = moved {
            self.dirty.set(true);
            self.rebuild(Some(new_idx));
        }
    }

    fn remove_selected(self: &Rc<Self>) {
        let Some(idx) = self.selected_index() else {
            return;
        };
        let Some(path) = self.pinned.borrow().entries().get(idx).cloned() else {
            return;
        };
        let name = self.app_for(&path).name;

        let editor = self.clone();
        dialogs::confirm(
            &self.window,
            &format!("Remove '{}' from the dock?", name),
            None,
            "Remove",
            true,
            move || {
                let remaining = {
                    let mut pinned = editor.pinned.borrow_mut();
                    pinned.remove(idx);
                    pinned.len()
                };
                log::info!("Unpinned {}", path);
                editor.dirty.set(true);
                editor.rebuild((remaining > 0).then(|| idx.min(remaining - 1)));
            },
        );
    }

    fn add_applications(self: &Rc<Self>) {
        let editor = self.clone();
        app_selector::open(&self.window, &self.resolver, move |paths| {
            let added = editor.pinned.borrow_mut().add(paths);
            if added.is_empty() {
                return;
            }
            log::info!("Pinned {} new applications", added.len());
            editor.dirty.set(true);
            let last = editor.pinned.borrow().len() - 1;
            editor.rebuild(Some(last));
        });
    }

    fn save(&self) {
        let result = docklike::save(&self.rc_path, &self.pinned.borrow());
        match result {
            Ok(()) => {
                self.dirty.set(false);
                if self.restart_panel {
                    if let Err(e) = docklike::restart_panel() {
                        log::warn!("{}", e);
                    }
                }
                dialogs::notice_then_close(&self.window, gtk::MessageType::Info, "Changes saved");
            }
            Err(e) => dialogs::error(&self.window, &format!("Could not save changes: {}", e)),
        }
    }
}

pub fn build(
    app: &adw::Application,
    config: &Config,
    rc_path: Option<PathBuf>,
) -> adw::ApplicationWindow {
    let window = adw::ApplicationWindow::builder()
        .application(app)
        .title("Arrange Docklike icons")
        .default_width(config.dock_window.width)
        .default_height(config.dock_window.height)
        .build();

    let rc_path = rc_path.unwrap_or_else(docklike::default_rc_path);
    let pinned = match docklike::load(&rc_path) {
        Ok(list) => list,
        Err(e) => {
            log::error!("{}", e);
            window.set_content(Some(&gtk::Box::new(gtk::Orientation::Vertical, 0)));
            let window_ref = window.clone();
            let message = e.to_string();
            glib::idle_add_local_once(move || {
                dialogs::notice_then_close(&window_ref, gtk::MessageType::Error, &message);
            });
            return window;
        }
    };

    let header = adw::HeaderBar::new();

    let title = gtk::Label::new(None);
    title.set_markup("<b>Arrange pinned icons</b>");
    title.set_margin_top(10);
    title.set_margin_bottom(10);

    let list_box = gtk::ListBox::new();
    list_box.set_selection_mode(gtk::SelectionMode::Single);
    list_box.add_css_class("pinned-list");

    let scroll = gtk::ScrolledWindow::builder()
        .hscrollbar_policy(gtk::PolicyType::Never)
        .min_content_height(300)
        .vexpand(true)
        .child(&list_box)
        .build();

    let editor = Rc::new(DockEditor {
        window: window.clone(),
        list_box: list_box.clone(),
        rc_path,
        pinned: RefCell::new(pinned),
        apps: RefCell::new(HashMap::new()),
        resolver: DesktopResolver::new(),
        dirty: Cell::new(false),
        restart_panel: config.restart_panel_after_save,
    });
    editor.rebuild(None);

    // Reorder/remove row
    let edit_box = gtk::Box::new(gtk::Orientation::Horizontal, 6);
    edit_box.set_homogeneous(true);
    let up_button = gtk::Button::with_label("Move up");
    let down_button = gtk::Button::with_label("Move down");
    let remove_button = gtk::Button::with_label("Remove");
    edit_box.append(&up_button);
    edit_box.append(&down_button);
    edit_box.append(&remove_button);

    let add_button = gtk::Button::with_label("Add application");

    // Save/close row
    let action_box = gtk::Box::new(gtk::Orientation::Horizontal, 6);
    action_box.set_homogeneous(true);
    let save_button = gtk::Button::with_label("Save");
    save_button.add_css_class("suggested-action");
    let close_button = gtk::Button::with_label("Close");
    action_box.append(&save_button);
    action_box.append(&close_button);

    let controls = gtk::Box::new(gtk::Orientation::Vertical, 10);
    controls.set_margin_top(10);
    controls.set_margin_bottom(10);
    controls.set_margin_start(10);
    controls.set_margin_end(10);
    controls.append(&edit_box);
    controls.append(&add_button);
    controls.append(&action_box);

    let main_box = gtk::Box::new(gtk::Orientation::Vertical, 0);
    main_box.append(&header);
    main_box.append(&title);
    main_box.append(&scroll);
    main_box.append(&controls);
    window.set_content(Some(&main_box));

    let editor_ref = editor.clone();
    up_button.connect_clicked(move |_| editor_ref.move_selected(MoveDirection::Up));
    let editor_ref = editor.clone();
    down_button.connect_clicked(move |_| editor_ref.move_selected(MoveDirection::Down));
    let editor_ref = editor.clone();
    remove_button.connect_clicked(move |_| editor_ref.remove_selected());
    let editor_ref = editor.clone();
    add_button.connect_clicked(move |_| editor_ref.add_applications());
    let editor_ref = editor.clone();
    save_button.connect_clicked(move |_| editor_ref.save());
    let window_ref = window.clone();
    close_button.connect_clicked(move |_| window_ref.close());

    // Unsaved changes are discarded only after confirmation
    let editor_ref = editor.clone();
    let config_clone = config.clone();
    window.connect_close_request(move |win| {
        if editor_ref.dirty.get() {
            let editor = editor_ref.clone();
            dialogs::confirm(
                win,
                "Close without saving?",
                Some("Your changes to the dock order will be lost."),
                "Discard",
                true,
                move || {
                    editor.dirty.set(false);
                    editor.window.close();
                },
            );
            return glib::Propagation::Stop;
        }

        let mut cfg = config_clone.clone();
        cfg.dock_window.width = win.width();
        cfg.dock_window.height = win.height();
        cfg.save();
        glib::Propagation::Proceed
    });

    window
}
