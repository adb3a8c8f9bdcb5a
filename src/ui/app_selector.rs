use gtk4 as gtk;
use gtk::prelude::*;
use gtk::glib;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::backend::{application_dirs, DesktopResolver};
use crate::model::DesktopApp;
use crate::ui::icon_image;

const SELECT_ALL: &str = "Select all";
const DESELECT_ALL: &str = "Deselect all";

struct SelectorRow {
    app: DesktopApp,
    check: gtk::CheckButton,
}

/// Modal picker over the installed applications. `on_done` receives the
/// checked desktop-file paths in list order; it is not called on cancel.
pub fn open(
    parent: &impl IsA<gtk::Window>,
    resolver: &DesktopResolver,
    on_done: impl Fn(Vec<String>) + 'static,
) {
    let dialog = gtk::Window::builder()
        .title("Select applications")
        .transient_for(parent)
        .modal(true)
        .default_width(600)
        .default_height(500)
        .build();

    let content = gtk::Box::new(gtk::Orientation::Vertical, 6);
    content.set_margin_top(10);
    content.set_margin_bottom(10);
    content.set_margin_start(10);
    content.set_margin_end(10);

    let intro = gtk::Label::new(Some("Choose the applications to add to the dock:"));
    intro.set_xalign(0.0);
    content.append(&intro);

    let search_entry = gtk::SearchEntry::new();
    search_entry.set_placeholder_text(Some("Search applications..."));
    content.append(&search_entry);

    let list_box = gtk::ListBox::new();
    list_box.set_selection_mode(gtk::SelectionMode::None);
    list_box.add_css_class("boxed-list");

    let apps = resolver.scan_applications(&application_dirs());
    let rows: Rc<Vec<SelectorRow>> = Rc::new(
        apps.into_iter()
            .map(|app| {
                let check = gtk::CheckButton::new();
                let row_box = gtk::Box::new(gtk::Orientation::Horizontal, 8);
                row_box.set_margin_top(4);
                row_box.set_margin_bottom(4);
                row_box.set_margin_start(6);
                row_box.append(&check);
                row_box.append(&icon_image(&app.icon_hint, 32));
                let name = gtk::Label::new(Some(&app.name));
                name.set_xalign(0.0);
                name.set_hexpand(true);
                name.set_ellipsize(gtk::pango::EllipsizeMode::End);
                row_box.append(&name);
                list_box.append(&row_box);
                SelectorRow { app, check }
            })
            .collect(),
    );

    let scroll = gtk::ScrolledWindow::builder()
        .hscrollbar_policy(gtk::PolicyType::Never)
        .vexpand(true)
        .min_content_height(350)
        .child(&list_box)
        .build();
    content.append(&scroll);

    let status_box = gtk::Box::new(gtk::Orientation::Horizontal, 6);
    let status_label = gtk::Label::new(None);
    status_label.set_xalign(0.0);
    status_label.set_hexpand(true);
    status_box.append(&status_label);
    let select_all_button = gtk::Button::with_label(SELECT_ALL);
    status_box.append(&select_all_button);
    content.append(&status_box);

    let action_box = gtk::Box::new(gtk::Orientation::Horizontal, 6);
    action_box.set_halign(gtk::Align::End);
    let cancel_button = gtk::Button::with_label("Cancel");
    let add_button = gtk::Button::with_label("Add");
    add_button.add_css_class("suggested-action");
    action_box.append(&cancel_button);
    action_box.append(&add_button);
    content.append(&action_box);

    dialog.set_child(Some(&content));

    let query = Rc::new(RefCell::new(String::new()));
    let is_visible = {
        let query = query.clone();
        move |app: &DesktopApp| {
            let q = query.borrow();
            q.is_empty() || app.name.to_lowercase().contains(q.as_str())
        }
    };
    let is_visible = Rc::new(is_visible);

    let update_status = {
        let rows = rows.clone();
        let is_visible = is_visible.clone();
        let status_label = status_label.clone();
        let query = query.clone();
        Rc::new(move || {
            let visible = rows.iter().filter(|r| is_visible(&r.app)).count();
            let selected = rows.iter().filter(|r| r.check.is_active()).count();
            let text = if selected > 0 {
                format!("Selected {} of {} applications", selected, visible)
            } else if query.borrow().is_empty() {
                format!("Showing {} applications", visible)
            } else {
                format!("Showing {} search results", visible)
            };
            status_label.set_text(&text);
        })
    };
    update_status();

    for row in rows.iter() {
        let update_status = update_status.clone();
        row.check.connect_toggled(move |_| update_status());
    }

    {
        let rows = rows.clone();
        let is_visible = is_visible.clone();
        list_box.set_filter_func(move |row| {
            usize::try_from(row.index())
                .ok()
                .and_then(|i| rows.get(i))
                .map(|r| is_visible(&r.app))
                .unwrap_or(false)
        });
    }

    let selecting_all = Rc::new(Cell::new(true));
    {
        let list_box = list_box.clone();
        let query = query.clone();
        let update_status = update_status.clone();
        let select_all_button = select_all_button.clone();
        let selecting_all = selecting_all.clone();
        search_entry.connect_search_changed(move |entry| {
            *query.borrow_mut() = entry.text().to_lowercase();
            list_box.invalidate_filter();
            selecting_all.set(true);
            select_all_button.set_label(SELECT_ALL);
            update_status();
        });
    }

    {
        let rows = rows.clone();
        let is_visible = is_visible.clone();
        select_all_button.connect_clicked(move |button| {
            let select = selecting_all.get();
            for row in rows.iter().filter(|r| is_visible(&r.app)) {
                row.check.set_active(select);
            }
            selecting_all.set(!select);
            button.set_label(if select { DESELECT_ALL } else { SELECT_ALL });
        });
    }

    {
        let dialog = dialog.clone();
        cancel_button.connect_clicked(move |_| dialog.close());
    }

    {
        let dialog_ref = dialog.clone();
        add_button.connect_clicked(move |_| {
            let chosen: Vec<String> = rows
                .iter()
                .filter(|r| r.check.is_active())
                .map(|r| r.app.path.clone())
                .collect();
            log::info!("Selected {} applications to pin", chosen.len());
            dialog_ref.close();
            on_done(chosen);
        });
    }

    let key_controller = gtk::EventControllerKey::new();
    let dialog_ref = dialog.clone();
    key_controller.connect_key_pressed(move |_, key, _, _| {
        if key == gtk::gdk::Key::Escape {
            dialog_ref.close();
            glib::Propagation::Stop
        } else {
            glib::Propagation::Proceed
        }
    });
    dialog.add_controller(key_controller);

    dialog.present();
    search_entry.grab_focus();
}
