use gtk4 as gtk;
use gtk::prelude::*;
use gtk::glib;
use libadwaita as adw;
use adw::prelude::*;

use std::path::Path;
use std::rc::Rc;
use std::time::Duration;

use crate::backend::command::{self, CommandPlan, CommandStep};
use crate::backend::task::{self, TaskEvent, TaskSlot};
use crate::backend::{autostart, hardware, software};
use crate::config::Config;
use crate::ui::progress_panel::ProgressPanel;
use crate::ui::{dialogs, pump_events};

const LOGO: &str = "/usr/share/branding-soplos/transparent-logo.png";
const RESET_DELAY: Duration = Duration::from_secs(1);

/// Shared state for every action in the wizard. All commands go through one
/// progress panel and one task slot.
struct Welcome {
    window: adw::ApplicationWindow,
    progress: ProgressPanel,
    slot: TaskSlot,
}

impl Welcome {
    fn run_plan(self: &Rc<Self>, plan: CommandPlan) {
        let Some(guard) = self.slot.try_acquire() else {
            log::debug!("'{}' ignored, another command is running", plan.label);
            return;
        };

        self.progress.reset();
        self.progress.set_status(&format!("{}...", plan.label));

        let rx = match task::spawn_worker("welcome-command", guard, move |tx| {
            let result = command::run_plan(&plan, tx).map(|_| plan.label.clone());
            let _ = tx.send(TaskEvent::Finished(result));
        }) {
            Ok(rx) => rx,
            Err(e) => {
                dialogs::error(&self.window, &e);
                return;
            }
        };

        let welcome = self.clone();
        pump_events(rx, move |event| match event {
            TaskEvent::Line(line) => welcome.progress.set_status(&line),
            TaskEvent::Progress { fraction, text } => {
                welcome.progress.set_fraction(fraction);
                welcome.progress.set_bar_text(&text);
            }
            TaskEvent::Finished(Ok(_)) => {
                welcome.progress.set_fraction(1.0);
                welcome.progress.set_bar_text("100%");
                welcome.progress.set_status("Completed!");
                welcome.progress.reset_after(RESET_DELAY);
            }
            TaskEvent::Finished(Err(e)) => {
                welcome.progress.set_status("Failed");
                welcome.progress.reset_after(RESET_DELAY);
                dialogs::error(&welcome.window, &e);
            }
        });
    }

    fn scan_hardware(self: &Rc<Self>) {
        let Some(guard) = self.slot.try_acquire() else {
            log::debug!("Hardware scan ignored, another command is running");
            return;
        };

        self.progress.reset();
        self.progress.set_status("Scanning hardware...");

        let rx = match task::spawn_worker("hardware-scan", guard, |tx| {
            let result = hardware::scan().map(|report| report.summary());
            let _ = tx.send(TaskEvent::Finished(result));
        }) {
            Ok(rx) => rx,
            Err(e) => {
                dialogs::error(&self.window, &e);
                return;
            }
        };

        let welcome = self.clone();
        pump_events(rx, move |event| match event {
            TaskEvent::Finished(Ok(summary)) => {
                welcome.progress.set_status(&summary);
                dialogs::info(&welcome.window, &summary);
            }
            TaskEvent::Finished(Err(e)) => {
                welcome.progress.set_status("Hardware scan failed");
                dialogs::error(&welcome.window, &e);
            }
            _ => {}
        });
    }

    fn launch(&self, result: Result<(), String>) {
        if let Err(e) = result {
            dialogs::error(&self.window, &e);
        }
    }
}

fn section_label(text: &str) -> gtk::Label {
    let label = gtk::Label::new(Some(text));
    label.set_xalign(0.0);
    label.set_margin_top(8);
    label.add_css_class("section-title");
    label
}

fn description(text: &str) -> gtk::Label {
    let label = gtk::Label::new(Some(text));
    label.set_xalign(0.0);
    label.set_wrap(true);
    label.add_css_class("dim-label");
    label
}

fn page() -> gtk::Box {
    let page = gtk::Box::new(gtk::Orientation::Vertical, 6);
    page.set_margin_top(10);
    page.set_margin_bottom(10);
    page.set_margin_start(10);
    page.set_margin_end(10);
    page
}

fn scrolled(child: &gtk::Box) -> gtk::ScrolledWindow {
    gtk::ScrolledWindow::builder()
        .hscrollbar_policy(gtk::PolicyType::Never)
        .vexpand(true)
        .child(child)
        .build()
}

fn plan_button(welcome: &Rc<Welcome>, label: &str, plan: impl Fn() -> CommandPlan + 'static) -> gtk::Button {
    let button = gtk::Button::with_label(label);
    let welcome = welcome.clone();
    button.connect_clicked(move |_| welcome.run_plan(plan()));
    button
}

fn launch_button(welcome: &Rc<Welcome>, label: &str, launch: impl Fn() -> Result<(), String> + 'static) -> gtk::Button {
    let button = gtk::Button::with_label(label);
    let welcome = welcome.clone();
    button.connect_clicked(move |_| welcome.launch(launch()));
    button
}

fn software_page(welcome: &Rc<Welcome>) -> gtk::ScrolledWindow {
    let page = page();

    page.append(&section_label("System"));
    let system_row = gtk::Box::new(gtk::Orientation::Horizontal, 6);
    system_row.set_homogeneous(true);
    system_row.append(&plan_button(welcome, "Update repositories", software::update_repositories));
    system_row.append(&plan_button(welcome, "Upgrade system", software::upgrade_system));
    page.append(&system_row);

    page.append(&section_label("Applications"));
    let grid = gtk::Grid::new();
    grid.set_row_spacing(6);
    grid.set_column_spacing(6);
    for (row, option) in software::SOFTWARE_OPTIONS.iter().enumerate() {
        let row = row as i32;
        let name = gtk::Label::new(Some(option.label));
        name.set_xalign(0.0);
        name.set_hexpand(true);
        grid.attach(&name, 0, row, 1, 1);

        let option = *option;
        grid.attach(
            &plan_button(welcome, "Install", move || software::install(option.label, option.packages)),
            1,
            row,
            1,
            1,
        );
        grid.attach(
            &plan_button(welcome, "Uninstall", move || software::uninstall(option.label, option.packages)),
            2,
            row,
            1,
            1,
        );
    }
    page.append(&grid);

    page.append(&section_label("Stores"));
    let store_row = gtk::Box::new(gtk::Orientation::Horizontal, 6);
    store_row.set_homogeneous(true);
    store_row.append(&plan_button(welcome, "Add Flathub", software::add_flathub));
    store_row.append(&plan_button(welcome, "Enable Snap", software::enable_snap));
    page.append(&store_row);

    page.append(&section_label("Maintenance"));
    page.append(&plan_button(welcome, "Clean system", software::clean_system));

    scrolled(&page)
}

fn drivers_page(welcome: &Rc<Welcome>) -> gtk::ScrolledWindow {
    let page = page();
    page.append(&description(
        "Install proprietary drivers for your hardware for better performance.",
    ));

    // Options are listed grouped; a new heading starts each group.
    let mut group: Option<(&str, gtk::Box)> = None;
    for option in software::DRIVER_OPTIONS {
        let group_row = match &group {
            Some((name, row)) if *name == option.group => row.clone(),
            _ => {
                page.append(&section_label(option.group));
                let row = gtk::Box::new(gtk::Orientation::Horizontal, 6);
                row.set_homogeneous(true);
                page.append(&row);
                group = Some((option.group, row.clone()));
                row
            }
        };
        group_row.append(&plan_button(welcome, option.label, move || {
            software::install(option.label, option.packages)
        }));
    }

    page.append(&section_label("Hardware"));
    let scan_button = gtk::Button::with_label("Scan hardware");
    let welcome_ref = welcome.clone();
    scan_button.connect_clicked(move |_| welcome_ref.scan_hardware());
    page.append(&scan_button);

    scrolled(&page)
}

fn customization_page(welcome: &Rc<Welcome>) -> gtk::ScrolledWindow {
    let page = page();

    page.append(&section_label("Desktop"));
    let grid = gtk::Grid::new();
    grid.set_row_spacing(6);
    grid.set_column_spacing(6);
    grid.set_column_homogeneous(true);
    let launchers = [
        launch_button(welcome, "Change panels", || command::launch_sibling("themes")),
        launch_button(welcome, "Arrange Docklike", || command::launch_sibling("dock")),
        launch_button(welcome, "Change wallpaper", || {
            command::spawn_detached(&CommandStep::new("xfdesktop-settings", &[]))
        }),
        launch_button(welcome, "Customize GRUB", || {
            command::spawn_detached(&CommandStep::new("grub-customizer", &[]))
        }),
        launch_button(welcome, "Customize Plymouth", || command::launch_sibling("plymouth")),
    ];
    for (i, button) in launchers.iter().enumerate() {
        grid.attach(button, (i % 2) as i32, (i / 2) as i32, 1, 1);
    }
    page.append(&grid);

    page.append(&section_label("Liquorix kernel"));
    page.append(&description(
        "Installs the high-performance Liquorix kernel, tuned for gaming and multimedia work.",
    ));
    let kernel_row = gtk::Box::new(gtk::Orientation::Horizontal, 6);
    kernel_row.set_homogeneous(true);
    kernel_row.append(&plan_button(welcome, "Install curl", software::install_curl));
    kernel_row.append(&plan_button(welcome, "Install Liquorix kernel", software::install_liquorix));
    page.append(&kernel_row);

    scrolled(&page)
}

pub fn build(app: &adw::Application, config: &Config) -> adw::ApplicationWindow {
    let window = adw::ApplicationWindow::builder()
        .application(app)
        .title("Welcome to Soplos Linux")
        .default_width(config.welcome_window.width)
        .default_height(config.welcome_window.height)
        .build();

    let header = adw::HeaderBar::new();

    let content = gtk::Box::new(gtk::Orientation::Vertical, 10);
    content.set_margin_top(12);
    content.set_margin_bottom(12);
    content.set_margin_start(12);
    content.set_margin_end(12);

    if Path::new(LOGO).exists() {
        let logo = gtk::Image::from_file(LOGO);
        logo.set_pixel_size(96);
        content.append(&logo);
    }

    let title = gtk::Label::new(Some("Welcome to Soplos Linux"));
    title.add_css_class("welcome-title");
    content.append(&title);
    let subtitle = gtk::Label::new(Some(
        "Set up software, drivers and the look of your desktop from one place.",
    ));
    subtitle.set_wrap(true);
    content.append(&subtitle);

    let autostart_path = autostart::entry_path();
    let autostart_check = gtk::CheckButton::with_label("Run at startup");
    autostart_check.set_halign(gtk::Align::Center);
    autostart_check.set_active(autostart::is_enabled(&autostart_path));
    content.append(&autostart_check);

    let progress = ProgressPanel::new(true);
    let welcome = Rc::new(Welcome {
        window: window.clone(),
        progress: progress.clone(),
        slot: TaskSlot::new(),
    });

    let notebook = gtk::Notebook::new();
    notebook.set_vexpand(true);
    notebook.append_page(&software_page(&welcome), Some(&gtk::Label::new(Some("Software"))));
    notebook.append_page(&drivers_page(&welcome), Some(&gtk::Label::new(Some("Drivers"))));
    notebook.append_page(
        &customization_page(&welcome),
        Some(&gtk::Label::new(Some("Customization"))),
    );
    content.append(&notebook);

    content.append(&progress.widget);

    let exit_button = gtk::Button::with_label("Exit");
    exit_button.set_halign(gtk::Align::End);
    content.append(&exit_button);

    let main_box = gtk::Box::new(gtk::Orientation::Vertical, 0);
    main_box.append(&header);
    main_box.append(&content);
    window.set_content(Some(&main_box));

    let window_ref = window.clone();
    autostart_check.connect_toggled(move |check| {
        if let Err(e) = autostart::set_enabled(&autostart_path, check.is_active(), &autostart::welcome_exec()) {
            dialogs::error(&window_ref, &e);
        }
    });

    let window_ref = window.clone();
    exit_button.connect_clicked(move |_| window_ref.close());

    let config_clone = config.clone();
    window.connect_close_request(move |win| {
        let mut cfg = config_clone.clone();
        cfg.welcome_window.width = win.width();
        cfg.welcome_window.height = win.height();
        cfg.save();
        glib::Propagation::Proceed
    });

    window
}
