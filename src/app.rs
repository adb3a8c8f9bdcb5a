use gtk4 as gtk;
use gtk::prelude::*;
use libadwaita as adw;
use adw::prelude::*;

use crate::config::Config;
use crate::ui::{dock_window, plymouth_window, theme_window, welcome_window};
use crate::Tool;
use crate::APP_ID_PREFIX;
use crate::CSS;

pub struct SoplosApp {
    app: adw::Application,
}

impl SoplosApp {
    pub fn new(tool: Tool) -> Self {
        let app = adw::Application::builder()
            .application_id(app_id(&tool))
            .build();

        app.connect_startup(|_| {
            load_css();
        });

        app.connect_activate(move |app| {
            if let Some(window) = app.active_window() {
                window.present();
                return;
            }

            let config = Config::load();
            if config.prefer_dark {
                adw::StyleManager::default().set_color_scheme(adw::ColorScheme::PreferDark);
            }

            let window = match &tool {
                Tool::Dock { config: rc_path } => dock_window::build(app, &config, rc_path.clone()),
                Tool::Plymouth => plymouth_window::build(app, &config),
                Tool::Themes => theme_window::build(app, &config),
                Tool::Welcome => welcome_window::build(app, &config),
            };
            window.present();
        });

        Self { app }
    }

    pub fn run(&self) -> i32 {
        // Subcommand arguments were already consumed by clap; GApplication
        // would reject them, so only hand it the program name.
        let argv0 = std::env::args().next().unwrap_or_default();
        self.app.run_with_args(&[argv0]).into()
    }
}

fn app_id(tool: &Tool) -> String {
    let suffix = match tool {
        Tool::Dock { .. } => "Dock",
        Tool::Plymouth => "Plymouth",
        Tool::Themes => "Themes",
        Tool::Welcome => "Welcome",
    };
    format!("{}.{}", APP_ID_PREFIX, suffix)
}

fn load_css() {
    let provider = gtk::CssProvider::new();
    provider.load_from_string(CSS);

    let Some(display) = gtk::gdk::Display::default() else {
        log::warn!("No default display, skipping stylesheet");
        return;
    };

    gtk::style_context_add_provider_for_display(
        &display,
        &provider,
        gtk::STYLE_PROVIDER_PRIORITY_APPLICATION,
    );
}
