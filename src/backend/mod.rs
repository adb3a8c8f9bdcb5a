pub mod autostart;
pub mod command;
mod desktop_resolver;
pub mod docklike;
pub mod hardware;
pub mod plymouth;
mod progress;
pub mod software;
pub mod task;
pub mod theme_helpers;

pub use desktop_resolver::{application_dirs, resolve_icon, DesktopResolver};
