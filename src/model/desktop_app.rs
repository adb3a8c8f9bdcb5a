use std::path::PathBuf;

/// Read-only view of a desktop-entry file, resolved at load time.
#[derive(Debug, Clone, PartialEq)]
pub struct DesktopApp {
    pub path: String,
    pub name: String,
    pub icon_hint: String,
}

/// Where a row's icon comes from once the lookup chain has run.
#[derive(Debug, Clone, PartialEq)]
pub enum IconSource {
    File(PathBuf),
    Themed(String),
    Placeholder,
}

impl IconSource {
    pub const PLACEHOLDER_NAME: &'static str = "application-x-executable";
}
