use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSize {
    pub width: i32,
    pub height: i32,
}

impl WindowSize {
    const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

impl Default for WindowSize {
    fn default() -> Self {
        Self::new(500, 550)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub dock_window: WindowSize,
    pub plymouth_window: WindowSize,
    pub themes_window: WindowSize,
    pub welcome_window: WindowSize,
    /// Force the dark variant of the Adwaita stylesheet.
    pub prefer_dark: bool,
    /// Run `xfce4-panel -r` after the pinned list has been written.
    pub restart_panel_after_save: bool,
    /// Directory holding `create_theme`, `remove_theme` and `themeselector`.
    pub theme_helper_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dock_window: WindowSize::new(500, 550),
            plymouth_window: WindowSize::new(450, 650),
            themes_window: WindowSize::new(260, 320),
            welcome_window: WindowSize::new(560, 620),
            prefer_dark: true,
            restart_panel_after_save: true,
            theme_helper_dir: PathBuf::from("/usr/local/bin/soplos-theme-manager"),
        }
    }
}

impl Config {
    pub fn load() -> Self {
        let path = config_path();
        match fs::read_to_string(&path) {
            Ok(data) => serde_json::from_str(&data).unwrap_or_else(|e| {
                log::warn!("Ignoring malformed {}: {}", path.display(), e);
                Config::default()
            }),
            Err(_) => Config::default(),
        }
    }

    pub fn save(&self) {
        let path = config_path();
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        if let Ok(data) = serde_json::to_string_pretty(self) {
            if let Err(e) = fs::write(&path, data) {
                log::warn!("Failed to save {}: {}", path.display(), e);
            }
        }
    }
}

fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("~/.config"))
        .join("soplos-tools")
        .join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults_for_missing_keys() {
        let cfg: Config = serde_json::from_str(r#"{ "prefer_dark": false }"#).unwrap();
        assert!(!cfg.prefer_dark);
        assert!(cfg.restart_panel_after_save);
        assert_eq!(cfg.plymouth_window, WindowSize::new(450, 650));
    }

    #[test]
    fn serialized_config_reads_back() {
        let mut cfg = Config::default();
        cfg.dock_window.width = 640;
        cfg.theme_helper_dir = PathBuf::from("/opt/helpers");
        let json = serde_json::to_string(&cfg).unwrap();
        let back: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cfg);
    }
}
