use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use freedesktop_desktop_entry::DesktopEntry;

use crate::model::{DesktopApp, IconSource};
use crate::util;

const ICON_EXTENSIONS: [&str; 4] = ["", ".png", ".svg", ".xpm"];

/// Resolves pinned paths to display metadata and lists installed apps.
pub struct DesktopResolver {
    locales: Vec<String>,
}

impl DesktopResolver {
    pub fn new() -> Self {
        Self {
            locales: freedesktop_desktop_entry::get_languages_from_env(),
        }
    }

    /// Name and icon hint for a desktop-entry path. Never fails: unreadable
    /// files fall back to the file stem for both fields.
    pub fn resolve(&self, path: &str) -> DesktopApp {
        let p = Path::new(path);
        let stem = util::file_stem_string(p);

        let (name, icon) = match DesktopEntry::from_path(p, Some(self.locales.as_slice())) {
            Ok(entry) => (
                entry.name(self.locales.as_slice()).map(|n| n.to_string()),
                entry.icon().map(str::to_string),
            ),
            Err(e) => {
                log::debug!("Decoding {} failed ({}), scanning by hand", path, e);
                let fields = parse_desktop_file(p);
                (fields.name, fields.icon)
            }
        };

        DesktopApp {
            path: path.to_string(),
            name: name.filter(|n| !n.is_empty()).unwrap_or_else(|| stem.clone()),
            icon_hint: icon.filter(|i| !i.is_empty()).unwrap_or(stem),
        }
    }

    /// Visible applications from `dirs`, sorted by name. Entries with
    /// `NoDisplay=true` or `Hidden=true` are skipped.
    pub fn scan_applications(&self, dirs: &[PathBuf]) -> Vec<DesktopApp> {
        let mut apps = Vec::new();
        let mut seen = HashSet::new();

        for dir in dirs {
            let read_dir = match fs::read_dir(dir) {
                Ok(rd) => rd,
                Err(_) => continue,
            };
            for entry in read_dir.flatten() {
                let path = entry.path();
                if path.extension().map(|e| e != "desktop").unwrap_or(true) {
                    continue;
                }
                let path_str = path.to_string_lossy().to_string();
                if !seen.insert(path_str.clone()) {
                    continue;
                }

                let fields = parse_desktop_file(&path);
                if fields.no_display || fields.hidden {
                    continue;
                }
                apps.push(self.resolve(&path_str));
            }
        }

        apps.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        log::info!("Found {} visible applications", apps.len());
        apps
    }
}

pub fn application_dirs() -> Vec<PathBuf> {
    vec![
        PathBuf::from("/usr/share/applications"),
        util::home_dir().join(".local/share/applications"),
    ]
}

#[derive(Debug, Default)]
struct DesktopFields {
    name: Option<String>,
    icon: Option<String>,
    no_display: bool,
    hidden: bool,
}

fn parse_desktop_file(path: &Path) -> DesktopFields {
    let mut fields = DesktopFields::default();
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(_) => return fields,
    };

    let mut in_desktop_entry = false;
    for line in content.lines() {
        let line = line.trim();
        if line == "[Desktop Entry]" {
            in_desktop_entry = true;
            continue;
        }
        if line.starts_with('[') {
            in_desktop_entry = false;
            continue;
        }
        if !in_desktop_entry {
            continue;
        }

        if let Some(val) = line.strip_prefix("Name=") {
            if fields.name.is_none() {
                fields.name = Some(val.trim().to_string());
            }
        } else if let Some(val) = line.strip_prefix("Icon=") {
            fields.icon = Some(val.trim().to_string());
        } else if let Some(val) = line.strip_prefix("NoDisplay=") {
            fields.no_display = val.trim().eq_ignore_ascii_case("true");
        } else if let Some(val) = line.strip_prefix("Hidden=") {
            fields.hidden = val.trim().eq_ignore_ascii_case("true");
        }
    }
    fields
}

fn icon_search_dirs() -> Vec<PathBuf> {
    vec![
        PathBuf::from("/usr/share/icons/hicolor/48x48/apps"),
        PathBuf::from("/usr/share/icons/hicolor/scalable/apps"),
        PathBuf::from("/usr/share/pixmaps"),
        PathBuf::from("/usr/share/icons/gnome/48x48/apps"),
        PathBuf::from("/usr/share/icons/Adwaita/48x48/apps"),
        PathBuf::from("/usr/share/app-install/icons"),
        util::home_dir().join(".local/share/icons"),
        PathBuf::from("/usr/local/share/icons"),
    ]
}

/// Turn an `Icon=` hint into something a widget can show. `has_themed`
/// asks the display's icon theme whether it knows a name.
pub fn resolve_icon(hint: &str, has_themed: impl Fn(&str) -> bool) -> IconSource {
    resolve_icon_in(hint, has_themed, &icon_search_dirs())
}

fn resolve_icon_in(hint: &str, has_themed: impl Fn(&str) -> bool, search_dirs: &[PathBuf]) -> IconSource {
    let hint = hint.trim();
    if hint.is_empty() {
        return IconSource::Placeholder;
    }

    if hint.starts_with('/') {
        let path = Path::new(hint);
        if path.is_file() {
            return IconSource::File(path.to_path_buf());
        }
    } else if has_themed(hint) {
        return IconSource::Themed(hint.to_string());
    }

    for dir in search_dirs {
        for ext in ICON_EXTENSIONS {
            let candidate = dir.join(format!("{}{}", hint, ext));
            if candidate.is_file() {
                log::debug!("Icon {} found at {}", hint, candidate.display());
                return IconSource::File(candidate);
            }
        }
    }

    log::warn!("No icon found for {}", hint);
    IconSource::Placeholder
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, content: &str) -> String {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path.to_string_lossy().to_string()
    }

    #[test]
    fn resolves_name_and_icon() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "editor.desktop",
            "[Desktop Entry]\nType=Application\nName=Text Editor\nIcon=accessories-text-editor\nExec=editor\n",
        );
        let app = DesktopResolver::new().resolve(&path);
        assert_eq!(app.name, "Text Editor");
        assert_eq!(app.icon_hint, "accessories-text-editor");
    }

    #[test]
    fn missing_file_falls_back_to_stem() {
        let app = DesktopResolver::new().resolve("/nonexistent/dir/my-app.desktop");
        assert_eq!(app.name, "my-app");
        assert_eq!(app.icon_hint, "my-app");
    }

    #[test]
    fn manual_parse_ignores_other_groups() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "x.desktop",
            "[Desktop Action new]\nName=New Window\n[Desktop Entry]\nName=Browser\nNoDisplay=true\n",
        );
        let fields = parse_desktop_file(Path::new(&path));
        assert_eq!(fields.name.as_deref(), Some("Browser"));
        assert!(fields.no_display);
        assert!(!fields.hidden);
    }

    #[test]
    fn scan_skips_hidden_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "b.desktop", "[Desktop Entry]\nType=Application\nName=beta\nExec=b\n");
        write(dir.path(), "a.desktop", "[Desktop Entry]\nType=Application\nName=Alpha\nExec=a\n");
        write(dir.path(), "h.desktop", "[Desktop Entry]\nType=Application\nName=Hidden\nHidden=true\nExec=h\n");
        write(dir.path(), "n.desktop", "[Desktop Entry]\nType=Application\nName=NoShow\nNoDisplay=true\nExec=n\n");
        write(dir.path(), "readme.txt", "not an entry");

        let apps = DesktopResolver::new().scan_applications(&[dir.path().to_path_buf()]);
        let names: Vec<_> = apps.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["Alpha", "beta"]);
    }

    #[test]
    fn icon_lookup_order() {
        let dir = tempfile::tempdir().unwrap();
        let dirs = [dir.path().to_path_buf()];
        let abs = write(dir.path(), "abs.png", "png");
        write(dir.path(), "probe.svg", "svg");

        assert_eq!(
            resolve_icon_in(&abs, |_| false, &dirs),
            IconSource::File(PathBuf::from(&abs))
        );
        assert_eq!(
            resolve_icon_in("firefox", |n| n == "firefox", &dirs),
            IconSource::Themed("firefox".into())
        );
        assert_eq!(
            resolve_icon_in("probe", |_| false, &dirs),
            IconSource::File(dir.path().join("probe.svg"))
        );
        assert_eq!(resolve_icon_in("nothing-here", |_| false, &dirs), IconSource::Placeholder);
        assert_eq!(resolve_icon_in("", |_| true, &dirs), IconSource::Placeholder);
    }
}
