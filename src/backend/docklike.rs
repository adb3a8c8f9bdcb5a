use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::command::{self, CommandStep};
use crate::model::PinnedList;

const PINNED_KEY: &str = "pinned=";

#[derive(Debug, Error)]
pub enum DockError {
    #[error("Docklike configuration not found: {0}")]
    NotFound(PathBuf),
    #[error("Cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub fn default_rc_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| crate::util::home_dir().join(".config"))
        .join("xfce4/panel/docklike-1.rc")
}

/// Read the pinned list from a Docklike rc file. A file without a
/// `pinned=` line yields an empty list.
pub fn load(path: &Path) -> Result<PinnedList, DockError> {
    let content = read(path)?;
    let list = content
        .lines()
        .find_map(|line| line.strip_prefix(PINNED_KEY))
        .map(PinnedList::parse)
        .unwrap_or_default();
    log::info!("Loaded {} pinned entries from {}", list.len(), path.display());
    Ok(list)
}

/// Rewrite the first `pinned=` line of `path`, leaving every other byte alone.
pub fn save(path: &Path, list: &PinnedList) -> Result<(), DockError> {
    let content = read(path)?;
    let updated = replace_pinned_line(&content, &list.to_value());

    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let write_err = |source| DockError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(updated.as_bytes()).map_err(write_err)?;
    if let Ok(meta) = fs::metadata(path) {
        if let Err(e) = fs::set_permissions(tmp.path(), meta.permissions()) {
            log::warn!("Cannot copy permissions of {}: {}", path.display(), e);
        }
    }
    tmp.persist(path).map_err(|e| write_err(e.error))?;

    log::info!("Saved {} pinned entries to {}", list.len(), path.display());
    Ok(())
}

/// Replace the value of the first `pinned=` line, keeping its line ending.
/// Appends a new line when the key is absent.
pub fn replace_pinned_line(content: &str, value: &str) -> String {
    let mut out = String::with_capacity(content.len() + value.len());
    let mut replaced = false;

    for line in content.split_inclusive('\n') {
        if !replaced && line.starts_with(PINNED_KEY) {
            let body_len = line.trim_end_matches(['\n', '\r']).len();
            out.push_str(PINNED_KEY);
            out.push_str(value);
            out.push_str(&line[body_len..]);
            replaced = true;
        } else {
            out.push_str(line);
        }
    }

    if !replaced {
        if !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(PINNED_KEY);
        out.push_str(value);
        out.push('\n');
    }

    out
}

fn restart_step() -> CommandStep {
    CommandStep::new("xfce4-panel", &["-r"])
}

/// Ask the XFCE panel to restart so Docklike re-reads its rc file.
pub fn restart_panel() -> Result<(), String> {
    command::spawn_detached(&restart_step())
        .map_err(|e| format!("Failed to restart xfce4-panel: {}", e))
}

fn read(path: &Path) -> Result<String, DockError> {
    fs::read_to_string(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            DockError::NotFound(path.to_path_buf())
        } else {
            DockError::Read {
                path: path.to_path_buf(),
                source,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MoveDirection;

    const RC: &str = "[user]\nforceIconSize=false\npinned=/usr/share/applications/a.desktop;/usr/share/applications/b.desktop;\nonlyDisplayVisible=true\n";

    fn write_rc(content: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docklike-1.rc");
        fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn save_then_load_round_trips() {
        let (_dir, path) = write_rc(RC);
        let mut list = load(&path).unwrap();
        assert_eq!(list.len(), 2);

        list.move_entry(0, MoveDirection::Down);
        list.add(["/home/u/.local/share/applications/c.desktop"]);
        save(&path, &list).unwrap();

        assert_eq!(load(&path).unwrap(), list);
    }

    #[test]
    fn other_lines_are_untouched() {
        let (_dir, path) = write_rc(RC);
        let list = PinnedList::parse("/x.desktop");
        save(&path, &list).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(
            written,
            "[user]\nforceIconSize=false\npinned=/x.desktop\nonlyDisplayVisible=true\n"
        );
    }

    #[test]
    fn removing_last_entry_keeps_the_key() {
        let (_dir, path) = write_rc("pinned=/only.desktop\n");
        let mut list = load(&path).unwrap();
        list.remove(0);
        save(&path, &list).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "pinned=\n");
    }

    #[test]
    fn keeps_crlf_and_missing_final_newline() {
        assert_eq!(
            replace_pinned_line("a=1\r\npinned=x\r\nb=2", "y;z"),
            "a=1\r\npinned=y;z\r\nb=2"
        );
        assert_eq!(replace_pinned_line("pinned=x", "y"), "pinned=y");
    }

    #[test]
    fn only_first_pinned_line_is_rewritten() {
        assert_eq!(
            replace_pinned_line("pinned=a\npinned=b\n", "c"),
            "pinned=c\npinned=b\n"
        );
    }

    #[test]
    fn missing_key_is_appended() {
        assert_eq!(replace_pinned_line("a=1", "x"), "a=1\npinned=x\n");
        assert_eq!(replace_pinned_line("", "x"), "pinned=x\n");
    }

    #[test]
    fn indented_key_is_not_the_pinned_line() {
        let (_dir, path) = write_rc("  pinned=/a.desktop\n");
        assert!(load(&path).unwrap().is_empty());
    }

    #[test]
    fn whitespace_in_paths_round_trips() {
        let (_dir, path) = write_rc("pinned=/a.desktop\n");
        let list = PinnedList::parse(" /opt/My App.desktop ;/a.desktop");
        save(&path, &list).unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "pinned= /opt/My App.desktop ;/a.desktop\n"
        );
        assert_eq!(load(&path).unwrap(), list);
    }

    #[test]
    fn save_keeps_file_mode() {
        use std::os::unix::fs::PermissionsExt;

        let (_dir, path) = write_rc(RC);
        fs::set_permissions(&path, fs::Permissions::from_mode(0o640)).unwrap();
        save(&path, &PinnedList::parse("/x.desktop")).unwrap();
        assert_eq!(fs::metadata(&path).unwrap().permissions().mode() & 0o777, 0o640);
    }

    #[test]
    fn panel_restart_is_xfce4_panel_r() {
        assert_eq!(restart_step().display(), "xfce4-panel -r");
    }

    #[test]
    fn missing_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(&dir.path().join("nope.rc")).unwrap_err();
        assert!(matches!(err, DockError::NotFound(_)));
    }
}
