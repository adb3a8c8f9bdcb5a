use std::fs;
use std::path::{Path, PathBuf};

const ENTRY_FILE: &str = "soplos-welcome.desktop";

pub fn entry_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| crate::util::home_dir().join(".config"))
        .join("autostart")
        .join(ENTRY_FILE)
}

pub fn is_enabled(path: &Path) -> bool {
    path.exists()
}

fn entry_content(exec: &str) -> String {
    format!(
        "[Desktop Entry]\n\
         Type=Application\n\
         Exec={exec}\n\
         Hidden=false\n\
         NoDisplay=false\n\
         X-GNOME-Autostart-enabled=true\n\
         Name=Soplos Welcome\n\
         Comment=Soplos Linux welcome and setup\n"
    )
}

/// Create or delete the autostart entry. `exec` is the command line written
/// to `Exec=` when enabling.
pub fn set_enabled(path: &Path, enabled: bool, exec: &str) -> Result<(), String> {
    if enabled {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|e| {
                if e.kind() == std::io::ErrorKind::ReadOnlyFilesystem {
                    "Cannot create autostart dir: filesystem is read-only".to_string()
                } else {
                    format!("Cannot create autostart dir: {}", e)
                }
            })?;
        }
        fs::write(path, entry_content(exec))
            .map_err(|e| format!("Cannot write {}: {}", path.display(), e))?;
    } else if path.exists() {
        fs::remove_file(path).map_err(|e| format!("Cannot remove {}: {}", path.display(), e))?;
    }

    log::info!("Welcome autostart {} ({})", if enabled { "enabled" } else { "disabled" }, path.display());
    Ok(())
}

/// `Exec=` value that starts this binary's welcome wizard.
pub fn welcome_exec() -> String {
    let exe = std::env::current_exe()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|_| "soplos-tools".to_string());
    format!("{} welcome", exe)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enable_then_disable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("autostart").join(ENTRY_FILE);
        assert!(!is_enabled(&path));

        set_enabled(&path, true, "/usr/bin/soplos-tools welcome").unwrap();
        assert!(is_enabled(&path));
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("[Desktop Entry]\n"));
        assert!(content.contains("\nExec=/usr/bin/soplos-tools welcome\n"));

        set_enabled(&path, false, "").unwrap();
        assert!(!is_enabled(&path));
        // Disabling twice is fine.
        set_enabled(&path, false, "").unwrap();
    }

    #[test]
    fn welcome_exec_targets_subcommand() {
        assert!(welcome_exec().ends_with(" welcome"));
    }
}
