use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use super::command::{self, CommandStep};
use super::task::{CancelToken, TaskEvent};
use crate::util;

const SET_THEME_TOOL: &str = "plymouth-set-default-theme";
const SBIN_DIRS: [&str; 2] = ["/usr/sbin", "/sbin"];
const THEME_ROOTS: [&str; 2] = ["/usr/share/plymouth/themes", "/usr/local/share/plymouth/themes"];

/// How themes can be listed on this host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListCommand {
    /// `plymouth-set-default-theme --list`
    SetDefaultTheme(PathBuf),
    /// `plymouth --list-themes`
    Plymouth(PathBuf),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlymouthTools {
    pub list: Option<ListCommand>,
    pub set_theme: Option<PathBuf>,
}

impl PlymouthTools {
    pub fn detect() -> Self {
        let set_theme = util::find_program(SET_THEME_TOOL, &SBIN_DIRS);
        let list = match &set_theme {
            Some(path) => Some(ListCommand::SetDefaultTheme(path.clone())),
            None => util::find_program("plymouth", &SBIN_DIRS).map(ListCommand::Plymouth),
        };
        let tools = Self { list, set_theme };
        log::info!("Plymouth tools: {:?}", tools);
        tools
    }

    /// Themes can be listed with either tool.
    pub fn can_list(&self) -> bool {
        self.list.is_some()
    }

    /// Applying needs `plymouth-set-default-theme`.
    pub fn can_apply(&self) -> bool {
        self.set_theme.is_some()
    }

    fn list_step(&self) -> Option<CommandStep> {
        match self.list.as_ref()? {
            ListCommand::SetDefaultTheme(p) => Some(CommandStep::new(&p.to_string_lossy(), &["--list"])),
            ListCommand::Plymouth(p) => Some(CommandStep::new(&p.to_string_lossy(), &["--list-themes"])),
        }
    }

    fn raw_listing(&self) -> Result<String, String> {
        let step = self
            .list_step()
            .ok_or_else(|| "Plymouth tools were not found".to_string())?;
        command::capture(&step)
    }

    /// Installed theme names, sorted and de-duplicated. Falls back to the
    /// theme directories when the tool prints nothing.
    pub fn list_themes(&self) -> Result<Vec<String>, String> {
        let output = self.raw_listing()?;
        let themes = parse_theme_list(&output);
        if !themes.is_empty() {
            return Ok(themes);
        }

        let roots: Vec<PathBuf> = THEME_ROOTS.iter().map(PathBuf::from).collect();
        let themes = scan_theme_dirs(&roots);
        if themes.is_empty() {
            Err("No Plymouth themes were found".to_string())
        } else {
            log::warn!("Theme listing was empty, using {} themes from disk", themes.len());
            Ok(themes)
        }
    }

    pub fn current_theme(&self) -> Result<Option<String>, String> {
        let output = self.raw_listing()?;
        if let Some(theme) = parse_current_theme(&output) {
            return Ok(Some(theme));
        }

        // Without arguments the tool prints the configured theme.
        let Some(set_theme) = &self.set_theme else {
            return Ok(None);
        };
        let out = command::capture(&CommandStep::new(&set_theme.to_string_lossy(), &[]))?;
        let name = out.trim();
        Ok((!name.is_empty()).then(|| name.to_string()))
    }

    pub fn apply_step(&self, theme: &str) -> Option<CommandStep> {
        let tool = self.set_theme.as_ref()?;
        Some(CommandStep::privileged(&tool.to_string_lossy(), &["-R", theme]))
    }
}

/// Theme names from a listing; text from the first `(` on is an annotation.
pub fn parse_theme_list(output: &str) -> Vec<String> {
    output
        .lines()
        .map(|line| line.split('(').next().unwrap_or("").trim())
        .filter(|name| !name.is_empty())
        .map(String::from)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// The theme whose listing line carries a `(… default …)` annotation.
pub fn parse_current_theme(output: &str) -> Option<String> {
    output.lines().find_map(|line| {
        let (name, annotation) = line.split_once('(')?;
        if annotation.contains(')') && annotation.contains("default") {
            let name = name.trim();
            (!name.is_empty()).then(|| name.to_string())
        } else {
            None
        }
    })
}

pub fn scan_theme_dirs(roots: &[PathBuf]) -> Vec<String> {
    let mut themes = BTreeSet::new();
    for root in roots {
        let Ok(read_dir) = fs::read_dir(root) else {
            continue;
        };
        for entry in read_dir.flatten() {
            if entry.path().is_dir() {
                themes.insert(entry.file_name().to_string_lossy().to_string());
            }
        }
    }
    themes.into_iter().collect()
}

pub fn find_preview(theme: &str) -> Option<PathBuf> {
    let roots: Vec<PathBuf> = THEME_ROOTS.iter().map(PathBuf::from).collect();
    find_preview_in(theme, &roots)
}

fn find_preview_in(theme: &str, roots: &[PathBuf]) -> Option<PathBuf> {
    let candidates = [format!("{}.png", theme), "preview.png".into(), "screenshot.png".into()];
    roots
        .iter()
        .flat_map(|root| candidates.iter().map(move |file| root.join(theme).join(file)))
        .find(|p| p.is_file())
}

/// Captions for the ten apply stages. The privileged command runs at
/// `RUN_STAGE`; the rest pace the progress bar.
pub const APPLY_STAGES: [(&str, u64); 10] = [
    ("Preparing theme installation...", 500),
    ("Checking selected theme...", 500),
    ("Locating theme files...", 500),
    ("Checking permissions...", 500),
    ("Applying the new theme...", 0),
    ("Updating system configuration...", 300),
    ("Updating initramfs...", 300),
    ("Applying changes...", 300),
    ("Verifying installation...", 300),
    ("Theme installed successfully!", 500),
];
const RUN_STAGE: usize = 4;

/// Worker body for applying a theme. Cancellation is only honoured between
/// stages; it never interrupts the privileged command.
pub fn apply_theme(
    step: CommandStep,
    theme: &str,
    cancel: &CancelToken,
    tx: &flume::Sender<TaskEvent>,
    pace: bool,
) {
    let total = APPLY_STAGES.len();
    for (i, (caption, delay_ms)) in APPLY_STAGES.iter().enumerate() {
        if cancel.is_cancelled() {
            log::info!("Theme apply for '{}' cancelled before stage {}", theme, i + 1);
            let _ = tx.send(TaskEvent::Finished(Err("Operation cancelled".to_string())));
            return;
        }

        let fraction = (i + 1) as f64 / total as f64;
        let _ = tx.send(TaskEvent::Progress {
            fraction,
            text: caption.to_string(),
        });

        if i == RUN_STAGE {
            if let Err(e) = command::capture(&step) {
                log::error!("Applying Plymouth theme '{}' failed: {}", theme, e);
                let _ = tx.send(TaskEvent::Finished(Err(e)));
                return;
            }
        } else if pace {
            thread::sleep(Duration::from_millis(*delay_ms));
        }
    }

    log::info!("Plymouth theme set to '{}'", theme);
    let _ = tx.send(TaskEvent::Finished(Ok(format!("Theme '{}' applied successfully", theme))));
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = "bgrt\nsoplos (default)\nspinner\nbgrt\n\n";

    #[test]
    fn listing_is_sorted_and_unique() {
        assert_eq!(parse_theme_list(LISTING), ["bgrt", "soplos", "spinner"]);
    }

    #[test]
    fn current_theme_from_default_marker() {
        assert_eq!(parse_current_theme(LISTING).as_deref(), Some("soplos"));
        assert_eq!(parse_current_theme("a\nb (legacy)\n"), None);
    }

    #[test]
    fn theme_dirs_fallback_lists_directories_only() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        fs::create_dir(a.path().join("spinner")).unwrap();
        fs::create_dir(b.path().join("details")).unwrap();
        fs::create_dir(b.path().join("spinner")).unwrap();
        fs::write(a.path().join("text.plymouth"), "").unwrap();

        let themes = scan_theme_dirs(&[a.path().to_path_buf(), b.path().to_path_buf()]);
        assert_eq!(themes, ["details", "spinner"]);
    }

    #[test]
    fn preview_prefers_named_png() {
        let root = tempfile::tempdir().unwrap();
        let theme = root.path().join("soplos");
        fs::create_dir(&theme).unwrap();
        fs::write(theme.join("preview.png"), "x").unwrap();
        let roots = [root.path().to_path_buf()];

        assert_eq!(find_preview_in("soplos", &roots), Some(theme.join("preview.png")));
        fs::write(theme.join("soplos.png"), "x").unwrap();
        assert_eq!(find_preview_in("soplos", &roots), Some(theme.join("soplos.png")));
        assert_eq!(find_preview_in("missing", &roots), None);
    }

    #[test]
    fn apply_reports_every_stage_then_success() {
        let (tx, rx) = flume::unbounded();
        apply_theme(CommandStep::new("true", &[]), "soplos", &CancelToken::new(), &tx, false);
        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(events.len(), APPLY_STAGES.len() + 1);
        assert!(matches!(events.last(), Some(TaskEvent::Finished(Ok(_)))));
    }

    #[test]
    fn apply_failure_stops_at_run_stage() {
        let (tx, rx) = flume::unbounded();
        apply_theme(CommandStep::new("false", &[]), "soplos", &CancelToken::new(), &tx, false);
        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(events.len(), RUN_STAGE + 2);
        assert!(matches!(events.last(), Some(TaskEvent::Finished(Err(_)))));
    }

    #[test]
    fn cancelled_apply_never_runs_command() {
        let token = CancelToken::new();
        token.cancel();
        let (tx, rx) = flume::unbounded();
        apply_theme(CommandStep::new("/nonexistent/tool", &[]), "x", &token, &tx, false);
        assert_eq!(
            rx.try_iter().collect::<Vec<_>>(),
            [TaskEvent::Finished(Err("Operation cancelled".into()))]
        );
    }

    #[test]
    fn apply_step_uses_pkexec() {
        let tools = PlymouthTools {
            list: None,
            set_theme: Some(PathBuf::from("/usr/sbin/plymouth-set-default-theme")),
        };
        let step = tools.apply_step("soplos").unwrap();
        assert_eq!(step.display(), "pkexec /usr/sbin/plymouth-set-default-theme -R soplos");
        assert!(tools.can_apply());
        assert!(!tools.can_list());
    }

    #[test]
    fn plymouth_alone_lists_but_cannot_apply() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let tool = dir.path().join("plymouth");
        fs::write(
            &tool,
            "#!/bin/sh\n[ \"$1\" = --list-themes ] || exit 1\nprintf 'spinner\\nsoplos (default)\\nbgrt\\n'\n",
        )
        .unwrap();
        fs::set_permissions(&tool, fs::Permissions::from_mode(0o755)).unwrap();

        let tools = PlymouthTools {
            list: Some(ListCommand::Plymouth(tool)),
            set_theme: None,
        };
        assert!(tools.can_list());
        assert!(!tools.can_apply());
        assert_eq!(tools.list_themes().unwrap(), ["bgrt", "soplos", "spinner"]);
        assert_eq!(tools.current_theme().unwrap().as_deref(), Some("soplos"));
        assert!(tools.apply_step("soplos").is_none());
    }
}
