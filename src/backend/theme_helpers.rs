use std::path::{Path, PathBuf};

use super::command::{self, CommandStep};
use crate::util;

/// The external theme tools the launcher fronts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeHelper {
    Create,
    Remove,
    Select,
}

impl ThemeHelper {
    pub const ALL: [ThemeHelper; 3] = [ThemeHelper::Create, ThemeHelper::Remove, ThemeHelper::Select];

    pub fn binary(self) -> &'static str {
        match self {
            ThemeHelper::Create => "create_theme",
            ThemeHelper::Remove => "remove_theme",
            ThemeHelper::Select => "themeselector",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ThemeHelper::Create => "Create new theme",
            ThemeHelper::Remove => "Remove theme",
            ThemeHelper::Select => "Change theme",
        }
    }

    pub fn icon_name(self) -> &'static str {
        match self {
            ThemeHelper::Create => "document-new",
            ThemeHelper::Remove => "edit-delete",
            ThemeHelper::Select => "preferences-desktop-theme",
        }
    }

    pub fn path(self, helper_dir: &Path) -> PathBuf {
        helper_dir.join(self.binary())
    }

    pub fn is_available(self, helper_dir: &Path) -> bool {
        util::is_executable(&self.path(helper_dir))
    }

    /// Run the helper to completion. Blocks; call from a worker.
    pub fn run(self, helper_dir: &Path) -> Result<(), String> {
        let path = self.path(helper_dir);
        command::capture(&CommandStep::new(&path.to_string_lossy(), &[]))?;
        log::info!("{} finished", self.binary());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    fn install_helper(dir: &Path, helper: ThemeHelper, script: &str) {
        let path = helper.path(dir);
        fs::write(&path, script).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[test]
    fn availability_follows_executable_bit() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!ThemeHelper::Create.is_available(dir.path()));
        install_helper(dir.path(), ThemeHelper::Create, "#!/bin/sh\nexit 0\n");
        assert!(ThemeHelper::Create.is_available(dir.path()));
        assert!(!ThemeHelper::Remove.is_available(dir.path()));
    }

    #[test]
    fn run_reports_nonzero_exit() {
        let dir = tempfile::tempdir().unwrap();
        install_helper(dir.path(), ThemeHelper::Select, "#!/bin/sh\necho nope >&2\nexit 2\n");
        let err = ThemeHelper::Select.run(dir.path()).unwrap_err();
        assert!(err.contains("nope"));

        install_helper(dir.path(), ThemeHelper::Remove, "#!/bin/sh\nexit 0\n");
        assert!(ThemeHelper::Remove.run(dir.path()).is_ok());
    }
}
