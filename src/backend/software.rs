//! Package actions offered by the welcome wizard, expressed as command plans.

use super::command::{CommandPlan, CommandStep};

const FLATHUB_URL: &str = "https://dl.flathub.org/repo/flathub.flatpakrepo";
const LIQUORIX_INSTALLER: &str = "curl -s 'https://liquorix.net/install-liquorix.sh' | bash";

/// An installable bundle in the software tab.
#[derive(Debug, Clone, Copy)]
pub struct SoftwareOption {
    pub label: &'static str,
    pub packages: &'static [&'static str],
}

pub const SOFTWARE_OPTIONS: [SoftwareOption; 5] = [
    SoftwareOption { label: "Synaptic", packages: &["synaptic"] },
    SoftwareOption { label: "Gdebi", packages: &["gdebi", "gdebi-core"] },
    SoftwareOption { label: "GNOME Software", packages: &["gnome-software"] },
    SoftwareOption { label: "Flatpak", packages: &["flatpak", "gnome-software-plugin-flatpak"] },
    SoftwareOption { label: "Snap", packages: &["snapd", "gnome-software-plugin-snap"] },
];

/// A driver button in the drivers tab.
#[derive(Debug, Clone, Copy)]
pub struct DriverOption {
    pub group: &'static str,
    pub label: &'static str,
    pub packages: &'static [&'static str],
}

pub const DRIVER_OPTIONS: [DriverOption; 8] = [
    DriverOption { group: "NVIDIA drivers", label: "NVIDIA (latest)", packages: &["nvidia-driver"] },
    DriverOption { group: "NVIDIA drivers", label: "NVIDIA (legacy)", packages: &["nvidia-driver-470"] },
    DriverOption {
        group: "AMD drivers",
        label: "Install AMD drivers",
        packages: &[
            "firmware-amd-graphics",
            "libgl1-mesa-dri",
            "libglx-mesa0",
            "mesa-vulkan-drivers",
            "xserver-xorg-video-all",
        ],
    },
    DriverOption { group: "Wi-Fi drivers", label: "Intel", packages: &["firmware-iwlwifi"] },
    DriverOption { group: "Wi-Fi drivers", label: "Realtek", packages: &["firmware-realtek"] },
    DriverOption { group: "Wi-Fi drivers", label: "Broadcom", packages: &["firmware-b43-installer"] },
    DriverOption { group: "Other drivers", label: "Printer", packages: &["printer-driver-all"] },
    DriverOption { group: "Other drivers", label: "Bluetooth", packages: &["bluetooth", "bluez", "bluez-tools"] },
];

fn apt(verb: &str, packages: &[&str]) -> CommandStep {
    let mut args = vec![verb, "-y"];
    args.extend_from_slice(packages);
    CommandStep::privileged("apt", &args)
}

pub fn install(label: &str, packages: &[&str]) -> CommandPlan {
    let mut steps = vec![apt("install", packages)];
    // GNOME Software ships light by default; match the desktop's dark scheme.
    if packages.contains(&"gnome-software") {
        steps.push(CommandStep::new(
            "gsettings",
            &["set", "org.gnome.desktop.interface", "color-scheme", "prefer-dark"],
        ));
    }
    CommandPlan::new(&format!("Install {}", label), steps)
}

pub fn uninstall(label: &str, packages: &[&str]) -> CommandPlan {
    CommandPlan::new(&format!("Remove {}", label), vec![apt("remove", packages)])
}

pub fn update_repositories() -> CommandPlan {
    CommandPlan::new("Update repositories", vec![CommandStep::privileged("apt", &["update"])])
}

pub fn upgrade_system() -> CommandPlan {
    CommandPlan::new(
        "Upgrade system",
        vec![CommandStep::privileged("apt", &["dist-upgrade", "-y"])],
    )
}

pub fn clean_system() -> CommandPlan {
    CommandPlan::new(
        "Clean system",
        vec![CommandStep::privileged("apt", &["autoremove", "-y"])],
    )
}

pub fn add_flathub() -> CommandPlan {
    CommandPlan::new(
        "Add Flathub",
        vec![CommandStep::new(
            "flatpak",
            &["remote-add", "--if-not-exists", "--user", "flathub", FLATHUB_URL],
        )],
    )
}

/// Install snapd, expose snap launchers to the menu and restart the panel.
pub fn enable_snap() -> CommandPlan {
    CommandPlan::new(
        "Enable Snap",
        vec![
            CommandStep::privileged("snap", &["install", "snapd"]),
            CommandStep::new(
                "sh",
                &[
                    "-c",
                    "mkdir -p \"$HOME/.local/share/applications\" && \
                     ln -sf /var/lib/snapd/desktop/applications/* \"$HOME/.local/share/applications/\"",
                ],
            ),
            CommandStep::new("xfce4-panel", &["-r"]),
        ],
    )
}

pub fn install_curl() -> CommandPlan {
    install("curl", &["curl"])
}

pub fn install_liquorix() -> CommandPlan {
    CommandPlan::new(
        "Install Liquorix kernel",
        vec![CommandStep::privileged("sh", &["-c", LIQUORIX_INSTALLER])],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn install_builds_noninteractive_pkexec_apt() {
        let plan = install("Gdebi", SOFTWARE_OPTIONS[1].packages);
        assert_eq!(plan.steps.len(), 1);
        assert_eq!(plan.steps[0].display(), "pkexec apt install -y gdebi gdebi-core");
    }

    #[test]
    fn gnome_software_install_sets_dark_scheme() {
        let plan = install("GNOME Software", &["gnome-software"]);
        assert_eq!(plan.steps.len(), 2);
        assert_eq!(plan.steps[1].program, "gsettings");

        // The plugin packages alone do not trigger it.
        let plan = install("Flatpak", SOFTWARE_OPTIONS[3].packages);
        assert_eq!(plan.steps.len(), 1);
    }

    #[test]
    fn uninstall_uses_remove() {
        let plan = uninstall("Snap", SOFTWARE_OPTIONS[4].packages);
        assert_eq!(plan.steps[0].args[..3], ["apt", "remove", "-y"]);
    }

    #[test]
    fn flathub_is_user_scoped_without_pkexec() {
        let step = &add_flathub().steps[0];
        assert_eq!(step.program, "flatpak");
        assert!(step.args.iter().any(|a| a == "--user"));
    }

    #[test]
    fn every_driver_has_packages() {
        assert!(DRIVER_OPTIONS.iter().all(|d| !d.packages.is_empty()));
    }
}
