use super::command::{self, CommandStep};
use crate::model::{GpuVendor, HardwareReport};

const WIFI_VENDORS: [(&str, &str); 3] = [("intel", "Intel"), ("realtek", "Realtek"), ("broadcom", "Broadcom")];

/// Run `lspci` and classify the display and network controllers.
pub fn scan() -> Result<HardwareReport, String> {
    let output = command::capture(&CommandStep::new("lspci", &[]))?;
    let report = classify(&output);
    log::info!("{}", report.summary());
    Ok(report)
}

pub fn classify(lspci: &str) -> HardwareReport {
    let mut gpu_lines = String::new();
    let mut net_lines = String::new();

    for line in lspci.lines() {
        let lower = line.to_lowercase();
        if lower.contains("vga") || lower.contains("3d") || lower.contains("display") {
            gpu_lines.push_str(&lower);
            gpu_lines.push('\n');
        }
        if lower.contains("network") || lower.contains("wireless") {
            net_lines.push_str(&lower);
            net_lines.push('\n');
        }
    }

    let gpu = if gpu_lines.contains("nvidia") {
        GpuVendor::Nvidia
    } else if gpu_lines.contains("amd") || gpu_lines.contains("radeon") {
        GpuVendor::Amd
    } else if gpu_lines.contains("intel") {
        GpuVendor::Intel
    } else {
        GpuVendor::Generic
    };

    let wifi = WIFI_VENDORS
        .iter()
        .filter(|(needle, _)| net_lines.contains(needle))
        .map(|(_, label)| *label)
        .collect();

    HardwareReport { gpu, wifi }
}
