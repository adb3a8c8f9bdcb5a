#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpuVendor {
    Nvidia,
    Amd,
    Intel,
    Generic,
}

impl std::fmt::Display for GpuVendor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GpuVendor::Nvidia => write!(f, "NVIDIA"),
            GpuVendor::Amd => write!(f, "AMD/ATI"),
            GpuVendor::Intel => write!(f, "Intel"),
            GpuVendor::Generic => write!(f, "Generic"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HardwareReport {
    pub gpu: GpuVendor,
    /// Wi-Fi chipset vendors found, in detection order.
    pub wifi: Vec<&'static str>,
}

impl HardwareReport {
    pub fn summary(&self) -> String {
        let wifi = if self.wifi.is_empty() {
            "Not detected".to_string()
        } else {
            self.wifi.join(", ")
        };
        format!("Detected hardware: GPU {}, Wi-Fi {}", self.gpu, wifi)
    }
}
