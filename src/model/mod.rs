mod desktop_app;
mod hardware;
mod pinned_list;

pub use desktop_app::{DesktopApp, IconSource};
pub use hardware::{GpuVendor, HardwareReport};
pub use pinned_list::{MoveDirection, PinnedList};
