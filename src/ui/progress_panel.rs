use gtk4 as gtk;
use gtk::prelude::*;
use gtk::glib;
use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

/// Bumped whenever the panel is reset, so a delayed reset scheduled for an
/// earlier task can tell it is stale.
#[derive(Clone, Default)]
struct Epoch(Rc<Cell<u64>>);

impl Epoch {
    fn advance(&self) -> u64 {
        let next = self.0.get().wrapping_add(1);
        self.0.set(next);
        next
    }

    fn current(&self) -> u64 {
        self.0.get()
    }

    fn is_current(&self, stamp: u64) -> bool {
        self.0.get() == stamp
    }
}

/// Progress bar plus a wrapping status line, shared by the long-running
/// actions of a window.
#[derive(Clone)]
pub struct ProgressPanel {
    pub widget: gtk::Box,
    bar: gtk::ProgressBar,
    status: gtk::Label,
    epoch: Epoch,
}

impl ProgressPanel {
    pub fn new(show_text: bool) -> Self {
        let widget = gtk::Box::new(gtk::Orientation::Vertical, 6);
        widget.add_css_class("status-bar");

        let bar = gtk::ProgressBar::new();
        bar.set_show_text(show_text);
        widget.append(&bar);

        let status = gtk::Label::new(None);
        status.set_xalign(0.0);
        status.set_wrap(true);
        status.set_ellipsize(gtk::pango::EllipsizeMode::End);
        status.set_lines(2);
        widget.append(&status);

        Self {
            widget,
            bar,
            status,
            epoch: Epoch::default(),
        }
    }

    pub fn set_fraction(&self, fraction: f64) {
        self.bar.set_fraction(fraction.clamp(0.0, 1.0));
    }

    pub fn set_bar_text(&self, text: &str) {
        self.bar.set_text(Some(text));
    }

    pub fn set_status(&self, text: &str) {
        self.status.set_text(text);
    }

    /// Clear the panel. Also voids any pending `reset_after`, so call this
    /// when a new task takes over the panel.
    pub fn reset(&self) {
        self.epoch.advance();
        self.clear();
    }

    /// Reset after `delay`, leaving the final state visible briefly. Skipped
    /// if the panel was reset again in the meantime.
    pub fn reset_after(&self, delay: Duration) {
        let panel = self.clone();
        let stamp = self.epoch.current();
        glib::timeout_add_local_once(delay, move || {
            if panel.epoch.is_current(stamp) {
                panel.clear();
            }
        });
    }

    fn clear(&self) {
        self.bar.set_fraction(0.0);
        self.bar.set_text(None);
        self.status.set_text("");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_reset_goes_stale_when_a_new_task_starts() {
        let epoch = Epoch::default();
        let first_task_done = epoch.current();
        assert!(epoch.is_current(first_task_done));

        epoch.clone().advance();
        assert!(!epoch.is_current(first_task_done));

        let second_task_done = epoch.current();
        assert!(epoch.is_current(second_task_done));
    }
}
