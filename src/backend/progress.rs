use once_cell::sync::Lazy;
use regex::Regex;

static PERCENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d{1,3})%").expect("valid regex"));

const STEP: f64 = 0.05;
const STEP_CAP: f64 = 0.95;

/// Turns apt's free-form output into a progress fraction.
///
/// A `NN%` anywhere on the line sets the fraction outright. `Unpacking` and
/// `Setting up` lines nudge it forward by a fixed step, capped at 95%.
#[derive(Debug, Default)]
pub struct AptProgress {
    fraction: f64,
}

impl AptProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one output line. Returns the new fraction when it changed.
    pub fn feed(&mut self, line: &str) -> Option<f64> {
        if let Some(caps) = PERCENT_RE.captures(line) {
            let pct: f64 = caps[1].parse().ok()?;
            self.fraction = (pct / 100.0).min(1.0);
            return Some(self.fraction);
        }

        if line.contains("Unpacking") || line.contains("Setting up") {
            self.fraction = (self.fraction + STEP).min(STEP_CAP);
            return Some(self.fraction);
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_sets_fraction() {
        let mut p = AptProgress::new();
        assert_eq!(p.feed("Reading package lists... 42%"), Some(0.42));
        assert_eq!(p.feed("Progress: [100%]"), Some(1.0));
    }

    #[test]
    fn unpacking_steps_are_capped() {
        let mut p = AptProgress::new();
        let first = p.feed("Unpacking synaptic (0.91.3) ...").unwrap();
        assert!((first - 0.05).abs() < 1e-9);
        for _ in 0..40 {
            p.feed("Setting up synaptic (0.91.3) ...");
        }
        assert!((p.fraction - 0.95).abs() < 1e-9);
    }

    #[test]
    fn unrelated_lines_leave_progress_alone() {
        let mut p = AptProgress::new();
        assert_eq!(p.feed("Hit:1 http://deb.debian.org/debian bookworm InRelease"), None);
        assert_eq!(p.fraction, 0.0);
    }
}
