/// Direction of a single-step move in the pinned list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
}

/// Ordered desktop-entry paths pinned to the dock. Order is on-screen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PinnedList {
    entries: Vec<String>,
}

impl PinnedList {
    /// Parse the value of a `pinned=` line. Empty segments are dropped;
    /// everything else, surrounding spaces included, is kept verbatim.
    pub fn parse(value: &str) -> Self {
        let entries = value
            .trim_end_matches(['\r', '\n'])
            .split(';')
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
        Self { entries }
    }

    /// The `;`-joined value written back after `pinned=`.
    pub fn to_value(&self) -> String {
        self.entries.join(";")
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.iter().any(|e| e == path)
    }

    /// Swap the entry at `index` with its neighbour. Returns the entry's new
    /// index, or `None` when the move would leave the list (no change).
    pub fn move_entry(&mut self, index: usize, direction: MoveDirection) -> Option<usize> {
        if index >= self.entries.len() {
            return None;
        }
        let target = match direction {
            MoveDirection::Up => index.checked_sub(1)?,
            MoveDirection::Down => {
                let next = index + 1;
                if next >= self.entries.len() {
                    return None;
                }
                next
            }
        };
        self.entries.swap(index, target);
        Some(target)
    }

    pub fn remove(&mut self, index: usize) -> Option<String> {
        if index < self.entries.len() {
            Some(self.entries.remove(index))
        } else {
            None
        }
    }

    /// Append every path not already present. Returns the paths actually added.
    pub fn add<I, S>(&mut self, paths: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut added = Vec::new();
        for path in paths {
            let path = path.into();
            if path.trim().is_empty() || self.contains(&path) {
                continue;
            }
            self.entries.push(path.clone());
            added.push(path);
        }
        added
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(items: &[&str]) -> PinnedList {
        PinnedList::parse(&items.join(";"))
    }

    #[test]
    fn parse_drops_empty_segments() {
        let l = PinnedList::parse("/a.desktop;;/b.desktop;\n");
        assert_eq!(l.entries(), ["/a.desktop", "/b.desktop"]);
        assert!(PinnedList::parse("").is_empty());
    }

    #[test]
    fn parse_keeps_surrounding_spaces() {
        let value = " /opt/My App.desktop ;/b.desktop";
        let l = PinnedList::parse(value);
        assert_eq!(l.entries(), [" /opt/My App.desktop ", "/b.desktop"]);
        assert_eq!(l.to_value(), value);
    }

    #[test]
    fn parse_keeps_duplicates() {
        let l = PinnedList::parse("/a.desktop;/a.desktop");
        assert_eq!(l.len(), 2);
    }

    #[test]
    fn move_first_to_last_and_back_restores_order() {
        let original = list(&["a", "b", "c", "d"]);
        let mut l = original.clone();

        let mut idx = 0;
        while let Some(next) = l.move_entry(idx, MoveDirection::Down) {
            idx = next;
        }
        assert_eq!(idx, 3);
        assert_eq!(l.entries(), ["b", "c", "d", "a"]);

        while let Some(next) = l.move_entry(idx, MoveDirection::Up) {
            idx = next;
        }
        assert_eq!(idx, 0);
        assert_eq!(l, original);
    }

    #[test]
    fn move_at_boundaries_is_noop() {
        let mut l = list(&["a", "b"]);
        assert_eq!(l.move_entry(0, MoveDirection::Up), None);
        assert_eq!(l.move_entry(1, MoveDirection::Down), None);
        assert_eq!(l.move_entry(5, MoveDirection::Up), None);
        assert_eq!(l.entries(), ["a", "b"]);
    }

    #[test]
    fn adding_present_path_is_noop() {
        let mut l = list(&["a", "b"]);
        let added = l.add(["b", "c", "c", ""]);
        assert_eq!(added, ["c"]);
        assert_eq!(l.entries(), ["a", "b", "c"]);
        assert!(l.add(["a"]).is_empty());
        assert_eq!(l.len(), 3);
    }

    #[test]
    fn removing_only_entry_gives_empty_value() {
        let mut l = list(&["a"]);
        assert_eq!(l.remove(0).as_deref(), Some("a"));
        assert_eq!(l.remove(0), None);
        assert_eq!(l.to_value(), "");
    }
}
