use crate::model::{WatchListEntry, WatchListPush};

/// Locally authored watch-list edits.
///
/// Edits apply immediately; a separate lane pushes the whole list upstream.
/// Nothing received from the remote side is merged back into it, apart from
/// the one-time bootstrap seed taken while the queue is still pristine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditQueue {
    entries: Vec<WatchListEntry>,
    manual_full_scan: bool,
    revision: u64,
    seeded: bool,
}

impl EditQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, entry: WatchListEntry) {
        self.entries.push(entry);
        self.revision += 1;
    }

    pub fn remove_at(&mut self, index: usize) -> Option<WatchListEntry> {
        if index >= self.entries.len() {
            return None;
        }
        self.revision += 1;
        Some(self.entries.remove(index))
    }

    /// Manual hyperspectral full-scan toggle; independent of the per-entry flags.
    pub fn set_manual_full_scan(&mut self, enabled: bool) {
        if self.manual_full_scan != enabled {
            self.manual_full_scan = enabled;
            self.revision += 1;
        }
    }

    pub fn manual_full_scan(&self) -> bool {
        self.manual_full_scan
    }

    pub fn entries(&self) -> &[WatchListEntry] {
        &self.entries
    }

    /// Number of local edits applied so far.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Takes the remote list once, and only if the user has not edited yet.
    pub fn seed(&mut self, entries: Vec<WatchListEntry>) -> bool {
        if self.seeded || self.revision > 0 {
            return false;
        }
        self.entries = entries;
        self.seeded = true;
        true
    }

    /// Whether pushing would mirror a list the client actually owns.
    pub fn is_ready(&self) -> bool {
        self.seeded || self.revision > 0
    }

    pub fn snapshot(&self) -> WatchListPush {
        WatchListPush {
            entries: self.entries.clone(),
            manual_full_scan: self.manual_full_scan,
        }
    }
}
