use serde::{Deserialize, Serialize};

/// A label the field platform should look for, optionally with a
/// hyperspectral scan of every match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchListEntry {
    #[serde(rename = "object")]
    pub target_label: String,
    #[serde(rename = "hsi", default)]
    pub requires_full_scan: bool,
}

impl WatchListEntry {
    pub fn new(target_label: impl Into<String>, requires_full_scan: bool) -> Self {
        Self {
            target_label: target_label.into(),
            requires_full_scan,
        }
    }
}

/// Full-replace body sent to the watch-list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchListPush {
    #[serde(rename = "objects")]
    pub entries: Vec<WatchListEntry>,
    #[serde(rename = "hsiManualScan", default)]
    pub manual_full_scan: bool,
}

/// First-run answer of the active-environment endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActiveEnvironmentHint {
    #[serde(rename = "activeFile", default)]
    pub active_id: Option<String>,
    #[serde(rename = "searchObjects", default)]
    pub watch_list: Vec<WatchListEntry>,
}
