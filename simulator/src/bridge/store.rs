use crate::generator::template::{demo_environment, DEMO_FILE};
use log::info;
use scancore::model::{
    ActiveEnvironmentHint, EnvironmentDocument, EnvironmentRef, Pin, PlatformStatus, PowerState,
    RecordId, WatchListPush,
};
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug)]
struct PlatformData {
    environments: BTreeMap<String, EnvironmentDocument>,
    active_file: String,
    watch_list: WatchListPush,
    status: PlatformStatus,
    power: PowerState,
}

/// In-memory platform state behind the HTTP routes and the capture runner.
#[derive(Clone)]
pub struct PlatformStore {
    inner: Arc<RwLock<PlatformData>>,
}

impl PlatformStore {
    /// Store holding only the demo environment, which is also active.
    pub fn seeded() -> Self {
        let data = PlatformData {
            environments: BTreeMap::from([(DEMO_FILE.to_string(), demo_environment())]),
            active_file: DEMO_FILE.to_string(),
            watch_list: WatchListPush {
                entries: Vec::new(),
                manual_full_scan: false,
            },
            status: PlatformStatus {
                message: "Idle".into(),
                pi_online: true,
                gps_online: true,
                wifi_online: true,
            },
            power: PowerState::Off,
        };
        Self {
            inner: Arc::new(RwLock::new(data)),
        }
    }

    pub fn environment_list(&self) -> Vec<EnvironmentRef> {
        self.read()
            .environments
            .iter()
            .map(|(filename, document)| EnvironmentRef {
                filename: filename.clone(),
                location: document.location.clone(),
            })
            .collect()
    }

    pub fn document(&self, file: &str) -> Option<EnvironmentDocument> {
        self.read().environments.get(file).cloned()
    }

    pub fn active_hint(&self) -> ActiveEnvironmentHint {
        let data = self.read();
        ActiveEnvironmentHint {
            active_id: Some(data.active_file.clone()),
            watch_list: data.watch_list.entries.clone(),
        }
    }

    pub fn active_file(&self) -> String {
        self.read().active_file.clone()
    }

    /// Returns false for files the store does not hold.
    pub fn set_active(&self, file: &str) -> bool {
        let mut data = self.write();
        if !data.environments.contains_key(file) {
            return false;
        }
        if data.active_file != file {
            info!("active environment -> {file}");
            data.active_file = file.to_string();
        }
        true
    }

    /// Creates an empty environment named after `label` and makes it active.
    /// An existing environment with the same file name is kept as is.
    pub fn create_environment(&self, label: &str) -> Option<String> {
        let label = label.trim();
        let file = format!("{}.json", slug(label)?);
        let mut data = self.write();
        data.environments
            .entry(file.clone())
            .or_insert_with(|| EnvironmentDocument {
                location: label.to_string(),
                pins: Vec::new(),
            });
        data.active_file = file.clone();
        info!("created environment {file} ({label})");
        Some(file)
    }

    pub fn status(&self) -> PlatformStatus {
        self.read().status.clone()
    }

    pub fn set_message(&self, message: &str) {
        self.write().status.message = message.to_string();
    }

    pub fn power(&self) -> PowerState {
        self.read().power
    }

    pub fn set_power(&self, power: PowerState) {
        let mut data = self.write();
        if data.power != power {
            info!("platform power {} -> {power}", data.power);
            data.power = power;
        }
    }

    #[cfg(test)]
    pub fn watch_list(&self) -> WatchListPush {
        self.read().watch_list.clone()
    }

    pub fn replace_watch_list(&self, push: WatchListPush) {
        self.write().watch_list = push;
    }

    /// Appends a capture to the active environment. The closure receives the
    /// next free pin id and the coordinates of the latest pin, if any.
    pub fn append_capture(&self, build: impl FnOnce(i64, Option<[f64; 2]>) -> Pin) -> Option<Pin> {
        let mut data = self.write();
        let active = data.active_file.clone();
        let document = data.environments.get_mut(&active)?;
        let next_id = document
            .pins
            .iter()
            .filter_map(|pin| match &pin.id {
                RecordId::Number(id) => Some(*id),
                RecordId::Text(_) | RecordId::Position(_) => None,
            })
            .max()
            .unwrap_or(0)
            + 1;
        let last = document.pins.last().map(|pin| pin.geo_coords);
        let pin = build(next_id, last);
        document.pins.push(pin.clone());
        Some(pin)
    }

    fn read(&self) -> RwLockReadGuard<'_, PlatformData> {
        match self.inner.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, PlatformData> {
        match self.inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// File stem for a user-supplied environment label: lowercase alphanumerics
/// joined by single underscores. `None` when nothing usable remains.
pub fn slug(label: &str) -> Option<String> {
    let words: Vec<String> = label
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_ascii_lowercase)
        .collect();
    if words.is_empty() {
        None
    } else {
        Some(words.join("_"))
    }
}
