use crate::model::{
    DetailTab, EnvironmentRef, EnvironmentSnapshot, ObjectKey, OverlayKind, Pin, PlatformStatus,
    PowerState, RecordId, ScanObject, StatusLogEntry,
};
use crate::reconcile::edit_queue::EditQueue;
use std::sync::{Arc, Mutex, MutexGuard};

/// Status log entries kept for display.
pub const STATUS_LOG_CAPACITY: usize = 20;

/// The single owned record every component mutates through its own contract.
#[derive(Debug, Clone)]
pub struct ViewState {
    pub environments: Vec<EnvironmentRef>,
    /// Last merged environment; owned by the merger.
    pub environment: Option<EnvironmentSnapshot>,
    pub selection: Selection,
    pub watch_list: EditQueue,
    pub status: StatusBoard,
    pub power: PowerState,
    pub show_objects: bool,
    pub(crate) default_pin_applied: bool,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            environments: Vec::new(),
            environment: None,
            selection: Selection::default(),
            watch_list: EditQueue::new(),
            status: StatusBoard::default(),
            power: PowerState::Off,
            show_objects: true,
            default_pin_applied: false,
        }
    }
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The merged environment, but only while it is still the selected one.
    pub fn active_environment(&self) -> Option<&EnvironmentSnapshot> {
        let target = self.selection.target_environment()?;
        self.environment.as_ref().filter(|env| env.id == target)
    }

    pub fn active_pin(&self) -> Option<&Pin> {
        let focus = self.selection.pin_focus()?;
        self.active_environment()?.pin(&focus.pin_id)
    }

    pub fn detail_object(&self) -> Option<&ScanObject> {
        let Popup::Open { target, .. } = &self.selection.popup else {
            return None;
        };
        let pin = self.active_environment()?.pin(&target.pin_id)?;
        target.object.find(&pin.objects)
    }
}

/// Selection is derived state: ids only, resolved against the current
/// environment every time it is read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    pub focus: Focus,
    pub popup: Popup,
}

impl Selection {
    pub fn target_environment(&self) -> Option<&str> {
        match &self.focus {
            Focus::NoEnvironment => None,
            Focus::Environment { id, .. } => Some(id),
        }
    }

    pub fn pin_focus(&self) -> Option<&PinFocus> {
        match &self.focus {
            Focus::Environment { pin, .. } => pin.as_ref(),
            Focus::NoEnvironment => None,
        }
    }

    pub fn active_pin_id(&self) -> Option<&RecordId> {
        self.pin_focus().map(|focus| &focus.pin_id)
    }

    pub fn active_overlay(&self) -> Option<OverlayKind> {
        self.pin_focus().map(|focus| focus.overlay)
    }

    pub(crate) fn pin_focus_mut(&mut self) -> Option<&mut Option<PinFocus>> {
        match &mut self.focus {
            Focus::Environment { pin, .. } => Some(pin),
            Focus::NoEnvironment => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Focus {
    #[default]
    NoEnvironment,
    Environment {
        id: String,
        pin: Option<PinFocus>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PinFocus {
    pub pin_id: RecordId,
    pub overlay: OverlayKind,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Popup {
    #[default]
    Closed,
    Open {
        target: ObjectRef,
        tab: DetailTab,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectRef {
    pub pin_id: RecordId,
    pub object: ObjectKey,
}

/// Connectivity flags plus the edge-triggered message log.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusBoard {
    pub pi_online: bool,
    pub gps_online: bool,
    pub wifi_online: bool,
    last_message: String,
    log: Vec<StatusLogEntry>,
}

impl StatusBoard {
    pub fn message(&self) -> &str {
        &self.last_message
    }

    pub fn log(&self) -> &[StatusLogEntry] {
        &self.log
    }

    pub fn latest(&self) -> Option<&StatusLogEntry> {
        self.log.last()
    }

    pub(crate) fn apply_flags(&mut self, status: &PlatformStatus) {
        self.pi_online = status.pi_online;
        self.gps_online = status.gps_online;
        self.wifi_online = status.wifi_online;
    }

    pub(crate) fn record_message(&mut self, entry: StatusLogEntry) -> bool {
        if entry.message == self.last_message {
            return false;
        }
        self.last_message = entry.message.clone();
        self.log.push(entry);
        if self.log.len() > STATUS_LOG_CAPACITY {
            self.log.remove(0);
        }
        true
    }
}

/// Shared handle to the view-state. Locks are never held across an await.
#[derive(Debug, Clone, Default)]
pub struct ViewStore {
    inner: Arc<Mutex<ViewState>>,
}

impl ViewStore {
    pub fn new(state: ViewState) -> Self {
        Self {
            inner: Arc::new(Mutex::new(state)),
        }
    }

    pub fn read<R>(&self, f: impl FnOnce(&ViewState) -> R) -> R {
        f(&self.lock())
    }

    pub fn update<R>(&self, f: impl FnOnce(&mut ViewState) -> R) -> R {
        f(&mut self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, ViewState> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
