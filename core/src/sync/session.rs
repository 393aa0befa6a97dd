//! User-facing actions. Every action mutates the shared view-state first so
//! the next frame reflects it, then fires the matching remote call.

use crate::gateway::RemoteGateway;
use crate::model::{DetailTab, ObjectKey, OverlayKind, PowerState, RecordId, WatchListEntry};
use crate::prelude::{SyncError, SyncResult};
use crate::reconcile::selection::{self, DisplayFrame, DisplaySettings, SelectionResult};
use crate::reconcile::view_state::ViewStore;
use crate::sync::lanes::{EnvironmentLane, EnvironmentListLane, StatusLane, WatchListLane};
use crate::sync::scheduler::PollScheduler;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Per-lane periods in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Cadence {
    pub environment_ms: u64,
    pub status_ms: u64,
    pub environment_list_ms: u64,
    pub watch_list_ms: u64,
    /// Frame refresh for the rendering surface; not a remote lane.
    pub render_ms: u64,
}

impl Default for Cadence {
    fn default() -> Self {
        Self {
            environment_ms: 200,
            status_ms: 200,
            environment_list_ms: 200,
            watch_list_ms: 150,
            render_ms: 100,
        }
    }
}

impl Cadence {
    pub fn is_valid(&self) -> bool {
        [
            self.environment_ms,
            self.status_ms,
            self.environment_list_ms,
            self.watch_list_ms,
            self.render_ms,
        ]
        .iter()
        .all(|ms| *ms > 0)
    }
}

#[derive(Clone)]
pub struct Session {
    store: ViewStore,
    gateway: Arc<dyn RemoteGateway>,
    settings: DisplaySettings,
}

impl Session {
    pub fn new(store: ViewStore, gateway: Arc<dyn RemoteGateway>, settings: DisplaySettings) -> Self {
        Self {
            store,
            gateway,
            settings,
        }
    }

    pub fn store(&self) -> &ViewStore {
        &self.store
    }

    /// Builds a scheduler with the four remote lanes over this session's state.
    pub fn scheduler(&self, cadence: &Cadence) -> PollScheduler {
        let ms = Duration::from_millis;
        PollScheduler::new()
            .with_lane(
                Arc::new(EnvironmentLane::new(self.store.clone(), self.gateway.clone())),
                ms(cadence.environment_ms),
            )
            .with_lane(
                Arc::new(StatusLane::new(self.store.clone(), self.gateway.clone())),
                ms(cadence.status_ms),
            )
            .with_lane(
                Arc::new(EnvironmentListLane::new(
                    self.store.clone(),
                    self.gateway.clone(),
                )),
                ms(cadence.environment_list_ms),
            )
            .with_lane(
                Arc::new(WatchListLane::new(self.store.clone(), self.gateway.clone())),
                ms(cadence.watch_list_ms),
            )
    }

    /// Retargets locally, then tells the platform which environment is active.
    /// A failed notification is logged; the local switch stands.
    pub async fn select_environment(&self, id: &str) -> SelectionResult {
        self.store
            .update(|state| selection::select_environment(state, id))?;
        let id = id.trim();
        if let Err(err) = self.gateway.set_active_environment(id).await {
            warn!("set active environment {id}: {err}");
        }
        Ok(())
    }

    /// Returns whether a request was sent; blank labels are ignored.
    pub async fn create_environment(&self, label: &str) -> SyncResult<()> {
        let label = required_label("environment name", label)?;
        if let Err(err) = self.gateway.create_environment(label).await {
            warn!("create environment {label}: {err}");
        }
        Ok(())
    }

    /// Flips capture power between off and on and returns the new state.
    pub async fn toggle_power(&self) -> PowerState {
        let next = self.store.update(|state| {
            state.power = match state.power {
                PowerState::On => PowerState::Off,
                PowerState::Off | PowerState::OneShotCapture => PowerState::On,
            };
            state.power
        });
        info!("platform power -> {next}");
        if let Err(err) = self.gateway.set_platform_power(next).await {
            warn!("set platform power {next}: {err}");
        }
        next
    }

    pub async fn capture_once(&self) {
        self.store.update(|state| state.power = PowerState::Off);
        if let Err(err) = self
            .gateway
            .set_platform_power(PowerState::OneShotCapture)
            .await
        {
            warn!("request single capture: {err}");
        }
    }

    pub fn select_pin(&self, pin_id: &RecordId) -> SelectionResult {
        self.store
            .update(|state| selection::select_pin(state, pin_id))
    }

    pub fn select_overlay(&self, kind: OverlayKind) -> SelectionResult {
        self.store
            .update(|state| selection::select_overlay(state, kind))
    }

    pub fn open_detail(&self, object: ObjectKey) -> SelectionResult {
        self.store
            .update(|state| selection::open_detail(state, object))
    }

    pub fn close_detail(&self) {
        self.store.update(selection::close_detail)
    }

    pub fn select_detail_tab(&self, tab: DetailTab) -> SelectionResult {
        self.store
            .update(|state| selection::select_detail_tab(state, tab))
    }

    pub fn toggle_objects(&self) -> bool {
        self.store.update(selection::toggle_objects)
    }

    /// Appends to the watch-list; the push lane picks it up on its next tick.
    pub fn watch(&self, label: &str, requires_full_scan: bool) -> SyncResult<()> {
        let label = required_label("watch-list label", label)?;
        self.store.update(|state| {
            state
                .watch_list
                .append(WatchListEntry::new(label, requires_full_scan))
        });
        Ok(())
    }

    pub fn unwatch(&self, index: usize) -> Option<WatchListEntry> {
        self.store.update(|state| state.watch_list.remove_at(index))
    }

    pub fn set_full_scan(&self, enabled: bool) {
        self.store
            .update(|state| state.watch_list.set_manual_full_scan(enabled))
    }

    pub fn frame(&self) -> DisplayFrame {
        self.store
            .read(|state| selection::frame(state, &self.settings))
    }
}

/// Blank user input never reaches the remote side.
fn required_label<'a>(what: &str, label: &'a str) -> SyncResult<&'a str> {
    let label = label.trim();
    if label.is_empty() {
        return Err(SyncError::InvalidInput(format!("{what} must not be empty")));
    }
    Ok(label)
}
