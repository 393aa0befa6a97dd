//! The concrete poll/push lanes wiring the gateway to the view-state.

use crate::gateway::RemoteGateway;
use crate::prelude::{PollTask, SyncResult};
use crate::reconcile::merger;
use crate::reconcile::view_state::ViewStore;
use async_trait::async_trait;
use chrono::Local;
use log::debug;
use std::sync::Arc;

/// Environment data, or the bootstrap hint while no environment is targeted.
pub struct EnvironmentLane {
    store: ViewStore,
    gateway: Arc<dyn RemoteGateway>,
}

impl EnvironmentLane {
    pub fn new(store: ViewStore, gateway: Arc<dyn RemoteGateway>) -> Self {
        Self { store, gateway }
    }
}

#[async_trait]
impl PollTask for EnvironmentLane {
    fn name(&self) -> &str {
        "environment"
    }

    async fn run(&self) -> SyncResult<()> {
        let target = self
            .store
            .read(|state| state.selection.target_environment().map(str::to_string));

        match target {
            None => {
                let hint = self.gateway.fetch_active_environment_hint().await?;
                self.store
                    .update(|state| merger::apply_bootstrap_hint(state, hint));
                Ok(())
            }
            Some(id) => {
                let snapshot = self.gateway.fetch_environment_data(&id).await?;
                self.store
                    .update(|state| merger::merge_environment(state, snapshot))
                    .map(|_| ())
            }
        }
    }
}

pub struct StatusLane {
    store: ViewStore,
    gateway: Arc<dyn RemoteGateway>,
}

impl StatusLane {
    pub fn new(store: ViewStore, gateway: Arc<dyn RemoteGateway>) -> Self {
        Self { store, gateway }
    }
}

#[async_trait]
impl PollTask for StatusLane {
    fn name(&self) -> &str {
        "status"
    }

    async fn run(&self) -> SyncResult<()> {
        let status = self.gateway.fetch_platform_status().await?;
        self.store
            .update(|state| merger::merge_status(state, status, Local::now()));
        Ok(())
    }
}

pub struct EnvironmentListLane {
    store: ViewStore,
    gateway: Arc<dyn RemoteGateway>,
}

impl EnvironmentListLane {
    pub fn new(store: ViewStore, gateway: Arc<dyn RemoteGateway>) -> Self {
        Self { store, gateway }
    }
}

#[async_trait]
impl PollTask for EnvironmentListLane {
    fn name(&self) -> &str {
        "environment-list"
    }

    async fn run(&self) -> SyncResult<()> {
        let environments = self.gateway.fetch_environment_list().await?;
        self.store
            .update(|state| merger::merge_environment_list(state, environments));
        Ok(())
    }
}

/// Pushes the whole current watch-list; last write wins on the remote side.
pub struct WatchListLane {
    store: ViewStore,
    gateway: Arc<dyn RemoteGateway>,
}

impl WatchListLane {
    pub fn new(store: ViewStore, gateway: Arc<dyn RemoteGateway>) -> Self {
        Self { store, gateway }
    }
}

#[async_trait]
impl PollTask for WatchListLane {
    fn name(&self) -> &str {
        "watch-list"
    }

    async fn run(&self) -> SyncResult<()> {
        let push = self.store.read(|state| {
            state
                .watch_list
                .is_ready()
                .then(|| state.watch_list.snapshot())
        });
        let Some(push) = push else {
            debug!("watch-list not yet owned locally; skipping push");
            return Ok(());
        };
        self.gateway.push_watch_list(&push).await
    }
}
