//! In-memory gateway for lane and session tests.
//!
//! Serves canned responses, records every call, and can be told to fail or
//! to stall a given request kind.

use crate::gateway::RemoteGateway;
use crate::model::{
    ActiveEnvironmentHint, EnvironmentDocument, EnvironmentRef, EnvironmentSnapshot,
    PlatformStatus, PowerState, WatchListPush,
};
use crate::prelude::{SyncError, SyncResult};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// A recorded call to the mock gateway.
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    EnvironmentList,
    EnvironmentData(String),
    ActiveEnvironmentHint,
    PlatformStatus,
    SetActiveEnvironment(String),
    CreateEnvironment(String),
    SetPlatformPower(PowerState),
    PushWatchList(WatchListPush),
}

/// Request kinds, for targeting failures and delays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallKind {
    EnvironmentList,
    EnvironmentData,
    ActiveEnvironmentHint,
    PlatformStatus,
    SetActiveEnvironment,
    CreateEnvironment,
    SetPlatformPower,
    PushWatchList,
}

impl MockCall {
    pub fn kind(&self) -> CallKind {
        match self {
            MockCall::EnvironmentList => CallKind::EnvironmentList,
            MockCall::EnvironmentData(_) => CallKind::EnvironmentData,
            MockCall::ActiveEnvironmentHint => CallKind::ActiveEnvironmentHint,
            MockCall::PlatformStatus => CallKind::PlatformStatus,
            MockCall::SetActiveEnvironment(_) => CallKind::SetActiveEnvironment,
            MockCall::CreateEnvironment(_) => CallKind::CreateEnvironment,
            MockCall::SetPlatformPower(_) => CallKind::SetPlatformPower,
            MockCall::PushWatchList(_) => CallKind::PushWatchList,
        }
    }
}

#[derive(Default)]
struct MockData {
    environments: Vec<EnvironmentRef>,
    documents: HashMap<String, EnvironmentDocument>,
    hint: ActiveEnvironmentHint,
    status: Option<PlatformStatus>,
    failing: HashSet<CallKind>,
    delays: HashMap<CallKind, Duration>,
    calls: Vec<MockCall>,
}

#[derive(Default)]
pub struct MockGateway {
    data: Mutex<MockData>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_environment(self, id: &str, document: EnvironmentDocument) -> Self {
        {
            let mut data = self.lock();
            data.environments.push(EnvironmentRef {
                filename: id.to_string(),
                location: document.location.clone(),
            });
            data.documents.insert(id.to_string(), document);
        }
        self
    }

    pub fn with_hint(self, hint: ActiveEnvironmentHint) -> Self {
        self.lock().hint = hint;
        self
    }

    pub fn with_status(self, status: PlatformStatus) -> Self {
        self.lock().status = Some(status);
        self
    }

    pub fn set_document(&self, id: &str, document: EnvironmentDocument) {
        self.lock().documents.insert(id.to_string(), document);
    }

    pub fn set_status(&self, status: PlatformStatus) {
        self.lock().status = Some(status);
    }

    /// Makes every request of `kind` fail with a network error until cleared.
    pub fn fail(&self, kind: CallKind, failing: bool) {
        let mut data = self.lock();
        if failing {
            data.failing.insert(kind);
        } else {
            data.failing.remove(&kind);
        }
    }

    /// Delays every request of `kind` before it answers.
    pub fn delay(&self, kind: CallKind, delay: Duration) {
        self.lock().delays.insert(kind, delay);
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.lock().calls.clone()
    }

    pub fn count(&self, kind: CallKind) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|call| call.kind() == kind)
            .count()
    }

    pub fn pushes(&self) -> Vec<WatchListPush> {
        self.lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                MockCall::PushWatchList(push) => Some(push.clone()),
                _ => None,
            })
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, MockData> {
        match self.data.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    async fn enter(&self, call: MockCall) -> SyncResult<()> {
        let kind = call.kind();
        let delay = {
            let mut data = self.lock();
            data.calls.push(call);
            data.delays.get(&kind).copied()
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.lock().failing.contains(&kind) {
            return Err(SyncError::Network(format!("{kind:?} unavailable")));
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteGateway for MockGateway {
    async fn fetch_environment_list(&self) -> SyncResult<Vec<EnvironmentRef>> {
        self.enter(MockCall::EnvironmentList).await?;
        Ok(self.lock().environments.clone())
    }

    async fn fetch_environment_data(&self, id: &str) -> SyncResult<EnvironmentSnapshot> {
        self.enter(MockCall::EnvironmentData(id.to_string())).await?;
        let document = self
            .lock()
            .documents
            .get(id)
            .cloned()
            .ok_or_else(|| SyncError::Decode(format!("no environment {id}")))?;
        Ok(EnvironmentSnapshot::new(id, document))
    }

    async fn fetch_active_environment_hint(&self) -> SyncResult<ActiveEnvironmentHint> {
        self.enter(MockCall::ActiveEnvironmentHint).await?;
        Ok(self.lock().hint.clone())
    }

    async fn fetch_platform_status(&self) -> SyncResult<PlatformStatus> {
        self.enter(MockCall::PlatformStatus).await?;
        self.lock()
            .status
            .clone()
            .ok_or_else(|| SyncError::Decode("no status configured".into()))
    }

    async fn set_active_environment(&self, id: &str) -> SyncResult<()> {
        self.enter(MockCall::SetActiveEnvironment(id.to_string()))
            .await
    }

    async fn create_environment(&self, label: &str) -> SyncResult<()> {
        self.enter(MockCall::CreateEnvironment(label.to_string()))
            .await
    }

    async fn set_platform_power(&self, state: PowerState) -> SyncResult<()> {
        self.enter(MockCall::SetPlatformPower(state)).await
    }

    async fn push_watch_list(&self, push: &WatchListPush) -> SyncResult<()> {
        self.enter(MockCall::PushWatchList(push.clone())).await
    }
}
