//! Typed seam over the platform API. Implementations do no business logic:
//! one request, one typed result or a `Network`/`Decode` error.

/// Recording stand-in for lane and session tests; downstream crates opt in
/// through the `mock` feature.
#[cfg(any(test, feature = "mock"))]
pub mod mock;

use crate::model::{
    ActiveEnvironmentHint, EnvironmentRef, EnvironmentSnapshot, PlatformStatus, PowerState,
    WatchListPush,
};
use crate::prelude::SyncResult;
use async_trait::async_trait;

#[async_trait]
pub trait RemoteGateway: Send + Sync {
    async fn fetch_environment_list(&self) -> SyncResult<Vec<EnvironmentRef>>;

    /// Fetches one environment; the snapshot carries `id` as requested.
    async fn fetch_environment_data(&self, id: &str) -> SyncResult<EnvironmentSnapshot>;

    /// First-run bootstrap only.
    async fn fetch_active_environment_hint(&self) -> SyncResult<ActiveEnvironmentHint>;

    async fn fetch_platform_status(&self) -> SyncResult<PlatformStatus>;

    async fn set_active_environment(&self, id: &str) -> SyncResult<()>;

    async fn create_environment(&self, label: &str) -> SyncResult<()>;

    async fn set_platform_power(&self, state: PowerState) -> SyncResult<()>;

    async fn push_watch_list(&self, push: &WatchListPush) -> SyncResult<()>;
}
