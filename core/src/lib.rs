//! Reconciliation and selection engine for the field-scan viewer.
//!
//! Remote snapshots arrive on independent poll lanes and are merged into a
//! single view-state; user selection is resolved against whatever snapshot
//! is current, and local watch-list edits are pushed back on their own lane.

pub mod gateway;
pub mod math;
pub mod model;
pub mod prelude;
pub mod reconcile;
pub mod sync;
pub mod telemetry;

pub use prelude::{PollTask, SyncError, SyncResult};
