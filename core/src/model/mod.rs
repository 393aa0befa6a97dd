pub mod environment;
pub mod lenient;
pub mod object;
pub mod status;
pub mod watch;

pub use environment::{
    EnvironmentDocument, EnvironmentRef, EnvironmentSnapshot, OverlayKind, Pin, RecordId,
};
pub use object::{DetailTab, ObjectKey, ScanObject};
pub use status::{PlatformStatus, PowerState, StatusLogEntry};
pub use watch::{ActiveEnvironmentHint, WatchListEntry, WatchListPush};
