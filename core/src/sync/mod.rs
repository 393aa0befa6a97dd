pub mod lanes;
pub mod scheduler;
pub mod session;

pub use lanes::{EnvironmentLane, EnvironmentListLane, StatusLane, WatchListLane};
pub use scheduler::{PollScheduler, SchedulerHandle};
pub use session::{Cadence, Session};
