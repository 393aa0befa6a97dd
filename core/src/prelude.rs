use async_trait::async_trait;

/// Failure taxonomy shared by every remote round trip.
///
/// All variants are handled the same way at the lane boundary: logged,
/// counted, and retried by the next scheduled tick.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SyncError {
    #[error("network error: {0}")]
    Network(String),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("stale response for {received:?} (current target {expected:?})")]
    StaleResponse {
        expected: Option<String>,
        received: String,
    },
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl SyncError {
    pub fn is_stale(&self) -> bool {
        matches!(self, SyncError::StaleResponse { .. })
    }
}

pub type SyncResult<T> = Result<T, SyncError>;

/// A single unit of periodic work driven by the poll scheduler.
///
/// One invocation is one round trip plus whatever merge follows it. The
/// scheduler never runs two invocations of the same task at once.
#[async_trait]
pub trait PollTask: Send + Sync {
    fn name(&self) -> &str;
    async fn run(&self) -> SyncResult<()>;
}
