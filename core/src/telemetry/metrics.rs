use std::sync::Mutex;

/// Counters for one scheduler lane.
pub struct MetricsRecorder {
    inner: Mutex<Metrics>,
}

/// Point-in-time copy of a lane's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub completed: usize,
    pub errors: usize,
    pub stale: usize,
    pub skipped_ticks: usize,
}

#[derive(Default)]
struct Metrics {
    completed: usize,
    errors: usize,
    stale: usize,
    skipped_ticks: usize,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Metrics::default()),
        }
    }

    pub fn record_completed(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.completed += 1;
        }
    }

    pub fn record_error(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.errors += 1;
        }
    }

    pub fn record_stale(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.stale += 1;
        }
    }

    /// Ticks that elapsed while the previous run was still in flight.
    pub fn record_skipped(&self, ticks: usize) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.skipped_ticks += ticks;
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        if let Ok(metrics) = self.inner.lock() {
            MetricsSnapshot {
                completed: metrics.completed,
                errors: metrics.errors,
                stale: metrics.stale,
                skipped_ticks: metrics.skipped_ticks,
            }
        } else {
            MetricsSnapshot::default()
        }
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recorder_accumulates_each_counter() {
        let recorder = MetricsRecorder::new();
        recorder.record_completed();
        recorder.record_completed();
        recorder.record_error();
        recorder.record_stale();
        recorder.record_skipped(3);

        assert_eq!(
            recorder.snapshot(),
            MetricsSnapshot {
                completed: 2,
                errors: 1,
                stale: 1,
                skipped_ticks: 3,
            }
        );
    }
}
