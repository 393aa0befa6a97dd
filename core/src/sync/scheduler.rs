use crate::prelude::{PollTask, SyncError};
use crate::telemetry::metrics::{MetricsRecorder, MetricsSnapshot};
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant, MissedTickBehavior};

struct Lane {
    task: Arc<dyn PollTask>,
    period: Duration,
}

/// Runs independent periodic lanes, one tokio task each.
///
/// Within a lane an invocation always finishes before the next one starts;
/// ticks that fall due while a run is in flight are skipped, not queued.
/// Lanes never wait on each other.
#[derive(Default)]
pub struct PollScheduler {
    lanes: Vec<Lane>,
}

impl PollScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lane(mut self, task: Arc<dyn PollTask>, period: Duration) -> Self {
        self.lanes.push(Lane {
            task,
            period: period.max(Duration::from_millis(1)),
        });
        self
    }

    /// Spawns every lane on the current tokio runtime.
    pub fn start(self) -> SchedulerHandle {
        let (shutdown, _) = watch::channel(false);
        let lanes = self
            .lanes
            .into_iter()
            .map(|lane| {
                let name = lane.task.name().to_string();
                let metrics = Arc::new(MetricsRecorder::new());
                let handle = tokio::spawn(run_lane(
                    lane,
                    metrics.clone(),
                    shutdown.subscribe(),
                ));
                info!("started lane {name}");
                RunningLane {
                    name,
                    metrics,
                    handle,
                }
            })
            .collect();
        SchedulerHandle { shutdown, lanes }
    }
}

struct RunningLane {
    name: String,
    metrics: Arc<MetricsRecorder>,
    handle: JoinHandle<()>,
}

pub struct SchedulerHandle {
    shutdown: watch::Sender<bool>,
    lanes: Vec<RunningLane>,
}

impl SchedulerHandle {
    pub fn lane_names(&self) -> Vec<&str> {
        self.lanes.iter().map(|lane| lane.name.as_str()).collect()
    }

    pub fn metrics(&self, name: &str) -> Option<MetricsSnapshot> {
        self.lanes
            .iter()
            .find(|lane| lane.name == name)
            .map(|lane| lane.metrics.snapshot())
    }

    /// Stops every lane. In-flight requests are dropped, not awaited.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        for lane in self.lanes {
            if let Err(err) = lane.handle.await {
                warn!("lane {} ended abnormally: {err}", lane.name);
            }
        }
    }
}

async fn run_lane(
    lane: Lane,
    metrics: Arc<MetricsRecorder>,
    mut shutdown: watch::Receiver<bool>,
) {
    let name = lane.task.name().to_string();
    let mut ticker = interval(lane.period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = shutdown.changed() => break,
        }

        let started = Instant::now();
        let outcome = tokio::select! {
            outcome = lane.task.run() => outcome,
            _ = shutdown.changed() => break,
        };

        match outcome {
            Ok(()) => metrics.record_completed(),
            Err(err @ SyncError::StaleResponse { .. }) => {
                debug!("{name}: discarded {err}");
                metrics.record_stale();
            }
            Err(err) => {
                warn!("{name}: {err}");
                metrics.record_error();
            }
        }

        let overrun = started.elapsed().as_nanos() / lane.period.as_nanos();
        if overrun > 0 {
            debug!("{name}: run overran {overrun} tick(s)");
            metrics.record_skipped(overrun as usize);
        }
    }
    debug!("lane {name} stopped");
}
