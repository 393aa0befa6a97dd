use crate::bridge::store::PlatformStore;
use crate::generator::profile::PinGenerator;
use crate::workflow::config::SimulatorConfig;
use log::info;
use scancore::model::{PowerState, RecordId};
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};

pub const IDLE: &str = "Idle";
pub const SCANNING: &str = "Scanning";
pub const CAPTURE_COMPLETE: &str = "Capture complete";

/// Result of one capture tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureStep {
    Idle,
    Captured(i64),
    /// Powered, but the active environment is gone.
    NoEnvironment,
}

/// Turns platform power into synthetic captures on the active environment.
pub struct CaptureRunner {
    store: PlatformStore,
    generator: PinGenerator,
    period: Duration,
}

impl CaptureRunner {
    pub fn new(store: PlatformStore, config: &SimulatorConfig) -> Self {
        Self {
            store,
            generator: PinGenerator::new(config.seed, config.objects_per_capture),
            period: Duration::from_millis(config.capture_interval_ms.max(1)),
        }
    }

    /// Runs forever; the caller drops the task to stop it.
    pub async fn run(mut self) {
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            self.step();
        }
    }

    pub fn step(&mut self) -> CaptureStep {
        let power = self.store.power();
        if power == PowerState::Off {
            self.store.set_message(IDLE);
            return CaptureStep::Idle;
        }

        let generator = &mut self.generator;
        let captured = self.store.append_capture(|id, last| {
            let near = last.unwrap_or([55.8721, -4.2882]);
            generator.next_pin(id, near)
        });
        let Some(pin) = captured else {
            self.store.set_message(IDLE);
            return CaptureStep::NoEnvironment;
        };

        let id = match pin.id {
            RecordId::Number(id) => id,
            RecordId::Text(_) | RecordId::Position(_) => 0,
        };
        info!(
            "captured pin {id} with {} objects into {}",
            pin.objects.len(),
            self.store.active_file()
        );
        if power == PowerState::OneShotCapture {
            self.store.set_power(PowerState::Off);
            self.store.set_message(CAPTURE_COMPLETE);
        } else {
            self.store.set_message(SCANNING);
        }
        CaptureStep::Captured(id)
    }
}
