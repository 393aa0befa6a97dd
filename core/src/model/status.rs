use crate::model::lenient;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Field platform health as reported by the status endpoint, which encodes
/// it as a positional array `[message, pi, gps, wifi]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StatusRecord", into = "StatusRecord")]
pub struct PlatformStatus {
    pub message: String,
    pub pi_online: bool,
    pub gps_online: bool,
    pub wifi_online: bool,
}

#[derive(Serialize, Deserialize)]
struct StatusRecord(
    String,
    #[serde(deserialize_with = "lenient::flag")] bool,
    #[serde(deserialize_with = "lenient::flag")] bool,
    #[serde(deserialize_with = "lenient::flag")] bool,
);

impl From<StatusRecord> for PlatformStatus {
    fn from(StatusRecord(message, pi_online, gps_online, wifi_online): StatusRecord) -> Self {
        Self {
            message,
            pi_online,
            gps_online,
            wifi_online,
        }
    }
}

impl From<PlatformStatus> for StatusRecord {
    fn from(status: PlatformStatus) -> Self {
        StatusRecord(
            status.message,
            status.pi_online,
            status.gps_online,
            status.wifi_online,
        )
    }
}

/// A status message change, stamped with the client's wall clock at merge time.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusLogEntry {
    pub message: String,
    pub observed_at: DateTime<Local>,
}

/// Capture power requested from the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PowerState {
    #[default]
    Off,
    On,
    OneShotCapture,
}

impl PowerState {
    pub fn code(self) -> u8 {
        match self {
            PowerState::Off => 0,
            PowerState::On => 1,
            PowerState::OneShotCapture => 2,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(PowerState::Off),
            1 => Some(PowerState::On),
            2 => Some(PowerState::OneShotCapture),
            _ => None,
        }
    }
}

impl fmt::Display for PowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PowerState::Off => "off",
            PowerState::On => "on",
            PowerState::OneShotCapture => "one-shot capture",
        })
    }
}
