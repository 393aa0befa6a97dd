use crate::model::object::ScanObject;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Identifier the remote side assigns to pins and objects; numeric in
/// current captures, textual in older ones. Numeric strings decode as
/// `Number`, so `"7"` and `7` name the same record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(i64),
    Text(String),
    /// Index in the environment's pin list, for pins written without an id.
    Position(usize),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireId {
    Number(i64),
    Text(String),
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match WireId::deserialize(deserializer)? {
            WireId::Number(value) => RecordId::Number(value),
            WireId::Text(value) => RecordId::from(value.as_str()),
        })
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Number(value) => write!(f, "{value}"),
            RecordId::Text(value) => f.write_str(value),
            RecordId::Position(index) => write!(f, "#{index}"),
        }
    }
}

impl From<i64> for RecordId {
    fn from(value: i64) -> Self {
        RecordId::Number(value)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        match value.parse::<i64>() {
            Ok(number) => RecordId::Number(number),
            Err(_) => RecordId::Text(value.to_string()),
        }
    }
}

/// Entry of the environment list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentRef {
    pub filename: String,
    pub location: String,
}

/// Body returned by the environment data endpoint. It does not echo the
/// environment id, so the gateway pairs it with the id it requested.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentDocument {
    #[serde(default)]
    pub location: String,
    #[serde(default, deserialize_with = "positional_pins")]
    pub pins: Vec<Pin>,
}

/// Pins without an id are keyed by where they sit in the list.
fn positional_pins<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Pin>, D::Error> {
    let mut pins = Vec::<Pin>::deserialize(deserializer)?;
    for (index, pin) in pins.iter_mut().enumerate() {
        if let RecordId::Position(_) = pin.id {
            pin.id = RecordId::Position(index);
        }
    }
    Ok(pins)
}

/// One polled environment, keyed by the id that was current when the
/// request went out.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvironmentSnapshot {
    pub id: String,
    pub location: String,
    pub pins: Vec<Pin>,
}

impl EnvironmentSnapshot {
    pub fn new(id: impl Into<String>, document: EnvironmentDocument) -> Self {
        Self {
            id: id.into(),
            location: document.location,
            pins: document.pins,
        }
    }

    pub fn pin(&self, id: &RecordId) -> Option<&Pin> {
        self.pins.iter().find(|pin| &pin.id == id)
    }
}

/// Rendered modality that can be shown for a pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayKind {
    /// Stitched colour panorama; the base layer.
    Rgb,
    Classification,
    Ndvi,
    Ndmi,
    Msavi,
    Custom,
    Artificial,
    HsiRgb,
}

impl OverlayKind {
    pub const ALL: [OverlayKind; 8] = [
        OverlayKind::Rgb,
        OverlayKind::Classification,
        OverlayKind::Ndvi,
        OverlayKind::Ndmi,
        OverlayKind::Msavi,
        OverlayKind::Custom,
        OverlayKind::Artificial,
        OverlayKind::HsiRgb,
    ];

    pub fn label(self) -> &'static str {
        match self {
            OverlayKind::Rgb => "rgb",
            OverlayKind::Classification => "classification",
            OverlayKind::Ndvi => "ndvi",
            OverlayKind::Ndmi => "ndmi",
            OverlayKind::Msavi => "msavi",
            OverlayKind::Custom => "custom",
            OverlayKind::Artificial => "artificial",
            OverlayKind::HsiRgb => "hsi_rgb",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim().to_ascii_lowercase();
        let alias = match value.as_str() {
            "panorama" | "base" => "rgb",
            "hsi" => "classification",
            "custom2" => "custom",
            other => other,
        };
        Self::ALL.into_iter().find(|kind| kind.label() == alias)
    }
}

impl fmt::Display for OverlayKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A capture location. Overlay references are held in a map keyed by kind,
/// so availability of a tab is a plain presence check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "PinRecord", into = "PinRecord")]
pub struct Pin {
    pub id: RecordId,
    pub geo_coords: [f64; 2],
    pub timestamp: Option<String>,
    pub overlays: BTreeMap<OverlayKind, String>,
    pub objects: Vec<ScanObject>,
}

impl Pin {
    pub fn overlay(&self, kind: OverlayKind) -> Option<&str> {
        self.overlays.get(&kind).map(String::as_str)
    }

    pub fn has_overlay(&self, kind: OverlayKind) -> bool {
        self.overlays.contains_key(&kind)
    }

    pub fn available_overlays(&self) -> Vec<OverlayKind> {
        self.overlays.keys().copied().collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PinRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<RecordId>,
    #[serde(default)]
    geo_coords: [f64; 2],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    panorama_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    hsi_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ndvi_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ndmi_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    msavi_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    custom2_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    artificial_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rgb_ref: Option<String>,
    #[serde(default)]
    objects: Vec<ScanObject>,
}

impl From<PinRecord> for Pin {
    fn from(record: PinRecord) -> Self {
        let mut overlays = BTreeMap::new();
        let fields = [
            (OverlayKind::Rgb, record.panorama_ref),
            (OverlayKind::Classification, record.hsi_ref),
            (OverlayKind::Ndvi, record.ndvi_ref),
            (OverlayKind::Ndmi, record.ndmi_ref),
            (OverlayKind::Msavi, record.msavi_ref),
            (OverlayKind::Custom, record.custom2_ref),
            (OverlayKind::Artificial, record.artificial_ref),
            (OverlayKind::HsiRgb, record.rgb_ref),
        ];
        for (kind, reference) in fields {
            if let Some(reference) = reference.filter(|r| !r.trim().is_empty()) {
                overlays.insert(kind, reference);
            }
        }

        Self {
            id: record.id.unwrap_or(RecordId::Position(0)),
            geo_coords: record.geo_coords,
            timestamp: record.timestamp,
            overlays,
            objects: record.objects,
        }
    }
}

impl From<Pin> for PinRecord {
    fn from(pin: Pin) -> Self {
        let mut overlays = pin.overlays;
        let mut take = |kind: OverlayKind| overlays.remove(&kind);
        Self {
            id: match pin.id {
                RecordId::Position(_) => None,
                id => Some(id),
            },
            geo_coords: pin.geo_coords,
            timestamp: pin.timestamp,
            panorama_ref: take(OverlayKind::Rgb),
            hsi_ref: take(OverlayKind::Classification),
            ndvi_ref: take(OverlayKind::Ndvi),
            ndmi_ref: take(OverlayKind::Ndmi),
            msavi_ref: take(OverlayKind::Msavi),
            custom2_ref: take(OverlayKind::Custom),
            artificial_ref: take(OverlayKind::Artificial),
            rgb_ref: take(OverlayKind::HsiRgb),
            objects: pin.objects,
        }
    }
}
