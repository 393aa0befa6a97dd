use crate::model::{EnvironmentSnapshot, OverlayKind, Pin, RecordId, ScanObject};
use crate::reconcile::view_state::{Focus, ViewState};
use std::collections::BTreeMap;

pub fn targeting(id: &str) -> ViewState {
    let mut state = ViewState::new();
    state.selection.focus = Focus::Environment {
        id: id.to_string(),
        pin: None,
    };
    state
}

pub fn environment(id: &str, pins: Vec<Pin>) -> EnvironmentSnapshot {
    EnvironmentSnapshot {
        id: id.to_string(),
        location: "Glasgow".to_string(),
        pins,
    }
}

pub fn pin(id: i64, panorama_ref: &str) -> Pin {
    Pin {
        id: RecordId::Number(id),
        geo_coords: [55.85, -4.23],
        timestamp: None,
        overlays: BTreeMap::from([(OverlayKind::Rgb, panorama_ref.to_string())]),
        objects: Vec::new(),
    }
}

pub fn object(label: &str) -> ScanObject {
    ScanObject::new(3199.5, 407.5, label, 0.9)
}
