use scancore::model::{EnvironmentDocument, OverlayKind, Pin, RecordId, ScanObject};
use std::collections::BTreeMap;

pub const DEMO_FILE: &str = "demo.json";

/// Fixed environment served until the first capture lands.
pub fn demo_environment() -> EnvironmentDocument {
    let mut building = ScanObject::new(3200.0, 400.0, "Building", 0.82);
    building.id = Some(RecordId::Number(1));
    building.distance = Some(10.0);
    building.hs_materials = Some(BTreeMap::from([
        ("plastic".to_string(), 70.0),
        ("stone".to_string(), 10.0),
        ("wood".to_string(), 20.0),
    ]));
    building.hs_classification_ref = Some("/img1_obj1_class.jpg".into());
    building.hs_ndvi_ref = Some("/img1_obj1_ndvi.jpg".into());

    let mut car = ScanObject::new(1200.0, 520.0, "Car", 0.64);
    car.id = Some(RecordId::Number(2));
    car.distance = Some(24.5);

    let tree = ScanObject::new(5100.0, 300.0, "Tree", 0.91);

    EnvironmentDocument {
        location: "Glasgow".into(),
        pins: vec![
            Pin {
                id: RecordId::Number(1),
                geo_coords: [55.8721, -4.2882],
                timestamp: Some("2024-03-14T10:02:11".into()),
                overlays: BTreeMap::from([
                    (OverlayKind::Rgb, "/img1.jpg".to_string()),
                    (OverlayKind::Ndvi, "/img1_ndvi.jpg".to_string()),
                    (OverlayKind::Classification, "/img1_hsi.jpg".to_string()),
                ]),
                objects: vec![building, car],
            },
            Pin {
                id: RecordId::Number(2),
                geo_coords: [55.8733, -4.2917],
                timestamp: Some("2024-03-14T10:05:47".into()),
                overlays: BTreeMap::from([(OverlayKind::Rgb, "/img2.jpg".to_string())]),
                objects: vec![tree],
            },
        ],
    }
}
