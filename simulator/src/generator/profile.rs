use chrono::Local;
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use scancore::math::PanoramaGeometry;
use scancore::model::{OverlayKind, Pin, RecordId, ScanObject};
use std::collections::BTreeMap;

const LABELS: [&str; 6] = ["Building", "Car", "Tree", "Fence", "Person", "Gate"];
const MATERIALS: [&str; 5] = ["wood", "stone", "metal", "plastic", "vegetation"];

/// Produces synthetic captures: a panorama with a few detected objects, a
/// short walk away from the previous capture.
pub struct PinGenerator {
    rng: StdRng,
    objects_per_capture: usize,
    geometry: PanoramaGeometry,
}

impl PinGenerator {
    pub fn new(seed: u64, objects_per_capture: usize) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            objects_per_capture,
            geometry: PanoramaGeometry::default(),
        }
    }

    pub fn next_pin(&mut self, id: i64, near: [f64; 2]) -> Pin {
        let geo_coords = [
            near[0] + self.rng.gen_range(-0.0008..0.0008),
            near[1] + self.rng.gen_range(-0.0012..0.0012),
        ];

        let mut overlays = BTreeMap::from([(OverlayKind::Rgb, format!("/img{id}.jpg"))]);
        for (kind, suffix) in [
            (OverlayKind::Ndvi, "ndvi"),
            (OverlayKind::Ndmi, "ndmi"),
            (OverlayKind::Msavi, "msavi"),
            (OverlayKind::Classification, "hsi"),
        ] {
            if self.rng.gen_bool(0.5) {
                overlays.insert(kind, format!("/img{id}_{suffix}.jpg"));
            }
        }

        let objects = (0..self.objects_per_capture)
            .map(|index| self.next_object(id, index))
            .collect();

        Pin {
            id: RecordId::Number(id),
            geo_coords,
            timestamp: Some(Local::now().format("%Y-%m-%dT%H:%M:%S").to_string()),
            overlays,
            objects,
        }
    }

    fn next_object(&mut self, pin_id: i64, index: usize) -> ScanObject {
        let label = LABELS.choose(&mut self.rng).copied().unwrap_or("Unknown");
        let mut object = ScanObject::new(
            self.rng.gen_range(0.0..self.geometry.image_width).round(),
            self.rng.gen_range(0.0..self.geometry.image_height).round(),
            label,
            (self.rng.gen_range(0.4..0.99_f64) * 100.0).round() / 100.0,
        );
        object.id = Some(RecordId::Number(index as i64 + 1));
        object.distance = Some((self.rng.gen_range(2.0..60.0_f64) * 10.0).round() / 10.0);

        if self.rng.gen_bool(0.4) {
            let stem = format!("/img{pin_id}_obj{}", index + 1);
            object.hs_classification_ref = Some(format!("{stem}_class.jpg"));
            object.hs_ndvi_ref = Some(format!("{stem}_ndvi.jpg"));
            object.hs_rgb_ref = Some(format!("{stem}_rgb.jpg"));
            object.hs_materials = Some(self.material_mix());
        }
        object
    }

    fn material_mix(&mut self) -> BTreeMap<String, f64> {
        let mut materials: Vec<&str> = MATERIALS.to_vec();
        materials.shuffle(&mut self.rng);
        let first = self.rng.gen_range(40.0..80.0_f64).round();
        let second = (100.0 - first) * self.rng.gen_range(0.3..0.7_f64);
        let third = 100.0 - first - second;
        materials
            .into_iter()
            .zip([first, second, third])
            .map(|(name, share)| (name.to_string(), share))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generator_is_deterministic_for_a_seed() {
        let mut first = PinGenerator::new(7, 3);
        let mut second = PinGenerator::new(7, 3);

        let a = first.next_pin(3, [55.87, -4.29]);
        let b = second.next_pin(3, [55.87, -4.29]);

        assert_eq!(a.geo_coords, b.geo_coords);
        assert_eq!(a.overlays, b.overlays);
        assert_eq!(a.objects, b.objects);
    }

    #[test]
    fn generated_pin_has_base_image_and_objects_inside_panorama() {
        let mut generator = PinGenerator::new(13, 4);
        let pin = generator.next_pin(5, [55.87, -4.29]);

        assert_eq!(pin.overlay(OverlayKind::Rgb), Some("/img5.jpg"));
        assert_eq!(pin.objects.len(), 4);
        for object in &pin.objects {
            assert!((0.0..=6399.0).contains(&object.x));
            assert!((0.0..=815.0).contains(&object.y));
            if let Some(materials) = &object.hs_materials {
                let total: f64 = materials.values().sum();
                assert!((total - 100.0).abs() < 1e-6);
            }
        }
    }
}
