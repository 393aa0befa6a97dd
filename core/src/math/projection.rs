use serde::{Deserialize, Serialize};

/// Pixel extent and angular coverage of the stitched panorama.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanoramaGeometry {
    pub image_width: f64,
    pub image_height: f64,
    pub horizontal_fov_deg: f64,
    pub vertical_fov_deg: f64,
}

impl Default for PanoramaGeometry {
    fn default() -> Self {
        Self {
            image_width: 6399.0,
            image_height: 815.0,
            horizontal_fov_deg: 358.0,
            vertical_fov_deg: 60.0,
        }
    }
}

impl PanoramaGeometry {
    pub fn is_valid(&self) -> bool {
        [
            self.image_width,
            self.image_height,
            self.horizontal_fov_deg,
            self.vertical_fov_deg,
        ]
        .iter()
        .all(|value| value.is_finite() && *value > 0.0)
    }
}

/// Viewer angles of a hotspot, in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HotspotAngle {
    pub yaw: f64,
    pub pitch: f64,
}

/// Maps a pixel position in the panorama to viewer yaw/pitch.
///
/// Linear against the image extent: the right edge lands on half the
/// horizontal field of view, the bottom edge on minus half the vertical one.
pub fn project(pixel_x: f64, pixel_y: f64, geometry: &PanoramaGeometry) -> HotspotAngle {
    if !geometry.is_valid() {
        return HotspotAngle {
            yaw: 0.0,
            pitch: 0.0,
        };
    }
    let yaw = (pixel_x / geometry.image_width) * (geometry.horizontal_fov_deg / 2.0);
    let pitch = (pixel_y / geometry.image_height) * -1.0 * (geometry.vertical_fov_deg / 2.0);
    HotspotAngle { yaw, pitch }
}
