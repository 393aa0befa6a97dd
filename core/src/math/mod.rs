pub mod projection;

pub use projection::{project, HotspotAngle, PanoramaGeometry};
