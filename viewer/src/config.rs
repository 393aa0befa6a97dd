use anyhow::{ensure, Context};
use scancore::math::PanoramaGeometry;
use scancore::reconcile::selection::DisplaySettings;
use scancore::reconcile::paths::DEFAULT_IMAGES_ROOT;
use scancore::sync::Cadence;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub base_url: String,
    pub images_root: String,
    pub cadence: Cadence,
    pub panorama: PanoramaGeometry,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".into(),
            images_root: DEFAULT_IMAGES_ROOT.into(),
            cadence: Cadence::default(),
            panorama: PanoramaGeometry::default(),
        }
    }
}

impl ViewerConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading viewer config {}", path_ref.display()))?;
        let config: ViewerConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing viewer config {}", path_ref.display()))?;
        config
            .validate()
            .with_context(|| format!("validating viewer config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(!self.base_url.trim().is_empty(), "base_url must not be empty");
        ensure!(self.cadence.is_valid(), "every cadence must be above 0 ms");
        ensure!(
            self.panorama.is_valid(),
            "panorama extents and fields of view must be positive"
        );
        Ok(())
    }

    pub fn display_settings(&self) -> DisplaySettings {
        DisplaySettings {
            images_root: self.images_root.clone(),
            geometry: self.panorama,
        }
    }
}
