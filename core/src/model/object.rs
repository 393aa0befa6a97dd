use crate::model::environment::RecordId;
use crate::model::lenient;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Detected object (hotspot) inside a pin's panorama. Read-only once received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanObject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(deserialize_with = "lenient::number")]
    pub x: f64,
    #[serde(deserialize_with = "lenient::number")]
    pub y: f64,
    #[serde(rename = "RGB_classification", default)]
    pub rgb_classification: String,
    #[serde(rename = "RGB_confidence", default, deserialize_with = "lenient::number")]
    pub rgb_confidence: f64,
    #[serde(
        default,
        deserialize_with = "lenient::optional_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub distance: Option<f64>,
    /// Hyperspectral material mix, label to percentage. Values need not sum to 100.
    #[serde(
        rename = "HS_materials",
        default,
        deserialize_with = "lenient::optional_number_map",
        skip_serializing_if = "Option::is_none"
    )]
    pub hs_materials: Option<BTreeMap<String, f64>>,
    #[serde(rename = "HS_classification_ref", default, skip_serializing_if = "Option::is_none")]
    pub hs_classification_ref: Option<String>,
    #[serde(rename = "HS_ndvi_ref", default, skip_serializing_if = "Option::is_none")]
    pub hs_ndvi_ref: Option<String>,
    #[serde(rename = "HS_msavi_ref", default, skip_serializing_if = "Option::is_none")]
    pub hs_msavi_ref: Option<String>,
    #[serde(rename = "HS_custom2_ref", default, skip_serializing_if = "Option::is_none")]
    pub hs_custom2_ref: Option<String>,
    #[serde(rename = "HS_artificial_ref", default, skip_serializing_if = "Option::is_none")]
    pub hs_artificial_ref: Option<String>,
    #[serde(rename = "HS_rgb_ref", default, skip_serializing_if = "Option::is_none")]
    pub hs_rgb_ref: Option<String>,
}

impl ScanObject {
    pub fn new(x: f64, y: f64, label: impl Into<String>, confidence: f64) -> Self {
        Self {
            id: None,
            x,
            y,
            rgb_classification: label.into(),
            rgb_confidence: confidence,
            distance: None,
            hs_materials: None,
            hs_classification_ref: None,
            hs_ndvi_ref: None,
            hs_msavi_ref: None,
            hs_custom2_ref: None,
            hs_artificial_ref: None,
            hs_rgb_ref: None,
        }
    }

    pub fn has_hyperspectral(&self) -> bool {
        self.hs_classification_ref.is_some()
    }

    /// Image reference backing a detail tab; `None` for the overview and for
    /// modalities this object was not scanned with.
    pub fn detail_reference(&self, tab: DetailTab) -> Option<&str> {
        let reference = match tab {
            DetailTab::Overview => return None,
            DetailTab::Classification => &self.hs_classification_ref,
            DetailTab::Ndvi => &self.hs_ndvi_ref,
            DetailTab::Msavi => &self.hs_msavi_ref,
            DetailTab::Custom => &self.hs_custom2_ref,
            DetailTab::Artificial => &self.hs_artificial_ref,
            DetailTab::HsiRgb => &self.hs_rgb_ref,
        };
        reference.as_deref().filter(|r| !r.trim().is_empty())
    }

    pub fn offers_tab(&self, tab: DetailTab) -> bool {
        tab == DetailTab::Overview || self.detail_reference(tab).is_some()
    }

    pub fn available_tabs(&self) -> Vec<DetailTab> {
        DetailTab::ALL
            .into_iter()
            .filter(|tab| self.offers_tab(*tab))
            .collect()
    }

    /// Material percentages rounded for display, in label order.
    pub fn material_summary(&self) -> Vec<(String, i64)> {
        self.hs_materials
            .iter()
            .flatten()
            .map(|(label, value)| (label.clone(), value.round() as i64))
            .collect()
    }
}

/// How an object is addressed from selection state: by its remote id when
/// it has one, otherwise by its position in the pin's object list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ObjectKey {
    Id(RecordId),
    Position(usize),
}

impl ObjectKey {
    pub fn for_object(index: usize, object: &ScanObject) -> Self {
        match &object.id {
            Some(id) => ObjectKey::Id(id.clone()),
            None => ObjectKey::Position(index),
        }
    }

    pub fn find<'a>(&self, objects: &'a [ScanObject]) -> Option<&'a ScanObject> {
        match self {
            ObjectKey::Id(id) => objects.iter().find(|object| object.id.as_ref() == Some(id)),
            ObjectKey::Position(index) => objects.get(*index).filter(|object| object.id.is_none()),
        }
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectKey::Id(id) => write!(f, "{id}"),
            ObjectKey::Position(index) => write!(f, "#{index}"),
        }
    }
}

/// Tab inside the object detail popup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DetailTab {
    Overview,
    Classification,
    Ndvi,
    Msavi,
    Custom,
    Artificial,
    HsiRgb,
}

impl DetailTab {
    pub const ALL: [DetailTab; 7] = [
        DetailTab::Overview,
        DetailTab::Classification,
        DetailTab::Ndvi,
        DetailTab::Msavi,
        DetailTab::Custom,
        DetailTab::Artificial,
        DetailTab::HsiRgb,
    ];

    pub fn label(self) -> &'static str {
        match self {
            DetailTab::Overview => "overview",
            DetailTab::Classification => "classification",
            DetailTab::Ndvi => "ndvi",
            DetailTab::Msavi => "msavi",
            DetailTab::Custom => "custom",
            DetailTab::Artificial => "artificial",
            DetailTab::HsiRgb => "hsi_rgb",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|tab| tab.label() == value)
    }
}

impl fmt::Display for DetailTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn object_decodes_string_numbers_from_capture_pipeline() {
        let object: ScanObject = serde_json::from_str(
            r#"{
                "x": 3200,
                "y": "400",
                "RGB_classification": "Building",
                "RGB_confidence": "0.82",
                "distance": 10,
                "HS_materials": {"wood": "20", "plastic": 70.4, "stone": 10}
            }"#,
        )
        .unwrap();

        assert_eq!(object.y, 400.0);
        assert_eq!(object.rgb_confidence, 0.82);
        assert_eq!(object.distance, Some(10.0));
        assert_eq!(
            object.material_summary(),
            vec![
                ("plastic".to_string(), 70),
                ("stone".to_string(), 10),
                ("wood".to_string(), 20)
            ]
        );
    }

    #[test]
    fn detail_tabs_follow_present_references() {
        let mut object = ScanObject::new(0.0, 0.0, "tree", 0.9);
        assert_eq!(object.available_tabs(), vec![DetailTab::Overview]);

        object.hs_classification_ref = Some("/hs_1_1.jpg".into());
        object.hs_ndvi_ref = Some("/hs_1_1_ndvi.jpg".into());
        assert!(object.has_hyperspectral());
        assert_eq!(
            object.available_tabs(),
            vec![DetailTab::Overview, DetailTab::Classification, DetailTab::Ndvi]
        );
        assert_eq!(object.detail_reference(DetailTab::Overview), None);
    }

    #[test]
    fn object_key_prefers_ids_over_positions() {
        let mut tagged = ScanObject::new(1.0, 1.0, "car", 0.5);
        tagged.id = Some(RecordId::Number(9));
        let untagged = ScanObject::new(2.0, 2.0, "fence", 0.4);
        let objects = vec![untagged.clone(), tagged.clone()];

        assert_eq!(ObjectKey::for_object(1, &tagged), ObjectKey::Id(RecordId::Number(9)));
        assert_eq!(ObjectKey::for_object(0, &untagged), ObjectKey::Position(0));
        assert_eq!(ObjectKey::Id(RecordId::Number(9)).find(&objects), Some(&tagged));
        assert_eq!(ObjectKey::Position(1).find(&objects), None);
    }
}
