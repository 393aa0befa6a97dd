use crate::math::projection::{project, PanoramaGeometry};
use crate::model::{DetailTab, EnvironmentSnapshot, ObjectKey, OverlayKind, RecordId};
use crate::reconcile::paths;
use crate::reconcile::view_state::{Focus, ObjectRef, PinFocus, Popup, ViewState};

/// Why a user transition was refused. The state is unchanged in every case.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SelectionError {
    #[error("no environment selected")]
    NoEnvironment,
    #[error("environment id must not be empty")]
    EmptyEnvironmentId,
    #[error("environment {0} has not been loaded yet")]
    EnvironmentNotLoaded(String),
    #[error("pin {0} is not part of the current environment")]
    UnknownPin(RecordId),
    #[error("no pin selected")]
    NoPinSelected,
    #[error("overlay {0} is not available for the selected pin")]
    OverlayUnavailable(OverlayKind),
    #[error("object {0} is not part of the selected pin")]
    UnknownObject(ObjectKey),
    #[error("detail popup is closed")]
    DetailClosed,
    #[error("detail tab {0} is not available for this object")]
    DetailUnavailable(DetailTab),
}

pub type SelectionResult = Result<(), SelectionError>;

/// Retargets the view. Pin, overlay and popup are dropped; the merger
/// confirms the switch once a snapshot for `id` arrives.
pub fn select_environment(state: &mut ViewState, id: &str) -> SelectionResult {
    let id = id.trim();
    if id.is_empty() {
        return Err(SelectionError::EmptyEnvironmentId);
    }
    if state.selection.target_environment() == Some(id) {
        return Ok(());
    }
    state.selection.focus = Focus::Environment {
        id: id.to_string(),
        pin: None,
    };
    state.selection.popup = Popup::Closed;
    Ok(())
}

pub fn select_pin(state: &mut ViewState, pin_id: &RecordId) -> SelectionResult {
    let environment = loaded_environment(state)?;
    if environment.pin(pin_id).is_none() {
        return Err(SelectionError::UnknownPin(pin_id.clone()));
    }
    if let Some(slot) = state.selection.pin_focus_mut() {
        *slot = Some(PinFocus {
            pin_id: pin_id.clone(),
            overlay: OverlayKind::Rgb,
        });
    }
    state.selection.popup = Popup::Closed;
    Ok(())
}

pub fn select_overlay(state: &mut ViewState, kind: OverlayKind) -> SelectionResult {
    loaded_environment(state)?;
    let pin = state.active_pin().ok_or(SelectionError::NoPinSelected)?;
    if !pin.has_overlay(kind) {
        return Err(SelectionError::OverlayUnavailable(kind));
    }
    if let Some(Some(focus)) = state.selection.pin_focus_mut() {
        focus.overlay = kind;
    }
    Ok(())
}

/// Opens the detail popup on `object`; always starts on the overview tab.
pub fn open_detail(state: &mut ViewState, object: ObjectKey) -> SelectionResult {
    loaded_environment(state)?;
    let pin = state.active_pin().ok_or(SelectionError::NoPinSelected)?;
    if object.find(&pin.objects).is_none() {
        return Err(SelectionError::UnknownObject(object));
    }
    let pin_id = pin.id.clone();
    state.selection.popup = Popup::Open {
        target: ObjectRef { pin_id, object },
        tab: DetailTab::Overview,
    };
    Ok(())
}

pub fn close_detail(state: &mut ViewState) {
    state.selection.popup = Popup::Closed;
}

pub fn select_detail_tab(state: &mut ViewState, tab: DetailTab) -> SelectionResult {
    let object = state.detail_object().ok_or(SelectionError::DetailClosed)?;
    if !object.offers_tab(tab) {
        return Err(SelectionError::DetailUnavailable(tab));
    }
    if let Popup::Open { tab: current, .. } = &mut state.selection.popup {
        *current = tab;
    }
    Ok(())
}

/// Flips hotspot visibility; selection is untouched.
pub fn toggle_objects(state: &mut ViewState) -> bool {
    state.show_objects = !state.show_objects;
    state.show_objects
}

fn loaded_environment(state: &ViewState) -> Result<&EnvironmentSnapshot, SelectionError> {
    let target = state
        .selection
        .target_environment()
        .ok_or(SelectionError::NoEnvironment)?;
    state
        .active_environment()
        .ok_or_else(|| SelectionError::EnvironmentNotLoaded(target.to_string()))
}

/// Where derived image paths come from.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplaySettings {
    pub images_root: String,
    pub geometry: PanoramaGeometry,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            images_root: paths::DEFAULT_IMAGES_ROOT.to_string(),
            geometry: PanoramaGeometry::default(),
        }
    }
}

/// Image handed to the panorama surface.
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayImage {
    /// Nothing selected yet.
    Empty,
    Image(String),
    /// A pin is selected but carries no reference for the overlay.
    Unavailable(OverlayKind),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Hotspot {
    pub key: ObjectKey,
    pub label: String,
    pub yaw: f64,
    pub pitch: f64,
    pub has_hyperspectral: bool,
}

/// Map marker for one pin of the loaded environment.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub id: RecordId,
    pub geo_coords: [f64; 2],
    /// The pin carries a hyperspectral classification overlay.
    pub has_hyperspectral: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetailView {
    pub key: ObjectKey,
    pub label: String,
    pub confidence: f64,
    pub distance: Option<f64>,
    pub materials: Vec<(String, i64)>,
    pub tab: DetailTab,
    pub tabs: Vec<DetailTab>,
    pub image: Option<String>,
}

/// Everything the rendering collaborators need for one paint.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayFrame {
    pub environment_id: Option<String>,
    pub location: Option<String>,
    pub pin_id: Option<RecordId>,
    pub pin_coords: Option<[f64; 2]>,
    pub pin_timestamp: Option<String>,
    pub overlay: Option<OverlayKind>,
    pub overlays: Vec<OverlayKind>,
    pub markers: Vec<Marker>,
    pub image: DisplayImage,
    pub hotspots: Vec<Hotspot>,
    pub detail: Option<DetailView>,
}

/// Resolves the panorama image from the current pin object; nothing is cached.
pub fn resolve_display(state: &ViewState, settings: &DisplaySettings) -> DisplayImage {
    let (Some(environment), Some(focus)) =
        (state.active_environment(), state.selection.pin_focus())
    else {
        return DisplayImage::Empty;
    };
    let Some(pin) = environment.pin(&focus.pin_id) else {
        return DisplayImage::Empty;
    };
    match paths::resolve_display_reference(
        &settings.images_root,
        &environment.id,
        pin,
        focus.overlay,
    ) {
        Some(path) => DisplayImage::Image(path),
        None => DisplayImage::Unavailable(focus.overlay),
    }
}

pub fn hotspots(state: &ViewState, geometry: &PanoramaGeometry) -> Vec<Hotspot> {
    if !state.show_objects {
        return Vec::new();
    }
    let Some(pin) = state.active_pin() else {
        return Vec::new();
    };
    pin.objects
        .iter()
        .enumerate()
        .map(|(index, object)| {
            let angle = project(object.x, object.y, geometry);
            Hotspot {
                key: ObjectKey::for_object(index, object),
                label: object.rgb_classification.clone(),
                yaw: angle.yaw,
                pitch: angle.pitch,
                has_hyperspectral: object.has_hyperspectral(),
            }
        })
        .collect()
}

pub fn markers(state: &ViewState) -> Vec<Marker> {
    state
        .active_environment()
        .map(|environment| {
            environment
                .pins
                .iter()
                .map(|pin| Marker {
                    id: pin.id.clone(),
                    geo_coords: pin.geo_coords,
                    has_hyperspectral: pin.has_overlay(OverlayKind::Classification),
                })
                .collect()
        })
        .unwrap_or_default()
}

pub fn detail_view(state: &ViewState, settings: &DisplaySettings) -> Option<DetailView> {
    let Popup::Open { target, tab } = &state.selection.popup else {
        return None;
    };
    let environment = state.active_environment()?;
    let object = state.detail_object()?;
    let image = object
        .detail_reference(*tab)
        .map(|reference| paths::resolve_reference(&settings.images_root, &environment.id, reference));
    Some(DetailView {
        key: target.object.clone(),
        label: object.rgb_classification.clone(),
        confidence: object.rgb_confidence,
        distance: object.distance,
        materials: object.material_summary(),
        tab: *tab,
        tabs: object.available_tabs(),
        image,
    })
}

pub fn frame(state: &ViewState, settings: &DisplaySettings) -> DisplayFrame {
    let environment = state.active_environment();
    let pin = state.active_pin();
    DisplayFrame {
        environment_id: state.selection.target_environment().map(str::to_string),
        location: environment.map(|env| env.location.clone()),
        pin_id: pin.map(|pin| pin.id.clone()),
        pin_coords: pin.map(|pin| pin.geo_coords),
        pin_timestamp: pin.and_then(|pin| pin.timestamp.clone()),
        overlay: pin.and(state.selection.active_overlay()),
        overlays: pin.map(|pin| pin.available_overlays()).unwrap_or_default(),
        markers: markers(state),
        image: resolve_display(state, settings),
        hotspots: hotspots(state, &settings.geometry),
        detail: detail_view(state, settings),
    }
}
