pub mod edit_queue;
pub mod merger;
pub mod paths;
pub mod selection;
pub mod view_state;

#[cfg(test)]
pub(crate) mod test_support;

pub use edit_queue::EditQueue;
pub use merger::{
    apply_bootstrap_hint, merge_environment, merge_environment_list, merge_status, MergeOutcome,
};
pub use selection::{
    DetailView, DisplayFrame, DisplayImage, DisplaySettings, Hotspot, SelectionError,
    SelectionResult,
};
pub use view_state::{
    Focus, ObjectRef, PinFocus, Popup, Selection, StatusBoard, ViewState, ViewStore,
    STATUS_LOG_CAPACITY,
};
