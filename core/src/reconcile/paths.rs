//! Image path derivation.
//!
//! One canonical rule: `images_root + environment id without extension + "/"`
//! is the base directory, and a reference is appended to it with exactly one
//! separator in between.

use crate::model::{OverlayKind, Pin};

pub const DEFAULT_IMAGES_ROOT: &str = "./images/";

pub fn base_image_path(images_root: &str, environment_id: &str) -> String {
    let root = if images_root.is_empty() {
        DEFAULT_IMAGES_ROOT
    } else {
        images_root
    };
    let mut base = root.trim_end_matches('/').to_string();
    base.push('/');
    base.push_str(strip_extension(environment_id));
    base.push('/');
    base
}

pub fn resolve_reference(images_root: &str, environment_id: &str, reference: &str) -> String {
    let mut path = base_image_path(images_root, environment_id);
    path.push_str(trim_reference(reference));
    path
}

/// Path of the image shown for `kind` on `pin`, read fresh from the pin.
pub fn resolve_display_reference(
    images_root: &str,
    environment_id: &str,
    pin: &Pin,
    kind: OverlayKind,
) -> Option<String> {
    pin.overlay(kind)
        .map(|reference| resolve_reference(images_root, environment_id, reference))
}

fn strip_extension(environment_id: &str) -> &str {
    let (dir_len, name) = match environment_id.rfind('/') {
        Some(idx) => (idx + 1, &environment_id[idx + 1..]),
        None => (0, environment_id),
    };
    match name.rfind('.') {
        Some(dot) if dot > 0 => &environment_id[..dir_len + dot],
        _ => environment_id,
    }
}

fn trim_reference(reference: &str) -> &str {
    let mut trimmed = reference.trim();
    loop {
        if let Some(rest) = trimmed.strip_prefix("./") {
            trimmed = rest;
        } else if let Some(rest) = trimmed.strip_prefix('/') {
            trimmed = rest;
        } else {
            return trimmed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RecordId;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    fn pin_with(kind: OverlayKind, reference: &str) -> Pin {
        Pin {
            id: RecordId::Number(1),
            geo_coords: [55.85, -4.23],
            timestamp: None,
            overlays: BTreeMap::from([(kind, reference.to_string())]),
            objects: Vec::new(),
        }
    }

    #[test]
    fn base_path_strips_environment_extension() {
        assert_eq!(base_image_path("./images/", "scan1.json"), "./images/scan1/");
        assert_eq!(base_image_path("./images", "scan1.json"), "./images/scan1/");
        assert_eq!(base_image_path("", "plain"), "./images/plain/");
        assert_eq!(base_image_path("/srv/img/", "site/a.b.json"), "/srv/img/site/a.b/");
        assert_eq!(base_image_path("./images/", ".hidden"), "./images/.hidden/");
    }

    #[test]
    fn references_join_with_single_separator() {
        for reference in ["/img1.jpg", "img1.jpg", "./img1.jpg", "//img1.jpg"] {
            assert_eq!(
                resolve_reference("./images/", "scan1.json", reference),
                "./images/scan1/img1.jpg"
            );
        }
        assert_eq!(
            resolve_reference("./images/", "scan1.json", "/uid/hs_uid_1.jpg"),
            "./images/scan1/uid/hs_uid_1.jpg"
        );
    }

    #[test]
    fn display_reference_is_base_plus_field() {
        let pin = pin_with(OverlayKind::Rgb, "/img1.jpg");
        let first = resolve_display_reference("./images/", "scan1.json", &pin, OverlayKind::Rgb);
        let second = resolve_display_reference("./images/", "scan1.json", &pin, OverlayKind::Rgb);
        assert_eq!(first.as_deref(), Some("./images/scan1/img1.jpg"));
        assert_eq!(first, second);
        assert_eq!(
            resolve_display_reference("./images/", "scan1.json", &pin, OverlayKind::Ndvi),
            None
        );
    }
}
