use crate::model::{
    ActiveEnvironmentHint, EnvironmentRef, EnvironmentSnapshot, OverlayKind, PlatformStatus,
    StatusLogEntry,
};
use crate::prelude::{SyncError, SyncResult};
use crate::reconcile::view_state::{Focus, PinFocus, Popup, ViewState};
use chrono::{DateTime, Local};
use log::{debug, info};

/// What an accepted environment snapshot did to the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// A different environment than the one previously merged.
    Switched,
    /// A newer copy of the environment already on screen.
    Refreshed,
}

/// Merges one environment snapshot into the view.
///
/// Snapshots whose id is not the current target are rejected with
/// `StaleResponse` and leave the state untouched. Accepted snapshots replace
/// the pin tree wholesale; selection survives by id. The watch-list is never
/// read or written here.
pub fn merge_environment(
    state: &mut ViewState,
    incoming: EnvironmentSnapshot,
) -> SyncResult<MergeOutcome> {
    let target = state.selection.target_environment();
    if target != Some(incoming.id.as_str()) {
        return Err(SyncError::StaleResponse {
            expected: target.map(str::to_string),
            received: incoming.id,
        });
    }

    let switched = state
        .environment
        .as_ref()
        .map_or(true, |current| current.id != incoming.id);

    if switched {
        info!(
            "environment {} loaded ({} pins)",
            incoming.id,
            incoming.pins.len()
        );
        if let Some(pin) = state.selection.pin_focus_mut() {
            *pin = None;
        }
        state.selection.popup = Popup::Closed;
    }

    state.environment = Some(incoming);

    if !switched {
        reconcile_pin_focus(state);
    }
    reconcile_popup(state);
    apply_default_pin(state);

    Ok(if switched {
        MergeOutcome::Switched
    } else {
        MergeOutcome::Refreshed
    })
}

/// Connectivity flags always update; the log only grows when the message
/// text changes. Returns whether a log entry was written.
pub fn merge_status(
    state: &mut ViewState,
    status: PlatformStatus,
    observed_at: DateTime<Local>,
) -> bool {
    state.status.apply_flags(&status);
    let changed = state.status.record_message(StatusLogEntry {
        message: status.message,
        observed_at,
    });
    if changed {
        info!(
            "platform status: {} ({})",
            state.status.message(),
            observed_at.format("%H:%M:%S")
        );
    }
    changed
}

pub fn merge_environment_list(state: &mut ViewState, environments: Vec<EnvironmentRef>) {
    state.environments = environments;
}

/// First-run bootstrap. Establishes the target environment if none is set
/// yet and seeds a pristine watch-list. Returns whether a target was set.
pub fn apply_bootstrap_hint(state: &mut ViewState, hint: ActiveEnvironmentHint) -> bool {
    if state.watch_list.seed(hint.watch_list) {
        debug!(
            "watch-list seeded with {} entries",
            state.watch_list.entries().len()
        );
    }

    if state.selection.focus != Focus::NoEnvironment {
        return false;
    }
    let Some(id) = hint.active_id.filter(|id| !id.trim().is_empty()) else {
        debug!("bootstrap hint carried no active environment");
        return false;
    };

    info!("bootstrapped active environment {id}");
    state.selection.focus = Focus::Environment { id, pin: None };
    true
}

fn reconcile_pin_focus(state: &mut ViewState) {
    let Some(environment) = state.environment.as_ref() else {
        return;
    };
    let Some(slot) = state.selection.pin_focus_mut() else {
        return;
    };
    let Some(focus) = slot.as_mut() else {
        return;
    };

    match environment.pin(&focus.pin_id) {
        None => {
            info!("selected pin {} vanished from snapshot", focus.pin_id);
            *slot = None;
        }
        Some(pin) => {
            if !pin.has_overlay(focus.overlay) {
                debug!(
                    "overlay {} no longer offered for pin {}",
                    focus.overlay, focus.pin_id
                );
                focus.overlay = OverlayKind::Rgb;
            }
        }
    }
}

fn reconcile_popup(state: &mut ViewState) {
    if matches!(state.selection.popup, Popup::Open { .. }) && state.detail_object().is_none() {
        debug!("detail target vanished; closing popup");
        state.selection.popup = Popup::Closed;
    }
}

fn apply_default_pin(state: &mut ViewState) {
    if state.default_pin_applied {
        return;
    }
    let Some(first) = state
        .environment
        .as_ref()
        .and_then(|environment| environment.pins.first())
    else {
        return;
    };
    let pin_id = first.id.clone();
    state.default_pin_applied = true;

    if let Some(slot) = state.selection.pin_focus_mut() {
        if slot.is_none() {
            info!("defaulting selection to pin {pin_id}");
            *slot = Some(PinFocus {
                pin_id,
                overlay: OverlayKind::Rgb,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RecordId, WatchListEntry};
    use crate::reconcile::test_support::{environment, object, pin, targeting};
    use crate::reconcile::view_state::ObjectRef;
    use crate::model::{DetailTab, ObjectKey};
    use pretty_assertions::assert_eq;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    #[test]
    fn first_merge_selects_first_pin_with_rgb_overlay() {
        let mut state = targeting("scan1.json");
        let outcome =
            merge_environment(&mut state, environment("scan1.json", vec![pin(1, "/img1.jpg")]))
                .unwrap();

        assert_eq!(outcome, MergeOutcome::Switched);
        assert_eq!(state.selection.active_pin_id(), Some(&RecordId::Number(1)));
        assert_eq!(state.selection.active_overlay(), Some(OverlayKind::Rgb));
    }

    #[test]
    fn default_pin_is_a_one_shot_bootstrap() {
        let mut state = targeting("scan1.json");
        merge_environment(&mut state, environment("scan1.json", vec![pin(1, "/a.jpg")])).unwrap();
        merge_environment(&mut state, environment("scan1.json", vec![pin(2, "/b.jpg")])).unwrap();
        assert_eq!(state.selection.active_pin_id(), None);

        merge_environment(&mut state, environment("scan1.json", vec![pin(2, "/b.jpg")])).unwrap();
        assert_eq!(state.selection.active_pin_id(), None);
    }

    #[test]
    fn empty_environment_defers_default_pin() {
        let mut state = targeting("scan1.json");
        merge_environment(&mut state, environment("scan1.json", Vec::new())).unwrap();
        assert_eq!(state.selection.active_pin_id(), None);

        merge_environment(&mut state, environment("scan1.json", vec![pin(4, "/d.jpg")])).unwrap();
        assert_eq!(state.selection.active_pin_id(), Some(&RecordId::Number(4)));
    }

    #[test]
    fn stale_snapshot_is_rejected_without_touching_state() {
        let mut state = targeting("scan1.json");
        merge_environment(&mut state, environment("scan1.json", vec![pin(1, "/a.jpg")])).unwrap();
        let before_env = state.environment.clone();
        let before_selection = state.selection.clone();

        let err = merge_environment(&mut state, environment("old.json", vec![pin(9, "/z.jpg")]))
            .unwrap_err();

        assert!(err.is_stale());
        assert_eq!(state.environment, before_env);
        assert_eq!(state.selection, before_selection);
    }

    #[test]
    fn snapshot_without_target_is_stale() {
        let mut state = ViewState::new();
        let err = merge_environment(&mut state, environment("scan1.json", Vec::new())).unwrap_err();
        assert_eq!(
            err,
            SyncError::StaleResponse {
                expected: None,
                received: "scan1.json".into()
            }
        );
        assert!(state.environment.is_none());
    }

    #[test]
    fn selection_survives_when_pin_id_remains() {
        let mut state = targeting("scan1.json");
        merge_environment(
            &mut state,
            environment("scan1.json", vec![pin(1, "/a.jpg"), pin(2, "/b.jpg")]),
        )
        .unwrap();
        if let Some(slot) = state.selection.pin_focus_mut() {
            *slot = Some(PinFocus {
                pin_id: RecordId::Number(2),
                overlay: OverlayKind::Rgb,
            });
        }

        let outcome = merge_environment(
            &mut state,
            environment("scan1.json", vec![pin(2, "/b2.jpg"), pin(3, "/c.jpg")]),
        )
        .unwrap();

        assert_eq!(outcome, MergeOutcome::Refreshed);
        assert_eq!(state.selection.active_pin_id(), Some(&RecordId::Number(2)));
        assert_eq!(
            state.active_pin().and_then(|pin| pin.overlay(OverlayKind::Rgb)),
            Some("/b2.jpg")
        );
    }

    #[test]
    fn selection_clears_when_pin_vanishes() {
        let mut state = targeting("scan1.json");
        merge_environment(&mut state, environment("scan1.json", vec![pin(1, "/a.jpg")])).unwrap();

        merge_environment(&mut state, environment("scan1.json", vec![pin(5, "/e.jpg")])).unwrap();

        assert_eq!(state.selection.active_pin_id(), None);
        assert_eq!(state.selection.active_overlay(), None);
    }

    #[test]
    fn vanished_overlay_falls_back_to_rgb() {
        let mut state = targeting("scan1.json");
        let mut with_ndvi = pin(1, "/a.jpg");
        with_ndvi
            .overlays
            .insert(OverlayKind::Ndvi, "/a_ndvi.jpg".into());
        merge_environment(&mut state, environment("scan1.json", vec![with_ndvi])).unwrap();
        if let Some(Some(focus)) = state.selection.pin_focus_mut() {
            focus.overlay = OverlayKind::Ndvi;
        }

        merge_environment(&mut state, environment("scan1.json", vec![pin(1, "/a.jpg")])).unwrap();

        assert_eq!(state.selection.active_overlay(), Some(OverlayKind::Rgb));
    }

    #[test]
    fn switching_environment_clears_pin_and_popup() {
        let mut state = targeting("scan1.json");
        let mut first = pin(1, "/a.jpg");
        first.objects.push(object("car"));
        merge_environment(&mut state, environment("scan1.json", vec![first])).unwrap();
        state.selection.popup = Popup::Open {
            target: ObjectRef {
                pin_id: RecordId::Number(1),
                object: ObjectKey::Position(0),
            },
            tab: DetailTab::Overview,
        };
        state.watch_list.append(WatchListEntry::new("fence", false));

        state.selection.focus = Focus::Environment {
            id: "scan2.json".into(),
            pin: Some(PinFocus {
                pin_id: RecordId::Number(1),
                overlay: OverlayKind::Rgb,
            }),
        };
        let outcome =
            merge_environment(&mut state, environment("scan2.json", vec![pin(1, "/x.jpg")]))
                .unwrap();

        assert_eq!(outcome, MergeOutcome::Switched);
        assert_eq!(state.selection.active_pin_id(), None);
        assert_eq!(state.selection.popup, Popup::Closed);
        assert_eq!(
            state.watch_list.entries(),
            &[WatchListEntry::new("fence", false)]
        );
    }

    #[test]
    fn popup_closes_when_object_disappears() {
        let mut state = targeting("scan1.json");
        let mut first = pin(1, "/a.jpg");
        first.objects.push(object("car"));
        merge_environment(&mut state, environment("scan1.json", vec![first])).unwrap();
        state.selection.popup = Popup::Open {
            target: ObjectRef {
                pin_id: RecordId::Number(1),
                object: ObjectKey::Position(0),
            },
            tab: DetailTab::Overview,
        };

        merge_environment(&mut state, environment("scan1.json", vec![pin(1, "/a.jpg")])).unwrap();

        assert_eq!(state.selection.popup, Popup::Closed);
        assert_eq!(state.selection.active_pin_id(), Some(&RecordId::Number(1)));
    }

    #[test]
    fn status_log_is_edge_triggered() {
        let mut state = ViewState::new();
        let now = Local::now();
        let status = |message: &str, pi: bool| PlatformStatus {
            message: message.into(),
            pi_online: pi,
            gps_online: false,
            wifi_online: true,
        };

        assert!(!merge_status(&mut state, status("", true), now));
        assert!(merge_status(&mut state, status("Idle", false), now));
        assert!(!merge_status(&mut state, status("Idle", true), now));
        assert!(merge_status(&mut state, status("Scanning", true), now));

        assert_eq!(state.status.log().len(), 2);
        assert_eq!(state.status.message(), "Scanning");
        assert!(state.status.pi_online);
        assert!(state.status.wifi_online);
        assert_eq!(state.status.latest().map(|e| e.observed_at), Some(now));
    }

    #[test]
    fn status_log_is_bounded() {
        let mut state = ViewState::new();
        for idx in 0..(crate::reconcile::STATUS_LOG_CAPACITY + 5) {
            merge_status(
                &mut state,
                PlatformStatus {
                    message: format!("message {idx}"),
                    pi_online: true,
                    gps_online: true,
                    wifi_online: true,
                },
                Local::now(),
            );
        }
        assert_eq!(state.status.log().len(), crate::reconcile::STATUS_LOG_CAPACITY);
        assert_eq!(state.status.log()[0].message, "message 5");
    }

    #[test]
    fn blank_hint_sets_no_target() {
        let mut state = ViewState::new();
        let hint = ActiveEnvironmentHint {
            active_id: Some("  ".into()),
            watch_list: Vec::new(),
        };
        assert!(!apply_bootstrap_hint(&mut state, hint));
        assert_eq!(state.selection.focus, Focus::NoEnvironment);
        assert!(state.watch_list.is_ready());
    }

    #[test]
    fn bootstrap_hint_sets_target_once() {
        let mut state = ViewState::new();
        let hint = ActiveEnvironmentHint {
            active_id: Some("scan1.json".into()),
            watch_list: vec![WatchListEntry::new("person", true)],
        };
        assert!(apply_bootstrap_hint(&mut state, hint.clone()));
        assert_eq!(state.selection.target_environment(), Some("scan1.json"));
        assert_eq!(state.watch_list.entries(), &[WatchListEntry::new("person", true)]);

        let later = ActiveEnvironmentHint {
            active_id: Some("other.json".into()),
            watch_list: Vec::new(),
        };
        assert!(!apply_bootstrap_hint(&mut state, later));
        assert_eq!(state.selection.target_environment(), Some("scan1.json"));
        assert_eq!(state.watch_list.entries().len(), 1);
    }

    #[test]
    fn merges_never_alter_watch_list_edits() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..50 {
            let mut state = targeting("scan1.json");
            let mut replay: Vec<WatchListEntry> = Vec::new();

            for step in 0..60 {
                match rng.gen_range(0..4) {
                    0 => {
                        let entry = WatchListEntry::new(format!("label-{step}"), rng.gen());
                        replay.push(entry.clone());
                        state.watch_list.append(entry);
                    }
                    1 => {
                        let index = rng.gen_range(0..4);
                        if index < replay.len() {
                            replay.remove(index);
                        }
                        state.watch_list.remove_at(index);
                    }
                    2 => {
                        let pins = (0..rng.gen_range(0..4))
                            .map(|id| pin(id, "/p.jpg"))
                            .collect();
                        let id = if rng.gen_bool(0.8) { "scan1.json" } else { "old.json" };
                        let _ = merge_environment(&mut state, environment(id, pins));
                    }
                    _ => {
                        merge_status(
                            &mut state,
                            PlatformStatus {
                                message: format!("status {}", rng.gen_range(0..3)),
                                pi_online: rng.gen(),
                                gps_online: rng.gen(),
                                wifi_online: rng.gen(),
                            },
                            Local::now(),
                        );
                    }
                }
            }

            assert_eq!(state.watch_list.entries(), replay.as_slice());
        }
    }
}
