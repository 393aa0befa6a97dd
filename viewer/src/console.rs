//! Line-oriented command surface standing in for the map and panorama UI.

use anyhow::{anyhow, bail};
use scancore::model::{DetailTab, EnvironmentRef, ObjectKey, OverlayKind, RecordId, WatchListEntry};
use scancore::reconcile::selection::{DisplayFrame, DisplayImage};
use scancore::reconcile::view_state::{StatusBoard, ViewState};
use std::fmt::Write;

pub const HELP: &str = "\
commands:
  envs                    list environments
  env <file>              select environment
  new <label>             create environment
  pin <id>                select pin (pin id, or #index for pins without one)
  overlay <kind>          rgb, classification, ndvi, ndmi, msavi, custom, artificial, hsi_rgb
  open <object>           open detail popup (object id, or #index)
  tab <tab>               overview, classification, ndvi, msavi, custom, artificial, hsi_rgb
  close                   close detail popup
  objects                 toggle hotspots
  watch <label> [hsi]     add to watch-list
  unwatch <index>         remove from watch-list
  fullscan on|off         manual hyperspectral scan
  power                   toggle capture power
  capture                 single capture
  status                  show status log
  metrics                 show lane counters
  quit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Environments,
    SelectEnvironment(String),
    CreateEnvironment(String),
    SelectPin(RecordId),
    SelectOverlay(OverlayKind),
    OpenDetail(ObjectKey),
    SelectTab(DetailTab),
    CloseDetail,
    ToggleObjects,
    Watch { label: String, full_scan: bool },
    Unwatch(usize),
    FullScan(bool),
    TogglePower,
    Capture,
    Status,
    Metrics,
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> anyhow::Result<Option<Command>> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (verb, rest) = line
            .split_once(char::is_whitespace)
            .map(|(verb, rest)| (verb, rest.trim()))
            .unwrap_or((line, ""));

        let command = match verb {
            "envs" => Command::Environments,
            "env" => Command::SelectEnvironment(required(verb, rest)?.to_string()),
            "new" => Command::CreateEnvironment(rest.to_string()),
            "pin" => Command::SelectPin(parse_pin_id(required(verb, rest)?)?),
            "overlay" => Command::SelectOverlay(
                OverlayKind::parse(rest).ok_or_else(|| anyhow!("unknown overlay {rest:?}"))?,
            ),
            "open" => Command::OpenDetail(parse_object_key(required(verb, rest)?)?),
            "tab" => Command::SelectTab(
                DetailTab::parse(rest).ok_or_else(|| anyhow!("unknown tab {rest:?}"))?,
            ),
            "close" => Command::CloseDetail,
            "objects" => Command::ToggleObjects,
            "watch" => {
                let (label, full_scan) = match rest.rsplit_once(char::is_whitespace) {
                    Some((label, flag)) if flag.eq_ignore_ascii_case("hsi") => (label.trim(), true),
                    _ => (rest, false),
                };
                Command::Watch {
                    label: required(verb, label)?.to_string(),
                    full_scan,
                }
            }
            "unwatch" => Command::Unwatch(
                required(verb, rest)?
                    .parse()
                    .map_err(|_| anyhow!("unwatch expects an index, got {rest:?}"))?,
            ),
            "fullscan" => Command::FullScan(match rest {
                "on" => true,
                "off" => false,
                other => bail!("fullscan expects on or off, got {other:?}"),
            }),
            "power" => Command::TogglePower,
            "capture" => Command::Capture,
            "status" => Command::Status,
            "metrics" => Command::Metrics,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => bail!("unknown command {other:?}, try help"),
        };
        Ok(Some(command))
    }
}

fn required<'a>(verb: &str, value: &'a str) -> anyhow::Result<&'a str> {
    if value.is_empty() {
        bail!("{verb} needs an argument");
    }
    Ok(value)
}

fn parse_pin_id(value: &str) -> anyhow::Result<RecordId> {
    match value.strip_prefix('#') {
        Some(index) => index
            .parse()
            .map(RecordId::Position)
            .map_err(|_| anyhow!("bad pin index {value:?}")),
        None => Ok(RecordId::from(value)),
    }
}

fn parse_object_key(value: &str) -> anyhow::Result<ObjectKey> {
    match value.strip_prefix('#') {
        Some(index) => index
            .parse()
            .map(ObjectKey::Position)
            .map_err(|_| anyhow!("bad object index {value:?}")),
        None => Ok(ObjectKey::Id(RecordId::from(value))),
    }
}

/// Renders frames and side panels as plain text.
#[derive(Default)]
pub struct ConsoleSurface {
    last: Option<String>,
}

impl ConsoleSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the rendered view only when it differs from the last one.
    pub fn refresh(&mut self, frame: &DisplayFrame, state: &ViewState) -> Option<String> {
        let rendered = render_view(frame, state);
        if self.last.as_deref() == Some(rendered.as_str()) {
            return None;
        }
        self.last = Some(rendered.clone());
        Some(rendered)
    }
}

pub fn render_view(frame: &DisplayFrame, state: &ViewState) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", render_status_line(state));
    let _ = writeln!(out, "{}", render_frame(frame));
    let _ = write!(
        out,
        "{}",
        render_watch_list(state.watch_list.entries(), state.watch_list.manual_full_scan())
    );
    out
}

fn render_status_line(state: &ViewState) -> String {
    let status = &state.status;
    let flag = |online: bool| if online { "up" } else { "down" };
    format!(
        "[pi {} | gps {} | wifi {} | power {}] {}",
        flag(status.pi_online),
        flag(status.gps_online),
        flag(status.wifi_online),
        state.power,
        status.message()
    )
}

pub fn render_frame(frame: &DisplayFrame) -> String {
    let mut out = String::new();
    let Some(environment) = &frame.environment_id else {
        return "no environment selected".into();
    };
    let _ = write!(out, "environment {environment}");
    if let Some(location) = &frame.location {
        let _ = write!(out, " ({location})");
    }

    for marker in &frame.markers {
        let selected = if frame.pin_id.as_ref() == Some(&marker.id) { ">" } else { " " };
        let kind = if marker.has_hyperspectral { "hsi" } else { "rgb" };
        let [lat, lon] = marker.geo_coords;
        let _ = write!(
            out,
            "\n {selected} marker {} at {lat:.5}, {lon:.5} ({kind})",
            marker.id
        );
    }

    match &frame.pin_id {
        None => {
            let _ = write!(out, "\n  no pin selected");
        }
        Some(pin) => {
            let _ = write!(out, "\n  pin {pin}");
            if let Some([lat, lon]) = frame.pin_coords {
                let _ = write!(out, " at {lat:.5}, {lon:.5}");
            }
            if let Some(timestamp) = &frame.pin_timestamp {
                let _ = write!(out, " captured {timestamp}");
            }
            let overlays: Vec<&str> = frame.overlays.iter().map(|kind| kind.label()).collect();
            let _ = write!(out, "\n  overlays [{}]", overlays.join(", "));
        }
    }

    match &frame.image {
        DisplayImage::Empty => {}
        DisplayImage::Image(path) => {
            let _ = write!(out, "\n  image {path}");
        }
        DisplayImage::Unavailable(kind) => {
            let _ = write!(out, "\n  no image available for overlay {kind}");
        }
    }

    for hotspot in &frame.hotspots {
        let marker = if hotspot.has_hyperspectral { "*" } else { "o" };
        let _ = write!(
            out,
            "\n  {marker} {} {} yaw {:.1} pitch {:.1}",
            hotspot.key, hotspot.label, hotspot.yaw, hotspot.pitch
        );
    }

    if let Some(detail) = &frame.detail {
        let _ = write!(
            out,
            "\n  detail {} {} ({:.0}%)",
            detail.key,
            detail.label,
            detail.confidence * 100.0
        );
        if let Some(distance) = detail.distance {
            let _ = write!(out, " at {distance:.1} m");
        }
        let tabs: Vec<String> = detail
            .tabs
            .iter()
            .map(|tab| {
                if *tab == detail.tab {
                    format!("[{tab}]")
                } else {
                    tab.to_string()
                }
            })
            .collect();
        let _ = write!(out, "\n    tabs {}", tabs.join(" "));
        match &detail.image {
            Some(path) => {
                let _ = write!(out, "\n    image {path}");
            }
            None => {
                for (material, percent) in &detail.materials {
                    let _ = write!(out, "\n    {material}: {percent}%");
                }
            }
        }
    }
    out
}

pub fn render_watch_list(entries: &[WatchListEntry], manual_full_scan: bool) -> String {
    let mut out = format!(
        "watch-list (manual full scan {})",
        if manual_full_scan { "on" } else { "off" }
    );
    for (index, entry) in entries.iter().enumerate() {
        let _ = write!(out, "\n  {index}: {}", entry.target_label);
        if entry.requires_full_scan {
            out.push_str(" [hsi]");
        }
    }
    out
}

pub fn render_environments(environments: &[EnvironmentRef], active: Option<&str>) -> String {
    if environments.is_empty() {
        return "no environments reported yet".into();
    }
    environments
        .iter()
        .map(|env| {
            let marker = if active == Some(env.filename.as_str()) { ">" } else { " " };
            format!("{marker} {} ({})", env.filename, env.location)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_status_log(status: &StatusBoard) -> String {
    if status.log().is_empty() {
        return "no status messages yet".into();
    }
    status
        .log()
        .iter()
        .map(|entry| format!("{} {}", entry.observed_at.format("%H:%M:%S"), entry.message))
        .collect::<Vec<_>>()
        .join("\n")
}
