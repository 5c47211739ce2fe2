//! Document edits driven from the command line. Each edit goes through the
//! editor so it is described exactly as the history would show it.

use std::borrow::Cow;

use foundation::time::{Time, TimeSpan, format_period, format_timestamp};
use scene::{Editor, Mutation, TimeWindow, filter_track};

/// How `crop` picks its window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CropWindow {
    Between { start: Time, end: Time },
    /// One step starting at `at` rounded down to the step.
    Aligned { at: Time },
}

pub fn summary(editor: &Editor, step: &str) -> Result<String, String> {
    let store = editor.store();
    let visible = store.visible_features().count();
    let mut lines = vec![
        format!("features: {} ({visible} visible)", store.features().len()),
        format!("tracks:   {}", store.tracks().count()),
    ];

    lines.push(match store.bbox() {
        Some(b) => {
            let [min_x, min_y, max_x, max_y] = b.to_array();
            format!("bbox:     [{min_x}, {min_y}, {max_x}, {max_y}]")
        }
        None => "bbox:     none".to_string(),
    });

    if let Some(bounds) = store.time_bounds() {
        let window = TimeWindow::full(bounds, step).map_err(|e| format!("step {step:?}: {e}"))?;
        lines.push(format!(
            "time:     {} .. {} (step {})",
            timestamp(window.start()),
            timestamp(window.end()),
            format_period(window.interval())
        ));
    }

    if let Some(v) = store.viewport() {
        lines.push(format!(
            "view:     n={} s={} e={} w={} zoom={}",
            v.north, v.south, v.east, v.west, v.zoom
        ));
    }
    for feature in store.features() {
        let marker = if feature.is_visible() { ' ' } else { '-' };
        let kind = feature.data_type().map(|d| d.as_str()).unwrap_or("?");
        lines.push(format!(
            "{marker} {:<8} {:<16} {}",
            feature.id().unwrap_or_default(),
            kind,
            feature.label()
        ));
    }

    let mut out = lines.join("\n");
    out.push('\n');
    Ok(out)
}

fn timestamp(t: Time) -> String {
    format_timestamp(t).unwrap_or_else(|| t.0.to_string())
}

/// Crops every track to the chosen window, recording a single edit.
///
/// Only tracks that lose samples are rewritten; they move to the end of the
/// collection as with any upsert.
pub fn crop(editor: &mut Editor, window: CropWindow, step: &str) -> Result<String, String> {
    let bounds = editor
        .store()
        .time_bounds()
        .unwrap_or_else(TimeSpan::forever);
    let mut time_window =
        TimeWindow::full(bounds, step).map_err(|e| format!("step {step:?}: {e}"))?;
    match window {
        CropWindow::Between { start, end } => time_window.apply(start, end),
        CropWindow::Aligned { at } => time_window.align(at),
    }

    // Tracks the window leaves whole are not resubmitted, so they keep their place.
    let span = time_window.span();
    let cropped: Vec<_> = editor
        .store()
        .features()
        .iter()
        .filter_map(|source| match filter_track(source, span) {
            Cow::Owned(f) if f != *source => Some(f),
            _ => None,
        })
        .collect();
    apply(editor, Mutation::UpdateMany(cropped))
}

pub fn paste(editor: &mut Editor, text: &str) -> Result<String, String> {
    let features = formats::parse_clipboard(text).map_err(|e| e.to_string())?;
    apply(editor, Mutation::AddMany(features))
}

pub fn duplicate(editor: &mut Editor, ids: Vec<String>) -> Result<String, String> {
    apply(editor, Mutation::Duplicate(ids))
}

pub fn delete(editor: &mut Editor, ids: Vec<String>) -> Result<String, String> {
    apply(editor, Mutation::Delete(ids))
}

/// Shows exactly `ids` and hides everything else.
pub fn show(editor: &mut Editor, ids: Vec<String>) -> Result<String, String> {
    apply(editor, Mutation::SetVisible(ids))
}

fn apply(editor: &mut Editor, mutation: Mutation) -> Result<String, String> {
    editor
        .apply(mutation)
        .map(str::to_string)
        .map_err(|e| e.to_string())
}
