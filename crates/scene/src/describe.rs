//! Human-readable summaries of what a mutation changed, for the history list.
//! Descriptions are display-only; replay always uses snapshots.

use std::collections::{BTreeSet, HashMap};

use crate::collection::Document;
use crate::feature::{Feature, PROP_VISIBLE};
use crate::viewport::{ChangeType, Viewport};

pub const NO_CHANGE: &str = "No change";

/// Describes the difference between two consecutive document states.
pub fn describe_change(before: &Document, after: &Document) -> String {
    let mut parts = feature_changes(before.collection.features(), after.collection.features());

    if before.viewport != after.viewport
        || before.viewport.map(|v| v.change_type) != after.viewport.map(|v| v.change_type)
    {
        parts.push(describe_viewport(after.viewport.as_ref()));
    }

    if parts.is_empty() {
        NO_CHANGE.to_string()
    } else {
        parts.join("; ")
    }
}

fn describe_viewport(viewport: Option<&Viewport>) -> String {
    let text = match viewport.map(|v| v.change_type) {
        None => "Clear view",
        Some(ChangeType::Pan) => "Pan map",
        Some(ChangeType::ZoomIn) => "Zoom in",
        Some(ChangeType::ZoomOut) => "Zoom out",
        Some(ChangeType::Restore) => "Restore view",
    };
    text.to_string()
}

fn feature_changes(before: &[Feature], after: &[Feature]) -> Vec<String> {
    let old: HashMap<&str, &Feature> = before.iter().filter_map(|f| Some((f.id()?, f))).collect();
    let new: HashMap<&str, &Feature> = after.iter().filter_map(|f| Some((f.id()?, f))).collect();

    let added: Vec<&Feature> = after
        .iter()
        .filter(|f| f.id().is_none_or(|id| !old.contains_key(id)))
        .collect();
    let removed: Vec<&Feature> = before
        .iter()
        .filter(|f| f.id().is_none_or(|id| !new.contains_key(id)))
        .collect();
    let changed: Vec<(&Feature, &Feature)> = before
        .iter()
        .filter_map(|b| {
            let a = new.get(b.id()?)?;
            (b != *a).then_some((b, *a))
        })
        .collect();

    let mut parts = Vec::new();
    match added.as_slice() {
        [] => {}
        [one] => parts.push(format!("Add {}", one.label())),
        many => parts.push(format!("Add {} features", many.len())),
    }
    match removed.as_slice() {
        [] => {}
        [one] => parts.push(format!("Delete {}", one.label())),
        many => parts.push(format!("Delete {} features", many.len())),
    }
    match changed.as_slice() {
        [] => {}
        [(b, a)] => parts.push(describe_feature_edit(b, a)),
        many if many.iter().all(|(b, a)| only_visibility_changed(b, a)) => {
            parts.push(format!("Change visibility of {} features", many.len()))
        }
        many => parts.push(format!("Update {} features", many.len())),
    }

    if parts.is_empty() && !same_order(before, after) {
        parts.push("Reorder features".to_string());
    }
    parts
}

fn describe_feature_edit(before: &Feature, after: &Feature) -> String {
    let label = after.label();
    let keys = changed_keys(before, after);
    let geometry_changed = before.geometry != after.geometry;

    if !geometry_changed && keys.len() == 1 && keys.contains(PROP_VISIBLE) {
        let verb = if after.is_visible() { "Show" } else { "Hide" };
        return format!("{verb} {label}");
    }
    match (geometry_changed, keys.len()) {
        (true, 0) => format!("Edit geometry of {label}"),
        (true, _) => format!("Edit {label}"),
        (false, 1) => {
            let key = keys.iter().next().map(String::as_str).unwrap_or_default();
            format!("Change {key} of {label}")
        }
        (false, n) => format!("Change {n} properties of {label}"),
    }
}

fn changed_keys(before: &Feature, after: &Feature) -> BTreeSet<String> {
    before
        .properties
        .keys()
        .chain(after.properties.keys())
        .filter(|k| before.properties.get(*k) != after.properties.get(*k))
        .cloned()
        .collect()
}

fn only_visibility_changed(before: &Feature, after: &Feature) -> bool {
    before.geometry == after.geometry
        && changed_keys(before, after)
            .iter()
            .all(|k| k == PROP_VISIBLE)
}

fn same_order(before: &[Feature], after: &[Feature]) -> bool {
    before.iter().map(Feature::id).eq(after.iter().map(Feature::id))
}
