//! Stored map viewport and its two-way binding with the rendered map.
//!
//! The stored [`Viewport`] is authoritative. The rendered map only feeds
//! changes back when the user pans or zooms; everything else flows from the
//! store to the map through [`ViewportSync::push_stored`].

use serde::{Deserialize, Serialize};

/// Why the viewport last changed. Decides whether the map animates.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    #[default]
    Pan,
    ZoomIn,
    ZoomOut,
    Restore,
}

/// Geographic extent in degrees plus an integer zoom level.
///
/// Equality compares the extent and zoom only; `change_type` is transient.
#[derive(Debug, Copy, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
    pub zoom: u8,
    #[serde(default)]
    pub change_type: ChangeType,
}

impl Viewport {
    pub fn new(north: f64, south: f64, east: f64, west: f64, zoom: u8) -> Self {
        Self {
            north,
            south,
            east,
            west,
            zoom,
            change_type: ChangeType::Pan,
        }
    }

    pub fn with_change_type(mut self, change_type: ChangeType) -> Self {
        self.change_type = change_type;
        self
    }

    pub fn same_view(&self, other: &Viewport) -> bool {
        self.north == other.north
            && self.south == other.south
            && self.east == other.east
            && self.west == other.west
            && self.zoom == other.zoom
    }
}

impl PartialEq for Viewport {
    fn eq(&self, other: &Self) -> bool {
        self.same_view(other)
    }
}

/// Classifies a user move by comparing against the previously observed zoom.
pub fn classify_change(previous_zoom: Option<u8>, zoom: u8) -> ChangeType {
    match previous_zoom {
        Some(prev) if zoom > prev => ChangeType::ZoomIn,
        Some(prev) if zoom < prev => ChangeType::ZoomOut,
        _ => ChangeType::Pan,
    }
}

/// The rendered map as seen by the sync.
pub trait MapView {
    /// Moves the map to `viewport`, animated or instantly.
    fn show(&mut self, viewport: &Viewport, animate: bool);
}

/// Per-mount sync state between the rendered map and the stored viewport.
#[derive(Debug, Default, Clone)]
pub struct ViewportSync {
    mount_event_seen: bool,
    last_zoom: Option<u8>,
    last_seen: Option<Viewport>,
}

impl ViewportSync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resets the sync as if the map had just been mounted.
    pub fn remount(&mut self) {
        *self = Self::default();
    }

    /// Handles a user-driven move (pan/zoom end) reported by the map.
    ///
    /// Returns the viewport to write to the store, classified, or `None` when
    /// nothing should be written: the first event after mount, or a view that
    /// already matches `stored`.
    pub fn observe(&mut self, observed: Viewport, stored: Option<&Viewport>) -> Option<Viewport> {
        let previous_zoom = self.last_zoom.replace(observed.zoom);
        self.last_seen = Some(observed);

        if !self.mount_event_seen {
            self.mount_event_seen = true;
            return None;
        }

        let next = observed.with_change_type(classify_change(previous_zoom, observed.zoom));
        if stored.is_some_and(|s| s.same_view(&next)) {
            return None;
        }
        Some(next)
    }

    /// Pushes a stored viewport to the map. Restores are applied instantly.
    ///
    /// Returns `false` when the map already shows `stored`.
    pub fn push_stored(&mut self, stored: &Viewport, map: &mut impl MapView) -> bool {
        if self.last_seen.is_some_and(|seen| seen.same_view(stored)) {
            return false;
        }
        map.show(stored, stored.change_type != ChangeType::Restore);
        self.last_zoom = Some(stored.zoom);
        self.last_seen = Some(*stored);
        true
    }
}
