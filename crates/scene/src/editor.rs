use std::borrow::Cow;

use foundation::bounds::Aabb2;
use tracing::{debug, warn};

use crate::collection::Document;
use crate::describe::describe_change;
use crate::feature::Feature;
use crate::history::{History, HistoryConfig, HistoryError};
use crate::mutation::Mutation;
use crate::store::{FeatureStore, StoreError};
use crate::time_window::TimeWindow;
use crate::track_filter::apply_time_window;
use crate::viewport::{Viewport, ViewportSync};

/// One open document: the feature store wrapped in undo/redo.
///
/// Every mutation goes through [`Editor::apply`], which snapshots the prior
/// document, applies the change and records it before returning. A failed
/// mutation leaves store and history exactly as they were.
#[derive(Debug, Default)]
pub struct Editor {
    store: FeatureStore,
    history: History<Document>,
}

impl Editor {
    pub fn new(config: HistoryConfig) -> Self {
        Self {
            store: FeatureStore::new(),
            history: History::new(config),
        }
    }

    pub fn with_store(store: FeatureStore, config: HistoryConfig) -> Self {
        Self {
            store,
            history: History::new(config),
        }
    }

    /// Replaces the document. Loading is not undoable, so history is cleared.
    pub fn load(&mut self, document: Document) {
        self.store.replace_document(document);
        self.history.clear();
        debug!(features = self.store.features().len(), "document loaded");
    }

    pub fn store(&self) -> &FeatureStore {
        &self.store
    }

    pub fn document(&self) -> &Document {
        self.store.document()
    }

    pub fn visible_features(&self) -> Vec<&Feature> {
        self.store.visible_features().collect()
    }

    pub fn bbox(&self) -> Option<Aabb2> {
        self.store.bbox()
    }

    pub fn viewport(&self) -> Option<&Viewport> {
        self.store.viewport()
    }

    /// The visible features as the map should draw them under `window`.
    pub fn windowed_features(&self, window: &TimeWindow) -> Vec<Cow<'_, Feature>> {
        if window.filter_applied() {
            apply_time_window(self.store.visible_features(), window.span())
        } else {
            self.store.visible_features().map(Cow::Borrowed).collect()
        }
    }

    /// Applies `mutation` and records it. Returns the change description.
    pub fn apply(&mut self, mutation: Mutation) -> Result<&str, StoreError> {
        let kind = mutation.kind();
        let previous = self.store.document().clone();
        if let Err(err) = self.store.apply(mutation) {
            warn!(mutation = kind, "mutation skipped: {err}");
            return Err(err);
        }

        let description = describe_change(&previous, self.store.document());
        debug!(mutation = kind, "applied: {description}");
        self.history.record(previous, description);
        Ok(self.history.present_description())
    }

    pub fn set_viewport(&mut self, viewport: Viewport) -> Result<&str, StoreError> {
        self.apply(Mutation::SetViewport(viewport))
    }

    /// Feeds a user-driven map move through `sync`, writing it if needed.
    ///
    /// Returns whether a history entry was recorded.
    pub fn observe_view(&mut self, sync: &mut ViewportSync, observed: Viewport) -> bool {
        let Some(next) = sync.observe(observed, self.store.viewport()) else {
            return false;
        };
        self.set_viewport(next).is_ok()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Descriptions from the opened document up to the present.
    pub fn history(&self) -> Vec<&str> {
        self.history.descriptions()
    }

    /// Returns the description of the change that was undone.
    pub fn undo(&mut self) -> Result<String, HistoryError> {
        let present = self.store.document().clone();
        let (restored, undone) = self.history.undo(present).inspect_err(|err| {
            debug!("undo ignored: {err}");
        })?;
        self.store.restore(restored);
        debug!("undo: {undone}");
        Ok(undone)
    }

    /// Returns the description of the change that was redone.
    pub fn redo(&mut self) -> Result<String, HistoryError> {
        let present = self.store.document().clone();
        let (restored, redone) = self.history.redo(present).inspect_err(|err| {
            debug!("redo ignored: {err}");
        })?;
        self.store.restore(restored);
        debug!("redo: {redone}");
        Ok(redone)
    }
}
