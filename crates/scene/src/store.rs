use std::collections::HashSet;
use std::fmt;

use foundation::bounds::Aabb2;
use foundation::ids::FeatureIdCounter;
use foundation::time::{TimeSpan, parse_timestamp};
use serde_json::Value;

use crate::collection::{Document, FeatureCollection};
use crate::feature::{DataType, Feature, PROP_NAME};
use crate::mutation::Mutation;
use crate::viewport::Viewport;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    NotFound { id: String },
    MissingId,
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NotFound { id } => write!(f, "no feature with id {id}"),
            StoreError::MissingId => write!(f, "feature has no id to update"),
        }
    }
}

impl std::error::Error for StoreError {}

/// Authoritative id -> feature mapping for one document.
///
/// Every mutation leaves the bbox recomputed over the resulting visible set.
/// The id counter lives outside the [`Document`] so undo never rewinds it.
#[derive(Debug, Clone, Default)]
pub struct FeatureStore {
    document: Document,
    ids: FeatureIdCounter,
}

impl FeatureStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_counter(ids: FeatureIdCounter) -> Self {
        Self {
            document: Document::default(),
            ids,
        }
    }

    /// Builds a store from a loaded document, cleaning every feature as on add.
    pub fn from_document(document: Document) -> Self {
        let mut store = Self::new();
        store.replace_document(document);
        store
    }

    /// Swaps in a new document while keeping the id counter.
    pub fn replace_document(&mut self, document: Document) {
        let Document {
            collection,
            viewport,
        } = document;
        self.document = Document::new(FeatureCollection::default(), viewport);
        self.add_many(collection.into_features());
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn collection(&self) -> &FeatureCollection {
        &self.document.collection
    }

    pub fn features(&self) -> &[Feature] {
        self.document.collection.features()
    }

    pub fn visible_features(&self) -> impl Iterator<Item = &Feature> + '_ {
        self.document.collection.visible_features()
    }

    pub fn bbox(&self) -> Option<Aabb2> {
        self.document.collection.bbox()
    }

    pub fn viewport(&self) -> Option<&Viewport> {
        self.document.viewport.as_ref()
    }

    pub fn get(&self, id: &str) -> Option<&Feature> {
        self.document.collection.get(id)
    }

    pub fn id_counter(&self) -> &FeatureIdCounter {
        &self.ids
    }

    /// Track features eligible for track selection; backdrops never are.
    pub fn tracks(&self) -> impl Iterator<Item = &Feature> + '_ {
        self.features()
            .iter()
            .filter(|f| f.data_type().is_some_and(DataType::is_selectable_track))
    }

    /// Earliest and latest parsable timestamp over all tracks.
    pub fn time_bounds(&self) -> Option<TimeSpan> {
        let mut times = self
            .tracks()
            .filter_map(Feature::times)
            .flatten()
            .filter_map(Value::as_str)
            .filter_map(parse_timestamp);
        let first = times.next()?;
        let (lo, hi) = times.fold((first, first), |(lo, hi), t| (lo.min(t), hi.max(t)));
        Some(TimeSpan::new(lo, hi))
    }

    pub fn apply(&mut self, mutation: Mutation) -> Result<(), StoreError> {
        match mutation {
            Mutation::Add(feature) => {
                self.add(feature);
            }
            Mutation::AddMany(features) => {
                self.add_many(features);
            }
            Mutation::Update(feature) => self.update(feature)?,
            Mutation::UpdateMany(features) => {
                self.update_many(features);
            }
            Mutation::SetVisible(ids) => self.set_visible(&ids),
            Mutation::Delete(ids) => {
                self.delete(&ids);
            }
            Mutation::Duplicate(ids) => {
                self.duplicate(&ids);
            }
            Mutation::SetViewport(viewport) => self.set_viewport(viewport),
        }
        Ok(())
    }

    /// Appends `feature`, returning the id it was stored under.
    pub fn add(&mut self, feature: Feature) -> String {
        self.add_many([feature]).into_iter().next().unwrap_or_default()
    }

    /// Appends in input order. Missing or colliding ids get a fresh `f-<n>`.
    pub fn add_many(&mut self, features: impl IntoIterator<Item = Feature>) -> Vec<String> {
        let Self { document, ids } = self;
        document.collection.edit(|existing| {
            let mut added = Vec::new();
            for mut feature in features {
                let id = match feature.id.take() {
                    Some(id) if !has_id(existing, &id) => id,
                    _ => ids.next_id(|candidate| has_id(existing, candidate)),
                };
                feature.id = Some(id.clone());
                feature.apply_defaults();
                existing.push(feature);
                added.push(id);
            }
            added
        })
    }

    /// Replaces the feature with the same id, keeping its position.
    pub fn update(&mut self, mut feature: Feature) -> Result<(), StoreError> {
        let id = feature.id().ok_or(StoreError::MissingId)?.to_string();
        let index = self
            .features()
            .iter()
            .position(|f| f.id() == Some(id.as_str()))
            .ok_or(StoreError::NotFound { id })?;
        feature.apply_defaults();
        self.document
            .collection
            .edit(|features| features[index] = feature);
        Ok(())
    }

    /// Upsert: existing features with incoming ids are removed and the
    /// incoming set is appended in order. Untouched features keep their place.
    pub fn update_many(&mut self, features: impl IntoIterator<Item = Feature>) -> Vec<String> {
        let Self { document, ids } = self;
        document.collection.edit(|existing| {
            let mut incoming: Vec<Feature> = Vec::new();
            for mut feature in features {
                let id = match feature.id.take() {
                    Some(id) => id,
                    None => ids.next_id(|c| has_id(existing, c) || has_id(&incoming, c)),
                };
                // A repeated id within one batch: the later feature wins.
                incoming.retain(|f| f.id() != Some(id.as_str()));
                feature.id = Some(id);
                feature.apply_defaults();
                incoming.push(feature);
            }
            existing.retain(|f| !f.id().is_some_and(|id| has_id(&incoming, id)));
            let updated = incoming.iter().filter_map(|f| f.id.clone()).collect();
            existing.extend(incoming);
            updated
        })
    }

    /// Listed ids become visible, every other feature hidden.
    pub fn set_visible(&mut self, ids: &[String]) {
        let wanted: HashSet<&str> = ids.iter().map(String::as_str).collect();
        self.document.collection.edit(|features| {
            for feature in features.iter_mut() {
                let visible = feature.id().is_some_and(|id| wanted.contains(id));
                feature.set_visible(visible);
            }
        });
    }

    /// Returns the number of features removed.
    pub fn delete(&mut self, ids: &[String]) -> usize {
        let doomed: HashSet<&str> = ids.iter().map(String::as_str).collect();
        self.document.collection.edit(|features| {
            let before = features.len();
            features.retain(|f| !f.id().is_some_and(|id| doomed.contains(id)));
            before - features.len()
        })
    }

    /// Appends a renamed copy of each listed feature, in store order.
    pub fn duplicate(&mut self, targets: &[String]) -> Vec<String> {
        let wanted: HashSet<&str> = targets.iter().map(String::as_str).collect();
        let Self { document, ids } = self;
        document.collection.edit(|features| {
            let copies: Vec<Feature> = features
                .iter()
                .filter(|f| f.id().is_some_and(|id| wanted.contains(id)))
                .cloned()
                .collect();

            let mut created = Vec::with_capacity(copies.len());
            for mut copy in copies {
                let name = format!("Copy of {}", copy.name().or(copy.id()).unwrap_or_default());
                let id = ids.next_id(|c| has_id(features, c));
                copy.id = Some(id.clone());
                copy.properties
                    .insert(PROP_NAME.to_string(), Value::String(name));
                features.push(copy);
                created.push(id);
            }
            created
        })
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.document.viewport = Some(viewport);
    }

    /// Reinstates a snapshot taken from this store (undo/redo).
    pub(crate) fn restore(&mut self, document: Document) {
        self.document = document;
    }
}

fn has_id(features: &[Feature], id: &str) -> bool {
    features.iter().any(|f| f.id() == Some(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::visible_bounds;
    use crate::feature::{Geometry, PROP_DATA_TYPE, PROP_TIMES, PROP_VISIBLE};
    use foundation::time::Time;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn ids(store: &FeatureStore) -> Vec<&str> {
        store.features().iter().filter_map(Feature::id).collect()
    }

    fn strings(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    fn point(id: &str, x: f64, y: f64) -> Feature {
        Feature::new()
            .with_id(id)
            .with_geometry(Geometry::Point([x, y]))
    }

    #[test]
    fn ids_are_assigned_and_never_reused() {
        let mut store = FeatureStore::new();
        assert_eq!(store.add(Feature::new()), "f-1");
        assert_eq!(store.add(Feature::new()), "f-2");
        store.delete(&strings(&["f-1"]));
        assert_eq!(store.add(Feature::new()), "f-3");
        assert_eq!(ids(&store), vec!["f-2", "f-3"]);
    }

    #[test]
    fn add_fills_defaults() {
        let mut store = FeatureStore::new();
        let id = store.add(Feature::new());
        let f = store.get(&id).expect("stored");
        assert_eq!(f.properties.get(PROP_VISIBLE), Some(&json!(true)));
    }

    #[test]
    fn colliding_ids_are_reassigned() {
        let mut store = FeatureStore::new();
        store.add(Feature::new().with_id("f-1"));
        let added = store.add_many(vec![Feature::new().with_id("f-1"), Feature::new().with_id("x")]);
        assert_eq!(added, vec!["f-2".to_string(), "x".to_string()]);
        assert_eq!(ids(&store), vec!["f-1", "f-2", "x"]);
    }

    #[test]
    fn loaded_ids_are_skipped_by_the_counter() {
        let doc = Document::new(
            FeatureCollection::new(vec![Feature::new().with_id("f-1"), Feature::new()]),
            None,
        );
        let mut store = FeatureStore::from_document(doc);
        assert_eq!(ids(&store), vec!["f-1", "f-2"]);
        assert_eq!(store.add(Feature::new()), "f-3");
    }

    #[test]
    fn update_replaces_in_place() {
        let mut store = FeatureStore::new();
        store.add_many(vec![point("a", 0.0, 0.0), point("b", 1.0, 1.0), point("c", 2.0, 2.0)]);
        store
            .update(point("b", 10.0, 10.0).with_property(PROP_NAME, "moved"))
            .expect("update");
        assert_eq!(ids(&store), vec!["a", "b", "c"]);
        assert_eq!(store.get("b").and_then(Feature::name), Some("moved"));
        assert_eq!(store.bbox().expect("bbox").to_array(), [0.0, 0.0, 10.0, 10.0]);
    }

    #[test]
    fn update_of_missing_id_leaves_store_untouched() {
        let mut store = FeatureStore::new();
        store.add(point("a", 0.0, 0.0));
        let before = store.document().clone();
        assert_eq!(
            store.update(point("zzz", 5.0, 5.0)),
            Err(StoreError::NotFound {
                id: "zzz".to_string()
            })
        );
        assert_eq!(store.update(Feature::new()), Err(StoreError::MissingId));
        assert_eq!(store.document(), &before);
    }

    #[test]
    fn update_many_moves_updated_features_to_the_end() {
        let mut store = FeatureStore::new();
        store.add_many(vec![point("a", 0.0, 0.0), point("b", 1.0, 1.0), point("c", 2.0, 2.0)]);
        let updated = store.update_many(vec![point("a", 5.0, 5.0), point("new", 6.0, 6.0)]);
        assert_eq!(updated, strings(&["a", "new"]));
        assert_eq!(ids(&store), vec!["b", "c", "a", "new"]);
        assert_eq!(
            store.get("a").and_then(|f| f.geometry.clone()),
            Some(Geometry::Point([5.0, 5.0]))
        );
    }

    #[test]
    fn update_many_keeps_the_last_of_repeated_ids() {
        let mut store = FeatureStore::new();
        store.add_many(vec![point("a", 0.0, 0.0), point("b", 1.0, 1.0)]);
        let updated = store.update_many(vec![
            point("a", 0.0, 0.0).with_property("n", 1),
            point("a", 0.0, 0.0).with_property("n", 2),
        ]);
        assert_eq!(updated, strings(&["a"]));
        assert_eq!(ids(&store), vec!["b", "a"]);
        assert_eq!(
            store.get("a").and_then(|f| f.properties.get("n")),
            Some(&json!(2))
        );
    }

    #[test]
    fn set_visible_is_absolute() {
        let mut store = FeatureStore::new();
        store.add_many(vec![point("a", 0.0, 0.0), point("b", 9.0, 9.0), point("c", 2.0, 2.0)]);
        store.set_visible(&strings(&["a", "c"]));
        let visible: Vec<&str> = store.visible_features().filter_map(Feature::id).collect();
        assert_eq!(visible, vec!["a", "c"]);
        assert_eq!(store.bbox().expect("bbox").to_array(), [0.0, 0.0, 2.0, 2.0]);

        store.set_visible(&[]);
        assert_eq!(store.visible_features().count(), 0);
        assert_eq!(store.bbox(), None);
    }

    #[test]
    fn duplicate_renames_and_keeps_original() {
        let mut store = FeatureStore::new();
        store.add(Feature::new());
        store.add(
            Feature::new()
                .with_property(PROP_NAME, "Alpha")
                .with_property("colour", "red"),
        );
        let created = store.duplicate(&strings(&["f-2", "f-1"]));
        assert_eq!(created, strings(&["f-3", "f-4"]));

        let original = store.get("f-2").expect("original kept");
        assert_eq!(original.name(), Some("Alpha"));
        let copy = store.get("f-4").expect("copy of f-2");
        assert_eq!(copy.name(), Some("Copy of Alpha"));
        assert_eq!(copy.properties.get("colour"), Some(&json!("red")));
        assert_eq!(store.get("f-3").and_then(Feature::name), Some("Copy of f-1"));
    }

    #[test]
    fn delete_reports_removed_count() {
        let mut store = FeatureStore::new();
        store.add_many(vec![point("a", 0.0, 0.0), point("b", 1.0, 1.0)]);
        assert_eq!(store.delete(&strings(&["b", "missing"])), 1);
        assert_eq!(store.bbox().expect("bbox").to_array(), [0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn bbox_tracks_visible_set_across_mutations() {
        let mut store = FeatureStore::new();
        let mutations = vec![
            Mutation::AddMany(vec![point("a", 0.0, 0.0), point("b", 4.0, -2.0)]),
            Mutation::SetVisible(strings(&["b"])),
            Mutation::Duplicate(strings(&["a"])),
            Mutation::UpdateMany(vec![point("b", 7.0, 7.0)]),
            Mutation::Delete(strings(&["b"])),
        ];
        for m in mutations {
            store.apply(m).expect("apply");
            assert_eq!(store.bbox(), visible_bounds(store.features()));
        }
    }

    #[test]
    fn time_bounds_cover_tracks_only() {
        let mut store = FeatureStore::new();
        store.add(
            Feature::new()
                .with_property(PROP_DATA_TYPE, "track")
                .with_property(PROP_TIMES, json!(["2024-01-01T11:00:00Z", "2024-01-01T10:00:00Z"])),
        );
        store.add(
            Feature::new()
                .with_property(PROP_DATA_TYPE, "backdrop")
                .with_property(PROP_TIMES, json!(["2020-01-01T00:00:00Z"])),
        );
        let span = store.time_bounds().expect("bounds");
        assert_eq!(span.start, Time(1_704_103_200_000));
        assert_eq!(span.end, Time(1_704_106_800_000));
        assert_eq!(store.tracks().count(), 1);
    }
}
