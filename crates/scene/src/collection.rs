use foundation::bounds::Aabb2;

use crate::feature::Feature;
use crate::viewport::Viewport;

/// Ordered features plus the bounding box of the visible ones.
///
/// The bbox is recomputed on every structural change and is `None` when no
/// visible feature has geometry.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureCollection {
    features: Vec<Feature>,
    bbox: Option<Aabb2>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        let bbox = visible_bounds(&features);
        Self { features, bbox }
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn into_features(self) -> Vec<Feature> {
        self.features
    }

    pub fn bbox(&self) -> Option<Aabb2> {
        self.bbox
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Feature> {
        self.features.iter().find(|f| f.id() == Some(id))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn visible_features(&self) -> impl Iterator<Item = &Feature> + '_ {
        self.features.iter().filter(|f| f.is_visible())
    }

    /// Runs `edit` on the feature list and refreshes the bbox afterwards.
    pub(crate) fn edit<R>(&mut self, edit: impl FnOnce(&mut Vec<Feature>) -> R) -> R {
        let out = edit(&mut self.features);
        self.bbox = visible_bounds(&self.features);
        out
    }
}

/// Bounding box over the visible features only.
pub fn visible_bounds(features: &[Feature]) -> Option<Aabb2> {
    features
        .iter()
        .filter(|f| f.is_visible())
        .filter_map(Feature::bounds)
        .reduce(|a, b| a.union(&b))
}

/// Everything undo/redo restores: the features and the stored viewport.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    pub collection: FeatureCollection,
    pub viewport: Option<Viewport>,
}

impl Document {
    pub fn new(collection: FeatureCollection, viewport: Option<Viewport>) -> Self {
        Self {
            collection,
            viewport,
        }
    }
}
