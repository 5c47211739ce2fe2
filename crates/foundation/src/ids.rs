/// Source of `f-<n>` feature ids.
///
/// Owned by a single store; the counter only ever moves forward, so an id is
/// never handed out twice even after the feature carrying it is deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureIdCounter {
    next: u64,
}

impl Default for FeatureIdCounter {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl FeatureIdCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts counting at `next`. Used by tests and when resuming a session.
    pub fn starting_at(next: u64) -> Self {
        Self { next: next.max(1) }
    }

    pub fn peek(&self) -> u64 {
        self.next
    }

    /// Returns the next id for which `taken` is false.
    pub fn next_id(&mut self, taken: impl Fn(&str) -> bool) -> String {
        loop {
            let candidate = format!("f-{}", self.next);
            self.next += 1;
            if !taken(&candidate) {
                return candidate;
            }
        }
    }
}
