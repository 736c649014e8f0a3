// ── Slide cache ──
//
// Keyed store of fetched slide content plus the ordered talk sequence.
// Owned exclusively by the dispatch worker, so no locking: validity is
// tied to the connection -- the supervisor invalidates it on every
// transition away from Connected.

use std::collections::HashMap;
use std::sync::Arc;

use crate::model::{Slide, SlideId, SlidePosition};

#[derive(Debug, Default)]
pub(crate) struct SlideCache {
    slides: HashMap<SlideId, Arc<Slide>>,
    sequence: Vec<SlideId>,
}

impl SlideCache {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Install the authoritative slide order from talk metadata.
    /// Called once per connection.
    pub(crate) fn set_sequence(&mut self, ids: Vec<SlideId>) {
        self.sequence = ids;
    }

    pub(crate) fn get(&self, id: &SlideId) -> Option<Arc<Slide>> {
        self.slides.get(id).cloned()
    }

    /// Store a fetched slide. At most one entry per id; a duplicate
    /// fetch result for the same id replaces the previous entry.
    pub(crate) fn insert(&mut self, slide: Slide) -> Arc<Slide> {
        let slide = Arc::new(slide);
        self.slides.insert(slide.id.clone(), Arc::clone(&slide));
        slide
    }

    /// 1-based position of `id` within the ordered sequence, or `None`
    /// while the sequence has not been loaded or the id is unknown.
    pub(crate) fn display_index(&self, id: &SlideId) -> Option<SlidePosition> {
        let index = self.sequence.iter().position(|s| s == id)? + 1;
        Some(SlidePosition {
            index,
            total: self.sequence.len(),
        })
    }

    /// Drop all cached content and the sequence. Stale data from a
    /// previous channel must never be shown as live.
    pub(crate) fn invalidate_all(&mut self) {
        self.slides.clear();
        self.sequence.clear();
    }
}
