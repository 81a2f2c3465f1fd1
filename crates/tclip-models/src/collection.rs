//! Result of one locator run against a profile.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::clip::{ClipReference, ClipSkip};

/// Ordered outcome of the collection stage.
///
/// Invariants: `found_count >= collected_count`, identifiers are unique
/// within the run, and sequence indices increase strictly from 1 in
/// discovery order.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CollectionResult {
    /// Profile the clips were collected for
    pub profile: String,

    /// How many clips the caller asked for
    pub requested_count: usize,

    /// How many clip entities the page exposed
    pub found_count: usize,

    /// Clips in discovery order
    pub clips: Vec<ClipReference>,

    /// Per-entity skips, in the order they occurred
    pub skips: Vec<ClipSkip>,
}

impl CollectionResult {
    /// Start an empty result for a profile.
    pub fn new(profile: impl Into<String>, requested_count: usize) -> Self {
        Self {
            profile: profile.into(),
            requested_count,
            found_count: 0,
            clips: Vec::new(),
            skips: Vec::new(),
        }
    }

    /// Number of clips that yielded a usable identifier.
    pub fn collected_count(&self) -> usize {
        self.clips.len()
    }

    /// Record a collected clip, assigning the next sequence index.
    pub fn push_clip(&mut self, identifier: impl Into<String>) -> &ClipReference {
        let index = self.clips.len() as u32 + 1;
        self.clips.push(ClipReference::new(identifier, index));
        self.clips.last().expect("just pushed")
    }

    /// Record a skipped entity.
    pub fn push_skip(&mut self, skip: ClipSkip) {
        self.skips.push(skip);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_indices_increase_from_one() {
        let mut result = CollectionResult::new("alice", 3);
        result.push_clip("one");
        result.push_skip(ClipSkip::SlugMissing);
        result.push_clip("two");

        let indices: Vec<u32> = result.clips.iter().map(|c| c.sequence_index).collect();
        assert_eq!(indices, vec![1, 2]);
        assert_eq!(result.collected_count(), 2);
        assert_eq!(result.skips.len(), 1);
    }
}
