use grain_track_core::{GrainId, Orientation};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Sentinel written to the output tables for "no match at this frame".
pub const NO_MAPPING: i64 = -1;

/// State of one chain at one frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChainEntry {
    /// Grain label at this frame, `None` when the chain found no match.
    pub label: Option<GrainId>,
    /// Normalized centroid used as the matching anchor from this frame on.
    pub centroid: Point2<f64>,
    pub orientation: Orientation,
    /// Weight of the edge that produced this entry; `None` for the seed
    /// frame and for frozen frames.
    pub error: Option<f64>,
}

/// Per-frame history of one grain of the first map.
///
/// A chain never shrinks: every transition appends exactly one entry, and
/// an unmatched chain carries its last anchor forward unchanged.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GrainChain {
    entries: Vec<ChainEntry>,
}

impl GrainChain {
    pub(crate) fn seed(label: GrainId, centroid: Point2<f64>, orientation: Orientation) -> Self {
        Self {
            entries: vec![ChainEntry {
                label: Some(label),
                centroid,
                orientation,
                error: None,
            }],
        }
    }

    pub(crate) fn push_matched(
        &mut self,
        label: GrainId,
        centroid: Point2<f64>,
        orientation: Orientation,
        weight: f64,
    ) {
        self.entries.push(ChainEntry {
            label: Some(label),
            centroid,
            orientation,
            error: Some(weight),
        });
    }

    pub(crate) fn push_frozen(&mut self) {
        let anchor = *self.anchor();
        self.entries.push(ChainEntry {
            label: None,
            error: None,
            ..anchor
        });
    }

    /// Latest entry; its centroid and orientation anchor the next match.
    #[inline]
    pub fn anchor(&self) -> &ChainEntry {
        // Seeded with one entry and never shrunk.
        &self.entries[self.entries.len() - 1]
    }

    #[inline]
    pub fn entries(&self) -> &[ChainEntry] {
        &self.entries
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Label of the grain in the first map.
    pub fn origin_label(&self) -> GrainId {
        self.entries[0].label.unwrap_or(NO_MAPPING)
    }

    /// Label at `frame` with the sentinel for unmatched frames.
    pub fn label_or_sentinel(&self, frame: usize) -> i64 {
        self.entries
            .get(frame)
            .and_then(|e| e.label)
            .unwrap_or(NO_MAPPING)
    }

    /// Error of the entry at `frame` with the sentinel for seed and frozen frames.
    pub fn error_or_sentinel(&self, frame: usize) -> f64 {
        self.entries
            .get(frame)
            .and_then(|e| e.error)
            .unwrap_or(NO_MAPPING as f64)
    }

    /// Number of frames with a committed match, seed frame included.
    pub fn matched_frames(&self) -> usize {
        self.entries.iter().filter(|e| e.label.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frozen_entry_copies_anchor() {
        let mut chain =
            GrainChain::seed(3, Point2::new(0.1, -0.2), Orientation::new(0.1, 0.2, 0.3));
        chain.push_frozen();
        chain.push_matched(
            8,
            Point2::new(0.12, -0.2),
            Orientation::new(0.1, 0.2, 0.31),
            0.03,
        );
        chain.push_frozen();

        assert_eq!(chain.len(), 4);
        let e = chain.entries();
        assert_eq!(e[1].label, None);
        assert_eq!(e[1].centroid, e[0].centroid);
        assert_eq!(e[1].orientation, e[0].orientation);
        assert_eq!(e[3].centroid, e[2].centroid);
        assert_eq!(e[3].error, None);

        assert_eq!(chain.origin_label(), 3);
        assert_eq!(chain.label_or_sentinel(1), NO_MAPPING);
        assert_eq!(chain.label_or_sentinel(2), 8);
        assert_eq!(chain.error_or_sentinel(0), -1.0);
        assert_eq!(chain.error_or_sentinel(2), 0.03);
        assert_eq!(chain.matched_frames(), 2);
    }
}
