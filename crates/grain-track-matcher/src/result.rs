use crate::chain::{GrainChain, NO_MAPPING};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Output of a complete tracking run.
///
/// Chains are ordered by their frame-0 label; every table column follows
/// that order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrackingResult {
    frame_count: usize,
    chains: Vec<GrainChain>,
}

impl TrackingResult {
    pub(crate) fn new(frame_count: usize, chains: Vec<GrainChain>) -> Self {
        Self {
            frame_count,
            chains,
        }
    }

    #[inline]
    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    #[inline]
    pub fn chain_count(&self) -> usize {
        self.chains.len()
    }

    #[inline]
    pub fn chains(&self) -> &[GrainChain] {
        &self.chains
    }

    /// Label of every chain at `frame`, [`NO_MAPPING`] where unmatched.
    pub fn labels_at(&self, frame: usize) -> Vec<i64> {
        self.chains
            .iter()
            .map(|c| c.label_or_sentinel(frame))
            .collect()
    }

    /// Edge weight of every chain for transition `transition -> transition + 1`,
    /// [`NO_MAPPING`] where unmatched.
    pub fn errors_at(&self, transition: usize) -> Vec<f64> {
        self.chains
            .iter()
            .map(|c| c.error_or_sentinel(transition + 1))
            .collect()
    }

    /// `ebsd_i` -> labels at frame `i`.
    pub fn label_table(&self) -> BTreeMap<String, Vec<i64>> {
        (0..self.frame_count)
            .map(|i| (format!("ebsd_{i}"), self.labels_at(i)))
            .collect()
    }

    /// `ebsd_i_to_(i+1)` -> edge weights of that transition.
    pub fn error_table(&self) -> BTreeMap<String, Vec<f64>> {
        (0..self.frame_count.saturating_sub(1))
            .map(|i| (format!("ebsd_{i}_to_{}", i + 1), self.errors_at(i)))
            .collect()
    }

    /// Number of chains matched at each transition.
    pub fn matches_per_transition(&self) -> Vec<usize> {
        (1..self.frame_count)
            .map(|frame| {
                self.chains
                    .iter()
                    .filter(|c| c.label_or_sentinel(frame) != NO_MAPPING)
                    .count()
            })
            .collect()
    }

    /// Chains still matched in the last frame.
    pub fn surviving_chains(&self) -> usize {
        let last = self.frame_count.saturating_sub(1);
        self.chains
            .iter()
            .filter(|c| c.label_or_sentinel(last) != NO_MAPPING)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grain_track_core::Orientation;
    use nalgebra::Point2;

    fn result() -> TrackingResult {
        let mut a = GrainChain::seed(1, Point2::origin(), Orientation::IDENTITY);
        a.push_matched(5, Point2::new(0.01, 0.0), Orientation::IDENTITY, 0.01);
        a.push_matched(9, Point2::new(0.02, 0.0), Orientation::IDENTITY, 0.02);
        let mut b = GrainChain::seed(2, Point2::new(0.3, 0.3), Orientation::IDENTITY);
        b.push_frozen();
        b.push_matched(4, Point2::new(0.3, 0.31), Orientation::IDENTITY, 0.01);
        TrackingResult::new(3, vec![a, b])
    }

    #[test]
    fn tables_use_frame_keys_and_sentinels() {
        let r = result();
        let labels = r.label_table();
        assert_eq!(labels.len(), 3);
        assert_eq!(labels["ebsd_0"], vec![1, 2]);
        assert_eq!(labels["ebsd_1"], vec![5, NO_MAPPING]);
        assert_eq!(labels["ebsd_2"], vec![9, 4]);

        let errors = r.error_table();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors["ebsd_0_to_1"], vec![0.01, -1.0]);
        assert_eq!(errors["ebsd_1_to_2"], vec![0.02, 0.01]);
    }

    #[test]
    fn per_transition_counts() {
        let r = result();
        assert_eq!(r.matches_per_transition(), vec![1, 2]);
        assert_eq!(r.surviving_chains(), 2);
        assert_eq!(r.chain_count(), 2);
        assert_eq!(r.frame_count(), 3);
    }
}
