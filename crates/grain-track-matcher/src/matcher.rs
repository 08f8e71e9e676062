use crate::assignment::{assign_greedy, Assignment};
use crate::chain::{ChainEntry, GrainChain};
use crate::edge::{Edge, ErrorComponent};
use crate::error::MatchError;
use crate::params::MatcherParams;
use crate::result::TrackingResult;
use grain_track_core::{
    GrainId, MapError, Orientation, OrientationError, SegmentedMap, SymmetryTable,
};
use log::{debug, info, warn};
use nalgebra::Point2;

#[cfg(feature = "rayon")]
use rayon::prelude::*;
#[cfg(feature = "tracing")]
use tracing::instrument;

/// Grain of the frame being linked, with the quantities used for matching.
#[derive(Clone, Copy, Debug)]
struct FrameGrain {
    label: GrainId,
    centroid: Point2<f64>,
    orientation: Orientation,
}

fn frame_grains(map: &SegmentedMap, min_area: Option<f64>) -> Result<Vec<FrameGrain>, MapError> {
    map.grain_ids(min_area)
        .into_iter()
        .map(|label| {
            Ok(FrameGrain {
                label,
                centroid: map.normalized_centroid(label)?,
                orientation: map.orientation(label)?,
            })
        })
        .collect()
}

/// Links grains of the first map through every following map.
///
/// Maps are borrowed read-only; the matcher owns the chain history. One
/// chain is seeded per frame-0 grain passing the `min_area` filter and it
/// gains exactly one entry per transition.
pub struct SequentialMatcher<'a> {
    maps: &'a [SegmentedMap],
    params: MatcherParams,
    symmetry: SymmetryTable,
    chains: Vec<GrainChain>,
    next_frame: usize,
}

impl<'a> SequentialMatcher<'a> {
    /// Create a matcher using the built-in table for `params.crystal_class`.
    pub fn new(maps: &'a [SegmentedMap], params: MatcherParams) -> Result<Self, MatchError> {
        let symmetry = SymmetryTable::for_class(params.crystal_class);
        Self::with_symmetry(maps, params, symmetry)
    }

    /// Create a matcher with a custom symmetry table.
    pub fn with_symmetry(
        maps: &'a [SegmentedMap],
        params: MatcherParams,
        symmetry: SymmetryTable,
    ) -> Result<Self, MatchError> {
        params.validate()?;
        if maps.len() < 2 {
            return Err(MatchError::InsufficientFrames { got: maps.len() });
        }

        let chains: Vec<GrainChain> = frame_grains(&maps[0], params.min_area)?
            .into_iter()
            .map(|g| GrainChain::seed(g.label, g.centroid, g.orientation))
            .collect();
        debug!("seeded {} chains from frame 0", chains.len());

        Ok(Self {
            maps,
            params,
            symmetry,
            chains,
            next_frame: 1,
        })
    }

    #[inline]
    pub fn params(&self) -> &MatcherParams {
        &self.params
    }

    #[inline]
    pub fn frame_count(&self) -> usize {
        self.maps.len()
    }

    /// Chains as linked so far.
    #[inline]
    pub fn chains(&self) -> &[GrainChain] {
        &self.chains
    }

    /// Run every transition in frame order and return the full result.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip_all, fields(frames = self.maps.len(), chains = self.chains.len()))
    )]
    pub fn link_all_frames(mut self) -> Result<TrackingResult, MatchError> {
        while self.next_frame < self.maps.len() {
            self.link_adjacent()?;
        }

        let result = TrackingResult::new(self.maps.len(), self.chains);
        info!(
            "linked {} chains over {} frames, {} matched in the last frame",
            result.chain_count(),
            result.frame_count(),
            result.surviving_chains()
        );
        Ok(result)
    }

    /// Link the last processed frame to the next one. Returns the number of
    /// chains that found a match.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self), fields(frame = self.next_frame))
    )]
    fn link_adjacent(&mut self) -> Result<usize, MatchError> {
        let frame = self.next_frame;
        let anchors: Vec<ChainEntry> = self.chains.iter().map(|c| *c.anchor()).collect();
        let grains = frame_grains(&self.maps[frame], self.params.min_area)?;
        if grains.is_empty() {
            warn!("frame {frame} has no eligible grains; all chains freeze");
        }

        let edges = candidate_edges(&anchors, &grains, &self.params, &self.symmetry)?;
        let num_edges = edges.len();
        let assigned = assign_greedy(edges, anchors.len(), grains.len());

        let mut matched = 0usize;
        for (chain, assignment) in self.chains.iter_mut().zip(assigned) {
            match assignment {
                Some(Assignment { target, weight }) => {
                    let g = &grains[target];
                    chain.push_matched(g.label, g.centroid, g.orientation, weight);
                    matched += 1;
                }
                None => chain.push_frozen(),
            }
        }

        debug!(
            "frame {} -> {}: {} chains, {} grains, {} candidate edges, {} matched",
            frame - 1,
            frame,
            anchors.len(),
            grains.len(),
            num_edges,
            matched
        );

        self.next_frame += 1;
        Ok(matched)
    }
}

/// Build the candidate edge set, ordered by chain index then by ascending
/// grain label.
fn candidate_edges(
    anchors: &[ChainEntry],
    grains: &[FrameGrain],
    params: &MatcherParams,
    symmetry: &SymmetryTable,
) -> Result<Vec<Edge>, OrientationError> {
    #[cfg(feature = "rayon")]
    let per_chain: Vec<Vec<Edge>> = anchors
        .par_iter()
        .enumerate()
        .map(|(source, anchor)| chain_edges(source, anchor, grains, params, symmetry))
        .collect::<Result<_, _>>()?;

    #[cfg(not(feature = "rayon"))]
    let per_chain: Vec<Vec<Edge>> = anchors
        .iter()
        .enumerate()
        .map(|(source, anchor)| chain_edges(source, anchor, grains, params, symmetry))
        .collect::<Result<_, _>>()?;

    Ok(per_chain.into_iter().flatten().collect())
}

fn chain_edges(
    source: usize,
    anchor: &ChainEntry,
    grains: &[FrameGrain],
    params: &MatcherParams,
    symmetry: &SymmetryTable,
) -> Result<Vec<Edge>, OrientationError> {
    let mut edges = Vec::new();
    for (target, grain) in grains.iter().enumerate() {
        let centroid_error = (grain.centroid - anchor.centroid).norm();
        // Hard prefilter: skip the misorientation for distant pairs.
        if centroid_error > params.radius {
            continue;
        }
        let misorientation = anchor.orientation.misorientation(&grain.orientation, symmetry)?;
        let edge = Edge::new(source, target, params.weighting)
            .with_error(ErrorComponent::Centroid, centroid_error)
            .with_error(ErrorComponent::Misorientation, misorientation);
        if edge.weight() < params.tolerance {
            edges.push(edge);
        }
    }
    Ok(edges)
}
