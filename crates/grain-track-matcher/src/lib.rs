//! Sequential grain matcher for EBSD map sequences.
//!
//! ## Quickstart
//!
//! ```
//! use grain_track_core::{Grain, Orientation, SegmentedMap};
//! use grain_track_matcher::{MatcherParams, SequentialMatcher};
//!
//! let grain = Grain { orientation: Orientation::IDENTITY, size: 1 };
//! let frame0 = SegmentedMap::new(2, 1, vec![1, 0], [(1, grain)], 1.0).unwrap();
//! let frame1 = SegmentedMap::new(2, 1, vec![4, 0], [(4, grain)], 1.0).unwrap();
//! let maps = [frame0, frame1];
//!
//! let matcher = SequentialMatcher::new(&maps, MatcherParams::default()).unwrap();
//! let result = matcher.link_all_frames().unwrap();
//! assert_eq!(result.labels_at(1), vec![4]);
//! ```
//!
//! Algorithm, per transition `t -> t+1`:
//! 1. Snapshot each chain's anchor (last matched, possibly frozen, centroid
//!    and orientation).
//! 2. Collect frame `t+1` grains passing the `min_area` filter, ascending by
//!    label.
//! 3. Build candidate [`Edge`]s for every (chain, grain) pair whose
//!    normalized-centroid distance is within `radius`; add the
//!    symmetry-reduced misorientation and keep edges with
//!    `weight < tolerance`.
//! 4. Commit edges greedily by ascending weight, skipping any edge whose
//!    source or target is already taken.
//! 5. Extend matched chains with the new grain; freeze the rest.

mod assignment;
mod chain;
mod edge;
mod error;
mod matcher;
mod params;
mod result;

pub use assignment::{assign_greedy, Assignment};
pub use chain::{ChainEntry, GrainChain, NO_MAPPING};
pub use edge::{Edge, ErrorComponent, WeightRule};
pub use error::MatchError;
pub use matcher::SequentialMatcher;
pub use params::MatcherParams;
pub use result::TrackingResult;
