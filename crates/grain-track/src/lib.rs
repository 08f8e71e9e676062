//! High-level facade crate for the `grain-track-*` workspace.
//!
//! This crate provides:
//! - re-exports of the core geometry crate and the sequential matcher
//! - JSON io for segmented maps, run configs and tracking reports
//! - (feature `cli`) the `grain-track` command-line tool
//!
//! ## Quickstart
//!
//! ```no_run
//! use grain_track::io::TrackConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = TrackConfig::load_json("run/config.json")?;
//! let report = config.run("run")?;
//! println!("matched per transition: {:?}", report.matches_per_transition);
//! report.write_json("run/report.json")?;
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `grain_track::core`: symmetry tables, orientations, misorientation, segmented maps.
//! - `grain_track::matcher`: edges, greedy assignment, chains and the sequential matcher.
//! - `grain_track::io`: `MapFile`, `TrackConfig` and `TrackReport` JSON formats.

pub use grain_track_core as core;
pub use grain_track_matcher as matcher;

pub use grain_track_core::{misorientation, CrystalClass, Orientation, SegmentedMap};
pub use grain_track_matcher::{MatcherParams, SequentialMatcher, TrackingResult, NO_MAPPING};

pub mod io;
