//! Core types and utilities for tracking grains across EBSD orientation maps.
//!
//! This crate is intentionally small and purely geometric. It does *not*
//! read any EBSD file format; maps are built from in-memory label grids.
//!
//! - [`SymmetryTable`]: proper rotations of a crystal point group.
//! - [`Orientation`]: Euler-Bunge triple and the symmetry-reduced
//!   [`misorientation`] metric.
//! - [`SegmentedMap`]: one labeled frame with per-grain geometry queries.

mod logger;
mod map;
mod orientation;
mod symmetry;

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{init_with_level, level_for_verbosity};
pub use map::{Grain, GrainId, MapError, SegmentedMap, VOID_LABEL};
pub use orientation::{misorientation, Orientation, OrientationError};
pub use symmetry::{get_symmetry_matrices, CrystalClass, SymmetryError, SymmetryTable};
