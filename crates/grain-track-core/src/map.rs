//! Segmented EBSD map: a label grid plus a per-label grain registry.

use crate::orientation::Orientation;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Map-local grain label.
pub type GrainId = i64;

/// Grid label for pixels that belong to no grain.
pub const VOID_LABEL: GrainId = 0;

/// Errors raised while building or querying a [`SegmentedMap`].
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum MapError {
    #[error("step size must be finite and > 0 (got {0})")]
    InvalidStepSize(f64),
    #[error("label grid has {got} cells, expected {expected}")]
    GridSizeMismatch { expected: usize, got: usize },
    #[error("grid dimensions {width}x{height} overflow the cell count")]
    GridTooLarge { width: usize, height: usize },
    #[error("grain label {0} is negative; negative values are reserved")]
    InvalidLabel(GrainId),
    #[error("grid label {0} has no grain record")]
    MissingGrain(GrainId),
    #[error("grain {0} has a non-finite orientation")]
    InvalidOrientation(GrainId),
    #[error("unknown grain {0}")]
    UnknownGrain(GrainId),
}

/// One grain record of a map.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Grain {
    pub orientation: Orientation,
    /// Pixel count reported by the segmentation.
    pub size: u64,
}

#[derive(Clone, Copy, Debug, Default)]
struct PixelStats {
    count: u64,
    sum_col: u64,
    sum_row: u64,
}

/// One frame of the deformation sequence.
///
/// Read-only once built: per-grain pixel sums are accumulated in a single
/// pass at construction, so geometry queries are O(log n).
#[derive(Clone, Debug)]
pub struct SegmentedMap {
    width: usize,
    height: usize,
    labels: Vec<GrainId>, // row-major, len = width * height
    grains: BTreeMap<GrainId, Grain>,
    step_size: f64,
    stats: BTreeMap<GrainId, PixelStats>,
}

impl SegmentedMap {
    /// Build a map from a row-major label grid and a grain registry.
    ///
    /// Every non-void label in the grid must have a registry entry with a
    /// finite orientation. Labels below [`VOID_LABEL`] are rejected in both
    /// the grid and the registry.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(labels, grains), fields(cells = labels.len()))
    )]
    pub fn new(
        width: usize,
        height: usize,
        labels: Vec<GrainId>,
        grains: impl IntoIterator<Item = (GrainId, Grain)>,
        step_size: f64,
    ) -> Result<Self, MapError> {
        if !step_size.is_finite() || step_size <= 0.0 {
            return Err(MapError::InvalidStepSize(step_size));
        }
        let expected = width
            .checked_mul(height)
            .ok_or(MapError::GridTooLarge { width, height })?;
        if labels.len() != expected {
            return Err(MapError::GridSizeMismatch {
                expected,
                got: labels.len(),
            });
        }

        let grains: BTreeMap<GrainId, Grain> = grains.into_iter().collect();
        if let Some(&label) = grains.keys().find(|&&label| label < VOID_LABEL) {
            return Err(MapError::InvalidLabel(label));
        }
        if let Some((&label, _)) = grains.iter().find(|(_, g)| !g.orientation.is_finite()) {
            return Err(MapError::InvalidOrientation(label));
        }

        let mut stats: BTreeMap<GrainId, PixelStats> = BTreeMap::new();
        for (idx, &label) in labels.iter().enumerate() {
            if label == VOID_LABEL {
                continue;
            }
            if label < VOID_LABEL {
                return Err(MapError::InvalidLabel(label));
            }
            if !grains.contains_key(&label) {
                return Err(MapError::MissingGrain(label));
            }
            let entry = stats.entry(label).or_default();
            entry.count += 1;
            entry.sum_col += (idx % width) as u64;
            entry.sum_row += (idx / width) as u64;
        }

        Ok(Self {
            width,
            height,
            labels,
            grains,
            step_size,
            stats,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn step_size(&self) -> f64 {
        self.step_size
    }

    /// Row-major label grid.
    #[inline]
    pub fn labels(&self) -> &[GrainId] {
        &self.labels
    }

    /// Full grain registry, including grains that cover no grid pixel.
    #[inline]
    pub fn grains(&self) -> &BTreeMap<GrainId, Grain> {
        &self.grains
    }

    #[inline]
    pub fn grain(&self, label: GrainId) -> Option<&Grain> {
        self.grains.get(&label)
    }

    /// Label at `(col, row)`, `None` outside the grid.
    pub fn label_at(&self, col: usize, row: usize) -> Option<GrainId> {
        if col >= self.width || row >= self.height {
            return None;
        }
        Some(self.labels[row * self.width + col])
    }

    /// Number of grid cells carrying `label`.
    pub fn pixel_count(&self, label: GrainId) -> u64 {
        self.stats.get(&label).map_or(0, |s| s.count)
    }

    /// Distinct non-void labels present in the grid, ascending.
    ///
    /// With `min_area` (physical units²), grains whose `size * step_size²`
    /// is below it are dropped.
    pub fn grain_ids(&self, min_area: Option<f64>) -> Vec<GrainId> {
        let min_pixels = min_area.map(|a| a / (self.step_size * self.step_size));
        self.stats
            .keys()
            .copied()
            .filter(|label| match (min_pixels, self.grains.get(label)) {
                (Some(min), Some(grain)) => grain.size as f64 >= min,
                _ => true,
            })
            .collect()
    }

    /// Pixel centroid `(mean column, mean row)`.
    pub fn centroid(&self, label: GrainId) -> Result<Point2<f64>, MapError> {
        let s = self.stats(label)?;
        let n = s.count as f64;
        Ok(Point2::new(s.sum_col as f64 / n, s.sum_row as f64 / n))
    }

    /// Centroid relative to the grid center, scaled by the grid size.
    ///
    /// Values fall roughly in `[-0.5, 0.5]` on both axes, so centroids stay
    /// comparable between maps of different pixel resolution.
    pub fn normalized_centroid(&self, label: GrainId) -> Result<Point2<f64>, MapError> {
        let c = self.centroid(label)?;
        let w = self.width as f64;
        let h = self.height as f64;
        Ok(Point2::new((c.x - w / 2.0) / w, (c.y - h / 2.0) / h))
    }

    /// Grain pixel count over the total number of grid cells.
    pub fn normalized_area(&self, label: GrainId) -> Result<f64, MapError> {
        self.stats(label)?;
        let grain = self.grains.get(&label).ok_or(MapError::UnknownGrain(label))?;
        Ok(grain.size as f64 / (self.width * self.height) as f64)
    }

    /// Orientation of a grain present in the grid.
    pub fn orientation(&self, label: GrainId) -> Result<Orientation, MapError> {
        self.stats(label)?;
        self.grains
            .get(&label)
            .map(|g| g.orientation)
            .ok_or(MapError::UnknownGrain(label))
    }

    fn stats(&self, label: GrainId) -> Result<&PixelStats, MapError> {
        self.stats.get(&label).ok_or(MapError::UnknownGrain(label))
    }
}
