use crate::edge::WeightRule;
use crate::error::MatchError;
use grain_track_core::CrystalClass;
use serde::{Deserialize, Serialize};

/// Parameters of one tracking run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherParams {
    /// Max normalized-centroid distance for a candidate pair (dimensionless).
    pub radius: f64,
    /// Minimal grain area in step-size units squared; `None` keeps every grain.
    pub min_area: Option<f64>,
    /// Edges with `weight >= tolerance` are dropped.
    pub tolerance: f64,
    /// Point group used by the misorientation metric.
    pub crystal_class: CrystalClass,
    pub weighting: WeightRule,
}

impl Default for MatcherParams {
    fn default() -> Self {
        Self {
            radius: 0.05,
            min_area: None,
            tolerance: 1.0,
            crystal_class: CrystalClass::Cubic,
            weighting: WeightRule::Sum,
        }
    }
}

impl MatcherParams {
    /// Check that thresholds are usable. Infinite `radius`/`tolerance` are
    /// allowed and disable the respective filter.
    pub fn validate(&self) -> Result<(), MatchError> {
        if self.radius.is_nan() || self.radius < 0.0 {
            return Err(MatchError::InvalidParams(format!(
                "radius must be >= 0 (got {})",
                self.radius
            )));
        }
        if self.tolerance.is_nan() || self.tolerance <= 0.0 {
            return Err(MatchError::InvalidParams(format!(
                "tolerance must be > 0 (got {})",
                self.tolerance
            )));
        }
        if let Some(min_area) = self.min_area {
            if !min_area.is_finite() || min_area < 0.0 {
                return Err(MatchError::InvalidParams(format!(
                    "min_area must be finite and >= 0 (got {min_area})"
                )));
            }
        }
        if let WeightRule::WeightedSum {
            centroid,
            misorientation,
        } = self.weighting
        {
            let ok = |s: f64| s.is_finite() && s >= 0.0;
            if !ok(centroid) || !ok(misorientation) {
                return Err(MatchError::InvalidParams(format!(
                    "weighted_sum scales must be finite and >= 0 (got {centroid}, {misorientation})"
                )));
            }
        }
        Ok(())
    }
}
