use serde::{Deserialize, Serialize};

/// Named error contribution of a candidate edge.
///
/// Components are added in declaration order: centroid first, then
/// misorientation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorComponent {
    /// Euclidean distance between normalized centroids.
    Centroid,
    /// Symmetry-reduced misorientation angle in radians.
    Misorientation,
}

/// How the error components of an [`Edge`] combine into one weight.
///
/// Centroid distance and misorientation angle are on different natural
/// scales; `Sum` relies on the radius prefilter to keep them comparable.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum WeightRule {
    /// Unweighted sum of all components.
    #[default]
    Sum,
    /// Per-component scale factors.
    WeightedSum { centroid: f64, misorientation: f64 },
    /// Largest component.
    Max,
}

impl WeightRule {
    #[inline]
    fn scale(&self, component: ErrorComponent) -> f64 {
        match (self, component) {
            (WeightRule::WeightedSum { centroid, .. }, ErrorComponent::Centroid) => *centroid,
            (WeightRule::WeightedSum { misorientation, .. }, ErrorComponent::Misorientation) => {
                *misorientation
            }
            _ => 1.0,
        }
    }

    #[inline]
    fn accumulate(&self, acc: f64, component: ErrorComponent, value: f64) -> f64 {
        match self {
            WeightRule::Max => acc.max(value),
            _ => acc + self.scale(component) * value,
        }
    }
}

/// Candidate correspondence between chain `source` and frame grain `target`.
///
/// Indices are positions in the active-chain list and in the frame's
/// filtered grain list, not grain labels.
#[derive(Clone, Debug, PartialEq)]
pub struct Edge {
    source: usize,
    target: usize,
    rule: WeightRule,
    errors: Vec<(ErrorComponent, f64)>,
    weight: f64,
}

impl Edge {
    pub fn new(source: usize, target: usize, rule: WeightRule) -> Self {
        Self {
            source,
            target,
            rule,
            errors: Vec::with_capacity(2),
            weight: 0.0,
        }
    }

    /// Append an error component; the combined weight is updated in place.
    pub fn add_error(&mut self, component: ErrorComponent, value: f64) {
        self.errors.push((component, value));
        self.weight = self.rule.accumulate(self.weight, component, value);
    }

    /// Builder form of [`Edge::add_error`].
    pub fn with_error(mut self, component: ErrorComponent, value: f64) -> Self {
        self.add_error(component, value);
        self
    }

    #[inline]
    pub fn weight(&self) -> f64 {
        self.weight
    }

    #[inline]
    pub fn source_index(&self) -> usize {
        self.source
    }

    #[inline]
    pub fn target_index(&self) -> usize {
        self.target
    }

    /// Components in insertion order.
    #[inline]
    pub fn errors(&self) -> &[(ErrorComponent, f64)] {
        &self.errors
    }

    pub fn error(&self, component: ErrorComponent) -> Option<f64> {
        self.errors
            .iter()
            .find(|(c, _)| *c == component)
            .map(|&(_, v)| v)
    }
}
