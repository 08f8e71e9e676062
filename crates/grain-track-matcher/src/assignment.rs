//! Conflict-free resolution of a candidate edge set.
//!
//! Greedy nearest-first: edges are committed by ascending weight, skipping
//! any edge whose source or target is already taken. The result is a valid
//! one-to-one matching but not a minimum-total-weight one; a bipartite
//! solver could replace it behind the same edge-list interface.

use crate::edge::Edge;
use serde::{Deserialize, Serialize};

/// A committed source -> target match.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub target: usize,
    pub weight: f64,
}

/// Greedily assign `edges` and return, per source index, its match if any.
///
/// Equal weights keep their input order (stable sort), so results are
/// reproducible as long as the caller builds edges in a fixed order.
pub fn assign_greedy(
    mut edges: Vec<Edge>,
    num_sources: usize,
    num_targets: usize,
) -> Vec<Option<Assignment>> {
    edges.sort_by(|a, b| a.weight().total_cmp(&b.weight()));

    let mut by_source: Vec<Option<Assignment>> = vec![None; num_sources];
    let mut used_targets = vec![false; num_targets];

    for edge in &edges {
        let (src, tgt) = (edge.source_index(), edge.target_index());
        if src >= num_sources || tgt >= num_targets {
            continue;
        }
        if by_source[src].is_some() || used_targets[tgt] {
            continue;
        }
        used_targets[tgt] = true;
        by_source[src] = Some(Assignment {
            target: tgt,
            weight: edge.weight(),
        });
    }

    by_source
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::{ErrorComponent, WeightRule};

    fn edge(source: usize, target: usize, weight: f64) -> Edge {
        Edge::new(source, target, WeightRule::Sum).with_error(ErrorComponent::Centroid, weight)
    }

    fn targets(assigned: &[Option<Assignment>]) -> Vec<Option<usize>> {
        assigned.iter().map(|a| a.map(|a| a.target)).collect()
    }

    #[test]
    fn lowest_weight_wins_conflicts() {
        let edges = vec![edge(0, 0, 0.3), edge(1, 0, 0.1), edge(0, 1, 0.4)];
        let assigned = assign_greedy(edges, 2, 2);
        assert_eq!(targets(&assigned), vec![Some(1), Some(0)]);
        assert_eq!(assigned[1].map(|a| a.weight), Some(0.1));
    }

    #[test]
    fn greedy_is_not_globally_optimal() {
        // Optimal would be 0->1, 1->0 (total 0.4); greedy takes 0->0 first.
        let edges = vec![edge(0, 0, 0.1), edge(0, 1, 0.2), edge(1, 0, 0.2)];
        let assigned = assign_greedy(edges, 2, 2);
        assert_eq!(targets(&assigned), vec![Some(0), None]);
    }

    #[test]
    fn ties_keep_construction_order() {
        let edges = vec![edge(1, 0, 0.2), edge(0, 0, 0.2)];
        let assigned = assign_greedy(edges, 2, 1);
        assert_eq!(targets(&assigned), vec![None, Some(0)]);
    }

    #[test]
    fn targets_are_pairwise_distinct() {
        let mut edges = Vec::new();
        for s in 0..5 {
            for t in 0..3 {
                edges.push(edge(s, t, ((s * 7 + t * 3) % 5) as f64 * 0.1));
            }
        }
        let assigned = assign_greedy(edges, 5, 3);
        let mut taken: Vec<usize> = assigned.iter().flatten().map(|a| a.target).collect();
        assert_eq!(taken.len(), 3);
        taken.sort_unstable();
        taken.dedup();
        assert_eq!(taken.len(), 3);
    }

    #[test]
    fn no_edges_no_matches() {
        assert_eq!(targets(&assign_greedy(Vec::new(), 3, 0)), vec![None; 3]);
    }
}
