//! Spatial pruning of shadow pairs.
//!
//! An R-tree over every shadow's step-0 position answers "which agents are
//! close enough to matter".  A pair `(i, j)` survives pruning iff
//!
//! ```text
//! dist ≤ mesh_range   and   dist ≤ extent_i + extent_j + safe_distance
//! ```
//!
//! where `extent` is [`Shadow::extent`].  Beyond that distance no step's
//! 3σ spheres can come within `safe_distance` of each other.

use std::collections::BTreeSet;

use rstar::{AABB, PointDistance, RTree, RTreeObject};

use ps_core::AgentPair;
use ps_shadow::Shadow;

// ── R-tree entry ──────────────────────────────────────────────────────────────

/// A shadow origin stored in the index, with the shadow's slice position.
#[derive(Clone)]
struct OriginEntry {
    point: [f64; 3],
    index: usize,
}

impl RTreeObject for OriginEntry {
    type Envelope = AABB<[f64; 3]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for OriginEntry {
    fn distance_2(&self, point: &[f64; 3]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        let dz = self.point[2] - point[2];
        dx * dx + dy * dy + dz * dz
    }
}

// ── Partition ─────────────────────────────────────────────────────────────────

/// Pairs split into those that must be evaluated and those pruned.
///
/// Both lists hold slice indices `(i, j)` with `shadows[i].agent <
/// shadows[j].agent`, sorted by canonical pair.
#[derive(Debug, Default)]
pub struct PairPartition {
    pub evaluate: Vec<(usize, usize)>,
    pub pruned:   Vec<AgentPair>,
}

/// Partition every unordered pair of `shadows`.
pub fn partition_pairs(shadows: &[Shadow], safe_distance: f64, mesh_range: f64) -> PairPartition {
    let extents: Vec<f64> = shadows.iter().map(Shadow::extent).collect();
    let max_extent = extents.iter().copied().fold(0.0, f64::max);

    let entries: Vec<OriginEntry> = shadows
        .iter()
        .enumerate()
        .map(|(index, s)| {
            let o = s.origin();
            OriginEntry { point: [o.x, o.y, o.z], index }
        })
        .collect();
    let tree = RTree::bulk_load(entries);

    let mut near = Vec::new();
    for (i, s) in shadows.iter().enumerate() {
        let o = s.origin();
        let reach = mesh_range.min(extents[i] + max_extent + safe_distance);
        for entry in tree.locate_within_distance([o.x, o.y, o.z], reach * reach) {
            let j = entry.index;
            if shadows[j].agent <= s.agent {
                continue;
            }
            let dist = (shadows[j].origin() - o).norm();
            if dist <= mesh_range && dist <= extents[i] + extents[j] + safe_distance {
                near.push((i, j));
            }
        }
    }
    near.sort_by_key(|&(i, j)| AgentPair::new(shadows[i].agent, shadows[j].agent));

    let kept: BTreeSet<AgentPair> = near
        .iter()
        .map(|&(i, j)| AgentPair::new(shadows[i].agent, shadows[j].agent))
        .collect();
    let mut pruned = Vec::new();
    for a in shadows {
        for b in shadows {
            let pair = AgentPair::new(a.agent, b.agent);
            if a.agent < b.agent && !kept.contains(&pair) {
                pruned.push(pair);
            }
        }
    }
    pruned.sort();

    PairPartition { evaluate: near, pruned }
}
