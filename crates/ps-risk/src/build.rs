//! Risk-map construction for one tick.

use tracing::debug;

use ps_shadow::Shadow;

use crate::prune::partition_pairs;
use crate::{PairRisk, RiskEstimator, RiskMap, RiskResult};

impl RiskEstimator {
    /// Build the risk map for every unordered pair of `shadows`.
    ///
    /// Pairs outside the pruning envelope get an explicit `0.0` entry.  With
    /// the `parallel` feature the surviving pairs are evaluated on Rayon's
    /// thread pool; the result is identical to serial evaluation.
    ///
    /// Pure: `shadows` are only read.
    pub fn build_risk_map(&self, shadows: &[Shadow]) -> RiskResult<RiskMap> {
        let partition = partition_pairs(shadows, self.safe_distance, self.mesh_range);

        #[cfg(not(feature = "parallel"))]
        let results: Vec<RiskResult<PairRisk>> = partition
            .evaluate
            .iter()
            .map(|&(i, j)| self.estimate(&shadows[i], &shadows[j]))
            .collect();

        #[cfg(feature = "parallel")]
        let results: Vec<RiskResult<PairRisk>> = {
            use rayon::prelude::*;
            partition
                .evaluate
                .par_iter()
                .map(|&(i, j)| self.estimate(&shadows[i], &shadows[j]))
                .collect()
        };

        let mut map = RiskMap::new();
        for result in results {
            let risk = result?;
            map.insert_evaluated(risk.pair, risk.score);
            map.extend_warnings(risk.warnings);
        }
        for pair in partition.pruned {
            map.insert_pruned(pair);
        }

        debug!(
            agents = shadows.len(),
            evaluated = map.evaluated(),
            pruned = map.pruned(),
            max_risk = map.max(),
            "risk map built"
        );
        Ok(map)
    }
}

/// Build a risk map with default floor, sample count and seed.
pub fn build_risk_map(shadows: &[Shadow], safe_distance: f64, mesh_range: f64) -> RiskResult<RiskMap> {
    RiskEstimator::new(safe_distance, mesh_range)?.build_risk_map(shadows)
}
