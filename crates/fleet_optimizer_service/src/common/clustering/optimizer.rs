/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use super::{
    dbscan::dbscan,
    epsilon::adjust_epsilon,
    fallback::fallback_scan,
    postprocess::{build_clusters, efficiency_gain, optimization_score},
    prepare_job_data, prepare_job_data_leniently, ClusteringError, ScanResult,
};
use crate::{
    common::{types::Point, weather::WeatherImpact},
    tools::prometheus::CLUSTERING_FALLBACKS,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info};

#[derive(Debug, Deserialize, Serialize, Clone, Copy)]
pub struct ClusteringConfig {
    pub base_epsilon: f64,
    pub min_samples: usize,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            base_epsilon: 0.008,
            min_samples: 2,
        }
    }
}

/// Either a density based grouping or the static zone grouping, chosen explicitly by the caller.
#[derive(Debug, Clone)]
pub enum ScanOutcome {
    Clustered(ScanResult),
    Fallback {
        reason: ClusteringError,
        result: ScanResult,
    },
}

impl ScanOutcome {
    pub fn into_result(self) -> ScanResult {
        match self {
            ScanOutcome::Clustered(result) => result,
            ScanOutcome::Fallback { result, .. } => result,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClusteringOptimizer {
    pub config: ClusteringConfig,
    pub default_center: Point,
}

impl ClusteringOptimizer {
    pub fn new(config: ClusteringConfig, default_center: Point) -> Self {
        Self {
            config,
            default_center,
        }
    }

    /// Full density based scan, failing on malformed input or degenerate geometry.
    pub fn try_cluster(
        &self,
        jobs: &Value,
        weather_impact: &WeatherImpact,
    ) -> Result<ScanResult, ClusteringError> {
        let jobs = prepare_job_data(jobs, &self.default_center)?;
        let epsilon = adjust_epsilon(self.config.base_epsilon, weather_impact, &jobs);
        let points = jobs.iter().map(|job| job.point()).collect::<Vec<_>>();

        let raw = dbscan(&points, epsilon, self.config.min_samples)?;
        let (clusters, noise) = build_clusters(&raw, &jobs);

        info!(
            tag = "[Clustering]",
            epsilon = epsilon,
            jobs = jobs.len(),
            clusters = clusters.len(),
            noise = noise.len()
        );

        Ok(ScanResult {
            efficiency_gain: efficiency_gain(clusters.len(), jobs.len()),
            optimization_score: optimization_score(&clusters, noise.len(), jobs.len()),
            clusters,
            noise,
            weather_impact: weather_impact.to_owned(),
            fallback: false,
        })
    }

    pub fn scan(&self, jobs: &Value, weather_impact: WeatherImpact) -> ScanOutcome {
        match self.try_cluster(jobs, &weather_impact) {
            Ok(result) => ScanOutcome::Clustered(result),
            Err(reason) => {
                error!(tag = "[Clustering Failed - Using Fallback Zones]", error = %reason);
                CLUSTERING_FALLBACKS.inc();
                let jobs = prepare_job_data_leniently(jobs, &self.default_center);
                ScanOutcome::Fallback {
                    reason,
                    result: fallback_scan(jobs, weather_impact),
                }
            }
        }
    }

    /// Always yields a usable result, degraded to the fallback zones when clustering fails.
    pub fn optimize(&self, jobs: &Value, weather_impact: WeatherImpact) -> ScanResult {
        self.scan(jobs, weather_impact).into_result()
    }
}
