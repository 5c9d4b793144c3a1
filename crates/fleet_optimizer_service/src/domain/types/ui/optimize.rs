/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use crate::common::{clustering::ScanResult, types::*};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum_macros::{Display, EnumString};

#[derive(Debug, Clone, Copy, Default, Display, EnumString, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Algorithm {
    ClarkeWright,
    #[default]
    Dbscan,
}

/// `jobs` stays raw JSON: anything that is not an array still gets a fallback grouping.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeRoutesRequest {
    pub date: Option<String>,
    pub jobs: Option<Value>,
    pub vehicle_ids: Option<Vec<i64>>,
    pub algorithm: Option<Algorithm>,
    pub options: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationSummary {
    pub total_jobs: usize,
    pub clustered_jobs: usize,
    pub noise_jobs: usize,
    pub cluster_count: usize,
    pub total_estimated_minutes: u32,
    pub total_recommended_crew: u32,
}

impl From<&ScanResult> for OptimizationSummary {
    fn from(result: &ScanResult) -> Self {
        let clustered_jobs = result
            .clusters
            .iter()
            .map(|cluster| cluster.jobs.len())
            .sum::<usize>();
        Self {
            total_jobs: clustered_jobs + result.noise.len(),
            clustered_jobs,
            noise_jobs: result.noise.len(),
            cluster_count: result.clusters.len(),
            total_estimated_minutes: result
                .clusters
                .iter()
                .map(|cluster| cluster.estimated_duration)
                .sum(),
            total_recommended_crew: result
                .clusters
                .iter()
                .map(|cluster| u32::from(cluster.recommended_team_size))
                .sum(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeRoutesResponse {
    pub success: bool,
    pub date: ScanDate,
    pub algorithm: Algorithm,
    pub vehicle_ids: Vec<i64>,
    pub result: ScanResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<OptimizationSummary>,
}
