/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use super::{dbscan::RawClusters, Cluster, JobPoint};
use crate::common::{
    types::Point,
    utils::{mean, mean_point, variance},
};

/// Crew size for a group of jobs, in `{2, 3, 4}`.
///
/// Non-decreasing in both total volume and the number of complex jobs.
pub fn recommended_team_size(total_volume: f64, complex_jobs: usize) -> u8 {
    if total_volume > 80.0 || complex_jobs > 2 {
        4
    } else if total_volume > 50.0 || complex_jobs > 1 {
        3
    } else {
        2
    }
}

pub fn team_size_for(jobs: &[JobPoint]) -> u8 {
    let total_volume = jobs.iter().map(|job| job.volume).sum();
    let complex_jobs = jobs.iter().filter(|job| job.is_complex()).count();
    recommended_team_size(total_volume, complex_jobs)
}

pub fn total_duration(jobs: &[JobPoint]) -> u32 {
    jobs.iter().map(|job| job.estimated_duration_minutes).sum()
}

/// Builds a numbered cluster record around an explicit center.
pub fn build_cluster(
    cluster_id: usize,
    center: Point,
    jobs: Vec<JobPoint>,
    zone: Option<String>,
) -> Cluster {
    Cluster {
        cluster_id,
        center,
        estimated_duration: total_duration(&jobs),
        recommended_team_size: team_size_for(&jobs),
        jobs,
        zone,
    }
}

/// Turns DBSCAN index groups into cluster records, numbered from 1, plus the noise jobs.
pub fn build_clusters(raw: &RawClusters, jobs: &[JobPoint]) -> (Vec<Cluster>, Vec<JobPoint>) {
    let clusters = raw
        .clusters
        .iter()
        .enumerate()
        .filter_map(|(position, members)| {
            let members = members
                .iter()
                .filter_map(|index| jobs.get(*index).cloned())
                .collect::<Vec<_>>();
            let center = mean_point(&members.iter().map(JobPoint::point).collect::<Vec<_>>())?;
            Some(build_cluster(position + 1, center, members, None))
        })
        .collect();

    let noise = raw
        .noise
        .iter()
        .filter_map(|index| jobs.get(*index).cloned())
        .collect();

    (clusters, noise)
}

/// Heuristic scheduling gain over one crew per job, in percent (0 to 95).
///
/// `optimal = min(6, ceil(total_jobs / 4))` and the gain is `min(95, 60 + optimal / clusters * 35)`.
///
/// A scan with no clusters reports 0 even when it had jobs, so an all-noise day never shows the
/// capped 95.
pub fn efficiency_gain(cluster_count: usize, total_jobs: usize) -> u32 {
    if total_jobs == 0 || cluster_count == 0 {
        return 0;
    }
    let optimal_clusters = total_jobs.div_ceil(4).min(6) as f64;
    let efficiency = 60.0 + (optimal_clusters / cluster_count as f64) * 35.0;
    efficiency.min(95.0).round() as u32
}

/// Composite of coverage (70%) and cluster size balance (30%), in `0..=100`.
pub fn optimization_score(clusters: &[Cluster], noise_count: usize, total_jobs: usize) -> u32 {
    let coverage = if total_jobs > 0 {
        total_jobs.saturating_sub(noise_count) as f64 / total_jobs as f64
    } else {
        0.0
    };

    let sizes = clusters
        .iter()
        .map(|cluster| cluster.jobs.len() as f64)
        .collect::<Vec<_>>();
    let balance = match (mean(&sizes), variance(&sizes)) {
        (Some(mean), Some(variance)) if mean > 0.0 => (1.0 - variance / mean.powi(2)).max(0.0),
        _ => 0.0,
    };

    ((coverage * 0.7 + balance * 0.3) * 100.0).round() as u32
}
