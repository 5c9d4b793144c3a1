/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use super::ClusteringError;
use crate::common::{types::Point, utils::euclidean_distance};
use rustc_hash::FxHashSet;

/// Index-level output of a DBSCAN run: every input index is in exactly one cluster or in `noise`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawClusters {
    pub clusters: Vec<Vec<usize>>,
    pub noise: Vec<usize>,
}

/// Indices of all other points within `epsilon` of `points[index]`.
pub fn region_query(points: &[Point], index: usize, epsilon: f64) -> Vec<usize> {
    let origin = &points[index];
    points
        .iter()
        .enumerate()
        .filter(|(other, point)| *other != index && euclidean_distance(origin, point) <= epsilon)
        .map(|(other, _)| other)
        .collect()
}

/// Groups points by density reachability.
///
/// A point with at least `min_samples` other points within `epsilon` seeds a cluster, which grows
/// breadth first through every neighbour that is itself dense. Clusters are numbered in discovery
/// order and members keep the order in which they were reached.
///
/// A point labelled noise on its first visit stays noise even if a later expansion reaches it as a
/// border point. Efficiency and score heuristics downstream are tuned against this labelling.
pub fn dbscan(
    points: &[Point],
    epsilon: f64,
    min_samples: usize,
) -> Result<RawClusters, ClusteringError> {
    if !epsilon.is_finite() || epsilon <= 0.0 {
        return Err(ClusteringError::InvalidEpsilon(epsilon));
    }
    if let Some(index) = points.iter().position(|point| !point.is_finite()) {
        return Err(ClusteringError::NonFiniteCoordinate(index));
    }

    let mut visited = vec![false; points.len()];
    let mut processed = vec![false; points.len()];
    let mut result = RawClusters::default();

    for index in 0..points.len() {
        if visited[index] {
            continue;
        }
        visited[index] = true;

        let mut frontier = region_query(points, index, epsilon);
        if frontier.len() < min_samples {
            processed[index] = true;
            result.noise.push(index);
            continue;
        }

        let mut cluster = vec![index];
        processed[index] = true;

        let mut queued = frontier.iter().copied().collect::<FxHashSet<_>>();
        queued.insert(index);

        let mut cursor = 0;
        while cursor < frontier.len() {
            let neighbor = frontier[cursor];
            cursor += 1;

            if !visited[neighbor] {
                visited[neighbor] = true;
                let expansion = region_query(points, neighbor, epsilon);
                if expansion.len() >= min_samples {
                    for candidate in expansion {
                        if queued.insert(candidate) {
                            frontier.push(candidate);
                        }
                    }
                }
            }

            if !processed[neighbor] {
                processed[neighbor] = true;
                cluster.push(neighbor);
            }
        }

        result.clusters.push(cluster);
    }

    Ok(result)
}
