/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use super::JobPoint;
use crate::common::{utils::average_pairwise_distance, weather::WeatherImpact};

pub const MIN_EPSILON: f64 = 0.005;
pub const MAX_EPSILON: f64 = 0.015;
pub const SPARSE_SPREAD: f64 = 0.02;

/// Neighbourhood radius for one scan.
///
/// Bad weather tightens the radius (x0.8 above 15 extra minutes, x0.9 above 5) since every job
/// takes longer, a sparse day loosens it (x1.2 when jobs average more than 0.02 apart). The result
/// is always clamped to `[MIN_EPSILON, MAX_EPSILON]`.
pub fn adjust_epsilon(base_epsilon: f64, weather_impact: &WeatherImpact, jobs: &[JobPoint]) -> f64 {
    let mut epsilon = base_epsilon;

    if weather_impact.extra_time_minutes > 15 {
        epsilon *= 0.8;
    } else if weather_impact.extra_time_minutes > 5 {
        epsilon *= 0.9;
    }

    let points = jobs.iter().map(JobPoint::point).collect::<Vec<_>>();
    if average_pairwise_distance(&points) > SPARSE_SPREAD {
        epsilon *= 1.2;
    }

    if epsilon.is_nan() {
        return MIN_EPSILON;
    }
    epsilon.clamp(MIN_EPSILON, MAX_EPSILON)
}
