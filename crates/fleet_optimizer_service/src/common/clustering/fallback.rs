/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use super::{postprocess::build_cluster, JobPoint, ScanResult};
use crate::common::{types::Point, utils::euclidean_distance, weather::WeatherImpact};

pub const FALLBACK_EFFICIENCY_GAIN: u32 = 70;
pub const FALLBACK_OPTIMIZATION_SCORE: u32 = 70;
pub const ZONE_RADIUS: f64 = 0.02;

pub struct FallbackZone {
    pub name: &'static str,
    pub lat: f64,
    pub lng: f64,
}

impl FallbackZone {
    pub fn center(&self) -> Point {
        Point::new(self.lat, self.lng)
    }
}

pub const FALLBACK_ZONES: [FallbackZone; 5] = [
    FallbackZone {
        name: "City",
        lat: 59.3293,
        lng: 18.0686,
    },
    FallbackZone {
        name: "North",
        lat: 59.3500,
        lng: 18.0686,
    },
    FallbackZone {
        name: "South",
        lat: 59.3100,
        lng: 18.0686,
    },
    FallbackZone {
        name: "East",
        lat: 59.3293,
        lng: 18.1000,
    },
    FallbackZone {
        name: "West",
        lat: 59.3293,
        lng: 18.0300,
    },
];

/// Index into `FALLBACK_ZONES` of the nearest zone closer than `ZONE_RADIUS`, earlier zones winning ties.
pub fn nearest_zone(point: &Point) -> Option<usize> {
    FALLBACK_ZONES
        .iter()
        .enumerate()
        .map(|(index, zone)| (index, euclidean_distance(point, &zone.center())))
        .filter(|(_, distance)| *distance < ZONE_RADIUS)
        .fold(None, |nearest: Option<(usize, f64)>, (index, distance)| match nearest {
            Some((_, best)) if best <= distance => nearest,
            _ => Some((index, distance)),
        })
        .map(|(index, _)| index)
}

/// Degraded scan over the fixed city zones.
///
/// Scores are the fixed sentinels `70`/`70` with `fallback` set, which callers use to detect this
/// mode. Jobs outside every zone are reported as noise, and zones without jobs are dropped.
pub fn fallback_scan(jobs: Vec<JobPoint>, weather_impact: WeatherImpact) -> ScanResult {
    let mut zone_jobs: [Vec<JobPoint>; 5] = Default::default();
    let mut noise = Vec::new();

    for job in jobs {
        match nearest_zone(&job.point()) {
            Some(index) => zone_jobs[index].push(job),
            None => noise.push(job),
        }
    }

    let clusters = FALLBACK_ZONES
        .iter()
        .zip(zone_jobs)
        .filter(|(_, jobs)| !jobs.is_empty())
        .enumerate()
        .map(|(position, (zone, jobs))| {
            build_cluster(position + 1, zone.center(), jobs, Some(zone.name.to_string()))
        })
        .collect();

    ScanResult {
        clusters,
        noise,
        efficiency_gain: FALLBACK_EFFICIENCY_GAIN,
        optimization_score: FALLBACK_OPTIMIZATION_SCORE,
        weather_impact,
        fallback: true,
    }
}
