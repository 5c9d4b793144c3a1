/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

//! Density based grouping of a day's moving jobs into crew-sized clusters.
//!
//! `optimizer` is the entry point. It parses the jobs, tightens or loosens the neighbourhood radius
//! for the day's weather and spread, runs `dbscan` and turns index groups into `Cluster` records. Any
//! failure along that path switches to the static zones in `fallback`.

pub mod dbscan;
pub mod epsilon;
pub mod fallback;
pub mod optimizer;
pub mod postprocess;

use crate::common::{types::*, weather::WeatherImpact};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_DURATION_MINUTES: u32 = 120;
pub const DEFAULT_VOLUME: f64 = 15.0;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClusteringError {
    #[error("Jobs must be an array")]
    JobsNotArray,
    #[error("Malformed job at index {0} : {1}")]
    MalformedJob(usize, String),
    #[error("Epsilon must be a positive finite number, got {0}")]
    InvalidEpsilon(f64),
    #[error("Non finite coordinate for job at index {0}")]
    NonFiniteCoordinate(usize),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobPoint {
    pub id: JobId,
    pub lat: Latitude,
    pub lng: Longitude,
    pub estimated_duration_minutes: u32,
    pub volume: f64,
    pub floors: u32,
    pub has_heavy_items: bool,
}

impl JobPoint {
    pub fn point(&self) -> Point {
        Point {
            lat: self.lat,
            lng: self.lng,
        }
    }

    pub fn is_complex(&self) -> bool {
        self.floors > 3 || self.has_heavy_items
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cluster {
    pub cluster_id: usize,
    pub center: Point,
    pub jobs: Vec<JobPoint>,
    pub estimated_duration: u32,
    pub recommended_team_size: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    pub clusters: Vec<Cluster>,
    pub noise: Vec<JobPoint>,
    pub efficiency_gain: u32,
    pub optimization_score: u32,
    pub weather_impact: WeatherImpact,
    pub fallback: bool,
}

/// Job record as it arrives from the scheduling UI, CRM exports and the jobs source.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawJob {
    id: Option<JobId>,
    #[serde(alias = "latitude")]
    lat: Option<LenientNumber>,
    #[serde(alias = "lon", alias = "longitude")]
    lng: Option<LenientNumber>,
    #[serde(
        alias = "estimated_duration_minutes",
        alias = "estimated_duration",
        alias = "estimatedDuration"
    )]
    estimated_duration_minutes: Option<LenientNumber>,
    #[serde(alias = "volume_m3", alias = "estimated_volume", alias = "estimatedVolume")]
    volume: Option<LenientNumber>,
    floors: Option<LenientNumber>,
    #[serde(alias = "has_heavy_items")]
    has_heavy_items: Option<bool>,
    #[serde(alias = "piano_count")]
    piano_count: Option<LenientNumber>,
    #[serde(alias = "appliance_count")]
    appliance_count: Option<LenientNumber>,
}

impl RawJob {
    fn into_job_point(self, id: JobId, default_center: &Point) -> JobPoint {
        let positive = |value: Option<LenientNumber>| {
            value
                .and_then(LenientNumber::finite)
                .filter(|value| *value > 0.0)
        };
        let heavy_items = [self.piano_count, self.appliance_count]
            .into_iter()
            .any(|count| positive(count).is_some());

        JobPoint {
            id,
            lat: Latitude(
                self.lat
                    .and_then(LenientNumber::finite)
                    .unwrap_or(default_center.lat.0),
            ),
            lng: Longitude(
                self.lng
                    .and_then(LenientNumber::finite)
                    .unwrap_or(default_center.lng.0),
            ),
            estimated_duration_minutes: positive(self.estimated_duration_minutes)
                .map(|minutes| minutes.round() as u32)
                .unwrap_or(DEFAULT_DURATION_MINUTES),
            volume: positive(self.volume).unwrap_or(DEFAULT_VOLUME),
            floors: positive(self.floors)
                .map(|floors| floors.floor() as u32)
                .unwrap_or(0),
            has_heavy_items: self.has_heavy_items.unwrap_or(false) || heavy_items,
        }
    }
}

/// Normalises a raw jobs payload into clusterable points.
///
/// Missing coordinates fall back to `default_center`, missing durations to 120 minutes and missing
/// volumes to 15 m³. Only structural problems are errors: a payload that is not an array, or an
/// element that is not a job object with an `id`.
pub fn prepare_job_data(
    jobs: &Value,
    default_center: &Point,
) -> Result<Vec<JobPoint>, ClusteringError> {
    let jobs = jobs.as_array().ok_or(ClusteringError::JobsNotArray)?;

    jobs.iter()
        .enumerate()
        .map(|(index, job)| {
            let raw = RawJob::deserialize(job)
                .map_err(|err| ClusteringError::MalformedJob(index, err.to_string()))?;
            let id = raw.id.clone().ok_or_else(|| {
                ClusteringError::MalformedJob(index, "missing field `id`".to_string())
            })?;
            Ok(raw.into_job_point(id, default_center))
        })
        .collect()
}

/// Best-effort variant of [`prepare_job_data`] for the degraded path.
///
/// Never fails: a payload that is not an array yields no jobs, elements that are not objects are
/// skipped, and jobs without an `id` are named after their position.
pub fn prepare_job_data_leniently(jobs: &Value, default_center: &Point) -> Vec<JobPoint> {
    jobs.as_array()
        .map(|jobs| {
            jobs.iter()
                .enumerate()
                .filter_map(|(index, job)| {
                    let raw = RawJob::deserialize(job).ok()?;
                    let id = raw
                        .id
                        .clone()
                        .unwrap_or_else(|| JobId(format!("job-{index}")));
                    Some(raw.into_job_point(id, default_center))
                })
                .collect()
        })
        .unwrap_or_default()
}
