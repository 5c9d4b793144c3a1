/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use crate::common::types::*;
use serde::{Deserialize, Serialize};

pub const CRITICAL_DIAGNOSTIC_CODES: [&str; 7] =
    ["P0301", "P0302", "P0303", "P0304", "P0171", "P0300", "P0420"];

const GOOD: &str = "good";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiagnosticCode {
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SystemHealth {
    pub engine_status: Option<String>,
    pub transmission_status: Option<String>,
    pub brake_status: Option<String>,
    pub electrical_status: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PerformanceMetrics {
    pub fuel_efficiency: Option<f64>,
    pub error_count: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DiagnosticsReport {
    #[serde(default)]
    pub diagnostic_codes: Vec<DiagnosticCode>,
    #[serde(default)]
    pub system_health: SystemHealth,
    #[serde(default)]
    pub performance_metrics: PerformanceMetrics,
    pub timestamp: Option<TimeStamp>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VehicleHealth {
    pub vehicle_id: VehicleId,
    pub health_score: u8,
    pub critical_codes: Vec<String>,
    pub updated_at: TimeStamp,
}

fn is_good(status: &Option<String>) -> bool {
    status.as_deref() == Some(GOOD)
}

/// Health score in `0..=100`; any subsystem status other than `good`, missing included, costs points.
pub fn vehicle_health_score(health: &SystemHealth, metrics: &PerformanceMetrics) -> u8 {
    let mut score: i64 = 100;

    if !is_good(&health.engine_status) {
        score -= 20;
    }
    if !is_good(&health.transmission_status) {
        score -= 15;
    }
    if !is_good(&health.brake_status) {
        score -= 25;
    }
    if !is_good(&health.electrical_status) {
        score -= 10;
    }

    if metrics.fuel_efficiency.is_some_and(|efficiency| efficiency > 15.0) {
        score -= 10;
    }
    if let Some(error_count) = metrics.error_count.filter(|count| *count > 5) {
        score -= 2 * i64::from(error_count);
    }

    score.clamp(0, 100) as u8
}

pub fn critical_codes(codes: &[DiagnosticCode]) -> Vec<DiagnosticCode> {
    codes
        .iter()
        .filter(|code| CRITICAL_DIAGNOSTIC_CODES.contains(&code.code.as_str()))
        .cloned()
        .collect()
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct LocationBounds {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl Default for LocationBounds {
    fn default() -> Self {
        Self {
            north: 59.4,
            south: 59.2,
            east: 18.2,
            west: 17.9,
        }
    }
}

impl LocationBounds {
    pub fn contains(&self, point: &Point) -> bool {
        (self.south..=self.north).contains(&point.lat.0)
            && (self.west..=self.east).contains(&point.lng.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocationReport {
    pub lat: f64,
    pub lng: f64,
    /// km/h
    pub speed: Option<f64>,
    pub heading: Option<f64>,
    pub timestamp: Option<TimeStamp>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "anomaly", rename_all = "snake_case")]
pub enum LocationAnomaly {
    Overspeeding { speed: f64, speed_limit: f64 },
    OutsideServiceArea { location: Point },
}

pub fn location_anomalies(
    report: &LocationReport,
    bounds: &LocationBounds,
    max_speed_kmh: f64,
) -> Vec<LocationAnomaly> {
    let mut anomalies = Vec::new();

    if let Some(speed) = report.speed.filter(|speed| *speed > max_speed_kmh) {
        anomalies.push(LocationAnomaly::Overspeeding {
            speed,
            speed_limit: max_speed_kmh,
        });
    }

    let location = Point::new(report.lat, report.lng);
    if !bounds.contains(&location) {
        anomalies.push(LocationAnomaly::OutsideServiceArea { location });
    }

    anomalies
}
