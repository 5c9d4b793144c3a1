/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use super::trend::TrendAnalysis;
use crate::common::types::{SensorType, VehicleId};

pub const NO_TREND_DAYS: f64 = 999.0;
pub const MAX_PREDICTION_DAYS: f64 = 365.0;

/// Source of the long term component of the risk score.
pub trait HistoricalRiskModel: Send + Sync {
    /// Risk in `[0, 1]` derived from the vehicle's past maintenance on this component.
    fn historical_risk(&self, vehicle_id: &VehicleId, sensor_type: SensorType) -> f64;
}

/// Used until maintenance history is available; contributes nothing to the score.
pub struct NoMaintenanceHistory;

impl HistoricalRiskModel for NoMaintenanceHistory {
    fn historical_risk(&self, _vehicle_id: &VehicleId, _sensor_type: SensorType) -> f64 {
        0.0
    }
}

/// `1.0` past critical, `0.5..=1.0` between warning and critical, `0.1` otherwise.
pub fn proximity_risk(sensor_type: SensorType, current_value: f64) -> f64 {
    let threshold = sensor_type.threshold();
    if sensor_type.exceeds(current_value, threshold.critical) {
        1.0
    } else if sensor_type.exceeds(current_value, threshold.warning) {
        let range = (threshold.critical - threshold.warning).abs();
        let distance = (current_value - threshold.warning).abs();
        0.5 + 0.5 * (1.0 - distance / range)
    } else {
        0.1
    }
}

pub fn trend_risk(sensor_type: SensorType, trend: &TrendAnalysis) -> f64 {
    if !sensor_type.is_worsening(trend.slope) {
        return 0.0;
    }
    (trend.slope.abs() * trend.r_squared.max(0.0) * 10.0).min(1.0)
}

pub fn variability_risk(trend: &TrendAnalysis) -> f64 {
    (trend.variability * 2.0).min(1.0)
}

/// Weighted risk in `[0, 1]`: proximity 0.4, trend 0.3, variability 0.2, history 0.1.
pub fn maintenance_risk_score(
    sensor_type: SensorType,
    current_value: f64,
    trend: &TrendAnalysis,
    historical_risk: f64,
) -> f64 {
    let score = proximity_risk(sensor_type, current_value) * 0.4
        + trend_risk(sensor_type, trend) * 0.3
        + variability_risk(trend) * 0.2
        + historical_risk.clamp(0.0, 1.0) * 0.1;
    score.clamp(0.0, 1.0)
}

/// Samples (one per day) until the reading reaches its warning threshold at the current slope.
pub fn days_to_maintenance(sensor_type: SensorType, current_value: f64, slope: f64) -> f64 {
    if slope.abs() < 0.001 {
        return NO_TREND_DAYS;
    }
    let warning = sensor_type.threshold().warning;
    ((warning - current_value) / slope)
        .abs()
        .clamp(0.0, MAX_PREDICTION_DAYS)
}
