/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

pub mod buffer;
pub mod diagnostics;
pub mod risk;
pub mod thresholds;
pub mod trend;

use self::{
    risk::{days_to_maintenance, maintenance_risk_score, HistoricalRiskModel, NO_TREND_DAYS},
    trend::{analyze_trend, TrendAnalysis},
};
use crate::common::types::*;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

pub const MIN_PREDICTION_SAMPLES: usize = 10;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MaintenanceError {
    #[error("Need at least two readings for a trend, got {0}")]
    InsufficientData(usize),
    #[error("Non finite reading at index {0}")]
    NonFiniteReading(usize),
    #[error("Trend analysis produced non finite values")]
    DegenerateTrend,
    #[error("Risk score is not a finite number")]
    NonFiniteRisk,
}

/// One telemetry sample after ingestion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SensorReading {
    pub vehicle_id: VehicleId,
    pub sensor_type: SensorType,
    pub value: f64,
    pub unit: Option<String>,
    pub timestamp: TimeStamp,
    pub location: Option<Point>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrendSummary {
    pub slope: f64,
    pub direction: String,
    pub variability: f64,
    pub r_squared: f64,
}

impl From<&TrendAnalysis> for TrendSummary {
    fn from(trend: &TrendAnalysis) -> Self {
        Self {
            slope: trend.slope,
            direction: if trend.slope > 0.0 {
                "increasing".to_string()
            } else {
                "decreasing".to_string()
            },
            variability: trend.variability,
            r_squared: trend.r_squared,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MaintenancePrediction {
    pub maintenance_needed: bool,
    pub confidence: f64,
    pub risk_score: f64,
    pub days_to_maintenance: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend: Option<TrendSummary>,
    pub recommended_action: String,
    pub priority: Priority,
}

impl MaintenancePrediction {
    fn without_prediction(recommended_action: &str) -> Self {
        Self {
            maintenance_needed: false,
            confidence: 0.0,
            risk_score: 0.0,
            days_to_maintenance: NO_TREND_DAYS,
            trend: None,
            recommended_action: recommended_action.to_string(),
            priority: Priority::Low,
        }
    }

    pub fn insufficient_data() -> Self {
        Self::without_prediction("Insufficient data for prediction")
    }

    pub fn unavailable() -> Self {
        Self::without_prediction("Prediction unavailable")
    }

    /// Scheduled 20% ahead of the predicted breach, never sooner than tomorrow.
    pub fn maintenance_date(&self, now: TimeStamp) -> TimeStamp {
        let days = (self.days_to_maintenance * 0.8).floor().max(1.0) as i64;
        TimeStamp(now.0 + Duration::days(days))
    }
}

pub fn priority_for(risk_score: f64) -> Priority {
    if risk_score > 0.8 {
        Priority::High
    } else if risk_score > 0.6 {
        Priority::Medium
    } else {
        Priority::Low
    }
}

pub fn recommendation(sensor_type: SensorType, risk_score: f64, days_to_maintenance: f64) -> String {
    let sensor = sensor_type.label();
    if risk_score > 0.8 {
        format!("Immediate inspection of {sensor} required")
    } else if risk_score > 0.6 {
        format!(
            "Schedule {sensor} maintenance within {} days",
            days_to_maintenance.ceil()
        )
    } else if days_to_maintenance < 30.0 {
        format!("Monitor {sensor} closely - maintenance needed soon")
    } else {
        format!("{sensor} operating normally")
    }
}

/// Trend based maintenance scoring over a sensor's rolling history.
pub struct PredictiveMaintenance {
    historical_risk: Arc<dyn HistoricalRiskModel>,
}

impl PredictiveMaintenance {
    pub fn new(historical_risk: Arc<dyn HistoricalRiskModel>) -> Self {
        Self { historical_risk }
    }

    pub fn try_predict(
        &self,
        vehicle_id: &VehicleId,
        sensor_type: SensorType,
        values: &[f64],
    ) -> Result<MaintenancePrediction, MaintenanceError> {
        let trend = analyze_trend(values)?;
        let current_value = *values
            .last()
            .ok_or(MaintenanceError::InsufficientData(0))?;

        let days = days_to_maintenance(sensor_type, current_value, trend.slope);
        let historical_risk = self
            .historical_risk
            .historical_risk(vehicle_id, sensor_type);
        let risk_score = maintenance_risk_score(sensor_type, current_value, &trend, historical_risk);
        if !risk_score.is_finite() {
            return Err(MaintenanceError::NonFiniteRisk);
        }

        Ok(MaintenancePrediction {
            maintenance_needed: risk_score > 0.7 || days < 7.0,
            confidence: (1.0 - trend.variability).clamp(0.6, 0.95),
            risk_score,
            days_to_maintenance: days,
            trend: Some(TrendSummary::from(&trend)),
            recommended_action: recommendation(sensor_type, risk_score, days),
            priority: priority_for(risk_score),
        })
    }

    /// Prediction for the latest history; best effort and never fails.
    ///
    /// Fewer than [`MIN_PREDICTION_SAMPLES`] readings report insufficient data, and analysis errors
    /// degrade to "no maintenance needed" with zero confidence.
    pub fn predict(
        &self,
        vehicle_id: &VehicleId,
        sensor_type: SensorType,
        values: &[f64],
    ) -> MaintenancePrediction {
        if values.len() < MIN_PREDICTION_SAMPLES {
            return MaintenancePrediction::insufficient_data();
        }
        self.try_predict(vehicle_id, sensor_type, values)
            .unwrap_or_else(|err| {
                warn!(tag = "[Predictive Analysis Failed]", vehicle_id = %vehicle_id.0, sensor_type = %sensor_type, error = %err);
                MaintenancePrediction::unavailable()
            })
    }
}
