/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use crate::common::types::*;
use serde::{Deserialize, Serialize};
use strum_macros::Display;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorThreshold {
    pub critical: f64,
    pub warning: f64,
    pub unit: &'static str,
}

impl SensorType {
    pub fn threshold(&self) -> SensorThreshold {
        let (critical, warning, unit) = match self {
            SensorType::EngineTemp => (105.0, 95.0, "°C"),
            SensorType::OilPressure => (15.0, 25.0, "PSI"),
            SensorType::TirePressure => (25.0, 30.0, "PSI"),
            SensorType::BrakePadThickness => (2.0, 4.0, "mm"),
            SensorType::BatteryVoltage => (11.5, 12.0, "V"),
            SensorType::CoolantLevel => (20.0, 30.0, "%"),
            SensorType::TransmissionTemp => (120.0, 100.0, "°C"),
            SensorType::FuelEfficiency => (15.0, 12.0, "L/100km"),
            SensorType::MileageSinceService => (12000.0, 10000.0, "km"),
            SensorType::EngineVibration => (8.5, 7.0, "Hz"),
        };
        SensorThreshold {
            critical,
            warning,
            unit,
        }
    }

    /// Whether rising readings mean a worsening component, e.g. temperatures and vibration.
    pub fn is_higher_worse(&self) -> bool {
        matches!(
            self,
            SensorType::EngineTemp
                | SensorType::TransmissionTemp
                | SensorType::FuelEfficiency
                | SensorType::MileageSinceService
                | SensorType::EngineVibration
        )
    }

    /// Strictly past `threshold` in the worsening direction.
    pub fn exceeds(&self, value: f64, threshold: f64) -> bool {
        if self.is_higher_worse() {
            value > threshold
        } else {
            value < threshold
        }
    }

    pub fn is_worsening(&self, slope: f64) -> bool {
        if self.is_higher_worse() {
            slope > 0.0
        } else {
            slope < 0.0
        }
    }

    fn comparison(&self) -> &'static str {
        if self.is_higher_worse() {
            "above"
        } else {
            "below"
        }
    }
}

#[derive(Debug, Clone, Copy, Display, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MaintenanceAction {
    ImmediateMaintenance,
    ScheduleMaintenance,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdBreach {
    pub level: AlertLevel,
    pub threshold_value: f64,
}

/// Static threshold check, run on every reading regardless of how much history exists.
pub fn check_threshold(sensor_type: SensorType, value: f64) -> Option<ThresholdBreach> {
    let threshold = sensor_type.threshold();
    if sensor_type.exceeds(value, threshold.critical) {
        Some(ThresholdBreach {
            level: AlertLevel::Critical,
            threshold_value: threshold.critical,
        })
    } else if sensor_type.exceeds(value, threshold.warning) {
        Some(ThresholdBreach {
            level: AlertLevel::Warning,
            threshold_value: threshold.warning,
        })
    } else {
        None
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MaintenanceAlert {
    pub vehicle_id: VehicleId,
    pub sensor_type: SensorType,
    pub alert_level: AlertLevel,
    pub current_value: f64,
    pub threshold_value: f64,
    pub unit: String,
    pub message: String,
    pub action: MaintenanceAction,
    pub timestamp: TimeStamp,
}

impl MaintenanceAlert {
    pub fn is_critical(&self) -> bool {
        self.alert_level == AlertLevel::Critical
    }
}

/// Alert record for a reading past its warning or critical threshold, e.g.
/// `CRITICAL: engine temp above 105°C`.
pub fn build_alert(
    vehicle_id: &VehicleId,
    sensor_type: SensorType,
    value: f64,
    timestamp: TimeStamp,
) -> Option<MaintenanceAlert> {
    let breach = check_threshold(sensor_type, value)?;
    let unit = sensor_type.threshold().unit;
    let action = match breach.level {
        AlertLevel::Critical => MaintenanceAction::ImmediateMaintenance,
        AlertLevel::Warning => MaintenanceAction::ScheduleMaintenance,
    };

    Some(MaintenanceAlert {
        vehicle_id: vehicle_id.to_owned(),
        sensor_type,
        alert_level: breach.level,
        current_value: value,
        threshold_value: breach.threshold_value,
        unit: unit.to_string(),
        message: format!(
            "{}: {} {} {}{}",
            breach.level.to_string().to_uppercase(),
            sensor_type.label(),
            sensor_type.comparison(),
            breach.threshold_value,
            unit
        ),
        action,
        timestamp,
    })
}
