/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use crate::common::{
    maintenance::{
        diagnostics::{DiagnosticCode, LocationAnomaly},
        thresholds::MaintenanceAlert,
    },
    types::*,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

#[allow(clippy::expect_used)]
static FLEET_TOPIC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^fleet/vehicles/([^/]+)/(sensors(?:/[a-z_]+)?|diagnostics|location)$")
        .expect("Invalid fleet topic pattern")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FleetMessageKind {
    Sensors,
    Diagnostics,
    Location,
}

/// Route of an inbound telemetry message, `fleet/vehicles/{vehicleId}/sensors/{sensorType}`,
/// `fleet/vehicles/{vehicleId}/diagnostics` or `fleet/vehicles/{vehicleId}/location`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FleetTopic {
    pub vehicle_id: VehicleId,
    pub kind: FleetMessageKind,
}

pub fn parse_fleet_topic(topic: &str) -> Option<FleetTopic> {
    let captures = FLEET_TOPIC.captures(topic)?;
    let vehicle_id = VehicleId(captures.get(1)?.as_str().to_string());
    let kind = match captures.get(2)?.as_str() {
        "diagnostics" => FleetMessageKind::Diagnostics,
        "location" => FleetMessageKind::Location,
        _ => FleetMessageKind::Sensors,
    };
    Some(FleetTopic { vehicle_id, kind })
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SensorPayload {
    pub sensor_type: SensorType,
    pub value: f64,
    pub timestamp: Option<TimeStamp>,
    pub unit: Option<String>,
    pub location: Option<Point>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiagnosticAlert {
    pub vehicle_id: VehicleId,
    pub alert_type: String,
    pub severity: AlertLevel,
    pub codes: Vec<DiagnosticCode>,
    pub message: String,
    pub timestamp: TimeStamp,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocationAlert {
    pub vehicle_id: VehicleId,
    pub alert_type: String,
    pub severity: AlertLevel,
    #[serde(flatten)]
    pub anomaly: LocationAnomaly,
    pub timestamp: TimeStamp,
}

/// Everything published on the alerts topic.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FleetAlert {
    Maintenance(MaintenanceAlert),
    Diagnostic(DiagnosticAlert),
    Location(LocationAlert),
}

impl FleetAlert {
    pub fn vehicle_id(&self) -> &VehicleId {
        match self {
            FleetAlert::Maintenance(alert) => &alert.vehicle_id,
            FleetAlert::Diagnostic(alert) => &alert.vehicle_id,
            FleetAlert::Location(alert) => &alert.vehicle_id,
        }
    }

    pub fn level(&self) -> AlertLevel {
        match self {
            FleetAlert::Maintenance(alert) => alert.alert_level,
            FleetAlert::Diagnostic(alert) => alert.severity,
            FleetAlert::Location(alert) => alert.severity,
        }
    }
}
