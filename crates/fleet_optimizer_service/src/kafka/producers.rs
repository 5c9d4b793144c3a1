/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use super::types::*;
use crate::{
    common::{
        kafka::push_to_kafka,
        maintenance::diagnostics::{DiagnosticCode, LocationAnomaly},
        types::*,
    },
    tools::{error::AppError, prometheus::MAINTENANCE_ALERTS},
};
use rdkafka::producer::FutureProducer;

pub async fn publish_alert(
    producer: &Option<FutureProducer>,
    topic: &str,
    alert: &FleetAlert,
) -> Result<(), AppError> {
    MAINTENANCE_ALERTS
        .with_label_values(&[alert.level().to_string().as_str()])
        .inc();
    push_to_kafka(producer, topic, alert.vehicle_id().0.as_str(), alert).await
}

pub fn diagnostic_alert(
    vehicle_id: &VehicleId,
    codes: Vec<DiagnosticCode>,
    timestamp: TimeStamp,
) -> FleetAlert {
    let message = format!(
        "Critical diagnostic codes detected: {}",
        codes
            .iter()
            .map(|code| code.code.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    FleetAlert::Diagnostic(DiagnosticAlert {
        vehicle_id: vehicle_id.to_owned(),
        alert_type: "diagnostic".to_string(),
        severity: AlertLevel::Critical,
        codes,
        message,
        timestamp,
    })
}

pub fn location_alert(
    vehicle_id: &VehicleId,
    anomaly: LocationAnomaly,
    timestamp: TimeStamp,
) -> FleetAlert {
    FleetAlert::Location(LocationAlert {
        vehicle_id: vehicle_id.to_owned(),
        alert_type: "location".to_string(),
        severity: AlertLevel::Warning,
        anomaly,
        timestamp,
    })
}
