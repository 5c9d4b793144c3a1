/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use crate::{
    common::{
        maintenance::{
            buffer::{SensorBufferStore, SensorSample},
            diagnostics::{
                critical_codes, location_anomalies, vehicle_health_score, DiagnosticsReport,
                LocationAnomaly, LocationBounds, LocationReport, VehicleHealth,
            },
            risk::HistoricalRiskModel,
            thresholds::{build_alert, MaintenanceAlert},
            MaintenancePrediction, PredictiveMaintenance, SensorReading,
        },
        types::*,
    },
    ingestion_latency,
    kafka::{
        producers::{diagnostic_alert, location_alert, publish_alert},
        types::{parse_fleet_topic, FleetAlert, FleetMessageKind, SensorPayload},
    },
    outbound::{
        external::MaintenanceStore,
        types::{ScheduledMaintenance, WorkOrder, WorkOrderStatus},
    },
    tools::{
        error::AppError,
        prometheus::{INGESTION_LATENCY, SENSOR_READINGS_PROCESSED},
    },
};
use chrono::Utc;
use rdkafka::{
    consumer::{Consumer, StreamConsumer},
    Message,
};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};
use tokio::{
    sync::{mpsc, oneshot},
    time::{interval, timeout, Instant},
};
use tracing::{error, info, warn};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SensorPrediction {
    pub sensor_type: SensorType,
    #[serde(flatten)]
    pub prediction: MaintenancePrediction,
}

/// Work for the ingestion worker, the single owner of the sensor buffers.
#[derive(Debug)]
pub enum IngestionCommand {
    Reading(SensorReading),
    Diagnostics {
        vehicle_id: VehicleId,
        report: DiagnosticsReport,
    },
    Location {
        vehicle_id: VehicleId,
        report: LocationReport,
    },
    Predictions {
        vehicle_id: VehicleId,
        reply: oneshot::Sender<Vec<SensorPrediction>>,
    },
    Health {
        vehicle_id: VehicleId,
        reply: oneshot::Sender<Option<VehicleHealth>>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReadingOutcome {
    pub alert: Option<MaintenanceAlert>,
    pub prediction: MaintenancePrediction,
}

pub struct IngestionSettings {
    pub alerts_topic: String,
    pub location_bounds: LocationBounds,
    pub max_speed_kmh: f64,
    pub buffer_capacity: usize,
}

/// Processes telemetry for every vehicle: buffers readings, raises alerts and schedules maintenance.
pub struct SensorIngestion {
    buffers: SensorBufferStore,
    health: FxHashMap<VehicleId, VehicleHealth>,
    predictor: PredictiveMaintenance,
    store: Arc<dyn MaintenanceStore>,
    producer: Option<rdkafka::producer::FutureProducer>,
    settings: IngestionSettings,
}

impl SensorIngestion {
    pub fn new(
        store: Arc<dyn MaintenanceStore>,
        producer: Option<rdkafka::producer::FutureProducer>,
        historical_risk: Arc<dyn HistoricalRiskModel>,
        settings: IngestionSettings,
    ) -> Self {
        Self {
            buffers: SensorBufferStore::new(settings.buffer_capacity),
            health: FxHashMap::default(),
            predictor: PredictiveMaintenance::new(historical_risk),
            store,
            producer,
            settings,
        }
    }

    pub fn buffers(&self) -> &SensorBufferStore {
        &self.buffers
    }

    pub async fn process_reading(&mut self, reading: SensorReading) -> ReadingOutcome {
        let start_time = Instant::now();
        SENSOR_READINGS_PROCESSED
            .with_label_values(&[reading.sensor_type.to_string().as_str()])
            .inc();

        if let Err(err) = self.store.record_sensor_reading(&reading).await {
            error!(tag = "[Sensor Reading Persist Failed]", vehicle_id = %reading.vehicle_id.0, error = %err.message());
        }

        self.buffers.push(
            &reading.vehicle_id,
            reading.sensor_type,
            SensorSample {
                value: reading.value,
                timestamp: reading.timestamp,
            },
        );

        let alert = build_alert(
            &reading.vehicle_id,
            reading.sensor_type,
            reading.value,
            reading.timestamp,
        );
        if let Some(alert) = &alert {
            self.trigger_maintenance_alert(alert).await;
        }

        let values = self.buffers.values(&reading.vehicle_id, reading.sensor_type);
        let prediction = self
            .predictor
            .predict(&reading.vehicle_id, reading.sensor_type, &values);

        if prediction.maintenance_needed {
            let schedule = ScheduledMaintenance {
                vehicle_id: reading.vehicle_id.to_owned(),
                sensor_type: reading.sensor_type,
                scheduled_date: prediction.maintenance_date(TimeStamp(Utc::now())),
                prediction: prediction.to_owned(),
            };
            info!(tag = "[Predictive Maintenance Scheduled]", vehicle_id = %reading.vehicle_id.0, sensor_type = %reading.sensor_type, risk_score = prediction.risk_score, scheduled_date = %schedule.scheduled_date.0);
            if let Err(err) = self.store.schedule_maintenance(&schedule).await {
                error!(tag = "[Maintenance Schedule Failed]", vehicle_id = %reading.vehicle_id.0, error = %err.message());
            }
        }

        ingestion_latency!("sensors", start_time);
        ReadingOutcome { alert, prediction }
    }

    async fn trigger_maintenance_alert(&self, alert: &MaintenanceAlert) {
        warn!(tag = "[Maintenance Alert]", vehicle_id = %alert.vehicle_id.0, message = %alert.message);
        self.raise(FleetAlert::Maintenance(alert.to_owned())).await;

        if alert.is_critical() {
            let work_order = WorkOrder {
                vehicle_id: alert.vehicle_id.to_owned(),
                priority: Priority::High,
                description: format!("Critical maintenance required: {}", alert.message),
                status: WorkOrderStatus::Pending,
                created_at: TimeStamp(Utc::now()),
            };
            if let Err(err) = self.store.create_work_order(&work_order).await {
                error!(tag = "[Work Order Failed]", vehicle_id = %alert.vehicle_id.0, error = %err.message());
            }
        }
    }

    async fn raise(&self, alert: FleetAlert) {
        if let Err(err) =
            publish_alert(&self.producer, &self.settings.alerts_topic, &alert).await
        {
            error!(tag = "[Alert Publish Failed]", vehicle_id = %alert.vehicle_id().0, error = %err.message());
        }
        if let Err(err) = self.store.record_alert(&alert).await {
            error!(tag = "[Alert Persist Failed]", vehicle_id = %alert.vehicle_id().0, error = %err.message());
        }
    }

    pub async fn process_diagnostics(
        &mut self,
        vehicle_id: VehicleId,
        report: DiagnosticsReport,
    ) -> VehicleHealth {
        let start_time = Instant::now();
        let timestamp = report.timestamp.unwrap_or(TimeStamp(Utc::now()));

        let critical = critical_codes(&report.diagnostic_codes);
        if !critical.is_empty() {
            self.raise(diagnostic_alert(&vehicle_id, critical.to_owned(), timestamp))
                .await;
        }

        let health = VehicleHealth {
            vehicle_id: vehicle_id.to_owned(),
            health_score: vehicle_health_score(&report.system_health, &report.performance_metrics),
            critical_codes: critical.into_iter().map(|code| code.code).collect(),
            updated_at: timestamp,
        };
        if let Err(err) = self.store.update_vehicle_health(&health).await {
            error!(tag = "[Vehicle Health Persist Failed]", vehicle_id = %vehicle_id.0, error = %err.message());
        }
        self.health.insert(vehicle_id, health.to_owned());

        ingestion_latency!("diagnostics", start_time);
        health
    }

    pub async fn process_location(
        &mut self,
        vehicle_id: VehicleId,
        report: LocationReport,
    ) -> Vec<LocationAnomaly> {
        let timestamp = report.timestamp.unwrap_or(TimeStamp(Utc::now()));
        let anomalies = location_anomalies(
            &report,
            &self.settings.location_bounds,
            self.settings.max_speed_kmh,
        );
        for anomaly in anomalies.iter() {
            warn!(tag = "[Location Anomaly]", vehicle_id = %vehicle_id.0, anomaly = ?anomaly);
            self.raise(location_alert(&vehicle_id, anomaly.to_owned(), timestamp))
                .await;
        }
        anomalies
    }

    pub fn predictions(&self, vehicle_id: &VehicleId) -> Vec<SensorPrediction> {
        self.buffers
            .vehicle_values(vehicle_id)
            .into_iter()
            .map(|(sensor_type, values)| SensorPrediction {
                sensor_type,
                prediction: self.predictor.predict(vehicle_id, sensor_type, &values),
            })
            .collect()
    }

    pub fn health(&self, vehicle_id: &VehicleId) -> Option<VehicleHealth> {
        self.health.get(vehicle_id).cloned()
    }

    pub async fn handle(&mut self, command: IngestionCommand) {
        match command {
            IngestionCommand::Reading(reading) => {
                self.process_reading(reading).await;
            }
            IngestionCommand::Diagnostics { vehicle_id, report } => {
                self.process_diagnostics(vehicle_id, report).await;
            }
            IngestionCommand::Location { vehicle_id, report } => {
                self.process_location(vehicle_id, report).await;
            }
            IngestionCommand::Predictions { vehicle_id, reply } => {
                let _ = reply.send(self.predictions(&vehicle_id));
            }
            IngestionCommand::Health { vehicle_id, reply } => {
                let _ = reply.send(self.health(&vehicle_id));
            }
        }
    }
}

/// Turns a raw telemetry message into a worker command.
///
/// `route` is the message key, or the topic when the key is absent, and follows the
/// `fleet/vehicles/{vehicleId}/...` layout.
pub fn decode_fleet_message(route: &str, payload: &[u8]) -> Result<IngestionCommand, AppError> {
    let topic = parse_fleet_topic(route)
        .ok_or_else(|| AppError::InvalidRequest(format!("Unknown fleet topic : {route}")))?;

    let command = match topic.kind {
        FleetMessageKind::Sensors => {
            let payload = serde_json::from_slice::<SensorPayload>(payload)
                .map_err(|err| AppError::DeserializationError(err.to_string()))?;
            IngestionCommand::Reading(SensorReading {
                vehicle_id: topic.vehicle_id,
                sensor_type: payload.sensor_type,
                value: payload.value,
                unit: payload.unit,
                timestamp: payload.timestamp.unwrap_or(TimeStamp(Utc::now())),
                location: payload.location,
            })
        }
        FleetMessageKind::Diagnostics => IngestionCommand::Diagnostics {
            vehicle_id: topic.vehicle_id,
            report: serde_json::from_slice(payload)
                .map_err(|err| AppError::DeserializationError(err.to_string()))?,
        },
        FleetMessageKind::Location => IngestionCommand::Location {
            vehicle_id: topic.vehicle_id,
            report: serde_json::from_slice(payload)
                .map_err(|err| AppError::DeserializationError(err.to_string()))?,
        },
    };

    Ok(command)
}

/// Drives the ingestion worker until shutdown is requested or every sender is dropped.
///
/// On shutdown the channel is closed and every command already queued is still handled.
pub async fn run_ingestion_worker(
    mut rx: mpsc::Receiver<IngestionCommand>,
    mut ingestion: SensorIngestion,
    graceful_termination_requested: Arc<AtomicBool>,
) {
    let mut shutdown_check = interval(Duration::from_secs(1));
    loop {
        if graceful_termination_requested.load(Ordering::Relaxed) {
            info!(tag = "[Graceful Shutting Down]", worker = "sensor-ingestion");
            rx.close();
            let mut drained = 0;
            while let Some(command) = rx.recv().await {
                ingestion.handle(command).await;
                drained += 1;
            }
            if drained > 0 {
                info!(tag = "[Force Draining Queue]", length = %drained);
            }
            break;
        }
        tokio::select! {
            command = rx.recv() => {
                match command {
                    Some(command) => ingestion.handle(command).await,
                    None => break,
                }
            },
            _ = shutdown_check.tick() => {},
        }
    }
}

/// Forwards telemetry from Kafka to the ingestion worker.
///
/// Undecodable messages are logged and skipped so one bad producer never stalls the stream.
pub async fn run_sensor_consumer(
    consumer: StreamConsumer,
    sender: mpsc::Sender<IngestionCommand>,
    graceful_termination_requested: Arc<AtomicBool>,
) {
    loop {
        if graceful_termination_requested.load(Ordering::Relaxed) {
            info!(tag = "[Graceful Shutting Down]", worker = "sensor-consumer");
            consumer.unsubscribe();
            break;
        }

        let message = match timeout(Duration::from_secs(1), consumer.recv()).await {
            Err(_) => continue,
            Ok(Err(err)) => {
                error!(tag = "[Kafka Consume Failed]", error = %err);
                continue;
            }
            Ok(Ok(message)) => message,
        };

        let route = message
            .key()
            .and_then(|key| std::str::from_utf8(key).ok())
            .unwrap_or(message.topic())
            .to_string();

        let Some(payload) = message.payload() else {
            warn!(tag = "[Empty Fleet Message]", route = %route);
            continue;
        };

        match decode_fleet_message(&route, payload) {
            Ok(command) => {
                if let Err(err) = sender.send(command).await {
                    error!(tag = "[Ingestion Queue Closed]", error = %err);
                    break;
                }
            }
            Err(err) => {
                warn!(tag = "[Invalid Fleet Message]", route = %route, error = %err.message());
            }
        }
    }
}
