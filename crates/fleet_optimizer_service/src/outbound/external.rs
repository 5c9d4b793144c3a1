/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use super::types::*;
use crate::{
    common::maintenance::{diagnostics::VehicleHealth, SensorReading},
    kafka::types::FleetAlert,
    tools::{callapi::call_api, error::AppError},
};
use async_trait::async_trait;
use reqwest::{Method, Url};
use serde::Serialize;
use std::fmt::Debug;
use tokio::sync::Mutex;

/// Persistence for readings, alerts, work orders and schedules, owned by the fleet backend.
#[async_trait]
pub trait MaintenanceStore: Send + Sync {
    async fn record_sensor_reading(&self, reading: &SensorReading) -> Result<(), AppError>;

    async fn record_alert(&self, alert: &FleetAlert) -> Result<(), AppError>;

    async fn create_work_order(&self, work_order: &WorkOrder) -> Result<(), AppError>;

    async fn schedule_maintenance(&self, schedule: &ScheduledMaintenance) -> Result<(), AppError>;

    async fn update_vehicle_health(&self, health: &VehicleHealth) -> Result<(), AppError>;
}

pub struct HttpMaintenanceStore {
    pub base_url: Url,
}

impl HttpMaintenanceStore {
    async fn post<T>(&self, path: &str, body: &T) -> Result<(), AppError>
    where
        T: Serialize + Debug + Sync,
    {
        let url = self
            .base_url
            .join(path)
            .map_err(|err| AppError::InternalError(format!("Invalid persistence url : {err}")))?;

        call_api::<APISuccess, &T>(
            Method::POST,
            &url,
            vec![("content-type", "application/json")],
            Some(body),
        )
        .await
        .map(|_| ())
    }
}

#[async_trait]
impl MaintenanceStore for HttpMaintenanceStore {
    async fn record_sensor_reading(&self, reading: &SensorReading) -> Result<(), AppError> {
        self.post("sensor-readings", reading).await
    }

    async fn record_alert(&self, alert: &FleetAlert) -> Result<(), AppError> {
        self.post("maintenance-alerts", alert).await
    }

    async fn create_work_order(&self, work_order: &WorkOrder) -> Result<(), AppError> {
        self.post("work-orders", work_order).await
    }

    async fn schedule_maintenance(&self, schedule: &ScheduledMaintenance) -> Result<(), AppError> {
        self.post("maintenance-schedule", schedule).await
    }

    async fn update_vehicle_health(&self, health: &VehicleHealth) -> Result<(), AppError> {
        self.post("vehicle-health", health).await
    }
}

/// Keeps every record in memory, used when no persistence service is configured and in tests.
#[derive(Default)]
pub struct InMemoryMaintenanceStore {
    pub readings: Mutex<Vec<SensorReading>>,
    pub alerts: Mutex<Vec<FleetAlert>>,
    pub work_orders: Mutex<Vec<WorkOrder>>,
    pub schedules: Mutex<Vec<ScheduledMaintenance>>,
    pub health: Mutex<Vec<VehicleHealth>>,
}

#[async_trait]
impl MaintenanceStore for InMemoryMaintenanceStore {
    async fn record_sensor_reading(&self, reading: &SensorReading) -> Result<(), AppError> {
        self.readings.lock().await.push(reading.to_owned());
        Ok(())
    }

    async fn record_alert(&self, alert: &FleetAlert) -> Result<(), AppError> {
        self.alerts.lock().await.push(alert.to_owned());
        Ok(())
    }

    async fn create_work_order(&self, work_order: &WorkOrder) -> Result<(), AppError> {
        self.work_orders.lock().await.push(work_order.to_owned());
        Ok(())
    }

    async fn schedule_maintenance(&self, schedule: &ScheduledMaintenance) -> Result<(), AppError> {
        self.schedules.lock().await.push(schedule.to_owned());
        Ok(())
    }

    async fn update_vehicle_health(&self, health: &VehicleHealth) -> Result<(), AppError> {
        self.health.lock().await.push(health.to_owned());
        Ok(())
    }
}
