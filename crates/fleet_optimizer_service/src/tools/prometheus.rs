/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
#![allow(clippy::expect_used)]

use actix_web_prom::{PrometheusMetrics, PrometheusMetricsBuilder};
use prometheus::{
    opts, register_histogram_vec, register_int_counter, register_int_counter_vec, HistogramVec,
    IntCounter, IntCounterVec,
};

pub static INCOMING_API: once_cell::sync::Lazy<HistogramVec> = once_cell::sync::Lazy::new(|| {
    register_histogram_vec!(
        opts!("http_request_duration_seconds", "Incoming API requests").into(),
        &["method", "handler", "status_code", "code", "version"]
    )
    .expect("Failed to register incoming API metrics")
});

pub static CALL_EXTERNAL_API: once_cell::sync::Lazy<HistogramVec> =
    once_cell::sync::Lazy::new(|| {
        register_histogram_vec!(
            opts!("external_request_duration", "Call external API requests").into(),
            &["method", "host", "service", "status"]
        )
        .expect("Failed to register call external API metrics")
    });

pub static INGESTION_LATENCY: once_cell::sync::Lazy<HistogramVec> =
    once_cell::sync::Lazy::new(|| {
        register_histogram_vec!(
            opts!("sensor_ingestion_latency", "Sensor Ingestion Monitoring").into(),
            &["type"]
        )
        .expect("Failed to register sensor ingestion latency metrics")
    });

pub static CLUSTERING_FALLBACKS: once_cell::sync::Lazy<IntCounter> =
    once_cell::sync::Lazy::new(|| {
        register_int_counter!(
            "clustering_fallbacks",
            "Scans served by the static zone grouper"
        )
        .expect("Failed to register clustering fallback metrics")
    });

pub static SENSOR_READINGS_PROCESSED: once_cell::sync::Lazy<IntCounterVec> =
    once_cell::sync::Lazy::new(|| {
        register_int_counter_vec!(
            opts!("sensor_readings_processed", "Sensor readings processed"),
            &["sensor_type"]
        )
        .expect("Failed to register sensor readings metrics")
    });

pub static MAINTENANCE_ALERTS: once_cell::sync::Lazy<IntCounterVec> =
    once_cell::sync::Lazy::new(|| {
        register_int_counter_vec!(
            opts!("maintenance_alerts", "Maintenance alerts raised"),
            &["level"]
        )
        .expect("Failed to register maintenance alert metrics")
    });

/// Observes the duration of an incoming API request.
///
/// * `$method` - HTTP method of the request.
/// * `$endpoint` - Route of the request with path params replaced by placeholders.
/// * `$status` - HTTP status code of the response.
/// * `$code` - Error code of the response or `SUCCESS`.
/// * `$start` - Instant at which the request was received.
#[macro_export]
macro_rules! incoming_api {
    ($method:expr, $endpoint:expr, $status:expr, $code:expr, $start:expr) => {
        let duration = $start.elapsed().as_secs_f64();
        let version = std::env::var("DEPLOYMENT_VERSION").unwrap_or("DEV".to_string());
        INCOMING_API
            .with_label_values(&[$method, $endpoint, $status, $code, version.as_str()])
            .observe(duration);
    };
}

#[macro_export]
macro_rules! call_external_api {
    ($method:expr, $host:expr, $path:expr, $status:expr, $start:expr) => {
        let duration = $start.elapsed().as_secs_f64();
        CALL_EXTERNAL_API
            .with_label_values(&[$method, $host, $path, $status])
            .observe(duration);
    };
}

/// Observes how long the ingestion worker spent on one message of the given kind.
#[macro_export]
macro_rules! ingestion_latency {
    ($type:expr, $start:expr) => {
        let duration = $start.elapsed().as_secs_f64();
        INGESTION_LATENCY
            .with_label_values(&[$type])
            .observe(duration);
    };
}

/// Builds the `/metrics` middleware and registers the service's collectors on its registry.
///
/// # Panics
///
/// * If the registry cannot be built or a collector fails to register.
pub fn prometheus_metrics() -> PrometheusMetrics {
    let prometheus = PrometheusMetricsBuilder::new("api")
        .endpoint("/metrics")
        .build()
        .expect("Failed to create Prometheus Metrics");

    prometheus
        .registry
        .register(Box::new(INCOMING_API.to_owned()))
        .expect("Failed to register incoming API metrics");

    prometheus
        .registry
        .register(Box::new(CALL_EXTERNAL_API.to_owned()))
        .expect("Failed to register call external API metrics");

    prometheus
        .registry
        .register(Box::new(INGESTION_LATENCY.to_owned()))
        .expect("Failed to register sensor ingestion latency metrics");

    prometheus
        .registry
        .register(Box::new(CLUSTERING_FALLBACKS.to_owned()))
        .expect("Failed to register clustering fallback metrics");

    prometheus
        .registry
        .register(Box::new(SENSOR_READINGS_PROCESSED.to_owned()))
        .expect("Failed to register sensor readings metrics");

    prometheus
        .registry
        .register(Box::new(MAINTENANCE_ALERTS.to_owned()))
        .expect("Failed to register maintenance alert metrics");

    prometheus
}
