/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
#![allow(clippy::expect_used)]

use crate::{
    common::{
        clustering::optimizer::{ClusteringConfig, ClusteringOptimizer},
        maintenance::{buffer::SENSOR_BUFFER_CAPACITY, diagnostics::LocationBounds},
        types::*,
        weather::{
            cache::WeatherCache,
            provider::{FixedWeatherProvider, HttpWeatherProvider, WeatherProvider, WeatherService},
            WeatherData,
        },
    },
    ingestion::{IngestionCommand, IngestionSettings},
    outbound::{
        external::{HttpMaintenanceStore, InMemoryMaintenanceStore, MaintenanceStore},
        jobs::{HttpJobsSource, JobsSource, NoJobsSource},
    },
    tools::logger::LoggerConfig,
};
use rdkafka::{
    consumer::StreamConsumer, error::KafkaError, producer::FutureProducer, ClientConfig,
};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::{sync::Arc, time::Duration};
use tokio::sync::mpsc::Sender;
use tracing::info;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub workers: usize,
    pub logger_cfg: LoggerConfig,
    pub request_timeout: u64,
    pub max_allowed_req_size: usize,
    pub log_unprocessible_req_body: Vec<String>,
    pub clustering_cfg: ClusteringConfig,
    pub city_center: CityCenter,
    pub weather_cfg: WeatherConfig,
    pub kafka_cfg: KafkaConfig,
    pub sensor_topic: String,
    pub alerts_topic: String,
    pub consumer_group_id: String,
    pub ingestion_queue_size: usize,
    pub persistence_url: Option<String>,
    pub jobs_source_url: Option<String>,
    pub sample_jobs_fallback: bool,
    pub location_bounds: LocationBounds,
    pub max_speed_kmh: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy)]
pub struct CityCenter {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct WeatherConfig {
    pub url: Option<String>,
    pub timeout_ms: u64,
    pub cache_ttl_secs: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct KafkaConfig {
    pub kafka_key: String,
    pub kafka_host: String,
}

pub fn read_dhall_config(config_path: &str) -> Result<AppConfig, String> {
    let config = serde_dhall::from_file(config_path).parse::<AppConfig>();
    match config {
        Ok(config) => Ok(config),
        Err(e) => Err(format!("Error reading config: {}", e)),
    }
}

/// Collaborators behind the service's trait seams, swapped for in-memory ones in tests.
pub struct AppDependencies {
    pub producer: Option<FutureProducer>,
    pub weather_provider: Arc<dyn WeatherProvider>,
    pub jobs_source: Arc<dyn JobsSource>,
    pub maintenance_store: Arc<dyn MaintenanceStore>,
}

impl AppDependencies {
    pub fn from_config(app_config: &AppConfig) -> Self {
        let producer: Option<FutureProducer>;

        let result: Result<FutureProducer, KafkaError> = ClientConfig::new()
            .set(
                app_config.kafka_cfg.kafka_key.as_str(),
                app_config.kafka_cfg.kafka_host.as_str(),
            )
            .set("compression.type", "lz4")
            .create();

        match result {
            Ok(val) => {
                producer = Some(val);
            }
            Err(err) => {
                producer = None;
                info!(
                    tag = "[Kafka Connection]",
                    "Error connecting to kafka config: {err}"
                );
            }
        }

        let weather_provider: Arc<dyn WeatherProvider> = match &app_config.weather_cfg.url {
            Some(url) => Arc::new(HttpWeatherProvider {
                url: Url::parse(url).expect("Failed to parse weather_cfg.url."),
            }),
            None => Arc::new(FixedWeatherProvider(WeatherData::default())),
        };

        let jobs_source: Arc<dyn JobsSource> = match &app_config.jobs_source_url {
            Some(url) => Arc::new(HttpJobsSource {
                url: Url::parse(url).expect("Failed to parse jobs_source_url."),
            }),
            None => Arc::new(NoJobsSource),
        };

        let maintenance_store: Arc<dyn MaintenanceStore> = match &app_config.persistence_url {
            Some(url) => {
                let url = if url.ends_with('/') {
                    url.to_owned()
                } else {
                    format!("{url}/")
                };
                Arc::new(HttpMaintenanceStore {
                    base_url: Url::parse(&url).expect("Failed to parse persistence_url."),
                })
            }
            None => Arc::new(InMemoryMaintenanceStore::default()),
        };

        Self {
            producer,
            weather_provider,
            jobs_source,
            maintenance_store,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub optimizer: ClusteringOptimizer,
    pub weather: Arc<WeatherService>,
    pub jobs_source: Arc<dyn JobsSource>,
    pub maintenance_store: Arc<dyn MaintenanceStore>,
    pub producer: Option<FutureProducer>,
    pub sender: Sender<IngestionCommand>,
    pub alerts_topic: String,
    pub location_bounds: LocationBounds,
    pub max_speed_kmh: f64,
    pub sample_jobs_fallback: bool,
    pub max_allowed_req_size: usize,
    pub log_unprocessible_req_body: Vec<String>,
    pub request_timeout: u64,
}

impl AppState {
    pub async fn new(app_config: AppConfig, sender: Sender<IngestionCommand>) -> AppState {
        let dependencies = AppDependencies::from_config(&app_config);
        AppState::with_dependencies(app_config, sender, dependencies)
    }

    pub fn with_dependencies(
        app_config: AppConfig,
        sender: Sender<IngestionCommand>,
        dependencies: AppDependencies,
    ) -> AppState {
        let weather = WeatherService::new(
            dependencies.weather_provider,
            WeatherCache::new(Duration::from_secs(app_config.weather_cfg.cache_ttl_secs)),
            Duration::from_millis(app_config.weather_cfg.timeout_ms),
        );

        AppState {
            optimizer: ClusteringOptimizer::new(
                app_config.clustering_cfg,
                Point::new(app_config.city_center.lat, app_config.city_center.lng),
            ),
            weather: Arc::new(weather),
            jobs_source: dependencies.jobs_source,
            maintenance_store: dependencies.maintenance_store,
            producer: dependencies.producer,
            sender,
            alerts_topic: app_config.alerts_topic,
            location_bounds: app_config.location_bounds,
            max_speed_kmh: app_config.max_speed_kmh,
            sample_jobs_fallback: app_config.sample_jobs_fallback,
            max_allowed_req_size: app_config.max_allowed_req_size,
            log_unprocessible_req_body: app_config.log_unprocessible_req_body,
            request_timeout: app_config.request_timeout,
        }
    }

    pub fn ingestion_settings(&self) -> IngestionSettings {
        IngestionSettings {
            alerts_topic: self.alerts_topic.to_owned(),
            location_bounds: self.location_bounds,
            max_speed_kmh: self.max_speed_kmh,
            buffer_capacity: SENSOR_BUFFER_CAPACITY,
        }
    }
}

/// Subscribes a consumer to the telemetry topic, `None` when Kafka is unreachable.
pub fn create_sensor_consumer(app_config: &AppConfig) -> Option<StreamConsumer> {
    use rdkafka::consumer::Consumer;

    let result: Result<StreamConsumer, KafkaError> = ClientConfig::new()
        .set(
            app_config.kafka_cfg.kafka_key.as_str(),
            app_config.kafka_cfg.kafka_host.as_str(),
        )
        .set("group.id", app_config.consumer_group_id.as_str())
        .set("enable.auto.commit", "true")
        .set("auto.offset.reset", "latest")
        .create();

    match result.and_then(|consumer| {
        consumer.subscribe(&[app_config.sensor_topic.as_str()])?;
        Ok(consumer)
    }) {
        Ok(consumer) => Some(consumer),
        Err(err) => {
            info!(
                tag = "[Kafka Connection]",
                "Error creating sensor consumer: {err}"
            );
            None
        }
    }
}
