/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use fleet_optimizer_service::{
    common::{
        clustering::optimizer::ClusteringConfig,
        maintenance::diagnostics::LocationBounds,
        weather::{provider::FixedWeatherProvider, WeatherData},
    },
    environment::{AppConfig, CityCenter, KafkaConfig, WeatherConfig},
    tools::logger::{LogLevel, LoggerConfig},
};

pub fn test_config() -> AppConfig {
    AppConfig {
        port: 8090,
        workers: 1,
        logger_cfg: LoggerConfig {
            level: LogLevel::INFO,
            log_to_file: false,
        },
        request_timeout: 9000,
        max_allowed_req_size: 512_000,
        log_unprocessible_req_body: vec!["UNPROCESSIBLE_REQUEST".to_string()],
        clustering_cfg: ClusteringConfig::default(),
        city_center: CityCenter {
            lat: 59.3293,
            lng: 18.0686,
        },
        weather_cfg: WeatherConfig {
            url: None,
            timeout_ms: 500,
            cache_ttl_secs: 1800,
        },
        kafka_cfg: KafkaConfig {
            kafka_key: "bootstrap.servers".to_string(),
            kafka_host: "localhost:29092".to_string(),
        },
        sensor_topic: "fleet-telemetry".to_string(),
        alerts_topic: "fleet-maintenance-alerts".to_string(),
        consumer_group_id: "fleet-optimizer-service".to_string(),
        ingestion_queue_size: 64,
        persistence_url: None,
        jobs_source_url: None,
        sample_jobs_fallback: false,
        location_bounds: LocationBounds::default(),
        max_speed_kmh: 120.0,
    }
}

pub fn snowy_day() -> FixedWeatherProvider {
    FixedWeatherProvider(WeatherData {
        temperature_avg: -4.0,
        snow_depth_cm: 12.0,
        ..WeatherData::default()
    })
}
