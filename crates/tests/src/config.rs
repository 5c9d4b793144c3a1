/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use fleet_optimizer_service::{
    environment::read_dhall_config, tools::logger::LogLevel,
};

#[test]
fn sample_config_is_valid() {
    let config = read_dhall_config("../../dhall_config/fleet_optimizer_service.dhall")
        .expect("sample config parses");

    assert_eq!(config.port, 8090);
    assert!(matches!(config.logger_cfg.level, LogLevel::INFO));
    assert_eq!(config.clustering_cfg.base_epsilon, 0.008);
    assert_eq!(config.clustering_cfg.min_samples, 2);
    assert_eq!(config.weather_cfg.url, None);
    assert_eq!(config.weather_cfg.cache_ttl_secs, 1800);
    assert_eq!(config.persistence_url, None);
    assert!(!config.sample_jobs_fallback);
    assert_eq!(config.location_bounds.north, 59.4);
    assert_eq!(config.max_speed_kmh, 120.0);
}

#[test]
fn missing_config_is_an_error() {
    assert!(read_dhall_config("./does/not/exist.dhall").is_err());
}
