/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use async_trait::async_trait;
use fleet_optimizer_service::{
    common::{
        types::ScanDate,
        weather::{
            cache::WeatherCache,
            calculate_moving_impact,
            provider::{FixedWeatherProvider, WeatherProvider, WeatherService},
            SafetyLevel, WeatherData, WeatherImpact, WeatherReport,
        },
    },
    tools::error::AppError,
};
use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

fn date(value: &str) -> ScanDate {
    ScanDate::parse(value).expect("valid date")
}

struct CountingProvider {
    calls: AtomicUsize,
    weather: WeatherData,
}

#[async_trait]
impl WeatherProvider for CountingProvider {
    fn name(&self) -> &'static str {
        "counting"
    }

    async fn fetch(&self, _date: ScanDate) -> Result<WeatherData, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.weather)
    }
}

struct FailingProvider;

#[async_trait]
impl WeatherProvider for FailingProvider {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn fetch(&self, _date: ScanDate) -> Result<WeatherData, AppError> {
        Err(AppError::ExternalAPICallError("weather api down".to_string()))
    }
}

struct SlowProvider;

#[async_trait]
impl WeatherProvider for SlowProvider {
    fn name(&self) -> &'static str {
        "slow"
    }

    async fn fetch(&self, _date: ScanDate) -> Result<WeatherData, AppError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(WeatherData::default())
    }
}

fn service(provider: Arc<dyn WeatherProvider>) -> WeatherService {
    WeatherService::new(
        provider,
        WeatherCache::new(Duration::from_secs(1800)),
        Duration::from_millis(100),
    )
}

#[test]
fn mild_weather_has_no_impact() {
    let impact = calculate_moving_impact(&WeatherData::default());

    assert_eq!(impact, WeatherImpact::default());
}

#[test]
fn freezing_rain_is_extreme() {
    let weather = WeatherData {
        temperature_avg: -2.0,
        precipitation_mm: 12.0,
        ..WeatherData::default()
    };

    let impact = calculate_moving_impact(&weather);

    assert_eq!(impact.extra_time_minutes, 75);
    assert_eq!(impact.difficulty_multiplier, 2.2);
    assert_eq!(impact.team_size_modifier, 1);
    assert_eq!(impact.safety_level, SafetyLevel::Extreme);
    assert!(impact
        .recommendations
        .iter()
        .any(|recommendation| recommendation.contains("Rain covers")));
}

#[test]
fn safety_level_never_drops() {
    // visibility would only call for medium after freezing cold already set high
    let weather = WeatherData {
        temperature_avg: -15.0,
        visibility_km: 3.0,
        ..WeatherData::default()
    };

    let impact = calculate_moving_impact(&weather);

    assert_eq!(impact.safety_level, SafetyLevel::High);
    assert_eq!(impact.extra_time_minutes, 35);
    assert_eq!(impact.difficulty_multiplier, 1.6);
    assert!(SafetyLevel::Low < SafetyLevel::Medium);
    assert!(SafetyLevel::High < SafetyLevel::Extreme);
    assert_eq!(SafetyLevel::Extreme.to_string(), "extreme");
}

#[test]
fn deep_snow_and_wind_add_up() {
    let weather = WeatherData {
        snow_depth_cm: 15.0,
        wind_speed_ms: 12.0,
        ..WeatherData::default()
    };

    let impact = calculate_moving_impact(&weather);

    assert_eq!(impact.extra_time_minutes, 40);
    assert_eq!(impact.difficulty_multiplier, 1.7);
    assert_eq!(impact.team_size_modifier, 1);
    assert_eq!(impact.safety_level, SafetyLevel::High);
    assert_eq!(impact.recommendations.len(), 4);
}

#[test]
fn impact_serializes_in_camel_case() {
    let report = WeatherReport::fallback(date("2024-01-15"));
    let json = serde_json::to_value(&report).expect("serializable");

    assert_eq!(json["date"], "2024-01-15");
    assert_eq!(json["weather"]["temperature_avg"], 10.0);
    assert_eq!(json["impact"]["extraTimeMinutes"], 0);
    assert_eq!(json["impact"]["safetyLevel"], "low");
}

#[tokio::test]
async fn weather_is_served_from_cache() {
    let provider = Arc::new(CountingProvider {
        calls: AtomicUsize::new(0),
        weather: WeatherData {
            temperature_avg: -5.0,
            ..WeatherData::default()
        },
    });
    let service = service(provider.clone());

    let first = service.get_weather(date("2024-01-15")).await;
    let second = service.get_weather(date("2024-01-15")).await;
    let other_day = service.get_weather(date("2024-01-16")).await;

    assert_eq!(first, second);
    assert_eq!(first.impact.extra_time_minutes, 10);
    assert_eq!(other_day.date, date("2024-01-16"));
    assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    assert_eq!(service.cache().len().await, 2);
}

#[tokio::test]
async fn expired_entries_are_refetched() {
    let provider = Arc::new(CountingProvider {
        calls: AtomicUsize::new(0),
        weather: WeatherData::default(),
    });
    let service = WeatherService::new(
        provider.clone(),
        WeatherCache::new(Duration::from_millis(20)),
        Duration::from_millis(100),
    );

    service.get_weather(date("2024-01-15")).await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    service.get_weather(date("2024-01-15")).await;

    assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn provider_failure_yields_uncached_default() {
    let service = service(Arc::new(FailingProvider));

    let report = service.get_weather(date("2024-02-01")).await;

    assert_eq!(report, WeatherReport::fallback(date("2024-02-01")));
    assert_eq!(report.impact.extra_time_minutes, 0);
    assert!(service.cache().is_empty().await);
}

#[tokio::test]
async fn slow_provider_times_out_to_default() {
    let service = service(Arc::new(SlowProvider));

    let report = service.get_weather(date("2024-02-01")).await;

    assert_eq!(report.impact, WeatherImpact::default());
    assert!(service.cache().is_empty().await);
}

#[tokio::test]
async fn fixed_provider_computes_impact() {
    let service = service(Arc::new(FixedWeatherProvider(WeatherData {
        visibility_km: 0.5,
        ..WeatherData::default()
    })));

    let report = service.get_weather(date("2024-03-01")).await;

    assert_eq!(report.impact.safety_level, SafetyLevel::Extreme);
    assert_eq!(report.impact.extra_time_minutes, 30);
}
