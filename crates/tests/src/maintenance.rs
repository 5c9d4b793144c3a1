/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use chrono::{TimeZone, Utc};
use fleet_optimizer_service::common::{
    maintenance::{
        buffer::{SensorBufferStore, SensorSample},
        diagnostics::{
            critical_codes, location_anomalies, vehicle_health_score, DiagnosticCode,
            LocationAnomaly, LocationBounds, LocationReport, PerformanceMetrics, SystemHealth,
        },
        risk::{days_to_maintenance, maintenance_risk_score, NoMaintenanceHistory, NO_TREND_DAYS},
        thresholds::{build_alert, check_threshold, MaintenanceAction},
        trend::analyze_trend,
        MaintenanceError, MaintenancePrediction, PredictiveMaintenance,
    },
    types::*,
};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::sync::Arc;

fn vehicle() -> VehicleId {
    VehicleId("truck-7".to_string())
}

fn at(minute: u32) -> TimeStamp {
    TimeStamp(Utc.with_ymd_and_hms(2024, 1, 15, 8, minute, 0).unwrap())
}

fn predictor() -> PredictiveMaintenance {
    PredictiveMaintenance::new(Arc::new(NoMaintenanceHistory))
}

#[test]
fn buffer_evicts_oldest_after_capacity() {
    let mut buffers = SensorBufferStore::default();
    for i in 0..101 {
        buffers.push(
            &vehicle(),
            SensorType::EngineTemp,
            SensorSample {
                value: f64::from(i),
                timestamp: at(0),
            },
        );
    }

    let values = buffers.values(&vehicle(), SensorType::EngineTemp);
    assert_eq!(values.len(), 100);
    assert_eq!(buffers.len(&vehicle(), SensorType::EngineTemp), 100);
    assert_eq!(values.first(), Some(&1.0));
    assert_eq!(values.last(), Some(&100.0));
    assert!(!values.contains(&0.0));
}

#[test]
fn buffers_are_keyed_by_vehicle_and_sensor() {
    let mut buffers = SensorBufferStore::new(3);
    let other = VehicleId("van-2".to_string());
    let sample = SensorSample {
        value: 12.4,
        timestamp: at(1),
    };

    buffers.push(&vehicle(), SensorType::BatteryVoltage, sample);
    buffers.push(&vehicle(), SensorType::OilPressure, sample);
    buffers.push(&other, SensorType::BatteryVoltage, sample);

    assert_eq!(buffers.len(&vehicle(), SensorType::BatteryVoltage), 1);
    assert_eq!(buffers.len(&other, SensorType::OilPressure), 0);
    assert_eq!(buffers.vehicle_values(&vehicle()).len(), 2);
    assert!(buffers.values(&VehicleId("ghost".to_string()), SensorType::EngineTemp).is_empty());
}

#[test]
fn rising_engine_temperature_turns_critical() {
    assert!(SensorType::EngineTemp.is_higher_worse());
    assert!(!SensorType::OilPressure.is_higher_worse());

    let readings = (90..=106).map(f64::from).collect::<Vec<_>>();
    let levels = readings
        .iter()
        .map(|value| check_threshold(SensorType::EngineTemp, *value).map(|breach| breach.level))
        .collect::<Vec<_>>();

    assert_eq!(levels[5], None);
    assert_eq!(levels[6], Some(AlertLevel::Warning));
    assert_eq!(levels[15], Some(AlertLevel::Warning));
    assert_eq!(levels[16], Some(AlertLevel::Critical));

    let alert = build_alert(&vehicle(), SensorType::EngineTemp, 106.0, at(2))
        .expect("critical reading raises an alert");
    assert!(alert.is_critical());
    assert_eq!(alert.threshold_value, 105.0);
    assert_eq!(alert.action, MaintenanceAction::ImmediateMaintenance);
    assert_eq!(alert.message, "CRITICAL: engine temp above 105°C");
}

#[test]
fn low_pressure_alerts_point_below_threshold() {
    let alert = build_alert(&vehicle(), SensorType::TirePressure, 28.0, at(3))
        .expect("warning reading raises an alert");

    assert_eq!(alert.alert_level, AlertLevel::Warning);
    assert_eq!(alert.action, MaintenanceAction::ScheduleMaintenance);
    assert_eq!(alert.message, "WARNING: tire pressure below 30PSI");
    assert!(build_alert(&vehicle(), SensorType::TirePressure, 32.0, at(3)).is_none());
}

#[test]
fn trend_of_a_straight_line() {
    let trend = analyze_trend(&[1.0, 2.0, 3.0, 4.0]).expect("valid series");

    assert!((trend.slope - 1.0).abs() < 1e-9);
    assert!((trend.intercept - 1.0).abs() < 1e-9);
    assert!((trend.r_squared - 1.0).abs() < 1e-9);

    let flat = analyze_trend(&[5.0; 10]).expect("valid series");
    assert_eq!(flat.slope, 0.0);
    assert_eq!(flat.r_squared, 1.0);
    assert_eq!(flat.variability, 0.0);

    assert_eq!(
        analyze_trend(&[1.0]),
        Err(MaintenanceError::InsufficientData(1))
    );
    assert_eq!(
        analyze_trend(&[1.0, f64::INFINITY]),
        Err(MaintenanceError::NonFiniteReading(1))
    );
}

#[test]
fn days_to_maintenance_follows_the_slope() {
    assert_eq!(days_to_maintenance(SensorType::EngineTemp, 90.0, 0.0005), NO_TREND_DAYS);
    assert!((days_to_maintenance(SensorType::EngineTemp, 90.0, 1.0) - 5.0).abs() < 1e-9);
    assert_eq!(days_to_maintenance(SensorType::EngineTemp, 0.0, 0.01), 365.0);
}

#[test]
fn risk_score_stays_within_bounds() {
    let mut rng = StdRng::seed_from_u64(2024);
    let sensors = [
        SensorType::EngineTemp,
        SensorType::OilPressure,
        SensorType::BrakePadThickness,
        SensorType::MileageSinceService,
    ];

    for _ in 0..500 {
        let sensor = sensors[rng.gen_range(0..sensors.len())];
        let length = rng.gen_range(10..=100);
        let scale = rng.gen_range(0.01..20_000.0);
        let values = (0..length)
            .map(|_| rng.gen_range(-scale..scale))
            .collect::<Vec<f64>>();

        let Ok(trend) = analyze_trend(&values) else {
            assert_eq!(
                predictor().predict(&vehicle(), sensor, &values),
                MaintenancePrediction::unavailable()
            );
            continue;
        };
        let current = *values.last().expect("non empty");
        let risk = maintenance_risk_score(sensor, current, &trend, rng.gen_range(-1.0..2.0));

        assert!((0.0..=1.0).contains(&risk), "risk {risk} for {values:?}");
    }
}

#[test]
fn overflowing_history_degrades_to_no_prediction() {
    let values = (0..10)
        .map(|i| if i % 2 == 0 { 1e200 } else { -1e200 })
        .collect::<Vec<f64>>();

    assert!(matches!(
        analyze_trend(&values),
        Err(MaintenanceError::DegenerateTrend)
    ));

    let prediction = predictor().predict(&vehicle(), SensorType::EngineTemp, &values);

    assert_eq!(prediction, MaintenancePrediction::unavailable());
    assert!(!prediction.maintenance_needed);
    assert_eq!(prediction.confidence, 0.0);
}

#[test]
fn prediction_needs_ten_samples() {
    let predictor = predictor();

    let prediction = predictor.predict(&vehicle(), SensorType::EngineTemp, &[90.0; 9]);

    assert_eq!(prediction, MaintenancePrediction::insufficient_data());
    assert!(!prediction.maintenance_needed);
    assert_eq!(prediction.confidence, 0.0);
}

#[test]
fn overheating_engine_needs_maintenance() {
    let readings = (90..=106).map(f64::from).collect::<Vec<_>>();

    let prediction = predictor().predict(&vehicle(), SensorType::EngineTemp, &readings);

    assert!(prediction.maintenance_needed);
    assert!((0.5..=0.95).contains(&prediction.confidence));
    assert!((0.0..=1.0).contains(&prediction.risk_score));
    assert_eq!(prediction.days_to_maintenance, 11.0);
    assert_eq!(prediction.priority, Priority::Medium);
    assert_eq!(
        prediction.recommended_action,
        "Schedule engine temp maintenance within 11 days"
    );
    let trend = prediction.trend.clone().expect("trend is reported");
    assert_eq!(trend.direction, "increasing");

    let scheduled = prediction.maintenance_date(at(0));
    assert_eq!((scheduled.0 - at(0).0).num_days(), 8);
}

#[test]
fn steady_sensor_operates_normally() {
    let prediction = predictor().predict(&vehicle(), SensorType::BatteryVoltage, &[12.6; 20]);

    assert!(!prediction.maintenance_needed);
    assert_eq!(prediction.days_to_maintenance, NO_TREND_DAYS);
    assert_eq!(prediction.priority, Priority::Low);
    assert_eq!(prediction.recommended_action, "battery voltage operating normally");
    assert_eq!(prediction.confidence, 0.95);
}

#[test]
fn health_score_deductions() {
    let good = Some("good".to_string());
    let healthy = SystemHealth {
        engine_status: good.clone(),
        transmission_status: good.clone(),
        brake_status: good.clone(),
        electrical_status: good.clone(),
    };

    assert_eq!(vehicle_health_score(&healthy, &PerformanceMetrics::default()), 100);

    let worn_brakes = SystemHealth {
        brake_status: Some("worn".to_string()),
        ..healthy.clone()
    };
    let metrics = PerformanceMetrics {
        fuel_efficiency: Some(16.0),
        error_count: Some(6),
    };
    assert_eq!(vehicle_health_score(&worn_brakes, &metrics), 53);

    let unknown = SystemHealth::default();
    let many_errors = PerformanceMetrics {
        fuel_efficiency: None,
        error_count: Some(40),
    };
    assert_eq!(vehicle_health_score(&unknown, &many_errors), 0);
}

#[test]
fn only_known_codes_are_critical() {
    let codes = ["P0301", "P0128", "P0420"]
        .into_iter()
        .map(|code| DiagnosticCode {
            code: code.to_string(),
            description: None,
        })
        .collect::<Vec<_>>();

    let critical = critical_codes(&codes)
        .into_iter()
        .map(|code| code.code)
        .collect::<Vec<_>>();

    assert_eq!(critical, vec!["P0301".to_string(), "P0420".to_string()]);
}

#[test]
fn location_anomalies_for_speed_and_area() {
    let bounds = LocationBounds::default();
    let inside = LocationReport {
        lat: 59.33,
        lng: 18.06,
        speed: Some(80.0),
        heading: None,
        timestamp: None,
    };
    assert!(location_anomalies(&inside, &bounds, 120.0).is_empty());

    let speeding_outside = LocationReport {
        lat: 59.6,
        speed: Some(135.0),
        ..inside
    };
    let anomalies = location_anomalies(&speeding_outside, &bounds, 120.0);

    assert_eq!(
        anomalies,
        vec![
            LocationAnomaly::Overspeeding {
                speed: 135.0,
                speed_limit: 120.0
            },
            LocationAnomaly::OutsideServiceArea {
                location: Point::new(59.6, 18.06)
            },
        ]
    );
}
