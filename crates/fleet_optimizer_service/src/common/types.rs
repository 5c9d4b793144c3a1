/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

pub use crate::environment::AppState;

/// Job identifier as sent by the scheduling UI, which uses both numeric and textual ids.
#[derive(Serialize, Clone, Debug, Eq, Hash, PartialEq)]
pub struct JobId(pub String);

impl<'de> Deserialize<'de> for JobId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct JobIdVisitor;

        #[allow(clippy::needless_lifetimes)]
        impl<'de> serde::de::Visitor<'de> for JobIdVisitor {
            type Value = JobId;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("a job id as an integer or a string")
            }

            fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E> {
                Ok(JobId(v.to_string()))
            }

            fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E> {
                Ok(JobId(v.to_string()))
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(JobId(value.to_string()))
            }
        }

        deserializer.deserialize_any(JobIdVisitor)
    }
}

/// A number that upstream systems sometimes send as a string.
///
/// Strings that do not parse become `NaN` so callers can treat them like a missing value.
#[derive(Serialize, Clone, Copy, Debug, PartialEq)]
pub struct LenientNumber(pub f64);

impl LenientNumber {
    pub fn finite(self) -> Option<f64> {
        Some(self.0).filter(|value| value.is_finite())
    }
}

impl<'de> Deserialize<'de> for LenientNumber {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct LenientNumberVisitor;

        #[allow(clippy::needless_lifetimes)]
        impl<'de> serde::de::Visitor<'de> for LenientNumberVisitor {
            type Value = LenientNumber;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str(
                    "a number (integer/float) or a string containing a floating-point number",
                )
            }

            fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E> {
                Ok(LenientNumber(value))
            }

            fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E> {
                Ok(LenientNumber(v as f64))
            }

            fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E> {
                Ok(LenientNumber(v as f64))
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E> {
                Ok(LenientNumber(value.trim().parse::<f64>().unwrap_or(f64::NAN)))
            }
        }

        deserializer.deserialize_any(LenientNumberVisitor)
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct VehicleId(pub String);
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Copy)]
pub struct Latitude(pub f64);
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Copy)]
pub struct Longitude(pub f64);
#[derive(Deserialize, Serialize, Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Hash, Ord)]
pub struct TimeStamp(pub DateTime<Utc>);
#[derive(Deserialize, Serialize, Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Hash, Ord)]
pub struct ScanDate(pub NaiveDate);

impl ScanDate {
    pub fn parse(date: &str) -> Option<Self> {
        NaiveDate::parse_from_str(date, "%Y-%m-%d").ok().map(ScanDate)
    }
}

#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub lat: Latitude,
    pub lng: Longitude,
}

impl Point {
    pub fn new(lat: f64, lng: f64) -> Self {
        Point {
            lat: Latitude(lat),
            lng: Longitude(lng),
        }
    }

    pub fn is_finite(&self) -> bool {
        self.lat.0.is_finite() && self.lng.0.is_finite()
    }
}

#[derive(
    Debug, Clone, Copy, EnumString, EnumIter, Display, Serialize, Deserialize, Eq, Hash, PartialEq,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SensorType {
    EngineTemp,
    OilPressure,
    TirePressure,
    BrakePadThickness,
    BatteryVoltage,
    CoolantLevel,
    TransmissionTemp,
    FuelEfficiency,
    MileageSinceService,
    EngineVibration,
}

impl SensorType {
    /// Human readable name used in alert and recommendation texts, e.g. `engine temp`.
    pub fn label(&self) -> String {
        self.to_string().replace('_', " ")
    }
}

#[derive(
    Debug, Clone, Copy, EnumString, Display, Serialize, Deserialize, Eq, Hash, PartialEq, PartialOrd,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AlertLevel {
    Warning,
    Critical,
}

#[derive(Debug, Clone, Copy, Display, Serialize, Deserialize, Eq, PartialEq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}
