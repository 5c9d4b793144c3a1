/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

pub mod cache;
pub mod provider;

use crate::common::{types::ScanDate, utils::round_to};
use serde::{Deserialize, Serialize};
use strum_macros::Display;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct WeatherData {
    pub temperature_avg: f64,
    pub precipitation_mm: f64,
    pub snow_depth_cm: f64,
    pub wind_speed_ms: f64,
    pub humidity_percent: f64,
    pub visibility_km: f64,
}

impl Default for WeatherData {
    fn default() -> Self {
        Self {
            temperature_avg: 10.0,
            precipitation_mm: 0.0,
            snow_depth_cm: 0.0,
            wind_speed_ms: 5.0,
            humidity_percent: 60.0,
            visibility_km: 15.0,
        }
    }
}

#[derive(
    Debug, Clone, Copy, Default, Display, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SafetyLevel {
    #[default]
    Low,
    Medium,
    High,
    Extreme,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeatherImpact {
    pub extra_time_minutes: u32,
    pub difficulty_multiplier: f64,
    pub recommendations: Vec<String>,
    pub safety_level: SafetyLevel,
    pub team_size_modifier: u32,
}

impl Default for WeatherImpact {
    fn default() -> Self {
        Self {
            extra_time_minutes: 0,
            difficulty_multiplier: 1.0,
            recommendations: Vec::new(),
            safety_level: SafetyLevel::Low,
            team_size_modifier: 0,
        }
    }
}

impl WeatherImpact {
    fn add(&mut self, multiplier: f64, minutes: u32) {
        self.difficulty_multiplier += multiplier;
        self.extra_time_minutes += minutes;
    }

    fn raise_safety(&mut self, level: SafetyLevel) {
        self.safety_level = self.safety_level.max(level);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeatherReport {
    pub date: ScanDate,
    pub weather: WeatherData,
    pub impact: WeatherImpact,
}

impl WeatherReport {
    pub fn new(date: ScanDate, weather: WeatherData) -> Self {
        Self {
            date,
            impact: calculate_moving_impact(&weather),
            weather,
        }
    }

    /// Neutral record served when the provider is unavailable.
    pub fn fallback(date: ScanDate) -> Self {
        Self {
            date,
            weather: WeatherData::default(),
            impact: WeatherImpact::default(),
        }
    }
}

/// Extra time, difficulty and crew adjustments a day's weather imposes on moving jobs.
pub fn calculate_moving_impact(weather: &WeatherData) -> WeatherImpact {
    let mut impact = WeatherImpact::default();

    if weather.temperature_avg < -10.0 {
        impact.add(0.4, 20);
        impact.team_size_modifier += 1;
        impact.raise_safety(SafetyLevel::High);
    } else if weather.temperature_avg < 0.0 {
        impact.add(0.2, 10);
    }

    if weather.temperature_avg > 30.0 {
        impact.add(0.3, 15);
        impact.raise_safety(SafetyLevel::Medium);
    }

    if weather.precipitation_mm > 10.0 {
        impact.add(0.4, 25);
        // freezing rain
        if weather.temperature_avg < 0.0 {
            impact.add(0.6, 40);
            impact.team_size_modifier += 1;
            impact.raise_safety(SafetyLevel::Extreme);
        }
    } else if weather.precipitation_mm > 2.0 {
        impact.add(0.2, 10);
    }

    if weather.snow_depth_cm > 10.0 {
        impact.add(0.6, 30);
        impact.team_size_modifier += 1;
        impact.raise_safety(SafetyLevel::High);
    } else if weather.snow_depth_cm > 5.0 {
        impact.add(0.3, 15);
    }

    if weather.wind_speed_ms > 15.0 {
        impact.add(0.3, 20);
        impact.raise_safety(SafetyLevel::Medium);
    } else if weather.wind_speed_ms > 10.0 {
        impact.add(0.1, 10);
    }

    if weather.visibility_km < 1.0 {
        impact.add(0.5, 30);
        impact.raise_safety(SafetyLevel::Extreme);
    } else if weather.visibility_km < 5.0 {
        impact.add(0.2, 15);
        impact.raise_safety(SafetyLevel::Medium);
    }

    impact.difficulty_multiplier = round_to(impact.difficulty_multiplier, 2);
    impact.recommendations = equipment_recommendations(weather);
    impact
}

pub fn equipment_recommendations(weather: &WeatherData) -> Vec<String> {
    let mut recommendations = Vec::new();
    if weather.temperature_avg < 0.0 {
        recommendations.push("Winter clothing and gloves for the crew".to_string());
        recommendations.push("Bring warm drinks".to_string());
    }
    if weather.precipitation_mm > 2.0 {
        recommendations.push("Rain covers for furniture".to_string());
        recommendations.push("Extra plastic wrapping".to_string());
    }
    if weather.snow_depth_cm > 5.0 {
        recommendations.push("Snow shovel and sand for walkways".to_string());
        recommendations.push("Winter tyres and snow chains".to_string());
    }
    if weather.wind_speed_ms > 10.0 {
        recommendations.push("Extra tape and straps".to_string());
        recommendations.push("Secure light items against wind".to_string());
    }
    recommendations
}
