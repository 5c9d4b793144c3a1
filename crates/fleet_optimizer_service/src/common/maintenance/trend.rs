/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use super::MaintenanceError;
use serde::{Deserialize, Serialize};

/// Least squares fit of readings against their sample index.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TrendAnalysis {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    /// Coefficient of variation, population standard deviation over `|mean|`.
    pub variability: f64,
}

pub fn analyze_trend(values: &[f64]) -> Result<TrendAnalysis, MaintenanceError> {
    if values.len() < 2 {
        return Err(MaintenanceError::InsufficientData(values.len()));
    }
    if let Some(index) = values.iter().position(|value| !value.is_finite()) {
        return Err(MaintenanceError::NonFiniteReading(index));
    }

    let n = values.len() as f64;
    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    let mut sum_xy = 0.0;
    let mut sum_x2 = 0.0;

    for (i, y) in values.iter().enumerate() {
        let x = i as f64;
        sum_x += x;
        sum_y += y;
        sum_xy += x * y;
        sum_x2 += x * x;
    }

    let slope = (n * sum_xy - sum_x * sum_y) / (n * sum_x2 - sum_x * sum_x);
    let intercept = (sum_y - slope * sum_x) / n;

    let mean = sum_y / n;
    let (ss_res, ss_tot) = values
        .iter()
        .enumerate()
        .fold((0.0, 0.0), |(ss_res, ss_tot), (i, y)| {
            let predicted = slope * i as f64 + intercept;
            (ss_res + (y - predicted).powi(2), ss_tot + (y - mean).powi(2))
        });

    // a flat series is fitted exactly
    let r_squared = if ss_tot > 0.0 {
        1.0 - ss_res / ss_tot
    } else {
        1.0
    };

    let std_dev = (ss_tot / n).sqrt();
    let variability = if mean != 0.0 {
        std_dev / mean.abs()
    } else if std_dev == 0.0 {
        0.0
    } else {
        1.0
    };

    let trend = TrendAnalysis {
        slope,
        intercept,
        r_squared,
        variability,
    };

    if [slope, intercept, r_squared, variability]
        .iter()
        .all(|value| value.is_finite())
    {
        Ok(trend)
    } else {
        Err(MaintenanceError::DegenerateTrend)
    }
}
