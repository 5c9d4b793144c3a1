/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use crate::common::types::*;
use geo::{point, EuclideanDistance};

/// Planar distance between two coordinates, in degrees.
///
/// Latitude and longitude are treated as a flat plane. This only holds at the scale of a single
/// city, which is the scale every clustering threshold in this crate is tuned for.
pub fn euclidean_distance(from: &Point, to: &Point) -> f64 {
    point!(x: from.lng.0, y: from.lat.0).euclidean_distance(&point!(x: to.lng.0, y: to.lat.0))
}

/// Mean distance over every unordered pair of points, `0.0` for fewer than two points.
pub fn average_pairwise_distance(points: &[Point]) -> f64 {
    let mut total = 0.0;
    let mut pairs = 0usize;
    for (index, from) in points.iter().enumerate() {
        for to in points.iter().skip(index + 1) {
            total += euclidean_distance(from, to);
            pairs += 1;
        }
    }
    if pairs == 0 {
        0.0
    } else {
        total / pairs as f64
    }
}

pub fn mean_point(points: &[Point]) -> Option<Point> {
    if points.is_empty() {
        return None;
    }
    let count = points.len() as f64;
    let (lat, lng) = points
        .iter()
        .fold((0.0, 0.0), |(lat, lng), point| (lat + point.lat.0, lng + point.lng.0));
    Some(Point::new(lat / count, lng / count))
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Population variance.
pub fn variance(values: &[f64]) -> Option<f64> {
    let mean = mean(values)?;
    Some(values.iter().map(|value| (value - mean).powi(2)).sum::<f64>() / values.len() as f64)
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
