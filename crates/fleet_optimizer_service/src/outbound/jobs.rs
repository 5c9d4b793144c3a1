/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use crate::{
    common::types::ScanDate,
    tools::{callapi::call_api, error::AppError},
};
use async_trait::async_trait;
use reqwest::{Method, Url};
use serde_json::{json, Value};

/// Where the day's booked jobs come from, as raw job records.
#[async_trait]
pub trait JobsSource: Send + Sync {
    async fn jobs_for_date(&self, date: ScanDate) -> Result<Vec<Value>, AppError>;
}

/// Reads jobs from `GET {url}?date=YYYY-MM-DD`.
pub struct HttpJobsSource {
    pub url: Url,
}

#[async_trait]
impl JobsSource for HttpJobsSource {
    async fn jobs_for_date(&self, ScanDate(date): ScanDate) -> Result<Vec<Value>, AppError> {
        let mut url = self.url.to_owned();
        url.query_pairs_mut()
            .append_pair("date", &date.format("%Y-%m-%d").to_string());

        call_api::<Vec<Value>, String>(Method::GET, &url, vec![], None).await
    }
}

/// No upstream configured, every date has no jobs.
pub struct NoJobsSource;

#[async_trait]
impl JobsSource for NoJobsSource {
    async fn jobs_for_date(&self, _date: ScanDate) -> Result<Vec<Value>, AppError> {
        Ok(Vec::new())
    }
}

/// Demo jobs around central Stockholm, served only when `sample_jobs_fallback` is enabled.
pub fn sample_jobs() -> Vec<Value> {
    vec![
        json!({
            "id": 1,
            "lat": 59.3293,
            "lng": 18.0686,
            "estimatedDurationMinutes": 180,
            "volume": 25,
            "floors": 2,
            "hasHeavyItems": false
        }),
        json!({
            "id": 2,
            "lat": 59.3326,
            "lng": 18.0649,
            "estimatedDurationMinutes": 120,
            "volume": 15,
            "floors": 4,
            "hasHeavyItems": true
        }),
        json!({
            "id": 3,
            "lat": 59.3165,
            "lng": 18.0840,
            "estimatedDurationMinutes": 240,
            "volume": 40,
            "floors": 1,
            "hasHeavyItems": false
        }),
    ]
}
