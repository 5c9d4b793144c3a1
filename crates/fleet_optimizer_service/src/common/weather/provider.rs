/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use super::{cache::WeatherCache, WeatherData, WeatherReport};
use crate::{
    common::types::ScanDate,
    tools::{callapi::call_api, error::AppError},
};
use async_trait::async_trait;
use reqwest::{Method, Url};
use std::{sync::Arc, time::Duration};
use tokio::time::timeout;
use tracing::{info, warn};

#[async_trait]
pub trait WeatherProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch(&self, date: ScanDate) -> Result<WeatherData, AppError>;
}

/// Reads the day's forecast from `GET {url}?date=YYYY-MM-DD`.
pub struct HttpWeatherProvider {
    pub url: Url,
}

#[async_trait]
impl WeatherProvider for HttpWeatherProvider {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn fetch(&self, ScanDate(date): ScanDate) -> Result<WeatherData, AppError> {
        let mut url = self.url.to_owned();
        url.query_pairs_mut()
            .append_pair("date", &date.format("%Y-%m-%d").to_string());

        call_api::<WeatherData, String>(Method::GET, &url, vec![], None).await
    }
}

/// Serves the same conditions for every date, used when no weather service is configured.
pub struct FixedWeatherProvider(pub WeatherData);

#[async_trait]
impl WeatherProvider for FixedWeatherProvider {
    fn name(&self) -> &'static str {
        "fixed"
    }

    async fn fetch(&self, _date: ScanDate) -> Result<WeatherData, AppError> {
        Ok(self.0)
    }
}

pub struct WeatherService {
    provider: Arc<dyn WeatherProvider>,
    cache: WeatherCache,
    timeout: Duration,
}

impl WeatherService {
    pub fn new(provider: Arc<dyn WeatherProvider>, cache: WeatherCache, timeout: Duration) -> Self {
        Self {
            provider,
            cache,
            timeout,
        }
    }

    pub fn cache(&self) -> &WeatherCache {
        &self.cache
    }

    /// Weather and moving impact for a date.
    ///
    /// Never fails: provider errors and timeouts yield [`WeatherReport::fallback`], which is not
    /// cached so the next request retries upstream.
    pub async fn get_weather(&self, date: ScanDate) -> WeatherReport {
        if let Some(report) = self.cache.get(&date).await {
            return report;
        }

        match timeout(self.timeout, self.provider.fetch(date)).await {
            Ok(Ok(weather)) => {
                let report = WeatherReport::new(date, weather);
                info!(tag = "[Weather Fetched]", provider = self.provider.name(), date = %date.0, extra_time_minutes = report.impact.extra_time_minutes);
                self.cache.insert(report.to_owned()).await;
                report
            }
            Ok(Err(err)) => {
                warn!(tag = "[Weather Fetch Failed - Using Default]", provider = self.provider.name(), date = %date.0, error = %err.message());
                WeatherReport::fallback(date)
            }
            Err(_) => {
                warn!(tag = "[Weather Fetch Timed Out - Using Default]", provider = self.provider.name(), date = %date.0, timeout_ms = self.timeout.as_millis() as u64);
                WeatherReport::fallback(date)
            }
        }
    }
}
