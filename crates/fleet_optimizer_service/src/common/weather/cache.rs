/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use super::WeatherReport;
use crate::common::types::ScanDate;
use rustc_hash::FxHashMap;
use std::time::Duration;
use tokio::{sync::RwLock, time::Instant};

/// Date keyed weather reports shared by all requests, each valid for `ttl` after it was stored.
///
/// Two requests missing on the same date may both fetch upstream; the later insert wins.
pub struct WeatherCache {
    ttl: Duration,
    entries: RwLock<FxHashMap<ScanDate, (Instant, WeatherReport)>>,
}

impl WeatherCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(FxHashMap::default()),
        }
    }

    pub async fn get(&self, date: &ScanDate) -> Option<WeatherReport> {
        let entries = self.entries.read().await;
        entries
            .get(date)
            .filter(|(stored_at, _)| stored_at.elapsed() < self.ttl)
            .map(|(_, report)| report.to_owned())
    }

    /// Stores a report and drops every entry that has outlived the TTL.
    pub async fn insert(&self, report: WeatherReport) {
        let mut entries = self.entries.write().await;
        entries.retain(|_, (stored_at, _)| stored_at.elapsed() < self.ttl);
        entries.insert(report.date, (Instant::now(), report));
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
