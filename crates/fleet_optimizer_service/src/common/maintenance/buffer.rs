/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use crate::common::types::*;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use strum::IntoEnumIterator;

pub const SENSOR_BUFFER_CAPACITY: usize = 100;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SensorSample {
    pub value: f64,
    pub timestamp: TimeStamp,
}

/// Rolling sensor history per vehicle and sensor, oldest sample evicted first.
///
/// Owned by the ingestion worker, which is its only writer.
pub struct SensorBufferStore {
    capacity: usize,
    buffers: FxHashMap<VehicleId, FxHashMap<SensorType, VecDeque<SensorSample>>>,
}

impl Default for SensorBufferStore {
    fn default() -> Self {
        Self::new(SENSOR_BUFFER_CAPACITY)
    }
}

impl SensorBufferStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            buffers: FxHashMap::default(),
        }
    }

    /// Appends a sample and returns the buffer length afterwards.
    pub fn push(
        &mut self,
        vehicle_id: &VehicleId,
        sensor_type: SensorType,
        sample: SensorSample,
    ) -> usize {
        let capacity = self.capacity;
        let buffer = self
            .buffers
            .entry(vehicle_id.to_owned())
            .or_default()
            .entry(sensor_type)
            .or_insert_with(|| VecDeque::with_capacity(capacity));

        buffer.push_back(sample);
        while buffer.len() > capacity {
            buffer.pop_front();
        }
        buffer.len()
    }

    pub fn history(&self, vehicle_id: &VehicleId, sensor_type: SensorType) -> Vec<SensorSample> {
        self.buffers
            .get(vehicle_id)
            .and_then(|sensors| sensors.get(&sensor_type))
            .map(|buffer| buffer.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn values(&self, vehicle_id: &VehicleId, sensor_type: SensorType) -> Vec<f64> {
        self.history(vehicle_id, sensor_type)
            .into_iter()
            .map(|sample| sample.value)
            .collect()
    }

    /// Non-empty histories of a vehicle, in sensor declaration order.
    pub fn vehicle_values(&self, vehicle_id: &VehicleId) -> Vec<(SensorType, Vec<f64>)> {
        SensorType::iter()
            .map(|sensor_type| (sensor_type, self.values(vehicle_id, sensor_type)))
            .filter(|(_, values)| !values.is_empty())
            .collect()
    }

    pub fn len(&self, vehicle_id: &VehicleId, sensor_type: SensorType) -> usize {
        self.buffers
            .get(vehicle_id)
            .and_then(|sensors| sensors.get(&sensor_type))
            .map_or(0, VecDeque::len)
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }
}
