//! # Aggregation Engine
//!
//! Owns the [`SensorStore`] and applies validated readings to it.

use serde::Serialize;

use crate::store::{SensorState, SensorStore};
use crate::wire::{DataType, SensorId, SensorReading};

/// Sole writer of the sensor state.
#[derive(Debug, Default)]
pub struct AggregationEngine {
    store: SensorStore,
}

impl AggregationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a validated reading to its sensor's state.
    ///
    /// The running mean is seeded with the first value and then updated
    /// incrementally, so it covers every reading ever accepted, not only the
    /// ones still in the history.
    pub fn ingest(&mut self, reading: &SensorReading) {
        let state = self.store.get_mut(reading.sensor);
        state.count += 1;
        state.history.push(reading.value.bits());
        state.last_type = reading.data_type;

        let value = reading.numeric();
        if state.count == 1 {
            state.running_mean = value;
        } else {
            state.running_mean += (value - state.running_mean) / state.count as f64;
        }
    }

    /// Read-only view of the state, for the query resolver.
    pub fn store(&self) -> &SensorStore {
        &self.store
    }

    /// Summaries of every sensor that has reported at least once.
    pub fn snapshot(&self) -> Vec<SensorSummary> {
        self.store
            .iter()
            .filter(|(_, state)| state.has_data())
            .map(|(sensor, state)| SensorSummary::new(sensor, state))
            .collect()
    }
}

/// Mean of the values currently held in the bounded history.
///
/// Returns `0.0` for an empty history; check [`SensorState::count`] before
/// trusting that value.
pub fn mean_of_history(state: &SensorState) -> f64 {
    state.history().mean()
}

/// Serialisable statistics of one sensor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorSummary {
    pub sensor: SensorId,
    pub count: u64,
    pub last_type: DataType,
    pub last_value: Option<u64>,
    pub mean_last_k: Option<f64>,
    pub mean_all: Option<f64>,
}

impl SensorSummary {
    pub fn new(sensor: SensorId, state: &SensorState) -> Self {
        Self {
            sensor,
            count: state.count(),
            last_type: state.last_type(),
            last_value: state.last_value().map(|v| v.bits()),
            mean_last_k: state.has_data().then(|| mean_of_history(state)),
            mean_all: state.running_mean(),
        }
    }
}
