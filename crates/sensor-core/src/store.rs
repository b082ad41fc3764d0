//! # Sensor State Store
//!
//! Per-sensor rolling state: the last reported type, a bounded history of raw
//! values and the running mean over everything ever accepted. The store is
//! written only by [`crate::AggregationEngine`]; everything else gets a shared
//! borrow.

use crate::wire::{DataType, Payload, SensorId, SENSOR_COUNT};

/// Number of raw values kept per sensor.
pub const HISTORY_CAPACITY: usize = 10;

/// Fixed-capacity ring buffer of raw payload bits.
///
/// Once full, each push overwrites the oldest value. `K` must be non-zero.
#[derive(Debug, Clone)]
pub struct History<const K: usize = HISTORY_CAPACITY> {
    values: [u64; K],
    head: usize, // next slot to write
    len: usize,
}

impl<const K: usize> History<K> {
    pub const fn new() -> Self {
        Self {
            values: [0; K],
            head: 0,
            len: 0,
        }
    }

    /// Append a value, evicting the oldest one when at capacity.
    #[inline]
    pub fn push(&mut self, value: u64) {
        self.values[self.head] = value;
        self.head = (self.head + 1) % K;
        if self.len < K {
            self.len += 1;
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub const fn capacity(&self) -> usize {
        K
    }

    /// Most recently pushed value.
    pub fn newest(&self) -> Option<u64> {
        if self.len == 0 {
            return None;
        }
        Some(self.values[(self.head + K - 1) % K])
    }

    /// Values from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        let start = (self.head + K - self.len) % K;
        (0..self.len).map(move |i| self.values[(start + i) % K])
    }

    /// Arithmetic mean of the held values, `0.0` when empty.
    ///
    /// Values are converted to `f64` and summed oldest first.
    pub fn mean(&self) -> f64 {
        if self.len == 0 {
            return 0.0;
        }
        let sum: f64 = self.iter().map(|v| v as f64).sum();
        sum / self.len as f64
    }
}

impl<const K: usize> Default for History<K> {
    fn default() -> Self {
        Self::new()
    }
}

/// Rolling state of one sensor.
#[derive(Debug, Clone)]
pub struct SensorState {
    pub(crate) last_type: DataType,
    pub(crate) history: History,
    pub(crate) count: u64,
    pub(crate) running_mean: f64,
}

impl SensorState {
    pub fn last_type(&self) -> DataType {
        self.last_type
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Total number of readings ever accepted.
    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn has_data(&self) -> bool {
        self.count > 0
    }

    /// Raw payload of the most recent reading.
    pub fn last_value(&self) -> Option<Payload> {
        self.history.newest().map(Payload::from_bits)
    }

    /// Running mean over all accepted readings; `None` before the first one.
    pub fn running_mean(&self) -> Option<f64> {
        self.has_data().then_some(self.running_mean)
    }
}

impl Default for SensorState {
    fn default() -> Self {
        Self {
            last_type: DataType::None,
            history: History::new(),
            count: 0,
            running_mean: 0.0,
        }
    }
}

/// State for every sensor, indexed by [`SensorId`].
#[derive(Debug, Clone)]
pub struct SensorStore {
    sensors: [SensorState; SENSOR_COUNT],
}

impl SensorStore {
    /// A store where no sensor has reported yet.
    pub fn new() -> Self {
        Self {
            sensors: std::array::from_fn(|_| SensorState::default()),
        }
    }

    pub fn get(&self, sensor: SensorId) -> &SensorState {
        &self.sensors[sensor.index()]
    }

    pub(crate) fn get_mut(&mut self, sensor: SensorId) -> &mut SensorState {
        &mut self.sensors[sensor.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (SensorId, &SensorState)> {
        SensorId::all().zip(self.sensors.iter())
    }
}

impl Default for SensorStore {
    fn default() -> Self {
        Self::new()
    }
}
