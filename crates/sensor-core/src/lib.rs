//! # Sensor Core
//!
//! This crate provides the protocol and statistics engine of the collector.
//! It defines the binary wire records for readings, queries and responses,
//! the validation rules applied to inbound datagrams, the per-sensor rolling
//! state, and the mapping from queries to responses.
//!
//! Nothing here touches sockets or files; the transport lives in
//! `sensor-server`.
//!
//! ```
//! use sensor_core::{AggregationEngine, decode_query, decode_reading, resolve};
//!
//! let mut engine = AggregationEngine::new();
//! // sensor 1, INT8, value 42
//! let reading = decode_reading(&[1, 1, 42, 0, 0, 0, 0, 0, 0, 0]).unwrap();
//! engine.ingest(&reading);
//!
//! // sensor 1, MEAN_ALL
//! let query = decode_query(&[1, 2]).unwrap();
//! let response = resolve(engine.store(), &query);
//! assert_eq!(response.value.as_f64(), 42.0);
//! ```

pub mod aggregate;
pub mod error;
pub mod query;
pub mod store;
pub mod wire;

pub use aggregate::{mean_of_history, AggregationEngine, SensorSummary};
pub use error::{DecodeError, PacketError, ValidationError};
pub use query::resolve;
pub use store::{History, SensorState, SensorStore, HISTORY_CAPACITY};
pub use wire::{
    decode_query, decode_reading, decode_response, encode_query, encode_reading, encode_response,
    validate_reading, DataType, Payload, Query, QueryKind, RawReading, Response, SensorId,
    SensorReading, QUERY_LEN, READING_LEN, SENSOR_COUNT,
};
