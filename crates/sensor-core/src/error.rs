//! Error types for packet decoding and validation.

use crate::wire::DataType;

/// The datagram does not have the shape of the record it claims to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// Datagram length differs from the fixed record size
    #[error("{record} record must be {expected} bytes, got {actual}")]
    Length {
        /// Record name, for diagnostics
        record: &'static str,
        /// Fixed size of the record
        expected: usize,
        /// Length of the datagram that was received
        actual: usize,
    },
}

/// The record decoded, but one of its fields is not acceptable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Sensor index is negative or not below the sensor count
    #[error("sensor index {0} out of range")]
    SensorOutOfRange(i8),

    /// Type tag is not part of the data type enumeration
    #[error("unknown data type tag {0}")]
    UnknownDataType(i8),

    /// Type tag is known but readings of this type are not ingested
    #[error("data type {0:?} is not accepted on inbound readings")]
    UnsupportedDataType(DataType),

    /// Raw payload exceeds the accepted bound for its type
    #[error("value {value:#x} exceeds the {data_type:?} limit {limit:#x}")]
    ValueOutOfRange {
        /// Declared type of the reading
        data_type: DataType,
        /// Raw payload bits
        value: u64,
        /// Largest accepted raw payload for `data_type`
        limit: u64,
    },

    /// Query kind tag is not one of the defined query kinds
    #[error("unknown query kind {0}")]
    UnknownQueryKind(i8),
}

/// Any reason a datagram is dropped before reaching the aggregation engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PacketError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Result alias for codec operations
pub type Result<T> = std::result::Result<T, PacketError>;
