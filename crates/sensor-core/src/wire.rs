//! # Wire Codec
//!
//! Fixed-layout binary records exchanged over the two UDP ports. All records
//! are packed (no padding) and little-endian.
//!
//! ```text
//! Reading / Response (10 bytes)
//! ┌────────────┬────────────┬──────────────────────────────┐
//! │ sensor i8  │ type i8    │ payload: u64 or f64 bits     │
//! └────────────┴────────────┴──────────────────────────────┘
//!
//! Query (2 bytes)
//! ┌────────────┬────────────┐
//! │ sensor i8  │ kind i8    │
//! └────────────┴────────────┘
//! ```
//!
//! Decoding a reading always validates it: a [`SensorReading`] can only be
//! obtained for a sensor in range, with an inbound-accepted type and a payload
//! within that type's bound.

use serde::{Deserialize, Serialize};

use crate::error::{DecodeError, Result, ValidationError};

/// Number of sensors served by the collector.
pub const SENSOR_COUNT: usize = 10;

/// Size of a reading or response record on the wire.
pub const READING_LEN: usize = 10;

/// Size of a query record on the wire.
pub const QUERY_LEN: usize = 2;

/// Largest raw payload accepted for an `INT8` reading.
pub const INT8_INBOUND_LIMIT: u64 = 0x7F;

/// Largest raw payload accepted for an `INT32` reading.
///
/// Wider than a 32-bit range. This is the legacy bound and is kept as-is.
pub const INT32_INBOUND_LIMIT: u64 = 0x7F_FFFF_FFFF;

/// Field type tag carried by readings and responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(i8)]
pub enum DataType {
    None = 0,
    Int8 = 1,
    Int16 = 2,
    Int32 = 3,
    Int64 = 4,
    Uint8 = 5,
    Uint16 = 6,
    Uint32 = 7,
    Uint64 = 8,
    Float = 9,
    Double = 10,
    CharArray = 11,
    Char = 12,
    Bool = 13,
    /// No data available yet for the queried sensor
    Emcy = 14,
}

impl DataType {
    /// Map a wire tag to a data type.
    pub fn from_tag(tag: i8) -> Option<Self> {
        let data_type = match tag {
            0 => Self::None,
            1 => Self::Int8,
            2 => Self::Int16,
            3 => Self::Int32,
            4 => Self::Int64,
            5 => Self::Uint8,
            6 => Self::Uint16,
            7 => Self::Uint32,
            8 => Self::Uint64,
            9 => Self::Float,
            10 => Self::Double,
            11 => Self::CharArray,
            12 => Self::Char,
            13 => Self::Bool,
            14 => Self::Emcy,
            _ => return None,
        };
        Some(data_type)
    }

    /// Wire tag of this data type.
    pub fn tag(self) -> i8 {
        self as i8
    }

    /// Largest raw payload accepted on an inbound reading of this type.
    ///
    /// `None` means readings of this type are rejected outright.
    pub fn inbound_limit(self) -> Option<u64> {
        match self {
            Self::Int8 => Some(INT8_INBOUND_LIMIT),
            Self::Int32 => Some(INT32_INBOUND_LIMIT),
            Self::Uint64 => Some(u64::MAX),
            _ => None,
        }
    }

    /// Whether the payload of this type holds IEEE-754 bits.
    pub fn is_floating(self) -> bool {
        matches!(self, Self::Double | Self::Float)
    }
}

/// Statistic requested by a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(i8)]
pub enum QueryKind {
    /// Most recent raw value, with its original type
    LastValue = 0,
    /// Mean of the bounded history
    MeanLastK = 1,
    /// Running mean over every reading ever accepted
    MeanAll = 2,
}

impl QueryKind {
    pub const ALL: [QueryKind; 3] = [Self::LastValue, Self::MeanLastK, Self::MeanAll];

    pub fn from_tag(tag: i8) -> Option<Self> {
        match tag {
            0 => Some(Self::LastValue),
            1 => Some(Self::MeanLastK),
            2 => Some(Self::MeanAll),
            _ => None,
        }
    }

    pub fn tag(self) -> i8 {
        self as i8
    }
}

/// Index of a sensor, guaranteed to be below [`SENSOR_COUNT`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct SensorId(u8);

impl SensorId {
    /// Validate a wire sensor index.
    pub fn new(raw: i8) -> std::result::Result<Self, ValidationError> {
        match u8::try_from(raw) {
            Ok(index) if usize::from(index) < SENSOR_COUNT => Ok(Self(index)),
            _ => Err(ValidationError::SensorOutOfRange(raw)),
        }
    }

    /// Every sensor index, in ascending order.
    pub fn all() -> impl Iterator<Item = SensorId> {
        (0..SENSOR_COUNT as u8).map(SensorId)
    }

    pub fn index(self) -> usize {
        usize::from(self.0)
    }

    /// Wire representation of this index.
    pub fn tag(self) -> i8 {
        self.0 as i8
    }
}

impl std::fmt::Display for SensorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 8-byte payload shared by the integer and double interpretations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Payload(u64);

impl Payload {
    pub const ZERO: Payload = Payload(0);

    pub fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    pub fn from_f64(value: f64) -> Self {
        Self(value.to_bits())
    }

    /// Raw payload bits, also the unsigned integer interpretation.
    pub fn bits(self) -> u64 {
        self.0
    }

    /// IEEE-754 interpretation of the payload bits.
    pub fn as_f64(self) -> f64 {
        f64::from_bits(self.0)
    }

    /// Numeric value of the payload when interpreted as `data_type`.
    pub fn numeric(self, data_type: DataType) -> f64 {
        if data_type.is_floating() {
            self.as_f64()
        } else {
            self.0 as f64
        }
    }
}

/// A reading record as it appears on the wire, before validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawReading {
    pub sensor: i8,
    pub data_type: i8,
    pub value: u64,
}

impl RawReading {
    /// Split a datagram into its three fields. Only the length is checked.
    pub fn parse(bytes: &[u8]) -> std::result::Result<Self, DecodeError> {
        let record: &[u8; READING_LEN] = bytes.try_into().map_err(|_| DecodeError::Length {
            record: "reading",
            expected: READING_LEN,
            actual: bytes.len(),
        })?;
        let mut value = [0u8; 8];
        value.copy_from_slice(&record[2..]);
        Ok(Self {
            sensor: record[0] as i8,
            data_type: record[1] as i8,
            value: u64::from_le_bytes(value),
        })
    }

    pub fn encode(&self) -> [u8; READING_LEN] {
        let mut out = [0u8; READING_LEN];
        out[0] = self.sensor as u8;
        out[1] = self.data_type as u8;
        out[2..].copy_from_slice(&self.value.to_le_bytes());
        out
    }
}

/// A validated sensor reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorReading {
    pub sensor: SensorId,
    pub data_type: DataType,
    pub value: Payload,
}

impl SensorReading {
    /// Numeric value used for the running statistics.
    pub fn numeric(&self) -> f64 {
        self.value.numeric(self.data_type)
    }
}

impl From<SensorReading> for RawReading {
    fn from(reading: SensorReading) -> Self {
        Self {
            sensor: reading.sensor.tag(),
            data_type: reading.data_type.tag(),
            value: reading.value.bits(),
        }
    }
}

/// A validated query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Query {
    pub sensor: SensorId,
    pub kind: QueryKind,
}

/// Answer to a query. Same physical shape as a reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Response {
    pub sensor: SensorId,
    pub data_type: DataType,
    pub value: Payload,
}

impl Response {
    /// The `EMCY` marker sent when a sensor has not reported yet.
    pub fn no_data(sensor: SensorId) -> Self {
        Self {
            sensor,
            data_type: DataType::Emcy,
            value: Payload::ZERO,
        }
    }

    pub fn is_no_data(&self) -> bool {
        self.data_type == DataType::Emcy
    }

    /// Numeric value of the payload according to its type.
    pub fn numeric(&self) -> f64 {
        self.value.numeric(self.data_type)
    }
}

/// Check a raw reading against the inbound acceptance rules.
pub fn validate_reading(raw: &RawReading) -> std::result::Result<SensorReading, ValidationError> {
    let sensor = SensorId::new(raw.sensor)?;
    let data_type =
        DataType::from_tag(raw.data_type).ok_or(ValidationError::UnknownDataType(raw.data_type))?;
    let limit = data_type
        .inbound_limit()
        .ok_or(ValidationError::UnsupportedDataType(data_type))?;
    if raw.value > limit {
        return Err(ValidationError::ValueOutOfRange {
            data_type,
            value: raw.value,
            limit,
        });
    }
    Ok(SensorReading {
        sensor,
        data_type,
        value: Payload::from_bits(raw.value),
    })
}

/// Decode and validate a reading datagram.
pub fn decode_reading(bytes: &[u8]) -> Result<SensorReading> {
    let raw = RawReading::parse(bytes)?;
    Ok(validate_reading(&raw)?)
}

pub fn encode_reading(reading: &SensorReading) -> [u8; READING_LEN] {
    RawReading::from(*reading).encode()
}

/// Decode and validate a query datagram.
pub fn decode_query(bytes: &[u8]) -> Result<Query> {
    let record: &[u8; QUERY_LEN] = bytes.try_into().map_err(|_| DecodeError::Length {
        record: "query",
        expected: QUERY_LEN,
        actual: bytes.len(),
    })?;
    let sensor = SensorId::new(record[0] as i8)?;
    let kind_tag = record[1] as i8;
    let kind = QueryKind::from_tag(kind_tag).ok_or(ValidationError::UnknownQueryKind(kind_tag))?;
    Ok(Query { sensor, kind })
}

pub fn encode_query(query: &Query) -> [u8; QUERY_LEN] {
    [query.sensor.tag() as u8, query.kind.tag() as u8]
}

pub fn encode_response(response: &Response) -> [u8; READING_LEN] {
    RawReading {
        sensor: response.sensor.tag(),
        data_type: response.data_type.tag(),
        value: response.value.bits(),
    }
    .encode()
}

/// Decode a response datagram on the client side.
///
/// Only the shape, the sensor index and the type tag are checked; inbound
/// reading bounds do not apply to responses.
pub fn decode_response(bytes: &[u8]) -> Result<Response> {
    let raw = RawReading::parse(bytes)?;
    let sensor = SensorId::new(raw.sensor)?;
    let data_type =
        DataType::from_tag(raw.data_type).ok_or(ValidationError::UnknownDataType(raw.data_type))?;
    Ok(Response {
        sensor,
        data_type,
        value: Payload::from_bits(raw.value),
    })
}
