//! Glue between raw datagrams, the aggregation engine and the reading log.

use sensor_core::{
    decode_query, decode_reading, encode_response, resolve, AggregationEngine, PacketError,
    SensorReading, SensorSummary, READING_LEN,
};
use sensor_log::ReadingSink;

/// Collector state owned by the event loop.
pub struct Collector<S> {
    engine: AggregationEngine,
    sink: S,
}

impl<S: ReadingSink> Collector<S> {
    pub fn new(sink: S) -> Self {
        Self {
            engine: AggregationEngine::new(),
            sink,
        }
    }

    /// Decode, validate and ingest a datagram from the sensor port.
    ///
    /// The reading is passed to the sink after ingestion. A sink failure is
    /// logged and does not reject the reading.
    pub fn handle_reading(
        &mut self,
        bytes: &[u8],
        timestamp: u64,
    ) -> Result<SensorReading, PacketError> {
        let reading = decode_reading(bytes)?;
        self.engine.ingest(&reading);
        if let Err(e) = self.sink.record(&reading, timestamp) {
            log::error!("Failed to log reading from sensor {}: {:#}", reading.sensor, e);
        }
        Ok(reading)
    }

    /// Decode a datagram from the query port and build the encoded response.
    pub fn handle_query(&self, bytes: &[u8]) -> Result<[u8; READING_LEN], PacketError> {
        let query = decode_query(bytes)?;
        let response = resolve(self.engine.store(), &query);
        Ok(encode_response(&response))
    }

    pub fn snapshot(&self) -> Vec<SensorSummary> {
        self.engine.snapshot()
    }

    pub fn engine(&self) -> &AggregationEngine {
        &self.engine
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;
    use sensor_core::{
        decode_response, encode_reading, DataType, Payload, RawReading, SensorId, ValidationError,
    };
    use sensor_log::MemorySink;

    fn reading_bytes(sensor: i8, data_type: DataType, value: u64) -> [u8; READING_LEN] {
        RawReading {
            sensor,
            data_type: data_type.tag(),
            value,
        }
        .encode()
    }

    struct FailingSink;

    impl ReadingSink for FailingSink {
        fn record(&mut self, _reading: &SensorReading, _timestamp: u64) -> anyhow::Result<()> {
            bail!("disk full")
        }
    }

    #[test]
    fn accepted_reading_is_ingested_and_logged() {
        let mut collector = Collector::new(MemorySink::default());
        let reading = collector
            .handle_reading(&reading_bytes(2, DataType::Int8, 9), 100)
            .unwrap();
        assert_eq!(reading.sensor.index(), 2);
        assert_eq!(collector.sink().lines, vec!["100,2,9".to_string()]);
        assert_eq!(collector.snapshot().len(), 1);
    }

    #[test]
    fn rejected_reading_touches_nothing() {
        let mut collector = Collector::new(MemorySink::default());
        let err = collector
            .handle_reading(&reading_bytes(10, DataType::Int8, 1), 100)
            .unwrap_err();
        assert_eq!(
            err,
            PacketError::Validation(ValidationError::SensorOutOfRange(10))
        );
        assert!(collector
            .handle_reading(&reading_bytes(0, DataType::Int32, 0x80_0000_0000), 100)
            .is_err());
        assert!(collector.handle_reading(&[0, 1, 2], 100).is_err());

        assert!(collector.sink().lines.is_empty());
        assert!(collector.snapshot().is_empty());
    }

    #[test]
    fn sink_failure_does_not_reject_reading() {
        let mut collector = Collector::new(FailingSink);
        assert!(collector
            .handle_reading(&reading_bytes(1, DataType::Uint64, 5), 0)
            .is_ok());
        let state = collector.engine().store().get(SensorId::new(1).unwrap());
        assert_eq!(state.count(), 1);
    }

    #[test]
    fn query_roundtrip_through_bytes() {
        let mut collector = Collector::new(MemorySink::default());
        let sent = SensorReading {
            sensor: SensorId::new(6).unwrap(),
            data_type: DataType::Int32,
            value: Payload::from_bits(0x7F_FFFF_FFFF),
        };
        collector.handle_reading(&encode_reading(&sent), 0).unwrap();

        let bytes = collector.handle_query(&[6, 0]).unwrap();
        let response = decode_response(&bytes).unwrap();
        assert_eq!(response.data_type, DataType::Int32);
        assert_eq!(response.value, sent.value);

        let empty = decode_response(&collector.handle_query(&[5, 1]).unwrap()).unwrap();
        assert!(empty.is_no_data());
    }

    #[test]
    fn malformed_query_is_rejected() {
        let collector = Collector::new(MemorySink::default());
        assert!(collector.handle_query(&[0, 3]).is_err());
        assert!(collector.handle_query(&[0, 0, 0]).is_err());
        assert!(collector.handle_query(&[]).is_err());
    }
}
