//! Client side of the protocol, used by the `sensor-probe` binary.

use anyhow::{Context, Result};
use sensor_core::{
    decode_response, encode_query, encode_reading, Query, Response, SensorReading, READING_LEN,
};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::UdpSocket;

/// Send readings to the sensor port. No answer is expected.
pub async fn send_readings(
    socket: &UdpSocket,
    target: SocketAddr,
    readings: &[SensorReading],
) -> Result<()> {
    for reading in readings {
        socket
            .send_to(&encode_reading(reading), target)
            .await
            .with_context(|| format!("failed to send reading to {}", target))?;
    }
    Ok(())
}

/// Send one query and wait for its response.
///
/// Returns `Ok(None)` when nothing arrives within `wait`, which is also what a
/// rejected query looks like from the client side.
pub async fn request(
    socket: &UdpSocket,
    target: SocketAddr,
    query: &Query,
    wait: Duration,
) -> Result<Option<Response>> {
    socket
        .send_to(&encode_query(query), target)
        .await
        .with_context(|| format!("failed to send query to {}", target))?;
    await_response(socket, wait).await
}

/// Wait for the next response datagram.
pub async fn await_response(socket: &UdpSocket, wait: Duration) -> Result<Option<Response>> {
    let mut buf = [0u8; READING_LEN * 2];
    match tokio::time::timeout(wait, socket.recv_from(&mut buf)).await {
        Ok(received) => {
            let (len, _) = received.context("failed to receive response")?;
            let response = decode_response(&buf[..len]).context("invalid response")?;
            Ok(Some(response))
        }
        Err(_) => Ok(None),
    }
}

/// Human-readable rendering of a response payload.
pub fn describe(response: &Response) -> String {
    if response.is_no_data() {
        format!("sensor {}: no data", response.sensor)
    } else if response.data_type.is_floating() {
        format!(
            "sensor {}: {:?} {}",
            response.sensor,
            response.data_type,
            response.value.as_f64()
        )
    } else {
        format!(
            "sensor {}: {:?} {}",
            response.sensor,
            response.data_type,
            response.value.bits()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sensor_core::{DataType, Payload, SensorId};

    #[test]
    fn describe_by_type() {
        let sensor = SensorId::new(1).unwrap();
        assert_eq!(describe(&Response::no_data(sensor)), "sensor 1: no data");
        assert_eq!(
            describe(&Response {
                sensor,
                data_type: DataType::Double,
                value: Payload::from_f64(4.5),
            }),
            "sensor 1: Double 4.5"
        );
        assert_eq!(
            describe(&Response {
                sensor,
                data_type: DataType::Int32,
                value: Payload::from_bits(9),
            }),
            "sensor 1: Int32 9"
        );
    }
}
