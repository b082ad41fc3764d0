//! Exercise a running collector.
//!
//! Sends `--count` INT32 readings `0..count` for one sensor, then asks for
//! each statistic and prints the answers.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin sensor-probe -- --sensor 1 --count 10
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use sensor_core::{DataType, Payload, Query, QueryKind, SensorId, SensorReading};
use sensor_server::probe::{describe, request, send_readings};
use std::net::{SocketAddr, ToSocketAddrs};
use std::time::Duration;
use tokio::net::UdpSocket;

#[derive(Parser)]
#[command(name = "sensor-probe")]
#[command(about = "Send test readings and queries to a sensor-server")]
struct Args {
    /// Collector host
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Sensor reading port
    #[arg(long, default_value = "12345")]
    sensor_port: u16,

    /// Query port
    #[arg(long, default_value = "12346")]
    query_port: u16,

    /// Sensor index to report as and query
    #[arg(long, default_value = "1", allow_negative_numbers = true)]
    sensor: i8,

    /// Number of readings to send (0 = queries only)
    #[arg(long, default_value = "10")]
    count: u64,

    /// How long to wait for each response (milliseconds)
    #[arg(long, default_value = "1000")]
    timeout_ms: u64,
}

fn resolve_addr(host: &str, port: u16) -> Result<SocketAddr> {
    (host, port)
        .to_socket_addrs()
        .with_context(|| format!("failed to resolve {}:{}", host, port))?
        .next()
        .with_context(|| format!("no address for {}:{}", host, port))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let sensor = SensorId::new(args.sensor)?;
    let sensor_addr = resolve_addr(&args.host, args.sensor_port)?;
    let query_addr = resolve_addr(&args.host, args.query_port)?;
    let wait = Duration::from_millis(args.timeout_ms);

    let socket = UdpSocket::bind("0.0.0.0:0")
        .await
        .context("failed to bind probe socket")?;

    let readings: Vec<SensorReading> = (0..args.count)
        .map(|value| SensorReading {
            sensor,
            data_type: DataType::Int32,
            value: Payload::from_bits(value),
        })
        .collect();
    send_readings(&socket, sensor_addr, &readings).await?;
    log::info!("Sent {} readings for sensor {} to {}", readings.len(), sensor, sensor_addr);

    for kind in QueryKind::ALL {
        let query = Query { sensor, kind };
        match request(&socket, query_addr, &query, wait).await {
            Ok(Some(response)) => log::info!("{:?} -> {}", kind, describe(&response)),
            Ok(None) => log::warn!("{:?}: no response within {:?}", kind, wait),
            Err(e) => log::warn!("{:?}: {:#}", kind, e),
        }
    }

    Ok(())
}
