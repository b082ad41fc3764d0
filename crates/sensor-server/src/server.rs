//! Single-threaded UDP event loop
//!
//! One task waits on both sockets, the statistics ticker and the shutdown
//! signal. All state lives in the [`Collector`] owned by the loop, so there is
//! no locking.
//!
//! ```text
//! sensor port ──► decode/validate ──► ingest ──► reading log
//! query port  ──► decode/validate ──► resolve ──► send response to peer
//! ticker      ──► log statistics snapshot
//! ```

use anyhow::{Context, Result};
use sensor_log::{unix_timestamp, ReadingSink};
use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::collector::Collector;
use crate::config::NetworkConfig;

/// Receive buffer size. Larger datagrams are truncated and fail the length check.
const MAX_DATAGRAM_SIZE: usize = 100;

/// Bind the sensor and query sockets.
pub async fn bind_sockets(network: &NetworkConfig) -> Result<(UdpSocket, UdpSocket)> {
    let bind = network.bind_address.as_str();
    let sensor_socket = UdpSocket::bind((bind, network.sensor_port))
        .await
        .with_context(|| format!("failed to bind sensor port {}:{}", bind, network.sensor_port))?;
    let query_socket = UdpSocket::bind((bind, network.query_port))
        .await
        .with_context(|| format!("failed to bind query port {}:{}", bind, network.query_port))?;
    Ok((sensor_socket, query_socket))
}

/// The collector service: two sockets and the state they feed.
pub struct Server<S> {
    sensor_socket: UdpSocket,
    query_socket: UdpSocket,
    collector: Collector<S>,
    stats_interval: Duration,
}

impl<S: ReadingSink> Server<S> {
    pub fn new(
        sensor_socket: UdpSocket,
        query_socket: UdpSocket,
        collector: Collector<S>,
        stats_interval: Duration,
    ) -> Self {
        Self {
            sensor_socket,
            query_socket,
            collector,
            stats_interval,
        }
    }

    /// Addresses the sensor and query sockets are bound to.
    pub fn local_addrs(&self) -> Result<(SocketAddr, SocketAddr)> {
        Ok((
            self.sensor_socket.local_addr()?,
            self.query_socket.local_addr()?,
        ))
    }

    /// Serve until `shutdown` completes, then hand the collector back.
    ///
    /// Sensor datagrams are polled first so that readings already queued are
    /// applied before a query arriving after them is answered. A missed
    /// statistics tick is delayed, never replayed.
    pub async fn run<F>(mut self, shutdown: F) -> Result<Collector<S>>
    where
        F: Future<Output = ()>,
    {
        let mut ticker = time::interval_at(Instant::now() + self.stats_interval, self.stats_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut sensor_buf = [0u8; MAX_DATAGRAM_SIZE];
        let mut query_buf = [0u8; MAX_DATAGRAM_SIZE];

        let (sensor_addr, query_addr) = self.local_addrs()?;
        log::info!(
            "Listening for readings on {} and queries on {}",
            sensor_addr,
            query_addr
        );

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    log::info!("Shutdown requested");
                    break;
                }
                received = self.sensor_socket.recv_from(&mut sensor_buf) => match received {
                    Ok((len, peer)) => self.on_reading(&sensor_buf[..len], peer),
                    Err(e) => log::warn!("Sensor socket receive failed: {}", e),
                },
                received = self.query_socket.recv_from(&mut query_buf) => match received {
                    Ok((len, peer)) => self.on_query(&query_buf[..len], peer).await,
                    Err(e) => log::warn!("Query socket receive failed: {}", e),
                },
                _ = ticker.tick() => self.emit_snapshot(),
            }
        }

        Ok(self.collector)
    }

    fn on_reading(&mut self, bytes: &[u8], peer: SocketAddr) {
        match self.collector.handle_reading(bytes, unix_timestamp()) {
            Ok(reading) => log::debug!(
                "Reading from {}: sensor {} {:?} {:#x}",
                peer,
                reading.sensor,
                reading.data_type,
                reading.value.bits()
            ),
            Err(e) => log::warn!("Malformed packet from sensor {}: {}", peer, e),
        }
    }

    async fn on_query(&self, bytes: &[u8], peer: SocketAddr) {
        let response = match self.collector.handle_query(bytes) {
            Ok(response) => response,
            Err(e) => {
                log::warn!("Malformed data request from {}: {}", peer, e);
                return;
            }
        };
        match self.query_socket.send_to(&response, peer).await {
            Ok(_) => log::debug!("Answered query {:?} from {}", bytes, peer),
            Err(e) => log::warn!("Failed to send response to {}: {}", peer, e),
        }
    }

    fn emit_snapshot(&self) {
        let snapshot = self.collector.snapshot();
        if snapshot.is_empty() {
            log::debug!("Stats: no sensor has reported yet");
            return;
        }
        match serde_json::to_string(&snapshot) {
            Ok(json) => log::info!("Stats: {}", json),
            Err(e) => log::warn!("Failed to serialize stats snapshot: {}", e),
        }
    }
}
