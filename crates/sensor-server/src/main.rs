//! sensor-server - UDP telemetry collector
//!
//! - **UDP port 12345**: sensor readings (10-byte records, never answered)
//! - **UDP port 12346**: queries (2-byte records), one 10-byte response each
//!
//! Accepted readings are appended to a CSV log; statistics are logged
//! periodically.

use anyhow::Result;
use clap::Parser;
use sensor_log::{CsvReadingLog, NullSink, ReadingSink};
use sensor_server::{bind_sockets, AppConfig, Collector, Server, ServerArgs};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = ServerArgs::parse();
    let config = args.load_config()?;

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.as_str()),
    )
    .init();

    log::info!("sensor-server v{} starting...", env!("CARGO_PKG_VERSION"));
    run(config).await?;
    log::info!("sensor-server stopped");
    Ok(())
}

async fn run(config: AppConfig) -> Result<()> {
    let sink: Box<dyn ReadingSink> = if config.logging.csv_enabled {
        let csv_log = CsvReadingLog::open(&config.logging.csv_path)?;
        log::info!("Appending readings to {}", csv_log.path().display());
        Box::new(csv_log)
    } else {
        log::info!("Reading log disabled");
        Box::new(NullSink)
    };

    let (sensor_socket, query_socket) = bind_sockets(&config.network).await?;
    let server = Server::new(
        sensor_socket,
        query_socket,
        Collector::new(sink),
        config.stats.interval(),
    );

    server.run(shutdown_signal()).await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
