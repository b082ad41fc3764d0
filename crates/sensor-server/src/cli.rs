//! Command-line arguments of the `sensor-server` binary.

use clap::Parser;
use std::path::PathBuf;

use crate::config::AppConfig;

#[derive(Debug, Parser)]
#[command(name = "sensor-server")]
#[command(about = "Collect UDP sensor readings and answer statistics queries")]
pub struct ServerArgs {
    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override the sensor reading port
    #[arg(long)]
    pub sensor_port: Option<u16>,

    /// Override the query port
    #[arg(long)]
    pub query_port: Option<u16>,

    /// Override the CSV reading log path
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Do not write the CSV reading log
    #[arg(long)]
    pub no_csv: bool,
}

impl ServerArgs {
    /// Load the config file (or defaults) and apply the flag overrides.
    pub fn load_config(&self) -> anyhow::Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::from_file(path)?,
            None => AppConfig::default(),
        };
        self.apply(&mut config);
        Ok(config)
    }

    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(port) = self.sensor_port {
            config.network.sensor_port = port;
        }
        if let Some(port) = self.query_port {
            config.network.query_port = port;
        }
        if let Some(path) = &self.csv {
            config.logging.csv_path = path.clone();
        }
        if self.no_csv {
            config.logging.csv_enabled = false;
        }
    }
}
