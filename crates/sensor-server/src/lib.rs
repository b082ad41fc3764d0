//! # Sensor Server
//!
//! The collector service around `sensor-core`: TOML configuration, the
//! command line, the UDP event loop and a small probe client.

pub mod cli;
pub mod collector;
pub mod config;
pub mod probe;
pub mod server;

pub use cli::ServerArgs;
pub use collector::Collector;
pub use config::AppConfig;
pub use server::{bind_sockets, Server};
