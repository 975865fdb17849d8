pub mod adapters;
pub mod config;
pub mod domain;
pub mod qr;
pub mod server;
pub mod telemetry;
