//! Port traits the CLI drives adapters through.

pub mod config_port;
pub mod data_port;
pub mod report_port;
