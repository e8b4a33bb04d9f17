//! Port traits the outer layers implement.

pub mod config_port;
pub mod data_port;
pub mod report_port;
