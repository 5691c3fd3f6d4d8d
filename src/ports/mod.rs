//! Port traits at the boundary between the domain and the outside world.

pub mod chart_port;
pub mod config_port;
pub mod data_port;
pub mod report_port;
