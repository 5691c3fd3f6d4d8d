//! momentum-watch: periodic momentum, breakout and stop-loss monitor.
//!
//! Hexagonal architecture: decision logic in [`domain`], port traits in
//! [`ports`], concrete implementations in [`adapters`]. The [`scheduler`] and
//! [`console`] drive the domain from a background thread and the terminal.

pub mod adapters;
pub mod cli;
pub mod console;
pub mod domain;
pub mod ports;
pub mod scheduler;
