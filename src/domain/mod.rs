//! Core domain types and decision logic.

pub mod breakout;
pub mod config_validation;
pub mod cycle;
pub mod equity;
pub mod error;
pub mod indicator;
pub mod ohlcv;
pub mod portfolio;
pub mod position;
pub mod sector;
pub mod settings;
pub mod stop_loss;
pub mod watchlist;
