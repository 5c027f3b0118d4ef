//! Core domain types and logic: price data, indicators, interpretation.

pub mod analysis;
pub mod config_validation;
pub mod error;
pub mod indicator;
pub mod indicator_helpers;
pub mod indicator_parser;
pub mod indicator_set;
pub mod interpreter;
pub mod market;
pub mod ohlcv;
pub mod price_series;
