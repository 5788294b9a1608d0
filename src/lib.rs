//! chart-compose: declarative option-tree composition for time-series charts.
//!
//! This crate turns abstract domain inputs (parameters, locations, raw or
//! deferred numeric series) into a complete chart configuration tree plus a set
//! of pending data loads, and hands both to an external render engine. It owns
//! the decision logic - axis assignment, range policies, color resolution,
//! tooltip composition - and nothing of the pixel pipeline.

pub mod api;
pub mod core;
pub mod error;
pub mod render;
pub mod telemetry;

pub use api::{ChartConfig, ChartKind, ChartOptions, TimeSeriesChart};
pub use error::{ChartError, ChartResult};
