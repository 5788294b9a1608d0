//! Public chart-building surface: configuration, orchestration, load
//! tracking, the emitted option tree, and tooltip formatting.

pub mod chart;
pub mod loader;
pub mod options;
pub mod tooltip;

pub use chart::{
    ChartConfig, ChartKind, ChartState, DEFAULT_RANGE_BUTTON, SeriesInput, TimeSeriesChart,
};
pub use loader::{LoadBarrier, LoadState, PendingLoad};
pub use options::{
    ChartOptions, DataGroupingOptions, RangeButton, RangeSelectorOptions, SeriesOptions,
    TooltipOptions, YAxisOptions,
};
pub use tooltip::{PointContext, PointFormat, ValueFormat, compass_text, format_number};
