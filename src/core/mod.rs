pub mod axis;
pub mod data;
pub mod location;
pub mod palette;
pub mod parameter;
pub mod range_policy;
pub mod series;
pub mod text;

pub use axis::{AxisAssignment, AxisAssignmentEngine, AxisOverride, AxisSide, AxisSpec, SHARED_AXIS_ID};
pub use data::{DataPoint, IntervalUnit, SeriesDataUpdate};
pub use location::Location;
pub use palette::{Color, ColorResolver, PaletteConfig};
pub use parameter::{Parameter, Unit, VectorComponents};
pub use range_policy::{RangePolicy, RangeSpec, TickPositioner, effective_policy};
pub use series::{
    DashStyle, DataSource, DirectionArrow, DirectionMarker, MarkerPolicy, SeriesDescriptor,
    SeriesStyle, SeriesStyleInput,
};
pub use text::{LangTranslator, LocalizedText, Translator};
