//! Chart orchestration: from a declarative [`ChartConfig`] to a live chart on
//! a render engine, through axis assignment, option synthesis, and staged data
//! delivery.
//!
//! A chart moves through four states. `create_chart` takes it from `Unbuilt`
//! to `Building` and hands back the outstanding loads; settling the last load
//! moves it to `Ready`; `destroy_chart` ends it. Data arriving for a destroyed
//! chart is dropped, never an error.

use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::api::loader::{LoadBarrier, PendingLoad};
use crate::api::options::{
    AxisLabelOptions, AxisTitleOptions, ChartAreaOptions, ChartOptions, CreditsOptions,
    DataGroupingOptions, LegendOptions, MarkerOptions, PlotOptions, RangeSelectorOptions,
    SeriesOptions, SeriesTooltipOptions, TitleOptions, TooltipOptions, XAxisOptions, YAxisOptions,
};
use crate::api::tooltip::{PointFormat, ValueFormat};
use crate::core::axis::{AxisAssignment, AxisAssignmentEngine, AxisOverride, AxisSide, AxisSpec};
use crate::core::data::SeriesDataUpdate;
use crate::core::location::Location;
use crate::core::palette::{ColorResolver, PaletteConfig};
use crate::core::parameter::{Parameter, Unit};
use crate::core::range_policy::RangePolicy;
use crate::core::series::{DataSource, SeriesDescriptor, SeriesStyleInput};
use crate::core::text::{LangTranslator, Translator};
use crate::error::{ChartError, ChartResult};
use crate::render::{ChartHandle, RenderEngine};

/// Range-selector button a historical chart snaps to once its data is in.
pub const DEFAULT_RANGE_BUTTON: usize = 3;

/// What flavor of chart to synthesize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    /// Forecast-style chart: plain datetime axis, no range selector.
    Standard,
    /// Archive-style chart: range selector, data grouping, and the
    /// min ▸ max (mean) tooltip over grouped points.
    Historical,
}

/// Lifecycle state of a chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartState {
    Unbuilt,
    /// Created on the engine, still waiting for data loads.
    Building,
    Ready,
    Destroyed,
}

/// One declared series: its data source, optional style, and optional linked
/// sub-series (min/max bands) that share its axis and legend entry.
#[derive(Debug, Clone, Default)]
pub struct SeriesInput {
    pub source: DataSource,
    pub style: SeriesStyleInput,
    pub sub: Vec<SeriesInput>,
}

impl SeriesInput {
    #[must_use]
    pub fn new(source: DataSource) -> Self {
        Self {
            source,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_style(mut self, style: SeriesStyleInput) -> Self {
        self.style = style;
        self
    }

    #[must_use]
    pub fn with_sub(mut self, sub: SeriesInput) -> Self {
        self.sub.push(sub);
        self
    }
}

/// Declarative chart description. Everything the build needs is in here;
/// nothing global is consulted.
#[derive(Debug, Clone)]
pub struct ChartConfig {
    pub parameters: Vec<Parameter>,
    pub locations: Vec<Location>,
    pub series: Vec<SeriesInput>,
    pub share_y_axis: bool,
    /// Chart-level range policies, keyed by parameter id.
    pub range_policies: IndexMap<String, RangePolicy>,
    /// Per-axis overrides matched by parameter index.
    pub axis_overrides: Vec<AxisOverride>,
    pub palette: PaletteConfig,
    /// Unit substitutions by parameter index, applied before axis assignment.
    pub unit_overrides: Vec<(usize, Unit)>,
    pub language: String,
}

impl ChartConfig {
    #[must_use]
    pub fn new(parameters: Vec<Parameter>) -> Self {
        Self {
            parameters,
            locations: Vec::new(),
            series: Vec::new(),
            share_y_axis: true,
            range_policies: IndexMap::new(),
            axis_overrides: Vec::new(),
            palette: PaletteConfig::default(),
            unit_overrides: Vec::new(),
            language: "en".to_owned(),
        }
    }

    #[must_use]
    pub fn with_locations(mut self, locations: Vec<Location>) -> Self {
        self.locations = locations;
        self
    }

    #[must_use]
    pub fn with_series(mut self, series: Vec<SeriesInput>) -> Self {
        self.series = series;
        self
    }

    #[must_use]
    pub fn share_y_axis(mut self, share: bool) -> Self {
        self.share_y_axis = share;
        self
    }

    #[must_use]
    pub fn with_range_policy(mut self, parameter_id: impl Into<String>, policy: RangePolicy) -> Self {
        self.range_policies.insert(parameter_id.into(), policy);
        self
    }

    #[must_use]
    pub fn with_axis_overrides(mut self, overrides: Vec<AxisOverride>) -> Self {
        self.axis_overrides = overrides;
        self
    }

    #[must_use]
    pub fn with_palette(mut self, palette: PaletteConfig) -> Self {
        self.palette = palette;
        self
    }

    #[must_use]
    pub fn with_unit_override(mut self, parameter_index: usize, unit: Unit) -> Self {
        self.unit_overrides.push((parameter_index, unit));
        self
    }

    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Parameters with unit overrides applied; indexes out of range are
    /// dropped with a warning.
    fn effective_parameters(&self) -> Vec<Parameter> {
        let mut parameters = self.parameters.clone();
        for (index, unit) in &self.unit_overrides {
            match parameters.get_mut(*index) {
                Some(parameter) => *parameter = parameter.with_unit(unit.clone()),
                None => warn!(index, "unit override index out of range, ignoring"),
            }
        }
        parameters
    }
}

/// Display layout derived from the parameter/location shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DisplayMode {
    /// One parameter at one location: no legend, value-only tooltip rows.
    SingleSeries,
    /// One parameter at several locations: legend names the locations.
    MultiLocation,
    /// Several parameters: legend names the parameters.
    MultiParameter,
}

/// A chart bound to a render engine.
pub struct TimeSeriesChart<E: RenderEngine> {
    engine: E,
    config: ChartConfig,
    kind: ChartKind,
    state: ChartState,
    handle: Option<E::Handle>,
    descriptors: Vec<SeriesDescriptor>,
    barrier: LoadBarrier,
    updates_applied: usize,
    on_ready: Option<Box<dyn FnMut()>>,
}

impl<E: RenderEngine> TimeSeriesChart<E> {
    #[must_use]
    pub fn new(engine: E, config: ChartConfig, kind: ChartKind) -> Self {
        Self {
            engine,
            config,
            kind,
            state: ChartState::Unbuilt,
            handle: None,
            descriptors: Vec::new(),
            barrier: LoadBarrier::default(),
            updates_applied: 0,
            on_ready: None,
        }
    }

    #[must_use]
    pub fn standard(engine: E, config: ChartConfig) -> Self {
        Self::new(engine, config, ChartKind::Standard)
    }

    #[must_use]
    pub fn historical(engine: E, config: ChartConfig) -> Self {
        Self::new(engine, config, ChartKind::Historical)
    }

    #[must_use]
    pub fn state(&self) -> ChartState {
        self.state
    }

    #[must_use]
    pub fn kind(&self) -> ChartKind {
        self.kind
    }

    /// Callback fired once when the last outstanding load settles.
    pub fn set_on_ready(&mut self, callback: impl FnMut() + 'static) {
        self.on_ready = Some(Box::new(callback));
    }

    /// Keys and messages of loads that settled with an error.
    #[must_use]
    pub fn load_errors(&self) -> Vec<(String, String)> {
        self.barrier
            .errors()
            .into_iter()
            .map(|(key, message)| (key.to_owned(), message.to_owned()))
            .collect()
    }

    /// Builds the chart on the engine and returns the loads still outstanding.
    ///
    /// Rebuilding an existing chart destroys the previous engine chart first.
    /// The returned list has one entry per main series and one per linked
    /// sub-series; settle each through [`Self::resolve_load`] or
    /// [`Self::fail_load`].
    pub fn create_chart(&mut self, container: &str) -> ChartResult<Vec<PendingLoad>> {
        if let Some(mut handle) = self.handle.take() {
            handle.destroy();
        }
        self.state = ChartState::Building;
        self.updates_applied = 0;

        let parameters = self.config.effective_parameters();
        if parameters.is_empty() {
            self.state = ChartState::Unbuilt;
            return Err(ChartError::EmptyParameters);
        }

        let translator = LangTranslator::new(self.config.language.clone());
        let colors = ColorResolver::new(self.config.palette.clone());

        self.descriptors = self.build_descriptors(&parameters, &colors, &translator)?;
        let assignment = AxisAssignmentEngine {
            share_y_axis: self.config.share_y_axis,
            range_policies: self.config.range_policies.clone(),
            overrides: self.config.axis_overrides.clone(),
            neutral_title_color: colors.neutral()?,
        }
        .assign(&parameters, &self.descriptors, &translator)?;

        for (index, descriptor) in self.descriptors.iter_mut().enumerate() {
            let axis_index = if parameters.len() == 1 { 0 } else { index };
            let axis_id = assignment.parameter_axis[axis_index].clone();
            descriptor.axis_id = Some(axis_id.clone());
            for sub in &mut descriptor.sub_series {
                sub.axis_id = Some(axis_id.clone());
            }
        }

        let options = self.build_options(&parameters, &assignment, &translator);
        info!(
            container,
            series = self.descriptors.len(),
            axes = assignment.axes.len(),
            "creating chart"
        );
        self.handle = Some(self.engine.create(container, &options));

        let flattened: Vec<&SeriesDescriptor> = self
            .descriptors
            .iter()
            .flat_map(|descriptor| std::iter::once(descriptor).chain(descriptor.sub_series.iter()))
            .collect();
        self.barrier = LoadBarrier::new(flattened.iter().map(|d| d.key.clone()));
        Ok(flattened
            .into_iter()
            .map(|descriptor| PendingLoad {
                key: descriptor.key.clone(),
                file_name: descriptor.source.file_name.clone(),
                inline: descriptor.source.inline.clone(),
            })
            .collect())
    }

    /// Delivers a load's payload and settles its barrier slot.
    ///
    /// A `None` or null payload still settles the load without touching any
    /// series. For a series with linked sub-series the payload is a list
    /// routed positionally: element 0 to the main series, the rest in
    /// sub-series order.
    pub fn resolve_load(&mut self, key: &str, payload: Option<Value>) {
        if self.handle.is_none() || self.state == ChartState::Destroyed {
            debug!(load_key = key, "load resolved after chart teardown, dropping");
            return;
        }

        if let Some(payload) = &payload {
            let descriptor = self
                .descriptors
                .iter()
                .flat_map(|d| std::iter::once(d).chain(d.sub_series.iter()))
                .find(|d| d.key == key);
            if let Some(descriptor) = descriptor {
                let updates = routed_updates(descriptor, payload);
                self.apply_updates(updates);
            } else {
                warn!(load_key = key, "load key matches no series, skipping data");
            }
        }

        if self.barrier.settle_ok(key) {
            self.finish_build();
        }
    }

    /// Records a failed load. The chart still reaches `Ready` once every load
    /// has settled; failures stay visible through [`Self::load_errors`].
    pub fn fail_load(&mut self, key: &str, message: impl Into<String>) {
        let message = message.into();
        warn!(load_key = key, error = %message, "series load failed");
        if self.barrier.settle_err(key, message) {
            self.finish_build();
        }
    }

    /// Replaces the data of the series owned by `parameter_id`.
    ///
    /// Unknown parameter ids are skipped; pushing data into a chart that does
    /// not show that parameter is routine, not an error.
    pub fn set_data(&mut self, parameter_id: &str, payload: &Value) {
        if self.handle.is_none() {
            debug!(parameter_id, "set_data before build or after destroy, dropping");
            return;
        }
        let Some(descriptor) = self
            .descriptors
            .iter()
            .find(|d| d.parameter.id == parameter_id)
        else {
            debug!(parameter_id, "no series for parameter, skipping data");
            return;
        };
        let updates = routed_updates(descriptor, payload);
        self.apply_updates(updates);
    }

    /// Replaces the data of every main series positionally. Null entries and
    /// entries beyond the series list are skipped.
    pub fn set_all_data(&mut self, payloads: &[Value]) {
        if self.handle.is_none() {
            debug!("set_all_data before build or after destroy, dropping");
            return;
        }
        let mut updates = Vec::new();
        for (descriptor, payload) in self.descriptors.iter().zip(payloads) {
            if payload.is_null() {
                continue;
            }
            updates.extend(routed_updates(descriptor, payload));
        }
        if payloads.len() > self.descriptors.len() {
            debug!(
                extra = payloads.len() - self.descriptors.len(),
                "more payloads than series, extras skipped"
            );
        }
        self.apply_updates(updates);
    }

    /// Destroys the engine chart. Further data delivery becomes a no-op.
    pub fn destroy_chart(&mut self) {
        if let Some(mut handle) = self.handle.take() {
            handle.destroy();
        }
        self.state = ChartState::Destroyed;
    }

    fn apply_updates(&mut self, updates: Vec<(String, SeriesDataUpdate)>) {
        let Some(handle) = self.handle.as_mut() else {
            return;
        };
        for (key, update) in updates {
            // The very first delivery skips the redraw; the engine paints the
            // whole chart once at build completion instead.
            let redraw = self.updates_applied > 0;
            handle.update_series(&key, update, redraw);
            self.updates_applied += 1;
        }
    }

    fn finish_build(&mut self) {
        self.state = ChartState::Ready;
        // Completion callback first, so it observes the pre-paint chart; the
        // full redraw and the historical range snap come after.
        if let Some(on_ready) = self.on_ready.as_mut() {
            on_ready();
        }
        if let Some(handle) = self.handle.as_mut() {
            handle.redraw();
            if self.kind == ChartKind::Historical {
                handle.select_default_range(DEFAULT_RANGE_BUTTON);
            }
        }
    }

    fn display_mode(&self, parameters: &[Parameter]) -> DisplayMode {
        if parameters.len() > 1 {
            DisplayMode::MultiParameter
        } else if self.config.locations.len() > 1 {
            DisplayMode::MultiLocation
        } else {
            DisplayMode::SingleSeries
        }
    }

    /// Expands parameters × locations into series descriptors.
    ///
    /// A single parameter fans out over the locations; otherwise each
    /// parameter is one series paired with its positional location. Declared
    /// series inputs align with that expansion and fill in sources, styles,
    /// and sub-series.
    fn build_descriptors(
        &self,
        parameters: &[Parameter],
        colors: &ColorResolver,
        translator: &dyn Translator,
    ) -> ChartResult<Vec<SeriesDescriptor>> {
        let locations = &self.config.locations;
        let slots: Vec<(Parameter, Location)> =
            if parameters.len() == 1 && locations.len() > 1 {
                locations
                    .iter()
                    .map(|location| (parameters[0].clone(), location.clone()))
                    .collect()
            } else {
                parameters
                    .iter()
                    .enumerate()
                    .map(|(index, parameter)| {
                        let location = locations
                            .get(index)
                            .or_else(|| locations.first())
                            .cloned()
                            .unwrap_or_else(Location::none);
                        (parameter.clone(), location)
                    })
                    .collect()
            };

        let default_input = SeriesInput::default();
        let mut descriptors = Vec::with_capacity(slots.len());
        for (index, (parameter, location)) in slots.into_iter().enumerate() {
            let input = self.config.series.get(index).unwrap_or(&default_input);
            let key = format!("series_{index}");
            let style = input.style.normalize(index, None, colors, translator)?;

            let mut sub_series = Vec::with_capacity(input.sub.len());
            for (sub_index, sub_input) in input.sub.iter().enumerate() {
                let sub_style =
                    sub_input
                        .style
                        .normalize(index, Some(&input.style), colors, translator)?;
                sub_series.push(SeriesDescriptor {
                    key: format!("{key}_sub_{sub_index}"),
                    index,
                    parameter: parameter.clone(),
                    location: location.clone(),
                    style: sub_style,
                    source: sub_input.source.clone(),
                    axis_id: None,
                    sub_series: Vec::new(),
                });
            }

            descriptors.push(SeriesDescriptor {
                key,
                index,
                parameter,
                location,
                style,
                source: input.source.clone(),
                axis_id: None,
                sub_series,
            });
        }
        Ok(descriptors)
    }

    fn build_options(
        &self,
        parameters: &[Parameter],
        assignment: &AxisAssignment,
        translator: &dyn Translator,
    ) -> ChartOptions {
        let mode = self.display_mode(parameters);
        let single_location = self
            .config
            .locations
            .first()
            .map(|location| location.display_name(translator))
            .filter(|name| !name.is_empty());

        let (title, subtitle) = match mode {
            DisplayMode::SingleSeries => match single_location {
                Some(location) => (
                    TitleOptions::new(location),
                    Some(TitleOptions::new(
                        parameters[0].display_name(translator, true, true),
                    )),
                ),
                None => (
                    TitleOptions::new(parameters[0].display_name(translator, true, true)),
                    None,
                ),
            },
            DisplayMode::MultiLocation => (
                TitleOptions::new(parameters[0].display_name(translator, true, true)),
                None,
            ),
            DisplayMode::MultiParameter => (
                TitleOptions::new(single_location.unwrap_or_default()),
                None,
            ),
        };

        let legend = match mode {
            DisplayMode::SingleSeries => LegendOptions::disabled(),
            _ => LegendOptions::top_centered(),
        };

        let value_format = match self.kind {
            ChartKind::Standard => ValueFormat::Standard,
            ChartKind::Historical => ValueFormat::HistoricalMinMax,
        };
        // With every series opted out there is nothing to format.
        let any_tooltip = self.descriptors.iter().any(|descriptor| {
            !descriptor.style.no_tooltip
                || descriptor.sub_series.iter().any(|sub| !sub.style.no_tooltip)
        });
        let tooltip = TooltipOptions {
            enabled: any_tooltip,
            point_format: match mode {
                DisplayMode::SingleSeries => PointFormat::Single,
                _ => PointFormat::Multi,
            },
            value_format,
            ..TooltipOptions::default()
        };

        let mut series = Vec::new();
        for descriptor in &self.descriptors {
            // Legend names carry the unit; the tooltip gets the short
            // speed-style name since its value cell already has the suffix.
            let (name, name_in_tooltip) = match mode {
                DisplayMode::MultiLocation => {
                    (descriptor.location.display_name(translator), None)
                }
                _ => (
                    descriptor.parameter.display_name(translator, true, true),
                    Some(descriptor.parameter.display_name(translator, false, true)),
                ),
            };
            series.push(self.series_options(
                descriptor,
                name.clone(),
                name_in_tooltip.clone(),
                None,
                translator,
            ));
            for sub in &descriptor.sub_series {
                series.push(self.series_options(
                    sub,
                    name.clone(),
                    name_in_tooltip.clone(),
                    Some(descriptor.key.clone()),
                    translator,
                ));
            }
        }

        ChartOptions {
            chart: ChartAreaOptions::default(),
            title,
            subtitle,
            legend,
            credits: CreditsOptions::default(),
            tooltip,
            x_axis: XAxisOptions::default(),
            y_axis: assignment.axes.iter().map(axis_options).collect(),
            series,
            plot_options: PlotOptions::default(),
            range_selector: match self.kind {
                ChartKind::Standard => None,
                ChartKind::Historical => Some(RangeSelectorOptions::standard()),
            },
        }
    }

    fn series_options(
        &self,
        descriptor: &SeriesDescriptor,
        name: String,
        name_in_tooltip: Option<String>,
        linked_to: Option<String>,
        translator: &dyn Translator,
    ) -> SeriesOptions {
        let style = &descriptor.style;
        SeriesOptions {
            id: descriptor.key.clone(),
            name,
            name_in_tooltip,
            color: style.color.clone(),
            y_axis: descriptor.axis_id.clone().unwrap_or_default(),
            line_width: style.line_width,
            dash_style: style.dash_style,
            marker: MarkerOptions {
                enabled: style.marker_enabled,
                symbol: style.marker_symbol.clone(),
                hover_enabled: true,
            },
            tooltip: SeriesTooltipOptions {
                value_decimals: descriptor.parameter.decimals,
                value_prefix: String::new(),
                value_suffix: descriptor.parameter.value_suffix(translator),
            },
            no_tooltip: style.no_tooltip,
            tooltip_prefix: style.tooltip_prefix.clone(),
            tooltip_postfix: style.tooltip_postfix.clone(),
            linked_to,
            direction_arrow: style.direction_arrow_enabled(),
            direction_marker: style.direction_marker.clone(),
            show_all_arrows: style.show_all_arrows,
            data_grouping: match self.kind {
                ChartKind::Standard => None,
                ChartKind::Historical => Some(DataGroupingOptions::default()),
            },
        }
    }
}

/// Resolves a payload against a descriptor and its linked sub-series.
///
/// A descriptor with sub-series takes a list payload routed positionally;
/// null or missing elements leave that series untouched. Any other payload
/// shape feeds the main series only.
fn routed_updates(
    descriptor: &SeriesDescriptor,
    payload: &Value,
) -> Vec<(String, SeriesDataUpdate)> {
    let mut updates = Vec::new();

    if descriptor.sub_series.is_empty() {
        if let Some(update) = descriptor.resolve(Some(payload)) {
            updates.push((descriptor.key.clone(), update));
        }
        return updates;
    }

    match payload.as_array() {
        Some(list) => {
            if let Some(update) = descriptor.resolve(list.first()) {
                updates.push((descriptor.key.clone(), update));
            }
            for (index, sub) in descriptor.sub_series.iter().enumerate() {
                if let Some(update) = sub.resolve(list.get(index + 1)) {
                    updates.push((sub.key.clone(), update));
                }
            }
        }
        None => {
            debug!(
                series = %descriptor.key,
                "expected a payload list for a series with sub-series, \
                 feeding the main series only"
            );
            if let Some(update) = descriptor.resolve(Some(payload)) {
                updates.push((descriptor.key.clone(), update));
            }
        }
    }
    updates
}

fn axis_options(spec: &AxisSpec) -> YAxisOptions {
    YAxisOptions {
        id: spec.id.clone(),
        opposite: spec.side == AxisSide::Right,
        title: AxisTitleOptions {
            text: spec.title.text.clone(),
            color: spec.title.color.clone(),
        },
        labels: AxisLabelOptions {
            decimals: spec.label_decimals,
            color: spec.line_color.clone(),
        },
        line_color: spec.line_color.clone(),
        line_width: spec.line_color.is_some().then_some(1.0),
        min: spec.range.min,
        max: spec.range.max,
        min_range: spec.range.min_span,
        start_on_tick: spec.range.start_on_tick,
        end_on_tick: spec.range.end_on_tick,
        tick_positioner: spec.range.tick_positioner,
        floor: spec.non_negative_floor.then_some(0.0),
        zero_plot_line: spec.zero_line,
        crosshair: spec.crosshair,
    }
}
