use chart_compose::api::chart::{ChartConfig, TimeSeriesChart};
use chart_compose::api::options::ChartOptions;
use chart_compose::core::parameter::{Parameter, Unit};
use chart_compose::render::RecordingEngine;
use proptest::prelude::*;

fn parameter(index: usize) -> Parameter {
    Parameter::new(
        format!("param_{index}"),
        format!("Parameter {index}"),
        Unit::new("m", "m", 1.0),
    )
}

fn build(parameters: Vec<Parameter>) -> ChartOptions {
    let engine = RecordingEngine::default();
    let log = engine.log();
    let mut chart = TimeSeriesChart::standard(engine, ChartConfig::new(parameters));
    chart.create_chart("c").expect("non-empty parameters");
    let options = log.borrow().last_options.clone().expect("chart created");
    options
}

proptest! {
    #[test]
    fn distinct_parameters_yield_one_axis_each_property(count in 2usize..8) {
        let options = build((0..count).map(parameter).collect());

        prop_assert_eq!(options.y_axis.len(), count);
        prop_assert_eq!(options.series.len(), count);

        // Left side takes the ceiling half, in declaration order.
        let left = options.y_axis.iter().take_while(|axis| !axis.opposite).count();
        prop_assert_eq!(left, count.div_ceil(2));
        prop_assert!(options.y_axis[left..].iter().all(|axis| axis.opposite));
    }

    #[test]
    fn one_duplicate_merges_exactly_one_axis_property(
        count in 2usize..7,
        dup_offset in 1usize..6
    ) {
        let duplicated = dup_offset % count;
        let mut parameters: Vec<Parameter> = (0..count).map(parameter).collect();
        parameters.push(parameter(duplicated));

        let options = build(parameters);

        prop_assert_eq!(options.series.len(), count + 1);
        prop_assert_eq!(options.y_axis.len(), count);
        prop_assert_eq!(
            &options.series[duplicated].y_axis,
            &options.series[count].y_axis
        );
    }

    #[test]
    fn every_series_lands_on_an_emitted_axis_property(count in 1usize..8) {
        let options = build((0..count).map(parameter).collect());

        for series in &options.series {
            prop_assert!(
                options.y_axis.iter().any(|axis| axis.id == series.y_axis),
                "series {} references missing axis {}",
                series.id,
                series.y_axis
            );
        }
    }

    #[test]
    fn series_colors_stay_distinct_up_to_the_sequence_property(count in 2usize..9) {
        let options = build((0..count).map(parameter).collect());

        for (i, a) in options.series.iter().enumerate() {
            for b in &options.series[i + 1..] {
                prop_assert_ne!(&a.color, &b.color);
            }
        }
    }
}
