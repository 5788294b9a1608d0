use chart_compose::core::range_policy::{
    RangePolicy, TickPositioner, effective_policy,
};
use chart_compose::error::ChartError;
use serde_json::json;

#[test]
fn wire_shapes_parse_into_policies() {
    assert_eq!(
        RangePolicy::from_value(&json!({"fixedRange": [-2.0, 2.0]})).unwrap(),
        RangePolicy::FixedRange { min: -2.0, max: 2.0 }
    );
    assert_eq!(
        RangePolicy::from_value(&json!({"semiFixedRange": [0.0, 4.0]})).unwrap(),
        RangePolicy::SemiFixedRange { min: 0.0, range: 4.0 }
    );
    assert_eq!(
        RangePolicy::from_value(&json!({"semiFixedRange": {"min": 0.0, "range": 4.0}})).unwrap(),
        RangePolicy::SemiFixedRange { min: 0.0, range: 4.0 }
    );
    assert_eq!(
        RangePolicy::from_value(&json!({"minRange": 1.5})).unwrap(),
        RangePolicy::MinRange(1.5)
    );
}

#[test]
fn malformed_policies_are_rejected() {
    for bad in [
        json!(42),
        json!({"fixedRange": [-2.0]}),
        json!({"fixedRange": "wide"}),
        json!({"semiFixedRange": {"min": 0.0}}),
        json!({"minRange": "some"}),
        json!({"autoRange": true}),
    ] {
        let error = RangePolicy::from_value(&bad).unwrap_err();
        assert!(
            matches!(error, ChartError::InvalidRangePolicy(_)),
            "expected rejection for {bad}"
        );
    }
}

#[test]
fn fixed_range_disables_tick_snapping() {
    let spec = RangePolicy::FixedRange { min: -2.0, max: 2.0 }.resolve();
    assert_eq!(spec.min, Some(-2.0));
    assert_eq!(spec.max, Some(2.0));
    assert!(!spec.start_on_tick);
    assert!(!spec.end_on_tick);
    assert_eq!(spec.tick_positioner, TickPositioner::FixedAnchors { lo: -2.0, hi: 2.0 });
}

#[test]
fn semi_fixed_range_derives_max_from_span() {
    let spec = RangePolicy::SemiFixedRange { min: -1.0, range: 3.0 }.resolve();
    assert_eq!(spec.min, Some(-1.0));
    assert_eq!(spec.max, Some(2.0));
    assert!(spec.start_on_tick);
    assert_eq!(spec.tick_positioner, TickPositioner::Default);
}

#[test]
fn min_range_passes_the_constraint_through() {
    let spec = RangePolicy::MinRange(0.5).resolve();
    assert_eq!(spec.min, None);
    assert_eq!(spec.max, None);
    assert_eq!(spec.min_span, Some(0.5));
    assert_eq!(spec.tick_positioner, TickPositioner::PassThrough);
}

#[test]
fn fixed_anchors_keep_zero_bounds_and_inner_ticks_sorted() {
    let positioner = TickPositioner::FixedAnchors { lo: -2.0, hi: 2.0 };
    let ticks = positioner.apply(&[-3.0, -1.0, 0.0, 1.0, 3.0]).unwrap();

    // Anchors and zero are always present; computed ticks outside the range
    // are dropped.
    assert_eq!(ticks, vec![-2.0, -1.0, 0.0, 1.0, 2.0]);

    let ticks = positioner.apply(&[]).unwrap();
    assert_eq!(ticks, vec![-2.0, 0.0, 2.0]);
}

#[test]
fn default_and_pass_through_positioners() {
    assert_eq!(TickPositioner::Default.apply(&[0.0, 1.0]), None);
    assert_eq!(
        TickPositioner::PassThrough.apply(&[0.0, 1.0]),
        Some(vec![0.0, 1.0])
    );
}

#[test]
fn precedence_runs_override_chart_declared() {
    let override_policy = RangePolicy::MinRange(1.0);
    let chart_policy = RangePolicy::FixedRange { min: 0.0, max: 1.0 };
    let declared = RangePolicy::SemiFixedRange { min: 0.0, range: 2.0 };

    assert_eq!(
        effective_policy(Some(&override_policy), Some(&chart_policy), Some(&declared)),
        override_policy
    );
    assert_eq!(
        effective_policy(None, Some(&chart_policy), Some(&declared)),
        chart_policy
    );
    assert_eq!(effective_policy(None, None, Some(&declared)), declared);
    assert_eq!(effective_policy(None, None, None), RangePolicy::None);
}
