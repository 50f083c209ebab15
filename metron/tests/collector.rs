//! Cross-component scenarios driving the collector end to end.

use std::sync::Arc;
use std::time::{Duration, UNIX_EPOCH};

use assert2::check;
use metron::{
    Aggregation, AlwaysDelta, AlwaysOn, AttributeSet, Collector, CollectorConfig,
    ConfigurationError, InstrumentDescriptor, InstrumentKind, MetricData, NumberValue, Point,
    PointValue, Temporality, TraceContext, ValueType,
};
use metron_timesource::TimeSource;
use metron_timesource::fakes::ManuallyAdvancedTimeSource;

const SECOND: Duration = Duration::from_secs(1);

fn point_for<'a>(metric: &'a MetricData, attributes: &AttributeSet) -> &'a Point {
    metric
        .points
        .iter()
        .find(|point| &point.attributes == attributes)
        .unwrap_or_else(|| panic!("no point for {attributes} in {}", metric.name))
}

fn sum_of(point: &Point) -> i64 {
    match point.value {
        PointValue::Sum(NumberValue::Long(v)) => v,
        ref other => panic!("expected a long sum, got {other:?}"),
    }
}

#[test]
fn end_to_end_delta_counter_scenario() {
    let clock = ManuallyAdvancedTimeSource::at_time(UNIX_EPOCH + SECOND);
    let collector = Collector::new(
        CollectorConfig::default()
            .with_time_source(TimeSource::custom(clock.clone()))
            .with_temporality(AlwaysDelta),
    );
    let requests = collector
        .register::<i64>(
            InstrumentDescriptor::new("requests", InstrumentKind::Counter, ValueType::Long)
                .with_description("handled requests")
                .with_unit("1"),
            Aggregation::Default,
        )
        .unwrap();

    let route_a = AttributeSet::from_iter([("route", "/a")]);
    let route_b = AttributeSet::from_iter([("route", "/b")]);

    requests.record(1, route_a.clone(), None);
    requests.record(2, route_a.clone(), None);
    requests.record(5, route_b.clone(), None);

    clock.advance(SECOND);
    let snapshot = collector.collect();
    check!(snapshot.len() == 1);
    let metric = &snapshot[0];
    check!(metric.name == "requests");
    check!(metric.description == "handled requests");
    check!(metric.unit == "1");
    check!(metric.is_monotonic);
    check!(metric.temporality == Temporality::Delta);
    check!(metric.points.len() == 2);
    check!(sum_of(point_for(metric, &route_a)) == 3);
    check!(sum_of(point_for(metric, &route_b)) == 5);

    // delta windows: registration time -> first collection
    let point = point_for(metric, &route_a);
    check!(point.start_epoch_nanos == 1_000_000_000);
    check!(point.end_epoch_nanos == 2_000_000_000);

    requests.record(1, route_a.clone(), None);
    clock.advance(SECOND);
    let snapshot = collector.collect();
    let metric = &snapshot[0];
    check!(sum_of(point_for(metric, &route_a)) == 1);
    // an idle series still reports a (zero) delta point rather than vanishing
    check!(sum_of(point_for(metric, &route_b)) == 0);
    let point = point_for(metric, &route_a);
    check!(point.start_epoch_nanos == 2_000_000_000);
    check!(point.end_epoch_nanos == 3_000_000_000);
}

#[test]
fn cumulative_points_keep_the_registration_start() {
    let clock = ManuallyAdvancedTimeSource::at_time(UNIX_EPOCH + SECOND);
    let collector = Collector::new(
        CollectorConfig::default().with_time_source(TimeSource::custom(clock.clone())),
    );
    let bytes = collector
        .register::<i64>(
            InstrumentDescriptor::new("bytes_sent", InstrumentKind::Counter, ValueType::Long),
            Aggregation::Sum,
        )
        .unwrap();

    let attrs = AttributeSet::empty();
    bytes.record(100, attrs.clone(), None);
    clock.advance(SECOND);
    let first = collector.collect();
    check!(sum_of(point_for(&first[0], &attrs)) == 100);

    bytes.record(50, attrs.clone(), None);
    clock.advance(SECOND);
    let second = collector.collect();
    let point = point_for(&second[0], &attrs);
    check!(sum_of(point) == 150);
    check!(point.start_epoch_nanos == 1_000_000_000);
    check!(point.end_epoch_nanos == 3_000_000_000);
}

#[test]
fn concurrent_first_time_recordings_converge_on_one_series() {
    let collector = Collector::new(CollectorConfig::default());
    let requests = collector
        .register::<i64>(
            InstrumentDescriptor::new("requests", InstrumentKind::Counter, ValueType::Long),
            Aggregation::Default,
        )
        .unwrap();

    std::thread::scope(|scope| {
        for _ in 0..8 {
            let requests = requests.clone();
            scope.spawn(move || {
                requests.record(1, AttributeSet::from_iter([("route", "/a")]), None);
            });
        }
    });

    let snapshot = collector.collect();
    let metric = &snapshot[0];
    check!(metric.points.len() == 1);
    check!(sum_of(&metric.points[0]) == 8);
}

#[test]
fn gauges_order_by_measurement_timestamp() {
    let collector = Collector::new(CollectorConfig::default());
    let queue_depth = collector
        .register::<i64>(
            InstrumentDescriptor::new(
                "queue_depth",
                InstrumentKind::ObservableGauge,
                ValueType::Long,
            ),
            Aggregation::Default,
        )
        .unwrap();

    let attrs = AttributeSet::empty();
    queue_depth.record_at(5, 10, attrs.clone(), None);
    queue_depth.record_at(3, 5, attrs.clone(), None);

    let snapshot = collector.collect();
    let point = point_for(&snapshot[0], &attrs);
    check!(point.value == PointValue::LastValue(NumberValue::Long(5)));
}

#[test]
fn histogram_series_reset_under_delta() {
    let collector = Collector::new(
        CollectorConfig::default().with_temporality(AlwaysDelta),
    );
    let latency = collector
        .register::<f64>(
            InstrumentDescriptor::new("latency", InstrumentKind::Histogram, ValueType::Double)
                .with_unit("ms"),
            Aggregation::ExplicitBucketHistogram { boundaries: vec![10.0, 100.0] },
        )
        .unwrap();

    let attrs = AttributeSet::empty();
    for value in [4.0, 8.0, 20.0, 150.0] {
        latency.record(value, attrs.clone(), None);
    }

    let first = collector.collect();
    match &point_for(&first[0], &attrs).value {
        PointValue::Histogram(hist) => {
            check!(hist.bucket_counts == vec![2, 1, 1]);
            check!(hist.count == 4);
            check!(hist.sum == NumberValue::Double(182.0));
            check!(hist.min == Some(NumberValue::Double(4.0)));
            check!(hist.max == Some(NumberValue::Double(150.0)));
        }
        other => panic!("expected a histogram, got {other:?}"),
    }

    let second = collector.collect();
    match &point_for(&second[0], &attrs).value {
        PointValue::Histogram(hist) => {
            check!(hist.count == 0);
            check!(hist.bucket_counts == vec![0, 0, 0]);
        }
        other => panic!("expected a histogram, got {other:?}"),
    }
}

#[test]
fn exemplars_ride_along_with_points() {
    let collector = Collector::new(
        CollectorConfig::default().with_exemplar_filter(AlwaysOn).with_reservoir_size(2),
    );
    let requests = collector
        .register::<i64>(
            InstrumentDescriptor::new("requests", InstrumentKind::Counter, ValueType::Long),
            Aggregation::Default,
        )
        .unwrap();

    let attrs = AttributeSet::from_iter([("route", "/a")]);
    let ctx = TraceContext { trace_id: 0x1234, span_id: 0x5678, sampled: true };
    for value in 1..=5 {
        requests.record(value, attrs.clone(), Some(ctx));
    }

    let snapshot = collector.collect();
    let point = point_for(&snapshot[0], &attrs);
    check!(!point.exemplars.is_empty());
    check!(point.exemplars.len() <= 2);
    for exemplar in &point.exemplars {
        check!(exemplar.trace_context == Some(ctx));
        // the measurement attributes match the bucketing key exactly, so
        // nothing is left over to report as filtered attributes
        check!(exemplar.filtered_attributes.is_empty());
    }

    // the reservoir resets with the cycle
    let next = collector.collect();
    check!(point_for(&next[0], &attrs).exemplars.is_empty());
}

#[test]
fn rejected_measurements_leave_no_trace_in_points_or_exemplars() {
    let collector = Collector::new(
        CollectorConfig::default().with_exemplar_filter(AlwaysOn),
    );
    let requests = collector
        .register::<i64>(
            InstrumentDescriptor::new("requests", InstrumentKind::Counter, ValueType::Long),
            Aggregation::Default,
        )
        .unwrap();

    let attrs = AttributeSet::empty();
    requests.record(7, attrs.clone(), None);
    requests.record(-3, attrs.clone(), None);

    let snapshot = collector.collect();
    let point = point_for(&snapshot[0], &attrs);
    check!(sum_of(point) == 7);
    check!(point.exemplars.len() == 1);
    check!(point.exemplars[0].value == NumberValue::Long(7));
}

#[test]
fn incompatible_aggregation_fails_registration() {
    let collector = Collector::new(CollectorConfig::default());
    let result = collector.register::<i64>(
        InstrumentDescriptor::new("requests", InstrumentKind::Counter, ValueType::Long),
        Aggregation::LastValue,
    );
    check!(matches!(
        result.err(),
        Some(ConfigurationError::IncompatibleAggregation { .. })
    ));

    let gauge = collector.register::<i64>(
        InstrumentDescriptor::new("depth", InstrumentKind::ObservableGauge, ValueType::Long),
        Aggregation::LastValue,
    );
    check!(gauge.is_ok());
}

#[test]
fn value_type_mismatch_fails_registration() {
    let collector = Collector::new(CollectorConfig::default());
    let result = collector.register::<i64>(
        InstrumentDescriptor::new("latency", InstrumentKind::Histogram, ValueType::Double),
        Aggregation::Default,
    );
    check!(matches!(
        result.err(),
        Some(ConfigurationError::ValueTypeMismatch { .. })
    ));
}

#[test]
fn instruments_are_collected_in_registration_order() {
    let collector = Collector::new(CollectorConfig::default());
    let first = collector
        .register::<i64>(
            InstrumentDescriptor::new("first", InstrumentKind::Counter, ValueType::Long),
            Aggregation::Default,
        )
        .unwrap();
    let second = collector
        .register::<f64>(
            InstrumentDescriptor::new("second", InstrumentKind::UpDownCounter, ValueType::Double),
            Aggregation::Default,
        )
        .unwrap();

    first.record(1, AttributeSet::empty(), None);
    second.record(-2.5, AttributeSet::empty(), None);

    let snapshot = collector.collect();
    check!(snapshot.len() == 2);
    check!(snapshot[0].name == "first");
    check!(snapshot[1].name == "second");
    check!(!snapshot[1].is_monotonic);
    let point = point_for(&snapshot[1], &AttributeSet::empty());
    check!(point.value == PointValue::Sum(NumberValue::Double(-2.5)));
}

#[test]
fn collect_into_skips_empty_registries() {
    use metron::{ExportResult, MetricExporter};

    struct CountingExporter {
        calls: usize,
    }
    impl MetricExporter for CountingExporter {
        fn export(&mut self, _metrics: Vec<MetricData>) -> ExportResult {
            self.calls += 1;
            ExportResult::Success
        }
    }

    let collector = Collector::new(CollectorConfig::default());
    let mut exporter = CountingExporter { calls: 0 };
    check!(collector.collect_into(&mut exporter) == ExportResult::Success);
    check!(exporter.calls == 0);

    let arc_collector = Arc::new(collector);
    arc_collector
        .register::<i64>(
            InstrumentDescriptor::new("requests", InstrumentKind::Counter, ValueType::Long),
            Aggregation::Default,
        )
        .unwrap();
    check!(arc_collector.collect_into(&mut exporter) == ExportResult::Success);
    check!(exporter.calls == 1);
}
