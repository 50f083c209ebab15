use std::sync::Mutex;

use crate::aggregator::Aggregator;
use crate::data::PointValue;
use crate::temporality::Temporality;
use crate::value::MeasurementValue;

/// Gauge aggregator retaining the most recent measurement.
///
/// "Most recent" is decided by the measurement's carried timestamp, not by
/// arrival order, so out-of-order delivery cannot roll a gauge backwards.
/// Because a last value has no meaningful delta, cumulative and delta
/// collection report the same value; only the reporting window differs, and
/// that is the coordinator's concern.
pub struct LastValueAggregator<T: MeasurementValue> {
    state: Mutex<Option<(T, u64)>>,
}

impl<T: MeasurementValue> LastValueAggregator<T> {
    /// Create an empty last-value aggregator.
    pub fn new() -> Self {
        Self { state: Mutex::new(None) }
    }
}

impl<T: MeasurementValue> Default for LastValueAggregator<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: MeasurementValue> Aggregator<T> for LastValueAggregator<T> {
    fn record(&self, value: T, epoch_nanos: u64) -> bool {
        if !value.is_finite() {
            return false;
        }
        let mut state = self.state.lock().unwrap();
        match *state {
            // an older measurement arriving late is valid data, it just does
            // not displace the newer stored value
            Some((_, stored_nanos)) if epoch_nanos < stored_nanos => {}
            _ => *state = Some((value, epoch_nanos)),
        }
        true
    }

    fn collect(&self, _temporality: Temporality) -> Option<PointValue> {
        let state = self.state.lock().unwrap();
        state.map(|(value, _)| PointValue::LastValue(value.to_number()))
    }
}

#[cfg(test)]
mod tests {
    use assert2::check;

    use crate::value::NumberValue;

    use super::*;

    fn collected(aggregator: &LastValueAggregator<i64>) -> Option<i64> {
        match aggregator.collect(Temporality::Cumulative) {
            Some(PointValue::LastValue(NumberValue::Long(v))) => Some(v),
            None => None,
            other => panic!("expected a long last value, got {other:?}"),
        }
    }

    #[test]
    fn in_order_recordings_keep_the_last() {
        let gauge = LastValueAggregator::<i64>::new();
        for (value, nanos) in [(10, 1), (20, 2), (15, 3)] {
            check!(gauge.record(value, nanos));
        }
        check!(collected(&gauge) == Some(15));
    }

    #[test]
    fn later_timestamp_wins_regardless_of_arrival_order() {
        let gauge = LastValueAggregator::<i64>::new();
        gauge.record(5, 10);
        gauge.record(3, 5);
        check!(collected(&gauge) == Some(5));
    }

    #[test]
    fn equal_timestamps_take_the_newest_arrival() {
        let gauge = LastValueAggregator::<i64>::new();
        gauge.record(5, 10);
        gauge.record(7, 10);
        check!(collected(&gauge) == Some(7));
    }

    #[test]
    fn empty_gauge_has_no_point() {
        let gauge = LastValueAggregator::<i64>::new();
        check!(collected(&gauge).is_none());
    }

    #[test]
    fn temporality_does_not_change_the_value() {
        let gauge = LastValueAggregator::<f64>::new();
        gauge.record(1.25, 1);
        check!(
            gauge.collect(Temporality::Delta)
                == Some(PointValue::LastValue(NumberValue::Double(1.25)))
        );
        check!(
            gauge.collect(Temporality::Cumulative)
                == Some(PointValue::LastValue(NumberValue::Double(1.25)))
        );
    }

    #[test]
    fn non_finite_values_are_discarded() {
        let gauge = LastValueAggregator::<f64>::new();
        gauge.record(2.0, 1);
        check!(!gauge.record(f64::NAN, 2));
        check!(
            gauge.collect(Temporality::Cumulative)
                == Some(PointValue::LastValue(NumberValue::Double(2.0)))
        );
    }
}
