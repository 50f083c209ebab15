use crate::aggregator::Aggregator;
use crate::data::PointValue;
use crate::temporality::Temporality;
use crate::value::MeasurementValue;

/// Running-total aggregator for counter-like instruments.
///
/// Recording is a single atomic add. For delta reporting the running total is
/// never reset; instead the last-reported cumulative value is retained and
/// each delta is the difference against it, so repeated subtraction cannot
/// erode precision of the total itself.
pub struct SumAggregator<T: MeasurementValue> {
    monotonic: bool,
    total: T::Atomic,
    last_reported: T::Atomic,
}

impl<T: MeasurementValue> SumAggregator<T> {
    /// Create a sum starting at zero. `monotonic` enables the negative-delta
    /// guard for counter instruments.
    pub fn new(monotonic: bool) -> Self {
        Self {
            monotonic,
            total: T::Atomic::default(),
            last_reported: T::Atomic::default(),
        }
    }
}

impl<T: MeasurementValue> Aggregator<T> for SumAggregator<T> {
    fn record(&self, value: T, _epoch_nanos: u64) -> bool {
        if !value.is_finite() || (self.monotonic && value.is_negative()) {
            return false;
        }
        T::atomic_add(&self.total, value);
        true
    }

    fn collect(&self, temporality: Temporality) -> Option<PointValue> {
        let total = T::atomic_load(&self.total);
        let reported = match temporality {
            Temporality::Cumulative => total,
            Temporality::Delta => {
                // A record racing between the load and the swap lands in the
                // next window; each measurement is reported exactly once.
                let previous = T::atomic_swap(&self.last_reported, total);
                total - previous
            }
        };
        Some(PointValue::Sum(reported.to_number()))
    }
}

#[cfg(test)]
mod tests {
    use assert2::check;
    use rstest::rstest;

    use crate::value::NumberValue;

    use super::*;

    fn collected(aggregator: &SumAggregator<i64>, temporality: Temporality) -> i64 {
        match aggregator.collect(temporality) {
            Some(PointValue::Sum(NumberValue::Long(v))) => v,
            other => panic!("expected a long sum, got {other:?}"),
        }
    }

    #[test]
    fn cumulative_reports_the_running_total() {
        let sum = SumAggregator::<i64>::new(true);
        for delta in [1, 2, 5] {
            check!(sum.record(delta, 0));
        }
        check!(collected(&sum, Temporality::Cumulative) == 8);
        // collecting again without new recordings reports the same total
        check!(collected(&sum, Temporality::Cumulative) == 8);
    }

    #[test]
    fn deltas_partition_the_recorded_total() {
        let sum = SumAggregator::<i64>::new(true);
        let mut reported = 0;
        for delta in [3, 4, 10] {
            sum.record(delta, 0);
            reported += collected(&sum, Temporality::Delta);
        }
        check!(reported == 17);
        // an idle window reports a zero delta
        check!(collected(&sum, Temporality::Delta) == 0);
    }

    #[test]
    fn monotonic_guard_rejects_negative_deltas() {
        let sum = SumAggregator::<i64>::new(true);
        check!(sum.record(5, 0));
        check!(!sum.record(-3, 0));
        check!(collected(&sum, Temporality::Cumulative) == 5);
    }

    #[test]
    fn up_down_sums_accept_negative_deltas() {
        let sum = SumAggregator::<i64>::new(false);
        check!(sum.record(5, 0));
        check!(sum.record(-3, 0));
        check!(collected(&sum, Temporality::Cumulative) == 2);
    }

    #[rstest]
    #[case(f64::NAN)]
    #[case(f64::INFINITY)]
    #[case(f64::NEG_INFINITY)]
    fn non_finite_doubles_are_discarded(#[case] poison: f64) {
        let sum = SumAggregator::<f64>::new(false);
        check!(sum.record(1.5, 0));
        check!(!sum.record(poison, 0));
        check!(
            sum.collect(Temporality::Cumulative)
                == Some(PointValue::Sum(NumberValue::Double(1.5)))
        );
    }

    #[test]
    fn concurrent_recording_loses_nothing() {
        let sum = SumAggregator::<i64>::new(true);
        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    for _ in 0..1000 {
                        sum.record(1, 0);
                    }
                });
            }
        });
        check!(collected(&sum, Temporality::Cumulative) == 8000);
    }
}
