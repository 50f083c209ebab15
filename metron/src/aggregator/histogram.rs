use std::sync::{Arc, Mutex};

use smallvec::{SmallVec, smallvec};

use crate::aggregator::Aggregator;
use crate::data::{HistogramPointValue, PointValue};
use crate::temporality::Temporality;
use crate::value::MeasurementValue;

/// Explicit-bucket histogram aggregator.
///
/// Bucket `i` covers `[boundaries[i-1], boundaries[i])` — lower bound
/// inclusive, upper bound exclusive — and the final bucket is unbounded
/// above. Count, sum, min, max and the bucket counter move as one logical
/// unit under a single short-lived lock, so a concurrent collect never sees a
/// half-applied measurement.
pub struct HistogramAggregator<T: MeasurementValue> {
    boundaries: Arc<[f64]>,
    state: Mutex<HistogramState<T>>,
}

struct HistogramState<T: MeasurementValue> {
    bucket_counts: SmallVec<[u64; 16]>,
    count: u64,
    sum: T,
    min: Option<T>,
    max: Option<T>,
}

impl<T: MeasurementValue> HistogramState<T> {
    fn new(buckets: usize) -> Self {
        Self {
            bucket_counts: smallvec![0; buckets],
            count: 0,
            sum: T::zero(),
            min: None,
            max: None,
        }
    }
}

impl<T: MeasurementValue> HistogramAggregator<T> {
    /// Create a histogram over the given boundaries.
    ///
    /// Boundaries must be finite and strictly increasing; the aggregation
    /// selector validates this at registration.
    pub fn new(boundaries: Arc<[f64]>) -> Self {
        let buckets = boundaries.len() + 1;
        Self {
            boundaries,
            state: Mutex::new(HistogramState::new(buckets)),
        }
    }
}

impl<T: MeasurementValue> Aggregator<T> for HistogramAggregator<T> {
    fn record(&self, value: T, _epoch_nanos: u64) -> bool {
        if !value.is_finite() {
            return false;
        }
        // boundaries <= value form the prefix, so the partition index is the
        // bucket with an inclusive lower and exclusive upper bound
        let bucket = self.boundaries.partition_point(|b| *b <= value.as_f64());
        let mut state = self.state.lock().unwrap();
        state.bucket_counts[bucket] += 1;
        state.count += 1;
        state.sum = state.sum + value;
        state.min = Some(match state.min {
            Some(min) if min <= value => min,
            _ => value,
        });
        state.max = Some(match state.max {
            Some(max) if max >= value => max,
            _ => value,
        });
        true
    }

    fn collect(&self, temporality: Temporality) -> Option<PointValue> {
        let mut state = self.state.lock().unwrap();
        let snapshot = match temporality {
            Temporality::Delta => {
                std::mem::replace(&mut *state, HistogramState::new(self.boundaries.len() + 1))
            }
            Temporality::Cumulative => HistogramState {
                bucket_counts: state.bucket_counts.clone(),
                count: state.count,
                sum: state.sum,
                min: state.min,
                max: state.max,
            },
        };
        drop(state);
        Some(PointValue::Histogram(HistogramPointValue {
            boundaries: self.boundaries.clone(),
            bucket_counts: snapshot.bucket_counts.to_vec(),
            count: snapshot.count,
            sum: snapshot.sum.to_number(),
            min: snapshot.min.map(T::to_number),
            max: snapshot.max.map(T::to_number),
        }))
    }
}
