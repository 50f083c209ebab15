//! Per-series accumulation state and the collect step for each aggregation
//! kind.
//!
//! One aggregator instance is owned by exactly one (instrument, attribute set)
//! series. Recording and collection may race from different threads; every
//! implementation applies each recording atomically, so a concurrent collect
//! observes a consistent prefix of the recordings — never a partial update.

mod histogram;
mod last_value;
mod sum;

pub use histogram::HistogramAggregator;
pub use last_value::LastValueAggregator;
pub use sum::SumAggregator;

use crate::data::PointValue;
use crate::temporality::Temporality;
use crate::value::MeasurementValue;

/// Mutable accumulation state for one series of one aggregation kind.
pub trait Aggregator<T: MeasurementValue>: Send + Sync {
    /// Merge one measurement into the accumulation state.
    ///
    /// Returns whether the measurement was accepted. A kind's policy may
    /// reject a measurement (a monotonic sum rejects negative deltas, every
    /// kind rejects non-finite doubles); rejected measurements must not be
    /// offered to the series' reservoir, and rejection is reported to the
    /// caller rather than thrown into the recording thread.
    fn record(&self, value: T, epoch_nanos: u64) -> bool;

    /// Produce the kind-specific value for the current reporting window.
    ///
    /// Delta temporality resets (or re-baselines) the window state; cumulative
    /// temporality leaves it accumulating. Returns `None` only when the series
    /// has not completed a single recording yet — possible when a collection
    /// lands between bucket creation and the first `record` call.
    fn collect(&self, temporality: Temporality) -> Option<PointValue>;
}
