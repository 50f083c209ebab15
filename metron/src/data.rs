//! Immutable snapshot data produced by a collection cycle.
//!
//! Everything in this module is plain owned data: once a [`MetricData`] is
//! built it is never mutated, and ownership transfers to the exporter.

use std::sync::Arc;

use crate::attributes::{AttributeSet, AttributeValue};
use crate::descriptor::InstrumentKind;
use crate::temporality::Temporality;
use crate::value::NumberValue;

/// Trace/span identifiers correlating a measurement with a distributed trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceContext {
    /// 128-bit trace identifier
    pub trace_id: u128,
    /// 64-bit span identifier
    pub span_id: u64,
    /// Whether the owning trace was sampled
    pub sampled: bool,
}

/// A retained sample measurement attached to an aggregated point.
#[derive(Debug, Clone, PartialEq)]
pub struct Exemplar {
    /// When the sampled measurement was taken, in epoch nanoseconds
    pub epoch_nanos: u64,
    /// The sampled measurement's value
    pub value: NumberValue,
    /// Trace correlation, if the measurement was taken inside a span
    pub trace_context: Option<TraceContext>,
    /// Attributes present on the measurement but not part of the point's
    /// attribute set (those would be redundant with the bucketing key)
    pub filtered_attributes: Vec<(Arc<str>, AttributeValue)>,
}

/// Snapshot of an explicit-bucket histogram series.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramPointValue {
    /// Bucket boundaries; bucket `i` covers `[boundaries[i-1], boundaries[i])`
    /// and the final bucket is unbounded above
    pub boundaries: Arc<[f64]>,
    /// Per-bucket observation counts, `boundaries.len() + 1` entries
    pub bucket_counts: Vec<u64>,
    /// Total number of observations in the window
    pub count: u64,
    /// Sum of all observations in the window
    pub sum: NumberValue,
    /// Smallest observation in the window, absent when `count` is zero
    pub min: Option<NumberValue>,
    /// Largest observation in the window, absent when `count` is zero
    pub max: Option<NumberValue>,
}

/// The kind-specific payload of a [`Point`].
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum PointValue {
    /// Running or delta total of a sum series
    Sum(NumberValue),
    /// Most recent value of a gauge series
    LastValue(NumberValue),
    /// Distribution snapshot of a histogram series
    Histogram(HistogramPointValue),
}

/// Immutable snapshot of one series over one reporting window.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    /// Window start, epoch nanoseconds
    pub start_epoch_nanos: u64,
    /// Window end, epoch nanoseconds
    pub end_epoch_nanos: u64,
    /// The series' bucketing key
    pub attributes: AttributeSet,
    /// Kind-specific value
    pub value: PointValue,
    /// Representative sample measurements retained for this window
    pub exemplars: Vec<Exemplar>,
}

/// One exportable metric record: an instrument's metadata plus the points of
/// all of its live series for one collection cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricData {
    /// Instrument name
    pub name: String,
    /// Instrument description
    pub description: String,
    /// Instrument unit
    pub unit: String,
    /// The kind of instrument that produced this record
    pub instrument_kind: InstrumentKind,
    /// Whether the reported sums only ever increase
    pub is_monotonic: bool,
    /// Whether points cover the instrument lifetime or the last window
    pub temporality: Temporality,
    /// One point per live attribute-set bucket
    pub points: Vec<Point>,
}
