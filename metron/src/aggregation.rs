//! Aggregation selection and aggregator construction.
//!
//! An [`Aggregation`] names how measurements for an instrument fold into
//! per-series state. At registration it is validated against the instrument's
//! descriptor — an incompatible pairing is a [`ConfigurationError`], surfaced
//! to whoever is registering, never downgraded to some other aggregation —
//! and resolved into a plan that can mint one fresh aggregator per series.

use std::sync::Arc;

use crate::aggregator::{Aggregator, HistogramAggregator, LastValueAggregator, SumAggregator};
use crate::descriptor::{InstrumentDescriptor, InstrumentKind};
use crate::error::ConfigurationError;
use crate::value::MeasurementValue;

/// Default explicit bucket boundaries, the conventional latency-shaped set.
pub const DEFAULT_HISTOGRAM_BOUNDARIES: [f64; 15] = [
    0.0, 5.0, 10.0, 25.0, 50.0, 75.0, 100.0, 250.0, 500.0, 750.0, 1000.0, 2500.0, 5000.0, 7500.0,
    10000.0,
];

/// How measurements for an instrument fold into per-series state.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Aggregation {
    /// The kind-appropriate default: sums for counter kinds, last-value for
    /// observable gauges, an explicit-bucket histogram with
    /// [`DEFAULT_HISTOGRAM_BOUNDARIES`] for histogram instruments.
    Default,
    /// Running (or delta) total.
    Sum,
    /// Most recent value by measurement timestamp.
    LastValue,
    /// Distribution over explicit bucket boundaries.
    ExplicitBucketHistogram {
        /// Bucket boundaries, finite and strictly increasing.
        boundaries: Vec<f64>,
    },
}

enum Resolved<'a> {
    Sum,
    LastValue,
    Histogram(&'a [f64]),
}

impl Aggregation {
    fn resolve(&self, kind: InstrumentKind) -> Resolved<'_> {
        match self {
            Aggregation::Default => match kind {
                InstrumentKind::ObservableGauge => Resolved::LastValue,
                InstrumentKind::Histogram => Resolved::Histogram(&DEFAULT_HISTOGRAM_BOUNDARIES),
                _ => Resolved::Sum,
            },
            Aggregation::Sum => Resolved::Sum,
            Aggregation::LastValue => Resolved::LastValue,
            Aggregation::ExplicitBucketHistogram { boundaries } => {
                Resolved::Histogram(boundaries)
            }
        }
    }

    /// Whether this aggregation may legally be attached to instruments
    /// described by `descriptor`.
    pub fn is_compatible(&self, descriptor: &InstrumentDescriptor) -> bool {
        let kind = descriptor.kind();
        match self.resolve(kind) {
            Resolved::Sum => matches!(
                kind,
                InstrumentKind::Counter
                    | InstrumentKind::UpDownCounter
                    | InstrumentKind::ObservableCounter
                    | InstrumentKind::ObservableUpDownCounter
                    | InstrumentKind::Histogram
            ),
            Resolved::LastValue => matches!(kind, InstrumentKind::ObservableGauge),
            Resolved::Histogram(_) => {
                matches!(kind, InstrumentKind::Histogram | InstrumentKind::Counter)
            }
        }
    }

    /// Construct a fresh aggregator for one series of `descriptor`.
    ///
    /// Fails with a [`ConfigurationError`] for an incompatible pairing or
    /// malformed histogram boundaries.
    pub fn create_aggregator<T: MeasurementValue>(
        &self,
        descriptor: &InstrumentDescriptor,
    ) -> Result<Box<dyn Aggregator<T>>, ConfigurationError> {
        Ok(AggregationPlan::new(descriptor, self)?.new_aggregator())
    }
}

/// A validated aggregation bound to one instrument, able to mint one
/// aggregator per series without further checks.
pub(crate) struct AggregationPlan {
    resolved: ResolvedPlan,
}

enum ResolvedPlan {
    Sum { monotonic: bool },
    LastValue,
    Histogram { boundaries: Arc<[f64]> },
}

impl AggregationPlan {
    pub(crate) fn new(
        descriptor: &InstrumentDescriptor,
        aggregation: &Aggregation,
    ) -> Result<Self, ConfigurationError> {
        if !aggregation.is_compatible(descriptor) {
            return Err(ConfigurationError::IncompatibleAggregation {
                instrument: descriptor.name().to_owned(),
                kind: descriptor.kind(),
            });
        }
        let resolved = match aggregation.resolve(descriptor.kind()) {
            Resolved::Sum => ResolvedPlan::Sum { monotonic: descriptor.kind().is_monotonic() },
            Resolved::LastValue => ResolvedPlan::LastValue,
            Resolved::Histogram(boundaries) => {
                let well_formed = boundaries.iter().all(|b| b.is_finite())
                    && boundaries.windows(2).all(|pair| pair[0] < pair[1]);
                if !well_formed {
                    return Err(ConfigurationError::InvalidHistogramBoundaries {
                        instrument: descriptor.name().to_owned(),
                    });
                }
                ResolvedPlan::Histogram { boundaries: boundaries.into() }
            }
        };
        Ok(Self { resolved })
    }

    pub(crate) fn new_aggregator<T: MeasurementValue>(&self) -> Box<dyn Aggregator<T>> {
        match &self.resolved {
            ResolvedPlan::Sum { monotonic } => Box::new(SumAggregator::new(*monotonic)),
            ResolvedPlan::LastValue => Box::new(LastValueAggregator::new()),
            ResolvedPlan::Histogram { boundaries } => {
                Box::new(HistogramAggregator::new(boundaries.clone()))
            }
        }
    }
}
