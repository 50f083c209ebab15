//! The bucket map and the per-cycle collection coordinator.
//!
//! A [`Collector`] owns the registry of instruments. Each registered
//! instrument keeps a map from [`AttributeSet`] to its series state; the map
//! lock is held only for the insert-if-absent step, so two threads racing to
//! create the same series converge on one instance and the loser's
//! measurement still lands in the winner's state. Recording then happens on
//! the series' own aggregator and reservoir, outside any map-wide lock —
//! no lock in this module spans more than one bucket.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use hashbrown::HashMap;
use metron_timesource::TimeSource;

use crate::aggregation::{Aggregation, AggregationPlan};
use crate::aggregator::Aggregator;
use crate::attributes::AttributeSet;
use crate::data::{MetricData, Point, TraceContext};
use crate::descriptor::InstrumentDescriptor;
use crate::error::ConfigurationError;
use crate::exemplar::{ExemplarFilter, TraceBased};
use crate::export::{ExportResult, MetricExporter};
use crate::reservoir::{FilteredReservoir, FixedSizeReservoir};
use crate::temporality::{AlwaysCumulative, Temporality, TemporalitySelector};
use crate::value::MeasurementValue;

/// Capacity of each series' exemplar reservoir unless overridden.
pub const DEFAULT_RESERVOIR_SIZE: usize = 2;

/// Configuration for a [`Collector`].
///
/// The defaults match common production wiring: the system clock, cumulative
/// reporting, trace-based exemplar sampling, and reservoirs of
/// [`DEFAULT_RESERVOIR_SIZE`].
#[derive(Clone)]
pub struct CollectorConfig {
    time_source: TimeSource,
    temporality: Arc<dyn TemporalitySelector>,
    exemplar_filter: Arc<dyn ExemplarFilter>,
    reservoir_size: usize,
}

impl CollectorConfig {
    /// Configuration with all defaults.
    pub fn new() -> Self {
        Self {
            time_source: TimeSource::System,
            temporality: Arc::new(AlwaysCumulative),
            exemplar_filter: Arc::new(TraceBased),
            reservoir_size: DEFAULT_RESERVOIR_SIZE,
        }
    }

    /// Read time from `time_source` instead of the system clock.
    pub fn with_time_source(mut self, time_source: TimeSource) -> Self {
        self.time_source = time_source;
        self
    }

    /// Select temporality per instrument kind with `selector`.
    pub fn with_temporality(mut self, selector: impl TemporalitySelector + 'static) -> Self {
        self.temporality = Arc::new(selector);
        self
    }

    /// Gate exemplar admission with `filter`.
    pub fn with_exemplar_filter(mut self, filter: impl ExemplarFilter + 'static) -> Self {
        self.exemplar_filter = Arc::new(filter);
        self
    }

    /// Retain up to `size` exemplars per series per window. Zero disables
    /// exemplar collection.
    pub fn with_reservoir_size(mut self, size: usize) -> Self {
        self.reservoir_size = size;
        self
    }
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Drives collection cycles over every registered instrument.
pub struct Collector {
    config: CollectorConfig,
    instruments: Mutex<Vec<Arc<dyn InstrumentState>>>,
}

impl Collector {
    /// Create a collector.
    pub fn new(config: CollectorConfig) -> Self {
        Self { config, instruments: Mutex::new(Vec::new()) }
    }

    /// Register an instrument, returning its recording handle.
    ///
    /// Validates that `T` matches the descriptor's declared value type and
    /// that `aggregation` is compatible with the instrument kind. Both are
    /// configuration errors surfaced here, synchronously — never deferred to
    /// recording time.
    pub fn register<T: MeasurementValue>(
        &self,
        descriptor: InstrumentDescriptor,
        aggregation: Aggregation,
    ) -> Result<Instrument<T>, ConfigurationError> {
        if descriptor.value_type() != T::VALUE_TYPE {
            return Err(ConfigurationError::ValueTypeMismatch {
                instrument: descriptor.name().to_owned(),
                declared: descriptor.value_type(),
                requested: T::VALUE_TYPE,
            });
        }
        let plan = AggregationPlan::new(&descriptor, &aggregation)?;
        let temporality = self.config.temporality.temporality(descriptor.kind());
        let now = self.config.time_source.epoch_nanos();
        let map = Arc::new(SeriesMap {
            descriptor,
            plan,
            temporality,
            exemplar_filter: self.config.exemplar_filter.clone(),
            reservoir_size: self.config.reservoir_size,
            time_source: self.config.time_source.clone(),
            start_epoch_nanos: now,
            last_collection_nanos: AtomicU64::new(now),
            series: Mutex::new(HashMap::new()),
        });
        self.instruments.lock().unwrap().push(map.clone());
        Ok(Instrument { map })
    }

    /// Run one collection cycle over every instrument, in registration order.
    ///
    /// Safe to call while recording continues; each point reflects a
    /// consistent prefix of the concurrent recordings.
    pub fn collect(&self) -> Vec<MetricData> {
        let instruments: Vec<_> = self.instruments.lock().unwrap().clone();
        let now = self.config.time_source.epoch_nanos();
        instruments.iter().map(|instrument| instrument.collect(now)).collect()
    }

    /// Collect once and push the snapshot to `exporter`.
    ///
    /// Empty cycles (no instruments registered) are not exported.
    pub fn collect_into(&self, exporter: &mut dyn MetricExporter) -> ExportResult {
        let metrics = self.collect();
        if metrics.is_empty() {
            return ExportResult::Success;
        }
        exporter.export(metrics)
    }
}

/// Object-safe view of one instrument's storage used by the collection cycle.
trait InstrumentState: Send + Sync {
    fn collect(&self, now_nanos: u64) -> MetricData;
}

struct SeriesMap<T: MeasurementValue> {
    descriptor: InstrumentDescriptor,
    plan: AggregationPlan,
    temporality: Temporality,
    exemplar_filter: Arc<dyn ExemplarFilter>,
    reservoir_size: usize,
    time_source: TimeSource,
    /// Registration time; the start bound of every cumulative point.
    start_epoch_nanos: u64,
    /// End bound of the previous cycle; the start bound of delta points.
    last_collection_nanos: AtomicU64,
    series: Mutex<HashMap<AttributeSet, Arc<Series<T>>>>,
}

struct Series<T: MeasurementValue> {
    aggregator: Box<dyn Aggregator<T>>,
    reservoir: FilteredReservoir,
}

impl<T: MeasurementValue> Series<T> {
    /// Apply one measurement; offers to the reservoir only if the aggregation
    /// policy accepted it, so rejected measurements never become exemplars.
    fn record(
        &self,
        value: T,
        epoch_nanos: u64,
        attributes: &AttributeSet,
        trace_context: Option<TraceContext>,
    ) -> bool {
        if !self.aggregator.record(value, epoch_nanos) {
            return false;
        }
        self.reservoir.offer(value.to_number(), epoch_nanos, attributes, trace_context);
        true
    }
}

impl<T: MeasurementValue> SeriesMap<T> {
    fn series_for(&self, attributes: &AttributeSet) -> Arc<Series<T>> {
        let mut series = self.series.lock().unwrap();
        series
            .entry(attributes.clone())
            .or_insert_with(|| {
                Arc::new(Series {
                    aggregator: self.plan.new_aggregator(),
                    reservoir: FilteredReservoir::new(
                        self.exemplar_filter.clone(),
                        FixedSizeReservoir::new(self.reservoir_size),
                    ),
                })
            })
            .clone()
    }

    fn record(
        &self,
        value: T,
        attributes: AttributeSet,
        trace_context: Option<TraceContext>,
        epoch_nanos: Option<u64>,
    ) {
        let epoch_nanos = epoch_nanos.unwrap_or_else(|| self.time_source.epoch_nanos());
        let series = self.series_for(&attributes);
        if !series.record(value, epoch_nanos, &attributes, trace_context) {
            tracing::warn!(
                instrument = %self.descriptor.name(),
                "measurement rejected by aggregation policy"
            );
        }
    }
}

impl<T: MeasurementValue> InstrumentState for SeriesMap<T> {
    fn collect(&self, now_nanos: u64) -> MetricData {
        let previous_end = self.last_collection_nanos.swap(now_nanos, Ordering::AcqRel);
        let start_epoch_nanos = match self.temporality {
            Temporality::Cumulative => self.start_epoch_nanos,
            Temporality::Delta => previous_end,
        };

        // Snapshot the live buckets, then release the map lock before walking
        // them so recording stays unblocked during collection.
        let buckets: Vec<_> = {
            let series = self.series.lock().unwrap();
            series.iter().map(|(attrs, s)| (attrs.clone(), s.clone())).collect()
        };

        let mut points = Vec::with_capacity(buckets.len());
        for (attributes, series) in buckets {
            match series.aggregator.collect(self.temporality) {
                Some(value) => {
                    let exemplars = series.reservoir.collect_and_reset(&attributes);
                    points.push(Point {
                        start_epoch_nanos,
                        end_epoch_nanos: now_nanos,
                        attributes,
                        value,
                        exemplars,
                    });
                }
                // A bucket that cannot produce a point is skipped, never
                // aborting the rest of the cycle.
                None => tracing::debug!(
                    instrument = %self.descriptor.name(),
                    attributes = %attributes,
                    "series has no completed measurement; omitting its point this cycle"
                ),
            }
        }

        MetricData {
            name: self.descriptor.name().to_owned(),
            description: self.descriptor.description().to_owned(),
            unit: self.descriptor.unit().to_owned(),
            instrument_kind: self.descriptor.kind(),
            is_monotonic: self.descriptor.kind().is_monotonic(),
            temporality: self.temporality,
            points,
        }
    }
}

/// Recording handle for a registered instrument.
///
/// Cheap to clone and safe to share across threads; this is the entry point
/// the instrumentation API layer calls for every measurement.
pub struct Instrument<T: MeasurementValue> {
    map: Arc<SeriesMap<T>>,
}

impl<T: MeasurementValue> Clone for Instrument<T> {
    fn clone(&self) -> Self {
        Self { map: self.map.clone() }
    }
}

impl<T: MeasurementValue> Instrument<T> {
    /// Record one measurement, stamped with the collector's time source.
    ///
    /// Never fails and never blocks beyond a single bucket's state update; a
    /// measurement the aggregation policy rejects is discarded and reported
    /// through `tracing`.
    pub fn record(
        &self,
        value: T,
        attributes: AttributeSet,
        trace_context: Option<TraceContext>,
    ) {
        self.map.record(value, attributes, trace_context, None);
    }

    /// Record one measurement with an explicit timestamp, for callers that
    /// relay measurements taken earlier (or out of order).
    pub fn record_at(
        &self,
        value: T,
        epoch_nanos: u64,
        attributes: AttributeSet,
        trace_context: Option<TraceContext>,
    ) {
        self.map.record(value, attributes, trace_context, Some(epoch_nanos));
    }
}
