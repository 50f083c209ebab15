#![deny(missing_docs)]
#![doc = include_str!("../README.md")]

pub mod aggregation;
pub mod aggregator;
pub mod attributes;
pub mod collector;
pub mod data;
pub mod descriptor;
pub mod error;
pub mod exemplar;
pub mod export;
pub mod reader;
pub mod reservoir;
pub mod temporality;
pub mod value;

pub use aggregation::Aggregation;
pub use attributes::{AttributeSet, AttributeValue};
pub use collector::{Collector, CollectorConfig, Instrument};
pub use data::{Exemplar, HistogramPointValue, MetricData, Point, PointValue, TraceContext};
pub use descriptor::{InstrumentDescriptor, InstrumentKind, ValueType};
pub use error::ConfigurationError;
pub use exemplar::{AlwaysOff, AlwaysOn, ExemplarFilter, TraceBased};
pub use export::{ExportResult, MetricExporter};
pub use reader::PeriodicReader;
pub use temporality::{
    AlwaysCumulative, AlwaysDelta, DeltaPreferred, Temporality, TemporalitySelector,
};
pub use value::{MeasurementValue, NumberValue};
