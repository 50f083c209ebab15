//! Instrument descriptors
//!
//! An [`InstrumentDescriptor`] captures everything the aggregation core needs
//! to know about a named measurement point: its kind, its declared value type,
//! and the metadata an exporter will echo into metric records. Descriptors are
//! created once at registration and never mutated.

use std::fmt;

/// The kind of instrument a descriptor was registered for.
///
/// The kind drives aggregation compatibility (see
/// [`Aggregation::is_compatible`](crate::Aggregation::is_compatible)) and the
/// temporality policy (see [`crate::TemporalitySelector`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum InstrumentKind {
    /// Monotonically increasing synchronous counter
    Counter,
    /// Synchronous counter that may also decrease
    UpDownCounter,
    /// Synchronous recorder of value distributions
    Histogram,
    /// Asynchronously observed monotonic counter
    ObservableCounter,
    /// Asynchronously observed counter that may also decrease
    ObservableUpDownCounter,
    /// Asynchronously observed point-in-time value
    ObservableGauge,
}

impl InstrumentKind {
    /// Whether sums recorded through this kind only ever increase.
    pub fn is_monotonic(self) -> bool {
        matches!(self, InstrumentKind::Counter | InstrumentKind::ObservableCounter)
    }
}

impl fmt::Display for InstrumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InstrumentKind::Counter => "counter",
            InstrumentKind::UpDownCounter => "upDownCounter",
            InstrumentKind::Histogram => "histogram",
            InstrumentKind::ObservableCounter => "observableCounter",
            InstrumentKind::ObservableUpDownCounter => "observableUpDownCounter",
            InstrumentKind::ObservableGauge => "observableGauge",
        };
        f.write_str(name)
    }
}

/// The numeric representation an instrument was declared with.
///
/// The value type is resolved exactly once, at registration, into the matching
/// [`MeasurementValue`](crate::MeasurementValue) specialization; points and
/// exemplars carry the resolved [`NumberValue`](crate::NumberValue) variant so
/// no per-value inspection happens at export time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// 64-bit signed integer measurements
    Long,
    /// 64-bit floating point measurements
    Double,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ValueType::Long => "long",
            ValueType::Double => "double",
        })
    }
}

/// Immutable description of a named measurement point.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InstrumentDescriptor {
    name: String,
    description: String,
    unit: String,
    kind: InstrumentKind,
    value_type: ValueType,
}

impl InstrumentDescriptor {
    /// Create a descriptor with an empty description and unit.
    pub fn new(name: impl Into<String>, kind: InstrumentKind, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            unit: String::new(),
            kind,
            value_type,
        }
    }

    /// Attach a human-readable description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Attach a unit string (for example `"ms"` or `"By"`).
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    /// The instrument name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The human-readable description, empty if none was set.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The unit string, empty if none was set.
    pub fn unit(&self) -> &str {
        &self.unit
    }

    /// The instrument kind.
    pub fn kind(&self) -> InstrumentKind {
        self.kind
    }

    /// The declared value type.
    pub fn value_type(&self) -> ValueType {
        self.value_type
    }
}

#[cfg(test)]
mod tests {
    use assert2::check;

    use super::*;

    #[test]
    fn monotonic_kinds() {
        check!(InstrumentKind::Counter.is_monotonic());
        check!(InstrumentKind::ObservableCounter.is_monotonic());
        check!(!InstrumentKind::UpDownCounter.is_monotonic());
        check!(!InstrumentKind::ObservableGauge.is_monotonic());
        check!(!InstrumentKind::Histogram.is_monotonic());
    }

    #[test]
    fn builder_fills_metadata() {
        let descriptor =
            InstrumentDescriptor::new("latency", InstrumentKind::Histogram, ValueType::Double)
                .with_description("request latency")
                .with_unit("ms");
        check!(descriptor.name() == "latency");
        check!(descriptor.description() == "request latency");
        check!(descriptor.unit() == "ms");
        check!(descriptor.kind() == InstrumentKind::Histogram);
        check!(descriptor.value_type() == ValueType::Double);
    }
}
