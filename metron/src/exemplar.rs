//! Exemplar filters.
//!
//! A filter decides whether a measurement is eligible for admission into a
//! series' reservoir at all; the reservoir then decides which eligible
//! measurements to retain. The usual production choice is [`TraceBased`]:
//! keep exemplars only for measurements taken inside a sampled trace, so
//! every retained sample can be correlated with span data.

use crate::attributes::AttributeSet;
use crate::data::TraceContext;
use crate::value::NumberValue;

/// Predicate deciding whether a measurement may enter a reservoir.
pub trait ExemplarFilter: Send + Sync {
    /// Whether the measurement is eligible for reservoir admission.
    fn should_sample(
        &self,
        value: NumberValue,
        attributes: &AttributeSet,
        trace_context: Option<&TraceContext>,
    ) -> bool;
}

/// Admits every measurement.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysOn;

impl ExemplarFilter for AlwaysOn {
    fn should_sample(&self, _: NumberValue, _: &AttributeSet, _: Option<&TraceContext>) -> bool {
        true
    }
}

/// Admits no measurement; disables exemplar collection entirely.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysOff;

impl ExemplarFilter for AlwaysOff {
    fn should_sample(&self, _: NumberValue, _: &AttributeSet, _: Option<&TraceContext>) -> bool {
        false
    }
}

/// Admits only measurements taken inside an actively-sampled trace.
#[derive(Debug, Clone, Copy, Default)]
pub struct TraceBased;

impl ExemplarFilter for TraceBased {
    fn should_sample(
        &self,
        _: NumberValue,
        _: &AttributeSet,
        trace_context: Option<&TraceContext>,
    ) -> bool {
        trace_context.is_some_and(|ctx| ctx.sampled)
    }
}
