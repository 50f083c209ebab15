//! Aggregation temporality selection.
//!
//! A [`TemporalitySelector`] is a pure function of instrument kind. It is read
//! exactly once per instrument, at registration, and cached for the
//! instrument's lifetime — aggregators depend on a stable temporality to
//! decide whether collection retains or resets their window state.

use std::fmt;

use crate::descriptor::InstrumentKind;

/// Whether reported points cover the instrument lifetime or the last window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Temporality {
    /// Points report the value accumulated since the instrument started
    Cumulative,
    /// Points report the value accumulated since the previous collection
    Delta,
}

impl fmt::Display for Temporality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Temporality::Cumulative => "cumulative",
            Temporality::Delta => "delta",
        })
    }
}

/// Policy mapping instrument kinds to a reporting temporality.
pub trait TemporalitySelector: Send + Sync {
    /// The temporality instruments of `kind` report with.
    fn temporality(&self, kind: InstrumentKind) -> Temporality;
}

/// Every instrument reports cumulative points. The common default for
/// backends that prefer stateless consumers.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysCumulative;

impl TemporalitySelector for AlwaysCumulative {
    fn temporality(&self, _kind: InstrumentKind) -> Temporality {
        Temporality::Cumulative
    }
}

/// Every instrument reports delta points.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysDelta;

impl TemporalitySelector for AlwaysDelta {
    fn temporality(&self, _kind: InstrumentKind) -> Temporality {
        Temporality::Delta
    }
}

/// Delta for everything except up-down counters, which stay cumulative —
/// deltas of a non-monotonic sum are of little use to most backends.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeltaPreferred;

impl TemporalitySelector for DeltaPreferred {
    fn temporality(&self, kind: InstrumentKind) -> Temporality {
        match kind {
            InstrumentKind::UpDownCounter | InstrumentKind::ObservableUpDownCounter => {
                Temporality::Cumulative
            }
            _ => Temporality::Delta,
        }
    }
}
