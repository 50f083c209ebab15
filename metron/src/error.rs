//! Error taxonomy of the aggregation core.
//!
//! Only configuration errors surface as `Result`s, and only at instrument
//! registration. Recording-time data errors (negative monotonic deltas,
//! non-finite values) discard the single offending measurement and report it
//! through `tracing`; collection-time failures are isolated to the affected
//! bucket. Nothing in this core terminates the host process.

use std::fmt;

use crate::descriptor::{InstrumentKind, ValueType};

/// Error surfaced synchronously from instrument registration.
#[derive(Debug)]
#[non_exhaustive]
pub enum ConfigurationError {
    /// The requested aggregation kind may not be attached to the instrument
    /// kind (for example, last-value on a counter). Never silently downgraded
    /// to a different aggregation.
    IncompatibleAggregation {
        /// Name of the instrument being registered
        instrument: String,
        /// The instrument's kind
        kind: InstrumentKind,
    },
    /// The recording handle's value type differs from the descriptor's
    /// declared value type.
    ValueTypeMismatch {
        /// Name of the instrument being registered
        instrument: String,
        /// The descriptor's declared value type
        declared: ValueType,
        /// The value type of the requested recording handle
        requested: ValueType,
    },
    /// Explicit histogram boundaries are not finite and strictly increasing.
    InvalidHistogramBoundaries {
        /// Name of the instrument being registered
        instrument: String,
    },
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IncompatibleAggregation { instrument, kind } => write!(
                f,
                "aggregation is not compatible with {kind} instrument `{instrument}`"
            ),
            Self::ValueTypeMismatch { instrument, declared, requested } => write!(
                f,
                "instrument `{instrument}` is declared as {declared} but a {requested} \
                 recording handle was requested"
            ),
            Self::InvalidHistogramBoundaries { instrument } => write!(
                f,
                "histogram boundaries for instrument `{instrument}` must be finite and \
                 strictly increasing"
            ),
        }
    }
}

impl std::error::Error for ConfigurationError {}
