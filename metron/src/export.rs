//! Export-sink interface.
//!
//! The core hands every collection cycle to a [`MetricExporter`] as a batch
//! of owned, immutable [`MetricData`] records. Serialization, transport,
//! batching and retries all belong to the exporter side of this boundary.

use crate::data::MetricData;

/// Outcome of an export, flush or shutdown call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportResult {
    /// The operation completed.
    Success,
    /// The operation failed; the batch is dropped (the core does not retry).
    Failure,
}

/// Push sink consuming completed collection cycles.
pub trait MetricExporter: Send {
    /// Export one collection cycle.
    fn export(&mut self, metrics: Vec<MetricData>) -> ExportResult;

    /// Flush anything buffered downstream.
    fn force_flush(&mut self) -> ExportResult {
        ExportResult::Success
    }

    /// Release resources; no call is made after shutdown.
    fn shutdown(&mut self) -> ExportResult {
        ExportResult::Success
    }
}
