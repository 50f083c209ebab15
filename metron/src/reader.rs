//! Periodic collection driver.
//!
//! A [`PeriodicReader`] owns a dedicated background thread that runs one
//! collection cycle per interval and pushes the snapshot to a
//! [`MetricExporter`]. Explicit flushes are serviced through a control
//! channel and acknowledged once the exporter has consumed the cycle.
//! Dropping the reader disconnects the channel; the worker then runs a final
//! cycle, shuts the exporter down and exits.

use std::sync::Arc;
use std::sync::mpsc::{RecvTimeoutError, Sender, channel};
use std::thread;
use std::time::Duration;

use tokio::sync::oneshot;

use crate::collector::Collector;
use crate::export::{ExportResult, MetricExporter};

enum Control {
    Flush(oneshot::Sender<ExportResult>),
    Shutdown(oneshot::Sender<ExportResult>),
}

/// Background thread collecting on an interval and exporting each cycle.
pub struct PeriodicReader {
    sender: Sender<Control>,
    handle: Option<thread::JoinHandle<()>>,
}

impl PeriodicReader {
    /// Spawn a reader collecting from `collector` every `interval`.
    pub fn new(
        collector: Arc<Collector>,
        mut exporter: impl MetricExporter + 'static,
        interval: Duration,
    ) -> Self {
        let (sender, receiver) = channel();
        let handle = thread::spawn(move || {
            loop {
                match receiver.recv_timeout(interval) {
                    Ok(Control::Flush(ack)) => {
                        let mut result = export_cycle(&collector, &mut exporter);
                        if exporter.force_flush() == ExportResult::Failure {
                            result = ExportResult::Failure;
                        }
                        let _ = ack.send(result);
                    }
                    Ok(Control::Shutdown(ack)) => {
                        let mut result = export_cycle(&collector, &mut exporter);
                        if exporter.shutdown() == ExportResult::Failure {
                            result = ExportResult::Failure;
                        }
                        let _ = ack.send(result);
                        break;
                    }
                    Err(RecvTimeoutError::Timeout) => {
                        export_cycle(&collector, &mut exporter);
                    }
                    Err(RecvTimeoutError::Disconnected) => {
                        export_cycle(&collector, &mut exporter);
                        exporter.shutdown();
                        break;
                    }
                }
            }
        });
        Self { sender, handle: Some(handle) }
    }

    /// Collect and export now, resolving once the exporter has consumed (and
    /// flushed) the cycle.
    pub async fn force_flush(&self) -> ExportResult {
        let (ack, done) = oneshot::channel();
        if self.sender.send(Control::Flush(ack)).is_err() {
            return ExportResult::Failure;
        }
        done.await.unwrap_or(ExportResult::Failure)
    }

    /// Run a final cycle, shut the exporter down and join the worker thread.
    pub async fn shutdown(mut self) -> ExportResult {
        let (ack, done) = oneshot::channel();
        if self.sender.send(Control::Shutdown(ack)).is_err() {
            return ExportResult::Failure;
        }
        let result = done.await.unwrap_or(ExportResult::Failure);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
        result
    }
}

fn export_cycle(collector: &Collector, exporter: &mut impl MetricExporter) -> ExportResult {
    let result = collector.collect_into(exporter);
    if result == ExportResult::Failure {
        tracing::error!("periodic metric export failed; dropping the cycle");
    }
    result
}
