#![deny(missing_docs)]
#![doc = include_str!("../README.md")]

use std::io::{self, Write};

use metron::{
    AlwaysCumulative, AttributeSet, Exemplar, ExportResult, MetricData, MetricExporter,
    NumberValue, Point, PointValue, TemporalitySelector, TraceContext,
};
use serde_json::{Map, Value, json};

/// Exporter printing each metric record to a writer, one JSON object per line
/// by default, or as a human-readable block in debug mode.
pub struct StdoutMetricExporter<W = io::Stdout> {
    writer: W,
    debug: bool,
    temporality: Box<dyn TemporalitySelector>,
}

impl StdoutMetricExporter<io::Stdout> {
    /// Exporter writing to the process stdout.
    pub fn new(debug: bool) -> Self {
        Self::with_writer(io::stdout(), debug)
    }
}

impl<W: Write + Send> StdoutMetricExporter<W> {
    /// Exporter writing to an arbitrary writer; lets tests capture output.
    pub fn with_writer(writer: W, debug: bool) -> Self {
        Self { writer, debug, temporality: Box::new(AlwaysCumulative) }
    }

    /// Replace the temporality policy this exporter asks collectors to use.
    pub fn with_temporality(mut self, selector: impl TemporalitySelector + 'static) -> Self {
        self.temporality = Box::new(selector);
        self
    }

    /// The temporality policy a collector feeding this exporter should be
    /// configured with. Defaults to [`AlwaysCumulative`].
    pub fn temporality_selector(&self) -> &dyn TemporalitySelector {
        self.temporality.as_ref()
    }

    fn write_debug(&mut self, metric: &MetricData) -> io::Result<()> {
        let w = &mut self.writer;
        writeln!(w, "{}", "-".repeat(40))?;
        writeln!(w, "Name: {}", metric.name)?;
        writeln!(w, "Description: {}", metric.description)?;
        writeln!(w, "Unit: {}", metric.unit)?;
        writeln!(w, "IsMonotonic: {}", metric.is_monotonic)?;
        writeln!(w, "Type: {}", metric.instrument_kind)?;
        writeln!(w, "AggregationTemporality: {}", metric.temporality)?;
        if !metric.points.is_empty() {
            writeln!(w, "DataPoints:")?;
            for point in &metric.points {
                writeln!(w, "  - StartEpochNanos: {}", point.start_epoch_nanos)?;
                writeln!(w, "    EndEpochNanos: {}", point.end_epoch_nanos)?;
                writeln!(w, "    Attributes: {}", point.attributes)?;
                write_debug_value(w, &point.value)?;
                if !point.exemplars.is_empty() {
                    writeln!(w, "    Exemplars:")?;
                    for exemplar in &point.exemplars {
                        writeln!(w, "      - EpochNanos: {}", exemplar.epoch_nanos)?;
                        if let Some(ctx) = &exemplar.trace_context {
                            writeln!(
                                w,
                                "        SpanContext: {:032x}-{:016x}",
                                ctx.trace_id, ctx.span_id
                            )?;
                        }
                        writeln!(w, "        Value: {}", number(&exemplar.value))?;
                    }
                }
            }
        }
        writeln!(w, "{}\n", "-".repeat(40))
    }

    fn write_json(&mut self, metric: &MetricData) -> io::Result<()> {
        let value = metric_to_json(metric);
        serde_json::to_writer(&mut self.writer, &value).map_err(io::Error::other)?;
        writeln!(self.writer)
    }
}

impl<W: Write + Send> MetricExporter for StdoutMetricExporter<W> {
    fn export(&mut self, metrics: Vec<MetricData>) -> ExportResult {
        for metric in &metrics {
            let written = if self.debug {
                self.write_debug(metric)
            } else {
                self.write_json(metric)
            };
            if let Err(err) = written {
                tracing::error!(?err, "failed to write metric record");
                return ExportResult::Failure;
            }
        }
        ExportResult::Success
    }

    fn force_flush(&mut self) -> ExportResult {
        match self.writer.flush() {
            Ok(()) => ExportResult::Success,
            Err(err) => {
                tracing::error!(?err, "failed to flush metric output");
                ExportResult::Failure
            }
        }
    }

    fn shutdown(&mut self) -> ExportResult {
        self.force_flush()
    }
}

fn write_debug_value(w: &mut impl Write, value: &PointValue) -> io::Result<()> {
    match value {
        PointValue::Sum(v) | PointValue::LastValue(v) => {
            writeln!(w, "    Value: {}", number(v))
        }
        PointValue::Histogram(hist) => {
            writeln!(w, "    Count: {}", hist.count)?;
            writeln!(w, "    Sum: {}", number(&hist.sum))?;
            writeln!(w, "    Boundaries: {:?}", hist.boundaries)?;
            writeln!(w, "    BucketCounts: {:?}", hist.bucket_counts)
        }
        _ => unreachable!("unknown PointValue variant"),
    }
}

fn number(value: &NumberValue) -> Value {
    match value {
        NumberValue::Long(v) => json!(v),
        NumberValue::Double(v) => json!(v),
    }
}

fn attributes_to_json(attributes: &AttributeSet) -> Value {
    let mut map = Map::new();
    for (key, value) in attributes.iter() {
        map.insert(key.to_owned(), Value::String(value.to_string()));
    }
    Value::Object(map)
}

fn trace_context_to_json(ctx: &TraceContext) -> Value {
    json!({
        "traceId": format!("{:032x}", ctx.trace_id),
        "spanId": format!("{:016x}", ctx.span_id),
        "sampled": ctx.sampled,
    })
}

fn exemplar_to_json(exemplar: &Exemplar) -> Value {
    let mut map = Map::new();
    map.insert("epochNanos".into(), json!(exemplar.epoch_nanos));
    map.insert("value".into(), number(&exemplar.value));
    if let Some(ctx) = &exemplar.trace_context {
        map.insert("spanContext".into(), trace_context_to_json(ctx));
    }
    let filtered: Map<String, Value> = exemplar
        .filtered_attributes
        .iter()
        .map(|(key, value)| (key.to_string(), Value::String(value.to_string())))
        .collect();
    map.insert("filteredAttributes".into(), Value::Object(filtered));
    Value::Object(map)
}

fn point_value_to_json(value: &PointValue) -> Value {
    match value {
        PointValue::Sum(v) => json!({ "sum": number(v) }),
        PointValue::LastValue(v) => json!({ "lastValue": number(v) }),
        PointValue::Histogram(hist) => json!({
            "histogram": {
                "boundaries": hist.boundaries.to_vec(),
                "bucketCounts": hist.bucket_counts,
                "count": hist.count,
                "sum": number(&hist.sum),
                "min": hist.min.as_ref().map(number),
                "max": hist.max.as_ref().map(number),
            }
        }),
        _ => unreachable!("unknown PointValue variant"),
    }
}

fn point_to_json(point: &Point) -> Value {
    json!({
        "startEpochNanos": point.start_epoch_nanos,
        "endEpochNanos": point.end_epoch_nanos,
        "attributes": attributes_to_json(&point.attributes),
        "value": point_value_to_json(&point.value),
        "exemplars": point.exemplars.iter().map(exemplar_to_json).collect::<Vec<_>>(),
    })
}

fn metric_to_json(metric: &MetricData) -> Value {
    json!({
        "name": metric.name,
        "description": metric.description,
        "unit": metric.unit,
        "isMonotonic": metric.is_monotonic,
        "type": metric.instrument_kind.to_string(),
        "aggregationTemporality": metric.temporality.to_string(),
        "points": metric.points.iter().map(point_to_json).collect::<Vec<_>>(),
    })
}
