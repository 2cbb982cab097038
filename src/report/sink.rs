/*!
 * Report Sinks
 *
 * The detector hands finished [`RaceRecord`]s to a [`ReportSink`]. Text
 * formatting, symbolization and the output destination all belong to the
 * sink, never to the detector.
 */

use super::types::{RaceRecord, StackTrace};
use parking_lot::Mutex;
use std::io::Write;

/// Consumer of race records
///
/// Called on the racing thread, after deduplication, outside every shadow
/// lock. Implementations must not call back into the detector.
pub trait ReportSink: Send + Sync {
    fn report(&self, record: &RaceRecord);
}

impl<F> ReportSink for F
where
    F: Fn(&RaceRecord) + Send + Sync,
{
    fn report(&self, record: &RaceRecord) {
        self(record)
    }
}

/// Emits each record as a structured `tracing` warning
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl ReportSink for TracingSink {
    fn report(&self, record: &RaceRecord) {
        tracing::warn!(
            kind = %record.kind,
            address = format_args!("{:#x}", record.current.address),
            current_tid = %record.current.thread_id,
            current_epoch = %record.current.epoch,
            current_access = %record.current.kind,
            previous_tid = %record.previous.thread_id,
            previous_epoch = %record.previous.epoch,
            previous_access = %record.previous.kind,
            has_stack = record.current.stack.is_some(),
            "data race detected"
        );
    }
}

/// Discards everything (the counter and dedup set still work)
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ReportSink for NullSink {
    fn report(&self, _record: &RaceRecord) {}
}

/// Keeps every record in memory, for tests and embedding tools
#[derive(Debug, Default)]
pub struct CollectingSink {
    records: Mutex<Vec<RaceRecord>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    /// Copy of everything reported so far
    pub fn records(&self) -> Vec<RaceRecord> {
        self.records.lock().clone()
    }

    /// Take everything reported so far
    pub fn drain(&self) -> Vec<RaceRecord> {
        std::mem::take(&mut *self.records.lock())
    }
}

impl ReportSink for CollectingSink {
    fn report(&self, record: &RaceRecord) {
        self.records.lock().push(record.clone());
    }
}

/// Writes each record as one JSON line, for offline tooling
///
/// Write failures are logged and dropped; a broken output must not disturb
/// the instrumented program.
pub struct JsonLinesSink<W: Write + Send> {
    out: Mutex<W>,
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

impl<W: Write + Send> ReportSink for JsonLinesSink<W> {
    fn report(&self, record: &RaceRecord) {
        let mut out = self.out.lock();
        let written = serde_json::to_writer(&mut *out, record)
            .map_err(std::io::Error::from)
            .and_then(|()| out.write_all(b"\n"))
            .and_then(|()| out.flush());

        if let Err(e) = written {
            tracing::warn!(error = %e, "failed to write race record");
        }
    }
}

/// Source of call stacks for race records
///
/// Only consulted when stack capture is enabled in the detector options.
/// Captured on every write in that mode, so it should be cheap (raw frame
/// addresses, no symbolization).
pub trait StackCapture: Send + Sync {
    fn capture(&self) -> Option<StackTrace>;
}

impl<F> StackCapture for F
where
    F: Fn() -> Option<StackTrace> + Send + Sync,
{
    fn capture(&self) -> Option<StackTrace> {
        self()
    }
}
