//! Reader events and warning delivery.
//!
//! A reader reports through a [`ReaderEvents`] observer: warnings as they
//! occur, the resolved schema once after open, and the end of input once.
//! Delivery is fire-and-continue; the observer cannot stop a read.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use delimit_model::{Column, Warning};

use crate::error::IngestError;
use crate::throttle::{Admission, WarningThrottle};

/// Observer for reader events. All methods default to doing nothing.
pub trait ReaderEvents {
    /// A recoverable issue was found.
    fn on_warning(&mut self, _warning: &Warning) {}

    /// The schema was resolved after open.
    fn on_schema_finalized(&mut self, _columns: &[Column]) {}

    /// Input is exhausted, or opening failed.
    fn on_read_finished(&mut self) {}

    /// Opening failed; return true to retry the open sequence once.
    fn on_open_error(&mut self, _error: &IngestError) -> bool {
        false
    }
}

impl ReaderEvents for () {}

impl<E: ReaderEvents + ?Sized> ReaderEvents for &mut E {
    fn on_warning(&mut self, warning: &Warning) {
        (**self).on_warning(warning);
    }

    fn on_schema_finalized(&mut self, columns: &[Column]) {
        (**self).on_schema_finalized(columns);
    }

    fn on_read_finished(&mut self) {
        (**self).on_read_finished();
    }

    fn on_open_error(&mut self, error: &IngestError) -> bool {
        (**self).on_open_error(error)
    }
}

impl<E: ReaderEvents + ?Sized> ReaderEvents for Box<E> {
    fn on_warning(&mut self, warning: &Warning) {
        (**self).on_warning(warning);
    }

    fn on_schema_finalized(&mut self, columns: &[Column]) {
        (**self).on_schema_finalized(columns);
    }

    fn on_read_finished(&mut self) {
        (**self).on_read_finished();
    }

    fn on_open_error(&mut self, error: &IngestError) -> bool {
        (**self).on_open_error(error)
    }
}

/// Observer that keeps everything it is told.
#[derive(Debug, Clone, Default)]
pub struct WarningCollector {
    pub warnings: Vec<Warning>,
    pub columns: Vec<Column>,
    pub finished: usize,
    pub open_errors: Vec<String>,
    retry_open: bool,
}

impl WarningCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collector that asks for a retry whenever opening fails.
    pub fn retrying() -> Self {
        Self {
            retry_open: true,
            ..Self::default()
        }
    }

    /// Warnings whose message contains `needle`.
    pub fn matching<'a>(&'a self, needle: &'a str) -> impl Iterator<Item = &'a Warning> {
        self.warnings
            .iter()
            .filter(move |warning| warning.message.contains(needle))
    }
}

impl ReaderEvents for WarningCollector {
    fn on_warning(&mut self, warning: &Warning) {
        self.warnings.push(warning.clone());
    }

    fn on_schema_finalized(&mut self, columns: &[Column]) {
        self.columns = columns.to_vec();
    }

    fn on_read_finished(&mut self) {
        self.finished += 1;
    }

    fn on_open_error(&mut self, error: &IngestError) -> bool {
        self.open_errors.push(error.to_string());
        self.retry_open
    }
}

/// Messages raised for the current record, by column ordinal.
///
/// Cleared when the next record is read. Unlike the event stream this is not
/// throttled, so it always describes the full state of the current record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnErrors {
    entries: BTreeMap<i64, Vec<String>>,
}

impl ColumnErrors {
    pub fn add(&mut self, ordinal: i64, message: impl Into<String>) {
        self.entries.entry(ordinal).or_default().push(message.into());
    }

    /// Messages for one ordinal joined with `"; "`.
    pub fn get(&self, ordinal: i64) -> Option<String> {
        self.entries.get(&ordinal).map(|messages| messages.join("; "))
    }

    pub fn iter(&self) -> impl Iterator<Item = (i64, &[String])> {
        self.entries
            .iter()
            .map(|(ordinal, messages)| (*ordinal, messages.as_slice()))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Cancellation flag shared between the caller and a reader.
///
/// Checked before each record; a record in progress always completes.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Throttles warnings, records them for the current record, and forwards
/// them to the observer.
pub(crate) struct Notifier<E> {
    pub(crate) events: E,
    throttle: WarningThrottle,
    pub(crate) current: ColumnErrors,
}

impl<E: ReaderEvents> Notifier<E> {
    pub(crate) fn new(events: E, max_per_kind: usize) -> Self {
        Self {
            events,
            throttle: WarningThrottle::new(max_per_kind),
            current: ColumnErrors::default(),
        }
    }

    pub(crate) fn reset(&mut self) {
        self.throttle.reset();
        self.current.clear();
    }

    pub(crate) fn warn(&mut self, warning: Warning) {
        self.current.add(warning.ordinal(), warning.message.clone());
        match self.throttle.admit(warning.kind) {
            Admission::Emit => {
                tracing::warn!(
                    record = warning.record_number,
                    line = warning.start_line,
                    ordinal = warning.ordinal(),
                    kind = %warning.kind,
                    "{}",
                    warning.message
                );
                self.events.on_warning(&warning);
            }
            Admission::Notice => {
                let notice = Warning {
                    message: WarningThrottle::notice_message(warning.kind),
                    ..warning
                };
                tracing::warn!(kind = %notice.kind, "{}", notice.message);
                self.events.on_warning(&notice);
            }
            Admission::Suppress => {}
        }
    }
}
