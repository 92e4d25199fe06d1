//! Parallel batch execution over many match records.
//!
//! This module defines the [`BatchRunner`] type, which applies a [`Pipeline`] and a
//! [`ResultFilter`] to an iterator of decoded records and hands admitted rows to a [`RowSink`].
//! Its responsibilities include:
//!
//! - Distributing records across worker threads (one match is always analyzed by one thread)
//! - Skipping records that failed upstream, with a logged diagnostic
//! - Emitting one [`Row`] per admitted match, with every selected field in sorted order
//! - Reporting counts in a [`BatchReport`]
//!
//! Rows are emitted in completion order, which is not the input order when more than one
//! thread is used. A sink error aborts the batch: rows already emitted stay emitted, workers stop
//! pulling new records and the error is returned.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Mutex};
use std::thread;

use anyhow::Context;
use tracing::{error, info, instrument, trace};

use crate::configuration::Configuration;
use crate::filter::ResultFilter;
use crate::logger::init_logger;
use crate::pipeline::Pipeline;
use crate::replay::MatchRecord;

/// Output row of an admitted match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    fields: Vec<(&'static str, Option<String>)>,
}

impl Row {
    /// Value of `name`, `None` if the field is absent or unknown.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| *field == name)
            .and_then(|(_, value)| value.as_deref())
    }

    /// Fields sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, Option<&str>)> + '_ {
        self.fields
            .iter()
            .map(|(name, value)| (*name, value.as_deref()))
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|(name, _)| *name)
    }
}

/// Destination of emitted rows.
pub trait RowSink {
    /// Called once before any row, with the sorted field names.
    fn begin(&mut self, _fields: &[&'static str]) -> anyhow::Result<()> {
        Ok(())
    }

    fn emit(&mut self, row: Row) -> anyhow::Result<()>;

    /// Called once after the last row of a successful batch.
    fn finish(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}

impl RowSink for Vec<Row> {
    fn emit(&mut self, row: Row) -> anyhow::Result<()> {
        self.push(row);
        Ok(())
    }
}

/// Counts of a finished batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Records pulled from the input.
    pub matches: usize,
    /// Records that failed upstream.
    pub skipped: usize,
    /// Analyzed matches admitted by the filter.
    pub admitted: usize,
    /// Rows accepted by the sink.
    pub emitted: usize,
}

enum Outcome {
    Skipped,
    Rejected,
    Admitted(Row),
}

/// Runs a pipeline over batches of records.
#[derive(Debug, Clone)]
pub struct BatchRunner {
    pipeline: Pipeline,
    filter: ResultFilter,
    threads: usize,
}

impl BatchRunner {
    /// Create a runner from a [`Configuration`], installing the file logger if enabled.
    ///
    /// # Errors
    /// Returns an error if the file logger cannot be installed.
    #[instrument(skip_all)]
    pub fn new(config: &Configuration) -> anyhow::Result<Self> {
        if config.log {
            let path = init_logger(config.log_dir.as_deref())?;
            info!(path = %path.display(), "logging to file");
        }
        trace!(?config);

        Ok(Self {
            pipeline: config.pipeline(),
            filter: config.result_filter(),
            threads: config.threads(),
        })
    }

    /// Create a runner from already built parts, using one thread.
    pub fn from_parts(pipeline: Pipeline, filter: ResultFilter) -> Self {
        Self {
            pipeline,
            filter,
            threads: 1,
        }
    }

    /// Set the number of worker threads. Zero is treated as one.
    pub fn with_threads(self, threads: usize) -> Self {
        Self {
            threads: threads.max(1),
            ..self
        }
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Analyzes every record and emits the admitted rows to `sink`.
    ///
    /// `Err` items are records that could not be decoded: they are logged and skipped.
    ///
    /// # Errors
    /// Returns the first error of `sink`. Rows emitted before it are not withdrawn.
    #[instrument(skip_all, fields(threads = self.threads))]
    pub fn run<I, S>(&self, records: I, sink: &mut S) -> anyhow::Result<BatchReport>
    where
        I: IntoIterator<Item = anyhow::Result<MatchRecord>>,
        I::IntoIter: Send,
        S: RowSink + ?Sized,
    {
        let fields = self.pipeline.field_names();
        sink.begin(&fields).context("could not start output")?;

        let records = Mutex::new(records.into_iter().enumerate());
        let stop = AtomicBool::new(false);
        let (tx_outcome, rx_outcome) = mpsc::channel();
        let mut report = BatchReport::default();

        let result = thread::scope(|scope| {
            for _ in 0..self.threads {
                let tx_outcome = tx_outcome.clone();
                let (records, stop, fields) = (&records, &stop, &fields);
                scope.spawn(move || {
                    while !stop.load(Ordering::Relaxed) {
                        let next = match records.lock() {
                            Ok(mut guard) => guard.next(),
                            Err(_) => break,
                        };
                        let Some((index, record)) = next else {
                            break;
                        };
                        let outcome = self.process(index, record, fields);
                        if tx_outcome.send(outcome).is_err() {
                            break;
                        }
                    }
                });
            }
            // workers hold the only remaining senders
            drop(tx_outcome);

            for outcome in rx_outcome {
                report.matches += 1;
                match outcome {
                    Outcome::Skipped => report.skipped += 1,
                    Outcome::Rejected => {}
                    Outcome::Admitted(row) => {
                        report.admitted += 1;
                        if let Err(err) = sink.emit(row) {
                            stop.store(true, Ordering::Relaxed);
                            return Err(err).with_context(|| {
                                format!("output failed after {} rows", report.emitted)
                            });
                        }
                        report.emitted += 1;
                    }
                }
            }
            Ok(())
        });
        result?;

        sink.finish().context("could not finish output")?;
        info!(?report, "batch finished");
        Ok(report)
    }

    fn process(
        &self,
        index: usize,
        record: anyhow::Result<MatchRecord>,
        fields: &[&'static str],
    ) -> Outcome {
        let record = match record {
            Ok(record) => record,
            Err(err) => {
                error!(index, "skipping match: {err:#}");
                return Outcome::Skipped;
            }
        };
        let results = self.pipeline.run(&record);
        if !self.filter.admit(&results) {
            trace!(index, path = ?record.path(), "match rejected by filter");
            return Outcome::Rejected;
        }
        let fields = fields
            .iter()
            .map(|&name| (name, results.get(name).map(str::to_owned)))
            .collect();
        Outcome::Admitted(Row { fields })
    }
}
