//! # Replay Analyzer
//!
//! Single-pass statistics and pluggable analyzers over parsed real-time-strategy replays.
//!
//! It provides:
//! - Derived match statistics (winner, per-player APM, last action, start facing) computed
//!   at most once per record (see [`summary`])
//! - A closed set of named analyzers selected by name with optional arguments (see [`analyzer`])
//! - A [`Pipeline`](crate::pipeline::Pipeline) feeding one shared, ordered traversal of the
//!   command log to every selected analyzer, stopping early once all of them are done
//! - A [`ResultFilter`](crate::filter::ResultFilter) admitting matches on boolean results
//! - A parallel [`BatchRunner`](crate::runner::BatchRunner) emitting rows to a
//!   [`RowSink`](crate::runner::RowSink)
//!
//! Decoding replay files is not part of this crate: records are built by the caller, usually
//! from a replay parser, and handed over as [`MatchRecord`](crate::replay::MatchRecord)s.
//!
//! # Documentation Overview
//!
//! - For the input data model, see the [`replay`] and [`command`] modules.
//! - For the analyzer lifecycle and the list of built-in analyzers, see [`analyzer`] and
//!   [`REGISTRY`](crate::analyzer::REGISTRY).
//! - For configuring a batch, see [`Configuration`](crate::configuration::Configuration).
//!
//! # Usage Example
//!
//! ```no_run
//! # fn decode_replays() -> Vec<anyhow::Result<replay_analyzer::replay::MatchRecord>> { vec![] }
//! use replay_analyzer::prelude::*;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Configuration::new()
//!         .with_me(["Flash"])
//!         .with_analyzer("my-race".parse()?)
//!         .with_analyzer("my-win".parse()?)
//!         .with_analyzer("my-first-specific-unit-seconds=Vulture".parse()?)
//!         .with_filter(["my-win"]);
//!
//!     let runner = BatchRunner::new(&config)?;
//!     let mut rows: Vec<Row> = vec![];
//!     let report = runner.run(decode_replays(), &mut rows)?;
//!
//!     for row in &rows {
//!         let line = row
//!             .iter()
//!             .map(|(_, value)| value.unwrap_or(""))
//!             .collect::<Vec<_>>()
//!             .join(",");
//!         println!("{line}");
//!     }
//!     println!("{} of {} matches won", report.emitted, report.matches);
//!     Ok(())
//! }
//! ```

pub use anyhow;
pub mod analyzer;
pub mod command;
pub mod configuration;
pub mod filter;
mod logger;
pub mod pipeline;
pub mod replay;
pub mod runner;
pub mod summary;

/// Commonly used types and traits for quick access.
///
/// ```rust
/// use replay_analyzer::prelude::*;
/// ```
pub mod prelude {
    pub use crate::analyzer::{Analyzer, AnalyzerSpec};
    pub use crate::command::{Command, CommandKind};
    pub use crate::configuration::Configuration;
    pub use crate::filter::{admit, ResultFilter};
    pub use crate::pipeline::{MatchResults, Pipeline};
    pub use crate::replay::{Frame, Header, MatchRecord, Player, Race};
    pub use crate::runner::{BatchReport, BatchRunner, Row, RowSink};
    pub use crate::summary::MatchSummary;
}
