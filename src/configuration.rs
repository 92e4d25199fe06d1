//! Config for the batch behaviors
//!
//! This module provides configuration options for selecting analyzers, identifying the primary
//! player, filtering emitted rows and controlling how a batch is executed.
//!
//! Configuration can be created programmatically using [`Configuration::new()`] or by reading
//! environment variables using [`Configuration::from_env()`].
//!
//! # Environment Variables
//!
//! The following environment variables can be used to override configuration values. All
//! values are optional. Flags are case-insensitive: set the value to `"true"` to enable one.
//!
//! - `REPLAY_ME`: comma-separated names of the primary player (default: none)
//! - `REPLAY_ANALYZERS`: `;`-separated analyzer selection, each `name` or `name=arg1,arg2`
//!   (default: none)
//! - `REPLAY_FILTER`: comma-separated boolean analyzers that must be `true` (default: none)
//! - `REPLAY_FILTER_NOT`: comma-separated boolean analyzers that must not be `true`
//!   (default: none)
//! - `REPLAY_THREADS`: number of worker threads (default: logical CPU count)
//! - `REPLAY_EARLY_EXIT`: stop the command pass once every analyzer is done (default: `true`)
//! - `REPLAY_LOG`: enable logging to a file (default: `false`)
//! - `REPLAY_LOG_DIR`: directory of the log file (default: working directory)

use std::path::PathBuf;

use anyhow::{bail, Context};
use tracing::warn;

use crate::analyzer::{descriptor, split_arguments, AnalyzerSpec};
use crate::filter::ResultFilter;
use crate::pipeline::Pipeline;

/// Configuration for batch behaviors.
#[derive(Debug, Clone)]
pub struct Configuration {
    pub(crate) me: Vec<String>,
    pub(crate) analyzers: Vec<AnalyzerSpec>,
    pub(crate) filter: Vec<String>,
    pub(crate) filter_not: Vec<String>,
    pub(crate) threads: usize,
    pub(crate) early_exit: bool,
    pub(crate) log: bool,
    pub(crate) log_dir: Option<PathBuf>,
}

impl Configuration {
    /// Create a new configuration with default parameters.
    ///
    /// By default:
    /// - No primary player and no analyzer are selected.
    /// - Every match is emitted.
    /// - One worker thread per logical CPU is used.
    /// - The command pass stops once every analyzer is done.
    /// - Logging to file is disabled.
    pub fn new() -> Self {
        Self {
            me: vec![],
            analyzers: vec![],
            filter: vec![],
            filter_not: vec![],
            threads: num_cpus::get(),
            early_exit: true,
            log: false,
            log_dir: None,
        }
    }

    /// Create configuration from environment variables (see module documentation).
    ///
    /// Unset variables keep their default value.
    ///
    /// # Errors
    /// Returns an error if `REPLAY_ANALYZERS` or `REPLAY_THREADS` cannot be parsed.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get_env_flag = |var: &str, default: bool| match lookup(var) {
            Some(val) => val.eq_ignore_ascii_case("true"),
            None => default,
        };
        let get_env_list = |var: &str| lookup(var).map(|val| split_arguments(&val)).unwrap_or_default();

        let analyzers = match lookup("REPLAY_ANALYZERS") {
            Some(val) => parse_analyzers(&val).context("invalid REPLAY_ANALYZERS")?,
            None => vec![],
        };
        let threads = match lookup("REPLAY_THREADS") {
            Some(val) => parse_threads(&val).context("invalid REPLAY_THREADS")?,
            None => num_cpus::get(),
        };

        Ok(Self {
            me: get_env_list("REPLAY_ME"),
            analyzers,
            filter: get_env_list("REPLAY_FILTER"),
            filter_not: get_env_list("REPLAY_FILTER_NOT"),
            threads,
            early_exit: get_env_flag("REPLAY_EARLY_EXIT", true),
            log: get_env_flag("REPLAY_LOG", false),
            log_dir: lookup("REPLAY_LOG_DIR").map(PathBuf::from),
        })
    }

    /// Set the names identifying the primary player.
    pub fn with_me<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.me = names.into_iter().map(Into::into).collect();
        self
    }

    /// Set the analyzer selection.
    pub fn with_analyzers(mut self, analyzers: Vec<AnalyzerSpec>) -> Self {
        self.analyzers = analyzers;
        self
    }

    /// Add one analyzer to the selection.
    pub fn with_analyzer(mut self, analyzer: AnalyzerSpec) -> Self {
        self.analyzers.push(analyzer);
        self
    }

    /// Set the boolean analyzers that must be `true` for a row to be emitted.
    pub fn with_filter<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filter = names.into_iter().map(Into::into).collect();
        self
    }

    /// Set the boolean analyzers that must not be `true` for a row to be emitted.
    pub fn with_filter_not<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filter_not = names.into_iter().map(Into::into).collect();
        self
    }

    /// Set the number of worker threads. Zero is treated as one.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Enable or disable stopping the command pass early.
    pub fn with_early_exit(mut self, value: bool) -> Self {
        self.early_exit = value;
        self
    }

    /// Enable or disable logging to file.
    pub fn with_log(mut self, value: bool) -> Self {
        self.log = value;
        self
    }

    /// Set the directory of the log file.
    pub fn with_log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(dir.into());
        self
    }

    /// Build the validated pipeline. Invalid selections are logged and left out.
    pub fn pipeline(&self) -> Pipeline {
        Pipeline::new(&self.analyzers)
            .with_me(self.me.iter().cloned())
            .with_early_exit(self.early_exit)
    }

    /// Build the row filter. Names that are not boolean analyzers, or that are not selected,
    /// are reported since they can never be `true`.
    pub fn result_filter(&self) -> ResultFilter {
        let filter = ResultFilter::new()
            .with_required(self.filter.iter().cloned())
            .with_excluded(self.filter_not.iter().cloned());
        for name in filter.names() {
            match descriptor(name) {
                Some(d) if d.boolean_result => {
                    if !self.analyzers.iter().any(|spec| spec.name == name) {
                        warn!(name, "filter on an analyzer that is not selected");
                    }
                }
                Some(_) => warn!(name, "filter on an analyzer without boolean result"),
                None => warn!(name, "filter on an unknown analyzer"),
            }
        }
        filter
    }

    pub fn threads(&self) -> usize {
        self.threads.max(1)
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_analyzers(value: &str) -> anyhow::Result<Vec<AnalyzerSpec>> {
    value
        .split(';')
        .filter(|item| !item.trim().is_empty())
        .map(|item| {
            item.parse::<AnalyzerSpec>()
                .with_context(|| format!("invalid analyzer selection '{item}'"))
        })
        .collect()
}

fn parse_threads(value: &str) -> anyhow::Result<usize> {
    let threads: usize = value.trim().parse()?;
    if threads == 0 {
        bail!("thread count must be at least 1");
    }
    Ok(threads)
}
