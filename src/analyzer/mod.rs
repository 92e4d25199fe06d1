//! Pluggable single-pass analyzers.
//!
//! An analyzer computes one named fact about a match. The [`Pipeline`](crate::pipeline::Pipeline)
//! drives every selected analyzer through the same lifecycle:
//!
//! 1. [`Analyzer::start`] is called once with header-level context ([`StartContext`]). Analyzers
//!    that only need the header, the summary or the origin path finish right there.
//! 2. [`Analyzer::process_command`] is then called for every command of the log, in log order,
//!    until the analyzer returns [`Progress::Done`] or an error.
//! 3. [`Analyzer::result`] is read once, when the analyzer reports [`Progress::Done`].
//!
//! Analyzers never see each other: an analyzer must not assume anything about which commands
//! another analyzer has processed.
//!
//! The set of analyzers is closed: every built-in kind is listed in the static
//! [`REGISTRY`](registry::REGISTRY), which maps names to descriptors able to validate arguments
//! and build an [`AnyAnalyzer`].

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::command::Command;
use crate::replay::{MatchRecord, Player};
use crate::summary::MatchSummary;

mod commands;
mod header;
pub mod registry;

pub use commands::{FirstChatSeconds, FirstUnitSeconds};
pub use header::{HeaderAnalyzer, HeaderFact};
pub use registry::{descriptor, AnalyzerDescriptor, REGISTRY};

/// Canonical result of a boolean analyzer that holds.
pub const TRUE: &str = "true";
/// Canonical result of a boolean analyzer that does not hold.
pub const FALSE: &str = "false";

pub(crate) fn bool_result(value: bool) -> String {
    let result = if value { TRUE } else { FALSE };
    result.to_owned()
}

/// What the analyzer wants after a lifecycle call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// Keep feeding commands.
    Continue,
    /// The result is final; no more commands are needed.
    Done,
}

/// Header-level context given to [`Analyzer::start`].
#[derive(Debug, Clone, Copy)]
pub struct StartContext<'a> {
    /// The match being analyzed.
    pub record: &'a MatchRecord,
    /// Derived statistics, `None` if the derivation failed.
    pub summary: Option<&'a MatchSummary>,
    /// The primary player, when one of the configured names plays in the match.
    pub me: Option<&'a Player>,
}

/// Runtime failure of an analyzer. The analyzer is dropped from the match without a result.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// The record was not decoded from a file.
    #[error("match record has no origin path")]
    MissingPath,

    /// The origin path has no file name component.
    #[error("origin path '{0}' has no file name")]
    NoFileName(String),

    #[error("invalid time format description: {0}")]
    TimeFormatDescription(#[from] time::error::InvalidFormatDescription),

    #[error("could not format time: {0}")]
    TimeFormat(#[from] time::error::Format),
}

/// Invalid analyzer selection or arguments, detected when the pipeline is built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgumentError {
    /// No analyzer with that name is registered.
    #[error("unknown analyzer '{0}'")]
    UnknownAnalyzer(String),

    /// The analyzer needs at least one argument.
    #[error("analyzer '{0}' requires at least one argument")]
    MissingArguments(&'static str),

    /// The analyzer does not take arguments.
    #[error("analyzer '{0}' does not take arguments")]
    UnexpectedArguments(&'static str),

    #[error("unknown race '{0}'")]
    UnknownRace(String),

    /// Empty analyzer name in a selection string.
    #[error("empty analyzer name")]
    EmptyName,
}

/// A single-pass, stateful unit of per-match computation.
pub trait Analyzer {
    /// Called once before the command pass, with header-level context only.
    ///
    /// # Errors
    /// An error removes the analyzer from the match without a result.
    fn start(&mut self, ctx: &StartContext<'_>) -> Result<Progress, AnalyzerError>;

    /// Called for every command of the log, in order, while the analyzer is active.
    ///
    /// # Errors
    /// An error removes the analyzer from the match without a result.
    fn process_command(&mut self, cmd: &Command) -> Result<Progress, AnalyzerError>;

    /// Final result, read once when the analyzer is done. `None` means unknown.
    fn result(&self) -> Option<String>;
}

/// Every built-in analyzer kind.
///
/// Cloning an analyzer that was never started yields a fresh instance, which is how the
/// pipeline instantiates analyzers for each match.
#[derive(Debug, Clone)]
pub enum AnyAnalyzer {
    /// Analyzers answering from the header, summary or origin path.
    Header(HeaderAnalyzer),
    /// `my-first-specific-unit-seconds`.
    FirstUnit(FirstUnitSeconds),
    /// `my-first-chat-seconds`.
    FirstChat(FirstChatSeconds),
}

impl Analyzer for AnyAnalyzer {
    fn start(&mut self, ctx: &StartContext<'_>) -> Result<Progress, AnalyzerError> {
        match self {
            AnyAnalyzer::Header(a) => a.start(ctx),
            AnyAnalyzer::FirstUnit(a) => a.start(ctx),
            AnyAnalyzer::FirstChat(a) => a.start(ctx),
        }
    }

    fn process_command(&mut self, cmd: &Command) -> Result<Progress, AnalyzerError> {
        match self {
            AnyAnalyzer::Header(a) => a.process_command(cmd),
            AnyAnalyzer::FirstUnit(a) => a.process_command(cmd),
            AnyAnalyzer::FirstChat(a) => a.process_command(cmd),
        }
    }

    fn result(&self) -> Option<String> {
        match self {
            AnyAnalyzer::Header(a) => a.result(),
            AnyAnalyzer::FirstUnit(a) => a.result(),
            AnyAnalyzer::FirstChat(a) => a.result(),
        }
    }
}

/// Selection of an analyzer by name, with its optional raw argument string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzerSpec {
    /// Registered analyzer name.
    pub name: String,
    /// Comma-separated arguments, e.g. `"Zergling, Hydralisk"`.
    pub arguments: Option<String>,
}

impl AnalyzerSpec {
    /// Selects an analyzer without arguments.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: None,
        }
    }

    /// Selects an analyzer with a comma-separated argument string.
    pub fn with_arguments(name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: Some(arguments.into()),
        }
    }

    /// Arguments split on commas, trimmed, without empty items.
    pub fn argument_list(&self) -> Vec<String> {
        self.arguments
            .as_deref()
            .map(split_arguments)
            .unwrap_or_default()
    }
}

/// Parses `name` or `name=arg1,arg2`.
impl FromStr for AnalyzerSpec {
    type Err = ArgumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, arguments) = match s.split_once('=') {
            Some((name, arguments)) => (name.trim(), Some(arguments.trim().to_owned())),
            None => (s.trim(), None),
        };
        if name.is_empty() {
            return Err(ArgumentError::EmptyName);
        }
        Ok(Self {
            name: name.to_owned(),
            arguments,
        })
    }
}

impl fmt::Display for AnalyzerSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.arguments {
            Some(arguments) => write!(f, "{}={arguments}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// Splits a comma-separated argument string, trimming items and dropping empty ones.
pub fn split_arguments(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_owned)
        .collect()
}
