//! Decides whether the results of a match are emitted.
//!
//! Only the canonical `"true"` value counts: a required name must be present and true, an
//! excluded name must not be true (absent passes). Both conditions are checked independently.

use crate::pipeline::MatchResults;

/// Admits `results` if every `required` name is true and no `excluded` name is true.
pub fn admit<S: AsRef<str>>(results: &MatchResults, required: &[S], excluded: &[S]) -> bool {
    required.iter().all(|name| results.is_true(name.as_ref()))
        && !excluded.iter().any(|name| results.is_true(name.as_ref()))
}

/// Owned inclusion/exclusion predicate, built once per run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultFilter {
    required: Vec<String>,
    excluded: Vec<String>,
}

impl ResultFilter {
    /// Filter admitting every match.
    pub fn new() -> Self {
        Self::default()
    }

    /// Names that must be true.
    pub fn with_required<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            required: names.into_iter().map(Into::into).collect(),
            ..self
        }
    }

    /// Names that must not be true.
    pub fn with_excluded<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            excluded: names.into_iter().map(Into::into).collect(),
            ..self
        }
    }

    pub fn required(&self) -> &[String] {
        &self.required
    }

    pub fn excluded(&self) -> &[String] {
        &self.excluded
    }

    /// Every name the filter looks at, required first.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.required
            .iter()
            .chain(&self.excluded)
            .map(String::as_str)
    }

    pub fn admit(&self, results: &MatchResults) -> bool {
        admit(results, self.required.as_slice(), self.excluded.as_slice())
    }
}
