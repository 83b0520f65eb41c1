//! Incremental, case-insensitive name filtering.
//!
//! A pattern behaves like `.*<pattern>.*`: a regex searched anywhere in the
//! name. While the user is still typing a pattern may be malformed (an open
//! `(`, a dangling `\`); that is not an error worth surfacing, so
//! [`FilterState`] simply keeps the last pattern that compiled.

use regex::{Regex, RegexBuilder};
use thiserror::Error;
use tracing::debug;

use crate::scan::ScanResult;

/// Compiled filters are capped so a pathological pattern stays cheap.
const FILTER_SIZE_LIMIT: usize = 1 << 20;

#[derive(Debug, Clone, Error)]
#[error("malformed filter pattern `{pattern}`: {source}")]
pub struct FilterError {
    pub pattern: String,
    #[source]
    pub source: regex::Error,
}

#[derive(Debug, Clone)]
pub struct SearchFilter {
    regex: Regex,
}

impl SearchFilter {
    pub fn compile(pattern: &str) -> Result<Self, FilterError> {
        RegexBuilder::new(pattern)
            .case_insensitive(true)
            .size_limit(FILTER_SIZE_LIMIT)
            .build()
            .map(|regex| Self {
                regex,
            })
            .map_err(|source| FilterError {
                pattern: pattern.to_string(),
                source,
            })
    }

    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    pub fn matches(
        &self,
        name: &str,
    ) -> bool {
        self.regex.is_match(name)
    }
}

/// One-shot check. A malformed pattern hides nothing.
pub fn matches(
    pattern: &str,
    name: &str,
) -> bool {
    SearchFilter::compile(pattern).map(|filter| filter.matches(name)).unwrap_or(true)
}

/// The filter currently applied to a declaration list.
#[derive(Debug, Clone, Default)]
pub struct FilterState {
    active: Option<SearchFilter>,
}

impl FilterState {
    /// Apply `pattern`. An empty pattern clears the filter; a malformed one
    /// leaves the previous filter in place. Returns whether visibility may
    /// have changed.
    pub fn update(
        &mut self,
        pattern: &str,
    ) -> bool {
        if pattern.is_empty() {
            return self.active.take().is_some();
        }
        match SearchFilter::compile(pattern) {
            Ok(filter) => {
                self.active = Some(filter);
                true
            },
            Err(error) => {
                debug!("[filter] keeping previous filter: {error}");
                false
            },
        }
    }

    pub fn clear(&mut self) {
        self.active = None;
    }

    pub fn active_pattern(&self) -> Option<&str> {
        self.active.as_ref().map(SearchFilter::pattern)
    }

    pub fn is_visible(
        &self,
        name: &str,
    ) -> bool {
        self.active.as_ref().is_none_or(|filter| filter.matches(name))
    }

    /// Visible names of `result`, in buffer order.
    pub fn visible<'a>(
        &self,
        result: &'a ScanResult,
    ) -> Vec<&'a str> {
        result.names().filter(|name| self.is_visible(name)).collect()
    }
}

#[cfg(test)]
#[path = "../tests/src/filter_tests.rs"]
mod tests;
