//! Declaration / suppression pattern configuration.
//!
//! The scanner and the mutator never hardcode a test convention; they read
//! it from [`SelectorPatterns`], built from a [`TestFramework`] preset or
//! from user-supplied regexes.

use std::{fmt, ops::Range, str::FromStr, sync::Arc};

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use thiserror::Error;

static ESPRESSO: Lazy<Arc<SelectorPatterns>> = Lazy::new(|| Arc::new(TestFramework::Espresso.compile_preset()));
static JUNIT: Lazy<Arc<SelectorPatterns>> = Lazy::new(|| Arc::new(TestFramework::Junit.compile_preset()));

/// Built-in test conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TestFramework {
    /// `test_*` method heads, `@Suppress` marker.
    #[default]
    Espresso,
    /// JUnit 3 style `void test*()` heads, `@Ignore` marker.
    Junit,
}

impl TestFramework {
    pub fn declaration_pattern(self) -> &'static str {
        match self {
            Self::Espresso => r"\b(test_\w+)\(",
            Self::Junit => r"\bvoid\s+(test\w*)\s*\(",
        }
    }

    pub fn suppress_pattern(self) -> &'static str {
        match self {
            Self::Espresso => r"@Suppress\b",
            Self::Junit => r"@Ignore\b",
        }
    }

    pub fn marker_text(self) -> &'static str {
        match self {
            Self::Espresso => "\t@Suppress",
            Self::Junit => "\t@Ignore",
        }
    }

    /// Shared, precompiled patterns for this preset.
    pub fn patterns(self) -> Arc<SelectorPatterns> {
        match self {
            Self::Espresso => Arc::clone(&ESPRESSO),
            Self::Junit => Arc::clone(&JUNIT),
        }
    }

    pub fn from_setting_value(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "espresso" => Some(Self::Espresso),
            "junit" | "junit3" => Some(Self::Junit),
            _ => None,
        }
    }

    fn compile_preset(self) -> SelectorPatterns {
        // Preset sources are constants covered by tests.
        SelectorPatterns::new(self.declaration_pattern(), self.suppress_pattern(), self.marker_text())
            .expect("built-in test framework patterns compile")
    }
}

impl fmt::Display for TestFramework {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::Espresso => f.write_str("espresso"),
            Self::Junit => f.write_str("junit"),
        }
    }
}

impl FromStr for TestFramework {
    type Err = PatternError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::from_setting_value(value).ok_or_else(|| PatternError::UnknownFramework(value.to_string()))
    }
}

#[derive(Debug, Clone, Error)]
pub enum PatternError {
    #[error("invalid declaration pattern `{pattern}`: {source}")]
    InvalidDeclaration {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("invalid suppress pattern `{pattern}`: {source}")]
    InvalidSuppress {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("marker text must not be blank")]
    EmptyMarker,
    #[error("marker text `{marker}` is not matched by the suppress pattern `{pattern}`")]
    MarkerNotSuppressing {
        marker: String,
        pattern: String,
    },
    #[error("unknown test framework `{0}`")]
    UnknownFramework(String),
}

/// Compiled declaration pattern, suppress pattern and marker text.
///
/// Both patterns match case-insensitively. The marker text is what gets
/// inserted above a declaration to suppress it, so it must itself match the
/// suppress pattern or a freshly inserted marker would be invisible to the
/// next scan.
#[derive(Debug, Clone)]
pub struct SelectorPatterns {
    declaration: Regex,
    suppress: Regex,
    marker_text: String,
    skip_blank_lines: bool,
}

impl SelectorPatterns {
    pub fn new(
        declaration: &str,
        suppress: &str,
        marker_text: &str,
    ) -> Result<Self, PatternError> {
        let declaration_re = case_insensitive(declaration).map_err(|source| PatternError::InvalidDeclaration {
            pattern: declaration.to_string(),
            source,
        })?;
        let suppress_re = case_insensitive(suppress).map_err(|source| PatternError::InvalidSuppress {
            pattern: suppress.to_string(),
            source,
        })?;
        if marker_text.trim().is_empty() {
            return Err(PatternError::EmptyMarker);
        }
        if !suppress_re.is_match(marker_text) {
            return Err(PatternError::MarkerNotSuppressing {
                marker: marker_text.to_string(),
                pattern: suppress.to_string(),
            });
        }
        Ok(Self {
            declaration: declaration_re,
            suppress: suppress_re,
            marker_text: marker_text.to_string(),
            skip_blank_lines: false,
        })
    }

    pub fn for_framework(framework: TestFramework) -> Arc<Self> {
        framework.patterns()
    }

    /// When set, blank lines between a marker and a declaration do not
    /// clear the pending suppression.
    pub fn with_skip_blank_lines(
        mut self,
        skip: bool,
    ) -> Self {
        self.skip_blank_lines = skip;
        self
    }

    pub fn skip_blank_lines(&self) -> bool {
        self.skip_blank_lines
    }

    pub fn marker_text(&self) -> &str {
        &self.marker_text
    }

    /// The marker without surrounding indentation.
    pub fn marker_token(&self) -> &str {
        self.marker_text.trim()
    }

    pub fn declaration_source(&self) -> &str {
        self.declaration.as_str()
    }

    pub fn suppress_source(&self) -> &str {
        self.suppress.as_str()
    }

    pub fn is_suppress_line(
        &self,
        line: &str,
    ) -> bool {
        self.suppress.is_match(line)
    }

    /// Byte range of the first suppress match on `line`.
    pub fn suppress_match(
        &self,
        line: &str,
    ) -> Option<Range<usize>> {
        self.suppress.find(line).map(|found| found.range())
    }

    /// Declared test name on `line` and its byte column.
    ///
    /// The first capture group is the name when the pattern has one;
    /// otherwise the whole match minus its trailing `(`.
    pub fn declaration_name<'t>(
        &self,
        line: &'t str,
    ) -> Option<(usize, &'t str)> {
        let captures = self.declaration.captures(line)?;
        let (column, name) = match captures.get(1) {
            Some(group) => (group.start(), group.as_str()),
            None => {
                let whole = captures.get(0)?;
                let text = whole.as_str();
                let text = text.strip_suffix('(').unwrap_or(text).trim_end();
                (whole.start(), text)
            },
        };
        if name.is_empty() {
            return None;
        }
        Some((column, name))
    }
}

fn case_insensitive(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}

#[cfg(test)]
#[path = "../../tests/src/scan/patterns_tests.rs"]
mod tests;
