use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use super::{
    cursor::LineCursor,
    patterns::{SelectorPatterns, TestFramework},
};
use crate::buffer::TextBuffer;

/// A recognised test-method head, as seen at scan time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestDeclaration {
    pub name: String,
    /// Start of the line holding the declaration.
    pub head_offset: usize,
    /// Start of the name token.
    pub name_offset: usize,
    /// 0-based line number.
    pub line: usize,
    /// Whether the line right above carried a suppress marker.
    pub suppressed: bool,
}

/// Declarations in buffer order (strictly increasing `head_offset`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ScanResult {
    declarations: Vec<TestDeclaration>,
}

impl ScanResult {
    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TestDeclaration> {
        self.declarations.iter()
    }

    pub fn as_slice(&self) -> &[TestDeclaration] {
        &self.declarations
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.declarations.iter().map(|declaration| declaration.name.as_str())
    }

    pub fn suppressed_count(&self) -> usize {
        self.declarations.iter().filter(|declaration| declaration.suppressed).count()
    }
}

impl<'a> IntoIterator for &'a ScanResult {
    type Item = &'a TestDeclaration;
    type IntoIter = std::slice::Iter<'a, TestDeclaration>;

    fn into_iter(self) -> Self::IntoIter {
        self.declarations.iter()
    }
}

/// Full-buffer scan turning text into [`TestDeclaration`]s.
///
/// One line of lookback: a line matching the suppress pattern marks the
/// next line, and only the next line. Any other line clears the mark.
#[derive(Debug, Clone)]
pub struct DeclarationScanner {
    patterns: Arc<SelectorPatterns>,
}

impl Default for DeclarationScanner {
    fn default() -> Self {
        Self::new(TestFramework::default().patterns())
    }
}

impl DeclarationScanner {
    pub fn new(patterns: Arc<SelectorPatterns>) -> Self {
        Self {
            patterns,
        }
    }

    pub fn patterns(&self) -> &Arc<SelectorPatterns> {
        &self.patterns
    }

    pub fn scan<B: TextBuffer + ?Sized>(
        &self,
        buffer: &B,
    ) -> ScanResult {
        let mut declarations = Vec::new();
        let mut pending_suppression = false;
        let mut lines = 0usize;

        for (number, line) in LineCursor::new(buffer) {
            lines += 1;
            let text = line.text.as_ref();

            if self.patterns.is_suppress_line(text) {
                pending_suppression = true;
                continue;
            }

            if let Some((column, name)) = self.patterns.declaration_name(text) {
                declarations.push(TestDeclaration {
                    name: name.to_string(),
                    head_offset: line.start,
                    name_offset: line.start + column,
                    line: number,
                    suppressed: pending_suppression,
                });
                pending_suppression = false;
            } else if !(self.patterns.skip_blank_lines() && text.trim().is_empty()) {
                pending_suppression = false;
            }
        }

        debug!("[scan] {} declaration(s) in {lines} line(s)", declarations.len());
        ScanResult {
            declarations,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/src/scan/scanner_tests.rs"]
mod tests;
