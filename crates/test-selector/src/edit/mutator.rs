use std::{ops::Range, sync::Arc};

use tracing::debug;

use super::SuppressionEdit;
use crate::{
    buffer::{BufferError, EditTransaction, MutableBuffer, TextBuffer},
    error::SelectorError,
    scan::{DeclarationIndex, Line, SelectorPatterns, find_line_containing, next_line},
};

/// Idempotent insert/remove of the suppress marker above a named declaration.
///
/// The index only answers "does this name exist"; the position is always
/// re-resolved in the live buffer right before editing, because the buffer
/// may have changed since the index was built. The index is not updated
/// afterwards; callers re-populate to observe the new state.
#[derive(Debug, Clone)]
pub struct SuppressionMutator {
    patterns: Arc<SelectorPatterns>,
}

impl SuppressionMutator {
    pub fn new(patterns: Arc<SelectorPatterns>) -> Self {
        Self {
            patterns,
        }
    }

    /// Compute the edit that brings `name` to `suppressed`, without applying it.
    ///
    /// `Ok(None)` when the buffer already has the requested state.
    pub fn plan<B: TextBuffer + ?Sized>(
        &self,
        buffer: &B,
        index: &DeclarationIndex,
        name: &str,
        suppressed: bool,
    ) -> Result<Option<SuppressionEdit>, SelectorError> {
        if !index.contains(name) {
            return Err(SelectorError::UnknownDeclaration(name.to_string()));
        }
        let head = locate_live(buffer, name)?;
        let marker = self.marker_span(buffer, head)?;

        let edit = match (suppressed, marker) {
            (true, None) => {
                let ending = line_ending(buffer, head);
                Some(SuppressionEdit::insert(head, format!("{}{ending}", self.patterns.marker_text())))
            },
            (false, Some(span)) => {
                let text = buffer.read_range(span.clone())?.into_owned();
                Some(SuppressionEdit::delete(span.start, text))
            },
            _ => None,
        };
        Ok(edit)
    }

    /// Bring `name` to `suppressed` inside one transaction.
    ///
    /// Returns the applied edit, or `None` if nothing had to change.
    pub fn set_suppressed<B: MutableBuffer + ?Sized>(
        &self,
        buffer: &mut B,
        index: &DeclarationIndex,
        name: &str,
        suppressed: bool,
    ) -> Result<Option<SuppressionEdit>, SelectorError> {
        let mut transaction = EditTransaction::begin(buffer);
        let Some(edit) = self.plan(transaction.buffer(), index, name, suppressed)? else {
            debug!("[suppress] '{name}' already suppressed={suppressed}");
            return Ok(None);
        };
        edit.apply(&mut transaction)?;
        transaction.commit()?;
        debug!("[suppress] '{name}' → suppressed={suppressed} ({:?} at {})", edit.kind, edit.at_offset);
        Ok(Some(edit))
    }

    /// Flip the suppression state recorded for `name` in `index`.
    pub fn toggle<B: MutableBuffer + ?Sized>(
        &self,
        buffer: &mut B,
        index: &DeclarationIndex,
        name: &str,
    ) -> Result<Option<SuppressionEdit>, SelectorError> {
        let current = index
            .lookup(name)
            .map(|declaration| declaration.suppressed)
            .ok_or_else(|| SelectorError::UnknownDeclaration(name.to_string()))?;
        self.set_suppressed(buffer, index, name, !current)
    }

    /// Apply `suppressed` to every name in one transaction.
    ///
    /// Each name is re-resolved against the buffer as already edited by the
    /// previous names. Any failure rolls back the whole batch.
    pub fn set_all_suppressed<'n, B: MutableBuffer + ?Sized>(
        &self,
        buffer: &mut B,
        index: &DeclarationIndex,
        names: impl IntoIterator<Item = &'n str>,
        suppressed: bool,
    ) -> Result<Vec<SuppressionEdit>, SelectorError> {
        let mut transaction = EditTransaction::begin(buffer);
        let mut applied = Vec::new();
        for name in names {
            if let Some(edit) = self.plan(transaction.buffer(), index, name, suppressed)? {
                edit.apply(&mut transaction)?;
                applied.push(edit);
            }
        }
        if applied.is_empty() {
            return Ok(applied);
        }
        transaction.commit()?;
        debug!("[suppress] batch of {} edit(s) → suppressed={suppressed}", applied.len());
        Ok(applied)
    }

    /// Span to delete to unmark the declaration at `head`, or `None` when
    /// the declaration is unmarked.
    ///
    /// A marker sharing its line with other text loses only the matched
    /// marker; the line itself goes only when nothing else is left on it.
    fn marker_span<B: TextBuffer + ?Sized>(
        &self,
        buffer: &B,
        head: usize,
    ) -> Result<Option<Range<usize>>, BufferError> {
        if head == 0 {
            return Ok(None);
        }

        // Fast path: the exact window our own insert produces.
        let marker = self.patterns.marker_text();
        for ending in ["\n", "\r\n"] {
            let window_len = marker.len() + ending.len();
            if head < window_len {
                continue;
            }
            let window = head - window_len..head;
            if let Ok(text) = buffer.read_range(window.clone())
                && text.strip_suffix(ending) == Some(marker)
            {
                return Ok(Some(window));
            }
        }

        // Otherwise judge the preceding line the way the scanner would.
        let mut end = head - 1;
        loop {
            let start = buffer.rfind_byte(end, b'\n').map_or(0, |newline| newline + 1);
            let Some(line) = next_line(buffer, start) else {
                return Ok(None);
            };
            if let Some(found) = self.patterns.suppress_match(&line.text) {
                return Ok(Some(marker_removal(&line, found)));
            }
            let blank = line.text.trim().is_empty();
            if !(blank && self.patterns.skip_blank_lines()) || start == 0 {
                return Ok(None);
            }
            end = start - 1;
        }
    }
}

/// Buffer span covering the suppress match `found` on `line`.
///
/// The whole line (terminator included) when the rest of it is blank,
/// otherwise the match plus the whitespace separating it from its neighbour.
fn marker_removal(
    line: &Line<'_>,
    found: Range<usize>,
) -> Range<usize> {
    let text = line.text.as_ref();
    let before = &text[..found.start];
    let after = &text[found.end..];
    if before.trim().is_empty() && after.trim().is_empty() {
        return line.start..line.next;
    }

    let (from, to) = if after.trim().is_empty() {
        (before.trim_end_matches([' ', '\t']).len(), text.len())
    } else {
        (found.start, text.len() - after.trim_start_matches([' ', '\t']).len())
    };
    line.start + from..line.start + to
}

/// Terminator used by the line at `head`: `"\r\n"` when that line (or,
/// for an unterminated last line, the one before it) ends in CRLF.
fn line_ending<B: TextBuffer + ?Sized>(
    buffer: &B,
    head: usize,
) -> &'static str {
    let crlf = buffer
        .find_byte(head, b'\n')
        .or_else(|| head.checked_sub(1))
        .and_then(|newline| newline.checked_sub(1))
        .and_then(|cr| buffer.read_range(cr..cr + 1).ok())
        .is_some_and(|byte| byte == "\r");
    if crlf { "\r\n" } else { "\n" }
}

/// Start of the first live line containing `name(`.
pub(crate) fn locate_live<B: TextBuffer + ?Sized>(
    buffer: &B,
    name: &str,
) -> Result<usize, SelectorError> {
    let needle = format!("{name}(");
    find_line_containing(buffer, &needle)
        .map(|(_, start)| start)
        .ok_or_else(|| SelectorError::StaleDeclaration(name.to_string()))
}

#[cfg(test)]
#[path = "../../tests/src/edit/mutator_tests.rs"]
mod tests;
