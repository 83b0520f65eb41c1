use std::{borrow::Cow, ops::Range};

use tower_lsp::lsp_types::*;

use crate::buffer::{BufferError, MutableBuffer, TextBuffer, check_offset, slice_range};

/// An open test source as last reported by the client.
///
/// `line_starts` always holds the byte offset of every line start, so
/// newline searches and LSP position conversions never walk the text.
#[derive(Debug, Clone)]
pub struct Document {
    pub uri: Url,
    pub text: String,
    pub version: i32,
    line_starts: Vec<usize>,
}

impl Document {
    pub fn new(
        uri: Url,
        text: String,
        version: i32,
    ) -> Self {
        let line_starts = line_starts(&text);
        Self {
            uri,
            text,
            version,
            line_starts,
        }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Byte span of `line`, terminator included.
    fn line_span(
        &self,
        line: usize,
    ) -> Option<Range<usize>> {
        let start = *self.line_starts.get(line)?;
        let end = self.line_starts.get(line + 1).map_or(self.text.len(), |next| *next);
        Some(start..end)
    }

    /// Text of `line` without `\n` or `\r\n`.
    pub fn line_text(
        &self,
        line: usize,
    ) -> Option<&str> {
        let span = self.line_span(line)?;
        let text = &self.text[span];
        let text = text.strip_suffix('\n').unwrap_or(text);
        Some(text.strip_suffix('\r').unwrap_or(text))
    }

    pub fn line_of(
        &self,
        offset: usize,
    ) -> usize {
        let offset = offset.min(self.text.len());
        self.line_starts.partition_point(|&start| start <= offset).saturating_sub(1)
    }

    /// Byte offset of a UTF-16 based LSP position. A character past the end
    /// of the line clamps to just before its `\n`.
    pub fn offset_of(
        &self,
        position: Position,
    ) -> Option<usize> {
        let span = self.line_span(position.line as usize)?;
        let start = span.start;
        let content = &self.text[span];
        let content = content.strip_suffix('\n').unwrap_or(content);
        let mut units = 0u32;
        let column = content
            .char_indices()
            .find(|(_, ch)| {
                let reached = units >= position.character;
                units += ch.len_utf16() as u32;
                reached
            })
            .map_or(content.len(), |(index, _)| index);
        Some(start + column)
    }

    pub fn position_of(
        &self,
        offset: usize,
    ) -> Position {
        let offset = offset.min(self.text.len());
        let line = self.line_of(offset);
        let start = self.line_starts[line];
        let character = self.text.get(start..offset).map_or(0, |prefix| prefix.encode_utf16().count() as u32);
        Position::new(line as u32, character)
    }

    pub fn set_content(
        &mut self,
        text: String,
        version: i32,
    ) {
        self.text = text;
        self.version = version;
        self.line_starts = line_starts(&self.text);
    }

    /// Apply `didChange` events in order. Ranges that no longer resolve
    /// are skipped.
    pub fn apply_changes(
        &mut self,
        changes: Vec<TextDocumentContentChangeEvent>,
        version: i32,
    ) {
        for change in changes {
            let Some(range) = change.range else {
                self.text = change.text;
                self.line_starts = line_starts(&self.text);
                continue;
            };
            match (self.offset_of(range.start), self.offset_of(range.end)) {
                (Some(start), Some(end)) if start <= end => self.splice(start..end, &change.text),
                _ => {},
            }
        }
        self.version = version;
    }

    fn splice(
        &mut self,
        range: Range<usize>,
        replacement: &str,
    ) {
        self.text.replace_range(range, replacement);
        self.line_starts = line_starts(&self.text);
    }
}

fn line_starts(text: &str) -> Vec<usize> {
    std::iter::once(0).chain(text.match_indices('\n').map(|(index, _)| index + 1)).collect()
}

impl TextBuffer for Document {
    fn len(&self) -> usize {
        self.text.len()
    }

    fn read_range(
        &self,
        range: Range<usize>,
    ) -> Result<Cow<'_, str>, BufferError> {
        slice_range(&self.text, range).map(Cow::Borrowed)
    }

    /// Newlines are answered from the line table instead of scanning text.
    fn find_byte(
        &self,
        from: usize,
        needle: u8,
    ) -> Option<usize> {
        if needle != b'\n' {
            return self.text.as_str().find_byte(from, needle);
        }
        // Every line start after the first sits one byte past a '\n'.
        let next = self.line_starts.partition_point(|&start| start <= from);
        self.line_starts.get(next).map(|start| start - 1)
    }

    fn rfind_byte(
        &self,
        before: usize,
        needle: u8,
    ) -> Option<usize> {
        if needle != b'\n' {
            return self.text.as_str().rfind_byte(before, needle);
        }
        let before = before.min(self.text.len());
        // Line starts `s` with `s - 1 < before`, i.e. `s <= before`.
        match self.line_starts.partition_point(|&start| start <= before) {
            0 | 1 => None,
            n => Some(self.line_starts[n - 1] - 1),
        }
    }
}

impl MutableBuffer for Document {
    fn insert(
        &mut self,
        offset: usize,
        text: &str,
    ) -> Result<(), BufferError> {
        check_offset(&self.text, offset)?;
        self.splice(offset..offset, text);
        Ok(())
    }

    fn delete(
        &mut self,
        range: Range<usize>,
    ) -> Result<(), BufferError> {
        slice_range(&self.text, range.clone())?;
        self.splice(range, "");
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/src/document/text_document_tests.rs"]
mod tests;
