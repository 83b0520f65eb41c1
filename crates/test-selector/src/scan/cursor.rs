//! Line-by-line addressing over any [`TextBuffer`].
//!
//! Each line costs one newline lookup plus one range read, so a full pass is
//! linear in the buffer size whatever the buffer's backing store.

use std::borrow::Cow;

use tracing::debug;

use crate::buffer::TextBuffer;

/// One line of a buffer, without its `\n` (or `\r\n`) terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line<'a> {
    pub text: Cow<'a, str>,
    /// Offset of the first byte of the line.
    pub start: usize,
    /// Offset of the first byte of the following line.
    pub next: usize,
}

/// Read the line starting at `offset`.
///
/// `None` means end of buffer: `offset` is at or past the end. A last line
/// without a trailing newline is still returned.
pub fn next_line<B: TextBuffer + ?Sized>(
    buffer: &B,
    offset: usize,
) -> Option<Line<'_>> {
    let len = buffer.len();
    if offset >= len {
        return None;
    }
    let (end, next) = match buffer.find_byte(offset, b'\n') {
        Some(newline) => (newline, newline + 1),
        None => (len, len),
    };
    match buffer.read_range(offset..end) {
        Ok(text) => Some(Line {
            text: strip_carriage_return(text),
            start: offset,
            next,
        }),
        Err(error) => {
            debug!("line read at {offset} failed, treating as end of buffer: {error}");
            None
        },
    }
}

/// Iterator over `(line_number, line)` pairs from a starting offset.
#[derive(Debug)]
pub struct LineCursor<'a, B: TextBuffer + ?Sized> {
    buffer: &'a B,
    offset: usize,
    line: usize,
}

impl<'a, B: TextBuffer + ?Sized> LineCursor<'a, B> {
    pub fn new(buffer: &'a B) -> Self {
        Self {
            buffer,
            offset: 0,
            line: 0,
        }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }
}

impl<'a, B: TextBuffer + ?Sized> Iterator for LineCursor<'a, B> {
    type Item = (usize, Line<'a>);

    fn next(&mut self) -> Option<Self::Item> {
        let line = next_line(self.buffer, self.offset)?;
        let number = self.line;
        self.offset = line.next;
        self.line += 1;
        Some((number, line))
    }
}

/// First line whose text contains `needle`, as `(line_number, line_start)`.
///
/// This is the live re-resolution step: it reads the buffer as it is now and
/// never trusts an offset cached by an earlier scan.
pub fn find_line_containing<B: TextBuffer + ?Sized>(
    buffer: &B,
    needle: &str,
) -> Option<(usize, usize)> {
    LineCursor::new(buffer).find(|(_, line)| line.text.contains(needle)).map(|(number, line)| (number, line.start))
}

fn strip_carriage_return(text: Cow<'_, str>) -> Cow<'_, str> {
    match text {
        Cow::Borrowed(s) => Cow::Borrowed(s.strip_suffix('\r').unwrap_or(s)),
        Cow::Owned(mut s) => {
            if s.ends_with('\r') {
                s.pop();
            }
            Cow::Owned(s)
        },
    }
}

#[cfg(test)]
#[path = "../../tests/src/scan/cursor_tests.rs"]
mod tests;
