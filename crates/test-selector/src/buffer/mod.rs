//! Minimal buffer capability set the scanner and the mutator depend on.
//!
//! Every offset is a UTF-8 byte offset into the buffer. Implementations only
//! need random-access range reads; newline lookup has chunked defaults that
//! buffers with a line table (see [`crate::document::Document`]) override.

mod file;
mod snapshot;
mod transaction;

use std::{borrow::Cow, ops::Range};

use thiserror::Error;

pub use file::FileBuffer;
pub use snapshot::BufferSnapshot;
pub use transaction::EditTransaction;

/// Bytes read per step by the default `find_byte` / `rfind_byte` walks.
const SEARCH_CHUNK_LEN: usize = 4096;

/// Longest UTF-8 sequence; bounds the char-boundary adjustment of a chunk.
const MAX_CHAR_LEN: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BufferError {
    #[error("range {start}..{end} is out of bounds for a buffer of {len} bytes")]
    OutOfBounds {
        start: usize,
        end: usize,
        len: usize,
    },
    #[error("offset {0} is not on a character boundary")]
    NotCharBoundary(usize),
    #[error("i/o failure: {0}")]
    Io(String),
    /// The host refused to apply the edit (e.g. `workspace/applyEdit` answered `applied: false`).
    #[error("edit rejected by host: {0}")]
    Rejected(String),
}

/// Read access to a text source owned by someone else (an editor, a file,
/// a test double).
pub trait TextBuffer {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read_range(
        &self,
        range: Range<usize>,
    ) -> Result<Cow<'_, str>, BufferError>;

    /// Offset of the first `needle` at or after `from`.
    ///
    /// `needle` must be ASCII so that a hit can never land inside a
    /// multi-byte character.
    fn find_byte(
        &self,
        from: usize,
        needle: u8,
    ) -> Option<usize> {
        let len = self.len();
        let mut start = from;
        while start < len {
            let (chunk, end) = read_chunk_forward(self, start, len)?;
            if let Some(pos) = chunk.bytes().position(|b| b == needle) {
                return Some(start + pos);
            }
            start = end;
        }
        None
    }

    /// Offset of the last `needle` strictly before `before`.
    fn rfind_byte(
        &self,
        before: usize,
        needle: u8,
    ) -> Option<usize> {
        let mut end = before.min(self.len());
        while end > 0 {
            let (chunk, start) = read_chunk_backward(self, end)?;
            if let Some(pos) = chunk.bytes().rposition(|b| b == needle) {
                return Some(start + pos);
            }
            end = start;
        }
        None
    }

    /// Copy the whole buffer into an immutable, cheaply clonable view.
    fn snapshot(&self) -> Result<BufferSnapshot, BufferError> {
        let text = self.read_range(0..self.len())?;
        Ok(BufferSnapshot::new(text.into_owned()))
    }
}

/// Write access. Edits normally go through an [`EditTransaction`] so that a
/// failure part-way leaves the buffer untouched.
pub trait MutableBuffer: TextBuffer {
    fn insert(
        &mut self,
        offset: usize,
        text: &str,
    ) -> Result<(), BufferError>;

    fn delete(
        &mut self,
        range: Range<usize>,
    ) -> Result<(), BufferError>;

    /// Called once when a transaction commits. File-backed buffers persist
    /// here; an error makes the transaction roll back.
    fn commit(&mut self) -> Result<(), BufferError> {
        Ok(())
    }
}

impl TextBuffer for str {
    fn len(&self) -> usize {
        str::len(self)
    }

    fn read_range(
        &self,
        range: Range<usize>,
    ) -> Result<Cow<'_, str>, BufferError> {
        slice_range(self, range).map(Cow::Borrowed)
    }

    fn find_byte(
        &self,
        from: usize,
        needle: u8,
    ) -> Option<usize> {
        let tail = self.as_bytes().get(from..)?;
        tail.iter().position(|&b| b == needle).map(|pos| from + pos)
    }

    fn rfind_byte(
        &self,
        before: usize,
        needle: u8,
    ) -> Option<usize> {
        let head = &self.as_bytes()[..before.min(str::len(self))];
        head.iter().rposition(|&b| b == needle)
    }
}

impl TextBuffer for String {
    fn len(&self) -> usize {
        self.as_str().len()
    }

    fn read_range(
        &self,
        range: Range<usize>,
    ) -> Result<Cow<'_, str>, BufferError> {
        slice_range(self, range).map(Cow::Borrowed)
    }

    fn find_byte(
        &self,
        from: usize,
        needle: u8,
    ) -> Option<usize> {
        self.as_str().find_byte(from, needle)
    }

    fn rfind_byte(
        &self,
        before: usize,
        needle: u8,
    ) -> Option<usize> {
        self.as_str().rfind_byte(before, needle)
    }
}

impl MutableBuffer for String {
    fn insert(
        &mut self,
        offset: usize,
        text: &str,
    ) -> Result<(), BufferError> {
        check_offset(self, offset)?;
        self.insert_str(offset, text);
        Ok(())
    }

    fn delete(
        &mut self,
        range: Range<usize>,
    ) -> Result<(), BufferError> {
        slice_range(self, range.clone())?;
        self.replace_range(range, "");
        Ok(())
    }
}

/// Borrow `range` out of `text`, validating bounds and char boundaries.
pub(crate) fn slice_range(
    text: &str,
    range: Range<usize>,
) -> Result<&str, BufferError> {
    if range.start > range.end || range.end > text.len() {
        return Err(BufferError::OutOfBounds {
            start: range.start,
            end: range.end,
            len: text.len(),
        });
    }
    if !text.is_char_boundary(range.start) {
        return Err(BufferError::NotCharBoundary(range.start));
    }
    if !text.is_char_boundary(range.end) {
        return Err(BufferError::NotCharBoundary(range.end));
    }
    Ok(&text[range])
}

pub(crate) fn check_offset(
    text: &str,
    offset: usize,
) -> Result<(), BufferError> {
    slice_range(text, offset..offset).map(|_| ())
}

/// Read `[start, start + chunk)`, stretching the end forward until it sits on
/// a char boundary. Returns the text and the end offset actually read.
fn read_chunk_forward<B: TextBuffer + ?Sized>(
    buffer: &B,
    start: usize,
    len: usize,
) -> Option<(Cow<'_, str>, usize)> {
    let mut end = (start + SEARCH_CHUNK_LEN).min(len);
    for _ in 0..MAX_CHAR_LEN {
        match buffer.read_range(start..end) {
            Ok(chunk) if !chunk.is_empty() => return Some((chunk, end)),
            Ok(_) => return None,
            Err(BufferError::NotCharBoundary(at)) if at == end && end < len => end += 1,
            Err(_) => return None,
        }
    }
    None
}

/// Read `[end - chunk, end)`, nudging the start forward onto a char boundary.
/// Returns the text and the start offset actually read.
fn read_chunk_backward<B: TextBuffer + ?Sized>(
    buffer: &B,
    end: usize,
) -> Option<(Cow<'_, str>, usize)> {
    let mut start = end.saturating_sub(SEARCH_CHUNK_LEN);
    for _ in 0..MAX_CHAR_LEN {
        match buffer.read_range(start..end) {
            Ok(chunk) if !chunk.is_empty() => return Some((chunk, start)),
            Ok(_) => return None,
            Err(BufferError::NotCharBoundary(at)) if at == start && start < end => start += 1,
            Err(_) => return None,
        }
    }
    None
}

#[cfg(test)]
#[path = "../../tests/src/buffer/buffer_tests.rs"]
mod tests;
