use std::{borrow::Cow, fmt, ops::Range, sync::Arc};

use super::{BufferError, TextBuffer, slice_range};

/// Immutable, reference-counted copy of a buffer's text.
///
/// This is what crosses into the background scan: the live buffer stays with
/// its owner and may keep changing while the snapshot is scanned.
#[derive(Clone, PartialEq, Eq)]
pub struct BufferSnapshot {
    text: Arc<str>,
}

impl BufferSnapshot {
    pub fn new(text: impl Into<Arc<str>>) -> Self {
        Self {
            text: text.into(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl fmt::Debug for BufferSnapshot {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("BufferSnapshot").field("len", &self.text.len()).finish()
    }
}

impl From<String> for BufferSnapshot {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

impl From<&str> for BufferSnapshot {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl TextBuffer for BufferSnapshot {
    fn len(&self) -> usize {
        self.text.len()
    }

    fn read_range(
        &self,
        range: Range<usize>,
    ) -> Result<Cow<'_, str>, BufferError> {
        slice_range(&self.text, range).map(Cow::Borrowed)
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

    fn snapshot(&self) -> Result<BufferSnapshot, BufferError> {
        Ok(self.clone())
    }
}
