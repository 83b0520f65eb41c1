mod mutator;

use std::ops::Range;

use serde::Serialize;

pub use mutator::SuppressionMutator;

use crate::buffer::{BufferError, EditTransaction, MutableBuffer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EditKind {
    Insert,
    Delete,
}

/// One atomic edit: text inserted at, or deleted from, `at_offset`.
///
/// For a delete, `text` is the text being removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuppressionEdit {
    pub kind: EditKind,
    pub at_offset: usize,
    pub text: String,
}

impl SuppressionEdit {
    pub fn insert(
        at_offset: usize,
        text: impl Into<String>,
    ) -> Self {
        Self {
            kind: EditKind::Insert,
            at_offset,
            text: text.into(),
        }
    }

    pub fn delete(
        at_offset: usize,
        text: impl Into<String>,
    ) -> Self {
        Self {
            kind: EditKind::Delete,
            at_offset,
            text: text.into(),
        }
    }

    /// Range of the buffer the edit touches before it is applied.
    pub fn range(&self) -> Range<usize> {
        match self.kind {
            EditKind::Insert => self.at_offset..self.at_offset,
            EditKind::Delete => self.at_offset..self.at_offset + self.text.len(),
        }
    }

    pub fn apply<B: MutableBuffer + ?Sized>(
        &self,
        transaction: &mut EditTransaction<'_, B>,
    ) -> Result<(), BufferError> {
        match self.kind {
            EditKind::Insert => transaction.insert(self.at_offset, &self.text),
            EditKind::Delete => transaction.delete(self.range()).map(|_| ()),
        }
    }
}
