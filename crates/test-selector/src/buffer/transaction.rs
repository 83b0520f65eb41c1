use std::ops::Range;

use tracing::{debug, warn};

use super::{BufferError, MutableBuffer};

/// Inverse of one applied edit.
#[derive(Debug)]
enum Undo {
    Remove(Range<usize>),
    Restore {
        offset: usize,
        text: String,
    },
}

/// Scoped edit transaction over a [`MutableBuffer`].
///
/// Every edit records its inverse. [`commit`](Self::commit) keeps the edits;
/// dropping the transaction without a successful commit (early `?` return,
/// panic, failed commit hook) replays the inverses in reverse order, so the
/// buffer never keeps half of a logical change.
pub struct EditTransaction<'a, B: MutableBuffer + ?Sized> {
    buffer: &'a mut B,
    undo: Vec<Undo>,
    committed: bool,
}

impl<'a, B: MutableBuffer + ?Sized> EditTransaction<'a, B> {
    pub fn begin(buffer: &'a mut B) -> Self {
        Self {
            buffer,
            undo: Vec::new(),
            committed: false,
        }
    }

    /// Read access to the buffer as it stands inside the transaction.
    pub fn buffer(&self) -> &B {
        &*self.buffer
    }

    pub fn edit_count(&self) -> usize {
        self.undo.len()
    }

    pub fn insert(
        &mut self,
        offset: usize,
        text: &str,
    ) -> Result<(), BufferError> {
        self.buffer.insert(offset, text)?;
        self.undo.push(Undo::Remove(offset..offset + text.len()));
        Ok(())
    }

    /// Delete `range`, returning the removed text.
    pub fn delete(
        &mut self,
        range: Range<usize>,
    ) -> Result<String, BufferError> {
        let removed = self.buffer.read_range(range.clone())?.into_owned();
        self.buffer.delete(range.clone())?;
        self.undo.push(Undo::Restore {
            offset: range.start,
            text: removed.clone(),
        });
        Ok(removed)
    }

    /// Run the buffer's commit hook and keep the edits.
    ///
    /// On error the transaction is dropped and rolled back.
    pub fn commit(mut self) -> Result<usize, BufferError> {
        self.buffer.commit()?;
        self.committed = true;
        Ok(self.undo.len())
    }

    fn rollback(&mut self) {
        debug!("rolling back {} buffer edit(s)", self.undo.len());
        while let Some(step) = self.undo.pop() {
            let result = match step {
                Undo::Remove(range) => self.buffer.delete(range),
                Undo::Restore {
                    offset,
                    text,
                } => self.buffer.insert(offset, &text),
            };
            if let Err(error) = result {
                warn!("rollback step failed: {error}");
            }
        }
    }
}

impl<B: MutableBuffer + ?Sized> Drop for EditTransaction<'_, B> {
    fn drop(&mut self) {
        if !self.committed && !self.undo.is_empty() {
            self.rollback();
        }
    }
}

#[cfg(test)]
#[path = "../../tests/src/buffer/transaction_tests.rs"]
mod tests;
