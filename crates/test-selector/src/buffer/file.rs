use std::{
    borrow::Cow,
    io::Write,
    ops::Range,
    path::{Path, PathBuf},
};

use tempfile::NamedTempFile;
use tracing::debug;

use super::{BufferError, MutableBuffer, TextBuffer, check_offset, slice_range};

/// A source file read fully into memory and written back on commit.
///
/// Commit stages the text in a sibling temporary file and renames it over
/// the target, so the file on disk holds either the old or the new text.
#[derive(Debug, Clone)]
pub struct FileBuffer {
    path: PathBuf,
    text: String,
}

impl FileBuffer {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, BufferError> {
        let path = path.into();
        let text = std::fs::read_to_string(&path)
            .map_err(|error| BufferError::Io(format!("failed to read {}: {error}", path.display())))?;
        Ok(Self {
            path,
            text,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl TextBuffer for FileBuffer {
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
        self.text.as_str().find_byte(from, needle)
    }

    fn rfind_byte(
        &self,
        before: usize,
        needle: u8,
    ) -> Option<usize> {
        self.text.as_str().rfind_byte(before, needle)
    }
}

impl MutableBuffer for FileBuffer {
    fn insert(
        &mut self,
        offset: usize,
        text: &str,
    ) -> Result<(), BufferError> {
        check_offset(&self.text, offset)?;
        self.text.insert_str(offset, text);
        Ok(())
    }

    fn delete(
        &mut self,
        range: Range<usize>,
    ) -> Result<(), BufferError> {
        slice_range(&self.text, range.clone())?;
        self.text.replace_range(range, "");
        Ok(())
    }

    fn commit(&mut self) -> Result<(), BufferError> {
        let io_error = |error: std::io::Error| BufferError::Io(format!("failed to write {}: {error}", self.path.display()));
        let directory = self.path.parent().filter(|parent| !parent.as_os_str().is_empty()).unwrap_or(Path::new("."));

        let mut staged = NamedTempFile::new_in(directory).map_err(io_error)?;
        staged.write_all(self.text.as_bytes()).map_err(io_error)?;
        if let Ok(metadata) = std::fs::metadata(&self.path) {
            staged.as_file().set_permissions(metadata.permissions()).map_err(io_error)?;
        }
        staged.as_file().sync_all().map_err(io_error)?;
        staged.persist(&self.path).map_err(|error| io_error(error.error))?;

        debug!("wrote {} bytes to {}", self.text.len(), self.path.display());
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/src/buffer/file_tests.rs"]
mod tests;
