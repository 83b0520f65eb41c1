use serde::Serialize;

use crate::{
    buffer::TextBuffer,
    error::SelectorError,
    scan::{DeclarationIndex, find_line_containing},
};

/// Where "jump to test" should put the caret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DeclarationLocation {
    /// Start of the declaration's line in the live buffer.
    pub offset: usize,
    /// 0-based line number.
    pub line: usize,
}

/// Resolve `name` to its current position in `buffer`.
///
/// The index gates which names are known; the position itself is searched
/// for in the live buffer, so it is correct even after edits.
pub fn locate<B: TextBuffer + ?Sized>(
    buffer: &B,
    index: &DeclarationIndex,
    name: &str,
) -> Result<DeclarationLocation, SelectorError> {
    if !index.contains(name) {
        return Err(SelectorError::UnknownDeclaration(name.to_string()));
    }
    let needle = format!("{name}(");
    let (line, offset) =
        find_line_containing(buffer, &needle).ok_or_else(|| SelectorError::UnknownDeclaration(name.to_string()))?;
    Ok(DeclarationLocation {
        offset,
        line,
    })
}

#[cfg(test)]
#[path = "../tests/src/navigation_tests.rs"]
mod tests;
