//! Declaration ↔ LSP type conversions.

use serde_json::json;
use tower_lsp::lsp_types::*;

use crate::{
    document::Document,
    navigation::DeclarationLocation,
    scan::TestDeclaration,
    server::commands::TOGGLE_SUPPRESSION,
};

pub(crate) fn name_range(
    document: &Document,
    declaration: &TestDeclaration,
) -> Range {
    Range {
        start: document.position_of(declaration.name_offset),
        end: document.position_of(declaration.name_offset + declaration.name.len()),
    }
}

/// Whole declaration line, without its line break.
pub(crate) fn line_range(
    document: &Document,
    line: usize,
) -> Range {
    let width = document.line_text(line).map_or(0, |text| text.encode_utf16().count() as u32);
    Range {
        start: Position::new(line as u32, 0),
        end: Position::new(line as u32, width),
    }
}

pub(crate) fn declaration_symbol(
    document: &Document,
    declaration: &TestDeclaration,
) -> DocumentSymbol {
    #[allow(deprecated)]
    DocumentSymbol {
        name: declaration.name.clone(),
        detail: Some(
            if declaration.suppressed {
                "suppressed"
            } else {
                "enabled"
            }
            .to_string(),
        ),
        kind: SymbolKind::METHOD,
        tags: None,
        deprecated: None,
        range: line_range(document, declaration.line),
        selection_range: name_range(document, declaration),
        children: None,
    }
}

pub(crate) fn declaration_code_lens(
    document: &Document,
    declaration: &TestDeclaration,
) -> CodeLens {
    let title = if declaration.suppressed {
        "Suppressed · enable"
    } else {
        "Enabled · suppress"
    };
    CodeLens {
        range: name_range(document, declaration),
        command: Some(Command {
            title: title.to_string(),
            command: TOGGLE_SUPPRESSION.to_string(),
            arguments: Some(vec![json!(document.uri), json!(declaration.name)]),
        }),
        data: None,
    }
}

pub(crate) fn declaration_location(
    document: &Document,
    location: DeclarationLocation,
) -> Location {
    let position = document.position_of(location.offset);
    Location {
        uri: document.uri.clone(),
        range: Range {
            start: position,
            end: position,
        },
    }
}

/// Single edit turning `original` into `updated`: the span between their
/// common prefix and common suffix, snapped to char boundaries.
pub(crate) fn minimal_text_edit(
    original: &Document,
    updated: &str,
) -> Option<TextEdit> {
    let before = original.text.as_str();
    if before == updated {
        return None;
    }

    let mut prefix = before.bytes().zip(updated.bytes()).take_while(|(a, b)| a == b).count();
    while !before.is_char_boundary(prefix) || !updated.is_char_boundary(prefix) {
        prefix -= 1;
    }

    let max_suffix = before.len().min(updated.len()) - prefix;
    let mut suffix = before.bytes().rev().zip(updated.bytes().rev()).take(max_suffix).take_while(|(a, b)| a == b).count();
    while !before.is_char_boundary(before.len() - suffix) || !updated.is_char_boundary(updated.len() - suffix) {
        suffix -= 1;
    }

    Some(TextEdit {
        range: Range {
            start: original.position_of(prefix),
            end: original.position_of(before.len() - suffix),
        },
        new_text: updated[prefix..updated.len() - suffix].to_string(),
    })
}

#[cfg(test)]
#[path = "../../tests/src/server/lsp_tests.rs"]
mod tests;
