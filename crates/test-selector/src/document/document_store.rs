use dashmap::DashMap;
use tower_lsp::lsp_types::{TextDocumentContentChangeEvent, Url};
use tracing::debug;

use super::Document;
use crate::buffer::{BufferSnapshot, TextBuffer};

/// Open test sources keyed by URI.
///
/// Each entry is locked independently, so a scan snapshot of one file
/// never waits on an edit to another.
#[derive(Debug, Default)]
pub struct DocumentStore {
    documents: DashMap<Url, Document>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track `uri`, replacing any earlier mirror.
    pub fn open(
        &self,
        uri: Url,
        text: String,
        version: i32,
    ) {
        self.documents.insert(uri.clone(), Document::new(uri, text, version));
    }

    /// Changes for an untracked URI are dropped.
    pub fn apply_changes(
        &self,
        uri: &Url,
        changes: Vec<TextDocumentContentChangeEvent>,
        version: i32,
    ) {
        match self.documents.get_mut(uri) {
            Some(mut document) => document.apply_changes(changes, version),
            None => debug!("[documents] change for untracked {uri}"),
        }
    }

    pub fn close(
        &self,
        uri: &Url,
    ) {
        self.documents.remove(uri);
    }

    /// Owned copy of the mirror, e.g. as scratch space for a mutation.
    pub fn get(
        &self,
        uri: &Url,
    ) -> Option<Document> {
        self.documents.get(uri).map(|entry| entry.value().clone())
    }

    /// Immutable copy of the current text for a background scan.
    pub fn snapshot(
        &self,
        uri: &Url,
    ) -> Option<BufferSnapshot> {
        self.documents.get(uri).and_then(|entry| entry.value().snapshot().ok())
    }

    /// Run `f` against the live document under its read lock.
    pub fn with_document<R>(
        &self,
        uri: &Url,
        f: impl FnOnce(&Document) -> R,
    ) -> Option<R> {
        self.documents.get(uri).map(|entry| f(entry.value()))
    }

    pub fn all_uris(&self) -> Vec<Url> {
        self.documents.iter().map(|entry| entry.key().clone()).collect()
    }
}

#[cfg(test)]
#[path = "../../tests/src/document/document_store_tests.rs"]
mod tests;
