use dashmap::DashMap;
use tower_lsp::lsp_types::{TextDocumentContentChangeEvent, Url};

use super::Document;

/// Open buffers, shared between request handlers.
#[derive(Debug, Default)]
pub struct DocumentStore {
    documents: DashMap<Url, Document>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(
        &self,
        uri: Url,
        text: String,
        version: i32,
    ) {
        self.documents.insert(uri.clone(), Document::new(uri, text, version));
    }

    /// Replace a buffer's content, opening it if unknown.
    pub fn update(
        &self,
        uri: Url,
        text: String,
        version: i32,
    ) {
        match self.documents.get_mut(&uri) {
            Some(mut doc) => doc.set_content(text, version),
            None => self.open(uri, text, version),
        }
    }

    pub fn apply_changes(
        &self,
        uri: &Url,
        changes: Vec<TextDocumentContentChangeEvent>,
        version: i32,
    ) {
        if let Some(mut doc) = self.documents.get_mut(uri) {
            doc.apply_changes(changes, version);
        }
    }

    pub fn close(
        &self,
        uri: &Url,
    ) {
        self.documents.remove(uri);
    }

    pub fn get(
        &self,
        uri: &Url,
    ) -> Option<Document> {
        self.documents.get(uri).map(|doc| doc.value().clone())
    }

    pub fn get_content(
        &self,
        uri: &Url,
    ) -> Option<String> {
        self.documents.get(uri).map(|doc| doc.text.clone())
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/src/document/document_store_tests.rs"]
mod tests;
