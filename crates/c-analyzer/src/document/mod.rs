pub(crate) mod document_store;
pub(crate) mod text_document;

pub use document_store::DocumentStore;
pub use text_document::{Document, WordAt, byte_column, utf16_column};
