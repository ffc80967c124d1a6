mod provider;
pub mod scope;
pub mod store;
pub mod type_text;
pub mod types;

pub use provider::SymbolProvider;
pub use scope::{AggregateTag, ScopePath, TypeRef};
pub use store::{SymbolStore, best_match};
pub use types::{LineSpan, ParsedFile, STATUS_WORD_PLACEHOLDER, SymbolDetail, SymbolKind, SymbolRecord};
