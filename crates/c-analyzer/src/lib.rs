pub mod cache;
pub mod completion;
pub mod config;
pub mod definition;
pub mod document;
pub mod engine;
pub mod error;
pub mod hover;
pub mod ide;
pub mod include;
pub mod parser;
pub mod progress;
pub mod server;
pub mod symbols;
pub mod syntax;
pub mod vfs;

pub use cache::{DiskCache, Fingerprint, TokenCache};
pub use completion::CompletionProvider;
pub use config::ServerSettings;
pub use definition::DefinitionProvider;
pub use engine::{Engine, LoadEvent, LoadRequest, LoadSession, LoadSummary};
pub use error::{ConfigError, IndexError};
pub use hover::HoverProvider;
pub use include::IncludeScanner;
pub use parser::{CParser, FileParser, ParseError};
pub use server::CLanguageServer;
pub use symbols::{ParsedFile, ScopePath, SymbolKind, SymbolProvider, SymbolRecord, SymbolStore};
