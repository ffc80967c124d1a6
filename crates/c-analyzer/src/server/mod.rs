pub(crate) mod handler;
pub(crate) mod indexing;
pub(crate) mod state;

pub use state::CLanguageServer;

pub const CLEAR_DISK_CACHE_COMMAND: &str = "c-analyzer.clearDiskCache";
pub const CLEAR_MEMORY_CACHE_COMMAND: &str = "c-analyzer.clearMemoryCache";
pub const RELOAD_COMMAND: &str = "c-analyzer.reload";
