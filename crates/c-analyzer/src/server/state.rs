use std::{path::PathBuf, sync::Arc};

use tokio::sync::RwLock;
use tower_lsp::Client;
use tracing::warn;

use crate::{
    cache::default_cache_dir, completion::CompletionProvider, config::ServerSettings, definition::DefinitionProvider,
    document::DocumentStore, engine::Engine, hover::HoverProvider, parser::CParser, symbols::SymbolProvider,
};

/// The c-analyzer backend that implements the Language Server Protocol.
pub struct CLanguageServer {
    pub(crate) client: Client,

    pub(crate) document_store: Arc<DocumentStore>,

    /// Shared index; loads run on the blocking pool against it.
    pub(crate) engine: Arc<Engine>,

    pub(crate) completion_provider: CompletionProvider,
    pub(crate) hover_provider: HoverProvider,
    pub(crate) definition_provider: DefinitionProvider,
    pub(crate) symbol_provider: SymbolProvider,

    /// Workspace folders, appended to the base include paths.
    pub(crate) workspace_roots: RwLock<Vec<PathBuf>>,

    pub(crate) settings: Arc<RwLock<ServerSettings>>,
}

impl CLanguageServer {
    pub fn new(client: Client) -> Self {
        Self::with_engine(client, Arc::new(Engine::with_parser(Arc::new(CParser))))
    }

    pub fn with_engine(
        client: Client,
        engine: Arc<Engine>,
    ) -> Self {
        let document_store = Arc::new(DocumentStore::new());
        Self {
            client,
            completion_provider: CompletionProvider::new(Arc::clone(&engine)),
            hover_provider: HoverProvider::new(Arc::clone(&engine)),
            definition_provider: DefinitionProvider::new(Arc::clone(&engine), Arc::clone(&document_store)),
            symbol_provider: SymbolProvider::new(Arc::clone(&engine)),
            document_store,
            engine,
            workspace_roots: RwLock::new(Vec::new()),
            settings: Arc::new(RwLock::new(ServerSettings::default())),
        }
    }

    pub(crate) async fn settings_snapshot(&self) -> ServerSettings {
        self.settings.read().await.clone()
    }

    pub(crate) async fn apply_settings(
        &self,
        settings: ServerSettings,
    ) {
        if let Err(err) = self.engine.set_cache_size(settings.indexing.cache_size) {
            warn!("[server] {err}");
        }
        let cache_dir = settings.indexing.cache_directory.clone().unwrap_or_else(default_cache_dir);
        if let Err(err) = self.engine.set_cache_dir(Some(cache_dir)) {
            warn!("[server] {err}; persisting parse results is disabled");
            let _ = self.engine.set_cache_dir(None);
        }
        *self.settings.write().await = settings;
    }
}
