use std::{panic::AssertUnwindSafe, path::PathBuf, sync::Arc};

use futures::FutureExt;
use serde_json::Value;
use tower_lsp::{LanguageServer, jsonrpc::Result, lsp_types::*};
use tracing::{debug, info, warn};

use crate::{
    config::ServerSettings,
    server::{CLEAR_DISK_CACHE_COMMAND, CLEAR_MEMORY_CACHE_COMMAND, RELOAD_COMMAND, state::CLanguageServer},
};

const CLIENT_NOTIFICATION_PREFIX: &str = "c-analyzer:";

#[tower_lsp::async_trait]
impl LanguageServer for CLanguageServer {
    async fn initialize(
        &self,
        params: InitializeParams,
    ) -> Result<InitializeResult> {
        info!("Initializing c-analyzer...");

        let settings = ServerSettings::from_lsp_payload(params.initialization_options.as_ref());
        self.apply_settings(settings).await;

        let roots: Vec<PathBuf> = match params.workspace_folders {
            Some(folders) => folders.iter().filter_map(|folder| folder.uri.to_file_path().ok()).collect(),
            None => params.root_uri.and_then(|uri| uri.to_file_path().ok()).into_iter().collect(),
        };
        *self.workspace_roots.write().await = roots;

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Options(TextDocumentSyncOptions {
                    open_close: Some(true),
                    change: Some(TextDocumentSyncKind::INCREMENTAL),
                    save: Some(TextDocumentSyncSaveOptions::Supported(true)),
                    ..Default::default()
                })),
                completion_provider: Some(CompletionOptions {
                    trigger_characters: Some(vec![".".to_string(), ">".to_string(), ":".to_string()]),
                    ..Default::default()
                }),
                hover_provider: Some(HoverProviderCapability::Simple(true)),
                definition_provider: Some(OneOf::Left(true)),
                document_symbol_provider: Some(OneOf::Left(true)),
                workspace_symbol_provider: Some(OneOf::Left(true)),
                execute_command_provider: Some(ExecuteCommandOptions {
                    commands: vec![
                        CLEAR_DISK_CACHE_COMMAND.to_string(),
                        CLEAR_MEMORY_CACHE_COMMAND.to_string(),
                        RELOAD_COMMAND.to_string(),
                    ],
                    ..Default::default()
                }),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "c-analyzer".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(
        &self,
        _: InitializedParams,
    ) {
        info!("c-analyzer initialized");
    }

    async fn did_change_configuration(
        &self,
        params: DidChangeConfigurationParams,
    ) {
        let current = self.settings_snapshot().await;
        let merged = current.merged_with_payload(&params.settings);
        if merged == current {
            return;
        }
        self.apply_settings(merged).await;
        info!("Applied updated c-analyzer settings");
    }

    async fn shutdown(&self) -> Result<()> {
        info!("Shutting down c-analyzer");
        Ok(())
    }

    async fn did_open(
        &self,
        params: DidOpenTextDocumentParams,
    ) {
        let uri = params.text_document.uri;
        info!("Opened {} (v{})", short_name(&uri), params.text_document.version);
        self.document_store.open(uri.clone(), params.text_document.text, params.text_document.version);
        self.load_for(&uri).await;
    }

    async fn did_change(
        &self,
        params: DidChangeTextDocumentParams,
    ) {
        let uri = params.text_document.uri;
        self.document_store.apply_changes(&uri, params.content_changes, params.text_document.version);
    }

    async fn did_save(
        &self,
        params: DidSaveTextDocumentParams,
    ) {
        let uri = params.text_document.uri;
        if let Some(text) = params.text {
            let version = self.document_store.get(&uri).map(|doc| doc.version).unwrap_or_default();
            self.document_store.update(uri.clone(), text, version);
        }
        debug!("Saved {}", short_name(&uri));
        self.load_for(&uri).await;
    }

    async fn did_close(
        &self,
        params: DidCloseTextDocumentParams,
    ) {
        self.document_store.close(&params.text_document.uri);
    }

    async fn completion(
        &self,
        params: CompletionParams,
    ) -> Result<Option<CompletionResponse>> {
        let uri = params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;
        let (Some(doc), Ok(file)) = (self.document_store.get(&uri), uri.to_file_path()) else {
            return Ok(None);
        };
        let Some(line_before) = doc.text_before(position) else {
            return Ok(None);
        };
        let items = self.completion_provider.provide(&file, position.line + 1, line_before);
        Ok(Some(CompletionResponse::Array(items)))
    }

    async fn hover(
        &self,
        params: HoverParams,
    ) -> Result<Option<Hover>> {
        let uri = params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;
        let (Some(doc), Ok(file)) = (self.document_store.get(&uri), uri.to_file_path()) else {
            return Ok(None);
        };
        let Some(at) = doc.word_at(position) else {
            return Ok(None);
        };
        Ok(self.hover_provider.provide(&file, position.line + 1, &at))
    }

    async fn goto_definition(
        &self,
        params: GotoDefinitionParams,
    ) -> Result<Option<GotoDefinitionResponse>> {
        let uri = params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;
        let (Some(doc), Ok(file)) = (self.document_store.get(&uri), uri.to_file_path()) else {
            return Ok(None);
        };
        let Some(at) = doc.word_at(position) else {
            return Ok(None);
        };
        let location = self.definition_provider.provide(&file, position.line + 1, &at);
        Ok(location.map(GotoDefinitionResponse::Scalar))
    }

    async fn document_symbol(
        &self,
        params: DocumentSymbolParams,
    ) -> Result<Option<DocumentSymbolResponse>> {
        let Ok(file) = params.text_document.uri.to_file_path() else {
            return Ok(None);
        };
        Ok(Some(DocumentSymbolResponse::Flat(self.symbol_provider.document_symbols(&file))))
    }

    async fn symbol(
        &self,
        params: WorkspaceSymbolParams,
    ) -> Result<Option<Vec<SymbolInformation>>> {
        Ok(Some(self.symbol_provider.workspace_symbols(&params.query)))
    }

    async fn execute_command(
        &self,
        params: ExecuteCommandParams,
    ) -> Result<Option<Value>> {
        match params.command.as_str() {
            CLEAR_DISK_CACHE_COMMAND => {
                let engine = Arc::clone(&self.engine);
                let removed = tokio::task::spawn_blocking(move || engine.clear_disk_cache()).await;
                match removed {
                    Ok(Ok(removed)) => {
                        self.notify(MessageType::INFO, format!("Removed {removed} cached files")).await;
                        Ok(Some(Value::from(removed)))
                    },
                    Ok(Err(err)) => {
                        warn!("[server] clearing disk cache failed: {err}");
                        self.notify(MessageType::WARNING, format!("Clearing the disk cache failed: {err}")).await;
                        Ok(None)
                    },
                    Err(err) => {
                        warn!("[server] clear task failed: {err}");
                        Ok(None)
                    },
                }
            },
            CLEAR_MEMORY_CACHE_COMMAND => {
                self.engine.clear_cache();
                Ok(None)
            },
            RELOAD_COMMAND => {
                let target = params
                    .arguments
                    .first()
                    .and_then(Value::as_str)
                    .and_then(|arg| Url::parse(arg).ok())
                    .and_then(|uri| uri.to_file_path().ok())
                    .or_else(|| self.engine.current_root());
                let Some(file) = target else {
                    return Ok(None);
                };
                let summary = self.ensure_loaded(file, true).await;
                Ok(summary.map(|summary| Value::from(summary.symbols)))
            },
            other => {
                warn!("[server] unknown command {other}");
                Ok(None)
            },
        }
    }
}

impl CLanguageServer {
    async fn load_for(
        &self,
        uri: &Url,
    ) {
        let Ok(file) = uri.to_file_path() else {
            return;
        };
        self.ensure_loaded(file, false).await;
    }

    async fn notify(
        &self,
        kind: MessageType,
        message: String,
    ) {
        if kind == MessageType::INFO && !self.settings_snapshot().await.logging.level.allows_info() {
            return;
        }
        let result = AssertUnwindSafe(self.client.show_message(kind, prefixed_client_message(message)))
            .catch_unwind()
            .await;
        if result.is_err() {
            warn!("show_message panicked (client may have disconnected)");
        }
    }
}

fn short_name(uri: &Url) -> &str {
    uri.path().rsplit('/').next().unwrap_or(uri.path())
}

fn prefixed_client_message(message: impl AsRef<str>) -> String {
    format!("{CLIENT_NOTIFICATION_PREFIX} {}", message.as_ref())
}
