//! Loads triggered by editor events.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use tracing::{debug, info, warn};

use crate::{
    config::{ProjectFile, ServerSettings},
    engine::{Engine, LoadRequest, LoadSummary},
    include::matching_siblings,
    progress::ProgressToken,
    server::state::CLanguageServer,
};

impl CLanguageServer {
    /// Load request for `file` under the current settings, workspace folders
    /// and nearest `c-analyzer.toml`.
    pub(crate) async fn load_request_for(
        &self,
        file: &Path,
        settings: &ServerSettings,
    ) -> LoadRequest {
        let workspace_roots = self.workspace_roots.read().await.clone();
        let project = ProjectFile::discover(file);
        let settings = settings.with_project(project);

        let mut base_paths = settings.paths.base_paths.clone();
        for root in workspace_roots {
            if !base_paths.contains(&root) {
                base_paths.push(root);
            }
        }
        let extra_files = if settings.indexing.load_matching {
            matching_siblings(file, &settings.indexing.extensions)
        } else {
            Vec::new()
        };

        LoadRequest {
            root: file.to_path_buf(),
            base_paths,
            sys_paths: settings.paths.system_paths.clone(),
            extra_files,
        }
    }

    /// (Re)index around `file` unless the published index already covers it
    /// unchanged. `force` skips that check.
    pub(crate) async fn ensure_loaded(
        &self,
        file: PathBuf,
        force: bool,
    ) -> Option<LoadSummary> {
        let settings = self.settings_snapshot().await;
        if !settings.indexing.is_indexed(&file) {
            debug!("[server] {} is not an indexed file type", file.display());
            return None;
        }
        let request = self.load_request_for(&file, &settings).await;

        if !force {
            let engine = Arc::clone(&self.engine);
            let check = request.clone();
            match tokio::task::spawn_blocking(move || engine.is_valid(&check)).await {
                Ok(true) => {
                    debug!("[server] index for {} is current", file.display());
                    return None;
                },
                Ok(false) => {},
                Err(err) => warn!("[server] validity check failed: {err}"),
            }
        }

        run_load(&self.client, Arc::clone(&self.engine), request).await
    }
}

/// Run one load on the blocking pool, mirroring its progress to the client.
async fn run_load(
    client: &tower_lsp::Client,
    engine: Arc<Engine>,
    request: LoadRequest,
) -> Option<LoadSummary> {
    let name = request.root.file_name().map(|name| name.to_string_lossy().into_owned()).unwrap_or_default();
    let mut progress = ProgressToken::begin(client, "Indexing", Some(name)).await;

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<(usize, usize)>();
    let task = tokio::task::spawn_blocking(move || {
        engine.load(&request, move |done, total| {
            let _ = tx.send((done, total));
        })
    });

    while let Some((done, total)) = rx.recv().await {
        progress.report_files(done, total).await;
    }

    match task.await {
        Ok(Some(summary)) => {
            info!("[server] indexed {} files ({} symbols)", summary.files, summary.symbols);
            progress.end(Some(format!("{} files, {} symbols", summary.files, summary.symbols))).await;
            Some(summary)
        },
        Ok(None) => {
            progress.end(Some("Superseded".to_string())).await;
            None
        },
        Err(err) => {
            warn!("[server] load task failed: {err}");
            progress.end(Some("Failed".to_string())).await;
            None
        },
    }
}
