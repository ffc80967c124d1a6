use std::{path::Path, sync::Arc};

use tower_lsp::lsp_types::{Location, Url};
use tracing::debug;

use crate::{document::DocumentStore, document::WordAt, engine::Engine, ide::lsp::record_location};

pub struct DefinitionProvider {
    engine: Arc<Engine>,
    documents: Arc<DocumentStore>,
}

impl DefinitionProvider {
    pub fn new(
        engine: Arc<Engine>,
        documents: Arc<DocumentStore>,
    ) -> Self {
        Self {
            engine,
            documents,
        }
    }

    /// Declaration of the word under the cursor, positioned on the word
    /// itself when the declaration line spells it.
    pub fn provide(
        &self,
        file: &Path,
        line: u32,
        at: &WordAt,
    ) -> Option<Location> {
        let function = self.engine.function_at(file, line);
        let Some(record) = self.engine.symbol_at(file, function.as_deref(), &at.line_prefix, &at.word) else {
            debug!("[definition] no record for {}", at.word);
            return None;
        };
        let target_line = self.line_text(&record.file, record.line);
        let location = record_location(&record, Some(&at.word), target_line.as_deref());
        debug!("[definition] {} -> {}:{}", at.word, record.file.display(), record.line);
        location
    }

    /// 1-based `line` of `file`, from the open buffer when there is one.
    fn line_text(
        &self,
        file: &Path,
        line: u32,
    ) -> Option<String> {
        let index = line.checked_sub(1)? as usize;
        if let Ok(uri) = Url::from_file_path(file)
            && let Some(doc) = self.documents.get(&uri)
        {
            return doc.line_text(index).map(str::to_owned);
        }
        let content = std::fs::read_to_string(file).ok()?;
        content.lines().nth(index).map(str::to_owned)
    }
}
