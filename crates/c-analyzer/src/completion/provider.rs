use std::{path::Path, sync::Arc};

use tower_lsp::lsp_types::{CompletionItem, InsertTextFormat};
use tracing::debug;

use crate::{
    completion::context::{CursorContext, detect_context},
    engine::Engine,
    ide::lsp::completion_item_kind,
    symbols::SymbolRecord,
};

pub struct CompletionProvider {
    engine: Arc<Engine>,
}

impl CompletionProvider {
    pub fn new(engine: Arc<Engine>) -> Self {
        Self {
            engine,
        }
    }

    /// Completions for a cursor in `file` on 1-based `line`, given the line
    /// text before the cursor.
    pub fn provide(
        &self,
        file: &Path,
        line: u32,
        line_before: &str,
    ) -> Vec<CompletionItem> {
        let function = self.engine.function_at(file, line);
        match detect_context(line_before) {
            CursorContext::MemberAccess {
                expression,
                partial,
            } => {
                let members = self.engine.resolve_members(file, function.as_deref(), &expression, false);
                debug!("[completion] {} members for {expression:?}", members.len());
                members
                    .iter()
                    .filter(|record| record.short_name().starts_with(partial.as_str()))
                    .map(|record| completion_item(record, "0"))
                    .collect()
            },
            CursorContext::Prefix {
                prefix,
            } => {
                let records = self.engine.complete(file, function.as_deref(), &prefix);
                let locals = function.as_deref().map(|f| self.engine.locals(file, f).len()).unwrap_or_default();
                records
                    .iter()
                    .enumerate()
                    .map(|(i, record)| completion_item(record, if i < locals { "0" } else { "1" }))
                    .collect()
            },
        }
    }
}

fn completion_item(
    record: &SymbolRecord,
    rank: &str,
) -> CompletionItem {
    let label = record.short_name().to_owned();
    let snippet = record.completion.contains("${");
    CompletionItem {
        kind: Some(completion_item_kind(record)),
        detail: Some(record.status_for(&label)),
        insert_text: Some(record.completion.clone()),
        insert_text_format: Some(if snippet {
            InsertTextFormat::SNIPPET
        } else {
            InsertTextFormat::PLAIN_TEXT
        }),
        sort_text: Some(format!("{rank}_{label}")),
        label,
        ..Default::default()
    }
}

#[cfg(test)]
#[path = "../../tests/src/completion/provider_tests.rs"]
mod tests;
