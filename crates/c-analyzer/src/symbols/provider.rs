use std::{path::Path, sync::Arc};

use tower_lsp::lsp_types::SymbolInformation;

use crate::{
    engine::Engine,
    ide::lsp::{lsp_symbol_kind, record_location},
    symbols::SymbolRecord,
};

const MAX_WORKSPACE_SYMBOLS: usize = 200;

/// Document and workspace symbol lists.
pub struct SymbolProvider {
    engine: Arc<Engine>,
}

impl SymbolProvider {
    pub fn new(engine: Arc<Engine>) -> Self {
        Self {
            engine,
        }
    }

    /// Named records declared in `file`.
    pub fn document_symbols(
        &self,
        file: &Path,
    ) -> Vec<SymbolInformation> {
        self.engine.symbols_for(file, None).iter().filter_map(symbol_information).collect()
    }

    /// Records whose qualified name starts with `query`.
    pub fn workspace_symbols(
        &self,
        query: &str,
    ) -> Vec<SymbolInformation> {
        self.engine
            .search_tokens(query)
            .iter()
            .filter_map(symbol_information)
            .take(MAX_WORKSPACE_SYMBOLS)
            .collect()
    }
}

fn symbol_information(record: &SymbolRecord) -> Option<SymbolInformation> {
    if record.name.is_anonymous() {
        return None;
    }
    let location = record_location(record, Some(record.short_name()), None)?;
    #[allow(deprecated)]
    Some(SymbolInformation {
        name: record.short_name().to_owned(),
        kind: lsp_symbol_kind(record),
        tags: None,
        deprecated: None,
        location,
        container_name: record.name.parent().filter(|parent| !parent.is_empty()).map(|parent| parent.to_string()),
    })
}
