use std::{path::Path, sync::Arc};

use tower_lsp::lsp_types::{Hover, HoverContents, MarkupContent, MarkupKind};
use tracing::debug;

use crate::{
    document::WordAt,
    engine::Engine,
    hover::number::{describe_integer, parse_integer_literal},
};

pub struct HoverProvider {
    engine: Arc<Engine>,
}

impl HoverProvider {
    pub fn new(engine: Arc<Engine>) -> Self {
        Self {
            engine,
        }
    }

    /// Status text of the symbol under the cursor, or the radix breakdown of
    /// an integer literal.
    pub fn provide(
        &self,
        file: &Path,
        line: u32,
        at: &WordAt,
    ) -> Option<Hover> {
        let function = self.engine.function_at(file, line);
        if let Some(record) = self.engine.symbol_at(file, function.as_deref(), &at.line_prefix, &at.word) {
            debug!("[hover] {} -> {}", at.word, record.name);
            return Some(markdown_hover(format!("```c\n{}\n```", record.status_for(&at.word)), at));
        }
        let value = parse_integer_literal(&at.word)?;
        Some(markdown_hover(describe_integer(value), at))
    }
}

fn markdown_hover(
    value: String,
    at: &WordAt,
) -> Hover {
    Hover {
        contents: HoverContents::Markup(MarkupContent {
            kind: MarkupKind::Markdown,
            value,
        }),
        range: Some(at.range),
    }
}
