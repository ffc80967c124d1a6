//! Conversions from symbol records to LSP types.

use tower_lsp::lsp_types::{CompletionItemKind, Location, Position, Range, SymbolKind as LspSymbolKind, Url};

use crate::{
    document::utf16_column,
    symbols::{AggregateTag, SymbolDetail, SymbolRecord},
};

pub fn lsp_symbol_kind(record: &SymbolRecord) -> LspSymbolKind {
    match &record.detail {
        SymbolDetail::Aggregate {
            tag,
        } => match tag {
            AggregateTag::Struct => LspSymbolKind::STRUCT,
            AggregateTag::Union => LspSymbolKind::STRUCT,
            AggregateTag::Class => LspSymbolKind::CLASS,
            AggregateTag::Enum => LspSymbolKind::ENUM,
        },
        SymbolDetail::Alias {
            ..
        } => LspSymbolKind::TYPE_PARAMETER,
        SymbolDetail::Member {
            ..
        } => LspSymbolKind::FIELD,
        SymbolDetail::Variable {
            ..
        }
        | SymbolDetail::Parameter {
            ..
        } => LspSymbolKind::VARIABLE,
        SymbolDetail::Function {
            ..
        } => {
            if record.name.len() > 1 {
                LspSymbolKind::METHOD
            } else {
                LspSymbolKind::FUNCTION
            }
        },
        SymbolDetail::Macro => LspSymbolKind::CONSTANT,
        SymbolDetail::Other => LspSymbolKind::ENUM_MEMBER,
    }
}

pub fn completion_item_kind(record: &SymbolRecord) -> CompletionItemKind {
    match &record.detail {
        SymbolDetail::Aggregate {
            tag: AggregateTag::Enum,
        } => CompletionItemKind::ENUM,
        SymbolDetail::Aggregate {
            tag: AggregateTag::Class,
        } => CompletionItemKind::CLASS,
        SymbolDetail::Aggregate {
            ..
        }
        | SymbolDetail::Alias {
            ..
        } => CompletionItemKind::STRUCT,
        SymbolDetail::Member {
            ..
        } => CompletionItemKind::FIELD,
        SymbolDetail::Variable {
            ..
        }
        | SymbolDetail::Parameter {
            ..
        } => CompletionItemKind::VARIABLE,
        SymbolDetail::Function {
            ..
        } => {
            if record.name.len() > 1 {
                CompletionItemKind::METHOD
            } else {
                CompletionItemKind::FUNCTION
            }
        },
        SymbolDetail::Macro => CompletionItemKind::CONSTANT,
        SymbolDetail::Other => CompletionItemKind::ENUM_MEMBER,
    }
}

/// Range of `word` on the record's declaration line, or of the declaration
/// start when the word is not in its search text. `line_text` turns byte
/// columns into UTF-16 ones.
pub fn record_range(
    record: &SymbolRecord,
    word: Option<&str>,
    line_text: Option<&str>,
) -> Range {
    let line = record.line.saturating_sub(1);
    let (start, end) = match word.and_then(|word| record.column_of(word).map(|col| (col, word.len()))) {
        Some((col, len)) => (col as usize, col as usize + len),
        None => (record.column as usize, record.column as usize),
    };
    let to_character = |byte: usize| match line_text {
        Some(text) => utf16_column(text, byte),
        None => byte as u32,
    };
    Range {
        start: Position {
            line,
            character: to_character(start),
        },
        end: Position {
            line,
            character: to_character(end),
        },
    }
}

pub fn record_location(
    record: &SymbolRecord,
    word: Option<&str>,
    line_text: Option<&str>,
) -> Option<Location> {
    let uri = Url::from_file_path(&record.file).ok()?;
    Some(Location {
        uri,
        range: record_range(record, word, line_text),
    })
}

#[cfg(test)]
#[path = "../../tests/src/ide/lsp_tests.rs"]
mod tests;
