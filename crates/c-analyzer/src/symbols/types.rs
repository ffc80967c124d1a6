use std::{collections::BTreeMap, fmt, path::PathBuf};

use serde::{Deserialize, Serialize};

use crate::symbols::scope::{AggregateTag, ScopePath, TypeRef};

/// Placeholder in [`SymbolRecord::status`] replaced by the word under the cursor.
pub const STATUS_WORD_PLACEHOLDER: &str = "$#";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    Type,
    Member,
    Variable,
    Parameter,
    Function,
    Macro,
    Other,
}

impl SymbolKind {
    /// Merge preference: aggregates/aliases and members carry the most
    /// structure, variables and enumerators the least.
    pub fn specificity(self) -> u8 {
        match self {
            SymbolKind::Type | SymbolKind::Member => 2,
            SymbolKind::Function | SymbolKind::Macro | SymbolKind::Parameter => 1,
            SymbolKind::Variable | SymbolKind::Other => 0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SymbolKind::Type => "type",
            SymbolKind::Member => "member",
            SymbolKind::Variable => "variable",
            SymbolKind::Parameter => "parameter",
            SymbolKind::Function => "function",
            SymbolKind::Macro => "macro",
            SymbolKind::Other => "other",
        }
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive 1-based line span of a function body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineSpan {
    pub start: u32,
    pub end: u32,
}

impl LineSpan {
    pub fn contains(
        &self,
        line: u32,
    ) -> bool {
        self.start <= line && line <= self.end
    }
}

/// Kind-specific payload of a [`SymbolRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SymbolDetail {
    /// `struct`/`union`/`class`/`enum` definition. Terminal for type normalization.
    Aggregate {
        tag: AggregateTag,
    },
    /// `typedef` or `using` alias.
    Alias {
        typeref: Option<TypeRef>,
    },
    Member {
        typeref: Option<TypeRef>,
    },
    Variable {
        typeref: Option<TypeRef>,
    },
    Parameter {
        type_name: String,
    },
    Function {
        body: Option<LineSpan>,
    },
    Macro,
    Other,
}

/// One parsed fact about a name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolRecord {
    pub name: ScopePath,
    pub file: PathBuf,
    /// 1-based.
    pub line: u32,
    /// 0-based byte column where `search_text` starts on `line`.
    pub column: u32,
    /// Declaration text from its first token to the end of the line.
    pub search_text: String,
    pub completion: String,
    pub status: String,
    pub detail: SymbolDetail,
}

impl SymbolRecord {
    pub fn kind(&self) -> SymbolKind {
        match self.detail {
            SymbolDetail::Aggregate {
                ..
            }
            | SymbolDetail::Alias {
                ..
            } => SymbolKind::Type,
            SymbolDetail::Member {
                ..
            } => SymbolKind::Member,
            SymbolDetail::Variable {
                ..
            } => SymbolKind::Variable,
            SymbolDetail::Parameter {
                ..
            } => SymbolKind::Parameter,
            SymbolDetail::Function {
                ..
            } => SymbolKind::Function,
            SymbolDetail::Macro => SymbolKind::Macro,
            SymbolDetail::Other => SymbolKind::Other,
        }
    }

    pub fn typeref(&self) -> Option<&TypeRef> {
        match &self.detail {
            SymbolDetail::Alias {
                typeref,
            }
            | SymbolDetail::Member {
                typeref,
            }
            | SymbolDetail::Variable {
                typeref,
            } => typeref.as_ref(),
            _ => None,
        }
    }

    pub fn aggregate_tag(&self) -> Option<AggregateTag> {
        match self.detail {
            SymbolDetail::Aggregate {
                tag,
            } => Some(tag),
            _ => None,
        }
    }

    pub fn function_body(&self) -> Option<LineSpan> {
        match self.detail {
            SymbolDetail::Function {
                body,
            } => body,
            _ => None,
        }
    }

    /// Bare name (last scope segment).
    pub fn short_name(&self) -> &str {
        self.name.last().unwrap_or_default()
    }

    /// Status text with the word placeholder substituted.
    pub fn status_for(
        &self,
        word: &str,
    ) -> String {
        self.status.replace(STATUS_WORD_PLACEHOLDER, word)
    }

    /// Byte column of `word` on the declaration line, located through `search_text`.
    pub fn column_of(
        &self,
        word: &str,
    ) -> Option<u32> {
        if word.is_empty() {
            return None;
        }
        self.search_text.find(word).map(|offset| self.column + offset as u32)
    }
}

/// Output of the file parser for one file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedFile {
    pub records: Vec<SymbolRecord>,
    /// Function name -> parameters then locals, in declaration order.
    pub locals: BTreeMap<String, Vec<SymbolRecord>>,
}

impl ParsedFile {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty() && self.locals.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/src/symbols/types_tests.rs"]
mod tests;
