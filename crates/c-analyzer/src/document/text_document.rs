use tower_lsp::lsp_types::{Position, Range, TextDocumentContentChangeEvent, Url};

/// Snapshot of one open editor buffer.
#[derive(Debug, Clone)]
pub struct Document {
    pub uri: Url,
    pub text: String,
    pub version: i32,
    /// Byte offset of every line start, rebuilt on each mutation.
    line_offsets: Vec<usize>,
}

/// Identifier under the cursor together with the text before it on its line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordAt {
    pub word: String,
    pub range: Range,
    /// Line text before `word`, e.g. `p->` for `p->x`.
    pub line_prefix: String,
}

impl Document {
    pub fn new(
        uri: Url,
        text: String,
        version: i32,
    ) -> Self {
        let line_offsets = line_offsets(&text);
        Self {
            uri,
            text,
            version,
            line_offsets,
        }
    }

    pub fn line_count(&self) -> usize {
        self.line_offsets.len()
    }

    /// Text of a 0-based line without its line terminator.
    pub fn line_text(
        &self,
        line: usize,
    ) -> Option<&str> {
        let start = *self.line_offsets.get(line)?;
        let end = self.line_offsets.get(line + 1).copied().unwrap_or(self.text.len());
        Some(self.text[start..end].trim_end_matches('\n').trim_end_matches('\r'))
    }

    /// Byte offset of an LSP position (UTF-16 columns).
    pub fn offset_of(
        &self,
        pos: Position,
    ) -> Option<usize> {
        let line = self.line_text(pos.line as usize)?;
        let line_start = self.line_offsets[pos.line as usize];
        Some(line_start + byte_column(line, pos.character))
    }

    /// Line text up to the cursor: what completion looks at.
    pub fn text_before(
        &self,
        pos: Position,
    ) -> Option<&str> {
        let line = self.line_text(pos.line as usize)?;
        Some(&line[..byte_column(line, pos.character)])
    }

    /// Identifier touching `pos`, preferring the one to the right.
    pub fn word_at(
        &self,
        pos: Position,
    ) -> Option<WordAt> {
        let line = self.line_text(pos.line as usize)?;
        let cursor = byte_column(line, pos.character);
        let bytes = line.as_bytes();

        let mut start = cursor;
        while start > 0 && is_word_byte(bytes[start - 1]) {
            start -= 1;
        }
        let mut end = cursor;
        while end < bytes.len() && is_word_byte(bytes[end]) {
            end += 1;
        }
        if start == end {
            return None;
        }

        Some(WordAt {
            word: line[start..end].to_owned(),
            range: Range {
                start: Position {
                    line: pos.line,
                    character: utf16_column(line, start),
                },
                end: Position {
                    line: pos.line,
                    character: utf16_column(line, end),
                },
            },
            line_prefix: line[..start].to_owned(),
        })
    }

    pub fn set_content(
        &mut self,
        text: String,
        version: i32,
    ) {
        self.text = text;
        self.version = version;
        self.line_offsets = line_offsets(&self.text);
    }

    /// Apply incremental or full-content changes in order.
    pub fn apply_changes(
        &mut self,
        changes: Vec<TextDocumentContentChangeEvent>,
        version: i32,
    ) {
        for change in changes {
            match change.range {
                Some(range) => {
                    if let (Some(start), Some(end)) = (self.offset_of(range.start), self.offset_of(range.end))
                        && start <= end
                    {
                        self.text.replace_range(start..end, &change.text);
                    }
                },
                None => self.text = change.text,
            }
            self.line_offsets = line_offsets(&self.text);
        }
        self.version = version;
    }
}

/// UTF-16 column of a byte offset within `line`.
pub fn utf16_column(
    line: &str,
    byte_offset: usize,
) -> u32 {
    let mut end = byte_offset.min(line.len());
    while !line.is_char_boundary(end) {
        end -= 1;
    }
    line[..end].encode_utf16().count() as u32
}

/// Byte offset of a UTF-16 column within `line`, clamped to its length.
pub fn byte_column(
    line: &str,
    character: u32,
) -> usize {
    let mut utf16 = 0u32;
    for (offset, ch) in line.char_indices() {
        if utf16 >= character {
            return offset;
        }
        utf16 += ch.len_utf16() as u32;
    }
    line.len()
}

fn line_offsets(text: &str) -> Vec<usize> {
    std::iter::once(0).chain(text.match_indices('\n').map(|(i, _)| i + 1)).collect()
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

#[cfg(test)]
#[path = "../../tests/src/document/text_document_tests.rs"]
mod tests;
