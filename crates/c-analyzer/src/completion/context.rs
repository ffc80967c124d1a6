use crate::engine::chain::ends_with_accessor;

/// What the text before the cursor asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CursorContext {
    /// After `->`, `.` or `::`; `expression` runs up to the cursor and
    /// `partial` is the member name typed so far.
    MemberAccess {
        expression: String,
        partial: String,
    },
    /// A bare identifier prefix (possibly empty).
    Prefix {
        prefix: String,
    },
}

pub(crate) fn detect_context(line_before: &str) -> CursorContext {
    let word_start = line_before
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_alphanumeric() || *c == '_')
        .last()
        .map(|(i, _)| i)
        .unwrap_or(line_before.len());
    let (head, partial) = line_before.split_at(word_start);

    if ends_with_accessor(head) {
        return CursorContext::MemberAccess {
            expression: line_before.to_owned(),
            partial: partial.to_owned(),
        };
    }
    CursorContext::Prefix {
        prefix: partial.to_owned(),
    }
}
