use once_cell::sync::Lazy;
use regex::Regex;

static INDEX_GROUP: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"\[[^\[]*\]").ok());
static EXPRESSION_BREAK: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r",|&|;|!|\+|\(|\[|\s+").ok());
static ACCESSOR: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"->|\.|::").ok());

/// Split the member-access expression ending `expression` into its links.
///
/// `foo(a, b[i].c->d` -> `["b", "c", "d"]`; a trailing accessor yields an
/// empty last link (`p.` -> `["p", ""]`).
pub fn extract_access_chain(expression: &str) -> Vec<String> {
    let (Some(index_group), Some(expression_break), Some(accessor)) =
        (INDEX_GROUP.as_ref(), EXPRESSION_BREAK.as_ref(), ACCESSOR.as_ref())
    else {
        return Vec::new();
    };

    let mut text = expression.trim().to_owned();
    loop {
        let stripped = index_group.replace_all(&text, "").into_owned();
        if stripped == text {
            break;
        }
        text = stripped;
    }

    let tail = expression_break.split(&text).last().unwrap_or_default();
    accessor
        .split(tail)
        .map(|link| {
            let link = link.split('[').next().unwrap_or_default();
            link.trim_matches(|c: char| !(c.is_alphanumeric() || c == '_')).to_owned()
        })
        .collect()
}

/// Whether the text before a word ends in `->`, `.` or `::`.
pub fn ends_with_accessor(line_prefix: &str) -> bool {
    let trimmed = line_prefix.trim_end();
    trimmed.ends_with("->") || trimmed.ends_with('.') || trimmed.ends_with("::")
}

#[cfg(test)]
#[path = "../../tests/src/engine/chain_tests.rs"]
mod tests;
