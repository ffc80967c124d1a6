use crate::syntax::kind::is_type_qualifier;

const AGGREGATE_KEYWORDS: &[&str] = &["struct", "union", "class", "enum"];

/// Normalize a type spelling by stripping qualifiers, tags and pointers.
///
/// E.g. `const struct Point *` -> `Point`, `ns::Foo &` -> `ns::Foo`.
/// Scope qualification is kept so the result can be looked up as a scope path.
pub fn normalize_type_name(spelling: &str) -> Option<String> {
    let mut s = spelling.trim();
    if s.is_empty() {
        return None;
    }

    if let Some((base, _)) = s.split_once('<') {
        s = base.trim();
    }

    let words: Vec<&str> = s
        .split(|c: char| c.is_whitespace() || c == '*' || c == '&')
        .filter(|w| !w.is_empty())
        .filter(|w| !is_type_qualifier(w) && !AGGREGATE_KEYWORDS.contains(w))
        .collect();

    let token = words.last()?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// First type token of a declaration line, with one trailing `*` removed.
///
/// `struct Point *p;` -> `Point`, `Node* next;` -> `Node`, `int x;` -> `int`.
pub fn declared_type(search_text: &str) -> Option<String> {
    let token = search_text
        .split_whitespace()
        .find(|w| *w != "typedef" && !is_type_qualifier(w) && !AGGREGATE_KEYWORDS.contains(w))?;
    let token = token.strip_suffix('*').unwrap_or(token);
    let token = token.trim_end_matches([';', ',', '&']);
    if token.is_empty() || !token.starts_with(|c: char| c.is_alphabetic() || c == '_') {
        return None;
    }
    Some(token.to_string())
}
