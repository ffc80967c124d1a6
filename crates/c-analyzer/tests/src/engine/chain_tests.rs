use super::*;

fn chain(expression: &str) -> Vec<String> {
    extract_access_chain(expression)
}

#[test]
fn splits_on_every_accessor() {
    assert_eq!(chain("a->b.c"), vec!["a", "b", "c"]);
    assert_eq!(chain("ns::Type::member"), vec!["ns", "Type", "member"]);
    assert_eq!(chain("p."), vec!["p", ""]);
}

#[test]
fn takes_the_trailing_expression() {
    assert_eq!(chain("    total += q->"), vec!["q", ""]);
    assert_eq!(chain("call(first, second.inner."), vec!["second", "inner", ""]);
    assert_eq!(chain("if (!node->next"), vec!["node", "next"]);
    assert_eq!(chain("x = &s.u"), vec!["s", "u"]);
}

#[test]
fn strips_index_groups_including_nested() {
    assert_eq!(chain("items[i].value"), vec!["items", "value"]);
    assert_eq!(chain("grid[row[0]][col].cell->"), vec!["grid", "cell", ""]);
    assert_eq!(chain("list[count"), vec!["count"]);
}

#[test]
fn accessor_detection() {
    assert!(ends_with_accessor("  p->"));
    assert!(ends_with_accessor("s."));
    assert!(ends_with_accessor("ns::"));
    assert!(!ends_with_accessor("return "));
    assert!(!ends_with_accessor(""));
}

#[test]
fn surrounding_whitespace_is_ignored() {
    assert_eq!(chain("p.x "), vec!["p", "x"]);
    assert_eq!(chain("  node->next\t"), vec!["node", "next"]);
    assert_eq!(chain("p. "), vec!["p", ""]);
}
