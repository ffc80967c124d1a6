use std::path::PathBuf;

use super::*;
use crate::symbols::ScopePath;

fn member(
    name: &str,
    line: u32,
    column: u32,
    search_text: &str,
) -> SymbolRecord {
    SymbolRecord {
        name: ScopePath::parse(name),
        file: PathBuf::from("/work/point.h"),
        line,
        column,
        search_text: search_text.to_string(),
        completion: String::new(),
        status: String::new(),
        detail: SymbolDetail::Member {
            typeref: None,
        },
    }
}

#[test]
fn range_points_at_word() {
    let record = member("Point::y", 3, 4, "int x, y;");
    let range = record_range(&record, Some("y"), None);
    assert_eq!(range.start, Position::new(2, 11));
    assert_eq!(range.end, Position::new(2, 12));
}

#[test]
fn range_falls_back_to_declaration_start() {
    let record = member("Point::y", 3, 4, "int x, y;");
    let range = record_range(&record, Some("missing"), None);
    assert_eq!(range.start, Position::new(2, 4));
    assert_eq!(range.end, range.start);
}

#[test]
fn range_converts_to_utf16() {
    let line = "/* ü */ int v;";
    let column = line.find("int").unwrap() as u32;
    let record = member("v", 1, column, "int v;");
    let range = record_range(&record, Some("v"), Some(line));
    assert_eq!(range.start, Position::new(0, 12));
}

#[test]
fn location_uses_record_file() {
    let record = member("Point::x", 2, 4, "int x;");
    let location = record_location(&record, Some("x"), None).unwrap();
    assert_eq!(location.uri.path(), "/work/point.h");
    assert_eq!(location.range.start, Position::new(1, 8));
}

#[test]
fn kinds_follow_detail() {
    let mut record = member("Point::x", 1, 0, "");
    assert_eq!(lsp_symbol_kind(&record), LspSymbolKind::FIELD);
    assert_eq!(completion_item_kind(&record), CompletionItemKind::FIELD);

    record.detail = SymbolDetail::Function {
        body: None,
    };
    assert_eq!(lsp_symbol_kind(&record), LspSymbolKind::METHOD);
    record.name = ScopePath::parse("main");
    assert_eq!(completion_item_kind(&record), CompletionItemKind::FUNCTION);

    record.detail = SymbolDetail::Aggregate {
        tag: AggregateTag::Enum,
    };
    assert_eq!(lsp_symbol_kind(&record), LspSymbolKind::ENUM);
}
