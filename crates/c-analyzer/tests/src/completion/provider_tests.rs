use std::{fs, path::PathBuf};

use super::*;
use crate::{
    completion::context::{CursorContext, detect_context},
    engine::LoadRequest,
    parser::CParser,
    vfs::normalized_path,
};

const POINT_H: &str = "struct Point {\n    int x;\n    int y;\n};\nint point_count(struct Point *p, int n);\n";

const MAIN_C: &str = "\
#include \"point.h\"
struct Point origin;
int main(void) {
    struct Point *cursor = &origin;
    int pad = 0;
    cursor->
}
";

fn loaded_provider() -> (tempfile::TempDir, PathBuf, CompletionProvider) {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join("point.h"), POINT_H).expect("write header");
    fs::write(dir.path().join("main.c"), MAIN_C).expect("write source");
    let main = normalized_path(&dir.path().join("main.c"));

    let engine = Arc::new(Engine::with_parser(Arc::new(CParser)));
    engine.load(&LoadRequest::new(&main), |_, _| {}).expect("load finishes");
    (dir, main, CompletionProvider::new(engine))
}

fn labels(items: &[CompletionItem]) -> Vec<&str> {
    items.iter().map(|item| item.label.as_str()).collect()
}

#[test]
fn detects_member_access_and_partial_word() {
    assert_eq!(
        detect_context("    cursor->ne"),
        CursorContext::MemberAccess {
            expression: "    cursor->ne".to_string(),
            partial: "ne".to_string(),
        }
    );
    assert_eq!(
        detect_context("a.b."),
        CursorContext::MemberAccess {
            expression: "a.b.".to_string(),
            partial: String::new(),
        }
    );
    assert_eq!(
        detect_context("    return ori"),
        CursorContext::Prefix {
            prefix: "ori".to_string(),
        }
    );
    assert_eq!(
        detect_context(""),
        CursorContext::Prefix {
            prefix: String::new(),
        }
    );
}

#[test]
fn member_access_lists_fields_of_the_pointee() {
    let (_dir, main, provider) = loaded_provider();

    let items = provider.provide(&main, 6, "    cursor->");
    assert_eq!(labels(&items), vec!["x", "y"]);
    assert!(items.iter().all(|item| item.sort_text.as_deref().is_some_and(|s| s.starts_with("0_"))));

    let items = provider.provide(&main, 6, "    cursor->y");
    assert_eq!(labels(&items), vec!["y"]);
}

#[test]
fn prefix_completion_ranks_locals_before_globals() {
    let (_dir, main, provider) = loaded_provider();

    let items = provider.provide(&main, 6, "    p");
    let pad = items.iter().find(|item| item.label == "pad").expect("local pad");
    assert_eq!(pad.sort_text.as_deref(), Some("0_pad"));

    let count = items.iter().find(|item| item.label == "point_count").expect("global function");
    assert_eq!(count.sort_text.as_deref(), Some("1_point_count"));
    assert_eq!(count.insert_text_format, Some(InsertTextFormat::SNIPPET));
    assert_eq!(count.insert_text.as_deref(), Some("point_count(${1:struct Point *p}, ${2:int n})"));
}

#[test]
fn unknown_receiver_yields_nothing() {
    let (_dir, main, provider) = loaded_provider();
    assert!(provider.provide(&main, 6, "    missing.").is_empty());
}
