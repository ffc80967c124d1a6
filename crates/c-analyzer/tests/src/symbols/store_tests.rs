use super::*;
use crate::symbols::{
    scope::{AggregateTag, TypeRef},
    types::{ParsedFile, SymbolDetail},
};

fn record(
    name: &str,
    file: &str,
    detail: SymbolDetail,
) -> SymbolRecord {
    SymbolRecord {
        name: ScopePath::parse(name),
        file: PathBuf::from(file),
        line: 1,
        column: 0,
        search_text: String::new(),
        completion: name.to_string(),
        status: String::new(),
        detail,
    }
}

fn variable(
    name: &str,
    file: &str,
    typeref: Option<&str>,
) -> SymbolRecord {
    record(
        name,
        file,
        SymbolDetail::Variable {
            typeref: typeref.map(TypeRef::parse),
        },
    )
}

fn store_of(records: Vec<SymbolRecord>) -> SymbolStore {
    let mut store = SymbolStore::new();
    store.add_records(records);
    store.finish();
    store
}

#[test]
fn typeref_wins_over_earlier_plain_record() {
    let store = store_of(vec![variable("p", "/a.c", None), variable("p", "/b.c", Some("struct:Point"))]);
    let p = store.get("p").expect("p");
    assert_eq!(p.file, PathBuf::from("/b.c"));
}

#[test]
fn more_specific_kind_wins_then_first_seen() {
    let store = store_of(vec![
        variable("Point", "/a.c", None),
        record(
            "Point",
            "/b.c",
            SymbolDetail::Aggregate {
                tag: AggregateTag::Struct,
            },
        ),
        record(
            "Point",
            "/c.c",
            SymbolDetail::Aggregate {
                tag: AggregateTag::Struct,
            },
        ),
    ]);
    assert_eq!(store.get("Point").expect("Point").file, PathBuf::from("/b.c"));

    let macros = store_of(vec![record("MAX", "/x.h", SymbolDetail::Macro), record("MAX", "/y.h", SymbolDetail::Macro)]);
    assert_eq!(macros.get("MAX").expect("MAX").file, PathBuf::from("/x.h"));
}

#[test]
fn best_match_agrees_with_merge() {
    let a = variable("v", "/a.c", None);
    let b = variable("v", "/b.c", Some("Foo"));
    let c = variable("v", "/c.c", Some("Bar"));
    let winner = best_match([&a, &b, &c]).expect("winner");
    assert_eq!(winner.file, PathBuf::from("/b.c"));
    assert!(best_match(std::iter::empty()).is_none());
}

#[test]
fn search_tokens_returns_prefix_range_in_order() {
    let store = store_of(vec![
        variable("Point::y", "/a.c", None),
        variable("Point::x", "/a.c", None),
        variable("Pointer", "/a.c", None),
        variable("Other", "/a.c", None),
    ]);
    let found: Vec<String> = store.search_tokens("Point::").iter().map(|r| r.name.to_string()).collect();
    assert_eq!(found, vec!["Point::x", "Point::y"]);
    assert_eq!(store.search_tokens("Point").len(), 3);
    assert!(store.search_tokens("Zed").is_empty());
    assert_eq!(store.search_tokens("").len(), store.len());
}

#[test]
fn function_at_picks_innermost_body_and_locals_follow() {
    let file = Path::new("/src/main.c");
    let outer = record(
        "outer",
        "/src/main.c",
        SymbolDetail::Function {
            body: Some(LineSpan {
                start: 1,
                end: 20,
            }),
        },
    );
    let inner = record(
        "Outer::inner",
        "/src/main.c",
        SymbolDetail::Function {
            body: Some(LineSpan {
                start: 5,
                end: 8,
            }),
        },
    );
    let parsed = ParsedFile {
        records: vec![outer, inner],
        locals: [("outer".to_string(), vec![variable("count", "/src/main.c", None)])].into_iter().collect(),
    };

    let mut store = SymbolStore::new();
    store.add_file(file, &parsed.records, parsed.locals.clone());
    store.add_records(parsed.records);
    store.finish();

    assert_eq!(store.function_at(file, 6), Some("Outer::inner"));
    assert_eq!(store.function_at(file, 12), Some("outer"));
    assert_eq!(store.function_at(file, 21), None);
    assert_eq!(store.locals(file, "outer").len(), 1);
    assert!(store.locals(file, "Outer::inner").is_empty());
    assert!(store.locals(Path::new("/other.c"), "outer").is_empty());
    assert!(store.contains_file(file));
    assert_eq!(store.files(), [file.to_path_buf()]);
}

#[test]
fn claimed_scopes_only_count_below_the_owner() {
    let store = store_of(vec![
        record(
            "S::u",
            "/a.c",
            SymbolDetail::Member {
                typeref: Some(TypeRef::parse("union:S::__anon0")),
            },
        ),
        record(
            "Holder::point",
            "/a.c",
            SymbolDetail::Member {
                typeref: Some(TypeRef::parse("struct:Point")),
            },
        ),
    ]);

    let owner = ScopePath::parse("S");
    assert!(store.is_claimed_within(&owner, &ScopePath::parse("S::__anon0::i")));
    assert!(!store.is_claimed_within(&owner, &ScopePath::parse("S::__anon1::j")));
    // `Point` is claimed by a member elsewhere, but it is not nested under `Point`.
    assert!(!store.is_claimed_within(&ScopePath::parse("Point"), &ScopePath::parse("Point::x")));
}

#[test]
fn merging_the_same_records_twice_keeps_the_same_winners() {
    let records = vec![
        variable("p", "/a.c", None),
        variable("p", "/b.c", Some("struct:Point")),
        variable("q", "/a.c", None),
        record(
            "Point",
            "/a.c",
            SymbolDetail::Aggregate {
                tag: AggregateTag::Struct,
            },
        ),
        variable("Point", "/b.c", None),
    ];
    let once = store_of(records.clone());

    let mut twice = SymbolStore::new();
    twice.add_records(records.clone());
    twice.add_records(records);
    twice.finish();

    assert_eq!(once.len(), twice.len());
    for (a, b) in once.iter().zip(twice.iter()) {
        assert_eq!(a, b);
    }
    assert_eq!(twice.get("p").map(|r| r.file.clone()), Some(PathBuf::from("/b.c")));
    assert_eq!(twice.get("Point").map(|r| r.file.clone()), Some(PathBuf::from("/a.c")));
}
