use super::*;

fn kinds(input: &str) -> Vec<(TokenKind, &str)> {
    significant_tokens(input).into_iter().map(|t| (t.kind, t.text)).collect()
}

#[test]
fn test_punctuation() {
    assert_eq!(
        kinds("{ } ( ) ; :: -> ."),
        vec![
            (TokenKind::LBrace, "{"),
            (TokenKind::RBrace, "}"),
            (TokenKind::LParen, "("),
            (TokenKind::RParen, ")"),
            (TokenKind::Semicolon, ";"),
            (TokenKind::DoubleColon, "::"),
            (TokenKind::Arrow, "->"),
            (TokenKind::Dot, "."),
        ]
    );
}

#[test]
fn test_identifiers_and_literals() {
    assert_eq!(
        kinds("main 123 3.14 \"hello\" 'c'"),
        vec![
            (TokenKind::Ident, "main"),
            (TokenKind::Number, "123"),
            (TokenKind::Number, "3.14"),
            (TokenKind::String, "\"hello\""),
            (TokenKind::Char, "'c'"),
        ]
    );
}

#[test]
fn test_directive_spans_continuation_lines() {
    let tokens = significant_tokens("#define A(x) \\\n  ((x) + 1)\nint y;");
    assert_eq!(tokens[0].kind, TokenKind::Directive);
    assert!(tokens[0].text.contains("((x) + 1)"));
    assert_eq!(tokens[1].text, "int");
    assert_eq!(tokens[1].line, 3);
}

#[test]
fn test_comments_are_dropped_and_lines_tracked() {
    let tokens = significant_tokens("/* a\n b */ int\n// c\nx;");
    assert_eq!(tokens[0].text, "int");
    assert_eq!(tokens[0].line, 2);
    assert_eq!(tokens[1].text, "x");
    assert_eq!(tokens[1].line, 4);
}
