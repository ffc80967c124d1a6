use super::number::{describe_integer, parse_integer_literal};

#[test]
fn parses_each_radix() {
    assert_eq!(parse_integer_literal("42"), Some(42));
    assert_eq!(parse_integer_literal("0x1F"), Some(31));
    assert_eq!(parse_integer_literal("0XfF"), Some(255));
    assert_eq!(parse_integer_literal("0755"), Some(493));
    assert_eq!(parse_integer_literal("0b101"), Some(5));
    assert_eq!(parse_integer_literal("0"), Some(0));
}

#[test]
fn ignores_suffixes() {
    assert_eq!(parse_integer_literal("10u"), Some(10));
    assert_eq!(parse_integer_literal("0x10UL"), Some(16));
    assert_eq!(parse_integer_literal("7ll"), Some(7));
}

#[test]
fn rejects_non_literals() {
    assert_eq!(parse_integer_literal("count"), None);
    assert_eq!(parse_integer_literal("09"), None);
    assert_eq!(parse_integer_literal("0xZZ"), None);
    assert_eq!(parse_integer_literal(""), None);
    assert_eq!(parse_integer_literal("u"), None);
}

#[test]
fn describes_all_radixes() {
    assert_eq!(describe_integer(31), "Integer: HEX=0x1F DEC=31 OCT=0o37");
    assert_eq!(describe_integer(0), "Integer: HEX=0x0 DEC=0 OCT=0o0");
}
