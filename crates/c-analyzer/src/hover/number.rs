/// Value of an integer literal as written in C: `0x`/`0X` hex, `0b` binary,
/// leading-zero octal, otherwise decimal. Integer suffixes and digit
/// separators are ignored.
pub fn parse_integer_literal(word: &str) -> Option<u64> {
    let body = word.trim_end_matches(['u', 'U', 'l', 'L', 'z', 'Z']).replace('\'', "");
    if body.is_empty() || !body.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    let lower = body.to_ascii_lowercase();
    if let Some(hex) = lower.strip_prefix("0x") {
        return u64::from_str_radix(hex, 16).ok();
    }
    if let Some(bin) = lower.strip_prefix("0b") {
        return u64::from_str_radix(bin, 2).ok();
    }
    if body.len() > 1 && body.starts_with('0') {
        return u64::from_str_radix(&body[1..], 8).ok();
    }
    body.parse().ok()
}

/// `Integer: HEX=0x1F DEC=31 OCT=0o37`
pub fn describe_integer(value: u64) -> String {
    format!("Integer: HEX=0x{value:X} DEC={value} OCT={value:#o}")
}
