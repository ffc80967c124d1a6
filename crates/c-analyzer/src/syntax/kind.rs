use logos::Logos;

#[derive(Logos, Debug, PartialEq, Eq, Clone, Copy)]
#[logos(error = ())] // Use unit type for error
pub enum TokenKind {
    #[regex(r"[ \t\r\n\f]+")]
    Whitespace,

    #[regex(r"//.*", allow_greedy = true)]
    #[regex(r"/\*([^*]|\*+[^*/])*\*+/")]
    Comment,

    /// A whole preprocessor line, including `\` continuations.
    #[regex(r"#([^\n\\]|\\[\s\S])*", allow_greedy = true)]
    Directive,

    // Punctuation
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(";")]
    Semicolon,
    #[token(":")]
    Colon,
    #[token("::")]
    DoubleColon,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token("...")]
    Ellipsis,
    #[token("->")]
    Arrow,
    #[token("*")]
    Star,
    #[token("&")]
    Amp,
    #[token("&&")]
    AndAnd,
    #[token("=")]
    Equal,
    #[token("<")]
    Less,
    #[token(">")]
    Greater,

    // Operators the declaration scanner only needs to step over
    #[token("+")]
    #[token("-")]
    #[token("/")]
    #[token("%")]
    #[token("^")]
    #[token("|")]
    #[token("~")]
    #[token("!")]
    #[token("?")]
    #[token("++")]
    #[token("--")]
    #[token("+=")]
    #[token("-=")]
    #[token("*=")]
    #[token("/=")]
    #[token("%=")]
    #[token("&=")]
    #[token("|=")]
    #[token("^=")]
    #[token("==")]
    #[token("!=")]
    #[token("<=")]
    #[token(">=")]
    #[token("||")]
    #[token("<<")]
    #[token(">>")]
    #[token("<<=")]
    #[token(">>=")]
    Operator,

    // Literals
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,
    #[regex(r#"'([^'\\]|\\[\s\S])*'"#)]
    Char,
    #[regex(r#""([^"\\]|\\[\s\S])*""#)]
    String,
    #[regex(r"[0-9][0-9a-zA-Z_.']*")]
    #[regex(r"\.[0-9][0-9a-zA-Z_.']*")]
    Number,
}

impl TokenKind {
    pub fn is_trivia(self) -> bool {
        matches!(self, TokenKind::Whitespace | TokenKind::Comment)
    }
}

/// Keywords that can start or qualify a declaration's type.
pub const TYPE_QUALIFIERS: &[&str] = &[
    "const",
    "volatile",
    "static",
    "extern",
    "register",
    "inline",
    "__inline",
    "__inline__",
    "restrict",
    "__restrict",
    "auto",
    "mutable",
    "constexpr",
    "virtual",
    "explicit",
    "friend",
    "thread_local",
    "_Thread_local",
    "typename",
];

/// Builtin type spellings; declarations of these types carry no type reference.
pub const BUILTIN_TYPES: &[&str] = &[
    "void", "char", "short", "int", "long", "float", "double", "signed", "unsigned", "bool", "_Bool", "wchar_t",
    "char8_t", "char16_t", "char32_t", "size_t", "int8_t", "int16_t", "int32_t", "int64_t", "uint8_t", "uint16_t",
    "uint32_t", "uint64_t", "intptr_t", "uintptr_t", "ptrdiff_t", "ssize_t",
];

/// Statement keywords that never start a local declaration.
pub const STATEMENT_KEYWORDS: &[&str] = &[
    "return", "if", "else", "while", "do", "for", "switch", "case", "default", "break", "continue", "goto", "sizeof",
    "delete", "new", "throw", "try", "catch", "co_return", "co_await", "co_yield", "static_assert",
];

pub fn is_type_qualifier(word: &str) -> bool {
    TYPE_QUALIFIERS.contains(&word)
}

pub fn is_builtin_type(word: &str) -> bool {
    BUILTIN_TYPES.contains(&word)
}

pub fn is_statement_keyword(word: &str) -> bool {
    STATEMENT_KEYWORDS.contains(&word)
}
