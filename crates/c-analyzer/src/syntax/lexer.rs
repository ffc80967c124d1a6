use std::ops::Range;

use crate::syntax::kind::TokenKind;
use logos::Logos;

/// A lexer that wraps `logos::Lexer` to produce `TokenKind` tokens.
///
/// Unrecognized input is yielded as `None` kinds so callers can step over it.
pub struct Lexer<'a> {
    inner: logos::Lexer<'a, TokenKind>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            inner: TokenKind::lexer(input),
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = (Option<TokenKind>, &'a str, Range<usize>);

    fn next(&mut self) -> Option<Self::Item> {
        let token_result = self.inner.next()?;
        Some((token_result.ok(), self.inner.slice(), self.inner.span()))
    }
}

/// A significant token with its 1-based line and byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub line: u32,
    pub start: usize,
}

impl Token<'_> {
    pub fn is(
        &self,
        kind: TokenKind,
    ) -> bool {
        self.kind == kind
    }

    pub fn is_word(
        &self,
        word: &str,
    ) -> bool {
        self.kind == TokenKind::Ident && self.text == word
    }
}

/// Lex `source`, dropping whitespace, comments and unrecognized bytes.
pub fn significant_tokens(source: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut line = 1u32;
    let mut consumed = 0usize;

    for (kind, text, span) in Lexer::new(source) {
        line += count_newlines(&source[consumed..span.start]);
        consumed = span.start;
        if let Some(kind) = kind
            && !kind.is_trivia()
        {
            tokens.push(Token {
                kind,
                text,
                line,
                start: span.start,
            });
        }
    }

    tokens
}

fn count_newlines(text: &str) -> u32 {
    text.bytes().filter(|&b| b == b'\n').count() as u32
}

#[cfg(test)]
#[path = "../../tests/src/syntax/lexer_tests.rs"]
mod tests;
