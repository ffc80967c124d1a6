use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::{
    parser::{FileParser, ParseError},
    symbols::{
        AggregateTag, LineSpan, ParsedFile, STATUS_WORD_PLACEHOLDER, ScopePath, SymbolDetail, SymbolRecord, TypeRef,
        scope::ANON_PREFIX, type_text::normalize_type_name,
    },
    syntax::{
        Token, TokenKind,
        kind::{is_builtin_type, is_statement_keyword, is_type_qualifier},
        significant_tokens,
    },
    vfs::stable_hash_hex,
};

/// Best-effort C/C++ declaration scanner.
///
/// Recognizes aggregates, typedefs, `using` aliases, variables, members,
/// functions (with parameters and body locals), enumerators and `#define`s.
/// Anything it does not understand is skipped up to the next `;` or balanced
/// block, so malformed input degrades to fewer records instead of an error.
#[derive(Debug, Clone, Copy, Default)]
pub struct CParser;

impl FileParser for CParser {
    fn parse(
        &self,
        path: &Path,
        source: &str,
    ) -> Result<ParsedFile, ParseError> {
        if source.contains('\0') {
            return Err(ParseError::new(path, "file contains NUL bytes"));
        }
        let parsed = DeclScanner::new(path, source).run();
        debug!(
            "[parser] {}: {} records, {} function bodies",
            path.display(),
            parsed.records.len(),
            parsed.locals.len()
        );
        Ok(parsed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    Namespace,
    Aggregate,
}

#[derive(Debug, Default)]
struct DeclType {
    typeref: Option<TypeRef>,
    /// Named (non-builtin) type word, used for constructor detection.
    type_name: Option<ScopePath>,
}

#[derive(Debug)]
struct Declarator {
    name: ScopePath,
    line: u32,
    params: Option<Vec<Param>>,
}

#[derive(Debug)]
struct Param {
    name: String,
    line: u32,
    start: usize,
    /// Type part only, e.g. `const struct Point *`.
    spelling: String,
    /// Whole parameter text for snippets, e.g. `const struct Point *p`.
    label: String,
}

struct DeclScanner<'a> {
    file: PathBuf,
    source: &'a str,
    line_starts: Vec<usize>,
    tokens: Vec<Token<'a>>,
    pos: usize,
    anon_seed: String,
    anon_counters: HashMap<String, u32>,
    out: ParsedFile,
}

impl<'a> DeclScanner<'a> {
    fn new(
        path: &Path,
        source: &'a str,
    ) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(source.match_indices('\n').map(|(i, _)| i + 1));
        let mut anon_seed = stable_hash_hex(&path.display().to_string());
        anon_seed.truncate(8);
        Self {
            file: path.to_path_buf(),
            source,
            line_starts,
            tokens: significant_tokens(source),
            pos: 0,
            anon_seed,
            anon_counters: HashMap::new(),
            out: ParsedFile::default(),
        }
    }

    fn run(mut self) -> ParsedFile {
        let root = ScopePath::default();
        while self.pos < self.tokens.len() {
            self.parse_block(&root, BlockKind::Namespace);
            // Unbalanced `}` at file scope.
            if self.at(TokenKind::RBrace) {
                self.pos += 1;
            }
        }
        self.out
    }

    // ---- token cursor ----

    fn peek(
        &self,
        offset: usize,
    ) -> Option<Token<'a>> {
        self.tokens.get(self.pos + offset).copied()
    }

    fn at(
        &self,
        kind: TokenKind,
    ) -> bool {
        self.peek(0).is_some_and(|t| t.is(kind))
    }

    fn at_word(
        &self,
        word: &str,
    ) -> bool {
        self.peek(0).is_some_and(|t| t.is_word(word))
    }

    fn eat(
        &mut self,
        kind: TokenKind,
    ) -> bool {
        if self.at(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Index just past the bracket matching the one at `open`, bounded by `end`.
    fn matching_close(
        &self,
        open: usize,
        end: usize,
    ) -> usize {
        let mut depth = 0usize;
        let mut i = open;
        while i < end {
            match self.tokens[i].kind {
                TokenKind::LParen | TokenKind::LBrace | TokenKind::LBracket => depth += 1,
                TokenKind::RParen | TokenKind::RBrace | TokenKind::RBracket => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return i + 1;
                    }
                },
                _ => {},
            }
            i += 1;
        }
        end
    }

    fn skip_balanced(&mut self) {
        self.pos = self.matching_close(self.pos, self.tokens.len());
    }

    /// Index past a `<...>` template argument list starting at `open`, or
    /// `None` when the `<` is a comparison.
    fn template_close(
        &self,
        open: usize,
        end: usize,
    ) -> Option<usize> {
        let mut depth = 0usize;
        let mut i = open;
        while i < end {
            match self.tokens[i].kind {
                TokenKind::Less => depth += 1,
                TokenKind::Greater => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(i + 1);
                    }
                },
                TokenKind::Operator if self.tokens[i].text == ">>" => {
                    if depth <= 2 {
                        return Some(i + 1);
                    }
                    depth -= 2;
                },
                TokenKind::LParen | TokenKind::LBracket => i = self.matching_close(i, end) - 1,
                TokenKind::Semicolon | TokenKind::LBrace | TokenKind::RBrace | TokenKind::RParen => return None,
                _ => {},
            }
            i += 1;
        }
        None
    }

    /// Skip to the end of the current statement. Stops before a `}` that
    /// closes the enclosing block.
    fn skip_statement(&mut self) {
        while let Some(tok) = self.peek(0) {
            match tok.kind {
                TokenKind::Semicolon => {
                    self.pos += 1;
                    return;
                },
                TokenKind::RBrace => return,
                TokenKind::LBrace => {
                    self.skip_balanced();
                    self.eat(TokenKind::Semicolon);
                    return;
                },
                TokenKind::LParen | TokenKind::LBracket => self.skip_balanced(),
                _ => self.pos += 1,
            }
        }
    }

    /// `name`, `ns::name`, `name<T>`; `operator` names are folded into one segment.
    fn qualified_name(&mut self) -> Option<ScopePath> {
        let mut segments: Vec<String> = Vec::new();
        self.eat(TokenKind::DoubleColon);
        while let Some(tok) = self.peek(0) {
            if tok.is_word("template") {
                self.pos += 1;
                continue;
            }
            if !tok.is(TokenKind::Ident) {
                break;
            }
            self.pos += 1;
            if tok.text == "operator" {
                let mut name = String::from("operator");
                while let Some(next) = self.peek(0)
                    && !next.is(TokenKind::LParen)
                    && !next.is(TokenKind::Semicolon)
                {
                    name.push_str(next.text);
                    self.pos += 1;
                }
                // `operator()` spells its own parentheses.
                if name == "operator" && self.at(TokenKind::LParen) && self.peek(1).is_some_and(|t| t.is(TokenKind::RParen)) {
                    name.push_str("()");
                    self.pos += 2;
                }
                segments.push(name);
                break;
            }
            segments.push(tok.text.to_string());
            if self.at(TokenKind::Less)
                && let Some(close) = self.template_close(self.pos, self.tokens.len())
            {
                self.pos = close;
            }
            if self.at(TokenKind::DoubleColon) && self.peek(1).is_some_and(|t| t.is(TokenKind::Ident)) {
                self.pos += 1;
                continue;
            }
            break;
        }
        (!segments.is_empty()).then(|| ScopePath::from_segments(segments))
    }

    fn skip_attribute(&mut self) -> bool {
        let Some(tok) = self.peek(0) else {
            return false;
        };
        if matches!(tok.text, "__attribute__" | "__declspec" | "alignas" | "_Alignas" | "__asm__" | "asm")
            && self.peek(1).is_some_and(|t| t.is(TokenKind::LParen))
        {
            self.pos += 1;
            self.skip_balanced();
            return true;
        }
        if tok.is(TokenKind::LBracket) && self.peek(1).is_some_and(|t| t.is(TokenKind::LBracket)) {
            self.skip_balanced();
            return true;
        }
        false
    }

    // ---- blocks ----

    fn parse_block(
        &mut self,
        scope: &ScopePath,
        kind: BlockKind,
    ) {
        while let Some(tok) = self.peek(0) {
            match tok.kind {
                TokenKind::RBrace => return,
                TokenKind::Semicolon => self.pos += 1,
                TokenKind::Directive => {
                    self.directive(tok);
                    self.pos += 1;
                },
                TokenKind::Ident | TokenKind::DoubleColon => self.item(scope, kind),
                TokenKind::LBrace => self.skip_balanced(),
                _ => self.skip_statement(),
            }
        }
    }

    fn item(
        &mut self,
        scope: &ScopePath,
        kind: BlockKind,
    ) {
        let Some(tok) = self.peek(0) else {
            return;
        };
        match tok.text {
            "namespace" => self.namespace(scope),
            "extern"
                if self.peek(1).is_some_and(|t| t.is(TokenKind::String))
                    && self.peek(2).is_some_and(|t| t.is(TokenKind::LBrace)) =>
            {
                self.pos += 3;
                self.parse_block(scope, kind);
                self.eat(TokenKind::RBrace);
            },
            "template" => {
                self.pos += 1;
                if self.at(TokenKind::Less) {
                    self.pos = self.template_close(self.pos, self.tokens.len()).unwrap_or(self.pos + 1);
                }
            },
            "public" | "private" | "protected" if self.peek(1).is_some_and(|t| t.is(TokenKind::Colon)) => {
                self.pos += 2;
            },
            "using" => self.using(scope),
            "typedef" => {
                let start = tok;
                self.pos += 1;
                self.declaration(scope, kind, Some(start), true);
            },
            "static_assert" | "_Static_assert" => self.skip_statement(),
            _ => self.declaration(scope, kind, None, false),
        }
    }

    fn namespace(
        &mut self,
        scope: &ScopePath,
    ) {
        self.pos += 1;
        let mut inner = scope.clone();
        while let Some(tok) = self.peek(0) {
            match tok.kind {
                TokenKind::Ident if tok.text != "inline" => inner = inner.child(tok.text),
                TokenKind::Ident | TokenKind::DoubleColon => {},
                _ => break,
            }
            self.pos += 1;
        }
        if self.eat(TokenKind::LBrace) {
            self.parse_block(&inner, BlockKind::Namespace);
            self.eat(TokenKind::RBrace);
        } else {
            // Namespace alias or malformed.
            self.skip_statement();
        }
    }

    fn using(
        &mut self,
        scope: &ScopePath,
    ) {
        let start = self.pos;
        self.pos += 1;
        let (Some(name), Some(eq)) = (self.peek(0), self.peek(1)) else {
            self.skip_statement();
            return;
        };
        if !name.is(TokenKind::Ident) || name.text == "namespace" || !eq.is(TokenKind::Equal) {
            self.skip_statement();
            return;
        }
        self.pos += 2;
        let type_start = self.pos;
        self.skip_statement();
        let mut type_tokens = &self.tokens[type_start..self.pos];
        if let Some((last, rest)) = type_tokens.split_last()
            && last.is(TokenKind::Semicolon)
        {
            type_tokens = rest;
        }
        let spelling = self.spelling(type_tokens);
        let typeref = type_ref_from_spelling(&spelling);
        let record = self.record(
            scope.child(name.text),
            self.tokens[start],
            SymbolDetail::Alias {
                typeref,
            },
        );
        self.out.records.push(record);
    }

    // ---- declarations ----

    fn declaration(
        &mut self,
        scope: &ScopePath,
        kind: BlockKind,
        start: Option<Token<'a>>,
        is_typedef: bool,
    ) {
        let Some(first) = start.or_else(|| self.peek(0)) else {
            return;
        };
        let before = self.pos;
        let Some(decl_type) = self.specifiers(scope) else {
            if self.pos == before {
                self.pos += 1;
            }
            self.skip_statement();
            return;
        };
        if self.eat(TokenKind::Semicolon) {
            return;
        }

        // Constructors and out-of-line member definitions have no return type.
        if self.at(TokenKind::LParen)
            && !self.peek(1).is_some_and(|t| t.is(TokenKind::Star))
            && let Some(type_name) = decl_type.type_name.clone()
            && (kind == BlockKind::Aggregate || type_name.len() > 1)
        {
            let line = self.tokens[self.pos - 1].line;
            let params = self.parameters();
            let declarator = Declarator {
                name: type_name,
                line,
                params: Some(params),
            };
            self.function(scope, first, declarator);
            return;
        }

        loop {
            let Some(declarator) = self.declarator() else {
                self.skip_statement();
                return;
            };
            if declarator.params.is_some() && !is_typedef {
                self.function(scope, first, declarator);
                return;
            }
            self.skip_initializer();
            let typeref = decl_type.typeref.clone();
            let detail = if is_typedef {
                SymbolDetail::Alias {
                    typeref,
                }
            } else if kind == BlockKind::Aggregate {
                SymbolDetail::Member {
                    typeref,
                }
            } else {
                SymbolDetail::Variable {
                    typeref,
                }
            };
            let record = self.record_at_line(scope.join(&declarator.name), first, declarator.line, detail);
            self.out.records.push(record);

            match self.peek(0).map(|t| t.kind) {
                Some(TokenKind::Comma) => self.pos += 1,
                Some(TokenKind::Semicolon) => {
                    self.pos += 1;
                    return;
                },
                _ => {
                    self.skip_statement();
                    return;
                },
            }
        }
    }

    /// Consume declaration specifiers. Defines any aggregate body inline.
    fn specifiers(
        &mut self,
        scope: &ScopePath,
    ) -> Option<DeclType> {
        let mut decl = DeclType::default();
        let mut saw_type = false;
        while let Some(tok) = self.peek(0) {
            if self.skip_attribute() {
                continue;
            }
            if tok.is(TokenKind::DoubleColon) && !saw_type {
                let name = self.qualified_name()?;
                decl.typeref = Some(TypeRef::new(None, name.clone()));
                decl.type_name = Some(name);
                saw_type = true;
                continue;
            }
            if !tok.is(TokenKind::Ident) {
                break;
            }
            let word = tok.text;
            if is_type_qualifier(word) {
                self.pos += 1;
                continue;
            }
            if let Some(tag) = AggregateTag::from_keyword(word) {
                if saw_type {
                    break;
                }
                self.pos += 1;
                self.aggregate(scope, tag, tok, &mut decl)?;
                saw_type = true;
                continue;
            }
            if is_builtin_type(word) {
                self.pos += 1;
                saw_type = true;
                continue;
            }
            if saw_type || is_statement_keyword(word) {
                break;
            }
            let name = self.qualified_name()?;
            decl.typeref = Some(TypeRef::new(None, name.clone()));
            decl.type_name = Some(name);
            saw_type = true;
        }
        saw_type.then_some(decl)
    }

    /// After an aggregate keyword: optional name, base clause, optional body.
    fn aggregate(
        &mut self,
        scope: &ScopePath,
        tag: AggregateTag,
        keyword: Token<'a>,
        decl: &mut DeclType,
    ) -> Option<()> {
        // `enum class` / `enum struct`
        if tag == AggregateTag::Enum && (self.at_word("class") || self.at_word("struct")) {
            self.pos += 1;
        }
        while self.skip_attribute() {}
        let name = if self.peek(0).is_some_and(|t| t.is(TokenKind::Ident) && !is_type_qualifier(t.text)) {
            self.qualified_name()
        } else {
            None
        };
        if self.at_word("final") {
            self.pos += 1;
        }
        if self.at(TokenKind::Colon) {
            while let Some(tok) = self.peek(0) {
                match tok.kind {
                    TokenKind::LBrace | TokenKind::Semicolon | TokenKind::RBrace => break,
                    TokenKind::Less => {
                        self.pos = self.template_close(self.pos, self.tokens.len()).unwrap_or(self.pos + 1);
                    },
                    _ => self.pos += 1,
                }
            }
        }

        if !self.at(TokenKind::LBrace) {
            let name = name?;
            decl.typeref = Some(TypeRef::new(Some(tag), name));
            return Some(());
        }

        let path = match name {
            Some(name) => scope.join(&name),
            None => {
                let anon = self.anon_name(scope);
                scope.child(&anon)
            },
        };
        let record = self.record(
            path.clone(),
            keyword,
            SymbolDetail::Aggregate {
                tag,
            },
        );
        self.out.records.push(record);

        self.pos += 1;
        if tag == AggregateTag::Enum {
            self.enumerators(scope);
        } else {
            self.parse_block(&path, BlockKind::Aggregate);
        }
        self.eat(TokenKind::RBrace);
        decl.typeref = Some(TypeRef::new(Some(tag), path));
        Some(())
    }

    /// Enumerators belong to the scope enclosing the enum.
    fn enumerators(
        &mut self,
        scope: &ScopePath,
    ) {
        while let Some(tok) = self.peek(0) {
            match tok.kind {
                TokenKind::RBrace => return,
                TokenKind::Ident => {
                    self.pos += 1;
                    let record = self.record(scope.child(tok.text), tok, SymbolDetail::Other);
                    self.out.records.push(record);
                    while let Some(next) = self.peek(0) {
                        match next.kind {
                            TokenKind::Comma => {
                                self.pos += 1;
                                break;
                            },
                            TokenKind::RBrace => break,
                            TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => self.skip_balanced(),
                            _ => self.pos += 1,
                        }
                    }
                },
                TokenKind::Directive => {
                    self.directive(tok);
                    self.pos += 1;
                },
                _ => self.pos += 1,
            }
        }
    }

    fn declarator(&mut self) -> Option<Declarator> {
        while let Some(tok) = self.peek(0) {
            let skip = match tok.kind {
                TokenKind::Star | TokenKind::Amp | TokenKind::AndAnd => true,
                TokenKind::Ident => is_type_qualifier(tok.text) || self.skip_attribute(),
                _ => self.skip_attribute(),
            };
            if !skip {
                break;
            }
            if matches!(tok.kind, TokenKind::Star | TokenKind::Amp | TokenKind::AndAnd) || is_type_qualifier(tok.text) {
                self.pos += 1;
            }
        }

        // Function pointer or pointer to array: `(*name)(...)`.
        if self.at(TokenKind::LParen) && self.peek(1).is_some_and(|t| matches!(t.kind, TokenKind::Star | TokenKind::Amp)) {
            let close = self.matching_close(self.pos, self.tokens.len());
            let name = self.tokens[self.pos..close]
                .iter()
                .rev()
                .find(|t| t.is(TokenKind::Ident) && !is_type_qualifier(t.text))
                .copied();
            self.pos = close;
            if self.at(TokenKind::LParen) || self.at(TokenKind::LBracket) {
                self.skip_balanced();
            }
            let name = name?;
            return Some(Declarator {
                name: ScopePath::parse(name.text),
                line: name.line,
                params: None,
            });
        }

        let tok = self.peek(0)?;
        if !tok.is(TokenKind::Ident) || is_statement_keyword(tok.text) || is_builtin_type(tok.text) {
            return None;
        }
        let name = self.qualified_name()?;
        let params = self.at(TokenKind::LParen).then(|| self.parameters());
        Some(Declarator {
            name,
            line: tok.line,
            params,
        })
    }

    /// Split a parenthesized parameter list at top-level commas.
    fn parameters(&mut self) -> Vec<Param> {
        let open = self.pos;
        let close = self.matching_close(open, self.tokens.len());
        self.pos = close;
        let inner_end = close.saturating_sub(1).max(open + 1);

        let mut params = Vec::new();
        let mut group_start = open + 1;
        let mut i = open + 1;
        while i <= inner_end {
            let at_end = i == inner_end;
            if at_end || self.tokens[i].is(TokenKind::Comma) {
                if let Some(param) = self.parameter(group_start, i) {
                    params.push(param);
                }
                group_start = i + 1;
                i += 1;
                continue;
            }
            match self.tokens[i].kind {
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => i = self.matching_close(i, inner_end),
                TokenKind::Less => i = self.template_close(i, inner_end).unwrap_or(i + 1),
                _ => i += 1,
            }
        }
        params
    }

    fn parameter(
        &self,
        start: usize,
        end: usize,
    ) -> Option<Param> {
        let group = &self.tokens[start..end];
        let first = *group.first()?;
        // Drop default arguments.
        let group = match group.iter().position(|t| t.is(TokenKind::Equal)) {
            Some(eq) => &group[..eq],
            None => group,
        };

        // `void (*cb)(int)`
        if let Some(open) = group.iter().position(|t| t.is(TokenKind::LParen))
            && group.get(open + 1).is_some_and(|t| t.is(TokenKind::Star))
        {
            let name = group[open..].iter().find(|t| t.is(TokenKind::Ident))?;
            return Some(Param {
                name: name.text.to_string(),
                line: name.line,
                start: first.start,
                spelling: self.spelling(&group[..open]),
                label: self.spelling(group),
            });
        }

        let label = self.spelling(group);
        let group = match group.iter().position(|t| t.is(TokenKind::LBracket)) {
            Some(bracket) => &group[..bracket],
            None => group,
        };
        let (name_index, name) = group.iter().enumerate().rev().find(|(_, t)| t.is(TokenKind::Ident))?;
        if name_index == 0
            || is_builtin_type(name.text)
            || is_type_qualifier(name.text)
            || AggregateTag::from_keyword(name.text).is_some()
        {
            return None;
        }
        Some(Param {
            name: name.text.to_string(),
            line: name.line,
            start: first.start,
            spelling: self.spelling(&group[..name_index]),
            label,
        })
    }

    /// Step over array bounds, bitfield widths and initializers.
    fn skip_initializer(&mut self) {
        while let Some(tok) = self.peek(0) {
            match tok.kind {
                TokenKind::Comma | TokenKind::Semicolon | TokenKind::RBrace => return,
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => self.skip_balanced(),
                _ => self.pos += 1,
            }
        }
    }

    fn function(
        &mut self,
        scope: &ScopePath,
        first: Token<'a>,
        declarator: Declarator,
    ) {
        let Declarator {
            name,
            line,
            params,
        } = declarator;
        let params = params.unwrap_or_default();
        let full_name = scope.join(&name);

        // Trailing qualifiers, return type, initializer list.
        while let Some(tok) = self.peek(0) {
            match tok.kind {
                TokenKind::Ident if matches!(tok.text, "const" | "volatile" | "override" | "final" | "noexcept" | "throw") => {
                    self.pos += 1;
                    if self.at(TokenKind::LParen) {
                        self.skip_balanced();
                    }
                },
                TokenKind::Ident | TokenKind::LBracket if self.skip_attribute() => {},
                TokenKind::Amp | TokenKind::AndAnd => self.pos += 1,
                TokenKind::Arrow => {
                    self.pos += 1;
                    while let Some(next) = self.peek(0)
                        && !matches!(next.kind, TokenKind::LBrace | TokenKind::Semicolon | TokenKind::RBrace)
                    {
                        self.pos += 1;
                    }
                },
                TokenKind::Colon => {
                    self.pos += 1;
                    self.skip_member_initializers();
                },
                _ => break,
            }
        }

        let body = if self.at(TokenKind::LBrace) {
            let open = self.pos;
            let close = self.matching_close(open, self.tokens.len());
            let end_line = self.tokens[close - 1].line;
            let mut locals: Vec<SymbolRecord> = params
                .iter()
                .map(|param| {
                    let type_name = normalize_type_name(&param.spelling).unwrap_or_else(|| param.spelling.clone());
                    self.record_from(
                        ScopePath::parse(&param.name),
                        param.start,
                        param.line,
                        SymbolDetail::Parameter {
                            type_name,
                        },
                    )
                })
                .collect();
            locals.extend(self.scan_locals(open + 1, close.saturating_sub(1)));
            self.out.locals.insert(full_name.to_string(), locals);
            self.pos = close;
            Some(LineSpan {
                start: line,
                end: end_line,
            })
        } else {
            self.skip_statement();
            None
        };

        let mut record = self.record_at_line(
            full_name,
            first,
            line,
            SymbolDetail::Function {
                body,
            },
        );
        record.completion = function_snippet(record.short_name(), &params);
        self.out.records.push(record);
    }

    fn skip_member_initializers(&mut self) {
        while let Some(tok) = self.peek(0) {
            match tok.kind {
                TokenKind::Ident | TokenKind::DoubleColon | TokenKind::Comma => self.pos += 1,
                TokenKind::Less => {
                    self.pos = self.template_close(self.pos, self.tokens.len()).unwrap_or(self.pos + 1);
                },
                TokenKind::LParen => self.skip_balanced(),
                // `member{value}` vs. the function body.
                TokenKind::LBrace if self.pos > 0 && self.tokens[self.pos - 1].is(TokenKind::Ident) => {
                    self.skip_balanced();
                },
                _ => return,
            }
        }
    }

    // ---- function bodies ----

    fn scan_locals(
        &self,
        start: usize,
        end: usize,
    ) -> Vec<SymbolRecord> {
        let mut out = Vec::new();
        let mut at_statement_start = true;
        let mut i = start;
        while i < end {
            let tok = self.tokens[i];
            if at_statement_start
                && tok.is(TokenKind::Ident)
                && let Some((records, next)) = self.local_declaration(i, end)
            {
                out.extend(records);
                i = next;
                at_statement_start = true;
                continue;
            }
            at_statement_start = match tok.kind {
                TokenKind::LBrace | TokenKind::RBrace | TokenKind::Semicolon | TokenKind::Directive => true,
                TokenKind::LParen => i > start && self.tokens[i - 1].is_word("for"),
                TokenKind::Ident => tok.text == "else" || tok.text == "do",
                _ => false,
            };
            i += 1;
        }
        out
    }

    /// Try to read `Type a, *b = x;` at `start`. Returns the records and the
    /// index to resume at.
    fn local_declaration(
        &self,
        start: usize,
        end: usize,
    ) -> Option<(Vec<SymbolRecord>, usize)> {
        let tokens = &self.tokens;
        let word_at = |j: usize| (j < end && tokens[j].is(TokenKind::Ident)).then(|| tokens[j]);

        let mut j = start;
        while word_at(j).is_some_and(|t| is_type_qualifier(t.text)) {
            j += 1;
        }
        let type_tok = word_at(j)?;
        if is_statement_keyword(type_tok.text) || matches!(type_tok.text, "else" | "do" | "using" | "typedef") {
            return None;
        }

        let typeref = if let Some(tag) = AggregateTag::from_keyword(type_tok.text) {
            let name = word_at(j + 1)?;
            j += 2;
            let mut path = ScopePath::parse(name.text);
            while j + 1 < end && tokens[j].is(TokenKind::DoubleColon) && tokens[j + 1].is(TokenKind::Ident) {
                path = path.child(tokens[j + 1].text);
                j += 2;
            }
            if j < end && tokens[j].is(TokenKind::LBrace) {
                return None;
            }
            Some(TypeRef::new(Some(tag), path))
        } else if is_builtin_type(type_tok.text) {
            while word_at(j).is_some_and(|t| is_builtin_type(t.text) || is_type_qualifier(t.text)) {
                j += 1;
            }
            None
        } else {
            let mut path = ScopePath::parse(type_tok.text);
            j += 1;
            loop {
                if j < end && tokens[j].is(TokenKind::Less) {
                    j = self.template_close(j, end)?;
                }
                if j + 1 < end && tokens[j].is(TokenKind::DoubleColon) && tokens[j + 1].is(TokenKind::Ident) {
                    path = path.child(tokens[j + 1].text);
                    j += 2;
                    continue;
                }
                break;
            }
            Some(TypeRef::new(None, path))
        };

        let mut records = Vec::new();
        loop {
            while j < end
                && (matches!(tokens[j].kind, TokenKind::Star | TokenKind::Amp | TokenKind::AndAnd)
                    || (tokens[j].is(TokenKind::Ident) && is_type_qualifier(tokens[j].text)))
            {
                j += 1;
            }
            let Some(name) = word_at(j).filter(|t| {
                !is_statement_keyword(t.text) && !is_builtin_type(t.text) && AggregateTag::from_keyword(t.text).is_none()
            }) else {
                return (!records.is_empty()).then_some((records, j));
            };
            j += 1;
            let follows = (j < end).then(|| tokens[j].kind);
            if !matches!(
                follows,
                Some(
                    TokenKind::Semicolon
                        | TokenKind::Comma
                        | TokenKind::Equal
                        | TokenKind::LBracket
                        | TokenKind::Colon
                        | TokenKind::LBrace
                        | TokenKind::LParen
                        | TokenKind::RParen
                )
            ) {
                return (!records.is_empty()).then_some((records, j));
            }
            records.push(self.record_from(
                ScopePath::parse(name.text),
                tokens[start].start,
                name.line,
                SymbolDetail::Variable {
                    typeref: typeref.clone(),
                },
            ));

            // Initializer / array bounds up to the next declarator.
            loop {
                if j >= end {
                    return Some((records, j));
                }
                match tokens[j].kind {
                    TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => j = self.matching_close(j, end),
                    TokenKind::Comma => {
                        j += 1;
                        break;
                    },
                    TokenKind::Semicolon => return Some((records, j + 1)),
                    // End of a `for (...)` header or range-for colon.
                    TokenKind::RParen | TokenKind::Colon => return Some((records, j)),
                    _ => j += 1,
                }
            }
        }
    }

    // ---- preprocessor ----

    fn directive(
        &mut self,
        tok: Token<'a>,
    ) {
        let body = tok.text.trim_start_matches('#').trim_start();
        let Some(rest) = body.strip_prefix("define") else {
            return;
        };
        if !rest.starts_with(char::is_whitespace) {
            return;
        }
        let rest = rest.trim_start();
        let name_len = rest.find(|c: char| !(c.is_alphanumeric() || c == '_')).unwrap_or(rest.len());
        if name_len == 0 {
            return;
        }
        let name = &rest[..name_len];
        let mut record = self.record(ScopePath::parse(name), tok, SymbolDetail::Macro);
        if let Some(args) = rest[name_len..].strip_prefix('(')
            && let Some((args, _)) = args.split_once(')')
        {
            let params: Vec<&str> = args.split(',').map(str::trim).filter(|a| !a.is_empty()).collect();
            record.completion = snippet(name, &params);
        }
        self.out.records.push(record);
    }

    // ---- records ----

    fn anon_name(
        &mut self,
        scope: &ScopePath,
    ) -> String {
        let counter = self.anon_counters.entry(scope.to_string()).or_insert(0);
        let n = *counter;
        *counter += 1;
        if scope.is_empty() {
            format!("{ANON_PREFIX}{}_{n}", self.anon_seed)
        } else {
            format!("{ANON_PREFIX}{n}")
        }
    }

    fn record(
        &self,
        name: ScopePath,
        first: Token<'a>,
        detail: SymbolDetail,
    ) -> SymbolRecord {
        self.record_from(name, first.start, first.line, detail)
    }

    /// Record whose name sits on `line` while its declaration may begin earlier.
    fn record_at_line(
        &self,
        name: ScopePath,
        first: Token<'a>,
        line: u32,
        detail: SymbolDetail,
    ) -> SymbolRecord {
        if first.line == line {
            self.record_from(name, first.start, line, detail)
        } else {
            let line_start = self.line_start(line);
            let offset = self.source[line_start..]
                .find(|c: char| !c.is_whitespace())
                .map_or(line_start, |i| line_start + i);
            self.record_from(name, offset, line, detail)
        }
    }

    fn record_from(
        &self,
        name: ScopePath,
        start: usize,
        line: u32,
        detail: SymbolDetail,
    ) -> SymbolRecord {
        let line_start = self.line_start(line).min(start);
        let line_end = self.source[start..].find('\n').map_or(self.source.len(), |i| start + i);
        let search_text = self.source[start..line_end].trim_end().to_string();
        let short = name.last().unwrap_or_default().to_string();
        let status = status_text(search_text.trim_end_matches('{').trim_end(), &short);
        SymbolRecord {
            name,
            file: self.file.clone(),
            line,
            column: (start - line_start) as u32,
            search_text,
            completion: short,
            status,
            detail,
        }
    }

    /// Source text covered by `tokens`, comments included.
    fn spelling(
        &self,
        tokens: &[Token<'_>],
    ) -> String {
        match (tokens.first(), tokens.last()) {
            (Some(first), Some(last)) => self.source[first.start..last.start + last.text.len()].trim().to_string(),
            _ => String::new(),
        }
    }

    fn line_start(
        &self,
        line: u32,
    ) -> usize {
        self.line_starts.get(line.saturating_sub(1) as usize).copied().unwrap_or(0)
    }
}

fn type_ref_from_spelling(spelling: &str) -> Option<TypeRef> {
    let tag = spelling.split_whitespace().find_map(AggregateTag::from_keyword);
    let name = normalize_type_name(spelling)?;
    if tag.is_none() && is_builtin_type(&name) {
        return None;
    }
    Some(TypeRef::new(tag, ScopePath::parse(&name)))
}

/// Replace the first whole-word occurrence of `word` with the placeholder.
fn status_text(
    text: &str,
    word: &str,
) -> String {
    if word.is_empty() {
        return text.to_string();
    }
    let is_ident = |c: char| c.is_alphanumeric() || c == '_';
    for (index, _) in text.match_indices(word) {
        let before = text[..index].chars().next_back();
        let after = text[index + word.len()..].chars().next();
        if !before.is_some_and(is_ident) && !after.is_some_and(is_ident) {
            return format!("{}{STATUS_WORD_PLACEHOLDER}{}", &text[..index], &text[index + word.len()..]);
        }
    }
    text.to_string()
}

fn function_snippet(
    name: &str,
    params: &[Param],
) -> String {
    let labels: Vec<&str> = params.iter().map(|p| p.label.as_str()).collect();
    snippet(name, &labels)
}

/// `name(${1:a}, ${2:b})`
fn snippet(
    name: &str,
    params: &[&str],
) -> String {
    let args: Vec<String> = params
        .iter()
        .enumerate()
        .map(|(i, p)| format!("${{{}:{}}}", i + 1, p.replace('}', "\\}")))
        .collect();
    format!("{name}({})", args.join(", "))
}

#[cfg(test)]
#[path = "../../tests/src/parser/c_parser_tests.rs"]
mod tests;
