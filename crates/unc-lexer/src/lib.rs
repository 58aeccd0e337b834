//! Uncrustify lexer: byte stream to raw token sequence (§4.3).
//!
//! Classifies the next lexeme by first-byte dispatch and emits exactly one
//! token per call, including whitespace, newlines, and comments (all
//! first-class tokens in this list, per the "Chunk / Token" glossary entry).
//! Tentative sub-parses (suffix gobbling, raw-string tag matching,
//! backslash-newline) use [`Cursor::checkpoint`]/[`Cursor::restore`] rather
//! than unwinding by hand.

mod cursor;

use cursor::Cursor;
use uncrustify_common::char_table;
use uncrustify_common::diagnostic::{Diagnostic, DiagnosticBag};
use uncrustify_common::flags::ChunkFlags;
use uncrustify_common::keyword::{self, DynamicKeywords};
use uncrustify_common::lang::LangFlags;
use uncrustify_common::options::{Options, WarnLevel};
use uncrustify_common::punctuator;
use uncrustify_common::span::Span;
use uncrustify_common::token::Token;
use uncrustify_common::token_kind::TokenKind;

/// Per-file line-ending counts, gathered while lexing so a later pass can
/// pick a majority EOL style for `newlines = Auto`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LineEndingCounts {
    pub lf: u32,
    pub cr: u32,
    pub crlf: u32,
}

/// Result of tokenizing one file: the raw token stream plus whatever the
/// lexer observed about it.
pub struct LexOutput {
    pub tokens: Vec<Token>,
    pub diagnostics: DiagnosticBag,
    pub line_endings: LineEndingCounts,
}

/// A cursor position plus the source coordinates the next token should be
/// stamped with; threaded through each `lex_*` helper so they don't each
/// have to re-derive it.
type TokenStart = (u32, u32, u32, u32);

pub struct Lexer<'src> {
    source: &'src str,
    cursor: Cursor<'src>,
    opts: &'src Options,
    dynamic: &'src DynamicKeywords,
    diagnostics: DiagnosticBag,
    line_endings: LineEndingCounts,

    /// Set while the current logical line began with `#`, up to (not
    /// including) its terminating newline.
    in_preproc: bool,
    /// The directive keyword of the current preprocessor line, if any.
    current_directive: Option<TokenKind>,
    /// True for exactly the token right after `#define`, so it can become
    /// `MACRO`/`MACRO_FUNC` instead of an ordinary word.
    at_define_body_start: bool,
    /// True after a `#pragma` or unrecognized directive keyword, until the
    /// next non-blank character packs the rest of the line as one token.
    pending_directive_body: bool,
    /// True after a Pawn `#define`/`#emit` directive keyword, until the next
    /// non-blank character packs the rest of the line as one `MACRO` token
    /// (Pawn macro patterns are not tokenized the way C function-macro
    /// bodies are — the whole replacement pattern is opaque to this pass).
    pawn_macro_pending: bool,

    /// `*INDENT-OFF*`/`*INDENT-ON*` pass-through: while set, every token
    /// but the comment itself is downgraded to `IGNORED`.
    ignoring: bool,

    emitted_eof: bool,
    emitted_bom: bool,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str, opts: &'src Options, dynamic: &'src DynamicKeywords) -> Self {
        Self {
            source,
            cursor: Cursor::new(source),
            opts,
            dynamic,
            diagnostics: DiagnosticBag::new(),
            line_endings: LineEndingCounts::default(),
            in_preproc: false,
            current_directive: None,
            at_define_body_start: false,
            pending_directive_body: false,
            pawn_macro_pending: false,
            ignoring: false,
            emitted_eof: false,
            emitted_bom: source.starts_with('\u{feff}'),
        }
    }

    /// Tokenize a complete source file, including the trailing `Eof` token.
    pub fn tokenize(source: &str, opts: &Options, dynamic: &DynamicKeywords) -> LexOutput {
        let mut lexer = Lexer::new(source, opts, dynamic);
        let mut tokens = Vec::new();
        while let Some(tok) = lexer.next_token() {
            tokens.push(tok);
        }
        LexOutput {
            tokens,
            diagnostics: lexer.diagnostics,
            line_endings: lexer.line_endings,
        }
    }

    fn langs(&self) -> LangFlags {
        self.opts.language
    }

    /// Produce the next token, or `None` once `Eof` has already been
    /// returned.
    pub fn next_token(&mut self) -> Option<Token> {
        if self.emitted_eof {
            return None;
        }

        if self.emitted_bom {
            self.emitted_bom = false;
            let start = self.mark();
            self.cursor.advance();
            return Some(self.finish(TokenKind::ByteOrderMark, "\u{feff}", start));
        }

        if self.cursor.is_eof() {
            self.emitted_eof = true;
            let start = self.mark();
            return Some(self.finish(TokenKind::Eof, "", start));
        }

        let start = self.mark();
        let c = self.cursor.peek().expect("checked not eof above");

        let tok = if c == '\n' || c == '\r' {
            self.lex_newline(start)
        } else if c == ' ' || c == '\t' {
            self.lex_whitespace(start)
        } else if c == '\\' && self.is_line_continuation() {
            self.lex_backslash_newline(start)
        } else if self.pawn_macro_pending {
            self.pawn_macro_pending = false;
            self.pack_pawn_macro_body(start)
        } else if self.pending_directive_body {
            self.pending_directive_body = false;
            self.pack_preproc_body(start)
        } else if c == '/' && matches!(self.cursor.peek_next(), Some('/') | Some('*')) {
            self.lex_comment(start)
        } else if c == '/' && self.langs().contains(LangFlags::D) && self.cursor.peek_next() == Some('+') {
            self.lex_d_nested_comment(start)
        } else if c == '#' && self.at_line_start() {
            self.lex_preproc_hash(start)
        } else if c == '@' && self.langs().contains(LangFlags::JAVA) && is_ident_start(self.cursor.peek_next()) {
            self.lex_java_annotation(start)
        } else if c == '@' && self.langs().contains(LangFlags::OC) {
            self.lex_oc_at(start)
        } else if c == '[' && self.cursor.peek_next() == Some('[') && self.langs().contains(LangFlags::CPP) {
            self.lex_attribute(start)
        } else if c == '\\' && self.langs().contains(LangFlags::D) {
            // D's EscapeSequence-as-string-literal form (`\x41`, `é`,
            // `\777`, `\&amp;`) — a bare backslash outside any quote.
            self.lex_d_escape_string(start)
        } else if is_string_quote(c) || (c == '`' && self.langs().contains(LangFlags::D)) || self.starts_prefixed_string() {
            self.lex_string(start)
        } else if c.is_ascii_digit() || (c == '.' && matches!(self.cursor.peek_next(), Some(d) if d.is_ascii_digit())) {
            self.lex_number(start)
        } else if is_ident_start(Some(c)) {
            self.lex_word(start)
        } else {
            self.lex_punctuator(start)
        };

        if self.ignoring && !matches!(tok.kind, TokenKind::Comment | TokenKind::CommentMulti) {
            let mut tok = tok;
            tok.kind = TokenKind::Ignored;
            Some(tok)
        } else {
            Some(tok)
        }
    }

    // ── Position bookkeeping ────────────────────────────────────────────

    fn mark(&self) -> TokenStart {
        let prev_sp = self.cursor.col().saturating_sub(1);
        (self.cursor.pos(), self.cursor.row(), self.cursor.col(), prev_sp)
    }

    fn finish(&self, kind: TokenKind, text: impl Into<String>, start: TokenStart) -> Token {
        let (pos, row, col, prev_sp) = start;
        let text = text.into();
        let end_pos = pos + text.len() as u32;
        let end_col = col + text.chars().count() as u32;
        let mut tok = Token::new(kind, text, Span::new(pos, end_pos)).with_origin(row, col, end_col, prev_sp);
        if self.in_preproc {
            tok.flags.set(ChunkFlags::IN_PREPROC);
        }
        tok
    }

    fn at_line_start(&self) -> bool {
        if self.cursor.col() == 1 {
            return true;
        }
        let pos = self.cursor.pos() as usize;
        let before = &self.source[..pos.min(self.source.len())];
        match before.rfind('\n') {
            Some(nl) => before[nl + 1..].chars().all(|c| c == ' ' || c == '\t' || c == '\r'),
            None => before.chars().all(|c| c == ' ' || c == '\t'),
        }
    }

    // ── Whitespace / newline / continuation ─────────────────────────────

    fn lex_whitespace(&mut self, start: TokenStart) -> Token {
        let from = self.cursor.pos();
        self.cursor.eat_while(|c| c == ' ' || c == '\t');
        let text = self.cursor.slice(from, self.cursor.pos());
        self.finish(TokenKind::Whitespace, text, start)
    }

    fn lex_newline(&mut self, start: TokenStart) -> Token {
        let mut nl_count = 0u32;
        while let Some(c) = self.cursor.peek() {
            match c {
                '\r' if self.cursor.peek_next() == Some('\n') => {
                    self.cursor.advance();
                    self.cursor.advance();
                    self.line_endings.crlf += 1;
                }
                '\n' => {
                    self.cursor.advance();
                    self.line_endings.lf += 1;
                }
                '\r' => {
                    self.cursor.advance();
                    self.line_endings.cr += 1;
                }
                _ => break,
            }
            nl_count += 1;
        }
        if self.in_preproc {
            self.in_preproc = false;
            self.current_directive = None;
            self.at_define_body_start = false;
            self.pending_directive_body = false;
            self.pawn_macro_pending = false;
        }
        let mut tok = self.finish(TokenKind::Newline, "", start);
        tok.nl_count = nl_count.max(1);
        tok
    }

    fn is_line_continuation(&self) -> bool {
        if self.opts.disable_processing_nl_cont {
            return false;
        }
        let mut i = 1usize;
        loop {
            match self.cursor.peek_at(i) {
                Some(' ') | Some('\t') => i += 1,
                Some('\r') | Some('\n') => return true,
                _ => return false,
            }
        }
    }

    fn lex_backslash_newline(&mut self, start: TokenStart) -> Token {
        let from = self.cursor.pos();
        self.cursor.advance(); // backslash
        self.cursor.eat_while(|c| c == ' ' || c == '\t');
        match self.cursor.peek() {
            Some('\r') if self.cursor.peek_next() == Some('\n') => {
                self.cursor.advance();
                self.cursor.advance();
                self.line_endings.crlf += 1;
            }
            Some('\n') => {
                self.cursor.advance();
                self.line_endings.lf += 1;
            }
            Some('\r') => {
                self.cursor.advance();
                self.line_endings.cr += 1;
            }
            _ => {}
        }
        let text = self.cursor.slice(from, self.cursor.pos());
        let mut tok = self.finish(TokenKind::NlCont, text, start);
        tok.nl_count = 1;
        tok
    }

    // ── Comments ─────────────────────────────────────────────────────────

    fn lex_comment(&mut self, start: TokenStart) -> Token {
        let from = self.cursor.pos();
        self.cursor.advance(); // '/'
        let is_line = self.cursor.peek() == Some('/');
        self.cursor.advance(); // second char
        let mut multiline = false;

        if is_line {
            loop {
                match self.cursor.peek() {
                    None => break,
                    Some('\n') | Some('\r') => {
                        if self.trailing_backslash_before_newline() {
                            self.cursor.advance();
                            multiline = true;
                            continue;
                        }
                        break;
                    }
                    Some(_) => {
                        self.cursor.advance();
                    }
                }
            }
        } else {
            loop {
                match self.cursor.peek() {
                    None => break,
                    Some('*') if self.cursor.peek_next() == Some('/') => {
                        self.cursor.advance();
                        self.cursor.advance();
                        break;
                    }
                    Some('\n') | Some('\r') => {
                        multiline = true;
                        self.cursor.advance();
                    }
                    Some(_) => {
                        self.cursor.advance();
                    }
                }
            }
        }

        let text = self.cursor.slice(from, self.cursor.pos()).to_string();
        self.scan_ignore_markers(&text);
        let kind = if multiline { TokenKind::CommentMulti } else { TokenKind::Comment };
        self.finish(kind, text, start)
    }

    /// D's `/+ ... +/` nestable comments.
    fn lex_d_nested_comment(&mut self, start: TokenStart) -> Token {
        let from = self.cursor.pos();
        self.cursor.advance(); // '/'
        self.cursor.advance(); // '+'
        let mut depth = 1u32;
        let mut multiline = false;
        while depth > 0 {
            match self.cursor.peek() {
                None => break,
                Some('/') if self.cursor.peek_next() == Some('+') => {
                    self.cursor.advance();
                    self.cursor.advance();
                    depth += 1;
                }
                Some('+') if self.cursor.peek_next() == Some('/') => {
                    self.cursor.advance();
                    self.cursor.advance();
                    depth -= 1;
                }
                Some('\n') | Some('\r') => {
                    multiline = true;
                    self.cursor.advance();
                }
                Some(_) => {
                    self.cursor.advance();
                }
            }
        }
        let text = self.cursor.slice(from, self.cursor.pos()).to_string();
        self.scan_ignore_markers(&text);
        let kind = if multiline { TokenKind::CommentMulti } else { TokenKind::Comment };
        self.finish(kind, text, start)
    }

    fn trailing_backslash_before_newline(&self) -> bool {
        let pos = self.cursor.pos() as usize;
        self.source[..pos.min(self.source.len())].ends_with('\\')
    }

    fn scan_ignore_markers(&mut self, comment_text: &str) {
        let marker = &self.opts.comment_marker;
        let (disables, enables) = if marker.as_regex {
            let disable_re = regex::Regex::new(&marker.disable).ok();
            let enable_re = regex::Regex::new(&marker.enable).ok();
            (
                disable_re.map(|r| r.is_match(comment_text)).unwrap_or(false),
                enable_re.map(|r| r.is_match(comment_text)).unwrap_or(false),
            )
        } else {
            (comment_text.contains(marker.disable.as_str()), comment_text.contains(marker.enable.as_str()))
        };

        if disables {
            self.ignoring = true;
        } else if enables {
            self.ignoring = false;
        }
    }

    // ── Preprocessor ─────────────────────────────────────────────────────

    fn lex_preproc_hash(&mut self, start: TokenStart) -> Token {
        let from = self.cursor.pos();
        self.cursor.advance(); // '#'
        self.in_preproc = true;
        self.current_directive = None;
        self.at_define_body_start = false;
        self.pending_directive_body = false;
        self.pawn_macro_pending = false;
        let text = self.cursor.slice(from, self.cursor.pos());
        self.finish(TokenKind::PpHash, text, start)
    }

    /// Pack the remainder of a preprocessor line into one opaque token
    /// (`#pragma` arguments, `#warning`/`#error`/other non-standard
    /// directives whose body uncrustify never tokenizes).
    fn pack_preproc_body(&mut self, start: TokenStart) -> Token {
        let from = self.cursor.pos();
        loop {
            match self.cursor.peek() {
                None => break,
                Some('\n') | Some('\r') => {
                    if self.trailing_backslash_before_newline() {
                        self.cursor.advance();
                        continue;
                    }
                    break;
                }
                _ => {
                    self.cursor.advance();
                }
            }
        }
        let text = self.cursor.slice(from, self.cursor.pos());
        self.finish(TokenKind::PreprocBody, text, start)
    }

    /// Pawn's `#define`/`#emit` macro pattern: the entire rest of the line
    /// (minus a trailing continuation backslash) is one opaque `MACRO`
    /// token rather than a tokenized replacement body, per §4.3's "Pawn
    /// macro pattern" rule.
    fn pack_pawn_macro_body(&mut self, start: TokenStart) -> Token {
        let from = self.cursor.pos();
        loop {
            match self.cursor.peek() {
                None => break,
                Some('\n') | Some('\r') => {
                    if self.trailing_backslash_before_newline() {
                        self.cursor.advance();
                        continue;
                    }
                    break;
                }
                _ => {
                    self.cursor.advance();
                }
            }
        }
        let text = self.cursor.slice(from, self.cursor.pos());
        self.finish(TokenKind::Macro, text, start)
    }

    // ── Java annotations / Objective-C `@`-keywords ─────────────────────

    fn lex_java_annotation(&mut self, start: TokenStart) -> Token {
        let from = self.cursor.pos();
        self.cursor.advance(); // '@'
        self.cursor.eat_while(|c| is_ident_start(Some(c)) || c.is_ascii_digit());
        let text = self.cursor.slice(from, self.cursor.pos());
        if text == "@interface" {
            self.finish(TokenKind::Class, text, start)
        } else {
            self.finish(TokenKind::Annotation, text, start)
        }
    }

    fn lex_oc_at(&mut self, start: TokenStart) -> Token {
        if self.cursor.peek_next() == Some('"') {
            self.cursor.advance(); // '@'
            let mut s = self.lex_string(start);
            s.text = format!("@{}", s.text);
            s.flags.set(ChunkFlags::OC_BOXED);
            return s;
        }
        let from = self.cursor.pos();
        self.cursor.advance(); // '@'
        self.cursor.eat_while(|c| is_ident_start(Some(c)) || c.is_ascii_digit());
        let text = self.cursor.slice(from, self.cursor.pos());
        let kind = match text {
            "@interface" | "@implementation" | "@protocol" => TokenKind::OcClass,
            "@property" => TokenKind::OcProperty,
            "@selector" => TokenKind::OcSelector,
            "@try" | "@catch" | "@finally" => TokenKind::Try,
            _ => TokenKind::OcAt,
        };
        self.finish(kind, text, start)
    }

    // ── C++ attributes ───────────────────────────────────────────────────

    fn lex_attribute(&mut self, start: TokenStart) -> Token {
        let checkpoint = self.cursor.checkpoint();
        let from = self.cursor.pos();
        self.cursor.advance();
        self.cursor.advance();
        // Two `[` were already consumed as the opening marker; two matching
        // `]` close it, with any nested `[...]` inside balancing in between.
        let mut depth = 2i32;
        loop {
            match self.cursor.peek() {
                None => {
                    self.cursor.restore(checkpoint);
                    return self.lex_punctuator(start);
                }
                Some('[') => {
                    depth += 1;
                    self.cursor.advance();
                }
                Some(']') => {
                    depth -= 1;
                    self.cursor.advance();
                    if depth == 0 {
                        break;
                    }
                }
                _ => {
                    self.cursor.advance();
                }
            }
        }
        let text = self.cursor.slice(from, self.cursor.pos());
        self.finish(TokenKind::Attribute, text, start)
    }

    // ── Strings ──────────────────────────────────────────────────────────

    const STRING_PREFIXES: &'static [&'static str] = &["u8", "U", "u", "L", "S"];

    fn starts_prefixed_string(&self) -> bool {
        let rest = &self.source[self.cursor.pos() as usize..];
        for prefix in Self::STRING_PREFIXES {
            if let Some(after) = rest.strip_prefix(*prefix) {
                if after.starts_with('"') || after.starts_with('\'') {
                    return true;
                }
            }
        }
        if self.langs().contains(LangFlags::CPP) && rest.starts_with("R\"") {
            return true;
        }
        if self.langs().contains(LangFlags::CS) {
            if (rest.starts_with("$@") || rest.starts_with("@$")) && rest[2..].starts_with('"') {
                return true;
            }
            if rest.starts_with('@') && rest[1..].starts_with('"') {
                return true;
            }
            if rest.starts_with('$') && rest[1..].starts_with('"') {
                return true;
            }
        }
        if self.langs().contains(LangFlags::D) && (rest.starts_with('r') || rest.starts_with('x')) && rest[1..].starts_with('"') {
            return true;
        }
        if self.langs().contains(LangFlags::PAWN) && pawn_string_prefix_len(rest).is_some() {
            return true;
        }
        false
    }

    fn lex_string(&mut self, start: TokenStart) -> Token {
        let from = self.cursor.pos();
        let mut is_interpolated = false;
        let mut is_verbatim = false;

        let rest = &self.source[self.cursor.pos() as usize..];
        if self.langs().contains(LangFlags::CPP) && rest.starts_with("R\"") {
            self.cursor.advance(); // 'R'
            return self.lex_raw_string(start, from);
        }
        if self.langs().contains(LangFlags::CS) && (rest.starts_with("$@") || rest.starts_with("@$")) && rest[2..].starts_with('"') {
            is_verbatim = true;
            is_interpolated = true;
            self.cursor.advance();
            self.cursor.advance();
        } else if self.langs().contains(LangFlags::CS) && rest.starts_with('@') && rest[1..].starts_with('"') {
            is_verbatim = true;
            self.cursor.advance();
        } else if self.langs().contains(LangFlags::CS) && rest.starts_with('$') && rest[1..].starts_with('"') {
            is_interpolated = true;
            self.cursor.advance();
        } else if self.langs().contains(LangFlags::D) && (rest.starts_with('r') || rest.starts_with('x')) && rest[1..].starts_with('"') {
            // D wysiwyg (`r"..."`) and hex (`x"..."`) strings: a single
            // prefix letter ahead of the quote, same body rules otherwise.
            self.cursor.advance();
        } else if self.langs().contains(LangFlags::PAWN) {
            if let Some(len) = pawn_string_prefix_len(rest) {
                for _ in 0..len {
                    self.cursor.advance();
                }
            } else {
                for prefix in Self::STRING_PREFIXES {
                    if let Some(after) = rest.strip_prefix(*prefix) {
                        if after.starts_with('"') || after.starts_with('\'') {
                            for _ in 0..prefix.chars().count() {
                                self.cursor.advance();
                            }
                            break;
                        }
                    }
                }
            }
        } else {
            for prefix in Self::STRING_PREFIXES {
                if let Some(after) = rest.strip_prefix(*prefix) {
                    if after.starts_with('"') || after.starts_with('\'') {
                        for _ in 0..prefix.chars().count() {
                            self.cursor.advance();
                        }
                        break;
                    }
                }
            }
        }

        let quote = match self.cursor.peek() {
            Some(q @ ('"' | '\'')) => q,
            Some(q @ '`') if self.langs().contains(LangFlags::D) => q,
            _ => {
                self.cursor.advance();
                let text = self.cursor.slice(from, self.cursor.pos());
                return self.finish(TokenKind::Unknown, text, start);
            }
        };
        self.cursor.advance(); // opening quote

        // Vala/C# triple-quoted strings: `""" ... """`.
        if quote == '"' && self.cursor.peek() == Some('"') && self.cursor.peek_next() == Some('"') {
            self.cursor.advance();
            self.cursor.advance();
            loop {
                match self.cursor.peek() {
                    None => break,
                    Some('"') if self.cursor.peek_next() == Some('"') && self.cursor.peek_at(2) == Some('"') => {
                        self.cursor.advance();
                        self.cursor.advance();
                        self.cursor.advance();
                        break;
                    }
                    _ => {
                        self.cursor.advance();
                    }
                }
            }
            let text = self.cursor.slice(from, self.cursor.pos()).to_string();
            return self.finish_string_token(text, start, false);
        }

        let escape2 = self.opts.string_escape_char2;
        let mut interp_depth: Vec<u32> = Vec::new();
        let mut terminated = false;
        loop {
            match self.cursor.peek() {
                None => {
                    self.diagnostics.push(Diagnostic::fatal(
                        Span::new(from, self.cursor.pos()),
                        "E_LEX_UNTERMINATED_STRING",
                        "unterminated string literal",
                    ));
                    break;
                }
                Some(c) if c == quote && interp_depth.is_empty() => {
                    self.cursor.advance();
                    if is_verbatim && self.cursor.peek() == Some(quote) {
                        self.cursor.advance(); // `""` escapes a literal quote
                        continue;
                    }
                    terminated = true;
                    break;
                }
                Some('\n') if !is_verbatim => {
                    self.diagnostics.push(Diagnostic::warning(
                        Span::new(from, self.cursor.pos()),
                        "W_LEX_UNTERMINATED_STRING",
                        "string literal not closed before end of line",
                    ));
                    break;
                }
                Some(c) if !is_verbatim && (c == self.opts.string_escape_char || Some(c) == escape2) => {
                    self.cursor.advance();
                    if self.cursor.peek().is_some() {
                        self.cursor.advance();
                    }
                }
                Some('$') if is_interpolated && self.cursor.peek_next() == Some('{') => {
                    self.cursor.advance();
                    self.cursor.advance();
                    interp_depth.push(1);
                }
                Some('{') if !interp_depth.is_empty() => {
                    self.cursor.advance();
                    *interp_depth.last_mut().unwrap() += 1;
                }
                Some('}') if !interp_depth.is_empty() => {
                    self.cursor.advance();
                    let d = interp_depth.last_mut().unwrap();
                    *d -= 1;
                    if *d == 0 {
                        interp_depth.pop();
                    }
                }
                Some(_) => {
                    self.cursor.advance();
                }
            }
        }

        let text = self.cursor.slice(from, self.cursor.pos()).to_string();
        if terminated && is_verbatim && self.opts.string_replace_tab_chars && text.contains('\t') {
            let span = Span::new(from, self.cursor.pos());
            match self.opts.warn_level_tabs_found_in_verbatim_string_literals {
                WarnLevel::Ignore => {}
                WarnLevel::Warn => self.diagnostics.push(Diagnostic::warning(span, "W_LEX_TAB_IN_VERBATIM", "tab character inside verbatim string literal")),
                WarnLevel::Fatal => self.diagnostics.push(Diagnostic::fatal(span, "E_LEX_TAB_IN_VERBATIM", "tab character inside verbatim string literal")),
            }
        }
        self.finish_string_token(text, start, true)
    }

    /// C++11 raw strings: `R"delim(...)delim"`. The closing sequence must
    /// match the opening delimiter exactly.
    fn lex_raw_string(&mut self, start: TokenStart, from: u32) -> Token {
        self.cursor.advance(); // opening quote after 'R'
        let delim_from = self.cursor.pos();
        self.cursor.eat_while(|c| c != '(' && c != '"');
        let delim = self.cursor.slice(delim_from, self.cursor.pos()).to_string();
        if self.cursor.peek() != Some('(') {
            let text = self.cursor.slice(from, self.cursor.pos()).to_string();
            self.diagnostics.push(Diagnostic::fatal(
                Span::new(from, self.cursor.pos()),
                "E_LEX_BAD_RAW_STRING",
                "malformed raw string delimiter",
            ));
            return self.finish(TokenKind::Unknown, text, start);
        }
        self.cursor.advance(); // '('
        let closer = format!("){}\"", delim);
        loop {
            if self.cursor.is_eof() {
                self.diagnostics.push(Diagnostic::fatal(
                    Span::new(from, self.cursor.pos()),
                    "E_LEX_UNTERMINATED_RAW_STRING",
                    format!("unterminated raw string, expected closing tag `{closer}`"),
                ));
                break;
            }
            if self.source[self.cursor.pos() as usize..].starts_with(closer.as_str()) {
                for _ in 0..closer.chars().count() {
                    self.cursor.advance();
                }
                break;
            }
            self.cursor.advance();
        }
        let text = self.cursor.slice(from, self.cursor.pos()).to_string();
        self.finish_string_token(text, start, true)
    }

    /// D allows a string literal to be spelled as one or more bare
    /// `EscapeSequence`s with no surrounding quotes at all: `\x41`,
    /// `é`, `\U0001f600`, `\101`, `\&amp;`. Each run of `\`-led
    /// escapes becomes a single `CT_STRING` token.
    fn lex_d_escape_string(&mut self, start: TokenStart) -> Token {
        let from = self.cursor.pos();
        while self.cursor.peek() == Some('\\') {
            self.cursor.advance(); // backslash
            match self.cursor.peek() {
                Some('x') => {
                    self.cursor.advance();
                    for _ in 0..2 {
                        if self.cursor.peek().is_some() {
                            self.cursor.advance();
                        }
                    }
                }
                Some('u') => {
                    self.cursor.advance();
                    for _ in 0..4 {
                        if self.cursor.peek().is_some() {
                            self.cursor.advance();
                        }
                    }
                }
                Some('U') => {
                    self.cursor.advance();
                    for _ in 0..8 {
                        if self.cursor.peek().is_some() {
                            self.cursor.advance();
                        }
                    }
                }
                Some(d) if d.is_digit(8) => {
                    self.cursor.advance();
                    for _ in 0..2 {
                        if matches!(self.cursor.peek(), Some(c) if c.is_digit(8)) {
                            self.cursor.advance();
                        } else {
                            break;
                        }
                    }
                }
                Some('&') => {
                    self.cursor.advance();
                    while matches!(self.cursor.peek(), Some(c) if c.is_ascii_alphabetic()) {
                        self.cursor.advance();
                    }
                    if self.cursor.peek() == Some(';') {
                        self.cursor.advance();
                    }
                }
                Some(_) => {
                    self.cursor.advance();
                }
                None => {}
            }
        }
        let text = self.cursor.slice(from, self.cursor.pos()).to_string();
        self.finish(TokenKind::String, text, start)
    }

    fn finish_string_token(&mut self, mut text: String, start: TokenStart, gobble_suffix: bool) -> Token {
        if gobble_suffix {
            let checkpoint = self.cursor.checkpoint();
            let suffix_from = self.cursor.pos();
            self.cursor.eat_while(|c| is_ident_start(Some(c)) || c.is_ascii_digit());
            let suffix = self.cursor.slice(suffix_from, self.cursor.pos());
            if is_format_specifier(suffix) {
                self.cursor.restore(checkpoint);
            } else if !suffix.is_empty() {
                text.push_str(suffix);
            }
        }
        let kind = if text.starts_with('\'') {
            TokenKind::Char
        } else if text.contains('\n') {
            TokenKind::StringMulti
        } else {
            TokenKind::String
        };
        self.finish(kind, text, start)
    }

    // ── Numbers ──────────────────────────────────────────────────────────

    fn lex_number(&mut self, start: TokenStart) -> Token {
        let from = self.cursor.pos();
        let mut is_float = false;

        if self.cursor.peek() == Some('0') {
            self.cursor.advance();
            match self.cursor.peek() {
                Some('x') | Some('X') => {
                    self.cursor.advance();
                    self.cursor.eat_while(|c| c.is_ascii_hexdigit() || c == '_' || c == '\'');
                }
                Some('b') | Some('B') => {
                    self.cursor.advance();
                    self.cursor.eat_while(|c| c == '0' || c == '1' || c == '_');
                }
                _ => {
                    self.cursor.eat_while(|c| c.is_ascii_digit() || c == '_');
                }
            }
        } else {
            self.cursor.eat_while(|c| c.is_ascii_digit() || c == '_' || c == '\'');
        }

        if self.cursor.peek() == Some('.') && self.cursor.peek_next() != Some('.') {
            is_float = true;
            self.cursor.advance();
            self.cursor.eat_while(|c| c.is_ascii_digit() || c == '_');
        }

        if matches!(self.cursor.peek(), Some('e') | Some('E') | Some('p') | Some('P')) {
            let checkpoint = self.cursor.checkpoint();
            self.cursor.advance();
            if matches!(self.cursor.peek(), Some('+') | Some('-')) {
                self.cursor.advance();
            }
            if self.cursor.peek().map(|c| c.is_ascii_digit()).unwrap_or(false) {
                is_float = true;
                self.cursor.eat_while(|c| c.is_ascii_digit());
            } else {
                self.cursor.restore(checkpoint);
            }
        }

        self.cursor.eat_while(|c| matches!(c, 'u' | 'U' | 'l' | 'L' | 'f' | 'F' | 'd' | 'D' | 'm' | 'M' | 'i' | 'I' | '6' | '4'));

        let text = self.cursor.slice(from, self.cursor.pos());
        let kind = if is_float || text.ends_with(|c: char| matches!(c, 'f' | 'F' | 'd' | 'D' | 'm' | 'M')) {
            TokenKind::NumberFp
        } else {
            TokenKind::Number
        };
        self.finish(kind, text, start)
    }

    // ── Identifiers / keywords / macros ─────────────────────────────────

    fn lex_word(&mut self, start: TokenStart) -> Token {
        let from = self.cursor.pos();
        self.cursor.advance();
        loop {
            match self.cursor.peek() {
                Some(c) if is_kw2_char(c) => {
                    self.cursor.advance();
                }
                Some('\\') if self.cursor.peek_next() == Some('u') => {
                    self.cursor.advance();
                    self.cursor.advance();
                    for _ in 0..4 {
                        if self.cursor.peek().map(|c| c.is_ascii_hexdigit()).unwrap_or(false) {
                            self.cursor.advance();
                        }
                    }
                }
                _ => break,
            }
        }
        let text = self.cursor.slice(from, self.cursor.pos());

        if self.in_preproc {
            if self.current_directive.is_none() {
                let kind = keyword::lookup(text, self.langs(), true, self.dynamic);
                self.current_directive = Some(kind);
                let is_pawn = self.langs().contains(LangFlags::PAWN);
                match kind {
                    TokenKind::PpDefine if is_pawn => self.pawn_macro_pending = true,
                    TokenKind::PpDefine => self.at_define_body_start = true,
                    TokenKind::Word if is_pawn && text == "emit" => self.pawn_macro_pending = true,
                    TokenKind::PpPragma | TokenKind::Word => self.pending_directive_body = true,
                    _ => {}
                }
                return self.finish(kind, text, start);
            }
            if self.at_define_body_start {
                self.at_define_body_start = false;
                let is_func_macro = self.cursor.peek() == Some('(');
                let kind = if is_func_macro { TokenKind::MacroFunc } else { TokenKind::Macro };
                return self.finish(kind, text, start);
            }
        }

        let kind = keyword::lookup(text, self.langs(), self.in_preproc, self.dynamic);
        self.finish(kind, text, start)
    }

    // ── Punctuators ──────────────────────────────────────────────────────

    fn lex_punctuator(&mut self, start: TokenStart) -> Token {
        let window = self.cursor.window(punctuator::MAX_PUNCT_LEN).to_string();
        if let Some((kind, len)) = punctuator::longest_match(&window, self.langs()) {
            return self.consume_punctuator(&window, kind, len, start);
        }

        // Unknown byte: retry once with Objective-C enabled for C/C++
        // inputs, since `@` and friends only appear in the OC row set.
        if self.langs().contains(LangFlags::C) || self.langs().contains(LangFlags::CPP) {
            let retry_langs = self.langs().union(LangFlags::OC);
            if let Some((kind, len)) = punctuator::longest_match(&window, retry_langs) {
                return self.consume_punctuator(&window, kind, len, start);
            }
        }

        let from = self.cursor.pos();
        let c = self.cursor.advance().expect("checked not eof earlier");
        let mut buf = [0u8; 4];
        let text = c.encode_utf8(&mut buf).to_string();
        self.diagnostics.push(Diagnostic::warning(
            Span::new(from, self.cursor.pos()),
            "W_LEX_UNKNOWN_BYTE",
            format!("unrecognized character `{c}`"),
        ));
        self.finish(TokenKind::Unknown, text, start)
    }

    fn consume_punctuator(&mut self, window: &str, kind: TokenKind, len: usize, start: TokenStart) -> Token {
        let from = self.cursor.pos();
        for _ in 0..window[..len].chars().count() {
            self.cursor.advance();
        }
        let text = self.cursor.slice(from, self.cursor.pos());
        self.finish(kind, text, start)
    }
}

impl<'src> Iterator for Lexer<'src> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        self.next_token()
    }
}

fn is_ident_start(c: Option<char>) -> bool {
    match c {
        Some(c) if c.is_ascii() => char_table::is_kw1(c),
        Some(_) => true,
        None => false,
    }
}

fn is_kw2_char(c: char) -> bool {
    if c.is_ascii() {
        char_table::is_kw2(c)
    } else {
        true
    }
}

fn is_string_quote(c: char) -> bool {
    c == '"' || c == '\''
}

/// Pawn strings: `\"hi"`, `!"hi"`, `\!"hi"`, `!\"hi"`. Returns the number
/// of prefix characters (1 or 2) standing before the opening `"`, or
/// `None` if `rest` does not open one of these forms.
fn pawn_string_prefix_len(rest: &str) -> Option<usize> {
    let mut chars = rest.chars();
    let c0 = chars.next()?;
    if c0 != '\\' && c0 != '!' {
        return None;
    }
    match chars.next() {
        Some('"') => Some(1),
        Some('\\') | Some('!') if chars.next() == Some('"') => Some(2),
        _ => None,
    }
}

/// Known `printf`/`scanf`-style format-specifier macros that look like a
/// user-defined-literal suffix but are not one; the suffix gobble reverts
/// when it matches one of these.
fn is_format_specifier(suffix: &str) -> bool {
    matches!(
        suffix,
        "PRId8" | "PRId16" | "PRId32" | "PRId64" | "PRIu8" | "PRIu16" | "PRIu32" | "PRIu64"
            | "PRIx8" | "PRIx16" | "PRIx32" | "PRIx64" | "PRIX8" | "PRIX16" | "PRIX32" | "PRIX64"
            | "SCNd8" | "SCNd16" | "SCNd32" | "SCNd64" | "SCNu8" | "SCNu16" | "SCNu32" | "SCNu64"
            | "SCNx8" | "SCNx16" | "SCNx32" | "SCNx64"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex_all(source: &str, langs: LangFlags) -> Vec<Token> {
        let opts = Options::for_language(langs);
        let dyn_kw = DynamicKeywords::new();
        Lexer::tokenize(source, &opts, &dyn_kw).tokens
    }

    fn kinds(tokens: &[Token]) -> Vec<TokenKind> {
        tokens.iter().map(|t| t.kind).collect()
    }

    #[test]
    fn lexes_a_simple_statement() {
        let toks = lex_all("int x;\n", LangFlags::C);
        assert_eq!(
            kinds(&toks),
            vec![
                TokenKind::Type,
                TokenKind::Whitespace,
                TokenKind::Word,
                TokenKind::Semicolon,
                TokenKind::Newline,
                TokenKind::Eof,
            ]
        );
        assert_eq!(toks[2].text, "x");
    }

    #[test]
    fn block_comment_is_one_token() {
        let toks = lex_all("/* hi */x", LangFlags::C);
        assert_eq!(toks[0].kind, TokenKind::Comment);
        assert_eq!(toks[0].text, "/* hi */");
    }

    #[test]
    fn multiline_block_comment_is_flagged() {
        let toks = lex_all("/* a\nb */", LangFlags::C);
        assert_eq!(toks[0].kind, TokenKind::CommentMulti);
    }

    #[test]
    fn ignore_markers_toggle_pass_through() {
        let src = "int a;\n/* *INDENT-OFF* */\nint   b;\n/* *INDENT-ON* */\nint c;\n";
        let toks = lex_all(src, LangFlags::C);
        let off_region: Vec<_> = toks
            .iter()
            .skip_while(|t| t.text != "/* *INDENT-OFF* */")
            .skip(1)
            .take_while(|t| t.text != "/* *INDENT-ON* */")
            .collect();
        assert!(off_region.iter().any(|t| t.kind == TokenKind::Ignored));
        let c_tok = toks.iter().find(|t| t.text == "c").unwrap();
        assert_eq!(c_tok.kind, TokenKind::Word);
    }

    #[test]
    fn define_body_first_word_is_macro() {
        let toks = lex_all("#define FOO 1\n", LangFlags::C);
        assert_eq!(kinds(&toks)[..4], [TokenKind::PpHash, TokenKind::PpDefine, TokenKind::Whitespace, TokenKind::Macro]);
    }

    #[test]
    fn function_like_macro_is_macro_func() {
        let toks = lex_all("#define FOO(x) (x)\n", LangFlags::C);
        let foo = toks.iter().find(|t| t.text == "FOO").unwrap();
        assert_eq!(foo.kind, TokenKind::MacroFunc);
    }

    #[test]
    fn pragma_body_is_packed_opaque() {
        let toks = lex_all("#pragma GCC diagnostic push\n", LangFlags::C);
        let body = toks.iter().find(|t| t.kind == TokenKind::PreprocBody).unwrap();
        assert_eq!(body.text, "GCC diagnostic push");
    }

    #[test]
    fn string_literal_with_escape() {
        let toks = lex_all(r#""a\"b""#, LangFlags::C);
        assert_eq!(toks[0].kind, TokenKind::String);
        assert_eq!(toks[0].text, r#""a\"b""#);
    }

    #[test]
    fn raw_string_matches_delimiter() {
        let src = "R\"tag(a)b(c)tag\"";
        let toks = lex_all(src, LangFlags::CPP);
        assert_eq!(toks[0].kind, TokenKind::String);
        assert_eq!(toks[0].text, src);
    }

    #[test]
    fn d_wysiwyg_string_is_recognized() {
        let toks = lex_all(r#"r"a\b""#, LangFlags::D);
        assert_eq!(toks[0].kind, TokenKind::String);
        assert_eq!(toks[0].text, r#"r"a\b""#);
    }

    #[test]
    fn d_hex_string_is_recognized() {
        let src = "x\"deadbeef\"";
        let toks = lex_all(src, LangFlags::D);
        assert_eq!(toks[0].kind, TokenKind::String);
        assert_eq!(toks[0].text, src);
    }

    #[test]
    fn d_backtick_string_is_recognized() {
        let src = "`a\\b`";
        let toks = lex_all(src, LangFlags::D);
        assert_eq!(toks[0].kind, TokenKind::String);
        assert_eq!(toks[0].text, src);
    }

    #[test]
    fn d_escape_sequence_forms_are_one_string_token() {
        let src = r"\x41\U00000043\101\&amp;";
        let toks = lex_all(src, LangFlags::D);
        assert_eq!(toks[0].kind, TokenKind::String);
        assert_eq!(toks[0].text, src);
    }

    #[test]
    fn cs_combined_interpolated_verbatim_string() {
        let toks = lex_all(r#"$@"x ${y}""#, LangFlags::CS);
        assert_eq!(toks[0].kind, TokenKind::String);
        assert_eq!(toks[0].text, r#"$@"x ${y}""#);

        let toks2 = lex_all(r#"@$"x ${y}""#, LangFlags::CS);
        assert_eq!(toks2[0].kind, TokenKind::String);
        assert_eq!(toks2[0].text, r#"@$"x ${y}""#);
    }

    #[test]
    fn pawn_backslash_string_is_recognized() {
        let src = r#"\"hi""#;
        let toks = lex_all(src, LangFlags::PAWN);
        assert_eq!(toks[0].kind, TokenKind::String);
        assert_eq!(toks[0].text, src);
    }

    #[test]
    fn pawn_bang_string_is_recognized() {
        let src = r#"!"hi""#;
        let toks = lex_all(src, LangFlags::PAWN);
        assert_eq!(toks[0].kind, TokenKind::String);
        assert_eq!(toks[0].text, src);
    }

    #[test]
    fn pawn_double_prefix_string_is_recognized() {
        let src = r#"\!"hi""#;
        let toks = lex_all(src, LangFlags::PAWN);
        assert_eq!(toks[0].kind, TokenKind::String);
        assert_eq!(toks[0].text, src);
    }

    #[test]
    fn char_literal_is_tagged_char() {
        let toks = lex_all("'a'", LangFlags::C);
        assert_eq!(toks[0].kind, TokenKind::Char);
    }

    #[test]
    fn hex_and_float_numbers() {
        let toks = lex_all("0x1F 3.14 2e10", LangFlags::C);
        assert_eq!(toks[0].kind, TokenKind::Number);
        assert_eq!(toks[2].kind, TokenKind::NumberFp);
        assert_eq!(toks[4].kind, TokenKind::NumberFp);
    }

    #[test]
    fn backslash_newline_is_nl_cont() {
        let toks = lex_all("#define X 1 + \\\n    2\n", LangFlags::C);
        assert!(toks.iter().any(|t| t.kind == TokenKind::NlCont));
    }

    #[test]
    fn attribute_bracket_is_one_token() {
        let toks = lex_all("[[nodiscard]] int f();", LangFlags::CPP);
        assert_eq!(toks[0].kind, TokenKind::Attribute);
        assert_eq!(toks[0].text, "[[nodiscard]]");
    }

    #[test]
    fn unknown_byte_is_diagnosed() {
        let opts = Options::for_language(LangFlags::C);
        let dyn_kw = DynamicKeywords::new();
        let out = Lexer::tokenize("int x `;", &opts, &dyn_kw);
        assert!(out.diagnostics.iter().any(|d| d.code == "W_LEX_UNKNOWN_BYTE"));
    }

    #[test]
    fn byte_order_mark_is_its_own_token() {
        let toks = lex_all("\u{feff}int x;", LangFlags::C);
        assert_eq!(toks[0].kind, TokenKind::ByteOrderMark);
    }

    #[test]
    fn dynamic_keyword_overrides_plain_word() {
        let opts = Options::for_language(LangFlags::C);
        let mut dyn_kw = DynamicKeywords::new();
        dyn_kw.insert("MyHandle", TokenKind::Type);
        let out = Lexer::tokenize("MyHandle h;", &opts, &dyn_kw);
        assert_eq!(out.tokens[0].kind, TokenKind::Type);
    }

    #[test]
    fn preproc_flag_set_while_in_directive() {
        let toks = lex_all("#define X 1\nint y;\n", LangFlags::C);
        let x = toks.iter().find(|t| t.text == "X").unwrap();
        assert!(x.flags.contains(ChunkFlags::IN_PREPROC));
        let y = toks.iter().find(|t| t.text == "y").unwrap();
        assert!(!y.flags.contains(ChunkFlags::IN_PREPROC));
    }

    #[test]
    fn line_ending_counts_are_gathered() {
        let opts = Options::for_language(LangFlags::C);
        let dyn_kw = DynamicKeywords::new();
        let out = Lexer::tokenize("a\r\nb\n", &opts, &dyn_kw);
        assert_eq!(out.line_endings.crlf, 1);
        assert_eq!(out.line_endings.lf, 1);
    }

    #[test]
    fn pawn_define_body_is_one_opaque_macro_token() {
        let toks = lex_all("#define foo(%1) bar(%1)\n", LangFlags::PAWN);
        let macro_tok = toks.iter().find(|t| t.kind == TokenKind::Macro).unwrap();
        assert_eq!(macro_tok.text, "foo(%1) bar(%1)");
    }

    #[test]
    fn pawn_emit_body_is_one_opaque_macro_token() {
        let toks = lex_all("#emit PUSH.pri\n", LangFlags::PAWN);
        let macro_tok = toks.iter().find(|t| t.kind == TokenKind::Macro).unwrap();
        assert_eq!(macro_tok.text, "PUSH.pri");
    }

    #[test]
    fn non_pawn_define_still_tokenizes_body_normally() {
        let toks = lex_all("#define FOO(x) (x)\n", LangFlags::C);
        let foo = toks.iter().find(|t| t.text == "FOO").unwrap();
        assert_eq!(foo.kind, TokenKind::MacroFunc);
        assert!(!toks.iter().any(|t| t.kind == TokenKind::Macro));
    }
}
