use serde::Serialize;

use crate::flags::ChunkFlags;
use crate::span::Span;
use crate::token_kind::TokenKind;

/// One node of the shared token list (§3's "chunk").
///
/// Tokens are produced by the lexer and mutated in place by the frame pass
/// and classifier: only `kind`, `parent_kind`, `level`, `brace_level`,
/// `pp_level`, and `flags` change after lexing — the `orig_*` fields are
/// immutable (invariant 7).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub parent_kind: TokenKind,
    pub text: String,
    pub span: Span,

    /// Original 1-based source line; immutable after lexing.
    pub orig_line: u32,
    /// Original 1-based source column; immutable after lexing.
    pub orig_col: u32,
    /// Original 1-based source column, one past the last byte; immutable after lexing.
    pub orig_col_end: u32,
    /// Number of whitespace bytes preceding this token on its line; immutable after lexing.
    pub orig_prev_sp: u32,

    /// Output column, mutated by later (out-of-scope) formatting passes.
    pub column: u32,
    pub column_indent: u32,

    /// Nesting depth in `( [ { <`, cumulative across bracket families.
    pub level: u32,
    /// Nesting depth in `{` only (virtual or real).
    pub brace_level: u32,
    /// Nesting depth of `#if`/`#ifdef` scopes.
    pub pp_level: u32,
    /// For newline tokens, the number of consecutive line breaks collapsed into one token.
    pub nl_count: u32,

    pub flags: ChunkFlags,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            parent_kind: TokenKind::None,
            text: text.into(),
            span,
            orig_line: 0,
            orig_col: 0,
            orig_col_end: 0,
            orig_prev_sp: 0,
            column: 0,
            column_indent: 0,
            level: 0,
            brace_level: 0,
            pp_level: 0,
            nl_count: 0,
            flags: ChunkFlags::default(),
        }
    }

    pub fn with_origin(mut self, line: u32, col: u32, col_end: u32, prev_sp: u32) -> Self {
        self.orig_line = line;
        self.orig_col = col;
        self.orig_col_end = col_end;
        self.orig_prev_sp = prev_sp;
        self
    }

    pub fn is_trivia(&self) -> bool {
        self.kind.is_trivia()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_token_has_no_parent_and_zeroed_nesting() {
        let t = Token::new(TokenKind::Word, "foo", Span::new(0, 3));
        assert_eq!(t.parent_kind, TokenKind::None);
        assert_eq!(t.level, 0);
        assert_eq!(t.brace_level, 0);
        assert_eq!(t.text, "foo");
    }

    #[test]
    fn with_origin_sets_immutable_fields() {
        let t = Token::new(TokenKind::Word, "foo", Span::new(0, 3)).with_origin(4, 2, 5, 1);
        assert_eq!(t.orig_line, 4);
        assert_eq!(t.orig_col, 2);
        assert_eq!(t.orig_col_end, 5);
        assert_eq!(t.orig_prev_sp, 1);
    }

    #[test]
    fn is_trivia_matches_kind() {
        let ws = Token::new(TokenKind::Whitespace, " ", Span::new(0, 1));
        let word = Token::new(TokenKind::Word, "x", Span::new(0, 1));
        assert!(ws.is_trivia());
        assert!(!word.is_trivia());
    }
}
