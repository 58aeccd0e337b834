//! Integration tests driving `Lexer::tokenize` through its public API,
//! complementing the unit tests colocated with the implementation.

use uncrustify_common::keyword::DynamicKeywords;
use uncrustify_common::lang::LangFlags;
use uncrustify_common::options::Options;
use uncrustify_common::token_kind::TokenKind;
use uncrustify_lexer::Lexer;

fn kinds(source: &str) -> Vec<TokenKind> {
    let opts = Options::for_language(LangFlags::CPP);
    let dynamic = DynamicKeywords::default();
    Lexer::tokenize(source, &opts, &dynamic)
        .tokens
        .into_iter()
        .map(|t| t.kind)
        .collect()
}

fn non_trivia_kinds(source: &str) -> Vec<TokenKind> {
    let opts = Options::for_language(LangFlags::CPP);
    let dynamic = DynamicKeywords::default();
    Lexer::tokenize(source, &opts, &dynamic)
        .tokens
        .into_iter()
        .filter(|t| !t.is_trivia())
        .map(|t| t.kind)
        .collect()
}

#[test]
fn empty_input_is_just_eof() {
    assert_eq!(kinds(""), vec![TokenKind::Eof]);
}

#[test]
fn whitespace_only_input() {
    let ks = kinds("   \t  ");
    assert_eq!(ks, vec![TokenKind::Whitespace, TokenKind::Eof]);
}

#[test]
fn simple_function_call_statement() {
    let ks = non_trivia_kinds("foo(1, 2);");
    assert!(ks.ends_with(&[TokenKind::Semicolon, TokenKind::Eof]));
    assert_eq!(ks[0], TokenKind::Word);
}

#[test]
fn full_if_else_statement_has_balanced_braces() {
    let src = "if (x > 0) {\n    y = 1;\n} else {\n    y = 2;\n}\n";
    let ks = non_trivia_kinds(src);
    let open_braces = ks.iter().filter(|k| **k == TokenKind::BraceOpen).count();
    let close_braces = ks.iter().filter(|k| **k == TokenKind::BraceClose).count();
    assert_eq!(open_braces, close_braces);
    assert_eq!(open_braces, 2);
}

#[test]
fn preprocessor_define_is_macro_followed_by_body() {
    let src = "#define MAX 100\n";
    let ks = non_trivia_kinds(src);
    assert_eq!(
        ks,
        vec![
            TokenKind::PpHash,
            TokenKind::PpDefine,
            TokenKind::Macro,
            TokenKind::Number,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn function_like_macro_definition() {
    let src = "#define SQUARE(x) ((x) * (x))\n";
    let ks = non_trivia_kinds(src);
    assert_eq!(ks[0], TokenKind::PpHash);
    assert_eq!(ks[1], TokenKind::PpDefine);
    assert_eq!(ks[2], TokenKind::MacroFunc);
}

#[test]
fn pragma_directive_body_is_one_opaque_token() {
    let src = "#pragma once\n";
    let ks = non_trivia_kinds(src);
    assert!(ks.contains(&TokenKind::PreprocBody));
}

#[test]
fn string_literal_round_trips_as_single_token() {
    let opts = Options::for_language(LangFlags::CPP);
    let dynamic = DynamicKeywords::default();
    let out = Lexer::tokenize(r#""hello world""#, &opts, &dynamic);
    let strings: Vec<_> = out
        .tokens
        .iter()
        .filter(|t| t.kind == TokenKind::String)
        .collect();
    assert_eq!(strings.len(), 1);
    assert_eq!(strings[0].text, r#""hello world""#);
}

#[test]
fn raw_string_literal_is_single_token() {
    let opts = Options::for_language(LangFlags::CPP);
    let dynamic = DynamicKeywords::default();
    let src = "R\"(a(b)c)\"";
    let out = Lexer::tokenize(src, &opts, &dynamic);
    let strings: Vec<_> = out
        .tokens
        .iter()
        .filter(|t| t.kind == TokenKind::String)
        .collect();
    assert_eq!(strings.len(), 1);
    assert_eq!(strings[0].text, src);
}

#[test]
fn block_comment_spanning_lines_is_flagged_multiline() {
    let opts = Options::for_language(LangFlags::CPP);
    let dynamic = DynamicKeywords::default();
    let out = Lexer::tokenize("/* line one\nline two */", &opts, &dynamic);
    let comment = out
        .tokens
        .iter()
        .find(|t| t.kind == TokenKind::CommentMulti)
        .expect("multiline comment token");
    assert_eq!(comment.text, "/* line one\nline two */");
}

#[test]
fn ignore_markers_pass_tokens_through_unclassified() {
    let opts = Options::for_language(LangFlags::CPP);
    let dynamic = DynamicKeywords::default();
    let src = "a = 1;\n/* *INDENT-OFF* */\nb = 2;\n/* *INDENT-ON* */\nc = 3;\n";
    let out = Lexer::tokenize(src, &opts, &dynamic);
    let ignored = out
        .tokens
        .iter()
        .filter(|t| t.kind == TokenKind::Ignored)
        .count();
    assert!(ignored > 0);
    // tokens outside the ignore markers keep their real kind
    assert!(out
        .tokens
        .iter()
        .any(|t| t.kind == TokenKind::Word && t.text == "a"));
    assert!(out
        .tokens
        .iter()
        .any(|t| t.kind == TokenKind::Word && t.text == "c"));
}

#[test]
fn crlf_and_lf_newlines_are_both_counted() {
    let opts = Options::for_language(LangFlags::CPP);
    let dynamic = DynamicKeywords::default();
    let out = Lexer::tokenize("a\r\nb\nc", &opts, &dynamic);
    assert_eq!(out.line_endings.crlf, 1);
    assert_eq!(out.line_endings.lf, 1);
    assert_eq!(out.line_endings.cr, 0);
}

#[test]
fn unknown_byte_produces_a_diagnostic() {
    let opts = Options::for_language(LangFlags::CPP);
    let dynamic = DynamicKeywords::default();
    let out = Lexer::tokenize("a `b", &opts, &dynamic);
    assert!(!out.diagnostics.as_slice().is_empty());
}

#[test]
fn cpp_attribute_bracket_is_one_token() {
    let ks = non_trivia_kinds("[[nodiscard]] int f();");
    assert_eq!(ks[0], TokenKind::Attribute);
}

#[test]
fn dynamic_keyword_registration_overrides_a_plain_word() {
    let opts = Options::for_language(LangFlags::CPP);
    let mut dynamic = DynamicKeywords::default();
    dynamic.insert("FOOBAR".to_string(), TokenKind::Word);
    let out = Lexer::tokenize("FOOBAR", &opts, &dynamic);
    assert_eq!(out.tokens[0].kind, TokenKind::Word);
}

#[test]
fn consecutive_blank_lines_collapse_into_one_newline_token_with_a_count() {
    let opts = Options::for_language(LangFlags::CPP);
    let dynamic = DynamicKeywords::default();
    let out = Lexer::tokenize("a\n\n\nb", &opts, &dynamic);
    let nl = out
        .tokens
        .iter()
        .find(|t| t.kind == TokenKind::Newline)
        .expect("newline token");
    assert_eq!(nl.nl_count, 3);
}
