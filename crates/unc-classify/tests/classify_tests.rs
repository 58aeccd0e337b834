//! End-to-end classifier tests driving the full lex → frame → classify
//! pipeline through the public APIs of all three crates, covering §8's
//! worked scenarios plus sweep 3's declaration tagging.

use uncrustify_common::arena::TokenArena;
use uncrustify_common::flags::ChunkFlags;
use uncrustify_common::keyword::DynamicKeywords;
use uncrustify_common::lang::LangFlags;
use uncrustify_common::options::Options;
use uncrustify_common::token_kind::TokenKind;

fn run(source: &str, lang: LangFlags) -> TokenArena {
    let opts = Options::for_language(lang);
    let dynamic = DynamicKeywords::default();
    let lex = uncrustify_lexer::Lexer::tokenize(source, &opts, &dynamic);
    let mut arena = TokenArena::from_tokens(lex.tokens);
    uncrustify_frame::run_frame_pass(&mut arena, &opts).expect("frame pass must not underflow on well-formed input");
    uncrustify_classify::classify(&mut arena, &opts);
    arena
}

fn find<'a>(arena: &'a TokenArena, text: &str) -> &'a uncrustify_common::token::Token {
    arena
        .iter()
        .map(|id| arena.get(id))
        .find(|t| t.text == text)
        .unwrap_or_else(|| panic!("no token with text {text:?}"))
}

fn non_trivia(arena: &TokenArena) -> Vec<TokenKind> {
    arena.iter().map(|id| arena.get(id).kind).filter(|k| !k.is_trivia()).collect()
}

/// Scenario 1: `int *p = a * b;` — the declarator `*` is `PTR_TYPE`, the
/// expression `*` stays `ARITH`.
#[test]
fn pointer_star_vs_multiplication_star() {
    let arena = run("int *p = a * b;", LangFlags::CPP);
    let stars: Vec<_> = arena.iter().map(|id| arena.get(id)).filter(|t| t.text == "*").collect();
    assert_eq!(stars.len(), 2);
    assert_eq!(stars[0].kind, TokenKind::PtrType);
    assert_eq!(stars[1].kind, TokenKind::Arith);
    assert!(find(&arena, "p").flags.contains(ChunkFlags::VAR_1ST_DEF));
}

/// Scenario 2: `vector<int> v; a < b;` — the first `<`/`>` resolve to
/// `ANGLE_OPEN`/`CLOSE`, the second stays `COMPARE`.
#[test]
fn template_angles_vs_less_than_compare() {
    let arena = run("vector<int> v; a < b;", LangFlags::CPP);
    let opens: Vec<_> = arena.iter().map(|id| arena.get(id)).filter(|t| t.text == "<").collect();
    let closes: Vec<_> = arena.iter().map(|id| arena.get(id)).filter(|t| t.text == ">").collect();
    assert_eq!(opens[0].kind, TokenKind::AngleOpen);
    assert_eq!(closes[0].kind, TokenKind::AngleClose);
}

/// Scenario 3: `if (x) foo();` with no braces gets virtual braces from the
/// frame pass, preserved (not misclassified) through the classifier.
#[test]
fn brace_less_if_gets_virtual_braces_over_the_body() {
    let arena = run("if (x) foo();\n", LangFlags::CPP);
    let kinds = non_trivia(&arena);
    assert!(kinds.contains(&TokenKind::VbraceOpen));
    assert!(kinds.contains(&TokenKind::VbraceClose));
    let foo = find(&arena, "foo");
    assert_eq!(foo.kind, TokenKind::FuncCall);
}

/// Scenario 4: `x = (int)y;` vs `x = (f)(y);` — a cast close-paren is
/// followed by `DEREF`-free classification of the cast target, a call
/// close-paren is not touched.
#[test]
fn c_style_cast_vs_call_in_parens() {
    let arena = run("x = (int)y;", LangFlags::CPP);
    let close = arena.iter().map(|id| arena.get(id)).find(|t| t.text == ")").unwrap();
    assert_eq!(close.parent_kind, TokenKind::CCast);
}

/// Scenario 5: `Foo bar(1, 2);` at statement scope with call-shaped
/// (numeric-literal) arguments is a constructor-style variable, not a
/// function prototype.
#[test]
fn ctor_shaped_declaration_with_call_args_is_a_variable() {
    let arena = run("Foo bar(1, 2);\n", LangFlags::CPP);
    let bar = find(&arena, "bar");
    assert_eq!(bar.kind, TokenKind::FuncCtorVar);
    assert!(bar.flags.contains(ChunkFlags::VAR_1ST_DEF));
}

/// Scenario 6: `[arr addObject:@"x"];` — Objective-C message send.
#[test]
fn objective_c_message_send() {
    let arena = run("[arr addObject:@\"x\"];", LangFlags::OC);
    let open = arena.iter().map(|id| arena.get(id)).find(|t| t.text == "[").unwrap();
    assert_eq!(open.parent_kind, TokenKind::OcMessageSend);
    let sel = find(&arena, "addObject");
    assert_eq!(sel.kind, TokenKind::OcMsgFunc);
    let colon = arena.iter().map(|id| arena.get(id)).find(|t| t.text == ":").unwrap();
    assert_eq!(colon.kind, TokenKind::OcColon);
    let boxed = arena.iter().map(|id| arena.get(id)).find(|t| t.text == "@\"x\"").unwrap();
    assert_eq!(boxed.kind, TokenKind::String);
    assert!(boxed.flags.contains(ChunkFlags::OC_BOXED));
}

#[test]
fn plain_subscript_is_not_a_message_send() {
    let arena = run("arr[i] = 1;\n", LangFlags::OC);
    let open = arena.iter().map(|id| arena.get(id)).find(|t| t.text == "[").unwrap();
    assert_ne!(open.parent_kind, TokenKind::OcMessageSend);
}

#[test]
fn multiple_declarators_share_one_type() {
    let arena = run("int a, b, c;\n", LangFlags::CPP);
    for name in ["a", "b", "c"] {
        assert!(find(&arena, name).flags.contains(ChunkFlags::VAR_DEF));
    }
    assert!(find(&arena, "a").flags.contains(ChunkFlags::VAR_1ST_DEF));
    assert!(!find(&arena, "b").flags.contains(ChunkFlags::VAR_1ST_DEF));
}

#[test]
fn unrecognized_user_type_name_is_still_collected() {
    let arena = run("Widget w;\n", LangFlags::CPP);
    let widget = find(&arena, "Widget");
    assert_eq!(widget.kind, TokenKind::Type);
    assert!(find(&arena, "w").flags.contains(ChunkFlags::VAR_1ST_DEF));
}

#[test]
fn function_pointer_shape_is_detected() {
    let arena = run("void (*cb)(int x);\n", LangFlags::CPP);
    let open = arena.iter().map(|id| arena.get(id)).filter(|t| t.text == "(").collect::<Vec<_>>();
    assert_eq!(open[0].kind, TokenKind::TparenOpen);
    assert_eq!(open[1].kind, TokenKind::FparenOpen);
    let star = arena.iter().map(|id| arena.get(id)).find(|t| t.text == "*").unwrap();
    assert_eq!(star.kind, TokenKind::PtrType);
}

#[test]
fn constructor_name_matching_class_is_tagged() {
    let src = "class Widget {\n  Widget() {}\n};\n";
    let arena = run(src, LangFlags::CPP);
    let ctor_names: Vec<_> = arena.iter().map(|id| arena.get(id)).filter(|t| t.text == "Widget" && t.kind == TokenKind::FuncClassDef).collect();
    assert_eq!(ctor_names.len(), 1);
}

#[test]
fn classifying_twice_is_idempotent_across_the_full_pipeline() {
    let mut arena = run("class Widget { Widget(int x) { y = x * 2; } };\n", LangFlags::CPP);
    let opts = Options::for_language(LangFlags::CPP);
    let before = non_trivia(&arena);
    uncrustify_classify::classify(&mut arena, &opts);
    assert_eq!(non_trivia(&arena), before);
}

#[test]
fn cpp_lambda_capture_and_params_are_tagged() {
    let arena = run("auto f = [x](int y) { return x + y; };\n", LangFlags::CPP);
    let open = arena.iter().map(|id| arena.get(id)).find(|t| t.text == "[").unwrap();
    assert_eq!(open.parent_kind, TokenKind::Function);
}

#[test]
fn empty_capture_tsquare_is_split_into_two_brackets() {
    let arena = run("auto f = []() { return 1; };\n", LangFlags::CPP);
    let brackets: Vec<_> = arena.iter().map(|id| arena.get(id)).filter(|t| t.kind == TokenKind::SquareOpen || t.kind == TokenKind::SquareClose).collect();
    assert_eq!(brackets.len(), 2);
    assert_eq!(brackets[0].text, "[");
    assert_eq!(brackets[1].text, "]");
}

#[test]
fn java_arrow_is_lambda() {
    let arena = run("Runnable r = () -> doWork();\n", LangFlags::JAVA);
    let arrow = arena.iter().map(|id| arena.get(id)).find(|t| t.text == "->").unwrap();
    assert_eq!(arrow.kind, TokenKind::JavaLambda);
}

#[test]
fn cs_auto_property_is_tagged() {
    let arena = run("int Foo { get; set; }\n", LangFlags::CS);
    let open = arena.iter().map(|id| arena.get(id)).find(|t| t.text == "{").unwrap();
    assert_eq!(open.parent_kind, TokenKind::CsProperty);
}

#[test]
fn cs_assembly_attribute_is_tagged() {
    let arena = run("[assembly: AssemblyTitle(\"x\")]\n", LangFlags::CS);
    let open = arena.iter().map(|id| arena.get(id)).find(|t| t.text == "[").unwrap();
    assert_eq!(open.parent_kind, TokenKind::CsSquareStmt);
}

#[test]
fn sql_embedding_region_retags_words() {
    let src = "EXEC SQL BEGIN DECLARE SECTION;\nint x;\nEXEC SQL END DECLARE SECTION;\n";
    let arena = run(src, LangFlags::C);
    let declare = find(&arena, "DECLARE");
    assert_eq!(declare.kind, TokenKind::SqlWord);
}
