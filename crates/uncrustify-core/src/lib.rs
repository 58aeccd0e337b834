//! Glue crate: run the lexer, frame pass, and classifier over one source
//! file and hand back a single token arena plus a merged diagnostics
//! stream, matching `mesh-parser::parse`'s role of being the one entry
//! point an embedding application actually calls (§6 "External interfaces").
//!
//! This crate owns no tokenization/classification logic of its own — each
//! pass's crate is the authority on its own algorithm. It only sequences
//! them and folds their `DiagnosticBag`s together.

mod error;

pub use error::PipelineError;

pub use uncrustify_classify::ClassifyOutput;
pub use uncrustify_common::arena::TokenArena;
pub use uncrustify_common::diagnostic::{Diagnostic, DiagnosticBag, Severity};
pub use uncrustify_common::keyword::DynamicKeywords;
pub use uncrustify_common::lang::LangFlags;
pub use uncrustify_common::options::Options;
pub use uncrustify_frame::FramePassOutput;
pub use uncrustify_lexer::LineEndingCounts;

/// Everything a caller gets back from one end-to-end run: the mutated
/// token arena (§3), the folded diagnostics stream (§6 "Outputs"), and the
/// line-ending counts the lexer gathered for a later `newlines = Auto`
/// decision.
pub struct ProcessOutput {
    pub tokens: TokenArena,
    pub diagnostics: DiagnosticBag,
    pub line_endings: LineEndingCounts,
}

/// Lex, frame, and classify `source` under `opts`/`dynamic`, in that order.
///
/// Returns `Err` only if the frame pass's stack bookkeeping underflows
/// (`PipelineError::Frame`) — everything else the three passes encounter is
/// folded into `ProcessOutput::diagnostics` instead of aborting the run, per
/// §7's propagation rule.
pub fn process(source: &str, opts: &Options, dynamic: &DynamicKeywords) -> Result<ProcessOutput, PipelineError> {
    let lex = uncrustify_lexer::Lexer::tokenize(source, opts, dynamic);
    let mut tokens = TokenArena::from_tokens(lex.tokens);
    let mut diagnostics = lex.diagnostics;

    let frame_out = uncrustify_frame::run_frame_pass(&mut tokens, opts)?;
    diagnostics.extend(frame_out.diagnostics);

    let classify_out = uncrustify_classify::classify(&mut tokens, opts);
    diagnostics.extend(classify_out.diagnostics);

    Ok(ProcessOutput {
        tokens,
        diagnostics,
        line_endings: lex.line_endings,
    })
}

/// Convenience over [`process`] for callers with no dynamically-discovered
/// keywords (typedef'd names, `#define`d macros) to seed — the common case
/// for one-shot formatting of a single file in isolation.
pub fn process_default(source: &str, opts: &Options) -> Result<ProcessOutput, PipelineError> {
    process(source, opts, &DynamicKeywords::default())
}

/// Reconstruct the original input by concatenating every token's `text` in
/// order — the byte-fidelity guarantee of §8: "for any input byte sequence
/// that does not trigger a fatal lexical error, a token list exists whose
/// concatenated text reproduces the input exactly."
pub fn reconstruct(tokens: &TokenArena) -> String {
    let mut out = String::new();
    for id in tokens.iter() {
        out.push_str(&tokens.get(id).text);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_byte_for_byte() {
        let src = "int *p = a * b;\nif (x) foo();\n";
        let opts = Options::for_language(LangFlags::CPP);
        let out = process_default(src, &opts).expect("well-formed input must not underflow the frame stack");
        assert_eq!(reconstruct(&out.tokens), src);
    }

    #[test]
    fn merges_diagnostics_from_every_pass() {
        let src = "int x = 1;\n";
        let opts = Options::for_language(LangFlags::CPP);
        let out = process_default(src, &opts).unwrap();
        assert!(out.diagnostics.is_empty(), "well-formed input should produce no diagnostics");
    }

    #[test]
    fn exposes_classification_results_through_one_call() {
        let src = "Foo bar(1, 2);\n";
        let opts = Options::for_language(LangFlags::CPP);
        let out = process_default(src, &opts).unwrap();
        let bar = out
            .tokens
            .iter()
            .map(|id| out.tokens.get(id))
            .find(|t| t.text == "bar")
            .expect("bar token must exist");
        assert_eq!(bar.kind, uncrustify_common::token_kind::TokenKind::FuncCtorVar);
    }
}
