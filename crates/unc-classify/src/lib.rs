//! Classifier: context-sensitive token labeling (§4.5).
//!
//! Three ordered sweeps over the already-nested token list the frame pass
//! produced, plus a set of independent language-specific handlers. Every
//! sweep is best-effort per §4.5's "Error semantics of the classifier": a
//! sweep that cannot confirm its hypothesis leaves the token's earlier kind
//! alone rather than raising an error, so this pass is infallible — it
//! returns its diagnostics directly instead of a `Result`, unlike the frame
//! pass's `FrameError` (which guards an invariant of the pass's own
//! bookkeeping, not something the input can trigger).
//!
//! Implementation order differs slightly from the prose order of §4.5's
//! sweep-1 bullet list: angle/template resolution and cast detection run
//! before operator disambiguation, because the operator rule ("after a
//! close-paren that ends a cast -> DEREF") needs `parent_kind == CCast`/
//! `TypeCast` to already be in place on that close paren. See DESIGN.md.

mod lang_specific;
mod sweep1;
mod sweep2;
mod sweep3;

use uncrustify_common::arena::TokenArena;
use uncrustify_common::diagnostic::DiagnosticBag;
use uncrustify_common::options::Options;

/// Diagnostics gathered while classifying; the mutated token list lives in
/// the caller's [`TokenArena`], same convention as
/// [`uncrustify_frame::run_frame_pass`].
pub struct ClassifyOutput {
    pub diagnostics: DiagnosticBag,
}

/// Run every classifier sweep over `arena` in place, per §4.5.
pub fn classify(arena: &mut TokenArena, opts: &Options) -> ClassifyOutput {
    let mut diagnostics = DiagnosticBag::new();

    sweep1::run(arena, opts, &mut diagnostics);
    sweep2::run(arena, &mut diagnostics);
    sweep3::run(arena);
    lang_specific::run(arena, opts, &mut diagnostics);

    ClassifyOutput { diagnostics }
}
