//! The frame pass itself (§4.4): a single left-to-right walk that tracks
//! bracket/statement nesting, retags parens/braces with their structural
//! parent, and inserts virtual braces over brace-less control bodies.
//!
//! The walk and its stage machine are a direct port of
//! `original_source/src/brace_cleanup.c`'s `parse_cleanup`/`close_statement`/
//! `handle_close_stage` trio, adapted from a pointer-chasing `chunk_t` list
//! to the index-addressed [`TokenArena`]. Operator disambiguation (`*`/`&`
//! ptr-type vs. arith), `WORD`→`TYPE` promotion after `enum`/`struct`, and
//! the `"TYPE" "name"` pattern are deliberately left for the classifier
//! (§4.5 sweep 1) even though the original C file does a first pass at them
//! here too — this crate keeps that one concern in one place.

use uncrustify_common::arena::{ChunkId, TokenArena};
use uncrustify_common::diagnostic::{Diagnostic, DiagnosticBag};
use uncrustify_common::flags::ChunkFlags;
use uncrustify_common::options::Options;
use uncrustify_common::span::Span;
use uncrustify_common::token::Token;
use uncrustify_common::token_kind::TokenKind;

use crate::error::FrameError;

/// The expected next sub-token of a compound statement (§4.4's stage table).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    None,
    Paren1,
    Paren2,
    Brace2,
    BraceDo,
    While,
    Else,
    ElseIf,
}

#[derive(Debug, Clone, Copy)]
struct FrameEntry {
    kind: TokenKind,
    stage: Stage,
    parent: TokenKind,
}

impl FrameEntry {
    fn root() -> Self {
        FrameEntry {
            kind: TokenKind::None,
            stage: Stage::None,
            parent: TokenKind::None,
        }
    }
}

/// One `(row, col)` worth of nesting state: an entry per open bracket or
/// pending compound statement, plus the running level counters.
struct Frame {
    stack: Vec<FrameEntry>,
    level: u32,
    brace_level: u32,
    stmt_count: u32,
    expr_count: u32,
    sparen_count: u32,
}

impl Frame {
    fn new() -> Self {
        Frame {
            stack: vec![FrameEntry::root()],
            level: 0,
            brace_level: 0,
            stmt_count: 0,
            expr_count: 0,
            sparen_count: 0,
        }
    }

    fn top(&self) -> FrameEntry {
        *self
            .stack
            .last()
            .expect("frame stack always holds the root sentinel")
    }

    fn top_mut(&mut self) -> &mut FrameEntry {
        self.stack
            .last_mut()
            .expect("frame stack always holds the root sentinel")
    }
}

/// Diagnostics gathered while walking; no mutated token list is returned
/// separately since the pass mutates the caller's [`TokenArena`] in place.
pub struct FramePassOutput {
    pub diagnostics: DiagnosticBag,
}

struct FramePassCtx<'a> {
    opts: &'a Options,
    diagnostics: DiagnosticBag,
    frame: Frame,
    saved_frames: Vec<Frame>,
    pp_cond_stack: Vec<TokenKind>,
    in_preproc_directive: Option<TokenKind>,
}

/// Walk `arena` left to right, annotating nesting and inserting virtual
/// braces, per §4.4.
pub fn run_frame_pass(arena: &mut TokenArena, opts: &Options) -> Result<FramePassOutput, FrameError> {
    let mut ctx = FramePassCtx {
        opts,
        diagnostics: DiagnosticBag::new(),
        frame: Frame::new(),
        saved_frames: Vec::new(),
        pp_cond_stack: Vec::new(),
        in_preproc_directive: None,
    };

    // Inserted vbrace tokens must not be revisited: drive the walk off a
    // snapshot of the tokens the lexer produced, not a live arena iterator.
    let ids: Vec<ChunkId> = arena.iter().collect();
    for id in ids {
        ctx.visit(arena, id)?;
    }

    Ok(FramePassOutput {
        diagnostics: ctx.diagnostics,
    })
}

impl<'a> FramePassCtx<'a> {
    fn visit(&mut self, arena: &mut TokenArena, id: ChunkId) -> Result<(), FrameError> {
        let in_preproc_flag = arena.get(id).flags.contains(ChunkFlags::IN_PREPROC);

        // Leaving a #define body: the lexer already dropped IN_PREPROC on
        // this token, so restore the frame we set aside when we entered it.
        if self.in_preproc_directive.is_some() && !in_preproc_flag {
            if self.in_preproc_directive == Some(TokenKind::PpDefine) {
                self.pop_frame()?;
            }
            self.in_preproc_directive = None;
        }

        if arena.get(id).kind == TokenKind::PpHash {
            self.handle_preproc_start(arena, id)?;
            self.stamp(arena, id);
            return Ok(());
        }

        self.stamp(arena, id);

        if in_preproc_flag && self.in_preproc_directive == Some(TokenKind::PpDefine) {
            if arena.get(id).is_trivia() {
                return Ok(());
            }
            if self.opts.pp_ignore_define_body {
                if arena.get(id).kind != TokenKind::Ignored {
                    arena.get_mut(id).kind = TokenKind::Ignored;
                }
                return Ok(());
            }
            return self.parse_cleanup(arena, id);
        }

        if !in_preproc_flag && !arena.get(id).is_trivia() {
            return self.parse_cleanup(arena, id);
        }
        Ok(())
    }

    fn stamp(&self, arena: &mut TokenArena, id: ChunkId) {
        let tok = arena.get_mut(id);
        tok.level = self.frame.level;
        tok.brace_level = self.frame.brace_level;
        tok.pp_level = self.pp_cond_stack.len() as u32;
    }

    fn pop_frame(&mut self) -> Result<(), FrameError> {
        self.frame = self.saved_frames.pop().ok_or(FrameError::StackUnderflow)?;
        Ok(())
    }

    /// A `#` token: virtual braces and pending compound statements can't
    /// cross a preprocessor boundary, so force-close whatever is open, then
    /// dispatch on the directive that follows.
    fn handle_preproc_start(&mut self, arena: &mut TokenArena, hash_id: ChunkId) -> Result<(), FrameError> {
        if let Some(prev_id) = arena.prev_significant(hash_id) {
            let must_close = matches!(
                self.frame.top().kind,
                TokenKind::VbraceOpen
                    | TokenKind::If
                    | TokenKind::For
                    | TokenKind::Switch
                    | TokenKind::Do
                    | TokenKind::While
                    | TokenKind::DVersion
            );
            if must_close {
                self.close_statement(arena, prev_id)?;
            }
        }

        let next_id = match arena.next_significant(hash_id) {
            Some(n) => n,
            None => return Ok(()),
        };
        let next_kind = arena.get(next_id).kind;
        self.in_preproc_directive = Some(next_kind);

        match next_kind {
            TokenKind::PpDefine => {
                let outer = std::mem::replace(&mut self.frame, Frame::new());
                self.saved_frames.push(outer);
                self.frame.level = 1;
                self.frame.brace_level = 1;
                self.frame.stack.push(FrameEntry {
                    kind: TokenKind::PpDefine,
                    stage: Stage::None,
                    parent: TokenKind::None,
                });
            }
            TokenKind::PpIf | TokenKind::PpIfdef => {
                self.pp_cond_stack.push(next_kind);
            }
            TokenKind::PpEndif => {
                self.pp_cond_stack.pop();
            }
            _ => {}
        }
        Ok(())
    }

    fn parse_cleanup(&mut self, arena: &mut TokenArena, id: ChunkId) -> Result<(), FrameError> {
        let mut kind = arena.get(id).kind;
        let prev_id = arena.prev_significant(id);

        // D `version (cond) { }` vs. a bare `version = ident;` annotation:
        // the former behaves like an `if`, reusing its Paren1/Brace2 stages.
        if let Some(prev) = prev_id {
            if arena.get(prev).kind == TokenKind::DVersion && self.frame.top().kind == TokenKind::DVersion {
                if kind == TokenKind::ParenOpen {
                    self.frame.top_mut().kind = TokenKind::If;
                } else {
                    self.frame.stack.pop().ok_or(FrameError::StackUnderflow)?;
                }
            }
        }

        // Mark statement/expression starts.
        if (self.frame.stmt_count == 0 || self.frame.expr_count == 0)
            && kind != TokenKind::Semicolon
            && kind != TokenKind::BraceClose
        {
            let tok = arena.get_mut(id);
            tok.flags.set(ChunkFlags::EXPR_START);
            if self.frame.stmt_count == 0 {
                tok.flags.set(ChunkFlags::STMT_START);
            }
        }
        self.frame.stmt_count += 1;
        self.frame.expr_count += 1;

        if self.frame.sparen_count > 0 {
            arena.get_mut(id).flags.set(ChunkFlags::IN_SPAREN);
        }

        // An `else` closes any pending if-chain that didn't get one; a
        // non-`else` token when one was expected closes the chain instead.
        while self.frame.top().stage == Stage::Else {
            if kind == TokenKind::Else {
                let top = self.frame.top_mut();
                top.kind = TokenKind::Else;
                top.stage = Stage::ElseIf;
                return Ok(());
            }
            match prev_id {
                Some(prev) => self.close_statement(arena, prev)?,
                None => break,
            }
        }

        // `else if` rewrites the frame back into a fresh `if`; any other
        // token after `else` means its body starts now.
        if self.frame.top().kind == TokenKind::Else && self.frame.top().stage == Stage::ElseIf {
            if kind == TokenKind::If {
                let top = self.frame.top_mut();
                top.kind = TokenKind::If;
                top.stage = Stage::Paren1;
                return Ok(());
            }
            self.frame.top_mut().stage = Stage::Brace2;
        }

        // `do { } while` — the `while` closing a do-loop moves to Paren2;
        // anything else at this stage is a malformed do-loop.
        if self.frame.top().stage == Stage::While {
            if kind == TokenKind::While {
                self.frame.top_mut().stage = Stage::Paren2;
                return Ok(());
            }
            self.diagnostics.push(Diagnostic::warning(
                arena.get(id).span,
                "FRAME-WHILE",
                format!("expected 'while' to close do-loop, found {kind:?}"),
            ));
            self.frame.stack.pop().ok_or(FrameError::StackUnderflow)?;
        }

        // Insert a virtual brace over a brace-less compound-statement body.
        let top_stage = self.frame.top().stage;
        if matches!(top_stage, Stage::BraceDo | Stage::Brace2) && kind != TokenKind::BraceOpen {
            let parent = self.frame.top().kind;
            self.insert_vbrace_open(arena, id, parent);
        }

        if kind == TokenKind::Semicolon {
            self.close_statement(arena, id)?;
        }

        if let Some(prev) = prev_id {
            let prev_kind = arena.get(prev).kind;
            let prev_parent = arena.get(prev).parent_kind;
            let prev_text_is_assign = prev_kind == TokenKind::Assign && arena.get(prev).text == "=";

            if prev_text_is_assign && kind == TokenKind::BraceOpen {
                arena.get_mut(id).parent_kind = TokenKind::Assign;
            }

            if kind == TokenKind::ParenOpen {
                if prev_kind == TokenKind::Word {
                    arena.get_mut(prev).kind = TokenKind::Function;
                    let t = arena.get_mut(id);
                    t.kind = TokenKind::FparenOpen;
                    t.parent_kind = TokenKind::Function;
                    kind = TokenKind::FparenOpen;
                } else if matches!(
                    prev_kind,
                    TokenKind::If | TokenKind::For | TokenKind::While | TokenKind::Switch
                ) {
                    let t = arena.get_mut(id);
                    t.kind = TokenKind::SparenOpen;
                    t.parent_kind = prev_kind;
                    kind = TokenKind::SparenOpen;
                    self.frame.sparen_count += 1;
                }
            }

            if kind == TokenKind::BraceOpen {
                let parent = if prev_kind == TokenKind::FparenClose {
                    Some(TokenKind::Function)
                } else if prev_kind == TokenKind::SparenClose {
                    Some(prev_parent)
                } else if matches!(prev_kind, TokenKind::Else | TokenKind::Do | TokenKind::DVersion) {
                    Some(prev_kind)
                } else {
                    None
                };
                if let Some(p) = parent {
                    arena.get_mut(id).parent_kind = p;
                }
            }
        }

        // A bare `)` needs retagging to match whichever open it's closing
        // before the generic close-bracket handling below can recognize it.
        if kind == TokenKind::ParenClose {
            let top_kind = self.frame.top().kind;
            if matches!(
                top_kind,
                TokenKind::ParenOpen | TokenKind::FparenOpen | TokenKind::SparenOpen
            ) {
                let retagged = top_kind
                    .matching_close()
                    .expect("ParenOpen/FparenOpen/SparenOpen all have a matching close");
                arena.get_mut(id).kind = retagged;
                kind = retagged;
            }
        }

        if matches!(
            kind,
            TokenKind::ParenClose
                | TokenKind::FparenClose
                | TokenKind::SparenClose
                | TokenKind::SquareClose
                | TokenKind::BraceClose
        ) {
            let top = self.frame.top();
            if top.kind.matching_close() == Some(kind) {
                self.frame.stack.pop().ok_or(FrameError::StackUnderflow)?;
                self.frame.level = self.frame.level.saturating_sub(1);
                if kind == TokenKind::BraceClose {
                    self.frame.brace_level = self.frame.brace_level.saturating_sub(1);
                }
                if kind == TokenKind::SparenClose {
                    self.frame.sparen_count = self.frame.sparen_count.saturating_sub(1);
                }
                {
                    let t = arena.get_mut(id);
                    t.parent_kind = top.parent;
                    t.level = self.frame.level;
                    t.brace_level = self.frame.brace_level;
                    if kind == TokenKind::SparenClose {
                        t.flags.clear(ChunkFlags::IN_SPAREN);
                    }
                }
                self.handle_close_stage(arena, id)?;
            } else {
                self.diagnostics.push(Diagnostic::warning(
                    arena.get(id).span,
                    "FRAME-UNBALANCED",
                    format!("unexpected {kind:?}, frame stack top is {:?}", top.kind),
                ));
            }
        }

        if matches!(
            kind,
            TokenKind::ParenOpen
                | TokenKind::FparenOpen
                | TokenKind::SparenOpen
                | TokenKind::BraceOpen
                | TokenKind::SquareOpen
        ) {
            let parent = arena.get(id).parent_kind;
            self.frame.level += 1;
            if kind == TokenKind::BraceOpen {
                self.frame.brace_level += 1;
            }
            self.frame.stack.push(FrameEntry {
                kind,
                stage: Stage::None,
                parent,
            });
        }

        if matches!(
            kind,
            TokenKind::If | TokenKind::Do | TokenKind::For | TokenKind::While | TokenKind::Switch | TokenKind::DVersion
        ) {
            let stage = if kind == TokenKind::Do { Stage::BraceDo } else { Stage::Paren1 };
            self.frame.stack.push(FrameEntry {
                kind,
                stage,
                parent: TokenKind::None,
            });
        }

        let reset_both = (kind == TokenKind::BraceOpen && arena.get(id).parent_kind != TokenKind::Assign)
            || kind == TokenKind::BraceClose
            || (kind == TokenKind::SparenOpen && arena.get(id).parent_kind == TokenKind::For)
            || (kind == TokenKind::Semicolon
                && !matches!(
                    self.frame.top().kind,
                    TokenKind::ParenOpen | TokenKind::FparenOpen | TokenKind::SparenOpen
                ));
        if reset_both {
            self.frame.stmt_count = 0;
            self.frame.expr_count = 0;
        }

        let reset_expr_only = matches!(
            kind,
            TokenKind::Arith
                | TokenKind::Assign
                | TokenKind::Compare
                | TokenKind::AngleOpen
                | TokenKind::AngleClose
                | TokenKind::Return
                | TokenKind::Goto
                | TokenKind::Continue
                | TokenKind::ParenOpen
                | TokenKind::FparenOpen
                | TokenKind::SparenOpen
                | TokenKind::BraceOpen
                | TokenKind::Semicolon
                | TokenKind::Comma
                | TokenKind::Colon
                | TokenKind::Question
        );
        if reset_expr_only {
            self.frame.expr_count = 0;
        }

        Ok(())
    }

    fn insert_vbrace_open(&mut self, arena: &mut TokenArena, at: ChunkId, parent: TokenKind) {
        let pos = arena.get(at).span.start;
        let mut vb = Token::new(TokenKind::VbraceOpen, "", Span::new(pos, pos));
        vb.parent_kind = parent;
        vb.level = self.frame.level;
        vb.brace_level = self.frame.brace_level;
        arena.insert_before(at, vb);

        self.frame.level += 1;
        self.frame.brace_level += 1;
        self.frame.stack.push(FrameEntry {
            kind: TokenKind::VbraceOpen,
            stage: Stage::None,
            parent,
        });

        let tok = arena.get_mut(at);
        tok.level = self.frame.level;
        tok.brace_level = self.frame.brace_level;
        tok.flags.set(ChunkFlags::STMT_START);
        tok.flags.set(ChunkFlags::EXPR_START);
        self.frame.stmt_count = 1;
        self.frame.expr_count = 1;
    }

    /// Called on whatever ends a statement: a real `;`, a real `}`, or (via
    /// recursion from [`Self::handle_close_stage`]) the close of an enclosing
    /// compound statement whose own body just ended.
    fn close_statement(&mut self, arena: &mut TokenArena, id: ChunkId) -> Result<(), FrameError> {
        let kind = arena.get(id).kind;

        if kind != TokenKind::VbraceClose {
            self.frame.expr_count = 1;
            if self.frame.top().kind != TokenKind::SparenOpen {
                self.frame.stmt_count = 1;
            }
        }

        if matches!(self.frame.top().stage, Stage::Paren2 | Stage::Brace2 | Stage::Else) {
            self.frame.stack.pop().ok_or(FrameError::StackUnderflow)?;
            self.handle_close_stage(arena, id)?;
        }

        if self.frame.top().kind == TokenKind::VbraceOpen {
            self.frame.level = self.frame.level.saturating_sub(1);
            self.frame.brace_level = self.frame.brace_level.saturating_sub(1);
            self.frame.stack.pop().ok_or(FrameError::StackUnderflow)?;
            let parent = self.frame.top().kind;

            let pos = arena.get(id).span.end;
            let mut vb = Token::new(TokenKind::VbraceClose, "", Span::new(pos, pos));
            vb.parent_kind = parent;
            vb.level = self.frame.level;
            vb.brace_level = self.frame.brace_level;
            let vb_id = arena.insert_after(id, vb);

            self.frame.stmt_count = 1;
            self.frame.expr_count = 1;
            self.handle_close_stage(arena, vb_id)?;
        }
        Ok(())
    }

    fn handle_close_stage(&mut self, arena: &mut TokenArena, id: ChunkId) -> Result<(), FrameError> {
        let stage = self.frame.top().stage;
        match stage {
            Stage::Paren1 => {
                self.frame.top_mut().stage = Stage::Brace2;
            }
            Stage::Paren2 => {
                self.close_statement(arena, id)?;
            }
            Stage::BraceDo => {
                self.frame.top_mut().stage = Stage::While;
            }
            Stage::Brace2 => {
                if self.frame.top().kind == TokenKind::If {
                    self.frame.top_mut().stage = Stage::Else;
                } else {
                    self.close_statement(arena, id)?;
                }
            }
            Stage::Else | Stage::While => {
                self.diagnostics.push(Diagnostic::warning(
                    arena.get(id).span,
                    "FRAME-STAGE",
                    format!("unexpected stage {stage:?} while closing a statement"),
                ));
            }
            Stage::None | Stage::ElseIf => {}
        }
        Ok(())
    }
}
