//! Sweep 1 (§4.5): local contextual fixes — brace-parent attribution that
//! needs more than the frame pass's single-token lookback, ambiguous
//! operator disambiguation, angle-vs-compare/template resolution, C-style
//! and named-cast recognition, and enum/struct/union/class/namespace name
//! + body tagging.

use uncrustify_common::arena::{ChunkId, TokenArena};
use uncrustify_common::diagnostic::{Diagnostic, DiagnosticBag};
use uncrustify_common::flags::ChunkFlags;
use uncrustify_common::options::Options;
use uncrustify_common::token_kind::TokenKind;

pub fn run(arena: &mut TokenArena, opts: &Options, diagnostics: &mut DiagnosticBag) {
    let _ = opts;
    let ids: Vec<ChunkId> = arena.iter().collect();

    classify_struct_enum_bodies(arena, &ids);
    resolve_angles(arena, &ids);
    detect_named_casts(arena, &ids);
    detect_c_style_casts(arena, &ids);
    disambiguate_operators(arena, &ids, diagnostics);
}

/// `enum`/`struct`/`union`/`class`/`namespace` followed by an identifier
/// reclassifies that identifier as `TYPE`; the following `{...}` (if any —
/// a forward declaration has none) gets the matching `IN_*` flag set on
/// every token it encloses.
fn classify_struct_enum_bodies(arena: &mut TokenArena, ids: &[ChunkId]) {
    for &id in ids {
        let kind = arena.get(id).kind;
        let body_flag = match kind {
            TokenKind::Enum => ChunkFlags::IN_ENUM,
            TokenKind::Struct | TokenKind::Union => ChunkFlags::IN_STRUCT,
            TokenKind::Class => ChunkFlags::IN_CLASS,
            _ => continue,
        };

        let Some(name_id) = arena.next_significant(id) else { continue };
        if arena.get(name_id).kind == TokenKind::Word {
            arena.get_mut(name_id).kind = TokenKind::Type;
        }

        // Scan forward to either a terminating `;` (forward declaration —
        // nothing to tag) or the body's opening brace.
        let mut cur = arena.next(name_id);
        while let Some(cid) = cur {
            match arena.get(cid).kind {
                TokenKind::Semicolon => break,
                TokenKind::BraceOpen => {
                    tag_body(arena, cid, body_flag);
                    break;
                }
                _ => {}
            }
            cur = arena.next(cid);
        }
    }

    // `namespace Foo { ... }` carries no dedicated IN_* bit in §3's flag
    // list, but the name still becomes a TYPE per the same rule.
    for &id in ids {
        if arena.get(id).kind != TokenKind::Namespace {
            continue;
        }
        if let Some(name_id) = arena.next_significant(id) {
            if arena.get(name_id).kind == TokenKind::Word {
                arena.get_mut(name_id).kind = TokenKind::Type;
            }
        }
    }
}

fn tag_body(arena: &mut TokenArena, open_id: ChunkId, flag: ChunkFlags) {
    let mut depth: u32 = 1;
    let mut cur = arena.next(open_id);
    while let Some(id) = cur {
        match arena.get(id).kind {
            TokenKind::BraceOpen => depth += 1,
            TokenKind::BraceClose => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            _ => {}
        }
        arena.get_mut(id).flags.set(flag);
        cur = arena.next(id);
    }
}

/// `<...>` is tentatively an angle pair only if the preceding token can
/// head a template and the enclosed content contains only identifier/type/
/// member/star/qualifier/comma tokens (no `==`, no `;`, no unbalanced
/// parens); otherwise every `<`/`>` in the pair reverts to `COMPARE`.
fn resolve_angles(arena: &mut TokenArena, ids: &[ChunkId]) {
    let mut resolved = vec![false; ids.len()];
    let index_of: std::collections::HashMap<ChunkId, usize> =
        ids.iter().enumerate().map(|(i, &id)| (id, i)).collect();

    for &id in ids {
        if arena.get(id).kind != TokenKind::AngleOpen {
            continue;
        }
        let head_ok = arena
            .prev_significant(id)
            .map(|p| matches!(arena.get(p).kind, TokenKind::Word | TokenKind::Type | TokenKind::Template))
            .unwrap_or(false);
        if !head_ok {
            continue;
        }

        let mut depth = 1u32;
        let mut cur = arena.next(id);
        let mut close_id = None;
        let mut ok = true;
        while let Some(cid) = cur {
            let k = arena.get(cid).kind;
            if arena.get(cid).is_trivia() {
                cur = arena.next(cid);
                continue;
            }
            match k {
                TokenKind::AngleOpen => depth += 1,
                TokenKind::AngleClose => {
                    depth -= 1;
                    if depth == 0 {
                        close_id = Some(cid);
                        break;
                    }
                }
                TokenKind::Word
                | TokenKind::Type
                | TokenKind::Qualifier
                | TokenKind::Member
                | TokenKind::Star
                | TokenKind::PtrType
                | TokenKind::Amp
                | TokenKind::ByRef
                | TokenKind::ColonColon
                | TokenKind::Comma
                | TokenKind::Number
                | TokenKind::Template => {}
                _ => {
                    ok = false;
                    break;
                }
            }
            cur = arena.next(cid);
        }

        if ok {
            if let Some(close) = close_id {
                mark_resolved(&mut resolved, &index_of, id);
                mark_resolved(&mut resolved, &index_of, close);
                arena.get_mut(id).parent_kind = TokenKind::Template;
                arena.get_mut(close).parent_kind = TokenKind::Template;
                let mut cur = arena.next(id);
                while let Some(cid) = cur {
                    if cid == close {
                        break;
                    }
                    arena.get_mut(cid).flags.set(ChunkFlags::IN_TEMPLATE);
                    if arena.get(cid).kind == TokenKind::Word {
                        arena.get_mut(cid).kind = TokenKind::Type;
                    }
                    cur = arena.next(cid);
                }
            }
        }
    }

    for (i, &id) in ids.iter().enumerate() {
        if resolved[i] {
            continue;
        }
        match arena.get(id).kind {
            TokenKind::AngleOpen | TokenKind::AngleClose => {
                arena.get_mut(id).kind = TokenKind::Compare;
            }
            _ => {}
        }
    }
}

fn mark_resolved(resolved: &mut [bool], index_of: &std::collections::HashMap<ChunkId, usize>, id: ChunkId) {
    if let Some(&i) = index_of.get(&id) {
        resolved[i] = true;
    }
}

/// `dynamic_cast`/`static_cast`/`const_cast`/`reinterpret_cast` followed by
/// a resolved angle pair and a parenthesized operand become `TYPE_CAST`.
/// These spellings are plain identifiers to the keyword table (C++ does
/// not reserve them), so this is a text match rather than a kind match.
fn detect_named_casts(arena: &mut TokenArena, ids: &[ChunkId]) {
    const NAMED_CASTS: &[&str] = &["dynamic_cast", "static_cast", "const_cast", "reinterpret_cast"];
    for &id in ids {
        let tok = arena.get(id);
        if tok.kind != TokenKind::Word || !NAMED_CASTS.contains(&tok.text.as_str()) {
            continue;
        }
        let Some(angle_open) = arena.next_significant(id) else { continue };
        if arena.get(angle_open).kind != TokenKind::AngleOpen {
            continue;
        }
        arena.get_mut(id).kind = TokenKind::TypeCast;
    }
}

/// A `(` whose content is a comma-free, type-like token sequence, sitting
/// where an expression (not a call/subscript) may start, becomes a C-style
/// cast. Per §4.5's error semantics, an inconclusive match declines rather
/// than guessing: `FUNC_CALL` wins over `FUNC_DEF`-style readings and
/// `COMPARE` wins over `ANGLE`, so here a paren that could be either a
/// cast or a grouped expression is left alone (not retagged) when the
/// position after it doesn't look like the start of an operand.
fn detect_c_style_casts(arena: &mut TokenArena, ids: &[ChunkId]) {
    for &id in ids {
        if arena.get(id).kind != TokenKind::ParenOpen {
            continue;
        }

        // Position: not directly after a value (that would be a call or a
        // grouped sub-expression's trailer), but where an operand is
        // expected.
        if let Some(prev) = arena.prev_significant(id) {
            let blocks_cast = matches!(
                arena.get(prev).kind,
                TokenKind::Word
                    | TokenKind::FparenClose
                    | TokenKind::SparenClose
                    | TokenKind::ParenClose
                    | TokenKind::BraceClose
                    | TokenKind::SquareClose
                    | TokenKind::Number
                    | TokenKind::NumberFp
                    | TokenKind::String
                    | TokenKind::Char
            );
            if blocks_cast {
                continue;
            }
        }

        let mut content = Vec::new();
        let mut cur = arena.next(id);
        let mut close_id = None;
        let mut plausible = true;
        while let Some(cid) = cur {
            if arena.get(cid).is_trivia() {
                cur = arena.next(cid);
                continue;
            }
            match arena.get(cid).kind {
                TokenKind::ParenClose => {
                    close_id = Some(cid);
                    break;
                }
                TokenKind::Type
                | TokenKind::Qualifier
                | TokenKind::Star
                | TokenKind::PtrType
                | TokenKind::ColonColon => content.push(cid),
                TokenKind::Word if content.is_empty() => content.push(cid),
                _ => {
                    plausible = false;
                    break;
                }
            }
            cur = arena.next(cid);
        }

        let Some(close_id) = close_id else { continue };
        if !plausible || content.is_empty() {
            continue;
        }

        // Only one bare WORD may appear, and only as the leading type name
        // (an unrecognized user type); anything after it must already look
        // type-like.
        let word_count = content
            .iter()
            .filter(|&&cid| arena.get(cid).kind == TokenKind::Word)
            .count();
        if word_count > 1 {
            continue;
        }

        let Some(after) = arena.next_significant(close_id) else { continue };
        let operand_starts = matches!(
            arena.get(after).kind,
            TokenKind::Word
                | TokenKind::Number
                | TokenKind::NumberFp
                | TokenKind::String
                | TokenKind::Char
                | TokenKind::ParenOpen
                | TokenKind::Star
                | TokenKind::Amp
                | TokenKind::Plus
                | TokenKind::Minus
                | TokenKind::Sizeof
                | TokenKind::Macro
        );
        if !operand_starts {
            continue;
        }

        arena.get_mut(id).parent_kind = TokenKind::CCast;
        arena.get_mut(close_id).parent_kind = TokenKind::CCast;
        for cid in content {
            if arena.get(cid).kind == TokenKind::Word {
                arena.get_mut(cid).kind = TokenKind::Type;
            }
        }
    }
}

/// `*`, `&`, `^`, `+`, `-` are ambiguous until now. Resolve by neighbor:
/// after a type/qualifier/pointer-type/`::` -> `PTR_TYPE` (`BYREF` for
/// `&`); after a close-paren that just became a cast -> `DEREF`; at the
/// start of an expression -> unary (`DEREF`/`ADDR`/`POS`/`NEG`); otherwise
/// binary `ARITH`.
fn disambiguate_operators(arena: &mut TokenArena, ids: &[ChunkId], diagnostics: &mut DiagnosticBag) {
    let _ = diagnostics;
    for &id in ids {
        let kind = arena.get(id).kind;
        if !matches!(
            kind,
            TokenKind::Star | TokenKind::Amp | TokenKind::Caret | TokenKind::Plus | TokenKind::Minus
        ) {
            continue;
        }

        let prev = arena.prev_significant(id);
        let type_context = prev
            .map(|p| {
                matches!(
                    arena.get(p).kind,
                    TokenKind::Type | TokenKind::Qualifier | TokenKind::PtrType | TokenKind::ByRef | TokenKind::ColonColon
                ) || arena.get(p).flags.contains(ChunkFlags::VAR_TYPE)
            })
            .unwrap_or(false);

        let after_cast_close = prev
            .map(|p| {
                matches!(arena.get(p).kind, TokenKind::ParenClose)
                    && matches!(arena.get(p).parent_kind, TokenKind::CCast | TokenKind::TypeCast)
            })
            .unwrap_or(false);

        let expr_start = arena.get(id).flags.contains(ChunkFlags::EXPR_START);

        let new_kind = if type_context && matches!(kind, TokenKind::Star) {
            TokenKind::PtrType
        } else if type_context && matches!(kind, TokenKind::Amp) {
            TokenKind::ByRef
        } else if after_cast_close || expr_start {
            match kind {
                TokenKind::Star => TokenKind::Deref,
                TokenKind::Amp => TokenKind::Addr,
                TokenKind::Plus => TokenKind::Pos,
                TokenKind::Minus => TokenKind::Neg,
                TokenKind::Caret => TokenKind::Arith,
                _ => unreachable!(),
            }
        } else {
            TokenKind::Arith
        };

        arena.get_mut(id).kind = new_kind;
    }
}
