//! Sweep 2 (§4.5): function / variable / typedef recognition.
//!
//! The frame pass already retags a bare `WORD` immediately before a `(` as
//! `FUNCTION` and its paren pair as `FPAREN_OPEN`/`FPAREN_CLOSE` (§4.4 point
//! 5) — a cheap syntactic heuristic with no notion of return types or
//! bodies. This sweep refines every such `FUNCTION` token into the precise
//! label (`FUNC_DEF`/`FUNC_PROTO`/`FUNC_CALL`/`FUNC_CLASS_DEF`/
//! `FUNC_CLASS_PROTO`/`FUNC_CTOR_VAR`), tags its parameter list, and
//! separately detects the function-pointer/function-type shape the frame
//! pass's single-token lookback can't see at all (`void (*name)(args)`).

use uncrustify_common::arena::{ChunkId, TokenArena};
use uncrustify_common::diagnostic::DiagnosticBag;
use uncrustify_common::flags::ChunkFlags;
use uncrustify_common::token_kind::TokenKind;

pub fn run(arena: &mut TokenArena, diagnostics: &mut DiagnosticBag) {
    let _ = diagnostics;
    let ids: Vec<ChunkId> = arena.iter().collect();

    for &id in &ids {
        if arena.get(id).kind == TokenKind::Function {
            classify_function(arena, id);
        }
    }

    detect_function_pointers(arena, &ids);
}

/// Walk left from `name_id` over pointer/ref/qualifier/type/`::` tokens to
/// find the head of a return type. Stops at anything that can't appear in
/// a declaration. A leading unrecognized `WORD` counts too (the "Foo bar(...)"
/// shape, mirroring sweep 3's treatment of user type names that never made
/// it into the keyword table). Returns whether a type-like head was found.
fn has_type_head(arena: &TokenArena, name_id: ChunkId) -> bool {
    let mut cur = arena.prev_significant(name_id);
    let mut saw_type = false;
    while let Some(id) = cur {
        match arena.get(id).kind {
            TokenKind::Type | TokenKind::Qualifier | TokenKind::PtrType | TokenKind::ByRef | TokenKind::ColonColon => {
                saw_type = true;
                cur = arena.prev_significant(id);
            }
            TokenKind::Word if !saw_type => {
                saw_type = true;
                break;
            }
            _ => break,
        }
    }
    saw_type
}

/// The name of the nearest enclosing `class`/`struct`, if `name_id` sits
/// directly inside one — used to detect constructors (§4.5 sweep 2 point
/// 2: "Constructors are detected by matching the enclosing class name").
fn enclosing_class_name(arena: &TokenArena, name_id: ChunkId) -> Option<String> {
    let target = arena.get(name_id).brace_level;
    if target == 0 {
        return None;
    }
    let mut cur = arena.prev(name_id);
    while let Some(cid) = cur {
        let tok = arena.get(cid);
        if tok.kind == TokenKind::BraceOpen && tok.brace_level + 1 == target {
            if let Some(kw_id) = find_class_keyword_before(arena, cid) {
                if let Some(class_name) = arena.next_significant(kw_id) {
                    return Some(arena.get(class_name).text.clone());
                }
            }
            return None;
        }
        cur = arena.prev(cid);
    }
    None
}

/// Scan backward from a body's `{` across an optional base-class list for
/// the `class`/`struct` keyword that opened it.
fn find_class_keyword_before(arena: &TokenArena, brace_open: ChunkId) -> Option<ChunkId> {
    let mut cur = arena.prev_significant(brace_open);
    while let Some(id) = cur {
        match arena.get(id).kind {
            TokenKind::Class | TokenKind::Struct => return Some(id),
            TokenKind::Semicolon => return None,
            _ => cur = arena.prev_significant(id),
        }
    }
    None
}

/// Whether the content between `open`/`close` looks like prototype
/// parameters (types/names) or like call arguments (literals, bare `&x`,
/// nested calls) — used to downgrade a function-shaped declaration at
/// statement scope into `FUNC_CTOR_VAR` per scenario 5 of §8.
fn params_look_like_call_args(arena: &TokenArena, open: ChunkId, close: ChunkId) -> bool {
    let mut cur = arena.next(open);
    while let Some(id) = cur {
        if id == close {
            break;
        }
        if !arena.get(id).is_trivia() {
            match arena.get(id).kind {
                TokenKind::Number | TokenKind::NumberFp | TokenKind::String | TokenKind::Char => return true,
                TokenKind::FparenOpen | TokenKind::Function => return true,
                _ => {}
            }
        }
        cur = arena.next(id);
    }
    false
}

fn find_matching_close(arena: &TokenArena, open: ChunkId, open_kind: TokenKind, close_kind: TokenKind) -> Option<ChunkId> {
    let mut depth = 1u32;
    let mut cur = arena.next(open);
    while let Some(id) = cur {
        let k = arena.get(id).kind;
        if k == open_kind {
            depth += 1;
        } else if k == close_kind {
            depth -= 1;
            if depth == 0 {
                return Some(id);
            }
        }
        cur = arena.next(id);
    }
    None
}

fn classify_function(arena: &mut TokenArena, name_id: ChunkId) {
    let Some(fparen_open) = arena.next_significant(name_id) else { return };
    if arena.get(fparen_open).kind != TokenKind::FparenOpen {
        return;
    }
    let Some(fparen_close) = find_matching_close(arena, fparen_open, TokenKind::FparenOpen, TokenKind::FparenClose) else {
        return;
    };

    let type_head = has_type_head(arena, name_id);
    let class_name = enclosing_class_name(arena, name_id);
    let is_ctor_name = class_name.as_deref() == Some(arena.get(name_id).text.as_str());
    let call_shaped_args = params_look_like_call_args(arena, fparen_open, fparen_close);
    let after = arena.next_significant(fparen_close);

    let new_kind = if !type_head && !is_ctor_name {
        TokenKind::FuncCall
    } else {
        match after.map(|a| arena.get(a).kind) {
            Some(TokenKind::BraceOpen) => {
                if is_ctor_name {
                    TokenKind::FuncClassDef
                } else {
                    TokenKind::FuncDef
                }
            }
            Some(TokenKind::Semicolon) => {
                if call_shaped_args {
                    TokenKind::FuncCtorVar
                } else if is_ctor_name {
                    TokenKind::FuncClassProto
                } else {
                    TokenKind::FuncProto
                }
            }
            _ => TokenKind::FuncCall,
        }
    };

    arena.get_mut(name_id).kind = new_kind;
    if matches!(new_kind, TokenKind::FuncDef | TokenKind::FuncClassDef) {
        arena.get_mut(name_id).flags.set(ChunkFlags::IN_FCN_DEF);
        arena.get_mut(fparen_open).parent_kind = new_kind;
        arena.get_mut(fparen_close).parent_kind = new_kind;
        fix_fcn_def_params(arena, fparen_open, fparen_close);
    } else if matches!(new_kind, TokenKind::FuncProto | TokenKind::FuncClassProto) {
        arena.get_mut(fparen_open).parent_kind = new_kind;
        arena.get_mut(fparen_close).parent_kind = new_kind;
        fix_fcn_def_params(arena, fparen_open, fparen_close);
    } else if new_kind == TokenKind::FuncCtorVar {
        arena.get_mut(name_id).flags.set(ChunkFlags::VAR_1ST_DEF);
    } else {
        arena.get_mut(fparen_open).parent_kind = TokenKind::FuncCall;
        arena.get_mut(fparen_close).parent_kind = TokenKind::FuncCall;
        let mut cur = arena.next(fparen_open);
        while let Some(id) = cur {
            if id == fparen_close {
                break;
            }
            arena.get_mut(id).flags.set(ChunkFlags::IN_FCN_CALL);
            cur = arena.next(id);
        }
    }
}

/// Within a prototype/definition's parameter list, turn each `WORD WORD`
/// run into `TYPE name`, tag `*`/`&` as `PTR_TYPE`/`BYREF`, and mark the
/// declared name `VAR_1ST_DEF`/`VAR_DEF` (§4.5 sweep 2 point 3).
fn fix_fcn_def_params(arena: &mut TokenArena, open: ChunkId, close: ChunkId) {
    let mut run: Vec<ChunkId> = Vec::new();
    let mut cur = arena.next_significant(open);
    loop {
        match cur {
            None => break,
            Some(id) if id == close => break,
            Some(id) => {
                if arena.get(id).kind == TokenKind::Comma {
                    finalize_param(arena, &run);
                    run.clear();
                } else {
                    run.push(id);
                }
                cur = arena.next_significant(id);
            }
        }
    }
    finalize_param(arena, &run);
}

fn finalize_param(arena: &mut TokenArena, run: &[ChunkId]) {
    let Some(&last) = run.last() else { return };
    if arena.get(last).kind != TokenKind::Word {
        return;
    }
    arena.get_mut(last).flags.set(ChunkFlags::VAR_1ST_DEF);
    arena.get_mut(last).flags.set(ChunkFlags::VAR_1ST);
    for &id in &run[..run.len() - 1] {
        match arena.get(id).kind {
            TokenKind::Star => arena.get_mut(id).kind = TokenKind::PtrType,
            TokenKind::Amp => arena.get_mut(id).kind = TokenKind::ByRef,
            TokenKind::Word => arena.get_mut(id).kind = TokenKind::Type,
            _ => {}
        }
        arena.get_mut(id).flags.set(ChunkFlags::VAR_TYPE);
    }
}

/// `void (*name)(args)`: a paren pair immediately followed by another paren
/// pair, the first containing only pointer-ops and a single name. Retag the
/// inner parens `TPAREN_OPEN`/`CLOSE`, the `*` as `PTR_TYPE`, and the outer
/// pair as `FPAREN_OPEN`/`CLOSE` (§4.5 sweep 2 point 4).
fn detect_function_pointers(arena: &mut TokenArena, ids: &[ChunkId]) {
    for &inner_open in ids {
        if arena.get(inner_open).kind != TokenKind::ParenOpen {
            continue;
        }
        let Some(inner_close) = find_matching_close(arena, inner_open, TokenKind::ParenOpen, TokenKind::ParenClose) else {
            continue;
        };
        let Some(outer_open) = arena.next_significant(inner_close) else { continue };
        if arena.get(outer_open).kind != TokenKind::ParenOpen {
            continue;
        }

        let mut content: Vec<ChunkId> = Vec::new();
        let mut cur = arena.next(inner_open);
        let mut ok = true;
        while let Some(id) = cur {
            if id == inner_close {
                break;
            }
            if !arena.get(id).is_trivia() {
                match arena.get(id).kind {
                    TokenKind::Star | TokenKind::Amp | TokenKind::Word => content.push(id),
                    _ => {
                        ok = false;
                        break;
                    }
                }
            }
            cur = arena.next(id);
        }
        let has_name = content.last().map(|&id| arena.get(id).kind == TokenKind::Word).unwrap_or(false);
        if !ok || !has_name {
            continue;
        }
        let Some(outer_close) = find_matching_close(arena, outer_open, TokenKind::ParenOpen, TokenKind::ParenClose) else {
            continue;
        };

        arena.get_mut(inner_open).kind = TokenKind::TparenOpen;
        arena.get_mut(inner_close).kind = TokenKind::TparenClose;
        for &id in &content {
            if arena.get(id).kind == TokenKind::Star {
                arena.get_mut(id).kind = TokenKind::PtrType;
            }
        }
        if let Some(&name_id) = content.last() {
            arena.get_mut(name_id).flags.set(ChunkFlags::VAR_1ST_DEF);
        }
        arena.get_mut(outer_open).kind = TokenKind::FparenOpen;
        arena.get_mut(outer_close).kind = TokenKind::FparenClose;
        fix_fcn_def_params(arena, outer_open, outer_close);
    }
}
