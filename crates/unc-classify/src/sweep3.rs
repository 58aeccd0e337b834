//! Sweep 3 (§4.5): variable declarations.
//!
//! At each `STMT_START` beginning with `QUALIFIER`/`TYPE`/`WORD`, outside
//! `[ ]` and outside an `enum` body, repeatedly collect type-like tokens
//! (including a leading unrecognized `WORD` acting as a user type name),
//! stopping at the token that names the variable; walk forward from there
//! marking every additional declarator up to `;`.

use uncrustify_common::arena::{ChunkId, TokenArena};
use uncrustify_common::flags::ChunkFlags;
use uncrustify_common::token_kind::{BracketRole, TokenKind};

pub fn run(arena: &mut TokenArena) {
    let ids: Vec<ChunkId> = arena.iter().collect();
    let mut bracket_stack: Vec<TokenKind> = Vec::new();

    for id in ids {
        let kind = arena.get(id).kind;
        if let Some(role) = kind.bracket_role() {
            match role {
                BracketRole::Open => bracket_stack.push(kind),
                BracketRole::Close => {
                    bracket_stack.pop();
                }
            }
            continue;
        }

        let in_square = matches!(bracket_stack.last(), Some(TokenKind::SquareOpen) | Some(TokenKind::TsquareOpen));
        if in_square {
            continue;
        }
        if !arena.get(id).flags.contains(ChunkFlags::STMT_START) {
            continue;
        }
        if arena.get(id).flags.contains(ChunkFlags::IN_ENUM) {
            continue;
        }
        if matches!(kind, TokenKind::Qualifier | TokenKind::Type | TokenKind::Word) {
            try_variable_decl(arena, id);
        }
    }
}

fn try_variable_decl(arena: &mut TokenArena, start_id: ChunkId) {
    let mut type_tokens: Vec<ChunkId> = Vec::new();
    let mut cur = Some(start_id);
    let name_id;
    loop {
        let Some(id) = cur else { return };
        match arena.get(id).kind {
            TokenKind::Type | TokenKind::Qualifier | TokenKind::PtrType | TokenKind::ByRef | TokenKind::ColonColon => {
                type_tokens.push(id);
                cur = arena.next_significant(id);
            }
            TokenKind::Word => {
                let next_continues = arena
                    .next_significant(id)
                    .map(|n| matches!(arena.get(n).kind, TokenKind::Word | TokenKind::Star | TokenKind::Amp | TokenKind::ColonColon))
                    .unwrap_or(false);
                if next_continues && type_tokens.is_empty() {
                    type_tokens.push(id);
                    cur = arena.next_significant(id);
                    continue;
                }
                name_id = id;
                break;
            }
            _ => return,
        }
    }

    if type_tokens.is_empty() {
        // A bare `WORD` at statement start with nothing type-like before
        // or after it is more likely a label/call than a declaration;
        // decline rather than guess, per §4.5's error semantics.
        return;
    }

    for &id in &type_tokens {
        arena.get_mut(id).flags.set(ChunkFlags::VAR_TYPE);
        if arena.get(id).kind == TokenKind::Word {
            arena.get_mut(id).kind = TokenKind::Type;
        }
    }
    {
        let tok = arena.get_mut(name_id);
        tok.flags.set(ChunkFlags::VAR_1ST_DEF);
        tok.flags.set(ChunkFlags::VAR_1ST);
        tok.flags.set(ChunkFlags::VAR_DEF);
    }

    let mut cur = arena.next_significant(name_id);
    loop {
        let Some(id) = cur else { break };
        match arena.get(id).kind {
            TokenKind::Semicolon => break,
            TokenKind::Assign => {
                cur = skip_initializer(arena, id);
            }
            TokenKind::Comma => {
                let Some(next_name) = arena.next_significant(id) else { break };
                if arena.get(next_name).kind != TokenKind::Word {
                    break;
                }
                arena.get_mut(next_name).flags.set(ChunkFlags::VAR_DEF);
                cur = arena.next_significant(next_name);
            }
            TokenKind::Star | TokenKind::PtrType | TokenKind::Amp | TokenKind::ByRef => {
                cur = arena.next_significant(id);
            }
            _ => break,
        }
    }
}

/// Skip past an initializer expression to the next `,`/`;` at the same
/// bracket depth the initializer started at.
fn skip_initializer(arena: &TokenArena, assign_id: ChunkId) -> Option<ChunkId> {
    let mut depth = 0i32;
    let mut cur = arena.next_significant(assign_id);
    while let Some(id) = cur {
        let kind = arena.get(id).kind;
        if let Some(role) = kind.bracket_role() {
            match role {
                BracketRole::Open => depth += 1,
                BracketRole::Close => depth -= 1,
            }
        } else if depth == 0 && matches!(kind, TokenKind::Comma | TokenKind::Semicolon) {
            return Some(id);
        }
        cur = arena.next_significant(id);
    }
    None
}
