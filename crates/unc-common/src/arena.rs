//! Index-addressed token list (§3.1 of the specification this crate implements).
//!
//! The canonical token list is a doubly-linked list in the original design;
//! here it is an arena of [`Token`]s addressed by [`ChunkId`], with `prev`/
//! `next` held alongside each slot instead of as pointers. Re-classification
//! is "set `kind` at index `i`"; insertion is "push a new slot, splice the
//! `prev`/`next` of the three affected slots". This mirrors the teacher's
//! `Vec`-backed, index-addressed `Lexer`/`Cursor` rather than a pointer graph.

use crate::token::Token;

/// A stable handle into a [`TokenArena`]. Indices are never reused: removed
/// slots are tombstoned, not recycled, so a `ChunkId` taken before a removal
/// stays meaningful (or becomes provably dangling) afterward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkId(u32);

impl ChunkId {
    fn new(idx: usize) -> Self {
        ChunkId(idx as u32)
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy)]
struct Link {
    prev: Option<ChunkId>,
    next: Option<ChunkId>,
}

/// The shared mutable token list every pass traverses and mutates in place.
///
/// Slots are never physically removed from the backing `Vec` (that would
/// invalidate every other `ChunkId`); [`TokenArena::remove`] instead splices
/// the slot out of the `prev`/`next` chain and tombstones it. Iteration
/// follows the chain, so a removed slot is simply skipped.
#[derive(Debug, Default)]
pub struct TokenArena {
    tokens: Vec<Option<Token>>,
    links: Vec<Link>,
    head: Option<ChunkId>,
    tail: Option<ChunkId>,
}

impl TokenArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an arena from a flat token stream (the lexer's output), linking
    /// every slot sequentially. The lexer never inserts or removes tokens, so
    /// this is the only constructor it needs.
    pub fn from_tokens(tokens: Vec<Token>) -> Self {
        let mut arena = Self::new();
        for tok in tokens {
            arena.push_back(tok);
        }
        arena
    }

    pub fn len(&self) -> usize {
        self.tokens.iter().filter(|t| t.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    pub fn first(&self) -> Option<ChunkId> {
        self.head
    }

    pub fn last(&self) -> Option<ChunkId> {
        self.tail
    }

    pub fn next(&self, id: ChunkId) -> Option<ChunkId> {
        self.links[id.index()].next
    }

    pub fn prev(&self, id: ChunkId) -> Option<ChunkId> {
        self.links[id.index()].prev
    }

    pub fn get(&self, id: ChunkId) -> &Token {
        self.tokens[id.index()]
            .as_ref()
            .expect("ChunkId must reference a live slot")
    }

    pub fn get_mut(&mut self, id: ChunkId) -> &mut Token {
        self.tokens[id.index()]
            .as_mut()
            .expect("ChunkId must reference a live slot")
    }

    /// Append a token to the end of the list.
    pub fn push_back(&mut self, token: Token) -> ChunkId {
        let id = ChunkId::new(self.tokens.len());
        self.tokens.push(Some(token));
        self.links.push(Link {
            prev: self.tail,
            next: None,
        });
        if let Some(tail) = self.tail {
            self.links[tail.index()].next = Some(id);
        } else {
            self.head = Some(id);
        }
        self.tail = Some(id);
        id
    }

    /// Splice `token` into the list immediately before `at`, propagating the
    /// `COPY_MASK` flag subset from `at`'s current token per invariant §3.
    pub fn insert_before(&mut self, at: ChunkId, mut token: Token) -> ChunkId {
        token.flags = token.flags | self.get(at).flags.copyable();
        let prev = self.links[at.index()].prev;
        let id = ChunkId::new(self.tokens.len());
        self.tokens.push(Some(token));
        self.links.push(Link {
            prev,
            next: Some(at),
        });
        self.links[at.index()].prev = Some(id);
        match prev {
            Some(p) => self.links[p.index()].next = Some(id),
            None => self.head = Some(id),
        }
        id
    }

    /// Splice `token` into the list immediately after `at`.
    pub fn insert_after(&mut self, at: ChunkId, mut token: Token) -> ChunkId {
        token.flags = token.flags | self.get(at).flags.copyable();
        let next = self.links[at.index()].next;
        let id = ChunkId::new(self.tokens.len());
        self.tokens.push(Some(token));
        self.links.push(Link {
            prev: Some(at),
            next,
        });
        self.links[at.index()].next = Some(id);
        match next {
            Some(n) => self.links[n.index()].prev = Some(id),
            None => self.tail = Some(id),
        }
        id
    }

    /// Remove `id` from the chain and return its token. Used to cancel a
    /// tentative insertion (e.g. an undone return-paren wrap, per the
    /// lifecycle note in §3).
    pub fn remove(&mut self, id: ChunkId) -> Token {
        let Link { prev, next } = self.links[id.index()];
        match prev {
            Some(p) => self.links[p.index()].next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.links[n.index()].prev = prev,
            None => self.tail = prev,
        }
        self.tokens[id.index()]
            .take()
            .expect("ChunkId must reference a live slot")
    }

    /// Walk every live token in list order.
    pub fn iter(&self) -> ChunkIter<'_> {
        ChunkIter {
            arena: self,
            cursor: self.head,
        }
    }

    /// The first non-trivia token at or after `from`, if any.
    pub fn next_significant(&self, from: ChunkId) -> Option<ChunkId> {
        let mut cur = self.next(from);
        while let Some(id) = cur {
            if !self.get(id).is_trivia() {
                return Some(id);
            }
            cur = self.next(id);
        }
        None
    }

    /// The first non-trivia token at or before `from`, if any.
    pub fn prev_significant(&self, from: ChunkId) -> Option<ChunkId> {
        let mut cur = self.prev(from);
        while let Some(id) = cur {
            if !self.get(id).is_trivia() {
                return Some(id);
            }
            cur = self.prev(id);
        }
        None
    }
}

pub struct ChunkIter<'a> {
    arena: &'a TokenArena,
    cursor: Option<ChunkId>,
}

impl<'a> Iterator for ChunkIter<'a> {
    type Item = ChunkId;

    fn next(&mut self) -> Option<ChunkId> {
        let id = self.cursor?;
        self.cursor = self.arena.next(id);
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::Span;
    use crate::token_kind::TokenKind;

    fn tok(kind: TokenKind, text: &str) -> Token {
        Token::new(kind, text, Span::new(0, text.len() as u32))
    }

    #[test]
    fn push_back_links_sequentially() {
        let mut arena = TokenArena::new();
        let a = arena.push_back(tok(TokenKind::Word, "a"));
        let b = arena.push_back(tok(TokenKind::Word, "b"));
        assert_eq!(arena.next(a), Some(b));
        assert_eq!(arena.prev(b), Some(a));
        assert_eq!(arena.first(), Some(a));
        assert_eq!(arena.last(), Some(b));
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn insert_before_splices_in_between() {
        let mut arena = TokenArena::new();
        let a = arena.push_back(tok(TokenKind::Word, "a"));
        let c = arena.push_back(tok(TokenKind::Word, "c"));
        let b = arena.insert_before(c, tok(TokenKind::Word, "b"));
        assert_eq!(arena.next(a), Some(b));
        assert_eq!(arena.next(b), Some(c));
        assert_eq!(arena.prev(c), Some(b));
        let order: Vec<_> = arena.iter().map(|id| arena.get(id).text.clone()).collect();
        assert_eq!(order, vec!["a", "b", "c"]);
    }

    #[test]
    fn insert_before_head_updates_head() {
        let mut arena = TokenArena::new();
        let b = arena.push_back(tok(TokenKind::Word, "b"));
        let a = arena.insert_before(b, tok(TokenKind::Word, "a"));
        assert_eq!(arena.first(), Some(a));
    }

    #[test]
    fn remove_splices_out_and_updates_tail() {
        let mut arena = TokenArena::new();
        let a = arena.push_back(tok(TokenKind::Word, "a"));
        let b = arena.push_back(tok(TokenKind::Word, "b"));
        let removed = arena.remove(b);
        assert_eq!(removed.text, "b");
        assert_eq!(arena.last(), Some(a));
        assert_eq!(arena.next(a), None);
    }

    #[test]
    fn from_tokens_builds_full_chain() {
        let arena = TokenArena::from_tokens(vec![
            tok(TokenKind::Word, "a"),
            tok(TokenKind::Word, "b"),
            tok(TokenKind::Word, "c"),
        ]);
        let texts: Vec<_> = arena.iter().map(|id| arena.get(id).text.clone()).collect();
        assert_eq!(texts, vec!["a", "b", "c"]);
    }

    #[test]
    fn insert_before_copies_propagating_flags_only() {
        use crate::flags::ChunkFlags;
        let mut arena = TokenArena::new();
        let mut t = tok(TokenKind::Semicolon, ";");
        t.flags.set(ChunkFlags::IN_PREPROC);
        t.flags.set(ChunkFlags::STMT_START);
        let semi = arena.push_back(t);
        let vb = arena.insert_before(semi, tok(TokenKind::VbraceClose, ""));
        assert!(arena.get(vb).flags.contains(ChunkFlags::IN_PREPROC));
        assert!(!arena.get(vb).flags.contains(ChunkFlags::STMT_START));
    }
}
