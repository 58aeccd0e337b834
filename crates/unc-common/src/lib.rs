//! Shared types for the uncrustify front end: the token representation
//! (§3), the arena that holds the shared mutable token list (§3.1), the
//! static character/keyword/punctuator tables (§4.1-4.2), the `Options`
//! record and `Diagnostic` stream (§6-7), and the language bitmask (§6).
//!
//! Downstream crates (`uncrustify-lexer`, `uncrustify-frame`,
//! `uncrustify-classify`) each own one pass and share nothing but the types
//! defined here.

pub mod arena;
pub mod char_table;
pub mod diagnostic;
pub mod flags;
pub mod keyword;
pub mod lang;
pub mod options;
pub mod punctuator;
pub mod span;
pub mod token;
pub mod token_kind;

pub use arena::{ChunkId, TokenArena};
pub use diagnostic::{Diagnostic, DiagnosticBag, Severity};
pub use flags::ChunkFlags;
pub use lang::LangFlags;
pub use options::Options;
pub use span::{LineIndex, Span};
pub use token::Token;
pub use token_kind::{BracketRole, TokenKind};
