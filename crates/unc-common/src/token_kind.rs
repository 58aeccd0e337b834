use serde::Serialize;

/// Role of a bracket-family token, independent of its numeric discriminant.
///
/// `original_source` shortcuts "is this the close" as `kind == open_kind + 1`.
/// We keep that adjacency in the enum's declaration order (so the shortcut
/// still holds internally and is covered by a test), but callers use
/// [`TokenKind::bracket_role`] / [`TokenKind::matching_close`] instead of
/// doing arithmetic on discriminants themselves, per the design note in
/// the specification this crate implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BracketRole {
    Open,
    Close,
}

/// The classification of one token (chunk) in the shared token list.
///
/// Families follow §3 of the specification this crate implements:
/// whitespace/trivia, literals, identifiers/keywords, operators, brackets
/// (open/close pairs kept adjacent below), structural keywords,
/// preprocessor, and per-language constructs, plus a handful of sentinels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[repr(u16)]
pub enum TokenKind {
    // ── Sentinels ──────────────────────────────────────────────────────
    None,
    Eof,
    Unknown,
    Ignored,
    ByteOrderMark,

    // ── Trivia ─────────────────────────────────────────────────────────
    Whitespace,
    Newline,
    NlCont,
    Comment,
    CommentMulti,
    CommentCpp,

    // ── Literals ───────────────────────────────────────────────────────
    Number,
    NumberFp,
    String,
    StringMulti,
    Char,
    Macro,
    MacroFunc,
    PreprocBody,
    Attribute,

    // ── Identifiers / keywords ─────────────────────────────────────────
    Word,
    Type,
    Qualifier,
    Annotation,

    // ── Operators (ambiguous until the classifier runs) ────────────────
    Arith,
    PtrType,
    Deref,
    Addr,
    ByRef,
    Pos,
    Neg,
    Compare,
    BoolOp,
    Assign,
    IncDecBefore,
    IncDecAfter,
    Member,
    DotDot,
    Ellipsis,
    Question,
    Colon,
    ColonColon,
    Comma,
    Semicolon,
    Arrow,
    FatArrow,
    Star,
    Amp,
    Caret,
    Plus,
    Minus,

    // ── Brackets: open/close kept adjacent (close = open + 1) ──────────
    ParenOpen,
    ParenClose,
    FparenOpen,
    FparenClose,
    SparenOpen,
    SparenClose,
    TparenOpen,
    TparenClose,
    BraceOpen,
    BraceClose,
    VbraceOpen,
    VbraceClose,
    SquareOpen,
    SquareClose,
    TsquareOpen,
    TsquareClose,
    AngleOpen,
    AngleClose,

    // ── Structural keywords ─────────────────────────────────────────────
    If,
    Else,
    ElseIf,
    For,
    While,
    Do,
    Switch,
    Case,
    Default,
    Break,
    Continue,
    Goto,
    Return,
    Try,
    Catch,
    Finally,
    Throw,
    Class,
    Struct,
    Union,
    Enum,
    Namespace,
    Template,
    Typedef,
    Using,
    Extern,
    Operator,
    Friend,
    New,
    Delete,
    Sizeof,

    // ── Preprocessor ────────────────────────────────────────────────────
    PpHash,
    PpDefine,
    PpInclude,
    PpIf,
    PpIfdef,
    PpElse,
    PpEndif,
    PpRegion,
    PpEndregion,
    PpPragma,

    // ── Function / variable classification labels ──────────────────────
    FuncDef,
    FuncProto,
    FuncCall,
    FuncClassDef,
    FuncClassProto,
    FuncCtorVar,
    Function,

    // ── D ────────────────────────────────────────────────────────────
    DVersion,
    DScope,
    DWith,
    DInvariant,

    // ── Objective-C ──────────────────────────────────────────────────
    OcAt,
    OcClass,
    OcMessageDecl,
    OcMessageSend,
    OcMsgFunc,
    OcColon,
    OcBlockLiteral,
    OcBlockType,
    OcBlockCaret,
    OcProperty,
    OcSelector,

    // ── C# ────────────────────────────────────────────────────────────
    CsGetSet,
    CsProperty,
    CsSquareStmt,
    CsNullable,

    // ── Pawn ──────────────────────────────────────────────────────────
    PawnState,
    PawnForward,
    PawnNative,
    PawnStock,
    PawnVSemi,

    // ── Java ──────────────────────────────────────────────────────────
    JavaAssert,
    JavaLambda,

    // ── SQL embedding ─────────────────────────────────────────────────
    SqlWord,

    // ── Casts / templates (classifier output labels) ────────────────
    TypeCast,
    CCast,
}

impl TokenKind {
    /// Whether this kind is one half of an open/close bracket pair.
    pub const fn bracket_role(self) -> Option<BracketRole> {
        use TokenKind::*;
        match self {
            ParenOpen | FparenOpen | SparenOpen | TparenOpen | BraceOpen | VbraceOpen
            | SquareOpen | TsquareOpen | AngleOpen => Some(BracketRole::Open),
            ParenClose | FparenClose | SparenClose | TparenClose | BraceClose | VbraceClose
            | SquareClose | TsquareClose | AngleClose => Some(BracketRole::Close),
            _ => None,
        }
    }

    /// For an opening bracket kind, the kind of its matching close.
    ///
    /// Internally this is `self as u16 + 1` (the adjacency the enum
    /// declaration order preserves on purpose), but callers should not
    /// depend on that arithmetic — use this method instead.
    pub fn matching_close(self) -> Option<TokenKind> {
        if self.bracket_role() != Some(BracketRole::Open) {
            return None;
        }
        // SAFETY-free: TokenKind is a plain fieldless enum; converting the
        // adjacent discriminant back via a lookup table (not a transmute)
        // keeps this safe while preserving the open+1 shortcut internally.
        use TokenKind::*;
        Some(match self {
            ParenOpen => ParenClose,
            FparenOpen => FparenClose,
            SparenOpen => SparenClose,
            TparenOpen => TparenClose,
            BraceOpen => BraceClose,
            VbraceOpen => VbraceClose,
            SquareOpen => SquareClose,
            TsquareOpen => TsquareClose,
            AngleOpen => AngleClose,
            _ => unreachable!("guarded by bracket_role check above"),
        })
    }

    pub const fn is_trivia(self) -> bool {
        matches!(
            self,
            TokenKind::Whitespace
                | TokenKind::Newline
                | TokenKind::NlCont
                | TokenKind::Comment
                | TokenKind::CommentMulti
                | TokenKind::CommentCpp
        )
    }

    pub const fn is_vbrace(self) -> bool {
        matches!(self, TokenKind::VbraceOpen | TokenKind::VbraceClose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_close_pairs_are_adjacent_discriminants() {
        let pairs = [
            (TokenKind::ParenOpen, TokenKind::ParenClose),
            (TokenKind::FparenOpen, TokenKind::FparenClose),
            (TokenKind::SparenOpen, TokenKind::SparenClose),
            (TokenKind::TparenOpen, TokenKind::TparenClose),
            (TokenKind::BraceOpen, TokenKind::BraceClose),
            (TokenKind::VbraceOpen, TokenKind::VbraceClose),
            (TokenKind::SquareOpen, TokenKind::SquareClose),
            (TokenKind::TsquareOpen, TokenKind::TsquareClose),
            (TokenKind::AngleOpen, TokenKind::AngleClose),
        ];
        for (open, close) in pairs {
            assert_eq!(open.matching_close(), Some(close));
            assert_eq!(open as u16 + 1, close as u16);
        }
    }

    #[test]
    fn close_kinds_have_no_matching_close() {
        assert_eq!(TokenKind::ParenClose.matching_close(), None);
        assert_eq!(TokenKind::Word.matching_close(), None);
    }

    #[test]
    fn bracket_role_classifies_non_brackets_as_none() {
        assert_eq!(TokenKind::Word.bracket_role(), None);
        assert_eq!(TokenKind::ParenOpen.bracket_role(), Some(BracketRole::Open));
        assert_eq!(TokenKind::ParenClose.bracket_role(), Some(BracketRole::Close));
    }

    #[test]
    fn vbrace_is_recognized() {
        assert!(TokenKind::VbraceOpen.is_vbrace());
        assert!(TokenKind::VbraceClose.is_vbrace());
        assert!(!TokenKind::BraceOpen.is_vbrace());
    }
}
