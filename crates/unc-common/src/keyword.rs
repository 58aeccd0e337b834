//! Keyword table (§4.1, "Keyword table").
//!
//! A static, language-tagged spelling table seeded from
//! `original_source/src/keywords.cpp`, plus a dynamic user table for
//! project-specific type/macro words (populated before lexing begins, per
//! the resource model of §5: "the dynamic keyword map (written only before
//! lexing begins)"). Lookup probes the dynamic table first, then scans
//! the static one; failure yields [`TokenKind::Word`].

use rustc_hash::FxHashMap;

use crate::lang::LangFlags;
use crate::token_kind::TokenKind;

/// One static keyword row: a spelling, its target kind, the language mask it
/// applies under, and whether it is only a keyword inside a preprocessor
/// directive (`assert` as `CT_PP_ASSERT` in Pawn, vs. `CT_FUNCTION`
/// elsewhere in the same language).
#[derive(Debug, Clone, Copy)]
pub struct KeywordRow {
    pub spelling: &'static str,
    pub kind: TokenKind,
    pub langs: LangFlags,
    pub pp_only: bool,
}

macro_rules! kw {
    ($spelling:literal, $kind:expr, $langs:expr) => {
        KeywordRow {
            spelling: $spelling,
            kind: $kind,
            langs: $langs,
            pp_only: false,
        }
    };
    ($spelling:literal, $kind:expr, $langs:expr, pp) => {
        KeywordRow {
            spelling: $spelling,
            kind: $kind,
            langs: $langs,
            pp_only: true,
        }
    };
}

const ALL: LangFlags = LangFlags::ALL;
const ALLC: LangFlags = LangFlags::C
    .union(LangFlags::CPP)
    .union(LangFlags::CS)
    .union(LangFlags::D)
    .union(LangFlags::OC);

/// Seed rows, roughly alphabetical by spelling (a handful of languages
/// disagree on the same word, so lookup is a linear scan rather than a
/// strict binary search over these small per-spelling runs).
/// `const`/`volatile`/`inline` resolve to `Qualifier` here per the open
/// question resolved in SPEC_FULL.md §4.1 (confirmed against
/// `original_source/src/keywords.cpp`, which tags them `CT_QUALIFIER`).
static KEYWORDS: &[KeywordRow] = &[
    kw!("bool", TokenKind::Type, LangFlags::CPP.union(LangFlags::CS).union(LangFlags::VALA)),
    kw!("break", TokenKind::Break, ALL),
    kw!("case", TokenKind::Case, ALL),
    kw!(
        "catch",
        TokenKind::Catch,
        LangFlags::CPP.union(LangFlags::CS).union(LangFlags::D).union(LangFlags::JAVA).union(LangFlags::ECMA)
    ),
    kw!("char", TokenKind::Type, ALLC),
    kw!(
        "class",
        TokenKind::Class,
        LangFlags::CPP.union(LangFlags::CS).union(LangFlags::D).union(LangFlags::JAVA).union(LangFlags::VALA).union(LangFlags::ECMA)
    ),
    kw!("const", TokenKind::Qualifier, ALL),
    kw!("continue", TokenKind::Continue, ALL),
    kw!("default", TokenKind::Default, ALL),
    kw!("delete", TokenKind::Delete, LangFlags::CPP.union(LangFlags::D).union(LangFlags::ECMA)),
    kw!("do", TokenKind::Do, ALL),
    kw!("double", TokenKind::Type, ALLC),
    kw!("else", TokenKind::Else, ALL),
    kw!("enum", TokenKind::Enum, ALL),
    kw!(
        "extern",
        TokenKind::Extern,
        LangFlags::C.union(LangFlags::CPP).union(LangFlags::CS).union(LangFlags::D).union(LangFlags::VALA)
    ),
    kw!("finally", TokenKind::Finally, LangFlags::D.union(LangFlags::CS).union(LangFlags::ECMA)),
    kw!("float", TokenKind::Type, ALLC),
    kw!("for", TokenKind::For, ALL),
    kw!("friend", TokenKind::Friend, LangFlags::CPP),
    kw!("goto", TokenKind::Goto, ALL),
    kw!("if", TokenKind::If, ALL),
    kw!("inline", TokenKind::Qualifier, LangFlags::C.union(LangFlags::CPP)),
    kw!("int", TokenKind::Type, ALLC),
    kw!("long", TokenKind::Type, ALLC),
    kw!(
        "namespace",
        TokenKind::Namespace,
        LangFlags::C.union(LangFlags::CPP).union(LangFlags::CS).union(LangFlags::VALA)
    ),
    kw!(
        "new",
        TokenKind::New,
        LangFlags::CPP.union(LangFlags::CS).union(LangFlags::D).union(LangFlags::JAVA).union(LangFlags::PAWN).union(LangFlags::VALA).union(LangFlags::ECMA)
    ),
    kw!("operator", TokenKind::Operator, LangFlags::CPP.union(LangFlags::CS).union(LangFlags::PAWN)),
    kw!("return", TokenKind::Return, ALL),
    kw!("short", TokenKind::Type, ALLC),
    kw!("signed", TokenKind::Type, LangFlags::C.union(LangFlags::CPP)),
    kw!("sizeof", TokenKind::Sizeof, LangFlags::C.union(LangFlags::CPP).union(LangFlags::CS).union(LangFlags::PAWN)),
    kw!("static", TokenKind::Qualifier, ALL),
    kw!(
        "struct",
        TokenKind::Struct,
        LangFlags::C.union(LangFlags::CPP).union(LangFlags::CS).union(LangFlags::D).union(LangFlags::VALA)
    ),
    kw!("switch", TokenKind::Switch, ALL),
    kw!("template", TokenKind::Template, LangFlags::CPP.union(LangFlags::D)),
    kw!(
        "throw",
        TokenKind::Throw,
        LangFlags::CPP.union(LangFlags::CS).union(LangFlags::D).union(LangFlags::JAVA).union(LangFlags::ECMA)
    ),
    kw!(
        "try",
        TokenKind::Try,
        LangFlags::CPP.union(LangFlags::CS).union(LangFlags::D).union(LangFlags::JAVA).union(LangFlags::ECMA)
    ),
    kw!("typedef", TokenKind::Typedef, LangFlags::C.union(LangFlags::CPP).union(LangFlags::D)),
    kw!("union", TokenKind::Union, LangFlags::C.union(LangFlags::CPP).union(LangFlags::D)),
    kw!("unsigned", TokenKind::Type, LangFlags::C.union(LangFlags::CPP)),
    kw!("using", TokenKind::Using, LangFlags::CPP.union(LangFlags::CS).union(LangFlags::VALA)),
    kw!("void", TokenKind::Type, ALLC),
    kw!(
        "volatile",
        TokenKind::Qualifier,
        LangFlags::C.union(LangFlags::CPP).union(LangFlags::CS).union(LangFlags::JAVA).union(LangFlags::ECMA)
    ),
    kw!("while", TokenKind::While, ALL),
    // Preprocessor-only rows (`FLAG_PP` in the original): the same spelling
    // is a keyword only when the lexer is inside a `#` directive.
    kw!("define", TokenKind::PpDefine, ALL, pp),
    kw!("else", TokenKind::PpElse, ALL, pp),
    kw!("endif", TokenKind::PpEndif, ALL, pp),
    kw!("if", TokenKind::PpIf, ALL, pp),
    kw!("ifdef", TokenKind::PpIfdef, ALL, pp),
    kw!("ifndef", TokenKind::PpIfdef, ALL, pp),
    kw!("include", TokenKind::PpInclude, ALL, pp),
    kw!("pragma", TokenKind::PpPragma, ALL, pp),
    kw!("region", TokenKind::PpRegion, LangFlags::CS, pp),
    kw!("endregion", TokenKind::PpEndregion, LangFlags::CS, pp),
    // Language-specific extras.
    kw!("version", TokenKind::DVersion, LangFlags::D),
    kw!("scope", TokenKind::DScope, LangFlags::D),
    kw!("with", TokenKind::DWith, LangFlags::D),
    kw!("invariant", TokenKind::DInvariant, LangFlags::D),
    kw!("assert", TokenKind::JavaAssert, LangFlags::JAVA),
    kw!("forward", TokenKind::PawnForward, LangFlags::PAWN),
    kw!("native", TokenKind::PawnNative, LangFlags::PAWN),
    kw!("stock", TokenKind::PawnStock, LangFlags::PAWN),
    kw!("state", TokenKind::PawnState, LangFlags::PAWN),
    kw!("get", TokenKind::CsGetSet, LangFlags::CS),
    kw!("set", TokenKind::CsGetSet, LangFlags::CS),
];

/// Probes the static table for `spelling`, returning every row whose
/// spelling matches (several languages disagree on the same word).
fn static_rows(spelling: &str) -> impl Iterator<Item = &'static KeywordRow> {
    KEYWORDS.iter().filter(move |row| row.spelling == spelling)
}

/// Looks up `spelling` against the static table for the active `langs`,
/// honoring `in_preproc` (pp-only rows only match inside a directive).
/// Later non-matching rows for other languages are skipped, not an error:
/// a spelling simply isn't a keyword under the active language.
pub fn lookup_static(spelling: &str, langs: LangFlags, in_preproc: bool) -> Option<TokenKind> {
    static_rows(spelling)
        .find(|row| row.langs.intersects(langs) && (!row.pp_only || in_preproc))
        .map(|row| row.kind)
}

/// User-supplied keyword/type/macro additions (e.g. project-specific
/// typedef'd names), consulted before the static table. Per §5 this map is
/// mutated only before a tokenize run begins.
#[derive(Debug, Default, Clone)]
pub struct DynamicKeywords {
    map: FxHashMap<String, TokenKind>,
}

impl DynamicKeywords {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, spelling: impl Into<String>, kind: TokenKind) {
        self.map.insert(spelling.into(), kind);
    }

    pub fn get(&self, spelling: &str) -> Option<TokenKind> {
        self.map.get(spelling).copied()
    }
}

/// Full lookup per §4.1: the dynamic table is probed first, then the static
/// table; failure yields [`TokenKind::Word`].
pub fn lookup(
    spelling: &str,
    langs: LangFlags,
    in_preproc: bool,
    dynamic: &DynamicKeywords,
) -> TokenKind {
    dynamic
        .get(spelling)
        .or_else(|| lookup_static(spelling, langs, in_preproc))
        .unwrap_or(TokenKind::Word)
}
