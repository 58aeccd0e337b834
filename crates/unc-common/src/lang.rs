use serde::Serialize;

/// Bitmask of the curly-brace languages the front end understands.
///
/// Mirrors `original_source`'s `LANG_*` flags (`keywords.cpp`): a single
/// translation unit activates one or more bits (`CPP | OC` for Objective-C++,
/// for instance), and every keyword/punctuator table row carries a mask that
/// is tested against the active set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LangFlags(u16);

impl LangFlags {
    pub const C: LangFlags = LangFlags(1 << 0);
    pub const CPP: LangFlags = LangFlags(1 << 1);
    pub const CS: LangFlags = LangFlags(1 << 2);
    pub const D: LangFlags = LangFlags(1 << 3);
    pub const JAVA: LangFlags = LangFlags(1 << 4);
    pub const OC: LangFlags = LangFlags(1 << 5);
    pub const PAWN: LangFlags = LangFlags(1 << 6);
    pub const VALA: LangFlags = LangFlags(1 << 7);
    pub const ECMA: LangFlags = LangFlags(1 << 8);

    /// Matches every language; used for keyword rows valid everywhere (e.g. `const`).
    pub const ALL: LangFlags = LangFlags(0x1FF);

    pub const fn union(self, other: LangFlags) -> LangFlags {
        LangFlags(self.0 | other.0)
    }

    pub const fn intersects(self, other: LangFlags) -> bool {
        (self.0 & other.0) != 0
    }

    pub const fn contains(self, other: LangFlags) -> bool {
        (self.0 & other.0) == other.0
    }
}

impl std::ops::BitOr for LangFlags {
    type Output = LangFlags;
    fn bitor(self, rhs: LangFlags) -> LangFlags {
        self.union(rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_and_intersect() {
        let combo = LangFlags::CPP | LangFlags::OC;
        assert!(combo.intersects(LangFlags::CPP));
        assert!(combo.intersects(LangFlags::OC));
        assert!(!combo.intersects(LangFlags::JAVA));
    }

    #[test]
    fn all_contains_every_language() {
        for lang in [
            LangFlags::C,
            LangFlags::CPP,
            LangFlags::CS,
            LangFlags::D,
            LangFlags::JAVA,
            LangFlags::OC,
            LangFlags::PAWN,
            LangFlags::VALA,
            LangFlags::ECMA,
        ] {
            assert!(LangFlags::ALL.intersects(lang));
        }
    }

    #[test]
    fn contains_is_subset_check() {
        let combo = LangFlags::CPP | LangFlags::OC;
        assert!(combo.contains(LangFlags::CPP));
        assert!(!combo.contains(LangFlags::C));
    }
}
