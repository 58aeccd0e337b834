use serde::Serialize;

/// Per-token context bitset (§3's `flags` field).
///
/// A subset of these bits (see [`ChunkFlags::COPY_MASK`]) propagate onto a
/// freshly inserted token that takes the place of, or splits, an existing
/// one (virtual braces, split `[]`), matching "a subset (COPY_FLAGS)
/// propagates on token insertion".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ChunkFlags(u32);

macro_rules! flag_bits {
    ($($name:ident = $bit:expr),+ $(,)?) => {
        impl ChunkFlags {
            $(pub const $name: ChunkFlags = ChunkFlags(1 << $bit);)+
        }
    };
}

flag_bits! {
    IN_PREPROC = 0,
    IN_STRUCT = 1,
    IN_ENUM = 2,
    IN_CLASS = 3,
    IN_TYPEDEF = 4,
    IN_TEMPLATE = 5,
    IN_FCN_DEF = 6,
    IN_FCN_CALL = 7,
    IN_CONST_ARGS = 8,
    IN_SPAREN = 9,
    IN_FOR = 10,
    IN_ARRAY_ASSIGN = 11,
    IN_OC_MSG = 12,
    STMT_START = 13,
    EXPR_START = 14,
    PUNCTUATOR = 15,
    VAR_1ST = 16,
    VAR_1ST_DEF = 17,
    VAR_DEF = 18,
    VAR_TYPE = 19,
    VAR_INLINE = 20,
    LVALUE = 21,
    ONE_LINER = 22,
    EMPTY_BODY = 23,
    DONT_INDENT = 24,
    INSERTED = 25,
    ANCHOR = 26,
    LONG_BLOCK = 27,
    OC_RTYPE = 28,
    OC_ATYPE = 29,
    OC_BOXED = 30,
}

impl ChunkFlags {
    /// Bits that propagate from an original token onto one inserted in its
    /// place (e.g. a split `[]`, or the synthetic brace of a vbrace pair).
    pub const COPY_MASK: ChunkFlags = ChunkFlags(
        Self::IN_PREPROC.0
            | Self::IN_STRUCT.0
            | Self::IN_ENUM.0
            | Self::IN_CLASS.0
            | Self::IN_TYPEDEF.0
            | Self::IN_TEMPLATE.0
            | Self::IN_FCN_DEF.0
            | Self::IN_FCN_CALL.0
            | Self::IN_SPAREN.0
            | Self::IN_FOR.0
            | Self::IN_OC_MSG.0,
    );

    pub fn set(&mut self, bit: ChunkFlags) {
        self.0 |= bit.0;
    }

    pub fn clear(&mut self, bit: ChunkFlags) {
        self.0 &= !bit.0;
    }

    pub fn contains(self, bit: ChunkFlags) -> bool {
        (self.0 & bit.0) == bit.0 && bit.0 != 0
    }

    /// The bits of `self` that also appear in [`COPY_MASK`](Self::COPY_MASK).
    pub fn copyable(self) -> ChunkFlags {
        ChunkFlags(self.0 & Self::COPY_MASK.0)
    }
}

impl std::ops::BitOr for ChunkFlags {
    type Output = ChunkFlags;
    fn bitor(self, rhs: ChunkFlags) -> ChunkFlags {
        ChunkFlags(self.0 | rhs.0)
    }
}
