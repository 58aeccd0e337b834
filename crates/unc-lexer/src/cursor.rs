/// Byte-level source iterator for the uncrustify lexer.
///
/// The cursor wraps a source string and provides character-by-character
/// iteration with byte-offset and line/column position tracking. All
/// positions are byte offsets into the original UTF-8 source text; line and
/// column are 1-based and counted in bytes, matching `Token::orig_line`/
/// `orig_col`.
///
/// Several lexer sub-parsers (suffix gobbling, raw-string tag matching,
/// backslash-newline lookahead) need to try a parse and back out on
/// mismatch; [`Cursor::checkpoint`]/[`Cursor::restore`] give them a cheap
/// `Copy` snapshot to do that with, since the underlying `Chars` iterator is
/// itself `Clone`.
#[derive(Clone)]
pub struct Cursor<'src> {
    source: &'src str,
    pos: u32,
    row: u32,
    col: u32,
    last_ch: Option<char>,
    chars: std::str::Chars<'src>,
}

/// A cheap snapshot of cursor state, per the "immutable-input + cursor
/// value whose copies are cheap" design note.
#[derive(Clone, Copy)]
pub struct Checkpoint<'src> {
    pos: u32,
    row: u32,
    col: u32,
    last_ch: Option<char>,
    chars: std::str::Chars<'src>,
}

impl<'src> Cursor<'src> {
    /// Create a new cursor at the start of the source text.
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            pos: 0,
            row: 1,
            col: 1,
            last_ch: None,
            chars: source.chars(),
        }
    }

    /// Look at the current character without consuming it.
    pub fn peek(&self) -> Option<char> {
        self.chars.clone().next()
    }

    /// Look at the character after the current one without consuming anything.
    pub fn peek_next(&self) -> Option<char> {
        let mut iter = self.chars.clone();
        iter.next();
        iter.next()
    }

    /// Look `n` characters ahead (0 = current) without consuming anything.
    pub fn peek_at(&self, n: usize) -> Option<char> {
        self.chars.clone().nth(n)
    }

    /// Consume the current character and advance position and line/column.
    ///
    /// Returns the consumed character, or `None` if at end of input.
    pub fn advance(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        self.pos += c.len_utf8() as u32;
        if self.last_ch == Some('\r') && c == '\n' {
            // \r\n counted as a single line break; \r already advanced row.
        } else if c == '\n' || c == '\r' {
            self.row += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        self.last_ch = Some(c);
        Some(c)
    }

    /// Current byte position in the source text.
    pub fn pos(&self) -> u32 {
        self.pos
    }

    /// Current 1-based line.
    pub fn row(&self) -> u32 {
        self.row
    }

    /// Current 1-based column.
    pub fn col(&self) -> u32 {
        self.col
    }

    /// The most recently consumed character, if any.
    pub fn last_ch(&self) -> Option<char> {
        self.last_ch
    }

    /// Whether there are no more characters to consume.
    pub fn is_eof(&self) -> bool {
        self.peek().is_none()
    }

    /// Advance while the predicate holds for the current character.
    pub fn eat_while(&mut self, predicate: impl Fn(char) -> bool) {
        while let Some(c) = self.peek() {
            if predicate(c) {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Extract a slice of the source text by byte offsets.
    ///
    /// # Panics
    ///
    /// Panics if start or end are out of bounds or not on UTF-8 boundaries.
    pub fn slice(&self, start: u32, end: u32) -> &'src str {
        &self.source[start as usize..end as usize]
    }

    /// A window of up to `max_len` bytes starting at the current position,
    /// for punctuator longest-match probing.
    pub fn window(&self, max_len: usize) -> &'src str {
        let start = self.pos as usize;
        let mut end = (start + max_len).min(self.source.len());
        while end > start && !self.source.is_char_boundary(end) {
            end -= 1;
        }
        &self.source[start..end]
    }

    /// Snapshot the current position for a tentative parse.
    pub fn checkpoint(&self) -> Checkpoint<'src> {
        Checkpoint {
            pos: self.pos,
            row: self.row,
            col: self.col,
            last_ch: self.last_ch,
            chars: self.chars.clone(),
        }
    }

    /// Roll back to a previously taken [`Checkpoint`], discarding anything
    /// consumed since.
    pub fn restore(&mut self, checkpoint: Checkpoint<'src>) {
        self.pos = checkpoint.pos;
        self.row = checkpoint.row;
        self.col = checkpoint.col;
        self.last_ch = checkpoint.last_ch;
        self.chars = checkpoint.chars;
    }
}
