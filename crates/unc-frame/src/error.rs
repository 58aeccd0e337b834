use std::fmt;

/// A condition the frame pass cannot recover from by itself.
///
/// Everything else the pass encounters (unbalanced closes, an `else` with
/// no open `if`, a `do` missing its `while`) is recoverable: it is recorded
/// on the [`DiagnosticBag`](uncrustify_common::diagnostic::DiagnosticBag)
/// passed alongside the token list and the walk continues. `FrameError` is
/// reserved for the frame stack itself going empty, which would mean the
/// walk's own bookkeeping is broken rather than the input being malformed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// A close (real or virtual) was matched against an empty frame stack.
    StackUnderflow,
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StackUnderflow => write!(f, "frame stack underflow"),
        }
    }
}

impl std::error::Error for FrameError {}
