use std::fmt;

use uncrustify_frame::FrameError;

/// The one genuinely fatal condition a full run can hit: the frame pass's
/// own bookkeeping invariant breaking. The lexer and classifier are both
/// infallible (§7: recoverable/uncertain conditions are diagnostics, not
/// errors), so this wraps `FrameError` rather than inventing siblings for
/// passes that never produce one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    Frame(FrameError),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Frame(e) => write!(f, "frame pass failed: {e}"),
        }
    }
}

impl std::error::Error for PipelineError {}

impl From<FrameError> for PipelineError {
    fn from(e: FrameError) -> Self {
        Self::Frame(e)
    }
}
