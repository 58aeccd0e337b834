//! Frame pass: brace/paren nesting and virtual-brace insertion (§4.4).

mod error;
mod pass;

pub use error::FrameError;
pub use pass::{run_frame_pass, FramePassOutput};
