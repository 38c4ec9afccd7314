//! 后处理流程集合.

mod aggregate;
mod eval_mask;
mod seabed;

pub use aggregate::{apply_eval_mask, Mode, ProbAccumulator};
pub use eval_mask::extended_label_mask;
pub use seabed::mask_below_seabed;
