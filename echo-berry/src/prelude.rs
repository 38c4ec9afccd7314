//! 🐟欢迎光临🌊
//!
//! 涵盖了本 crate 一系列常用的功能.

pub use crate::Idx2d;

pub use crate::consts::label::{self, Label};
pub use crate::consts::{FREQUENCIES, PATCH_OVERLAP, PATCH_SIZE, SEABED_OFFSET};

pub use crate::data::{BoundingBox, Echogram, InMemoryEchogram, ObjectRecord};
pub use crate::error::{SegError, SegResult};

pub use crate::tiling::{segment, segment_single, IdentityPredictor, Predictor, TileConfig};

#[cfg(feature = "rayon")]
pub use crate::tiling::par_segment;

pub use crate::post_proc::{extended_label_mask, mask_below_seabed, Mode, ProbAccumulator};

pub use crate::persist::{NpzSink, PredictionRecord};
pub use crate::pipeline::{IgnoreMode, PipelineConfig, SandeelSegmenter};
