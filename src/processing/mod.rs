//! Pixel processing module
//!
//! Provides the table-driven pixel pipeline shared by the filters:
//! - Contrast remap lookup tables with gamma
//! - BT.601 studio/full range conversion tables
//! - Halftone tone matrices
//! - Per-plane application over chroma-subsampled frames

mod lut;
mod plane;
mod range;
mod tone;

pub use lut::{LookupTable, RemapParams};
pub use plane::{
    comic_copy, comic_in_place, lut_copy, lut_in_place, BoostOrder, ComicKernel, ComicMode,
    CompareMode, PlaneGeometry, NEUTRAL_CHROMA,
};
pub use range::{RangeDirection, RangeTables, STUDIO_CHROMA_MAX, STUDIO_CHROMA_MIN};
pub use tone::{ToneExtremes, ToneMatrix, CELL_SIZE, DOT_LEVELS, PATTERN_LEVELS};
