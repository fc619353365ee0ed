//! Halftone tone matrices
//!
//! Two families of 8x8 threshold cells used by the comic filter to turn a
//! remapped luma value into a binary ink decision:
//!
//! - **dot**: 16 levels of round newsprint dots. Each cell pixel is ink when it
//!   falls inside one of five disks (cell centre plus the four corners) whose
//!   radius grows as the level gets darker.
//! - **pattern**: 64 levels of dispersed marks. Each level replays the same
//!   placement walk with one more mark than the level below it, so the marks
//!   of a level are always a subset of the marks of every brighter level.

use crate::error::{try_alloc, Result};

/// Pixels in one 8x8 cell
pub const CELL_SIZE: usize = 64;
/// Levels in the dot matrix
pub const DOT_LEVELS: usize = 16;
/// Levels in the pattern matrix
pub const PATTERN_LEVELS: usize = 64;

/// Squared-distance multiplier of the dot disks
const DOT_DISTANCE_SCALE: i32 = 196;

/// Disk centres of the dot cell, as (row, column)
const DOT_CENTRES: [(i32, i32); 5] = [(4, 4), (0, 0), (8, 8), (0, 8), (8, 0)];

/// Output extremes of a tone matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToneExtremes {
    pub dark: u8,
    pub bright: u8,
}

impl ToneExtremes {
    pub fn new(studio_range: bool) -> Self {
        if studio_range {
            Self {
                dark: 16,
                bright: 235,
            }
        } else {
            Self {
                dark: 0,
                bright: 255,
            }
        }
    }
}

/// A stack of 8x8 cells, one per level, flattened level-major
#[derive(Clone, PartialEq, Eq)]
pub struct ToneMatrix {
    levels: usize,
    data: Vec<u8>,
}

impl ToneMatrix {
    /// Build the 16-level round dot matrix
    pub fn dot(studio_range: bool) -> Result<Self> {
        let ext = ToneExtremes::new(studio_range);
        let mut data = try_alloc(DOT_LEVELS * CELL_SIZE, "dot tone matrix")?;

        for (level, cell) in data.chunks_exact_mut(CELL_SIZE).enumerate() {
            let radius = 4 * (DOT_LEVELS as i32 - 1 - level as i32);
            let rd = radius * radius;
            for h in 0..8i32 {
                for w in 0..8i32 {
                    let ink = DOT_CENTRES.iter().any(|&(ch, cw)| {
                        let d = ((h - ch) * (h - ch) + (w - cw) * (w - cw)) * DOT_DISTANCE_SCALE;
                        d < rd
                    });
                    cell[(h * 8 + w) as usize] = if ink { ext.dark } else { ext.bright };
                }
            }
        }

        tracing::debug!("Built dot tone matrix (studio range: {})", studio_range);
        Ok(Self {
            levels: DOT_LEVELS,
            data,
        })
    }

    /// Build the 64-level dispersed pattern matrix
    ///
    /// `coefficient % 64` is the cursor step between marks; a non-zero
    /// `coefficient / 64` rotates rows 1, 3, 5 and 7 of every cell one pixel
    /// to the left.
    pub fn pattern(coefficient: u8, studio_range: bool) -> Result<Self> {
        let ext = ToneExtremes::new(studio_range);
        let mut data = try_alloc(PATTERN_LEVELS * CELL_SIZE, "pattern tone matrix")?;
        data.fill(ext.dark);

        let step = coefficient as usize % CELL_SIZE;
        let shift = coefficient as usize / CELL_SIZE != 0;

        for (level, cell) in data.chunks_exact_mut(CELL_SIZE).enumerate() {
            let marks = level + level / 33;
            let mut cursor = 0usize;
            for _ in 0..marks {
                if is_marked(cell[cursor]) {
                    for _ in 0..=CELL_SIZE {
                        cursor = (cursor + 1) % CELL_SIZE;
                        if !is_marked(cell[cursor]) {
                            break;
                        }
                    }
                }
                cell[cursor] = ext.bright;
                cursor = (cursor + step) % CELL_SIZE;
            }

            if shift {
                for j in 0..4 {
                    let start = 16 * j + 8;
                    cell[start..start + 8].rotate_left(1);
                }
            }
        }

        tracing::debug!(
            "Built pattern tone matrix (coefficient: {}, studio range: {})",
            coefficient,
            studio_range
        );
        Ok(Self {
            levels: PATTERN_LEVELS,
            data,
        })
    }

    /// Number of levels
    pub fn levels(&self) -> usize {
        self.levels
    }

    /// The 8x8 cell of one level
    pub fn cell(&self, level: usize) -> &[u8] {
        &self.data[level * CELL_SIZE..(level + 1) * CELL_SIZE]
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Entry at a flattened `(level << 6) | (row << 3) | column` index
    #[inline]
    pub fn lookup(&self, index: usize) -> u8 {
        self.data[index]
    }
}

impl std::fmt::Debug for ToneMatrix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToneMatrix")
            .field("levels", &self.levels)
            .finish_non_exhaustive()
    }
}

/// Pattern marks are the bright extreme; 16 is the studio background
#[inline]
fn is_marked(value: u8) -> bool {
    value > 16
}
