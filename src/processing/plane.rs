//! Per-pixel application of lookup and tone tables over planar frames
//!
//! Every kernel comes in two flavours: in place, for frames the filter owns
//! outright, and copying, for shared input frames that must be left intact.
//! In compare mode only the left half of each row is filtered; the copying
//! flavour then carries the right half over from the source.

use super::lut::LookupTable;
use super::tone::ToneMatrix;
use crate::types::{Frame, LinkProps};
use serde::{Deserialize, Serialize};

/// Neutral chroma value
pub const NEUTRAL_CHROMA: u8 = 128;

/// Output style of the comic filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComicMode {
    /// Plain grayscale through the remap table
    Gray,
    /// Round halftone dots
    #[default]
    Dot,
    /// Dot cell sampled along rows only
    Horizontal,
    /// Dot cell sampled along columns only
    Vertical,
    /// Dot cell sampled along the anti-diagonal
    Diagonal,
    /// Dispersed 64-level pattern
    Pattern,
}

impl ComicMode {
    pub fn is_tone(&self) -> bool {
        !matches!(self, ComicMode::Gray)
    }
}

/// Whether the saturation boost is applied before or after the remap table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoostOrder {
    #[default]
    Pre,
    Post,
}

/// Side-by-side comparison of filtered and original halves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompareMode {
    /// Filter the whole frame
    #[default]
    Off,
    /// Filter the left half, keep the right half including its colour
    Color,
    /// Filter the left half, keep the right half's luma but drop its colour
    Mono,
}

impl CompareMode {
    pub fn is_enabled(&self) -> bool {
        !matches!(self, CompareMode::Off)
    }
}

/// Plane dimensions and chroma shifts of a configured link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaneGeometry {
    pub width: usize,
    pub height: usize,
    pub chroma_width: usize,
    pub chroma_height: usize,
    pub hshift: u32,
    pub vshift: u32,
    pub planes: usize,
}

impl PlaneGeometry {
    pub fn from_link(link: &LinkProps) -> Self {
        Self {
            width: link.width as usize,
            height: link.height as usize,
            chroma_width: link.chroma_width(),
            chroma_height: link.chroma_height(),
            hshift: link.format.log2_chroma_w(),
            vshift: link.format.log2_chroma_h(),
            planes: link.format.plane_count(),
        }
    }

    /// Dimensions of plane `index`
    pub fn plane_size(&self, index: usize) -> (usize, usize) {
        if index == 1 || index == 2 {
            (self.chroma_width, self.chroma_height)
        } else {
            (self.width, self.height)
        }
    }
}

/// Converts one luma sample into its comic rendition
#[derive(Debug, Clone, Copy)]
pub struct ComicKernel<'a> {
    pub lut: &'a LookupTable,
    pub dot: &'a ToneMatrix,
    pub pattern: &'a ToneMatrix,
    pub mode: ComicMode,
    pub boost: BoostOrder,
    /// Saturation rate in 8.8 fixed point, already scaled by 2.56
    pub saturation_rate: i32,
    /// Clamp plain gray output to 16-235
    pub studio_clamp: bool,
}

impl ComicKernel<'_> {
    /// Fixed-point saturation rate for a user rate in [0, 100]
    pub fn saturation_rate(rate: f64) -> i32 {
        (rate * 256.0 * 2.56) as i32
    }

    #[inline]
    pub fn pixel(&self, luma: u8, cb: u8, cr: u8, x: usize, y: usize) -> u8 {
        let cb = (cb as i32 - 128).abs();
        let cr = (cr as i32 - 128).abs();
        let a1 = ((cb.max(cr) * self.saturation_rate) >> 8) + 256;

        let v = match self.boost {
            BoostOrder::Pre => {
                let boosted = ((luma as i32 * a1) >> 8).min(255);
                self.lut.get(boosted as u8) as usize
            }
            BoostOrder::Post => {
                let remapped = self.lut.get(luma) as i32;
                ((remapped * a1) >> 8).min(255) as usize
            }
        };

        let (row, col) = (y & 7, x & 7);
        match self.mode {
            ComicMode::Dot => self.dot.lookup(((v >> 4) << 6) | (row << 3) | col),
            ComicMode::Horizontal => self.dot.lookup(((v >> 4) << 6) | (row << 3)),
            ComicMode::Vertical => self.dot.lookup(((v >> 4) << 6) | col),
            ComicMode::Diagonal => self.dot.lookup(((v >> 4) << 6) | ((x + y) & 7)),
            ComicMode::Pattern => self.pattern.lookup(((v >> 2) << 6) | (row << 3) | col),
            ComicMode::Gray if self.studio_clamp => (v as u8).clamp(16, 235),
            ComicMode::Gray => v as u8,
        }
    }
}

fn filtered_width(width: usize, compare: bool) -> usize {
    if compare {
        width / 2
    } else {
        width
    }
}

/// Apply the comic kernel to a frame the caller owns
pub fn comic_in_place(
    frame: &mut Frame,
    kernel: &ComicKernel<'_>,
    geom: &PlaneGeometry,
    compare: CompareMode,
) {
    let w = filtered_width(geom.width, compare.is_enabled());
    if let Some((luma, chroma)) = frame.planes_mut().split_first_mut() {
        let (cb, cr) = (&chroma[0], &chroma[1]);
        for y in 0..geom.height {
            let cy = y >> geom.vshift;
            let (cb_row, cr_row) = (cb.row(cy), cr.row(cy));
            let row = luma.row_mut(y);
            for (x, v) in row[..w].iter_mut().enumerate() {
                let cx = x >> geom.hshift;
                *v = kernel.pixel(*v, cb_row[cx], cr_row[cx], x, y);
            }
        }
    }

    let cw = filtered_width(geom.chroma_width, compare.is_enabled());
    for plane in &mut frame.planes_mut()[1..3] {
        for y in 0..geom.chroma_height {
            let row = plane.row_mut(y);
            row[..cw].fill(NEUTRAL_CHROMA);
            if compare == CompareMode::Mono {
                row[cw..geom.chroma_width].fill(NEUTRAL_CHROMA);
            }
        }
    }
}

/// Apply the comic kernel from `src` into a separate `dst`
pub fn comic_copy(
    src: &Frame,
    dst: &mut Frame,
    kernel: &ComicKernel<'_>,
    geom: &PlaneGeometry,
    compare: CompareMode,
) {
    let planes = src.planes();
    let w = filtered_width(geom.width, compare.is_enabled());
    let (luma, cb, cr) = (&planes[0], &planes[1], &planes[2]);
    for y in 0..geom.height {
        let cy = y >> geom.vshift;
        let (src_row, cb_row, cr_row) = (luma.row(y), cb.row(cy), cr.row(cy));
        let dst_row = dst.planes_mut()[0].row_mut(y);
        for x in 0..w {
            let cx = x >> geom.hshift;
            dst_row[x] = kernel.pixel(src_row[x], cb_row[cx], cr_row[cx], x, y);
        }
        if compare.is_enabled() {
            dst_row[w..geom.width].copy_from_slice(&src_row[w..geom.width]);
        }
    }

    let cw = filtered_width(geom.chroma_width, compare.is_enabled());
    for p in 1..3 {
        for y in 0..geom.chroma_height {
            let src_row = planes[p].row(y);
            let dst_row = dst.planes_mut()[p].row_mut(y);
            dst_row[..cw].fill(NEUTRAL_CHROMA);
            match compare {
                CompareMode::Off => {}
                CompareMode::Color => {
                    dst_row[cw..geom.chroma_width].copy_from_slice(&src_row[cw..geom.chroma_width])
                }
                CompareMode::Mono => dst_row[cw..geom.chroma_width].fill(NEUTRAL_CHROMA),
            }
        }
    }
}

/// Map every plane of an owned frame through its table
pub fn lut_in_place(
    frame: &mut Frame,
    tables: [&LookupTable; 4],
    geom: &PlaneGeometry,
    compare: bool,
) {
    for (p, plane) in frame.planes_mut().iter_mut().enumerate().take(geom.planes) {
        let (pw, ph) = geom.plane_size(p);
        let w = filtered_width(pw, compare);
        for y in 0..ph {
            tables[p].apply_in_place(&mut plane.row_mut(y)[..w]);
        }
    }
}

/// Map every plane of `src` through its table into `dst`
pub fn lut_copy(
    src: &Frame,
    dst: &mut Frame,
    tables: [&LookupTable; 4],
    geom: &PlaneGeometry,
    compare: bool,
) {
    let count = geom.planes.min(src.planes().len()).min(dst.planes().len());
    for p in 0..count {
        let (pw, ph) = geom.plane_size(p);
        let w = filtered_width(pw, compare);
        let src_plane = &src.planes()[p];
        let dst_plane = &mut dst.planes_mut()[p];
        for y in 0..ph {
            let src_row = src_plane.row(y);
            let dst_row = dst_plane.row_mut(y);
            tables[p].apply_row(&src_row[..w], &mut dst_row[..w]);
            if compare {
                dst_row[w..pw].copy_from_slice(&src_row[w..pw]);
            }
        }
    }
}
