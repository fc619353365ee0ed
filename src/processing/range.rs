//! BT.601 studio <-> full range conversion tables
//!
//! Studio (MPEG) range stores luma in 16-235 and chroma in 16-240; full
//! range uses 0-255 for both. Rounding is integer round half up.

use super::lut::LookupTable;

/// Direction of a range conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeDirection {
    /// Studio range to full range
    StudioToFull,
    /// Full range to studio range
    FullToStudio,
}

/// One conversion table per plane: luma, Cb, Cr, alpha
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeTables {
    planes: [LookupTable; 4],
}

impl RangeTables {
    /// Build the four tables for one direction
    pub fn new(direction: RangeDirection) -> Self {
        let (luma, chroma) = match direction {
            RangeDirection::StudioToFull => (
                LookupTable::from_fn(studio_to_full_luma),
                LookupTable::from_fn(studio_to_full_chroma),
            ),
            RangeDirection::FullToStudio => (
                LookupTable::from_fn(full_to_studio_luma),
                LookupTable::from_fn(full_to_studio_chroma),
            ),
        };
        Self {
            planes: [luma, chroma.clone(), chroma, LookupTable::identity()],
        }
    }

    pub fn studio_to_full() -> Self {
        Self::new(RangeDirection::StudioToFull)
    }

    pub fn full_to_studio() -> Self {
        Self::new(RangeDirection::FullToStudio)
    }

    /// Table for plane `index` (0 = Y, 1 = Cb, 2 = Cr, 3 = alpha)
    pub fn plane(&self, index: usize) -> &LookupTable {
        &self.planes[index]
    }

    pub fn luma(&self) -> &LookupTable {
        &self.planes[0]
    }

    pub fn chroma(&self) -> &LookupTable {
        &self.planes[1]
    }
}

fn studio_to_full_luma(i: i32) -> i32 {
    (((i - 16) * 255) + 110) / 219
}

fn studio_to_full_chroma(i: i32) -> i32 {
    (((i - 128) * 128) + (112 * 128) + 56) / 112
}

fn full_to_studio_luma(i: i32) -> i32 {
    ((i * 219 + 128) / 255 + 16).clamp(16, 235)
}

fn full_to_studio_chroma(i: i32) -> i32 {
    ((((i - 128) * 112) + (128 * 128) + 64) / 128)
        .clamp(STUDIO_CHROMA_MIN as i32, STUDIO_CHROMA_MAX as i32)
}

/// Studio chroma bounds
pub const STUDIO_CHROMA_MIN: u8 = 16;
pub const STUDIO_CHROMA_MAX: u8 = 240;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_studio_to_full_anchors() {
        let t = RangeTables::studio_to_full();
        assert_eq!(t.luma()[16], 0);
        assert_eq!(t.luma()[235], 255);
        assert_eq!(t.luma()[0], 0);
        assert_eq!(t.luma()[255], 255);
        assert_eq!(t.chroma()[128], 128);
        assert_eq!(t.chroma()[16], 0);
        assert_eq!(t.chroma()[240], 255);
    }

    #[test]
    fn test_full_to_studio_anchors() {
        let t = RangeTables::full_to_studio();
        assert_eq!(t.luma()[0], 16);
        assert_eq!(t.luma()[255], 235);
        assert_eq!(t.chroma()[128], 128);
        assert_eq!(t.chroma()[0], 16);
        assert_eq!(t.chroma()[255], 239);
        assert!(t
            .chroma()
            .as_slice()
            .iter()
            .all(|&v| (STUDIO_CHROMA_MIN..=STUDIO_CHROMA_MAX).contains(&v)));
    }

    #[test]
    fn test_alpha_is_identity() {
        for dir in [RangeDirection::StudioToFull, RangeDirection::FullToStudio] {
            assert_eq!(RangeTables::new(dir).plane(3), &LookupTable::identity());
        }
    }

    #[test]
    fn test_cb_cr_share_curve() {
        let t = RangeTables::full_to_studio();
        assert_eq!(t.plane(1), t.plane(2));
    }

    #[test]
    fn test_round_trip_within_one() {
        let down = RangeTables::full_to_studio();
        let up = RangeTables::studio_to_full();
        for plane in 0..3 {
            for i in 0..=255u8 {
                let back = up.plane(plane)[down.plane(plane)[i]];
                let diff = (back as i32 - i as i32).abs();
                assert!(diff <= 1, "plane {} value {} came back as {}", plane, i, back);
            }
        }
    }
}
