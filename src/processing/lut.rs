//! 8-bit remap lookup tables
//!
//! A remap table stretches an input window `[input_low, input_high]` onto an
//! output window `[output_low, output_high]`, clamping values outside the
//! input window to the nearer output bound. Inverted windows
//! (`input_low > input_high`) produce a negative curve. An optional gamma
//! exponent is applied to the remapped value.

use serde::{Deserialize, Serialize};

/// 256-entry byte to byte mapping
#[derive(Clone, PartialEq, Eq)]
pub struct LookupTable([u8; 256]);

impl LookupTable {
    /// The table that maps every value to itself
    pub fn identity() -> Self {
        let mut table = [0u8; 256];
        for (i, v) in table.iter_mut().enumerate() {
            *v = i as u8;
        }
        Self(table)
    }

    /// Build a table from a function of the input byte, clamping to [0, 255]
    pub fn from_fn(mut f: impl FnMut(i32) -> i32) -> Self {
        let mut table = [0u8; 256];
        for (i, v) in table.iter_mut().enumerate() {
            *v = f(i as i32).clamp(0, 255) as u8;
        }
        Self(table)
    }

    #[inline]
    pub fn get(&self, value: u8) -> u8 {
        self.0[value as usize]
    }

    pub fn as_slice(&self) -> &[u8; 256] {
        &self.0
    }

    /// Map every byte of `row` through the table
    #[inline]
    pub fn apply_row(&self, src: &[u8], dst: &mut [u8]) {
        for (d, &s) in dst.iter_mut().zip(src) {
            *d = self.0[s as usize];
        }
    }

    /// Map a row in place
    #[inline]
    pub fn apply_in_place(&self, row: &mut [u8]) {
        for v in row.iter_mut() {
            *v = self.0[*v as usize];
        }
    }
}

impl Default for LookupTable {
    fn default() -> Self {
        Self::identity()
    }
}

impl std::ops::Index<u8> for LookupTable {
    type Output = u8;

    fn index(&self, value: u8) -> &u8 {
        &self.0[value as usize]
    }
}

impl std::fmt::Debug for LookupTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "LookupTable[{}, {}, .., {}, {}]",
            self.0[0], self.0[1], self.0[254], self.0[255]
        )
    }
}

/// Parameters of a linear remap with optional gamma
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RemapParams {
    pub input_low: u8,
    pub input_high: u8,
    pub output_low: u8,
    pub output_high: u8,
    /// Gamma exponent applied after the remap; `None` keeps the curve linear
    pub gamma: Option<f64>,
}

impl RemapParams {
    pub fn new(input_low: u8, input_high: u8, output_low: u8, output_high: u8) -> Self {
        Self {
            input_low,
            input_high,
            output_low,
            output_high,
            gamma: None,
        }
    }

    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.gamma = Some(gamma);
        self
    }

    /// Remap a single input value (before the final clamp)
    pub fn remap(&self, i: i32) -> i32 {
        let il = self.input_low as i32;
        let ih = self.input_high as i32;
        let ol = self.output_low as i32;
        let oh = self.output_high as i32;
        let din = ih - il;
        let dout = oh - ol;

        let mut y = if din != 0 {
            if (i < il && il < ih) || (i > il && il > ih) {
                ol
            } else if (i < ih && il > ih) || (i > ih && il < ih) {
                oh
            } else {
                ol + ((i - il) * dout + din / 2) / din
            }
        } else if i < il {
            ol
        } else {
            oh
        };

        if let Some(gamma) = self.gamma {
            if dout != 0 {
                let span = dout as f64;
                let norm = (y - ol) as f64 / span;
                y = (norm.powf(gamma) * span + ol as f64).round() as i32;
            }
        }

        y
    }

    /// Build the full table
    pub fn build(&self) -> LookupTable {
        LookupTable::from_fn(|i| self.remap(i))
    }
}

impl Default for RemapParams {
    fn default() -> Self {
        Self::new(0, 255, 0, 255)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_defaults() {
        assert_eq!(RemapParams::default().build(), LookupTable::identity());
    }

    #[test]
    fn test_contrast_stretch() {
        let lut = RemapParams::new(80, 168, 0, 255).with_gamma(1.0).build();
        assert_eq!(lut[0], 0);
        assert_eq!(lut[80], 0);
        assert_eq!(lut[168], 255);
        assert_eq!(lut[255], 255);
        // 48 * 255 / 88 = 139.09
        assert_eq!(lut[128], 139);
    }

    #[test]
    fn test_monotonic_inside_window() {
        for (il, ih) in [(0u8, 255u8), (80, 168), (10, 11), (200, 250)] {
            let lut = RemapParams::new(il, ih, 0, 255).build();
            for i in 1..=255u8 {
                assert!(lut[i] >= lut[i - 1], "not monotonic at {} for {}..{}", i, il, ih);
            }
        }
    }

    #[test]
    fn test_inverted_window() {
        let lut = RemapParams::new(200, 50, 0, 255).build();
        // above the (inverted) low bound clamps to output_low
        assert_eq!(lut[255], 0);
        assert_eq!(lut[200], 0);
        // below the high bound clamps to output_high
        assert_eq!(lut[0], 255);
        assert_eq!(lut[50], 255);
        // (125 - 200) * 255 + (-150 / 2) = -19200; / -150 = 128
        assert_eq!(lut[125], 128);
        for i in 51..=200u8 {
            assert!(lut[i] <= lut[i - 1]);
        }
    }

    #[test]
    fn test_degenerate_window() {
        let lut = RemapParams::new(100, 100, 16, 235).build();
        assert_eq!(lut[99], 16);
        assert_eq!(lut[100], 235);
        assert_eq!(lut[255], 235);
        assert_eq!(lut[0], 16);
    }

    #[test]
    fn test_studio_output_window() {
        let lut = RemapParams::new(0, 255, 16, 235).build();
        assert_eq!(lut[0], 16);
        assert_eq!(lut[255], 235);
        assert!(lut.as_slice().iter().all(|&v| (16..=235).contains(&v)));
    }

    #[test]
    fn test_gamma_after_remap() {
        let linear = RemapParams::new(80, 168, 0, 255).build();
        let curved = RemapParams::new(80, 168, 0, 255).with_gamma(2.2).build();
        // end points are fixed by the remap, not moved by the exponent
        assert_eq!(curved[80], 0);
        assert_eq!(curved[168], 255);
        let expected = ((linear[128] as f64 / 255.0).powf(2.2) * 255.0).round() as u8;
        assert_eq!(curved[128], expected);
        assert!(curved[128] < linear[128]);
    }

    #[test]
    fn test_gamma_unit_is_linear() {
        let linear = RemapParams::new(30, 220, 0, 255).build();
        let unit = RemapParams::new(30, 220, 0, 255).with_gamma(1.0).build();
        assert_eq!(linear, unit);
    }

    #[test]
    fn test_all_params_stay_in_range() {
        for il in (0..=255u8).step_by(51) {
            for ih in (0..=255u8).step_by(51) {
                for gamma in [None, Some(0.2), Some(5.0)] {
                    let params = RemapParams {
                        input_low: il,
                        input_high: ih,
                        output_low: 0,
                        output_high: 255,
                        gamma,
                    };
                    // from_fn clamps; the raw remap never leaves the output window
                    for i in 0..256 {
                        let v = params.remap(i);
                        assert!((0..=255).contains(&v));
                    }
                }
            }
        }
    }

    #[test]
    fn test_apply_row() {
        let lut = LookupTable::from_fn(|i| 255 - i);
        let mut row = [0u8, 10, 255];
        lut.apply_in_place(&mut row);
        assert_eq!(row, [255, 245, 0]);
        let mut out = [0u8; 3];
        lut.apply_row(&row, &mut out);
        assert_eq!(out, [0, 10, 255]);
    }
}
