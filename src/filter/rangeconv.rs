//! YUV range converter
//!
//! Converts between BT.601 studio and full range, or remaps a single plane
//! through a custom input/output window. The frame's range tag is left as
//! it arrived.

use super::{
    check_format, check_frame, FilterContext, FilterDescriptor, OptionDef, OptionValues,
    VideoFilter,
};
use crate::config::{RangeConvConfig, RangeConvMode};
use crate::error::Result;
use crate::processing::{
    lut_copy, lut_in_place, LookupTable, PlaneGeometry, RangeTables, RemapParams,
};
use crate::types::{ColorRange, Frame, LinkProps, PixelFormat};

/// Accepted pixel formats
pub const FORMATS: &[PixelFormat] = &[
    PixelFormat::Yuv444p,
    PixelFormat::Yuv422p,
    PixelFormat::Yuv420p,
    PixelFormat::Yuv411p,
    PixelFormat::Yuv410p,
    PixelFormat::Yuv440p,
    PixelFormat::Yuva444p,
    PixelFormat::Yuva422p,
    PixelFormat::Yuva420p,
];

const MODES: &[(&str, i64)] = &[
    ("y", 0),
    ("u", 1),
    ("v", 2),
    ("a", 3),
    ("cb", 1),
    ("cr", 2),
    ("full", 4),
    ("jpeg", 4),
    ("mpeg", 5),
    ("tv", 5),
    ("through", 6),
];

/// Option table, in positional order
pub static OPTIONS: &[OptionDef] = &[
    OptionDef::int("mode", "select mode", 4, 0, 6).with_constants(MODES),
    OptionDef::int("il", "input min", 0, 0, 255),
    OptionDef::int("ih", "input max", 255, 0, 255),
    OptionDef::int("ol", "output min", 0, 0, 255),
    OptionDef::int("oh", "output max", 255, 0, 255),
    OptionDef::int("compare", "compare effect", 0, 0, 1),
    OptionDef::int("autodetect", "convert by auto detect", 0, 0, 1),
];

pub const DESCRIPTOR: FilterDescriptor = FilterDescriptor {
    name: "yuvrangeconv",
    description: "YUV range converter.",
    options: OPTIONS,
    create,
};

fn create(values: &OptionValues) -> Result<Box<dyn VideoFilter>> {
    Ok(Box::new(RangeConv::new(RangeConvConfig::from_options(values)?)))
}

/// Range converter state
#[derive(Debug)]
pub struct RangeConv {
    config: RangeConvConfig,
    autodetect: bool,
    custom: [LookupTable; 4],
    to_full: RangeTables,
    to_studio: RangeTables,
    link: Option<LinkProps>,
}

impl RangeConv {
    pub fn new(config: RangeConvConfig) -> Self {
        let autodetect = config.effective_autodetect();
        let custom = Self::build_custom(&config);
        Self {
            config,
            autodetect,
            custom,
            to_full: RangeTables::studio_to_full(),
            to_studio: RangeTables::full_to_studio(),
            link: None,
        }
    }

    /// Identity tables, except the plane a custom mode remaps
    fn build_custom(config: &RangeConvConfig) -> [LookupTable; 4] {
        let mut tables: [LookupTable; 4] = Default::default();
        if let Some(plane) = config.mode.custom_plane() {
            tables[plane] = RemapParams::new(
                config.input_low,
                config.input_high,
                config.output_low,
                config.output_high,
            )
            .build();
        }
        tables
    }

    pub fn config(&self) -> &RangeConvConfig {
        &self.config
    }

    pub fn autodetect(&self) -> bool {
        self.autodetect
    }

    /// Tables to apply to a frame tagged with `range`
    pub fn tables_for(&self, range: ColorRange) -> [&LookupTable; 4] {
        let conversion = match self.config.mode {
            RangeConvMode::Mpeg if !self.autodetect || range != ColorRange::Mpeg => {
                Some(&self.to_studio)
            }
            RangeConvMode::Full if !self.autodetect || range == ColorRange::Mpeg => {
                Some(&self.to_full)
            }
            _ => None,
        };
        match conversion {
            Some(t) => [t.plane(0), t.plane(1), t.plane(2), t.plane(3)],
            None => [&self.custom[0], &self.custom[1], &self.custom[2], &self.custom[3]],
        }
    }
}

impl VideoFilter for RangeConv {
    fn name(&self) -> &'static str {
        "yuvrangeconv"
    }

    fn supported_formats(&self) -> Option<&'static [PixelFormat]> {
        Some(FORMATS)
    }

    fn configure(&mut self, input: &LinkProps) -> Result<LinkProps> {
        check_format(self.name(), FORMATS, input)?;
        self.autodetect = self.config.effective_autodetect();
        self.custom = Self::build_custom(&self.config);
        self.link = Some(*input);
        tracing::debug!(
            "yuvrangeconv configured: {}x{} {} mode {:?} (autodetect: {})",
            input.width,
            input.height,
            input.format,
            self.config.mode,
            self.autodetect
        );
        Ok(*input)
    }

    fn filter_frame(&mut self, mut frame: Frame, ctx: &mut FilterContext<'_>) -> Result<()> {
        let link = check_frame(self.name(), self.link.as_ref(), &frame)?;
        let geom = PlaneGeometry::from_link(&link);
        let tables = self.tables_for(frame.color_range);

        if frame.is_writable() {
            lut_in_place(&mut frame, tables, &geom, self.config.compare);
            return ctx.push_frame(frame);
        }

        let mut out = ctx.allocate_frame(link.width, link.height, link.format)?;
        out.copy_props_from(&frame);
        lut_copy(&frame, &mut out, tables, &geom, self.config.compare);
        drop(frame);
        ctx.push_frame(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::create_filter;
    use crate::filter::testing::{collect, gradient_frame};

    fn configured(config: RangeConvConfig, format: PixelFormat) -> RangeConv {
        let mut filter = RangeConv::new(config);
        filter.configure(&LinkProps::new(6, 4, format)).unwrap();
        filter
    }

    fn luma_frame(value: u8, format: PixelFormat, range: ColorRange) -> Frame {
        let mut frame = Frame::new(6, 4, format).unwrap();
        for plane in frame.planes_mut() {
            plane.fill(value);
        }
        frame.color_range = range;
        frame
    }

    #[test]
    fn test_full_mode_expands_studio() {
        let mut filter = configured(RangeConvConfig::default(), PixelFormat::Yuv420p);
        let out = collect(|ctx| {
            filter.filter_frame(luma_frame(16, PixelFormat::Yuv420p, ColorRange::Unspecified), ctx)
        })
        .unwrap();
        assert!(out[0].planes()[0].row(0).iter().all(|&v| v == 0));
        assert!(out[0].planes()[1].row(0).iter().all(|&v| v == 0));
        // the tag is not rewritten
        assert_eq!(out[0].color_range, ColorRange::Unspecified);
    }

    #[test]
    fn test_mpeg_mode_compresses_full() {
        let config = RangeConvConfig::default().with_mode(RangeConvMode::Mpeg);
        let mut filter = configured(config, PixelFormat::Yuva420p);
        let out = collect(|ctx| {
            filter.filter_frame(luma_frame(255, PixelFormat::Yuva420p, ColorRange::Jpeg), ctx)
        })
        .unwrap();
        let planes = out[0].planes();
        assert_eq!(planes[0].row(3)[5], 235);
        assert_eq!(planes[1].row(1)[2], 239);
        // alpha passes through
        assert_eq!(planes[3].row(3)[5], 255);
    }

    #[test]
    fn test_autodetect_selection() {
        let mpeg = RangeConv::new(
            RangeConvConfig::default()
                .with_mode(RangeConvMode::Mpeg)
                .with_autodetect(true),
        );
        assert_eq!(mpeg.tables_for(ColorRange::Mpeg)[0], &LookupTable::identity());
        assert_eq!(mpeg.tables_for(ColorRange::Jpeg)[0][0], 16);
        assert_eq!(mpeg.tables_for(ColorRange::Unspecified)[0][0], 16);

        let full = RangeConv::new(RangeConvConfig::default().with_autodetect(true));
        assert_eq!(full.tables_for(ColorRange::Mpeg)[0][16], 0);
        assert_eq!(full.tables_for(ColorRange::Jpeg)[0], &LookupTable::identity());
        assert_eq!(full.tables_for(ColorRange::Unspecified)[0], &LookupTable::identity());

        let forced = RangeConv::new(RangeConvConfig::default());
        assert_eq!(forced.tables_for(ColorRange::Jpeg)[0][16], 0);
    }

    #[test]
    fn test_shorthand_enables_autodetect() {
        let values = OptionValues::parse(OPTIONS, "full:1").unwrap();
        let filter = RangeConv::new(RangeConvConfig::from_options(&values).unwrap());
        assert!(filter.autodetect());
        assert_eq!(filter.tables_for(ColorRange::Jpeg)[0], &LookupTable::identity());
    }

    #[test]
    fn test_custom_plane_modes() {
        for (mode, plane) in [
            (RangeConvMode::Y, 0usize),
            (RangeConvMode::Cb, 1),
            (RangeConvMode::Cr, 2),
            (RangeConvMode::A, 3),
        ] {
            let config = RangeConvConfig::default()
                .with_mode(mode)
                .with_input_range(0, 255)
                .with_output_range(255, 0);
            let filter = RangeConv::new(config);
            let tables = filter.tables_for(ColorRange::Unspecified);
            for (p, table) in tables.iter().enumerate() {
                if p == plane {
                    assert_eq!(table[0], 255);
                    // the half-up offset truncates toward zero on a falling curve
                    assert_eq!(table[255], 1);
                    assert!(table[128] < table[127]);
                } else {
                    assert_eq!(*table, &LookupTable::identity());
                }
            }
        }
    }

    #[test]
    fn test_through_is_identity() {
        let filter = RangeConv::new(RangeConvConfig::default().with_mode(RangeConvMode::Through));
        assert!(filter
            .tables_for(ColorRange::Mpeg)
            .iter()
            .all(|t| *t == &LookupTable::identity()));
    }

    #[test]
    fn test_compare_copies_right_half_of_shared_frame() {
        let config = RangeConvConfig::default()
            .with_mode(RangeConvMode::Mpeg)
            .with_compare(true);
        let mut filter = configured(config, PixelFormat::Yuv422p);
        let src = gradient_frame(6, 4, PixelFormat::Yuv422p);
        let keep = src.clone();
        let out = collect(|ctx| filter.filter_frame(src, ctx)).unwrap();

        let luma = RangeTables::full_to_studio();
        for y in 0..4 {
            let (got, orig) = (out[0].planes()[0].row(y), keep.planes()[0].row(y));
            assert_eq!(&got[3..], &orig[3..]);
            for x in 0..3 {
                assert_eq!(got[x], luma.luma()[orig[x]]);
            }
            // chroma is 3 wide: one converted column, two copied
            let (got, orig) = (out[0].planes()[2].row(y), keep.planes()[2].row(y));
            assert_eq!(got[0], luma.chroma()[orig[0]]);
            assert_eq!(&got[1..], &orig[1..]);
        }
    }

    #[test]
    fn test_accepts_every_planar_format() {
        let mut filter = create_filter("yuvrangeconv").unwrap();
        // every planar 8-bit format the crate knows is accepted
        for format in PixelFormat::ALL {
            assert!(filter.configure(&LinkProps::new(8, 8, format)).is_ok());
        }
        assert_eq!(filter.supported_formats().map(|f| f.len()), Some(9));
    }
}
