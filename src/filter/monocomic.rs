//! Comic-like monochrome filter
//!
//! Luma goes through a contrast remap (with gamma in tone modes), an optional
//! saturation-driven boost, and then either straight out as gray or through a
//! halftone tone matrix. Chroma is neutralised.

use super::{
    check_format, check_frame, FilterContext, FilterDescriptor, OptionDef, OptionValues,
    VideoFilter,
};
use crate::config::MonoComicConfig;
use crate::error::Result;
use crate::processing::{
    comic_copy, comic_in_place, ComicKernel, ComicMode, LookupTable, PlaneGeometry, RemapParams,
    ToneMatrix,
};
use crate::types::{Frame, LinkProps, PixelFormat};

/// Accepted pixel formats
pub const FORMATS: &[PixelFormat] = &[
    PixelFormat::Yuv444p,
    PixelFormat::Yuv422p,
    PixelFormat::Yuv420p,
];

const MODES: &[(&str, i64)] = &[
    ("gray", 0),
    ("dot", 1),
    ("horizontal", 2),
    ("vertical", 3),
    ("diagonal", 4),
    ("pattern", 5),
];

/// Option table, in positional order
pub static OPTIONS: &[OptionDef] = &[
    OptionDef::int("mode", "select mode", 1, 0, 5).with_constants(MODES),
    OptionDef::int("il", "input min", 80, 0, 255),
    OptionDef::int("ih", "input max", 168, 0, 255),
    OptionDef::double("s", "saturation to contrast rate", 0.0, 0.0, 100.0),
    OptionDef::int("compare", "compare effect", 0, 0, 2),
    OptionDef::int("mpeg", "limit output to mpeg range", 0, 0, 1),
    OptionDef::int("type", "filter type", 0, 0, 1),
    OptionDef::int("ptc", "pattern coefficient", 45, 0, 127),
    OptionDef::double("gamma", "gamma correction", 2.2, 0.2, 5.0),
];

pub const DESCRIPTOR: FilterDescriptor = FilterDescriptor {
    name: "monocomic",
    description: "Comic like Monochrome filter.",
    options: OPTIONS,
    create,
};

fn create(values: &OptionValues) -> Result<Box<dyn VideoFilter>> {
    Ok(Box::new(MonoComic::new(MonoComicConfig::from_options(values)?)?))
}

/// Comic monochrome filter state
#[derive(Debug)]
pub struct MonoComic {
    config: MonoComicConfig,
    lut: LookupTable,
    dot: ToneMatrix,
    pattern: ToneMatrix,
    saturation_rate: i32,
    link: Option<LinkProps>,
}

impl MonoComic {
    /// Create the filter and its tone matrices
    pub fn new(config: MonoComicConfig) -> Result<Self> {
        config.validate()?;
        let dot = ToneMatrix::dot(config.studio_range)?;
        let pattern = ToneMatrix::pattern(config.pattern_coefficient, config.studio_range)?;
        let lut = Self::build_lut(&config);
        let saturation_rate = ComicKernel::saturation_rate(config.saturation);
        Ok(Self {
            config,
            lut,
            dot,
            pattern,
            saturation_rate,
            link: None,
        })
    }

    /// Contrast remap for a configuration
    ///
    /// Output spans 16-235 only for studio-range gray; gamma applies in every
    /// tone mode.
    pub fn build_lut(config: &MonoComicConfig) -> LookupTable {
        let (low, high) = if config.studio_range && config.mode == ComicMode::Gray {
            (16, 235)
        } else {
            (0, 255)
        };
        let mut params = RemapParams::new(config.input_low, config.input_high, low, high);
        if config.mode.is_tone() {
            params = params.with_gamma(config.gamma);
        }
        params.build()
    }

    pub fn config(&self) -> &MonoComicConfig {
        &self.config
    }

    pub fn lut(&self) -> &LookupTable {
        &self.lut
    }

    fn kernel(&self) -> ComicKernel<'_> {
        ComicKernel {
            lut: &self.lut,
            dot: &self.dot,
            pattern: &self.pattern,
            mode: self.config.mode,
            boost: self.config.boost,
            saturation_rate: self.saturation_rate,
            studio_clamp: self.config.studio_range,
        }
    }
}

impl VideoFilter for MonoComic {
    fn name(&self) -> &'static str {
        "monocomic"
    }

    fn supported_formats(&self) -> Option<&'static [PixelFormat]> {
        Some(FORMATS)
    }

    fn configure(&mut self, input: &LinkProps) -> Result<LinkProps> {
        check_format(self.name(), FORMATS, input)?;
        self.lut = Self::build_lut(&self.config);
        self.link = Some(*input);
        tracing::debug!(
            "monocomic configured: {}x{} {} mode {:?}, lut {:?}",
            input.width,
            input.height,
            input.format,
            self.config.mode,
            self.lut
        );
        Ok(*input)
    }

    fn filter_frame(&mut self, mut frame: Frame, ctx: &mut FilterContext<'_>) -> Result<()> {
        let link = check_frame(self.name(), self.link.as_ref(), &frame)?;
        let geom = PlaneGeometry::from_link(&link);
        let kernel = self.kernel();

        if frame.is_writable() {
            comic_in_place(&mut frame, &kernel, &geom, self.config.compare);
            return ctx.push_frame(frame);
        }

        let mut out = ctx.allocate_frame(link.width, link.height, link.format)?;
        out.copy_props_from(&frame);
        comic_copy(&frame, &mut out, &kernel, &geom, self.config.compare);
        drop(frame);
        ctx.push_frame(out)
    }
}
