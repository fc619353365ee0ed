//! Configuration types for inkframe

use crate::error::{Error, Result};
use crate::filter::OptionValues;
use crate::processing::{BoostOrder, ComicMode, CompareMode};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Comic monochrome filter configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonoComicConfig {
    /// Output style
    pub mode: ComicMode,
    /// Input level mapped to black
    #[serde(alias = "il")]
    pub input_low: u8,
    /// Input level mapped to white
    #[serde(alias = "ih")]
    pub input_high: u8,
    /// Saturation to contrast rate, 0-100
    #[serde(alias = "s")]
    pub saturation: f64,
    /// Side-by-side compare mode
    pub compare: CompareMode,
    /// Limit gray output to studio range
    #[serde(alias = "mpeg")]
    pub studio_range: bool,
    /// Boost before or after the remap
    #[serde(alias = "type")]
    pub boost: BoostOrder,
    /// Pattern placement coefficient, 0-127
    #[serde(alias = "ptc")]
    pub pattern_coefficient: u8,
    /// Gamma applied in tone modes, 0.2-5
    pub gamma: f64,
}

impl Default for MonoComicConfig {
    fn default() -> Self {
        Self {
            mode: ComicMode::Dot,
            input_low: 80,
            input_high: 168,
            saturation: 0.0,
            compare: CompareMode::Off,
            studio_range: false,
            boost: BoostOrder::Pre,
            pattern_coefficient: 45,
            gamma: 2.2,
        }
    }
}

impl MonoComicConfig {
    pub fn with_mode(mut self, mode: ComicMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_input_range(mut self, low: u8, high: u8) -> Self {
        self.input_low = low;
        self.input_high = high;
        self
    }

    pub fn with_saturation(mut self, rate: f64) -> Self {
        self.saturation = rate;
        self
    }

    pub fn with_compare(mut self, compare: CompareMode) -> Self {
        self.compare = compare;
        self
    }

    pub fn with_studio_range(mut self, studio: bool) -> Self {
        self.studio_range = studio;
        self
    }

    pub fn with_boost(mut self, boost: BoostOrder) -> Self {
        self.boost = boost;
        self
    }

    pub fn with_pattern_coefficient(mut self, coefficient: u8) -> Self {
        self.pattern_coefficient = coefficient;
        self
    }

    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.gamma = gamma;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=100.0).contains(&self.saturation) {
            return Err(Error::InvalidOption(format!(
                "saturation rate {} out of range [0 - 100]",
                self.saturation
            )));
        }
        if self.pattern_coefficient > 127 {
            return Err(Error::InvalidOption(format!(
                "pattern coefficient {} out of range [0 - 127]",
                self.pattern_coefficient
            )));
        }
        if !(0.2..=5.0).contains(&self.gamma) {
            return Err(Error::InvalidOption(format!(
                "gamma {} out of range [0.2 - 5]",
                self.gamma
            )));
        }
        Ok(())
    }

    /// Build from parsed host options
    pub fn from_options(values: &OptionValues) -> Result<Self> {
        let mode = match values.get_i64("mode")? {
            0 => ComicMode::Gray,
            1 => ComicMode::Dot,
            2 => ComicMode::Horizontal,
            3 => ComicMode::Vertical,
            4 => ComicMode::Diagonal,
            _ => ComicMode::Pattern,
        };
        let compare = match values.get_i64("compare")? {
            0 => CompareMode::Off,
            1 => CompareMode::Color,
            _ => CompareMode::Mono,
        };
        let boost = if values.get_bool("type")? {
            BoostOrder::Post
        } else {
            BoostOrder::Pre
        };
        let config = Self {
            mode,
            input_low: values.get_u8("il")?,
            input_high: values.get_u8("ih")?,
            saturation: values.get_f64("s")?,
            compare,
            studio_range: values.get_bool("mpeg")?,
            boost,
            pattern_coefficient: values.get_u8("ptc")?,
            gamma: values.get_f64("gamma")?,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Range converter operating mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RangeConvMode {
    /// Custom remap of the luma plane
    Y,
    /// Custom remap of the Cb plane
    #[serde(alias = "u")]
    Cb,
    /// Custom remap of the Cr plane
    #[serde(alias = "v")]
    Cr,
    /// Custom remap of the alpha plane
    A,
    /// Studio range to full range
    #[default]
    #[serde(alias = "jpeg")]
    Full,
    /// Full range to studio range
    #[serde(alias = "tv")]
    Mpeg,
    /// Pass through unchanged
    Through,
}

impl RangeConvMode {
    /// Plane remapped by a custom-window mode
    pub fn custom_plane(&self) -> Option<usize> {
        match self {
            RangeConvMode::Y => Some(0),
            RangeConvMode::Cb => Some(1),
            RangeConvMode::Cr => Some(2),
            RangeConvMode::A => Some(3),
            _ => None,
        }
    }

    pub fn is_conversion(&self) -> bool {
        matches!(self, RangeConvMode::Full | RangeConvMode::Mpeg)
    }
}

/// YUV range converter configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RangeConvConfig {
    pub mode: RangeConvMode,
    #[serde(alias = "il")]
    pub input_low: u8,
    #[serde(alias = "ih")]
    pub input_high: u8,
    #[serde(alias = "ol")]
    pub output_low: u8,
    #[serde(alias = "oh")]
    pub output_high: u8,
    /// Convert only the left half of the frame
    pub compare: bool,
    /// Convert only frames whose tagged range disagrees with the target
    pub autodetect: bool,
}

impl Default for RangeConvConfig {
    fn default() -> Self {
        Self {
            mode: RangeConvMode::Full,
            input_low: 0,
            input_high: 255,
            output_low: 0,
            output_high: 255,
            compare: false,
            autodetect: false,
        }
    }
}

impl RangeConvConfig {
    pub fn with_mode(mut self, mode: RangeConvMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_input_range(mut self, low: u8, high: u8) -> Self {
        self.input_low = low;
        self.input_high = high;
        self
    }

    pub fn with_output_range(mut self, low: u8, high: u8) -> Self {
        self.output_low = low;
        self.output_high = high;
        self
    }

    pub fn with_compare(mut self, compare: bool) -> Self {
        self.compare = compare;
        self
    }

    pub fn with_autodetect(mut self, autodetect: bool) -> Self {
        self.autodetect = autodetect;
        self
    }

    /// Autodetect after applying the `full:N` / `mpeg:N` shorthand, where a
    /// non-zero input low switches autodetection on
    pub fn effective_autodetect(&self) -> bool {
        self.autodetect || (self.mode.is_conversion() && self.input_low != 0)
    }

    pub fn from_options(values: &OptionValues) -> Result<Self> {
        let mode = match values.get_i64("mode")? {
            0 => RangeConvMode::Y,
            1 => RangeConvMode::Cb,
            2 => RangeConvMode::Cr,
            3 => RangeConvMode::A,
            4 => RangeConvMode::Full,
            5 => RangeConvMode::Mpeg,
            _ => RangeConvMode::Through,
        };
        Ok(Self {
            mode,
            input_low: values.get_u8("il")?,
            input_high: values.get_u8("ih")?,
            output_low: values.get_u8("ol")?,
            output_high: values.get_u8("oh")?,
            compare: values.get_bool("compare")?,
            autodetect: values.get_bool("autodetect")?,
        })
    }
}

/// Field separation mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeparateFieldsMode {
    /// Two fields per frame
    #[default]
    Normal,
    /// Emit a third field for frames flagged with one repeated field
    #[serde(alias = "rff")]
    Repeat,
}

/// Field separation configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeparateFieldsConfig {
    pub mode: SeparateFieldsMode,
}

impl SeparateFieldsConfig {
    pub fn with_mode(mut self, mode: SeparateFieldsMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn from_options(values: &OptionValues) -> Result<Self> {
        let mode = if values.get_i64("mode")? == 0 {
            SeparateFieldsMode::Normal
        } else {
            SeparateFieldsMode::Repeat
        };
        Ok(Self { mode })
    }
}

/// Where the frame information goes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShowInfoMode {
    /// Log lines only
    #[default]
    Log,
    /// Frame metadata only
    Metadata,
    /// Both
    All,
}

impl ShowInfoMode {
    pub fn logs(&self) -> bool {
        matches!(self, ShowInfoMode::Log | ShowInfoMode::All)
    }

    pub fn tags(&self) -> bool {
        matches!(self, ShowInfoMode::Metadata | ShowInfoMode::All)
    }
}

/// Frame information filter configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShowInfoConfig {
    pub mode: ShowInfoMode,
}

impl ShowInfoConfig {
    pub fn with_mode(mut self, mode: ShowInfoMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn from_options(values: &OptionValues) -> Result<Self> {
        let mode = match values.get_i64("mode")? {
            0 => ShowInfoMode::Log,
            1 => ShowInfoMode::Metadata,
            _ => ShowInfoMode::All,
        };
        Ok(Self { mode })
    }
}

/// One filter of a graph file, tagged by filter name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "lowercase")]
pub enum FilterConfig {
    Monocomic(MonoComicConfig),
    Yuvrangeconv(RangeConvConfig),
    Separatefields(SeparateFieldsConfig),
    Showinfo(ShowInfoConfig),
}

impl FilterConfig {
    pub fn name(&self) -> &'static str {
        match self {
            FilterConfig::Monocomic(_) => "monocomic",
            FilterConfig::Yuvrangeconv(_) => "yuvrangeconv",
            FilterConfig::Separatefields(_) => "separatefields",
            FilterConfig::Showinfo(_) => "showinfo",
        }
    }
}

/// A linear filter graph loaded from TOML
///
/// ```toml
/// [[filter]]
/// name = "yuvrangeconv"
/// mode = "full"
///
/// [[filter]]
/// name = "monocomic"
/// mode = "pattern"
/// ptc = 45
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterGraphConfig {
    #[serde(default, rename = "filter")]
    pub filters: Vec<FilterConfig>,
}

impl FilterGraphConfig {
    pub fn from_toml(text: &str) -> Result<Self> {
        let graph: Self = toml::from_str(text)?;
        graph.validate()?;
        Ok(graph)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        tracing::debug!("Loading filter graph from {}", path.display());
        Self::from_toml(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if self.filters.is_empty() {
            return Err(Error::Config("filter graph has no filters".to_string()));
        }
        for filter in &self.filters {
            if let FilterConfig::Monocomic(config) = filter {
                config.validate()?;
            }
        }
        Ok(())
    }

    pub fn with_filter(mut self, filter: FilterConfig) -> Self {
        self.filters.push(filter);
        self
    }
}
