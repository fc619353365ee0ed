//! Common types used throughout inkframe

use crate::error::{try_alloc, Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Row alignment used for freshly allocated planes
pub const PLANE_ALIGN: usize = 32;

/// Video resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl std::str::FromStr for Resolution {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (w, h) = s
            .split_once(['x', 'X'])
            .ok_or_else(|| Error::InvalidGeometry(format!("expected WxH, got '{}'", s)))?;
        let width = w
            .trim()
            .parse()
            .map_err(|_| Error::InvalidGeometry(format!("bad width in '{}'", s)))?;
        let height = h
            .trim()
            .parse()
            .map_err(|_| Error::InvalidGeometry(format!("bad height in '{}'", s)))?;
        if width == 0 || height == 0 {
            return Err(Error::InvalidGeometry(format!("empty frame size '{}'", s)));
        }
        Ok(Self::new(width, height))
    }
}

/// Rational number (time base, frame rate, aspect ratio)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rational {
    pub num: i32,
    pub den: i32,
}

impl Rational {
    pub const fn new(num: i32, den: i32) -> Self {
        Self { num, den }
    }

    /// Value as f64 (NaN when the denominator is zero)
    pub fn as_f64(&self) -> f64 {
        if self.den == 0 {
            f64::NAN
        } else {
            self.num as f64 / self.den as f64
        }
    }
}

impl Default for Rational {
    fn default() -> Self {
        Self::new(0, 1)
    }
}

impl std::fmt::Display for Rational {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

impl std::str::FromStr for Rational {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let bad = || Error::Config(format!("expected NUM/DEN or NUM, got '{}'", s));
        match s.split_once('/') {
            Some((n, d)) => Ok(Self::new(
                n.trim().parse().map_err(|_| bad())?,
                d.trim().parse().map_err(|_| bad())?,
            )),
            None => Ok(Self::new(s.trim().parse().map_err(|_| bad())?, 1)),
        }
    }
}

/// Planar 8-bit YUV pixel formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PixelFormat {
    /// 4:2:0, chroma halved in both directions
    Yuv420p,
    /// 4:2:2, chroma halved horizontally
    Yuv422p,
    /// 4:4:4, no subsampling
    Yuv444p,
    /// 4:1:1, chroma quartered horizontally
    Yuv411p,
    /// 4:1:0, chroma quartered in both directions
    Yuv410p,
    /// 4:4:0, chroma halved vertically
    Yuv440p,
    /// 4:2:0 with alpha plane
    Yuva420p,
    /// 4:2:2 with alpha plane
    Yuva422p,
    /// 4:4:4 with alpha plane
    Yuva444p,
}

impl PixelFormat {
    pub const ALL: [PixelFormat; 9] = [
        PixelFormat::Yuv420p,
        PixelFormat::Yuv422p,
        PixelFormat::Yuv444p,
        PixelFormat::Yuv411p,
        PixelFormat::Yuv410p,
        PixelFormat::Yuv440p,
        PixelFormat::Yuva420p,
        PixelFormat::Yuva422p,
        PixelFormat::Yuva444p,
    ];

    /// Host name of the format
    pub fn name(&self) -> &'static str {
        match self {
            PixelFormat::Yuv420p => "yuv420p",
            PixelFormat::Yuv422p => "yuv422p",
            PixelFormat::Yuv444p => "yuv444p",
            PixelFormat::Yuv411p => "yuv411p",
            PixelFormat::Yuv410p => "yuv410p",
            PixelFormat::Yuv440p => "yuv440p",
            PixelFormat::Yuva420p => "yuva420p",
            PixelFormat::Yuva422p => "yuva422p",
            PixelFormat::Yuva444p => "yuva444p",
        }
    }

    /// Horizontal chroma subsampling shift
    pub fn log2_chroma_w(&self) -> u32 {
        match self {
            PixelFormat::Yuv444p | PixelFormat::Yuva444p | PixelFormat::Yuv440p => 0,
            PixelFormat::Yuv420p
            | PixelFormat::Yuva420p
            | PixelFormat::Yuv422p
            | PixelFormat::Yuva422p => 1,
            PixelFormat::Yuv411p | PixelFormat::Yuv410p => 2,
        }
    }

    /// Vertical chroma subsampling shift
    pub fn log2_chroma_h(&self) -> u32 {
        match self {
            PixelFormat::Yuv444p
            | PixelFormat::Yuva444p
            | PixelFormat::Yuv422p
            | PixelFormat::Yuva422p
            | PixelFormat::Yuv411p => 0,
            PixelFormat::Yuv420p | PixelFormat::Yuva420p | PixelFormat::Yuv440p => 1,
            PixelFormat::Yuv410p => 2,
        }
    }

    pub fn has_alpha(&self) -> bool {
        matches!(
            self,
            PixelFormat::Yuva420p | PixelFormat::Yuva422p | PixelFormat::Yuva444p
        )
    }

    pub fn plane_count(&self) -> usize {
        if self.has_alpha() {
            4
        } else {
            3
        }
    }

    /// Chroma plane width for a luma width (rounded up)
    pub fn chroma_width(&self, width: usize) -> usize {
        ceil_rshift(width, self.log2_chroma_w())
    }

    /// Chroma plane height for a luma height (rounded up)
    pub fn chroma_height(&self, height: usize) -> usize {
        ceil_rshift(height, self.log2_chroma_h())
    }

    /// Dimensions of plane `index` for a frame of the given size
    pub fn plane_size(&self, index: usize, width: usize, height: usize) -> (usize, usize) {
        if index == 1 || index == 2 {
            (self.chroma_width(width), self.chroma_height(height))
        } else {
            (width, height)
        }
    }

    /// Size in bytes of one tightly packed frame
    pub fn frame_size(&self, width: usize, height: usize) -> usize {
        (0..self.plane_count())
            .map(|i| {
                let (w, h) = self.plane_size(i, width, height);
                w * h
            })
            .sum()
    }
}

impl std::fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for PixelFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        PixelFormat::ALL
            .iter()
            .copied()
            .find(|f| f.name() == s)
            .ok_or_else(|| Error::UnsupportedFormat(s.to_string()))
    }
}

fn ceil_rshift(value: usize, shift: u32) -> usize {
    (value + (1 << shift) - 1) >> shift
}

/// Tagged YUV color range of a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorRange {
    #[default]
    Unspecified,
    /// Studio range (Y 16-235, C 16-240)
    Mpeg,
    /// Full range (0-255)
    Jpeg,
}

impl ColorRange {
    /// Host numeric code
    pub fn code(&self) -> i32 {
        match self {
            ColorRange::Unspecified => 0,
            ColorRange::Mpeg => 1,
            ColorRange::Jpeg => 2,
        }
    }
}

impl std::str::FromStr for ColorRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "unknown" | "unspecified" => Ok(ColorRange::Unspecified),
            "tv" | "mpeg" | "limited" => Ok(ColorRange::Mpeg),
            "pc" | "jpeg" | "full" => Ok(ColorRange::Jpeg),
            other => Err(Error::Config(format!("unknown color range '{}'", other))),
        }
    }
}

/// Picture coding type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PictureType {
    #[default]
    None,
    I,
    P,
    B,
    S,
    Si,
    Sp,
    Bi,
}

impl PictureType {
    /// Single character code
    pub fn as_char(&self) -> char {
        match self {
            PictureType::None => '?',
            PictureType::I => 'I',
            PictureType::P => 'P',
            PictureType::B => 'B',
            PictureType::S => 'S',
            PictureType::Si => 'i',
            PictureType::Sp => 'p',
            PictureType::Bi => 'b',
        }
    }
}

/// Stereoscopic packing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stereo3DType {
    TwoD,
    SideBySide,
    TopBottom,
    FrameSequence,
    Checkerboard,
    Lines,
    Columns,
    SideBySideQuincunx,
}

/// Per-frame side data attached by the host
#[derive(Debug, Clone, PartialEq)]
pub enum SideData {
    PanScan,
    A53ClosedCaptions(Vec<u8>),
    Stereo3D { kind: Stereo3DType, inverted: bool },
    /// 3x3 display matrix, 16.16 fixed point except the last column (2.30)
    DisplayMatrix([i32; 9]),
    Afd(u8),
    Other { kind: u32, size: usize },
}

/// A rectangular byte plane with a row stride
///
/// The backing buffer is reference counted. Cloning a plane shares the
/// buffer; writing through [`Plane::row_mut`] on a shared buffer detaches it
/// first, so callers that want in-place writes check [`Plane::is_unique`].
#[derive(Debug, Clone)]
pub struct Plane {
    data: Arc<Vec<u8>>,
    offset: usize,
    stride: usize,
    width: usize,
    height: usize,
}

impl Plane {
    /// Allocate a zeroed plane with an aligned stride
    pub fn new(width: usize, height: usize) -> Result<Self> {
        let stride = width
            .checked_next_multiple_of(PLANE_ALIGN)
            .ok_or_else(|| Error::InvalidGeometry(format!("plane width {} too large", width)))?;
        Self::with_stride(width, height, stride.max(PLANE_ALIGN))
    }

    /// Allocate a zeroed plane with an explicit stride
    pub fn with_stride(width: usize, height: usize, stride: usize) -> Result<Self> {
        if stride < width {
            return Err(Error::InvalidGeometry(format!(
                "stride {} smaller than width {}",
                stride, width
            )));
        }
        let len = stride.checked_mul(height).ok_or_else(|| {
            Error::InvalidGeometry(format!("plane {}x{} with stride {} overflows", width, height, stride))
        })?;
        let data = try_alloc(len, "plane")?;
        Ok(Self {
            data: Arc::new(data),
            offset: 0,
            stride,
            width,
            height,
        })
    }

    /// Wrap an existing buffer
    pub fn from_vec(data: Vec<u8>, width: usize, height: usize, stride: usize) -> Result<Self> {
        let needed = match height {
            0 => Some(0),
            h => (h - 1).checked_mul(stride).and_then(|n| n.checked_add(width)),
        };
        let fits = matches!(needed, Some(n) if data.len() >= n);
        if stride < width || !fits {
            return Err(Error::InvalidGeometry(format!(
                "buffer of {} bytes cannot hold {}x{} with stride {}",
                data.len(),
                width,
                height,
                stride
            )));
        }
        Ok(Self {
            data: Arc::new(data),
            offset: 0,
            stride,
            width,
            height,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    /// True when no other frame references the buffer
    pub fn is_unique(&self) -> bool {
        Arc::strong_count(&self.data) == 1 && Arc::weak_count(&self.data) == 0
    }

    /// Visible bytes of row `y`
    pub fn row(&self, y: usize) -> &[u8] {
        let start = self.offset + y * self.stride;
        &self.data[start..start + self.width]
    }

    /// Mutable visible bytes of row `y`
    pub fn row_mut(&mut self, y: usize) -> &mut [u8] {
        let start = self.offset + y * self.stride;
        let width = self.width;
        &mut Arc::make_mut(&mut self.data)[start..start + width]
    }

    pub fn fill(&mut self, value: u8) {
        for y in 0..self.height {
            self.row_mut(y).fill(value);
        }
    }

    /// Copy the overlapping area of `src` into this plane
    pub fn copy_from(&mut self, src: &Plane) {
        let w = self.width.min(src.width);
        for y in 0..self.height.min(src.height) {
            self.row_mut(y)[..w].copy_from_slice(&src.row(y)[..w]);
        }
    }

    /// Narrow this plane to one field: every second row starting at the top
    /// or bottom line
    ///
    /// Both fields keep `ceil(height / 2)` rows. A bottom field of an
    /// odd-height plane is one line short, so it is copied out with its last
    /// line repeated.
    pub(crate) fn select_field(&mut self, bottom: bool) -> Result<()> {
        let rows = (self.height + 1) / 2;
        if bottom && self.height % 2 == 1 {
            let mut field = Plane::new(self.width, rows)?;
            for y in 0..rows {
                let src = if 2 * y + 1 < self.height {
                    2 * y + 1
                } else {
                    self.height.saturating_sub(2)
                };
                field.row_mut(y).copy_from_slice(self.row(src));
            }
            *self = field;
            return Ok(());
        }
        if bottom {
            self.offset += self.stride;
        }
        self.height = rows;
        self.stride *= 2;
        Ok(())
    }
}

/// A planar video frame
#[derive(Debug, Clone)]
pub struct Frame {
    /// Frame width
    pub width: u32,
    /// Frame height
    pub height: u32,
    /// Pixel format
    pub format: PixelFormat,
    planes: Vec<Plane>,
    /// Presentation timestamp in link time base
    pub pts: Option<i64>,
    /// Byte position of the source packet, -1 if unknown
    pub pkt_pos: i64,
    /// Size of the source packet, -1 if unknown
    pub pkt_size: i64,
    /// Is this a keyframe?
    pub key_frame: bool,
    pub pict_type: PictureType,
    pub interlaced: bool,
    pub top_field_first: bool,
    /// Extra field repetitions signalled by the decoder
    pub repeat_pict: i32,
    pub sample_aspect_ratio: Rational,
    pub color_range: ColorRange,
    /// String metadata dictionary
    pub metadata: BTreeMap<String, String>,
    pub side_data: Vec<SideData>,
}

impl Frame {
    /// Create a new frame with zeroed, stride-aligned planes
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Result<Self> {
        let planes = (0..format.plane_count())
            .map(|i| {
                let (w, h) = format.plane_size(i, width as usize, height as usize);
                Plane::new(w, h)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::with_planes_unchecked(width, height, format, planes))
    }

    /// Create a frame from existing planes, checking their geometry
    pub fn from_planes(
        width: u32,
        height: u32,
        format: PixelFormat,
        planes: Vec<Plane>,
    ) -> Result<Self> {
        if planes.len() != format.plane_count() {
            return Err(Error::InvalidFrame(format!(
                "{} expects {} planes, got {}",
                format,
                format.plane_count(),
                planes.len()
            )));
        }
        for (i, plane) in planes.iter().enumerate() {
            let (w, h) = format.plane_size(i, width as usize, height as usize);
            if plane.width() < w || plane.height() < h {
                return Err(Error::InvalidFrame(format!(
                    "plane {} is {}x{}, need {}x{}",
                    i,
                    plane.width(),
                    plane.height(),
                    w,
                    h
                )));
            }
        }
        Ok(Self::with_planes_unchecked(width, height, format, planes))
    }

    fn with_planes_unchecked(
        width: u32,
        height: u32,
        format: PixelFormat,
        planes: Vec<Plane>,
    ) -> Self {
        Self {
            width,
            height,
            format,
            planes,
            pts: None,
            pkt_pos: -1,
            pkt_size: -1,
            key_frame: true,
            pict_type: PictureType::None,
            interlaced: false,
            top_field_first: false,
            repeat_pict: 0,
            sample_aspect_ratio: Rational::new(0, 1),
            color_range: ColorRange::Unspecified,
            metadata: BTreeMap::new(),
            side_data: Vec::new(),
        }
    }

    pub fn planes(&self) -> &[Plane] {
        &self.planes
    }

    pub fn planes_mut(&mut self) -> &mut [Plane] {
        &mut self.planes
    }

    pub fn plane(&self, index: usize) -> Option<&Plane> {
        self.planes.get(index)
    }

    pub fn plane_mut(&mut self, index: usize) -> Option<&mut Plane> {
        self.planes.get_mut(index)
    }

    /// True when every plane buffer is owned by this frame alone
    pub fn is_writable(&self) -> bool {
        self.planes.iter().all(Plane::is_unique)
    }

    /// Copy everything except geometry and pixel data from `src`
    pub fn copy_props_from(&mut self, src: &Frame) {
        self.pts = src.pts;
        self.pkt_pos = src.pkt_pos;
        self.pkt_size = src.pkt_size;
        self.key_frame = src.key_frame;
        self.pict_type = src.pict_type;
        self.interlaced = src.interlaced;
        self.top_field_first = src.top_field_first;
        self.repeat_pict = src.repeat_pict;
        self.sample_aspect_ratio = src.sample_aspect_ratio;
        self.color_range = src.color_range;
        self.metadata = src.metadata.clone();
        self.side_data = src.side_data.clone();
    }

    pub fn set_metadata(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.metadata.insert(key.into(), value.into());
    }

    /// Reduce the frame to one field of its planes (top or bottom lines)
    pub(crate) fn select_field(&mut self, bottom: bool) -> Result<()> {
        for plane in &mut self.planes {
            plane.select_field(bottom)?;
        }
        Ok(())
    }
}

/// Properties of a link between two filters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkProps {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub time_base: Rational,
    pub frame_rate: Rational,
}

impl LinkProps {
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        Self {
            width,
            height,
            format,
            time_base: Rational::new(1, 25),
            frame_rate: Rational::new(25, 1),
        }
    }

    pub fn with_frame_rate(mut self, rate: Rational) -> Self {
        self.frame_rate = rate;
        self.time_base = Rational::new(rate.den, rate.num);
        self
    }

    pub fn with_time_base(mut self, time_base: Rational) -> Self {
        self.time_base = time_base;
        self
    }

    /// Chroma plane width for this link
    pub fn chroma_width(&self) -> usize {
        self.format.chroma_width(self.width as usize)
    }

    /// Chroma plane height for this link
    pub fn chroma_height(&self) -> usize {
        self.format.chroma_height(self.height as usize)
    }
}

/// Statistics for monitoring
#[derive(Debug, Clone, Default)]
pub struct Stats {
    /// Frames read from the source
    pub frames_read: u64,
    /// Frames written to the sink
    pub frames_written: u64,
    /// Total bytes written
    pub bytes_written: u64,
    /// Average time spent in the filter chain per input frame
    pub avg_filter_time_ms: f64,
}
