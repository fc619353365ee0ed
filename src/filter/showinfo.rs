//! Per-frame information dump
//!
//! Computes checksums and sample statistics for every frame and reports
//! them as a log line, as frame metadata under `lavfi.showinfo.`, or both.
//! Frames pass through unchanged apart from the added metadata.

use super::{check_frame, FilterContext, FilterDescriptor, OptionDef, OptionValues, VideoFilter};
use crate::config::ShowInfoConfig;
use crate::error::Result;
use crate::types::{Frame, LinkProps, SideData, Stereo3DType};

const META_PREFIX: &str = "lavfi.showinfo.";

const MODES: &[(&str, i64)] = &[("log", 0), ("metadata", 1), ("all", 2)];

/// Option table, in positional order
pub static OPTIONS: &[OptionDef] =
    &[OptionDef::int("mode", "select mode", 0, 0, 2).with_constants(MODES)];

pub const DESCRIPTOR: FilterDescriptor = FilterDescriptor {
    name: "showinfo",
    description: "Show textual information for each video frame.",
    options: OPTIONS,
    create,
};

fn create(values: &OptionValues) -> Result<Box<dyn VideoFilter>> {
    Ok(Box::new(ShowInfo::new(ShowInfoConfig::from_options(values)?)))
}

const ADLER_MOD: u32 = 65521;
/// Largest run of bytes before the Adler sums must be reduced
const ADLER_NMAX: usize = 5552;

/// Continue an Adler-32 checksum over `data`
pub fn adler32_update(adler: u32, data: &[u8]) -> u32 {
    let mut a = adler & 0xffff;
    let mut b = adler >> 16;
    for chunk in data.chunks(ADLER_NMAX) {
        for &byte in chunk {
            a += byte as u32;
            b += a;
        }
        a %= ADLER_MOD;
        b %= ADLER_MOD;
    }
    (b << 16) | a
}

/// Checksums and sample statistics of one frame
#[derive(Debug, Clone, PartialEq)]
pub struct FrameStats {
    /// Adler-32 over every plane in order
    pub checksum: u32,
    pub plane_checksums: Vec<u32>,
    pub means: Vec<i64>,
    pub stdevs: Vec<f64>,
}

impl FrameStats {
    /// Measure the visible area of every plane; both checksums start from 0
    pub fn measure(frame: &Frame) -> Self {
        let format = frame.format;
        let mut stats = Self {
            checksum: 0,
            plane_checksums: Vec::with_capacity(frame.planes().len()),
            means: Vec::with_capacity(frame.planes().len()),
            stdevs: Vec::with_capacity(frame.planes().len()),
        };

        for (p, plane) in frame.planes().iter().enumerate() {
            let (w, h) = format.plane_size(p, frame.width as usize, frame.height as usize);
            let (w, h) = (w.min(plane.width()), h.min(plane.height()));
            let mut plane_sum = 0u32;
            let (mut sum, mut sum2, mut count) = (0i64, 0i64, 0i64);

            for y in 0..h {
                let row = &plane.row(y)[..w];
                plane_sum = adler32_update(plane_sum, row);
                stats.checksum = adler32_update(stats.checksum, row);
                for &v in row {
                    sum += v as i64;
                    sum2 += v as i64 * v as i64;
                }
                count += w as i64;
            }

            stats.plane_checksums.push(plane_sum);
            if count > 0 {
                stats.means.push((sum + count / 2) / count);
                let n = count as f64;
                stats
                    .stdevs
                    .push(((sum2 as f64 - sum as f64 * sum as f64 / n) / n).sqrt());
            } else {
                stats.means.push(0);
                stats.stdevs.push(0.0);
            }
        }

        stats
    }
}

/// Frame information filter state
#[derive(Debug)]
pub struct ShowInfo {
    config: ShowInfoConfig,
    link: Option<LinkProps>,
    frame_count: u64,
    t_prev: Option<f64>,
    packet_sum: f64,
    packet_t: Option<f64>,
    bitrate: Option<f64>,
    key_n_prev: Option<u64>,
    key_interval: Option<u64>,
}

impl ShowInfo {
    pub fn new(config: ShowInfoConfig) -> Self {
        Self {
            config,
            link: None,
            frame_count: 0,
            t_prev: None,
            packet_sum: 0.0,
            packet_t: None,
            bitrate: None,
            key_n_prev: None,
            key_interval: None,
        }
    }

    fn reset_timing(&mut self) {
        self.t_prev = None;
        self.packet_sum = 0.0;
        self.packet_t = None;
        self.bitrate = None;
        self.key_n_prev = None;
        self.key_interval = None;
    }

    /// Frames seen so far
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// The one-line summary logged for a frame
    pub fn log_line(&self, frame: &Frame, stats: &FrameStats, link: &LinkProps) -> String {
        let join_hex = |values: &[u32]| {
            values
                .iter()
                .map(|v| format!("{:08X}", v))
                .collect::<Vec<_>>()
                .join(" ")
        };
        let means = stats
            .means
            .iter()
            .map(|m| m.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        let stdevs = stats
            .stdevs
            .iter()
            .map(|s| format!("{:3.1}", s))
            .collect::<Vec<_>>()
            .join(" ");

        format!(
            "n:{:4} pts:{:>7} pts_time:{:<7} pos:{:9} fmt:{} sar:{}/{} s:{}x{} i:{} iskey:{} type:{} \
             checksum:{:08X} plane_checksum:[{}] mean:[{}] stdev:[{}]",
            self.frame_count,
            ts_string(frame.pts),
            ts_time_string(frame.pts, link),
            frame.pkt_pos,
            frame.format,
            frame.sample_aspect_ratio.num,
            frame.sample_aspect_ratio.den,
            frame.width,
            frame.height,
            frame_type_char(frame),
            frame.key_frame as i32,
            frame.pict_type.as_char(),
            stats.checksum,
            join_hex(&stats.plane_checksums),
            means,
            stdevs
        )
    }

    fn log_frame(&self, frame: &Frame, stats: &FrameStats, link: &LinkProps) {
        tracing::info!("{}", self.log_line(frame, stats, link));
        for side in &frame.side_data {
            if let SideData::Other { .. } = side {
                tracing::warn!("  side data - {}", describe_side_data(side));
            } else {
                tracing::info!("  side data - {}", describe_side_data(side));
            }
        }
    }

    /// Update the running timing state and tag the frame
    fn tag_frame(&mut self, frame: &mut Frame, stats: &FrameStats, link: &LinkProps) {
        let t = frame
            .pts
            .map(|p| p as f64 * link.time_base.as_f64())
            .filter(|t| t.is_finite());
        let t_delta = match (t, self.t_prev) {
            (Some(t), Some(prev)) => Some(t - prev),
            _ => None,
        };
        self.t_prev = t;

        self.packet_sum += frame.pkt_size as f64;
        let restart = match (self.packet_t, t) {
            (None, _) => true,
            (Some(start), Some(t)) => start > t,
            (Some(_), None) => false,
        };
        if restart {
            self.packet_t = t;
            self.packet_sum = 0.0;
            self.bitrate = None;
        }
        if let (Some(t), Some(start)) = (t, self.packet_t) {
            if t - start > 1.0 {
                self.bitrate = Some(self.packet_sum * 8.0 / (t - start));
                self.packet_t = Some(t);
                self.packet_sum = 0.0;
            }
        }

        if frame.key_frame {
            if let Some(prev) = self.key_n_prev {
                self.key_interval = Some(self.frame_count - prev);
            }
            self.key_n_prev = Some(self.frame_count);
        }

        let mut tags: Vec<(&str, String)> = vec![
            ("N", self.frame_count.to_string()),
            ("PTS", ts_string(frame.pts)),
        ];

        match t {
            Some(t) => {
                tags.push(("T", format!("{:.6}", t)));
                tags.push(("T.HMS", format_hms(t)));
            }
            None => {
                tags.push(("T", "n/a".to_string()));
                tags.push(("T.HMS", " ??:??:??.???".to_string()));
            }
        }

        match t_delta {
            Some(d) => {
                tags.push(("T_DELTA", format!("{:.6}", d)));
                tags.push(("T_DELTA.FORM", format_delta(d)));
            }
            None => {
                tags.push(("T_DELTA", "n/a".to_string()));
                tags.push(("T_DELTA.FORM", "--.--ms(--.--fps)".to_string()));
            }
        }

        tags.push(("POS", frame.pkt_pos.to_string()));
        tags.push(("POS.SEP3", group_thousands(frame.pkt_pos)));

        match self.bitrate {
            Some(rate) => {
                tags.push(("BITRATE", (rate as i64).to_string()));
                tags.push(("BITRATE.FORM", format!("{}kbps", rate as i64 / 1000)));
            }
            None => {
                tags.push(("BITRATE", "n/a".to_string()));
                tags.push(("BITRATE.FORM", "---kbps".to_string()));
            }
        }

        tags.push(("PACKET_SIZE", frame.pkt_size.to_string()));
        tags.push(("FORMAT", frame.format.to_string()));

        let tb = link.time_base;
        if tb.num != 0 && tb.den != 0 {
            tags.push(("TIMEBASE", format!("{:.9}", tb.as_f64())));
            tags.push(("TIMEBASE.FORM", format!("{:.2}us", tb.as_f64() * 1_000_000.0)));
        } else {
            tags.push(("TIMEBASE", "n/a".to_string()));
            tags.push(("TIMEBASE.FORM", "n/a".to_string()));
        }
        tags.push(("TIMEBASE.NUM", tb.num.to_string()));
        tags.push(("TIMEBASE.DEN", tb.den.to_string()));

        let sar = frame.sample_aspect_ratio;
        let sar_text = if sar.den == 0 {
            "n/a".to_string()
        } else if sar.den == 1 && sar.num == 0 {
            "default".to_string()
        } else {
            format!("{:.3}", sar.as_f64())
        };
        tags.push(("SAR", sar_text));
        tags.push(("SAR.NUM", sar.num.to_string()));
        tags.push(("SAR.DEN", sar.den.to_string()));

        tags.push(("REPEAT_PICT", frame.repeat_pict.to_string()));
        tags.push(("WIDTH", frame.width.to_string()));
        tags.push(("HEIGHT", frame.height.to_string()));
        tags.push(("ISKEY", (frame.key_frame as i32).to_string()));
        tags.push((
            "KEY_INTERVAL",
            self.key_interval
                .map(|i| i.to_string())
                .unwrap_or_else(|| "--".to_string()),
        ));

        let frame_type_long = match (frame.interlaced, frame.top_field_first) {
            (false, _) => "Progressive",
            (true, true) => "Interlaced(TFF)",
            (true, false) => "Interlaced(BFF)",
        };
        let (field, field_long) = if frame.top_field_first {
            ("T", "TFF")
        } else {
            ("B", "BFF")
        };
        tags.push(("FRAME_TYPE", frame_type_char(frame).to_string()));
        tags.push(("FRAME_TYPE.L", frame_type_long.to_string()));
        tags.push(("FIELD_TYPE", field.to_string()));
        tags.push(("FIELD_TYPE.L", field_long.to_string()));
        tags.push(("PICT_TYPE", frame.pict_type.as_char().to_string()));
        tags.push(("COLOR_RANGE", frame.color_range.code().to_string()));

        for (key, value) in tags {
            frame.set_metadata(format!("{}{}", META_PREFIX, key), value);
        }
        for (p, mean) in stats.means.iter().enumerate() {
            frame.set_metadata(format!("{}MEAN{}", META_PREFIX, p), mean.to_string());
        }
    }
}

impl VideoFilter for ShowInfo {
    fn name(&self) -> &'static str {
        "showinfo"
    }

    fn configure(&mut self, input: &LinkProps) -> Result<LinkProps> {
        self.reset_timing();
        self.link = Some(*input);
        if self.config.mode.logs() {
            for direction in ["in", "out"] {
                tracing::info!(
                    "config {} time_base: {}, frame_rate: {}",
                    direction,
                    input.time_base,
                    input.frame_rate
                );
            }
        }
        Ok(*input)
    }

    fn filter_frame(&mut self, mut frame: Frame, ctx: &mut FilterContext<'_>) -> Result<()> {
        let link = check_frame(self.name(), self.link.as_ref(), &frame)?;
        let stats = FrameStats::measure(&frame);

        if self.config.mode.logs() {
            self.log_frame(&frame, &stats, &link);
        }
        if self.config.mode.tags() {
            self.tag_frame(&mut frame, &stats, &link);
        }

        self.frame_count += 1;
        ctx.push_frame(frame)
    }
}

fn frame_type_char(frame: &Frame) -> char {
    if !frame.interlaced {
        'P'
    } else if frame.top_field_first {
        'T'
    } else {
        'B'
    }
}

fn ts_string(pts: Option<i64>) -> String {
    match pts {
        Some(p) => p.to_string(),
        None => "NOPTS".to_string(),
    }
}

fn ts_time_string(pts: Option<i64>, link: &LinkProps) -> String {
    match pts {
        Some(p) => format_general(p as f64 * link.time_base.as_f64()),
        None => "NOPTS".to_string(),
    }
}

/// `printf("%.6g")`
pub fn format_general(v: f64) -> String {
    const PRECISION: i32 = 6;
    if v == 0.0 {
        return "0".to_string();
    }
    if v.is_nan() {
        return "nan".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let sci = format!("{:.*e}", (PRECISION - 1) as usize, v);
    let (mantissa, exp) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exp: i32 = exp.parse().unwrap_or(0);

    if exp < -4 || exp >= PRECISION {
        format!(
            "{}e{}{:02}",
            trim_fraction(mantissa),
            if exp < 0 { '-' } else { '+' },
            exp.abs()
        )
    } else {
        let decimals = (PRECISION - 1 - exp) as usize;
        trim_fraction(&format!("{:.*}", decimals, v)).to_string()
    }
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

/// Signed `HH:MM:SS.mmm`, with a space standing in for a plus sign
pub fn format_hms(t: f64) -> String {
    let ms = (t * 1000.0).round() as i64;
    let sign = if ms < 0 { '-' } else { ' ' };
    let ms = ms.abs();
    format!(
        "{}{:02}:{:02}:{:02}.{:03}",
        sign,
        ms / 3_600_000,
        (ms / 60_000) % 60,
        (ms / 1000) % 60,
        ms % 1000
    )
}

/// Frame delta in milliseconds with the matching rate, e.g. `+40.00ms(25.00fps)`
pub fn format_delta(delta: f64) -> String {
    // hundredths of a millisecond
    let units = (delta * 100_000.0).round() as i64;
    let sign = if units < 0 { '-' } else { '+' };
    let units = units.abs();
    let fps = if delta < 0.001 {
        100_000
    } else {
        (100.0 / delta).round() as i64
    };

    if fps >= 100_000 {
        format!("{}{}.{:02}ms(--.--fps)", sign, units / 100, units % 100)
    } else {
        format!(
            "{}{}.{:02}ms({}.{:02}fps)",
            sign,
            units / 100,
            units % 100,
            fps / 100,
            fps % 100
        )
    }
}

/// Decimal with comma thousands separators
pub fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Rotation in degrees encoded by a display matrix, `None` when degenerate
pub fn display_rotation(matrix: &[i32; 9]) -> Option<f64> {
    let fp = |v: i32| v as f64 / 65536.0;
    let scale0 = fp(matrix[0]).hypot(fp(matrix[3]));
    let scale1 = fp(matrix[1]).hypot(fp(matrix[4]));
    if scale0 == 0.0 || scale1 == 0.0 {
        return None;
    }
    let rotation = (fp(matrix[1]) / scale1).atan2(fp(matrix[0]) / scale0).to_degrees();
    Some(-rotation)
}

fn describe_stereo3d(kind: Stereo3DType) -> &'static str {
    match kind {
        Stereo3DType::TwoD => "2D",
        Stereo3DType::SideBySide => "side by side",
        Stereo3DType::TopBottom => "top and bottom",
        Stereo3DType::FrameSequence => "frame alternate",
        Stereo3DType::Checkerboard => "checkerboard",
        Stereo3DType::Lines => "interleaved lines",
        Stereo3DType::Columns => "interleaved columns",
        Stereo3DType::SideBySideQuincunx => "side by side (quincunx subsampling)",
    }
}

/// Human readable text for one side data item
pub fn describe_side_data(side: &SideData) -> String {
    match side {
        SideData::PanScan => "pan/scan".to_string(),
        SideData::A53ClosedCaptions(data) => {
            format!("A/53 closed captions ({} bytes)", data.len())
        }
        SideData::Stereo3D { kind, inverted } => format!(
            "stereoscopic information: type - {}{}",
            describe_stereo3d(*kind),
            if *inverted { " (inverted)" } else { "" }
        ),
        SideData::DisplayMatrix(matrix) => match display_rotation(matrix) {
            Some(r) => format!("displaymatrix: rotation of {:.2} degrees", r),
            None => "displaymatrix: rotation of nan degrees".to_string(),
        },
        SideData::Afd(value) => format!("afd: value of {}", value),
        SideData::Other { kind, size } => {
            format!("unknown side data type {} ({} bytes)", kind, size)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ShowInfoMode;
    use crate::filter::testing::collect;
    use crate::types::{ColorRange, PictureType, PixelFormat, Rational};

    fn configured(mode: ShowInfoMode) -> ShowInfo {
        let mut filter = ShowInfo::new(ShowInfoConfig::default().with_mode(mode));
        filter
            .configure(&LinkProps::new(4, 2, PixelFormat::Yuv444p).with_time_base(Rational::new(1, 25)))
            .unwrap();
        filter
    }

    fn frame(pts: Option<i64>) -> Frame {
        let mut frame = Frame::new(4, 2, PixelFormat::Yuv444p).unwrap();
        frame.planes_mut()[0].fill(10);
        frame.planes_mut()[1].fill(128);
        frame.planes_mut()[2].fill(128);
        frame.pts = pts;
        frame
    }

    fn meta<'a>(frame: &'a Frame, key: &str) -> &'a str {
        frame
            .metadata
            .get(&format!("{}{}", META_PREFIX, key))
            .map(String::as_str)
            .unwrap_or("<missing>")
    }

    #[test]
    fn test_adler32_seeded_with_zero() {
        assert_eq!(adler32_update(0, b""), 0);
        // a = 97 + 98 + 99, b = 97 + 195 + 294
        assert_eq!(adler32_update(0, b"abc"), (586 << 16) | 294);
        // seeded with 1 it is the standard checksum
        assert_eq!(adler32_update(1, b"Wikipedia"), 0x11E6_0398);
    }

    #[test]
    fn test_adler32_is_incremental() {
        let data: Vec<u8> = (0..20_000u32).map(|i| (i * 7) as u8).collect();
        let whole = adler32_update(0, &data);
        let split = adler32_update(adler32_update(0, &data[..7000]), &data[7000..]);
        assert_eq!(whole, split);
    }

    #[test]
    fn test_measure() {
        let mut f = frame(Some(0));
        f.planes_mut()[0].row_mut(0).copy_from_slice(&[0, 0, 20, 20]);
        f.planes_mut()[0].row_mut(1).copy_from_slice(&[0, 0, 20, 20]);
        let stats = FrameStats::measure(&f);
        assert_eq!(stats.plane_checksums.len(), 3);
        assert_eq!(stats.means, vec![10, 128, 128]);
        assert_eq!(stats.stdevs, vec![10.0, 0.0, 0.0]);

        let mut whole = 0;
        for p in 0..3 {
            for y in 0..2 {
                whole = adler32_update(whole, f.planes()[p].row(y));
            }
        }
        assert_eq!(stats.checksum, whole);
        // padding beyond the visible width is not included
        assert_eq!(stats.plane_checksums[1], adler32_update(adler32_update(0, &[128; 4]), &[128; 4]));
    }

    #[test]
    fn test_format_general() {
        assert_eq!(format_general(0.0), "0");
        assert_eq!(format_general(0.04), "0.04");
        assert_eq!(format_general(1.0), "1");
        assert_eq!(format_general(12.5), "12.5");
        assert_eq!(format_general(1.0 / 3.0), "0.333333");
        assert_eq!(format_general(1_234_567.0), "1.23457e+06");
        assert_eq!(format_general(0.00001), "1e-05");
        assert_eq!(format_general(-2.5), "-2.5");
    }

    #[test]
    fn test_format_hms() {
        assert_eq!(format_hms(0.0), " 00:00:00.000");
        assert_eq!(format_hms(3723.4567), " 01:02:03.457");
        assert_eq!(format_hms(-1.5), "-00:00:01.500");
    }

    #[test]
    fn test_format_delta() {
        assert_eq!(format_delta(0.04), "+40.00ms(25.00fps)");
        assert_eq!(format_delta(1.0 / 30.0), "+33.33ms(30.00fps)");
        assert_eq!(format_delta(0.0), "+0.00ms(--.--fps)");
        assert_eq!(format_delta(-0.02), "-20.00ms(--.--fps)");
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(123), "123");
        assert_eq!(group_thousands(1234), "1,234");
        assert_eq!(group_thousands(1_234_567), "1,234,567");
        assert_eq!(group_thousands(-1), "-1");
        assert_eq!(group_thousands(-123_456), "-123,456");
    }

    #[test]
    fn test_display_rotation() {
        let identity = [65536, 0, 0, 0, 65536, 0, 0, 0, 1 << 30];
        assert_eq!(display_rotation(&identity), Some(0.0));
        // 90 degrees counter-clockwise
        let ccw = [0, -65536, 0, 65536, 0, 0, 0, 0, 1 << 30];
        let r = display_rotation(&ccw).unwrap();
        assert!((r - 90.0).abs() < 1e-9);
        assert_eq!(display_rotation(&[0; 9]), None);
    }

    #[test]
    fn test_side_data_text() {
        assert_eq!(
            describe_side_data(&SideData::A53ClosedCaptions(vec![0; 6])),
            "A/53 closed captions (6 bytes)"
        );
        assert_eq!(
            describe_side_data(&SideData::Stereo3D {
                kind: Stereo3DType::TopBottom,
                inverted: true
            }),
            "stereoscopic information: type - top and bottom (inverted)"
        );
        assert_eq!(describe_side_data(&SideData::Afd(8)), "afd: value of 8");
    }

    #[test]
    fn test_log_line() {
        let filter = configured(ShowInfoMode::Log);
        let mut f = frame(Some(3));
        f.pkt_pos = 4096;
        f.interlaced = true;
        f.top_field_first = true;
        f.pict_type = PictureType::I;
        f.sample_aspect_ratio = Rational::new(1, 1);
        let stats = FrameStats::measure(&f);
        let link = LinkProps::new(4, 2, PixelFormat::Yuv444p);
        let line = filter.log_line(&f, &stats, &link);
        assert!(line.starts_with("n:   0 pts:      3 pts_time:0.12    pos:     4096 "));
        assert!(line.contains(" fmt:yuv444p sar:1/1 s:4x2 i:T iskey:1 type:I "));
        assert!(line.contains(&format!("checksum:{:08X} ", stats.checksum)));
        assert!(line.ends_with("mean:[10 128 128] stdev:[0.0 0.0 0.0]"));
    }

    #[test]
    fn test_log_mode_leaves_metadata_alone() {
        let mut filter = configured(ShowInfoMode::Log);
        let out = collect(|ctx| filter.filter_frame(frame(Some(0)), ctx)).unwrap();
        assert!(out[0].metadata.is_empty());
        assert_eq!(filter.frame_count(), 1);
    }

    #[test]
    fn test_metadata_tags() {
        let mut filter = configured(ShowInfoMode::Metadata);
        let mut first = frame(Some(0));
        first.pkt_pos = 1_234_567;
        first.pkt_size = 1000;
        first.color_range = ColorRange::Jpeg;
        let mut second = frame(Some(1));
        second.key_frame = false;
        second.interlaced = true;
        second.sample_aspect_ratio = Rational::new(4, 3);
        let out = collect(|ctx| {
            filter.filter_frame(first, ctx)?;
            filter.filter_frame(second, ctx)
        })
        .unwrap();

        let a = &out[0];
        assert_eq!(meta(a, "N"), "0");
        assert_eq!(meta(a, "PTS"), "0");
        assert_eq!(meta(a, "T"), "0.000000");
        assert_eq!(meta(a, "T.HMS"), " 00:00:00.000");
        assert_eq!(meta(a, "T_DELTA"), "n/a");
        assert_eq!(meta(a, "T_DELTA.FORM"), "--.--ms(--.--fps)");
        assert_eq!(meta(a, "POS"), "1234567");
        assert_eq!(meta(a, "POS.SEP3"), "1,234,567");
        assert_eq!(meta(a, "BITRATE"), "n/a");
        assert_eq!(meta(a, "BITRATE.FORM"), "---kbps");
        assert_eq!(meta(a, "PACKET_SIZE"), "1000");
        assert_eq!(meta(a, "FORMAT"), "yuv444p");
        assert_eq!(meta(a, "TIMEBASE"), "0.040000000");
        assert_eq!(meta(a, "TIMEBASE.FORM"), "40000.00us");
        assert_eq!(meta(a, "TIMEBASE.NUM"), "1");
        assert_eq!(meta(a, "TIMEBASE.DEN"), "25");
        assert_eq!(meta(a, "SAR"), "default");
        assert_eq!(meta(a, "ISKEY"), "1");
        assert_eq!(meta(a, "KEY_INTERVAL"), "--");
        assert_eq!(meta(a, "FRAME_TYPE"), "P");
        assert_eq!(meta(a, "FRAME_TYPE.L"), "Progressive");
        assert_eq!(meta(a, "FIELD_TYPE"), "B");
        assert_eq!(meta(a, "FIELD_TYPE.L"), "BFF");
        assert_eq!(meta(a, "PICT_TYPE"), "?");
        assert_eq!(meta(a, "COLOR_RANGE"), "2");
        assert_eq!(meta(a, "MEAN0"), "10");
        assert_eq!(meta(a, "MEAN2"), "128");
        assert_eq!(meta(a, "MEAN3"), "<missing>");

        let b = &out[1];
        assert_eq!(meta(b, "N"), "1");
        assert_eq!(meta(b, "T"), "0.040000");
        assert_eq!(meta(b, "T_DELTA"), "0.040000");
        assert_eq!(meta(b, "T_DELTA.FORM"), "+40.00ms(25.00fps)");
        assert_eq!(meta(b, "SAR"), "1.333");
        assert_eq!(meta(b, "ISKEY"), "0");
        assert_eq!(meta(b, "FRAME_TYPE"), "B");
        assert_eq!(meta(b, "FRAME_TYPE.L"), "Interlaced(BFF)");
    }

    #[test]
    fn test_unknown_pts_tags() {
        let mut filter = configured(ShowInfoMode::All);
        let out = collect(|ctx| filter.filter_frame(frame(None), ctx)).unwrap();
        assert_eq!(meta(&out[0], "PTS"), "NOPTS");
        assert_eq!(meta(&out[0], "T"), "n/a");
        assert_eq!(meta(&out[0], "T.HMS"), " ??:??:??.???");
    }

    #[test]
    fn test_key_interval_and_bitrate() {
        let mut filter = configured(ShowInfoMode::Metadata);
        // 25 fps, one key frame every 10 frames, 500 byte packets
        let frames: Vec<Frame> = (0..40)
            .map(|i| {
                let mut f = frame(Some(i));
                f.key_frame = i % 10 == 0;
                f.pkt_size = 500;
                f
            })
            .collect();
        let out = collect(|ctx| {
            for f in frames {
                filter.filter_frame(f, ctx)?;
            }
            Ok(())
        })
        .unwrap();

        assert_eq!(meta(&out[9], "KEY_INTERVAL"), "--");
        assert_eq!(meta(&out[10], "KEY_INTERVAL"), "10");
        assert_eq!(meta(&out[25], "KEY_INTERVAL"), "10");

        // the window closes once more than a second has passed: frame 26 at
        // 1.04s, carrying 26 packets of 500 bytes
        assert_eq!(meta(&out[25], "BITRATE"), "n/a");
        let expected = (26.0 * 500.0 * 8.0 / (26.0 * (1.0 / 25.0))) as i64;
        assert_eq!(meta(&out[26], "BITRATE"), expected.to_string());
        assert_eq!(meta(&out[26], "BITRATE.FORM"), format!("{}kbps", expected / 1000));
        assert_eq!(meta(&out[39], "BITRATE"), expected.to_string());
    }
}
