//! Split interlaced frames into fields
//!
//! Every input frame yields its first field immediately and holds a shared
//! reference for the second field, which goes out when the next frame (or
//! end of stream) arrives. In repeat mode a frame flagged with one repeated
//! field also yields a third field. Field frames share the input's buffers
//! and read every second line of them.

use super::{check_frame, FilterContext, FilterDescriptor, OptionDef, OptionValues, VideoFilter};
use crate::config::{SeparateFieldsConfig, SeparateFieldsMode};
use crate::error::{Error, Result};
use crate::types::{Frame, LinkProps, Rational};

const META_TYPE_LONG: &str = "lavfi.separatefields.TYPE.L";
const META_TYPE: &str = "lavfi.separatefields.TYPE";
const META_ORDER: &str = "lavfi.separatefields.ORDER";

const MODES: &[(&str, i64)] = &[("normal", 0), ("repeat", 1), ("rff", 1)];

/// Option table, in positional order
pub static OPTIONS: &[OptionDef] =
    &[OptionDef::int("mode", "select mode", 0, 0, 1).with_constants(MODES)];

pub const DESCRIPTOR: FilterDescriptor = FilterDescriptor {
    name: "separatefields",
    description: "Split input video frames into fields.",
    options: OPTIONS,
    create,
};

fn create(values: &OptionValues) -> Result<Box<dyn VideoFilter>> {
    Ok(Box::new(SeparateFields::new(SeparateFieldsConfig::from_options(
        values,
    )?)))
}

/// Field separation state
#[derive(Debug)]
pub struct SeparateFields {
    config: SeparateFieldsConfig,
    input: Option<LinkProps>,
    output: Option<LinkProps>,
    second: Option<Frame>,
    third: Option<Frame>,
}

impl SeparateFields {
    pub fn new(config: SeparateFieldsConfig) -> Self {
        Self {
            config,
            input: None,
            output: None,
            second: None,
            third: None,
        }
    }

    /// Output link for an input link
    pub fn output_link(input: &LinkProps) -> Result<LinkProps> {
        if input.height % 2 != 0 {
            return Err(Error::InvalidGeometry(format!(
                "height must be even, got {}",
                input.height
            )));
        }
        Ok(LinkProps {
            width: input.width,
            height: input.height / 2,
            format: input.format,
            time_base: Rational::new(input.time_base.num, input.time_base.den * 2),
            frame_rate: Rational::new(input.frame_rate.num * 2, input.frame_rate.den),
        })
    }

    /// Number of fields waiting for the next input frame
    pub fn pending(&self) -> usize {
        self.second.is_some() as usize + self.third.is_some() as usize
    }
}

/// Cut a stored frame down to one field and label it
fn emit_field(mut frame: Frame, bottom: bool, order: u8) -> Result<Frame> {
    frame.select_field(bottom)?;
    let (long, short) = if bottom { ("bottom", "B") } else { ("top", "T") };
    frame.set_metadata(META_TYPE_LONG, long);
    frame.set_metadata(META_TYPE, short);
    frame.set_metadata(META_ORDER, order.to_string());
    Ok(frame)
}

impl VideoFilter for SeparateFields {
    fn name(&self) -> &'static str {
        "separatefields"
    }

    fn configure(&mut self, input: &LinkProps) -> Result<LinkProps> {
        let output = Self::output_link(input)?;
        self.input = Some(*input);
        self.output = Some(output);
        self.second = None;
        self.third = None;
        tracing::debug!(
            "separatefields configured: {}x{} -> {}x{}, time base {} -> {}",
            input.width,
            input.height,
            output.width,
            output.height,
            input.time_base,
            output.time_base
        );
        Ok(output)
    }

    fn filter_frame(&mut self, mut frame: Frame, ctx: &mut FilterContext<'_>) -> Result<()> {
        check_frame(self.name(), self.input.as_ref(), &frame)?;
        frame.height /= 2;
        frame.interlaced = false;

        let third_pending = self.third.is_some();
        if let Some(mut second) = self.second.take() {
            second.pts = match (second.pts, frame.pts) {
                (Some(prev), Some(cur)) if third_pending => Some(field_pts(prev, cur, 2)),
                (Some(prev), Some(cur)) => Some(prev.saturating_add(cur)),
                _ => None,
            };
            let tff = second.top_field_first;
            ctx.push_frame(emit_field(second, tff, 2)?)?;
        }

        if let Some(mut third) = self.third.take() {
            third.pts = match (third.pts, frame.pts) {
                (Some(prev), Some(cur)) => Some(field_pts(prev, cur, 4)),
                _ => None,
            };
            let tff = third.top_field_first;
            ctx.push_frame(emit_field(third, !tff, 3)?)?;
        }

        self.second = Some(frame.clone());
        if frame.repeat_pict == 1 && self.config.mode == SeparateFieldsMode::Repeat {
            self.third = Some(frame.clone());
        }

        frame.pts = frame.pts.map(|p| p.saturating_mul(2));
        let tff = frame.top_field_first;
        ctx.push_frame(emit_field(frame, !tff, 1)?)
    }

    fn flush(&mut self, ctx: &mut FilterContext<'_>) -> Result<()> {
        if let Some(third) = self.third.take() {
            tracing::debug!(
                "separatefields: dropping repeated field of frame at pts {:?}",
                third.pts
            );
        }
        if let Some(mut second) = self.second.take() {
            second.pts = second.pts.map(|p| p.saturating_mul(2).saturating_add(1));
            let tff = second.top_field_first;
            ctx.push_frame(emit_field(second, tff, 2)?)?;
        }
        Ok(())
    }
}

/// Field pts at `thirds` thirds of the way from `prev` to `cur`, in field units
fn field_pts(prev: i64, cur: i64, thirds: i64) -> i64 {
    let step = cur.saturating_sub(prev).saturating_mul(thirds) / 3;
    prev.saturating_mul(2).saturating_add(step)
}
