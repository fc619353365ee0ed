//! Video filters
//!
//! Each filter is a self-contained unit that receives frames one at a time,
//! transforms or inspects them, and pushes results downstream through a
//! [`FilterContext`]:
//! - `monocomic`: comic-style monochrome with halftone tones
//! - `yuvrangeconv`: studio/full range conversion and custom plane remaps
//! - `separatefields`: split interlaced frames into fields
//! - `showinfo`: per-frame information as log lines or metadata

pub mod monocomic;
mod options;
pub mod rangeconv;
pub mod separatefields;
pub mod showinfo;

pub use monocomic::MonoComic;
pub use options::{OptionDef, OptionKind, OptionValue, OptionValues};
pub use rangeconv::RangeConv;
pub use separatefields::SeparateFields;
pub use showinfo::ShowInfo;

use crate::config::FilterConfig;
use crate::error::{Error, Result};
use crate::types::{Frame, LinkProps, PixelFormat};

/// Trait for video filters
pub trait VideoFilter: Send {
    /// Registered filter name
    fn name(&self) -> &'static str;

    /// Pixel formats this filter accepts (None = any)
    fn supported_formats(&self) -> Option<&'static [PixelFormat]> {
        None
    }

    /// Configure for an input link, returning the output link
    ///
    /// Runs before the first frame and again on every format change.
    fn configure(&mut self, input: &LinkProps) -> Result<LinkProps>;

    /// Process one frame, pushing any output through `ctx`
    fn filter_frame(&mut self, frame: Frame, ctx: &mut FilterContext<'_>) -> Result<()>;

    /// Push out anything held back at end of stream
    fn flush(&mut self, _ctx: &mut FilterContext<'_>) -> Result<()> {
        Ok(())
    }
}

/// Source of fresh output frames
pub trait FrameAllocator {
    /// Allocate a frame, `None` when memory is exhausted
    fn allocate_frame(&mut self, width: u32, height: u32, format: PixelFormat) -> Option<Frame>;
}

/// Allocator backed by the global heap
#[derive(Debug, Default, Clone, Copy)]
pub struct HeapAllocator;

impl FrameAllocator for HeapAllocator {
    fn allocate_frame(&mut self, width: u32, height: u32, format: PixelFormat) -> Option<Frame> {
        Frame::new(width, height, format).ok()
    }
}

/// Downstream consumer of filtered frames
pub trait FrameSink {
    fn push_frame(&mut self, frame: Frame) -> Result<()>;
}

impl FrameSink for Vec<Frame> {
    fn push_frame(&mut self, frame: Frame) -> Result<()> {
        self.push(frame);
        Ok(())
    }
}

/// What a filter sees of the host while handling one call
pub struct FilterContext<'a> {
    allocator: &'a mut dyn FrameAllocator,
    sink: &'a mut dyn FrameSink,
}

impl<'a> FilterContext<'a> {
    pub fn new(allocator: &'a mut dyn FrameAllocator, sink: &'a mut dyn FrameSink) -> Self {
        Self { allocator, sink }
    }

    /// Allocate an output frame
    pub fn allocate_frame(&mut self, width: u32, height: u32, format: PixelFormat) -> Result<Frame> {
        self.allocator
            .allocate_frame(width, height, format)
            .ok_or_else(|| {
                Error::OutOfMemory(format!("could not allocate {}x{} {} frame", width, height, format))
            })
    }

    /// Send a frame downstream
    pub fn push_frame(&mut self, frame: Frame) -> Result<()> {
        self.sink.push_frame(frame)
    }
}

/// Registration record of a filter
pub struct FilterDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub options: &'static [OptionDef],
    pub create: fn(&OptionValues) -> Result<Box<dyn VideoFilter>>,
}

impl std::fmt::Debug for FilterDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterDescriptor")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// All registered filters
pub static FILTERS: &[FilterDescriptor] = &[
    monocomic::DESCRIPTOR,
    rangeconv::DESCRIPTOR,
    separatefields::DESCRIPTOR,
    showinfo::DESCRIPTOR,
];

/// Look up a filter by name
pub fn find_filter(name: &str) -> Option<&'static FilterDescriptor> {
    FILTERS.iter().find(|d| d.name == name)
}

/// Create a filter from `name` or `name=options`
pub fn create_filter(filter: &str) -> Result<Box<dyn VideoFilter>> {
    let filter = filter.trim();
    let (name, args) = filter.split_once('=').unwrap_or((filter, ""));
    let descriptor =
        find_filter(name.trim()).ok_or_else(|| Error::UnknownFilter(name.trim().to_string()))?;
    let values = OptionValues::parse(descriptor.options, args)?;
    tracing::debug!("Creating filter {} with '{}'", descriptor.name, args);
    (descriptor.create)(&values)
}

/// Create a chain of filters from a comma separated description
pub fn parse_chain(description: &str) -> Result<Vec<Box<dyn VideoFilter>>> {
    let filters = description
        .split(',')
        .filter(|s| !s.trim().is_empty())
        .map(create_filter)
        .collect::<Result<Vec<_>>>()?;
    if filters.is_empty() {
        return Err(Error::Config("empty filter chain".to_string()));
    }
    Ok(filters)
}

/// Create a filter from a typed configuration
pub fn create_from_config(config: &FilterConfig) -> Result<Box<dyn VideoFilter>> {
    Ok(match config {
        FilterConfig::Monocomic(c) => Box::new(MonoComic::new(c.clone())?),
        FilterConfig::Yuvrangeconv(c) => Box::new(RangeConv::new(c.clone())),
        FilterConfig::Separatefields(c) => Box::new(SeparateFields::new(c.clone())),
        FilterConfig::Showinfo(c) => Box::new(ShowInfo::new(c.clone())),
    })
}

/// Check a link against a filter's format list
pub(crate) fn check_format(
    filter: &str,
    formats: &[PixelFormat],
    link: &LinkProps,
) -> Result<()> {
    if formats.contains(&link.format) {
        Ok(())
    } else {
        Err(Error::UnsupportedFormat(format!(
            "{} does not accept {}",
            filter, link.format
        )))
    }
}

/// Check that a frame matches the configured link
pub(crate) fn check_frame(filter: &str, link: Option<&LinkProps>, frame: &Frame) -> Result<LinkProps> {
    let link = link.ok_or_else(|| Error::NotConfigured(filter.to_string()))?;
    if frame.width != link.width || frame.height != link.height || frame.format != link.format {
        return Err(Error::InvalidFrame(format!(
            "{} configured for {}x{} {}, got {}x{} {}",
            filter, link.width, link.height, link.format, frame.width, frame.height, frame.format
        )));
    }
    Ok(*link)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_names() {
        let names: Vec<_> = FILTERS.iter().map(|d| d.name).collect();
        assert_eq!(names, ["monocomic", "yuvrangeconv", "separatefields", "showinfo"]);
        assert!(find_filter("monocomic").is_some());
        assert!(find_filter("blur").is_none());
    }

    #[test]
    fn test_create_filter() {
        assert_eq!(create_filter("monocomic").unwrap().name(), "monocomic");
        assert_eq!(
            create_filter("yuvrangeconv=mode=tv:compare=1").unwrap().name(),
            "yuvrangeconv"
        );
        let err = create_filter("blur=3").err().unwrap();
        assert!(matches!(err, Error::UnknownFilter(_)));
        assert!(create_filter("monocomic=gamma=7").is_err());
    }

    #[test]
    fn test_parse_chain() {
        let chain = parse_chain("yuvrangeconv=full, monocomic=pattern:60:170, showinfo").unwrap();
        let names: Vec<_> = chain.iter().map(|f| f.name()).collect();
        assert_eq!(names, ["yuvrangeconv", "monocomic", "showinfo"]);
        assert!(parse_chain(" , ").is_err());
    }

    #[test]
    fn test_allocation_failure_is_oom() {
        let mut allocator = testing::ExhaustedAllocator;
        let mut sink = Vec::new();
        let mut ctx = FilterContext::new(&mut allocator, &mut sink);
        let err = ctx.allocate_frame(4, 4, PixelFormat::Yuv420p).unwrap_err();
        assert!(err.is_resource_exhaustion());
    }

    #[test]
    fn test_check_frame() {
        let link = LinkProps::new(4, 4, PixelFormat::Yuv420p);
        let frame = Frame::new(4, 4, PixelFormat::Yuv420p).unwrap();
        assert!(check_frame("t", Some(&link), &frame).is_ok());
        assert!(matches!(
            check_frame("t", None, &frame),
            Err(Error::NotConfigured(_))
        ));
        let other = Frame::new(4, 2, PixelFormat::Yuv420p).unwrap();
        assert!(matches!(
            check_frame("t", Some(&link), &other),
            Err(Error::InvalidFrame(_))
        ));
    }
}
