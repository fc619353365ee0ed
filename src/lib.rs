//! inkframe: video frame filters
//!
//! Self-contained filters for planar 8-bit YUV video, plus a small raw
//! video runner to drive them.
//!
//! # Filters
//!
//! - **monocomic**: comic-style monochrome with halftone dot and pattern tones
//! - **yuvrangeconv**: BT.601 studio/full range conversion, custom plane remaps
//! - **separatefields**: split interlaced frames into half-height fields
//! - **showinfo**: checksums, statistics and timing per frame
//!
//! # Example
//!
//! ```rust,no_run
//! use inkframe::{FilterChain, Pipeline, RawVideoReader, RawVideoWriter};
//! use inkframe::types::{LinkProps, PixelFormat};
//!
//! fn main() -> inkframe::Result<()> {
//!     let input = std::fs::File::open("in.yuv")?;
//!     let link = LinkProps::new(720, 480, PixelFormat::Yuv420p);
//!     let reader = RawVideoReader::new(input, link)?;
//!     let mut writer = RawVideoWriter::new(std::fs::File::create("out.yuv")?);
//!
//!     let chain = FilterChain::parse("yuvrangeconv=full,monocomic=pattern:ptc=60")?;
//!     let stats = Pipeline::new(chain).run(reader, &mut writer)?;
//!     println!("{} frames", stats.frames_written);
//!     Ok(())
//! }
//! ```

pub mod capture;
pub mod config;
pub mod error;
pub mod filter;
pub mod output;
pub mod pipeline;
pub mod processing;
pub mod types;

// Re-exports for convenience
pub use capture::{FrameSource, RawVideoReader};
pub use config::{FilterConfig, FilterGraphConfig};
pub use error::{Error, Result};
pub use filter::{create_filter, FilterContext, FrameSink, VideoFilter, FILTERS};
pub use output::{NullSink, RawVideoWriter};
pub use pipeline::{FilterChain, Pipeline};
pub use types::{ColorRange, Frame, LinkProps, PixelFormat, Rational};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
