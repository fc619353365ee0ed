//! Frame sources
//!
//! Provides raw planar video input:
//! - tightly packed frames from any reader (files, pipes, stdin)

mod raw;

pub use raw::RawVideoReader;

use crate::error::Result;
use crate::types::{Frame, LinkProps};
use std::io::Read;
use std::path::Path;

/// Trait for frame sources
pub trait FrameSource: Send {
    /// Properties of the frames this source produces
    fn link(&self) -> LinkProps;

    /// Read the next frame, `None` at end of stream
    fn read_frame(&mut self) -> Result<Option<Frame>>;
}

/// Open a path for reading, `-` meaning stdin
pub fn open_input(path: impl AsRef<Path>) -> Result<Box<dyn Read + Send>> {
    let path = path.as_ref();
    if path.as_os_str() == "-" {
        tracing::debug!("Reading frames from stdin");
        return Ok(Box::new(std::io::BufReader::new(std::io::stdin())));
    }
    let file = std::fs::File::open(path)?;
    tracing::debug!("Reading frames from {}", path.display());
    Ok(Box::new(std::io::BufReader::new(file)))
}
