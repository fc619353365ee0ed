//! Frame outputs
//!
//! Provides raw planar video output:
//! - tightly packed frames to any writer (files, pipes, stdout)
//! - a null sink that only counts frames

mod file;

pub use file::RawVideoWriter;

use crate::error::Result;
use crate::filter::FrameSink;
use crate::types::Frame;
use std::io::Write;
use std::path::Path;

/// Sink that discards frames, counting them
#[derive(Debug, Default)]
pub struct NullSink {
    frames: u64,
}

impl NullSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl FrameSink for NullSink {
    fn push_frame(&mut self, _frame: Frame) -> Result<()> {
        self.frames += 1;
        Ok(())
    }
}

/// Create a path for writing, `-` meaning stdout
pub fn create_output(path: impl AsRef<Path>) -> Result<Box<dyn Write + Send>> {
    let path = path.as_ref();
    if path.as_os_str() == "-" {
        tracing::debug!("Writing frames to stdout");
        return Ok(Box::new(std::io::BufWriter::new(std::io::stdout())));
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let file = std::fs::File::create(path)?;
    tracing::debug!("Writing frames to {}", path.display());
    Ok(Box::new(std::io::BufWriter::new(file)))
}
