//! Raw planar video writer
//!
//! Writes the visible rows of every plane, tightly packed, in the same
//! layout [`crate::capture::RawVideoReader`] reads.

use crate::error::Result;
use crate::filter::FrameSink;
use crate::types::Frame;
use std::io::Write;

/// Writes frames as tightly packed planar bytes
pub struct RawVideoWriter<W: Write> {
    writer: W,
    frames_written: u64,
    bytes_written: u64,
}

impl<W: Write> RawVideoWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            frames_written: 0,
            bytes_written: 0,
        }
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Flush and return the underlying writer
    pub fn into_inner(mut self) -> Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }

    /// Write one frame
    pub fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        let (width, height) = (frame.width as usize, frame.height as usize);
        for (i, plane) in frame.planes().iter().enumerate() {
            let (w, h) = frame.format.plane_size(i, width, height);
            let (w, h) = (w.min(plane.width()), h.min(plane.height()));
            for y in 0..h {
                self.writer.write_all(&plane.row(y)[..w])?;
            }
            self.bytes_written += (w * h) as u64;
        }
        self.frames_written += 1;
        Ok(())
    }
}

impl<W: Write> FrameSink for RawVideoWriter<W> {
    fn push_frame(&mut self, frame: Frame) -> Result<()> {
        self.write_frame(&frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{FrameSource, RawVideoReader};
    use crate::types::{LinkProps, PixelFormat};
    use std::io::Cursor;

    #[test]
    fn test_writes_visible_rows_only() {
        let mut frame = Frame::new(3, 2, PixelFormat::Yuv444p).unwrap();
        frame.planes_mut()[0].fill(1);
        frame.planes_mut()[1].fill(2);
        frame.planes_mut()[2].fill(3);
        // planes are stride aligned, output is not
        assert!(frame.planes()[0].stride() > 3);

        let mut writer = RawVideoWriter::new(Vec::new());
        writer.push_frame(frame).unwrap();
        assert_eq!(writer.frames_written(), 1);
        assert_eq!(writer.bytes_written(), 18);
        let bytes = writer.into_inner().unwrap();
        assert_eq!(bytes, [[1u8; 6], [2; 6], [3; 6]].concat());
    }

    #[test]
    fn test_file_matches_reader_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.yuv");
        let input: Vec<u8> = (0..24u8).collect();
        let link = LinkProps::new(4, 4, PixelFormat::Yuv420p);

        let mut reader = RawVideoReader::new(Cursor::new(input.clone()), link).unwrap();
        let mut writer = RawVideoWriter::new(std::fs::File::create(&path).unwrap());
        while let Some(frame) = reader.read_frame().unwrap() {
            writer.push_frame(frame).unwrap();
        }
        writer.flush().unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), input);
    }
}
