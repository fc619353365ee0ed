//! Raw planar video reader
//!
//! Frames are stored back to back, each plane tightly packed (stride equal
//! to the visible width), planes in Y, Cb, Cr, A order.

use super::FrameSource;
use crate::error::{try_alloc, Error, Result};
use crate::types::{ColorRange, Frame, LinkProps, Plane, Rational};
use std::io::{ErrorKind, Read};

/// Reads tightly packed planar frames from a byte stream
pub struct RawVideoReader<R> {
    reader: R,
    link: LinkProps,
    color_range: ColorRange,
    frame_size: usize,
    frames_read: u64,
}

impl<R: Read> RawVideoReader<R> {
    /// Create a reader for frames described by `link`
    pub fn new(reader: R, link: LinkProps) -> Result<Self> {
        if link.width == 0 || link.height == 0 {
            return Err(Error::InvalidGeometry(format!(
                "frame size {}x{} is empty",
                link.width, link.height
            )));
        }
        let frame_size = link
            .format
            .frame_size(link.width as usize, link.height as usize);
        Ok(Self {
            reader,
            link,
            color_range: ColorRange::Unspecified,
            frame_size,
            frames_read: 0,
        })
    }

    /// Tag every frame with a color range
    pub fn with_color_range(mut self, range: ColorRange) -> Self {
        self.color_range = range;
        self
    }

    /// Set the frame rate (and the matching time base)
    pub fn with_frame_rate(mut self, rate: Rational) -> Self {
        self.link = self.link.with_frame_rate(rate);
        self
    }

    /// Bytes per frame
    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    pub fn frames_read(&self) -> u64 {
        self.frames_read
    }

    /// Fill `buf`, returning how many bytes arrived before end of stream
    fn fill(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.reader.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(filled)
    }
}

impl<R: Read + Send> FrameSource for RawVideoReader<R> {
    fn link(&self) -> LinkProps {
        self.link
    }

    fn read_frame(&mut self) -> Result<Option<Frame>> {
        let format = self.link.format;
        let (width, height) = (self.link.width as usize, self.link.height as usize);

        let mut planes = Vec::with_capacity(format.plane_count());
        let mut total = 0;
        for i in 0..format.plane_count() {
            let (w, h) = format.plane_size(i, width, height);
            let mut data = try_alloc(w * h, "input plane")?;
            let got = self.fill(&mut data)?;
            total += got;
            if got < data.len() {
                if total > 0 {
                    tracing::warn!(
                        "Dropping truncated frame {} ({} of {} bytes)",
                        self.frames_read,
                        total,
                        self.frame_size
                    );
                }
                return Ok(None);
            }
            planes.push(Plane::from_vec(data, w, h, w)?);
        }

        let mut frame = Frame::from_planes(self.link.width, self.link.height, format, planes)?;
        frame.pts = Some(self.frames_read as i64);
        frame.pkt_pos = (self.frames_read as usize * self.frame_size) as i64;
        frame.pkt_size = self.frame_size as i64;
        frame.color_range = self.color_range;
        self.frames_read += 1;
        Ok(Some(frame))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PixelFormat;
    use std::io::Cursor;

    fn stream(frames: usize, format: PixelFormat) -> Vec<u8> {
        let size = format.frame_size(4, 2);
        (0..frames * size).map(|i| (i / size * 10 + i % size) as u8).collect()
    }

    #[test]
    fn test_reads_planes_in_order() {
        let link = LinkProps::new(4, 2, PixelFormat::Yuv420p);
        let mut reader = RawVideoReader::new(Cursor::new(stream(2, PixelFormat::Yuv420p)), link)
            .unwrap()
            .with_color_range(ColorRange::Mpeg);
        assert_eq!(reader.frame_size(), 12);

        let first = reader.read_frame().unwrap().unwrap();
        assert_eq!(first.planes()[0].row(0), &[0, 1, 2, 3]);
        assert_eq!(first.planes()[0].row(1), &[4, 5, 6, 7]);
        assert_eq!(first.planes()[1].row(0), &[8, 9]);
        assert_eq!(first.planes()[2].row(0), &[10, 11]);
        assert_eq!(first.pts, Some(0));
        assert_eq!(first.pkt_pos, 0);
        assert_eq!(first.pkt_size, 12);
        assert_eq!(first.color_range, ColorRange::Mpeg);

        let second = reader.read_frame().unwrap().unwrap();
        assert_eq!(second.planes()[0].row(0), &[10, 11, 12, 13]);
        assert_eq!(second.pts, Some(1));
        assert_eq!(second.pkt_pos, 12);

        assert!(reader.read_frame().unwrap().is_none());
        assert_eq!(reader.frames_read(), 2);
    }

    #[test]
    fn test_alpha_plane() {
        let link = LinkProps::new(4, 2, PixelFormat::Yuva444p);
        let mut reader =
            RawVideoReader::new(Cursor::new(stream(1, PixelFormat::Yuva444p)), link).unwrap();
        let frame = reader.read_frame().unwrap().unwrap();
        assert_eq!(frame.planes().len(), 4);
        assert_eq!(frame.planes()[3].row(1), &[28, 29, 30, 31]);
    }

    #[test]
    fn test_truncated_frame_is_dropped() {
        let link = LinkProps::new(4, 2, PixelFormat::Yuv420p);
        let mut data = stream(2, PixelFormat::Yuv420p);
        data.truncate(17);
        let mut reader = RawVideoReader::new(Cursor::new(data), link).unwrap();
        assert!(reader.read_frame().unwrap().is_some());
        assert!(reader.read_frame().unwrap().is_none());
    }

    #[test]
    fn test_frame_rate_sets_time_base() {
        let link = LinkProps::new(4, 2, PixelFormat::Yuv420p);
        let reader = RawVideoReader::new(Cursor::new(Vec::new()), link)
            .unwrap()
            .with_frame_rate(Rational::new(30000, 1001));
        assert_eq!(reader.link().time_base, Rational::new(1001, 30000));
    }

    #[test]
    fn test_empty_size_rejected() {
        let link = LinkProps::new(0, 2, PixelFormat::Yuv420p);
        assert!(RawVideoReader::new(Cursor::new(Vec::new()), link).is_err());
    }
}
