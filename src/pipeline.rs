//! Filter pipeline
//!
//! Connects source → filter chain → sink.
//! The source runs on its own thread and hands frames over a bounded
//! channel; filtering and output happen on the calling thread.

use crate::capture::FrameSource;
use crate::config::FilterGraphConfig;
use crate::error::{Error, Result};
use crate::filter::{self, FilterContext, FrameSink, HeapAllocator, VideoFilter};
use crate::types::{Frame, LinkProps, Stats};

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Filters applied in sequence, each feeding the next
pub struct FilterChain {
    filters: Vec<Box<dyn VideoFilter>>,
    links: Vec<LinkProps>,
    allocator: HeapAllocator,
}

impl FilterChain {
    pub fn new(filters: Vec<Box<dyn VideoFilter>>) -> Self {
        Self {
            filters,
            links: Vec::new(),
            allocator: HeapAllocator,
        }
    }

    /// Build a chain from `name=opts,name=opts`
    pub fn parse(description: &str) -> Result<Self> {
        Ok(Self::new(filter::parse_chain(description)?))
    }

    /// Build a chain from a graph file
    pub fn from_config(graph: &FilterGraphConfig) -> Result<Self> {
        graph.validate()?;
        let filters = graph
            .filters
            .iter()
            .map(filter::create_from_config)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(filters))
    }

    /// Names of the filters in order
    pub fn names(&self) -> Vec<&'static str> {
        self.filters.iter().map(|f| f.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Negotiate every link, returning the chain's output link
    pub fn configure(&mut self, input: &LinkProps) -> Result<LinkProps> {
        self.links.clear();
        let mut link = *input;
        for filter in &mut self.filters {
            if let Some(formats) = filter.supported_formats() {
                if !formats.contains(&link.format) {
                    return Err(Error::UnsupportedFormat(format!(
                        "{} does not accept {} (accepts {})",
                        filter.name(),
                        link.format,
                        formats
                            .iter()
                            .map(|f| f.name())
                            .collect::<Vec<_>>()
                            .join(", ")
                    )));
                }
            }
            link = filter.configure(&link)?;
            self.links.push(link);
        }
        tracing::debug!(
            "Filter chain [{}] configured: {}x{} {} -> {}x{} {}",
            self.names().join(","),
            input.width,
            input.height,
            input.format,
            link.width,
            link.height,
            link.format
        );
        Ok(link)
    }

    /// Output link, once configured
    pub fn output_link(&self) -> Option<LinkProps> {
        self.links.last().copied()
    }

    /// Run one frame through every filter
    pub fn filter_frame(&mut self, frame: Frame, sink: &mut dyn FrameSink) -> Result<()> {
        if self.links.len() != self.filters.len() || self.filters.is_empty() {
            return Err(Error::NotConfigured("filter chain".to_string()));
        }
        self.run_from(0, vec![frame], sink)
    }

    /// Drain frames held back by any filter at end of stream
    pub fn flush(&mut self, sink: &mut dyn FrameSink) -> Result<()> {
        for i in 0..self.filters.len() {
            let mut held = Vec::new();
            {
                let mut ctx = FilterContext::new(&mut self.allocator, &mut held);
                self.filters[i].flush(&mut ctx)?;
            }
            self.run_from(i + 1, held, sink)?;
        }
        Ok(())
    }

    fn run_from(&mut self, start: usize, frames: Vec<Frame>, sink: &mut dyn FrameSink) -> Result<()> {
        let mut pending = frames;
        for filter in self.filters.iter_mut().skip(start) {
            if pending.is_empty() {
                return Ok(());
            }
            let mut next = Vec::with_capacity(pending.len());
            for frame in pending {
                let mut ctx = FilterContext::new(&mut self.allocator, &mut next);
                filter.filter_frame(frame, &mut ctx)?;
            }
            pending = next;
        }
        for frame in pending {
            sink.push_frame(frame)?;
        }
        Ok(())
    }
}

/// Source → filters → sink runner
pub struct Pipeline {
    chain: Mutex<FilterChain>,
    queue_depth: usize,
    running: Arc<AtomicBool>,
    stats: Arc<Mutex<Stats>>,
}

impl Pipeline {
    /// Create a new pipeline around a filter chain
    pub fn new(chain: FilterChain) -> Self {
        Self {
            chain: Mutex::new(chain),
            queue_depth: 4,
            running: Arc::new(AtomicBool::new(false)),
            stats: Arc::new(Mutex::new(Stats::default())),
        }
    }

    /// Frames the source may read ahead of the filters
    pub fn with_queue_depth(mut self, depth: usize) -> Self {
        self.queue_depth = depth.max(1);
        self
    }

    /// Check if the pipeline is running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Ask a running pipeline to stop after the frames already read
    pub fn stop(&self) {
        if self.running.swap(false, Ordering::SeqCst) {
            tracing::info!("Pipeline stop requested");
        }
    }

    /// Current statistics
    pub fn stats(&self) -> Stats {
        self.stats.lock().clone()
    }

    /// Run until the source is exhausted or [`Pipeline::stop`] is called
    ///
    /// Any source, filter or sink error ends the run and is returned.
    pub fn run<S>(&self, mut source: S, sink: &mut dyn FrameSink) -> Result<Stats>
    where
        S: FrameSource + 'static,
    {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(Error::PipelineAlreadyRunning);
        }
        *self.stats.lock() = Stats::default();

        let mut chain = self.chain.lock();
        let input = source.link();
        let output = match chain.configure(&input) {
            Ok(link) => link,
            Err(e) => {
                self.running.store(false, Ordering::SeqCst);
                return Err(e);
            }
        };
        tracing::info!(
            "Pipeline starting: {}x{} {} -> {}x{} {} through [{}]",
            input.width,
            input.height,
            input.format,
            output.width,
            output.height,
            output.format,
            chain.names().join(",")
        );

        let (frame_tx, frame_rx) = crossbeam_channel::bounded::<Result<Frame>>(self.queue_depth);
        let reader_running = self.running.clone();
        let reader_stats = self.stats.clone();
        let reader = std::thread::spawn(move || {
            while reader_running.load(Ordering::SeqCst) {
                let message = match source.read_frame() {
                    Ok(Some(frame)) => {
                        reader_stats.lock().frames_read += 1;
                        Ok(frame)
                    }
                    Ok(None) => break,
                    Err(e) => Err(e),
                };
                let failed = message.is_err();
                if frame_tx.send(message).is_err() || failed {
                    break;
                }
            }
            tracing::debug!("Reader thread stopped");
        });

        let mut counting = CountingSink {
            inner: sink,
            frames: 0,
        };
        let result = self.process(&mut *chain, &frame_rx, &mut counting);

        self.running.store(false, Ordering::SeqCst);
        drop(frame_rx);
        if reader.join().is_err() {
            return Err(Error::Pipeline("reader thread panicked".to_string()));
        }

        self.stats.lock().frames_written = counting.frames;
        match result {
            Ok(()) => {
                let stats = self.stats();
                tracing::info!(
                    "Pipeline finished: {} frames in, {} frames out",
                    stats.frames_read,
                    stats.frames_written
                );
                Ok(stats)
            }
            Err(e) => {
                tracing::error!("Pipeline aborted: {}", e);
                Err(e)
            }
        }
    }

    fn process(
        &self,
        chain: &mut FilterChain,
        frames: &crossbeam_channel::Receiver<Result<Frame>>,
        sink: &mut CountingSink<'_>,
    ) -> Result<()> {
        let mut filtered = 0u64;
        for message in frames.iter() {
            let frame = message?;
            let pts = frame.pts;
            let started = Instant::now();
            if let Err(e) = chain.filter_frame(frame, &mut *sink) {
                tracing::error!("Filtering frame at pts {:?} failed: {}", pts, e);
                return Err(e);
            }
            let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

            filtered += 1;
            let mut stats = self.stats.lock();
            let avg = stats.avg_filter_time_ms;
            stats.avg_filter_time_ms = avg + (elapsed_ms - avg) / filtered as f64;
        }
        chain.flush(&mut *sink)
    }

    /// Attach byte counts from a writer to the last run's statistics
    pub fn record_bytes_written(&self, bytes: u64) {
        self.stats.lock().bytes_written = bytes;
    }
}

/// Forwards frames to the real sink, counting them
struct CountingSink<'a> {
    inner: &'a mut dyn FrameSink,
    frames: u64,
}

impl FrameSink for CountingSink<'_> {
    fn push_frame(&mut self, frame: Frame) -> Result<()> {
        self.inner.push_frame(frame)?;
        self.frames += 1;
        Ok(())
    }
}
