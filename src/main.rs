//! inkframe CLI
//!
//! Command-line interface for listing and running the filters on raw video.

use clap::{Parser, Subcommand, ValueEnum};
use inkframe::{
    capture, output,
    filter::{OptionKind, FILTERS},
    processing::ToneMatrix,
    types::{ColorRange, LinkProps, PixelFormat, Rational, Resolution},
    FilterChain, FilterGraphConfig, Pipeline, RawVideoReader, RawVideoWriter,
};
use std::path::PathBuf;

/// Tone matrix kind for CLI
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum Tone {
    /// 16-level halftone dots
    #[default]
    Dot,
    /// 64-level ordered pattern
    Pattern,
}

/// Input range tag for CLI
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum Range {
    #[default]
    Unknown,
    /// Studio range (16-235)
    Tv,
    /// Full range (0-255)
    Pc,
}

impl From<Range> for ColorRange {
    fn from(r: Range) -> Self {
        match r {
            Range::Unknown => ColorRange::Unspecified,
            Range::Tv => ColorRange::Mpeg,
            Range::Pc => ColorRange::Jpeg,
        }
    }
}

#[derive(Parser)]
#[command(name = "inkframe")]
#[command(about = "Video frame filters - comic monochrome, range conversion, fields, frame info")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List filters and their options
    Filters,

    /// List supported pixel formats
    Formats,

    /// Print a halftone tone matrix
    Tone {
        /// Matrix kind
        #[arg(value_enum, default_value = "dot")]
        kind: Tone,

        /// Pattern coefficient (0-127)
        #[arg(long, default_value = "45")]
        ptc: u8,

        /// Use studio range ink levels
        #[arg(long)]
        mpeg: bool,
    },

    /// Filter a raw planar video file
    Run {
        /// Input file ("-" for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file ("-" for stdout, omit to discard)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Frame size (e.g., 720x480)
        #[arg(short, long)]
        size: Resolution,

        /// Pixel format
        #[arg(short, long, default_value = "yuv420p")]
        pix_fmt: PixelFormat,

        /// Filter chain (e.g., "yuvrangeconv=full,monocomic=pattern")
        #[arg(long, conflicts_with = "graph")]
        vf: Option<String>,

        /// TOML filter graph file
        #[arg(long)]
        graph: Option<PathBuf>,

        /// Frame rate (e.g., 25 or 30000/1001)
        #[arg(short, long, default_value = "25")]
        rate: Rational,

        /// Color range tag of the input
        #[arg(long, value_enum, default_value = "unknown")]
        range: Range,
    },
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("inkframe=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Filters => cmd_filters(),
        Commands::Formats => cmd_formats(),
        Commands::Tone { kind, ptc, mpeg } => cmd_tone(kind, ptc, mpeg),
        Commands::Run {
            input,
            output,
            size,
            pix_fmt,
            vf,
            graph,
            rate,
            range,
        } => cmd_run(input, output, size, pix_fmt, vf, graph, rate, range),
    }
}

fn cmd_filters() -> anyhow::Result<()> {
    println!("Available Filters");
    println!("=================\n");

    for descriptor in FILTERS {
        println!("{:<16} {}", descriptor.name, descriptor.description);
        for option in descriptor.options {
            let range = match option.kind {
                OptionKind::Int { min, max } => format!("[{} - {}]", min, max),
                OptionKind::Double { min, max } => format!("[{:.1} - {:.1}]", min, max),
            };
            println!(
                "  {:<12} {:<36} {:<12} default {}",
                option.name,
                option.help,
                range,
                option.default_text()
            );
            if !option.constants.is_empty() {
                let names: Vec<_> = option
                    .constants
                    .iter()
                    .map(|(name, value)| format!("{}={}", name, value))
                    .collect();
                println!("  {:<12} {}", "", names.join(" "));
            }
        }
        println!();
    }

    println!("Usage: inkframe run --vf \"name=opt:opt,name=key=value\" ...");

    Ok(())
}

fn cmd_formats() -> anyhow::Result<()> {
    println!("Supported Pixel Formats");
    println!("=======================\n");

    for format in PixelFormat::ALL {
        println!(
            "  {:<10} planes {}  chroma 1/{} x 1/{}{}",
            format.name(),
            format.plane_count(),
            1 << format.log2_chroma_w(),
            1 << format.log2_chroma_h(),
            if format.has_alpha() { "  alpha" } else { "" }
        );
    }

    Ok(())
}

fn cmd_tone(kind: Tone, ptc: u8, mpeg: bool) -> anyhow::Result<()> {
    let matrix = match kind {
        Tone::Dot => ToneMatrix::dot(mpeg)?,
        Tone::Pattern => {
            if ptc > 127 {
                anyhow::bail!("pattern coefficient must be 0-127, got {}", ptc);
            }
            ToneMatrix::pattern(ptc, mpeg)?
        }
    };

    for level in 0..matrix.levels() {
        println!("level {}", level);
        for row in matrix.cell(level).chunks(8) {
            let line: String = row
                .iter()
                .map(|&v| if v >= 128 { '.' } else { '#' })
                .collect();
            println!("  {}", line);
        }
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn cmd_run(
    input: PathBuf,
    output_path: Option<PathBuf>,
    size: Resolution,
    format: PixelFormat,
    vf: Option<String>,
    graph: Option<PathBuf>,
    rate: Rational,
    range: Range,
) -> anyhow::Result<()> {
    let chain = match (vf, graph) {
        (Some(description), _) => FilterChain::parse(&description)?,
        (None, Some(path)) => FilterChain::from_config(&FilterGraphConfig::load(path)?)?,
        (None, None) => anyhow::bail!("no filters given, use --vf or --graph"),
    };

    if rate.num <= 0 || rate.den <= 0 {
        anyhow::bail!("frame rate must be positive, got {}", rate);
    }

    let link = LinkProps::new(size.width, size.height, format);
    let reader = RawVideoReader::new(capture::open_input(&input)?, link)?
        .with_frame_rate(rate)
        .with_color_range(range.into());

    let pipeline = Pipeline::new(chain);
    let stats = match output_path {
        Some(path) => {
            let mut writer = RawVideoWriter::new(output::create_output(&path)?);
            pipeline.run(reader, &mut writer)?;
            writer.flush()?;
            pipeline.record_bytes_written(writer.bytes_written());
            pipeline.stats()
        }
        None => pipeline.run(reader, &mut output::NullSink::new())?,
    };

    eprintln!("\nStatistics:");
    eprintln!("  Frames read: {}", stats.frames_read);
    eprintln!("  Frames written: {}", stats.frames_written);
    eprintln!("  Bytes written: {}", stats.bytes_written);
    eprintln!("  Avg filter time: {:.3} ms", stats.avg_filter_time_ms);

    Ok(())
}
