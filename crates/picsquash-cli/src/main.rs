//! Command-line front-end for the picsquash compression pipeline.
//!
//! Thin wrapper: parse arguments into a [`Config`], run [`compress`],
//! print the resulting path. The pipeline itself never fails the
//! process - on internal errors it falls back to the source file.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use picsquash_core::{compress, Config, OutputFormat, DEFAULT_MAX_BYTES};

#[derive(Parser, Debug)]
#[command(
    name = "picsquash",
    about = "Compress an image file down to a byte budget"
)]
struct Args {
    /// Source image file
    input: PathBuf,

    /// Output directory (created if absent)
    #[arg(long, default_value = "compressed")]
    out_dir: PathBuf,

    /// Output file name; defaults to the input stem plus the format extension
    #[arg(long)]
    name: Option<String>,

    /// Maximum output width in pixels; 0 = unbounded
    #[arg(long, default_value_t = 0)]
    max_width: u32,

    /// Maximum output height in pixels; 0 = unbounded
    #[arg(long, default_value_t = 0)]
    max_height: u32,

    /// Quality floor (1-100) for the budget search
    #[arg(long, default_value_t = 50)]
    min_quality: u8,

    /// Byte budget for the output file
    #[arg(long, default_value_t = DEFAULT_MAX_BYTES)]
    max_bytes: usize,

    /// Output codec
    #[arg(long, value_enum, default_value_t = FormatArg::Jpeg)]
    format: FormatArg,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    Jpeg,
    Png,
}

impl From<FormatArg> for OutputFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Jpeg => OutputFormat::Jpeg,
            FormatArg::Png => OutputFormat::Png,
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let config = Config {
        max_width: args.max_width,
        max_height: args.max_height,
        min_quality: args.min_quality,
        max_bytes: args.max_bytes,
        format: args.format.into(),
    };

    let file_name = args.name.unwrap_or_else(|| {
        let stem = args
            .input
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("output");
        format!("{}.{}", stem, config.format.extension())
    });

    tracing::info!(
        input = %args.input.display(),
        out_dir = %args.out_dir.display(),
        file_name = %file_name,
        max_width = config.max_width,
        max_height = config.max_height,
        min_quality = config.min_quality,
        max_bytes = config.max_bytes,
        format = ?config.format,
        "compressing"
    );

    let result = compress(&args.input, &args.out_dir, &file_name, &config);
    println!("{}", result.display());
}
