//! Example: render a `.flo` file with the flow color wheel.
//!
//! Reads a flow field, prints its size, known-pixel count and maximum motion,
//! and writes the color-coded PNG next to the input.
//!
//! Run from the workspace root:
//!   cargo run -p flow-eval --example colorize -- --help
//!   cargo run -p flow-eval --example colorize -- --input data/flow1.flo

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use flow_eval::{ColorWheel, compute_max_motion, count_set, read_flo, render};
use image::RgbImage;

#[derive(Parser, Debug)]
#[command(about = "Color-code an optical-flow field stored as .flo")]
struct Args {
    /// Input flow file
    #[arg(long)]
    input: PathBuf,

    /// Normalization radius; the field's largest known motion when omitted
    #[arg(long)]
    max_motion: Option<f32>,

    /// Output PNG (default: <input stem>_color.png next to input)
    #[arg(long)]
    out: Option<PathBuf>,
}

fn default_output(input: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    let dir = input.parent().unwrap_or(Path::new("."));
    dir.join(format!("{stem}_color.png"))
}

fn main() -> Result<()> {
    let args = Args::parse();

    let flow = read_flo(&args.input)
        .with_context(|| format!("reading flow {}", args.input.display()))?;
    let motion = compute_max_motion(&flow.as_view());
    println!(
        "loaded {}: {}, {} known pixels, max motion {:.3}",
        args.input.display(),
        flow.size(),
        count_set(&motion.valid.as_view()),
        motion.max_radius
    );

    let rgb = render(&flow.as_view(), args.max_motion, [0, 0, 0], ColorWheel::shared());
    let raw: Vec<u8> = rgb.data().iter().flatten().copied().collect();
    let out_img = RgbImage::from_raw(rgb.width() as u32, rgb.height() as u32, raw)
        .context("constructing RgbImage from rendered pixels")?;

    let out_path = args.out.unwrap_or_else(|| default_output(&args.input));
    out_img
        .save(&out_path)
        .with_context(|| format!("saving {}", out_path.display()))?;
    println!("wrote {}", out_path.display());

    Ok(())
}
