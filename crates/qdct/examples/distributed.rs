//! Compress one image on several simulated devices, store each version as
//! NSL, and reconstruct from the stored files.
//!
//! ```text
//! RUST_LOG=debug cargo run -p qdct --features image --example distributed -- \
//!     --input photo.png --level 100 --out out/
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use qdct::*;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Source image; a synthetic test card is used when omitted
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Compression level applied on every device
    #[arg(short, long, default_value = "100")]
    level: u32,

    /// Device identifiers
    #[arg(short, long, num_args = 1.., default_values = ["DEVICE-001", "DEVICE-002", "DEVICE-003"])]
    devices: Vec<String>,

    /// Output directory for NSL files and previews
    #[arg(short, long, default_value = "qdct-out")]
    out: PathBuf,
}

fn test_card(width: u32, height: u32) -> Result<Image> {
    let mut image = Image::new(Dimensions::new(width, height))?;
    for y in 0..height {
        for x in 0..width {
            let fx = x as f32 / width as f32;
            let fy = y as f32 / height as f32;
            let ring = ((fx - 0.5).hypot(fy - 0.5) * 40.0).sin() * 0.5 + 0.5;
            image.set_pixel(
                x,
                y,
                [
                    (fx * 255.0) as u8,
                    (ring * 255.0) as u8,
                    (fy * 255.0) as u8,
                    255,
                ],
            );
        }
    }
    Ok(image)
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let source = match &args.input {
        Some(path) => load_image(path).with_context(|| format!("loading {}", path.display()))?,
        None => test_card(256, 192)?,
    };
    std::fs::create_dir_all(&args.out)?;

    let engine = CompressionEngine::default();
    let mut paths = Vec::new();
    for device in &args.devices {
        let result = engine.compress(&source, device, args.level)?;
        let quality = psnr(&source, &result.preview)?;

        let path = args.out.join(nsl_filename(device, args.level, 0));
        write_nsl_file(&path, &result.compressed)?;
        save_image(&result.preview, args.out.join(format!("{}.png", device.replace(':', "-"))))?;

        println!(
            "{:<12} level {:>4}  {:>8} bytes  {:>6.2} dB",
            device, args.level, result.size_bytes, quality
        );
        paths.push(path);
    }

    let versions = paths
        .iter()
        .map(read_nsl_file)
        .collect::<QdctResult<Vec<_>>>()?;
    let merged = engine.reconstruct(&versions)?;
    save_image(&merged, args.out.join("reconstructed.png"))?;

    println!(
        "reconstructed from {} devices: {:.2} dB",
        versions.len(),
        psnr(&source, &merged)?
    );
    Ok(())
}
