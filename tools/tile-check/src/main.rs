// Watermark tile CLI.
//
// Usage:
//   tile-check tile --text "DRAFT" --rotate 30 -o tile.png
//   tile-check composite photo.jpg -o out.jpg --type image/jpeg
//   tile-check compare a.png b.png [-d diff.png] [--tolerance N]
//   tile-check sweep --from 0 --to 85 --step 5 [--out-dir tiles/]

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use agg_watermark::{
    CanvasOptions, CompositeCanvas, DisplayPolicy, EventCallbacks, FontEngine, LoadLimits,
    Rgba8, TileRenderer, WatermarkConfig,
};
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tile_check::{compare_buffers, generate_diff_image, ink_stats, load_rgba, save_rgba};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tile-check", version, about = "Render and inspect watermark tiles")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render a single tile to an image file.
    Tile {
        #[command(flatten)]
        watermark: WatermarkArgs,
        #[arg(short, long, default_value = "tile.png")]
        output: PathBuf,
    },
    /// Watermark an image and export it.
    Composite {
        input: PathBuf,
        #[command(flatten)]
        watermark: WatermarkArgs,
        #[arg(short, long)]
        output: PathBuf,
        /// Output MIME type; unknown types fall back to PNG.
        #[arg(long = "type", default_value = "image/png")]
        mime_type: String,
        /// Encoder quality in 0..=1 for lossy formats.
        #[arg(long)]
        quality: Option<f64>,
        /// Maximum display width.
        #[arg(long, default_value_t = 1200)]
        max_width: u32,
        /// Skip the byte and pixel count limits.
        #[arg(long)]
        unlimited: bool,
    },
    /// Compare two images pixel by pixel.
    Compare {
        a: PathBuf,
        b: PathBuf,
        #[arg(short, long)]
        diff: Option<PathBuf>,
        #[arg(long, default_value_t = 0)]
        tolerance: u8,
    },
    /// Render tiles over a range of rotations and report ink statistics.
    Sweep {
        #[command(flatten)]
        watermark: WatermarkArgs,
        #[arg(long, default_value_t = 0.0)]
        from: f64,
        #[arg(long, default_value_t = 85.0)]
        to: f64,
        #[arg(long, default_value_t = 5.0)]
        step: f64,
        /// Write each tile as `tile_<angle>.png` into this directory.
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
}

#[derive(Args)]
struct WatermarkArgs {
    #[arg(long, default_value = agg_watermark::watermark_config::DEFAULT_TEXT)]
    text: String,
    #[arg(long, default_value_t = 26.0)]
    font_size: f64,
    /// CSS color: #rgb, #rrggbb, #rrggbbaa, rgb()/rgba() or a name.
    #[arg(long, default_value = "#00000080")]
    fill: String,
    #[arg(long, default_value_t = 252.0)]
    width: f64,
    #[arg(long, default_value_t = 180.0)]
    height: f64,
    #[arg(long, default_value_t = 20.0)]
    rotate: f64,
    /// TrueType/OpenType font; the built-in raster font otherwise.
    #[arg(long, env = "TILE_CHECK_FONT")]
    font: Option<PathBuf>,
}

impl WatermarkArgs {
    fn config(&self) -> Result<WatermarkConfig> {
        let fill: Rgba8 = self.fill.parse()?;
        Ok(WatermarkConfig::new(self.text.clone())
            .with_font_size(self.font_size)
            .with_fill_color(fill)
            .with_tile_size(self.width, self.height)
            .with_rotation(self.rotate))
    }

    fn renderer(&self) -> Result<TileRenderer> {
        let renderer = match &self.font {
            None => TileRenderer::new(),
            Some(path) => {
                let data = std::fs::read(path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                TileRenderer::with_glyphs(Arc::new(FontEngine::from_data(data, 0)?))
            }
        };
        let missing = renderer.missing_glyphs(&self.text);
        if !missing.is_empty() {
            let chars: String = missing.iter().collect();
            warn!("no glyphs for {chars:?}; they render as boxes, pass --font to fix");
        }
        Ok(renderer)
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Tile { watermark, output } => cmd_tile(&watermark, &output),
        Command::Composite {
            input,
            watermark,
            output,
            mime_type,
            quality,
            max_width,
            unlimited,
        } => {
            let limits = if unlimited {
                LoadLimits::unlimited()
            } else {
                LoadLimits::default()
            };
            cmd_composite(
                &input, &watermark, &output, &mime_type, quality, max_width, limits,
            )
        }
        Command::Compare {
            a,
            b,
            diff,
            tolerance,
        } => cmd_compare(&a, &b, diff.as_deref(), tolerance),
        Command::Sweep {
            watermark,
            from,
            to,
            step,
            out_dir,
        } => cmd_sweep(&watermark, from, to, step, out_dir.as_deref()),
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}

fn cmd_tile(args: &WatermarkArgs, output: &std::path::Path) -> Result<bool> {
    let tile = args.renderer()?.render_tile(&args.config()?)?;
    let stats = ink_stats(tile.pixels());
    info!(
        width = tile.width(),
        height = tile.height(),
        lines = tile.layout().lines.len(),
        "tile rendered"
    );
    println!("{stats}");
    save_rgba(output, tile.pixels())?;
    println!("Saved {}", output.display());
    Ok(true)
}

fn cmd_composite(
    input: &std::path::Path,
    args: &WatermarkArgs,
    output: &std::path::Path,
    mime_type: &str,
    quality: Option<f64>,
    max_width: u32,
    limits: LoadLimits,
) -> Result<bool> {
    let events = EventCallbacks::new()
        .on_resize(|w, h| info!(w, h, "canvas resized"))
        .on_error(|e| warn!(error = %e, "canvas error"));
    let options = CanvasOptions::default()
        .with_config(args.config()?)
        .with_display(DisplayPolicy::new(max_width))
        .with_limits(limits);
    let mut canvas = CompositeCanvas::with_renderer(options, args.renderer()?, events)?;

    canvas.load(input)?;
    let blob = canvas.export_blob(mime_type, quality)?;
    std::fs::write(output, &blob.data)
        .with_context(|| format!("failed to write {}", output.display()))?;
    let (w, h) = canvas.display_size();
    println!(
        "Saved {} ({}x{}, {}, {} bytes)",
        output.display(),
        w,
        h,
        blob.mime_type,
        blob.len()
    );
    canvas.destroy();
    Ok(true)
}

fn cmd_compare(
    a: &std::path::Path,
    b: &std::path::Path,
    diff: Option<&std::path::Path>,
    tolerance: u8,
) -> Result<bool> {
    let img_a = load_rgba(a)?;
    let img_b = load_rgba(b)?;
    let result = compare_buffers(&img_a, &img_b)?;
    println!("{result}");
    if let Some(path) = diff {
        save_rgba(path, &generate_diff_image(&img_a, &img_b))?;
        println!("Diff saved to {}", path.display());
    }
    Ok(result.within(tolerance))
}

/// Each angle is rendered twice: the two renders must match byte for byte.
fn cmd_sweep(
    args: &WatermarkArgs,
    from: f64,
    to: f64,
    step: f64,
    out_dir: Option<&std::path::Path>,
) -> Result<bool> {
    anyhow::ensure!(step > 0.0, "step must be positive");
    if let Some(dir) = out_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
    }
    let renderer = args.renderer()?;
    let base = args.config()?;
    let mut ok = true;

    let mut angle = from;
    while angle <= to {
        let config = base.clone().with_rotation(angle);
        let first = renderer.render_tile(&config)?;
        let second = renderer.render_tile(&config)?;
        let repeat = compare_buffers(first.pixels(), second.pixels())?;
        let stats = ink_stats(first.pixels());
        println!(
            "{angle:>6.1}° {}x{} {stats}",
            first.width(),
            first.height()
        );
        if let Some(dir) = out_dir {
            save_rgba(&dir.join(format!("tile_{angle:05.1}.png")), first.pixels())?;
        }
        if !repeat.identical() {
            warn!(angle, "non-deterministic render: {repeat}");
            ok = false;
        }
        angle += step;
    }
    Ok(ok)
}
