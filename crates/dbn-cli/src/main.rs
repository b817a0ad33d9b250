//! `dbn`: run a drawing program and write the result as PNG, optionally GIF.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, ImageFormat, RgbaImage};
use log::{debug, info};

use dbn_lang::{Builtins, Canvas, DirOpener, Frame, Settings, evaluate};

#[derive(Parser, Debug)]
#[command(version, about = "Run a DBN drawing program")]
struct Cli {
    /// Program to run
    #[arg(short, long)]
    input: PathBuf,

    /// Where to write the final canvas
    #[arg(short, long, default_value = "dbn.png")]
    png: PathBuf,

    /// Also record every drawing step into an animated GIF
    #[arg(short, long)]
    gif: Option<PathBuf>,

    /// Output scale factor
    #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    scale: u32,

    /// Keep at most this many GIF frames (0 = all)
    #[arg(long, default_value_t = 0)]
    max_frames: usize,

    /// Skip the built-in letter and shape library
    #[arg(long)]
    no_builtins: bool,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn settings(&self) -> Settings {
        // `Load` paths resolve next to the program.
        let base = self.input.parent().map(Path::to_path_buf).unwrap_or_default();
        let mut settings = Settings::default()
            .with_scale(self.scale as usize)
            .with_opener(DirOpener::new(base));
        if self.gif.is_some() {
            settings = settings.with_frames(self.max_frames);
        }
        if self.no_builtins {
            settings = settings.with_builtins(Builtins::none());
        }
        settings
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// `Ok(false)` when the program reported errors; nothing is written then.
fn run(cli: &Cli) -> Result<bool> {
    let file = File::open(&cli.input)
        .with_context(|| format!("cannot open {}", cli.input.display()))?;
    let name = cli.input.display().to_string();
    let outcome = evaluate(BufReader::new(file), &name, &cli.settings());

    if !outcome.is_clean() {
        for error in &outcome.errors {
            eprintln!("{error}");
        }
        return Ok(false);
    }

    write_png(&outcome.canvas, &cli.png)?;
    info!("wrote {}", cli.png.display());

    if let Some(path) = &cli.gif {
        write_gif(&outcome.frames, path)?;
        info!("wrote {} ({} frames)", path.display(), outcome.frames.len());
    }
    Ok(true)
}

fn to_image(canvas: &Canvas) -> Result<RgbaImage> {
    RgbaImage::from_raw(canvas.width() as u32, canvas.height() as u32, canvas.to_rgba_bytes())
        .context("canvas buffer does not match its size")
}

fn write_png(canvas: &Canvas, path: &Path) -> Result<()> {
    to_image(canvas)?
        .save_with_format(path, ImageFormat::Png)
        .with_context(|| format!("cannot write {}", path.display()))
}

fn write_gif(frames: &[Frame], path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("cannot create {}", path.display()))?;
    let mut encoder = GifEncoder::new(BufWriter::new(file));
    encoder.set_repeat(Repeat::Infinite)?;
    for (i, frame) in frames.iter().enumerate() {
        let buffer = to_image(&frame.to_canvas())?;
        // Frame delays are in hundredths of a second.
        let delay = Delay::from_numer_denom_ms(u32::from(frame.delay) * 10, 1);
        encoder
            .encode_frame(image::Frame::from_parts(buffer, 0, 0, delay))
            .with_context(|| format!("cannot encode frame {i}"))?;
        debug!("encoded frame {i}");
    }
    Ok(())
}
