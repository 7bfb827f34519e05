//! retrocam: apply analog-camera filters to image files.
//!
//! # Usage
//!
//! ```text
//! retrocam apply photo.jpg --filter digicam
//! retrocam apply photo.png -f dust --dust-texture dust.png -o dusty.png
//! retrocam list
//! ```
//!
//! Logging goes to stderr and follows `RUST_LOG` (default `info`);
//! `-v` turns on per-step debug output.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use image::ImageFormat;
use retrocam_io::{Config, FilterRequest, Service};
use retrocam_pipeline::Filter;

/// Analog-camera photo effects.
#[derive(Parser)]
#[command(name = "retrocam", version)]
struct Cli {
    /// JSON configuration file (font, dust texture, stamp format, seed,
    /// extra presets).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log every pipeline step.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Apply a filter or preset to an image file.
    Apply(ApplyArgs),
    /// List the available filters and presets.
    List,
}

#[derive(Args)]
struct ApplyArgs {
    /// Input image (PNG, JPEG, BMP, WebP, GIF, TIFF).
    input: PathBuf,

    /// Filter or preset name (see `retrocam list`).
    #[arg(short, long)]
    filter: String,

    /// Output path. Defaults to `<input>-<filter>.<ext>` next to the input.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Random seed for reproducible grain, leaks, glitches and flares.
    #[arg(long)]
    seed: Option<u64>,

    /// Date-stamp font (TTF/OTF).
    #[arg(long)]
    font: Option<PathBuf>,

    /// Texture for the `dust` filter.
    #[arg(long)]
    dust_texture: Option<PathBuf>,
}

impl ApplyArgs {
    /// Command-line flags win over the configuration file.
    fn override_config(&self, config: &mut Config) {
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(font) = &self.font {
            config.font_path = Some(font.clone());
        }
        if let Some(texture) = &self.dust_texture {
            config.dust_texture_path = Some(texture.clone());
        }
    }
}

fn init_logging(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();
}

fn load_config(path: Option<&Path>) -> Result<Config, Box<dyn Error>> {
    match path {
        Some(path) => {
            let config = Config::load(path)?;
            log::info!("loaded config from {}", path.display());
            Ok(config)
        }
        None => Ok(Config::default()),
    }
}

/// `photo.jpg` + `sepia` + PNG => `photo-sepia.png`, beside the input.
fn default_output(input: &Path, filter: &str, format: ImageFormat) -> PathBuf {
    let stem = input
        .file_stem()
        .map_or_else(|| "output".into(), |s| s.to_string_lossy());
    let extension = format.extensions_str().first().copied().unwrap_or("jpg");
    input.with_file_name(format!("{stem}-{filter}.{extension}"))
}

fn apply(args: &ApplyArgs, mut config: Config) -> Result<(), Box<dyn Error>> {
    args.override_config(&mut config);
    let service = Service::from_config(&config);

    let bytes = std::fs::read(&args.input)
        .map_err(|e| format!("failed to read {}: {e}", args.input.display()))?;
    log::info!(
        "applying {} to {} ({} bytes)",
        args.filter,
        args.input.display(),
        bytes.len()
    );

    let result = service.process(&FilterRequest::new(bytes, args.filter.clone()))?;

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output(&args.input, &args.filter, result.format()));
    std::fs::write(&output, result.bytes())
        .map_err(|e| format!("failed to write {}: {e}", output.display()))?;
    log::info!("wrote {} ({})", output.display(), result.content_type());
    Ok(())
}

fn list(config: &Config) {
    let registry = config.registry();
    for name in registry.names() {
        let kind = match registry.resolve(name) {
            Ok(Filter::Preset(preset)) => format!("preset, {} steps", preset.steps().len()),
            Ok(Filter::Single(transform)) => transform.name().to_owned(),
            Err(_) => continue,
        };
        println!("{name:<24}{kind}");
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn Error>> {
    let config = load_config(cli.config.as_deref())?;
    match &cli.command {
        Command::Apply(args) => apply(args, config),
        Command::List => {
            list(&config);
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
