//! # Shutterglyph CLI
//!
//! Command-line interface for the metadata service and pattern rendering.
//!
//! ## Usage
//!
//! ```bash
//! # Run the metadata service
//! shutterglyph serve --listen 127.0.0.1:3001
//!
//! # Render a photo's pattern to PNG
//! shutterglyph render IMG_20230615_143000.jpg --out pattern.png
//!
//! # Force a pattern and seed
//! shutterglyph render photo.jpg --pattern contour --seed 7
//!
//! # Show extracted metadata and mapped parameters
//! shutterglyph inspect photo.jpg
//! ```

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use shutterglyph::{
    CanvasConfig, GlyphError,
    metadata::{Extractor, UploadedImage, service::DEFAULT_SERVICE_URL},
    params::{PatternKind, map_metadata},
    render::{Renderer, animate, export},
    server::{self, DEFAULT_LISTEN_ADDR, ServerConfig},
    session::Session,
};

/// Shutterglyph - generative patterns from photo metadata
#[derive(Parser, Debug)]
#[command(name = "shutterglyph")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP metadata service
    Serve {
        /// Address to listen on
        #[arg(long, default_value = DEFAULT_LISTEN_ADDR)]
        listen: String,

        /// Directory for temporary uploads (defaults to a temp subdirectory)
        #[arg(long, value_name = "DIR")]
        upload_dir: Option<PathBuf>,

        /// exiftool binary
        #[arg(long, default_value = "exiftool")]
        exiftool: String,
    },

    /// Render a photo's pattern to PNG
    Render {
        /// Photo to read metadata from
        photo: PathBuf,

        /// Output PNG (defaults to a timestamped name in the current directory)
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,

        /// Frames to animate before export
        #[arg(long, default_value = "60")]
        frames: u32,

        /// Override the mapped pattern (wave, bump, contour, flow, mosaic)
        #[arg(long)]
        pattern: Option<String>,

        /// Seed for every random draw
        #[arg(long)]
        seed: Option<u64>,

        /// Canvas width in pixels
        #[arg(long)]
        width: Option<u32>,

        /// Canvas height in pixels
        #[arg(long)]
        height: Option<u32>,

        /// Metadata service URL
        #[arg(long, default_value = DEFAULT_SERVICE_URL)]
        service_url: String,

        /// Skip the metadata service
        #[arg(long)]
        offline: bool,
    },

    /// Print extracted metadata and mapped parameters as JSON
    Inspect {
        /// Photo to inspect
        photo: PathBuf,

        /// Metadata service URL (omit to stay offline)
        #[arg(long)]
        service_url: Option<String>,

        /// Seed for every random draw
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), GlyphError> {
    let cli = Cli::parse();
    let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;

    match cli.command {
        Commands::Serve {
            listen,
            upload_dir,
            exiftool,
        } => {
            let defaults = ServerConfig::default();
            let config = ServerConfig {
                listen_addr: listen,
                upload_dir: upload_dir.unwrap_or(defaults.upload_dir),
                exiftool_path: exiftool,
            };
            runtime.block_on(server::serve(config))
        }

        Commands::Render {
            photo,
            out,
            frames,
            pattern,
            seed,
            width,
            height,
            service_url,
            offline,
        } => {
            let pattern = pattern.as_deref().map(parse_pattern).transpose()?;
            let size = width.zip(height);
            let service = (!offline).then_some(service_url);
            runtime.block_on(render_photo(&photo, out, frames, pattern, seed, size, service))
        }

        Commands::Inspect {
            photo,
            service_url,
            seed,
        } => runtime.block_on(inspect_photo(&photo, service_url, seed)),
    }
}

fn parse_pattern(name: &str) -> Result<PatternKind, GlyphError> {
    PatternKind::by_name(name).ok_or_else(|| {
        let known: Vec<&str> = PatternKind::ALL.iter().map(|k| k.name()).collect();
        GlyphError::Render(format!(
            "unknown pattern '{}' (expected one of: {})",
            name,
            known.join(", ")
        ))
    })
}

fn load_photo(photo: &Path) -> Result<UploadedImage, GlyphError> {
    let file_name = photo
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| GlyphError::InvalidFile(format!("{} has no file name", photo.display())))?
        .to_string();
    let bytes = std::fs::read(photo)?;
    UploadedImage::decode(file_name, bytes)
}

async fn render_photo(
    photo: &Path,
    out: Option<PathBuf>,
    frames: u32,
    pattern: Option<PatternKind>,
    seed: Option<u64>,
    size: Option<(u32, u32)>,
    service_url: Option<String>,
) -> Result<(), GlyphError> {
    let upload = load_photo(photo)?;
    let mut session = Session::new(seed.unwrap_or_else(rand::random));
    let ticket = session.begin_upload(upload.file_name.clone());
    let mut extraction_rng = session.extraction_rng();

    let config = CanvasConfig::STUDIO;
    let mut renderer = Renderer::new(config, &session.store().snapshot(), size);

    let extractor = Extractor::standard(service_url.as_deref());
    let extraction = extractor.extract(&upload, &mut extraction_rng);
    let report = animate(&mut renderer, &mut session, ticket, extraction, 1).await;

    if let Some(pattern) = pattern {
        session.store_mut().set_pattern(pattern);
    }
    let params = session.store().snapshot();
    for _ in 0..frames {
        renderer.frame(&params);
    }

    let out = out.unwrap_or_else(|| {
        PathBuf::from(export::export_file_name(chrono::Local::now().naive_local()))
    });
    export::save_png(renderer.surface().image(), config.export_scale, &out)?;

    println!(
        "{} -> {} ({} pattern, {} frames, {} while extracting, {} fallback)",
        photo.display(),
        out.display(),
        params.pattern.name(),
        renderer.frames(),
        report.frames_before_metadata,
        renderer.failures()
    );
    Ok(())
}

async fn inspect_photo(
    photo: &Path,
    service_url: Option<String>,
    seed: Option<u64>,
) -> Result<(), GlyphError> {
    use rand::SeedableRng;

    let upload = load_photo(photo)?;
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed.unwrap_or_else(rand::random));
    let extractor = Extractor::standard(service_url.as_deref());
    let metadata = extractor.extract(&upload, &mut rng).await;
    let params = map_metadata(&metadata, &mut rng);

    let report = serde_json::json!({
        "file": upload.file_name,
        "stages": extractor.stage_names(),
        "metadata": metadata,
        "parameters": params,
    });
    let text = serde_json::to_string_pretty(&report)
        .map_err(|e| GlyphError::Extraction(format!("failed to format report: {}", e)))?;
    println!("{}", text);
    Ok(())
}
