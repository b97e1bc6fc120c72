use clap::Parser;
use image::ImageReader;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use cardscan::detection::regions::annotate_regions;
use cardscan::{CardScanner, ScanConfig, ScanError};

#[derive(Parser)]
#[command(name = "cardscan")]
#[command(about = "Rectify a photographed trading card and crop its regions")]
struct Cli {
    /// Path to input image file
    #[arg(value_name = "IMAGE")]
    image_path: PathBuf,

    /// JSON scan configuration (thresholds, canonical size, region table)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory for canonical.png and one PNG per region
    #[arg(short, long, value_name = "DIR", default_value = "regions")]
    out_dir: PathBuf,

    /// Save every pipeline step's images to directory (must be empty)
    #[arg(long, value_name = "DIR")]
    debug_out: Option<PathBuf>,

    /// Write the canonical card with region outlines drawn on it
    #[arg(long, value_name = "FILE")]
    annotate: Option<PathBuf>,

    /// Write the diagnostic edge map
    #[arg(long, value_name = "FILE")]
    edges: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn save(image: &image::DynamicImage, path: &Path) -> anyhow::Result<()> {
    image.save(path)
        .map_err(|e| anyhow::anyhow!("Failed to save {}: {}", path.display(), e))
}

fn run(args: Cli) -> anyhow::Result<()> {
    let config = match &args.config {
        Some(path) => ScanConfig::from_json_file(path)?,
        None => ScanConfig::default(),
    };
    let scanner = CardScanner::new(config)?;

    info!(path = %args.image_path.display(), "Loading image");
    let img = ImageReader::open(&args.image_path)?
        .decode()
        .map_err(|e| anyhow::anyhow!("Failed to decode image: {}", e))?;
    info!(width = img.width(), height = img.height(), "Image loaded");

    if let Some(path) = &args.edges {
        let edges = scanner.edge_map(&img)?;
        edges.save(path)
            .map_err(|e| anyhow::anyhow!("Failed to save {}: {}", path.display(), e))?;
        info!(path = %path.display(), "Edge map written");
    }

    let card = match args.debug_out.clone() {
        Some(debug_dir) => {
            let card = scanner.scan_with_debug(&img, debug_dir.clone())?;
            info!(dir = %debug_dir.display(), "Debug images written");
            card
        }
        None => scanner.scan(&img)?,
    };

    std::fs::create_dir_all(&args.out_dir)?;
    save(&card.canonical, &args.out_dir.join("canonical.png"))?;
    for region in card.iter() {
        let path = args.out_dir.join(format!("{}.png", region.name()));
        save(&region.image, &path)?;
        info!(
            region = region.name(),
            width = region.image.width(),
            height = region.image.height(),
            "Region written"
        );
    }

    if let Some(path) = &args.annotate {
        annotate_regions(&card.canonical, &scanner.config().regions)
            .save(path)
            .map_err(|e| anyhow::anyhow!("Failed to save {}: {}", path.display(), e))?;
    }

    println!("{} regions written to {}", card.len(), args.out_dir.display());
    Ok(())
}

fn main() -> ExitCode {
    let args = Cli::parse();
    init_tracing(args.verbose);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => match err.downcast_ref::<ScanError>() {
            Some(scan_err) if scan_err.is_detection_failure() => {
                warn!(reason = %scan_err, "Detection failed");
                eprintln!("{}", scan_err.user_message());
                ExitCode::from(2)
            }
            _ => {
                error!("{:#}", err);
                ExitCode::FAILURE
            }
        },
    }
}
