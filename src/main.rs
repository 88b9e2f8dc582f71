//! Gait metric application for recorded sessions and live capture.

use anyhow::Result;
use clap::Parser;
use gait_metrics::{
    app::{AppConfig, GaitApp, InputSource},
    config::Config,
    report::ViewMode,
};
use log::info;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Recorded landmark session to replay (JSON lines)
    #[arg(short, long, conflicts_with_all = ["video", "image"])]
    replay: Option<PathBuf>,

    /// Video file to process
    #[arg(short, long, conflicts_with = "image")]
    video: Option<PathBuf>,

    /// Still image to process once
    #[arg(short, long)]
    image: Option<PathBuf>,

    /// Camera index to use
    #[arg(long, default_value = "0")]
    cam: i32,

    /// Camera viewpoint (front, side)
    #[arg(long, value_parser = parse_view)]
    view: Option<ViewMode>,

    /// Hip visibility required for pelvic drop and step width
    #[arg(long)]
    visibility_floor: Option<f64>,

    /// Compute pelvic drop and step width regardless of hip visibility
    #[arg(long, conflicts_with = "visibility_floor")]
    no_visibility_gate: bool,

    /// Processed frames between logged snapshots
    #[arg(long)]
    report_every: Option<u64>,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,

    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long)]
    config: Option<PathBuf>,
}

fn parse_view(s: &str) -> std::result::Result<ViewMode, String> {
    s.parse().map_err(|e: gait_metrics::Error| e.to_string())
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logger
    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    info!("Gait Metrics");

    // Load configuration if provided
    let mut config = if let Some(config_path) = &args.config {
        info!("Loading configuration from: {}", config_path.display());
        match Config::from_file(config_path) {
            Ok(cfg) => cfg,
            Err(e) => {
                log::warn!("Failed to load config file: {}. Using defaults.", e);
                Config::default()
            }
        }
    } else {
        Config::default()
    };

    // Command line overrides
    if let Some(view) = args.view {
        config.display.view = view;
    }
    if let Some(floor) = args.visibility_floor {
        config.engine.visibility_floor = Some(floor);
    }
    if args.no_visibility_gate {
        config.engine.visibility_floor = None;
    }
    if let Some(every) = args.report_every {
        config.display.report_every = every;
    }

    let input = if let Some(path) = args.replay {
        InputSource::Replay(path)
    } else if let Some(path) = args.video {
        InputSource::Video(path)
    } else if let Some(path) = args.image {
        InputSource::Image(path)
    } else {
        InputSource::Camera(args.cam)
    };

    // Create and run application
    let mut app = GaitApp::new(AppConfig { input, config })?;
    let report = app.run()?;
    println!("{report}");

    Ok(())
}
