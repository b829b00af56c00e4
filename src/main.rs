// src/main.rs

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use jetbot_steering::{
    classification::ClassifierSet,
    compute_heading_from_points,
    config::Config,
    inference::load_classifiers,
    overlay,
    video_processor::{VideoProcessor, VideoReader},
    LanePipeline, Point2D,
};
use opencv::{prelude::*, videoio::VideoWriter};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "jetbot-steering")]
#[command(about = "Heading resolution and lane overlay for a camera-driven robot")]
#[command(version)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(long, global = true, default_value = "config.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the lane pipeline over a camera or a directory of videos.
    Lanes(LanesArgs),

    /// Compute heading and steering angle from pose landmarks.
    Heading {
        /// Pose landmarks as "x,y", in tracker order (at least five).
        #[arg(long = "pose", required = true, num_args = 1.., allow_hyphen_values = true)]
        pose: Vec<Point2D>,

        /// Target point as "x,y".
        #[arg(long, allow_hyphen_values = true)]
        target: Point2D,
    },
}

#[derive(Debug, Clone, Args)]
struct LanesArgs {
    /// Read from this camera index instead of the configured video directory.
    #[arg(long)]
    camera: Option<i32>,

    /// Directory of input videos (overrides the configuration).
    #[arg(long)]
    input: Option<PathBuf>,

    /// Stop each source after this many frames.
    #[arg(long)]
    max_frames: Option<u64>,
}

#[derive(Debug, Default)]
struct SourceStats {
    frames: u64,
    frames_with_lanes: u64,
    segments: u64,
}

fn load_config(path: &Path) -> Config {
    match Config::load(path) {
        Ok(config) => {
            info!("✓ Configuration loaded from {}", path.display());
            config
        }
        Err(e) => {
            warn!("Using default configuration ({})", e);
            Config::default()
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logging comes up before the config is known; RUST_LOG wins if set.
    let config = {
        let _guard = tracing::subscriber::set_default(
            tracing_subscriber::fmt().with_env_filter("info").finish(),
        );
        load_config(&cli.config)
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Heading { pose, target } => {
            let result = compute_heading_from_points(&pose, target)?;
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
        Commands::Lanes(args) => run_lanes(config, &args),
    }
}

fn run_lanes(mut config: Config, args: &LanesArgs) -> Result<()> {
    if let Some(input) = &args.input {
        config.video.input_dir = input.to_string_lossy().into_owned();
    }

    info!("🚗 Lane pipeline starting");
    let pipeline = LanePipeline::new(config.lane.clone());
    let processor = VideoProcessor::new(config.video.clone());
    let mut classifiers = load_classifiers(&config.classifier)?;

    if let Some(index) = args.camera {
        let mut reader = processor.open_camera(index)?;
        let label = PathBuf::from(format!("camera{}", index));
        let mut writer = processor.create_writer(&label, reader.width, reader.height, reader.fps)?;
        let stats = process_source(
            &mut reader,
            writer.as_mut(),
            &pipeline,
            classifiers.as_mut(),
            args.max_frames,
        )?;
        log_stats(&format!("camera {}", index), &stats);
        return Ok(());
    }

    let videos = processor.find_video_files()?;
    if videos.is_empty() {
        warn!("No video files found in {}", config.video.input_dir);
        return Ok(());
    }

    for (idx, path) in videos.iter().enumerate() {
        info!("Processing video {}/{}: {}", idx + 1, videos.len(), path.display());

        let mut reader = processor.open_video(path)?;
        let mut writer = processor.create_writer(path, reader.width, reader.height, reader.fps)?;
        let stats = process_source(
            &mut reader,
            writer.as_mut(),
            &pipeline,
            classifiers.as_mut(),
            args.max_frames,
        )
        .with_context(|| format!("processing {}", path.display()))?;
        log_stats(&path.display().to_string(), &stats);
    }

    Ok(())
}

fn process_source(
    reader: &mut VideoReader,
    mut writer: Option<&mut VideoWriter>,
    pipeline: &LanePipeline,
    mut classifiers: Option<&mut ClassifierSet>,
    max_frames: Option<u64>,
) -> Result<SourceStats> {
    let mut stats = SourceStats::default();

    while let Some(frame) = reader.read_frame()? {
        let detection = pipeline.detect(&frame)?;
        let mut output = detection.composite;

        if let Some(set) = classifiers.as_deref_mut() {
            let assessment = set.assess_frame(&frame)?;
            debug!("Frame {}: {}", reader.frames_read, assessment);
            overlay::annotate(&mut output, &assessment)?;
        }

        stats.frames += 1;
        stats.segments += detection.segments.len() as u64;
        if !detection.segments.is_empty() {
            stats.frames_with_lanes += 1;
        }

        if let Some(w) = writer.as_deref_mut() {
            w.write(&output)?;
        }

        if max_frames.is_some_and(|max| stats.frames >= max) {
            break;
        }
    }

    Ok(stats)
}

fn log_stats(source: &str, stats: &SourceStats) {
    info!("✓ Finished {}", source);
    info!("  Frames: {}", stats.frames);
    info!(
        "  Frames with lane segments: {} ({:.1}%)",
        stats.frames_with_lanes,
        100.0 * stats.frames_with_lanes as f64 / stats.frames.max(1) as f64
    );
    info!("  Total segments: {}", stats.segments);
}
