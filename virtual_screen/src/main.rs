// Live front end for the impact_vision session loop: webcam in, two HighGUI
// windows out. Press `c` to calibrate and `q` to quit.

mod opencv_io;

use anyhow::{Context, Result};
use clap::Parser;
use impact_vision::SessionConfig;
use impact_vision::session::{SessionLoop, VIDEO_FEED_WINDOW, VIRTUAL_SCREEN_WINDOW};
use opencv_io::{HighGuiSurface, OpenCvCamera};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "virtual_screen", about = "Paint ball impacts onto a virtual screen")]
struct Args {
    /// Capture device index.
    #[arg(long, default_value_t = 0)]
    device: i32,

    /// Read frames from a video file instead of a capture device.
    #[arg(long)]
    video: Option<PathBuf>,

    /// Session configuration (JSON).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the default configuration to this path and exit.
    #[arg(long)]
    write_config: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let args = Args::parse();

    if let Some(path) = &args.write_config {
        SessionConfig::default()
            .to_json_file(path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::info!("default configuration written to {}", path.display());
        return Ok(());
    }

    let config = match &args.config {
        Some(path) => SessionConfig::from_json_file(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => SessionConfig::default(),
    };

    // --- 1. Video I/O Initialization ---
    let camera = match &args.video {
        Some(path) => {
            let path = path.to_str().context("Video path is not valid UTF-8")?;
            OpenCvCamera::open_file(path)
                .with_context(|| format!("Failed to open input video: {}", path))?
        }
        None => OpenCvCamera::open_device(args.device, config.frame_width, config.frame_height)
            .with_context(|| format!("Failed to open capture device {}", args.device))?,
    };
    let surface = HighGuiSurface::open(&[VIRTUAL_SCREEN_WINDOW, VIDEO_FEED_WINDOW])
        .context("Failed to open display windows")?;

    // --- 2. Main Processing Loop ---
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("Failed to start runtime")?;

    let mut session = SessionLoop::new(config, camera, surface)?;
    let summary = runtime.block_on(session.run())?;

    println!(
        "Session complete: {} frames, {} impacts, calibrated: {}",
        summary.frames_processed, summary.impacts_recorded, summary.calibration.calibrated
    );
    Ok(())
}
