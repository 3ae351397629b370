// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands
//!
//! This module provides command-line functionality for:
//! - Taking a filtered, watermarked photo
//! - Recording a filtered clip
//! - Printing or opening the share link

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use woodglass::app::{AppModel, Event, Message};
use woodglass::backends::camera::{SourceSpec, TickOutcome};
use woodglass::constants::render::{DEFAULT_HEIGHT, DEFAULT_WIDTH};
use woodglass::export::{AppSharePayload, DesktopGateway, ExportGateway, ExportOutcome};
use woodglass::pipelines::video::RecordingState;
use woodglass::{Config, Facing};

/// How long to wait for the first frame before giving up
const WARMUP_TIMEOUT: Duration = Duration::from_secs(5);

/// Camera source selection shared by every command
#[derive(Debug, Clone, Default, clap::Args)]
pub struct SourceArgs {
    /// Image standing in for the back camera (default: synthetic test pattern)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Image standing in for the front camera
    #[arg(long, requires = "input")]
    pub front: Option<PathBuf>,

    /// Start with the front camera
    #[arg(long)]
    pub selfie: bool,
}

impl SourceArgs {
    pub fn spec(&self) -> SourceSpec {
        match &self.input {
            Some(back) => SourceSpec::StillImage {
                back: back.clone(),
                front: self.front.clone(),
            },
            None => SourceSpec::TestPattern {
                width: DEFAULT_WIDTH,
                height: DEFAULT_HEIGHT,
            },
        }
    }

    /// Apply command line overrides to the stored config
    pub fn config(&self, output: Option<PathBuf>, intensity: Option<f32>) -> Config {
        let mut config = Config::load();
        if self.selfie {
            config.facing = Facing::Front;
        }
        if output.is_some() {
            config.output_dir = output;
        }
        if let Some(intensity) = intensity {
            config.filter_intensity = intensity.clamp(0.0, 1.0);
            config.filter_enabled = true;
        }
        config
    }
}

/// Render frames until the surface has content
async fn wait_for_first_frame(app: &AppModel) -> Result<(), Box<dyn std::error::Error>> {
    let start = Instant::now();
    while start.elapsed() < WARMUP_TIMEOUT {
        if let TickOutcome::Rendered { .. } = app.frame_loop.render_tick() {
            return Ok(());
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    Err("Timed out waiting for the camera".into())
}

fn print_outcome(outcome: Event) {
    match outcome {
        Event::Exported(ExportOutcome::Downloaded(path)) => println!("Saved: {}", path.display()),
        Event::Exported(ExportOutcome::Shared) => println!("Shared"),
        Event::Exported(ExportOutcome::Cancelled) => println!("Share cancelled"),
        Event::Exported(ExportOutcome::AppShared) => {
            println!("Could not save; opened the share link instead")
        }
        other => println!("{:?}", other),
    }
}

/// Capture one filtered, watermarked still and export it
pub fn take_photo(
    source: SourceArgs,
    intensity: Option<f32>,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = source.config(output, intensity);
    let runtime = tokio::runtime::Runtime::new()?;

    runtime.block_on(async {
        let mut app = AppModel::new(config, &source.spec());
        if let Some(e) = app.camera_error() {
            return Err(e.clone().into());
        }
        println!("Using camera: {}", app.frame_loop.source().lock().name());

        println!("Capturing...");
        wait_for_first_frame(&app).await?;

        let (width, height) = app.context.surface.dimensions();
        println!("Capture size: {}x{}", width, height);

        app.update(Message::CapturePhoto)?;
        print_outcome(app.update(Message::ExportPhoto)?);
        Ok::<(), Box<dyn std::error::Error>>(())
    })
}

/// Record a clip of at most `duration` seconds and export it
pub fn record_video(
    source: SourceArgs,
    duration: u64,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = source.config(output, None);
    let runtime = tokio::runtime::Runtime::new()?;

    runtime.block_on(async {
        let mut app = AppModel::new(config, &source.spec());
        if let Some(e) = app.camera_error() {
            return Err(e.clone().into());
        }
        println!("Using camera: {}", app.frame_loop.source().lock().name());

        app.start();
        wait_for_first_frame(&app).await?;

        let cap = app.recording.settings().max_duration;
        let target = Duration::from_secs(duration).min(cap);
        if target < Duration::from_secs(duration) {
            println!("Duration capped at {} seconds", cap.as_secs());
        }

        // Set up Ctrl+C handler
        let stop_flag = Arc::new(AtomicBool::new(false));
        let stop_flag_clone = stop_flag.clone();
        ctrlc::set_handler(move || {
            stop_flag_clone.store(true, Ordering::SeqCst);
        })?;

        println!();
        println!("Recording... (press Ctrl+C to stop early)");
        app.update(Message::ToggleRecording)?;

        let mut elapsed = app.recording.subscribe_elapsed();
        let start = tokio::time::Instant::now();
        while start.elapsed() < target && app.recording.state() == RecordingState::Recording {
            if stop_flag.load(Ordering::SeqCst) {
                println!();
                println!("Stopping early...");
                break;
            }

            // Redraw only when the label moved; wake up regularly for Ctrl+C
            if let Ok(Ok(())) =
                tokio::time::timeout(Duration::from_millis(100), elapsed.changed()).await
            {
                print!("\rRecording: {}", *elapsed.borrow_and_update());
                std::io::Write::flush(&mut std::io::stdout())?;
            }
        }
        println!();

        app.recording.stop();
        app.recording.wait_until_idle().await;
        app.shutdown();

        if let Some(e) = app.recording.last_error() {
            return Err(e.into());
        }
        print_outcome(app.update(Message::ExportClip)?);
        Ok::<(), Box<dyn std::error::Error>>(())
    })
}

/// Print the app-level share link, optionally opening it
pub fn share_link(open: bool) -> Result<(), Box<dyn std::error::Error>> {
    let payload = AppSharePayload::default();
    let url = payload.intent_url()?;
    println!("{}", url);

    if open {
        let config = Config::load();
        DesktopGateway::new(config.photo_dir(), config.video_dir()).open_app_share(&payload)?;
    }
    Ok(())
}
