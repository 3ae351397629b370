// SPDX-License-Identifier: GPL-3.0-only

//! Render loop lifecycle
//!
//! [`FrameLoop`] pulls the latest frame from the active camera source once per
//! display refresh, runs the color transform over it and writes the result
//! into the shared display surface. The loop is a single tokio task; stopping
//! aborts that task, so no tick starts after `stop()` returns. Resizing and the
//! transform are CPU-bound and run on the blocking pool.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use image::imageops::{self, FilterType};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, trace, warn};

use super::{Facing, SharedSource};
use crate::app::state::PipelineContext;
use crate::constants::render::{DEFAULT_HEIGHT, DEFAULT_REFRESH_RATE, DEFAULT_WIDTH};
use crate::pipelines::filter;

/// Result of a single tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The surface was updated with a new frame
    Rendered {
        /// Whether the color transform ran
        filtered: bool,
    },
    /// The source had no frame yet; the surface was left alone
    Skipped,
}

/// Everything a tick needs, cloned into the loop task
#[derive(Clone)]
struct TickRenderer {
    context: PipelineContext,
    source: SharedSource,
    mirror_front: bool,
    frames: Arc<AtomicU64>,
}

impl TickRenderer {
    fn render(&self) -> TickOutcome {
        // Hold the source lock only while pulling the frame
        let (dims, frame, facing) = {
            let mut source = self.source.lock();
            let dims = source
                .dimensions()
                .unwrap_or((DEFAULT_WIDTH, DEFAULT_HEIGHT));
            (dims, source.current_frame(), source.facing())
        };

        let Some(frame) = frame else {
            trace!("Source not ready, skipping tick");
            return TickOutcome::Skipped;
        };

        let config = self.context.filter.get();
        let (width, height) = dims;

        let mut image = frame.to_image();
        if image.dimensions() != (width, height) {
            image = imageops::resize(&image, width, height, FilterType::Triangle);
        }
        if self.mirror_front && facing == Facing::Front {
            imageops::flip_horizontal_in_place(&mut image);
        }

        let filtered = config.is_active();
        if filtered {
            filter::transform(&mut image, config.intensity);
        }

        self.context.surface.with_mut(|surface| *surface = image);
        self.frames.fetch_add(1, Ordering::Relaxed);

        TickOutcome::Rendered { filtered }
    }
}

/// Drives the camera-to-surface render loop at the display refresh rate
pub struct FrameLoop {
    renderer: TickRenderer,
    refresh_rate: u32,
    task: Option<JoinHandle<()>>,
}

impl FrameLoop {
    pub fn new(context: PipelineContext, source: SharedSource) -> Self {
        Self {
            renderer: TickRenderer {
                context,
                source,
                mirror_front: true,
                frames: Arc::new(AtomicU64::new(0)),
            },
            refresh_rate: DEFAULT_REFRESH_RATE,
            task: None,
        }
    }

    /// Ticks per second; zero is treated as one
    pub fn with_refresh_rate(mut self, refresh_rate: u32) -> Self {
        self.refresh_rate = refresh_rate.max(1);
        self
    }

    /// Mirror the user-facing camera like a mirror would
    pub fn with_mirror_front(mut self, mirror: bool) -> Self {
        self.renderer.mirror_front = mirror;
        self
    }

    pub fn source(&self) -> &SharedSource {
        &self.renderer.source
    }

    /// Number of frames rendered since construction
    pub fn frames_rendered(&self) -> u64 {
        self.renderer.frames.load(Ordering::Relaxed)
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Start ticking; a second call while running does nothing
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self) {
        if self.is_running() {
            debug!("Frame loop already running");
            return;
        }

        let renderer = self.renderer.clone();
        let period = Duration::from_secs_f64(1.0 / self.refresh_rate as f64);
        info!(refresh_rate = self.refresh_rate, "Starting frame loop");

        self.task = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                let tick = renderer.clone();
                if let Err(e) = tokio::task::spawn_blocking(move || tick.render()).await {
                    warn!(error = %e, "Render tick failed");
                }
            }
        }));
    }

    /// Cancel the loop task; safe to call when not running
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            info!(frames = self.frames_rendered(), "Frame loop stopped");
        }
    }

    /// Run one tick synchronously
    pub fn render_tick(&self) -> TickOutcome {
        self.renderer.render()
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        self.stop();
    }
}
