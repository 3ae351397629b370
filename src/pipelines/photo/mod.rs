// SPDX-License-Identifier: GPL-3.0-only

//! Still capture pipeline
//!
//! ```text
//! Display surface → Snapshot → Watermark → Encoding → CaptureArtifact
//!       ↓
//! Frame loop keeps rendering
//! ```
//!
//! The controller is a two-state machine: `Idle` until a capture succeeds,
//! then `Captured` holding the artifact until it is discarded or replaced by
//! the next capture.

pub mod encoding;
pub mod font;
pub mod watermark;

pub use encoding::{PngStillEncoder, StillImageEncoder};
pub use watermark::WatermarkLayout;

use chrono::{DateTime, Local};
use image::RgbaImage;
use std::sync::Arc;
use tracing::{info, warn};

use crate::app::state::SharedSurface;
use crate::errors::{AppError, PhotoError};
use crate::storage;

/// An encoded, watermarked still
#[derive(Debug, Clone)]
pub struct CaptureArtifact {
    /// Watermarked pixels, as shown in the preview
    pub pixels: RgbaImage,
    /// Encoded file contents
    pub bytes: Arc<[u8]>,
    pub mime_type: &'static str,
    pub extension: &'static str,
    pub created_at: DateTime<Local>,
}

impl CaptureArtifact {
    /// File name used when the still is downloaded or shared
    pub fn file_name(&self) -> String {
        storage::artifact_file_name(&self.created_at, self.extension)
    }
}

#[derive(Debug, Clone, Default)]
pub enum CaptureState {
    #[default]
    Idle,
    Captured(CaptureArtifact),
}

/// Turns the current display surface into a [`CaptureArtifact`]
pub struct CaptureController {
    encoder: Box<dyn StillImageEncoder>,
    state: CaptureState,
}

impl CaptureController {
    pub fn new() -> Self {
        Self::with_encoder(Box::new(PngStillEncoder))
    }

    pub fn with_encoder(encoder: Box<dyn StillImageEncoder>) -> Self {
        Self {
            encoder,
            state: CaptureState::Idle,
        }
    }

    /// Snapshot, watermark and encode the surface
    ///
    /// Replaces any previous artifact. On failure the controller is left
    /// `Idle` with no artifact.
    pub fn capture(&mut self, surface: &SharedSurface) -> Result<&CaptureArtifact, AppError> {
        self.state = CaptureState::Idle;

        let Some(mut pixels) = surface.snapshot() else {
            warn!("Capture requested before the first frame was rendered");
            return Err(PhotoError::NoFrameAvailable.into());
        };

        watermark::apply(&mut pixels);

        let bytes = self.encoder.encode(&pixels).map_err(|e| {
            warn!(error = %e, "Still encoding failed");
            e
        })?;

        let artifact = CaptureArtifact {
            pixels,
            bytes: Arc::from(bytes),
            mime_type: self.encoder.mime_type(),
            extension: self.encoder.extension(),
            created_at: Local::now(),
        };

        info!(
            width = artifact.pixels.width(),
            height = artifact.pixels.height(),
            size = artifact.bytes.len(),
            "Photo captured"
        );

        self.state = CaptureState::Captured(artifact);
        match &self.state {
            CaptureState::Captured(artifact) => Ok(artifact),
            CaptureState::Idle => Err(PhotoError::NoFrameAvailable.into()),
        }
    }

    /// Drop the current artifact and return to `Idle`
    pub fn discard(&mut self) {
        if matches!(self.state, CaptureState::Captured(_)) {
            info!("Discarding captured photo");
        }
        self.state = CaptureState::Idle;
    }

    pub fn artifact(&self) -> Option<&CaptureArtifact> {
        match &self.state {
            CaptureState::Captured(artifact) => Some(artifact),
            CaptureState::Idle => None,
        }
    }

    pub fn state(&self) -> &CaptureState {
        &self.state
    }
}

impl Default for CaptureController {
    fn default() -> Self {
        Self::new()
    }
}
