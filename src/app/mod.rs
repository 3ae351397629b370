// SPDX-License-Identifier: GPL-3.0-only

//! Application model shared by the command line and terminal hosts
//!
//! # Architecture
//!
//! - `state`: Process-scoped pipeline state (filter settings, display surface)
//! - [`AppModel`]: Owns the frame loop and the capture/recording controllers
//!   and routes host input ([`Message`]) to them
//!
//! Hosts translate key presses or CLI flags into messages and render the
//! display surface; everything else happens here.

pub mod state;

pub use state::{FilterConfig, FilterHandle, PipelineContext, SharedSurface};

use tracing::{info, warn};

use crate::backends::camera::{
    self, CameraSource, Facing, FrameLoop, SharedSource, SourceSpec, UnavailableSource,
};
use crate::config::Config;
use crate::errors::{AppError, AppResult, CameraError, PhotoError};
use crate::export::{self, DesktopGateway, ExportArtifact, ExportGateway, ExportOutcome};
use crate::pipelines::photo::CaptureController;
use crate::pipelines::video::{RecordingController, RecordingState};

/// Intensity change per key press
pub const INTENSITY_STEP: f32 = 0.05;

/// Host input
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Message {
    /// Capture the current surface as a still
    CapturePhoto,
    /// Drop the captured still
    DiscardPhoto,
    /// Export the captured still
    ExportPhoto,
    /// Start recording, or stop if already recording
    ToggleRecording,
    /// Export the last recorded clip
    ExportClip,
    /// Switch between front and back camera
    SwitchCamera,
    /// Flip the filter master switch
    ToggleFilter,
    /// Acquire the camera again after it was unavailable
    RetryCamera,
    /// Change the filter intensity by a signed amount
    AdjustIntensity(f32),
}

/// What a handled message produced, for the host's status line
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    PhotoCaptured { file_name: String },
    PhotoDiscarded,
    RecordingStarted,
    RecordingStopping,
    Exported(ExportOutcome),
    CameraSwitched(Facing),
    CameraAcquired,
    FilterChanged { enabled: bool, intensity: f32 },
}

pub struct AppModel {
    pub config: Config,
    pub context: PipelineContext,
    pub frame_loop: FrameLoop,
    pub capture: CaptureController,
    pub recording: RecordingController,
    gateway: Box<dyn ExportGateway + Send>,
    source_spec: Option<SourceSpec>,
    camera_error: Option<CameraError>,
}

impl AppModel {
    /// Acquire the camera described by `source_spec` and wire up the pipeline
    ///
    /// An unavailable camera does not fail construction: the model starts
    /// without frames, reports the error through [`Self::camera_error`] and
    /// can be retried with [`Message::RetryCamera`].
    pub fn new(config: Config, source_spec: &SourceSpec) -> Self {
        let (source, camera_error): (Box<dyn CameraSource>, _) =
            match camera::acquire(source_spec, config.facing) {
                Ok(source) => (source, None),
                Err(e) => {
                    warn!(error = %e, "Camera unavailable, waiting for retry");
                    (Box::new(UnavailableSource::new(config.facing)), Some(e))
                }
            };
        let gateway = DesktopGateway::new(config.photo_dir(), config.video_dir());

        let mut model = Self::with_parts(config, source, Box::new(gateway));
        model.source_spec = Some(source_spec.clone());
        model.camera_error = camera_error;
        model
    }

    pub fn with_parts(
        config: Config,
        source: Box<dyn CameraSource>,
        gateway: Box<dyn ExportGateway + Send>,
    ) -> Self {
        let context = PipelineContext::new(config.filter());
        let frame_loop = FrameLoop::new(context.clone(), SharedSource::new(source))
            .with_refresh_rate(config.refresh_rate)
            .with_mirror_front(config.mirror_preview);
        let recording =
            RecordingController::new(context.surface.clone(), config.recorder_settings());

        Self {
            config,
            context,
            frame_loop,
            capture: CaptureController::new(),
            recording,
            gateway,
            source_spec: None,
            camera_error: None,
        }
    }

    /// Why the camera could not be acquired, until a retry succeeds
    pub fn camera_error(&self) -> Option<&CameraError> {
        self.camera_error.as_ref()
    }

    /// Start rendering; requires a tokio runtime
    pub fn start(&mut self) {
        self.frame_loop.start();
    }

    /// Stop rendering and any recording in progress
    pub fn shutdown(&mut self) {
        self.recording.stop();
        self.frame_loop.stop();
        info!("Pipeline shut down");
    }

    pub fn update(&mut self, message: Message) -> AppResult<Event> {
        match message {
            Message::CapturePhoto => {
                let artifact = self.capture.capture(&self.context.surface)?;
                Ok(Event::PhotoCaptured {
                    file_name: artifact.file_name(),
                })
            }
            Message::DiscardPhoto => {
                self.capture.discard();
                Ok(Event::PhotoDiscarded)
            }
            Message::ExportPhoto => {
                let artifact = self
                    .capture
                    .artifact()
                    .map(ExportArtifact::from)
                    .ok_or(PhotoError::NoFrameAvailable)?;
                let outcome = export::export_artifact(self.gateway.as_ref(), &artifact)?;
                Ok(Event::Exported(outcome))
            }
            Message::ToggleRecording => match self.recording.state() {
                RecordingState::Idle => {
                    self.recording.start()?;
                    Ok(Event::RecordingStarted)
                }
                RecordingState::Recording | RecordingState::Finalizing => {
                    self.recording.stop();
                    Ok(Event::RecordingStopping)
                }
            },
            Message::ExportClip => {
                let artifact = self
                    .recording
                    .artifact()
                    .ok_or_else(|| AppError::Other("No finished recording".to_string()))?;
                let outcome =
                    export::export_artifact(self.gateway.as_ref(), &ExportArtifact::from(&artifact))?;
                Ok(Event::Exported(outcome))
            }
            Message::SwitchCamera => {
                let facing = self.frame_loop.source().flip().map_err(|e| {
                    warn!(error = %e, "Camera switch failed");
                    e
                })?;
                self.config.facing = facing;
                Ok(Event::CameraSwitched(facing))
            }
            Message::ToggleFilter => {
                let enabled = self.context.filter.toggle();
                self.config.filter_enabled = enabled;
                Ok(self.filter_event())
            }
            Message::AdjustIntensity(delta) => {
                let intensity = self.context.filter.nudge_intensity(delta);
                self.config.filter_intensity = intensity;
                Ok(self.filter_event())
            }
            Message::RetryCamera => self.retry_camera(),
        }
    }

    fn retry_camera(&mut self) -> AppResult<Event> {
        let Some(spec) = self.source_spec.as_ref() else {
            return Err(AppError::Other("No camera to acquire".to_string()));
        };

        match camera::acquire(spec, self.config.facing) {
            Ok(source) => {
                self.frame_loop.source().replace(source);
                self.camera_error = None;
                info!("Camera acquired");
                Ok(Event::CameraAcquired)
            }
            Err(e) => {
                warn!(error = %e, "Camera still unavailable");
                self.camera_error = Some(e.clone());
                Err(e.into())
            }
        }
    }

    fn filter_event(&self) -> Event {
        let filter = self.context.filter.get();
        Event::FilterChanged {
            enabled: filter.enabled,
            intensity: filter.intensity,
        }
    }

    /// One-line summary for hosts
    pub fn status_line(&self) -> String {
        let filter = self.context.filter.get();
        let filter_text = if filter.enabled {
            format!("filter {:.0}%", filter.intensity * 100.0)
        } else {
            "filter off".to_string()
        };
        let recording = match self.recording.state() {
            RecordingState::Idle => String::new(),
            RecordingState::Recording => format!(" | REC {}", self.recording.elapsed_label()),
            RecordingState::Finalizing => " | saving clip".to_string(),
        };
        let facing = self.frame_loop.source().lock().facing();

        format!("{} camera | {}{}", facing, filter_text, recording)
    }
}
