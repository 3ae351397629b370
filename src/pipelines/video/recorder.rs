// SPDX-License-Identifier: GPL-3.0-only

//! Time-boxed recording of the display surface
//!
//! A session moves `Idle → Recording → Finalizing → Idle`. While recording,
//! three tasks run:
//! - a sampler that snapshots the surface at the sample rate and feeds the
//!   encoding stream, finalizing it once told to stop
//! - a UI ticker that publishes the elapsed label and stops the session once
//!   the maximum duration is reached
//! - a deferred auto-stop firing at the maximum duration
//!
//! While `Recording`, the auto-stop is always armed. It is aborted only once
//! the stream has been finalized; if it fired itself, finalizing is bounded
//! by the encoder alone.
//!
//! Encoding is CPU-bound, so frames and the final flush are handed to the
//! blocking pool and never stall the timers.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Local};
use tokio::runtime::Handle;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::encoder_selection::{DeviceClass, FormatCandidate, negotiate};
use super::stream::{EncodingBackend, EncodingStream, ImageSequenceBackend, StreamSettings};
use crate::app::state::SharedSurface;
use crate::constants::recording::{MAX_DURATION, SAMPLE_FPS, UI_TICK_MS};
use crate::constants::{BitratePreset, format_elapsed};
use crate::errors::RecordingError;
use crate::storage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordingState {
    #[default]
    Idle,
    Recording,
    Finalizing,
}

/// Recorder tuning
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecorderSettings {
    pub device_class: DeviceClass,
    pub preset: BitratePreset,
    /// Surface sample rate
    pub fps: u32,
    /// Session length cap, never above [`MAX_DURATION`]
    pub max_duration: Duration,
    /// Elapsed label refresh period
    pub ui_tick: Duration,
}

impl RecorderSettings {
    /// Clamp values into their valid ranges
    pub fn sanitized(mut self) -> Self {
        if self.max_duration.is_zero() || self.max_duration > MAX_DURATION {
            warn!(
                requested_ms = self.max_duration.as_millis() as u64,
                "Recording cap out of range, using the maximum"
            );
            self.max_duration = MAX_DURATION;
        }
        self.fps = self.fps.max(1);
        if self.ui_tick.is_zero() {
            self.ui_tick = Duration::from_millis(UI_TICK_MS);
        }
        self
    }
}

impl Default for RecorderSettings {
    fn default() -> Self {
        Self {
            device_class: DeviceClass::default(),
            preset: BitratePreset::default(),
            fps: SAMPLE_FPS,
            max_duration: MAX_DURATION,
            ui_tick: Duration::from_millis(UI_TICK_MS),
        }
    }
}

/// A finished clip
#[derive(Debug, Clone)]
pub struct RecordedArtifact {
    /// All chunks of the session, concatenated in order
    pub bytes: Arc<[u8]>,
    pub mime_type: &'static str,
    pub extension: &'static str,
    pub created_at: DateTime<Local>,
    pub duration: Duration,
}

impl RecordedArtifact {
    pub fn file_name(&self) -> String {
        storage::artifact_file_name(&self.created_at, self.extension)
    }
}

struct Session {
    id: Uuid,
    format: FormatCandidate,
    started_at: Instant,
    stopped_at: Option<Instant>,
    max_duration: Duration,
    chunks: Vec<Vec<u8>>,
}

impl Session {
    fn elapsed(&self) -> Duration {
        let end = self.stopped_at.unwrap_or_else(Instant::now);
        end.saturating_duration_since(self.started_at)
    }
}

#[derive(Default)]
struct Inner {
    state: RecordingState,
    session: Option<Session>,
    artifact: Option<RecordedArtifact>,
    ui_timer: Option<JoinHandle<()>>,
    auto_stop: Option<JoinHandle<()>>,
    stop_sender: Option<oneshot::Sender<()>>,
    last_error: Option<RecordingError>,
}

/// Recording state machine; clones share the same session
#[derive(Clone)]
pub struct RecordingController {
    surface: SharedSurface,
    backend: Arc<dyn EncodingBackend>,
    settings: RecorderSettings,
    inner: Arc<Mutex<Inner>>,
    state_tx: Arc<watch::Sender<RecordingState>>,
    elapsed_tx: Arc<watch::Sender<String>>,
}

impl RecordingController {
    /// Controller using the built-in image sequence backend
    pub fn new(surface: SharedSurface, settings: RecorderSettings) -> Self {
        Self::with_backend(surface, settings, Arc::new(ImageSequenceBackend))
    }

    pub fn with_backend(
        surface: SharedSurface,
        settings: RecorderSettings,
        backend: Arc<dyn EncodingBackend>,
    ) -> Self {
        Self {
            surface,
            backend,
            settings: settings.sanitized(),
            inner: Arc::new(Mutex::new(Inner::default())),
            state_tx: Arc::new(watch::Sender::new(RecordingState::Idle)),
            elapsed_tx: Arc::new(watch::Sender::new(format_elapsed(Duration::ZERO))),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, inner: &mut Inner, state: RecordingState) {
        inner.state = state;
        self.state_tx.send_replace(state);
    }

    pub fn settings(&self) -> &RecorderSettings {
        &self.settings
    }

    /// Begin a new session
    ///
    /// Does nothing unless `Idle`. Format or stream failures leave the
    /// controller `Idle` with no timers scheduled.
    pub fn start(&self) -> Result<(), RecordingError> {
        let runtime = Handle::try_current().map_err(|_| RecordingError::NoRuntime)?;
        let mut inner = self.lock();

        if inner.state != RecordingState::Idle {
            debug!(state = ?inner.state, "Ignoring start, session in progress");
            return Ok(());
        }

        let format = negotiate(self.settings.device_class, |mime| {
            self.backend.is_format_supported(mime)
        })?;
        let stream = self
            .backend
            .open(
                &format,
                &StreamSettings {
                    fps: self.settings.fps,
                    preset: self.settings.preset,
                    bitrate_kbps: self.settings.preset.bitrate_kbps(format.width, format.height),
                },
            )
            .map_err(|e| {
                error!(error = %e, mime = format.mime_type, "Failed to open encoding stream");
                match e {
                    RecordingError::EncodeFailed(_) => e,
                    other => RecordingError::EncodeFailed(other.to_string()),
                }
            })?;

        let id = Uuid::new_v4();
        let max_duration = self.settings.max_duration;
        let (stop_tx, stop_rx) = oneshot::channel();

        inner.session = Some(Session {
            id,
            format,
            started_at: Instant::now(),
            stopped_at: None,
            max_duration,
            chunks: Vec::new(),
        });
        inner.last_error = None;
        inner.stop_sender = Some(stop_tx);

        runtime.spawn(self.clone().run_sampler(id, stream, stop_rx));
        inner.ui_timer = Some(runtime.spawn(self.clone().run_ui_ticker(id)));
        inner.auto_stop = Some(runtime.spawn({
            let controller = self.clone();
            async move {
                tokio::time::sleep(max_duration).await;
                debug!(%id, "Auto-stop timer fired");
                controller.stop_if(Some(id));
            }
        }));

        self.elapsed_tx.send_replace(format_elapsed(Duration::ZERO));
        self.set_state(&mut inner, RecordingState::Recording);

        info!(
            %id,
            mime = format.mime_type,
            fps = self.settings.fps,
            max_ms = max_duration.as_millis() as u64,
            "Recording started"
        );
        Ok(())
    }

    /// Finish the current session
    ///
    /// Does nothing unless `Recording`. The artifact appears once the stream
    /// has been finalized and the state is back to `Idle`.
    pub fn stop(&self) {
        self.stop_if(None);
    }

    /// Stop if recording and, when `id` is given, only if it is still the
    /// active session
    fn stop_if(&self, id: Option<Uuid>) {
        let mut inner = self.lock();
        if inner.state != RecordingState::Recording {
            debug!(state = ?inner.state, "Ignoring stop, not recording");
            return;
        }
        if let Some(id) = id
            && inner.session.as_ref().is_none_or(|s| s.id != id)
        {
            debug!(%id, "Ignoring stop from a stale session timer");
            return;
        }

        self.set_state(&mut inner, RecordingState::Finalizing);

        if let Some(ui_timer) = inner.ui_timer.take() {
            ui_timer.abort();
        }

        if let Some(session) = inner.session.as_mut() {
            session.stopped_at = Some(Instant::now());
            let elapsed = session.elapsed().min(session.max_duration);
            self.elapsed_tx.send_replace(format_elapsed(elapsed));
            info!(id = %session.id, elapsed_ms = elapsed.as_millis() as u64, "Stopping recording");
        }

        if let Some(sender) = inner.stop_sender.take() {
            let _ = sender.send(());
        }
    }

    async fn run_sampler(
        self,
        id: Uuid,
        mut stream: Box<dyn EncodingStream>,
        mut stop_rx: oneshot::Receiver<()>,
    ) {
        let period = Duration::from_secs_f64(1.0 / self.settings.fps as f64);
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = &mut stop_rx => break,
                _ = interval.tick() => {
                    let Some(frame) = self.surface.snapshot() else {
                        continue;
                    };
                    let encoded = tokio::task::spawn_blocking(move || {
                        let result = stream.push_frame(&frame);
                        (stream, result)
                    })
                    .await;
                    match encoded {
                        Ok((returned, result)) => {
                            stream = returned;
                            match result {
                                Ok(chunks) => self.append_chunks(id, chunks),
                                Err(e) => warn!(error = %e, "Dropping frame that failed to encode"),
                            }
                        }
                        Err(e) => {
                            error!(error = %e, "Encoding task failed");
                            self.complete(id, Err(RecordingError::EncodeFailed(e.to_string())));
                            return;
                        }
                    }
                }
            }
        }

        let result = tokio::task::spawn_blocking(move || stream.finalize())
            .await
            .unwrap_or_else(|e| Err(RecordingError::EncodeFailed(e.to_string())));
        self.complete(id, result);
    }

    async fn run_ui_ticker(self, id: Uuid) {
        let mut interval = tokio::time::interval(self.settings.ui_tick);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick completes immediately
        interval.tick().await;

        loop {
            interval.tick().await;
            let elapsed = self.elapsed();
            self.elapsed_tx
                .send_replace(format_elapsed(elapsed.min(self.settings.max_duration)));

            if elapsed >= self.settings.max_duration {
                info!(%id, "Recording reached its time limit");
                self.stop_if(Some(id));
                return;
            }
        }
    }

    fn append_chunks(&self, id: Uuid, chunks: Vec<Vec<u8>>) {
        if chunks.is_empty() {
            return;
        }
        let mut inner = self.lock();
        if let Some(session) = inner.session.as_mut().filter(|s| s.id == id) {
            session.chunks.extend(chunks);
        }
    }

    fn complete(&self, id: Uuid, result: Result<Vec<Vec<u8>>, RecordingError>) {
        let mut inner = self.lock();
        let Some(session) = inner.session.as_mut().filter(|s| s.id == id) else {
            warn!(%id, "Finalize result for a stale session");
            return;
        };

        let chunks = std::mem::take(&mut session.chunks);
        let format = session.format;
        let duration = session.elapsed().min(session.max_duration);

        match result {
            Ok(tail) => {
                let total: usize = chunks.iter().chain(&tail).map(Vec::len).sum();
                let mut bytes = Vec::with_capacity(total);
                for chunk in chunks.into_iter().chain(tail) {
                    bytes.extend(chunk);
                }

                info!(
                    %id,
                    size = bytes.len(),
                    mime = format.mime_type,
                    duration_ms = duration.as_millis() as u64,
                    "Recording finalized"
                );
                // Replacing drops the previous clip
                inner.artifact = Some(RecordedArtifact {
                    bytes: Arc::from(bytes),
                    mime_type: format.mime_type,
                    extension: format.extension,
                    created_at: Local::now(),
                    duration,
                });
            }
            Err(e) => {
                error!(%id, error = %e, "Failed to finalize recording");
                inner.last_error = Some(e);
            }
        }

        if let Some(auto_stop) = inner.auto_stop.take() {
            auto_stop.abort();
        }
        if let Some(ui_timer) = inner.ui_timer.take() {
            ui_timer.abort();
        }
        inner.stop_sender = None;
        self.set_state(&mut inner, RecordingState::Idle);
    }

    pub fn state(&self) -> RecordingState {
        self.lock().state
    }

    /// Watch state transitions
    pub fn subscribe(&self) -> watch::Receiver<RecordingState> {
        self.state_tx.subscribe()
    }

    /// Watch the elapsed label
    pub fn subscribe_elapsed(&self) -> watch::Receiver<String> {
        self.elapsed_tx.subscribe()
    }

    /// Wait until the current session, if any, has been finalized
    pub async fn wait_until_idle(&self) {
        let mut states = self.subscribe();
        let _ = states.wait_for(|state| *state == RecordingState::Idle).await;
    }

    /// Time since the current or last session started, frozen at stop
    pub fn elapsed(&self) -> Duration {
        self.lock()
            .session
            .as_ref()
            .map(Session::elapsed)
            .unwrap_or_default()
    }

    /// Elapsed time as shown in the UI, e.g. `"12.3s"`
    pub fn elapsed_label(&self) -> String {
        self.elapsed_tx.borrow().clone()
    }

    pub fn artifact(&self) -> Option<RecordedArtifact> {
        self.lock().artifact.clone()
    }

    /// Error from the most recent finalize, cleared on the next start
    pub fn last_error(&self) -> Option<RecordingError> {
        self.lock().last_error.clone()
    }

    /// Whether the deferred auto-stop is scheduled
    pub fn auto_stop_armed(&self) -> bool {
        self.lock()
            .auto_stop
            .as_ref()
            .is_some_and(|timer| !timer.is_finished())
    }

    /// Whether the elapsed-label ticker is scheduled
    pub fn ui_timer_running(&self) -> bool {
        self.lock()
            .ui_timer
            .as_ref()
            .is_some_and(|timer| !timer.is_finished())
    }
}

impl std::fmt::Debug for RecordingController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordingController")
            .field("state", &self.state())
            .field("settings", &self.settings)
            .finish()
    }
}
