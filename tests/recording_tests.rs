// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for the recording state machine
//!
//! All tests run on a paused tokio clock so the 30 second cap elapses
//! instantly.

use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use image::{Rgba, RgbaImage};
use woodglass::app::SharedSurface;
use woodglass::constants::recording::MAX_DURATION;
use woodglass::BitratePreset;
use woodglass::errors::RecordingError;
use woodglass::pipelines::video::{
    DeviceClass, EncodingBackend, EncodingStream, FormatCandidate, RecorderSettings,
    RecordingController, RecordingState, StreamSettings,
};

const FRAME_CHUNK: u8 = 1;
const TRAILER_CHUNK: u8 = 9;

#[derive(Default)]
struct MockBackend {
    supported: Vec<&'static str>,
    fail_open: bool,
    fail_finalize: bool,
    encode_delay: Duration,
    opens: AtomicUsize,
    last_settings: Mutex<Option<StreamSettings>>,
}

impl MockBackend {
    fn supporting(supported: &[&'static str]) -> Self {
        Self {
            supported: supported.to_vec(),
            ..Default::default()
        }
    }

    fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    fn last_settings(&self) -> Option<StreamSettings> {
        *self.last_settings.lock().unwrap()
    }
}

struct MockStream {
    fail_finalize: bool,
    encode_delay: Duration,
}

impl EncodingStream for MockStream {
    fn push_frame(&mut self, _frame: &RgbaImage) -> Result<Vec<Vec<u8>>, RecordingError> {
        if !self.encode_delay.is_zero() {
            std::thread::sleep(self.encode_delay);
        }
        Ok(vec![vec![FRAME_CHUNK]])
    }

    fn finalize(self: Box<Self>) -> Result<Vec<Vec<u8>>, RecordingError> {
        if self.fail_finalize {
            return Err(RecordingError::EncodeFailed("muxer crashed".to_string()));
        }
        Ok(vec![vec![TRAILER_CHUNK]])
    }
}

impl EncodingBackend for MockBackend {
    fn is_format_supported(&self, mime_type: &str) -> bool {
        self.supported.iter().any(|m| *m == mime_type)
    }

    fn open(
        &self,
        _format: &FormatCandidate,
        settings: &StreamSettings,
    ) -> Result<Box<dyn EncodingStream>, RecordingError> {
        if self.fail_open {
            return Err(RecordingError::EncodeFailed("no encoder".to_string()));
        }
        self.opens.fetch_add(1, Ordering::SeqCst);
        *self.last_settings.lock().unwrap() = Some(*settings);
        Ok(Box::new(MockStream {
            fail_finalize: self.fail_finalize,
            encode_delay: self.encode_delay,
        }))
    }
}

fn surface() -> SharedSurface {
    SharedSurface::from_image(RgbaImage::from_pixel(32, 18, Rgba([10, 20, 200, 255])))
}

fn controller(backend: &Arc<MockBackend>, settings: RecorderSettings) -> RecordingController {
    RecordingController::with_backend(surface(), settings, backend.clone())
}

#[tokio::test(start_paused = true)]
async fn test_double_start_opens_one_stream() {
    let backend = Arc::new(MockBackend::supporting(&["video/webm;codecs=vp9"]));
    let controller = controller(&backend, RecorderSettings::default());

    controller.start().unwrap();
    controller.start().unwrap();
    assert_eq!(backend.opens(), 1);
    assert_eq!(controller.state(), RecordingState::Recording);

    controller.stop();
    controller.wait_until_idle().await;
}

#[tokio::test(start_paused = true)]
async fn test_auto_stop_at_cap() {
    let backend = Arc::new(MockBackend::supporting(&["video/webm"]));
    let controller = controller(&backend, RecorderSettings::default());

    controller.start().unwrap();
    tokio::time::sleep(Duration::from_millis(29_000)).await;
    assert_eq!(controller.state(), RecordingState::Recording);

    tokio::time::sleep(Duration::from_millis(1_500)).await;
    controller.wait_until_idle().await;

    assert_eq!(controller.state(), RecordingState::Idle);
    assert_eq!(controller.elapsed_label(), "30.0s");
    assert!(!controller.auto_stop_armed());
    assert!(!controller.ui_timer_running());

    let artifact = controller.artifact().unwrap();
    assert_eq!(artifact.duration, MAX_DURATION);
    assert_eq!(artifact.mime_type, "video/webm");
    assert!(artifact.file_name().ends_with(".webm"));
}

#[tokio::test(start_paused = true)]
async fn test_chunks_are_concatenated_in_order() {
    let backend = Arc::new(MockBackend::supporting(&["video/mp4"]));
    let controller = controller(&backend, RecorderSettings::default());

    controller.start().unwrap();
    tokio::time::sleep(Duration::from_millis(500)).await;
    controller.stop();
    controller.wait_until_idle().await;

    let artifact = controller.artifact().unwrap();
    let (trailer, frames) = artifact.bytes.split_last().unwrap();
    assert_eq!(*trailer, TRAILER_CHUNK);
    assert!(!frames.is_empty());
    assert!(frames.iter().all(|b| *b == FRAME_CHUNK));
}

#[tokio::test(start_paused = true)]
async fn test_stop_keeps_auto_stop_until_finalized() {
    let backend = Arc::new(MockBackend::supporting(&["video/mp4"]));
    let controller = controller(&backend, RecorderSettings::default());

    controller.start().unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;
    controller.stop();

    // The sampler has not run yet, so the session is still finalizing
    assert_eq!(controller.state(), RecordingState::Finalizing);
    assert!(controller.auto_stop_armed());
    assert!(!controller.ui_timer_running());

    // A second stop while finalizing is ignored
    controller.stop();

    controller.wait_until_idle().await;
    assert!(!controller.auto_stop_armed());
}

#[tokio::test(start_paused = true)]
async fn test_constrained_mobile_uses_mp4() {
    let backend = Arc::new(MockBackend::supporting(&["video/mp4", "video/webm"]));
    let settings = RecorderSettings {
        device_class: DeviceClass::ConstrainedMobile,
        ..Default::default()
    };
    let controller = controller(&backend, settings);

    controller.start().unwrap();
    controller.stop();
    controller.wait_until_idle().await;

    let artifact = controller.artifact().unwrap();
    assert_eq!(artifact.mime_type, "video/mp4");
    assert_eq!(artifact.extension, "mp4");

    // 1280x720 at the Medium preset
    assert_eq!(backend.last_settings().unwrap().bitrate_kbps, 5_000);
}

#[tokio::test(start_paused = true)]
async fn test_bitrate_follows_preset_and_resolution() {
    let backend = Arc::new(MockBackend::supporting(&["video/webm;codecs=vp9"]));
    let settings = RecorderSettings {
        preset: BitratePreset::High,
        ..Default::default()
    };
    let controller = controller(&backend, settings);

    controller.start().unwrap();
    controller.stop();
    controller.wait_until_idle().await;

    let opened = backend.last_settings().unwrap();
    assert_eq!(opened.preset, BitratePreset::High);
    assert_eq!(opened.bitrate_kbps, 16_000);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn test_slow_encoder_does_not_delay_timers() {
    let backend = Arc::new(MockBackend {
        supported: vec!["video/mp4"],
        encode_delay: Duration::from_millis(400),
        ..Default::default()
    });
    let settings = RecorderSettings {
        max_duration: Duration::from_millis(1_000),
        ..Default::default()
    };
    let controller = controller(&backend, settings);

    controller.start().unwrap();
    tokio::time::sleep(Duration::from_millis(350)).await;
    let label = controller.elapsed_label();
    assert!(label == "0.2s" || label == "0.3s", "label {label}");

    // The cap stops the session on time even with an encode in flight
    tokio::time::sleep(Duration::from_millis(850)).await;
    assert_ne!(controller.state(), RecordingState::Recording);

    controller.wait_until_idle().await;
    assert_eq!(
        controller.artifact().unwrap().duration,
        Duration::from_millis(1_000)
    );
}

#[tokio::test(start_paused = true)]
async fn test_no_supported_format() {
    let backend = Arc::new(MockBackend::default());
    let controller = controller(&backend, RecorderSettings::default());

    assert_eq!(
        controller.start(),
        Err(RecordingError::UnsupportedFormat("general"))
    );
    assert_eq!(controller.state(), RecordingState::Idle);
    assert_eq!(backend.opens(), 0);
    assert!(!controller.auto_stop_armed());
    assert!(!controller.ui_timer_running());
}

#[tokio::test(start_paused = true)]
async fn test_open_failure_leaves_idle() {
    let backend = Arc::new(MockBackend {
        supported: vec!["video/mp4"],
        fail_open: true,
        ..Default::default()
    });
    let controller = controller(&backend, RecorderSettings::default());

    assert!(matches!(
        controller.start(),
        Err(RecordingError::EncodeFailed(_))
    ));
    assert_eq!(controller.state(), RecordingState::Idle);
    assert!(!controller.auto_stop_armed());
}

#[tokio::test(start_paused = true)]
async fn test_finalize_failure_is_reported() {
    let backend = Arc::new(MockBackend {
        supported: vec!["video/mp4"],
        fail_finalize: true,
        ..Default::default()
    });
    let controller = controller(&backend, RecorderSettings::default());

    controller.start().unwrap();
    tokio::time::sleep(Duration::from_millis(300)).await;
    controller.stop();
    controller.wait_until_idle().await;

    assert_eq!(controller.state(), RecordingState::Idle);
    assert!(controller.artifact().is_none());
    assert!(matches!(
        controller.last_error(),
        Some(RecordingError::EncodeFailed(_))
    ));
}

#[tokio::test(start_paused = true)]
async fn test_new_session_replaces_artifact() {
    let backend = Arc::new(MockBackend::supporting(&["video/mp4"]));
    let controller = controller(&backend, RecorderSettings::default());

    controller.start().unwrap();
    tokio::time::sleep(Duration::from_millis(1_000)).await;
    controller.stop();
    controller.wait_until_idle().await;
    let first = controller.artifact().unwrap();

    controller.start().unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;
    controller.stop();
    controller.wait_until_idle().await;
    let second = controller.artifact().unwrap();

    assert_eq!(backend.opens(), 2);
    assert!(second.bytes.len() < first.bytes.len());
    assert!(second.duration < first.duration);
}

#[tokio::test(start_paused = true)]
async fn test_stop_while_idle_is_noop() {
    let backend = Arc::new(MockBackend::supporting(&["video/mp4"]));
    let controller = controller(&backend, RecorderSettings::default());

    controller.stop();
    assert_eq!(controller.state(), RecordingState::Idle);
    assert!(controller.artifact().is_none());
    assert_eq!(backend.opens(), 0);
}
