// SPDX-License-Identifier: GPL-3.0-only

//! Video recording pipeline
//!
//! This module provides time-boxed recording of the filtered display surface:
//! - Declarative per-device format negotiation
//! - A pluggable encoding stream facility with built-in MJPEG and GIF streams
//! - A session state machine with a hard duration cap

pub mod encoder_selection;
pub mod recorder;
pub mod stream;

// Re-export commonly used types
pub use encoder_selection::{DeviceClass, FormatCandidate};
pub use recorder::{RecordedArtifact, RecorderSettings, RecordingController, RecordingState};
pub use stream::{EncodingBackend, EncodingStream, ImageSequenceBackend, StreamSettings};
