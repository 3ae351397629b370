// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the filter pipeline
//!
//! Session-level failures (camera, encode, format) surface once through
//! [`AppError`]. Per-tick frame read failures never become errors; the frame
//! loop skips the tick instead.

use thiserror::Error;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Main application error type
#[derive(Debug, Clone, Error)]
pub enum AppError {
    /// Camera-related errors
    #[error("Camera error: {0}")]
    Camera(#[from] CameraError),
    /// Recording-related errors
    #[error("Recording error: {0}")]
    Recording(#[from] RecordingError),
    /// Photo capture errors
    #[error("Photo error: {0}")]
    Photo(#[from] PhotoError),
    /// Export errors
    #[error("Export error: {0}")]
    Export(#[from] ExportError),
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
    /// Storage/filesystem errors
    #[error("Storage error: {0}")]
    Storage(String),
    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

/// Camera-specific errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CameraError {
    /// Camera acquisition failed; hosts show a full-screen retry state
    #[error("Camera unavailable: {0}")]
    DeviceUnavailable(String),
    /// The source cannot serve the requested facing direction
    #[error("No {0} camera available")]
    FacingUnavailable(&'static str),
    /// Frame data did not match its declared dimensions
    #[error("Invalid frame: {0}")]
    InvalidFrame(String),
}

/// Recording-specific errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordingError {
    /// No entry of the capability table is supported on this platform
    #[error("No supported recording format for {0} devices")]
    UnsupportedFormat(&'static str),
    /// Opening, feeding or finalizing the encoding stream failed
    #[error("Video encoding failed: {0}")]
    EncodeFailed(String),
    /// The controller must be used from inside a tokio runtime
    #[error("No async runtime available for recording timers")]
    NoRuntime,
}

/// Photo capture errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PhotoError {
    /// The display surface has not been rendered yet
    #[error("No frame available for capture")]
    NoFrameAvailable,
    /// Still-image encoding failed
    #[error("Encoding failed: {0}")]
    EncodingFailed(String),
}

/// Outcome of a native share attempt that did not complete
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShareError {
    /// User dismissed the share sheet; treated as a silent success
    #[error("Share cancelled")]
    Cancelled,
    /// No native share facility for this artifact
    #[error("Native share unavailable")]
    Unavailable,
    /// Share facility reported an error
    #[error("Native share failed: {0}")]
    Failed(String),
}

/// Export errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExportError {
    /// Writing the artifact to its download location failed
    #[error("Download failed: {0}")]
    DownloadFailed(String),
    /// Opening the app-level share URL failed
    #[error("App share failed: {0}")]
    AppShareFailed(String),
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Other(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Other(msg.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<image::ImageError> for PhotoError {
    fn from(err: image::ImageError) -> Self {
        PhotoError::EncodingFailed(err.to_string())
    }
}
