// SPDX-License-Identifier: GPL-3.0-only

//! Export of captured stills and clips
//!
//! Exporting tries, in order:
//! 1. the platform's native share facility, if it accepts the MIME type
//! 2. a plain download
//! 3. an app-level share link, if the download failed
//!
//! A share the user dismissed ends the export silently.

use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

use crate::constants::share::{APP_URL, PROMO_TEXT, SOCIAL_INTENT_URL};
use crate::errors::{AppResult, ExportError, ShareError};
use crate::pipelines::photo::CaptureArtifact;
use crate::pipelines::video::RecordedArtifact;
use crate::storage;

/// What an exported artifact is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Photo,
    Clip,
}

/// Encoded bytes ready to leave the application
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub kind: ArtifactKind,
    pub bytes: Arc<[u8]>,
    pub mime_type: &'static str,
    pub file_name: String,
}

impl From<&CaptureArtifact> for ExportArtifact {
    fn from(artifact: &CaptureArtifact) -> Self {
        Self {
            kind: ArtifactKind::Photo,
            bytes: Arc::clone(&artifact.bytes),
            mime_type: artifact.mime_type,
            file_name: artifact.file_name(),
        }
    }
}

impl From<&RecordedArtifact> for ExportArtifact {
    fn from(artifact: &RecordedArtifact) -> Self {
        Self {
            kind: ArtifactKind::Clip,
            bytes: Arc::clone(&artifact.bytes),
            mime_type: artifact.mime_type,
            file_name: artifact.file_name(),
        }
    }
}

/// Promotional text and link for the app-level share
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppSharePayload {
    pub text: String,
    pub url: String,
}

impl AppSharePayload {
    /// Social network intent URL carrying the text and link
    pub fn intent_url(&self) -> Result<Url, ExportError> {
        Url::parse_with_params(
            SOCIAL_INTENT_URL,
            &[("text", self.text.as_str()), ("url", self.url.as_str())],
        )
        .map_err(|e| ExportError::AppShareFailed(e.to_string()))
    }
}

impl Default for AppSharePayload {
    fn default() -> Self {
        Self {
            text: PROMO_TEXT.to_string(),
            url: APP_URL.to_string(),
        }
    }
}

/// Platform transport for artifacts
pub trait ExportGateway {
    /// Whether native share accepts this MIME type
    fn can_share(&self, mime_type: &str) -> bool;

    fn share(&self, artifact: &ExportArtifact) -> Result<(), ShareError>;

    /// Save the artifact, returning where it ended up
    fn download(&self, artifact: &ExportArtifact) -> AppResult<PathBuf>;

    fn open_app_share(&self, payload: &AppSharePayload) -> Result<(), ExportError>;
}

/// How an export ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Shared,
    /// User dismissed the share sheet
    Cancelled,
    Downloaded(PathBuf),
    /// Download failed; the app-level share link was opened instead
    AppShared,
}

/// Run the share → download → app-level share fallback chain
pub fn export_artifact(
    gateway: &dyn ExportGateway,
    artifact: &ExportArtifact,
) -> AppResult<ExportOutcome> {
    if gateway.can_share(artifact.mime_type) {
        match gateway.share(artifact) {
            Ok(()) => {
                info!(file = %artifact.file_name, "Shared artifact");
                return Ok(ExportOutcome::Shared);
            }
            Err(ShareError::Cancelled) => {
                debug!("Share cancelled by user");
                return Ok(ExportOutcome::Cancelled);
            }
            Err(e) => warn!(error = %e, "Native share failed, downloading instead"),
        }
    }

    let download_error = match gateway.download(artifact) {
        Ok(path) => return Ok(ExportOutcome::Downloaded(path)),
        Err(e) => e,
    };
    warn!(error = %download_error, "Download failed, trying app share");

    match gateway.open_app_share(&AppSharePayload::default()) {
        Ok(()) => Ok(ExportOutcome::AppShared),
        Err(e) => {
            warn!(error = %e, "App share failed");
            Err(download_error)
        }
    }
}

/// Desktop transport: files on disk and the default browser
#[derive(Debug, Clone)]
pub struct DesktopGateway {
    pub photo_dir: PathBuf,
    pub video_dir: PathBuf,
}

impl DesktopGateway {
    pub fn new(photo_dir: PathBuf, video_dir: PathBuf) -> Self {
        Self {
            photo_dir,
            video_dir,
        }
    }
}

impl ExportGateway for DesktopGateway {
    fn can_share(&self, _mime_type: &str) -> bool {
        // No native share sheet on the desktop
        false
    }

    fn share(&self, _artifact: &ExportArtifact) -> Result<(), ShareError> {
        Err(ShareError::Unavailable)
    }

    fn download(&self, artifact: &ExportArtifact) -> AppResult<PathBuf> {
        let dir = match artifact.kind {
            ArtifactKind::Photo => &self.photo_dir,
            ArtifactKind::Clip => &self.video_dir,
        };
        storage::write_artifact(dir, &artifact.file_name, &artifact.bytes)
    }

    fn open_app_share(&self, payload: &AppSharePayload) -> Result<(), ExportError> {
        let url = payload.intent_url()?;
        info!(%url, "Opening share link");
        open::that(url.as_str()).map_err(|e| ExportError::AppShareFailed(e.to_string()))
    }
}
