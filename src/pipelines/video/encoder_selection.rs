// SPDX-License-Identifier: GPL-3.0-only

//! Recording format negotiation
//!
//! Each device class has an ordered preference list of container formats.
//! The first entry the encoding backend reports as supported wins. Devices
//! that can only produce a single container get a one-entry list, so they
//! either use that format or refuse to record.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::RecordingError;

/// Platform capability class used to pick the preference list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DeviceClass {
    /// Platforms whose recorder only produces one container
    ConstrainedMobile,
    /// Everything else
    #[default]
    General,
}

impl DeviceClass {
    pub fn as_str(self) -> &'static str {
        match self {
            DeviceClass::ConstrainedMobile => "constrained mobile",
            DeviceClass::General => "general",
        }
    }
}

/// One entry of the capability table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatCandidate {
    pub mime_type: &'static str,
    pub extension: &'static str,
    /// Requested capture resolution
    pub width: u32,
    pub height: u32,
}

const fn candidate(
    mime_type: &'static str,
    extension: &'static str,
    width: u32,
    height: u32,
) -> FormatCandidate {
    FormatCandidate {
        mime_type,
        extension,
        width,
        height,
    }
}

const CONSTRAINED_MOBILE: &[FormatCandidate] = &[candidate("video/mp4", "mp4", 1280, 720)];

const GENERAL: &[FormatCandidate] = &[
    candidate("video/webm;codecs=vp9", "webm", 1920, 1080),
    candidate("video/webm;codecs=vp8", "webm", 1920, 1080),
    candidate("video/webm", "webm", 1920, 1080),
    candidate("video/mp4", "mp4", 1920, 1080),
    candidate("video/x-motion-jpeg", "mjpeg", 1920, 1080),
    candidate("image/gif", "gif", 1920, 1080),
];

/// Ordered preference list for a device class
pub fn candidates(class: DeviceClass) -> &'static [FormatCandidate] {
    match class {
        DeviceClass::ConstrainedMobile => CONSTRAINED_MOBILE,
        DeviceClass::General => GENERAL,
    }
}

/// Pick the most preferred format the backend supports
pub fn negotiate(
    class: DeviceClass,
    is_supported: impl Fn(&str) -> bool,
) -> Result<FormatCandidate, RecordingError> {
    for candidate in candidates(class) {
        if is_supported(candidate.mime_type) {
            info!(
                mime = candidate.mime_type,
                width = candidate.width,
                height = candidate.height,
                "Selected recording format"
            );
            return Ok(*candidate);
        }
        debug!(mime = candidate.mime_type, "Recording format not supported");
    }

    Err(RecordingError::UnsupportedFormat(class.as_str()))
}
