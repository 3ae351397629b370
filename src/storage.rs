// SPDX-License-Identifier: GPL-3.0-only

//! Storage utilities for exported photos and clips

use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::constants::share::FILE_PREFIX;
use crate::errors::{AppError, AppResult};

/// Sub-directory created under the user's pictures/videos folders
const APP_DIR: &str = "Woodglass";

/// `woodglass_YYYYMMDD_HHMMSS.<extension>`
pub fn artifact_file_name(created_at: &DateTime<Local>, extension: &str) -> String {
    format!(
        "{}_{}.{}",
        FILE_PREFIX,
        created_at.format("%Y%m%d_%H%M%S"),
        extension
    )
}

/// Default directory for downloaded stills
pub fn default_photo_dir() -> PathBuf {
    dirs::picture_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

/// Default directory for downloaded clips
pub fn default_video_dir() -> PathBuf {
    dirs::video_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

/// A path in `dir` for `file_name` that does not exist yet
///
/// Two captures within the same second share a timestamp, so later ones get a
/// `_1`, `_2`, ... suffix.
pub fn unique_path(dir: &Path, file_name: &str) -> PathBuf {
    let candidate = dir.join(file_name);
    if !candidate.exists() {
        return candidate;
    }

    let path = Path::new(file_name);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    (1..)
        .map(|n| dir.join(format!("{}_{}{}", stem, n, extension)))
        .find(|p| !p.exists())
        .unwrap_or(candidate)
}

/// Write `bytes` into `dir` under a unique name, creating `dir` if needed
pub fn write_artifact(dir: &Path, file_name: &str, bytes: &[u8]) -> AppResult<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|e| {
        AppError::Storage(format!("cannot create {}: {}", dir.display(), e))
    })?;

    let path = unique_path(dir, file_name);
    debug!(path = %path.display(), size = bytes.len(), "Writing artifact");
    std::fs::write(&path, bytes)?;

    info!(path = %path.display(), "Artifact saved");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_artifact_file_name() {
        let at = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(artifact_file_name(&at, "png"), "woodglass_20240309_070501.png");
    }

    #[test]
    fn test_write_artifact_never_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested");

        let first = write_artifact(&target, "clip.gif", b"one").unwrap();
        let second = write_artifact(&target, "clip.gif", b"two").unwrap();

        assert_eq!(first.file_name().unwrap(), "clip.gif");
        assert_eq!(second.file_name().unwrap(), "clip_1.gif");
        assert_eq!(std::fs::read(&first).unwrap(), b"one");
        assert_eq!(std::fs::read(&second).unwrap(), b"two");
    }
}
