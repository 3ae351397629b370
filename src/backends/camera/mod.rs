// SPDX-License-Identifier: GPL-3.0-only

//! Camera source abstraction
//!
//! The pipeline only needs two things from a camera: the pixels and size of
//! the most recent frame, and a way to switch between the front and back
//! camera. Device acquisition and permission handling live behind
//! [`CameraSource`].
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │   SourceSpec     │  ← what to open (from config / CLI)
//! └────────┬─────────┘
//!          │ acquire()
//!          ▼
//! ┌──────────────────┐
//! │ CameraSource     │  ← TestPatternSource, StillImageSource
//! └────────┬─────────┘
//!          │ current_frame()
//!          ▼
//! ┌──────────────────┐
//! │   FrameLoop      │
//! └──────────────────┘
//! ```

pub mod frame_loop;
pub mod still_image;
pub mod test_pattern;
pub mod types;

pub use frame_loop::{FrameLoop, TickOutcome};
pub use still_image::StillImageSource;
pub use test_pattern::TestPatternSource;
pub use types::*;

use crate::errors::CameraError;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{info, warn};

/// A live frame feed
pub trait CameraSource: Send {
    /// Human readable name for logs and status lines
    fn name(&self) -> &str;

    /// Native size of the feed, if the device has reported it yet
    fn dimensions(&self) -> Option<(u32, u32)>;

    /// Most recent frame, or None while the device is not ready
    fn current_frame(&mut self) -> Option<Frame>;

    /// Currently active camera
    fn facing(&self) -> Facing;

    /// Restart acquisition on the given camera
    fn switch_facing(&mut self, facing: Facing) -> Result<(), CameraError>;
}

/// What [`acquire`] should open
#[derive(Debug, Clone)]
pub enum SourceSpec {
    /// Synthetic animated frames
    TestPattern { width: u32, height: u32 },
    /// Still images standing in for the back and (optionally) front camera
    StillImage {
        back: PathBuf,
        front: Option<PathBuf>,
    },
}

/// Open a camera source facing `facing`
///
/// Any failure is reported as [`CameraError::DeviceUnavailable`] so hosts can
/// show a single retry state.
pub fn acquire(spec: &SourceSpec, facing: Facing) -> Result<Box<dyn CameraSource>, CameraError> {
    info!(?spec, %facing, "Acquiring camera source");

    let source: Box<dyn CameraSource> = match spec {
        SourceSpec::TestPattern { width, height } => {
            Box::new(TestPatternSource::new(*width, *height, facing)?)
        }
        SourceSpec::StillImage { back, front } => {
            let mut source = StillImageSource::open(back, front.as_deref())?;
            if facing != source.facing() {
                source.switch_facing(facing).map_err(|e| {
                    warn!(error = %e, "Requested facing unavailable");
                    CameraError::DeviceUnavailable(e.to_string())
                })?;
            }
            Box::new(source)
        }
    };

    Ok(source)
}

/// Stand-in while no device could be acquired; never produces a frame
#[derive(Debug, Clone, Copy)]
pub struct UnavailableSource {
    facing: Facing,
}

impl UnavailableSource {
    pub fn new(facing: Facing) -> Self {
        Self { facing }
    }
}

impl CameraSource for UnavailableSource {
    fn name(&self) -> &str {
        "unavailable"
    }

    fn dimensions(&self) -> Option<(u32, u32)> {
        None
    }

    fn current_frame(&mut self) -> Option<Frame> {
        None
    }

    fn facing(&self) -> Facing {
        self.facing
    }

    fn switch_facing(&mut self, facing: Facing) -> Result<(), CameraError> {
        self.facing = facing;
        Ok(())
    }
}

/// A camera source shared between the frame loop and its host
#[derive(Clone)]
pub struct SharedSource {
    inner: Arc<Mutex<Box<dyn CameraSource>>>,
}

impl SharedSource {
    pub fn new(source: Box<dyn CameraSource>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(source)),
        }
    }

    pub fn lock(&self) -> MutexGuard<'_, Box<dyn CameraSource>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Swap in a freshly acquired source after a retry
    pub fn replace(&self, source: Box<dyn CameraSource>) {
        let mut current = self.lock();
        info!(old = current.name(), new = source.name(), "Replacing camera source");
        *current = source;
    }

    /// Switch to the other camera, returning the new facing
    pub fn flip(&self) -> Result<Facing, CameraError> {
        let mut source = self.lock();
        let target = source.facing().flipped();
        source.switch_facing(target)?;
        info!(facing = %target, "Switched camera");
        Ok(target)
    }
}

impl std::fmt::Debug for SharedSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let source = self.lock();
        f.debug_struct("SharedSource")
            .field("name", &source.name())
            .field("facing", &source.facing())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_missing_image_is_device_unavailable() {
        let spec = SourceSpec::StillImage {
            back: PathBuf::from("/nonexistent/woodglass-test.png"),
            front: None,
        };
        assert!(matches!(
            acquire(&spec, Facing::Back),
            Err(CameraError::DeviceUnavailable(_))
        ));
    }

    #[test]
    fn test_replace_makes_source_ready() {
        let shared = SharedSource::new(Box::new(UnavailableSource::new(Facing::Front)));
        assert!(shared.lock().current_frame().is_none());

        let source = acquire(
            &SourceSpec::TestPattern {
                width: 8,
                height: 8,
            },
            Facing::Front,
        )
        .unwrap();
        shared.replace(source);

        let mut source = shared.lock();
        assert_eq!(source.facing(), Facing::Front);
        assert!(source.current_frame().is_some());
    }

    #[test]
    fn test_shared_source_flip() {
        let source = acquire(
            &SourceSpec::TestPattern {
                width: 8,
                height: 8,
            },
            Facing::Back,
        )
        .unwrap();
        let shared = SharedSource::new(source);
        assert_eq!(shared.flip().unwrap(), Facing::Front);
        assert_eq!(shared.lock().facing(), Facing::Front);
    }
}
