// SPDX-License-Identifier: GPL-3.0-only

//! Shared pipeline state
//!
//! One [`PipelineContext`] exists per running pipeline. It owns the two pieces
//! of state every stage touches: the filter settings and the display surface.
//! Both are cheap to clone handles, so the frame loop, the capture controller
//! and the recording controller each get their own copy at construction.

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::constants::filter::DEFAULT_INTENSITY;

/// Filter settings read by the frame loop on every tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Blend between original (0.0) and fully filtered (1.0)
    pub intensity: f32,
    /// Master switch
    pub enabled: bool,
}

impl FilterConfig {
    /// Create a config, clamping intensity into [0, 1]
    pub fn new(intensity: f32, enabled: bool) -> Self {
        Self {
            intensity: sanitize_intensity(intensity),
            enabled,
        }
    }

    /// Whether a tick should run the color transform at all
    pub fn is_active(&self) -> bool {
        self.enabled && self.intensity > 0.0
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            intensity: DEFAULT_INTENSITY,
            enabled: true,
        }
    }
}

fn sanitize_intensity(intensity: f32) -> f32 {
    if intensity.is_nan() {
        warn!("Ignoring NaN filter intensity");
        return 0.0;
    }
    intensity.clamp(0.0, 1.0)
}

/// Last-write-wins handle to the process-wide [`FilterConfig`]
#[derive(Debug, Clone)]
pub struct FilterHandle {
    sender: Arc<watch::Sender<FilterConfig>>,
}

impl FilterHandle {
    pub fn new(config: FilterConfig) -> Self {
        Self {
            sender: Arc::new(watch::Sender::new(config)),
        }
    }

    /// Current settings
    pub fn get(&self) -> FilterConfig {
        *self.sender.borrow()
    }

    /// Set the intensity; out-of-range values are clamped here, never in the transform
    pub fn set_intensity(&self, intensity: f32) {
        let intensity = sanitize_intensity(intensity);
        self.sender.send_modify(|config| config.intensity = intensity);
        debug!(intensity, "Filter intensity changed");
    }

    /// Adjust the intensity by `delta`, clamped
    pub fn nudge_intensity(&self, delta: f32) -> f32 {
        let intensity = sanitize_intensity(self.get().intensity + delta);
        self.set_intensity(intensity);
        intensity
    }

    /// Flip the enabled flag and return the new value
    pub fn toggle(&self) -> bool {
        let mut enabled = false;
        self.sender.send_modify(|config| {
            config.enabled = !config.enabled;
            enabled = config.enabled;
        });
        debug!(enabled, "Filter toggled");
        enabled
    }

    /// Watch for changes; hosts use it to announce new settings
    pub fn subscribe(&self) -> watch::Receiver<FilterConfig> {
        self.sender.subscribe()
    }
}

impl Default for FilterHandle {
    fn default() -> Self {
        Self::new(FilterConfig::default())
    }
}

/// The display surface: the single mutable pixel buffer of the pipeline
///
/// The frame loop writes it every tick; capture and recording take snapshots.
/// The lock is only ever held for synchronous work, never across an await.
#[derive(Debug, Clone, Default)]
pub struct SharedSurface {
    image: Arc<Mutex<RgbaImage>>,
}

impl SharedSurface {
    /// Create an empty (0x0) surface; it is sized by the first rendered tick
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a surface with initial contents
    pub fn from_image(image: RgbaImage) -> Self {
        Self {
            image: Arc::new(Mutex::new(image)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, RgbaImage> {
        // A panic mid-tick leaves at worst a half-written frame
        self.image.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.lock().dimensions()
    }

    /// Whether anything has been rendered yet
    pub fn is_empty(&self) -> bool {
        let (w, h) = self.dimensions();
        w == 0 || h == 0
    }

    /// Copy of the current contents, or None before the first render
    pub fn snapshot(&self) -> Option<RgbaImage> {
        let image = self.lock();
        if image.width() == 0 || image.height() == 0 {
            return None;
        }
        Some(image.clone())
    }

    /// Run `f` with exclusive access to the surface
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut RgbaImage) -> R) -> R {
        f(&mut self.lock())
    }
}

/// Process-scoped state passed explicitly into every pipeline stage
#[derive(Debug, Clone, Default)]
pub struct PipelineContext {
    pub filter: FilterHandle,
    pub surface: SharedSurface,
}

impl PipelineContext {
    pub fn new(filter: FilterConfig) -> Self {
        Self {
            filter: FilterHandle::new(filter),
            surface: SharedSurface::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intensity_is_clamped_by_setter() {
        let handle = FilterHandle::default();
        handle.set_intensity(1.7);
        assert_eq!(handle.get().intensity, 1.0);
        handle.set_intensity(-0.2);
        assert_eq!(handle.get().intensity, 0.0);
        handle.set_intensity(f32::NAN);
        assert_eq!(handle.get().intensity, 0.0);
    }

    #[test]
    fn test_last_write_wins() {
        let handle = FilterHandle::default();
        let other = handle.clone();
        handle.set_intensity(0.3);
        other.set_intensity(0.6);
        assert_eq!(handle.get().intensity, 0.6);
        assert!(!other.toggle());
        assert!(!handle.get().enabled);
    }

    #[test]
    fn test_subscribers_see_changes() {
        let handle = FilterHandle::default();
        let mut changes = handle.subscribe();
        assert!(!changes.has_changed().unwrap());

        handle.nudge_intensity(-0.35);
        assert!(changes.has_changed().unwrap());
        let seen = *changes.borrow_and_update();
        assert!((seen.intensity - 0.5).abs() < 1e-6);

        handle.toggle();
        assert!(!changes.borrow_and_update().enabled);
    }

    #[test]
    fn test_is_active() {
        assert!(FilterConfig::new(0.5, true).is_active());
        assert!(!FilterConfig::new(0.0, true).is_active());
        assert!(!FilterConfig::new(0.5, false).is_active());
    }

    #[test]
    fn test_empty_surface_has_no_snapshot() {
        let surface = SharedSurface::new();
        assert!(surface.is_empty());
        assert!(surface.snapshot().is_none());

        surface.with_mut(|img| *img = RgbaImage::new(4, 2));
        assert_eq!(surface.snapshot().map(|s| s.dimensions()), Some((4, 2)));
    }
}
