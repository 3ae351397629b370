// SPDX-License-Identifier: GPL-3.0-only

//! Shared types for camera sources

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

use crate::errors::CameraError;

/// Which physical camera is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Facing {
    /// User-facing camera
    Front,
    /// Environment-facing camera
    #[default]
    Back,
}

impl Facing {
    /// The other direction
    pub fn flipped(self) -> Self {
        match self {
            Facing::Front => Facing::Back,
            Facing::Back => Facing::Front,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Facing::Front => "front",
            Facing::Back => "back",
        }
    }
}

impl std::fmt::Display for Facing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One immutable RGBA frame from a camera source
///
/// Pixel data is tightly packed (stride = width * 4) and shared through an
/// `Arc` so handing a frame to the loop never copies it.
#[derive(Debug, Clone)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub data: Arc<[u8]>,
    pub captured_at: Instant,
}

impl Frame {
    /// Wrap packed RGBA bytes, checking the length against the dimensions
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Result<Self, CameraError> {
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(CameraError::InvalidFrame(format!(
                "{}x{} RGBA needs {} bytes, got {}",
                width,
                height,
                expected,
                data.len()
            )));
        }

        Ok(Self {
            width,
            height,
            data: Arc::from(data),
            captured_at: Instant::now(),
        })
    }

    pub fn from_image(image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            data: Arc::from(image.into_raw()),
            captured_at: Instant::now(),
        }
    }

    /// Copy the frame into an owned image buffer
    pub fn to_image(&self) -> RgbaImage {
        // Length is validated at construction
        RgbaImage::from_raw(self.width, self.height, self.data.to_vec())
            .unwrap_or_else(|| RgbaImage::new(self.width, self.height))
    }
}
