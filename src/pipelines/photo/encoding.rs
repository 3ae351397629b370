// SPDX-License-Identifier: GPL-3.0-only

//! Still image encoding
//!
//! Captured stills are encoded losslessly so the watermark text stays crisp.
//! The encoder sits behind [`StillImageEncoder`] so hosts and tests can swap
//! in their own.

use image::{ImageFormat, RgbaImage};
use std::io::Cursor;
use tracing::debug;

use crate::errors::PhotoError;

/// Encodes a watermarked RGBA still into file bytes
pub trait StillImageEncoder: Send + Sync {
    /// MIME type of the produced bytes
    fn mime_type(&self) -> &'static str;

    /// File extension without the dot
    fn extension(&self) -> &'static str;

    fn encode(&self, image: &RgbaImage) -> Result<Vec<u8>, PhotoError>;
}

/// PNG encoder backed by the `image` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct PngStillEncoder;

impl StillImageEncoder for PngStillEncoder {
    fn mime_type(&self) -> &'static str {
        "image/png"
    }

    fn extension(&self) -> &'static str {
        "png"
    }

    fn encode(&self, image: &RgbaImage) -> Result<Vec<u8>, PhotoError> {
        let mut buffer = Vec::new();
        image.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)?;

        debug!(
            width = image.width(),
            height = image.height(),
            size = buffer.len(),
            "PNG encoding complete"
        );
        Ok(buffer)
    }
}
