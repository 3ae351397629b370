// SPDX-License-Identifier: GPL-3.0-only

//! Encoding stream facility
//!
//! A recording feeds display surface snapshots into an [`EncodingStream`] at
//! a fixed rate and collects the byte chunks it emits. Concatenating every
//! chunk in order, including those returned by `finalize`, yields the clip.
//!
//! The built-in [`ImageSequenceBackend`] needs nothing beyond the `image`
//! crate: Motion-JPEG (one JPEG per frame) and animated GIF.

use std::io::{self, Cursor, Write};
use std::sync::{Arc, Mutex, PoisonError};

use image::codecs::gif::{GifEncoder, Repeat};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{Delay, DynamicImage, RgbaImage};
use tracing::{debug, info};

use super::encoder_selection::FormatCandidate;
use crate::constants::BitratePreset;
use crate::errors::RecordingError;

pub const MIME_MJPEG: &str = "video/x-motion-jpeg";
pub const MIME_GIF: &str = "image/gif";

/// Parameters for opening a stream
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StreamSettings {
    /// Surface sample rate
    pub fps: u32,
    pub preset: BitratePreset,
    /// Target bitrate for bitrate-driven codecs, derived from the preset and
    /// the negotiated resolution
    pub bitrate_kbps: u32,
}

/// Converts a sequence of frames into encoded chunks
pub trait EncodingStream: Send {
    /// Encode one frame; may return zero or more chunks
    fn push_frame(&mut self, frame: &RgbaImage) -> Result<Vec<Vec<u8>>, RecordingError>;

    /// Flush everything still buffered
    fn finalize(self: Box<Self>) -> Result<Vec<Vec<u8>>, RecordingError>;
}

/// Factory and capability query for encoding streams
pub trait EncodingBackend: Send + Sync {
    fn is_format_supported(&self, mime_type: &str) -> bool;

    fn open(
        &self,
        format: &FormatCandidate,
        settings: &StreamSettings,
    ) -> Result<Box<dyn EncodingStream>, RecordingError>;
}

/// Built-in backend producing Motion-JPEG and animated GIF
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageSequenceBackend;

impl EncodingBackend for ImageSequenceBackend {
    fn is_format_supported(&self, mime_type: &str) -> bool {
        matches!(mime_type, MIME_MJPEG | MIME_GIF)
    }

    fn open(
        &self,
        format: &FormatCandidate,
        settings: &StreamSettings,
    ) -> Result<Box<dyn EncodingStream>, RecordingError> {
        let bounds = (format.width, format.height);
        info!(
            mime = format.mime_type,
            fps = settings.fps,
            preset = settings.preset.display_name(),
            bitrate_kbps = settings.bitrate_kbps,
            "Opening image sequence stream"
        );

        match format.mime_type {
            MIME_MJPEG => Ok(Box::new(MjpegStream {
                quality: settings.preset.jpeg_quality(),
                bounds,
            })),
            MIME_GIF => Ok(Box::new(GifStream::new(settings, bounds)?)),
            other => Err(RecordingError::EncodeFailed(format!(
                "unsupported format {}",
                other
            ))),
        }
    }
}

/// Downscale `frame` to fit within `bounds`, keeping the aspect ratio
fn fit_within(frame: &RgbaImage, bounds: (u32, u32)) -> Option<RgbaImage> {
    let (w, h) = frame.dimensions();
    let (max_w, max_h) = bounds;
    if w <= max_w && h <= max_h {
        return None;
    }

    let scale = (max_w as f64 / w as f64).min(max_h as f64 / h as f64);
    let nw = ((w as f64 * scale).round() as u32).max(1);
    let nh = ((h as f64 * scale).round() as u32).max(1);
    Some(imageops::resize(frame, nw, nh, FilterType::Triangle))
}

struct MjpegStream {
    quality: u8,
    bounds: (u32, u32),
}

impl EncodingStream for MjpegStream {
    fn push_frame(&mut self, frame: &RgbaImage) -> Result<Vec<Vec<u8>>, RecordingError> {
        let scaled = fit_within(frame, self.bounds);
        let frame = scaled.as_ref().unwrap_or(frame);
        // JPEG has no alpha channel
        let rgb = DynamicImage::ImageRgba8(frame.clone()).to_rgb8();

        let mut buffer = Vec::new();
        JpegEncoder::new_with_quality(&mut Cursor::new(&mut buffer), self.quality)
            .encode_image(&rgb)
            .map_err(|e| RecordingError::EncodeFailed(format!("JPEG frame: {}", e)))?;

        Ok(vec![buffer])
    }

    fn finalize(self: Box<Self>) -> Result<Vec<Vec<u8>>, RecordingError> {
        Ok(Vec::new())
    }
}

/// Writer whose contents can be drained while the encoder still owns it
#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    fn drain(&self) -> Vec<u8> {
        std::mem::take(&mut *self.0.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

struct GifStream {
    encoder: GifEncoder<SharedBuffer>,
    buffer: SharedBuffer,
    delay: Delay,
    bounds: (u32, u32),
    frames: u64,
}

impl GifStream {
    fn new(settings: &StreamSettings, bounds: (u32, u32)) -> Result<Self, RecordingError> {
        let buffer = SharedBuffer::default();
        let mut encoder = GifEncoder::new_with_speed(buffer.clone(), settings.preset.gif_speed());
        encoder
            .set_repeat(Repeat::Infinite)
            .map_err(|e| RecordingError::EncodeFailed(format!("GIF setup: {}", e)))?;

        Ok(Self {
            encoder,
            buffer,
            delay: Delay::from_numer_denom_ms(1000, settings.fps.max(1)),
            bounds,
            frames: 0,
        })
    }
}

impl EncodingStream for GifStream {
    fn push_frame(&mut self, frame: &RgbaImage) -> Result<Vec<Vec<u8>>, RecordingError> {
        let image = fit_within(frame, self.bounds).unwrap_or_else(|| frame.clone());
        self.encoder
            .encode_frame(image::Frame::from_parts(image, 0, 0, self.delay))
            .map_err(|e| RecordingError::EncodeFailed(format!("GIF frame: {}", e)))?;
        self.frames += 1;

        let chunk = self.buffer.drain();
        Ok(if chunk.is_empty() { Vec::new() } else { vec![chunk] })
    }

    fn finalize(self: Box<Self>) -> Result<Vec<Vec<u8>>, RecordingError> {
        let GifStream {
            encoder,
            buffer,
            frames,
            ..
        } = *self;
        // Dropping the encoder writes the trailer
        drop(encoder);
        debug!(frames, "GIF stream finalized");

        let tail = buffer.drain();
        Ok(if tail.is_empty() { Vec::new() } else { vec![tail] })
    }
}
