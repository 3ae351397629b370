// SPDX-License-Identifier: GPL-3.0-only

//! Still image camera source
//!
//! Serves a decoded image file as an endless feed. Useful for batch photo
//! runs from the command line and for reproducible recordings.

use super::{CameraSource, Facing, Frame};
use crate::errors::CameraError;
use std::path::Path;
use tracing::{debug, info};

pub struct StillImageSource {
    name: String,
    back: Frame,
    front: Option<Frame>,
    facing: Facing,
}

impl StillImageSource {
    /// Decode the back image and, if given, the front image
    pub fn open(back: &Path, front: Option<&Path>) -> Result<Self, CameraError> {
        let back_frame = load_frame(back)?;
        let front_frame = front.map(load_frame).transpose()?;

        info!(
            path = %back.display(),
            width = back_frame.width,
            height = back_frame.height,
            has_front = front_frame.is_some(),
            "Opened still image source"
        );

        Ok(Self {
            name: back
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "Still image".to_string()),
            back: back_frame,
            front: front_frame,
            facing: Facing::Back,
        })
    }

    fn active(&self) -> &Frame {
        match (self.facing, &self.front) {
            (Facing::Front, Some(front)) => front,
            _ => &self.back,
        }
    }
}

fn load_frame(path: &Path) -> Result<Frame, CameraError> {
    let image = image::open(path).map_err(|e| {
        CameraError::DeviceUnavailable(format!("cannot open {}: {}", path.display(), e))
    })?;
    Ok(Frame::from_image(image.to_rgba8()))
}

impl CameraSource for StillImageSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn dimensions(&self) -> Option<(u32, u32)> {
        let frame = self.active();
        Some((frame.width, frame.height))
    }

    fn current_frame(&mut self) -> Option<Frame> {
        let mut frame = self.active().clone();
        frame.captured_at = std::time::Instant::now();
        Some(frame)
    }

    fn facing(&self) -> Facing {
        self.facing
    }

    fn switch_facing(&mut self, facing: Facing) -> Result<(), CameraError> {
        if facing == Facing::Front && self.front.is_none() {
            return Err(CameraError::FacingUnavailable(facing.as_str()));
        }
        debug!(%facing, "Still image source switched");
        self.facing = facing;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn test_open_and_switch() {
        let dir = tempfile::tempdir().unwrap();
        let back = dir.path().join("back.png");
        let front = dir.path().join("front.png");
        RgbaImage::from_pixel(4, 3, Rgba([10, 20, 30, 255]))
            .save(&back)
            .unwrap();
        RgbaImage::from_pixel(2, 2, Rgba([200, 0, 0, 255]))
            .save(&front)
            .unwrap();

        let mut source = StillImageSource::open(&back, Some(&front)).unwrap();
        assert_eq!(source.dimensions(), Some((4, 3)));
        source.switch_facing(Facing::Front).unwrap();
        assert_eq!(source.dimensions(), Some((2, 2)));
        assert_eq!(&source.current_frame().unwrap().data[..4], &[200, 0, 0, 255]);
    }

    #[test]
    fn test_front_missing() {
        let dir = tempfile::tempdir().unwrap();
        let back = dir.path().join("back.png");
        RgbaImage::new(2, 2).save(&back).unwrap();

        let mut source = StillImageSource::open(&back, None).unwrap();
        assert_eq!(
            source.switch_facing(Facing::Front),
            Err(CameraError::FacingUnavailable("front"))
        );
        assert_eq!(source.facing(), Facing::Back);
    }
}
