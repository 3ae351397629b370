// SPDX-License-Identifier: GPL-3.0-only

//! Synthetic camera source
//!
//! Produces an animated color chart so the pipeline can run without camera
//! hardware. The back camera shows saturated color bars, the front camera a
//! warm gradient, and a bright bar sweeps across both so motion is visible in
//! recordings.

use super::{CameraSource, Facing, Frame};
use crate::errors::CameraError;
use tracing::debug;

/// Color bars for the back camera
const BARS: [[u8; 3]; 7] = [
    [235, 235, 235],
    [235, 235, 16],
    [16, 235, 235],
    [16, 235, 16],
    [235, 16, 235],
    [235, 16, 16],
    [16, 16, 235],
];

/// Width of the sweeping bar as a share of the frame width
const SWEEP_WIDTH_DIVISOR: u32 = 12;

pub struct TestPatternSource {
    width: u32,
    height: u32,
    facing: Facing,
    frame_index: u64,
    warmup_remaining: u32,
}

impl TestPatternSource {
    pub fn new(width: u32, height: u32, facing: Facing) -> Result<Self, CameraError> {
        if width == 0 || height == 0 {
            return Err(CameraError::DeviceUnavailable(format!(
                "invalid test pattern size {}x{}",
                width, height
            )));
        }

        Ok(Self {
            width,
            height,
            facing,
            frame_index: 0,
            warmup_remaining: 0,
        })
    }

    /// Report "not ready" for the first `frames` reads, like a camera warming up
    pub fn with_warmup(mut self, frames: u32) -> Self {
        self.warmup_remaining = frames;
        self
    }

    fn render(&self) -> Vec<u8> {
        let (w, h) = (self.width, self.height);
        let sweep_width = (w / SWEEP_WIDTH_DIVISOR).max(1);
        let sweep_x = (self.frame_index * 4 % w as u64) as u32;
        let mut data = Vec::with_capacity(w as usize * h as usize * 4);

        for y in 0..h {
            for x in 0..w {
                let [r, g, b] = match self.facing {
                    Facing::Back => {
                        let bar = (x as usize * BARS.len()) / w as usize;
                        BARS[bar.min(BARS.len() - 1)]
                    }
                    Facing::Front => {
                        let t = x as f32 / w as f32;
                        let v = y as f32 / h as f32;
                        [
                            (180.0 + 60.0 * t) as u8,
                            (120.0 + 60.0 * v) as u8,
                            (90.0 + 40.0 * (1.0 - t)) as u8,
                        ]
                    }
                };

                let in_sweep = x >= sweep_x && x < sweep_x.saturating_add(sweep_width);
                if in_sweep {
                    data.extend_from_slice(&[255, 255, 255, 255]);
                } else {
                    data.extend_from_slice(&[r, g, b, 255]);
                }
            }
        }

        data
    }
}

impl CameraSource for TestPatternSource {
    fn name(&self) -> &str {
        "Test pattern"
    }

    fn dimensions(&self) -> Option<(u32, u32)> {
        Some((self.width, self.height))
    }

    fn current_frame(&mut self) -> Option<Frame> {
        if self.warmup_remaining > 0 {
            self.warmup_remaining -= 1;
            return None;
        }

        let data = self.render();
        self.frame_index = self.frame_index.wrapping_add(1);
        Frame::from_rgba(self.width, self.height, data).ok()
    }

    fn facing(&self) -> Facing {
        self.facing
    }

    fn switch_facing(&mut self, facing: Facing) -> Result<(), CameraError> {
        debug!(%facing, "Restarting test pattern");
        self.facing = facing;
        self.frame_index = 0;
        Ok(())
    }
}
