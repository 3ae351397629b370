// SPDX-License-Identifier: GPL-3.0-only

//! Wood's glass color transmission filter
//!
//! Approximates looking through nickel-oxide "Wood's glass": red and green
//! are mostly absorbed, blue passes, part of the red energy shows up as a
//! violet cast, and the whole image is darkened then contrast-stretched.
//!
//! The transform works in place on tightly packed RGBA bytes. Alpha is never
//! touched. `intensity` blends between the original (0.0) and the fully
//! filtered pixel (1.0); callers are responsible for keeping it in range.

use crate::constants::filter::{
    BLUE_TRANSMISSION, CONTRAST, DARKENING, GREEN_TRANSMISSION, MIDPOINT, RED_TRANSMISSION,
    VIOLET_MIX,
};

/// Apply the filter to every RGBA pixel of `pixels`
///
/// Trailing bytes that do not form a whole pixel are left as they are.
pub fn transform(pixels: &mut [u8], intensity: f32) {
    for px in pixels.chunks_exact_mut(4) {
        let (r, g, b) = (px[0], px[1], px[2]);
        let (fr, fg, fb) = filtered_channels(r, g, b);

        px[0] = blend(r, fr, intensity);
        px[1] = blend(g, fg, intensity);
        px[2] = blend(b, fb, intensity);
    }
}

/// Fully filtered, un-blended and unclamped channel values for one pixel
#[inline]
pub fn filtered_channels(r: u8, g: u8, b: u8) -> (f32, f32, f32) {
    let (r, g, b) = (r as f32, g as f32, b as f32);

    let fr = r * RED_TRANSMISSION * DARKENING;
    let fg = g * GREEN_TRANSMISSION * DARKENING;
    let fb = (b * BLUE_TRANSMISSION + r * VIOLET_MIX) * DARKENING;

    (stretch(fr), stretch(fg), stretch(fb))
}

#[inline]
fn stretch(value: f32) -> f32 {
    (value - MIDPOINT) * CONTRAST + MIDPOINT
}

#[inline]
fn blend(original: u8, filtered: f32, intensity: f32) -> u8 {
    let mixed = original as f32 * (1.0 - intensity) + filtered * intensity;
    mixed.round().clamp(0.0, 255.0) as u8
}
