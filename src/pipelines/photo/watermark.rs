// SPDX-License-Identifier: GPL-3.0-only

//! Watermark compositor for captured stills
//!
//! Draws two translucent bands over the image: a top band carrying the
//! filter label and a bottom band carrying the branding line. Each band gets
//! a violet glow along its inner edge. Layout depends only on the image size,
//! and pixels outside the bands are never written.

use std::ops::Range;

use image::RgbaImage;
use tracing::debug;

use super::font::{self, GLYPH_HEIGHT, TextStyle};
use crate::constants::watermark::{
    BOTTOM_BAND_MIN, BOTTOM_BAND_RATIO, BRANDING, FILL_ALPHA, FILL_RGB, GLOW_ALPHA, GLOW_PX,
    GLOW_RGB, MAX_BAND_DIVISOR, TEXT_MARGIN_PX, TEXT_RGB, TOP_BAND_MIN, TOP_BAND_RATIO,
    TOP_LABEL,
};

/// Share of the band height used by the top label glyphs
const LABEL_HEIGHT_SHARE: f32 = 0.5;
/// Share of the band height used by the branding glyphs
const BRANDING_HEIGHT_SHARE: f32 = 0.4;

/// Band geometry for one surface size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatermarkLayout {
    pub width: u32,
    pub height: u32,
    pub top_band: u32,
    pub bottom_band: u32,
}

impl WatermarkLayout {
    pub fn for_surface(width: u32, height: u32) -> Self {
        let cap = height / MAX_BAND_DIVISOR;
        let band = |ratio: f32, min: u32| ((height as f32 * ratio).round() as u32).max(min).min(cap);

        Self {
            width,
            height,
            top_band: band(TOP_BAND_RATIO, TOP_BAND_MIN),
            bottom_band: band(BOTTOM_BAND_RATIO, BOTTOM_BAND_MIN),
        }
    }

    pub fn top_rows(&self) -> Range<u32> {
        0..self.top_band
    }

    pub fn bottom_rows(&self) -> Range<u32> {
        self.height - self.bottom_band..self.height
    }

    /// Whether a row is inside either band
    pub fn covers_row(&self, y: u32) -> bool {
        self.top_rows().contains(&y) || self.bottom_rows().contains(&y)
    }
}

/// Composite the watermark onto `image` in place
pub fn apply(image: &mut RgbaImage) {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return;
    }

    let layout = WatermarkLayout::for_surface(width, height);
    debug!(?layout, "Applying watermark");

    let top = layout.top_rows();
    let bottom = layout.bottom_rows();

    fill_band(image, top.clone());
    fill_band(image, bottom.clone());

    // Inner edge: bottom of the top band, top of the bottom band
    glow(image, top.clone(), top.clone().rev());
    glow(image, bottom.clone(), bottom.clone());

    draw_centered(image, top, TOP_LABEL, LABEL_HEIGHT_SHARE, true);
    draw_centered(image, bottom, BRANDING, BRANDING_HEIGHT_SHARE, false);
}

fn blend_channel(base: u8, over: u8, alpha: f32) -> u8 {
    (base as f32 * (1.0 - alpha) + over as f32 * alpha)
        .round()
        .clamp(0.0, 255.0) as u8
}

fn blend_row(image: &mut RgbaImage, y: u32, rgb: [u8; 3], alpha: f32) {
    for x in 0..image.width() {
        let px = image.get_pixel_mut(x, y);
        for c in 0..3 {
            px[c] = blend_channel(px[c], rgb[c], alpha);
        }
    }
}

fn fill_band(image: &mut RgbaImage, rows: Range<u32>) {
    for y in rows {
        blend_row(image, y, FILL_RGB, FILL_ALPHA);
    }
}

/// Violet gradient over the first `GLOW_PX` rows yielded by `from_edge`
fn glow(image: &mut RgbaImage, band: Range<u32>, from_edge: impl Iterator<Item = u32>) {
    for (i, y) in from_edge.take(GLOW_PX as usize).enumerate() {
        if !band.contains(&y) {
            break;
        }
        let alpha = GLOW_ALPHA * (1.0 - i as f32 / GLOW_PX as f32);
        blend_row(image, y, GLOW_RGB, alpha);
    }
}

fn draw_centered(image: &mut RgbaImage, rows: Range<u32>, text: &str, share: f32, bold: bool) {
    let band_height = rows.end - rows.start;
    let scale = ((band_height as f32 * share) / GLYPH_HEIGHT as f32).floor() as u32;
    let style = TextStyle {
        scale: scale.max(1),
        bold,
        color: TEXT_RGB,
    };

    let available = image.width().saturating_sub(2 * TEXT_MARGIN_PX);
    let text = font::fit(text, &style, available);
    if text.is_empty() {
        return;
    }

    let text_width = style.width_of(text.chars().count());
    let x = (image.width() - text_width) / 2;
    let y = rows.start + band_height.saturating_sub(style.height()) / 2;

    font::draw_text(image, x, y, &text, &style, rows);
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_layout_minimums() {
        let layout = WatermarkLayout::for_surface(1280, 720);
        // 0.06 * 720 = 43.2 -> min 60; 0.05 * 720 = 36 -> min 50
        assert_eq!(layout.top_band, 60);
        assert_eq!(layout.bottom_band, 50);
    }

    #[test]
    fn test_layout_ratios() {
        let layout = WatermarkLayout::for_surface(3840, 2160);
        assert_eq!(layout.top_band, 130);
        assert_eq!(layout.bottom_band, 108);
        assert_eq!(layout.bottom_rows(), 2052..2160);
    }

    #[test]
    fn test_layout_capped_on_small_surface() {
        let layout = WatermarkLayout::for_surface(100, 100);
        assert_eq!(layout.top_band, 33);
        assert_eq!(layout.bottom_band, 33);
        assert!(!layout.covers_row(33));
        assert!(!layout.covers_row(66));
        assert!(layout.covers_row(67));
    }

    #[test]
    fn test_apply_touches_only_bands() {
        let original = RgbaImage::from_pixel(200, 300, Rgba([120, 200, 40, 255]));
        let mut image = original.clone();
        apply(&mut image);

        let layout = WatermarkLayout::for_surface(200, 300);
        for y in 0..300 {
            let row_changed = (0..200).any(|x| image.get_pixel(x, y) != original.get_pixel(x, y));
            assert_eq!(row_changed, layout.covers_row(y), "row {y}");
        }
    }

    #[test]
    fn test_band_is_darkened_and_glows() {
        let mut image = RgbaImage::from_pixel(400, 400, Rgba([200, 200, 200, 255]));
        apply(&mut image);

        // Corner pixel: plain fill, 200 * 0.4
        assert_eq!(image.get_pixel(0, 0), &Rgba([80, 80, 80, 255]));
        // Inner edge row of the top band carries the strongest glow
        let edge = image.get_pixel(0, 59);
        assert!(edge[2] > edge[1]);
        assert_eq!(edge[3], 255);
    }

    #[test]
    fn test_empty_image_is_noop() {
        let mut image = RgbaImage::new(0, 0);
        apply(&mut image);
        assert_eq!(image.dimensions(), (0, 0));
    }
}
