// SPDX-License-Identifier: GPL-3.0-only

//! Built-in 5x7 bitmap font for watermark text
//!
//! Each glyph is seven rows of five bits, most significant bit on the left.
//! Lowercase letters render as uppercase; anything without a glyph renders
//! as `?`.

use image::{Rgba, RgbaImage};

pub const GLYPH_WIDTH: u32 = 5;
pub const GLYPH_HEIGHT: u32 = 7;
/// Blank columns between glyphs, before scaling
pub const GLYPH_SPACING: u32 = 1;

const UNKNOWN: [u8; 7] = [0x0E, 0x11, 0x01, 0x02, 0x04, 0x00, 0x04];

/// Bitmap rows for `c`
pub fn glyph(c: char) -> [u8; 7] {
    match c.to_ascii_uppercase() {
        'A' => [0x0E, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'B' => [0x1E, 0x11, 0x11, 0x1E, 0x11, 0x11, 0x1E],
        'C' => [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E],
        'D' => [0x1E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x1E],
        'E' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F],
        'F' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10],
        'G' => [0x0E, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0F],
        'H' => [0x11, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'I' => [0x0E, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E],
        'J' => [0x07, 0x02, 0x02, 0x02, 0x02, 0x12, 0x0C],
        'K' => [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11],
        'L' => [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F],
        'M' => [0x11, 0x1B, 0x15, 0x15, 0x11, 0x11, 0x11],
        'N' => [0x11, 0x11, 0x19, 0x15, 0x13, 0x11, 0x11],
        'O' => [0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'P' => [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10],
        'Q' => [0x0E, 0x11, 0x11, 0x11, 0x15, 0x12, 0x0D],
        'R' => [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11],
        'S' => [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E],
        'T' => [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04],
        'U' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'V' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x0A, 0x04],
        'W' => [0x11, 0x11, 0x11, 0x15, 0x15, 0x15, 0x0A],
        'X' => [0x11, 0x11, 0x0A, 0x04, 0x0A, 0x11, 0x11],
        'Y' => [0x11, 0x11, 0x11, 0x0A, 0x04, 0x04, 0x04],
        'Z' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x10, 0x1F],
        '0' => [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
        '1' => [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
        '2' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F],
        '3' => [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E],
        '4' => [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
        '5' => [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
        '6' => [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
        '7' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
        '8' => [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
        '9' => [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
        ' ' => [0; 7],
        '\'' => [0x04, 0x04, 0x08, 0x00, 0x00, 0x00, 0x00],
        '.' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C],
        ',' => [0x00, 0x00, 0x00, 0x00, 0x0C, 0x04, 0x08],
        '-' => [0x00, 0x00, 0x00, 0x1F, 0x00, 0x00, 0x00],
        ':' => [0x00, 0x0C, 0x0C, 0x00, 0x0C, 0x0C, 0x00],
        '!' => [0x04, 0x04, 0x04, 0x04, 0x04, 0x00, 0x04],
        _ => UNKNOWN,
    }
}

/// How to render a run of text
#[derive(Debug, Clone, Copy)]
pub struct TextStyle {
    /// Pixel size of one font dot
    pub scale: u32,
    /// Double-strike each glyph one dot to the right
    pub bold: bool,
    pub color: [u8; 3],
}

impl TextStyle {
    fn advance(&self) -> u32 {
        (GLYPH_WIDTH + GLYPH_SPACING) * self.scale
    }

    fn bold_extra(&self) -> u32 {
        if self.bold { self.scale } else { 0 }
    }

    /// Rendered width of `chars` glyphs
    pub fn width_of(&self, chars: usize) -> u32 {
        if chars == 0 {
            return 0;
        }
        chars as u32 * self.advance() - GLYPH_SPACING * self.scale + self.bold_extra()
    }

    pub fn height(&self) -> u32 {
        GLYPH_HEIGHT * self.scale
    }
}

/// Longest prefix of `text` that renders within `max_width`
pub fn fit(text: &str, style: &TextStyle, max_width: u32) -> String {
    let fitting = (0..=text.chars().count())
        .rev()
        .find(|&n| style.width_of(n) <= max_width)
        .unwrap_or(0);
    text.chars().take(fitting).collect::<String>().trim_end().to_string()
}

/// Draw `text` with its top-left corner at (`x`, `y`)
///
/// Dots falling outside `clip_rows` or the image are dropped.
pub fn draw_text(
    image: &mut RgbaImage,
    x: u32,
    y: u32,
    text: &str,
    style: &TextStyle,
    clip_rows: std::ops::Range<u32>,
) {
    let strikes: &[u32] = if style.bold { &[0, 1] } else { &[0] };
    let [r, g, b] = style.color;

    for (i, c) in text.chars().enumerate() {
        let origin_x = x + i as u32 * style.advance();
        for (row, bits) in glyph(c).iter().enumerate() {
            for col in 0..GLYPH_WIDTH {
                if bits & (0x10 >> col) == 0 {
                    continue;
                }
                for strike in strikes {
                    let dot_x = origin_x + (col + strike) * style.scale;
                    let dot_y = y + row as u32 * style.scale;
                    fill_dot(image, dot_x, dot_y, style.scale, &clip_rows, Rgba([r, g, b, 255]));
                }
            }
        }
    }
}

fn fill_dot(
    image: &mut RgbaImage,
    x: u32,
    y: u32,
    size: u32,
    clip_rows: &std::ops::Range<u32>,
    color: Rgba<u8>,
) {
    for py in y..y + size {
        if !clip_rows.contains(&py) || py >= image.height() {
            continue;
        }
        for px in x..(x + size).min(image.width()) {
            let alpha = image.get_pixel(px, py)[3];
            image.put_pixel(px, py, Rgba([color[0], color[1], color[2], alpha]));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercase_matches_uppercase() {
        assert_eq!(glyph('w'), glyph('W'));
        assert_eq!(glyph('~'), UNKNOWN);
    }

    #[test]
    fn test_width_of() {
        let style = TextStyle {
            scale: 2,
            bold: false,
            color: [255; 3],
        };
        assert_eq!(style.width_of(0), 0);
        assert_eq!(style.width_of(1), 10);
        assert_eq!(style.width_of(3), 34);
        let bold = TextStyle { bold: true, ..style };
        assert_eq!(bold.width_of(3), 36);
    }

    #[test]
    fn test_fit_truncates() {
        let style = TextStyle {
            scale: 1,
            bold: false,
            color: [255; 3],
        };
        assert_eq!(fit("HELLO", &style, 100), "HELLO");
        // Three glyphs need 17px
        assert_eq!(fit("HELLO", &style, 17), "HEL");
        assert_eq!(fit("HELLO", &style, 2), "");
    }

    #[test]
    fn test_draw_respects_clip() {
        let mut image = RgbaImage::new(10, 10);
        let style = TextStyle {
            scale: 1,
            bold: false,
            color: [255, 0, 0],
        };
        draw_text(&mut image, 0, 0, "H", &style, 0..3);
        // Left column of 'H' is set in rows 0-2 only
        assert_eq!(image.get_pixel(0, 0)[0], 255);
        assert_eq!(image.get_pixel(0, 2)[0], 255);
        assert_eq!(image.get_pixel(0, 3)[0], 0);
    }
}
