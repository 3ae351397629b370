// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Recording quality presets
///
/// Encoding backends receive a target bitrate through `StreamSettings`; the built-in image
/// sequence streams use the JPEG quality and GIF quantizer speed instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BitratePreset {
    /// Low bitrate - smaller files, reduced quality
    Low,
    /// Medium bitrate - balanced quality and file size (default)
    #[default]
    Medium,
    /// High bitrate - larger files, better quality
    High,
}

impl BitratePreset {
    /// Get all preset variants for UI iteration
    pub const ALL: [BitratePreset; 3] = [
        BitratePreset::Low,
        BitratePreset::Medium,
        BitratePreset::High,
    ];

    /// Get display name for the preset
    pub fn display_name(&self) -> &'static str {
        match self {
            BitratePreset::Low => "Low",
            BitratePreset::Medium => "Medium",
            BitratePreset::High => "High",
        }
    }

    /// Get bitrate in kbps for a given resolution
    ///
    /// - SD (640x480 and below): Low=1, Medium=2, High=4 Mbps
    /// - HD (1280x720): Low=2.5, Medium=5, High=10 Mbps
    /// - Full HD (1920x1080 and above): Low=4, Medium=8, High=16 Mbps
    pub fn bitrate_kbps(&self, width: u32, _height: u32) -> u32 {
        match (get_resolution_tier(width), self) {
            (ResolutionTier::SD, BitratePreset::Low) => 1_000,
            (ResolutionTier::SD, BitratePreset::Medium) => 2_000,
            (ResolutionTier::SD, BitratePreset::High) => 4_000,
            (ResolutionTier::HD, BitratePreset::Low) => 2_500,
            (ResolutionTier::HD, BitratePreset::Medium) => 5_000,
            (ResolutionTier::HD, BitratePreset::High) => 10_000,
            (ResolutionTier::FullHD, BitratePreset::Low) => 4_000,
            (ResolutionTier::FullHD, BitratePreset::Medium) => 8_000,
            (ResolutionTier::FullHD, BitratePreset::High) => 16_000,
        }
    }

    /// JPEG quality (0-100) for Motion-JPEG clips
    pub fn jpeg_quality(&self) -> u8 {
        match self {
            BitratePreset::Low => 60,
            BitratePreset::Medium => 80,
            BitratePreset::High => 92,
        }
    }

    /// NeuQuant speed (1 = best, 30 = fastest) for GIF clips
    pub fn gif_speed(&self) -> i32 {
        match self {
            BitratePreset::Low => 30,
            BitratePreset::Medium => 20,
            BitratePreset::High => 10,
        }
    }
}

/// Resolution tiers for bitrate calculation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionTier {
    /// SD: 640x480 and below
    SD,
    /// HD: 1280x720
    HD,
    /// Full HD: 1920x1080 and above
    FullHD,
}

/// Get the resolution tier for a given width
pub fn get_resolution_tier(width: u32) -> ResolutionTier {
    match width {
        w if w >= 1920 => ResolutionTier::FullHD,
        w if w >= 1280 => ResolutionTier::HD,
        _ => ResolutionTier::SD,
    }
}

/// Wood's glass transmission model
pub mod filter {
    /// Red channel transmission
    pub const RED_TRANSMISSION: f32 = 0.25;
    /// Green channel transmission
    pub const GREEN_TRANSMISSION: f32 = 0.05;
    /// Blue channel transmission
    pub const BLUE_TRANSMISSION: f32 = 0.95;
    /// Overall darkening of the glass
    pub const DARKENING: f32 = 0.55;
    /// Share of red that leaks into blue (violet cast)
    pub const VIOLET_MIX: f32 = 0.18;
    /// Contrast stretch around [`MIDPOINT`]
    pub const CONTRAST: f32 = 1.2;
    /// Contrast pivot
    pub const MIDPOINT: f32 = 128.0;
    /// Default blend between original and filtered pixels
    pub const DEFAULT_INTENSITY: f32 = 0.85;
}

/// Frame loop timing
pub mod render {
    /// Surface size used while the source cannot report its dimensions
    pub const DEFAULT_WIDTH: u32 = 1280;
    /// Surface size used while the source cannot report its dimensions
    pub const DEFAULT_HEIGHT: u32 = 720;
    /// Display refresh cadence in Hz
    pub const DEFAULT_REFRESH_RATE: u32 = 60;
}

/// Recording session limits
pub mod recording {
    use super::Duration;

    /// Hard upper bound on session length in milliseconds
    pub const MAX_DURATION_MS: u64 = 30_000;
    /// Surface sampling rate for the encoding stream
    pub const SAMPLE_FPS: u32 = 24;
    /// Elapsed-time display refresh in milliseconds
    pub const UI_TICK_MS: u64 = 100;

    /// [`MAX_DURATION_MS`] as a Duration
    pub const MAX_DURATION: Duration = Duration::from_millis(MAX_DURATION_MS);
}

/// Watermark band geometry
pub mod watermark {
    /// Top band height as a share of the surface height
    pub const TOP_BAND_RATIO: f32 = 0.06;
    /// Bottom band height as a share of the surface height
    pub const BOTTOM_BAND_RATIO: f32 = 0.05;
    /// Minimum top band height in pixels
    pub const TOP_BAND_MIN: u32 = 60;
    /// Minimum bottom band height in pixels
    pub const BOTTOM_BAND_MIN: u32 = 50;
    /// Bands never exceed this share of the height, so they cannot overlap
    pub const MAX_BAND_DIVISOR: u32 = 3;
    /// Height of the glow gradient on each band's inner edge
    pub const GLOW_PX: u32 = 4;
    /// Band fill opacity
    pub const FILL_ALPHA: f32 = 0.6;
    /// Band fill color
    pub const FILL_RGB: [u8; 3] = [0, 0, 0];
    /// Glow color (violet)
    pub const GLOW_RGB: [u8; 3] = [148, 87, 235];
    /// Glow opacity at the band edge, fading to zero over [`GLOW_PX`]
    pub const GLOW_ALPHA: f32 = 0.8;
    /// Horizontal padding kept free of text on each side
    pub const TEXT_MARGIN_PX: u32 = 8;
    /// Label text color
    pub const TEXT_RGB: [u8; 3] = [236, 226, 255];
    /// Label drawn in the top band
    pub const TOP_LABEL: &str = "WOOD'S GLASS";
    /// Branding drawn in the bottom band
    pub const BRANDING: &str = "SHOT WITH WOODGLASS";
}

/// Artifact naming and sharing
pub mod share {
    /// Prefix for every exported file name
    pub const FILE_PREFIX: &str = "woodglass";
    /// Promotional text used by native and app-level share
    pub const PROMO_TEXT: &str = "I looked at the world through Wood's glass. Try it yourself:";
    /// Canonical application URL
    pub const APP_URL: &str = "https://woodglass.app";
    /// Social intent endpoint for the app-level share fallback
    pub const SOCIAL_INTENT_URL: &str = "https://twitter.com/intent/tweet";
}

/// Format an elapsed recording time as whole seconds plus one truncated decile
///
/// `12_345ms` becomes `"12.3s"`.
pub fn format_elapsed(elapsed: Duration) -> String {
    let millis = elapsed.as_millis();
    format!("{}.{}s", millis / 1000, (millis % 1000) / 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_elapsed_truncates() {
        assert_eq!(format_elapsed(Duration::from_millis(0)), "0.0s");
        assert_eq!(format_elapsed(Duration::from_millis(12_399)), "12.3s");
        assert_eq!(format_elapsed(Duration::from_millis(29_999)), "29.9s");
        assert_eq!(format_elapsed(Duration::from_millis(30_000)), "30.0s");
    }

    #[test]
    fn test_band_minimums_fit_default_surface() {
        assert!(watermark::TOP_BAND_MIN * watermark::MAX_BAND_DIVISOR <= render::DEFAULT_HEIGHT);
    }
}
