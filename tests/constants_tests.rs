// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for constants module

use std::time::Duration;
use woodglass::constants::{BitratePreset, ResolutionTier, format_elapsed, get_resolution_tier};

#[test]
fn test_bitrate_preset_values() {
    // Test that all presets exist (Low, Medium, High)
    assert_eq!(BitratePreset::ALL.len(), 3);
}

#[test]
fn test_bitrate_preset_ordering() {
    // Test that presets are ordered from lowest to highest quality
    let mut prev_bitrate = 0u32;
    let mut prev_quality = 0u8;
    for preset in BitratePreset::ALL {
        let bitrate = preset.bitrate_kbps(1920, 1080);
        assert!(
            bitrate >= prev_bitrate,
            "Presets should be ordered from lowest to highest"
        );
        assert!(preset.jpeg_quality() > prev_quality);
        prev_bitrate = bitrate;
        prev_quality = preset.jpeg_quality();
    }
}

#[test]
fn test_bitrate_scales_with_resolution() {
    // Higher resolution should have higher bitrate at same preset
    let sd_bitrate = BitratePreset::Medium.bitrate_kbps(640, 480);
    let hd_bitrate = BitratePreset::Medium.bitrate_kbps(1280, 720);
    let fhd_bitrate = BitratePreset::Medium.bitrate_kbps(1920, 1080);

    assert!(sd_bitrate < hd_bitrate);
    assert!(hd_bitrate < fhd_bitrate);
}

#[test]
fn test_resolution_tiers() {
    assert_eq!(get_resolution_tier(640), ResolutionTier::SD);
    assert_eq!(get_resolution_tier(1280), ResolutionTier::HD);
    assert_eq!(get_resolution_tier(3840), ResolutionTier::FullHD);
}

#[test]
fn test_bitrate_preset_display_names() {
    // Test that all presets have non-empty display names
    for preset in BitratePreset::ALL {
        assert!(!preset.display_name().is_empty());
    }
}

#[test]
fn test_elapsed_label() {
    assert_eq!(format_elapsed(Duration::from_millis(12_345)), "12.3s");
    assert_eq!(format_elapsed(Duration::from_millis(999)), "0.9s");
}
