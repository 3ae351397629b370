// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for the Wood's glass color transform

use woodglass::pipelines::filter;

fn gradient() -> Vec<u8> {
    (0..64u32)
        .flat_map(|i| {
            let v = (i * 4) as u8;
            [v, v.wrapping_mul(3), 255 - v, 255]
        })
        .collect()
}

#[test]
fn test_zero_intensity_leaves_frame_unchanged() {
    let mut pixels = gradient();
    let original = pixels.clone();
    filter::transform(&mut pixels, 0.0);
    assert_eq!(pixels, original);
}

#[test]
fn test_reference_values() {
    let mut px = [200u8, 150, 100, 255, 255, 255, 255, 255];
    filter::transform(&mut px[..4], 0.85);
    filter::transform(&mut px[4..], 1.0);
    assert_eq!(px, [36, 5, 67, 255, 16, 0, 165, 255]);
}

#[test]
fn test_transform_is_deterministic() {
    let mut a = gradient();
    let mut b = gradient();
    filter::transform(&mut a, 0.6);
    filter::transform(&mut b, 0.6);
    assert_eq!(a, b);
}

#[test]
fn test_alpha_is_preserved() {
    let mut pixels: Vec<u8> = (0..=255u8).flat_map(|a| [120, 80, 40, a]).collect();
    filter::transform(&mut pixels, 1.0);
    for (i, px) in pixels.chunks_exact(4).enumerate() {
        assert_eq!(px[3] as usize, i);
    }
}

#[test]
fn test_full_filter_favors_blue() {
    // Mid grey comes out with blue well above red and green
    let mut px = [128u8, 128, 128, 255];
    filter::transform(&mut px, 1.0);
    assert!(px[2] > px[0]);
    assert!(px[0] >= px[1]);
}

#[test]
fn test_full_intensity_matches_filtered_channels() {
    let to_byte = |v: f32| v.round().clamp(0.0, 255.0) as u8;
    for r in (0..=255u8).step_by(15) {
        for g in (0..=255u8).step_by(15) {
            for b in (0..=255u8).step_by(15) {
                let (fr, fg, fb) = filter::filtered_channels(r, g, b);
                let mut px = [r, g, b, 255];
                filter::transform(&mut px, 1.0);
                assert_eq!(
                    px,
                    [to_byte(fr), to_byte(fg), to_byte(fb), 255],
                    "input ({r}, {g}, {b})"
                );
            }
        }
    }
}
