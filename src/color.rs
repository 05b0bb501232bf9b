//! Shared color-space math over packed 8-bit RGB values: the perceptually
//! weighted distance the clustering engine runs on, CIELAB chroma, WCAG
//! relative luminance, luma gray, and the HSL/HSV edits the derivation and
//! adjustment stages apply.

use image::Rgb;
use palette::{FromColor, Hsl, IntoColor, Lab, Srgb};

use crate::settings;

/// Whether a palette needs a light or a dark foreground to stay readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Brightness {
    /// The palette is dark; pair it with light foreground colors.
    Dark,
    /// The palette is light; pair it with dark foreground colors.
    Light,
}

/// Redmean-style perceptually weighted squared RGB distance.
///
/// Cheaper than CIEDE2000 by a long way and good enough for clustering. The
/// branch is on the signed red difference, matching the tuning of
/// [`settings::MIN_SQUARE_DISTANCE`].
pub(crate) fn square_distance(a: Rgb<u8>, b: Rgb<u8>) -> i64 {
    let dr = i64::from(a[0]) - i64::from(b[0]);
    let dg = i64::from(a[1]) - i64::from(b[1]);
    let db = i64::from(a[2]) - i64::from(b[2]);
    if dr < 128 {
        2 * dr * dr + 4 * dg * dg + 3 * db * db
    } else {
        3 * dr * dr + 4 * dg * dg + 2 * db * db
    }
}

/// CIELAB chroma (`sqrt(a² + b²)`, D65 white point): colorfulness
/// independent of lightness.
pub(crate) fn chroma(color: Rgb<u8>) -> f32 {
    let lab: Lab = Srgb::new(color[0], color[1], color[2])
        .into_linear()
        .into_color();
    (lab.a * lab.a + lab.b * lab.b).sqrt()
}

/// WCAG relative luminance: linearized sRGB weighted 0.2126/0.7152/0.0722.
pub(crate) fn luminance(color: Rgb<u8>) -> f32 {
    let linear = srgb(color).into_linear();
    0.2126 * linear.red + 0.7152 * linear.green + 0.0722 * linear.blue
}

/// Integer luma gray on a 0–255 scale, `(11 R + 16 G + 5 B) / 32`.
pub(crate) fn gray(color: Rgb<u8>) -> u8 {
    ((11 * u32::from(color[0]) + 16 * u32::from(color[1]) + 5 * u32::from(color[2])) / 32) as u8
}

/// Photometric inverse with its HSL lightness mirrored about mid, so a
/// mid-lightness color still gets a usable contrast seed.
pub(crate) fn mirrored_inverse(color: Rgb<u8>) -> Rgb<u8> {
    let inverse = Rgb([255 - color[0], 255 - color[1], 255 - color[2]]);
    let mut hsl = Hsl::from_color(srgb(inverse));
    hsl.lightness = (0.5 + (0.5 - hsl.lightness)).clamp(0.0, 1.0);
    from_srgb(Srgb::from_color(hsl))
}

/// Push a color's HSL lightness further away from mid by `amount`.
pub(crate) fn push_from_mid(color: Rgb<u8>, amount: f32) -> Rgb<u8> {
    let mut hsl = Hsl::from_color(srgb(color));
    hsl.lightness = if hsl.lightness > 0.5 {
        (hsl.lightness + amount).min(1.0)
    } else {
        (hsl.lightness - amount).max(0.0)
    };
    from_srgb(Srgb::from_color(hsl))
}

/// Snap a near-useless near-white extreme to a fixed light gray.
pub(crate) fn snap_near_white(color: Rgb<u8>) -> Rgb<u8> {
    if gray(color) < settings::WHITE_SNAP_GRAY {
        settings::NEAR_WHITE
    } else {
        color
    }
}

/// Snap a near-useless near-black extreme to a fixed dark gray.
pub(crate) fn snap_near_black(color: Rgb<u8>) -> Rgb<u8> {
    if gray(color) > settings::BLACK_SNAP_GRAY {
        settings::NEAR_BLACK
    } else {
        color
    }
}

pub(crate) fn srgb(color: Rgb<u8>) -> Srgb<f32> {
    Srgb::new(color[0], color[1], color[2]).into_format()
}

pub(crate) fn from_srgb(color: Srgb<f32>) -> Rgb<u8> {
    let quantized: Srgb<u8> = color.into_format();
    Rgb([quantized.red, quantized.green, quantized.blue])
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
    const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
    const RED: Rgb<u8> = Rgb([255, 0, 0]);

    #[test]
    fn distance_to_self_is_zero() {
        assert_eq!(square_distance(RED, RED), 0);
    }

    #[test]
    fn distance_reweights_on_large_red_difference() {
        // dr = 255 takes the (3, 4, 2) branch, dr = -255 the (2, 4, 3) one.
        assert_eq!(square_distance(RED, BLACK), 3 * 255 * 255);
        assert_eq!(square_distance(BLACK, RED), 2 * 255 * 255);
    }

    #[test]
    fn gray_spans_full_range() {
        assert_eq!(gray(BLACK), 0);
        assert_eq!(gray(WHITE), 255);
        assert_eq!(gray(Rgb([0, 255, 0])), 127);
    }

    #[test]
    fn chroma_of_gray_is_negligible() {
        assert!(chroma(Rgb([128, 128, 128])) < 1.0);
        assert!(chroma(WHITE) < 1.0);
    }

    #[test]
    fn chroma_of_primaries_is_large() {
        assert!(chroma(RED) > 100.0, "red chroma: {}", chroma(RED));
        assert!(chroma(Rgb([0, 0, 255])) > 100.0);
    }

    #[test]
    fn luminance_endpoints() {
        assert!(luminance(BLACK) < 0.001);
        assert!((luminance(WHITE) - 1.0).abs() < 0.001);
    }

    #[test]
    fn mirrored_inverse_keeps_mid_lightness() {
        // Inverse of pure red is cyan at lightness 0.5; mirroring is a no-op.
        assert_eq!(mirrored_inverse(RED), Rgb([0, 255, 255]));
    }

    #[test]
    fn mirrored_inverse_of_black_stays_dark() {
        // The naive inverse (white) mirrors back to the bottom of the scale;
        // the nearest-palette search downstream is what rescues this case.
        assert_eq!(gray(mirrored_inverse(BLACK)), 0);
    }

    #[test]
    fn extreme_snapping() {
        assert_eq!(snap_near_white(Rgb([120, 120, 120])), settings::NEAR_WHITE);
        assert_eq!(snap_near_white(Rgb([210, 210, 210])), Rgb([210, 210, 210]));
        assert_eq!(snap_near_black(Rgb([120, 120, 120])), settings::NEAR_BLACK);
        assert_eq!(snap_near_black(Rgb([10, 10, 10])), Rgb([10, 10, 10]));
    }
}
