//! Contrast-aware post-processing of the derived colors.
//!
//! The surrounding theme decides a target luminance band via the WCAG
//! contrast formula `(L1 + 0.05) / (L2 + 0.05)`; the dominant, highlight
//! and average colors are then saturated to a floor and walked toward that
//! band in fixed HSL lightness steps. Ten iterations of 0.03 get close
//! enough for theming; this is intentionally not an exact solver.

use image::Rgb;
use palette::{FromColor, Hsl, Hsv, Srgb};

use crate::color;
use crate::palette::Palette;
use crate::settings;

/// Read-only snapshot of the surrounding theme, taken at adjustment time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    /// The theme's window background color.
    pub background: Rgb<u8>,
    /// The theme's regular text color.
    pub text: Rgb<u8>,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: Rgb([252, 252, 252]),
            text: Rgb([35, 38, 41]),
        }
    }
}

pub(crate) fn post_process(palette: &mut Palette, theme: Theme) {
    if palette.is_empty() {
        return;
    }

    let background_luminance = color::luminance(theme.background);
    let (lower, upper) = if color::gray(theme.background) < settings::LIGHT_BACKGROUND_GRAY {
        // (lower + 0.05) / (background + 0.05) >= 3
        (
            settings::WCAG_NON_TEXT_CONTRAST * (background_luminance + 0.05) - 0.05,
            settings::DARK_UPPER_LUMINANCE,
        )
    } else {
        // On light themes, still prefer lighter colors:
        // (lower + 0.05) / (text + 0.05) >= 4.5
        let text_luminance = color::luminance(theme.text);
        (
            settings::WCAG_TEXT_CONTRAST * (text_luminance + 0.05) - 0.05,
            background_luminance,
        )
    };

    for derived in [
        &mut palette.dominant,
        &mut palette.highlight,
        &mut palette.average,
    ] {
        *derived = saturate(*derived);
        *derived = fit_luminance(*derived, lower, upper);
    }
}

/// Raise a washed-out color's HSV saturation to exactly the floor, leaving
/// hue and value untouched.
fn lift_saturation(mut hsv: Hsv) -> Hsv {
    if hsv.saturation < settings::SATURATION_FLOOR {
        hsv.saturation = settings::SATURATION_FLOOR;
    }
    hsv
}

fn saturate(derived: Rgb<u8>) -> Rgb<u8> {
    let lifted = lift_saturation(Hsv::from_color(color::srgb(derived)));
    color::from_srgb(Srgb::from_color(lifted))
}

/// Walk a color's HSL lightness into `[lower, upper]` luminance, one fixed
/// step per iteration. Hue, saturation and the base lightness are captured
/// once; both directions share a single iteration budget.
fn fit_luminance(derived: Rgb<u8>, lower: f32, upper: f32) -> Rgb<u8> {
    let base = Hsl::from_color(color::srgb(derived));
    let with_lightness = |lightness: f32| {
        color::from_srgb(Srgb::from_color(Hsl::new(
            base.hue,
            base.saturation,
            lightness,
        )))
    };

    let mut current = derived;
    let mut steps = 0;
    while color::luminance(current) < lower && steps < settings::MAX_LIGHTNESS_STEPS {
        steps += 1;
        current = with_lightness((base.lightness + steps as f32 * settings::LIGHTNESS_STEP).min(1.0));
    }
    while color::luminance(current) > upper && steps < settings::MAX_LIGHTNESS_STEPS {
        steps += 1;
        current = with_lightness((base.lightness - steps as f32 * settings::LIGHTNESS_STEP).max(0.0));
    }
    current
}
