//! Tuning constants for sampling, clustering, ranking and contrast
//! adjustment. Everything here is a tuned magic number, collected in one
//! place so the pipeline code stays free of bare literals.

use image::Rgb;

/// CIELAB chroma below which a pixel is considered too close to gray to be
/// worth sampling.
pub const MIN_SAMPLE_CHROMA: f32 = 20.0;

/// Squared redmean distance under which two colors belong to the same
/// cluster.
pub const MIN_SQUARE_DISTANCE: i64 = 32_000;

/// A contrast color candidate within this distance of the naive inverse is
/// used as-is (1.5 × [`MIN_SQUARE_DISTANCE`]).
pub const CONTRAST_MATCH_DISTANCE: i64 = 48_000;

/// Upper bound used to seed the nearest-centroid contrast search; larger
/// than any reachable squared redmean distance.
pub const CONTRAST_SEARCH_START: i64 = 4_681_800;

/// How far a contrast color's HSL lightness is pushed away from mid when the
/// nearest palette match is not close enough to the naive inverse
/// (20 levels on a 0–255 scale).
pub const CONTRAST_LIGHTNESS_NUDGE: f32 = 20.0 / 255.0;

/// Number of centroid-recomputation rounds run after the initial greedy
/// assignment.
pub const REFINEMENT_ROUNDS: usize = 5;

/// Sample count below which the assignment pass always runs on one thread
/// (256²; partitioning smaller inputs costs more than it saves).
pub const PARALLEL_MIN_SAMPLES: usize = 65_536;

/// Cap on the number of assignment workers, regardless of core count.
pub const MAX_WORKERS: usize = 8;

/// Edge length requested from a snapshot provider.
pub const SNAPSHOT_SIZE: u32 = 128;

/// Palettes with at most this many clusters get a fixed near-black or
/// near-white contrast color instead of a palette match.
pub const SMALL_PALETTE_MAX: usize = 3;

/// Gray split deciding between the fixed near-white and near-black contrast
/// colors for small palettes.
pub const SMALL_PALETTE_GRAY_SPLIT: u8 = 120;

/// Dominant-color gray level below which the palette is classified as dark.
pub const DARK_DOMINANT_GRAY: u8 = 128;

/// A closest-to-white color with a gray level under this snaps to
/// [`NEAR_WHITE`] in the public accessors.
pub const WHITE_SNAP_GRAY: u8 = 200;

/// A closest-to-black color with a gray level over this snaps to
/// [`NEAR_BLACK`] in the public accessors.
pub const BLACK_SNAP_GRAY: u8 = 80;

/// Stand-in for a useless near-white extreme.
pub const NEAR_WHITE: Rgb<u8> = Rgb([230, 230, 230]);

/// Stand-in for a useless near-black extreme.
pub const NEAR_BLACK: Rgb<u8> = Rgb([20, 20, 20]);

/// Background gray level at which a theme counts as light.
pub const LIGHT_BACKGROUND_GRAY: u8 = 192;

/// WCAG contrast ratio required for non-text elements.
pub const WCAG_NON_TEXT_CONTRAST: f32 = 3.0;

/// WCAG contrast ratio required for text.
pub const WCAG_TEXT_CONTRAST: f32 = 4.5;

/// Upper luminance bound applied on dark backgrounds.
pub const DARK_UPPER_LUMINANCE: f32 = 0.95;

/// HSV saturation floor applied to derived colors before the lightness
/// search.
pub const SATURATION_FLOOR: f32 = 0.5;

/// Per-iteration HSL lightness step of the luminance fitting loop.
pub const LIGHTNESS_STEP: f32 = 0.03;

/// Iteration budget shared by both directions of the luminance fitting
/// loop; it converges to "close enough", not to an exact bound.
pub const MAX_LIGHTNESS_STEPS: u32 = 10;
