//! Ranked palette extraction and the derived theming colors.
//!
//! [`Palette::generate`] runs the whole synchronous pipeline: sample,
//! cluster, rank by saliency, merge near-duplicates, then derive the named
//! colors and a contrast partner for every swatch.

use std::fmt;

use image::{Rgb, RgbaImage};
use itertools::Itertools;

use crate::adjust::{self, Theme};
use crate::cluster::{self, Cluster};
use crate::color::{self, Brightness};
use crate::sampler;
use crate::settings;

/// One entry of the ranked palette.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Swatch {
    /// Share of the sampled pixels this color represents, in `[0, 1]`.
    pub ratio: f64,
    /// The representative color.
    pub color: Rgb<u8>,
    /// A palette color (or synthesized stand-in) that contrasts with
    /// `color`, usable for text or icons drawn on top of it.
    pub contrast: Rgb<u8>,
}

/// The immutable result of one palette computation.
///
/// Swatches are sorted by descending saliency (population ratio × CIELAB
/// chroma); clusters with equal scores keep their first-seen order, which is
/// the sample order of the source buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    /// Ranked palette entries.
    pub swatches: Vec<Swatch>,
    /// Channel-wise mean of every sampled pixel.
    pub average: Rgb<u8>,
    /// Centroid of the highest-ranked cluster.
    pub dominant: Rgb<u8>,
    /// Contrast partner of `dominant`.
    pub dominant_contrast: Rgb<u8>,
    /// The most chromatic centroid of the palette, regardless of rank.
    pub highlight: Rgb<u8>,
    /// The sampled color with the highest gray level. Raw; see
    /// [`Palette::foreground`] and [`Extractor::closest_to_white`] for the
    /// snapped variants.
    ///
    /// [`Extractor::closest_to_white`]: crate::Extractor::closest_to_white
    pub closest_to_white: Rgb<u8>,
    /// The sampled color with the lowest gray level. Raw, like
    /// `closest_to_white`.
    pub closest_to_black: Rgb<u8>,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            swatches: Vec::new(),
            average: Rgb([0, 0, 0]),
            dominant: Rgb([0, 0, 0]),
            dominant_contrast: Rgb([255, 255, 255]),
            highlight: Rgb([0, 0, 0]),
            // Search seeds: any real cluster beats them.
            closest_to_white: Rgb([0, 0, 0]),
            closest_to_black: Rgb([255, 255, 255]),
        }
    }
}

fn score(cluster: &Cluster) -> f64 {
    cluster.ratio * f64::from(color::chroma(cluster.centroid))
}

impl Palette {
    /// Extract the ranked palette of `image`.
    ///
    /// Deterministic for a given buffer: samples are visited in row-major
    /// order and every tie falls back to first-seen order. An image with no
    /// usable pixels (all transparent or near-gray) produces an empty
    /// palette.
    pub fn generate(image: &RgbaImage) -> Self {
        let samples = sampler::sample(image);
        let Some(average) = samples.average else {
            return Self::default();
        };

        let mut clusters = cluster::cluster(&samples.colors);
        clusters.sort_by(|a, b| score(b).total_cmp(&score(a)));
        cluster::merge_ranked(&mut clusters);
        // Merging can lift a cluster above ones that outranked it before.
        clusters.sort_by(|a, b| score(b).total_cmp(&score(a)));

        let dominant = clusters[0].centroid;
        let mut palette = Self {
            average,
            dominant,
            ..Self::default()
        };
        palette.swatches.reserve(clusters.len());

        let mut first = true;
        for stat in &clusters {
            let swatch_color = stat.centroid;
            let contrast = contrast_color(swatch_color, &clusters, dominant);

            if first {
                palette.dominant_contrast = contrast;
                palette.highlight = swatch_color;
                first = false;
            } else if color::chroma(swatch_color) > color::chroma(palette.highlight) {
                palette.highlight = swatch_color;
            }

            if color::gray(swatch_color) > color::gray(palette.closest_to_white) {
                palette.closest_to_white = swatch_color;
            }
            if color::gray(swatch_color) < color::gray(palette.closest_to_black) {
                palette.closest_to_black = swatch_color;
            }

            palette.swatches.push(Swatch {
                ratio: stat.ratio,
                color: swatch_color,
                contrast,
            });
        }
        palette
    }

    /// Whether the computation found any usable color at all.
    pub fn is_empty(&self) -> bool {
        self.swatches.is_empty()
    }

    /// Light/dark classification of the palette, from the dominant color.
    pub fn brightness(&self) -> Brightness {
        if color::gray(self.dominant) < settings::DARK_DOMINANT_GRAY {
            Brightness::Dark
        } else {
            Brightness::Light
        }
    }

    /// A foreground color readable on this palette: the closest-to-white
    /// extreme on dark palettes, closest-to-black on light ones, snapped to
    /// a fixed gray when the extreme is too weak to be useful.
    pub fn foreground(&self) -> Rgb<u8> {
        match self.brightness() {
            Brightness::Dark => color::snap_near_white(self.closest_to_white),
            Brightness::Light => color::snap_near_black(self.closest_to_black),
        }
    }

    /// A background color in keeping with this palette; the counterpart of
    /// [`Palette::foreground`].
    pub fn background(&self) -> Rgb<u8> {
        match self.brightness() {
            Brightness::Dark => color::snap_near_black(self.closest_to_black),
            Brightness::Light => color::snap_near_white(self.closest_to_white),
        }
    }

    /// Nudge the derived colors (dominant, highlight, average) toward the
    /// luminance range that keeps a WCAG-acceptable contrast against the
    /// given theme. A fixed-iteration heuristic, not a solver.
    pub fn adjust(&mut self, theme: Theme) {
        adjust::post_process(self, theme);
    }
}

/// Pick a contrast partner for `swatch_color`: mirror its photometric
/// inverse about mid-lightness, then prefer an actual palette color near
/// that inverse over the synthetic one. Palettes too small to offer a
/// plausible match get a fixed near-black/near-white instead.
fn contrast_color(swatch_color: Rgb<u8>, clusters: &[Cluster], dominant: Rgb<u8>) -> Rgb<u8> {
    let inverse = color::mirrored_inverse(swatch_color);

    let mut nearest = inverse;
    let mut best = settings::CONTRAST_SEARCH_START;
    for cluster in clusters {
        let distance = color::square_distance(inverse, cluster.centroid);
        if distance < best {
            nearest = cluster.centroid;
            best = distance;
        }
    }

    if clusters.len() <= settings::SMALL_PALETTE_MAX {
        // TODO: replace the cluster-count cutoff with an entropy measure.
        if color::gray(dominant) < settings::SMALL_PALETTE_GRAY_SPLIT {
            settings::NEAR_WHITE
        } else {
            settings::NEAR_BLACK
        }
    } else if color::square_distance(inverse, nearest) < settings::CONTRAST_MATCH_DISTANCE {
        nearest
    } else {
        color::push_from_mid(nearest, settings::CONTRAST_LIGHTNESS_NUDGE)
    }
}

impl fmt::Display for Swatch {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        #[cfg(feature = "print-truecolor")]
        write!(
            f,
            "{}███{} ",
            termion::color::Fg(termion::color::Rgb(self.color[0], self.color[1], self.color[2])),
            termion::color::Fg(termion::color::Reset)
        )?;

        write!(
            f,
            "#{:02X}{:02X}{:02X} {:.1}%",
            self.color[0],
            self.color[1],
            self.color[2],
            self.ratio * 100.0
        )
    }
}

impl fmt::Display for Palette {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let entries = self.swatches.iter().map(ToString::to_string).join(", ");
        write!(f, "Palette {{ {entries} }}")
    }
}
