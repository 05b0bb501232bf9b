//! First pipeline stage: filter a pixel buffer down to the samples worth
//! clustering. Fully transparent pixels carry no color and near-gray pixels
//! would drag every cluster toward mud, so both are dropped before any
//! distance math runs.

use image::{Rgb, RgbaImage};

use crate::color;
use crate::settings;

/// The surviving samples of one buffer plus their precomputed mean.
pub(crate) struct Samples {
    /// Samples in pixel order (row-major).
    pub colors: Vec<Rgb<u8>>,
    /// Channel-wise integer mean of `colors`; `None` when everything was
    /// filtered out.
    pub average: Option<Rgb<u8>>,
}

pub(crate) fn sample(image: &RgbaImage) -> Samples {
    let mut colors = Vec::with_capacity(image.pixels().len());
    let (mut r, mut g, mut b) = (0u64, 0u64, 0u64);

    for pixel in image.pixels() {
        let [pr, pg, pb, pa] = pixel.0;
        if pa == 0 {
            continue;
        }
        let rgb = Rgb([pr, pg, pb]);
        if color::chroma(rgb) < settings::MIN_SAMPLE_CHROMA {
            continue;
        }
        r += u64::from(pr);
        g += u64::from(pg);
        b += u64::from(pb);
        colors.push(rgb);
    }

    let average = if colors.is_empty() {
        None
    } else {
        let count = colors.len() as u64;
        Some(Rgb([(r / count) as u8, (g / count) as u8, (b / count) as u8]))
    };

    Samples { colors, average }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn buffer(pixels: &[[u8; 4]]) -> RgbaImage {
        let mut image = RgbaImage::new(pixels.len() as u32, 1);
        for (x, &p) in pixels.iter().enumerate() {
            image.put_pixel(x as u32, 0, Rgba(p));
        }
        image
    }

    #[test]
    fn transparent_pixels_are_skipped() {
        let samples = sample(&buffer(&[[255, 0, 0, 0], [255, 0, 0, 255]]));
        assert_eq!(samples.colors.len(), 1);
    }

    #[test]
    fn achromatic_pixels_are_skipped() {
        let samples = sample(&buffer(&[[128, 128, 128, 255], [250, 250, 250, 255]]));
        assert!(samples.colors.is_empty());
        assert!(samples.average.is_none());
    }

    #[test]
    fn average_of_solid_buffer_is_the_color() {
        let samples = sample(&RgbaImage::from_pixel(4, 4, Rgba([200, 40, 40, 255])));
        assert_eq!(samples.colors.len(), 16);
        assert_eq!(samples.average, Some(Rgb([200, 40, 40])));
    }

    #[test]
    fn empty_buffer_yields_no_samples() {
        let samples = sample(&RgbaImage::new(0, 0));
        assert!(samples.colors.is_empty());
        assert!(samples.average.is_none());
    }
}
