//! Extract ranked color palettes and adaptive theming colors from images.
//!
//! The pipeline samples the opaque, sufficiently chromatic pixels of an RGBA
//! bitmap, groups them with a greedy online clustering pass refined by a few
//! bounded k-means style rounds, ranks the clusters by how much of the image
//! they cover times how colorful they are, and derives the named colors an
//! adaptive UI needs: dominant, highlight, average, foreground, background
//! and the closest usable approximations of black and white.
//!
//! [`Palette::generate`] is the synchronous pipeline. [`Extractor`] wraps it
//! in a cancellable asynchronous front end that publishes one immutable
//! result at a time and reports configurable [`Fallbacks`] until the first
//! result lands.

#![deny(missing_docs)]

pub use crate::adjust::Theme;
pub use crate::color::Brightness;
pub use crate::error::Error;
pub use crate::extractor::{Extractor, Fallbacks, Published};
pub use crate::palette::{Palette, Swatch};
pub use crate::source::{SnapshotError, SnapshotProvider};

mod adjust;
mod cluster;
mod color;
mod error;
mod extractor;
mod palette;
mod sampler;
mod settings;
mod source;
