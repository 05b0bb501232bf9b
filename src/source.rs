//! Pluggable sources of pixel data for the [`Extractor`].
//!
//! A [`SnapshotProvider`] stands in for anything that can be rendered to a
//! small RGBA buffer on demand: a live window, an album-art widget, a remote
//! framebuffer. Providers are queried again on every recompute, so a
//! changing scene yields a fresh palette each time.
//!
//! [`Extractor`]: crate::Extractor

use futures::future::BoxFuture;
use image::RgbaImage;
use thiserror::Error;

/// A snapshot could not be produced.
///
/// The failure is reported and the previously published palette is kept;
/// providers should put whatever is useful for logs into the message.
#[derive(Debug, Error)]
#[error("snapshot failed: {message}")]
pub struct SnapshotError {
    message: String,
}

impl SnapshotError {
    /// Wrap a provider-specific failure description.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// An on-demand source of RGBA pixel buffers.
pub trait SnapshotProvider: Send + Sync {
    /// Whether the source is currently on screen. Recomputes requested while
    /// the source is hidden are deferred until
    /// [`Extractor::notify_visible`] is called.
    ///
    /// [`Extractor::notify_visible`]: crate::Extractor::notify_visible
    fn visible(&self) -> bool {
        true
    }

    /// Produce a snapshot scaled to at most `size` pixels on the longer
    /// edge. Palette quality is insensitive to resolution, so providers
    /// should downscale aggressively rather than hand over full frames.
    fn snapshot(&self, size: u32) -> BoxFuture<'_, Result<RgbaImage, SnapshotError>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_error_displays_its_message() {
        let error = SnapshotError::new("window is gone");
        assert_eq!(error.to_string(), "snapshot failed: window is gone");
    }
}
