//! Crate-level error type.

use thiserror::Error;

/// Errors surfaced by the file-loading path of the extractor.
#[derive(Debug, Error)]
pub enum Error {
    /// The image file could not be opened or decoded.
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
    /// The blocking decode task was cancelled or panicked.
    #[error("image decode task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
