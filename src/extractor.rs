//! Asynchronous front end of the pipeline.
//!
//! An [`Extractor`] owns one pixel source at a time and recomputes its
//! palette in the background. Every recompute takes a fresh generation
//! number from an atomic counter; a result only publishes if no newer
//! recompute has been requested since, so a stale computation can never
//! overwrite a newer one. Results go out over a [`watch`] channel as a
//! single immutable [`Published`] value, which makes the latest palette
//! available to any number of subscribers without further locking.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use image::{Rgb, RgbaImage};
use tokio::sync::watch;
use tokio::task;
use tracing::{debug, warn};

use crate::adjust::Theme;
use crate::color::{self, Brightness};
use crate::error::Error;
use crate::palette::{Palette, Swatch};
use crate::settings;
use crate::source::SnapshotProvider;

/// The latest published computation result.
///
/// `palette` is `None` until the first computation lands. A computation over
/// a buffer with no usable pixels publishes an empty palette; the accessors
/// on [`Extractor`] treat that the same as no palette at all, but observers
/// of [`Extractor::subscribe`] are still notified.
#[derive(Debug, Clone, Default)]
pub struct Published {
    /// Generation number of the recompute that produced this value; 0 for
    /// the initial empty state.
    pub generation: u64,
    /// The palette, shared with every subscriber.
    pub palette: Option<Arc<Palette>>,
}

/// Values reported before the first palette is available.
#[derive(Debug, Clone, PartialEq)]
pub struct Fallbacks {
    /// Reported by [`Extractor::palette`].
    pub palette: Vec<Swatch>,
    /// Reported by [`Extractor::brightness`].
    pub brightness: Brightness,
    /// Reported by [`Extractor::dominant`].
    pub dominant: Rgb<u8>,
    /// Reported by [`Extractor::dominant_contrast`].
    pub dominant_contrast: Rgb<u8>,
    /// Reported by [`Extractor::average`].
    pub average: Rgb<u8>,
    /// Reported by [`Extractor::highlight`].
    pub highlight: Rgb<u8>,
    /// Reported by [`Extractor::foreground`].
    pub foreground: Rgb<u8>,
    /// Reported by [`Extractor::background`].
    pub background: Rgb<u8>,
    /// Reported by [`Extractor::closest_to_white`].
    pub closest_to_white: Rgb<u8>,
    /// Reported by [`Extractor::closest_to_black`].
    pub closest_to_black: Rgb<u8>,
}

impl Default for Fallbacks {
    fn default() -> Self {
        Self {
            palette: Vec::new(),
            brightness: Brightness::Dark,
            dominant: Rgb([35, 38, 41]),
            dominant_contrast: Rgb([252, 252, 252]),
            average: Rgb([35, 38, 41]),
            highlight: Rgb([61, 174, 233]),
            foreground: Rgb([252, 252, 252]),
            background: Rgb([27, 30, 32]),
            closest_to_white: Rgb([255, 255, 255]),
            closest_to_black: Rgb([0, 0, 0]),
        }
    }
}

#[derive(Clone)]
enum Source {
    Image(Arc<RgbaImage>),
    Snapshot(Arc<dyn SnapshotProvider>),
}

struct Shared {
    published: watch::Sender<Published>,
    generation: AtomicU64,
}

/// Asynchronous palette extractor with generation-based cancellation.
///
/// Setting a source triggers a background recompute; accessors always answer
/// immediately from the last published palette or from the configured
/// [`Fallbacks`].
///
/// Recomputes are spawned onto the ambient Tokio runtime, so
/// [`Extractor::recompute`] and the setters that call it ([`set_theme`],
/// [`set_image`], [`set_provider`]) panic outside of one.
///
/// [`set_theme`]: Extractor::set_theme
/// [`set_image`]: Extractor::set_image
/// [`set_provider`]: Extractor::set_provider
pub struct Extractor {
    shared: Arc<Shared>,
    source: Option<Source>,
    theme: Theme,
    fallbacks: Fallbacks,
    deferred: bool,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor {
    /// Create an extractor with no source and default fallbacks.
    pub fn new() -> Self {
        let (published, _) = watch::channel(Published::default());
        Self {
            shared: Arc::new(Shared {
                published,
                generation: AtomicU64::new(0),
            }),
            source: None,
            theme: Theme::default(),
            fallbacks: Fallbacks::default(),
            deferred: false,
        }
    }

    /// Replace the colors reported before the first palette is published.
    pub fn with_fallbacks(mut self, fallbacks: Fallbacks) -> Self {
        self.fallbacks = fallbacks;
        self
    }

    /// Set the theme the derived colors are adjusted against and recompute.
    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
        self.recompute();
    }

    /// Extract from a fixed pixel buffer.
    pub fn set_image(&mut self, image: RgbaImage) {
        self.source = Some(Source::Image(Arc::new(image)));
        self.recompute();
    }

    /// Extract from a live snapshot provider. The provider is queried anew
    /// on every recompute.
    pub fn set_provider(&mut self, provider: Arc<dyn SnapshotProvider>) {
        self.source = Some(Source::Snapshot(provider));
        self.recompute();
    }

    /// Decode an image file off the async runtime and extract from it.
    pub async fn set_path(&mut self, path: impl Into<PathBuf>) -> Result<(), Error> {
        let path = path.into();
        let image = task::spawn_blocking(move || image::open(path)).await??;
        self.set_image(image.to_rgba8());
        Ok(())
    }

    /// Request a recompute of the current source.
    ///
    /// A no-op without a source. With a hidden snapshot provider the request
    /// is remembered and replayed by [`Extractor::notify_visible`]. Returns
    /// before the computation finishes; subscribe to observe the result.
    /// Panics when called outside a Tokio runtime, since the computation is
    /// spawned onto it.
    pub fn recompute(&mut self) {
        let Some(source) = self.source.clone() else {
            return;
        };
        if let Source::Snapshot(provider) = &source {
            if !provider.visible() {
                debug!("source hidden, deferring palette recompute");
                self.deferred = true;
                return;
            }
        }
        self.deferred = false;

        let generation = self.shared.generation.fetch_add(1, Ordering::Relaxed) + 1;
        let shared = Arc::clone(&self.shared);
        let theme = self.theme;
        tokio::spawn(async move {
            let buffer = match source {
                Source::Image(image) => image,
                Source::Snapshot(provider) => {
                    match provider.snapshot(settings::SNAPSHOT_SIZE).await {
                        Ok(image) => Arc::new(image),
                        Err(error) => {
                            warn!(%error, generation, "snapshot failed, keeping previous palette");
                            return;
                        }
                    }
                }
            };
            if shared.generation.load(Ordering::Relaxed) > generation {
                debug!(generation, "palette recompute superseded before start");
                return;
            }

            let computed = task::spawn_blocking(move || {
                let mut palette = Palette::generate(&buffer);
                palette.adjust(theme);
                palette
            })
            .await;
            let palette = match computed {
                Ok(palette) => palette,
                Err(error) => {
                    warn!(%error, generation, "palette computation task failed");
                    return;
                }
            };

            let published = shared.published.send_if_modified(|current| {
                if generation > current.generation {
                    *current = Published {
                        generation,
                        palette: Some(Arc::new(palette)),
                    };
                    true
                } else {
                    false
                }
            });
            if published {
                debug!(generation, "published palette");
            } else {
                debug!(generation, "palette superseded, dropping result");
            }
        });
    }

    /// Replay a recompute that was deferred while the source was hidden.
    pub fn notify_visible(&mut self) {
        if self.deferred {
            self.recompute();
        }
    }

    /// Subscribe to publication events. The receiver always starts with the
    /// current value; [`watch::Receiver::changed`] resolves once per newer
    /// published generation.
    pub fn subscribe(&self) -> watch::Receiver<Published> {
        self.shared.published.subscribe()
    }

    fn current(&self) -> Option<Arc<Palette>> {
        let published = self.shared.published.borrow();
        published
            .palette
            .as_ref()
            .filter(|palette| !palette.is_empty())
            .map(Arc::clone)
    }

    /// The ranked swatches of the last published non-empty palette, or the
    /// fallback palette until one lands.
    pub fn palette(&self) -> Vec<Swatch> {
        self.current().map_or_else(
            || self.fallbacks.palette.clone(),
            |palette| palette.swatches.clone(),
        )
    }

    /// Light/dark classification of the current palette.
    pub fn brightness(&self) -> Brightness {
        self.current()
            .map_or(self.fallbacks.brightness, |palette| palette.brightness())
    }

    /// Channel-wise mean of the sampled pixels.
    pub fn average(&self) -> Rgb<u8> {
        self.current()
            .map_or(self.fallbacks.average, |palette| palette.average)
    }

    /// Centroid of the highest-ranked cluster.
    pub fn dominant(&self) -> Rgb<u8> {
        self.current()
            .map_or(self.fallbacks.dominant, |palette| palette.dominant)
    }

    /// Contrast partner of [`Extractor::dominant`].
    pub fn dominant_contrast(&self) -> Rgb<u8> {
        self.current().map_or(self.fallbacks.dominant_contrast, |palette| {
            palette.dominant_contrast
        })
    }

    /// The most chromatic palette color.
    pub fn highlight(&self) -> Rgb<u8> {
        self.current()
            .map_or(self.fallbacks.highlight, |palette| palette.highlight)
    }

    /// A foreground color readable on the current palette.
    pub fn foreground(&self) -> Rgb<u8> {
        self.current()
            .map_or(self.fallbacks.foreground, |palette| palette.foreground())
    }

    /// A background color in keeping with the current palette.
    pub fn background(&self) -> Rgb<u8> {
        self.current()
            .map_or(self.fallbacks.background, |palette| palette.background())
    }

    /// The lightest sampled color, snapped to a fixed light gray when it is
    /// too dark to pass for white.
    pub fn closest_to_white(&self) -> Rgb<u8> {
        self.current().map_or(self.fallbacks.closest_to_white, |palette| {
            color::snap_near_white(palette.closest_to_white)
        })
    }

    /// The darkest sampled color, snapped to a fixed dark gray when it is
    /// too light to pass for black.
    pub fn closest_to_black(&self) -> Rgb<u8> {
        self.current().map_or(self.fallbacks.closest_to_black, |palette| {
            color::snap_near_black(palette.closest_to_black)
        })
    }
}
