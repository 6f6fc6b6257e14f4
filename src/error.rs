//! Error kinds surfaced at the core's boundary (spec §7).
//!
//! `ConstructionError` rejects invalid inputs at the point where a `Scene` or
//! a `Painting` scheduler is built. `NumericError` is never returned to a
//! caller — it is only ever logged — because a single bad sample must not
//! abort an otherwise good render. `RuntimeError` is what a panicking
//! worker thread is converted into before reaching the `Notifier`.

use std::fmt;

/// Rejected at construction time; see spec §7 and §8 "Empty-scene safety".
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ConstructionError {
    #[error("scene has no light sources and a black background color")]
    NoLightAndBlackBackground,

    #[error("scene bounding radius must be positive, got {0}")]
    NonPositiveSceneRadius(f64),

    #[error("light source radius must be positive, got {0}")]
    NonPositiveLightRadius(f64),

    #[error(
        "screen size ({width}x{height}) must exceed twice the filter's integer radius ({min})"
    )]
    ScreenTooSmall {
        width: usize,
        height: usize,
        min: usize,
    },

    #[error("clip-plane normal is degenerate (zero length)")]
    DegenerateClipNormal,

    #[error("samples_per_pixel must be positive, got {0}")]
    NonPositiveSamplesPerPixel(i64),

    #[error("thread_count must be positive, got {0}")]
    NonPositiveThreadCount(i64),
}

/// Non-fatal: a NaN/infinite color escaped the integrator or the
/// reconstruction filter. Never propagated as a `Result` error — only
/// logged via [`log::warn!`] and the offending sample is dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericError {
    pub where_: &'static str,
    pub detail: String,
}

impl fmt::Display for NumericError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "non-finite value in {}: {}", self.where_, self.detail)
    }
}

impl std::error::Error for NumericError {}

impl NumericError {
    pub fn log(where_: &'static str, detail: impl Into<String>) {
        let err = NumericError {
            where_,
            detail: detail.into(),
        };
        log::warn!("{err}");
    }
}

/// Caught at a worker-thread boundary and delivered to
/// [`crate::notifier::Notifier::error_message`]. The scheduler never
/// unwinds past a worker: see [`crate::painting`].
#[derive(thiserror::Error, Debug)]
#[error("worker thread error: {0}")]
pub struct RuntimeError(#[source] pub Box<dyn std::error::Error + Send + Sync>);

impl RuntimeError {
    pub fn new(e: impl std::error::Error + Send + Sync + 'static) -> Self {
        RuntimeError(Box::new(e))
    }

    pub fn message(e: impl Into<String>) -> Self {
        #[derive(Debug)]
        struct Msg(String);
        impl fmt::Display for Msg {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
        impl std::error::Error for Msg {}
        RuntimeError(Box::new(Msg(e.into())))
    }
}
