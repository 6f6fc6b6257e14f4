//! A multidimensional offline physically-based Monte Carlo renderer
//! core: BVH-accelerated shapes and surfaces, light sources, a scene
//! container with visibility queries, Path Tracing and Bidirectional
//! Path Tracing integrators with multiple importance sampling, a
//! Gaussian-filtered pixel accumulator, and a parallel tile-based
//! painting scheduler that drives it all from a host-supplied
//! [`Notifier`](notifier::Notifier). File formats, scene description
//! languages, denoising, and a display layer are all out of scope: this
//! crate's only outward surface is [`config::RenderConfig`],
//! [`scene::Scene`], [`notifier::Notifier`], and [`painting::Painting`].

pub mod arena;
pub mod config;
pub mod error;
pub mod geometry;
pub mod integrators;
pub mod lights;
pub mod math;
pub mod notifier;
pub mod paintbrush;
pub mod painting;
pub mod pixels;
pub mod projector;
pub mod sampler;
pub mod scene;
pub mod shapes;
pub mod statistics;
pub mod surface;
pub mod visibility;

pub use config::{IntegratorKind, RenderConfig};
pub use error::{ConstructionError, NumericError, RuntimeError};
pub use notifier::{Images, NullNotifier, Notifier, RgbImage, RgbaImage};
pub use painting::Painting;
pub use scene::Scene;
