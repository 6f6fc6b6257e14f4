//! Render configuration surface (`SPEC_FULL.md` §A.3): the core has no
//! file-based configuration (scene file formats are out of scope, spec
//! §1) — callers build a [`RenderConfig`] in code and hand it to
//! [`crate::painting::Painting::new`]. Validated at construction;
//! invalid values become [`ConstructionError`].

use crate::error::ConstructionError;
use std::num::NonZeroUsize;

/// `Integrator` selector (spec §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegratorKind {
    Pt,
    Bpt,
}

/// Plain-struct configuration for a render (spec §6 "Render inputs",
/// `SPEC_FULL.md` §A.3). Resolves spec §9's "Open question — equal-power
/// light distribution" as a runtime field rather than a compile-time
/// constant; see `DESIGN.md`.
#[derive(Debug, Clone, Copy)]
pub struct RenderConfig {
    pub integrator: IntegratorKind,
    /// Forces `shading_normal := geometric_normal` everywhere (spec §6).
    pub flat_shading: bool,
    pub samples_per_pixel: u32,
    /// `None` ⇒ run until the caller sets `stop` (spec §6).
    pub max_pass_count: Option<u32>,
    pub thread_count: NonZeroUsize,
    /// Default `true`, matching `EQUAL_LIGHT_POWER = true` in the
    /// original (`SPEC_FULL.md` §B.1).
    pub equal_light_power: bool,
}

impl RenderConfig {
    pub fn validate(&self) -> Result<(), ConstructionError> {
        if self.samples_per_pixel == 0 {
            return Err(ConstructionError::NonPositiveSamplesPerPixel(
                self.samples_per_pixel as i64,
            ));
        }
        if self.thread_count.get() == 0 {
            // unreachable through NonZeroUsize, kept for symmetry with
            // the other constructor checks spec §7 names.
            return Err(ConstructionError::NonPositiveThreadCount(0));
        }
        Ok(())
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            integrator: IntegratorKind::Pt,
            flat_shading: false,
            samples_per_pixel: 16,
            max_pass_count: None,
            thread_count: NonZeroUsize::new(1).unwrap(),
            equal_light_power: true,
        }
    }
}
