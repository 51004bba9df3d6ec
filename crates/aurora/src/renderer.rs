//! Seam between the aurora core and swappable rendering backends.

use crate::{AuroraBand, AuroraGeometry, ColorSet, LifeTracker, RenderError};

/// Everything a render strategy may read for one frame.
#[derive(Debug, Clone, Copy)]
pub struct AuroraFrame<'a> {
    /// Bands with the sub-frame wave already applied.
    pub bands: &'a [AuroraBand],
    /// Colors chosen at spawn.
    pub colors: &'a ColorSet,
    /// Life-cycle state driving alpha.
    pub tracker: &'a LifeTracker,
    /// Shared shape parameters.
    pub geometry: &'a AuroraGeometry,
    /// Sub-frame interpolation fraction in `[0, 1]`.
    pub partial_tick: f32,
    /// Monotonic animation clock in seconds.
    pub time_seconds: f32,
}

impl AuroraFrame<'_> {
    /// Fade ratio from the life tracker, clamped to `[0, 1]`.
    pub fn age_ratio(&self) -> f32 {
        self.tracker.age_ratio().clamp(0.0, 1.0)
    }

    /// Alpha for explicit geometry: the preset's ceiling scaled by the fade.
    pub fn geometry_alpha(&self) -> f32 {
        (self.geometry.alpha_fraction() * self.age_ratio()).clamp(0.0, 1.0)
    }
}

/// A consumer that turns an aurora frame into draw calls.
pub trait AuroraRenderer {
    /// Short label for logs.
    fn name(&self) -> &'static str;

    /// Draw one frame.
    fn render(&mut self, frame: &AuroraFrame<'_>) -> Result<(), RenderError>;
}
