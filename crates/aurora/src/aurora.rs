//! The composite aurora: bands, colors and life tracker.

use borealis_core::TICKS_PER_SECOND;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    AuroraBand, AuroraError, AuroraFrame, AuroraGeometry, AuroraRenderer, BandShape, ColorSet,
    LifeTracker, RenderError, DEFAULT_AGE_RATE, DEFAULT_PEAK_AGE,
};

/// Upper bound on bands per aurora.
pub const MAX_BANDS: u8 = 3;

/// Spawn-time knobs supplied by the host.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AuroraOptions {
    /// Cap on the number of bands (1..=3).
    pub max_bands: u8,
    /// Generation flags shared by all bands.
    pub shape: BandShape,
    /// Age at which the aurora is fully visible.
    pub peak_age: u32,
    /// Age change per tick.
    pub age_rate: u32,
}

impl Default for AuroraOptions {
    fn default() -> Self {
        Self {
            max_bands: MAX_BANDS,
            shape: BandShape::default(),
            peak_age: DEFAULT_PEAK_AGE,
            age_rate: DEFAULT_AGE_RATE,
        }
    }
}

/// One aurora instance, owned by whatever spawned it.
#[derive(Debug, Clone)]
pub struct Aurora {
    seed: u64,
    geometry: AuroraGeometry,
    bands: Vec<AuroraBand>,
    colors: ColorSet,
    tracker: LifeTracker,
    ticks: u64,
}

impl Aurora {
    /// Build an aurora from `seed`, picking a random geometry preset.
    pub fn new(seed: u64, options: &AuroraOptions) -> Result<Self, AuroraError> {
        let mut rng = StdRng::seed_from_u64(seed);
        let band_count = band_count(&mut rng, options.max_bands);
        let geometry = AuroraGeometry::random(&mut rng);
        Self::build(seed, &mut rng, band_count, geometry, options)
    }

    /// Build an aurora from `seed` with an explicit geometry.
    pub fn with_geometry(
        seed: u64,
        geometry: AuroraGeometry,
        options: &AuroraOptions,
    ) -> Result<Self, AuroraError> {
        let mut rng = StdRng::seed_from_u64(seed);
        let band_count = band_count(&mut rng, options.max_bands);
        Self::build(seed, &mut rng, band_count, geometry, options)
    }

    fn build(
        seed: u64,
        rng: &mut StdRng,
        band_count: u8,
        geometry: AuroraGeometry,
        options: &AuroraOptions,
    ) -> Result<Self, AuroraError> {
        let tracker = LifeTracker::new(options.peak_age, options.age_rate)?;
        let colors = ColorSet::random(rng)?;
        let first = AuroraBand::generate(rng, geometry, options.shape)?;

        let siblings: Vec<AuroraBand> = [geometry.band_offset, -geometry.band_offset]
            .into_iter()
            .take(usize::from(band_count) - 1)
            .map(|offset| first.copy(offset))
            .collect();
        let mut bands = Vec::with_capacity(usize::from(band_count));
        bands.push(first);
        bands.extend(siblings);

        debug!(seed, bands = bands.len(), ?geometry, "spawned aurora");
        Ok(Self {
            seed,
            geometry,
            bands,
            colors,
            tracker,
            ticks: 0,
        })
    }

    /// Advance the life tracker and every band by one logical tick.
    pub fn update(&mut self) {
        self.tracker.update();
        for band in &mut self.bands {
            band.update();
        }
        self.ticks += 1;
    }

    /// Apply the sub-frame wave and hand the frame to `renderer`.
    ///
    /// Does nothing once the aurora is complete. The phase accumulators are
    /// left untouched; the offset is replaced on the next `update`.
    pub fn render(
        &mut self,
        partial_tick: f32,
        renderer: &mut dyn AuroraRenderer,
    ) -> Result<(), RenderError> {
        if self.is_complete() {
            return Ok(());
        }
        let partial_tick = if partial_tick.is_finite() {
            partial_tick.clamp(0.0, 1.0)
        } else {
            0.0
        };
        for band in &mut self.bands {
            band.translate(partial_tick);
        }
        let frame = AuroraFrame {
            bands: &self.bands,
            colors: &self.colors,
            tracker: &self.tracker,
            geometry: &self.geometry,
            partial_tick,
            time_seconds: self.time_seconds(partial_tick),
        };
        renderer.render(&frame)
    }

    /// Seconds of animation elapsed at `partial_tick` past the current tick.
    pub fn time_seconds(&self, partial_tick: f32) -> f32 {
        (self.ticks as f64 + f64::from(partial_tick)) as f32 / TICKS_PER_SECOND as f32
    }

    /// True once the fade-out has finished.
    pub fn is_complete(&self) -> bool {
        self.tracker.is_complete()
    }

    /// Start or stop fading out.
    pub fn set_fading(&mut self, fading: bool) {
        self.tracker.set_fading(fading);
    }

    /// True while fading out.
    pub fn is_dying(&self) -> bool {
        self.tracker.is_fading()
    }

    /// Seed this aurora was built from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Shared geometry preset.
    pub fn geometry(&self) -> &AuroraGeometry {
        &self.geometry
    }

    /// Bands, first generated band first.
    pub fn bands(&self) -> &[AuroraBand] {
        &self.bands
    }

    /// Colors chosen at spawn.
    pub fn colors(&self) -> &ColorSet {
        &self.colors
    }

    /// Life tracker.
    pub fn tracker(&self) -> &LifeTracker {
        &self.tracker
    }

    /// Logical ticks lived.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

fn band_count<R: Rng + ?Sized>(rng: &mut R, max_bands: u8) -> u8 {
    rng.gen_range(1..=MAX_BANDS).min(max_bands.clamp(1, MAX_BANDS))
}
