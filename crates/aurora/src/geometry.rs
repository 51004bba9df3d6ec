//! Geometry presets describing one "look" of an aurora.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::AuroraError;

/// Shape parameters shared by every band of one aurora.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AuroraGeometry {
    /// Number of nodes per band. Must be a positive multiple of 8.
    pub length: u32,
    /// Distance between consecutive nodes.
    pub node_length: f32,
    /// Ribbon half-width at full (untapered) width.
    pub node_width: f32,
    /// Alpha ceiling (0-255) applied to rendered geometry.
    pub alpha_limit: u8,
    /// Sideways distance between sibling bands.
    pub band_offset: f32,
}

impl AuroraGeometry {
    /// Preset table sampled when an aurora spawns.
    pub const PRESETS: [AuroraGeometry; 4] = [
        AuroraGeometry::new(128, 30.0, 2.0, 100, 90.0),
        AuroraGeometry::new(128, 24.0, 3.0, 96, 64.0),
        AuroraGeometry::new(128, 20.0, 4.0, 80, 48.0),
        AuroraGeometry::new(128, 16.0, 2.5, 112, 72.0),
    ];

    /// Build a geometry description.
    pub const fn new(
        length: u32,
        node_length: f32,
        node_width: f32,
        alpha_limit: u8,
        band_offset: f32,
    ) -> Self {
        Self {
            length,
            node_length,
            node_width,
            alpha_limit,
            band_offset,
        }
    }

    /// Pick one of the presets.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::PRESETS[rng.gen_range(0..Self::PRESETS.len())]
    }

    /// Reject presets the band generator cannot lay out.
    pub fn validate(&self) -> Result<(), AuroraError> {
        let reason = if self.length < 8 || self.length % 8 != 0 {
            format!("length {} is not a positive multiple of 8", self.length)
        } else if !(self.node_length.is_finite() && self.node_length > 0.0) {
            format!("node length {} must be positive", self.node_length)
        } else if !(self.node_width.is_finite() && self.node_width >= 0.0) {
            format!("node width {} must be non-negative", self.node_width)
        } else if !self.band_offset.is_finite() {
            format!("band offset {} must be finite", self.band_offset)
        } else {
            return Ok(());
        };
        Err(AuroraError::InvalidGeometry { reason })
    }

    /// Number of nodes tapered at each end of a band.
    pub fn taper_nodes(&self) -> usize {
        self.length as usize / 8
    }

    /// Alpha ceiling as a fraction.
    pub fn alpha_fraction(&self) -> f32 {
        f32::from(self.alpha_limit) / 255.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn presets_are_valid() {
        for preset in AuroraGeometry::PRESETS {
            assert_eq!(preset.validate(), Ok(()));
        }
    }

    #[test]
    fn rejects_lengths_that_break_grouping() {
        for length in [0, 4, 12, 129] {
            let geometry = AuroraGeometry::new(length, 30.0, 2.0, 100, 90.0);
            assert!(matches!(
                geometry.validate(),
                Err(AuroraError::InvalidGeometry { .. })
            ));
        }
    }

    #[test]
    fn rejects_degenerate_spacing() {
        let geometry = AuroraGeometry::new(128, 0.0, 2.0, 100, 90.0);
        assert!(geometry.validate().is_err());
        let geometry = AuroraGeometry::new(128, 30.0, f32::NAN, 100, 90.0);
        assert!(geometry.validate().is_err());
    }

    #[test]
    fn random_pick_is_a_preset() {
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..32 {
            let geometry = AuroraGeometry::random(&mut rng);
            assert!(AuroraGeometry::PRESETS.contains(&geometry));
        }
    }
}
