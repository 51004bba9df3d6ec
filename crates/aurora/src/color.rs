//! Aurora color palette.

use rand::{seq::SliceRandom, Rng};
use serde::{Deserialize, Serialize};

use crate::AuroraError;

/// 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Color {
    /// Build a color from channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Normalized RGBA with the given alpha (clamped to `[0, 1]`).
    pub fn to_rgba(self, alpha: f32) -> [f32; 4] {
        [
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
            alpha.clamp(0.0, 1.0),
        ]
    }
}

/// The three colors of one aurora: ground edge, shader midband and top fade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorSet {
    /// Color at the bottom (ground) edge.
    pub base: Color,
    /// Color used for the middle of the shader gradient.
    pub middle: Color,
    /// Color at the transparent top edge.
    pub fade: Color,
}

struct PaletteEntry {
    colors: ColorSet,
    weight: u32,
}

static PALETTE: [PaletteEntry; 4] = [
    // Emerald.
    PaletteEntry {
        colors: ColorSet {
            base: Color::rgb(0x00, 0xff, 0x99),
            middle: Color::rgb(0x33, 0xff, 0x66),
            fade: Color::rgb(0x33, 0xff, 0x00),
        },
        weight: 4,
    },
    // Blue-green.
    PaletteEntry {
        colors: ColorSet {
            base: Color::rgb(0x00, 0x80, 0xff),
            middle: Color::rgb(0x00, 0xcc, 0xcc),
            fade: Color::rgb(0x00, 0xff, 0x40),
        },
        weight: 3,
    },
    // Magenta-green.
    PaletteEntry {
        colors: ColorSet {
            base: Color::rgb(0xff, 0x00, 0xcc),
            middle: Color::rgb(0x99, 0x66, 0xcc),
            fade: Color::rgb(0x33, 0xff, 0x00),
        },
        weight: 2,
    },
    // Violet.
    PaletteEntry {
        colors: ColorSet {
            base: Color::rgb(0x99, 0x00, 0xff),
            middle: Color::rgb(0x66, 0x33, 0xff),
            fade: Color::rgb(0x00, 0xcc, 0xff),
        },
        weight: 1,
    },
];

impl ColorSet {
    /// Every color set in the palette.
    pub fn palette() -> impl Iterator<Item = ColorSet> {
        PALETTE.iter().map(|entry| entry.colors)
    }

    /// Weighted pick from the palette.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Result<Self, AuroraError> {
        let entry = PALETTE.choose_weighted(rng, |entry| entry.weight)?;
        Ok(entry.colors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn rgba_normalizes_and_clamps() {
        let rgba = Color::rgb(255, 0, 51).to_rgba(1.5);
        assert_eq!(rgba, [1.0, 0.0, 0.2, 1.0]);
        assert_eq!(Color::rgb(0, 0, 0).to_rgba(-1.0)[3], 0.0);
    }

    #[test]
    fn weighted_pick_prefers_heavier_entries() {
        let mut rng = StdRng::seed_from_u64(17);
        let emerald = PALETTE[0].colors;
        let violet = PALETTE[3].colors;
        let mut emerald_hits = 0;
        let mut violet_hits = 0;
        for _ in 0..2000 {
            let picked = ColorSet::random(&mut rng).expect("palette has weights");
            if picked == emerald {
                emerald_hits += 1;
            } else if picked == violet {
                violet_hits += 1;
            }
        }
        assert!(emerald_hits > violet_hits * 2, "{emerald_hits} vs {violet_hits}");
    }

    #[test]
    fn picks_come_from_the_palette() {
        let mut rng = StdRng::seed_from_u64(3);
        let palette: Vec<_> = ColorSet::palette().collect();
        for _ in 0..64 {
            let picked = ColorSet::random(&mut rng).expect("palette has weights");
            assert!(palette.contains(&picked));
        }
    }
}
