//! A single ribbon strand: generation by constrained random walk, width
//! tapering, and the travelling-wave animation.

use std::f32::consts::FRAC_PI_2;

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{AuroraError, AuroraGeometry, Node};

/// Nodes that share one random turn during generation.
pub const NODES_PER_GROUP: usize = 8;
/// Spread of the per-group turn, in degrees (`(random - 0.5) * MAX_TURN_DEGREES`).
pub const MAX_TURN_DEGREES: f32 = 8.0;
/// Heading bound that keeps a band from coiling back on itself.
const HEADING_LIMIT: f32 = 180.0;

/// Phase step between neighbouring nodes, in degrees.
pub const WAVELENGTH: f32 = 8.0;
/// Sideways sway of the travelling wave.
pub const WAVE_AMPLITUDE: f32 = 32.0;
/// Vertical bob of the travelling wave.
pub const VERTICAL_AMPLITUDE: f32 = 3.0;
/// Phase advance per logical tick, in degrees.
pub const WAVE_SPEED: f32 = 2.0;

/// Height used for every node of a fixed-height band.
pub const FIXED_HEIGHT: f32 = 10.0;
const ANCHOR_HEIGHT: f32 = 7.0;
const INTERIOR_HEIGHT: f32 = 10.0;
const INTERIOR_HEIGHT_SPREAD: f32 = 5.0;
const PROFILE_HEIGHT: f32 = 10.0;

/// Generation flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BandShape {
    /// Keep full width all the way to the ends (shader bands fade via alpha).
    pub no_taper: bool,
    /// Use [`FIXED_HEIGHT`] for every node instead of random heights.
    pub fixed_height: bool,
}

/// Accumulated heading of a constrained random walk.
///
/// Each step draws a small turn; if the running heading would leave
/// `[-180°, 180°]` the turn is negated instead.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TurnWalk {
    heading: f32,
}

impl TurnWalk {
    /// Current heading in degrees.
    pub fn heading(&self) -> f32 {
        self.heading
    }

    /// Draw the next turn and return the new heading.
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> f32 {
        let mut turn = (rng.gen::<f32>() - 0.5) * MAX_TURN_DEGREES;
        self.heading += turn;
        if self.heading.abs() > HEADING_LIMIT {
            turn = -turn;
            self.heading += 2.0 * turn;
        }
        self.heading
    }
}

/// Ordered, fixed-length sequence of nodes forming one ribbon.
#[derive(Debug, Clone, PartialEq)]
pub struct AuroraBand {
    nodes: Vec<Node>,
    geometry: AuroraGeometry,
    shape: BandShape,
    phase: f32,
}

impl AuroraBand {
    /// Generate a band from `rng`.
    ///
    /// The walk starts at the anchor node (`length / 2 - 1`) and proceeds
    /// outward in both directions; the band is translated once at phase 0
    /// so it is ready to render.
    pub fn generate<R: Rng + ?Sized>(
        rng: &mut R,
        geometry: AuroraGeometry,
        shape: BandShape,
    ) -> Result<Self, AuroraError> {
        geometry.validate()?;

        let length = geometry.length as usize;
        let anchor = length / 2 - 1;
        let anchor_height = if shape.fixed_height {
            FIXED_HEIGHT
        } else {
            ANCHOR_HEIGHT + rng.gen::<f32>()
        };

        let mut nodes = vec![Node::new(Vec3::new(0.0, anchor_height, 0.0), 0.0); length];

        let head: Vec<usize> = (0..anchor).rev().collect();
        let mut walk = TurnWalk::default();
        for group in head.chunks(NODES_PER_GROUP) {
            let heading = walk.step(rng);
            for &index in group {
                let prior = nodes[index + 1].position;
                let y = node_height(rng, index, length, shape);
                let step = step_towards(heading, geometry.node_length);
                let position = Vec3::new(prior.x - step.x, y, prior.z - step.z);
                nodes[index] = Node::new(position, heading);
            }
        }

        let tail: Vec<usize> = (anchor + 1..length).collect();
        let mut walk = TurnWalk::default();
        for group in tail.chunks(NODES_PER_GROUP) {
            let heading = walk.step(rng);
            for &index in group {
                let prior = nodes[index - 1].position;
                let y = node_height(rng, index, length, shape);
                let step = step_towards(heading, geometry.node_length);
                let position = Vec3::new(prior.x + step.x, y, prior.z + step.z);
                nodes[index] = Node::new(position, heading);
            }
        }

        let taper = geometry.taper_nodes();
        for (index, node) in nodes.iter_mut().enumerate() {
            node.set_width(taper_width(index, length, taper, geometry.node_width, shape));
        }

        let mut band = Self {
            nodes,
            geometry,
            shape,
            phase: 0.0,
        };
        band.translate(0.0);
        debug!(
            length,
            anchor_height,
            no_taper = shape.no_taper,
            fixed_height = shape.fixed_height,
            "generated aurora band"
        );
        Ok(band)
    }

    /// Nodes in chronological order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Geometry this band was generated from.
    pub fn geometry(&self) -> &AuroraGeometry {
        &self.geometry
    }

    /// Generation flags.
    pub fn shape(&self) -> BandShape {
        self.shape
    }

    /// Phase accumulator in degrees, always within `[0, 360)`.
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Index of the anchor node the walk started from.
    pub fn anchor(&self) -> usize {
        self.nodes.len() / 2 - 1
    }

    /// Advance the wave by one logical tick and discard any sub-frame offset.
    pub fn update(&mut self) {
        self.phase = (self.phase + WAVE_SPEED).rem_euclid(360.0);
        self.translate(0.0);
    }

    /// Apply the travelling wave for `partial_tick` past the current phase.
    ///
    /// The phase accumulator itself is not touched.
    pub fn translate(&mut self, partial_tick: f32) {
        let phase = self.phase + WAVE_SPEED * partial_tick;
        for (index, node) in self.nodes.iter_mut().enumerate() {
            let f = (WAVELENGTH * index as f32 + phase).to_radians().cos();
            node.delta_z = f * WAVE_AMPLITUDE;
            node.delta_y = f * VERTICAL_AMPLITUDE;
        }
        self.find_angles();
    }

    /// Sibling band shifted sideways by `offset` from each node's facing.
    pub fn copy(&self, offset: f32) -> Self {
        let last = self.nodes.len() - 1;
        let nodes = self
            .nodes
            .iter()
            .enumerate()
            .map(|(index, node)| {
                // The terminal node has no facing of its own.
                let facing = if index < last {
                    node.angle
                } else {
                    self.nodes[index.saturating_sub(1)].angle
                };
                node.offset_laterally(facing, offset)
            })
            .collect();

        let mut band = Self {
            nodes,
            ..self.clone()
        };
        band.translate(0.0);
        band
    }

    fn find_angles(&mut self) {
        for index in 0..self.nodes.len() {
            let next = self.nodes.get(index + 1).copied();
            self.nodes[index].find_angles(next.as_ref());
        }
    }
}

fn step_towards(heading: f32, node_length: f32) -> Vec3 {
    let (sin, cos) = heading.to_radians().sin_cos();
    Vec3::new(cos * node_length, 0.0, sin * node_length)
}

fn node_height<R: Rng + ?Sized>(
    rng: &mut R,
    index: usize,
    length: usize,
    shape: BandShape,
) -> f32 {
    let group = NODES_PER_GROUP as f32;
    if shape.fixed_height {
        FIXED_HEIGHT
    } else if index < NODES_PER_GROUP {
        PROFILE_HEIGHT * (FRAC_PI_2 * index as f32 / group).sin()
    } else if index >= length - NODES_PER_GROUP {
        let into_tail = (index + 1 - (length - NODES_PER_GROUP)) as f32;
        PROFILE_HEIGHT * (FRAC_PI_2 * into_tail / group).cos()
    } else {
        INTERIOR_HEIGHT + rng.gen::<f32>() * INTERIOR_HEIGHT_SPREAD
    }
}

fn taper_width(index: usize, length: usize, taper: usize, width: f32, shape: BandShape) -> f32 {
    let from_end = index.min(length - 1 - index);
    if shape.no_taper || from_end >= taper {
        width
    } else {
        width * (FRAC_PI_2 * from_end as f32 / taper as f32).sin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn band(seed: u64, shape: BandShape) -> AuroraBand {
        let mut rng = StdRng::seed_from_u64(seed);
        AuroraBand::generate(&mut rng, AuroraGeometry::PRESETS[0], shape).expect("valid preset")
    }

    #[test]
    fn generation_rejects_bad_length() {
        let mut rng = StdRng::seed_from_u64(1);
        let geometry = AuroraGeometry::new(100, 30.0, 2.0, 100, 90.0);
        assert!(AuroraBand::generate(&mut rng, geometry, BandShape::default()).is_err());
    }

    #[test]
    fn anchor_sits_at_origin() {
        let band = band(3, BandShape::default());
        let anchor = band.nodes()[band.anchor()].position;
        assert_eq!(anchor.x, 0.0);
        assert_eq!(anchor.z, 0.0);
        assert!((7.0..8.0).contains(&anchor.y));
    }

    #[test]
    fn consecutive_nodes_are_one_step_apart() {
        let band = band(5, BandShape::default());
        for pair in band.nodes().windows(2) {
            let a = pair[0].position;
            let b = pair[1].position;
            let flat = ((a.x - b.x).powi(2) + (a.z - b.z).powi(2)).sqrt();
            assert!((flat - 30.0).abs() < 1e-2, "step {flat}");
        }
    }

    #[test]
    fn band_ends_touch_the_ground() {
        let band = band(8, BandShape::default());
        assert!(band.nodes()[0].position.y.abs() < 1e-6);
        assert!(band.nodes()[127].position.y.abs() < 1e-5);
    }

    #[test]
    fn fixed_height_flattens_every_node() {
        let band = band(
            8,
            BandShape {
                no_taper: true,
                fixed_height: true,
            },
        );
        assert!(band.nodes().iter().all(|n| n.position.y == FIXED_HEIGHT));
        assert!(band.nodes().iter().all(|n| n.width() == 2.0));
    }

    #[test]
    fn taper_narrows_both_ends() {
        let band = band(11, BandShape::default());
        let nodes = band.nodes();
        assert!(nodes[0].width().abs() < 1e-6);
        assert!(nodes[127].width().abs() < 1e-6);
        assert!(nodes[8].width() < nodes[15].width());
        assert!(nodes[16..112].iter().all(|n| n.width() == 2.0));
    }

    #[test]
    fn update_wraps_phase() {
        let mut band = band(2, BandShape::default());
        for _ in 0..1000 {
            band.update();
            assert!((0.0..360.0).contains(&band.phase()));
        }
        assert!((band.phase() - (1000.0 * WAVE_SPEED).rem_euclid(360.0)).abs() < 1e-2);
    }

    #[test]
    fn translate_leaves_phase_alone() {
        let mut band = band(2, BandShape::default());
        band.update();
        let phase = band.phase();
        band.translate(0.75);
        assert_eq!(band.phase(), phase);
        let expected = (phase + WAVE_SPEED * 0.75).to_radians().cos() * WAVE_AMPLITUDE;
        assert!((band.nodes()[0].delta_z - expected).abs() < 1e-4);
    }

    #[test]
    fn copy_keeps_node_count_and_spacing() {
        let band = band(4, BandShape::default());
        let sibling = band.copy(90.0);
        assert_eq!(sibling.nodes().len(), band.nodes().len());
        for (a, b) in band.nodes().iter().zip(sibling.nodes()) {
            let shift = (a.position - b.position).length();
            assert!((shift - 90.0).abs() < 1e-2, "shift {shift}");
            assert_eq!(a.position.y, b.position.y);
            assert_eq!(a.width(), b.width());
        }
    }

    #[test]
    fn turn_walk_negates_turns_past_the_limit() {
        let mut walk = TurnWalk { heading: 179.0 };
        let mut rng = StdRng::seed_from_u64(0);
        for _ in 0..10_000 {
            assert!(walk.step(&mut rng).abs() <= HEADING_LIMIT);
        }
    }
}
