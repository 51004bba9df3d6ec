//! Single control point of an aurora ribbon.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// One vertex of a band's centerline.
///
/// `position` is fixed at generation time. The animated displacement and the
/// derived facing/tangent data are rewritten every time the owning band is
/// translated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Base coordinates set once at generation time.
    pub position: Vec3,
    /// Facing angle in degrees (heading during generation, then the direction
    /// from the successor node back to this one).
    pub angle: f32,
    /// Animated vertical displacement.
    pub delta_y: f32,
    /// Animated sideways displacement.
    pub delta_z: f32,
    width: f32,
    tangents: [Vec2; 2],
}

impl Node {
    /// Create a node with zero width and no displacement.
    pub fn new(position: Vec3, angle: f32) -> Self {
        let centre = Vec2::new(position.x, position.z);
        Self {
            position,
            angle,
            delta_y: 0.0,
            delta_z: 0.0,
            width: 0.0,
            tangents: [centre, centre],
        }
    }

    /// Ribbon half-width at this node.
    pub fn width(&self) -> f32 {
        self.width
    }

    /// Set the half-width. Tangents are refreshed on the next `find_angles`.
    pub fn set_width(&mut self, width: f32) {
        self.width = width;
    }

    /// Base position plus the current animated displacement.
    pub fn displaced(&self) -> Vec3 {
        Vec3::new(
            self.position.x,
            self.position.y + self.delta_y,
            self.position.z + self.delta_z,
        )
    }

    /// Height of the displaced top edge.
    pub fn top(&self) -> f32 {
        self.position.y + self.delta_y
    }

    /// The two ribbon edge points (XZ) of this node's cross-section.
    pub fn tangents(&self) -> [Vec2; 2] {
        self.tangents
    }

    /// Recompute facing and edge points against the chronological successor.
    ///
    /// The terminal node (no successor) faces 0° and both edges collapse onto
    /// its displaced centerline.
    pub fn find_angles(&mut self, next: Option<&Node>) {
        let here = self.displaced();
        let centre = Vec2::new(here.x, here.z);

        let Some(next) = next else {
            self.angle = 0.0;
            self.tangents = [centre, centre];
            return;
        };

        let there = next.displaced();
        let radians = (here.z - there.z).atan2(here.x - there.x);
        self.angle = radians.to_degrees();

        let perpendicular = unit_perpendicular(self.angle) * self.width;
        self.tangents = [centre + perpendicular, centre - perpendicular];
    }

    /// Copy of this node shifted sideways from `facing` (degrees) by `offset`.
    ///
    /// Displacement and width carry over; tangents are stale until the owning
    /// band is translated again.
    pub fn offset_laterally(&self, facing: f32, offset: f32) -> Self {
        let shift = unit_perpendicular(facing) * offset;
        Self {
            position: self.position + Vec3::new(shift.x, 0.0, shift.y),
            ..*self
        }
    }
}

/// Unit vector 90° counter-clockwise from `degrees` in the XZ plane.
fn unit_perpendicular(degrees: f32) -> Vec2 {
    let (sin, cos) = (degrees + 90.0).to_radians().sin_cos();
    Vec2::new(cos, sin)
}
