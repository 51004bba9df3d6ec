//! Explicit-geometry aurora meshing.
//!
//! Every adjacent node pair of every band becomes three quads (front edge,
//! ground, back edge) split into six triangles. Ground vertices carry the
//! base color at the aurora's current alpha; top vertices carry the fade
//! color at alpha 0, giving a vertical gradient that vanishes upward.

use blake3::Hasher;
use borealis_aurora::{AuroraBand, AuroraFrame, AuroraRenderer, Node, RenderError};
use glam::Vec2;

/// Height of the ribbon's ground edge in aurora-local space.
pub const GROUND_Y: f32 = 0.0;
/// Vertices emitted per node pair (6 triangles).
pub const VERTICES_PER_SEGMENT: usize = 18;

/// Hash of mesh contents for determinism comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshHash(pub [u8; 32]);

impl MeshHash {
    /// Lowercase hex rendering for logs and metrics.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|byte| format!("{byte:02x}")).collect()
    }
}

/// Packed vertex layout for the triangle path.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct AuroraVertex {
    /// Position in aurora-local coordinates.
    pub position: [f32; 3],
    /// Straight (non-premultiplied) RGBA.
    pub color: [f32; 4],
}

/// Triangle list for one frame.
#[derive(Debug, Clone)]
pub struct AuroraMesh {
    /// Vertices, three per triangle.
    pub vertices: Vec<AuroraVertex>,
    /// Hash over the vertex bytes.
    pub hash: MeshHash,
}

impl AuroraMesh {
    /// Construct an empty mesh (useful for initialization).
    pub fn empty() -> Self {
        Self::from_vertices(Vec::new())
    }

    fn from_vertices(vertices: Vec<AuroraVertex>) -> Self {
        let mut hasher = Hasher::new();
        hasher.update(bytemuck::cast_slice(&vertices));
        Self {
            vertices,
            hash: MeshHash(*hasher.finalize().as_bytes()),
        }
    }

    /// Number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.vertices.len() / 3
    }

    /// Raw vertex bytes ready for upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }
}

impl Default for AuroraMesh {
    fn default() -> Self {
        Self::empty()
    }
}

/// Build the triangle list for every band in `frame`.
pub fn mesh_aurora(frame: &AuroraFrame<'_>) -> AuroraMesh {
    let ground = frame.colors.base.to_rgba(frame.geometry_alpha());
    let top = frame.colors.fade.to_rgba(0.0);

    let segments: usize = frame
        .bands
        .iter()
        .map(|band| band.nodes().len().saturating_sub(1))
        .sum();
    let mut vertices = Vec::with_capacity(segments * VERTICES_PER_SEGMENT);
    for band in frame.bands {
        mesh_band(band, ground, top, &mut vertices);
    }
    AuroraMesh::from_vertices(vertices)
}

fn mesh_band(band: &AuroraBand, ground: [f32; 4], top: [f32; 4], out: &mut Vec<AuroraVertex>) {
    for pair in band.nodes().windows(2) {
        push_segment(&pair[0], &pair[1], ground, top, out);
    }
}

fn push_segment(
    node: &Node,
    next: &Node,
    ground: [f32; 4],
    top: [f32; 4],
    out: &mut Vec<AuroraVertex>,
) {
    let [n1, n2] = node.tangents();
    let [m1, m2] = next.tangents();
    let low = |edge: Vec2| AuroraVertex {
        position: [edge.x, GROUND_Y, edge.y],
        color: ground,
    };
    let high = |edge: Vec2, y: f32| AuroraVertex {
        position: [edge.x, y, edge.y],
        color: top,
    };
    let (node_top, next_top) = (node.top(), next.top());

    // Front.
    out.extend_from_slice(&[
        low(n1),
        high(n1, node_top),
        high(m1, next_top),
        low(n1),
        high(m1, next_top),
        low(m1),
    ]);
    // Bottom.
    out.extend_from_slice(&[low(n1), low(n2), low(m2), low(n1), low(m2), low(m1)]);
    // Back.
    out.extend_from_slice(&[
        low(n2),
        high(n2, node_top),
        high(m2, next_top),
        low(n2),
        high(m2, next_top),
        low(m2),
    ]);
}

/// Render strategy that rebuilds an [`AuroraMesh`] every frame.
#[derive(Debug, Default)]
pub struct TriangleRenderer {
    mesh: AuroraMesh,
    frames: u64,
}

impl TriangleRenderer {
    /// Create a renderer with an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mesh produced by the most recent frame.
    pub fn mesh(&self) -> &AuroraMesh {
        &self.mesh
    }

    /// Take the most recent mesh, leaving an empty one behind.
    pub fn take_mesh(&mut self) -> AuroraMesh {
        std::mem::take(&mut self.mesh)
    }

    /// Frames rendered so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl AuroraRenderer for TriangleRenderer {
    fn name(&self) -> &'static str {
        "triangles"
    }

    fn render(&mut self, frame: &AuroraFrame<'_>) -> Result<(), RenderError> {
        if frame.bands.is_empty() {
            return Err(RenderError::EmptyFrame);
        }
        self.mesh = mesh_aurora(frame);
        self.frames += 1;
        Ok(())
    }
}
