#![warn(missing_docs)]
//! Rendering strategies for the aurora core.
//!
//! Two interchangeable [`AuroraRenderer`](borealis_aurora::AuroraRenderer)s are
//! provided: [`TriangleRenderer`] emits colored triangles per band segment and
//! [`ShaderRenderer`] feeds a single quad plus uniforms to a shader program.
//! [`RenderSelector`] prefers the shader path and degrades to triangles.

mod mesh;
mod selector;
mod shader;

pub use mesh::{
    mesh_aurora, AuroraMesh, AuroraVertex, MeshHash, TriangleRenderer, GROUND_Y,
    VERTICES_PER_SEGMENT,
};
pub use selector::{RenderPath, RenderSelector};
pub use shader::{
    bounding_quad, AuroraQuad, AuroraShaderUniform, HeadlessShaderProgram, ShaderError,
    ShaderProgram, ShaderRenderer, AURORA_SHADER_WGSL, REQUIRED_UNIFORMS, UNIFORM_STRUCT,
};
