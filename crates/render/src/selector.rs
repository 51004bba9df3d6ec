//! Chooses between the shader and triangle paths.
//!
//! The shader path is preferred while it works. The first failure disables it
//! for the lifetime of the selector and the frame is redrawn with triangles.

use borealis_aurora::{AuroraFrame, AuroraRenderer, RenderError};
use tracing::warn;

use crate::{ShaderProgram, ShaderRenderer, TriangleRenderer};

/// Which strategy drew the most recent frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderPath {
    /// Shader quad.
    Shader,
    /// Explicit triangles.
    Triangles,
}

/// Render strategy that falls back from the shader quad to triangles.
#[derive(Debug)]
pub struct RenderSelector<P> {
    shader: Option<ShaderRenderer<P>>,
    triangles: TriangleRenderer,
    last_path: Option<RenderPath>,
    shader_failure: Option<RenderError>,
}

impl<P: ShaderProgram> RenderSelector<P> {
    /// Build a selector; pass `None` to use triangles only.
    pub fn new(shader: Option<ShaderRenderer<P>>) -> Self {
        Self {
            shader,
            triangles: TriangleRenderer::new(),
            last_path: None,
            shader_failure: None,
        }
    }

    /// Whether frames will be attempted with the shader.
    pub fn shader_active(&self) -> bool {
        self.shader.is_some()
    }

    /// Path used for the most recent frame.
    pub fn last_path(&self) -> Option<RenderPath> {
        self.last_path
    }

    /// The error that disabled the shader path, if any.
    pub fn shader_failure(&self) -> Option<&RenderError> {
        self.shader_failure.as_ref()
    }

    /// Shader renderer, while still active.
    pub fn shader(&self) -> Option<&ShaderRenderer<P>> {
        self.shader.as_ref()
    }

    /// Triangle renderer (holds the last triangle mesh).
    pub fn triangles(&self) -> &TriangleRenderer {
        &self.triangles
    }

    /// Mutable triangle renderer, e.g. to take its mesh.
    pub fn triangles_mut(&mut self) -> &mut TriangleRenderer {
        &mut self.triangles
    }
}

impl<P: ShaderProgram> AuroraRenderer for RenderSelector<P> {
    fn name(&self) -> &'static str {
        match self.shader {
            Some(_) => "selector(shader)",
            None => "selector(triangles)",
        }
    }

    fn render(&mut self, frame: &AuroraFrame<'_>) -> Result<(), RenderError> {
        if let Some(shader) = self.shader.as_mut() {
            match shader.render(frame) {
                Ok(()) => {
                    self.last_path = Some(RenderPath::Shader);
                    return Ok(());
                }
                Err(err) => {
                    warn!(error = %err, "aurora shader disabled; falling back to triangles");
                    self.shader = None;
                    self.shader_failure = Some(err);
                }
            }
        }
        self.triangles.render(frame)?;
        self.last_path = Some(RenderPath::Triangles);
        Ok(())
    }
}
