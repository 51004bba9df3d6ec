//! Shader-driven aurora: one quad bounding the bands plus a small uniform block.

use borealis_aurora::{AuroraBand, AuroraFrame, AuroraRenderer, RenderError};
use thiserror::Error;
use wgpu::naga;

/// Name of the WGSL struct carrying the aurora uniforms.
pub const UNIFORM_STRUCT: &str = "AuroraUniform";

/// Fields [`UNIFORM_STRUCT`] must declare.
pub const REQUIRED_UNIFORMS: [&str; 6] = [
    "time",
    "resolution",
    "topColor",
    "middleColor",
    "bottomColor",
    "alpha",
];

/// Fragment shader for the quad path.
pub const AURORA_SHADER_WGSL: &str = r#"
struct AuroraUniform {
    topColor: vec4<f32>,
    middleColor: vec4<f32>,
    bottomColor: vec4<f32>,
    resolution: vec2<f32>,
    time: f32,
    alpha: f32,
};

@group(0) @binding(0)
var<uniform> aurora: AuroraUniform;

fn curtain(x: f32, t: f32) -> f32 {
    let wave = sin(x * 6.0 + t * 0.7) * 0.5 + sin(x * 13.0 - t * 1.3) * 0.25;
    return 0.55 + wave * 0.2;
}

@fragment
fn fs_main(@builtin(position) frag: vec4<f32>) -> @location(0) vec4<f32> {
    let uv = frag.xy / max(aurora.resolution, vec2<f32>(1.0, 1.0));
    let height = 1.0 - uv.y;
    let edge = curtain(uv.x, aurora.time);
    let glow = 1.0 - smoothstep(0.0, edge, height);
    let low_t = clamp(height * 2.0, 0.0, 1.0);
    let high_t = clamp(height * 2.0 - 1.0, 0.0, 1.0);
    let lower = mix(aurora.bottomColor, aurora.middleColor, vec4<f32>(low_t));
    let color = mix(lower, aurora.topColor, vec4<f32>(high_t));
    let fade = sin(uv.x * 3.14159265);
    return vec4<f32>(color.rgb, glow * fade * aurora.alpha);
}
"#;

/// Errors reported by a shader program.
#[derive(Debug, Error, PartialEq)]
pub enum ShaderError {
    /// WGSL failed to parse.
    #[error("shader source failed to parse: {0}")]
    Parse(String),
    /// WGSL parsed but the module is invalid.
    #[error("shader module failed validation: {0}")]
    Validation(String),
    /// Source has no `AuroraUniform` struct.
    #[error("shader source does not declare struct `AuroraUniform`")]
    MissingUniformBlock,
    /// The uniform struct lacks a field the renderer feeds.
    #[error("shader source does not declare uniform `{0}`")]
    MissingUniform(&'static str),
    /// A uniform value was NaN or infinite.
    #[error("uniform block contains non-finite values")]
    NonFiniteUniform,
    /// The quad has non-finite or negative extents.
    #[error("quad extents are invalid: {0:?}")]
    InvalidQuad([f32; 2]),
    /// Draw issued before any uniforms were bound.
    #[error("draw issued before uniforms were bound")]
    Unbound,
}

impl From<ShaderError> for RenderError {
    fn from(err: ShaderError) -> Self {
        match err {
            ShaderError::Parse(_)
            | ShaderError::Validation(_)
            | ShaderError::MissingUniformBlock
            | ShaderError::MissingUniform(_) => RenderError::ShaderCompile(err.to_string()),
            ShaderError::NonFiniteUniform | ShaderError::InvalidQuad(_) | ShaderError::Unbound => {
                RenderError::ShaderDraw(err.to_string())
            }
        }
    }
}

/// GPU uniform block for the quad path (64 bytes, std140 compatible).
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct AuroraShaderUniform {
    /// Fade color at the top of the curtain.
    pub top_color: [f32; 4],
    /// Middle of the gradient.
    pub middle_color: [f32; 4],
    /// Base color at the bottom of the curtain.
    pub bottom_color: [f32; 4],
    /// Quad size in world units.
    pub resolution: [f32; 2],
    /// Monotonic animation time in seconds.
    pub time: f32,
    /// Fade ratio in `[0, 1]`.
    pub alpha: f32,
}

impl AuroraShaderUniform {
    /// Fill the uniform block for `frame` drawn onto `quad`.
    pub fn from_frame(frame: &AuroraFrame<'_>, quad: &AuroraQuad) -> Self {
        Self {
            top_color: frame.colors.fade.to_rgba(1.0),
            middle_color: frame.colors.middle.to_rgba(1.0),
            bottom_color: frame.colors.base.to_rgba(1.0),
            resolution: quad.size,
            time: frame.time_seconds,
            alpha: frame.age_ratio(),
        }
    }

    /// Whether every field is finite.
    pub fn is_finite(&self) -> bool {
        bytemuck::cast_slice::<Self, f32>(std::slice::from_ref(self))
            .iter()
            .all(|value| value.is_finite())
    }
}

/// Vertical quad in the XY plane spanning the aurora.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AuroraQuad {
    /// Lower-left corner.
    pub origin: [f32; 3],
    /// Width (X) and height (Y).
    pub size: [f32; 2],
}

impl AuroraQuad {
    /// Corners counter-clockwise from the lower-left.
    pub fn corners(&self) -> [[f32; 3]; 4] {
        let [x, y, z] = self.origin;
        let [w, h] = self.size;
        [[x, y, z], [x + w, y, z], [x + w, y + h, z], [x, y + h, z]]
    }
}

/// Smallest quad covering every displaced node, at most `2 * render_distance` wide.
///
/// Returns `None` when no band has any nodes.
pub fn bounding_quad(bands: &[AuroraBand], render_distance: f32) -> Option<AuroraQuad> {
    let mut nodes = bands.iter().flat_map(|band| band.nodes());
    let first = nodes.next()?.displaced();
    let (mut min_x, mut max_x) = (first.x, first.x);
    let (mut min_z, mut max_z) = (first.z, first.z);
    let mut top = first.y;
    for node in nodes {
        let p = node.displaced();
        min_x = min_x.min(p.x);
        max_x = max_x.max(p.x);
        min_z = min_z.min(p.z);
        max_z = max_z.max(p.z);
        top = top.max(p.y);
    }

    let width = (max_x - min_x).min(2.0 * render_distance.max(0.0));
    let centre_x = (min_x + max_x) * 0.5;
    Some(AuroraQuad {
        origin: [centre_x - width * 0.5, 0.0, (min_z + max_z) * 0.5],
        size: [width, top.max(0.0)],
    })
}

/// Backend that owns a compiled aurora shader.
pub trait ShaderProgram {
    /// Upload the uniform block.
    fn bind(&mut self, uniform: &AuroraShaderUniform) -> Result<(), ShaderError>;

    /// Draw the textured quad with the bound uniforms.
    fn draw(&mut self, quad: &AuroraQuad) -> Result<(), ShaderError>;
}

/// In-process shader program used when no GPU backend is attached.
///
/// The source goes through the same naga front end and validator a GPU
/// backend would use; uniform values are checked at bind/draw time.
#[derive(Debug, Clone, Default)]
pub struct HeadlessShaderProgram {
    bound: Option<AuroraShaderUniform>,
    last_quad: Option<AuroraQuad>,
    draws: u64,
}

impl HeadlessShaderProgram {
    /// Parse and validate `source`, then check that [`UNIFORM_STRUCT`]
    /// declares every field in [`REQUIRED_UNIFORMS`].
    pub fn compile(source: &str) -> Result<Self, ShaderError> {
        let module = naga::front::wgsl::parse_str(source)
            .map_err(|err| ShaderError::Parse(err.emit_to_string(source)))?;

        let mut validator = naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        );
        validator
            .validate(&module)
            .map_err(|err| ShaderError::Validation(err.emit_to_string(source)))?;

        let members = uniform_members(&module).ok_or(ShaderError::MissingUniformBlock)?;
        for name in REQUIRED_UNIFORMS {
            if !members.iter().any(|m| m.name.as_deref() == Some(name)) {
                return Err(ShaderError::MissingUniform(name));
            }
        }
        Ok(Self::default())
    }

    /// Last uniform block bound.
    pub fn bound(&self) -> Option<&AuroraShaderUniform> {
        self.bound.as_ref()
    }

    /// Last quad drawn.
    pub fn last_quad(&self) -> Option<&AuroraQuad> {
        self.last_quad.as_ref()
    }

    /// Number of draws issued.
    pub fn draws(&self) -> u64 {
        self.draws
    }
}

fn uniform_members(module: &naga::Module) -> Option<&[naga::StructMember]> {
    module
        .types
        .iter()
        .filter(|(_, ty)| ty.name.as_deref() == Some(UNIFORM_STRUCT))
        .find_map(|(_, ty)| match &ty.inner {
            naga::TypeInner::Struct { members, .. } => Some(members.as_slice()),
            _ => None,
        })
}

impl ShaderProgram for HeadlessShaderProgram {
    fn bind(&mut self, uniform: &AuroraShaderUniform) -> Result<(), ShaderError> {
        if !uniform.is_finite() {
            return Err(ShaderError::NonFiniteUniform);
        }
        self.bound = Some(*uniform);
        Ok(())
    }

    fn draw(&mut self, quad: &AuroraQuad) -> Result<(), ShaderError> {
        if self.bound.is_none() {
            return Err(ShaderError::Unbound);
        }
        let valid = quad.origin.iter().chain(&quad.size).all(|v| v.is_finite())
            && quad.size.iter().all(|&v| v >= 0.0);
        if !valid {
            return Err(ShaderError::InvalidQuad(quad.size));
        }
        self.last_quad = Some(*quad);
        self.draws += 1;
        Ok(())
    }
}

/// Render strategy drawing one shader quad per frame.
#[derive(Debug)]
pub struct ShaderRenderer<P> {
    program: P,
    render_distance: f32,
}

impl<P: ShaderProgram> ShaderRenderer<P> {
    /// Wrap a compiled program; the quad never grows wider than `2 * render_distance`.
    pub fn new(program: P, render_distance: f32) -> Self {
        Self {
            program,
            render_distance,
        }
    }

    /// The wrapped program.
    pub fn program(&self) -> &P {
        &self.program
    }
}

impl<P: ShaderProgram> AuroraRenderer for ShaderRenderer<P> {
    fn name(&self) -> &'static str {
        "shader"
    }

    fn render(&mut self, frame: &AuroraFrame<'_>) -> Result<(), RenderError> {
        let quad =
            bounding_quad(frame.bands, self.render_distance).ok_or(RenderError::EmptyFrame)?;
        let uniform = AuroraShaderUniform::from_frame(frame, &quad);
        self.program.bind(&uniform)?;
        self.program.draw(&quad)?;
        Ok(())
    }
}
