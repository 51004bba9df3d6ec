use thiserror::Error;

/// Errors raised while building aurora geometry or life-cycle state.
#[derive(Debug, Error, PartialEq)]
pub enum AuroraError {
    /// Geometry preset cannot produce a well-formed band.
    #[error("invalid aurora geometry: {reason}")]
    InvalidGeometry {
        /// Which constraint was violated.
        reason: String,
    },
    /// Life tracker needs a positive peak age and rate.
    #[error("invalid life span: peak age {peak_age}, age rate {age_rate}")]
    InvalidLifespan {
        /// Requested peak age.
        peak_age: u32,
        /// Requested per-tick age delta.
        age_rate: u32,
    },
    /// The color palette could not be sampled.
    #[error("failed to pick aurora colors: {0}")]
    Palette(#[from] rand::distributions::WeightedError),
}

/// Errors surfaced by render strategies.
///
/// None of these are fatal to the host; callers are expected to degrade.
#[derive(Debug, Error, PartialEq)]
pub enum RenderError {
    /// Shader program failed to compile or link.
    #[error("aurora shader failed to compile: {0}")]
    ShaderCompile(String),
    /// Shader program rejected a uniform upload or draw.
    #[error("aurora shader failed while drawing: {0}")]
    ShaderDraw(String),
    /// Frame had no geometry to draw.
    #[error("aurora frame has no bands")]
    EmptyFrame,
}
