#![warn(missing_docs)]
//! Procedural aurora core: ribbon geometry, travelling-wave animation and the
//! fade-in/fade-out life cycle, independent of any rendering backend.

mod aurora;
mod band;
mod color;
mod error;
mod geometry;
mod node;
mod renderer;
mod tracker;

pub use aurora::{Aurora, AuroraOptions, MAX_BANDS};
pub use band::{
    AuroraBand, BandShape, TurnWalk, FIXED_HEIGHT, MAX_TURN_DEGREES, NODES_PER_GROUP,
    VERTICAL_AMPLITUDE, WAVELENGTH, WAVE_AMPLITUDE, WAVE_SPEED,
};
pub use color::{Color, ColorSet};
pub use error::{AuroraError, RenderError};
pub use geometry::AuroraGeometry;
pub use node::Node;
pub use renderer::{AuroraFrame, AuroraRenderer};
pub use tracker::{LifeState, LifeTracker, DEFAULT_AGE_RATE, DEFAULT_PEAK_AGE};
