use anyhow::Result;
use borealis_aurora::{AuroraOptions, BandShape, MAX_BANDS};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use tracing::warn;

pub const DEFAULT_CONFIG_PATH: &str = "config/aurora.toml";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AuroraConfig {
    /// Master switch for the effect.
    pub enabled: bool,
    /// Prefer the shader quad; falls back to triangles on failure.
    pub use_shader: bool,
    /// Cap on bands per aurora (1..=3).
    pub max_bands: u8,
    /// Age at which an aurora reaches full brightness.
    pub peak_age: u32,
    /// Age change per tick while growing or fading.
    pub age_rate: u32,
    /// Horizontal reach of the sky in blocks; bounds the shader quad.
    pub render_distance: f32,
    pub world_seed: u64,
    /// Whether the observer stands in a biome where auroras appear.
    pub eligible_biome: bool,
}

impl Default for AuroraConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            use_shader: false,
            max_bands: MAX_BANDS,
            peak_age: 512,
            age_rate: 1,
            render_distance: 512.0,
            world_seed: 0,
            eligible_biome: true,
        }
    }
}

impl AuroraConfig {
    /// Load configuration from an explicit path, falling back to defaults on errors.
    pub fn load_from_path(path: &Path) -> Self {
        let config = match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<AuroraConfig>(&contents) {
                Ok(cfg) => cfg,
                Err(err) => {
                    warn!("Failed to parse {}: {err}. Using defaults", path.display());
                    AuroraConfig::default()
                }
            },
            Err(err) => {
                if err.kind() == std::io::ErrorKind::NotFound {
                    warn!(
                        "Aurora config not found at {}. Using defaults",
                        path.display()
                    );
                } else {
                    warn!("Failed to read {}: {err}. Using defaults", path.display());
                }
                AuroraConfig::default()
            }
        };
        config.sanitized()
    }

    /// Save configuration to an explicit path.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        let toml = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        Ok(())
    }

    /// Clamp every field into the range the aurora core accepts.
    pub fn sanitized(mut self) -> Self {
        self.max_bands = self.max_bands.clamp(1, MAX_BANDS);
        self.peak_age = self.peak_age.max(1);
        self.age_rate = self.age_rate.max(1);
        if !(self.render_distance.is_finite() && self.render_distance > 0.0) {
            warn!(
                render_distance = self.render_distance,
                "render_distance must be positive; using default"
            );
            self.render_distance = AuroraConfig::default().render_distance;
        }
        self
    }

    /// Spawn options for an aurora drawn by the selected render path.
    pub fn aurora_options(&self, shader: bool) -> AuroraOptions {
        AuroraOptions {
            max_bands: self.max_bands,
            shape: BandShape {
                no_taper: shader,
                fixed_height: shader,
            },
            peak_age: self.peak_age,
            age_rate: self.age_rate,
        }
    }
}
