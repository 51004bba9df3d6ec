//! Fade-in/fade-out life cycle of one aurora.

use serde::{Deserialize, Serialize};

use crate::AuroraError;

/// Default age at which an aurora is fully visible.
pub const DEFAULT_PEAK_AGE: u32 = 512;
/// Default age change per tick.
pub const DEFAULT_AGE_RATE: u32 = 1;

/// Life-cycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifeState {
    /// Alive and fading in (or holding at peak).
    Growing,
    /// Alive and fading out.
    Fading,
    /// Faded out completely. Terminal.
    Dead,
}

/// Bounded age counter driving an aurora's alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifeTracker {
    age: u32,
    peak_age: u32,
    age_rate: u32,
    state: LifeState,
}

impl LifeTracker {
    /// Start a tracker at age 0, growing.
    pub fn new(peak_age: u32, age_rate: u32) -> Result<Self, AuroraError> {
        if peak_age == 0 || age_rate == 0 {
            return Err(AuroraError::InvalidLifespan { peak_age, age_rate });
        }
        Ok(Self {
            age: 0,
            peak_age,
            age_rate,
            state: LifeState::Growing,
        })
    }

    /// Advance one tick.
    pub fn update(&mut self) {
        match self.state {
            LifeState::Growing => {
                self.age = self.age.saturating_add(self.age_rate).min(self.peak_age);
            }
            LifeState::Fading => {
                self.age = self.age.saturating_sub(self.age_rate);
                if self.age == 0 {
                    self.state = LifeState::Dead;
                }
            }
            LifeState::Dead => {}
        }
    }

    /// Start or stop fading out. Has no effect once the tracker is dead.
    pub fn set_fading(&mut self, fading: bool) {
        self.state = match (self.state, fading) {
            (LifeState::Dead, _) => LifeState::Dead,
            (_, true) => LifeState::Fading,
            (_, false) => LifeState::Growing,
        };
    }

    /// Current age.
    pub fn age(&self) -> u32 {
        self.age
    }

    /// Age at which the aurora is fully visible.
    pub fn peak_age(&self) -> u32 {
        self.peak_age
    }

    /// Current state.
    pub fn state(&self) -> LifeState {
        self.state
    }

    /// `age / peak_age`, in `[0, 1]`.
    pub fn age_ratio(&self) -> f32 {
        self.age as f32 / self.peak_age as f32
    }

    /// False once faded out.
    pub fn is_alive(&self) -> bool {
        self.state != LifeState::Dead
    }

    /// True while fading out, and after dying from a fade.
    pub fn is_fading(&self) -> bool {
        self.state != LifeState::Growing
    }

    /// Whether the owner can drop this aurora.
    pub fn is_complete(&self) -> bool {
        !self.is_alive()
    }
}

impl Default for LifeTracker {
    fn default() -> Self {
        Self {
            age: 0,
            peak_age: DEFAULT_PEAK_AGE,
            age_rate: DEFAULT_AGE_RATE,
            state: LifeState::Growing,
        }
    }
}
