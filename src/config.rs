use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::HerdError;

pub const MIN_POPULATION: u32 = 0;
pub const MAX_POPULATION: u32 = 200;
pub const DEFAULT_POPULATION: u32 = 10;
pub const MIN_STRAY: f32 = 0.0;
pub const MAX_STRAY: f32 = 100.0;
pub const DEFAULT_STRAY: f32 = 10.0;
pub const MIN_LEADER_FOCUS: f32 = 0.0;
pub const MAX_LEADER_FOCUS: f32 = 1.0;
pub const DEFAULT_LEADER_FOCUS: f32 = 0.5;
// Each member starts at most this many frames after the one before it.
pub const MIN_FRAME_OFFSET: f32 = 0.0;
pub const MAX_FRAME_OFFSET: f32 = 10.0;
pub const DEFAULT_FRAME_OFFSET: f32 = 1.0;
pub const MIN_RANDOMNESS: f32 = 0.0;
pub const MAX_RANDOMNESS: f32 = 1.0;
pub const DEFAULT_RANDOMNESS: f32 = 0.5;

/// Parameters shared by every agent of a herd.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HerdConfig {
    /// Number of agents created on build.
    pub population: u32,
    /// Largest per-axis offset an agent may take from its leader sample.
    pub stray: f32,
    /// Damping applied to the stray radius of agents far along the phase.
    pub leader_focus: f32,
    /// Frames of lag per unit of phase.
    pub frame_offset: f32,
    /// Scale of the random phase jitter.
    pub randomness: f32,
}

impl Default for HerdConfig {
    fn default() -> Self {
        Self {
            population: DEFAULT_POPULATION,
            stray: DEFAULT_STRAY,
            leader_focus: DEFAULT_LEADER_FOCUS,
            frame_offset: DEFAULT_FRAME_OFFSET,
            randomness: DEFAULT_RANDOMNESS,
        }
    }
}

impl HerdConfig {
    pub fn validate(&self) -> Result<(), HerdError> {
        let result = check_range(
            "population",
            self.population as f32,
            MIN_POPULATION as f32,
            MAX_POPULATION as f32,
        )
        .and_then(|_| check_range("stray", self.stray, MIN_STRAY, MAX_STRAY))
        .and_then(|_| {
            check_range(
                "leader_focus",
                self.leader_focus,
                MIN_LEADER_FOCUS,
                MAX_LEADER_FOCUS,
            )
        })
        .and_then(|_| {
            check_range(
                "frame_offset",
                self.frame_offset,
                MIN_FRAME_OFFSET,
                MAX_FRAME_OFFSET,
            )
        })
        .and_then(|_| {
            check_range(
                "randomness",
                self.randomness,
                MIN_RANDOMNESS,
                MAX_RANDOMNESS,
            )
        });

        if let Err(err) = &result {
            warn!(%err, "rejected herd configuration");
        }
        result
    }

    /// Returns a copy with the live motion values replaced.
    pub fn with_motion(self, edit: MotionEdit) -> Self {
        Self {
            stray: edit.stray,
            leader_focus: edit.leader_focus,
            frame_offset: edit.frame_offset,
            randomness: edit.randomness,
            ..self
        }
    }

    pub fn motion(&self) -> MotionEdit {
        MotionEdit {
            stray: self.stray,
            leader_focus: self.leader_focus,
            frame_offset: self.frame_offset,
            randomness: self.randomness,
        }
    }

    pub fn from_json(text: &str) -> Result<Self, HerdError> {
        let config: HerdConfig =
            serde_json::from_str(text).map_err(|err| HerdError::ConfigFormat(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, HerdError> {
        serde_json::to_string(self).map_err(|err| HerdError::ConfigFormat(err.to_string()))
    }
}

/// The four values that can be changed on a built herd without rebuilding.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MotionEdit {
    pub stray: f32,
    pub leader_focus: f32,
    pub frame_offset: f32,
    pub randomness: f32,
}

fn check_range(field: &'static str, value: f32, min: f32, max: f32) -> Result<(), HerdError> {
    if value.is_finite() && value >= min && value <= max {
        return Ok(());
    }
    Err(HerdError::InvalidConfiguration {
        field,
        value: value as f64,
        min: min as f64,
        max: max as f64,
    })
}
