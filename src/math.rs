use serde::{Deserialize, Serialize};

const EPSILON: f32 = 1.0e-6;

/// Agents are modelled with their nose pointing down +X.
pub const DEFAULT_FACING: MotionSample = MotionSample::new(1.0, 0.0, 0.0);

/// A point in world space sampled at one instant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MotionSample {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl MotionSample {
    pub const ORIGIN: MotionSample = MotionSample::new(0.0, 0.0, 0.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn axis(self, axis: usize) -> f32 {
        match axis {
            0 => self.x,
            1 => self.y,
            2 => self.z,
            _ => unreachable!("axis index {axis} out of range"),
        }
    }

    pub fn set_axis(&mut self, axis: usize, value: f32) {
        match axis {
            0 => self.x = value,
            1 => self.y = value,
            2 => self.z = value,
            _ => unreachable!("axis index {axis} out of range"),
        }
    }

    pub fn as_tuple(self) -> (f32, f32, f32) {
        (self.x, self.y, self.z)
    }

    pub fn lerp(self, other: MotionSample, t: f32) -> MotionSample {
        MotionSample::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
            self.z + (other.z - self.z) * t,
        )
    }
}

impl From<(f32, f32, f32)> for MotionSample {
    fn from((x, y, z): (f32, f32, f32)) -> Self {
        Self::new(x, y, z)
    }
}

pub fn distance_sq_3d(dx: f32, dy: f32, dz: f32) -> f32 {
    dx * dx + dy * dy + dz * dz
}

pub fn normalize_or_default(
    x: f32,
    y: f32,
    z: f32,
    default_x: f32,
    default_y: f32,
    default_z: f32,
) -> (f32, f32, f32) {
    let len_sq = distance_sq_3d(x, y, z);
    if len_sq <= EPSILON || !len_sq.is_finite() {
        return (default_x, default_y, default_z);
    }
    let inv_len = 1.0 / len_sq.sqrt();
    (x * inv_len, y * inv_len, z * inv_len)
}

/// Unit vector pointing away from `target` through `position`.
///
/// The agent aims its tail at the target, so a target one step behind makes
/// it face along its direction of travel. When both points coincide the
/// previous facing is kept.
pub fn facing_away_from(
    position: MotionSample,
    target: MotionSample,
    previous: MotionSample,
) -> MotionSample {
    normalize_or_default(
        position.x - target.x,
        position.y - target.y,
        position.z - target.z,
        previous.x,
        previous.y,
        previous.z,
    )
    .into()
}

pub fn clamp_finite(value: f32, min: f32, max: f32, fallback: f32) -> f32 {
    if !value.is_finite() {
        return fallback;
    }
    value.clamp(min, max)
}
