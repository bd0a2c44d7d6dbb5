use serde::{Deserialize, Serialize};

use crate::math::{clamp_finite, MotionSample};

/// Time-indexed position of the leader.
///
/// Implementations must answer for every `time`, including fractional
/// frames and frames outside the authored range, and must return the same
/// value for the same time.
pub trait LeaderSignal {
    fn position_at(&self, time: f32) -> MotionSample;
}

impl<F> LeaderSignal for F
where
    F: Fn(f32) -> MotionSample,
{
    fn position_at(&self, time: f32) -> MotionSample {
        self(time)
    }
}

/// A leader that never moves.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StaticSignal(pub MotionSample);

impl LeaderSignal for StaticSignal {
    fn position_at(&self, _time: f32) -> MotionSample {
        self.0
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Interpolation {
    /// Hold each key until the next one.
    Step,
    #[default]
    Linear,
    /// Catmull-Rom through the neighbouring keys.
    Smooth,
}

impl Interpolation {
    pub fn from_u32(value: u32) -> Self {
        match value {
            0 => Self::Step,
            2 => Self::Smooth,
            _ => Self::Linear,
        }
    }

    pub fn as_u32(self) -> u32 {
        match self {
            Self::Step => 0,
            Self::Linear => 1,
            Self::Smooth => 2,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub time: f32,
    pub position: MotionSample,
}

/// Keyed leader translation. Values before the first key and after the last
/// one are held constant.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyframeTrack {
    keys: Vec<Keyframe>,
    interpolation: Interpolation,
}

impl KeyframeTrack {
    pub fn new(interpolation: Interpolation) -> Self {
        Self {
            keys: Vec::new(),
            interpolation,
        }
    }

    pub fn from_keys<I>(keys: I, interpolation: Interpolation) -> Self
    where
        I: IntoIterator<Item = (f32, MotionSample)>,
    {
        let mut track = Self::new(interpolation);
        for (time, position) in keys {
            track.set_key(time, position);
        }
        track
    }

    /// Inserts a key, replacing any key already at `time`. Non-finite times
    /// are ignored.
    pub fn set_key(&mut self, time: f32, position: MotionSample) {
        if !time.is_finite() {
            return;
        }
        let time = normalize_time(time);
        match self.keys.binary_search_by(|key| key.time.total_cmp(&time)) {
            Ok(index) => self.keys[index].position = position,
            Err(index) => self.keys.insert(index, Keyframe { time, position }),
        }
    }

    pub fn remove_key(&mut self, time: f32) -> Option<Keyframe> {
        let time = normalize_time(time);
        let index = self
            .keys
            .binary_search_by(|key| key.time.total_cmp(&time))
            .ok()?;
        Some(self.keys.remove(index))
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }

    pub fn keys(&self) -> &[Keyframe] {
        &self.keys
    }

    pub fn key_count(&self) -> usize {
        self.keys.len()
    }

    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    pub fn set_interpolation(&mut self, interpolation: Interpolation) {
        self.interpolation = interpolation;
    }

    fn segment_value(&self, upper: usize, time: f32) -> MotionSample {
        let a = self.keys[upper - 1];
        let b = self.keys[upper];
        let t = clamp_finite((time - a.time) / (b.time - a.time), 0.0, 1.0, 0.0);

        match self.interpolation {
            Interpolation::Step => a.position,
            Interpolation::Linear => a.position.lerp(b.position, t),
            Interpolation::Smooth => {
                let before = if upper >= 2 {
                    self.keys[upper - 2].position
                } else {
                    a.position
                };
                let after = self
                    .keys
                    .get(upper + 1)
                    .map_or(b.position, |key| key.position);
                catmull_rom(before, a.position, b.position, after, t)
            }
        }
    }
}

impl LeaderSignal for KeyframeTrack {
    fn position_at(&self, time: f32) -> MotionSample {
        let (first, last) = match (self.keys.first(), self.keys.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return MotionSample::ORIGIN,
        };
        if !time.is_finite() || time <= first.time {
            return first.position;
        }
        if time >= last.time {
            return last.position;
        }

        // First key strictly after `time`; always in 1..len here.
        let upper = self.keys.partition_point(|key| key.time <= time);
        self.segment_value(upper, time)
    }
}

// Folds -0.0 into 0.0 so both address the same key.
fn normalize_time(time: f32) -> f32 {
    time + 0.0
}

fn catmull_rom(
    p0: MotionSample,
    p1: MotionSample,
    p2: MotionSample,
    p3: MotionSample,
    t: f32,
) -> MotionSample {
    let mut out = MotionSample::ORIGIN;
    let t2 = t * t;
    let t3 = t2 * t;
    for axis in 0..3 {
        let (a, b, c, d) = (p0.axis(axis), p1.axis(axis), p2.axis(axis), p3.axis(axis));
        let value = 0.5
            * ((2.0 * b)
                + (-a + c) * t
                + (2.0 * a - 5.0 * b + 4.0 * c - d) * t2
                + (-a + 3.0 * b - 3.0 * c + d) * t3);
        out.set_axis(axis, value);
    }
    out
}
