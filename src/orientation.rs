use crate::math::{facing_away_from, MotionSample, DEFAULT_FACING};

/// Position history an agent keeps to steer its facing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FacingState {
    /// Position recorded by the previous evaluation.
    pub last: MotionSample,
    /// Unit direction the agent currently faces.
    pub facing: MotionSample,
    pub face_forward: bool,
}

/// Result of one orientation update.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FacingUpdate {
    /// Point the agent aims its tail at.
    pub target: MotionSample,
    pub facing: MotionSample,
}

impl FacingState {
    pub fn new(position: MotionSample) -> Self {
        Self {
            last: position,
            facing: DEFAULT_FACING,
            face_forward: true,
        }
    }

    /// Aims at the position recorded one evaluation ago, then records the
    /// current one. With face-forward off the target is the agent itself,
    /// so its facing does not change.
    pub fn update(&mut self, position: MotionSample) -> FacingUpdate {
        let target = if self.face_forward {
            self.last
        } else {
            position
        };
        self.facing = facing_away_from(position, target, self.facing);
        self.last = position;

        FacingUpdate {
            target,
            facing: self.facing,
        }
    }
}
