//! Per-agent derivation of a position from the leader's trajectory.
//!
//! Each agent samples the leader at a lagged time and adds a per-axis
//! offset. Both the lag and the offset come from the agent's fixed jitter,
//! the herd size it was created into and the herd's live configuration:
//!
//! ```text
//! herd_var    = phase_jitter * randomness + index
//! stray_r     = stray * min(1, |herd_var| * (1 - focus) / (focus * population))
//! sample_time = -herd_var * frame_offset + frame + frame_adjust
//! position[a] = axis_jitter[a] * stray_r + leader(sample_time)[a]
//! ```
//!
//! The damping term is skipped when focus or population is zero.

use crate::config::HerdConfig;
use crate::jitter::AgentJitter;
use crate::math::MotionSample;
use crate::signal::LeaderSignal;

/// Fixed inputs of one agent's motion formula.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AgentMotion {
    pub index: usize,
    pub jitter: AgentJitter,
    /// Population of the herd at creation; the damping divisor.
    pub herd_size: u32,
    /// Manual time bias in frames; never set by the herd itself.
    pub frame_adjust: f32,
}

impl AgentMotion {
    pub fn new(index: usize, jitter: AgentJitter, herd_size: u32) -> Self {
        Self {
            index,
            jitter,
            herd_size,
            frame_adjust: 0.0,
        }
    }

    pub fn herd_var(&self, config: &HerdConfig) -> f32 {
        self.jitter.phase * config.randomness + self.index as f32
    }

    pub fn stray_radius(&self, config: &HerdConfig) -> f32 {
        focus_damped_stray(
            config.stray,
            config.leader_focus,
            self.herd_size,
            self.herd_var(config),
        )
    }

    pub fn sample_time(&self, config: &HerdConfig, frame: f32) -> f32 {
        -self.herd_var(config) * config.frame_offset + frame + self.frame_adjust
    }

    pub fn axis_offsets(&self, config: &HerdConfig) -> MotionSample {
        let radius = self.stray_radius(config);
        MotionSample::new(
            self.jitter.axis[0] * radius,
            self.jitter.axis[1] * radius,
            self.jitter.axis[2] * radius,
        )
    }

    pub fn evaluate<S>(&self, config: &HerdConfig, signal: &S, frame: f32) -> MotionSample
    where
        S: LeaderSignal + ?Sized,
    {
        let radius = self.stray_radius(config);
        let leader = signal.position_at(self.sample_time(config, frame));

        let mut position = MotionSample::ORIGIN;
        for axis in 0..3 {
            position.set_axis(axis, self.jitter.axis[axis] * radius + leader.axis(axis));
        }
        position
    }
}

/// Shrinks `stray` for agents with a large phase when the herd is focused.
pub fn focus_damped_stray(stray: f32, leader_focus: f32, population: u32, herd_var: f32) -> f32 {
    if leader_focus == 0.0 || population == 0 {
        return stray;
    }
    let damping = herd_var.abs() * (1.0 - leader_focus) / (leader_focus * population as f32);
    stray * damping.min(1.0)
}

#[cfg(test)]
mod tests {
    use super::{focus_damped_stray, AgentMotion};
    use crate::config::HerdConfig;
    use crate::jitter::{AgentJitter, RandomOffsetGenerator};
    use crate::math::MotionSample;
    use crate::signal::{Interpolation, KeyframeTrack, StaticSignal};

    const EPS: f32 = 1.0e-5;

    fn example_config() -> HerdConfig {
        HerdConfig {
            population: 5,
            stray: 10.0,
            leader_focus: 0.5,
            frame_offset: 1.0,
            randomness: 0.5,
        }
    }

    fn line_track() -> KeyframeTrack {
        KeyframeTrack::from_keys(
            [
                (0.0, MotionSample::new(0.0, 0.0, 0.0)),
                (100.0, MotionSample::new(100.0, 50.0, 0.0)),
            ],
            Interpolation::Linear,
        )
    }

    #[test]
    fn phase_is_index_ordered_without_randomness() {
        let config = HerdConfig {
            randomness: 0.0,
            ..example_config()
        };
        let jitter = AgentJitter {
            phase: 0.4,
            axis: [0.0; 3],
        };
        for index in 0..5 {
            let motion = AgentMotion::new(index, jitter, config.population);
            assert_eq!(motion.herd_var(&config), index as f32);
        }
    }

    #[test]
    fn damping_follows_focus_rule() {
        // |herd_var| * (1 - f) / (f * pop) = 2 * 0.5 / (0.5 * 5) = 0.4
        assert!((focus_damped_stray(10.0, 0.5, 5, 2.0) - 4.0).abs() < EPS);
        assert!((focus_damped_stray(10.0, 0.5, 5, -2.0) - 4.0).abs() < EPS);
        // Far along the phase the factor clamps to one.
        assert_eq!(focus_damped_stray(10.0, 0.5, 5, 50.0), 10.0);
        // Full focus pins every agent to the leader.
        assert_eq!(focus_damped_stray(10.0, 1.0, 5, 3.0), 0.0);
    }

    #[test]
    fn zero_focus_skips_damping() {
        assert_eq!(focus_damped_stray(10.0, 0.0, 5, 0.1), 10.0);
    }

    #[test]
    fn zero_population_skips_damping() {
        let radius = focus_damped_stray(10.0, 0.5, 0, 0.25);
        assert_eq!(radius, 10.0);
        assert!(radius.is_finite());
    }

    #[test]
    fn tiny_focus_matches_zero_focus_at_clamp() {
        let motion = AgentMotion::new(
            3,
            AgentJitter {
                phase: 0.2,
                axis: [0.1, -0.3, 0.4],
            },
            200,
        );
        let unfocused = HerdConfig {
            leader_focus: 0.0,
            population: 200,
            ..example_config()
        };
        let barely = HerdConfig {
            leader_focus: 1.0e-4,
            ..unfocused
        };
        assert_eq!(motion.stray_radius(&unfocused), motion.stray_radius(&barely));
    }

    #[test]
    fn sample_time_lags_by_phase() {
        let config = HerdConfig {
            randomness: 0.0,
            frame_offset: 2.0,
            ..example_config()
        };
        let mut motion = AgentMotion::new(3, AgentJitter::default(), 5);
        assert!((motion.sample_time(&config, 20.0) - 14.0).abs() < EPS);

        motion.frame_adjust = 1.5;
        assert!((motion.sample_time(&config, 20.0) - 15.5).abs() < EPS);

        let no_offset = HerdConfig {
            frame_offset: 0.0,
            ..config
        };
        assert!((motion.sample_time(&no_offset, 20.0) - 21.5).abs() < EPS);
    }

    #[test]
    fn agents_trail_a_moving_leader() {
        let config = HerdConfig {
            stray: 0.0,
            randomness: 0.0,
            frame_offset: 2.0,
            ..example_config()
        };
        let track = line_track();
        let leader = AgentMotion::new(0, AgentJitter::default(), 5);
        let trailing = AgentMotion::new(4, AgentJitter::default(), 5);
        let leader = leader.evaluate(&config, &track, 50.0);
        let trailing = trailing.evaluate(&config, &track, 50.0);

        assert!((leader.x - 50.0).abs() < EPS);
        assert!((trailing.x - 42.0).abs() < EPS);
        assert!((trailing.y - 21.0).abs() < EPS);
    }

    #[test]
    fn stationary_leader_leaves_only_bounded_offsets() {
        let config = example_config();
        let still = StaticSignal(MotionSample::ORIGIN);
        let mut generator = RandomOffsetGenerator::seeded(5);

        for index in 0..config.population as usize {
            let motion = AgentMotion::new(index, generator.draw_jitter(), config.population);
            let radius = motion.stray_radius(&config);
            let position = motion.evaluate(&config, &still, 12.0);

            assert_eq!(position, motion.axis_offsets(&config));
            for axis in 0..3 {
                assert!(position.axis(axis).abs() <= radius / 2.0 + EPS);
            }
        }
    }

    #[test]
    fn evaluation_is_deterministic() {
        let config = example_config();
        let track = line_track();
        let mut generator = RandomOffsetGenerator::seeded(11);
        let motion = AgentMotion::new(2, generator.draw_jitter(), config.population);

        for frame in [-30.0, 0.0, 12.25, 99.5, 1.0e4] {
            assert_eq!(
                motion.evaluate(&config, &track, frame),
                motion.evaluate(&config, &track, frame)
            );
        }
    }

    #[test]
    fn offsets_follow_live_stray() {
        let motion = AgentMotion::new(
            1,
            AgentJitter {
                phase: 0.0,
                axis: [0.5, -0.25, 0.0],
            },
            5,
        );
        let base = HerdConfig {
            leader_focus: 0.0,
            ..example_config()
        };
        let doubled = HerdConfig {
            stray: 20.0,
            ..base
        };
        let a = motion.axis_offsets(&base);
        let b = motion.axis_offsets(&doubled);
        assert!((a.x - 5.0).abs() < EPS);
        assert!((b.x - 10.0).abs() < EPS);
        assert!((b.y + 5.0).abs() < EPS);
    }

    #[test]
    fn damping_divisor_is_fixed_at_creation() {
        let motion = AgentMotion::new(
            1,
            AgentJitter {
                phase: 0.0,
                axis: [0.4, 0.0, 0.0],
            },
            10,
        );
        let built = HerdConfig {
            population: 10,
            ..example_config()
        };
        let grown = HerdConfig {
            population: 200,
            ..built
        };
        // 10 * |1| * 0.5 / (0.5 * 10) = 1
        assert!((motion.stray_radius(&built) - 1.0).abs() < EPS);
        assert_eq!(motion.stray_radius(&built), motion.stray_radius(&grown));
    }
}
