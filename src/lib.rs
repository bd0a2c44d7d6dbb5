use wasm_bindgen::prelude::*;

pub mod config;
pub mod error;
pub mod herd;
pub mod jitter;
pub mod math;
pub mod motion;
pub mod orientation;
pub mod signal;

pub use config::{HerdConfig, MotionEdit};
pub use error::HerdError;
pub use herd::{
    Agent, AgentId, AgentTransform, Herd, HerdManifest, HerdState, Leader, LeaderId,
    RebuildJitter, DEFAULT_LEADER_NAME, DEFAULT_SHAPE,
};
pub use jitter::{AgentJitter, RandomOffsetGenerator};
pub use math::MotionSample;
pub use motion::AgentMotion;
pub use orientation::{FacingState, FacingUpdate};
pub use signal::{Interpolation, KeyframeTrack, LeaderSignal, StaticSignal};

/// Host-facing herd: a keyed leader plus flat render buffers of agent
/// positions and facings, refreshed by `step`.
#[wasm_bindgen]
pub struct HerdSim {
    herd: Herd<KeyframeTrack>,
    pending: HerdConfig,
    positions: Vec<f32>,
    facings: Vec<f32>,
}

#[wasm_bindgen]
impl HerdSim {
    #[wasm_bindgen(constructor)]
    /// `seed` arrives from the host as a `BigInt`; omit it for entropy.
    pub fn new(seed: Option<u64>) -> Result<HerdSim, JsError> {
        let generator = RandomOffsetGenerator::new(seed)?;
        Ok(HerdSim {
            herd: Herd::new(KeyframeTrack::default(), generator),
            pending: HerdConfig::default(),
            positions: Vec::new(),
            facings: Vec::new(),
        })
    }

    pub fn set_key(&mut self, time: f32, x: f32, y: f32, z: f32) {
        self.herd
            .signal_mut()
            .set_key(time, MotionSample::new(x, y, z));
    }

    pub fn clear_keys(&mut self) {
        self.herd.signal_mut().clear();
    }

    pub fn key_count(&self) -> usize {
        self.herd.signal().key_count()
    }

    pub fn set_interpolation(&mut self, mode: u32) {
        self.herd
            .signal_mut()
            .set_interpolation(Interpolation::from_u32(mode));
    }

    pub fn interpolation(&self) -> u32 {
        self.herd.signal().interpolation().as_u32()
    }

    pub fn set_config(
        &mut self,
        population: u32,
        stray: f32,
        leader_focus: f32,
        frame_offset: f32,
        randomness: f32,
    ) -> Result<(), JsError> {
        self.apply_config(HerdConfig {
            population,
            stray,
            leader_focus,
            frame_offset,
            randomness,
        })?;
        Ok(())
    }

    pub fn set_config_json(&mut self, text: &str) -> Result<(), JsError> {
        self.apply_config(HerdConfig::from_json(text)?)?;
        Ok(())
    }

    pub fn config_json(&self) -> Result<String, JsError> {
        Ok(self.pending.to_json()?)
    }

    /// Live slider drag: changes motion values without rebuilding.
    pub fn edit_motion(
        &mut self,
        stray: f32,
        leader_focus: f32,
        frame_offset: f32,
        randomness: f32,
    ) -> Result<(), JsError> {
        let edit = MotionEdit {
            stray,
            leader_focus,
            frame_offset,
            randomness,
        };
        self.apply_config(self.pending.with_motion(edit))?;
        Ok(())
    }

    pub fn set_reproducible_rebuild(&mut self, enabled: bool) {
        self.herd.set_rebuild_jitter(if enabled {
            RebuildJitter::Reproduce
        } else {
            RebuildJitter::Redraw
        });
    }

    pub fn build(&mut self, shape: Option<String>) -> Result<usize, JsError> {
        let shape = shape.as_deref().unwrap_or(DEFAULT_SHAPE);
        let manifest = self.herd.build(self.pending, shape)?;
        self.clear_render_buffers();
        Ok(manifest.agents.len())
    }

    pub fn rebuild(&mut self) -> Result<usize, JsError> {
        let manifest = self.herd.rebuild()?;
        self.clear_render_buffers();
        Ok(manifest.agents.len())
    }

    pub fn delete(&mut self) {
        self.herd.delete();
        self.clear_render_buffers();
    }

    /// Evaluates the herd at `frame` and refreshes the render buffers.
    pub fn step(&mut self, frame: f32) -> Result<(), JsError> {
        let transforms = self.herd.evaluate(frame)?;
        self.sync_render_buffers(&transforms);
        Ok(())
    }

    pub fn set_frame_adjust(&mut self, index: usize, frames: f32) -> Result<(), JsError> {
        self.herd.set_frame_adjust(index, frames)?;
        Ok(())
    }

    pub fn set_face_forward(&mut self, index: usize, enabled: bool) -> Result<(), JsError> {
        self.herd.set_face_forward(index, enabled)?;
        Ok(())
    }

    pub fn agent_count(&self) -> usize {
        self.herd.agents().len()
    }

    pub fn agent_names(&self) -> Vec<String> {
        self.herd
            .agents()
            .iter()
            .map(|agent| agent.id().name())
            .collect()
    }

    pub fn leader_name(&self) -> Option<String> {
        self.herd
            .leader()
            .map(|leader| leader.id().as_str().to_owned())
    }

    /// Flat `[x, y, z, ...]` positions from the last `step`.
    pub fn positions(&self) -> Vec<f32> {
        self.positions.clone()
    }

    /// Flat `[x, y, z, ...]` unit facing directions from the last `step`.
    pub fn facings(&self) -> Vec<f32> {
        self.facings.clone()
    }
}

impl HerdSim {
    fn apply_config(&mut self, config: HerdConfig) -> Result<(), HerdError> {
        config.validate()?;
        if self.herd.leader().is_some() {
            self.herd.set_config(config)?;
        }
        self.pending = config;
        Ok(())
    }

    fn clear_render_buffers(&mut self) {
        self.positions.clear();
        self.facings.clear();
    }

    fn sync_render_buffers(&mut self, transforms: &[AgentTransform]) {
        self.clear_render_buffers();
        for transform in transforms {
            let (x, y, z) = transform.position.as_tuple();
            self.positions.extend_from_slice(&[x, y, z]);
            let (fx, fy, fz) = transform.facing.as_tuple();
            self.facings.extend_from_slice(&[fx, fy, fz]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::HerdSim;
    use wasm_bindgen::JsError;

    fn ok<T>(result: Result<T, JsError>) -> T {
        match result {
            Ok(value) => value,
            Err(_) => panic!("host call failed"),
        }
    }

    #[test]
    fn host_cycle_fills_render_buffers() {
        let mut sim = ok(HerdSim::new(Some(17)));
        sim.set_key(0.0, 0.0, 0.0, 0.0);
        sim.set_key(100.0, 200.0, 0.0, 0.0);
        ok(sim.set_config(6, 2.0, 0.5, 1.0, 0.5));

        assert_eq!(ok(sim.build(None)), 6);
        assert_eq!(sim.leader_name().as_deref(), Some("herdmaster"));
        assert_eq!(sim.agent_names()[5], "herdmemb5");

        ok(sim.step(40.0));
        assert_eq!(sim.positions().len(), 18);
        assert_eq!(sim.facings().len(), 18);
        assert!(sim.positions().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn config_set_after_build_applies_on_rebuild() {
        let mut sim = ok(HerdSim::new(Some(2)));
        ok(sim.build(Some("deer".to_owned())));
        assert_eq!(sim.agent_count(), 10);

        ok(sim.set_config(20, 10.0, 0.5, 1.0, 0.5));
        assert_eq!(sim.agent_count(), 10);
        assert_eq!(ok(sim.rebuild()), 20);

        ok(sim.edit_motion(0.0, 0.0, 0.0, 0.0));
        assert!(ok(sim.config_json()).contains("\"population\":20"));

        sim.delete();
        assert_eq!(sim.agent_count(), 0);
        assert!(sim.positions().is_empty());
    }

    #[test]
    fn full_width_seeds_reach_the_generator() {
        let seed = u64::MAX - 7;
        let mut wide = ok(HerdSim::new(Some(seed)));
        let mut narrowed = ok(HerdSim::new(Some(seed & u64::from(u32::MAX))));
        ok(wide.build(None));
        ok(narrowed.build(None));
        ok(wide.step(3.0));
        ok(narrowed.step(3.0));
        assert_ne!(wide.positions(), narrowed.positions());

        let mut again = ok(HerdSim::new(Some(seed)));
        ok(again.build(None));
        ok(again.step(3.0));
        assert_eq!(wide.positions(), again.positions());
    }

    #[test]
    fn interpolation_mode_round_trips_through_host_codes() {
        let mut sim = ok(HerdSim::new(Some(2)));
        assert_eq!(sim.interpolation(), 1);
        sim.set_interpolation(2);
        assert_eq!(sim.interpolation(), 2);
        sim.set_interpolation(99);
        assert_eq!(sim.interpolation(), 1);
    }
}
