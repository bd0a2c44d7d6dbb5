//! Herd membership and the per-frame evaluation pass.
//!
//! A herd owns one leader and the agents registered under it. Agents only
//! read the leader's configuration and trajectory; the leader's registry is
//! the authoritative member list.

use std::fmt;

use tracing::{debug, info};

use crate::config::{HerdConfig, MotionEdit};
use crate::error::HerdError;
use crate::jitter::RandomOffsetGenerator;
use crate::math::MotionSample;
use crate::motion::AgentMotion;
use crate::orientation::FacingState;
use crate::signal::LeaderSignal;

pub const DEFAULT_LEADER_NAME: &str = "herdmaster";
pub const DEFAULT_SHAPE: &str = "cone";
const AGENT_NAME_PREFIX: &str = "herdmemb";

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LeaderId(String);

impl LeaderId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LeaderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Agent identity; the index doubles as the phase order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AgentId(pub usize);

impl AgentId {
    pub fn index(self) -> usize {
        self.0
    }

    pub fn name(self) -> String {
        format!("{AGENT_NAME_PREFIX}{}", self.0)
    }
}

#[derive(Clone, Debug)]
pub struct Leader {
    id: LeaderId,
    config: HerdConfig,
    shape: String,
    registry: Vec<AgentId>,
}

impl Leader {
    fn new(name: &str) -> Self {
        Self {
            id: LeaderId(name.to_owned()),
            config: HerdConfig::default(),
            shape: DEFAULT_SHAPE.to_owned(),
            registry: Vec::new(),
        }
    }

    pub fn id(&self) -> &LeaderId {
        &self.id
    }

    pub fn config(&self) -> &HerdConfig {
        &self.config
    }

    /// Template the agents were instantiated from.
    pub fn shape(&self) -> &str {
        &self.shape
    }

    pub fn registry(&self) -> &[AgentId] {
        &self.registry
    }

    fn register(&mut self, agent: AgentId) {
        debug_assert!(!self.registry.contains(&agent));
        self.registry.push(agent);
    }
}

#[derive(Clone, Debug)]
pub struct Agent {
    id: AgentId,
    leader: LeaderId,
    motion: AgentMotion,
    facing: FacingState,
}

impl Agent {
    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn leader(&self) -> &LeaderId {
        &self.leader
    }

    pub fn motion(&self) -> &AgentMotion {
        &self.motion
    }

    pub fn facing(&self) -> &FacingState {
        &self.facing
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HerdState {
    Empty,
    Built,
    Deleted,
}

impl HerdState {
    fn label(self) -> &'static str {
        match self {
            HerdState::Empty => "empty",
            HerdState::Built => "built",
            HerdState::Deleted => "deleted",
        }
    }
}

/// Whether a rebuild draws fresh jitter or replays the herd's seed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RebuildJitter {
    #[default]
    Redraw,
    Reproduce,
}

/// Identities (re)created by a build, for the host to parent and display.
#[derive(Clone, Debug, PartialEq)]
pub struct HerdManifest {
    pub leader: LeaderId,
    pub agents: Vec<AgentId>,
}

/// Evaluated transform of one agent at one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AgentTransform {
    pub id: AgentId,
    pub position: MotionSample,
    pub facing_target: MotionSample,
    pub facing: MotionSample,
}

pub struct Herd<S> {
    signal: S,
    leader_name: String,
    leader: Option<Leader>,
    agents: Vec<Agent>,
    state: HerdState,
    generator: RandomOffsetGenerator,
    rebuild_jitter: RebuildJitter,
}

impl<S: LeaderSignal> Herd<S> {
    pub fn new(signal: S, generator: RandomOffsetGenerator) -> Self {
        Self::with_leader_name(signal, generator, DEFAULT_LEADER_NAME)
    }

    pub fn with_leader_name(signal: S, generator: RandomOffsetGenerator, name: &str) -> Self {
        Self {
            signal,
            leader_name: name.to_owned(),
            leader: None,
            agents: Vec::new(),
            state: HerdState::Empty,
            generator,
            rebuild_jitter: RebuildJitter::default(),
        }
    }

    pub fn set_rebuild_jitter(&mut self, policy: RebuildJitter) {
        self.rebuild_jitter = policy;
    }

    pub fn state(&self) -> HerdState {
        self.state
    }

    pub fn leader(&self) -> Option<&Leader> {
        self.leader.as_ref()
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn signal(&self) -> &S {
        &self.signal
    }

    pub fn signal_mut(&mut self) -> &mut S {
        &mut self.signal
    }

    pub fn config(&self) -> Result<&HerdConfig, HerdError> {
        self.leader
            .as_ref()
            .map(Leader::config)
            .ok_or(HerdError::MissingLeader)
    }

    /// Creates the leader and `config.population` agents.
    pub fn build(&mut self, config: HerdConfig, shape: &str) -> Result<HerdManifest, HerdError> {
        if self.state == HerdState::Built {
            return Err(self.invalid_state("build"));
        }
        config.validate()?;

        let leader_name = self.leader_name.clone();
        let leader = match self.leader.take() {
            Some(existing) => {
                debug!(leader = %existing.id, "reusing existing leader");
                existing
            }
            None => {
                info!(leader = %leader_name, "created herd leader");
                Leader::new(&leader_name)
            }
        };
        let leader = self.leader.insert(leader);
        leader.config = config;
        leader.shape = shape.to_owned();
        leader.registry.clear();

        if self.rebuild_jitter == RebuildJitter::Reproduce {
            self.generator.reset();
        }

        let population = config.population as usize;
        self.agents.reserve(population);
        for index in 0..population {
            let id = AgentId(index);
            let motion = AgentMotion::new(index, self.generator.draw_jitter(), config.population);
            let start = motion.evaluate(&config, &self.signal, 0.0);
            self.agents.push(Agent {
                id,
                leader: leader.id.clone(),
                motion,
                facing: FacingState::new(start),
            });
            leader.register(id);
        }

        self.state = HerdState::Built;
        info!(
            leader = %leader.id,
            population,
            shape,
            "built herd"
        );

        Ok(HerdManifest {
            leader: leader.id.clone(),
            agents: leader.registry.clone(),
        })
    }

    /// Deletes every agent and builds again from the leader's current
    /// configuration and recorded shape. Per-agent edits are lost.
    pub fn rebuild(&mut self) -> Result<HerdManifest, HerdError> {
        let leader = self.leader.as_ref().ok_or(HerdError::MissingLeader)?;
        if self.state != HerdState::Built {
            return Err(self.invalid_state("rebuild"));
        }
        let config = leader.config;
        config.validate()?;
        let shape = leader.shape.clone();

        let previous = self.agents.len();
        self.delete();
        debug!(
            previous,
            population = config.population,
            jitter = ?self.rebuild_jitter,
            "rebuilding herd"
        );
        self.build(config, &shape)
    }

    /// Removes all agents. The leader is kept.
    pub fn delete(&mut self) {
        let removed = self.agents.len();
        self.agents.clear();
        if let Some(leader) = self.leader.as_mut() {
            leader.registry.clear();
        }
        if self.state != HerdState::Deleted {
            self.state = HerdState::Empty;
        }
        debug!(removed, "deleted herd members");
    }

    /// Removes all agents and the leader.
    pub fn destroy(&mut self) {
        self.delete();
        if let Some(leader) = self.leader.take() {
            info!(leader = %leader.id, "destroyed herd leader");
        }
        self.state = HerdState::Deleted;
    }

    /// Ordered member list of the named leader, or `None` if no such leader
    /// exists.
    pub fn population(&self, leader: &str) -> Option<&[AgentId]> {
        self.leader
            .as_ref()
            .filter(|existing| existing.id.as_str() == leader)
            .map(Leader::registry)
    }

    /// Replaces the stored configuration. Population changes apply at the
    /// next rebuild; motion values apply at the next evaluation.
    pub fn set_config(&mut self, config: HerdConfig) -> Result<(), HerdError> {
        let leader = self.leader.as_mut().ok_or(HerdError::MissingLeader)?;
        config.validate()?;
        leader.config = config;
        Ok(())
    }

    pub fn edit_motion(&mut self, edit: MotionEdit) -> Result<(), HerdError> {
        let config = self.config()?.with_motion(edit);
        self.set_config(config)
    }

    pub fn set_frame_adjust(&mut self, index: usize, frames: f32) -> Result<(), HerdError> {
        self.agent_mut(index)?.motion.frame_adjust = frames;
        Ok(())
    }

    pub fn set_face_forward(&mut self, index: usize, enabled: bool) -> Result<(), HerdError> {
        self.agent_mut(index)?.facing.face_forward = enabled;
        Ok(())
    }

    /// Evaluates every agent at `frame`, in index order. Orientation history
    /// advances by one step per call.
    pub fn evaluate(&mut self, frame: f32) -> Result<Vec<AgentTransform>, HerdError> {
        let config = *self.config()?;
        let signal = &self.signal;
        Ok(self
            .agents
            .iter_mut()
            .map(|agent| evaluate_agent(agent, &config, signal, frame))
            .collect())
    }

    pub fn evaluate_agent(&mut self, index: usize, frame: f32) -> Result<AgentTransform, HerdError> {
        let config = *self.config()?;
        let agent = self
            .agents
            .get_mut(index)
            .ok_or(HerdError::UnknownAgent(index))?;
        Ok(evaluate_agent(agent, &config, &self.signal, frame))
    }

    fn agent_mut(&mut self, index: usize) -> Result<&mut Agent, HerdError> {
        self.agents
            .get_mut(index)
            .ok_or(HerdError::UnknownAgent(index))
    }

    fn invalid_state(&self, operation: &'static str) -> HerdError {
        HerdError::InvalidState {
            operation,
            state: self.state.label(),
        }
    }
}

fn evaluate_agent<S: LeaderSignal>(
    agent: &mut Agent,
    config: &HerdConfig,
    signal: &S,
    frame: f32,
) -> AgentTransform {
    let position = agent.motion.evaluate(config, signal, frame);
    let update = agent.facing.update(position);
    AgentTransform {
        id: agent.id,
        position,
        facing_target: update.target,
        facing: update.facing,
    }
}
