use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::error::HerdError;

/// Random values fixed on an agent for its whole lifetime.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AgentJitter {
    /// Phase jitter, scaled by randomness before it shifts the agent's phase.
    pub phase: f32,
    /// Per-axis offset jitter, scaled by the stray radius each evaluation.
    pub axis: [f32; 3],
}

/// Deterministic source of signed jitter in `[-0.5, 0.5)`.
pub struct RandomOffsetGenerator {
    seed: u64,
    rng: ChaCha8Rng,
}

impl RandomOffsetGenerator {
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Seeds from OS entropy, so every process run draws different jitter.
    pub fn from_entropy() -> Result<Self, HerdError> {
        let seed = getrandom::u64().map_err(|err| HerdError::Entropy(err.to_string()))?;
        Ok(Self::seeded(seed))
    }

    pub fn new(seed: Option<u64>) -> Result<Self, HerdError> {
        match seed {
            Some(seed) => Ok(Self::seeded(seed)),
            None => Self::from_entropy(),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Rewinds to the first draw of the current seed.
    pub fn reset(&mut self) {
        self.rng = ChaCha8Rng::seed_from_u64(self.seed);
    }

    pub fn next_signed(&mut self) -> f32 {
        self.rng.gen::<f32>() - 0.5
    }

    /// Draws phase first, then x, y and z.
    pub fn draw_jitter(&mut self) -> AgentJitter {
        let phase = self.next_signed();
        let axis = [self.next_signed(), self.next_signed(), self.next_signed()];
        AgentJitter { phase, axis }
    }
}
