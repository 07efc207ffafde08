//! Batch of independent environments behind flat buffers.
//!
//! A training worker steps `n` vehicles with one flat action slice and reads
//! one flat observation buffer. Vehicles never interact; each keeps its own
//! state, reference and RNG.

use crate::config::QuadrotorConfig;
use crate::env::QuadrotorEnv;
use crate::error::{EnvError, Result};
use crate::reward::{presets, RewardComponent};
use crate::state::Reference;

/// Odd constant used to spread auto-reset seeds across episodes.
const SEED_STRIDE: u64 = 0x9e37_79b9_7f4a_7c15;

/// Per-environment results of one batch step.
#[derive(Debug, Clone, PartialEq)]
pub struct VecStepResult {
    /// Rewards for each environment
    pub rewards: Vec<f64>,
    /// Done flags (terminal or truncated)
    pub dones: Vec<bool>,
    /// Failure or success endings
    pub terminals: Vec<bool>,
    /// Timeout endings
    pub truncations: Vec<bool>,
    /// Return of the episode that just ended, if any
    pub episode_returns: Vec<Option<f64>>,
}

/// `n` independent quadrotor environments with auto-reset.
pub struct QuadrotorVecEnv<R: RewardComponent = presets::QuadraticReward> {
    envs: Vec<QuadrotorEnv<R>>,
    obs_buffer: Vec<f64>,
    obs_size: usize,
    seed: u64,
    /// Completed episodes per environment, for auto-reset seeding
    episodes: Vec<u64>,
}

impl<R: RewardComponent> QuadrotorVecEnv<R> {
    /// Build `n_envs` environments from one configuration and reset them.
    pub fn new(config: QuadrotorConfig<R>, n_envs: usize, seed: u64) -> Result<Self> {
        if n_envs == 0 {
            return Err(EnvError::config("n_envs", "must be at least 1"));
        }
        let obs_size = config.observation_size();
        let envs = (0..n_envs)
            .map(|_| QuadrotorEnv::new(config.clone()))
            .collect::<Result<Vec<_>>>()?;

        let mut vec_env = Self {
            envs,
            obs_buffer: vec![0.0; n_envs * obs_size],
            obs_size,
            seed,
            episodes: vec![0; n_envs],
        };
        vec_env.reset(seed)?;
        Ok(vec_env)
    }

    /// Reset every environment; environment `i` uses `seed + i`.
    pub fn reset(&mut self, seed: u64) -> Result<&[f64]> {
        self.seed = seed;
        self.episodes.fill(0);
        for idx in 0..self.envs.len() {
            let obs = self.envs[idx].reset(seed.wrapping_add(idx as u64), None)?;
            self.write_env_obs(idx, &obs);
        }
        Ok(&self.obs_buffer)
    }

    /// Step all environments with a flat `[m0, m1, m2, m3]`-per-env slice.
    ///
    /// Finished environments are reset immediately; their slot in the
    /// observation buffer then holds the first observation of the new episode.
    pub fn step(&mut self, actions: &[f64]) -> Result<VecStepResult> {
        let expected = self.envs.len() * 4;
        if actions.len() != expected {
            return Err(EnvError::ActionDimensionMismatch {
                expected,
                actual: actions.len(),
            });
        }

        let n = self.envs.len();
        let mut result = VecStepResult {
            rewards: Vec::with_capacity(n),
            dones: Vec::with_capacity(n),
            terminals: Vec::with_capacity(n),
            truncations: Vec::with_capacity(n),
            episode_returns: Vec::with_capacity(n),
        };

        for (idx, chunk) in actions.chunks_exact(4).enumerate() {
            let action = [chunk[0], chunk[1], chunk[2], chunk[3]];
            let outcome = self.envs[idx].step(&action)?;

            result.rewards.push(outcome.reward);
            result.dones.push(outcome.done);
            result.terminals.push(outcome.done && !outcome.status.is_timeout());
            result.truncations.push(outcome.status.is_timeout());

            if outcome.done {
                result
                    .episode_returns
                    .push(Some(self.envs[idx].episode().cumulative_reward));
                self.episodes[idx] += 1;
                let seed = self.auto_reset_seed(idx);
                let obs = self.envs[idx].reset(seed, None)?;
                self.write_env_obs(idx, &obs);
            } else {
                result.episode_returns.push(None);
                self.write_env_obs(idx, &outcome.observation);
            }
        }

        Ok(result)
    }

    /// Replace the reference of one environment.
    pub fn set_reference(&mut self, idx: usize, reference: Reference) -> Result<()> {
        let n_envs = self.envs.len();
        let env = self
            .envs
            .get_mut(idx)
            .ok_or(EnvError::EnvIndexOutOfRange { index: idx, n_envs })?;
        env.set_reference(reference)
    }

    /// Flat observations `[env0..., env1..., ...]`.
    pub fn observations(&self) -> &[f64] {
        &self.obs_buffer
    }

    /// Copy observations into `buffer`.
    pub fn write_observations(&self, buffer: &mut [f64]) {
        buffer.copy_from_slice(&self.obs_buffer);
    }

    /// Number of environments.
    pub fn n_envs(&self) -> usize {
        self.envs.len()
    }

    /// Observation size of a single environment.
    pub fn observation_size(&self) -> usize {
        self.obs_size
    }

    /// Action dimension of a single environment (4 rotors).
    pub fn action_dim(&self) -> usize {
        4
    }

    /// Read access to the individual environments.
    pub fn envs(&self) -> &[QuadrotorEnv<R>] {
        &self.envs
    }

    fn auto_reset_seed(&self, idx: usize) -> u64 {
        self.seed
            .wrapping_add(idx as u64)
            .wrapping_add(self.episodes[idx].wrapping_mul(SEED_STRIDE))
    }

    fn write_env_obs(&mut self, idx: usize, obs: &[f64]) {
        let base = idx * self.obs_size;
        self.obs_buffer[base..base + self.obs_size].copy_from_slice(obs);
    }
}
