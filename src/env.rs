//! Single-vehicle quadrotor environment.
//!
//! `QuadrotorEnv` owns the vehicle state, the reference, the episode counters
//! and its RNG. One `step` runs clamp → mix → integrate → encode → evaluate.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::config::QuadrotorConfig;
use crate::error::{EnvError, Result};
use crate::observation::{write_observation, ErrorState};
use crate::physics::dynamics::RigidBody;
use crate::physics::motor::{ControlInput, Mixer};
use crate::reward::{presets, RewardComponent, RewardInput};
use crate::state::{EpisodeState, Reference, RigidBodyState, STATE_SIZE};
use crate::termination::{self, EpisodeStatus, FailureCause};

// ============================================================================
// Step Outcome
// ============================================================================

/// Diagnostics for one step.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StepInfo {
    /// Steps taken since reset, including this one
    pub step: u32,
    /// Simulated time since reset (s)
    pub time: f64,
    /// `running`, `success`, `failure` or `timeout`
    pub status: &'static str,
    /// Failure cause when `status` is `failure`
    pub failure_cause: Option<&'static str>,
    /// Vehicle state after the step: x, v, R (row-major), Ω
    pub state: [f64; STATE_SIZE],
    /// Rotor thrusts actually applied (N)
    pub thrusts: [f64; 4],
    /// Total thrust f (N)
    pub total_thrust: f64,
    /// Body moment M (N·m)
    pub moment: [f64; 3],
    /// ‖e_x‖
    pub position_error: f64,
    /// ‖e_R‖
    pub attitude_error: f64,
    /// Sum of rewards since reset, including this step
    pub episode_reward: f64,
}

impl StepInfo {
    /// String-keyed view for callers that treat diagnostics as a loose map.
    pub fn to_map(&self) -> BTreeMap<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map.into_iter().collect(),
            _ => BTreeMap::new(),
        }
    }
}

/// Result of [`QuadrotorEnv::step`].
#[derive(Clone, Debug, PartialEq)]
pub struct StepOutcome {
    pub observation: Vec<f64>,
    pub reward: f64,
    /// True once the status is terminal
    pub done: bool,
    pub status: EpisodeStatus,
    pub info: StepInfo,
}

// ============================================================================
// Environment
// ============================================================================

/// Quadrotor tracking environment.
///
/// Generic over reward type `R` for compile-time reward composition.
/// Defaults to [`presets::QuadraticReward`].
pub struct QuadrotorEnv<R: RewardComponent = presets::QuadraticReward> {
    config: QuadrotorConfig<R>,
    body: RigidBody,
    mixer: Mixer,

    state: RigidBodyState,
    reference: Reference,
    episode: EpisodeState,
    rng: fastrand::Rng,

    /// False until the first reset
    initialized: bool,
}

impl<R: RewardComponent> QuadrotorEnv<R> {
    /// Create an environment from a configuration.
    ///
    /// The environment must be reset before the first step.
    pub fn new(config: QuadrotorConfig<R>) -> Result<Self> {
        config.validate()?;
        let body = RigidBody::from_config(&config.vehicle)?;
        let mixer = Mixer::from_config(&config.actuator)?;
        let reference = config.reference;

        Ok(Self {
            body,
            mixer,
            state: reference.as_state(),
            reference,
            episode: EpisodeState::default(),
            rng: fastrand::Rng::with_seed(0),
            initialized: false,
            config,
        })
    }

    /// Start a new episode from a sampled initial state.
    ///
    /// The initial state is drawn from `config.init` around the reference
    /// with an RNG seeded by `seed`, so equal seeds give equal episodes.
    /// `reference` replaces the configured default when given.
    pub fn reset(&mut self, seed: u64, reference: Option<Reference>) -> Result<Vec<f64>> {
        let reference = self.resolve_reference(reference)?;
        self.rng = fastrand::Rng::with_seed(seed);
        let state = RigidBodyState::sample(&self.config.init, &reference, &mut self.rng);
        log::debug!("reset with seed {seed}");
        Ok(self.begin_episode(state, reference))
    }

    /// Start a new episode from an explicit initial state.
    pub fn reset_to_state(
        &mut self,
        state: RigidBodyState,
        reference: Option<Reference>,
    ) -> Result<Vec<f64>> {
        state.validate().map_err(EnvError::InvalidState)?;
        let reference = self.resolve_reference(reference)?;
        Ok(self.begin_episode(state, reference))
    }

    /// Advance one control step.
    ///
    /// Out-of-range or NaN actions are clamped, never rejected. A diverging
    /// integration ends the episode with [`FailureCause::NonFiniteState`] and
    /// keeps the last finite state.
    pub fn step(&mut self, action: &[f64; 4]) -> Result<StepOutcome> {
        if !self.initialized {
            return Err(EnvError::NotReset);
        }
        if self.episode.is_done() {
            return Err(EnvError::EpisodeFinished {
                status: self.episode.status,
            });
        }

        let actuator = &self.config.actuator;
        let thrusts = actuator.action_to_thrusts(action);
        let applied = actuator.clamp_action(action);
        let input = self.mixer.mix(&thrusts);

        let next = self.body.propagate(
            &self.state,
            &input,
            self.config.dt,
            self.config.substeps,
            self.config.integrator,
        );

        self.episode.step_count += 1;
        self.episode.time += self.config.dt;

        let error = match next {
            Ok(next) => {
                self.state = next;
                let error = ErrorState::compute(&self.state, &self.reference);
                termination::evaluate(&self.state, &error, &mut self.episode, &self.config.termination);
                error
            }
            Err(e) => {
                log::warn!("integration failed at step {}: {e}", self.episode.step_count);
                self.episode.status = EpisodeStatus::Failure(FailureCause::NonFiniteState);
                ErrorState::compute(&self.state, &self.reference)
            }
        };

        let status = self.episode.status;
        let reward = self.step_reward(&error, &applied, status);
        self.episode.cumulative_reward += reward;

        if status.is_terminal() {
            log::debug!(
                "episode ended: {status} after {} steps, return {:.3}",
                self.episode.step_count,
                self.episode.cumulative_reward
            );
        }

        let mut observation = vec![0.0; self.config.observation_size()];
        write_observation(&self.state, &error, &self.config.obs, &mut observation);

        Ok(StepOutcome {
            observation,
            reward,
            done: status.is_terminal(),
            status,
            info: self.step_info(&error, thrusts.as_array(), &input),
        })
    }

    /// Replace the reference between steps.
    pub fn set_reference(&mut self, reference: Reference) -> Result<()> {
        reference.validate().map_err(EnvError::InvalidReference)?;
        self.reference = reference;
        Ok(())
    }

    /// Observation of the current state against the current reference.
    pub fn observation(&self) -> Vec<f64> {
        let error = ErrorState::compute(&self.state, &self.reference);
        let mut obs = vec![0.0; self.config.observation_size()];
        write_observation(&self.state, &error, &self.config.obs, &mut obs);
        obs
    }

    /// Action that holds a level hover for this vehicle.
    pub fn hover_action(&self) -> [f64; 4] {
        self.config
            .actuator
            .hover_action(self.body.mass(), self.body.gravity())
    }

    /// Get the configuration.
    pub fn config(&self) -> &QuadrotorConfig<R> {
        &self.config
    }

    /// Current vehicle state.
    pub fn state(&self) -> &RigidBodyState {
        &self.state
    }

    /// Current reference.
    pub fn reference(&self) -> &Reference {
        &self.reference
    }

    /// Episode counters and status.
    pub fn episode(&self) -> &EpisodeState {
        &self.episode
    }

    /// Actuator mixing matrix in use.
    pub fn mixer(&self) -> &Mixer {
        &self.mixer
    }

    /// Length of every observation vector.
    pub fn observation_size(&self) -> usize {
        self.config.observation_size()
    }

    fn resolve_reference(&self, reference: Option<Reference>) -> Result<Reference> {
        let reference = reference.unwrap_or(self.config.reference);
        reference.validate().map_err(EnvError::InvalidReference)?;
        Ok(reference)
    }

    fn begin_episode(&mut self, state: RigidBodyState, reference: Reference) -> Vec<f64> {
        self.state = state;
        self.reference = reference;
        self.episode = EpisodeState::default();
        self.initialized = true;
        self.observation()
    }

    fn step_reward(&self, error: &ErrorState, action: &[f64; 4], status: EpisodeStatus) -> f64 {
        let termination = &self.config.termination;
        match status {
            EpisodeStatus::Failure(_) => termination.failure_penalty,
            _ => {
                let reward = self.config.reward.compute(&RewardInput { error, action });
                match (&termination.success, status) {
                    (Some(criteria), EpisodeStatus::Success) => reward + criteria.bonus,
                    _ => reward,
                }
            }
        }
    }

    fn step_info(&self, error: &ErrorState, thrusts: [f64; 4], input: &ControlInput) -> StepInfo {
        let status = self.episode.status;
        StepInfo {
            step: self.episode.step_count,
            time: self.episode.time,
            status: status.as_str(),
            failure_cause: status.failure_cause().map(|c| c.as_str()),
            state: self.state.to_array(),
            thrusts,
            total_thrust: input.thrust,
            moment: [input.moment.x, input.moment.y, input.moment.z],
            position_error: error.position.norm(),
            attitude_error: error.attitude.norm(),
            episode_reward: self.episode.cumulative_reward,
        }
    }
}
