//! Configuration types and builders for the quadrotor environment.
//!
//! Provides builder-style configuration for:
//! - Vehicle mass properties and disturbances
//! - Observation layout and scaling
//! - Reward weights (the reward itself is a compile-time generic)
//! - Episode termination and success conditions
//! - Initial state distributions
//!
//! Everything is checked once by [`QuadrotorConfig::validate`]; a built
//! environment never re-validates.

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::{EnvError, Result};
use crate::physics::dynamics::{Disturbance, Integrator};
use crate::physics::motor::{ActuatorConfig, Mixer};
use crate::reward::{presets, RewardComponent};
use crate::state::Reference;
use crate::types::{Mat3, Vec3};

fn check_positive(param: &'static str, value: f64) -> Result<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(EnvError::config(param, format!("must be positive and finite, got {value}")))
    }
}

fn check_optional_positive(param: &'static str, value: Option<f64>) -> Result<()> {
    value.map_or(Ok(()), |v| check_positive(param, v))
}

// ============================================================================
// Vehicle Configuration
// ============================================================================

/// Mass properties of the airframe and the environment it flies in.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VehicleConfig {
    /// Mass (kg)
    pub mass: f64,
    /// Inertia tensor J about the center of mass, body frame (kg·m²)
    pub inertia: Mat3,
    /// Gravitational acceleration (m/s²)
    pub gravity: f64,
    /// Constant external force and moment
    pub disturbance: Disturbance,
}

impl Default for VehicleConfig {
    fn default() -> Self {
        Self {
            mass: MASS,
            inertia: Mat3::from_diagonal(&Vec3::from(inertia_diagonal())),
            gravity: G,
            disturbance: Disturbance::none(),
        }
    }
}

impl VehicleConfig {
    /// Set vehicle mass.
    pub fn with_mass(mut self, mass: f64) -> Self {
        self.mass = mass;
        self
    }

    /// Set a full inertia tensor.
    pub fn with_inertia(mut self, inertia: Mat3) -> Self {
        self.inertia = inertia;
        self
    }

    /// Set a diagonal inertia tensor [Ixx, Iyy, Izz].
    pub fn with_inertia_diagonal(mut self, diagonal: [f64; 3]) -> Self {
        self.inertia = Mat3::from_diagonal(&Vec3::from(diagonal));
        self
    }

    /// Set gravitational acceleration.
    pub fn with_gravity(mut self, gravity: f64) -> Self {
        self.gravity = gravity;
        self
    }

    /// Set a constant disturbance force and moment.
    pub fn with_disturbance(mut self, disturbance: Disturbance) -> Self {
        self.disturbance = disturbance;
        self
    }

    /// Validate mass, inertia and gravity.
    pub fn validate(&self) -> Result<()> {
        check_positive("mass", self.mass)?;

        if !self.inertia.iter().all(|x| x.is_finite()) {
            return Err(EnvError::config("inertia", "must be finite"));
        }
        if (self.inertia - self.inertia.transpose()).amax() > 1e-12 {
            return Err(EnvError::config("inertia", "must be symmetric"));
        }
        if self.inertia.cholesky().is_none() {
            return Err(EnvError::config("inertia", "must be positive definite"));
        }

        if !(self.gravity >= 0.0 && self.gravity.is_finite()) {
            return Err(EnvError::config(
                "gravity",
                format!("must be non-negative and finite, got {}", self.gravity),
            ));
        }

        let d = &self.disturbance;
        if !d.force.iter().chain(d.moment.iter()).all(|x| x.is_finite()) {
            return Err(EnvError::config("disturbance", "must be finite"));
        }
        Ok(())
    }
}

// ============================================================================
// Observation Configuration
// ============================================================================

/// Observation layout: `[e_x, e_v, e_R, e_Ω]`, then optionally R and Ω.
///
/// Each error block is divided by its scale before being written, so a scale
/// of 1.0 leaves it untouched.
///
/// # Example
/// ```ignore
/// let obs = ObsConfig::errors_only()
///     .with_rotation()
///     .with_position_scale(3.0);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObsConfig {
    /// Append the attitude matrix R, row-major (9 values)
    pub rotation: bool,
    /// Append the body angular velocity Ω (3 values)
    pub angular_velocity: bool,
    /// Divisor applied to e_x
    pub position_scale: f64,
    /// Divisor applied to e_v
    pub velocity_scale: f64,
    /// Divisor applied to e_R
    pub attitude_scale: f64,
    /// Divisor applied to e_Ω
    pub angular_velocity_scale: f64,
}

impl Default for ObsConfig {
    fn default() -> Self {
        Self::errors_only()
    }
}

impl ObsConfig {
    /// The four error vectors only: 12 dims.
    pub fn errors_only() -> Self {
        Self {
            rotation: false,
            angular_velocity: false,
            position_scale: 1.0,
            velocity_scale: 1.0,
            attitude_scale: 1.0,
            angular_velocity_scale: 1.0,
        }
    }

    /// Errors plus raw R and Ω: 24 dims.
    pub fn full() -> Self {
        Self::errors_only().with_rotation().with_angular_velocity()
    }

    /// Include the attitude matrix.
    pub fn with_rotation(mut self) -> Self {
        self.rotation = true;
        self
    }

    /// Include the raw angular velocity.
    pub fn with_angular_velocity(mut self) -> Self {
        self.angular_velocity = true;
        self
    }

    /// Set the position error divisor.
    pub fn with_position_scale(mut self, scale: f64) -> Self {
        self.position_scale = scale;
        self
    }

    /// Set the velocity error divisor.
    pub fn with_velocity_scale(mut self, scale: f64) -> Self {
        self.velocity_scale = scale;
        self
    }

    /// Set the attitude error divisor.
    pub fn with_attitude_scale(mut self, scale: f64) -> Self {
        self.attitude_scale = scale;
        self
    }

    /// Set the angular velocity error divisor.
    pub fn with_angular_velocity_scale(mut self, scale: f64) -> Self {
        self.angular_velocity_scale = scale;
        self
    }

    /// Compute total observation size.
    pub fn observation_size(&self) -> usize {
        let mut size = 12;
        if self.rotation {
            size += 9;
        }
        if self.angular_velocity {
            size += 3;
        }
        size
    }

    /// Validate scales.
    pub fn validate(&self) -> Result<()> {
        check_positive("position_scale", self.position_scale)?;
        check_positive("velocity_scale", self.velocity_scale)?;
        check_positive("attitude_scale", self.attitude_scale)?;
        check_positive("angular_velocity_scale", self.angular_velocity_scale)
    }
}

// ============================================================================
// Reward Weights
// ============================================================================

/// Weights of the quadratic tracking reward.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RewardWeights {
    pub position: f64,
    pub velocity: f64,
    pub attitude: f64,
    pub angular_velocity: f64,
    /// Control effort weight on ‖a‖²
    pub action: f64,
}

impl Default for RewardWeights {
    fn default() -> Self {
        Self {
            position: W_POSITION,
            velocity: W_VELOCITY,
            attitude: W_ATTITUDE,
            angular_velocity: W_ANGULAR_VELOCITY,
            action: W_ACTION,
        }
    }
}

impl RewardWeights {
    /// Set control effort weight.
    pub fn with_action(mut self, weight: f64) -> Self {
        self.action = weight;
        self
    }

    /// Validate that weights are finite and non-negative.
    pub fn validate(&self) -> Result<()> {
        let all = [
            self.position,
            self.velocity,
            self.attitude,
            self.angular_velocity,
            self.action,
        ];
        if all.iter().all(|w| *w >= 0.0 && w.is_finite()) {
            Ok(())
        } else {
            Err(EnvError::config("reward_weights", "must be non-negative and finite"))
        }
    }
}

// ============================================================================
// Termination Configuration
// ============================================================================

/// Error tolerances that count as "arrived", held for `hold_steps` steps.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SuccessCriteria {
    /// Bound on ‖e_x‖ (m)
    pub position_tolerance: f64,
    /// Bound on ‖e_v‖ (m/s)
    pub velocity_tolerance: f64,
    /// Bound on ‖e_R‖
    pub attitude_tolerance: f64,
    /// Bound on ‖e_Ω‖ (rad/s)
    pub angular_velocity_tolerance: f64,
    /// Consecutive in-tolerance steps required
    pub hold_steps: u32,
    /// Added to the reward of the success step
    pub bonus: f64,
}

impl Default for SuccessCriteria {
    fn default() -> Self {
        Self {
            position_tolerance: 0.05,
            velocity_tolerance: 0.1,
            attitude_tolerance: 0.05,
            angular_velocity_tolerance: 0.1,
            hold_steps: 100,
            bonus: 0.0,
        }
    }
}

impl SuccessCriteria {
    /// Set number of consecutive steps to hold.
    pub fn with_hold_steps(mut self, steps: u32) -> Self {
        self.hold_steps = steps;
        self
    }

    /// Set success bonus.
    pub fn with_bonus(mut self, bonus: f64) -> Self {
        self.bonus = bonus;
        self
    }

    fn validate(&self) -> Result<()> {
        check_positive("position_tolerance", self.position_tolerance)?;
        check_positive("velocity_tolerance", self.velocity_tolerance)?;
        check_positive("attitude_tolerance", self.attitude_tolerance)?;
        check_positive("angular_velocity_tolerance", self.angular_velocity_tolerance)?;
        if self.hold_steps == 0 {
            return Err(EnvError::config("hold_steps", "must be at least 1"));
        }
        if !self.bonus.is_finite() {
            return Err(EnvError::config("bonus", "must be finite"));
        }
        Ok(())
    }
}

/// Configuration for episode termination conditions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TerminationConfig {
    /// Episode horizon; reaching it ends the episode with a timeout
    pub max_steps: u32,
    /// Bound on the largest component of e_x (m)
    pub max_position_error: f64,
    /// Bound on the angle between R and R_d (rad)
    pub max_attitude_error: f64,
    /// Reward on the step that ends in failure
    pub failure_penalty: f64,
    /// Bound on the largest component of e_v (m/s)
    pub max_velocity_error: Option<f64>,
    /// Bound on the largest component of Ω (rad/s)
    pub max_angular_velocity: Option<f64>,
    /// Bound on the angle between body and inertial z axes (rad)
    pub max_tilt: Option<f64>,
    /// Failure once x₃ reaches this height (e₃ points down, so the ground is
    /// at larger z)
    pub ground_level: Option<f64>,
    /// Optional success condition
    pub success: Option<SuccessCriteria>,
}

impl Default for TerminationConfig {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
            max_position_error: MAX_POSITION_ERROR,
            max_attitude_error: MAX_ATTITUDE_ERROR,
            failure_penalty: DEFAULT_FAILURE_PENALTY,
            max_velocity_error: Some(MAX_VELOCITY_ERROR),
            max_angular_velocity: Some(MAX_ANGULAR_VELOCITY),
            max_tilt: Some(MAX_TILT),
            ground_level: Some(GROUND_LEVEL),
            success: None,
        }
    }
}

impl TerminationConfig {
    /// Create a new termination config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum episode steps.
    pub fn with_max_steps(mut self, steps: u32) -> Self {
        self.max_steps = steps;
        self
    }

    /// Set position divergence bound.
    pub fn with_max_position_error(mut self, bound: f64) -> Self {
        self.max_position_error = bound;
        self
    }

    /// Set attitude divergence bound.
    pub fn with_max_attitude_error(mut self, bound: f64) -> Self {
        self.max_attitude_error = bound;
        self
    }

    /// Set failure penalty.
    pub fn with_failure_penalty(mut self, penalty: f64) -> Self {
        self.failure_penalty = penalty;
        self
    }

    /// Set velocity error bound.
    pub fn with_velocity_bound(mut self, bound: f64) -> Self {
        self.max_velocity_error = Some(bound);
        self
    }

    /// Disable velocity error bound.
    pub fn without_velocity_bound(mut self) -> Self {
        self.max_velocity_error = None;
        self
    }

    /// Set angular rate bound.
    pub fn with_angular_velocity_bound(mut self, bound: f64) -> Self {
        self.max_angular_velocity = Some(bound);
        self
    }

    /// Disable angular rate bound.
    pub fn without_angular_velocity_bound(mut self) -> Self {
        self.max_angular_velocity = None;
        self
    }

    /// Set tilt bound.
    pub fn with_tilt_bound(mut self, bound: f64) -> Self {
        self.max_tilt = Some(bound);
        self
    }

    /// Disable tilt bound.
    pub fn without_tilt_bound(mut self) -> Self {
        self.max_tilt = None;
        self
    }

    /// Enable ground collision at the given height.
    pub fn with_ground_level(mut self, z: f64) -> Self {
        self.ground_level = Some(z);
        self
    }

    /// Disable ground collision.
    pub fn without_ground(mut self) -> Self {
        self.ground_level = None;
        self
    }

    /// Enable the success condition.
    pub fn with_success(mut self, criteria: SuccessCriteria) -> Self {
        self.success = Some(criteria);
        self
    }

    /// Only the mandatory position and attitude bounds stay active.
    ///
    /// Also drops the ground check.
    pub fn divergence_only(self) -> Self {
        self.without_velocity_bound()
            .without_angular_velocity_bound()
            .without_tilt_bound()
            .without_ground()
    }

    /// Validate bounds and horizon.
    pub fn validate(&self) -> Result<()> {
        if self.max_steps == 0 {
            return Err(EnvError::config("max_steps", "must be at least 1"));
        }
        check_positive("max_position_error", self.max_position_error)?;
        check_positive("max_attitude_error", self.max_attitude_error)?;
        if !self.failure_penalty.is_finite() {
            return Err(EnvError::config("failure_penalty", "must be finite"));
        }
        check_optional_positive("max_velocity_error", self.max_velocity_error)?;
        check_optional_positive("max_angular_velocity", self.max_angular_velocity)?;
        check_optional_positive("max_tilt", self.max_tilt)?;
        if let Some(z) = self.ground_level {
            if !z.is_finite() {
                return Err(EnvError::config("ground_level", "must be finite"));
            }
        }
        if let Some(success) = &self.success {
            success.validate()?;
            if success.position_tolerance >= self.max_position_error {
                return Err(EnvError::config(
                    "position_tolerance",
                    "success tolerance must be tighter than the divergence bound",
                ));
            }
            if success.attitude_tolerance >= self.max_attitude_error {
                return Err(EnvError::config(
                    "attitude_tolerance",
                    "success tolerance must be tighter than the divergence bound",
                ));
            }
        }
        Ok(())
    }
}

// ============================================================================
// Initialization Configuration
// ============================================================================

/// Type of random distribution for initialization.
#[derive(Clone, Debug, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistributionType {
    /// Uniform distribution in range
    #[default]
    Uniform,
    /// Gaussian with mean at the range center, clamped to the range
    Gaussian,
    /// Range midpoint (no randomization)
    Fixed,
}

/// Initial state distribution, as offsets from the reference.
///
/// Each range is `[x_min, x_max, y_min, y_max, z_min, z_max]` (or roll, pitch,
/// yaw for attitude).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InitConfig {
    pub position_dist: DistributionType,
    pub position_range: [f64; 6],

    pub velocity_dist: DistributionType,
    pub velocity_range: [f64; 6],

    pub attitude_dist: DistributionType,
    pub attitude_range: [f64; 6],

    pub angular_vel_dist: DistributionType,
    pub angular_vel_range: [f64; 6],
}

impl Default for InitConfig {
    fn default() -> Self {
        Self {
            position_dist: DistributionType::Uniform,
            position_range: [-1.5, 1.5, -1.5, 1.5, -1.0, 1.0],

            velocity_dist: DistributionType::Fixed,
            velocity_range: [0.0; 6],

            attitude_dist: DistributionType::Uniform,
            attitude_range: [-0.1, 0.1, -0.1, 0.1, -0.2, 0.2],

            angular_vel_dist: DistributionType::Fixed,
            angular_vel_range: [0.0; 6],
        }
    }
}

impl InitConfig {
    /// Create a new initialization config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start exactly at the reference.
    pub fn at_reference() -> Self {
        Self {
            position_dist: DistributionType::Fixed,
            position_range: [0.0; 6],
            velocity_dist: DistributionType::Fixed,
            velocity_range: [0.0; 6],
            attitude_dist: DistributionType::Fixed,
            attitude_range: [0.0; 6],
            angular_vel_dist: DistributionType::Fixed,
            angular_vel_range: [0.0; 6],
        }
    }

    /// Set position offset range.
    pub fn with_position_range(mut self, range: [f64; 6]) -> Self {
        self.position_range = range;
        self
    }

    /// Set position distribution type.
    pub fn with_position_dist(mut self, dist: DistributionType) -> Self {
        self.position_dist = dist;
        self
    }

    /// Set velocity offset range.
    pub fn with_velocity_range(mut self, range: [f64; 6]) -> Self {
        self.velocity_range = range;
        self
    }

    /// Set velocity distribution type.
    pub fn with_velocity_dist(mut self, dist: DistributionType) -> Self {
        self.velocity_dist = dist;
        self
    }

    /// Set attitude offset range (roll, pitch, yaw in radians).
    pub fn with_attitude_range(mut self, range: [f64; 6]) -> Self {
        self.attitude_range = range;
        self
    }

    /// Set attitude distribution type.
    pub fn with_attitude_dist(mut self, dist: DistributionType) -> Self {
        self.attitude_dist = dist;
        self
    }

    /// Set angular velocity offset range.
    pub fn with_angular_vel_range(mut self, range: [f64; 6]) -> Self {
        self.angular_vel_range = range;
        self
    }

    /// Set angular velocity distribution type.
    pub fn with_angular_vel_dist(mut self, dist: DistributionType) -> Self {
        self.angular_vel_dist = dist;
        self
    }

    /// Validate that every range is finite and ordered.
    pub fn validate(&self) -> Result<()> {
        let ranges = [
            ("position_range", &self.position_range),
            ("velocity_range", &self.velocity_range),
            ("attitude_range", &self.attitude_range),
            ("angular_vel_range", &self.angular_vel_range),
        ];
        for (param, range) in ranges {
            if !range.iter().all(|x| x.is_finite()) {
                return Err(EnvError::config(param, "must be finite"));
            }
            for axis in range.chunks_exact(2) {
                if axis[0] > axis[1] {
                    return Err(EnvError::config(
                        param,
                        format!("min {} exceeds max {}", axis[0], axis[1]),
                    ));
                }
            }
        }
        Ok(())
    }
}

// ============================================================================
// Main Environment Configuration
// ============================================================================

/// Main configuration for the quadrotor environment.
///
/// Generic over reward type `R` which must implement [`RewardComponent`].
/// Defaults to [`presets::QuadraticReward`].
///
/// # Example
///
/// ```ignore
/// use quadrotor_env::{QuadrotorConfig, reward::presets};
///
/// let env = QuadrotorConfig::new()
///     .with_dt(0.01)
///     .with_reward_fn(presets::proximity())
///     .build()?;
/// ```
#[derive(Clone, Debug)]
pub struct QuadrotorConfig<R: RewardComponent = presets::QuadraticReward> {
    /// Control step (s)
    pub dt: f64,
    /// Integration sub-steps per control step
    pub substeps: u32,
    /// Integration scheme
    pub integrator: Integrator,
    /// Mass properties
    pub vehicle: VehicleConfig,
    /// Rotor geometry and thrust envelope
    pub actuator: ActuatorConfig,
    /// Observation layout
    pub obs: ObsConfig,
    /// Reward function (compile-time generic)
    pub reward: R,
    /// Termination conditions
    pub termination: TerminationConfig,
    /// Initial state distribution
    pub init: InitConfig,
    /// Reference used when `reset` is not given one
    pub reference: Reference,
}

impl Default for QuadrotorConfig<presets::QuadraticReward> {
    fn default() -> Self {
        Self {
            dt: DEFAULT_DT,
            substeps: 1,
            integrator: Integrator::Rk4,
            vehicle: VehicleConfig::default(),
            actuator: ActuatorConfig::default(),
            obs: ObsConfig::errors_only(),
            reward: presets::quadratic(RewardWeights::default()),
            termination: TerminationConfig::default(),
            init: InitConfig::default(),
            reference: Reference::default(),
        }
    }
}

impl QuadrotorConfig<presets::QuadraticReward> {
    /// Default configuration with the quadratic reward.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the quadratic reward weights.
    pub fn with_reward_weights(mut self, weights: RewardWeights) -> Self {
        self.reward = presets::quadratic(weights);
        self
    }
}

impl<R: RewardComponent> QuadrotorConfig<R> {
    /// Swap in a different reward function.
    pub fn with_reward_fn<R2: RewardComponent>(self, reward: R2) -> QuadrotorConfig<R2> {
        QuadrotorConfig {
            dt: self.dt,
            substeps: self.substeps,
            integrator: self.integrator,
            vehicle: self.vehicle,
            actuator: self.actuator,
            obs: self.obs,
            reward,
            termination: self.termination,
            init: self.init,
            reference: self.reference,
        }
    }

    /// Set control timestep.
    pub fn with_dt(mut self, dt: f64) -> Self {
        self.dt = dt;
        self
    }

    /// Set integration sub-steps per control step.
    pub fn with_substeps(mut self, substeps: u32) -> Self {
        self.substeps = substeps;
        self
    }

    /// Set integration scheme.
    pub fn with_integrator(mut self, integrator: Integrator) -> Self {
        self.integrator = integrator;
        self
    }

    /// Set vehicle configuration.
    pub fn with_vehicle(mut self, vehicle: VehicleConfig) -> Self {
        self.vehicle = vehicle;
        self
    }

    /// Set actuator configuration.
    pub fn with_actuator(mut self, actuator: ActuatorConfig) -> Self {
        self.actuator = actuator;
        self
    }

    /// Set observation configuration.
    pub fn with_observation(mut self, obs: ObsConfig) -> Self {
        self.obs = obs;
        self
    }

    /// Set termination configuration.
    pub fn with_termination(mut self, termination: TerminationConfig) -> Self {
        self.termination = termination;
        self
    }

    /// Set initialization configuration.
    pub fn with_init(mut self, init: InitConfig) -> Self {
        self.init = init;
        self
    }

    /// Set default reference.
    pub fn with_reference(mut self, reference: Reference) -> Self {
        self.reference = reference;
        self
    }

    /// Get total observation size.
    pub fn observation_size(&self) -> usize {
        self.obs.observation_size()
    }

    /// Integration sub-step length (s).
    pub fn dt_physics(&self) -> f64 {
        self.dt / self.substeps.max(1) as f64
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<()> {
        check_positive("dt", self.dt)?;
        if self.substeps == 0 {
            return Err(EnvError::config("substeps", "must be at least 1"));
        }
        self.vehicle.validate()?;
        // Builds the mixer once to catch a singular geometry
        Mixer::from_config(&self.actuator)?;
        if 4.0 * self.actuator.max_thrust < self.vehicle.mass * self.vehicle.gravity {
            log::warn!(
                "thrust envelope ({} N total) cannot hover a {} kg vehicle",
                4.0 * self.actuator.max_thrust,
                self.vehicle.mass
            );
        }
        self.obs.validate()?;
        self.termination.validate()?;
        self.init.validate()?;
        self.reference
            .validate()
            .map_err(EnvError::InvalidReference)?;
        Ok(())
    }

    /// Build the quadrotor environment.
    pub fn build(self) -> Result<crate::env::QuadrotorEnv<R>> {
        crate::env::QuadrotorEnv::new(self)
    }
}
