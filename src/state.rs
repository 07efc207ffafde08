//! Vehicle state, reference set-point and per-episode bookkeeping.
//!
//! The environment owns exactly one of each. The integrator consumes and
//! returns [`RigidBodyState`] by value; the reference is read-only while a step
//! runs.

use serde::{Deserialize, Serialize};

use crate::config::{DistributionType, InitConfig};
use crate::constants::DEFAULT_TARGET_POSITION;
use crate::physics::so3::{from_euler, is_rotation};
use crate::termination::EpisodeStatus;
use crate::types::{Mat3, Vec3};

/// Tolerance on ‖RᵗR − I‖ and |det R − 1| for externally supplied attitudes.
pub const ROTATION_TOLERANCE: f64 = 1e-6;

/// Number of scalars in a flattened state: x, v, R (row-major), Ω.
pub const STATE_SIZE: usize = 18;

// ============================================================================
// Rigid Body State
// ============================================================================

/// Full 6-DOF state of the vehicle.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RigidBodyState {
    /// Position x (m), inertial frame
    pub position: Vec3,
    /// Velocity v (m/s), inertial frame
    pub velocity: Vec3,
    /// Attitude R, body to inertial
    pub rotation: Mat3,
    /// Angular velocity Ω (rad/s), body frame
    pub angular_velocity: Vec3,
}

impl RigidBodyState {
    /// Level and motionless at `position`.
    pub fn at_rest(position: Vec3) -> Self {
        Self {
            position,
            velocity: Vec3::zeros(),
            rotation: Mat3::identity(),
            angular_velocity: Vec3::zeros(),
        }
    }

    /// Name of the first component holding a NaN or infinity, if any.
    pub fn first_non_finite(&self) -> Option<&'static str> {
        if !all_finite(self.position.iter()) {
            Some("position")
        } else if !all_finite(self.velocity.iter()) {
            Some("velocity")
        } else if !all_finite(self.rotation.iter()) {
            Some("attitude")
        } else if !all_finite(self.angular_velocity.iter()) {
            Some("angular_velocity")
        } else {
            None
        }
    }

    /// Check that every component is finite.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.first_non_finite().is_none()
    }

    /// Check finiteness and that the attitude is a proper rotation.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(component) = self.first_non_finite() {
            return Err(format!("{component} is not finite"));
        }
        if !is_rotation(&self.rotation, ROTATION_TOLERANCE) {
            return Err("attitude is not a rotation matrix".to_string());
        }
        Ok(())
    }

    /// Flatten to `[x, v, R (row-major), Ω]`.
    pub fn to_array(&self) -> [f64; STATE_SIZE] {
        let mut out = [0.0; STATE_SIZE];
        out[0..3].copy_from_slice(self.position.as_slice());
        out[3..6].copy_from_slice(self.velocity.as_slice());
        for row in 0..3 {
            for col in 0..3 {
                out[6 + row * 3 + col] = self.rotation[(row, col)];
            }
        }
        out[15..18].copy_from_slice(self.angular_velocity.as_slice());
        out
    }

    /// Sample an initial state around `reference` within `config` bounds.
    ///
    /// Ranges are offsets from the reference. Attitude offsets are roll, pitch
    /// and yaw composed on the right of R_d.
    pub fn sample(config: &InitConfig, reference: &Reference, rng: &mut fastrand::Rng) -> Self {
        let dp = sample_range_3d(&config.position_range, config.position_dist, rng);
        let dv = sample_range_3d(&config.velocity_range, config.velocity_dist, rng);
        let da = sample_range_3d(&config.attitude_range, config.attitude_dist, rng);
        let dw = sample_range_3d(&config.angular_vel_range, config.angular_vel_dist, rng);

        Self {
            position: reference.position + dp,
            velocity: reference.velocity + dv,
            rotation: reference.rotation * from_euler(da.x, da.y, da.z),
            angular_velocity: reference.angular_velocity + dw,
        }
    }
}

#[inline]
fn all_finite<'a>(mut values: impl Iterator<Item = &'a f64>) -> bool {
    values.all(|x| x.is_finite())
}

/// Sample a value from range based on distribution type.
fn sample_range(min: f64, max: f64, dist: DistributionType, rng: &mut fastrand::Rng) -> f64 {
    match dist {
        DistributionType::Fixed => (min + max) * 0.5,
        DistributionType::Uniform => min + rng.f64() * (max - min),
        DistributionType::Gaussian => {
            // Box-Muller, 3-sigma inside the range
            let mean = (min + max) * 0.5;
            let std = (max - min) / 6.0;
            let u1 = rng.f64().max(1e-12);
            let u2 = rng.f64();
            let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
            (mean + std * z).clamp(min, max)
        }
    }
}

/// Sample a 3-vector from a 6-element `[min, max]` per-axis range.
fn sample_range_3d(range: &[f64; 6], dist: DistributionType, rng: &mut fastrand::Rng) -> Vec3 {
    Vec3::new(
        sample_range(range[0], range[1], dist, rng),
        sample_range(range[2], range[3], dist, rng),
        sample_range(range[4], range[5], dist, rng),
    )
}

// ============================================================================
// Reference
// ============================================================================

/// Desired state (x_d, v_d, R_d, Ω_d) the errors are measured against.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    pub position: Vec3,
    pub velocity: Vec3,
    pub rotation: Mat3,
    pub angular_velocity: Vec3,
}

impl Default for Reference {
    fn default() -> Self {
        Self::hover(Vec3::from(DEFAULT_TARGET_POSITION))
    }
}

impl Reference {
    /// Level hover at `position`.
    pub fn hover(position: Vec3) -> Self {
        Self::from_state(&RigidBodyState::at_rest(position))
    }

    /// Use a full state as the set-point.
    pub fn from_state(state: &RigidBodyState) -> Self {
        Self {
            position: state.position,
            velocity: state.velocity,
            rotation: state.rotation,
            angular_velocity: state.angular_velocity,
        }
    }

    /// The vehicle state that has zero error against this reference.
    pub fn as_state(&self) -> RigidBodyState {
        RigidBodyState {
            position: self.position,
            velocity: self.velocity,
            rotation: self.rotation,
            angular_velocity: self.angular_velocity,
        }
    }

    /// Set the desired heading, keeping the thrust axis vertical.
    pub fn with_yaw(mut self, yaw: f64) -> Self {
        self.rotation = from_euler(0.0, 0.0, yaw);
        self
    }

    /// Set the desired velocity.
    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    /// Check finiteness and that R_d is a proper rotation.
    pub fn validate(&self) -> Result<(), String> {
        self.as_state().validate()
    }
}

// ============================================================================
// Episode State
// ============================================================================

/// Per-episode counters owned by the environment.
#[derive(Clone, Debug, PartialEq)]
pub struct EpisodeState {
    /// Steps taken since reset
    pub step_count: u32,
    /// Simulated time since reset (s)
    pub time: f64,
    /// Current status; terminal values are final until the next reset
    pub status: EpisodeStatus,
    /// Consecutive steps with every error inside the success tolerances
    pub in_tolerance_steps: u32,
    /// Sum of rewards since reset
    pub cumulative_reward: f64,
}

impl Default for EpisodeState {
    fn default() -> Self {
        Self {
            step_count: 0,
            time: 0.0,
            status: EpisodeStatus::Running,
            in_tolerance_steps: 0,
            cumulative_reward: 0.0,
        }
    }
}

impl EpisodeState {
    /// Check whether the episode has ended.
    #[inline]
    pub fn is_done(&self) -> bool {
        self.status.is_terminal()
    }
}
