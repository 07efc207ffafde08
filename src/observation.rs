//! Error encoding and observation writing.
//!
//! The observation always starts with the four tracking errors
//! `[e_x, e_v, e_R, e_Ω]`, each divided by its configured scale, optionally
//! followed by R (row-major) and Ω. The same encoder runs at reset and after
//! every step.

use serde::Serialize;

use crate::config::ObsConfig;
use crate::physics::so3::{attitude_error, rotation_angle};
use crate::state::{Reference, RigidBodyState};
use crate::types::Vec3;

/// Tracking errors of a state against a reference.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ErrorState {
    /// e_x = x − x_d
    pub position: Vec3,
    /// e_v = v − v_d
    pub velocity: Vec3,
    /// e_R = ½ vee(R_dᵗR − RᵗR_d)
    pub attitude: Vec3,
    /// e_Ω = Ω − RᵗR_dΩ_d
    pub angular_velocity: Vec3,
    /// Geodesic angle between R and R_d (rad), in [0, π]
    pub attitude_angle: f64,
}

impl ErrorState {
    /// Compute all four error vectors.
    pub fn compute(state: &RigidBodyState, reference: &Reference) -> Self {
        let r = &state.rotation;
        let r_d = &reference.rotation;
        Self {
            position: state.position - reference.position,
            velocity: state.velocity - reference.velocity,
            attitude: attitude_error(r, r_d),
            angular_velocity: state.angular_velocity
                - r.transpose() * r_d * reference.angular_velocity,
            attitude_angle: rotation_angle(r, r_d),
        }
    }

    /// Check whether every error is exactly zero.
    pub fn is_zero(&self) -> bool {
        self.position == Vec3::zeros()
            && self.velocity == Vec3::zeros()
            && self.attitude == Vec3::zeros()
            && self.angular_velocity == Vec3::zeros()
            && self.attitude_angle == 0.0
    }
}

/// Write the observation into `output`.
///
/// # Returns
/// Number of elements written (always `config.observation_size()`)
///
/// # Panics
/// If `output` is shorter than `config.observation_size()`.
#[inline]
pub fn write_observation(
    state: &RigidBodyState,
    error: &ErrorState,
    config: &ObsConfig,
    output: &mut [f64],
) -> usize {
    let blocks = [
        (error.position, config.position_scale),
        (error.velocity, config.velocity_scale),
        (error.attitude, config.attitude_scale),
        (error.angular_velocity, config.angular_velocity_scale),
    ];

    let mut offset = 0;
    for (value, scale) in blocks {
        for i in 0..3 {
            output[offset + i] = value[i] / scale;
        }
        offset += 3;
    }

    // Attitude, row-major
    if config.rotation {
        for row in 0..3 {
            for col in 0..3 {
                output[offset + row * 3 + col] = state.rotation[(row, col)];
            }
        }
        offset += 9;
    }

    if config.angular_velocity {
        output[offset..offset + 3].copy_from_slice(state.angular_velocity.as_slice());
        offset += 3;
    }

    offset
}

/// Encode a state against a reference into a fresh observation vector.
pub fn encode(state: &RigidBodyState, reference: &Reference, config: &ObsConfig) -> Vec<f64> {
    let error = ErrorState::compute(state, reference);
    let mut obs = vec![0.0; config.observation_size()];
    write_observation(state, &error, config, &mut obs);
    obs
}
