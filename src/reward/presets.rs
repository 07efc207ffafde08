//! Preset reward configurations.
//!
//! These presets return concrete tuple types for zero-cost composition.

use super::components::*;
use crate::config::RewardWeights;
use crate::constants::MAX_POSITION_ERROR;

/// Quadratic tracking reward:
/// `−(w_x‖e_x‖² + w_v‖e_v‖² + w_R‖e_R‖² + w_Ω‖e_Ω‖² + w_a‖a‖²)`.
pub type QuadraticReward = (
    PositionError,
    VelocityError,
    AttitudeError,
    AngularVelocityError,
    ControlEffort,
);

/// Bounded proximity shaping.
pub type ProximityReward = (PositionProximity, VelocityMagnitude, AngularVelocityMagnitude);

/// Quadratic reward with the given weights.
pub fn quadratic(weights: RewardWeights) -> QuadraticReward {
    (
        PositionError {
            weight: weights.position,
        },
        VelocityError {
            weight: weights.velocity,
        },
        AttitudeError {
            weight: weights.attitude,
        },
        AngularVelocityError {
            weight: weights.angular_velocity,
        },
        ControlEffort {
            weight: weights.action,
        },
    )
}

/// Proximity reward: `2·max(0, 1 − ‖e_x‖/3) − 0.15‖e_v‖ − 0.2‖e_Ω‖`.
///
/// Always at most 2, which keeps returns comparable across horizons.
pub fn proximity() -> ProximityReward {
    (
        PositionProximity {
            weight: 2.0,
            scale: MAX_POSITION_ERROR,
        },
        VelocityMagnitude { weight: 0.15 },
        AngularVelocityMagnitude { weight: 0.2 },
    )
}
