//! Built-in reward components for quadrotor tracking.
//!
//! Each component is a small `Copy` struct implementing [`RewardComponent`].

use super::{RewardComponent, RewardInput};

// ============================================================================
// Quadratic Error Penalties
// ============================================================================

/// Penalizes squared position error.
///
/// `reward -= weight * ||e_x||^2`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PositionError {
    pub weight: f64,
}

impl RewardComponent for PositionError {
    const NAME: &'static str = "PositionError";

    #[inline]
    fn compute(&self, input: &RewardInput<'_>) -> f64 {
        if self.weight == 0.0 {
            return 0.0;
        }
        -self.weight * input.error.position.norm_squared()
    }
}

/// Penalizes squared velocity error.
///
/// `reward -= weight * ||e_v||^2`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VelocityError {
    pub weight: f64,
}

impl RewardComponent for VelocityError {
    const NAME: &'static str = "VelocityError";

    #[inline]
    fn compute(&self, input: &RewardInput<'_>) -> f64 {
        if self.weight == 0.0 {
            return 0.0;
        }
        -self.weight * input.error.velocity.norm_squared()
    }
}

/// Penalizes squared attitude error.
///
/// `reward -= weight * ||e_R||^2`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AttitudeError {
    pub weight: f64,
}

impl RewardComponent for AttitudeError {
    const NAME: &'static str = "AttitudeError";

    #[inline]
    fn compute(&self, input: &RewardInput<'_>) -> f64 {
        if self.weight == 0.0 {
            return 0.0;
        }
        -self.weight * input.error.attitude.norm_squared()
    }
}

/// Penalizes squared angular velocity error.
///
/// `reward -= weight * ||e_Ω||^2`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AngularVelocityError {
    pub weight: f64,
}

impl RewardComponent for AngularVelocityError {
    const NAME: &'static str = "AngularVelocityError";

    #[inline]
    fn compute(&self, input: &RewardInput<'_>) -> f64 {
        if self.weight == 0.0 {
            return 0.0;
        }
        -self.weight * input.error.angular_velocity.norm_squared()
    }
}

// ============================================================================
// Control Effort
// ============================================================================

/// Penalizes the squared magnitude of the applied action.
///
/// `reward -= weight * ||a||^2`, with `a` the clamped action. With normalized
/// actions zero is mid-envelope thrust.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ControlEffort {
    pub weight: f64,
}

impl RewardComponent for ControlEffort {
    const NAME: &'static str = "ControlEffort";

    #[inline]
    fn compute(&self, input: &RewardInput<'_>) -> f64 {
        if self.weight == 0.0 {
            return 0.0;
        }
        -self.weight * input.action.iter().map(|a| a * a).sum::<f64>()
    }
}

// ============================================================================
// Proximity Shaping
// ============================================================================

/// Bounded bonus for being near the target position.
///
/// `reward += weight * max(0, 1 - ||e_x|| / scale)`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PositionProximity {
    pub weight: f64,
    /// Distance at which the bonus reaches zero (m)
    pub scale: f64,
}

impl RewardComponent for PositionProximity {
    const NAME: &'static str = "PositionProximity";

    #[inline]
    fn compute(&self, input: &RewardInput<'_>) -> f64 {
        if self.weight == 0.0 {
            return 0.0;
        }
        self.weight * (1.0 - input.error.position.norm() / self.scale).max(0.0)
    }
}

/// Linear penalty on the velocity error norm.
///
/// `reward -= weight * ||e_v||`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VelocityMagnitude {
    pub weight: f64,
}

impl RewardComponent for VelocityMagnitude {
    const NAME: &'static str = "VelocityMagnitude";

    #[inline]
    fn compute(&self, input: &RewardInput<'_>) -> f64 {
        -self.weight * input.error.velocity.norm()
    }
}

/// Linear penalty on the angular velocity error norm.
///
/// `reward -= weight * ||e_Ω||`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AngularVelocityMagnitude {
    pub weight: f64,
}

impl RewardComponent for AngularVelocityMagnitude {
    const NAME: &'static str = "AngularVelocityMagnitude";

    #[inline]
    fn compute(&self, input: &RewardInput<'_>) -> f64 {
        -self.weight * input.error.angular_velocity.norm()
    }
}
