//! Episode status state machine.
//!
//! Evaluated once per step, after integration and error encoding:
//! - Failure: divergence bounds, ground collision or a non-finite state
//! - Success: every error inside its tolerance for `hold_steps` steps in a row
//! - Timeout: the step counter reached the horizon
//!
//! When several fire on the same step, failure wins over success and success
//! wins over timeout. Terminal statuses are final until the next reset.

use std::fmt;

use crate::config::{SuccessCriteria, TerminationConfig};
use crate::observation::ErrorState;
use crate::physics::so3::tilt_angle;
use crate::state::{EpisodeState, RigidBodyState};

// ============================================================================
// Status
// ============================================================================

/// Reason an episode ended in failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FailureCause {
    /// Largest component of e_x exceeded its bound
    PositionDivergence,
    /// Largest component of e_v exceeded its bound
    VelocityDivergence,
    /// Angle between R and R_d exceeded its bound
    AttitudeDivergence,
    /// Largest body rate exceeded its bound
    AngularVelocityDivergence,
    /// Body z axis tilted past the bound
    ExcessiveTilt,
    /// Vehicle reached the ground plane
    GroundCollision,
    /// Integration produced NaN or infinity
    NonFiniteState,
}

impl FailureCause {
    /// Stable snake_case name for diagnostics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PositionDivergence => "position_divergence",
            Self::VelocityDivergence => "velocity_divergence",
            Self::AttitudeDivergence => "attitude_divergence",
            Self::AngularVelocityDivergence => "angular_velocity_divergence",
            Self::ExcessiveTilt => "excessive_tilt",
            Self::GroundCollision => "ground_collision",
            Self::NonFiniteState => "non_finite_state",
        }
    }
}

impl fmt::Display for FailureCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of the current episode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum EpisodeStatus {
    #[default]
    Running,
    Success,
    Failure(FailureCause),
    Timeout,
}

impl EpisodeStatus {
    /// Any status other than `Running`.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Running)
    }

    /// Ended in failure (true terminal in RL terms).
    #[inline]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    /// Ended by the horizon (truncation in RL terms).
    #[inline]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }

    /// Failure cause, if any.
    pub fn failure_cause(&self) -> Option<FailureCause> {
        match self {
            Self::Failure(cause) => Some(*cause),
            _ => None,
        }
    }

    /// Short name: `running`, `success`, `failure` or `timeout`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Success => "success",
            Self::Failure(_) => "failure",
            Self::Timeout => "timeout",
        }
    }
}

impl fmt::Display for EpisodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failure(cause) => write!(f, "failure ({cause})"),
            other => f.write_str(other.as_str()),
        }
    }
}

// ============================================================================
// Checks
// ============================================================================

/// First failure condition that holds, in a fixed check order.
pub fn check_failure(
    state: &RigidBodyState,
    error: &ErrorState,
    config: &TerminationConfig,
) -> Option<FailureCause> {
    if !state.is_finite() {
        return Some(FailureCause::NonFiniteState);
    }

    if error.position.amax() > config.max_position_error {
        return Some(FailureCause::PositionDivergence);
    }

    if let Some(bound) = config.max_velocity_error {
        if error.velocity.amax() > bound {
            return Some(FailureCause::VelocityDivergence);
        }
    }

    if error.attitude_angle > config.max_attitude_error {
        return Some(FailureCause::AttitudeDivergence);
    }

    if let Some(bound) = config.max_angular_velocity {
        if state.angular_velocity.amax() > bound {
            return Some(FailureCause::AngularVelocityDivergence);
        }
    }

    if let Some(bound) = config.max_tilt {
        if tilt_angle(&state.rotation) > bound {
            return Some(FailureCause::ExcessiveTilt);
        }
    }

    // e3 points down: the ground is at larger z
    if let Some(ground) = config.ground_level {
        if state.position.z >= ground {
            return Some(FailureCause::GroundCollision);
        }
    }

    None
}

/// Check whether every error norm is strictly inside its tolerance.
#[inline]
pub fn within_tolerance(error: &ErrorState, criteria: &SuccessCriteria) -> bool {
    error.position.norm() < criteria.position_tolerance
        && error.velocity.norm() < criteria.velocity_tolerance
        && error.attitude.norm() < criteria.attitude_tolerance
        && error.angular_velocity.norm() < criteria.angular_velocity_tolerance
}

/// Evaluate the status after a step and record it in `episode`.
///
/// `episode.step_count` must already include the step being evaluated. The
/// in-tolerance streak is updated even on the step that ends the episode.
pub fn evaluate(
    state: &RigidBodyState,
    error: &ErrorState,
    episode: &mut EpisodeState,
    config: &TerminationConfig,
) -> EpisodeStatus {
    if episode.status.is_terminal() {
        return episode.status;
    }

    let succeeded = match &config.success {
        Some(criteria) => {
            if within_tolerance(error, criteria) {
                episode.in_tolerance_steps += 1;
            } else {
                episode.in_tolerance_steps = 0;
            }
            episode.in_tolerance_steps >= criteria.hold_steps
        }
        None => false,
    };

    let status = if let Some(cause) = check_failure(state, error, config) {
        EpisodeStatus::Failure(cause)
    } else if succeeded {
        EpisodeStatus::Success
    } else if episode.step_count >= config.max_steps {
        EpisodeStatus::Timeout
    } else {
        EpisodeStatus::Running
    };

    episode.status = status;
    status
}
