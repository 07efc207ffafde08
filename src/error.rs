//! Error types for the quadrotor environment.

use thiserror::Error;

use crate::termination::EpisodeStatus;

/// Result type for environment operations.
pub type Result<T> = std::result::Result<T, EnvError>;

/// Errors reported to the caller of the environment.
///
/// Out-of-range actions and diverging dynamics are *not* errors: the former are
/// clamped and the latter end the episode with a failure status.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EnvError {
    /// Invalid configuration (non-positive mass or timestep, empty thrust
    /// envelope, singular mixer, ...). Raised at construction time.
    #[error("invalid configuration for '{param}': {message}")]
    InvalidConfig {
        param: &'static str,
        message: String,
    },

    /// Reference state is non-finite or its attitude is not a rotation.
    #[error("invalid reference: {0}")]
    InvalidReference(String),

    /// Explicit initial state is non-finite or its attitude is not a rotation.
    #[error("invalid initial state: {0}")]
    InvalidState(String),

    /// `step` was called before the first `reset`.
    #[error("step called before reset")]
    NotReset,

    /// `step` was called after the episode reached a terminal status.
    #[error("step called on a finished episode ({status}); call reset first")]
    EpisodeFinished { status: EpisodeStatus },

    /// Flat action buffer does not hold four values per environment.
    #[error("action dimension mismatch: expected {expected}, got {actual}")]
    ActionDimensionMismatch { expected: usize, actual: usize },

    /// Batch index outside `0..n_envs`.
    #[error("environment index {index} out of range for {n_envs} environments")]
    EnvIndexOutOfRange { index: usize, n_envs: usize },
}

impl EnvError {
    pub(crate) fn config(param: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            param,
            message: message.into(),
        }
    }
}

/// Failure of a single integration step.
///
/// Never crosses the public `step` boundary; the environment converts it into a
/// failure termination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DynamicsError {
    /// A state component became NaN or infinite.
    #[error("non-finite {0} after integration")]
    NonFinite(&'static str),

    /// SVD did not converge while projecting the attitude onto SO(3).
    #[error("attitude projection onto SO(3) failed")]
    ProjectionFailed,
}
