//! Quadrotor Flight Dynamics Environment on SO(3)
//!
//! A rigid-body quadrotor simulator exposed through a reinforcement learning
//! environment contract: reset, step, observe, reward, terminate.
//!
//! # Features
//!
//! - **Geometric Attitude**: rotation matrices integrated directly and
//!   re-projected onto SO(3) after every sub-step
//! - **Error Observations**: tracking errors e_x, e_v, e_R, e_Ω against a
//!   reference that may change between steps
//! - **Configurable Actuators**: "+", "x" or custom mixing matrices with a
//!   clamped thrust envelope
//! - **Composable Rewards**: tuple-composed reward components
//! - **Batch Adapter**: `n` independent vehicles behind flat buffers
//!
//! # Conventions
//!
//! The inertial e₃ axis points down: gravity is +g·e₃ and altitude is −z.
//! Thrust acts along −R·e₃.
//!
//! # Example
//!
//! ```rust,ignore
//! use quadrotor_env::{QuadrotorConfig, Reference, Vec3};
//!
//! let mut env = QuadrotorConfig::new().with_dt(0.005).build()?;
//! let obs = env.reset(42, Some(Reference::hover(Vec3::new(0.0, 0.0, -2.0))))?;
//!
//! let hover = env.hover_action();
//! let outcome = env.step(&hover)?;
//! println!("reward {} status {}", outcome.reward, outcome.status);
//! ```

// Core modules
pub mod config;
pub mod constants;
pub mod error;
pub mod state;
pub mod types;

// Physics simulation
pub mod physics;

// Environment components
pub mod env;
pub mod observation;
pub mod reward;
pub mod termination;

// Batch adapter
pub mod adapter;

// Comprehensive test suite
#[cfg(test)]
pub mod tests;

// Re-exports for convenience
pub use config::{
    DistributionType, InitConfig, ObsConfig, QuadrotorConfig, RewardWeights, SuccessCriteria,
    TerminationConfig, VehicleConfig,
};
pub use env::{QuadrotorEnv, StepInfo, StepOutcome};
pub use error::{DynamicsError, EnvError, Result};
pub use observation::{encode, ErrorState};
pub use physics::dynamics::{Disturbance, Integrator, RigidBody};
pub use physics::motor::{ActionMapping, ActuatorConfig, ControlInput, Mixer, RotorLayout};
pub use state::{EpisodeState, Reference, RigidBodyState};
pub use termination::{EpisodeStatus, FailureCause};
pub use types::{Mat3, MotorThrusts, Vec3};

// Re-export reward types for easy access
pub use reward::{presets, RewardComponent, RewardInput};

// Re-export adapter types
pub use adapter::{QuadrotorVecEnv, VecStepResult};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
