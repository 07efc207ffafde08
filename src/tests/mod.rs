//! Behavioral tests for the quadrotor environment.
//!
//! ## Organization
//!
//! - `physics_tests`: integrator accuracy, SO(3) preservation, sign conventions
//! - `environment_tests`: reset/step contract, determinism, horizon, divergence
//! - `termination_tests`: failure causes, success streaks, status priority
//! - `reward_tests`: reward values as seen through `step`

pub mod environment_tests;
