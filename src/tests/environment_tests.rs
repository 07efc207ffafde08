//! Environment tests defining the reset/step contract.
//!
//! These tests define:
//! - Reset and step preconditions
//! - Bit-for-bit determinism under a fixed seed
//! - Horizon, divergence and non-finite endings
//! - Action clamping equivalence
//! - Reference changes between steps

use approx::assert_relative_eq;

use crate::config::{InitConfig, ObsConfig, QuadrotorConfig, TerminationConfig, VehicleConfig};
use crate::constants::G;
use crate::env::{QuadrotorEnv, StepOutcome};
use crate::error::EnvError;
use crate::physics::motor::{ActionMapping, ActuatorConfig};
use crate::state::{Reference, RigidBodyState};
use crate::termination::{EpisodeStatus, FailureCause};
use crate::types::Vec3;

// ============================================================================
// Helper Functions
// ============================================================================

fn default_env() -> QuadrotorEnv {
    QuadrotorConfig::new().build().unwrap()
}

fn env_at_reference() -> QuadrotorEnv {
    QuadrotorConfig::new()
        .with_init(InitConfig::at_reference())
        .build()
        .unwrap()
}

/// Deterministic pseudo-random action sequence in [-1, 1].
fn action_sequence(seed: u64, len: usize) -> Vec<[f64; 4]> {
    let mut rng = fastrand::Rng::with_seed(seed);
    (0..len)
        .map(|_| [(); 4].map(|_| rng.f64() * 2.0 - 1.0))
        .collect()
}

fn run_episode(env: &mut QuadrotorEnv, seed: u64, actions: &[[f64; 4]]) -> Vec<StepOutcome> {
    env.reset(seed, None).unwrap();
    let mut outcomes = Vec::new();
    for action in actions {
        let outcome = env.step(action).unwrap();
        let done = outcome.done;
        outcomes.push(outcome);
        if done {
            break;
        }
    }
    outcomes
}

// ============================================================================
// Reset Tests
// ============================================================================

#[test]
fn should_reject_step_before_reset() {
    let mut env = default_env();

    assert_eq!(env.step(&[0.0; 4]).unwrap_err(), EnvError::NotReset);
}

#[test]
fn should_return_zero_observation_when_reset_at_reference() {
    let mut env = env_at_reference();

    let obs = env.reset(3, None).unwrap();

    assert_eq!(obs.len(), 12);
    assert!(obs.iter().all(|&x| x == 0.0), "Got {obs:?}");
}

#[test]
fn should_size_full_observation_with_attitude_and_rates() {
    let mut env = QuadrotorConfig::new()
        .with_observation(ObsConfig::full())
        .with_init(InitConfig::at_reference())
        .build()
        .unwrap();

    let obs = env.reset(0, None).unwrap();

    assert_eq!(obs.len(), 24);
    // Level attitude appears as the identity, row-major
    assert_eq!(&obs[12..21], &[1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]);
}

#[test]
fn should_sample_initial_state_around_given_reference() {
    let mut env = default_env();
    let reference = Reference::hover(Vec3::new(10.0, -4.0, -20.0));

    env.reset(5, Some(reference)).unwrap();

    let offset = env.state().position - reference.position;
    assert!(offset.x.abs() <= 1.5 && offset.y.abs() <= 1.5 && offset.z.abs() <= 1.0);
    assert_eq!(env.reference(), &reference);
}

#[test]
fn should_start_fresh_episode_after_reset() {
    let mut env = env_at_reference();
    env.reset(0, None).unwrap();
    let hover = env.hover_action();
    env.step(&hover).unwrap();
    env.step(&hover).unwrap();

    env.reset(1, None).unwrap();

    assert_eq!(env.episode().step_count, 0);
    assert_eq!(env.episode().time, 0.0);
    assert_eq!(env.episode().status, EpisodeStatus::Running);
    assert_eq!(env.episode().cumulative_reward, 0.0);
}

#[test]
fn should_give_different_initial_states_for_different_seeds() {
    let mut env = default_env();

    let a = env.reset(1, None).unwrap();
    let b = env.reset(2, None).unwrap();

    assert_ne!(a, b);
}

// ============================================================================
// Determinism Tests
// ============================================================================

#[test]
fn should_reproduce_trajectory_bit_for_bit() {
    let actions = action_sequence(99, 300);
    let mut first = default_env();
    let mut second = default_env();

    let a = run_episode(&mut first, 17, &actions);
    let b = run_episode(&mut second, 17, &actions);

    assert_eq!(a, b);
    assert_eq!(first.state(), second.state());
}

#[test]
fn should_reproduce_trajectory_after_reusing_environment() {
    let actions = action_sequence(4, 100);
    let mut env = default_env();

    let a = run_episode(&mut env, 8, &actions);
    run_episode(&mut env, 9, &actions);
    let b = run_episode(&mut env, 8, &actions);

    assert_eq!(a, b);
}

// ============================================================================
// Horizon Tests
// ============================================================================

#[test]
fn should_time_out_after_exactly_max_steps() {
    let horizon = 50;
    let mut env = QuadrotorConfig::new()
        .with_init(InitConfig::at_reference())
        .with_termination(TerminationConfig::new().with_max_steps(horizon).divergence_only())
        .build()
        .unwrap();
    env.reset(0, None).unwrap();
    let hover = env.hover_action();

    for step in 1..horizon {
        let outcome = env.step(&hover).unwrap();
        assert!(!outcome.done, "Episode ended early at step {step}");
        assert_eq!(outcome.status, EpisodeStatus::Running);
    }

    let last = env.step(&hover).unwrap();
    assert!(last.done);
    assert_eq!(last.status, EpisodeStatus::Timeout);
    assert_eq!(last.info.status, "timeout");
    assert_eq!(last.info.step, horizon);
}

#[test]
fn should_advance_time_by_dt_each_step() {
    let mut env = QuadrotorConfig::new()
        .with_dt(0.01)
        .with_init(InitConfig::at_reference())
        .build()
        .unwrap();
    env.reset(0, None).unwrap();
    let hover = env.hover_action();

    let mut outcome = env.step(&hover).unwrap();
    for _ in 0..9 {
        outcome = env.step(&hover).unwrap();
    }

    assert_eq!(outcome.info.step, 10);
    assert_relative_eq!(outcome.info.time, 0.1, epsilon = 1e-12);
}

#[test]
fn should_reject_step_after_episode_finished() {
    let mut env = QuadrotorConfig::new()
        .with_termination(TerminationConfig::new().with_max_steps(1))
        .build()
        .unwrap();
    env.reset(0, None).unwrap();
    let hover = env.hover_action();
    env.step(&hover).unwrap();

    assert_eq!(
        env.step(&hover).unwrap_err(),
        EnvError::EpisodeFinished {
            status: EpisodeStatus::Timeout
        }
    );
}

// ============================================================================
// Divergence Tests
// ============================================================================

fn diverging_env() -> QuadrotorEnv {
    let mut env = QuadrotorConfig::new()
        .with_termination(TerminationConfig::new().divergence_only())
        .build()
        .unwrap();
    let reference = Reference::default();
    let mut state = reference.as_state();
    state.position.x += 2.9;
    state.velocity.x = 40.0;
    env.reset_to_state(state, None).unwrap();
    env
}

#[test]
fn should_fail_when_position_error_leaves_bound() {
    let mut env = diverging_env();
    let hover = env.hover_action();

    let outcome = env.step(&hover).unwrap();

    assert!(outcome.done);
    assert_eq!(
        outcome.status,
        EpisodeStatus::Failure(FailureCause::PositionDivergence)
    );
    assert_eq!(outcome.reward, env.config().termination.failure_penalty);
    assert_eq!(outcome.info.failure_cause, Some("position_divergence"));
}

#[test]
fn should_report_failure_status_after_divergence() {
    let mut env = diverging_env();
    let hover = env.hover_action();
    env.step(&hover).unwrap();

    assert_eq!(
        env.step(&hover).unwrap_err(),
        EnvError::EpisodeFinished {
            status: EpisodeStatus::Failure(FailureCause::PositionDivergence)
        }
    );
}

#[test]
fn should_end_with_non_finite_state_on_overflow() {
    let mut env = default_env();
    let mut state = Reference::default().as_state();
    state.velocity.x = 1e308;
    env.reset_to_state(state, None).unwrap();
    let hover = env.hover_action();

    let outcome = env.step(&hover).unwrap();

    assert_eq!(
        outcome.status,
        EpisodeStatus::Failure(FailureCause::NonFiniteState)
    );
    assert_eq!(outcome.reward, env.config().termination.failure_penalty);
    // Last finite state is kept
    assert!(env.state().is_finite());
    assert_eq!(env.state().velocity.x, 1e308);
}

#[test]
fn should_reject_non_rotation_initial_state() {
    let mut env = default_env();
    let mut state = RigidBodyState::at_rest(Vec3::zeros());
    state.rotation *= 2.0;

    assert!(matches!(
        env.reset_to_state(state, None),
        Err(EnvError::InvalidState(_))
    ));
}

// ============================================================================
// Physical Scenario Tests
// ============================================================================

#[test]
fn should_fall_under_gravity_with_zero_thrust() {
    let mut env = QuadrotorConfig::new()
        .with_vehicle(VehicleConfig::default().with_mass(1.0))
        .with_actuator(ActuatorConfig::default().with_action_mapping(ActionMapping::Thrust))
        .with_init(InitConfig::at_reference())
        .build()
        .unwrap();
    env.reset(0, None).unwrap();
    let dt = env.config().dt;

    let outcome = env.step(&[0.0; 4]).unwrap();

    // e3 points down: falling gives positive z error and velocity
    let obs = &outcome.observation;
    assert!(obs[2] > 0.0);
    assert!(env.state().velocity.z > 0.0);
    assert_relative_eq!(obs[2], 0.5 * G * dt * dt, epsilon = 1e-12);
    assert_relative_eq!(env.state().velocity.z, G * dt, epsilon = 1e-12);
    assert_eq!(outcome.info.total_thrust, 0.0);
}

#[test]
fn should_stay_at_reference_with_zero_normalized_action() {
    let mut env = env_at_reference();
    env.reset(0, None).unwrap();

    // The mid-envelope command equals hover for the default airframe
    let outcome = env.step(&[0.0; 4]).unwrap();

    assert!(outcome.observation.iter().all(|x| x.abs() < 1e-9));
    assert!(outcome.reward <= 0.0);
    assert_relative_eq!(outcome.reward, 0.0, epsilon = 1e-12);
}

#[test]
fn should_climb_at_full_thrust() {
    let mut env = env_at_reference();
    env.reset(0, None).unwrap();

    let mut outcome = env.step(&[1.0; 4]).unwrap();
    for _ in 0..19 {
        outcome = env.step(&[1.0; 4]).unwrap();
    }

    assert!(env.state().velocity.z < 0.0, "Vehicle should move up (-z)");
    assert!(outcome.observation[2] < 0.0);
}

// ============================================================================
// Action Clamping Tests
// ============================================================================

#[test]
fn should_treat_out_of_range_action_as_bound() {
    let mut a = env_at_reference();
    let mut b = env_at_reference();
    a.reset(0, None).unwrap();
    b.reset(0, None).unwrap();

    let wild = a.step(&[5.0, -7.0, 1.5, 0.25]).unwrap();
    let bounded = b.step(&[1.0, -1.0, 1.0, 0.25]).unwrap();

    assert_eq!(wild, bounded);
}

#[test]
fn should_treat_nan_action_as_minimum_thrust() {
    let mut a = env_at_reference();
    let mut b = env_at_reference();
    a.reset(0, None).unwrap();
    b.reset(0, None).unwrap();

    let nan = a.step(&[f64::NAN; 4]).unwrap();
    let minimum = b.step(&[-1.0; 4]).unwrap();

    assert_eq!(nan, minimum);
    assert_eq!(nan.info.thrusts, [0.0; 4]);
}

// ============================================================================
// Reference Tests
// ============================================================================

#[test]
fn should_observe_new_reference_after_set_reference() {
    let mut env = env_at_reference();
    env.reset(0, None).unwrap();
    let hover = env.hover_action();
    env.step(&hover).unwrap();

    env.set_reference(Reference::hover(Vec3::new(1.0, 0.0, -2.0)))
        .unwrap();
    let outcome = env.step(&hover).unwrap();

    assert_relative_eq!(outcome.observation[0], -1.0, epsilon = 1e-6);
    assert_eq!(outcome.status, EpisodeStatus::Running);
}

#[test]
fn should_reject_invalid_reference_and_keep_previous() {
    let mut env = env_at_reference();
    env.reset(0, None).unwrap();
    let before = *env.reference();
    let mut bad = Reference::default();
    bad.rotation[(0, 0)] = 3.0;

    assert!(matches!(
        env.set_reference(bad),
        Err(EnvError::InvalidReference(_))
    ));
    assert_eq!(env.reference(), &before);
}

#[test]
fn should_track_yawed_reference_with_zero_attitude_error() {
    let reference = Reference::hover(Vec3::new(0.0, 0.0, -2.0)).with_yaw(0.8);
    let mut env = env_at_reference();

    let obs = env.reset(0, Some(reference)).unwrap();

    assert!(obs.iter().all(|x| x.abs() < 1e-12));
}

// ============================================================================
// Property Tests
// ============================================================================

mod proptest_env {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        /// Any action component beyond the bound acts exactly like the bound.
        #[test]
        fn clamped_action_is_equivalent(
            base in prop::array::uniform4(-1.0f64..1.0),
            idx in 0usize..4,
            excess in 1.0f64..1e6,
            negative in any::<bool>(),
            seed in any::<u64>(),
        ) {
            let mut a = default_env();
            let mut b = default_env();
            a.reset(seed, None).unwrap();
            b.reset(seed, None).unwrap();

            let bound = if negative { -1.0 } else { 1.0 };
            let mut wild = base;
            wild[idx] = bound * excess;
            let mut clamped = base;
            clamped[idx] = bound;

            prop_assert_eq!(a.step(&wild).unwrap(), b.step(&clamped).unwrap());
        }

        /// Attitude stays a rotation along arbitrary closed-loop trajectories.
        #[test]
        fn attitude_stays_orthonormal_along_episode(
            seed in any::<u64>(),
            action_seed in any::<u64>(),
        ) {
            let mut env = QuadrotorConfig::new()
                .with_termination(
                    TerminationConfig::new()
                        .divergence_only()
                        .with_max_position_error(1e3)
                        .with_max_attitude_error(std::f64::consts::PI),
                )
                .build()
                .unwrap();
            env.reset(seed, None).unwrap();

            for action in action_sequence(action_seed, 200) {
                let outcome = env.step(&action).unwrap();
                prop_assert!(crate::physics::so3::is_rotation(&env.state().rotation, 1e-9));
                if outcome.done {
                    break;
                }
            }
        }
    }
}
