//! Default physical constants for the reference quadrotor.
//!
//! Values describe a 1.7 kg "+"-configuration research airframe. The inertial
//! frame uses e3 pointing down, so gravity acts along +z and altitude is -z.

use std::f64::consts::PI;

// ============================================================================
// Physical Properties
// ============================================================================

/// Mass of the vehicle (kg)
pub const MASS: f64 = 1.735;

/// Arm length, distance from center of mass to each rotor (m)
pub const ARM_LENGTH: f64 = 0.228;

/// Standard gravity (m/s^2)
pub const G: f64 = 9.81;

/// Moment of inertia around body X axis (kg*m^2)
pub const IXX: f64 = 0.02;

/// Moment of inertia around body Y axis (kg*m^2)
pub const IYY: f64 = 0.02;

/// Moment of inertia around body Z axis (kg*m^2)
pub const IZZ: f64 = 0.04;

/// Ratio of rotor drag torque to rotor thrust (m)
pub const TORQUE_COEFFICIENT: f64 = 0.0135;

// ============================================================================
// Actuator Envelope
// ============================================================================

/// Thrust of a single rotor at hover (N)
pub const HOVER_THRUST_PER_ROTOR: f64 = MASS * G / 4.0;

/// Minimum commandable thrust per rotor (N)
///
/// Zero rather than a 1 N idle floor: with the maximum at twice hover, a
/// normalized action of 0 is then exactly hover thrust.
pub const MIN_THRUST: f64 = 0.0;

/// Maximum commandable thrust per rotor (N), thrust-to-weight ratio of 2
pub const MAX_THRUST: f64 = 2.0 * HOVER_THRUST_PER_ROTOR;

// ============================================================================
// Simulation
// ============================================================================

/// Default integration timestep (s)
pub const DEFAULT_DT: f64 = 0.005;

/// Default episode horizon (steps)
pub const DEFAULT_MAX_STEPS: u32 = 5000;

/// Default hover set-point [x, y, z] (m), 2 m above the ground plane
pub const DEFAULT_TARGET_POSITION: [f64; 3] = [0.0, 0.0, -2.0];

// ============================================================================
// Divergence Limits
// ============================================================================

/// Maximum per-axis position error before failure (m)
pub const MAX_POSITION_ERROR: f64 = 3.0;

/// Maximum velocity error magnitude before failure (m/s)
pub const MAX_VELOCITY_ERROR: f64 = 10.0;

/// Maximum body rate magnitude before failure (rad/s)
pub const MAX_ANGULAR_VELOCITY: f64 = 3.0;

/// Maximum tilt of the body z axis from vertical before failure (rad)
pub const MAX_TILT: f64 = 80.0 * PI / 180.0;

/// Maximum angle between R and R_d before failure (rad).
///
/// Bounds the geodesic angle rather than ||e_R|| = sin(angle), which shrinks
/// again past 90 degrees and reads zero for a vehicle flipped upside down.
pub const MAX_ATTITUDE_ERROR: f64 = MAX_TILT;

/// Height of the ground plane (m); failure once x₃ reaches it
pub const GROUND_LEVEL: f64 = 0.0;

/// Reward assigned on the step that ends an episode in failure
pub const DEFAULT_FAILURE_PENALTY: f64 = -100.0;

// ============================================================================
// Reward Weights
// ============================================================================

/// Position error weight
pub const W_POSITION: f64 = 7.0;

/// Velocity error weight
pub const W_VELOCITY: f64 = 0.25;

/// Attitude error weight
pub const W_ATTITUDE: f64 = 3.5;

/// Angular velocity error weight
pub const W_ANGULAR_VELOCITY: f64 = 0.25;

/// Control effort weight
pub const W_ACTION: f64 = 0.01;

/// Inertia tensor diagonal [Ixx, Iyy, Izz]
#[inline]
pub const fn inertia_diagonal() -> [f64; 3] {
    [IXX, IYY, IZZ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hover_thrust_balances_weight() {
        assert!((4.0 * HOVER_THRUST_PER_ROTOR - MASS * G).abs() < 1e-12);
    }

    #[test]
    fn test_envelope_contains_hover() {
        assert!(MIN_THRUST < HOVER_THRUST_PER_ROTOR);
        assert!(HOVER_THRUST_PER_ROTOR < MAX_THRUST);
    }

    #[test]
    fn test_normalized_midpoint_is_hover() {
        assert_eq!(MIN_THRUST, 0.0);
        assert!(((MIN_THRUST + MAX_THRUST) / 2.0 - HOVER_THRUST_PER_ROTOR).abs() < 1e-12);
    }

    #[test]
    fn test_attitude_bound_is_an_angle_below_pi() {
        assert!(MAX_ATTITUDE_ERROR > 0.0 && MAX_ATTITUDE_ERROR < PI);
    }
}
