//! Rigid body equations of motion on SO(3) and their fixed-step integration.
//!
//! ```text
//! ẋ = v
//! v̇ = g·e₃ − (f/m)·R·e₃ + F_d/m
//! Ṙ = R·[Ω]×
//! Ω̇ = J⁻¹·(M + M_d − Ω × JΩ)
//! ```
//!
//! e₃ points down. Rotor inputs are held constant over a control step
//! (zero-order hold). Every sub-step ends with [`project_to_so3`] so attitude
//! drift never accumulates across steps.

use serde::{Deserialize, Serialize};

use crate::config::VehicleConfig;
use crate::error::{DynamicsError, EnvError};
use crate::physics::motor::ControlInput;
use crate::physics::so3::{hat, project_to_so3};
use crate::state::RigidBodyState;
use crate::types::{e3, Mat3, Vec3};

// ============================================================================
// Configuration
// ============================================================================

/// Fixed-step integration scheme.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Integrator {
    /// Explicit Euler, first order.
    Euler,
    /// Classic 4th-order Runge-Kutta.
    #[default]
    Rk4,
}

/// Constant additive force and moment acting on the vehicle.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Disturbance {
    /// Inertial-frame force (N)
    pub force: Vec3,
    /// Body-frame moment (N·m)
    pub moment: Vec3,
}

impl Default for Disturbance {
    fn default() -> Self {
        Self::none()
    }
}

impl Disturbance {
    /// No disturbance.
    pub fn none() -> Self {
        Self {
            force: Vec3::zeros(),
            moment: Vec3::zeros(),
        }
    }

    /// Check whether any component is nonzero.
    pub fn is_active(&self) -> bool {
        self.force != Vec3::zeros() || self.moment != Vec3::zeros()
    }
}

// ============================================================================
// Rigid Body Model
// ============================================================================

/// Time derivative of a [`RigidBodyState`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StateDerivative {
    pub position: Vec3,
    pub velocity: Vec3,
    pub rotation: Mat3,
    pub angular_velocity: Vec3,
}

/// Mass properties and environment of one vehicle, with J⁻¹ precomputed.
#[derive(Clone, Debug, PartialEq)]
pub struct RigidBody {
    mass: f64,
    inertia: Mat3,
    inertia_inv: Mat3,
    gravity: f64,
    disturbance: Disturbance,
}

impl RigidBody {
    /// Build from a vehicle configuration, rejecting a singular inertia tensor.
    pub fn from_config(vehicle: &VehicleConfig) -> Result<Self, EnvError> {
        vehicle.validate()?;
        let inertia = vehicle.inertia;
        let inertia_inv = inertia
            .try_inverse()
            .ok_or_else(|| EnvError::config("inertia", "inertia tensor is singular"))?;
        Ok(Self {
            mass: vehicle.mass,
            inertia,
            inertia_inv,
            gravity: vehicle.gravity,
            disturbance: vehicle.disturbance,
        })
    }

    /// Vehicle mass (kg).
    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// Gravitational acceleration (m/s²).
    pub fn gravity(&self) -> f64 {
        self.gravity
    }

    /// Inertial-frame linear acceleration.
    #[inline]
    pub fn linear_acceleration(&self, rotation: &Mat3, thrust: f64) -> Vec3 {
        self.gravity * e3() - (thrust / self.mass) * (rotation * e3())
            + self.disturbance.force / self.mass
    }

    /// Body-frame angular acceleration J⁻¹(M − Ω × JΩ).
    #[inline]
    pub fn angular_acceleration(&self, omega: &Vec3, moment: &Vec3) -> Vec3 {
        let gyro = omega.cross(&(self.inertia * omega));
        self.inertia_inv * (moment + self.disturbance.moment - gyro)
    }

    /// Right-hand side of the equations of motion.
    pub fn derivative(&self, state: &RigidBodyState, input: &ControlInput) -> StateDerivative {
        StateDerivative {
            position: state.velocity,
            velocity: self.linear_acceleration(&state.rotation, input.thrust),
            rotation: state.rotation * hat(&state.angular_velocity),
            angular_velocity: self.angular_acceleration(&state.angular_velocity, &input.moment),
        }
    }

    /// One integration sub-step of length `dt`, ending on SO(3).
    pub fn step(
        &self,
        state: &RigidBodyState,
        input: &ControlInput,
        dt: f64,
        integrator: Integrator,
    ) -> Result<RigidBodyState, DynamicsError> {
        let mut next = match integrator {
            Integrator::Euler => advance(state, &self.derivative(state, input), dt),
            Integrator::Rk4 => self.rk4(state, input, dt),
        };

        check_finite(&next)?;
        next.rotation = project_to_so3(&next.rotation)?;
        Ok(next)
    }

    /// Advance a full control step of length `dt` split into `substeps`.
    pub fn propagate(
        &self,
        state: &RigidBodyState,
        input: &ControlInput,
        dt: f64,
        substeps: u32,
        integrator: Integrator,
    ) -> Result<RigidBodyState, DynamicsError> {
        let h = dt / substeps as f64;
        let mut current = *state;
        for _ in 0..substeps {
            current = self.step(&current, input, h, integrator)?;
        }
        Ok(current)
    }

    fn rk4(&self, s: &RigidBodyState, input: &ControlInput, dt: f64) -> RigidBodyState {
        let k1 = self.derivative(s, input);
        let k2 = self.derivative(&advance(s, &k1, dt / 2.0), input);
        let k3 = self.derivative(&advance(s, &k2, dt / 2.0), input);
        let k4 = self.derivative(&advance(s, &k3, dt), input);

        let weighted = StateDerivative {
            position: k1.position + 2.0 * k2.position + 2.0 * k3.position + k4.position,
            velocity: k1.velocity + 2.0 * k2.velocity + 2.0 * k3.velocity + k4.velocity,
            rotation: k1.rotation + 2.0 * k2.rotation + 2.0 * k3.rotation + k4.rotation,
            angular_velocity: k1.angular_velocity
                + 2.0 * k2.angular_velocity
                + 2.0 * k3.angular_velocity
                + k4.angular_velocity,
        };
        advance(s, &weighted, dt / 6.0)
    }
}

/// s + h·ṡ, component-wise on the embedding space (R leaves SO(3)).
#[inline]
fn advance(s: &RigidBodyState, d: &StateDerivative, h: f64) -> RigidBodyState {
    RigidBodyState {
        position: s.position + h * d.position,
        velocity: s.velocity + h * d.velocity,
        rotation: s.rotation + h * d.rotation,
        angular_velocity: s.angular_velocity + h * d.angular_velocity,
    }
}

fn check_finite(s: &RigidBodyState) -> Result<(), DynamicsError> {
    match s.first_non_finite() {
        Some(component) => Err(DynamicsError::NonFinite(component)),
        None => Ok(()),
    }
}
