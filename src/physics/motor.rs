//! Actuator model: four rotor thrust commands to body force and moment.
//!
//! Each rotor i sits at angle θᵢ in the body x-y plane, distance `d` from the
//! center of mass, and pushes along −b₃ (body z points down). Its thrust Tᵢ
//! produces
//!
//! ```text
//! f   += Tᵢ
//! M_x += −d·sin(θᵢ)·Tᵢ
//! M_y +=  d·cos(θᵢ)·Tᵢ
//! M_z +=  sᵢ·c·Tᵢ          (sᵢ = ±1 spin direction, c = drag/thrust ratio)
//! ```
//!
//! "+" layout (top view, x forward, y right):
//! ```text
//!          1
//!          |
//!     4 ---+--- 2
//!          |
//!          3
//! ```
//! "X" layout rotates the same rotors by 45°.

use serde::{Deserialize, Serialize};

use crate::error::EnvError;
use crate::types::{Mat4, MotorThrusts, Vec3, Vec4};

/// Spin direction sign per rotor for the yaw row.
const SPIN: [f64; 4] = [-1.0, 1.0, -1.0, 1.0];

// ============================================================================
// Configuration
// ============================================================================

/// Rotor arrangement used to build the mixing matrix.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum RotorLayout {
    /// Rotors on the body axes at 0°, 90°, 180°, 270°.
    Plus,
    /// Rotors between the body axes at 45°, 135°, 225°, 315°.
    X,
    /// Explicit mixing matrix mapping [T1..T4] to [f, Mx, My, Mz].
    Custom(Mat4),
}

impl Default for RotorLayout {
    fn default() -> Self {
        Self::Plus
    }
}

impl RotorLayout {
    /// Rotor angles in the body x-y plane, `None` for a custom matrix.
    fn rotor_angles(&self) -> Option<[f64; 4]> {
        use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};
        match self {
            Self::Plus => Some([0.0, FRAC_PI_2, PI, 3.0 * FRAC_PI_2]),
            Self::X => Some([FRAC_PI_4, 3.0 * FRAC_PI_4, 5.0 * FRAC_PI_4, 7.0 * FRAC_PI_4]),
            Self::Custom(_) => None,
        }
    }
}

/// How policy actions are interpreted before clamping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionMapping {
    /// Actions in [-1, 1] map linearly onto [min_thrust, max_thrust].
    Normalized,
    /// Actions are rotor thrusts in newtons.
    Thrust,
}

impl Default for ActionMapping {
    fn default() -> Self {
        Self::Normalized
    }
}

/// Actuator geometry and envelope.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActuatorConfig {
    /// Rotor arrangement
    pub layout: RotorLayout,
    /// Distance from center of mass to each rotor (m)
    pub arm_length: f64,
    /// Rotor drag torque per unit thrust (m)
    pub torque_coefficient: f64,
    /// Lower thrust bound per rotor (N)
    pub min_thrust: f64,
    /// Upper thrust bound per rotor (N)
    pub max_thrust: f64,
    /// Interpretation of the action vector
    pub action_mapping: ActionMapping,
}

impl Default for ActuatorConfig {
    fn default() -> Self {
        use crate::constants::*;
        Self {
            layout: RotorLayout::Plus,
            arm_length: ARM_LENGTH,
            torque_coefficient: TORQUE_COEFFICIENT,
            min_thrust: MIN_THRUST,
            max_thrust: MAX_THRUST,
            action_mapping: ActionMapping::Normalized,
        }
    }
}

impl ActuatorConfig {
    /// Set rotor layout.
    pub fn with_layout(mut self, layout: RotorLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Set arm length.
    pub fn with_arm_length(mut self, arm_length: f64) -> Self {
        self.arm_length = arm_length;
        self
    }

    /// Set drag/thrust coefficient.
    pub fn with_torque_coefficient(mut self, c: f64) -> Self {
        self.torque_coefficient = c;
        self
    }

    /// Set per-rotor thrust envelope.
    pub fn with_thrust_limits(mut self, min_thrust: f64, max_thrust: f64) -> Self {
        self.min_thrust = min_thrust;
        self.max_thrust = max_thrust;
        self
    }

    /// Set action interpretation.
    pub fn with_action_mapping(mut self, mapping: ActionMapping) -> Self {
        self.action_mapping = mapping;
        self
    }

    /// Convert a policy action into clamped rotor thrusts.
    ///
    /// Normalized actions are clamped to [-1, 1] first, thrust actions to the
    /// envelope directly; both routes end inside [min_thrust, max_thrust].
    pub fn action_to_thrusts(&self, action: &[f64; 4]) -> MotorThrusts {
        let raw = match self.action_mapping {
            ActionMapping::Thrust => *action,
            ActionMapping::Normalized => {
                let span = self.max_thrust - self.min_thrust;
                action.map(|a| {
                    if a.is_nan() {
                        f64::NAN
                    } else {
                        self.min_thrust + 0.5 * (a.clamp(-1.0, 1.0) + 1.0) * span
                    }
                })
            }
        };
        MotorThrusts::clamped(raw, self.min_thrust, self.max_thrust)
    }

    /// The action actually applied after clamping, in action units.
    ///
    /// NaN maps to the lower bound, matching [`Self::action_to_thrusts`].
    pub fn clamp_action(&self, action: &[f64; 4]) -> [f64; 4] {
        match self.action_mapping {
            ActionMapping::Thrust => self.action_to_thrusts(action).as_array(),
            ActionMapping::Normalized => {
                action.map(|a| if a.is_nan() { -1.0 } else { a.clamp(-1.0, 1.0) })
            }
        }
    }

    /// Action that commands the given rotor thrust on every rotor.
    pub fn thrust_to_action(&self, thrust: f64) -> f64 {
        match self.action_mapping {
            ActionMapping::Thrust => thrust,
            ActionMapping::Normalized => {
                let span = self.max_thrust - self.min_thrust;
                2.0 * (thrust - self.min_thrust) / span - 1.0
            }
        }
    }

    /// Action that produces total thrust m·g with equal rotor commands.
    pub fn hover_action(&self, mass: f64, gravity: f64) -> [f64; 4] {
        [self.thrust_to_action(mass * gravity / 4.0); 4]
    }

    /// Validate geometry and envelope.
    pub fn validate(&self) -> Result<(), EnvError> {
        if !(self.min_thrust.is_finite() && self.max_thrust.is_finite()) {
            return Err(EnvError::config("thrust_limits", "limits must be finite"));
        }
        if self.min_thrust < 0.0 {
            return Err(EnvError::config(
                "min_thrust",
                format!("must be non-negative, got {}", self.min_thrust),
            ));
        }
        if self.max_thrust <= self.min_thrust {
            return Err(EnvError::config(
                "max_thrust",
                format!(
                    "must exceed min_thrust ({}), got {}",
                    self.min_thrust, self.max_thrust
                ),
            ));
        }
        if self.layout.rotor_angles().is_some() {
            if !(self.arm_length > 0.0 && self.arm_length.is_finite()) {
                return Err(EnvError::config(
                    "arm_length",
                    format!("must be positive, got {}", self.arm_length),
                ));
            }
            if !(self.torque_coefficient > 0.0 && self.torque_coefficient.is_finite()) {
                return Err(EnvError::config(
                    "torque_coefficient",
                    format!("must be positive, got {}", self.torque_coefficient),
                ));
            }
        }
        Ok(())
    }
}

// ============================================================================
// Mixer
// ============================================================================

/// Net rotor force and moment fed to the integrator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ControlInput {
    /// Total thrust magnitude along −b₃ (N)
    pub thrust: f64,
    /// Body-frame moment (N·m)
    pub moment: Vec3,
}

/// Linear map from rotor thrusts to [f, M] and its inverse.
#[derive(Clone, Debug, PartialEq)]
pub struct Mixer {
    matrix: Mat4,
    inverse: Mat4,
}

impl Mixer {
    /// Build the mixing matrix for a validated actuator configuration.
    pub fn from_config(config: &ActuatorConfig) -> Result<Self, EnvError> {
        config.validate()?;
        let matrix = match config.layout {
            RotorLayout::Custom(m) => m,
            layout => {
                let angles = layout
                    .rotor_angles()
                    .ok_or_else(|| EnvError::config("layout", "missing rotor angles"))?;
                mixing_matrix(angles, config.arm_length, config.torque_coefficient)
            }
        };
        Self::from_matrix(matrix)
    }

    /// Wrap an explicit mixing matrix, rejecting singular ones.
    ///
    /// Row 0 must be all ones so that f is the plain sum of rotor thrusts.
    pub fn from_matrix(matrix: Mat4) -> Result<Self, EnvError> {
        if !matrix.iter().all(|x| x.is_finite()) {
            return Err(EnvError::config("layout", "mixing matrix must be finite"));
        }
        if matrix.row(0).iter().any(|&x| x != 1.0) {
            return Err(EnvError::config(
                "layout",
                "first row of the mixing matrix must be all ones",
            ));
        }
        let inverse = matrix
            .try_inverse()
            .ok_or_else(|| EnvError::config("layout", "mixing matrix is singular"))?;
        Ok(Self { matrix, inverse })
    }

    /// Mixing matrix rows [f, Mx, My, Mz].
    pub fn matrix(&self) -> &Mat4 {
        &self.matrix
    }

    /// Rotor thrusts to total thrust and body moment.
    #[inline]
    pub fn mix(&self, thrusts: &MotorThrusts) -> ControlInput {
        let fm = self.matrix * thrusts.as_vector();
        ControlInput {
            thrust: fm[0],
            moment: Vec3::new(fm[1], fm[2], fm[3]),
        }
    }

    /// Rotor thrusts that realise a desired total thrust and moment.
    ///
    /// The result is not clamped; callers feeding it back as an action go
    /// through the usual envelope clamp.
    pub fn allocate(&self, thrust: f64, moment: &Vec3) -> [f64; 4] {
        let t = self.inverse * Vec4::new(thrust, moment.x, moment.y, moment.z);
        [t[0], t[1], t[2], t[3]]
    }
}

/// Rows `[1, −d·sinθᵢ, d·cosθᵢ, sᵢ·c]` stacked per rotor column.
fn mixing_matrix(angles: [f64; 4], arm_length: f64, torque_coefficient: f64) -> Mat4 {
    let mut m = Mat4::zeros();
    for (i, theta) in angles.iter().enumerate() {
        // Snap tiny trig residue so the "+" layout has exact zeros
        let (s, c) = theta.sin_cos();
        let s = if s.abs() < 1e-12 { 0.0 } else { s };
        let c = if c.abs() < 1e-12 { 0.0 } else { c };

        m[(0, i)] = 1.0;
        m[(1, i)] = -arm_length * s;
        m[(2, i)] = arm_length * c;
        m[(3, i)] = SPIN[i] * torque_coefficient;
    }
    m
}
