//! Shared numeric types and value types that carry an invariant.
//!
//! - `Vec3` / `Mat3`: double-precision nalgebra aliases used everywhere
//! - `MotorThrusts`: four rotor thrusts, each inside the actuator envelope
//!
//! Invariant-carrying types are only constructed at API boundaries; hot paths
//! work on the raw nalgebra values.

use nalgebra::{Matrix3, Matrix4, Vector3, Vector4};
use serde::Serialize;

/// 3-vector in either the inertial or the body frame.
pub type Vec3 = Vector3<f64>;

/// 3x3 matrix (attitude, inertia).
pub type Mat3 = Matrix3<f64>;

/// 4-vector of per-rotor quantities.
pub type Vec4 = Vector4<f64>;

/// 4x4 actuator mixing matrix.
pub type Mat4 = Matrix4<f64>;

/// Inertial z axis. Points down: gravity acts along +e3.
#[inline]
pub fn e3() -> Vec3 {
    Vector3::z()
}

/// Four rotor thrusts (N), each clamped into `[min, max]`.
///
/// Invariant: `min <= thrust[i] <= max` for the envelope it was built with.
/// The only constructor is [`MotorThrusts::clamped`], so out-of-range or
/// NaN commands can never reach the mixer.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct MotorThrusts([f64; 4]);

impl MotorThrusts {
    /// Clamp raw thrusts into the envelope.
    ///
    /// NaN components map to `min` (motor off); infinities saturate like any
    /// other out-of-range value. `f64::clamp` passes NaN through unchanged, so
    /// that check is explicit.
    #[inline]
    pub fn clamped(raw: [f64; 4], min: f64, max: f64) -> Self {
        let mut out = [min; 4];
        for (o, &r) in out.iter_mut().zip(raw.iter()) {
            if !r.is_nan() {
                *o = r.clamp(min, max);
            }
        }
        Self(out)
    }

    /// Raw thrust values.
    #[inline]
    pub fn as_array(&self) -> [f64; 4] {
        self.0
    }

    /// Thrusts as an nalgebra column for mixing.
    #[inline]
    pub fn as_vector(&self) -> Vec4 {
        Vec4::from(self.0)
    }

    /// Sum of all rotor thrusts.
    #[inline]
    pub fn total(&self) -> f64 {
        self.0.iter().sum()
    }
}
