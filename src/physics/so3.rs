//! SO(3) utilities for the rotation-matrix attitude representation.
//!
//! The integrator advances R with plain matrix arithmetic, which drifts off the
//! rotation group. [`project_to_so3`] is the post-integration stage that
//! restores RᵗR = I and det R = 1 by replacing R with the nearest rotation in
//! the Frobenius norm (polar decomposition via SVD).

use nalgebra::{Rotation3, SVD};

use crate::error::DynamicsError;
use crate::types::{Mat3, Vec3};

/// Iteration cap for the SVD used by [`project_to_so3`].
const MAX_SVD_ITERATIONS: usize = 200;

/// Skew-symmetric matrix from vector (hat map).
///
/// ```text
/// [v]× = [ 0  -z   y]
///        [ z   0  -x]
///        [-y   x   0]
/// ```
#[inline]
pub fn hat(v: &Vec3) -> Mat3 {
    Mat3::new(
        0.0, -v.z, v.y,
        v.z, 0.0, -v.x,
        -v.y, v.x, 0.0,
    )
}

/// Vector from a skew-symmetric matrix (vee map), the inverse of [`hat`].
///
/// Only the lower/upper entries used by `hat` are read; the symmetric part of
/// a non-skew input is ignored.
#[inline]
pub fn vee(m: &Mat3) -> Vec3 {
    Vec3::new(m[(2, 1)], m[(0, 2)], m[(1, 0)])
}

/// Geometric attitude error e_R = ½ vee(R_dᵗR − RᵗR_d).
///
/// Zero iff R = R_d (for rotations less than π apart).
#[inline]
pub fn attitude_error(r: &Mat3, r_d: &Mat3) -> Vec3 {
    0.5 * vee(&(r_d.transpose() * r - r.transpose() * r_d))
}

/// Geodesic distance between R and R_d (rad), in [0, π].
///
/// Unlike ‖e_R‖, which is sin of this angle, it keeps growing past 90°.
#[inline]
pub fn rotation_angle(r: &Mat3, r_d: &Mat3) -> f64 {
    let m = r_d.transpose() * r;
    let sin = 0.5 * vee(&(m - m.transpose())).norm();
    let cos = 0.5 * (m.trace() - 1.0);
    sin.atan2(cos)
}

/// Frobenius norm of RᵗR − I.
#[inline]
pub fn orthogonality_error(r: &Mat3) -> f64 {
    (r.transpose() * r - Mat3::identity()).norm()
}

/// Check that `r` is a proper rotation within `tol`.
pub fn is_rotation(r: &Mat3, tol: f64) -> bool {
    r.iter().all(|x| x.is_finite())
        && orthogonality_error(r) < tol
        && (r.determinant() - 1.0).abs() < tol
}

/// Project a 3x3 matrix onto SO(3).
///
/// With M = UΣVᵗ the nearest rotation is U·diag(1, 1, d)·Vᵗ where
/// d = det(UVᵗ); the sign flip is applied to the direction of the smallest
/// singular value so a reflection is never returned.
pub fn project_to_so3(m: &Mat3) -> Result<Mat3, DynamicsError> {
    if !m.iter().all(|x| x.is_finite()) {
        return Err(DynamicsError::NonFinite("attitude"));
    }

    let svd = SVD::try_new(*m, true, true, f64::EPSILON, MAX_SVD_ITERATIONS)
        .ok_or(DynamicsError::ProjectionFailed)?;
    let mut u = svd.u.ok_or(DynamicsError::ProjectionFailed)?;
    let v_t = svd.v_t.ok_or(DynamicsError::ProjectionFailed)?;

    if (u * v_t).determinant() < 0.0 {
        let smallest = svd.singular_values.imin();
        let mut col = u.column_mut(smallest);
        col.neg_mut();
    }

    Ok(u * v_t)
}

/// Rotation from roll-pitch-yaw angles, R = Rz(yaw)·Ry(pitch)·Rx(roll).
#[inline]
pub fn from_euler(roll: f64, pitch: f64, yaw: f64) -> Mat3 {
    Rotation3::from_euler_angles(roll, pitch, yaw).into_inner()
}

/// Roll-pitch-yaw angles of a rotation matrix (inverse of [`from_euler`]).
#[inline]
pub fn to_euler(r: &Mat3) -> [f64; 3] {
    let (roll, pitch, yaw) = Rotation3::from_matrix_unchecked(*r).euler_angles();
    [roll, pitch, yaw]
}

/// Angle between the body z axis and the inertial z axis (rad).
#[inline]
pub fn tilt_angle(r: &Mat3) -> f64 {
    r[(2, 2)].clamp(-1.0, 1.0).acos()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_hat_is_skew_symmetric() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        let s = hat(&v);
        assert_relative_eq!(s.transpose(), -s, epsilon = 1e-15);
    }

    #[test]
    fn test_hat_matches_cross_product() {
        let a = Vec3::new(0.3, -1.2, 2.0);
        let b = Vec3::new(-0.7, 0.4, 1.1);
        assert_relative_eq!(hat(&a) * b, a.cross(&b), epsilon = 1e-12);
    }

    #[test]
    fn test_vee_inverts_hat() {
        let v = Vec3::new(-4.0, 0.5, 9.0);
        assert_relative_eq!(vee(&hat(&v)), v, epsilon = 1e-15);
    }

    #[test]
    fn test_attitude_error_zero_at_reference() {
        let r = from_euler(0.2, -0.1, 1.3);
        assert_relative_eq!(attitude_error(&r, &r), Vec3::zeros(), epsilon = 1e-12);
    }

    #[test]
    fn test_attitude_error_small_roll() {
        // Rotation of θ about x gives e_R = sin(θ)·x̂
        let theta = 0.1;
        let r = from_euler(theta, 0.0, 0.0);
        let e = attitude_error(&r, &Mat3::identity());
        assert_relative_eq!(e, Vec3::new(theta.sin(), 0.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_rotation_angle_grows_past_right_angle() {
        let identity = Mat3::identity();
        assert_eq!(rotation_angle(&identity, &identity), 0.0);
        for theta in [0.3, FRAC_PI_2, 2.0, 3.0] {
            let r = from_euler(theta, 0.0, 0.0);
            assert_relative_eq!(rotation_angle(&r, &identity), theta, epsilon = 1e-9);
        }
        let flipped = from_euler(std::f64::consts::PI, 0.0, 0.0);
        assert_relative_eq!(
            rotation_angle(&flipped, &identity),
            std::f64::consts::PI,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_rotation_angle_is_relative_to_reference() {
        let r_d = from_euler(0.0, 0.0, 1.2);
        let r = r_d * from_euler(0.0, 0.4, 0.0);
        assert_relative_eq!(rotation_angle(&r, &r_d), 0.4, epsilon = 1e-9);
    }

    #[test]
    fn test_projection_keeps_rotation() {
        let r = from_euler(0.4, 0.3, -2.0);
        let p = project_to_so3(&r).unwrap();
        assert_relative_eq!(p, r, epsilon = 1e-10);
    }

    #[test]
    fn test_projection_repairs_drift() {
        let r = from_euler(0.1, 0.2, 0.3);
        let drifted = r + Mat3::new(1e-3, -2e-3, 0.0, 4e-4, 1e-3, 3e-3, 0.0, -1e-3, 2e-3);
        assert!(orthogonality_error(&drifted) > 1e-4);

        let p = project_to_so3(&drifted).unwrap();
        assert!(orthogonality_error(&p) < 1e-12);
        assert_relative_eq!(p.determinant(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(p, r, epsilon = 1e-2);
    }

    #[test]
    fn test_projection_never_returns_reflection() {
        let reflection = Mat3::new(1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, -1.0);
        let p = project_to_so3(&reflection).unwrap();
        assert_relative_eq!(p.determinant(), 1.0, epsilon = 1e-12);
        assert!(is_rotation(&p, 1e-9));
    }

    #[test]
    fn test_projection_rejects_nan() {
        let mut m = Mat3::identity();
        m[(1, 2)] = f64::NAN;
        assert_eq!(project_to_so3(&m), Err(DynamicsError::NonFinite("attitude")));
    }

    #[test]
    fn test_euler_roundtrip() {
        let angles = [0.3, -0.2, 2.5];
        let back = to_euler(&from_euler(angles[0], angles[1], angles[2]));
        for i in 0..3 {
            assert_relative_eq!(back[i], angles[i], epsilon = 1e-12);
        }
    }

    #[test]
    fn test_tilt_angle() {
        assert_relative_eq!(tilt_angle(&Mat3::identity()), 0.0);
        // Yaw does not tilt the thrust axis
        assert_relative_eq!(tilt_angle(&from_euler(0.0, 0.0, 2.0)), 0.0, epsilon = 1e-12);
        assert_relative_eq!(tilt_angle(&from_euler(FRAC_PI_2, 0.0, 0.0)), FRAC_PI_2, epsilon = 1e-12);
    }

    #[test]
    fn test_is_rotation() {
        assert!(is_rotation(&Mat3::identity(), 1e-9));
        assert!(!is_rotation(&(2.0 * Mat3::identity()), 1e-9));
    }
}
