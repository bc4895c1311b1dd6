//! Rotation composer: turns axis-angle increments into rotation matrices (Rodrigues formula)
//! and propagates them along the chain as homogeneous rigid transforms.
//!
//! A joint rotation rigidly carries every joint outward of it and the tip. Rotations are
//! applied from the base towards the tip; each joint pivots about its own position as it
//! is after all upstream rotations have been applied, with the axis given in the base frame.
//! This is the updated position, not the pre-update one: pivoting about where the joint
//! was before upstream joints moved it would stretch the links.

use nalgebra::{Matrix3, Matrix4, Point3};
use crate::chain::KinematicChain;
use crate::kinematic_traits::{Expmap, Position};

/// Increments with the norm at or below this value are treated as identity rotation.
pub const ROTATION_EPSILON: f64 = 1e-12;

/// Skew-symmetric cross product matrix: `crossmat(a) * b == a.cross(&b)`.
pub fn crossmat(v: &Position) -> Matrix3<f64> {
    Matrix3::new(
        0.0, -v.z, v.y,
        v.z, 0.0, -v.x,
        -v.y, v.x, 0.0,
    )
}

/// Rotation matrix for the axis-angle increment:
/// `R = I + sin(θ) K + (1 - cos(θ)) K²` where θ = |r| and K = crossmat(r / θ).
pub fn rodrigues(r: &Expmap, epsilon: f64) -> Matrix3<f64> {
    let theta = r.norm();
    if theta <= epsilon {
        return Matrix3::identity();
    }
    let k = crossmat(&(r / theta));
    Matrix3::identity() + k * theta.sin() + k * k * (1.0 - theta.cos())
}

/// Homogeneous transform rotating by `r` about the given pivot point:
/// `translate(pivot) * R(r) * translate(-pivot)`.
pub fn rotation_about(pivot: &Position, r: &Expmap, epsilon: f64) -> Matrix4<f64> {
    Matrix4::new_translation(pivot)
        * rodrigues(r, epsilon).to_homogeneous()
        * Matrix4::new_translation(&-pivot)
}

/// Applies one increment per joint to the chain, in place. Walking from the base, every
/// joint is first moved by the transform accumulated from upstream joints, then its own
/// rotation is folded into that transform. The tip receives the final transform.
///
/// The number of increments must match the joint count; [`crate::stepper::IkStepper`]
/// produces them that way. Debug builds panic on a mismatch.
pub(crate) fn apply_rotations(chain: &mut KinematicChain, expmaps: &[Expmap], epsilon: f64) {
    debug_assert_eq!(expmaps.len(), chain.joint_count(), "one increment per joint expected");

    let mut transform = Matrix4::identity();
    for (joint, expmap) in chain.joints_mut().iter_mut().zip(expmaps) {
        let moved = transform.transform_point(&Point3::from(*joint)).coords;
        *joint = moved;
        transform = rotation_about(&moved, expmap, epsilon) * transform;
    }

    let tip = transform.transform_point(&Point3::from(chain.tip())).coords;
    chain.set_tip(tip);
}
