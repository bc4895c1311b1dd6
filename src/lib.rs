//! Differential inverse kinematics for an open kinematic chain ("arm") of spherical joints.
//!
//! The arm is a sequence of joint positions connected by rigid links, ending in the tip
//! (end effector). Each joint can rotate freely about any axis, giving 3 degrees of freedom
//! per joint. The solver drives the tip towards a goal numerically, one linearized step at
//! a time:
//!
//! - the geometric Jacobian (3 x 3N) is built from the current joint and tip positions,
//! - the linear system `J x = goal - tip` is solved directly, or in the minimum-norm least
//!   squares sense through SVD when the system is underdetermined or singular,
//! - the solution is split into one axis-angle increment per joint, converted to rotation
//!   matrices with the Rodrigues formula and propagated from the base outwards as rigid
//!   transforms.
//!
//! # Features
//!
//! - Singular configurations (like a fully stretched arm) never produce NaN. The
//!   unreachable component of the error is simply not corrected in that step.
//! - Link lengths are preserved exactly (up to rounding) by every step.
//! - No damping is applied. Steps with large errors may overshoot; repeated calls, usually
//!   one per rendered frame, converge under typical conditions.
//! - Arm description, solver thresholds and the figure-eight demo trajectory can be read
//!   from YAML (feature `allow_filesystem`, on by default).
//!
//! ```
//! use rs_arm_ik::chain::KinematicChain;
//! use rs_arm_ik::kinematic_traits::Position;
//!
//! let mut chain = KinematicChain::demo_arm();
//! let goal = Position::new(3.0, 1.0, 0.0);
//! for _ in 0..50 {
//!     chain.step_towards(&goal);
//! }
//! assert!((chain.tip() - goal).norm() < 1e-3);
//! ```

pub mod kinematic_traits;

pub mod chain;

pub mod rotation;

pub mod jacobian;

pub mod stepper;

pub mod trajectory;

pub mod config_error;

#[path = "utils/utils.rs"]
pub mod utils;

#[cfg(feature = "allow_filesystem")]
pub mod arm_from_file;

#[cfg(test)]
mod tests;
