extern crate nalgebra as na;

use na::Vector3;

/// Position of a joint or of the tip, in the coordinate frame of the chain base.
/// ```
/// use nalgebra::Vector3;
/// use rs_arm_ik::kinematic_traits::Position;
///
/// let elbow: Position = Vector3::new(1.0, 0.0, 0.0);
/// ```
pub type Position = Vector3<f64>;

/// Incremental rotation in the axis-angle (exponential map) form. The direction is the
/// rotation axis and the norm is the rotation angle in radians.
pub type Expmap = Vector3<f64>;

/// One increment per actuated joint, in chain order (base first).
pub type Expmaps = Vec<Expmap>;

/// How the linear system of a single IK step has been solved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveMethod {
    /// Column-pivoted QR on a square, full rank Jacobian.
    Direct,
    /// Minimum-norm least squares through the SVD pseudo-inverse.
    LeastSquares,
    /// The chain has no actuated joints, nothing to solve.
    Empty,
}

/// Summary of one differential IK step.
#[derive(Debug, Clone)]
pub struct StepReport {
    /// Distance between the goal and the tip before the step was taken.
    pub error_before: f64,

    /// Solver branch taken.
    pub method: SolveMethod,

    /// Increments that have been applied, one per joint.
    pub increments: Expmaps,
}

/// Surface an external driver (render loop, animation, command line) needs from the arm.
pub trait Kinematics {
    /// Joint positions followed by the tip, base first.
    fn joint_positions(&self) -> Vec<Position>;

    /// Current end effector position.
    fn tip(&self) -> Position;

    /// Degrees of freedom, three per actuated joint.
    fn dof(&self) -> usize;

    /// Performs exactly one linearized step towards the goal, mutating the arm in place.
    fn step_towards(&mut self, goal: &Position) -> StepReport;
}
