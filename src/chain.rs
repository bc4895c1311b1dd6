//! Kinematic chain: the ordered joint positions of the arm and its tip (end effector).
//!
//! The chain grows only outwards: each [`KinematicChain::add_joint`] turns the current tip
//! into a joint and places a new tip. Joints are spherical (3 DOF each), the tip is not
//! actuated.

use nalgebra::Matrix3xX;
use crate::kinematic_traits::{Position, StepReport};
use crate::stepper::IkStepper;

#[derive(Debug, Clone, PartialEq)]
pub struct KinematicChain {
    /// Actuated joints, from the base outwards.
    joints: Vec<Position>,

    /// End effector.
    tip: Position,
}

impl Default for KinematicChain {
    fn default() -> Self {
        Self::new(Position::zeros())
    }
}

impl KinematicChain {
    /// Creates the chain without joints, with the tip at the given position.
    pub fn new(tip: Position) -> Self {
        KinematicChain {
            joints: Vec::new(),
            tip,
        }
    }

    /// The arm used by the figure-eight demo: base at origin, joints at 1, 2 and 2.5
    /// on the x axis and the tip at 4.
    pub fn demo_arm() -> Self {
        let mut chain = Self::default();
        chain.add_joint(Position::new(1.0, 0.0, 0.0));
        chain.add_joint(Position::new(2.0, 0.0, 0.0));
        chain.add_joint(Position::new(2.5, 0.0, 0.0));
        chain.add_joint(Position::new(4.0, 0.0, 0.0));
        chain
    }

    /// Appends the current tip as a new joint and moves the tip to `position`.
    pub fn add_joint(&mut self, position: Position) {
        self.joints.push(self.tip);
        self.tip = position;
    }

    /// Copy of joint positions followed by the tip, base first.
    pub fn joint_positions(&self) -> Vec<Position> {
        let mut positions = Vec::with_capacity(self.joints.len() + 1);
        positions.extend_from_slice(&self.joints);
        positions.push(self.tip);
        positions
    }

    /// Same as [`Self::joint_positions`], as columns of a 3 x (N + 1) matrix.
    pub fn positions_matrix(&self) -> Matrix3xX<f64> {
        Matrix3xX::from_columns(&self.joint_positions())
    }

    /// Number of actuated joints (the tip is not counted).
    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    /// Degrees of freedom, three per joint.
    pub fn dof(&self) -> usize {
        3 * self.joints.len()
    }

    pub fn tip(&self) -> Position {
        self.tip
    }

    /// Actuated joints without the tip.
    pub fn joints(&self) -> &[Position] {
        &self.joints
    }

    /// Distances between neighbouring positions, the last one ending at the tip.
    /// Rotation steps must keep these unchanged.
    pub fn link_lengths(&self) -> Vec<f64> {
        self.joint_positions()
            .windows(2)
            .map(|pair| (pair[1] - pair[0]).norm())
            .collect()
    }

    /// One differential IK step towards the goal with the default solver settings.
    /// See [`IkStepper`] for the details.
    pub fn step_towards(&mut self, goal: &Position) -> StepReport {
        IkStepper::default().step_towards(self, goal)
    }

    pub(crate) fn joints_mut(&mut self) -> &mut [Position] {
        &mut self.joints
    }

    pub(crate) fn set_tip(&mut self, tip: Position) {
        self.tip = tip;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_chain_has_only_tip() {
        let chain = KinematicChain::new(Position::new(1.0, 2.0, 3.0));
        assert_eq!(chain.joint_count(), 0);
        assert_eq!(chain.dof(), 0);
        assert_eq!(chain.joint_positions(), vec![Position::new(1.0, 2.0, 3.0)]);
    }

    #[test]
    fn test_default_tip_at_origin() {
        let chain = KinematicChain::default();
        assert_eq!(chain.tip(), Position::zeros());
    }

    #[test]
    fn test_add_joint_extends_outwards() {
        let mut chain = KinematicChain::default();
        chain.add_joint(Position::new(1.0, 0.0, 0.0));
        chain.add_joint(Position::new(1.0, 2.0, 0.0));

        assert_eq!(chain.joint_count(), 2);
        assert_eq!(chain.dof(), 6);
        assert_eq!(chain.joints(), &[Position::zeros(), Position::new(1.0, 0.0, 0.0)]);
        assert_eq!(chain.tip(), Position::new(1.0, 2.0, 0.0));
    }

    #[test]
    fn test_joint_positions_is_a_copy() {
        let mut chain = KinematicChain::default();
        chain.add_joint(Position::new(1.0, 0.0, 0.0));
        let snapshot = chain.joint_positions();
        chain.add_joint(Position::new(5.0, 0.0, 0.0));

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[1], Position::new(1.0, 0.0, 0.0));
        assert_eq!(chain.joint_positions().len(), 3);
    }

    #[test]
    fn test_positions_matrix_columns() {
        let chain = KinematicChain::demo_arm();
        let matrix = chain.positions_matrix();
        assert_eq!(matrix.nrows(), 3);
        assert_eq!(matrix.ncols(), 5);
        assert_eq!(matrix[(0, 3)], 2.5);
        assert_eq!(matrix[(0, 4)], 4.0);
    }

    #[test]
    fn test_link_lengths() {
        let chain = KinematicChain::demo_arm();
        assert_eq!(chain.link_lengths(), vec![1.0, 1.0, 0.5, 1.5]);
    }
}
