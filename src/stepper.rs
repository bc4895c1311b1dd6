//! Differential IK stepper.
//!
//! One call of [`IkStepper::step_towards`] performs exactly one linearized (Gauss-Newton
//! style) step with the step size of 1 and no damping:
//!
//! 1. error = goal - tip
//! 2. build the geometric Jacobian for the current geometry
//! 3. solve `J x = error` (direct or minimum-norm least squares)
//! 4. split `x` into one axis-angle increment per joint
//! 5. apply the increments to the chain
//!
//! Reaching the goal requires repeated calls. Near singular configurations or for large
//! errors the undamped step may overshoot or oscillate; it is not corrected here.
//!
//! ```
//! use rs_arm_ik::chain::KinematicChain;
//! use rs_arm_ik::kinematic_traits::Position;
//! use rs_arm_ik::stepper::IkStepper;
//!
//! let mut chain = KinematicChain::default();
//! chain.add_joint(Position::new(1.0, 0.0, 0.0));
//! chain.add_joint(Position::new(2.0, 0.0, 0.0));
//!
//! let goal = Position::new(1.5, 1.0, 0.0);
//! let stepper = IkStepper::default();
//! for _ in 0..20 {
//!     stepper.step_towards(&mut chain, &goal);
//! }
//! assert!((chain.tip() - goal).norm() < 1e-6);
//! ```

use tracing::debug;
use crate::chain::KinematicChain;
use crate::config_error::ConfigError;
use crate::jacobian::Jacobian;
use crate::kinematic_traits::{Kinematics, Position, StepReport};
use crate::rotation::{apply_rotations, ROTATION_EPSILON};

/// Numerical thresholds of the stepper.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverConfig {
    /// Singular values (and QR pivots) at or below this value are treated as zero. Once the
    /// largest of them exceeds 1 the cut-off scales with it.
    pub singular_value_epsilon: f64,

    /// Increments with the norm at or below this value are treated as no rotation.
    pub rotation_epsilon: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            singular_value_epsilon: 1e-9,
            rotation_epsilon: ROTATION_EPSILON,
        }
    }
}

impl SolverConfig {
    /// Both thresholds must be finite and not negative.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("singular_value_epsilon", self.singular_value_epsilon),
            ("rotation_epsilon", self.rotation_epsilon),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    value: format!("{} (must be finite and not negative)", value),
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct IkStepper {
    config: SolverConfig,
}

impl IkStepper {
    pub fn new(config: SolverConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(IkStepper { config })
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Moves the chain one linearized step towards the goal. The chain is only mutated
    /// at the end, after the increments for all joints are known.
    ///
    /// On an empty chain the Jacobian has no columns, no increments are produced and the
    /// tip stays where it is.
    pub fn step_towards(&self, chain: &mut KinematicChain, goal: &Position) -> StepReport {
        let error = goal - chain.tip();
        let jacobian = Jacobian::new(chain, self.config.singular_value_epsilon);
        let (increments, method) = jacobian.increments(&error);
        debug!(
            "step: error = {:.6}, joints = {}, method = {:?}",
            error.norm(),
            chain.joint_count(),
            method
        );

        apply_rotations(chain, &increments, self.config.rotation_epsilon);

        StepReport {
            error_before: error.norm(),
            method,
            increments,
        }
    }
}

/// Chain together with the stepper settings used to drive it.
#[derive(Debug, Clone, Default)]
pub struct Arm {
    pub chain: KinematicChain,
    pub stepper: IkStepper,
}

impl Arm {
    pub fn new(chain: KinematicChain, stepper: IkStepper) -> Self {
        Arm { chain, stepper }
    }
}

impl Kinematics for Arm {
    fn joint_positions(&self) -> Vec<Position> {
        self.chain.joint_positions()
    }

    fn tip(&self) -> Position {
        self.chain.tip()
    }

    fn dof(&self) -> usize {
        self.chain.dof()
    }

    fn step_towards(&mut self, goal: &Position) -> StepReport {
        self.stepper.step_towards(&mut self.chain, goal)
    }
}

impl Kinematics for KinematicChain {
    fn joint_positions(&self) -> Vec<Position> {
        KinematicChain::joint_positions(self)
    }

    fn tip(&self) -> Position {
        KinematicChain::tip(self)
    }

    fn dof(&self) -> usize {
        KinematicChain::dof(self)
    }

    fn step_towards(&mut self, goal: &Position) -> StepReport {
        KinematicChain::step_towards(self, goal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinematic_traits::SolveMethod;

    const EPSILON: f64 = 1e-9;

    fn bent_chain() -> KinematicChain {
        let mut chain = KinematicChain::default();
        chain.add_joint(Position::new(1.0, 0.0, 0.0));
        chain.add_joint(Position::new(1.0, 1.0, 0.0));
        chain.add_joint(Position::new(1.0, 1.0, 1.0));
        chain
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(SolverConfig::default().validate().is_ok());
        assert!(IkStepper::new(SolverConfig::default()).is_ok());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let negative = SolverConfig { singular_value_epsilon: -1.0, ..Default::default() };
        assert!(IkStepper::new(negative).is_err());

        let nan = SolverConfig { rotation_epsilon: f64::NAN, ..Default::default() };
        match nan.validate() {
            Err(ConfigError::InvalidValue { field, .. }) => assert_eq!(field, "rotation_epsilon"),
            other => panic!("Unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_local_descent() {
        let offsets = [
            Position::new(0.01, 0.0, 0.0),
            Position::new(0.0, 0.01, 0.0),
            Position::new(0.0, 0.0, 0.01),
            Position::new(-0.01, 0.01, 0.0),
            Position::new(0.005, -0.007, 0.003),
        ];
        for offset in offsets {
            let mut chain = bent_chain();
            let goal = chain.tip() + offset;
            let before = (goal - chain.tip()).norm();
            let report = chain.step_towards(&goal);
            let after = (goal - chain.tip()).norm();

            assert_eq!(report.method, SolveMethod::LeastSquares);
            assert!((report.error_before - before).abs() < EPSILON);
            assert!(after < before, "error did not decrease for {:?}: {} -> {}", offset, before, after);
            assert!(after < 0.1 * before);
        }
    }

    #[test]
    fn test_far_single_joint_still_descends() {
        for scale in [1e6, 1e8, 1e10] {
            let mut chain = KinematicChain::default();
            chain.add_joint(Position::new(0.3, 0.7, 0.2) * scale);
            let length = chain.tip().norm();
            let goal = chain.tip() + Position::new(0.01, 0.02, -0.01) * scale;

            let report = chain.step_towards(&goal);
            let after = (goal - chain.tip()).norm();

            assert_eq!(report.method, SolveMethod::LeastSquares, "scale {:e}", scale);
            assert!(report.increments[0].norm() < 0.1, "scale {:e}: {:?}", scale, report.increments);
            assert!(after < 0.9 * report.error_before,
                    "scale {:e}: {} -> {}", scale, report.error_before, after);
            assert!((chain.tip().norm() - length).abs() < 1e-9 * length);
        }
    }

    #[test]
    fn test_step_to_current_tip_changes_nothing() {
        let mut chain = bent_chain();
        let before = chain.joint_positions();
        let goal = chain.tip();
        let report = chain.step_towards(&goal);

        assert_eq!(report.error_before, 0.0);
        assert!(report.increments.iter().all(|e| e.norm() < EPSILON));
        for (a, b) in before.iter().zip(chain.joint_positions()) {
            assert!((a - b).norm() < EPSILON, "{:?} moved to {:?}", a, b);
        }
    }

    #[test]
    fn test_increments_per_joint() {
        let mut chain = KinematicChain::demo_arm();
        let report = chain.step_towards(&Position::new(3.0, 1.0, 0.0));
        assert_eq!(report.increments.len(), chain.joint_count());
    }

    #[test]
    fn test_empty_chain_is_noop() {
        let mut chain = KinematicChain::new(Position::new(1.0, -2.0, 0.5));
        let report = chain.step_towards(&Position::new(5.0, 5.0, 5.0));

        assert_eq!(report.method, SolveMethod::Empty);
        assert!(report.increments.is_empty());
        assert_eq!(chain.tip(), Position::new(1.0, -2.0, 0.5));
        assert_eq!(chain.joint_count(), 0);
    }

    #[test]
    fn test_singular_direction_keeps_chain() {
        // Stretched chain cannot move its tip further along its own axis
        let mut chain = KinematicChain::demo_arm();
        let before = chain.joint_positions();
        chain.step_towards(&Position::new(5.0, 0.0, 0.0));
        for (a, b) in before.iter().zip(chain.joint_positions()) {
            assert!(b.iter().all(|x| x.is_finite()));
            assert!((a - b).norm() < EPSILON);
        }
    }

    #[test]
    fn test_step_preserves_links() {
        let mut chain = KinematicChain::demo_arm();
        let lengths = chain.link_lengths();
        for _ in 0..10 {
            chain.step_towards(&Position::new(1.0, 2.0, 1.5));
        }
        for (a, b) in lengths.iter().zip(chain.link_lengths()) {
            assert!((a - b).abs() < 1e-6, "{} != {}", a, b);
        }
        assert_eq!(chain.joints()[0], Position::zeros());
    }

    #[test]
    fn test_arm_uses_its_stepper() {
        let stepper = IkStepper::new(SolverConfig {
            singular_value_epsilon: 1e-6,
            rotation_epsilon: 1e-10,
        }).expect("valid settings");
        let mut arm = Arm::new(bent_chain(), stepper);
        let goal = arm.tip() + Position::new(0.0, 0.01, 0.0);
        let before = (goal - arm.tip()).norm();
        arm.step_towards(&goal);

        assert_eq!(arm.dof(), 9);
        assert_eq!(arm.joint_positions().len(), 4);
        assert!((goal - arm.tip()).norm() < before);
        assert_eq!(arm.stepper.config().singular_value_epsilon, 1e-6);
    }
}
