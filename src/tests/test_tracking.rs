#[cfg(test)]
mod tests {
    use crate::chain::KinematicChain;
    use crate::kinematic_traits::Position;
    use crate::tests::test_utils::assert_same_links;
    use crate::trajectory::{Driver, FigureEight, Stationary, Trajectory};
    use crate::utils::is_valid;

    #[test]
    fn test_demo_tracks_figure_eight() {
        let mut chain = KinematicChain::demo_arm();
        let mut driver = Driver::default();
        let path = FigureEight::default();
        let errors = driver.follow(&mut chain, &path, 1000);

        assert_eq!(errors.len(), 1000);
        assert!(is_valid(&chain.joint_positions()));
        // Settles within a few frames and then stays on the moving goal
        let worst = errors[20..].iter().cloned().fold(0.0, f64::max);
        assert!(worst < 1e-3, "worst tracking error {}", worst);
        assert_same_links(&KinematicChain::demo_arm(), &chain, 1e-6);
        assert_eq!(chain.joints()[0], Position::zeros());
    }

    #[test]
    fn test_goal_moves_with_time() {
        let path = FigureEight::default();
        let mut driver = Driver::default();
        let mut chain = KinematicChain::demo_arm();
        driver.follow(&mut chain, &path, 100);
        assert!((driver.t - 1.0).abs() < 1e-9);
        assert!((path.goal_at(driver.t) - path.goal_at(0.0)).norm() > 0.5);
    }

    #[test]
    fn test_follow_stationary_is_reach() {
        let goal = Position::new(3.0, 1.0, 0.0);
        let mut followed = KinematicChain::demo_arm();
        let errors = Driver::default().follow(&mut followed, &Stationary(goal), 10);

        let mut reached = KinematicChain::demo_arm();
        let result = Driver::reach(&mut reached, &goal, 0.0, 10);

        assert_eq!(errors, result.errors);
        assert_eq!(followed, reached);
    }
}
