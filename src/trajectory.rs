//! Goal trajectories and a bounded driver loop.
//!
//! The solver performs a single step per call; reaching or tracking a goal takes an external
//! loop calling it every tick (usually a render frame). [`Driver`] is such a loop with an
//! upper bound on the number of ticks, usable headless and in tests.

use tracing::{debug, info};
use crate::kinematic_traits::{Kinematics, Position};

/// Goal position as a function of time.
pub trait Trajectory {
    fn goal_at(&self, t: f64) -> Position;
}

/// Figure eight lying in the plane parallel to xy:
/// `scale * (cos t, sin t * cos t, 0) + center`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FigureEight {
    pub scale: f64,
    pub center: Position,
}

impl Default for FigureEight {
    fn default() -> Self {
        FigureEight {
            scale: 2.0,
            center: Position::new(0.0, 1.0, 2.0),
        }
    }
}

impl Trajectory for FigureEight {
    fn goal_at(&self, t: f64) -> Position {
        self.scale * Position::new(t.cos(), t.sin() * t.cos(), 0.0) + self.center
    }
}

/// Goal that does not move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stationary(pub Position);

impl Trajectory for Stationary {
    fn goal_at(&self, _t: f64) -> Position {
        self.0
    }
}

/// Outcome of [`Driver::reach`].
#[derive(Debug, Clone)]
pub struct Convergence {
    /// Whether the tip came within tolerance.
    pub converged: bool,

    /// Number of steps taken.
    pub steps: usize,

    /// Distance to the goal after every step.
    pub errors: Vec<f64>,

    /// Distance to the goal when the loop ended.
    pub final_error: f64,
}

/// Bounded loop calling `step_towards` once per tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Driver {
    /// Time advance per tick.
    pub dt: f64,

    /// Current time of the trajectory.
    pub t: f64,
}

impl Default for Driver {
    fn default() -> Self {
        Driver { dt: 0.01, t: 0.0 }
    }
}

impl Driver {
    pub fn new(dt: f64) -> Self {
        Driver { dt, t: 0.0 }
    }

    /// Steps towards a fixed goal until the tip is closer than `tolerance` or `max_steps`
    /// steps have been taken.
    pub fn reach(robot: &mut impl Kinematics, goal: &Position, tolerance: f64,
                 max_steps: usize) -> Convergence {
        let mut errors = Vec::with_capacity(max_steps);
        let mut error = (goal - robot.tip()).norm();
        while error >= tolerance && errors.len() < max_steps {
            robot.step_towards(goal);
            error = (goal - robot.tip()).norm();
            errors.push(error);
        }
        let converged = error < tolerance;
        debug!("reach: converged = {}, steps = {}, error = {:.3e}", converged, errors.len(), error);
        Convergence {
            converged,
            steps: errors.len(),
            errors,
            final_error: error,
        }
    }

    /// Tracks the trajectory for the given number of ticks, one step per tick, advancing
    /// time by `dt` after each. Returns the distance between tip and the goal of that tick,
    /// measured after the step.
    pub fn follow(&mut self, robot: &mut impl Kinematics, trajectory: &impl Trajectory,
                  ticks: usize) -> Vec<f64> {
        let mut errors = Vec::with_capacity(ticks);
        for _ in 0..ticks {
            let goal = trajectory.goal_at(self.t);
            robot.step_towards(&goal);
            errors.push((goal - robot.tip()).norm());
            self.t += self.dt;
        }
        if let Some(last) = errors.last() {
            info!("followed {} ticks up to t = {:.2}, last error {:.3e}", ticks, self.t, last);
        }
        errors
    }
}
