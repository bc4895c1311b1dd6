extern crate nalgebra as na;

use na::{DMatrix, DVector, Vector3};
use na::linalg::SVD;
use tracing::{trace, warn};
use crate::chain::KinematicChain;
use crate::kinematic_traits::{Expmap, Expmaps, Position, SolveMethod};
use crate::rotation::crossmat;

/// Struct representing the geometric Jacobian of the chain
pub struct Jacobian {
    /// A 3 x 3N matrix, N being the number of joints.
    ///
    /// The Jacobian maps stacked per-joint angular velocities (axis-angle rates) to the
    /// linear velocity of the tip. Columns 3i..3i+3 belong to joint i, rows are x, y, z
    /// of the tip velocity.
    matrix: DMatrix<f64>,

    /// Singular values at or below this, relative to the largest one when that is above 1,
    /// are treated as zero when solving
    epsilon: f64,
}

impl Jacobian {
    /// Constructs the Jacobian for the current geometry of the chain.
    ///
    /// # Arguments
    ///
    /// * `chain` - The chain, the Jacobian is only valid until the chain is mutated.
    /// * `epsilon` - Threshold for singular values and pivots when solving.
    pub fn new(chain: &KinematicChain, epsilon: f64) -> Self {
        let matrix = compute_jacobian(chain);
        Self { matrix, epsilon }
    }

    #[cfg(test)]
    pub(crate) fn from_matrix(matrix: DMatrix<f64>, epsilon: f64) -> Self {
        Self { matrix, epsilon }
    }

    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.matrix
    }

    /// (rows, columns), always (3, 3N)
    pub fn shape(&self) -> (usize, usize) {
        self.matrix.shape()
    }

    /// Predicted tip velocity for the given per-joint axis-angle rates.
    pub fn tip_velocity(&self, expmaps: &[Expmap]) -> Vector3<f64> {
        let stacked = DVector::from_iterator(
            3 * expmaps.len(),
            expmaps.iter().flat_map(|e| e.iter().copied()),
        );
        let velocity = &self.matrix * stacked;
        Vector3::new(velocity[0], velocity[1], velocity[2])
    }

    /// Computes the per-joint increments that move the tip by `error` under the linear
    /// approximation.
    ///
    /// # Returns
    ///
    /// One increment per joint, in chain order, and the solver branch that produced them.
    ///
    /// A square, well conditioned Jacobian is solved directly with column-pivoted QR.
    /// A Jacobian built from a chain never takes that path, as its only square case, a single
    /// joint, has rank 2. Otherwise (the usual case, as the system is underdetermined for more than one joint
    /// and a single spherical joint is always rank deficient) the minimum-norm least squares
    /// solution is computed with SVD. A singular Jacobian therefore still produces finite
    /// increments.
    pub fn increments(&self, error: &Vector3<f64>) -> (Expmaps, SolveMethod) {
        let (solution, method) = self.solve(error);
        let increments: Expmaps = solution
            .as_slice()
            .chunks_exact(3)
            .map(Expmap::from_column_slice)
            .collect();
        trace!("increments = {increments:?}");
        (increments, method)
    }

    fn solve(&self, error: &Vector3<f64>) -> (DVector<f64>, SolveMethod) {
        let columns = self.matrix.ncols();
        if columns == 0 {
            return (DVector::zeros(0), SolveMethod::Empty);
        }
        let rhs = DVector::from_column_slice(error.as_slice());

        if self.matrix.is_square() {
            let qr = self.matrix.clone().col_piv_qr();
            let pivots = qr.r().diagonal();
            let threshold = self.threshold(pivots.amax());
            if pivots.iter().all(|p| p.abs() > threshold) {
                if let Some(solution) = qr.solve(&rhs) {
                    return (solution, SolveMethod::Direct);
                }
            }
        }

        let svd = SVD::new(self.matrix.clone(), true, true);
        trace!("singular values = {:?}", svd.singular_values.as_slice());
        let threshold = self.threshold(svd.singular_values.max());
        match svd.solve(&rhs, threshold) {
            Ok(solution) => (solution, SolveMethod::LeastSquares),
            Err(message) => {
                warn!("least squares solve failed ({message}), no rotation applied");
                (DVector::zeros(columns), SolveMethod::LeastSquares)
            }
        }
    }

    /// Rank cut-off: epsilon relative to the largest pivot or singular value once that
    /// exceeds 1, so rounding noise of far away chains is not mistaken for rank.
    fn threshold(&self, largest: f64) -> f64 {
        self.epsilon * largest.max(1.0)
    }
}

/// Function to compute the geometric Jacobian of the chain.
///
/// The block of joint i is `crossmat(p_i - p_tip)`, so that
/// `J * ω = Σ ω_i × (p_tip - p_i)`: the tip velocity produced by rotating every joint
/// with the right-handed angular velocity ω_i about its own position.
pub fn compute_jacobian(chain: &KinematicChain) -> DMatrix<f64> {
    let tip = chain.tip();
    let mut jacobian = DMatrix::zeros(3, 3 * chain.joint_count());
    for (i, joint) in chain.joints().iter().enumerate() {
        let arm: Position = joint - tip;
        jacobian.fixed_view_mut::<3, 3>(0, 3 * i).copy_from(&crossmat(&arm));
    }
    jacobian
}
