//! Penalized least squares via the normal equations

use crate::error::{ForecastError, Result};
use linfa_linalg::cholesky::{Cholesky, SolveC};
use ndarray::{Array1, Array2, Axis};

/// Smallest ratio between Cholesky diagonal entries before the system is
/// treated as singular
const MIN_PIVOT_RATIO: f64 = 1e-7;

fn singular() -> ForecastError {
    ForecastError::ForecastingError(
        "Design matrix is singular; the series cannot identify the model".to_string(),
    )
}

/// Solve `min ||y - Xb||² + Σ penalty_j b_j²`.
///
/// `design` has one row per observation. A zero penalty leaves the
/// coefficient unregularized.
pub(crate) fn solve_ridge(
    design: &Array2<f64>,
    target: &Array1<f64>,
    penalties: &[f64],
) -> Result<Array1<f64>> {
    if design.nrows() != target.len() {
        return Err(ForecastError::DataError(format!(
            "Design has {} rows, target has {}",
            design.nrows(),
            target.len()
        )));
    }
    if design.ncols() != penalties.len() {
        return Err(ForecastError::DataError(format!(
            "Design has {} columns, expected {}",
            design.ncols(),
            penalties.len()
        )));
    }

    // XᵀX + Λ and Xᵀy
    let mut normal = design.t().dot(design);
    for (i, penalty) in penalties.iter().enumerate() {
        normal[[i, i]] += penalty;
    }
    let rhs = design.t().dot(target).insert_axis(Axis(1));

    let factor = normal.cholesky().map_err(|_| singular())?;
    let diagonal = factor.diag();
    let largest = diagonal.fold(0.0_f64, |acc, &d| acc.max(d));
    let smallest = diagonal.fold(f64::INFINITY, |acc, &d| acc.min(d));
    if diagonal.iter().any(|d| !d.is_finite()) || !(smallest > largest * MIN_PIVOT_RATIO) {
        return Err(singular());
    }

    let solution = normal
        .solvec(&rhs)
        .map_err(|e| ForecastError::ForecastingError(format!("Least squares solve failed: {}", e)))?;
    Ok(solution.column(0).to_owned())
}
