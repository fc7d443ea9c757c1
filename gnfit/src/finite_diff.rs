//! Cross-check a model's analytic Jacobian against finite differences.
//! Meant for tests and debugging, the fitter never calls this unless the
//! `dbg-jac` feature is on.
use faer::Mat;

use crate::{FitError, Model};

/// Default relative step for central differences, roughly the cube root of machine epsilon.
pub const DEFAULT_STEP: f64 = 6e-6;

/// Estimate `df(a, x)` with central differences.
/// Each parameter is perturbed by `step · max(1, |a_j|)`.
pub fn numeric_jacobian<M: Model>(model: &M, params: &[f64], x: &[f64], step: f64) -> Mat<f64> {
    let mut jac = Mat::zeros(x.len(), params.len());
    let mut perturbed = params.to_vec();
    for (col, &a) in params.iter().enumerate() {
        let h = step * libm::fmax(1.0, a.abs());
        perturbed[col] = a + h;
        let forward = model.evaluate(&perturbed, x);
        perturbed[col] = a - h;
        let backward = model.evaluate(&perturbed, x);
        perturbed[col] = a;
        for (row, (f, b)) in forward.iter().zip(backward.iter()).enumerate().take(x.len()) {
            jac[(row, col)] = (f - b) / (2.0 * h);
        }
    }
    jac
}

/// Compare the model's Jacobian with [`numeric_jacobian`] at `params`.
///
/// An entry passes if `|analytic - numeric| <= tolerance · max(1, |analytic|)`.
/// Returns the worst failing entry as [`FitError::JacobianMismatch`].
pub fn check_jacobian<M: Model>(
    model: &M,
    params: &[f64],
    x: &[f64],
    tolerance: f64,
) -> Result<(), FitError> {
    let analytic = model.jacobian(params, x);
    let expected = (x.len(), params.len());
    let actual = (analytic.nrows(), analytic.ncols());
    if expected != actual {
        return Err(FitError::shape_mismatch("The Jacobian", expected, actual));
    }
    let numeric = numeric_jacobian(model, params, x, DEFAULT_STEP);

    let mut worst: Option<(f64, FitError)> = None;
    for col in 0..params.len() {
        for row in 0..x.len() {
            let a = analytic[(row, col)];
            let n = numeric[(row, col)];
            let excess = (a - n).abs() - tolerance * libm::fmax(1.0, a.abs());
            // NaN on either side never passes.
            let failed = excess > 0.0 || excess.is_nan();
            if !failed {
                continue;
            }
            let is_worse = match &worst {
                None => true,
                Some((prev, _)) => excess > *prev || excess.is_nan(),
            };
            if is_worse {
                worst = Some((
                    excess,
                    FitError::JacobianMismatch {
                        row,
                        col,
                        analytic: a,
                        numeric: n,
                    },
                ));
            }
        }
    }
    match worst {
        Some((_, e)) => Err(e),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FnModel;

    fn quadratic(a: &[f64], x: &[f64]) -> Vec<f64> {
        x.iter().map(|xi| a[0] * xi * xi + a[1]).collect()
    }

    #[test]
    fn numeric_matches_exact_derivative() {
        let model = FnModel::new(quadratic, |_a: &[f64], x: &[f64]| {
            Mat::from_fn(x.len(), 2, |i, j| if j == 0 { x[i] * x[i] } else { 1.0 })
        });
        let x = [-2.0, 0.5, 3.0];
        let jac = numeric_jacobian(&model, &[1.5, -4.0], &x, DEFAULT_STEP);
        assert!((jac[(2, 0)] - 9.0).abs() < 1e-6);
        assert!((jac[(1, 1)] - 1.0).abs() < 1e-6);
        check_jacobian(&model, &[1.5, -4.0], &x, 1e-6).unwrap();
    }

    #[test]
    fn finds_the_wrong_column() {
        // Forgot to square x in the first column.
        let model = FnModel::new(quadratic, |_a: &[f64], x: &[f64]| {
            Mat::from_fn(x.len(), 2, |i, j| if j == 0 { x[i] } else { 1.0 })
        });
        let x = [-1.0, 0.5, 3.0];
        let err = check_jacobian(&model, &[1.5, -4.0], &x, 1e-6).unwrap_err();
        // x=3 is off by 6, the biggest error.
        match err {
            FitError::JacobianMismatch { row, col, .. } => assert_eq!((row, col), (2, 0)),
            other => panic!("unexpected error {other}"),
        }
    }
}
