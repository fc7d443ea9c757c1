//! The linear least-squares step at the heart of Gauss-Newton.
use faer::{Mat, prelude::SolveLstsq};

use crate::FitError;

/// Solve `J·v ≈ d` for the Gauss-Newton direction `v`.
///
/// Uses a dense QR least-squares solve, so `JᵀJ` is never formed.
/// Fails with [`FitError::SingularJacobian`] if `J` has non-finite entries
/// or is rank-deficient (which includes having fewer rows than columns),
/// since the step wouldn't be unique.
pub fn solve_step(j: &Mat<f64>, d: &[f64], rank_tolerance: f64) -> Result<Vec<f64>, FitError> {
    let (n, m) = (j.nrows(), j.ncols());
    if d.len() != n {
        return Err(FitError::length_mismatch("The residual", n, d.len()));
    }

    let rank = numerical_rank(j, rank_tolerance)?;
    if rank < m {
        return Err(FitError::SingularJacobian {
            iteration: 0,
            rank,
            num_params: m,
            params: Vec::new(),
        });
    }

    let mut rhs = Mat::<f64>::from_fn(n, 1, |i, _| d[i]);
    let qr = j.qr();
    // Least-squares: faer writes the solution into the top ncols(J) rows of `rhs`.
    qr.solve_lstsq_in_place(rhs.as_mut());
    Ok((0..m).map(|i| rhs[(i, 0)]).collect())
}

/// How many singular values of `j` are meaningfully above zero.
/// Non-finite matrices have rank 0.
pub fn numerical_rank(j: &Mat<f64>, rank_tolerance: f64) -> Result<usize, FitError> {
    let (n, m) = (j.nrows(), j.ncols());
    if n == 0 || m == 0 {
        return Ok(0);
    }
    let all_finite = (0..m).all(|col| (0..n).all(|row| j[(row, col)].is_finite()));
    if !all_finite {
        return Ok(0);
    }

    // SVD decomposes `J` into `J = UΣVᵀ`.
    let svd = j.svd().map_err(FitError::FaerSvd)?;
    // These are the 'singular values'.
    let sigma_col = svd.S().column_vector();

    // LAPACK's rank-revealing cutoff, relative to the largest singular value.
    let largest_singular_value = sigma_col.iter().copied().fold(0.0, libm::fmax);
    // A non-positive multiplier would let zero singular values count.
    let tolerance =
        (rank_tolerance * f64::EPSILON * (n.max(m) as f64) * largest_singular_value).max(0.0);

    Ok(sigma_col.iter().filter(|&&s| s > tolerance).count())
}
