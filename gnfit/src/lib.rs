//! Damped Gauss-Newton curve fitting.
//! Fits a parametric model `y ≈ f(a, x)` to measurements by nonlinear least squares.
//!
//! ```
//! use gnfit::models::Linear;
//!
//! let x = [0.0, 1.0, 2.0, 3.0];
//! let y = [1.0, 3.0, 5.0, 7.0];
//! let params = gnfit::fit(&x, &y, &Linear, &[0.0, 0.0]).unwrap();
//! assert!((params[0] - 2.0).abs() < 1e-6);
//! assert!((params[1] - 1.0).abs() < 1e-6);
//! ```

pub use crate::error::FitError;
pub use crate::model::{FnModel, Model};
pub use crate::outcome::{Control, FitOutcome, IterationStats, Termination};
pub use crate::residual::{Evaluation, ResidualModel};
pub use crate::solver::Config;
pub use crate::textual::Measurements;
pub use crate::warnings::{Warning, WarningContent};

mod error;
pub mod finite_diff;
mod model;
pub mod models;
mod outcome;
mod residual;
pub mod solver;
pub mod textual;
/// Checks on the measurements that run before fitting.
pub mod warnings;

/// Fit `model` to the measurements with the default [`Config`],
/// starting from `a_start`. Returns the fitted parameters.
///
/// Hitting the iteration limit isn't an error; use [`fit_with_config`]
/// to find out how the fit ended.
pub fn fit<M: Model>(
    x: &[f64],
    y: &[f64],
    model: &M,
    a_start: &[f64],
) -> Result<Vec<f64>, FitError> {
    fit_with_config(x, y, model, a_start, Config::default()).map(FitOutcome::into_params)
}

/// Like [`fit`] but with a custom [`Config`], returning the whole [`FitOutcome`].
pub fn fit_with_config<M: Model>(
    x: &[f64],
    y: &[f64],
    model: &M,
    a_start: &[f64],
    config: Config,
) -> Result<FitOutcome, FitError> {
    fit_cb(x, y, model, a_start, config, |_| Control::Continue)
}

/// Like [`fit_with_config`], but `on_iter` is called after every iteration
/// with that iteration's [`IterationStats`], and can cancel the fit.
pub fn fit_cb<M, Cb>(
    x: &[f64],
    y: &[f64],
    model: &M,
    a_start: &[f64],
    config: Config,
    on_iter: Cb,
) -> Result<FitOutcome, FitError>
where
    M: Model,
    Cb: FnMut(&IterationStats) -> Control,
{
    if a_start.is_empty() {
        return Err(FitError::DimensionMismatch {
            what: "The initial guess",
            expected: "at least 1 value".to_owned(),
            actual: "0 values".to_owned(),
        });
    }
    if let Some(expected) = model.num_params().filter(|&m| m != a_start.len()) {
        return Err(FitError::length_mismatch(
            "The initial guess",
            expected,
            a_start.len(),
        ));
    }
    let residual_model = ResidualModel::new(model, x, y)?;

    let warnings = warnings::lint(x, y, a_start.len());
    for warning in &warnings {
        log::warn!("{warning}");
    }

    let mut params = a_start.to_vec();
    let fit = residual_model.solve_damped_gauss_newton(&mut params, config, on_iter)?;
    Ok(FitOutcome {
        params,
        iterations: fit.iterations,
        cost: fit.cost,
        r_squared: fit.r_squared,
        termination: fit.termination,
        warnings,
    })
}
