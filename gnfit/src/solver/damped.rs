use crate::{
    Config, Control, FitError, IterationStats, Model, ResidualModel, Termination,
    residual::Evaluation,
};

use super::{DAMPING_FACTORS, step::solve_step};

/// Where the loop ended up.
#[derive(Debug)]
pub struct SuccessfulFit {
    /// How many iterations ran.
    pub iterations: usize,
    /// Cost at the final parameters.
    pub cost: f64,
    /// R² at the final parameters.
    pub r_squared: f64,
    /// Which stopping rule ended the loop.
    pub termination: Termination,
}

impl<M: Model> ResidualModel<'_, M> {
    /// Run damped Gauss-Newton from `current_values`, overwriting them with the fitted parameters.
    ///
    /// `on_iter` sees one [`IterationStats`] per iteration and may cancel the fit.
    pub fn solve_damped_gauss_newton<Cb>(
        &self,
        current_values: &mut [f64],
        config: Config,
        mut on_iter: Cb,
    ) -> Result<SuccessfulFit, FitError>
    where
        Cb: FnMut(&IterationStats) -> Control,
    {
        // Evaluating here means a model returning the wrong number of predictions
        // fails the fit before any iteration runs.
        let mut current = self.evaluate(current_values)?;
        let mut old_cost = current.cost;
        let mut this_iteration = 0;

        loop {
            // Convergence check: after the mandatory minimum, stop once the cost settles.
            let still_moving = (old_cost - current.cost).abs() > config.min_res_diff;
            let keep_going = (this_iteration < config.min_iterations || still_moving)
                && this_iteration < config.max_iterations;
            if !keep_going {
                let termination = if this_iteration >= config.max_iterations && still_moving {
                    Termination::MaxIterationsReached
                } else {
                    Termination::Converged
                };
                log::info!(
                    "Fit {termination} after {this_iteration} iterations, cost {:e}",
                    current.cost
                );
                return Ok(SuccessfulFit {
                    iterations: this_iteration,
                    cost: current.cost,
                    r_squared: current.r_squared,
                    termination,
                });
            }

            this_iteration += 1;
            old_cost = current.cost;

            // Linearize around the current parameters and find the Gauss-Newton direction.
            let jacobian = self.jacobian(current_values)?;
            #[cfg(feature = "dbg-jac")]
            self.debug_jacobian(current_values, this_iteration);
            let step = solve_step(&jacobian, &current.residual, config.rank_tolerance)
                .map_err(|e| e.at_iterate(this_iteration, current_values))?;

            // Try each damping factor; keep the strictly cheapest.
            let (damping, trial_values, trial) = self.damping_search(current_values, &step)?;

            if config.reject_uphill_steps && (trial.cost > current.cost || trial.cost.is_nan()) {
                log::info!(
                    "Iteration {this_iteration}: best step raises cost from {:e} to {:e}, stopping",
                    current.cost,
                    trial.cost
                );
                return Ok(SuccessfulFit {
                    iterations: this_iteration - 1,
                    cost: current.cost,
                    r_squared: current.r_squared,
                    termination: Termination::Converged,
                });
            }

            current_values.copy_from_slice(&trial_values);
            current = trial;

            let stats = IterationStats {
                iteration: this_iteration,
                cost: current.cost,
                r_squared: current.r_squared,
                damping,
            };
            log::debug!(
                "Iteration {}: cost = {:e}, R² = {}, damping = {}",
                stats.iteration,
                stats.cost,
                stats.r_squared,
                stats.damping
            );
            if on_iter(&stats) == Control::Cancel {
                return Err(FitError::Cancelled {
                    iterations: this_iteration,
                });
            }
        }
    }

    /// Evaluate `a + f·v` for every damping factor `f`.
    /// The undamped step is the baseline, smaller factors only win by being strictly cheaper.
    fn damping_search(
        &self,
        current_values: &[f64],
        step: &[f64],
    ) -> Result<(f64, Vec<f64>, Evaluation), FitError> {
        let take_step = |factor: f64| -> Vec<f64> {
            current_values
                .iter()
                .zip(step)
                .map(|(a, v)| a + factor * v)
                .collect()
        };

        let mut best_factor = DAMPING_FACTORS[0];
        let mut best_values = take_step(best_factor);
        let mut best = self.evaluate(&best_values)?;
        log::trace!("damping {best_factor}: cost {:e}", best.cost);

        for factor in DAMPING_FACTORS.into_iter().skip(1) {
            let values = take_step(factor);
            let trial = self.evaluate(&values)?;
            log::trace!("damping {factor}: cost {:e}", trial.cost);
            // A NaN baseline is beaten by any real cost.
            let improves = trial.cost < best.cost || (best.cost.is_nan() && !trial.cost.is_nan());
            if improves {
                best_factor = factor;
                best_values = values;
                best = trial;
            }
        }
        Ok((best_factor, best_values, best))
    }

    #[cfg(feature = "dbg-jac")]
    fn debug_jacobian(&self, current_values: &[f64], iteration: usize) {
        if let Err(e) =
            crate::finite_diff::check_jacobian(self.model(), current_values, self.x(), 1e-4)
        {
            log::warn!("Iteration {iteration}: {e}");
        }
    }
}
