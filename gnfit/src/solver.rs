//! Damped Gauss-Newton: the loop lives in `damped`, the linear step in `step`.
mod damped;
pub mod step;

pub use damped::SuccessfulFit;

/// Damping factors tried for every Gauss-Newton step, in order.
/// The first is the undamped step; ties keep the earlier factor.
pub const DAMPING_FACTORS: [f64; 5] = [1.0, 0.5, 0.25, 0.125, 0.0625];

/// Every fit runs at least this many iterations, even if the cost settles immediately.
pub const DEFAULT_MIN_ITERATIONS: usize = 5;

/// Hard cap on iterations. Reaching it isn't an error.
pub const DEFAULT_MAX_ITERATIONS: usize = 1000;

/// Stop once the cost changes by less than this between iterations.
pub const DEFAULT_MIN_RES_DIFF: f64 = 1e-4;

/// Tuning for the damped Gauss-Newton loop.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    /// Convergence threshold on `|old cost - new cost|`.
    pub min_res_diff: f64,
    /// Minimum number of iterations before the convergence test may stop the loop.
    pub min_iterations: usize,
    /// Iteration cap.
    pub max_iterations: usize,
    /// Scales the singular-value cutoff used to decide the Jacobian's rank.
    /// The cutoff is `rank_tolerance · eps · max(n, m) · σ_max`, floored at zero,
    /// so exactly zero singular values never count toward the rank.
    pub rank_tolerance: f64,
    /// If set, a step whose best damped candidate is worse than the current
    /// cost isn't applied, and the fit stops there.
    pub reject_uphill_steps: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_res_diff: DEFAULT_MIN_RES_DIFF,
            min_iterations: DEFAULT_MIN_ITERATIONS,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            rank_tolerance: 1.0,
            reject_uphill_steps: false,
        }
    }
}

impl Config {
    /// Set the convergence threshold.
    pub fn with_min_res_diff(mut self, min_res_diff: f64) -> Self {
        self.min_res_diff = min_res_diff;
        self
    }

    /// Set the minimum number of iterations.
    pub fn with_min_iterations(mut self, min_iterations: usize) -> Self {
        self.min_iterations = min_iterations;
        self
    }

    /// Set the iteration cap.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the rank cutoff multiplier.
    pub fn with_rank_tolerance(mut self, rank_tolerance: f64) -> Self {
        self.rank_tolerance = rank_tolerance;
        self
    }

    /// Turn the uphill-step guard on or off.
    pub fn with_reject_uphill_steps(mut self, enabled: bool) -> Self {
        self.reject_uphill_steps = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.min_res_diff, 1e-4);
        assert_eq!(config.min_iterations, 5);
        assert_eq!(config.max_iterations, 1000);
        assert!(!config.reject_uphill_steps);
    }

    #[test]
    fn builders() {
        let config = Config::default()
            .with_min_res_diff(1e-9)
            .with_min_iterations(1)
            .with_max_iterations(20)
            .with_rank_tolerance(10.0)
            .with_reject_uphill_steps(true);
        assert_eq!(
            config,
            Config {
                min_res_diff: 1e-9,
                min_iterations: 1,
                max_iterations: 20,
                rank_tolerance: 10.0,
                reject_uphill_steps: true,
            }
        );
    }

    #[test]
    fn damping_factors_halve() {
        assert_eq!(DAMPING_FACTORS[0], 1.0);
        for pair in DAMPING_FACTORS.windows(2) {
            assert_eq!(pair[1], pair[0] / 2.0);
        }
    }
}
