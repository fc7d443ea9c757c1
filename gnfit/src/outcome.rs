use crate::Warning;

/// Why the damped Gauss-Newton loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The cost changed by less than the threshold between iterations,
    /// after the mandatory minimum number of iterations.
    Converged,
    /// The iteration cap was hit while the cost was still changing.
    /// The parameters are still the best the loop found.
    MaxIterationsReached,
}

impl std::fmt::Display for Termination {
    #[mutants::skip]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Termination::Converged => write!(f, "converged"),
            Termination::MaxIterationsReached => write!(f, "reached the iteration limit"),
        }
    }
}

/// Progress record emitted once per iteration.
#[derive(Clone, Debug, PartialEq)]
pub struct IterationStats {
    /// Which iteration just finished, starting from 1.
    pub iteration: usize,
    /// Cost after applying this iteration's step.
    pub cost: f64,
    /// R² after applying this iteration's step.
    pub r_squared: f64,
    /// Damping factor that was chosen for the step.
    pub damping: f64,
}

/// What the progress callback wants the loop to do next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Control {
    /// Keep iterating.
    Continue,
    /// Stop now, the fit returns [`crate::FitError::Cancelled`].
    Cancel,
}

/// Data from a finished fit.
#[derive(Debug)]
#[cfg_attr(not(feature = "unstable-exhaustive"), non_exhaustive)]
pub struct FitOutcome {
    /// Each parameter's final value.
    pub(crate) params: Vec<f64>,
    /// How many Gauss-Newton iterations ran?
    pub(crate) iterations: usize,
    /// Cost at the final parameters.
    pub(crate) cost: f64,
    /// R² at the final parameters.
    pub(crate) r_squared: f64,
    /// Which stopping rule ended the loop.
    pub(crate) termination: Termination,
    /// Anything suspicious about the measurements.
    pub(crate) warnings: Vec<Warning>,
}

impl FitOutcome {
    /// Each parameter's final value.
    pub fn params(&self) -> &[f64] {
        &self.params
    }

    /// Take ownership of the final parameters.
    pub fn into_params(self) -> Vec<f64> {
        self.params
    }

    /// How many Gauss-Newton iterations ran?
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Cost `½·||f(a, x) - y||²` at the final parameters.
    pub fn cost(&self) -> f64 {
        self.cost
    }

    /// R² at the final parameters. NaN if every observation was equal.
    pub fn r_squared(&self) -> f64 {
        self.r_squared
    }

    /// Which stopping rule ended the loop.
    pub fn termination(&self) -> Termination {
        self.termination
    }

    /// Did the cost settle before the iteration cap?
    pub fn is_converged(&self) -> bool {
        self.termination == Termination::Converged
    }

    /// Anything suspicious about the measurements.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }
}
