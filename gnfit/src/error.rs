use faer::linalg::svd::SvdError;

/// Errors that could occur while fitting a model with damped Gauss-Newton.
#[derive(thiserror::Error, Debug)]
#[cfg_attr(not(feature = "unstable-exhaustive"), non_exhaustive)]
pub enum FitError {
    /// Some sequence or matrix didn't have the size it should have.
    /// Covers `x`/`y` disagreeing, the model returning the wrong number of
    /// predictions, the Jacobian having the wrong shape, and empty guesses.
    #[error("{what} should have {expected} but actually had {actual}")]
    DimensionMismatch {
        /// Which value had the wrong size.
        what: &'static str,
        /// The size it should have had, e.g. "4 values" or "4x2".
        expected: String,
        /// The size it actually had.
        actual: String,
    },
    /// There were no measurements to fit against.
    #[error("Cannot fit a model to an empty set of measurements")]
    EmptyData,
    /// The Jacobian lost rank, so the least-squares step isn't unique.
    #[error(
        "The Jacobian is singular at iteration {iteration} (rank {rank} but {num_params} parameters), parameters were {params:?}"
    )]
    SingularJacobian {
        /// Which iteration hit the degenerate Jacobian.
        iteration: usize,
        /// Numerical rank that was found.
        rank: usize,
        /// How many parameters the model has, i.e. the rank it needed.
        num_params: usize,
        /// Parameter values where the Jacobian was evaluated.
        params: Vec<f64>,
    },
    /// Faer: could not decompose the Jacobian.
    #[error("Something went wrong doing SVD in faer")]
    FaerSvd(SvdError),
    /// The progress callback asked the fit to stop.
    #[error("Fit was cancelled after {iterations} iterations")]
    Cancelled {
        /// How many iterations completed before cancelling.
        iterations: usize,
    },
    /// An analytic Jacobian entry disagrees with its finite-difference estimate.
    #[error(
        "Jacobian entry ({row}, {col}) is {analytic} but finite differences estimate {numeric}"
    )]
    JacobianMismatch {
        /// Measurement index.
        row: usize,
        /// Parameter index.
        col: usize,
        /// What the model's Jacobian returned.
        analytic: f64,
        /// What central differences estimated.
        numeric: f64,
    },
}

impl FitError {
    pub(crate) fn length_mismatch(what: &'static str, expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch {
            what,
            expected: format!("{expected} values"),
            actual: format!("{actual} values"),
        }
    }

    /// Record where a singular Jacobian was hit.
    pub(crate) fn at_iterate(self, iteration: usize, params: &[f64]) -> Self {
        match self {
            Self::SingularJacobian {
                rank, num_params, ..
            } => Self::SingularJacobian {
                iteration,
                rank,
                num_params,
                params: params.to_vec(),
            },
            other => other,
        }
    }

    pub(crate) fn shape_mismatch(
        what: &'static str,
        expected: (usize, usize),
        actual: (usize, usize),
    ) -> Self {
        Self::DimensionMismatch {
            what,
            expected: format!("{}x{}", expected.0, expected.1),
            actual: format!("{}x{}", actual.0, actual.1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_mention_sizes() {
        let e = FitError::length_mismatch("y", 5, 6);
        assert_eq!(e.to_string(), "y should have 5 values but actually had 6 values");
        let e = FitError::shape_mismatch("The Jacobian", (4, 2), (4, 3));
        assert_eq!(
            e.to_string(),
            "The Jacobian should have 4x2 but actually had 4x3"
        );
    }
}
