use faer::Mat;

use crate::{FitError, Model};

/// A model bound to the measurements it is being fitted against.
///
/// Borrows `x` and `y` for the whole fit and never mutates them.
/// Every method is a pure function of the parameters it's given.
pub struct ResidualModel<'d, M> {
    model: M,
    x: &'d [f64],
    y: &'d [f64],
    /// Cached so R² doesn't re-walk `y` on every evaluation.
    y_mean: f64,
    /// Total sum of squares, Σ(y - mean(y))².
    ss_tot: f64,
}

/// Everything derived from one model evaluation.
#[derive(Debug, Clone)]
pub struct Evaluation {
    /// `y - f(a, x)`.
    pub residual: Vec<f64>,
    /// `½·||f(a, x) - y||²`.
    pub cost: f64,
    /// Coefficient of determination, NaN if `y` is constant.
    pub r_squared: f64,
}

impl<'d, M: Model> ResidualModel<'d, M> {
    /// Bind a model to measurements. Fails if `x` and `y` disagree in length or are empty.
    pub fn new(model: M, x: &'d [f64], y: &'d [f64]) -> Result<Self, FitError> {
        if x.len() != y.len() {
            return Err(FitError::length_mismatch("y", x.len(), y.len()));
        }
        if x.is_empty() {
            return Err(FitError::EmptyData);
        }
        let y_mean = y.iter().sum::<f64>() / y.len() as f64;
        let ss_tot = y.iter().map(|yi| (yi - y_mean).powi(2)).sum();
        Ok(Self {
            model,
            x,
            y,
            y_mean,
            ss_tot,
        })
    }

    /// The wrapped model.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Number of measurements, `n`.
    pub fn num_points(&self) -> usize {
        self.x.len()
    }

    /// The measurement points.
    pub fn x(&self) -> &'d [f64] {
        self.x
    }

    /// The observed values.
    pub fn y(&self) -> &'d [f64] {
        self.y
    }

    /// Mean of the observed values.
    pub fn y_mean(&self) -> f64 {
        self.y_mean
    }

    /// Fails if the model knows how many parameters it takes and `params` has a different count.
    pub fn check_params(&self, params: &[f64]) -> Result<(), FitError> {
        match self.model.num_params() {
            Some(expected) if expected != params.len() => Err(FitError::length_mismatch(
                "The parameters",
                expected,
                params.len(),
            )),
            _ => Ok(()),
        }
    }

    fn predict(&self, params: &[f64]) -> Result<Vec<f64>, FitError> {
        self.check_params(params)?;
        let predicted = self.model.evaluate(params, self.x);
        if predicted.len() != self.num_points() {
            return Err(FitError::length_mismatch(
                "The model's predictions",
                self.num_points(),
                predicted.len(),
            ));
        }
        Ok(predicted)
    }

    /// `½·||f(a, x) - y||²`, the quantity being minimized.
    pub fn cost(&self, params: &[f64]) -> Result<f64, FitError> {
        let predicted = self.predict(params)?;
        Ok(half_sum_of_squares(
            predicted.iter().zip(self.y).map(|(p, y)| p - y),
        ))
    }

    /// `y - f(a, x)`.
    pub fn residual(&self, params: &[f64]) -> Result<Vec<f64>, FitError> {
        let predicted = self.predict(params)?;
        Ok(self.y.iter().zip(predicted).map(|(y, p)| y - p).collect())
    }

    /// `df(a, x)`, checked to be `n × len(a)`.
    pub fn jacobian(&self, params: &[f64]) -> Result<Mat<f64>, FitError> {
        self.check_params(params)?;
        let j = self.model.jacobian(params, self.x);
        let expected = (self.num_points(), params.len());
        let actual = (j.nrows(), j.ncols());
        if expected != actual {
            return Err(FitError::shape_mismatch("The Jacobian", expected, actual));
        }
        Ok(j)
    }

    /// Coefficient of determination `1 - SSres/SStot`.
    /// NaN when every observation is the same, which isn't treated as an error.
    pub fn r_squared(&self, params: &[f64]) -> Result<f64, FitError> {
        let residual = self.residual(params)?;
        Ok(self.r_squared_of(&residual))
    }

    /// Cost, residual and R² from a single model evaluation.
    pub fn evaluate(&self, params: &[f64]) -> Result<Evaluation, FitError> {
        let residual = self.residual(params)?;
        let cost = half_sum_of_squares(residual.iter().copied());
        let r_squared = self.r_squared_of(&residual);
        Ok(Evaluation {
            residual,
            cost,
            r_squared,
        })
    }

    // Only an exactly constant `y` leaves R² undefined.
    #[allow(clippy::float_cmp)]
    fn r_squared_of(&self, residual: &[f64]) -> f64 {
        let ss_res: f64 = residual.iter().map(|d| d * d).sum();
        if self.ss_tot == 0.0 {
            return f64::NAN;
        }
        1.0 - ss_res / self.ss_tot
    }
}

fn half_sum_of_squares(values: impl Iterator<Item = f64>) -> f64 {
    0.5 * values.map(|v| v * v).sum::<f64>()
}
