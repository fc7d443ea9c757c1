use faer::Mat;

/// A parametric model `f(a, x)` together with its Jacobian.
///
/// `a` holds the `m` parameters being fitted and `x` the `n` measurement
/// points. Implementations must return `n` predictions from [`Model::evaluate`]
/// and an `n × m` matrix from [`Model::jacobian`], where column `j` holds
/// `∂f/∂a_j` at every measurement point. Sizes are checked by the fitter,
/// and mismatches become [`crate::FitError::DimensionMismatch`].
pub trait Model {
    /// Predict one value per measurement point.
    fn evaluate(&self, params: &[f64], x: &[f64]) -> Vec<f64>;

    /// Partial derivatives of every prediction with respect to every parameter.
    fn jacobian(&self, params: &[f64], x: &[f64]) -> Mat<f64>;

    /// How many parameters the model expects, if it knows.
    /// When this is `Some`, initial guesses of any other length are rejected
    /// before the model is ever called.
    fn num_params(&self) -> Option<usize> {
        None
    }
}

impl<M: Model + ?Sized> Model for &M {
    fn evaluate(&self, params: &[f64], x: &[f64]) -> Vec<f64> {
        (**self).evaluate(params, x)
    }

    fn jacobian(&self, params: &[f64], x: &[f64]) -> Mat<f64> {
        (**self).jacobian(params, x)
    }

    fn num_params(&self) -> Option<usize> {
        (**self).num_params()
    }
}

/// Adapts a pair of closures `f(a, x)` and `df(a, x)` into a [`Model`].
pub struct FnModel<F, DF> {
    f: F,
    df: DF,
}

impl<F, DF> FnModel<F, DF>
where
    F: Fn(&[f64], &[f64]) -> Vec<f64>,
    DF: Fn(&[f64], &[f64]) -> Mat<f64>,
{
    /// Wrap a model function and its Jacobian.
    pub fn new(f: F, df: DF) -> Self {
        Self { f, df }
    }
}

impl<F, DF> Model for FnModel<F, DF>
where
    F: Fn(&[f64], &[f64]) -> Vec<f64>,
    DF: Fn(&[f64], &[f64]) -> Mat<f64>,
{
    fn evaluate(&self, params: &[f64], x: &[f64]) -> Vec<f64> {
        (self.f)(params, x)
    }

    fn jacobian(&self, params: &[f64], x: &[f64]) -> Mat<f64> {
        (self.df)(params, x)
    }
}
