//! Ready-made models for common curve shapes.
use faer::Mat;

use crate::Model;

/// Straight line, `a0·x + a1`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Linear;

impl Model for Linear {
    fn evaluate(&self, params: &[f64], x: &[f64]) -> Vec<f64> {
        x.iter().map(|xi| params[0] * xi + params[1]).collect()
    }

    fn jacobian(&self, _params: &[f64], x: &[f64]) -> Mat<f64> {
        Mat::from_fn(x.len(), 2, |i, j| if j == 0 { x[i] } else { 1.0 })
    }

    fn num_params(&self) -> Option<usize> {
        Some(2)
    }
}

/// Polynomial `Σ a_k·x^k` for `k` in `0..=degree`.
#[derive(Debug, Clone, Copy)]
pub struct Polynomial {
    /// Highest power of `x`.
    pub degree: u8,
}

impl Polynomial {
    fn coefficients(self) -> usize {
        usize::from(self.degree) + 1
    }
}

impl Model for Polynomial {
    fn evaluate(&self, params: &[f64], x: &[f64]) -> Vec<f64> {
        // Horner's method.
        x.iter()
            .map(|xi| {
                params[..self.coefficients()]
                    .iter()
                    .rev()
                    .fold(0.0, |acc, a| acc * xi + a)
            })
            .collect()
    }

    fn jacobian(&self, _params: &[f64], x: &[f64]) -> Mat<f64> {
        Mat::from_fn(x.len(), self.coefficients(), |i, k| libm::pow(x[i], k as f64))
    }

    fn num_params(&self) -> Option<usize> {
        Some(self.coefficients())
    }
}

/// Exponential growth or decay, `a0·exp(a1·x)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Exponential;

impl Model for Exponential {
    fn evaluate(&self, params: &[f64], x: &[f64]) -> Vec<f64> {
        x.iter()
            .map(|xi| params[0] * libm::exp(params[1] * xi))
            .collect()
    }

    fn jacobian(&self, params: &[f64], x: &[f64]) -> Mat<f64> {
        Mat::from_fn(x.len(), 2, |i, j| {
            let e = libm::exp(params[1] * x[i]);
            if j == 0 { e } else { params[0] * x[i] * e }
        })
    }

    fn num_params(&self) -> Option<usize> {
        Some(2)
    }
}

/// Bell curve `a0·exp(-(x - a1)² / (2·a2²))`.
/// `a0` is the height, `a1` the center, `a2` the width.
#[derive(Debug, Clone, Copy, Default)]
pub struct Gaussian;

impl Model for Gaussian {
    fn evaluate(&self, params: &[f64], x: &[f64]) -> Vec<f64> {
        let [height, center, width] = [params[0], params[1], params[2]];
        x.iter()
            .map(|xi| height * libm::exp(-(xi - center).powi(2) / (2.0 * width * width)))
            .collect()
    }

    fn jacobian(&self, params: &[f64], x: &[f64]) -> Mat<f64> {
        let [height, center, width] = [params[0], params[1], params[2]];
        Mat::from_fn(x.len(), 3, |i, j| {
            let dx = x[i] - center;
            let e = libm::exp(-dx * dx / (2.0 * width * width));
            match j {
                0 => e,
                1 => height * e * dx / (width * width),
                _ => height * e * dx * dx / (width * width * width),
            }
        })
    }

    fn num_params(&self) -> Option<usize> {
        Some(3)
    }
}

/// Sinusoid `a0·sin(a1·x + a2)`: amplitude, angular frequency, phase.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sine;

impl Model for Sine {
    fn evaluate(&self, params: &[f64], x: &[f64]) -> Vec<f64> {
        x.iter()
            .map(|xi| params[0] * libm::sin(params[1] * xi + params[2]))
            .collect()
    }

    fn jacobian(&self, params: &[f64], x: &[f64]) -> Mat<f64> {
        Mat::from_fn(x.len(), 3, |i, j| {
            let phase = params[1] * x[i] + params[2];
            match j {
                0 => libm::sin(phase),
                1 => params[0] * x[i] * libm::cos(phase),
                _ => params[0] * libm::cos(phase),
            }
        })
    }

    fn num_params(&self) -> Option<usize> {
        Some(3)
    }
}

/// Every built-in model, for callers that pick one at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "fuzz", derive(arbitrary::Arbitrary))]
pub enum ModelKind {
    /// See [`Linear`].
    Linear,
    /// See [`Polynomial`].
    Polynomial {
        /// Highest power of `x`.
        degree: u8,
    },
    /// See [`Exponential`].
    Exponential,
    /// See [`Gaussian`].
    Gaussian,
    /// See [`Sine`].
    Sine,
}

impl ModelKind {
    /// How many parameters this model takes.
    pub fn param_count(self) -> usize {
        match self {
            ModelKind::Linear | ModelKind::Exponential => 2,
            ModelKind::Polynomial { degree } => Polynomial { degree }.coefficients(),
            ModelKind::Gaussian | ModelKind::Sine => 3,
        }
    }

    /// Human-readable formula, useful for reports.
    #[mutants::skip]
    pub fn formula(self) -> String {
        match self {
            ModelKind::Linear => "a0*x + a1".to_owned(),
            ModelKind::Polynomial { degree } => (0..=degree)
                .map(|k| match k {
                    0 => "a0".to_owned(),
                    1 => "a1*x".to_owned(),
                    k => format!("a{k}*x^{k}"),
                })
                .collect::<Vec<_>>()
                .join(" + "),
            ModelKind::Exponential => "a0*exp(a1*x)".to_owned(),
            ModelKind::Gaussian => "a0*exp(-(x - a1)^2 / (2*a2^2))".to_owned(),
            ModelKind::Sine => "a0*sin(a1*x + a2)".to_owned(),
        }
    }
}

impl std::str::FromStr for ModelKind {
    type Err = String;

    /// Accepts `linear`, `exponential`, `gaussian`, `sine`, or `poly<N>` e.g. `poly3`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "linear" => Ok(ModelKind::Linear),
            "exponential" | "exp" => Ok(ModelKind::Exponential),
            "gaussian" => Ok(ModelKind::Gaussian),
            "sine" | "sin" => Ok(ModelKind::Sine),
            other => other
                .strip_prefix("poly")
                .and_then(|degree| degree.parse().ok())
                .map(|degree| ModelKind::Polynomial { degree })
                .ok_or_else(|| {
                    format!(
                        "Unknown model '{other}', expected linear, exponential, gaussian, sine or poly<N>"
                    )
                }),
        }
    }
}

impl Model for ModelKind {
    fn evaluate(&self, params: &[f64], x: &[f64]) -> Vec<f64> {
        match *self {
            ModelKind::Linear => Linear.evaluate(params, x),
            ModelKind::Polynomial { degree } => Polynomial { degree }.evaluate(params, x),
            ModelKind::Exponential => Exponential.evaluate(params, x),
            ModelKind::Gaussian => Gaussian.evaluate(params, x),
            ModelKind::Sine => Sine.evaluate(params, x),
        }
    }

    fn jacobian(&self, params: &[f64], x: &[f64]) -> Mat<f64> {
        match *self {
            ModelKind::Linear => Linear.jacobian(params, x),
            ModelKind::Polynomial { degree } => Polynomial { degree }.jacobian(params, x),
            ModelKind::Exponential => Exponential.jacobian(params, x),
            ModelKind::Gaussian => Gaussian.jacobian(params, x),
            ModelKind::Sine => Sine.jacobian(params, x),
        }
    }

    fn num_params(&self) -> Option<usize> {
        Some(self.param_count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finite_diff::check_jacobian;

    #[test]
    fn jacobians_match_finite_differences() {
        let x: Vec<f64> = (0..12).map(|i| f64::from(i) * 0.37 - 1.5).collect();
        let cases: [(ModelKind, &[f64]); 5] = [
            (ModelKind::Linear, &[2.0, -1.0]),
            (ModelKind::Polynomial { degree: 3 }, &[1.0, -0.5, 0.25, 0.1]),
            (ModelKind::Exponential, &[1.5, -0.7]),
            (ModelKind::Gaussian, &[2.0, 0.3, 0.8]),
            (ModelKind::Sine, &[1.2, 2.0, 0.4]),
        ];
        for (kind, params) in cases {
            assert_eq!(kind.param_count(), params.len());
            if let Err(e) = check_jacobian(&kind, params, &x, 1e-6) {
                panic!("{kind:?}: {e}");
            }
        }
    }

    #[test]
    fn polynomial_evaluates_with_horner() {
        let p = Polynomial { degree: 2 };
        // 1 + 2x + 3x²
        assert_eq!(p.evaluate(&[1.0, 2.0, 3.0], &[0.0, 1.0, 2.0]), vec![1.0, 6.0, 17.0]);
    }

    #[test]
    fn highest_degree_counts_its_parameters() {
        let p = Polynomial { degree: u8::MAX };
        assert_eq!(p.num_params(), Some(256));
        assert_eq!(p.jacobian(&[0.0; 256], &[1.0, 2.0]).ncols(), 256);
        assert_eq!(ModelKind::Polynomial { degree: u8::MAX }.param_count(), 256);
    }

    #[test]
    fn parse_model_kind() {
        assert_eq!("linear".parse::<ModelKind>().unwrap(), ModelKind::Linear);
        assert_eq!(
            "poly4".parse::<ModelKind>().unwrap(),
            ModelKind::Polynomial { degree: 4 }
        );
        assert_eq!("exp".parse::<ModelKind>().unwrap(), ModelKind::Exponential);
        assert!("polyx".parse::<ModelKind>().is_err());
        assert!("cubic".parse::<ModelKind>().is_err());
    }

    #[test]
    fn formula_lists_every_term() {
        assert_eq!(
            ModelKind::Polynomial { degree: 2 }.formula(),
            "a0 + a1*x + a2*x^2"
        );
    }
}
