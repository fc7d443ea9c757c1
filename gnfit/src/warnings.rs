/// Something about the measurements that will probably make the fit
/// meaningless, even though it can still run.
#[derive(Debug, Clone)]
#[cfg_attr(test, derive(PartialEq))]
pub struct Warning {
    /// Index of the measurement this is about, if it's about a single one.
    pub about_point: Option<usize>,
    /// What's wrong.
    pub content: WarningContent,
}

/// The different kinds of [`Warning`].
#[derive(Debug, Clone)]
#[cfg_attr(test, derive(PartialEq))]
#[non_exhaustive]
pub enum WarningContent {
    /// Every observation has the same value, so R² is undefined.
    ConstantObservations,
    /// Fewer measurements than parameters.
    Underdetermined {
        /// How many measurements there are.
        points: usize,
        /// How many parameters are being fitted.
        params: usize,
    },
    /// A measurement's `x` or `y` is NaN or infinite.
    NonFiniteData,
}

/// Look for problems in the measurements before fitting `num_params` parameters to them.
// Constant means exactly equal, not merely close.
#[allow(clippy::float_cmp)]
pub fn lint(x: &[f64], y: &[f64], num_params: usize) -> Vec<Warning> {
    let mut warnings = Vec::default();
    if x.len() < num_params {
        warnings.push(Warning {
            about_point: None,
            content: WarningContent::Underdetermined {
                points: x.len(),
                params: num_params,
            },
        });
    }
    if !y.is_empty() && y.iter().all(|yi| *yi == y[0]) {
        warnings.push(Warning {
            about_point: None,
            content: WarningContent::ConstantObservations,
        });
    }
    for (i, (xi, yi)) in x.iter().zip(y).enumerate() {
        if !xi.is_finite() || !yi.is_finite() {
            warnings.push(Warning {
                about_point: Some(i),
                content: WarningContent::NonFiniteData,
            });
        }
    }
    warnings
}

impl std::fmt::Display for WarningContent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WarningContent::ConstantObservations => write!(
                f,
                "Every observation has the same value, so R² is undefined and will be reported as NaN."
            ),
            WarningContent::Underdetermined { points, params } => write!(
                f,
                "There are {points} measurements but {params} parameters to fit. The Jacobian can't have full rank, so the fit will fail. Add more measurements or use a simpler model."
            ),
            WarningContent::NonFiniteData => {
                write!(f, "This measurement is NaN or infinite")
            }
        }
    }
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.about_point {
            Some(i) => write!(f, "Measurement {i}: {}", self.content),
            None => write!(f, "{}", self.content),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_data_has_no_warnings() {
        let x = [0.0, 1.0, 2.0];
        let y = [1.0, 3.0, 5.0];
        assert!(lint(&x, &y, 2).is_empty());
    }

    #[test]
    fn flags_each_problem() {
        let x = [0.0, f64::NAN];
        let y = [4.0, 4.0];
        let warnings = lint(&x, &y, 3);
        assert_eq!(
            warnings,
            vec![
                Warning {
                    about_point: None,
                    content: WarningContent::Underdetermined {
                        points: 2,
                        params: 3
                    }
                },
                Warning {
                    about_point: None,
                    content: WarningContent::ConstantObservations
                },
                Warning {
                    about_point: Some(1),
                    content: WarningContent::NonFiniteData
                },
            ]
        );
    }

    #[test]
    fn infinite_observation_is_not_constant() {
        let x = [0.0, 1.0];
        let y = [f64::INFINITY, 1.0];
        let warnings = lint(&x, &y, 1);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].about_point, Some(0));
    }

    #[test]
    fn display_formats_are_human_friendly() {
        let w = Warning {
            about_point: Some(3),
            content: WarningContent::NonFiniteData,
        };
        assert_eq!(w.to_string(), "Measurement 3: This measurement is NaN or infinite");
        let under = WarningContent::Underdetermined {
            points: 1,
            params: 2,
        }
        .to_string();
        assert!(under.contains("1 measurements but 2 parameters"));
        assert!(WarningContent::ConstantObservations.to_string().contains("NaN"));
    }
}
