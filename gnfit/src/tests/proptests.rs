use proptest::prelude::*;

use crate::{
    Config, ResidualModel, fit, fit_with_config,
    models::{Linear, Polynomial},
    tests::assert_nearly_eq,
};

proptest! {
    #[test]
    fn linear_recovers_true_parameters(
        slope in -10.0..10.0,
        intercept in -10.0..10.0,
        guess_slope in -100.0..100.0,
        guess_intercept in -100.0..100.0,
    ) {
        let x: Vec<f64> = (0..8).map(f64::from).collect();
        let y: Vec<f64> = x.iter().map(|xi| slope * xi + intercept).collect();

        // Invariant: noiseless linear data is fitted exactly from any start.
        let params = fit(&x, &y, &Linear, &[guess_slope, guess_intercept])
            .expect("a linear fit with enough points should always succeed");
        assert_nearly_eq(params[0], slope);
        assert_nearly_eq(params[1], intercept);
    }

    #[test]
    fn iterations_stay_within_bounds(
        min_iterations in 0usize..10,
        extra in 0usize..20,
        y in prop::collection::vec(-10.0..10.0f64, 6),
    ) {
        let x: Vec<f64> = (0..6).map(f64::from).collect();
        let max_iterations = min_iterations + extra;
        let config = Config::default()
            .with_min_iterations(min_iterations)
            .with_max_iterations(max_iterations);
        let outcome = fit_with_config(&x, &y, &Linear, &[0.0, 0.0], config).unwrap();
        assert!(outcome.iterations() >= min_iterations);
        assert!(outcome.iterations() <= max_iterations);
    }

    #[test]
    fn fit_never_raises_the_cost(
        y in prop::collection::vec(-10.0..10.0f64, 7),
        guess in prop::collection::vec(-5.0..5.0f64, 3),
    ) {
        let x: Vec<f64> = (-3..=3).map(f64::from).collect();
        let model = Polynomial { degree: 2 };
        let start_cost = ResidualModel::new(&model, &x, &y).unwrap().cost(&guess).unwrap();
        let outcome = fit_with_config(&x, &y, &model, &guess, Config::default()).unwrap();
        assert!(outcome.cost() <= start_cost + 1e-9);
    }
}
