//! A basic example for how to fit a model to measurements.
use gnfit::{Config, Control, FnModel, fit_cb};

fn main() {
    // Measurements of something decaying exponentially, with a little noise.
    let x = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
    let y = [5.02, 3.04, 1.86, 1.10, 0.69, 0.40, 0.25];

    // The model y = a0·exp(a1·x), and its derivatives with respect to a0 and a1.
    let model = FnModel::new(
        |a: &[f64], x: &[f64]| x.iter().map(|xi| a[0] * (a[1] * xi).exp()).collect(),
        |a: &[f64], x: &[f64]| {
            faer::Mat::from_fn(x.len(), 2, |i, j| {
                let e = (a[1] * x[i]).exp();
                if j == 0 { e } else { a[0] * x[i] * e }
            })
        },
    );

    // Run the fitter, printing its progress.
    let outcome = fit_cb(&x, &y, &model, &[1.0, -0.1], Config::default(), |stats| {
        println!(
            "iteration {}: cost {:.3e}, R² {:.6}, damping {}",
            stats.iteration, stats.cost, stats.r_squared, stats.damping
        );
        Control::Continue
    });

    // Check the outcome.
    match outcome {
        Ok(outcome) => {
            let a = outcome.params();
            println!("y = {:.4}·exp({:.4}·x)", a[0], a[1]);
            println!("{} after {} iterations", outcome.termination(), outcome.iterations());
        }
        Err(e) => {
            eprintln!("gnfit could not fit this model: {e}");
        }
    }
}
