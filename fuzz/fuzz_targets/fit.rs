#![no_main]

use arbitrary::Arbitrary;
use gnfit::{Config, models::ModelKind};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|setup: Setup| {
    let (x, y): (Vec<f64>, Vec<f64>) = setup.points.into_iter().unzip();
    // Keep each run short, the loop itself is what's being fuzzed.
    let config = Config::default().with_max_iterations(usize::from(setup.max_iterations));
    let _ = gnfit::fit_with_config(&x, &y, &setup.model, &setup.guesses, config);
});

#[derive(Debug, Arbitrary)]
struct Setup {
    model: ModelKind,
    points: Vec<(f64, f64)>,
    guesses: Vec<f64>,
    max_iterations: u8,
}
