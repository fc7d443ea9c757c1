use std::{
    io::{self, Read},
    path::PathBuf,
    str::FromStr,
    time::{Duration, Instant},
};

use clap::Parser;
use gnfit::{
    Config, Control, FitError, FitOutcome, IterationStats, Measurements, Termination, Warning,
    models::ModelKind,
    solver::{DEFAULT_MAX_ITERATIONS, DEFAULT_MIN_RES_DIFF},
};

mod visualize;

#[derive(Parser)]
#[command(name = "gnfit", version, about, long_about = None)]
struct Cli {
    /// Path to the measurements file, one `x y` pair per line.
    /// Use '-' for stdin.
    #[arg(short = 'f', long)]
    filepath: PathBuf,

    /// Model to fit: linear, poly<N> (e.g. poly3), exponential, gaussian or sine.
    #[arg(short = 'm', long, default_value = "linear")]
    model: ModelKind,

    /// Initial guess for the parameters, comma-separated. Defaults to all ones.
    #[arg(
        short = 'g',
        long,
        value_delimiter = ',',
        allow_negative_numbers = true
    )]
    guess: Option<Vec<f64>>,

    /// Stop once the cost changes by less than this between iterations.
    #[arg(long, default_value_t = DEFAULT_MIN_RES_DIFF)]
    min_res_diff: f64,

    /// Give up after this many iterations.
    #[arg(long, default_value_t = DEFAULT_MAX_ITERATIONS)]
    max_iterations: usize,

    /// Stop instead of taking a step that makes the fit worse.
    #[arg(long = "reject-uphill")]
    reject_uphill: bool,

    /// Print the cost, R² and damping after every iteration.
    #[arg(long)]
    trace: bool,

    /// Save the measurements and the fitted curve as a PNG.
    #[arg(short = 'o', long = "plot")]
    plot_path: Option<PathBuf>,

    /// Log level for the solver, e.g. warn, info, debug or trace.
    #[arg(long, default_value = "warn")]
    log_level: String,
}

impl Cli {
    fn chart_name(&self) -> String {
        if self.filepath.display().to_string() == "-" {
            "gnfit".to_owned()
        } else {
            self.filepath.display().to_string()
        }
    }

    fn config(&self) -> Config {
        Config::default()
            .with_min_res_diff(self.min_res_diff)
            .with_max_iterations(self.max_iterations)
            .with_reject_uphill_steps(self.reject_uphill)
    }

    fn initial_guess(&self) -> Vec<f64> {
        self.guess
            .clone()
            .unwrap_or_else(|| vec![1.0; self.model.param_count()])
    }
}

/// A successful fit, and what it took to get there.
struct Run {
    data: Measurements,
    outcome: FitOutcome,
    trace: Vec<IterationStats>,
    duration: Duration,
}

fn main() {
    let cli = Cli::parse();
    let _logger = match setup_logging(&cli.log_level) {
        Ok(handle) => handle,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    let run = match main_inner(&cli) {
        Ok(run) => run,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    let run = match run {
        Ok(o) => o,
        Err(error) => {
            print_failure_output(&error);
            std::process::exit(1);
        }
    };
    if let Err(e) = handle_output(&run, &cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

/// Send the solver's log output to stderr.
fn setup_logging(level: &str) -> Result<flexi_logger::LoggerHandle, String> {
    flexi_logger::Logger::try_with_str(level)
        .and_then(|logger| logger.log_to_stderr().start())
        .map_err(|e| format!("Logger initialization failed with {e}"))
}

fn handle_output(run: &Run, cli: &Cli) -> anyhow::Result<()> {
    if cli.trace {
        print_trace(&run.trace);
    }
    print_output(run, cli.model);
    if let Some(ref p) = cli.plot_path {
        let output_path = p.display().to_string();
        visualize::save_png(cli, &run.data, &run.outcome, output_path)?;
    }
    Ok(())
}

type RunResult = Result<Run, FitError>;

fn main_inner(cli: &Cli) -> Result<RunResult, String> {
    let txt = read_measurements(cli)?;
    let data = Measurements::from_str(&txt)?;
    log::debug!("Read {} measurements from {}", data.len(), cli.chart_name());
    let guess = cli.initial_guess();

    let mut trace = Vec::new();
    let now = Instant::now();
    let outcome = gnfit::fit_cb(
        data.x(),
        data.y(),
        &cli.model,
        &guess,
        cli.config(),
        |stats| {
            trace.push(stats.clone());
            Control::Continue
        },
    );
    let duration = now.elapsed();
    match &outcome {
        Ok(o) => log::info!(
            "Fitted {} measurements in {}μs ({} iterations)",
            data.len(),
            duration.as_micros(),
            o.iterations()
        ),
        Err(e) => log::error!("Fit of {} failed: {e}", cli.model.formula()),
    }
    Ok(outcome.map(|outcome| Run {
        data,
        outcome,
        trace,
        duration,
    }))
}

/// Prints the output nicely to stdout.
fn print_output(run: &Run, model: ModelKind) {
    use colored::Colorize;
    let Run {
        data,
        outcome,
        trace: _,
        duration,
    } = run;
    print_warnings(outcome.warnings());
    println!("Model: y = {}", model.formula());
    println!("Measurements: {}", data.len());
    println!("Parameters:");
    for (i, a) in outcome.params().iter().enumerate() {
        println!("\ta{i} = {a:.6}");
    }
    println!("Cost: {:e}", outcome.cost());
    let r_squared = format!("{:.6}", outcome.r_squared());
    if outcome.r_squared().is_nan() || outcome.r_squared() < 0.5 {
        println!("R²: {}", r_squared.yellow());
    } else {
        println!("R²: {r_squared}");
    }
    let termination = format!(
        "{} after {} iterations",
        outcome.termination(),
        outcome.iterations()
    );
    match outcome.termination() {
        Termination::Converged => println!("{}", termination.green()),
        Termination::MaxIterationsReached => println!("{}", termination.yellow()),
    }
    println!("Fitted in {}μs", duration.as_micros());
}

fn print_trace(trace: &[IterationStats]) {
    println!("{:>9} {:>14} {:>12} {:>8}", "iteration", "cost", "R²", "damping");
    for IterationStats {
        iteration,
        cost,
        r_squared,
        damping,
    } in trace
    {
        println!("{iteration:>9} {cost:>14.6e} {r_squared:>12.6} {damping:>8}");
    }
}

fn print_warnings(warnings: &[Warning]) {
    use colored::Colorize;
    if !warnings.is_empty() {
        println!("Warnings:");
        for warning in warnings {
            println!("\t{}", warning.to_string().yellow());
        }
    }
}

fn print_failure_output(error: &FitError) {
    use colored::Colorize;
    eprintln!("{}: {}", "Could not fit model".red(), error);
    match error {
        FitError::SingularJacobian { .. } => {
            eprintln!("Try a different initial guess, more measurements, or a simpler model.");
        }
        FitError::DimensionMismatch { .. } => {
            eprintln!("Check that --guess has one value per model parameter.");
        }
        FitError::EmptyData => eprintln!("The measurements file had no data in it."),
        FitError::FaerSvd(_) | FitError::Cancelled { .. } | FitError::JacobianMismatch { .. } => {}
    }
}

/// Read the measurements from a file or stdin, depending on user args.
/// They pass a filename, or '-' for stdin.
fn read_measurements(cli: &Cli) -> Result<String, String> {
    // Read from file
    if cli.filepath != PathBuf::from("-") {
        return std::fs::read_to_string(&cli.filepath).map_err(|e| e.to_string());
    }

    // Read from stdin
    let mut txt = String::with_capacity(100);
    let mut stdin = io::stdin();
    stdin.read_to_string(&mut txt).map_err(|e| e.to_string())?;
    Ok(txt)
}

#[cfg(test)]
mod tests {
    use std::process::{Command, Stdio};

    use super::*;

    fn cli_for(case: &str, model: &str) -> Cli {
        Cli {
            filepath: format!("../test_cases/{case}/data.txt").into(),
            model: model.parse().unwrap(),
            guess: None,
            min_res_diff: DEFAULT_MIN_RES_DIFF,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            reject_uphill: false,
            trace: true,
            plot_path: None,
            log_level: "warn".to_owned(),
        }
    }

    #[test]
    fn test_linear_inner() {
        let mut cli = cli_for("linear", "linear");
        cli.plot_path = Some("test_image.png".into());
        let run = main_inner(&cli).unwrap().unwrap();
        let params = run.outcome.params();
        assert!((params[0] - 2.0).abs() < 1e-6);
        assert!((params[1] - 1.0).abs() < 1e-6);
        assert_eq!(run.trace.len(), run.outcome.iterations());
        handle_output(&run, &cli).unwrap();
    }

    #[test]
    fn test_exponential_inner() {
        let mut cli = cli_for("exponential", "exponential");
        cli.guess = Some(vec![1.0, 0.1]);
        let run = main_inner(&cli).unwrap().unwrap();
        let params = run.outcome.params();
        assert!((params[0] - 3.0).abs() < 1e-4);
        assert!((params[1] - 0.4).abs() < 1e-4);
    }

    #[test]
    fn wrong_guess_length_is_a_fit_error() {
        let mut cli = cli_for("linear", "poly2");
        cli.guess = Some(vec![1.0, 2.0]);
        let err = main_inner(&cli).unwrap().err().unwrap();
        assert!(matches!(err, FitError::DimensionMismatch { .. }));
    }

    #[test]
    fn failed_fit_is_logged() {
        let mut cli = cli_for("linear", "gaussian");
        cli.guess = Some(vec![1.0]);
        cli.log_level = "error".to_owned();
        let _logger = setup_logging(&cli.log_level).unwrap();
        assert!(log::log_enabled!(log::Level::Error));
        let err = main_inner(&cli).unwrap().err().unwrap();
        assert!(matches!(err, FitError::DimensionMismatch { .. }));
    }

    #[test]
    fn missing_file_is_an_error() {
        let cli = cli_for("does_not_exist", "linear");
        assert!(main_inner(&cli).is_err());
    }

    #[test]
    fn test_linear() {
        let out = Command::new("cargo")
            .args([
                "run",
                "--quiet",
                "--",
                "-f",
                "../test_cases/linear/data.txt",
                "--guess",
                "-1,0.5",
            ])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .unwrap()
            .wait_with_output()
            .unwrap();
        assert!(out.status.success());
        let stdout = String::from_utf8(out.stdout).unwrap();
        assert!(stdout.contains("a0 = 2.000000"));
        assert!(stdout.contains("Measurements: 4"));
    }
}
