use gnfit::{FitOutcome, Measurements, Model};
use plotters::{coord::types::RangedCoordf64, prelude::*};

use crate::Cli;

const POINT_COLOR: RGBColor = RGBColor(0x58, 0x50, 0x8d);
const CURVE_COLOR: RGBColor = RGBColor(0xff, 0x63, 0x61);

const LABEL_STYLE: (&str, i32) = ("sans-serif", 30);

/// How many points the fitted curve is sampled at.
const CURVE_SAMPLES: usize = 400;

pub fn save_png(
    cli: &Cli,
    data: &Measurements,
    outcome: &FitOutcome,
    output_path: String,
) -> anyhow::Result<()> {
    let chart_name = cli.chart_name();
    let curve = sample_curve(&cli.model, outcome.params(), data.x());
    let bounds = Bounds::new(data, &curve);

    let width = 1000;
    let height = 800;
    let dpi_scale = 2;
    let root = BitMapBackend::new(&output_path, (width * dpi_scale, height * dpi_scale))
        .into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(80)
        .caption(chart_name, ("sans-serif", 50))
        .build_cartesian_2d(bounds.min_x..bounds.max_x, bounds.min_y..bounds.max_y)?;

    draw_axes(&mut chart)?;
    draw_curve(&mut chart, curve, &cli.model.formula())?;
    draw_measurements(&mut chart, data)?;

    chart
        .configure_series_labels()
        .label_font(LABEL_STYLE)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    // Finished.
    root.present()?;
    println!("Plot saved to {output_path}");
    Ok(())
}

/// Evaluate the fitted model on an even grid spanning the measurements.
fn sample_curve<M: Model>(model: &M, params: &[f64], x: &[f64]) -> Vec<(f64, f64)> {
    let finite = || x.iter().copied().filter(|xi| xi.is_finite());
    let (Some(lo), Some(hi)) = (finite().reduce(f64::min), finite().reduce(f64::max)) else {
        return Vec::new();
    };
    let grid: Vec<f64> = (0..CURVE_SAMPLES)
        .map(|i| lo + (hi - lo) * i as f64 / (CURVE_SAMPLES - 1) as f64)
        .collect();
    let y = model.evaluate(params, &grid);
    grid.into_iter()
        .zip(y)
        .filter(|(_, yi)| yi.is_finite())
        .collect()
}

/// Span of the chart area
struct Bounds {
    min_x: f64,
    max_x: f64,
    min_y: f64,
    max_y: f64,
}

impl Bounds {
    fn new(data: &Measurements, curve: &[(f64, f64)]) -> Self {
        // Get the furthest X and Y component in each direction,
        // so we can establish the span of the graph.
        let (xs, ys): (Vec<_>, Vec<_>) = data
            .x()
            .iter()
            .copied()
            .zip(data.y().iter().copied())
            .chain(curve.iter().copied())
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .unzip();
        let (min_x, max_x) = padded_range(&xs);
        let (min_y, max_y) = padded_range(&ys);
        Self {
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }
}

/// Smallest and largest value, widened by 5% on each side.
fn padded_range(values: &[f64]) -> (f64, f64) {
    let min = values.iter().copied().reduce(f64::min).unwrap_or(0.0);
    let max = values.iter().copied().reduce(f64::max).unwrap_or(0.0);
    let padding = if max > min { 0.05 * (max - min) } else { 1.0 };
    (min - padding, max + padding)
}

fn draw_axes<DB: DrawingBackend>(
    chart: &mut ChartContext<'_, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>,
) -> anyhow::Result<()>
where
    <DB as DrawingBackend>::ErrorType: 'static,
{
    chart
        .configure_mesh()
        .x_desc("x")
        .y_desc("y")
        .label_style(LABEL_STYLE) // axis labels
        .axis_desc_style(LABEL_STYLE) // x/y axis captions
        .draw()?;
    Ok(())
}

fn draw_curve<DB: DrawingBackend>(
    chart: &mut ChartContext<'_, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>,
    curve: Vec<(f64, f64)>,
    formula: &str,
) -> anyhow::Result<()>
where
    <DB as DrawingBackend>::ErrorType: 'static,
{
    chart
        .draw_series(LineSeries::new(curve, CURVE_COLOR.stroke_width(4)))?
        .label(format!("y = {formula}"))
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 30, y)], CURVE_COLOR.stroke_width(4)));
    Ok(())
}

fn draw_measurements<DB: DrawingBackend>(
    chart: &mut ChartContext<'_, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>,
    data: &Measurements,
) -> anyhow::Result<()>
where
    <DB as DrawingBackend>::ErrorType: 'static,
{
    let points: Vec<(f64, f64)> = data
        .x()
        .iter()
        .copied()
        .zip(data.y().iter().copied())
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .collect();
    chart
        .draw_series(PointSeries::of_element(
            points,
            8,
            &POINT_COLOR,
            &|coord, size, style| EmptyElement::at(coord) + Circle::new((0, 0), size, style.filled()),
        ))?
        .label("measurements")
        .legend(|(x, y)| Circle::new((x + 15, y), 8, POINT_COLOR.filled()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gnfit::models::ModelKind;

    #[test]
    fn curve_spans_the_measurements() {
        let x = [3.0, -1.0, f64::NAN, 2.0];
        let curve = sample_curve(&ModelKind::Linear, &[2.0, 1.0], &x);
        assert_eq!(curve.len(), CURVE_SAMPLES);
        assert_eq!(curve[0], (-1.0, -1.0));
        assert_eq!(curve[CURVE_SAMPLES - 1], (3.0, 7.0));
    }

    #[test]
    fn flat_range_still_has_area() {
        assert_eq!(padded_range(&[2.0, 2.0]), (1.0, 3.0));
        assert_eq!(padded_range(&[0.0, 10.0]), (-0.5, 10.5));
    }
}
