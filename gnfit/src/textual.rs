//! Plain-text measurement files.
//!
//! One `x y` pair per line, separated by spaces, tabs or a comma.
//! Everything after a `#` is a comment, and blank lines are skipped.
//!
//! ```text
//! # time, concentration
//! 0.0, 3.0
//! 1.0  4.47   # second sample
//! ```
use std::str::FromStr;

use winnow::{
    Result as WResult,
    ascii::{line_ending, space0, space1, till_line_ending},
    combinator::{alt, eof, opt, separated},
    prelude::*,
};

/// Measurement points `x` and their observed values `y`, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Measurements {
    x: Vec<f64>,
    y: Vec<f64>,
}

impl Measurements {
    /// The measurement points.
    pub fn x(&self) -> &[f64] {
        &self.x
    }

    /// The observed values.
    pub fn y(&self) -> &[f64] {
        &self.y
    }

    /// How many `(x, y)` pairs there are.
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Were there no pairs at all?
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

impl FromIterator<(f64, f64)> for Measurements {
    fn from_iter<T: IntoIterator<Item = (f64, f64)>>(iter: T) -> Self {
        let (x, y) = iter.into_iter().unzip();
        Self { x, y }
    }
}

impl FromStr for Measurements {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_measurements.parse(s).map_err(|e| e.to_string())
    }
}

fn parse_measurements(i: &mut &str) -> WResult<Measurements> {
    let lines: Vec<Option<(f64, f64)>> = separated(1.., line, line_ending).parse_next(i)?;
    eof.parse_next(i)?;
    Ok(lines.into_iter().flatten().collect())
}

/// A pair, a comment, both, or nothing.
fn line(i: &mut &str) -> WResult<Option<(f64, f64)>> {
    ignore_ws(i);
    let pair = opt(pair).parse_next(i)?;
    ignore_ws(i);
    opt(comment).parse_next(i)?;
    Ok(pair)
}

fn pair(i: &mut &str) -> WResult<(f64, f64)> {
    (parse_number, separator, parse_number)
        .map(|(x, _sep, y)| (x, y))
        .parse_next(i)
}

fn separator(i: &mut &str) -> WResult<()> {
    alt(((space0, ',', space0).void(), space1.void())).parse_next(i)
}

fn comment(i: &mut &str) -> WResult<()> {
    ('#', till_line_ending).void().parse_next(i)
}

fn parse_number(i: &mut &str) -> WResult<f64> {
    winnow::ascii::float.parse_next(i)
}

fn ws(i: &mut &str) -> WResult<()> {
    space0.parse_next(i).map(|_| ())
}

fn ignore_ws(i: &mut &str) {
    let _ = ws.parse_next(i);
}
