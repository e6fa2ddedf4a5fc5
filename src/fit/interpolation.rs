//! Piecewise-linear interpolation of per-size timings, exported as JavaScript.

use crate::{Result, ZkalcError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A JavaScript function `f(n)` serialized as its argument list and body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FittedFunction {
    pub arguments: String,
    pub body: String,
}

impl FittedFunction {
    /// `f(n) = n * nanoseconds`, for operations that do not amortize.
    ///
    /// The per-call cost is truncated to whole nanoseconds.
    pub fn per_operation(nanoseconds: f64) -> Self {
        Self {
            arguments: "n".to_string(),
            body: format!("return n * {};", nanoseconds as u64),
        }
    }
}

/// The line through two consecutive data points, valid on `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: u64,
    pub end: u64,
    pub slope: f64,
    pub intercept: f64,
}

impl Segment {
    fn through(x0: u64, y0: f64, x1: u64, y1: f64) -> Self {
        let slope = (y1 - y0) / (x1 as f64 - x0 as f64);
        Self {
            start: x0,
            end: x1,
            slope,
            intercept: y0 - slope * x0 as f64,
        }
    }

    pub fn eval(&self, n: f64) -> f64 {
        self.slope * n + self.intercept
    }

    fn covers(&self, n: f64) -> bool {
        self.start as f64 <= n && n <= self.end as f64
    }
}

/// One line per pair of neighbouring sizes; out-of-range inputs extrapolate
/// with the closest line.
#[derive(Debug, Clone, PartialEq)]
pub struct PolyInterpolation {
    segments: Vec<Segment>,
}

impl PolyInterpolation {
    /// Build from size → nanoseconds points. Needs at least two sizes.
    pub fn new(points: &BTreeMap<u64, f64>) -> Result<Self> {
        if points.len() < 2 {
            return Err(ZkalcError::Interpolation(format!(
                "need at least 2 sizes, got {}",
                points.len()
            )));
        }

        let pts: Vec<(u64, f64)> = points.iter().map(|(&x, &y)| (x, y)).collect();
        let segments = pts
            .windows(2)
            .map(|w| Segment::through(w[0].0, w[0].1, w[1].0, w[1].1))
            .collect();
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Evaluate f(n).
    pub fn predict(&self, n: f64) -> f64 {
        // `new` guarantees at least one segment
        let first = &self.segments[0];
        let last = &self.segments[self.segments.len() - 1];

        if n < first.start as f64 {
            return first.eval(n);
        }
        if n > last.end as f64 {
            return last.eval(n);
        }
        self.segments
            .iter()
            .find(|s| s.covers(n))
            .unwrap_or(last)
            .eval(n)
    }

    /// Export `predict` as a JavaScript function body.
    pub fn to_javascript(&self) -> Result<FittedFunction> {
        let polynomials: Vec<[f64; 2]> = self
            .segments
            .iter()
            .map(|s| [s.slope, s.intercept])
            .collect();
        let ranges: Vec<[u64; 2]> = self.segments.iter().map(|s| [s.start, s.end]).collect();
        let polynomials = serde_json::to_string(&polynomials)?;
        let ranges = serde_json::to_string(&ranges)?;

        let body = format!(
            r#"
        const polynomials = {polynomials};
        const ranges = {ranges};
        for (let i = 0; i < ranges.length; i++) {{
            const [start, end] = ranges[i];
            if (n >= start && n <= end) {{
                return n * polynomials[i][0] + polynomials[i][1];
            }}
        }}
        if (n < ranges[0][0]) {{
            return n * polynomials[0][0] + polynomials[0][1];
        }} else if (n > ranges[ranges.length - 1][1]) {{
            return n * polynomials[polynomials.length - 1][0] + polynomials[polynomials.length - 1][1];
        }}
        throw new Error('Size out of range')
        "#
        );

        Ok(FittedFunction {
            arguments: "n".to_string(),
            body,
        })
    }
}
