//! Turning collected benchmark output into per-operation cost functions.
//!
//! The collector stores raw runner output untouched. This module is the
//! post-processing step for criterion-style results: it normalizes every
//! relevant benchmark into nanoseconds per call and fits a function `f(n)`
//! estimating the cost of running an operation on input size `n`.
//!
//! ## Fitting Rules
//!
//! - An operation measured at a single size is assumed not to amortize:
//!   `f(n) = n * t`.
//! - An operation measured at several sizes (MSM, pairing products) gets a
//!   piecewise-linear interpolation between neighbouring sizes, extrapolating
//!   with the closest line outside the measured range.
//!
//! Functions are exported as JavaScript (`{"arguments": "n", "body": ...}`) so
//! a web front end can evaluate them directly.

pub mod criterion;
pub mod interpolation;

pub use criterion::{
    extract_measurements, parse_benchmark_id, to_nanoseconds, Measurement, Measurements,
};
pub use interpolation::{FittedFunction, PolyInterpolation, Segment};

use crate::config::FIT_ESTIMATE_OPERATIONS;
use crate::Result;
use std::collections::BTreeMap;
use std::io::BufRead;
use tracing::{debug, info};

/// Fitted functions keyed by operation name.
pub type FitResults = BTreeMap<String, FittedFunction>;

/// Fit one function per operation.
pub fn fit_measurements(measurements: &Measurements) -> Result<FitResults> {
    let mut results = FitResults::new();

    for (operation, points) in measurements.iter() {
        let function = fit_operation(operation, points)?;
        results.insert(operation.to_string(), function);
    }

    Ok(results)
}

/// Parse criterion JSON lines from `reader` and fit them.
pub fn fit_reader<R: BufRead>(reader: R) -> Result<FitResults> {
    let measurements = extract_measurements(reader)?;
    info!("Parsed {} operation(s) worth fitting", measurements.len());
    fit_measurements(&measurements)
}

fn fit_operation(operation: &str, points: &BTreeMap<u64, f64>) -> Result<FittedFunction> {
    match points.iter().next() {
        Some((_, &nanoseconds)) if points.len() == 1 => {
            info!(
                "{} [1 sample] [2^28 example: {:.2} s]: {} ns",
                operation,
                nanoseconds.trunc() * FIT_ESTIMATE_OPERATIONS * 1e-9,
                nanoseconds as u64
            );
            Ok(FittedFunction::per_operation(nanoseconds))
        }
        _ => {
            debug!("{}: interpolating {} sizes", operation, points.len());
            PolyInterpolation::new(points)?.to_javascript()
        }
    }
}
